//! JSON-LD nodes of the data structure definition.
//!
//! One builder per kind of resource; shared bits (labels, sub-properties,
//! sources) go through the small helpers at the bottom.

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::Value;

use super::document::RdfNode;
use super::uris::CubeUris;
use crate::identifier::uri_safe;
use crate::model::{
    AttributeDefinition, AttributeValue, CatalogMetadata, Measure, NewDimension, Unit,
};
use crate::vocab::*;

/// The part a component plays in the structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentRole {
    Dimension,
    Attribute,
    Measure,
}

impl ComponentRole {
    pub fn label(&self) -> &'static str {
        match self {
            ComponentRole::Dimension => "dimension",
            ComponentRole::Attribute => "attribute",
            ComponentRole::Measure => "measure",
        }
    }

    /// Property linking a component specification to its component.
    pub fn predicate(&self) -> &'static str {
        match self {
            ComponentRole::Dimension => QB_DIMENSION,
            ComponentRole::Attribute => QB_ATTRIBUTE,
            ComponentRole::Measure => QB_MEASURE,
        }
    }
}

/// One `qb:ComponentSpecification` to emit.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub token: String,
    pub role: ComponentRole,
    pub property: String,
    pub required: bool,
}

impl ComponentSpec {
    pub fn dimension(token: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role: ComponentRole::Dimension,
            property: property.into(),
            required: true,
        }
    }

    pub fn attribute(token: impl Into<String>, property: impl Into<String>, required: bool) -> Self {
        Self {
            token: token.into(),
            role: ComponentRole::Attribute,
            property: property.into(),
            required,
        }
    }

    pub fn measure(token: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role: ComponentRole::Measure,
            property: property.into(),
            required: true,
        }
    }
}

/// Ordered component specifications, deduplicated by role and property.
#[derive(Debug, Default)]
pub struct ComponentList {
    specs: Vec<ComponentSpec>,
}

impl ComponentList {
    /// Add a component unless one with the same role and property exists.
    ///
    /// A token already taken by another component gets the role appended,
    /// then a counter until it is free.
    pub fn push(&mut self, mut spec: ComponentSpec) {
        let seen = self
            .specs
            .iter()
            .any(|s| s.role == spec.role && s.property == spec.property);
        if seen {
            return;
        }
        if self.token_taken(&spec.token) {
            let base = format!("{}-{}", spec.token, spec.role.label());
            spec.token = base.clone();
            let mut n = 2;
            while self.token_taken(&spec.token) {
                spec.token = format!("{base}-{n}");
                n += 1;
            }
        }
        self.specs.push(spec);
    }

    fn token_taken(&self, token: &str) -> bool {
        self.specs.iter().any(|s| s.token == token)
    }

    pub fn specs(&self) -> &[ComponentSpec] {
        &self.specs
    }

    pub fn dimension_properties(&self) -> impl Iterator<Item = &str> {
        self.specs
            .iter()
            .filter(|s| s.role == ComponentRole::Dimension)
            .map(|s| s.property.as_str())
    }
}

pub fn dataset_node(uris: &CubeUris, metadata: &CatalogMetadata) -> RdfNode {
    let timestamp = |t: &chrono::DateTime<chrono::Utc>| t.to_rfc3339_opts(SecondsFormat::Secs, true);

    let mut node = RdfNode::new(uris.dataset())
        .with_type(DCAT_DATASET)
        .with_type(QB_DATA_SET)
        .with_literal(DCTERMS_TITLE, metadata.title.as_str())
        .with_literal(RDFS_LABEL, metadata.title.as_str())
        .with_literal(DCTERMS_IDENTIFIER, metadata.identifier())
        .with_optional(DCTERMS_ABSTRACT, metadata.summary.as_deref())
        .with_optional(DCTERMS_DESCRIPTION, metadata.description.as_deref())
        .with_optional_ref(DCTERMS_CREATOR, metadata.creator_uri.as_deref())
        .with_optional_ref(DCTERMS_PUBLISHER, metadata.publisher_uri.as_deref())
        .with_optional_ref(DCTERMS_LICENSE, metadata.license_uri.as_deref())
        .with_optional_ref(DCAT_LANDING_PAGE, metadata.landing_page_uri.as_deref())
        .with_optional_ref(DCAT_CONTACT_POINT, metadata.public_contact_point_uri.as_deref())
        .with_optional(DCTERMS_ISSUED, metadata.dataset_issued.as_ref().map(timestamp))
        .with_optional(DCTERMS_MODIFIED, metadata.dataset_modified.as_ref().map(timestamp))
        .with_ref(QB_STRUCTURE, uris.structure());

    if !metadata.keywords.is_empty() {
        let keywords: Vec<Value> = metadata.keywords.iter().map(|k| Value::from(k.as_str())).collect();
        node = node.with_literal(DCAT_KEYWORD, Value::Array(keywords));
    }
    for theme in &metadata.theme_uris {
        node.push_ref(DCAT_THEME, theme.as_str());
    }
    node
}

pub fn structure_node(uris: &CubeUris, components: &ComponentList, with_slice_key: bool) -> RdfNode {
    let mut node = RdfNode::new(uris.structure()).with_type(QB_DATA_STRUCTURE_DEFINITION);
    for spec in components.specs() {
        node.push_ref(QB_COMPONENT, uris.component(&spec.token));
    }
    if with_slice_key {
        node = node.with_ref(QB_SLICE_KEY_PROPERTY, uris.slice_key());
    }
    node
}

/// Component specification nodes, numbered from 1 in list order.
pub fn component_nodes(uris: &CubeUris, components: &ComponentList) -> Vec<RdfNode> {
    components
        .specs()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let node = RdfNode::new(uris.component(&spec.token))
                .with_type(QB_COMPONENT_SPECIFICATION)
                .with_literal(QB_ORDER, index as i64 + 1)
                .with_ref(spec.role.predicate(), spec.property.as_str());
            match spec.role {
                ComponentRole::Attribute => node
                    .with_literal(QB_COMPONENT_REQUIRED, spec.required)
                    .with_ref(QB_COMPONENT_ATTACHMENT, QB_OBSERVATION),
                _ => node,
            }
        })
        .collect()
}

pub fn slice_key_node(uris: &CubeUris, components: &ComponentList) -> RdfNode {
    let mut node = RdfNode::new(uris.slice_key())
        .with_type(QB_SLICE_KEY)
        .with_literal(RDFS_LABEL, "Cross-measures slice");
    for property in components.dimension_properties() {
        if property != QB_MEASURE_TYPE {
            node.push_ref(QB_COMPONENT_PROPERTY, property);
        }
    }
    node
}

pub fn dimension_node(uri: String, dimension: &NewDimension, code_list_uri: Option<&str>) -> RdfNode {
    let mut node = RdfNode::new(uri).with_type(QB_DIMENSION_PROPERTY);
    if code_list_uri.is_some() {
        node = node.with_type(QB_CODED_PROPERTY);
    }
    described(node, &dimension.label, dimension.description.as_deref())
        .with_optional_ref(RDFS_SUB_PROPERTY_OF, dimension.parent_dimension_uri.as_deref())
        .with_optional_ref(DCTERMS_SOURCE, dimension.source_uri.as_deref())
        .with_optional_ref(QB_CODE_LIST, code_list_uri)
}

/// Definition of a new attribute; `None` for an existing one.
pub fn attribute_node(uri: String, definition: &AttributeDefinition, literal_type: Option<&str>) -> Option<RdfNode> {
    let AttributeDefinition::New {
        label,
        description,
        parent_attribute_uri,
        source_uri,
    } = definition
    else {
        return None;
    };

    let node = described(
        RdfNode::new(uri).with_type(QB_ATTRIBUTE_PROPERTY),
        label,
        description.as_deref(),
    )
    .with_optional_ref(RDFS_SUB_PROPERTY_OF, parent_attribute_uri.as_deref())
    .with_optional_ref(DCTERMS_SOURCE, source_uri.as_deref())
    .with_optional_ref(RDFS_RANGE, literal_type.map(|t| format!("xsd:{t}")));
    Some(node)
}

pub fn attribute_value_node(uris: &CubeUris, attribute_token: &str, value: &AttributeValue) -> RdfNode {
    let uri = uris.attribute_value(attribute_token, &uri_safe(&value.label));
    described(RdfNode::new(uri), &value.label, value.description.as_deref())
        .with_optional_ref(SKOS_BROADER, value.parent_attribute_value_uri.as_deref())
}

pub fn measure_uri(uris: &CubeUris, measure: &Measure) -> String {
    match measure {
        Measure::Existing { measure_uri } => measure_uri.clone(),
        Measure::New { label, .. } => uris.measure(&uri_safe(label)),
    }
}

/// Definition of a new measure; `None` for an existing one.
pub fn measure_node(uris: &CubeUris, measure: &Measure) -> Option<RdfNode> {
    let Measure::New {
        label,
        description,
        parent_measure_uri,
        source_uri,
    } = measure
    else {
        return None;
    };

    let node = described(
        RdfNode::new(measure_uri(uris, measure)).with_type(QB_MEASURE_PROPERTY),
        label,
        description.as_deref(),
    )
    .with_optional_ref(RDFS_SUB_PROPERTY_OF, parent_measure_uri.as_deref())
    .with_optional_ref(DCTERMS_SOURCE, source_uri.as_deref());
    Some(node)
}

pub fn unit_uri(uris: &CubeUris, unit: &Unit) -> String {
    match unit {
        Unit::Existing { unit_uri } => unit_uri.clone(),
        Unit::New(new) => uris.unit(&uri_safe(&new.label)),
    }
}

/// Nodes for a new unit and any new units it is scaled from.
pub fn unit_nodes(uris: &CubeUris, unit: &Unit) -> Vec<RdfNode> {
    let Unit::New(new) = unit else {
        return Vec::new();
    };

    let mut node = described(
        RdfNode::new(unit_uri(uris, unit)).with_type(QUDT_UNIT),
        &new.label,
        new.description.as_deref(),
    )
    .with_optional(QUDT_SCALING_FACTOR, new.base_unit_scaling_factor)
    .with_optional(QUDT_CONVERSION_MULTIPLIER, new.si_base_unit_conversion_multiplier)
    .with_optional_ref(QUDT_HAS_QUANTITY_KIND, new.qudt_quantity_kind_uri.as_deref());

    let mut nodes = Vec::new();
    if let Some(base) = &new.base_unit {
        node = node.with_ref(QUDT_IS_SCALING_OF, unit_uri(uris, base));
        nodes.extend(unit_nodes(uris, base));
    }
    nodes.insert(0, node);
    nodes
}

fn described(node: RdfNode, label: &str, description: Option<&str>) -> RdfNode {
    node.with_literal(RDFS_LABEL, label).with_optional(RDFS_COMMENT, description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::Token;

    fn uris() -> CubeUris {
        CubeUris::new(&Token::resolve("cube").unwrap())
    }

    #[test]
    fn test_component_list_dedupes() {
        let mut list = ComponentList::default();
        list.push(ComponentSpec::attribute("unit", SDMX_UNIT_MEASURE, true));
        list.push(ComponentSpec::attribute("unit", SDMX_UNIT_MEASURE, true));
        list.push(ComponentSpec::dimension("area", "cube.csv#dimension/area"));
        assert_eq!(list.specs().len(), 2);
    }

    #[test]
    fn test_component_list_renames_clashing_token() {
        let mut list = ComponentList::default();
        list.push(ComponentSpec::dimension("count", "cube.csv#dimension/count"));
        list.push(ComponentSpec::measure("count", "cube.csv#measure/count"));
        assert_eq!(list.specs()[1].token, "count-measure");
    }

    #[test]
    fn test_component_list_separates_repeated_clashes() {
        let mut list = ComponentList::default();
        list.push(ComponentSpec::measure("count", "http://a.example/count"));
        list.push(ComponentSpec::measure("count", "http://b.example/count"));
        list.push(ComponentSpec::measure("count", "http://c.example/count"));
        list.push(ComponentSpec::measure("count", "http://d.example/count"));

        let tokens: Vec<&str> = list.specs().iter().map(|s| s.token.as_str()).collect();
        assert_eq!(
            tokens,
            vec!["count", "count-measure", "count-measure-2", "count-measure-3"]
        );
    }

    #[test]
    fn test_component_nodes_are_ordered() {
        let mut list = ComponentList::default();
        list.push(ComponentSpec::dimension("area", "cube.csv#dimension/area"));
        list.push(ComponentSpec::attribute("marker", "cube.csv#attribute/marker", false));

        let nodes = component_nodes(&uris(), &list);
        assert_eq!(nodes[0].integer(QB_ORDER), Some(1));
        assert_eq!(nodes[0].reference(QB_DIMENSION), Some("cube.csv#dimension/area"));
        assert_eq!(nodes[1].integer(QB_ORDER), Some(2));
        assert_eq!(nodes[1].boolean(QB_COMPONENT_REQUIRED), Some(false));
    }

    #[test]
    fn test_scaled_unit_nodes() {
        let unit = Unit::scaled("Thousands", Unit::new("Pounds"), 1000.0);
        let nodes = unit_nodes(&uris(), &unit);
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].id, "cube.csv#unit/thousands");
        assert_eq!(nodes[0].reference(QUDT_IS_SCALING_OF), Some("cube.csv#unit/pounds"));
        assert_eq!(nodes[0].number(QUDT_SCALING_FACTOR), Some(1000.0));
        assert!(unit_nodes(&uris(), &Unit::existing("http://u")).is_empty());
    }

    #[test]
    fn test_dataset_node() {
        let meta = CatalogMetadata::new("My Cube").with_keyword("roads").with_summary("Short");
        let node = dataset_node(&uris(), &meta);
        assert!(node.has_type(QB_DATA_SET));
        assert_eq!(node.literal(DCTERMS_TITLE), Some("My Cube"));
        assert_eq!(node.literal(DCTERMS_ABSTRACT), Some("Short"));
        assert_eq!(node.literals(DCAT_KEYWORD), vec!["roads"]);
        assert_eq!(node.reference(QB_STRUCTURE), Some("cube.csv#structure"));
    }

    #[test]
    fn test_measure_node_only_for_new() {
        assert!(measure_node(&uris(), &Measure::existing("http://m")).is_none());
        let node = measure_node(&uris(), &Measure::new("Some Measure")).unwrap();
        assert_eq!(node.id, "cube.csv#measure/some-measure");
        assert_eq!(node.literal(RDFS_LABEL), Some("Some Measure"));
    }
}
