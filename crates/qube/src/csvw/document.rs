//! CSV-W metadata document types.
//!
//! Only the parts of CSV-W the cube writer emits are modelled; everything
//! structural beyond the table descriptions lives in `rdfs:seeAlso` as
//! JSON-LD nodes.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{QubeError, Result};
use crate::vocab::CSVW_CONTEXT;

/// A CSV-W table group with its linked-data annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvwMetadata {
    #[serde(rename = "@context")]
    pub context: Value,
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub tables: Vec<Table>,
    #[serde(rename = "rdfs:seeAlso", default, skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<RdfNode>,
}

impl CsvwMetadata {
    pub fn new(id: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            context: json!(CSVW_CONTEXT),
            id: Some(id.into()),
            tables,
            see_also: Vec::new(),
        }
    }

    /// Load a document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| QubeError::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Save the document as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        write_json(path.as_ref(), self)
    }

    /// Find a node by `@id`.
    pub fn node(&self, id: &str) -> Option<&RdfNode> {
        self.see_also.iter().find(|n| n.id == id)
    }

    /// Nodes having the given `@type`.
    pub fn nodes_of_type<'a>(&'a self, rdf_type: &'a str) -> impl Iterator<Item = &'a RdfNode> {
        self.see_also.iter().filter(move |n| n.has_type(rdf_type))
    }
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| QubeError::io(path, e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}

/// One table of the group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub url: String,
    #[serde(rename = "tableSchema")]
    pub table_schema: TableSchemaRef,
    #[serde(rename = "suppressOutput", default, skip_serializing_if = "is_false")]
    pub suppress_output: bool,
}

/// A table schema given inline, or the URL of a file holding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableSchemaRef {
    Inline(TableSchema),
    Reference(String),
}

impl TableSchemaRef {
    pub fn inline(&self) -> Option<&TableSchema> {
        match self {
            TableSchemaRef::Inline(schema) => Some(schema),
            TableSchemaRef::Reference(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<CsvwColumn>,
    #[serde(rename = "foreignKeys", default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(rename = "primaryKey", default, skip_serializing_if = "Vec::is_empty")]
    pub primary_key: Vec<String>,
    #[serde(rename = "aboutUrl", default, skip_serializing_if = "Option::is_none")]
    pub about_url: Option<String>,
}

impl TableSchema {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| QubeError::io(path, e))?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Columns backed by a CSV column (not virtual).
    pub fn source_columns(&self) -> impl Iterator<Item = &CsvwColumn> {
        self.columns.iter().filter(|c| !c.is_virtual)
    }
}

/// A column descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsvwColumn {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles: Option<String>,
    pub name: String,
    #[serde(rename = "virtual", default, skip_serializing_if = "is_false")]
    pub is_virtual: bool,
    #[serde(rename = "suppressOutput", default, skip_serializing_if = "is_false")]
    pub suppress_output: bool,
    #[serde(rename = "aboutUrl", default, skip_serializing_if = "Option::is_none")]
    pub about_url: Option<String>,
    #[serde(rename = "propertyUrl", default, skip_serializing_if = "Option::is_none")]
    pub property_url: Option<String>,
    #[serde(rename = "valueUrl", default, skip_serializing_if = "Option::is_none")]
    pub value_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
}

impl CsvwColumn {
    /// A column backed by a CSV column.
    pub fn source(title: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            titles: Some(title.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    /// A virtual column producing one fixed triple per row.
    pub fn virtual_triple(
        name: impl Into<String>,
        about_url: Option<String>,
        property_url: impl Into<String>,
        value_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_virtual: true,
            about_url,
            property_url: Some(property_url.into()),
            value_url: Some(value_url.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(rename = "columnReference")]
    pub column_reference: String,
    pub reference: ForeignKeyReference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyReference {
    pub resource: String,
    #[serde(rename = "columnReference")]
    pub column_reference: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A JSON-LD node: an `@id`, its types and its other properties.
///
/// Property values are either literals or `{"@id": ...}` references, alone
/// or in arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RdfNode {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(flatten)]
    pub properties: IndexMap<String, Value>,
}

impl RdfNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            types: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    pub fn with_type(mut self, rdf_type: impl Into<String>) -> Self {
        self.types.push(rdf_type.into());
        self
    }

    pub fn with_literal(mut self, property: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(property.to_string(), value.into());
        self
    }

    /// Set a literal only when there is one.
    pub fn with_optional(self, property: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.with_literal(property, value),
            None => self,
        }
    }

    pub fn with_ref(mut self, property: &str, id: impl Into<String>) -> Self {
        self.properties
            .insert(property.to_string(), json!({ "@id": id.into() }));
        self
    }

    pub fn with_optional_ref(self, property: &str, id: Option<impl Into<String>>) -> Self {
        match id {
            Some(id) => self.with_ref(property, id),
            None => self,
        }
    }

    /// Append a reference, turning the property into an array.
    pub fn push_ref(&mut self, property: &str, id: impl Into<String>) {
        let reference = json!({ "@id": id.into() });
        match self.properties.get_mut(property) {
            Some(Value::Array(items)) => items.push(reference),
            Some(single) => {
                let first = single.take();
                *single = Value::Array(vec![first, reference]);
            }
            None => {
                self.properties
                    .insert(property.to_string(), Value::Array(vec![reference]));
            }
        }
    }

    pub fn has_type(&self, rdf_type: &str) -> bool {
        self.types.iter().any(|t| t == rdf_type)
    }

    /// A string literal.
    pub fn literal(&self, property: &str) -> Option<&str> {
        match self.properties.get(property)? {
            Value::String(s) => Some(s),
            Value::Object(map) => map.get("@value").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Every string literal of a property.
    pub fn literals(&self, property: &str) -> Vec<&str> {
        match self.properties.get(property) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(s)) => vec![s.as_str()],
            _ => Vec::new(),
        }
    }

    pub fn integer(&self, property: &str) -> Option<i64> {
        self.properties.get(property)?.as_i64()
    }

    pub fn number(&self, property: &str) -> Option<f64> {
        self.properties.get(property)?.as_f64()
    }

    pub fn boolean(&self, property: &str) -> Option<bool> {
        self.properties.get(property)?.as_bool()
    }

    /// The first referenced `@id` of a property.
    pub fn reference(&self, property: &str) -> Option<&str> {
        self.references(property).into_iter().next()
    }

    /// Every referenced `@id` of a property, in order.
    pub fn references(&self, property: &str) -> Vec<&str> {
        fn id_of(value: &Value) -> Option<&str> {
            value.get("@id").and_then(Value::as_str)
        }
        match self.properties.get(property) {
            Some(Value::Array(items)) => items.iter().filter_map(id_of).collect(),
            Some(value) => id_of(value).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_references() {
        let mut node = RdfNode::new("cube.csv#structure").with_type("qb:DataStructureDefinition");
        node.push_ref("qb:component", "cube.csv#component/a");
        node.push_ref("qb:component", "cube.csv#component/b");

        assert!(node.has_type("qb:DataStructureDefinition"));
        assert_eq!(
            node.references("qb:component"),
            vec!["cube.csv#component/a", "cube.csv#component/b"]
        );
        assert_eq!(node.reference("qb:component"), Some("cube.csv#component/a"));
    }

    #[test]
    fn test_push_ref_onto_single_value() {
        let mut node = RdfNode::new("x").with_ref("p", "a");
        node.push_ref("p", "b");
        assert_eq!(node.references("p"), vec!["a", "b"]);
    }

    #[test]
    fn test_node_serializes_flat() {
        let node = RdfNode::new("x")
            .with_type("qb:DataSet")
            .with_literal("rdfs:label", "Label")
            .with_optional("rdfs:comment", None::<String>)
            .with_literal("qb:order", 3);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["@id"], "x");
        assert_eq!(json["@type"][0], "qb:DataSet");
        assert_eq!(json["rdfs:label"], "Label");
        assert!(json.get("rdfs:comment").is_none());

        let back: RdfNode = serde_json::from_value(json).unwrap();
        assert_eq!(back.integer("qb:order"), Some(3));
        assert_eq!(back.literal("rdfs:label"), Some("Label"));
    }

    #[test]
    fn test_table_schema_inline_or_reference() {
        let table: Table =
            serde_json::from_str(r#"{"url": "a.csv", "tableSchema": "a.table.json", "suppressOutput": true}"#)
                .unwrap();
        assert_eq!(table.table_schema, TableSchemaRef::Reference("a.table.json".to_string()));
        assert!(table.suppress_output);

        let table: Table =
            serde_json::from_str(r#"{"url": "b.csv", "tableSchema": {"columns": [{"name": "x", "titles": "X"}]}}"#)
                .unwrap();
        let schema = table.table_schema.inline().unwrap();
        assert_eq!(schema.columns[0].titles.as_deref(), Some("X"));
        assert!(!schema.columns[0].is_virtual);
    }
}
