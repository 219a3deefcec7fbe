//! RDF vocabulary terms used in cube documents.
//!
//! Terms are written as compact IRIs; the prefixes are the ones predefined
//! by the CSV-W context.

pub const CSVW_CONTEXT: &str = "http://www.w3.org/ns/csvw";

pub const RDF_TYPE: &str = "rdf:type";
pub const RDFS_LABEL: &str = "rdfs:label";
pub const RDFS_COMMENT: &str = "rdfs:comment";
pub const RDFS_RANGE: &str = "rdfs:range";
pub const RDFS_SUB_PROPERTY_OF: &str = "rdfs:subPropertyOf";
pub const RDFS_IS_DEFINED_BY: &str = "rdfs:isDefinedBy";

pub const QB_DATA_SET: &str = "qb:DataSet";
pub const QB_DATA_STRUCTURE_DEFINITION: &str = "qb:DataStructureDefinition";
pub const QB_COMPONENT_SPECIFICATION: &str = "qb:ComponentSpecification";
pub const QB_DIMENSION_PROPERTY: &str = "qb:DimensionProperty";
pub const QB_ATTRIBUTE_PROPERTY: &str = "qb:AttributeProperty";
pub const QB_MEASURE_PROPERTY: &str = "qb:MeasureProperty";
pub const QB_CODED_PROPERTY: &str = "qb:CodedProperty";
pub const QB_OBSERVATION: &str = "qb:Observation";
pub const QB_SLICE: &str = "qb:Slice";
pub const QB_SLICE_KEY: &str = "qb:SliceKey";

pub const QB_STRUCTURE: &str = "qb:structure";
pub const QB_COMPONENT: &str = "qb:component";
pub const QB_ORDER: &str = "qb:order";
pub const QB_DIMENSION: &str = "qb:dimension";
pub const QB_ATTRIBUTE: &str = "qb:attribute";
pub const QB_MEASURE: &str = "qb:measure";
pub const QB_COMPONENT_REQUIRED: &str = "qb:componentRequired";
pub const QB_COMPONENT_ATTACHMENT: &str = "qb:componentAttachment";
pub const QB_CODE_LIST: &str = "qb:codeList";
pub const QB_MEASURE_TYPE: &str = "qb:measureType";
pub const QB_DATA_SET_PROPERTY: &str = "qb:dataSet";
pub const QB_OBSERVATION_PROPERTY: &str = "qb:observation";
pub const QB_SLICE_KEY_PROPERTY: &str = "qb:sliceKey";
pub const QB_SLICE_STRUCTURE: &str = "qb:sliceStructure";
pub const QB_COMPONENT_PROPERTY: &str = "qb:componentProperty";

pub const SDMX_UNIT_MEASURE: &str = "http://purl.org/linked-data/sdmx/2009/attribute#unitMeasure";
pub const SDMX_OBS_STATUS: &str = "http://purl.org/linked-data/sdmx/2009/attribute#obsStatus";

pub const SKOS_CONCEPT_SCHEME: &str = "skos:ConceptScheme";
pub const SKOS_CONCEPT: &str = "skos:Concept";
pub const SKOS_NOTATION: &str = "skos:notation";
pub const SKOS_BROADER: &str = "skos:broader";
pub const SKOS_IN_SCHEME: &str = "skos:inScheme";
pub const SKOS_PREF_LABEL: &str = "skos:prefLabel";
pub const UI_SORT_PRIORITY: &str = "http://www.w3.org/ns/ui#sortPriority";

pub const QUDT_UNIT: &str = "http://qudt.org/schema/qudt/Unit";
pub const QUDT_IS_SCALING_OF: &str = "http://qudt.org/schema/qudt/isScalingOf";
pub const QUDT_SCALING_FACTOR: &str = "http://qudt.org/schema/qudt/scalingFactor";
pub const QUDT_CONVERSION_MULTIPLIER: &str = "http://qudt.org/schema/qudt/conversionMultiplier";
pub const QUDT_HAS_QUANTITY_KIND: &str = "http://qudt.org/schema/qudt/hasQuantityKind";

pub const DCAT_DATASET: &str = "dcat:Dataset";
pub const DCAT_KEYWORD: &str = "dcat:keyword";
pub const DCAT_THEME: &str = "dcat:theme";
pub const DCAT_LANDING_PAGE: &str = "dcat:landingPage";
pub const DCAT_CONTACT_POINT: &str = "dcat:contactPoint";
pub const DCTERMS_TITLE: &str = "dcterms:title";
pub const DCTERMS_IDENTIFIER: &str = "dcterms:identifier";
pub const DCTERMS_DESCRIPTION: &str = "dcterms:description";
pub const DCTERMS_ABSTRACT: &str = "dcterms:abstract";
pub const DCTERMS_CREATOR: &str = "dcterms:creator";
pub const DCTERMS_PUBLISHER: &str = "dcterms:publisher";
pub const DCTERMS_LICENSE: &str = "dcterms:license";
pub const DCTERMS_ISSUED: &str = "dcterms:issued";
pub const DCTERMS_MODIFIED: &str = "dcterms:modified";
pub const DCTERMS_SOURCE: &str = "dcterms:source";
