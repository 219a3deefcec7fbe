//! Reading cube and code-list documents back.
//!
//! The reader never walks the document itself: it asks the fixed questions
//! of [`CubeQueries`] through a [`DocumentHandle`], which remembers every
//! answer for as long as the handle lives.

mod document_queries;
mod inspector;
mod queries;

pub use document_queries::DocumentQueries;
pub use inspector::{
    read, CodeListSummary, ComponentSummary, CubeSummary, DocumentHandle, Inspection, QueryCache,
    ReaderConfig,
};
pub use queries::{
    CatalogRecord, CodeListRecord, ColumnRecord, ComponentRecord, ConceptSchemeRecord, CubeQueries,
    MeasureShapeRecord, StructureRecord, SuppressedColumnRecord, UnitRecord,
};
