pub mod cache;
pub mod file;
pub mod schema;
pub mod tool;

pub use cache::{FetchReport, SchemaCache};
pub use file::{CatalogError, FileCatalog};
pub use schema::{
    check_section, FieldSchema, FieldType, ParamField, Section, Value, VisibleWhen, ALL_SECTIONS,
    INSTRUCTIONS_TARGET,
};
pub use tool::{ToolDefinition, ToolKind, ToolSource, ToolSummary};
