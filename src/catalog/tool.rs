use super::schema::{check_section, FieldSchema, ParamField, Section};
use crate::shared::ids::ToolId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Openapi,
    Mcp,
    Builtin,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Openapi => "openapi",
            Self::Mcp => "mcp",
            Self::Builtin => "builtin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolSource {
    #[default]
    Builtin,
    Custom,
}

/// Catalog list entry; carries no field schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub id: ToolId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ToolKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source: ToolSource,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub id: ToolId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ToolKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub source: ToolSource,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(
        rename = "deploy_params",
        alias = "deploy_fields",
        alias = "deployFields",
        default
    )]
    pub deploy_fields: FieldSchema,
    #[serde(
        rename = "runtime_params",
        alias = "runtime_fields",
        alias = "runtimeFields",
        default
    )]
    pub runtime_fields: FieldSchema,
}

impl ToolDefinition {
    pub fn fields(&self, section: Section) -> &FieldSchema {
        match section {
            Section::Deploy => &self.deploy_fields,
            Section::Runtime => &self.runtime_fields,
        }
    }

    pub fn field(&self, section: Section, key: &str) -> Option<&ParamField> {
        self.fields(section).get(key)
    }

    pub fn is_builtin(&self) -> bool {
        self.source == ToolSource::Builtin
    }

    pub fn summary(&self) -> ToolSummary {
        ToolSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            kind: self.kind,
            category: self.category.clone(),
            source: self.source,
            icon: self.icon.clone(),
        }
    }

    /// Rejects malformed schema references in either section.
    pub fn validate(&self) -> Result<(), String> {
        check_section(Section::Deploy, &self.deploy_fields)?;
        check_section(Section::Runtime, &self.runtime_fields)
    }
}
