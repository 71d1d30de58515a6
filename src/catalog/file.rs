use super::tool::{ToolDefinition, ToolSummary};
use crate::config::Settings;
use crate::platform::{PlatformError, ToolCatalog};
use crate::shared::errors::ErrorKind;
use crate::shared::ids::ToolId;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog document {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("catalog tool `{tool_id}` is invalid: {reason}")]
    InvalidTool { tool_id: String, reason: String },
    #[error("catalog declares tool `{tool_id}` more than once")]
    DuplicateTool { tool_id: String },
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Read { .. } => ErrorKind::NotFound,
            Self::Parse { .. } | Self::InvalidTool { .. } | Self::DuplicateTool { .. } => {
                ErrorKind::Validation
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    tools: Vec<ToolDefinition>,
}

/// Catalog served from a local `tools:` document, loaded once.
#[derive(Debug, Clone, Default)]
pub struct FileCatalog {
    tools: Vec<ToolDefinition>,
}

impl FileCatalog {
    /// Reads a YAML or JSON catalog document.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let document: CatalogDocument =
            serde_yaml::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let catalog = Self::from_definitions(document.tools)?;
        tracing::info!(
            path = %path.display(),
            tools = catalog.tools.len(),
            "loaded tool catalog"
        );
        Ok(catalog)
    }

    /// Loads `catalog_file` when the settings name one.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>, CatalogError> {
        settings
            .catalog_file
            .as_deref()
            .map(Self::from_path)
            .transpose()
    }

    pub fn from_definitions(tools: Vec<ToolDefinition>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.id.clone()) {
                return Err(CatalogError::DuplicateTool {
                    tool_id: tool.id.to_string(),
                });
            }
            tool.validate()
                .map_err(|reason| CatalogError::InvalidTool {
                    tool_id: tool.id.to_string(),
                    reason,
                })?;
        }
        Ok(Self { tools })
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl ToolCatalog for FileCatalog {
    fn list_tools(&self) -> Result<Vec<ToolSummary>, PlatformError> {
        Ok(self.tools.iter().map(ToolDefinition::summary).collect())
    }

    fn get_tool(&self, tool_id: &ToolId) -> Result<ToolDefinition, PlatformError> {
        self.tools
            .iter()
            .find(|tool| tool.id == *tool_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("Tool '{tool_id}' not found in catalog")))
    }
}
