use super::draft::{AgentDraft, PromptParam};
use super::resolver::Resolver;
use super::selection::Selection;
use crate::catalog::{SchemaCache, Section, Value};
use crate::shared::ids::{ParamKey, ToolId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const TOOL_CONFIGURATION_HEADER: &str = "--- Tool Configuration ---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDeployment {
    pub tool_id: ToolId,
    #[serde(rename = "deploy_params")]
    pub deploy_values: IndexMap<ParamKey, Value>,
    #[serde(rename = "runtime_params")]
    pub runtime_values: IndexMap<ParamKey, Value>,
}

impl ToolDeployment {
    pub fn values(&self, section: Section) -> &IndexMap<ParamKey, Value> {
        match section {
            Section::Deploy => &self.deploy_values,
            Section::Runtime => &self.runtime_values,
        }
    }
}

/// Agent-creation request. Prompt params travel as definitions; their values
/// are only chosen at chat time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployPayload {
    pub name: String,
    pub model: String,
    pub instructions: String,
    pub tools: Vec<ToolDeployment>,
    #[serde(default)]
    pub prompt_params: Vec<PromptParam>,
}

impl DeployPayload {
    pub fn tool(&self, tool_id: &str) -> Option<&ToolDeployment> {
        self.tools.iter().find(|tool| tool.tool_id.as_str() == tool_id)
    }
}

/// Builds the payload from the draft and every active tool. Each section map
/// holds exactly the declared key set, visible or not. A tool whose schema
/// never loaded is sent with empty maps.
pub fn assemble_payload(
    draft: &AgentDraft,
    selection: &Selection,
    schemas: &SchemaCache,
) -> DeployPayload {
    let resolver = Resolver::new(selection, schemas);
    let tools = selection
        .active_tools()
        .map(|tool_id| {
            let section_values = |section| {
                resolver
                    .resolve_section(tool_id.as_str(), section)
                    .unwrap_or_else(|err| {
                        tracing::warn!(tool_id = %tool_id, %err, "deploying tool without schema");
                        IndexMap::new()
                    })
            };
            ToolDeployment {
                tool_id: tool_id.clone(),
                deploy_values: section_values(Section::Deploy),
                runtime_values: section_values(Section::Runtime),
            }
        })
        .collect();

    DeployPayload {
        name: draft.name.trim().to_string(),
        model: draft.model.trim().to_string(),
        instructions: draft.instructions.trim().to_string(),
        tools,
        prompt_params: draft.prompt_params.clone(),
    }
}

/// Renders the instructions the host applies: the base text plus one line per
/// tool listing its non-blank runtime values and any deploy values aimed at
/// the instructions.
pub fn compose_runtime_instructions(payload: &DeployPayload, schemas: &SchemaCache) -> String {
    let mut lines = Vec::new();
    for deployment in &payload.tools {
        let Some(tool) = schemas.get(deployment.tool_id.as_str()) else {
            continue;
        };
        let mut parts = Vec::new();
        for (key, field) in &tool.deploy_fields {
            if !field.targets_instructions() {
                continue;
            }
            if let Some(value) = deployment.deploy_values.get(key).filter(|v| !v.is_blank()) {
                parts.push(format!("{}: {}", field.label_or(key.as_str()), value.display()));
            }
        }
        for (key, value) in &deployment.runtime_values {
            if value.is_blank() {
                continue;
            }
            let label = tool
                .runtime_fields
                .get(key)
                .map(|field| field.label_or(key.as_str()))
                .unwrap_or(key.as_str());
            parts.push(format!("{label}: {}", value.display()));
        }
        if !parts.is_empty() {
            lines.push(format!("{}: {}.", tool.name, parts.join(". ")));
        }
    }

    if lines.is_empty() {
        return payload.instructions.clone();
    }
    format!(
        "{}\n\n{TOOL_CONFIGURATION_HEADER}\n{}",
        payload.instructions,
        lines.join("\n")
    )
}
