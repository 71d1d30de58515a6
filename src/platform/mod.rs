//! Boundaries to the catalog backend and the agent-hosting platform.
//!
//! The engine only sees these traits and the flat request/response shapes
//! below; `http` provides the REST implementation.

pub mod error;
pub mod http;

use crate::catalog::{ToolDefinition, ToolSummary};
use crate::shared::ids::ToolId;
use crate::wizard::deploy::DeployPayload;
use crate::wizard::draft::PromptParam;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use error::{ErrorBody, ErrorEnvelope, PlatformError};
pub use http::HttpPlatform;

pub trait ToolCatalog: Sync {
    fn list_tools(&self) -> Result<Vec<ToolSummary>, PlatformError>;
    fn get_tool(&self, tool_id: &ToolId) -> Result<ToolDefinition, PlatformError>;
}

pub trait AgentHost {
    fn deploy_agent(&self, payload: &DeployPayload) -> Result<DeployedAgent, PlatformError>;
    fn get_agent(&self, name: &str) -> Result<AgentSummary, PlatformError>;
    fn list_agents(&self) -> Result<Vec<AgentSummary>, PlatformError>;
    fn delete_agent(&self, name: &str) -> Result<(), PlatformError>;
}

pub trait ChatBackend {
    fn send_turn(&self, request: &ChatTurnRequest) -> Result<ChatTurnResponse, PlatformError>;
}

/// Result of a successful deploy. Opaque to the engine beyond display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedAgent {
    pub name: String,
    pub id: String,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub prompt_params: Vec<PromptParam>,
}

impl AgentSummary {
    pub fn deployed(&self) -> DeployedAgent {
        DeployedAgent {
            name: self.name.clone(),
            id: self.id.clone(),
            version: self.version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurnRequest {
    pub agent_name: String,
    pub message: String,
    #[serde(
        rename = "previous_response_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub continuation_token: Option<String>,
    #[serde(default)]
    pub param_values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    #[serde(default)]
    pub text: String,
    #[serde(rename = "response_id", alias = "continuation_token")]
    pub continuation_token: String,
    #[serde(default)]
    pub tool_calls: Vec<String>,
}
