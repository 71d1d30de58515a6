use super::{
    AgentHost, AgentSummary, ChatBackend, ChatTurnRequest, ChatTurnResponse, DeployedAgent,
    ErrorEnvelope, PlatformError, ToolCatalog,
};
use crate::catalog::{ToolDefinition, ToolSummary};
use crate::config::Settings;
use crate::shared::ids::ToolId;
use crate::wizard::deploy::DeployPayload;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Blocking REST client for the platform backend (`/api/tools`,
/// `/api/agents`, `/api/chat`).
#[derive(Debug, Clone)]
pub struct HttpPlatform {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpPlatform {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.platform.base_url,
            Duration::from_secs(settings.platform.timeout_seconds),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, PlatformError> {
        let response = self
            .agent
            .get(&self.endpoint(path))
            .call()
            .map_err(map_call_error)?;
        response
            .into_json::<T>()
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))
    }

    fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PlatformError> {
        let body =
            serde_json::to_value(body).map_err(|e| PlatformError::InvalidResponse(e.to_string()))?;
        let response = self
            .agent
            .post(&self.endpoint(path))
            .send_json(body)
            .map_err(map_call_error)?;
        response
            .into_json::<T>()
            .map_err(|e| PlatformError::InvalidResponse(e.to_string()))
    }
}

fn map_call_error(err: ureq::Error) -> PlatformError {
    match err {
        ureq::Error::Status(_, response) => {
            let body = response.into_string().unwrap_or_default();
            match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => envelope.into(),
                Err(_) => PlatformError::Service {
                    code: super::error::INTERNAL_ERROR_CODE.to_string(),
                    message: if body.trim().is_empty() {
                        "request failed".to_string()
                    } else {
                        body.trim().to_string()
                    },
                },
            }
        }
        ureq::Error::Transport(transport) => PlatformError::Network(transport.to_string()),
    }
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

impl ToolCatalog for HttpPlatform {
    fn list_tools(&self) -> Result<Vec<ToolSummary>, PlatformError> {
        self.get_json("tools")
    }

    fn get_tool(&self, tool_id: &ToolId) -> Result<ToolDefinition, PlatformError> {
        self.get_json(&format!("tools/{}", segment(tool_id.as_str())))
    }
}

impl AgentHost for HttpPlatform {
    fn deploy_agent(&self, payload: &DeployPayload) -> Result<DeployedAgent, PlatformError> {
        let agent: AgentSummary = self.post_json("agents", payload)?;
        tracing::info!(name = %agent.name, version = agent.version, "agent deployed");
        Ok(agent.deployed())
    }

    fn get_agent(&self, name: &str) -> Result<AgentSummary, PlatformError> {
        self.get_json(&format!("agents/{}", segment(name)))
    }

    fn list_agents(&self) -> Result<Vec<AgentSummary>, PlatformError> {
        self.get_json("agents")
    }

    fn delete_agent(&self, name: &str) -> Result<(), PlatformError> {
        self.agent
            .delete(&self.endpoint(&format!("agents/{}", segment(name))))
            .call()
            .map_err(map_call_error)?;
        tracing::info!(name, "agent deleted");
        Ok(())
    }
}

impl ChatBackend for HttpPlatform {
    fn send_turn(&self, request: &ChatTurnRequest) -> Result<ChatTurnResponse, PlatformError> {
        self.post_json("chat", request)
    }
}
