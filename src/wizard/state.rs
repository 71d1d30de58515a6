use super::draft::{AgentDraft, PromptParam};
use super::error::WizardError;
use super::navigation::{wizard_transition, WizardAction, WizardEffect, WizardStep, WizardTransition};
use super::resolver::Resolver;
use super::selection::Selection;
use crate::catalog::{FetchReport, SchemaCache, ToolDefinition, ToolSummary};
use crate::chat::ChatSession;
use crate::platform::{AgentHost, AgentSummary, DeployedAgent, PlatformError, ToolCatalog};
use crate::shared::ids::ToolId;
use std::collections::HashSet;

pub const DEFAULT_MODEL: &str = "gpt-4.1";

/// What running a `WizardEffect` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    None,
    Fetched(FetchReport),
    Deployed(DeployedAgent),
}

/// Everything one builder session owns. Callers hold it and pass it by
/// reference; there is no ambient wizard state.
#[derive(Debug, Clone)]
pub struct WizardState {
    pub(crate) step: WizardStep,
    pub(crate) draft: AgentDraft,
    pub(crate) selection: Selection,
    pub(crate) schemas: SchemaCache,
    default_model: String,
    deployed: Option<DeployedAgent>,
    deployed_prompt_params: Vec<PromptParam>,
    chat: Option<ChatSession>,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL)
    }
}

impl WizardState {
    pub fn new(default_model: &str) -> Self {
        Self {
            step: WizardStep::SelectTools,
            draft: AgentDraft::new(default_model),
            selection: Selection::default(),
            schemas: SchemaCache::default(),
            default_model: default_model.to_string(),
            deployed: None,
            deployed_prompt_params: Vec::new(),
            chat: None,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &AgentDraft {
        &self.draft
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.selection, &self.schemas)
    }

    pub fn deployed(&self) -> Option<&DeployedAgent> {
        self.deployed.as_ref()
    }

    pub fn deployed_prompt_params(&self) -> &[PromptParam] {
        &self.deployed_prompt_params
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        self.chat.as_ref()
    }

    pub fn chat_mut(&mut self) -> Option<&mut ChatSession> {
        self.chat.as_mut()
    }

    pub fn apply(&mut self, action: WizardAction) -> Result<WizardTransition, WizardError> {
        wizard_transition(self, action)
    }

    /// Loads schemas for every active tool that has none yet.
    pub fn fetch_schemas<C>(&mut self, catalog: &C) -> FetchReport
    where
        C: ToolCatalog + ?Sized,
    {
        let ids: Vec<ToolId> = self.selection.active_tools().cloned().collect();
        self.load_schemas(catalog, &ids)
    }

    /// Tools the catalog no longer knows are deactivated along with their
    /// overrides.
    fn load_schemas<C>(&mut self, catalog: &C, ids: &[ToolId]) -> FetchReport
    where
        C: ToolCatalog + ?Sized,
    {
        let report = self.schemas.fetch_missing(catalog, ids);
        for tool_id in &report.removed {
            if self.selection.deactivate(tool_id.as_str()) {
                tracing::info!(tool_id = %tool_id, "deleted tool dropped from selection");
            }
        }
        report
    }

    /// Stores a schema obtained outside `fetch_schemas`.
    pub fn insert_schema(&mut self, tool: ToolDefinition) -> Result<(), WizardError> {
        let tool_id = tool.id.to_string();
        self.schemas
            .insert(tool)
            .map_err(|reason| WizardError::InvalidSchema { tool_id, reason })
    }

    /// Runs a transition's side effect against the platform. Deploy effects are
    /// completed here as well.
    pub fn run_effect<P>(
        &mut self,
        platform: &P,
        effect: WizardEffect,
    ) -> Result<EffectOutcome, WizardError>
    where
        P: ToolCatalog + AgentHost + ?Sized,
    {
        match effect {
            WizardEffect::None => Ok(EffectOutcome::None),
            WizardEffect::FetchSchemas(ids) => {
                Ok(EffectOutcome::Fetched(self.load_schemas(platform, &ids)))
            }
            WizardEffect::Deploy(payload) => {
                let result = platform.deploy_agent(&payload);
                self.complete_deploy(result)
                    .cloned()
                    .map(EffectOutcome::Deployed)
            }
        }
    }

    /// Validates, deploys and completes in one call from `ConfigureAgent`.
    pub fn deploy_with<H>(&mut self, host: &H) -> Result<DeployedAgent, WizardError>
    where
        H: AgentHost + ?Sized,
    {
        if self.step != WizardStep::ConfigureAgent {
            return Err(WizardError::invalid_transition(self.step, &WizardAction::Next));
        }
        let transition = self.apply(WizardAction::Next)?;
        let WizardEffect::Deploy(payload) = transition.effect else {
            return Err(WizardError::invalid_transition(self.step, &WizardAction::Next));
        };
        let result = host.deploy_agent(&payload);
        self.complete_deploy(result).cloned()
    }

    /// Finishes the in-flight deploy. Success moves to `Chatting` keeping only
    /// the deployed record; failure returns to `ConfigureAgent` with the draft
    /// untouched.
    pub fn complete_deploy(
        &mut self,
        result: Result<DeployedAgent, PlatformError>,
    ) -> Result<&DeployedAgent, WizardError> {
        if self.step != WizardStep::Deploying {
            return Err(WizardError::InvalidTransition {
                step: self.step,
                action: "complete_deploy",
            });
        }
        match result {
            Ok(agent) => {
                tracing::info!(name = %agent.name, version = agent.version, "deploy succeeded");
                let prompt_params = std::mem::take(&mut self.draft.prompt_params);
                self.draft = AgentDraft::new(&self.default_model);
                self.selection.clear();
                Ok(self.enter_chat(agent, prompt_params))
            }
            Err(err) => {
                tracing::warn!(%err, "deploy failed");
                self.step = WizardStep::ConfigureAgent;
                Err(err.into())
            }
        }
    }

    /// Opens a chat with an existing agent, skipping the build steps.
    pub fn resume_agent(&mut self, agent: AgentSummary) -> Result<&DeployedAgent, WizardError> {
        if self.step == WizardStep::Deploying {
            return Err(WizardError::DeployInFlight);
        }
        self.draft = AgentDraft::new(&self.default_model);
        self.selection.clear();
        tracing::info!(name = %agent.name, version = agent.version, "resuming agent");
        let deployed = agent.deployed();
        Ok(self.enter_chat(deployed, agent.prompt_params))
    }

    /// Looks an agent up by name and resumes it. On NotFound the wizard stays
    /// where it was.
    pub fn resume_with<H>(&mut self, host: &H, name: &str) -> Result<&DeployedAgent, WizardError>
    where
        H: AgentHost + ?Sized,
    {
        if self.step == WizardStep::Deploying {
            return Err(WizardError::DeployInFlight);
        }
        let agent = host.get_agent(name)?;
        self.resume_agent(agent)
    }

    /// Deletes an agent upstream. Deleting the agent currently in chat starts
    /// a new agent.
    pub fn delete_agent_with<H>(&mut self, host: &H, name: &str) -> Result<(), WizardError>
    where
        H: AgentHost + ?Sized,
    {
        if self.step == WizardStep::Deploying {
            return Err(WizardError::DeployInFlight);
        }
        host.delete_agent(name)?;
        if self.deployed.as_ref().is_some_and(|agent| agent.name == name) {
            tracing::info!(name, "active agent deleted, starting over");
            self.reset();
        }
        Ok(())
    }

    /// Drops selection entries and cached schemas for tools the catalog no
    /// longer lists. Returns the removed ids.
    pub fn sync_catalog(&mut self, tools: &[ToolSummary]) -> Vec<ToolId> {
        let listed: HashSet<&str> = tools.iter().map(|tool| tool.id.as_str()).collect();
        let removed = self.selection.retain(|id| listed.contains(id.as_str()));
        self.schemas.retain(|id| listed.contains(id.as_str()));
        for tool_id in &removed {
            tracing::info!(tool_id = %tool_id, "tool removed upstream");
        }
        removed
    }

    fn enter_chat(&mut self, agent: DeployedAgent, prompt_params: Vec<PromptParam>) -> &DeployedAgent {
        self.chat = Some(ChatSession::new(&agent.name, prompt_params.clone()));
        self.deployed_prompt_params = prompt_params;
        self.step = WizardStep::Chatting;
        self.deployed.insert(agent)
    }

    pub(crate) fn begin_update(&mut self) {
        let deployed = self.deployed.take();
        let carried = std::mem::take(&mut self.deployed_prompt_params);
        self.chat = None;
        if let Some(agent) = deployed {
            self.draft.name = agent.name;
        }
        if self.draft.prompt_params.is_empty() {
            self.draft.prompt_params = carried;
        }
        self.step = WizardStep::SelectTools;
    }

    pub(crate) fn reset(&mut self) {
        self.step = WizardStep::SelectTools;
        self.draft = AgentDraft::new(&self.default_model);
        self.selection.clear();
        self.schemas.clear();
        self.deployed = None;
        self.deployed_prompt_params.clear();
        self.chat = None;
    }
}
