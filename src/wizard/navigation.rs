use super::deploy::{assemble_payload, DeployPayload};
use super::draft::PromptParam;
use super::error::WizardError;
use super::resolver::Resolver;
use super::state::WizardState;
use crate::catalog::{Section, Value};
use crate::shared::ids::ToolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    SelectTools,
    ConfigureParams,
    ConfigureAgent,
    Deploying,
    Chatting,
}

pub const ALL_WIZARD_STEPS: [WizardStep; 5] = [
    WizardStep::SelectTools,
    WizardStep::ConfigureParams,
    WizardStep::ConfigureAgent,
    WizardStep::Deploying,
    WizardStep::Chatting,
];

impl WizardStep {
    pub fn as_str(self) -> &'static str {
        match self {
            WizardStep::SelectTools => "select_tools",
            WizardStep::ConfigureParams => "configure_params",
            WizardStep::ConfigureAgent => "configure_agent",
            WizardStep::Deploying => "deploying",
            WizardStep::Chatting => "chatting",
        }
    }

    /// Steps where the draft and selection may still change.
    pub fn is_editable(self) -> bool {
        matches!(
            self,
            WizardStep::SelectTools | WizardStep::ConfigureParams | WizardStep::ConfigureAgent
        )
    }

    fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::ConfigureParams => Some(WizardStep::SelectTools),
            WizardStep::ConfigureAgent => Some(WizardStep::ConfigureParams),
            _ => None,
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardAction {
    Next,
    Back,
    GoTo(WizardStep),
    ActivateTool(ToolId),
    DeactivateTool(ToolId),
    SetOverride {
        tool_id: ToolId,
        section: Section,
        key: String,
        value: Value,
    },
    ToggleOption {
        tool_id: ToolId,
        section: Section,
        key: String,
        option: String,
    },
    SetAgentName(String),
    SetModel(String),
    SetInstructions(String),
    AddPromptParam(PromptParam),
    UpdatePromptParam { key: String, param: PromptParam },
    RemovePromptParam(String),
    UpdateAgent,
    NewAgent,
}

impl WizardAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardAction::Next => "next",
            WizardAction::Back => "back",
            WizardAction::GoTo(_) => "go_to",
            WizardAction::ActivateTool(_) => "activate_tool",
            WizardAction::DeactivateTool(_) => "deactivate_tool",
            WizardAction::SetOverride { .. } => "set_override",
            WizardAction::ToggleOption { .. } => "toggle_option",
            WizardAction::SetAgentName(_) => "set_agent_name",
            WizardAction::SetModel(_) => "set_model",
            WizardAction::SetInstructions(_) => "set_instructions",
            WizardAction::AddPromptParam(_) => "add_prompt_param",
            WizardAction::UpdatePromptParam { .. } => "update_prompt_param",
            WizardAction::RemovePromptParam(_) => "remove_prompt_param",
            WizardAction::UpdateAgent => "update_agent",
            WizardAction::NewAgent => "new_agent",
        }
    }

    fn edits_draft(&self) -> bool {
        !matches!(
            self,
            WizardAction::Next
                | WizardAction::Back
                | WizardAction::GoTo(_)
                | WizardAction::UpdateAgent
                | WizardAction::NewAgent
        )
    }
}

/// Side effect the caller must run after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEffect {
    None,
    /// Load these schemas into the cache (`WizardState::fetch_schemas`).
    FetchSchemas(Vec<ToolId>),
    /// Send this payload to the host, then call `WizardState::complete_deploy`.
    Deploy(DeployPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardTransition {
    pub effect: WizardEffect,
    pub feedback: Option<String>,
}

impl WizardTransition {
    fn no_op(feedback: Option<String>) -> Self {
        Self {
            effect: WizardEffect::None,
            feedback,
        }
    }
}

/// Applies one action. Every check runs before the state is touched, so a
/// rejected action leaves the wizard exactly as it was.
pub fn wizard_transition(
    state: &mut WizardState,
    action: WizardAction,
) -> Result<WizardTransition, WizardError> {
    let step = state.step;
    if step == WizardStep::Deploying {
        return Err(WizardError::DeployInFlight);
    }
    if action.edits_draft() && !step.is_editable() {
        return Err(WizardError::invalid_transition(step, &action));
    }

    match action {
        WizardAction::Next => advance(state),
        WizardAction::Back => {
            let target = step
                .previous()
                .ok_or_else(|| WizardError::invalid_transition(step, &WizardAction::Back))?;
            state.step = target;
            tracing::debug!(from = %step, to = %target, "wizard moved back");
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::GoTo(target) => {
            if !step.is_editable() || target >= step {
                return Err(WizardError::invalid_transition(
                    step,
                    &WizardAction::GoTo(target),
                ));
            }
            state.step = target;
            tracing::debug!(from = %step, to = %target, "wizard jumped back");
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::ActivateTool(tool_id) => {
            let fetch = step != WizardStep::SelectTools && !state.schemas.contains(tool_id.as_str());
            let added = state.selection.activate(tool_id.clone());
            let feedback = added.then(|| format!("Selected {tool_id}."));
            if fetch {
                return Ok(WizardTransition {
                    effect: WizardEffect::FetchSchemas(vec![tool_id]),
                    feedback,
                });
            }
            Ok(WizardTransition::no_op(feedback))
        }
        WizardAction::DeactivateTool(tool_id) => {
            let removed = state.selection.deactivate(tool_id.as_str());
            Ok(WizardTransition::no_op(
                removed.then(|| format!("Removed {tool_id}.")),
            ))
        }
        WizardAction::SetOverride {
            tool_id,
            section,
            key,
            value,
        } => {
            state
                .selection
                .set_override(&state.schemas, tool_id.as_str(), section, &key, value)?;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::ToggleOption {
            tool_id,
            section,
            key,
            option,
        } => {
            state
                .selection
                .toggle_option(&state.schemas, tool_id.as_str(), section, &key, &option)?;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::SetAgentName(name) => {
            state.draft.name = name;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::SetModel(model) => {
            state.draft.model = model;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::SetInstructions(instructions) => {
            state.draft.instructions = instructions;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::AddPromptParam(param) => {
            state.draft.add_prompt_param(param)?;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::UpdatePromptParam { key, param } => {
            state.draft.update_prompt_param(&key, param)?;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::RemovePromptParam(key) => {
            state.draft.remove_prompt_param(&key)?;
            Ok(WizardTransition::no_op(None))
        }
        WizardAction::UpdateAgent => {
            if step != WizardStep::Chatting {
                return Err(WizardError::invalid_transition(
                    step,
                    &WizardAction::UpdateAgent,
                ));
            }
            state.begin_update();
            Ok(WizardTransition::no_op(Some(
                "Editing the deployed agent.".to_string(),
            )))
        }
        WizardAction::NewAgent => {
            state.reset();
            Ok(WizardTransition::no_op(Some("Started a new agent.".to_string())))
        }
    }
}

fn advance(state: &mut WizardState) -> Result<WizardTransition, WizardError> {
    match state.step {
        WizardStep::SelectTools => {
            let missing: Vec<ToolId> = state
                .selection
                .active_tools()
                .filter(|id| !state.schemas.contains(id.as_str()))
                .cloned()
                .collect();
            state.step = WizardStep::ConfigureParams;
            tracing::debug!(tools = state.selection.len(), "configuring tool parameters");
            Ok(WizardTransition {
                effect: if missing.is_empty() {
                    WizardEffect::None
                } else {
                    WizardEffect::FetchSchemas(missing)
                },
                feedback: None,
            })
        }
        WizardStep::ConfigureParams => {
            let missing = Resolver::new(&state.selection, &state.schemas).missing_required();
            if let Some(first) = missing.into_iter().next() {
                return Err(WizardError::MissingRequiredField {
                    tool_id: first.tool_id.to_string(),
                    section: first.section,
                    key: first.key.to_string(),
                });
            }
            state.step = WizardStep::ConfigureAgent;
            Ok(WizardTransition::no_op(None))
        }
        WizardStep::ConfigureAgent => {
            state.draft.validate_for_deploy()?;
            let payload = assemble_payload(&state.draft, &state.selection, &state.schemas);
            state.step = WizardStep::Deploying;
            tracing::info!(name = %payload.name, tools = payload.tools.len(), "deploying agent");
            Ok(WizardTransition {
                effect: WizardEffect::Deploy(payload),
                feedback: None,
            })
        }
        step @ (WizardStep::Deploying | WizardStep::Chatting) => Err(
            WizardError::invalid_transition(step, &WizardAction::Next),
        ),
    }
}
