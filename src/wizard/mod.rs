//! Agent builder wizard: tool selection, parameter configuration, agent
//! settings, deploy, and the hand-off into chat.

pub mod deploy;
pub mod draft;
pub mod error;
pub mod navigation;
pub mod resolver;
pub mod selection;
pub mod state;

pub use deploy::{
    assemble_payload, compose_runtime_instructions, DeployPayload, ToolDeployment,
    TOOL_CONFIGURATION_HEADER,
};
pub use draft::{AgentDraft, PromptParam, PromptParamType};
pub use error::WizardError;
pub use navigation::{
    wizard_transition, WizardAction, WizardEffect, WizardStep, WizardTransition, ALL_WIZARD_STEPS,
};
pub use resolver::{FieldView, MissingField, Resolver};
pub use selection::{Selection, ToolOverrides};
pub use state::{EffectOutcome, WizardState, DEFAULT_MODEL};
