use agentwright::catalog::{Section, ToolDefinition, ToolSummary, Value};
use agentwright::platform::{
    AgentHost, AgentSummary, DeployedAgent, PlatformError, ToolCatalog,
};
use agentwright::shared::errors::ErrorKind;
use agentwright::shared::ids::{ParamKey, ToolId};
use agentwright::wizard::{
    assemble_payload, DeployPayload, EffectOutcome, PromptParam, WizardAction, WizardEffect, WizardError,
    WizardState, WizardStep,
};
use std::sync::Mutex;

const WEATHER: &str = r#"{
    "id": "weather",
    "name": "Weather",
    "type": "openapi",
    "deploy_params": {
        "auth_type": {"type": "select", "default": "anonymous",
                      "options": ["anonymous", "project_connection", "managed_identity"]},
        "project_connection_id": {"label": "Connection", "required": true, "default": "",
                      "visible_when": {"field": "auth_type", "value": "project_connection"}}
    },
    "runtime_params": {
        "units": {"type": "select", "default": "metric", "options": ["metric", "imperial"]}
    }
}"#;

const JOKES: &str = r#"{
    "id": "jokes",
    "name": "Jokes",
    "type": "openapi",
    "runtime_params": {"category": {"label": "Joke category", "default": "tech"}}
}"#;

fn definition(raw: &str) -> ToolDefinition {
    serde_json::from_str(raw).expect("tool definition")
}

fn tool_id(raw: &str) -> ToolId {
    ToolId::parse(raw).expect("tool id")
}

#[derive(Default)]
struct StubPlatform {
    tools: Vec<ToolDefinition>,
    agents: Vec<AgentSummary>,
    deploy_error: Mutex<Option<PlatformError>>,
    deployed: Mutex<Vec<DeployPayload>>,
    deleted: Mutex<Vec<String>>,
    catalog_down: Mutex<bool>,
}

impl StubPlatform {
    fn with_tools() -> Self {
        Self {
            tools: vec![definition(WEATHER), definition(JOKES)],
            ..Self::default()
        }
    }
}

impl ToolCatalog for StubPlatform {
    fn list_tools(&self) -> Result<Vec<ToolSummary>, PlatformError> {
        Ok(self.tools.iter().map(ToolDefinition::summary).collect())
    }

    fn get_tool(&self, tool_id: &ToolId) -> Result<ToolDefinition, PlatformError> {
        if *self.catalog_down.lock().expect("lock") {
            return Err(PlatformError::Network("connection refused".to_string()));
        }
        self.tools
            .iter()
            .find(|tool| &tool.id == tool_id)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("Tool '{tool_id}' not found")))
    }
}

impl AgentHost for StubPlatform {
    fn deploy_agent(&self, payload: &DeployPayload) -> Result<DeployedAgent, PlatformError> {
        if let Some(err) = self.deploy_error.lock().expect("lock").take() {
            return Err(err);
        }
        let mut deployed = self.deployed.lock().expect("lock");
        deployed.push(payload.clone());
        Ok(DeployedAgent {
            name: payload.name.clone(),
            id: format!("{}:{}", payload.name, deployed.len()),
            version: deployed.len() as u64,
        })
    }

    fn get_agent(&self, name: &str) -> Result<AgentSummary, PlatformError> {
        self.agents
            .iter()
            .find(|agent| agent.name == name)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(format!("Agent '{name}' not found")))
    }

    fn list_agents(&self) -> Result<Vec<AgentSummary>, PlatformError> {
        Ok(self.agents.clone())
    }

    fn delete_agent(&self, name: &str) -> Result<(), PlatformError> {
        self.get_agent(name)?;
        self.deleted.lock().expect("lock").push(name.to_string());
        Ok(())
    }
}

fn set_deploy(key: &str, value: &str) -> WizardAction {
    WizardAction::SetOverride {
        tool_id: tool_id("weather"),
        section: Section::Deploy,
        key: key.to_string(),
        value: Value::from(value),
    }
}

/// Activates weather and moves to ConfigureParams with its schema loaded.
fn configuring_weather(platform: &StubPlatform) -> WizardState {
    let mut state = WizardState::default();
    state
        .apply(WizardAction::ActivateTool(tool_id("weather")))
        .expect("activate");
    let transition = state.apply(WizardAction::Next).expect("to params");
    assert_eq!(
        transition.effect,
        WizardEffect::FetchSchemas(vec![tool_id("weather")])
    );
    state.run_effect(platform, transition.effect).expect("fetch");
    assert!(state.schemas().contains("weather"));
    state
}

fn ready_to_deploy(state: &mut WizardState) {
    state
        .apply(WizardAction::SetAgentName("bot-1".to_string()))
        .expect("name");
    state
        .apply(WizardAction::SetInstructions("You are helpful".to_string()))
        .expect("instructions");
}

#[test]
fn hidden_field_resolves_and_is_still_emitted() {
    let platform = StubPlatform::with_tools();
    let mut state = configuring_weather(&platform);

    let resolver = state.resolver();
    assert_eq!(
        resolver.is_visible("weather", Section::Deploy, "project_connection_id"),
        Ok(false)
    );
    assert_eq!(
        resolver.resolve("weather", Section::Deploy, "project_connection_id"),
        Ok(Value::from(""))
    );
    let payload = assemble_payload(state.draft(), state.selection(), state.schemas());
    let weather = payload.tool("weather").expect("weather entry");
    assert_eq!(
        weather.deploy_values.get("project_connection_id"),
        Some(&Value::from(""))
    );

    state
        .apply(set_deploy("auth_type", "project_connection"))
        .expect("set auth");
    assert_eq!(
        state
            .resolver()
            .is_visible("weather", Section::Deploy, "project_connection_id"),
        Ok(true)
    );
}

#[test]
fn required_hidden_field_blocks_configure_params() {
    let platform = StubPlatform::with_tools();
    let mut state = configuring_weather(&platform);

    let err = state.apply(WizardAction::Next).expect_err("blocked");
    assert_eq!(
        err,
        WizardError::MissingRequiredField {
            tool_id: "weather".to_string(),
            section: Section::Deploy,
            key: "project_connection_id".to_string(),
        }
    );
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(state.step(), WizardStep::ConfigureParams);

    state
        .apply(set_deploy("project_connection_id", "conn-1"))
        .expect("set connection");
    state.apply(WizardAction::Next).expect("advance");
    assert_eq!(state.step(), WizardStep::ConfigureAgent);
}

#[test]
fn override_of_undeclared_field_is_a_schema_error() {
    let platform = StubPlatform::with_tools();
    let mut state = configuring_weather(&platform);
    let err = state
        .apply(WizardAction::SetOverride {
            tool_id: tool_id("weather"),
            section: Section::Runtime,
            key: "auth_type".to_string(),
            value: Value::from("x"),
        })
        .expect_err("undeclared runtime key");
    assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn blank_agent_name_blocks_deploy_until_set() {
    let mut state = WizardState::default();
    state.apply(WizardAction::Next).expect("no tools is fine");
    state.apply(WizardAction::Next).expect("nothing required");
    assert_eq!(state.step(), WizardStep::ConfigureAgent);
    state
        .apply(WizardAction::SetInstructions("You are helpful".to_string()))
        .expect("instructions");

    let err = state.apply(WizardAction::Next).expect_err("blank name");
    assert_eq!(err, WizardError::BlankAgentField { field: "name" });
    assert_eq!(state.step(), WizardStep::ConfigureAgent);

    state
        .apply(WizardAction::SetAgentName("bot-1".to_string()))
        .expect("name");
    let transition = state.apply(WizardAction::Next).expect("deploy");
    assert_eq!(state.step(), WizardStep::Deploying);
    let WizardEffect::Deploy(payload) = transition.effect else {
        panic!("expected deploy effect");
    };
    assert_eq!(payload.name, "bot-1");
    assert!(payload.tools.is_empty());
}

#[test]
fn failed_deploy_returns_to_configure_agent_with_draft_intact() {
    let platform = StubPlatform::with_tools();
    *platform.deploy_error.lock().expect("lock") = Some(PlatformError::Service {
        code: "AZURE_SERVICE_ERROR".to_string(),
        message: "quota exceeded".to_string(),
    });
    let mut state = configuring_weather(&platform);
    state
        .apply(set_deploy("project_connection_id", "conn-1"))
        .expect("set connection");
    state.apply(WizardAction::Next).expect("to agent");
    ready_to_deploy(&mut state);
    let draft_before = state.draft().clone();

    let err = state.deploy_with(&platform).expect_err("service error");
    assert_eq!(err.kind(), ErrorKind::Service);
    assert_eq!(state.step(), WizardStep::ConfigureAgent);
    assert_eq!(state.draft(), &draft_before);
    assert_eq!(
        state
            .resolver()
            .resolve("weather", Section::Deploy, "project_connection_id"),
        Ok(Value::from("conn-1"))
    );

    let agent = state.deploy_with(&platform).expect("retry");
    assert_eq!(agent.name, "bot-1");
    assert_eq!(state.step(), WizardStep::Chatting);
    assert!(state.selection().is_empty());
    assert!(state.draft().name.is_empty());
    assert_eq!(state.chat().map(|chat| chat.agent_name()), Some("bot-1"));

    let sent = platform.deployed.lock().expect("lock");
    assert_eq!(sent.len(), 1);
    let weather = sent[0].tool("weather").expect("weather entry");
    assert_eq!(weather.deploy_values.len(), 2);
    assert_eq!(weather.runtime_values.get("units"), Some(&Value::from("metric")));
}

#[test]
fn actions_are_rejected_while_deploy_is_in_flight() {
    let mut state = WizardState::default();
    state.apply(WizardAction::Next).expect("params");
    state.apply(WizardAction::Next).expect("agent");
    ready_to_deploy(&mut state);
    state.apply(WizardAction::Next).expect("deploying");

    assert_eq!(
        state.apply(WizardAction::Next),
        Err(WizardError::DeployInFlight)
    );
    assert_eq!(
        state.apply(WizardAction::SetAgentName("other".to_string())),
        Err(WizardError::DeployInFlight)
    );
    assert_eq!(state.draft().name, "bot-1");

    let agent = state
        .complete_deploy(Ok(DeployedAgent {
            name: "bot-1".to_string(),
            id: "bot-1:1".to_string(),
            version: 1,
        }))
        .expect("complete");
    assert_eq!(agent.version, 1);
    assert!(state
        .complete_deploy(Err(PlatformError::Network("late".to_string())))
        .is_err());
    assert_eq!(state.step(), WizardStep::Chatting);
}

#[test]
fn back_moves_to_earlier_steps_only() {
    let mut state = WizardState::default();
    assert!(matches!(
        state.apply(WizardAction::Back),
        Err(WizardError::InvalidTransition { .. })
    ));
    state.apply(WizardAction::Next).expect("params");
    state.apply(WizardAction::Next).expect("agent");
    assert!(state
        .apply(WizardAction::GoTo(WizardStep::Chatting))
        .is_err());
    state.apply(WizardAction::Back).expect("back");
    assert_eq!(state.step(), WizardStep::ConfigureParams);
    state.apply(WizardAction::Next).expect("agent again");
    state
        .apply(WizardAction::GoTo(WizardStep::SelectTools))
        .expect("jump back");
    assert_eq!(state.step(), WizardStep::SelectTools);
}

#[test]
fn chatting_offers_update_instead_of_back() {
    let platform = StubPlatform::with_tools();
    let mut state = WizardState::default();
    state.apply(WizardAction::Next).expect("params");
    state.apply(WizardAction::Next).expect("agent");
    ready_to_deploy(&mut state);
    state
        .apply(WizardAction::AddPromptParam(PromptParam::new(
            ParamKey::parse("purpose").expect("key"),
            "Purpose",
        )))
        .expect("prompt param");
    state.deploy_with(&platform).expect("deploy");
    assert_eq!(state.deployed_prompt_params().len(), 1);

    assert!(matches!(
        state.apply(WizardAction::Back),
        Err(WizardError::InvalidTransition { .. })
    ));

    state.apply(WizardAction::UpdateAgent).expect("update");
    assert_eq!(state.step(), WizardStep::SelectTools);
    assert!(state.deployed().is_none());
    assert!(state.chat().is_none());
    assert_eq!(state.draft().name, "bot-1");
    assert_eq!(state.draft().prompt_params.len(), 1);
    assert_eq!(state.draft().prompt_params[0].key.as_str(), "purpose");
}

#[test]
fn new_agent_clears_everything() {
    let platform = StubPlatform::with_tools();
    let mut state = configuring_weather(&platform);
    state
        .apply(WizardAction::SetAgentName("draft".to_string()))
        .expect("name");
    state.apply(WizardAction::NewAgent).expect("new agent");
    assert_eq!(state.step(), WizardStep::SelectTools);
    assert!(state.selection().is_empty());
    assert!(state.schemas().is_empty());
    assert!(state.draft().name.is_empty());
    assert_eq!(state.draft().model, "gpt-4.1");
}

#[test]
fn activating_tool_after_select_step_requests_its_schema() {
    let platform = StubPlatform::with_tools();
    let mut state = configuring_weather(&platform);
    let transition = state
        .apply(WizardAction::ActivateTool(tool_id("jokes")))
        .expect("activate");
    assert_eq!(
        transition.effect,
        WizardEffect::FetchSchemas(vec![tool_id("jokes")])
    );
    assert_eq!(transition.feedback.as_deref(), Some("Selected jokes."));
    state.run_effect(&platform, transition.effect).expect("fetch");
    assert!(state.schemas().contains("jokes"));

    let again = state
        .apply(WizardAction::ActivateTool(tool_id("jokes")))
        .expect("idempotent");
    assert_eq!(again.effect, WizardEffect::None);
    assert_eq!(again.feedback, None);
}

#[test]
fn tool_deleted_upstream_is_dropped_from_selection_and_payload() {
    let platform = StubPlatform::with_tools();
    let mut state = WizardState::default();
    state
        .apply(WizardAction::ActivateTool(tool_id("jokes")))
        .expect("activate jokes");
    let transition = state
        .apply(WizardAction::ActivateTool(tool_id("retired")))
        .expect("activate retired");

    let outcome = state
        .run_effect(&platform, transition.effect)
        .expect("fetch");
    let report = match outcome {
        EffectOutcome::Fetched(report) => report,
        other => panic!("expected fetch outcome, got {other:?}"),
    };
    assert_eq!(report.removed, vec![tool_id("retired")]);
    assert!(report.failed.is_empty());
    assert!(!state.selection().is_active("retired"));

    state.fetch_schemas(&platform);
    state.apply(WizardAction::Next).expect("params");
    state.apply(WizardAction::Next).expect("agent");
    ready_to_deploy(&mut state);
    state.deploy_with(&platform).expect("deploy");

    let sent = platform.deployed.lock().expect("lock");
    assert!(sent[0].tool("retired").is_none());
    assert!(sent[0].tool("jokes").is_some());
}

#[test]
fn unreachable_catalog_keeps_tool_without_schema() {
    let platform = StubPlatform::with_tools();
    *platform.catalog_down.lock().expect("lock") = true;
    let mut state = WizardState::default();
    state
        .apply(WizardAction::ActivateTool(tool_id("jokes")))
        .expect("activate");
    let report = state.fetch_schemas(&platform);
    assert!(report.loaded.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert!(report.removed.is_empty());
    assert!(state.selection().is_active("jokes"));

    state.apply(WizardAction::Next).expect("params");
    state.apply(WizardAction::Next).expect("nothing required without schema");
    let payload = assemble_payload(state.draft(), state.selection(), state.schemas());
    assert!(payload.tool("jokes").expect("still emitted").deploy_values.is_empty());
}

#[test]
fn resume_enters_chat_and_not_found_keeps_step() {
    let mut platform = StubPlatform::with_tools();
    platform.agents.push(
        serde_json::from_str(
            r#"{"name": "helper", "id": "helper:3", "version": 3,
                "prompt_params": [{"key": "purpose", "label": "Purpose", "required": true}]}"#,
        )
        .expect("agent summary"),
    );
    let mut state = WizardState::default();
    state.apply(WizardAction::Next).expect("params");

    let err = state.resume_with(&platform, "ghost").expect_err("missing agent");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(state.step(), WizardStep::ConfigureParams);

    let agent = state.resume_with(&platform, "helper").expect("resume");
    assert_eq!(agent.version, 3);
    assert_eq!(state.step(), WizardStep::Chatting);
    let chat = state.chat().expect("chat session");
    assert!(!chat.is_confirmed());
    assert_eq!(chat.prompt_params().len(), 1);

    state.delete_agent_with(&platform, "helper").expect("delete");
    assert_eq!(state.step(), WizardStep::SelectTools);
    assert!(state.deployed().is_none());
    assert_eq!(
        platform.deleted.lock().expect("lock").as_slice(),
        ["helper".to_string()]
    );
}

#[test]
fn sync_catalog_prunes_tools_deleted_upstream() {
    let platform = StubPlatform::with_tools();
    let mut state = configuring_weather(&platform);
    state
        .apply(WizardAction::ActivateTool(tool_id("jokes")))
        .expect("activate");
    state.fetch_schemas(&platform);

    let remaining = vec![definition(JOKES).summary()];
    let removed = state.sync_catalog(&remaining);
    assert_eq!(removed, vec![tool_id("weather")]);
    assert!(!state.selection().is_active("weather"));
    assert!(!state.schemas().contains("weather"));
    assert!(state.selection().is_active("jokes"));
}
