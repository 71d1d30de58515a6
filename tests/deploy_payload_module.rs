use agentwright::catalog::{SchemaCache, Section, ToolDefinition, Value};
use agentwright::shared::ids::{ParamKey, ToolId};
use agentwright::wizard::{
    assemble_payload, compose_runtime_instructions, AgentDraft, PromptParam, PromptParamType,
    Selection,
};
use std::collections::BTreeSet;

const WEATHER: &str = r#"{
    "id": "weather", "name": "Weather", "type": "openapi",
    "deploy_params": {
        "auth_type": {"type": "select", "default": "anonymous",
                      "options": ["anonymous", "project_connection", "managed_identity"]},
        "project_connection_id": {"default": "",
                      "visible_when": {"field": "auth_type", "value": "project_connection"}},
        "operations": {"type": "multi_select", "options": ["getWeather", "getForecast"],
                       "default": ["getWeather"]}
    },
    "runtime_params": {
        "units": {"label": "Units", "default": "metric"},
        "city": {"label": "Default city"}
    }
}"#;

const SEARCH: &str = r#"{
    "id": "web_search", "name": "Web Search", "type": "builtin",
    "deploy_params": {
        "tone": {"label": "Answer tone", "default": "neutral", "target": "instructions"},
        "market": {"default": "en-US"}
    }
}"#;

fn setup() -> (Selection, SchemaCache) {
    let mut schemas = SchemaCache::default();
    for raw in [WEATHER, SEARCH] {
        let tool: ToolDefinition = serde_json::from_str(raw).expect("tool");
        schemas.insert(tool).expect("valid");
    }
    let mut selection = Selection::default();
    selection.activate(ToolId::parse("weather").expect("id"));
    selection.activate(ToolId::parse("web_search").expect("id"));
    (selection, schemas)
}

fn draft() -> AgentDraft {
    let mut draft = AgentDraft::new("gpt-4.1");
    draft.name = " weather-bot ".to_string();
    draft.instructions = "Answer weather questions.\n".to_string();
    draft
}

fn keys<'a>(values: impl Iterator<Item = &'a ParamKey>) -> BTreeSet<String> {
    values.map(ToString::to_string).collect()
}

#[test]
fn payload_carries_exact_declared_key_set_per_section() {
    let (mut selection, schemas) = setup();
    selection
        .set_override(&schemas, "weather", Section::Runtime, "city", Value::from("Oslo"))
        .expect("override");
    let payload = assemble_payload(&draft(), &selection, &schemas);

    assert_eq!(payload.tools.len(), 2);
    for deployment in &payload.tools {
        let tool = schemas.get(deployment.tool_id.as_str()).expect("schema");
        for section in agentwright::catalog::ALL_SECTIONS {
            assert_eq!(
                keys(deployment.values(section).keys()),
                keys(tool.fields(section).keys()),
                "{} {section}",
                deployment.tool_id
            );
        }
    }

    let weather = payload.tool("weather").expect("weather");
    assert_eq!(
        weather.deploy_values.get("project_connection_id"),
        Some(&Value::from(""))
    );
    assert_eq!(
        weather.deploy_values.get("operations"),
        Some(&Value::List(vec!["getWeather".to_string()]))
    );
    assert_eq!(weather.runtime_values.get("city"), Some(&Value::from("Oslo")));
}

#[test]
fn tools_follow_activation_order() {
    let (selection, schemas) = setup();
    let payload = assemble_payload(&draft(), &selection, &schemas);
    let order: Vec<&str> = payload.tools.iter().map(|t| t.tool_id.as_str()).collect();
    assert_eq!(order, vec!["weather", "web_search"]);
}

#[test]
fn prompt_params_travel_with_full_metadata() {
    let (selection, schemas) = setup();
    let mut draft = draft();
    let mut tone = PromptParam::new(ParamKey::parse("tone").expect("key"), "Tone");
    tone.param_type = PromptParamType::Select;
    tone.options = vec!["formal".to_string(), "casual".to_string()];
    tone.default = "formal".to_string();
    tone.required = true;
    draft.add_prompt_param(tone.clone()).expect("add");

    let payload = assemble_payload(&draft, &selection, &schemas);
    assert_eq!(payload.name, "weather-bot");
    assert_eq!(payload.model, "gpt-4.1");
    assert_eq!(payload.instructions, "Answer weather questions.");
    assert_eq!(payload.prompt_params, vec![tone]);

    let encoded = serde_json::to_value(&payload).expect("encode");
    assert_eq!(encoded["prompt_params"][0]["type"], "select");
    assert_eq!(encoded["prompt_params"][0]["options"][1], "casual");
    assert_eq!(encoded["tools"][1]["deploy_params"]["market"], "en-US");
}

#[test]
fn runtime_instructions_append_tool_configuration() {
    let (mut selection, schemas) = setup();
    selection
        .set_override(&schemas, "weather", Section::Runtime, "city", Value::from("Oslo"))
        .expect("override");
    let payload = assemble_payload(&draft(), &selection, &schemas);

    assert_eq!(
        compose_runtime_instructions(&payload, &schemas),
        "Answer weather questions.\n\n--- Tool Configuration ---\n\
         Weather: Units: metric. Default city: Oslo.\n\
         Web Search: Answer tone: neutral."
    );
}
