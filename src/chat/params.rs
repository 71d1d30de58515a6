use crate::wizard::draft::PromptParam;
use std::collections::BTreeMap;

/// Multi-select values are stored and shown as one delimited string.
pub const MULTI_SELECT_SEPARATOR: &str = ", ";

pub type ParamValues = BTreeMap<String, String>;

pub fn split_values(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn join_values(items: &[String]) -> String {
    items.join(MULTI_SELECT_SEPARATOR)
}

/// Adds `option` when absent, removes it otherwise.
pub fn toggle_value(raw: &str, option: &str) -> String {
    let mut items = split_values(raw);
    let option = option.trim();
    match items.iter().position(|item| item == option) {
        Some(index) => {
            items.remove(index);
        }
        None => items.push(option.to_string()),
    }
    join_values(&items)
}

/// Fills in each parameter's default for keys that have no value yet.
pub fn prefill(params: &[PromptParam], values: &mut ParamValues) {
    for param in params {
        values
            .entry(param.key.to_string())
            .or_insert_with(|| param.default.clone());
    }
}

/// Required parameters whose value is blank or absent, in declaration order.
pub fn missing_required<'a>(params: &'a [PromptParam], values: &ParamValues) -> Vec<&'a PromptParam> {
    params
        .iter()
        .filter(|param| param.required)
        .filter(|param| {
            values
                .get(param.key.as_str())
                .map_or(true, |value| value.trim().is_empty())
        })
        .collect()
}

/// Context message recorded on confirm. Lists every parameter with a value.
pub fn summarize(params: &[PromptParam], values: &ParamValues) -> String {
    let lines: Vec<String> = params
        .iter()
        .filter_map(|param| {
            let value = values.get(param.key.as_str())?.trim();
            if value.is_empty() {
                return None;
            }
            Some(format!("- {} ({}): {value}", param.label_or_key(), param.key))
        })
        .collect();
    if lines.is_empty() {
        return "Conversation parameters: none set".to_string();
    }
    format!("Conversation parameters:\n{}", lines.join("\n"))
}
