use super::error::WizardError;
use crate::catalog::Value;
use crate::chat::params::join_values;
use crate::shared::ids::ParamKey;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptParamType {
    #[default]
    String,
    Select,
    MultiSelect,
}

impl PromptParamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
        }
    }
}

/// Agent-level template variable, filled in at conversation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptParam {
    pub key: ParamKey,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub param_type: PromptParamType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Multi-select defaults are stored in their delimited form.
    #[serde(default, deserialize_with = "delimited_default")]
    pub default: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
}

fn delimited_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None => String::new(),
        Some(Value::Scalar(raw)) => raw,
        Some(Value::List(items)) => join_values(&items),
    })
}

impl PromptParam {
    pub fn new(key: ParamKey, label: &str) -> Self {
        Self {
            key,
            label: label.to_string(),
            param_type: PromptParamType::String,
            options: Vec::new(),
            default: String::new(),
            required: false,
            description: String::new(),
            placeholder: String::new(),
        }
    }

    pub fn label_or_key(&self) -> &str {
        if self.label.trim().is_empty() {
            self.key.as_str()
        } else {
            &self.label
        }
    }

    pub fn validate(&self) -> Result<(), WizardError> {
        if self.param_type != PromptParamType::String && self.options.is_empty() {
            return Err(WizardError::InvalidPromptParam {
                key: self.key.to_string(),
                reason: format!("{} parameters need options", self.param_type.as_str()),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentDraft {
    pub name: String,
    pub model: String,
    pub instructions: String,
    #[serde(default)]
    pub prompt_params: Vec<PromptParam>,
}

impl AgentDraft {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }

    pub fn prompt_param(&self, key: &str) -> Option<&PromptParam> {
        self.prompt_params.iter().find(|param| param.key.as_str() == key)
    }

    pub fn add_prompt_param(&mut self, param: PromptParam) -> Result<(), WizardError> {
        param.validate()?;
        if self.prompt_param(param.key.as_str()).is_some() {
            return Err(WizardError::InvalidPromptParam {
                key: param.key.to_string(),
                reason: "key already exists".to_string(),
            });
        }
        self.prompt_params.push(param);
        Ok(())
    }

    /// Replaces the parameter stored under `key`, keeping its position.
    pub fn update_prompt_param(&mut self, key: &str, param: PromptParam) -> Result<(), WizardError> {
        param.validate()?;
        let index = self.position(key)?;
        if param.key.as_str() != key && self.prompt_param(param.key.as_str()).is_some() {
            return Err(WizardError::InvalidPromptParam {
                key: param.key.to_string(),
                reason: "key already exists".to_string(),
            });
        }
        self.prompt_params[index] = param;
        Ok(())
    }

    pub fn remove_prompt_param(&mut self, key: &str) -> Result<PromptParam, WizardError> {
        let index = self.position(key)?;
        Ok(self.prompt_params.remove(index))
    }

    fn position(&self, key: &str) -> Result<usize, WizardError> {
        self.prompt_params
            .iter()
            .position(|param| param.key.as_str() == key)
            .ok_or_else(|| WizardError::InvalidPromptParam {
                key: key.to_string(),
                reason: "no such parameter".to_string(),
            })
    }

    /// Local gate before a deploy is attempted.
    pub fn validate_for_deploy(&self) -> Result<(), WizardError> {
        if self.name.trim().is_empty() {
            return Err(WizardError::BlankAgentField { field: "name" });
        }
        if self.instructions.trim().is_empty() {
            return Err(WizardError::BlankAgentField {
                field: "instructions",
            });
        }
        Ok(())
    }
}
