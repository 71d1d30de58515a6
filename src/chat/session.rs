use super::error::ChatError;
use super::params::{self, ParamValues};
use crate::platform::{ChatBackend, ChatTurnRequest, ChatTurnResponse, PlatformError};
use crate::shared::errors::ErrorKind;
use crate::wizard::draft::{PromptParam, PromptParamType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    /// Local record of the confirmed parameters. Never sent to the backend.
    Context,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Context => "context",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<String>,
    /// Set on assistant messages that stand in for a failed turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: MessageRole, content: String) -> Self {
        Self {
            role,
            content,
            tool_calls: Vec::new(),
            error: None,
            sent_at: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamPhase {
    Unconfirmed,
    Confirmed,
}

/// A request handed out by `begin_send`. Its `turn` must be passed back to
/// `complete_send` together with the backend's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTurn {
    pub turn: u64,
    pub request: ChatTurnRequest,
}

/// Conversation with one deployed agent, gated on its prompt parameters.
#[derive(Debug, Clone)]
pub struct ChatSession {
    agent_name: String,
    prompt_params: Vec<PromptParam>,
    param_values: ParamValues,
    phase: ParamPhase,
    history: Vec<ChatMessage>,
    continuation_token: Option<String>,
    next_turn: u64,
    pending: Option<u64>,
}

impl ChatSession {
    /// Starts unconfirmed with defaults prefilled. An agent without prompt
    /// parameters has nothing to confirm and starts confirmed.
    pub fn new(agent_name: &str, prompt_params: Vec<PromptParam>) -> Self {
        let mut param_values = ParamValues::new();
        params::prefill(&prompt_params, &mut param_values);
        let phase = if prompt_params.is_empty() {
            ParamPhase::Confirmed
        } else {
            ParamPhase::Unconfirmed
        };
        Self {
            agent_name: agent_name.to_string(),
            prompt_params,
            param_values,
            phase,
            history: Vec::new(),
            continuation_token: None,
            next_turn: 1,
            pending: None,
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    pub fn prompt_params(&self) -> &[PromptParam] {
        &self.prompt_params
    }

    pub fn param_values(&self) -> &ParamValues {
        &self.param_values
    }

    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.param_values.get(key).map(String::as_str)
    }

    pub fn phase(&self) -> ParamPhase {
        self.phase
    }

    pub fn is_confirmed(&self) -> bool {
        self.phase == ParamPhase::Confirmed
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    pub fn pending_turn(&self) -> Option<u64> {
        self.pending
    }

    fn editable_param(&self, key: &str) -> Result<&PromptParam, ChatError> {
        if self.phase == ParamPhase::Confirmed {
            return Err(ChatError::AlreadyConfirmed);
        }
        self.prompt_params
            .iter()
            .find(|param| param.key.as_str() == key)
            .ok_or_else(|| ChatError::UnknownParam {
                key: key.to_string(),
            })
    }

    /// Stores a value. Select and multi-select values must come from the
    /// declared options; multi-select input is normalised to its delimited form.
    pub fn set_param(&mut self, key: &str, value: &str) -> Result<(), ChatError> {
        let param = self.editable_param(key)?;
        let stored = match param.param_type {
            PromptParamType::String => value.to_string(),
            PromptParamType::Select => {
                let value = value.trim();
                if !value.is_empty() {
                    check_option(param, value)?;
                }
                value.to_string()
            }
            PromptParamType::MultiSelect => {
                let items = params::split_values(value);
                for item in &items {
                    check_option(param, item)?;
                }
                params::join_values(&items)
            }
        };
        self.param_values.insert(key.to_string(), stored);
        Ok(())
    }

    /// Flips one option of a multi-select parameter and returns the new value.
    pub fn toggle_param_option(&mut self, key: &str, option: &str) -> Result<&str, ChatError> {
        let param = self.editable_param(key)?;
        if param.param_type != PromptParamType::MultiSelect {
            return Err(ChatError::NotMultiSelect {
                key: key.to_string(),
            });
        }
        check_option(param, option.trim())?;
        let current = self.param_value(key).unwrap_or_default();
        let toggled = params::toggle_value(current, option);
        let slot = self.param_values.entry(key.to_string()).or_default();
        *slot = toggled;
        Ok(slot.as_str())
    }

    /// Locks the parameter values and records them as one context message.
    pub fn confirm(&mut self) -> Result<&ChatMessage, ChatError> {
        if self.phase == ParamPhase::Confirmed {
            return Err(ChatError::AlreadyConfirmed);
        }
        if let Some(param) = params::missing_required(&self.prompt_params, &self.param_values)
            .into_iter()
            .next()
        {
            return Err(ChatError::MissingRequiredParam {
                key: param.key.to_string(),
            });
        }
        self.phase = ParamPhase::Confirmed;
        tracing::debug!(agent = %self.agent_name, "prompt parameters confirmed");
        let summary = params::summarize(&self.prompt_params, &self.param_values);
        Ok(self.push(ChatMessage::new(MessageRole::Context, summary)))
    }

    /// Reopens the parameters and starts a fresh conversation. Current values
    /// stay in place for editing; history and the continuation token are
    /// dropped. Turn ids keep counting so a late reply stays stale.
    pub fn edit(&mut self) -> Result<(), ChatError> {
        if self.pending.is_some() {
            return Err(ChatError::TurnInFlight);
        }
        self.phase = ParamPhase::Unconfirmed;
        self.history.clear();
        self.continuation_token = None;
        params::prefill(&self.prompt_params, &mut self.param_values);
        tracing::debug!(agent = %self.agent_name, "prompt parameters reopened, conversation reset");
        Ok(())
    }

    /// Records the user message and returns the request to send. Only one turn
    /// may be pending at a time.
    pub fn begin_send(&mut self, message: &str) -> Result<PendingTurn, ChatError> {
        if self.pending.is_some() {
            return Err(ChatError::TurnInFlight);
        }
        if self.phase != ParamPhase::Confirmed {
            return Err(ChatError::NotConfirmed);
        }
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let turn = self.next_turn;
        self.next_turn += 1;
        self.pending = Some(turn);
        self.push(ChatMessage::new(MessageRole::User, message.to_string()));
        Ok(PendingTurn {
            turn,
            request: ChatTurnRequest {
                agent_name: self.agent_name.clone(),
                message: message.to_string(),
                continuation_token: self.continuation_token.clone(),
                param_values: self.param_values.clone(),
            },
        })
    }

    /// Applies the backend's answer for `turn`. Answers for any turn other
    /// than the pending one are discarded and `None` is returned.
    pub fn complete_send(
        &mut self,
        turn: u64,
        result: Result<ChatTurnResponse, PlatformError>,
    ) -> Option<&ChatMessage> {
        if self.pending != Some(turn) {
            tracing::debug!(turn, pending = ?self.pending, "discarding stale chat response");
            return None;
        }
        Some(self.finish(result))
    }

    /// Runs one full turn against `backend`. Backend failures come back as an
    /// assistant message, not as an error.
    pub fn send<B>(&mut self, backend: &B, message: &str) -> Result<&ChatMessage, ChatError>
    where
        B: ChatBackend + ?Sized,
    {
        let pending = self.begin_send(message)?;
        let result = backend.send_turn(&pending.request);
        Ok(self.finish(result))
    }

    fn finish(&mut self, result: Result<ChatTurnResponse, PlatformError>) -> &ChatMessage {
        self.pending = None;
        let message = match result {
            Ok(response) => {
                tracing::info!(
                    agent = %self.agent_name,
                    tool_calls = response.tool_calls.len(),
                    "chat turn completed"
                );
                self.continuation_token =
                    Some(response.continuation_token).filter(|token| !token.is_empty());
                ChatMessage {
                    tool_calls: response.tool_calls,
                    ..ChatMessage::new(MessageRole::Assistant, response.text)
                }
            }
            Err(err) => {
                tracing::warn!(agent = %self.agent_name, %err, "chat turn failed");
                ChatMessage {
                    error: Some(err.kind()),
                    ..ChatMessage::new(MessageRole::Assistant, format!("Error: {}", err.reason()))
                }
            }
        };
        self.push(message)
    }

    fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.history.push(message);
        &self.history[self.history.len() - 1]
    }
}

fn check_option(param: &PromptParam, option: &str) -> Result<(), ChatError> {
    if param.options.iter().any(|candidate| candidate == option) {
        return Ok(());
    }
    Err(ChatError::InvalidOption {
        key: param.key.to_string(),
        option: option.to_string(),
    })
}
