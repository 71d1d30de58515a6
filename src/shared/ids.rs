use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

pub const MAX_TOOL_ID_LEN: usize = 64;

/// Catalog slugs: ASCII letters, digits, `-` and `_`, starting with a letter or
/// digit.
pub fn validate_tool_id(raw: &str) -> Result<(), String> {
    let Some(first) = raw.chars().next() else {
        return Err("tool id must be non-empty".to_string());
    };
    if raw.len() > MAX_TOOL_ID_LEN {
        return Err(format!("tool id exceeds {MAX_TOOL_ID_LEN} characters"));
    }
    if !first.is_ascii_alphanumeric() {
        return Err("tool id must start with a letter or digit".to_string());
    }
    if let Some(bad) = raw
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_'))
    {
        return Err(format!("tool id contains `{bad}`"));
    }
    Ok(())
}

/// Parameter keys end up as JSON object keys and in runtime instructions, so
/// they follow identifier rules: a letter or `_` first, then letters, digits
/// or `_`.
pub fn validate_param_key(raw: &str) -> Result<(), String> {
    let Some(first) = raw.chars().next() else {
        return Err("param key must be non-empty".to_string());
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(format!("param key `{raw}` must start with a letter or '_'"));
    }
    if let Some(bad) = raw
        .chars()
        .find(|ch| !(ch.is_ascii_alphanumeric() || *ch == '_'))
    {
        return Err(format!("param key `{raw}` contains `{bad}`"));
    }
    Ok(())
}

macro_rules! define_id_type {
    ($name:ident, $kind:literal, $validate:path) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn parse(raw: &str) -> Result<Self, String> {
                $validate(raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(|err| {
                    D::Error::custom(format!("invalid {} `{}`: {}", $kind, raw, err))
                })
            }
        }
    };
}

define_id_type!(ToolId, "tool id", validate_tool_id);
define_id_type!(ParamKey, "param key", validate_param_key);
