use crate::shared::ids::ParamKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A resolved or declared parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

impl Value {
    pub fn empty_scalar() -> Self {
        Self::Scalar(String::new())
    }

    pub fn empty_list() -> Self {
        Self::List(Vec::new())
    }

    /// Blank scalars (after trimming) and empty lists count as "no value".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Scalar(raw) => raw.trim().is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(raw) => Some(raw),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Scalar(_) => None,
            Self::List(items) => Some(items),
        }
    }

    pub fn display(&self) -> String {
        match self {
            Self::Scalar(raw) => raw.clone(),
            Self::List(items) => items.join(", "),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    String,
    Password,
    Select,
    MultiSelect,
    ConnectionRef,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Password => "password",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::ConnectionRef => "connection_ref",
        }
    }

    pub fn is_list(self) -> bool {
        self == Self::MultiSelect
    }

    pub fn has_options(self) -> bool {
        matches!(self, Self::Select | Self::MultiSelect)
    }

    pub fn empty_value(self) -> Value {
        if self.is_list() {
            Value::empty_list()
        } else {
            Value::empty_scalar()
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One half of a tool schema. The two sections never share keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Deploy,
    Runtime,
}

pub const ALL_SECTIONS: [Section; 2] = [Section::Deploy, Section::Runtime];

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Runtime => "runtime",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility rule: the field shows only while `field` (same tool, same
/// section) resolves to `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleWhen {
    pub field: ParamKey,
    #[serde(alias = "equals")]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParamField {
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placeholder: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(
        default,
        alias = "visibleWhen",
        skip_serializing_if = "Option::is_none"
    )]
    pub visible_when: Option<VisibleWhen>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

pub const INSTRUCTIONS_TARGET: &str = "instructions";

impl ParamField {
    /// Declared default, or the empty value of the field's shape.
    pub fn default_value(&self) -> Value {
        self.default
            .clone()
            .unwrap_or_else(|| self.field_type.empty_value())
    }

    pub fn label_or<'a>(&'a self, key: &'a str) -> &'a str {
        if self.label.trim().is_empty() {
            key
        } else {
            &self.label
        }
    }

    pub fn targets_instructions(&self) -> bool {
        self.target.as_deref() == Some(INSTRUCTIONS_TARGET)
    }

    /// Checks that a value has the shape this field stores.
    pub fn check_shape(&self, value: &Value) -> Result<(), String> {
        if self.field_type.is_list() == value.is_list() {
            return Ok(());
        }
        let expected = if self.field_type.is_list() {
            "a list"
        } else {
            "a single string"
        };
        Err(format!("{} fields take {expected}", self.field_type))
    }

    /// Shape check plus option membership for select and multi-select fields.
    /// An empty select value is allowed and means unset.
    pub fn check_value(&self, value: &Value) -> Result<(), String> {
        self.check_shape(value)?;
        if !self.field_type.has_options() {
            return Ok(());
        }
        let undeclared = match value {
            Value::Scalar(item) if item.is_empty() => None,
            Value::Scalar(item) => (!self.options.contains(item)).then_some(item),
            Value::List(items) => items.iter().find(|item| !self.options.contains(item)),
        };
        match undeclared {
            Some(item) => Err(format!("`{item}` is not one of the declared options")),
            None => Ok(()),
        }
    }
}

pub type FieldSchema = IndexMap<ParamKey, ParamField>;

/// Definition checks for one section: option lists, default shapes and
/// `visible_when` references.
pub fn check_section(section: Section, fields: &FieldSchema) -> Result<(), String> {
    for (key, field) in fields {
        if field.field_type.has_options() && field.options.is_empty() {
            return Err(format!(
                "{section} field `{key}` is {} but declares no options",
                field.field_type
            ));
        }
        if let Some(default) = &field.default {
            field
                .check_value(default)
                .map_err(|reason| format!("{section} field `{key}` default: {reason}"))?;
        }
        let Some(rule) = &field.visible_when else {
            continue;
        };
        if rule.field == *key {
            return Err(format!(
                "{section} field `{key}` visible_when references itself"
            ));
        }
        let controller = fields.get(rule.field.as_str()).ok_or_else(|| {
            format!(
                "{section} field `{key}` visible_when references undeclared field `{}`",
                rule.field
            )
        })?;
        if rule.value.is_list() || controller.field_type.is_list() {
            return Err(format!(
                "{section} field `{key}` visible_when must compare a single string value"
            ));
        }
    }
    Ok(())
}
