use super::error::WizardError;
use super::selection::Selection;
use crate::catalog::{ParamField, SchemaCache, Section, ToolDefinition, Value};
use crate::shared::ids::{ParamKey, ToolId};
use indexmap::IndexMap;

/// Read-only view that merges catalog defaults with stored overrides.
///
/// Precedence is override, then declared default, then the empty value of the
/// field's shape. Visibility never affects resolution.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    selection: &'a Selection,
    schemas: &'a SchemaCache,
}

/// One field as a form would show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView<'a> {
    pub key: &'a ParamKey,
    pub field: &'a ParamField,
    pub value: Value,
    pub visible: bool,
    pub overridden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub tool_id: ToolId,
    pub section: Section,
    pub key: ParamKey,
}

impl<'a> Resolver<'a> {
    pub fn new(selection: &'a Selection, schemas: &'a SchemaCache) -> Self {
        Self { selection, schemas }
    }

    fn tool(&self, tool_id: &str) -> Result<&'a ToolDefinition, WizardError> {
        self.schemas
            .get(tool_id)
            .ok_or_else(|| WizardError::SchemaUnavailable {
                tool_id: tool_id.to_string(),
            })
    }

    fn field(
        &self,
        tool_id: &str,
        section: Section,
        key: &str,
    ) -> Result<&'a ParamField, WizardError> {
        self.tool(tool_id)?
            .field(section, key)
            .ok_or_else(|| WizardError::UndeclaredField {
                tool_id: tool_id.to_string(),
                section,
                key: key.to_string(),
            })
    }

    fn resolve_field(
        &self,
        tool_id: &str,
        section: Section,
        key: &str,
        field: &ParamField,
    ) -> Value {
        self.selection
            .override_value(tool_id, section, key)
            .cloned()
            .unwrap_or_else(|| field.default_value())
    }

    pub fn resolve(
        &self,
        tool_id: &str,
        section: Section,
        key: &str,
    ) -> Result<Value, WizardError> {
        let field = self.field(tool_id, section, key)?;
        Ok(self.resolve_field(tool_id, section, key, field))
    }

    /// Evaluates `visible_when` against the live resolved controller value.
    pub fn is_visible(
        &self,
        tool_id: &str,
        section: Section,
        key: &str,
    ) -> Result<bool, WizardError> {
        let field = self.field(tool_id, section, key)?;
        self.field_visible(tool_id, section, key, field)
    }

    fn field_visible(
        &self,
        tool_id: &str,
        section: Section,
        key: &str,
        field: &ParamField,
    ) -> Result<bool, WizardError> {
        let Some(rule) = &field.visible_when else {
            return Ok(true);
        };
        let controller = self.resolve(tool_id, section, rule.field.as_str())?;
        match (&controller, &rule.value) {
            (Value::Scalar(actual), Value::Scalar(expected)) => Ok(actual == expected),
            _ => Err(WizardError::InvalidSchema {
                tool_id: tool_id.to_string(),
                reason: format!(
                    "{section} field `{key}` visible_when must compare a single string value"
                ),
            }),
        }
    }

    /// One entry per declared field, hidden fields included.
    pub fn resolve_section(
        &self,
        tool_id: &str,
        section: Section,
    ) -> Result<IndexMap<ParamKey, Value>, WizardError> {
        let tool = self.tool(tool_id)?;
        Ok(tool
            .fields(section)
            .iter()
            .map(|(key, field)| {
                let value = self.resolve_field(tool_id, section, key.as_str(), field);
                (key.clone(), value)
            })
            .collect())
    }

    pub fn field_views(
        &self,
        tool_id: &str,
        section: Section,
    ) -> Result<Vec<FieldView<'a>>, WizardError> {
        let tool = self.tool(tool_id)?;
        tool.fields(section)
            .iter()
            .map(|(key, field)| -> Result<FieldView<'a>, WizardError> {
                Ok(FieldView {
                    key,
                    field,
                    value: self.resolve_field(tool_id, section, key.as_str(), field),
                    visible: self.field_visible(tool_id, section, key.as_str(), field)?,
                    overridden: self
                        .selection
                        .override_value(tool_id, section, key.as_str())
                        .is_some(),
                })
            })
            .collect()
    }

    /// Required fields of active tools that resolve blank, whether or not they
    /// are currently visible. Tools without a loaded schema contribute nothing.
    pub fn missing_required(&self) -> Vec<MissingField> {
        let mut missing = Vec::new();
        for tool_id in self.selection.active_tools() {
            let Some(tool) = self.schemas.get(tool_id.as_str()) else {
                continue;
            };
            for section in crate::catalog::ALL_SECTIONS {
                for (key, field) in tool.fields(section) {
                    if field.required
                        && self
                            .resolve_field(tool_id.as_str(), section, key.as_str(), field)
                            .is_blank()
                    {
                        missing.push(MissingField {
                            tool_id: tool_id.clone(),
                            section,
                            key: key.clone(),
                        });
                    }
                }
            }
        }
        missing
    }
}
