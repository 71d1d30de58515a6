use super::error::WizardError;
use super::resolver::Resolver;
use crate::catalog::{FieldType, ParamField, SchemaCache, Section, Value};
use crate::shared::ids::{ParamKey, ToolId};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// User-entered values for one active tool. Deploy and runtime keys live in
/// separate namespaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOverrides {
    deploy: BTreeMap<ParamKey, Value>,
    runtime: BTreeMap<ParamKey, Value>,
}

impl ToolOverrides {
    pub fn section(&self, section: Section) -> &BTreeMap<ParamKey, Value> {
        match section {
            Section::Deploy => &self.deploy,
            Section::Runtime => &self.runtime,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut BTreeMap<ParamKey, Value> {
        match section {
            Section::Deploy => &mut self.deploy,
            Section::Runtime => &mut self.runtime,
        }
    }

    pub fn get(&self, section: Section, key: &str) -> Option<&Value> {
        self.section(section).get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.deploy.is_empty() && self.runtime.is_empty()
    }
}

/// Active tools in activation order, each with its overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    tools: IndexMap<ToolId, ToolOverrides>,
}

impl Selection {
    /// Returns true when the tool was not active before.
    pub fn activate(&mut self, tool_id: ToolId) -> bool {
        if self.tools.contains_key(&tool_id) {
            return false;
        }
        self.tools.insert(tool_id, ToolOverrides::default());
        true
    }

    /// Drops the tool and every override it carried.
    pub fn deactivate(&mut self, tool_id: &str) -> bool {
        self.tools.shift_remove(tool_id).is_some()
    }

    pub fn is_active(&self, tool_id: &str) -> bool {
        self.tools.contains_key(tool_id)
    }

    pub fn active_tools(&self) -> impl Iterator<Item = &ToolId> {
        self.tools.keys()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn overrides(&self, tool_id: &str) -> Option<&ToolOverrides> {
        self.tools.get(tool_id)
    }

    pub fn override_value(&self, tool_id: &str, section: Section, key: &str) -> Option<&Value> {
        self.overrides(tool_id)?.get(section, key)
    }

    pub fn retain<F>(&mut self, mut keep: F) -> Vec<ToolId>
    where
        F: FnMut(&ToolId) -> bool,
    {
        let mut removed = Vec::new();
        self.tools.retain(|id, _| {
            let kept = keep(id);
            if !kept {
                removed.push(id.clone());
            }
            kept
        });
        removed
    }

    pub fn clear(&mut self) {
        self.tools.clear();
    }

    /// Stores an explicit value. The tool must be active, the key declared on
    /// that tool's section, and select values drawn from the declared options.
    pub fn set_override(
        &mut self,
        schemas: &SchemaCache,
        tool_id: &str,
        section: Section,
        key: &str,
        value: Value,
    ) -> Result<(), WizardError> {
        let (declared_key, field) = self.declared_field(schemas, tool_id, section, key)?;
        field
            .check_value(&value)
            .map_err(|reason| WizardError::InvalidValue {
                key: key.to_string(),
                reason,
            })?;
        let declared_key = declared_key.clone();
        let overrides = self
            .tools
            .get_mut(tool_id)
            .ok_or_else(|| WizardError::InactiveTool {
                tool_id: tool_id.to_string(),
            })?;
        overrides.section_mut(section).insert(declared_key, value);
        Ok(())
    }

    /// Flips one option of a multi-select field and stores the result as an
    /// override, even when it matches the default again.
    pub fn toggle_option(
        &mut self,
        schemas: &SchemaCache,
        tool_id: &str,
        section: Section,
        key: &str,
        option: &str,
    ) -> Result<Vec<String>, WizardError> {
        let (_, field) = self.declared_field(schemas, tool_id, section, key)?;
        if field.field_type != FieldType::MultiSelect {
            return Err(WizardError::InvalidValue {
                key: key.to_string(),
                reason: format!("{} fields cannot toggle options", field.field_type),
            });
        }
        if !field.options.iter().any(|declared| declared == option) {
            return Err(WizardError::InvalidValue {
                key: key.to_string(),
                reason: format!("`{option}` is not one of the declared options"),
            });
        }
        let current = Resolver::new(self, schemas).resolve(tool_id, section, key)?;
        let mut items = current.as_list().map(<[String]>::to_vec).unwrap_or_default();
        if let Some(index) = items.iter().position(|item| item == option) {
            items.remove(index);
        } else {
            items.push(option.to_string());
        }
        self.set_override(schemas, tool_id, section, key, Value::List(items.clone()))?;
        Ok(items)
    }

    fn declared_field<'s>(
        &self,
        schemas: &'s SchemaCache,
        tool_id: &str,
        section: Section,
        key: &str,
    ) -> Result<(&'s ParamKey, &'s ParamField), WizardError> {
        if !self.is_active(tool_id) {
            return Err(WizardError::InactiveTool {
                tool_id: tool_id.to_string(),
            });
        }
        let tool = schemas
            .get(tool_id)
            .ok_or_else(|| WizardError::SchemaUnavailable {
                tool_id: tool_id.to_string(),
            })?;
        tool.fields(section)
            .get_key_value(key)
            .ok_or_else(|| WizardError::UndeclaredField {
                tool_id: tool_id.to_string(),
                section,
                key: key.to_string(),
            })
    }
}
