use super::tool::ToolDefinition;
use crate::platform::{PlatformError, ToolCatalog};
use crate::shared::ids::ToolId;
use std::collections::{BTreeMap, HashSet};
use std::thread;

/// Tool schemas fetched during one wizard lifetime, keyed by tool id.
#[derive(Debug, Clone, Default)]
pub struct SchemaCache {
    tools: BTreeMap<ToolId, ToolDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub loaded: Vec<ToolId>,
    pub failed: Vec<(ToolId, String)>,
    /// Tools the catalog answered NotFound for, i.e. deleted upstream.
    pub removed: Vec<ToolId>,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.removed.is_empty()
    }
}

impl SchemaCache {
    pub fn get(&self, tool_id: &str) -> Option<&ToolDefinition> {
        self.tools.get(tool_id)
    }

    pub fn contains(&self, tool_id: &str) -> bool {
        self.tools.contains_key(tool_id)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn tool_ids(&self) -> impl Iterator<Item = &ToolId> {
        self.tools.keys()
    }

    /// Validates and stores a definition. A later insert for the same id replaces
    /// the earlier one.
    pub fn insert(&mut self, tool: ToolDefinition) -> Result<(), String> {
        tool.validate()?;
        self.tools.insert(tool.id.clone(), tool);
        Ok(())
    }

    pub fn remove(&mut self, tool_id: &str) -> Option<ToolDefinition> {
        self.tools.remove(tool_id)
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ToolId) -> bool,
    {
        self.tools.retain(|id, _| keep(id));
    }

    pub fn clear(&mut self) {
        self.tools.clear();
    }

    /// Fetches every id not already cached, one request per tool in parallel.
    /// Failed fetches are reported and leave the tool without a schema. NotFound
    /// answers land in `removed` so the caller can drop the tool.
    pub fn fetch_missing<C>(&mut self, catalog: &C, tool_ids: &[ToolId]) -> FetchReport
    where
        C: ToolCatalog + ?Sized,
    {
        let mut seen = HashSet::new();
        let pending: Vec<&ToolId> = tool_ids
            .iter()
            .filter(|id| !self.contains(id.as_str()) && seen.insert(id.as_str()))
            .collect();
        if pending.is_empty() {
            return FetchReport::default();
        }

        let results: Vec<(ToolId, Result<ToolDefinition, PlatformError>)> = thread::scope(|scope| {
            let handles: Vec<_> = pending
                .iter()
                .map(|tool_id| {
                    let tool_id = (*tool_id).clone();
                    scope.spawn(move || {
                        let fetched = catalog.get_tool(&tool_id);
                        (tool_id, fetched)
                    })
                })
                .collect();
            handles
                .into_iter()
                .zip(pending.iter())
                .map(|(handle, tool_id)| {
                    handle.join().unwrap_or_else(|_| {
                        let panicked = PlatformError::Network("schema fetch panicked".to_string());
                        ((*tool_id).clone(), Err(panicked))
                    })
                })
                .collect()
        });

        let mut report = FetchReport::default();
        for (tool_id, fetched) in results {
            let fetched = match fetched {
                Err(PlatformError::NotFound(reason)) => {
                    tracing::warn!(tool_id = %tool_id, %reason, "tool deleted upstream");
                    report.removed.push(tool_id);
                    continue;
                }
                other => other.map_err(|err| err.to_string()),
            };
            let outcome = fetched.and_then(|tool| {
                if tool.id != tool_id {
                    return Err(format!("catalog returned tool `{}`", tool.id));
                }
                self.insert(tool)
            });
            match outcome {
                Ok(()) => report.loaded.push(tool_id),
                Err(reason) => {
                    tracing::warn!(tool_id = %tool_id, %reason, "tool schema unavailable");
                    report.failed.push((tool_id, reason));
                }
            }
        }
        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            removed = report.removed.len(),
            "tool schemas fetched"
        );
        report
    }
}
