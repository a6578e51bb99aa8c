//! Rule catalog and its one-time construction

use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::error::KestrelError;
use crate::result::Result;
use crate::rule::Rule;

/// Catalog of rules by identifier, in registration order
#[derive(Debug, Default, Clone)]
pub struct RuleRegistry {
    rules: IndexMap<&'static str, Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from one batch
    pub fn with_rules(rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(rules)?;
        Ok(registry)
    }

    /// Add a batch of rules
    ///
    /// The batch is checked as a whole first: a duplicate identifier, within
    /// the batch or against earlier registrations, leaves the registry as it
    /// was.
    pub fn register(&mut self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Result<()> {
        let batch: Vec<Arc<dyn Rule>> = rules.into_iter().collect();
        let mut seen = std::collections::HashSet::new();
        for rule in &batch {
            let id = rule.id();
            if self.rules.contains_key(id) || !seen.insert(id) {
                return Err(KestrelError::duplicate_rule(id));
            }
        }
        for rule in batch {
            tracing::debug!(rule = rule.id(), "Registered rule");
            self.rules.insert(rule.id(), rule);
        }
        Ok(())
    }

    pub fn lookup(&self, id: &str) -> Option<&Arc<dyn Rule>> {
        self.rules.get(id)
    }

    pub fn require(&self, id: &str) -> Result<&Arc<dyn Rule>> {
        self.lookup(id).ok_or_else(|| KestrelError::unknown_rule(id))
    }

    pub fn rules(&self) -> impl Iterator<Item = &Arc<dyn Rule>> {
        self.rules.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Write-once holder for a process-wide [`RuleRegistry`]
///
/// The first successful initialization wins; later attempts return the
/// catalog built the first time without running their builder.
#[derive(Debug, Default)]
pub struct RegistryCell {
    cell: OnceCell<RuleRegistry>,
}

impl RegistryCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Option<&RuleRegistry> {
        self.cell.get()
    }

    pub fn get_or_init(&self, build: impl FnOnce() -> RuleRegistry) -> &RuleRegistry {
        self.cell.get_or_init(|| {
            let registry = build();
            tracing::info!(rules = registry.len(), "Rule registry initialized");
            registry
        })
    }

    /// Like [`Self::get_or_init`] for builders that can fail; a failed build
    /// leaves the cell empty
    pub fn get_or_try_init(&self, build: impl FnOnce() -> Result<RuleRegistry>) -> Result<&RuleRegistry> {
        self.cell.get_or_try_init(|| {
            let registry = build()?;
            tracing::info!(rules = registry.len(), "Rule registry initialized");
            Ok(registry)
        })
    }
}
