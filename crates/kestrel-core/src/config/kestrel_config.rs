//! Configuration types for kestrel

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::KestrelError;
use crate::linter::ActiveRule;
use crate::registry::RuleRegistry;
use crate::result::Result;
use crate::rule::Severity;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Linter configuration
    #[serde(default)]
    #[schemars(description = "Linter configuration")]
    pub linter: LinterConfiguration,
}

/// Linter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LinterConfiguration {
    /// Enable/disable linter
    #[schemars(description = "Enable or disable the linter")]
    pub enabled: Option<bool>,

    /// Run every rule that is not opt-in (default: true)
    #[schemars(description = "Enable all recommended rules")]
    pub recommended: Option<bool>,

    /// Per-rule settings keyed by rule identifier
    #[serde(default)]
    #[schemars(description = "Rule severity and options by rule identifier")]
    pub rules: IndexMap<String, RuleSetting>,
}

/// Rule severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    /// Disable the rule
    Off,
    /// Warning (doesn't fail build)
    Warning,
    /// Error (fails build)
    Error,
}

impl RuleSeverity {
    /// Reported severity, `None` for `off`
    pub fn as_severity(self) -> Option<Severity> {
        match self {
            RuleSeverity::Off => None,
            RuleSeverity::Warning => Some(Severity::Warning),
            RuleSeverity::Error => Some(Severity::Error),
        }
    }
}

/// A rule entry: a bare severity or a table with options
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(untagged)]
pub enum RuleSetting {
    Severity(RuleSeverity),
    Config(RuleConfig),
}

impl RuleSetting {
    pub fn severity(&self) -> Option<RuleSeverity> {
        match self {
            RuleSetting::Severity(severity) => Some(*severity),
            RuleSetting::Config(config) => config.severity,
        }
    }

    pub fn options(&self) -> Option<&serde_json::Value> {
        match self {
            RuleSetting::Severity(_) => None,
            RuleSetting::Config(config) => config.options.as_ref(),
        }
    }

    fn is_off(&self) -> bool {
        self.severity() == Some(RuleSeverity::Off)
    }
}

/// Severity override and rule-specific options
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    #[schemars(description = "Severity override; the rule default when omitted")]
    pub severity: Option<RuleSeverity>,

    #[schemars(description = "Options understood by the rule")]
    pub options: Option<serde_json::Value>,
}

impl Configuration {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| KestrelError::config_error(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| KestrelError::config_error(e.to_string()))
    }

    /// Load a `.toml` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| KestrelError::io_error(path, e))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(KestrelError::config_error(format!(
                "Unsupported file extension for '{}' (expected .toml or .json)",
                path.display()
            ))),
        }
    }

    /// JSON schema of the configuration file
    pub fn json_schema() -> serde_json::Value {
        schemars::schema_for!(Configuration).to_value()
    }

    /// Rules to run, in registry order, with options applied and severity
    /// resolved
    ///
    /// Every identifier in `rules` must name a registered rule.
    pub fn active_rules(&self, registry: &RuleRegistry) -> Result<Vec<ActiveRule>> {
        let linter = &self.linter;
        for id in linter.rules.keys() {
            registry.require(id)?;
        }
        if linter.enabled == Some(false) {
            tracing::info!("Linter disabled by configuration");
            return Ok(Vec::new());
        }

        let recommended = linter.recommended.unwrap_or(true);
        let mut active = Vec::new();
        for rule in registry.rules() {
            let description = rule.description();
            let setting = linter.rules.get(description.id);
            let enabled = match setting {
                Some(setting) => !setting.is_off(),
                None => recommended && !description.opt_in,
            };
            if !enabled {
                continue;
            }

            let configured = match setting.and_then(RuleSetting::options) {
                Some(options) => rule
                    .configure(options)
                    .map_err(|e| {
                        KestrelError::config_error(format!(
                            "Invalid options for '{}': {e}",
                            description.id
                        ))
                    })?
                    .unwrap_or_else(|| Arc::clone(rule)),
                None => Arc::clone(rule),
            };
            let severity = setting
                .and_then(RuleSetting::severity)
                .and_then(RuleSeverity::as_severity)
                .unwrap_or(description.severity);
            active.push(ActiveRule::new(configured, severity));
        }

        tracing::debug!(rules = active.len(), "Resolved active rules");
        Ok(active)
    }
}
