//! Configuration for the induction transform

use induct_term::Sort;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Naming and defaults used when building induction artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Main module of the base semantics
    pub base_main_module: String,

    /// Syntax module of the base semantics
    pub base_syntax_module: String,

    /// Source file of the base semantics, listed in the generated definition's `requires`
    pub base_source: PathBuf,

    /// Stem of the generated module names (`induction-rules` → `INDUCTION-RULES`)
    pub semantics_name: String,

    /// Prefix of the witness symbol; the variable name is appended
    pub witness_prefix: String,

    /// Priority of the induction rule (lower wins over default rules)
    pub rule_priority: u32,

    pub rule_label: String,

    pub claim_label: String,

    /// Sort assumed for the induction variable when the claim leaves it implicit.
    /// `None` makes an implicit sort an error.
    pub default_sort: Option<Sort>,

    /// Name of the `requires` predicate that may carry the annotation
    pub annotation_predicate: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            base_main_module: "IMP".to_string(),
            base_syntax_module: "IMP-SYNTAX".to_string(),
            base_source: PathBuf::from("imp.md"),
            semantics_name: "induction-rules".to_string(),
            witness_prefix: "symbol".to_string(),
            rule_priority: 1,
            rule_label: "induction-rule".to_string(),
            claim_label: "induction-claim".to_string(),
            default_sort: Some(Sort::int()),
            annotation_predicate: "decreasesInduction".to_string(),
        }
    }
}

impl TransformConfig {
    /// `INDUCTION-RULES`
    pub fn semantics_module_name(&self) -> String {
        self.semantics_name.to_uppercase()
    }

    /// `INDUCTION-RULES-SYNTAX`
    pub fn syntax_module_name(&self) -> String {
        format!("{}-SYNTAX", self.semantics_module_name())
    }

    /// `INDUCTION-RULES-SPEC`
    pub fn claim_module_name(&self) -> String {
        format!("{}-SPEC", self.semantics_module_name())
    }

    pub fn witness_name(&self, variable: &str) -> String {
        format!("{}{}", self.witness_prefix, variable)
    }
}

/// Builder for TransformConfig
#[derive(Debug, Default)]
pub struct TransformConfigBuilder {
    base_main_module: Option<String>,
    base_syntax_module: Option<String>,
    base_source: Option<PathBuf>,
    semantics_name: Option<String>,
    witness_prefix: Option<String>,
    rule_priority: Option<u32>,
    default_sort: Option<Option<Sort>>,
}

impl TransformConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_main_module(mut self, value: impl Into<String>) -> Self {
        self.base_main_module = Some(value.into());
        self
    }

    pub fn base_syntax_module(mut self, value: impl Into<String>) -> Self {
        self.base_syntax_module = Some(value.into());
        self
    }

    pub fn base_source(mut self, value: impl Into<PathBuf>) -> Self {
        self.base_source = Some(value.into());
        self
    }

    pub fn semantics_name(mut self, value: impl Into<String>) -> Self {
        self.semantics_name = Some(value.into());
        self
    }

    pub fn witness_prefix(mut self, value: impl Into<String>) -> Self {
        self.witness_prefix = Some(value.into());
        self
    }

    pub fn rule_priority(mut self, value: u32) -> Self {
        self.rule_priority = Some(value);
        self
    }

    /// `None` requires every induction variable to carry an explicit sort
    pub fn default_sort(mut self, value: Option<Sort>) -> Self {
        self.default_sort = Some(value);
        self
    }

    pub fn build(self) -> TransformConfig {
        let defaults = TransformConfig::default();
        TransformConfig {
            base_main_module: self.base_main_module.unwrap_or(defaults.base_main_module),
            base_syntax_module: self
                .base_syntax_module
                .unwrap_or(defaults.base_syntax_module),
            base_source: self.base_source.unwrap_or(defaults.base_source),
            semantics_name: self.semantics_name.unwrap_or(defaults.semantics_name),
            witness_prefix: self.witness_prefix.unwrap_or(defaults.witness_prefix),
            rule_priority: self.rule_priority.unwrap_or(defaults.rule_priority),
            default_sort: self.default_sort.unwrap_or(defaults.default_sort),
            ..defaults
        }
    }
}
