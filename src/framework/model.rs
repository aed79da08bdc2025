use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Variables of a framework, keyed by variable name.
pub type VariableMap = BTreeMap<String, Variable>;

/// A named, substitutable span of literal template text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// The literal phrase this variable stands for. Matched case-insensitively.
    pub word: String,
    pub default_value: String,
    #[serde(default)]
    pub hint: String,
}

impl Variable {
    pub fn new(word: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            default_value: default_value.into(),
            hint: String::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }
}

/// A saved prompt template plus its named variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub name: String,
    pub text: String,
    #[serde(default)]
    pub variables: VariableMap,
}

impl Framework {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid framework definition")
    }

    /// Reads a framework definition file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read framework file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse framework file {}", path.display()))
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize framework")
    }
}

/// A variable proposed by the suggestion service, not yet part of a framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedVariable {
    pub variable_name: String,
    pub original_text: String,
    pub default_value: String,
    pub hint: String,
}

impl From<&SuggestedVariable> for Variable {
    fn from(suggestion: &SuggestedVariable) -> Self {
        Self {
            word: suggestion.original_text.clone(),
            default_value: suggestion.default_value.clone(),
            hint: suggestion.hint.clone(),
        }
    }
}
