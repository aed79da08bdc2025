use std::collections::HashMap;

use crate::error::{TemplateError, VariableError};
use crate::framework::Framework;
use crate::template;

/// Snapshot of the preview handed to an analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    generation: u64,
    pub text: String,
}

/// Filling in one framework's variables and tracking which analysis result is still current.
///
/// Every value change bumps a generation counter; a result obtained with an older ticket is
/// stale and should be dropped by the caller.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    framework: Framework,
    values: HashMap<String, String>,
    generation: u64,
}

impl PreviewSession {
    pub fn new(framework: Framework) -> Self {
        let values = framework
            .variables
            .iter()
            .map(|(name, variable)| (name.clone(), variable.default_value.clone()))
            .collect();

        Self {
            framework,
            values,
            generation: 0,
        }
    }

    pub fn framework(&self) -> &Framework {
        &self.framework
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<(), VariableError> {
        if !self.framework.variables.contains_key(name) {
            return Err(VariableError::Unknown {
                name: name.to_string(),
            });
        }

        self.values.insert(name.to_string(), value.into());
        self.generation += 1;
        Ok(())
    }

    pub fn preview(&self) -> Result<String, TemplateError> {
        template::render_preview(&self.framework.text, &self.framework.variables, &self.values)
    }

    pub fn begin_analysis(&self) -> Result<AnalysisTicket, TemplateError> {
        Ok(AnalysisTicket {
            generation: self.generation,
            text: self.preview()?,
        })
    }

    pub fn is_current(&self, ticket: &AnalysisTicket) -> bool {
        ticket.generation == self.generation
    }
}
