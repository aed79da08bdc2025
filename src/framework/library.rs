use log::info;

use crate::error::SaveError;
use crate::framework::Framework;

/// Frameworks saved during the current process. Nothing is written to disk.
#[derive(Debug, Default, Clone)]
pub struct FrameworkLibrary {
    frameworks: Vec<Framework>,
}

impl FrameworkLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Saves a framework that has a name, text and at least one variable.
    pub fn add(&mut self, framework: Framework) -> Result<(), SaveError> {
        if framework.name.trim().is_empty() {
            return Err(SaveError::MissingName);
        }
        if framework.text.trim().is_empty() {
            return Err(SaveError::MissingText);
        }
        if framework.variables.is_empty() {
            return Err(SaveError::NoVariables);
        }

        info!("Framework \"{}\" saved successfully!", framework.name);
        self.frameworks.push(framework);
        Ok(())
    }

    /// Frameworks whose name contains `term`, ignoring case. An empty term matches all.
    pub fn search(&self, term: &str) -> Vec<&Framework> {
        let needle = term.to_lowercase();
        self.frameworks
            .iter()
            .filter(|fw| fw.name.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Framework> {
        self.frameworks.iter().find(|fw| fw.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Framework> {
        self.frameworks.iter()
    }

    pub fn len(&self) -> usize {
        self.frameworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty()
    }
}
