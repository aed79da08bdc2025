use log::{debug, info};

use crate::error::{SaveError, TemplateError, VariableError};
use crate::framework::{Framework, SuggestedVariable, Variable, VariableMap};
use crate::template;

pub const STARTER_TEXT: &str =
    "Add your amazing prompt here and select a word or phrase to create a variable";

/// Input for creating a variable from a selected span of template text.
#[derive(Debug, Clone, Default)]
pub struct NewVariable {
    pub name: String,
    pub word: String,
    pub default_value: String,
    pub hint: String,
}

/// A framework under construction: template text, variables and pending suggestions.
#[derive(Debug, Clone)]
pub struct FrameworkDraft {
    name: String,
    text: String,
    variables: VariableMap,
    suggestions: Vec<SuggestedVariable>,
}

impl Default for FrameworkDraft {
    fn default() -> Self {
        Self::new(STARTER_TEXT)
    }
}

impl From<Framework> for FrameworkDraft {
    fn from(framework: Framework) -> Self {
        Self {
            name: framework.name,
            text: framework.text,
            variables: framework.variables,
            suggestions: Vec::new(),
        }
    }
}

impl FrameworkDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            text: text.into(),
            variables: VariableMap::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    pub fn suggestions(&self) -> &[SuggestedVariable] {
        &self.suggestions
    }

    /// Adds a variable. An empty default value falls back to the selected word.
    pub fn create_variable(&mut self, new: NewVariable) -> Result<(), VariableError> {
        if new.name.is_empty() {
            return Err(VariableError::MissingName);
        }
        if new.word.is_empty() {
            return Err(VariableError::MissingWord);
        }
        if self.variables.contains_key(&new.name) {
            return Err(VariableError::NameCollision { name: new.name });
        }

        let default_value = if new.default_value.is_empty() {
            new.word.clone()
        } else {
            new.default_value
        };

        debug!("Creating variable {} for {:?}", new.name, new.word);
        self.variables.insert(
            new.name,
            Variable {
                word: new.word,
                default_value,
                hint: new.hint,
            },
        );
        Ok(())
    }

    pub fn edit_variable(
        &mut self,
        name: &str,
        default_value: impl Into<String>,
        hint: impl Into<String>,
    ) -> Result<(), VariableError> {
        let variable = self
            .variables
            .get_mut(name)
            .ok_or_else(|| VariableError::Unknown {
                name: name.to_string(),
            })?;

        variable.default_value = default_value.into();
        variable.hint = hint.into();
        Ok(())
    }

    /// Removes a variable and puts its word back wherever its `{name}` token remains.
    pub fn delete_variable(&mut self, name: &str) -> Result<Variable, VariableError> {
        let variable = self
            .variables
            .remove(name)
            .ok_or_else(|| VariableError::Unknown {
                name: name.to_string(),
            })?;

        self.text = template::restore_placeholders(&self.text, name, &variable.word);
        debug!("Deleted variable {name}");
        Ok(variable)
    }

    /// Stores raw text edited on the rendered surface in canonical template form.
    pub fn apply_edit(&mut self, raw_text: &str) {
        self.text = template::canonicalize(raw_text, &self.variables);
    }

    pub fn render_highlighted(&self) -> Result<String, TemplateError> {
        template::render_highlighted(&self.text, &self.variables)
    }

    /// Replaces the pending suggestions with a fresh batch.
    pub fn set_suggestions(&mut self, suggestions: Vec<SuggestedVariable>) {
        self.suggestions = suggestions;
    }

    /// Moves a pending suggestion into the variable set. On a name collision the suggestion
    /// stays pending and the variables are left untouched.
    pub fn accept_suggestion(&mut self, index: usize) -> Result<String, VariableError> {
        let suggestion = self
            .suggestions
            .get(index)
            .ok_or(VariableError::NoSuchSuggestion { index })?;

        if self.variables.contains_key(&suggestion.variable_name) {
            return Err(VariableError::NameCollision {
                name: suggestion.variable_name.clone(),
            });
        }

        let suggestion = self.suggestions.remove(index);
        let name = suggestion.variable_name.clone();
        self.variables.insert(name.clone(), Variable::from(&suggestion));

        info!("Variable \"{name}\" added!");
        Ok(name)
    }

    /// Validates the draft and produces the framework to hand to a library.
    pub fn finish(&self) -> Result<Framework, SaveError> {
        if self.name.trim().is_empty() {
            return Err(SaveError::MissingName);
        }
        if self.text.trim().is_empty() {
            return Err(SaveError::MissingText);
        }
        if self.variables.is_empty() {
            return Err(SaveError::NoVariables);
        }

        Ok(Framework {
            name: self.name.clone(),
            text: self.text.clone(),
            variables: self.variables.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_variable(name: &str, word: &str) -> NewVariable {
        NewVariable {
            name: name.to_string(),
            word: word.to_string(),
            ..Default::default()
        }
    }

    fn suggestion(name: &str, text: &str) -> SuggestedVariable {
        SuggestedVariable {
            variable_name: name.to_string(),
            original_text: text.to_string(),
            default_value: format!("{text} default"),
            hint: format!("{name} hint"),
        }
    }

    #[test]
    fn starts_from_starter_text() {
        let draft = FrameworkDraft::default();
        assert_eq!(draft.text(), STARTER_TEXT);
        assert!(draft.variables().is_empty());
    }

    #[test]
    fn create_variable_defaults_to_word() {
        let mut draft = FrameworkDraft::new("Write about cats");
        draft.create_variable(new_variable("topic", "cats")).unwrap();

        let variable = &draft.variables()["topic"];
        assert_eq!(variable.word, "cats");
        assert_eq!(variable.default_value, "cats");
        assert_eq!(variable.hint, "");
    }

    #[test]
    fn name_collision_leaves_map_untouched() {
        let mut draft = FrameworkDraft::new("Write about cats and dogs");
        draft.create_variable(new_variable("topic", "cats")).unwrap();
        let before = draft.variables().clone();

        let err = draft
            .create_variable(new_variable("topic", "dogs"))
            .unwrap_err();

        assert_eq!(
            err,
            VariableError::NameCollision {
                name: "topic".to_string()
            }
        );
        assert_eq!(draft.variables(), &before);
    }

    #[test]
    fn create_requires_name_and_word() {
        let mut draft = FrameworkDraft::new("text");
        assert_eq!(
            draft.create_variable(new_variable("", "text")),
            Err(VariableError::MissingName)
        );
        assert_eq!(
            draft.create_variable(new_variable("v", "")),
            Err(VariableError::MissingWord)
        );
        assert!(draft.variables().is_empty());
    }

    #[test]
    fn edit_changes_default_and_hint_only() {
        let mut draft = FrameworkDraft::new("Write about cats");
        draft.create_variable(new_variable("topic", "cats")).unwrap();
        draft.edit_variable("topic", "birds", "The subject").unwrap();

        let variable = &draft.variables()["topic"];
        assert_eq!(variable.word, "cats");
        assert_eq!(variable.default_value, "birds");
        assert_eq!(variable.hint, "The subject");

        assert!(matches!(
            draft.edit_variable("missing", "x", "y"),
            Err(VariableError::Unknown { .. })
        ));
    }

    #[test]
    fn deleting_variable_restores_text() {
        let mut draft = FrameworkDraft::new("I like {pet}");
        draft.create_variable(new_variable("pet", "cats")).unwrap();

        let removed = draft.delete_variable("pet").unwrap();

        assert_eq!(removed.word, "cats");
        assert_eq!(draft.text(), "I like cats");
        assert!(draft.variables().is_empty());
    }

    #[test]
    fn apply_edit_canonicalizes_tokens() {
        let mut draft = FrameworkDraft::new("I like cats");
        draft.create_variable(new_variable("pet", "cats")).unwrap();

        draft.apply_edit("I really like {pet}");

        assert_eq!(draft.text(), "I really like cats");
        assert!(draft
            .render_highlighted()
            .unwrap()
            .contains("data-variable-name=\"pet\""));
    }

    #[test]
    fn accepting_suggestion_removes_it_from_pending() {
        let mut draft = FrameworkDraft::new("Write a friendly note about cats");
        draft.set_suggestions(vec![suggestion("tone", "friendly"), suggestion("topic", "cats")]);

        let name = draft.accept_suggestion(1).unwrap();

        assert_eq!(name, "topic");
        assert_eq!(draft.suggestions().len(), 1);
        assert_eq!(draft.suggestions()[0].variable_name, "tone");
        assert_eq!(draft.variables()["topic"].default_value, "cats default");
    }

    #[test]
    fn colliding_suggestion_stays_pending() {
        let mut draft = FrameworkDraft::new("Write about cats");
        draft.create_variable(new_variable("topic", "cats")).unwrap();
        draft.set_suggestions(vec![suggestion("topic", "Write")]);

        let err = draft.accept_suggestion(0).unwrap_err();

        assert!(matches!(err, VariableError::NameCollision { .. }));
        assert_eq!(draft.suggestions().len(), 1);
        assert_eq!(draft.variables()["topic"].word, "cats");
    }

    #[test]
    fn accepting_out_of_range_is_rejected() {
        let mut draft = FrameworkDraft::new("text");
        assert_eq!(
            draft.accept_suggestion(3),
            Err(VariableError::NoSuchSuggestion { index: 3 })
        );
    }

    #[test]
    fn finish_enforces_save_invariant() {
        let mut draft = FrameworkDraft::new("Write about cats");
        assert_eq!(draft.finish(), Err(SaveError::MissingName));

        draft.set_name("Blog");
        assert_eq!(draft.finish(), Err(SaveError::NoVariables));

        draft.create_variable(new_variable("topic", "cats")).unwrap();
        let framework = draft.finish().unwrap();
        assert_eq!(framework.name, "Blog");
        assert_eq!(framework.variables.len(), 1);

        let mut blank = FrameworkDraft::new("   ");
        blank.set_name("Blank");
        assert_eq!(blank.finish(), Err(SaveError::MissingText));
    }
}
