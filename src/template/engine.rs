//! Variable substitution over template text.
//!
//! All word-based operations walk the variables longest word first and re-scan the
//! progressively rewritten string once per variable. A shorter word therefore never matches
//! inside a phrase that a longer variable already consumed, but it *can* match inside text a
//! previous substitution produced (chip markup or a preview value). That ordering artifact is
//! kept as-is.

use log::debug;
use regex::{NoExpand, Regex, RegexBuilder};
use std::collections::HashMap;

use crate::error::TemplateError;
use crate::framework::{Variable, VariableMap};

const CHIP_CLASS: &str = "bg-green-200 text-green-800 font-semibold px-1 rounded-md cursor-pointer";

/// Placeholder token shown for a variable inside rendered or edited text.
pub fn placeholder(name: &str) -> String {
    format!("{{{name}}}")
}

/// Wraps every occurrence of each variable's word in a clickable `{name}` chip.
pub fn render_highlighted(template: &str, variables: &VariableMap) -> Result<String, TemplateError> {
    let mut html = template.to_string();

    for (name, variable) in by_longest_word(variables) {
        let chip = chip_markup(name, variable);
        html = word_matcher(&variable.word)?
            .replace_all(&html, NoExpand(&chip))
            .into_owned();
    }

    Ok(html)
}

/// Converts raw edited text back to template form: every `{name}` token becomes the
/// variable's original word. Matching is exact and case-sensitive.
pub fn canonicalize(raw_text: &str, variables: &VariableMap) -> String {
    let mut text = raw_text.to_string();

    for (name, variable) in sorted_by_word_len(variables) {
        text = text.replace(&placeholder(name), &variable.word);
    }

    text
}

/// Replaces each variable's word with its preview value, or its default when no preview
/// value was supplied.
pub fn render_preview(
    template: &str,
    variables: &VariableMap,
    preview_values: &HashMap<String, String>,
) -> Result<String, TemplateError> {
    let mut preview = template.to_string();

    for (name, variable) in by_longest_word(variables) {
        let value = preview_values
            .get(name)
            .unwrap_or(&variable.default_value);
        preview = word_matcher(&variable.word)?
            .replace_all(&preview, NoExpand(value))
            .into_owned();
    }

    Ok(preview)
}

/// Puts the literal word back wherever the `{name}` token of a deleted variable remains.
pub fn restore_placeholders(template: &str, name: &str, word: &str) -> String {
    template.replace(&placeholder(name), word)
}

/// Text content of rendered markup, tags removed.
pub fn visible_text(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;

    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    text
}

fn chip_markup(name: &str, variable: &Variable) -> String {
    format!(
        "<span class=\"{CHIP_CLASS}\" data-variable-name=\"{name}\" title=\"Original: '{}', Default: '{}'\">{}</span>",
        variable.word,
        variable.default_value,
        placeholder(name)
    )
}

/// Variables with a non-empty word, longest first.
fn by_longest_word(variables: &VariableMap) -> Vec<(&String, &Variable)> {
    sorted_by_word_len(variables)
        .into_iter()
        .filter(|(name, variable)| {
            if variable.word.is_empty() {
                debug!("Skipping variable {name} with an empty word");
                false
            } else {
                true
            }
        })
        .collect()
}

// Lengths are compared in UTF-16 code units; the sort is stable so ties keep name order.
fn sorted_by_word_len(variables: &VariableMap) -> Vec<(&String, &Variable)> {
    let mut sorted: Vec<_> = variables.iter().collect();
    sorted.sort_by_key(|(_, variable)| std::cmp::Reverse(variable.word.encode_utf16().count()));
    sorted
}

fn word_matcher(word: &str) -> Result<Regex, TemplateError> {
    RegexBuilder::new(&regex::escape(word))
        .case_insensitive(true)
        .build()
        .map_err(|source| TemplateError::Pattern {
            word: word.to_string(),
            source,
        })
}
