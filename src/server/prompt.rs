use serde_json::{json, Value};

use crate::ai::envelope::GenerationConfig;

/// Renders the instructions sent upstream for each proxied task.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn analysis_prompt(&self, prompt_text: &str) -> String {
        format!(
            r#"Analyze this prompt's effectiveness (0-100 scale):

"{prompt_text}"

Rate each area (0-25 points):
• Specificity: How detailed and precise?
• Structure: Well-organized with clear flow?
• Context: Sufficient background information?
• Action Clarity: Clear expected outputs?

Return valid JSON only:
{{
  "total_score": 85,
  "breakdown": {{
    "specificity": {{"score": 22, "reasoning": "Good detail level", "improvement": "Add examples"}},
    "structure": {{"score": 21, "reasoning": "Well organized", "improvement": "Use sections"}},
    "context": {{"score": 20, "reasoning": "Adequate context", "improvement": "More background"}},
    "action_clarity": {{"score": 22, "reasoning": "Clear outputs", "improvement": "Specify format"}}
  }},
  "overall_suggestions": ["Add specific examples", "Structure with clear sections"]
}}"#
        )
    }

    pub fn suggestion_prompt(&self, text: &str) -> String {
        format!(
            "Based on the following text, suggest a list of 3-5 high-quality variables. \
             For each variable, provide a descriptive variable name (camelCase), the original \
             phrase or word it replaces, a short default value, and a hint explaining its \
             purpose. Ensure the variables are meaningful and capture key concepts or \
             changeable elements.\nText: \"{text}\""
        )
    }

    /// Low temperature JSON output, capped at 600 tokens.
    pub fn analysis_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(0.1),
            max_output_tokens: Some(600),
            ..GenerationConfig::json()
        }
    }

    pub fn suggestion_config(&self) -> GenerationConfig {
        GenerationConfig {
            response_schema: Some(suggestion_schema()),
            ..GenerationConfig::json()
        }
    }
}

fn suggestion_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "variableName": { "type": "STRING" },
                "originalText": { "type": "STRING" },
                "defaultValue": { "type": "STRING" },
                "hint": { "type": "STRING" }
            },
            "propertyOrdering": ["variableName", "originalText", "defaultValue", "hint"]
        }
    })
}
