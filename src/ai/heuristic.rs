//! Deterministic local scoring used whenever the scoring endpoint cannot answer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ai::score::{Breakdown, EffectivenessScore, ScoreDetail, ScoreSource};

const MIN_CATEGORY: u32 = 8;
const MAX_CATEGORY: u32 = 25;

static SPECIFIC_WORDS: Lazy<Regex> = Lazy::new(|| {
    keyword_set(&[
        "specific", "detailed", "example", "format", "style", "please", "create", "generate",
        "write", "explain", "describe",
    ])
});
static STRUCTURE_WORDS: Lazy<Regex> = Lazy::new(|| {
    keyword_set(&[
        "first", "then", "next", "finally", "step", "section", "bullet", "list",
    ])
});
static CONTEXT_WORDS: Lazy<Regex> = Lazy::new(|| {
    keyword_set(&[
        "context",
        "background",
        "scenario",
        "situation",
        "assume",
        "given",
    ])
});
static OUTPUT_WORDS: Lazy<Regex> = Lazy::new(|| {
    keyword_set(&[
        "output", "result", "response", "answer", "format", "provide", "return",
    ])
});

// Whole-word, ASCII-only case folding and word boundaries.
fn keyword_set(words: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i-u)\b(?:{})\b", words.join("|"))).expect("keyword pattern is valid")
}

/// Whitespace as prompts are trimmed and split: Unicode `White_Space` without NEL, plus the
/// byte order mark.
pub fn is_prompt_whitespace(c: char) -> bool {
    match c {
        '\u{0085}' => false,
        '\u{FEFF}' => true,
        c => c.is_whitespace(),
    }
}

/// `text` with leading and trailing prompt whitespace removed.
pub fn trim_prompt(text: &str) -> &str {
    text.trim_matches(is_prompt_whitespace)
}

fn count_words(text: &str) -> u32 {
    let words = trim_prompt(text)
        .split(is_prompt_whitespace)
        .filter(|word| !word.is_empty())
        .count();
    words.max(1) as u32
}

/// Linguistic signals the heuristic is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub word_count: u32,
    pub sentence_count: u32,
    pub has_question: bool,
    pub has_specific_words: bool,
    pub has_structure: bool,
    pub has_context: bool,
    pub has_output: bool,
}

impl Signals {
    pub fn detect(text: &str) -> Self {
        let word_count = count_words(text);
        let sentence_count = text
            .split(['.', '!', '?'])
            .filter(|fragment| !trim_prompt(fragment).is_empty())
            .count() as u32;

        Self {
            word_count,
            sentence_count,
            has_question: text.contains('?'),
            has_specific_words: SPECIFIC_WORDS.is_match(text),
            has_structure: STRUCTURE_WORDS.is_match(text),
            has_context: CONTEXT_WORDS.is_match(text),
            has_output: OUTPUT_WORDS.is_match(text),
        }
    }
}

/// Scores a prompt from keyword and length signals. Same input, same score.
pub fn fallback_score(text: &str) -> EffectivenessScore {
    score_signals(&Signals::detect(text))
}

pub fn score_signals(s: &Signals) -> EffectivenessScore {
    let specificity = clamp(
        (s.word_count / 3 + bonus(s.has_specific_words, 8) + bonus(s.sentence_count > 2, 3))
            .min(MAX_CATEGORY),
    );
    let structure = clamp(if s.has_structure { 20 } else { 12 } + bonus(s.sentence_count > 3, 5));
    let context =
        clamp((if s.has_context { 18 } else { 10 } + s.word_count / 15).min(MAX_CATEGORY));
    let action_clarity = clamp(
        if s.has_output { 20 } else { 10 }
            + bonus(s.has_question, 5)
            + bonus(s.has_specific_words, 3),
    );

    EffectivenessScore {
        total_score: specificity + structure + context + action_clarity,
        breakdown: Breakdown {
            specificity: ScoreDetail {
                score: specificity,
                reasoning: format!(
                    "Analysis based on {} words and {} specific terminology",
                    s.word_count,
                    if s.has_specific_words { "good" } else { "limited" }
                ),
                improvement: pick(
                    s.has_specific_words,
                    "Consider adding concrete examples",
                    "Add more specific details and examples",
                ),
            },
            structure: ScoreDetail {
                score: structure,
                reasoning: if s.has_structure {
                    "Good structural indicators found".to_string()
                } else {
                    format!("Basic structure with {} sentences", s.sentence_count)
                },
                improvement: pick(
                    s.has_structure,
                    "Consider clearer section breaks",
                    "Organize with clear sections and logical flow",
                ),
            },
            context: ScoreDetail {
                score: context,
                reasoning: pick(
                    s.has_context,
                    "Context indicators present",
                    "Limited contextual information provided",
                ),
                improvement: pick(
                    s.has_context,
                    "Expand background details",
                    "Provide more background information and constraints",
                ),
            },
            action_clarity: ScoreDetail {
                score: action_clarity,
                reasoning: pick(
                    s.has_output,
                    "Clear output expectations",
                    "Action clarity needs improvement",
                ),
                improvement: pick(
                    s.has_output,
                    "Specify exact format desired",
                    "Clearly specify expected outputs and format",
                ),
            },
        },
        overall_suggestions: vec![
            pick(
                s.word_count < 20,
                "Expand your prompt with more details",
                "Good length, consider organizing better",
            ),
            pick(
                !s.has_specific_words,
                "Use more specific and precise language",
                "Add concrete examples",
            ),
            pick(
                !s.has_output,
                "Clearly specify what output format you want",
                "Consider adding success criteria",
            ),
        ],
        source: Some(ScoreSource::Heuristic),
    }
}

fn clamp(score: u32) -> u32 {
    score.clamp(MIN_CATEGORY, MAX_CATEGORY)
}

fn bonus(condition: bool, points: u32) -> u32 {
    if condition {
        points
    } else {
        0
    }
}

fn pick(condition: bool, yes: &str, no: &str) -> String {
    let chosen = if condition { yes } else { no };
    chosen.to_string()
}
