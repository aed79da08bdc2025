use serde::{Deserialize, Serialize};

/// Where a score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Model,
    Heuristic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDetail {
    pub score: u32,
    pub reasoning: String,
    pub improvement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub specificity: ScoreDetail,
    pub structure: ScoreDetail,
    pub context: ScoreDetail,
    pub action_clarity: ScoreDetail,
}

impl Breakdown {
    pub fn categories(&self) -> [(&'static str, &ScoreDetail); 4] {
        [
            ("specificity", &self.specificity),
            ("structure", &self.structure),
            ("context", &self.context),
            ("action clarity", &self.action_clarity),
        ]
    }
}

/// A 0-100 rating of a finished prompt across four 0-25 categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectivenessScore {
    pub total_score: u32,
    pub breakdown: Breakdown,
    #[serde(default)]
    pub overall_suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ScoreSource>,
}

impl EffectivenessScore {
    /// Whether `total_score` is the sum of the category scores. Model output is not forced
    /// to satisfy this.
    pub fn is_consistent(&self) -> bool {
        let sum: u32 = self
            .breakdown
            .categories()
            .iter()
            .map(|(_, detail)| detail.score)
            .sum();
        sum == self.total_score
    }

    pub fn with_source(mut self, source: ScoreSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn grade(&self) -> ScoreGrade {
        ScoreGrade::for_total(self.total_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreGrade {
    Strong,
    Fair,
    Weak,
}

impl ScoreGrade {
    pub fn for_total(total: u32) -> Self {
        match total {
            80.. => ScoreGrade::Strong,
            60..=79 => ScoreGrade::Fair,
            _ => ScoreGrade::Weak,
        }
    }

    pub fn for_category(score: u32) -> Self {
        match score {
            20.. => ScoreGrade::Strong,
            15..=19 => ScoreGrade::Fair,
            _ => ScoreGrade::Weak,
        }
    }
}
