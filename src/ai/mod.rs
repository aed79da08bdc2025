pub mod analysis;
pub mod clock;
pub mod envelope;
pub mod governor;
pub mod heuristic;
pub mod retry;
pub mod score;
pub mod suggestion;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{AnalysisClient, AnalysisOptions, MIN_PROMPT_CHARS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use governor::{DailyCounter, RateGovernor, RateLimits};
pub use heuristic::fallback_score;
pub use retry::{send_with_retry, RetryPolicy};
pub use score::{Breakdown, EffectivenessScore, ScoreDetail, ScoreGrade, ScoreSource};
pub use suggestion::SuggestionClient;
pub use transport::{HttpTransport, Transport, TransportResponse};
