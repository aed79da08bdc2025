pub mod ai;
pub mod cli;
pub mod config;
pub mod error;
pub mod framework;
pub mod server;
pub mod template;

pub use ai::{AnalysisClient, EffectivenessScore, SuggestionClient};
pub use cli::{Cli, CommandHandler, Commands};
pub use config::Settings;
pub use error::{ClientError, SaveError, TemplateError, VariableError};
pub use framework::{Framework, FrameworkDraft, FrameworkLibrary, PreviewSession, Variable};
