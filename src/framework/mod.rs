pub mod editor;
pub mod library;
pub mod model;
pub mod session;

pub use editor::{FrameworkDraft, NewVariable};
pub use library::FrameworkLibrary;
pub use model::{Framework, SuggestedVariable, Variable, VariableMap};
pub use session::{AnalysisTicket, PreviewSession};
