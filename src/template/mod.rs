pub mod engine;
pub mod reconcile;

pub use engine::{
    canonicalize, placeholder, render_highlighted, render_preview, restore_placeholders,
    visible_text,
};
pub use reconcile::{reconcile, Patch, Reconciliation};
