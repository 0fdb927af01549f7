//! Domain types shared by every stage of a run.

pub mod bar;
pub mod candidate;
pub mod position;

pub use bar::{last_close, Bar};
pub use candidate::Candidate;
pub use position::{ExitDecision, ExitReason, ExitReview, SavedPosition};
