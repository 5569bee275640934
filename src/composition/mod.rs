//! # Edit Decision Engine
//!
//! Turns beat analysis of a soundtrack and scene analysis of the footage into
//! an edit decision list: cut points from the beats, a scored scene for every
//! interval, and a fitted transition at each cut.

pub mod cancel;
pub mod engine;
pub mod pool;
pub mod scoring;
pub mod session;
pub mod transition;

// Re-exports for convenience
pub use cancel::CancelToken;
pub use engine::{CutPoint, EditDecisionEngine, EditWarning, GeneratedEdit};
pub use session::{join_analysis_tasks, AnalysisCollector};
pub use transition::{content_continuity, TransitionSelector};
