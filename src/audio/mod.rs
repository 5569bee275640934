//! # Audio Analysis Input
//!
//! Beat and energy analysis of the soundtrack. The analysis itself is done by
//! an external analyzer; this module models its output and loads it from JSON.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use beatcut::audio::AudioAnalysisLoader;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let analysis = AudioAnalysisLoader::load("song.analysis.json").await?;
//!
//! println!("Tempo: {} BPM", analysis.tempo);
//! println!("Found {} beats over {:.1}s", analysis.beats.len(), analysis.duration());
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod types;

pub use loader::AudioAnalysisLoader;
pub use types::{AudioAnalysis, Beat, EnergySegment, NEUTRAL_ENERGY};
