//! # Editing Style System
//!
//! A closed set of editing styles behind the [`EditStyle`] trait. A style
//! decides which content suits it and which family of transition rules the
//! selector applies; the [`StyleRegistry`] resolves styles by name.
//!
//! ## Built-in Styles
//!
//! - **dynamic**: Hard cuts, action and crowd footage
//! - **smooth**: Dissolves between unrelated shots, landscapes and portraits
//! - **mixed**: Alternating dissolves and wipes
//! - **cinematic**: Straight cuts between wides and close-ups
//!
//! ## Usage
//!
//! ```rust
//! use beatcut::styles::StyleRegistry;
//!
//! let registry = StyleRegistry::new();
//! let smooth = registry.get_style("smooth").unwrap();
//! assert_eq!(smooth.name(), "smooth");
//! ```

pub mod registry;
pub mod traits;

mod cinematic;
mod dynamic;
mod mixed;
mod smooth;

pub use registry::StyleRegistry;
pub use traits::{EditStyle, StyleKind, StyleMetadata};

pub use cinematic::CinematicStyle;
pub use dynamic::DynamicStyle;
pub use mixed::MixedStyle;
pub use smooth::SmoothStyle;
