// Core data models for phasemap
// Phases and their colors, tracking-sheet rows and scene objects

pub mod color;
pub mod phase;
pub mod record;
pub mod scene;

pub use color::*;
pub use phase::*;
pub use record::*;
pub use scene::*;
