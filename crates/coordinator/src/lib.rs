//! The migration flow map: reacts to the shared selection, reloads corridors,
//! and keeps geometry, particles and descriptive text in step.

pub mod autoplay;
pub mod config;
pub mod controls;
pub mod coordinator;
pub mod narrative;
pub mod reload;
pub mod scene;

pub use autoplay::*;
pub use config::*;
pub use controls::*;
pub use coordinator::*;
pub use narrative::*;
pub use reload::*;
pub use scene::*;
