pub mod iso;
pub mod math;
pub mod time;
pub mod years;

// Foundation crate: small, well-tested primitives only.
pub use iso::*;
pub use time::*;
pub use years::*;
