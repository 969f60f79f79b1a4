pub mod arcs;
pub mod particles;
pub mod regions;
pub mod symbology;

pub use arcs::*;
pub use particles::*;
pub use regions::*;
pub use symbology::*;
