pub mod geodesy;
pub mod projection;
pub mod scale;
pub mod vec;

pub use geodesy::*;
pub use projection::*;
pub use scale::*;
pub use vec::*;
