//! Bilateral migration corridors: decoding, indexing and lookup.

pub mod directory;
pub mod error;
pub mod index;
pub mod names;
pub mod record;
pub mod source;
pub mod table_text;

pub use directory::*;
pub use error::*;
pub use index::*;
pub use record::*;
pub use source::*;
