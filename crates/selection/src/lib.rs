//! The single shared "current selection" and its change notification.
//!
//! Every view reads the focus country, year, flow limit and metric from one
//! [`SelectionStore`] and writes back through [`SelectionStore::set`].

pub mod state;
pub mod store;

pub use state::*;
pub use store::*;
