//! # Link Model
//!
//! Request-scoped values that flow through the link pipeline: the record a
//! link set is computed for, the scope it classifies into, the criteria
//! objects templates produce, and the HAL links that come out the other end.
//!
//! Design rule: pure data. No I/O, no state, no async.

pub mod scope;
pub mod query;
pub mod document;
pub mod link;

pub use scope::EntityScope;
pub use query::{Query, QueryObject};
pub use document::Document;
pub use link::{Curie, HalLink, LinkCollection};
