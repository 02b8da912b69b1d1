//! Host-side collaborators.
//!
//! The rule engine never inspects live execution state. A host adapter uses
//! these helpers to turn what its loader sees into the records the guard
//! consumes:
//! - `resolve_relative`: Turns a relative reference into an absolute path
//! - `ComponentIndex`: Maps source files to component paths
//! - `ChainBuilder`: Turns a raw stack into a `CallerChain`

mod chain;
mod index;
mod resolve;

pub use chain::{ChainBuilder, RawFrame};
pub use index::ComponentIndex;
pub use resolve::resolve_relative;
