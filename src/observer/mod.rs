//! Load-event observers.
//!
//! - `DefendingObserver`: Checks each load against the deny rules
//! - `TracingObserver`: Prints an indented enter/exit trace of loads

mod defending;
mod tracer;

use std::sync::Arc;

pub use defending::DefendingObserver;
pub use tracer::TracingObserver;

use crate::descriptor::{CallerChain, ImportDescriptor};
use crate::error::Result;

/// Receives the begin/end events of every intercepted load.
///
/// Observers are keyed by [`Observer::name`] inside a guard; registering a
/// second observer under the same name replaces the first.
pub trait Observer: Send + Sync {
    fn name(&self) -> &str;

    /// Called before the load runs. An error aborts the load.
    fn on_begin(&self, import: &ImportDescriptor, chain: &CallerChain, strict: bool)
    -> Result<()>;

    /// Called after the load finished or failed.
    fn on_end(&self, _import: &ImportDescriptor, _chain: &CallerChain, _strict: bool) {}

    /// The rule-enforcing view of this observer, if it has one.
    fn as_defender(&self) -> Option<&DefendingObserver> {
        None
    }
}

pub type BoxedObserver = Arc<dyn Observer>;
