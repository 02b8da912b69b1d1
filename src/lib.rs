pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod guard;
pub mod host;
pub mod matcher;
pub mod observer;
pub mod output;
pub mod trie;

pub use config::{GuardConfig, HookRegistry};
pub use descriptor::{CallerChain, CallerFrame, ImportDescriptor, Location, SubName};
pub use error::{ForbiddenImport, GuardError, Result};
pub use guard::{Caller, Guard, InterceptFilter};
pub use host::{ChainBuilder, ComponentIndex, RawFrame, resolve_relative};
pub use matcher::{Matcher, RuleValue, wrap};
pub use observer::{DefendingObserver, Observer, TracingObserver};
pub use trie::RuleTrie;
