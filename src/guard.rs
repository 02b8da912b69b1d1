//! Guard orchestrator: observer registry, enforcement flags, decision API.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::descriptor::{CallerChain, CallerFrame, ImportDescriptor};
use crate::error::{ForbiddenImport, Result};
use crate::matcher::{Matcher, RuleValue};
use crate::observer::{BoxedObserver, DefendingObserver, Observer, TracingObserver};
use crate::trie::TrieNode;

/// Decides which load events reach the observers at all.
///
/// Hosts use it to keep their own bootstrap components out of the rule
/// engine.
#[derive(Debug, Clone)]
pub struct InterceptFilter {
    skip: HashSet<String>,
    skip_private: bool,
}

impl Default for InterceptFilter {
    fn default() -> Self {
        Self {
            skip: HashSet::new(),
            skip_private: true,
        }
    }
}

impl InterceptFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip.extend(components.into_iter().map(Into::into));
        self
    }

    pub fn with_skip_private(mut self, skip_private: bool) -> Self {
        self.skip_private = skip_private;
        self
    }

    pub fn should_intercept(&self, component_path: &str) -> bool {
        if self.skip.contains(component_path) {
            return false;
        }
        !(self.skip_private && component_path.starts_with('_'))
    }
}

/// Caller argument of [`Guard::is_import_allowed`].
#[derive(Debug, Clone)]
pub enum Caller {
    /// Bare component path; synthesized into a depth-0 frame.
    Component(String),
    Frame(CallerFrame),
}

impl Caller {
    fn into_frame(self, top_level: bool) -> CallerFrame {
        match self {
            Self::Component(path) => CallerFrame::from_component(path, top_level),
            Self::Frame(frame) => frame,
        }
    }
}

impl From<&str> for Caller {
    fn from(value: &str) -> Self {
        Self::Component(value.to_string())
    }
}

impl From<String> for Caller {
    fn from(value: String) -> Self {
        Self::Component(value)
    }
}

impl From<CallerFrame> for Caller {
    fn from(value: CallerFrame) -> Self {
        Self::Frame(value)
    }
}

#[derive(Debug, Clone, Default)]
struct GuardState {
    enabled: bool,
    strict: bool,
    entrypoint: Option<String>,
}

/// Owns the active observers and dispatches load events to them.
///
/// Construct one per host program and hand it to the host's interception
/// adapter, which calls [`Guard::intercept`] (or the begin/end pair) for
/// every load.
#[derive(Default)]
pub struct Guard {
    observers: RwLock<Vec<BoxedObserver>>,
    state: RwLock<GuardState>,
    filter: RwLock<InterceptFilter>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `observer`, replacing any observer with the same name in place.
    pub fn register(&self, observer: BoxedObserver) {
        let mut observers = self.observers.write();
        match observers.iter_mut().find(|o| o.name() == observer.name()) {
            Some(slot) => *slot = observer,
            None => observers.push(observer),
        }
    }

    pub fn unregister(&self, name: &str) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|o| o.name() != name);
        observers.len() != before
    }

    pub fn observer_names(&self) -> Vec<String> {
        self.observers
            .read()
            .iter()
            .map(|o| o.name().to_string())
            .collect()
    }

    /// Register the stdout tracer.
    pub fn trace(&self) {
        self.register(Arc::new(TracingObserver::new()));
    }

    /// Replace the deny rules with a fresh trie, resetting deduplication.
    pub fn set_deny_rules<I, K, V>(&self, rules: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RuleValue>,
    {
        self.register(Arc::new(DefendingObserver::new(rules)));
    }

    /// Run `f` against the observer registered as the defender.
    ///
    /// `None` when nothing is registered under [`DefendingObserver::NAME`]
    /// or the observer there does not enforce rules.
    pub fn with_defender<R>(&self, f: impl FnOnce(&DefendingObserver) -> R) -> Option<R> {
        let observers = self.observers.read();
        observers
            .iter()
            .find(|o| o.name() == DefendingObserver::NAME)
            .and_then(|o| o.as_defender())
            .map(f)
    }

    pub fn has_defender(&self) -> bool {
        self.with_defender(|_| ()).is_some()
    }

    /// Rule-bearing paths at or below `prefix` with their matcher display.
    pub fn rules_under(&self, prefix: &str) -> Vec<(String, String)> {
        self.with_defender(|defender| {
            let nodes: Vec<&TrieNode<Matcher>> = if prefix.is_empty() {
                defender.rules().rules()
            } else {
                defender.rules().starts_with(prefix)
            };
            nodes
                .into_iter()
                .filter_map(|node| Some((node.path().to_string(), node.rule()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
    }

    /// Pure query: would `caller` be allowed to load `imported`?
    ///
    /// `top_level` only applies when `caller` is a bare component path.
    /// Deduplication state is never touched.
    pub fn is_import_allowed(
        &self,
        caller: impl Into<Caller>,
        imported: impl Into<ImportDescriptor>,
        top_level: bool,
    ) -> bool {
        let frame = caller.into().into_frame(top_level);
        let import = imported.into();
        self.with_defender(|defender| defender.is_import_allowed(&import, &frame))
            .unwrap_or(true)
    }

    pub fn enable(&self, strict: bool, entrypoint: Option<String>) {
        let mut state = self.state.write();
        state.enabled = true;
        state.strict = strict;
        state.entrypoint = entrypoint;
        info!(strict, entrypoint = ?state.entrypoint, "Import guard enabled");
    }

    pub fn disable(&self) {
        self.state.write().enabled = false;
        info!("Import guard disabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    pub fn is_strict(&self) -> bool {
        self.state.read().strict
    }

    /// Boundary file beyond which caller chains are not walked.
    pub fn entrypoint(&self) -> Option<String> {
        self.state.read().entrypoint.clone()
    }

    pub fn set_filter(&self, filter: InterceptFilter) {
        *self.filter.write() = filter;
    }

    pub fn should_intercept(&self, component_path: &str) -> bool {
        self.filter.read().should_intercept(component_path)
    }

    /// Dispatch a load-begin event to every observer in registration order.
    ///
    /// Returns the number of observers that began, followed by the first
    /// error if one aborted the dispatch.
    fn begin(
        &self,
        observers: &[BoxedObserver],
        import: &ImportDescriptor,
        chain: &CallerChain,
        strict: bool,
    ) -> (usize, Result<()>) {
        for (began, observer) in observers.iter().enumerate() {
            if let Err(e) = observer.on_begin(import, chain, strict) {
                return (began, Err(e));
            }
        }
        (observers.len(), Ok(()))
    }

    fn end(
        &self,
        observers: &[BoxedObserver],
        import: &ImportDescriptor,
        chain: &CallerChain,
        strict: bool,
    ) {
        for observer in observers {
            observer.on_end(import, chain, strict);
        }
    }

    fn observes(&self, import: &ImportDescriptor) -> bool {
        self.is_enabled() && self.should_intercept(&import.component_path)
    }

    /// Load-begin event from a host adapter.
    ///
    /// An error stops dispatch at the failing observer and the load must
    /// not run. The adapter still reports [`Guard::on_load_end`] for the
    /// attempt; no end events are sent from here.
    pub fn on_load_begin(&self, import: &ImportDescriptor, chain: &CallerChain) -> Result<()> {
        if !self.observes(import) {
            return Ok(());
        }
        let observers = self.observers.read().clone();
        let (_, result) = self.begin(&observers, import, chain, self.is_strict());
        result
    }

    /// Load-end event from a host adapter, sent to every observer once per
    /// attempt whether the load completed, failed, or was aborted at begin.
    pub fn on_load_end(&self, import: &ImportDescriptor, chain: &CallerChain) {
        if !self.observes(import) {
            return;
        }
        let observers = self.observers.read().clone();
        self.end(&observers, import, chain, self.is_strict());
    }

    /// Run `load` inside a begin/end pair.
    ///
    /// When the guard is disabled or the component is filtered out, `load`
    /// runs without any observer seeing it. A strict-mode violation aborts
    /// before `load` runs. Observers that began always see the end event.
    pub fn intercept<T, F>(
        &self,
        import: &ImportDescriptor,
        chain: &CallerChain,
        load: F,
    ) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if !self.observes(import) {
            return load();
        }

        let strict = self.is_strict();
        let observers = self.observers.read().clone();
        let (began, result) = self.begin(&observers, import, chain, strict);
        let result = result.and_then(|()| load());
        self.end(&observers[..began], import, chain, strict);

        if let Err(e) = &result
            && e.is_forbidden_import()
        {
            debug!(imported = %import.component_path, "Load aborted by guard");
        }
        result
    }

    /// Drain the non-fatal violations reported so far.
    pub fn take_warnings(&self) -> Vec<ForbiddenImport> {
        self.with_defender(DefendingObserver::take_reported).unwrap_or_default()
    }
}
