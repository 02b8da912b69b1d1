use std::collections::HashSet;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::Observer;
use crate::descriptor::{CallerChain, CallerFrame, ImportDescriptor};
use crate::error::{ForbiddenImport, Result};
use crate::matcher::{Matcher, RuleValue, wrap};
use crate::trie::RuleTrie;

/// `(imported, violating caller component, violating caller function)`.
type ViolationKey = (String, String, String);

/// Enforces deny rules against each load event.
///
/// Every distinct violation is reported once for the lifetime of the
/// observer; strict mode turns the report into an error, otherwise it is
/// logged as a warning and kept for [`DefendingObserver::take_reported`].
pub struct DefendingObserver {
    rules: RuleTrie<Matcher>,
    seen: Mutex<HashSet<ViolationKey>>,
    reported: Mutex<Vec<ForbiddenImport>>,
}

impl DefendingObserver {
    pub const NAME: &'static str = "defender";

    pub fn new<I, K, V>(rules: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RuleValue>,
    {
        Self::from_trie(
            rules
                .into_iter()
                .map(|(path, value)| (path, wrap(value)))
                .collect(),
        )
    }

    pub fn from_trie(rules: RuleTrie<Matcher>) -> Self {
        debug!(nodes = rules.size(), "Deny rules installed");
        Self {
            rules,
            seen: Mutex::new(HashSet::new()),
            reported: Mutex::new(Vec::new()),
        }
    }

    pub fn rules(&self) -> &RuleTrie<Matcher> {
        &self.rules
    }

    /// True unless some rule on the caller's ancestor path matches.
    pub fn is_import_allowed(&self, import: &ImportDescriptor, caller: &CallerFrame) -> bool {
        !self
            .rules
            .path(&caller.component_path)
            .into_iter()
            .filter_map(|node| node.rule())
            .any(|rule| rule.matches(import, caller))
    }

    /// The nearest frame whose rules deny the load.
    pub fn find_violation<'a>(
        &self,
        import: &ImportDescriptor,
        chain: &'a CallerChain,
    ) -> Option<&'a CallerFrame> {
        chain
            .nearest_first()
            .find(|frame| !self.is_import_allowed(import, frame))
    }

    /// Drain the violations reported as warnings so far.
    pub fn take_reported(&self) -> Vec<ForbiddenImport> {
        std::mem::take(&mut *self.reported.lock())
    }

    pub fn seen_count(&self) -> usize {
        self.seen.lock().len()
    }
}

impl Observer for DefendingObserver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_begin(
        &self,
        import: &ImportDescriptor,
        chain: &CallerChain,
        strict: bool,
    ) -> Result<()> {
        let Some(frame) = self.find_violation(import, chain) else {
            return Ok(());
        };

        let key = (
            import.component_path.clone(),
            frame.component_path.clone(),
            frame.function_name.clone(),
        );
        if !self.seen.lock().insert(key) {
            trace!(
                imported = %import.component_path,
                caller = %frame.component_path,
                "Duplicate violation suppressed"
            );
            return Ok(());
        }

        let violation = ForbiddenImport {
            imported: import.component_path.clone(),
            caller: frame.component_path.clone(),
            caller_function: frame.function_name.clone(),
            depth: frame.depth,
            chain: chain.locations(),
        };

        if strict {
            return Err(violation.into());
        }

        warn!(
            target: "import_guard::forbidden",
            imported = %violation.imported,
            caller = %violation.caller,
            depth = violation.depth,
            "{}",
            violation
        );
        self.reported.lock().push(violation);
        Ok(())
    }

    fn as_defender(&self) -> Option<&DefendingObserver> {
        Some(self)
    }
}
