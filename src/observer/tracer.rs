use std::io::{self, Write};

use parking_lot::Mutex;
use tracing::debug;

use super::Observer;
use crate::descriptor::{CallerChain, ImportDescriptor};
use crate::error::Result;

struct TracerState {
    depth: usize,
    sink: Box<dyn Write + Send>,
}

/// Diagnostic observer printing one indented line per load enter/exit.
///
/// ```text
///  > pkg.api
///    > csv
///    < csv
///    > pkg.tasks (lazy)
///    < pkg.tasks (lazy)
///  < pkg.api
/// ```
pub struct TracingObserver {
    state: Mutex<TracerState>,
}

impl TracingObserver {
    pub const NAME: &'static str = "tracer";

    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }

    pub fn with_writer(sink: impl Write + Send + 'static) -> Self {
        Self {
            state: Mutex::new(TracerState {
                depth: 0,
                sink: Box::new(sink),
            }),
        }
    }

    fn write_line(
        state: &mut TracerState,
        marker: char,
        import: &ImportDescriptor,
        chain: &CallerChain,
    ) {
        let lazy = if chain.immediate().is_some_and(|f| f.is_lazy()) {
            " (lazy)"
        } else {
            ""
        };
        let line = format!(
            "{} {} {}{}",
            "  ".repeat(state.depth),
            marker,
            import.component_path,
            lazy
        );
        if let Err(e) = writeln!(state.sink, "{}", line) {
            debug!(error = %e, "Failed to write trace line");
        }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for TracingObserver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_begin(
        &self,
        import: &ImportDescriptor,
        chain: &CallerChain,
        _strict: bool,
    ) -> Result<()> {
        let mut state = self.state.lock();
        Self::write_line(&mut state, '>', import, chain);
        state.depth += 1;
        Ok(())
    }

    fn on_end(&self, import: &ImportDescriptor, chain: &CallerChain, _strict: bool) {
        let mut state = self.state.lock();
        state.depth = state.depth.saturating_sub(1);
        Self::write_line(&mut state, '<', import, chain);
    }
}
