use serde::{Deserialize, Serialize};

use super::index::ComponentIndex;
use crate::descriptor::{CallerChain, CallerFrame, Location};

/// A stack frame as the host sees it, before component resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFrame {
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl RawFrame {
    pub fn new(file: impl Into<String>, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
}

/// Builds caller chains from raw stacks.
#[derive(Debug, Clone, Default)]
pub struct ChainBuilder {
    internal_prefixes: Vec<String>,
    entrypoint: Option<String>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop frames whose file starts with `prefix` (loader machinery).
    pub fn with_internal_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.internal_prefixes.push(prefix.into());
        self
    }

    pub fn with_internal_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.internal_prefixes
            .extend(prefixes.into_iter().map(Into::into));
        self
    }

    /// Stop walking outward after the first frame in `file`.
    pub fn with_entrypoint(mut self, file: Option<String>) -> Self {
        self.entrypoint = file;
        self
    }

    fn is_internal(&self, file: &str) -> bool {
        self.internal_prefixes.iter().any(|p| file.starts_with(p))
    }

    /// `stack` is innermost first, the way a frame walker produces it.
    pub fn build(&self, stack: &[RawFrame], index: &ComponentIndex) -> CallerChain {
        let mut kept = Vec::new();
        for frame in stack {
            if self.is_internal(&frame.file) {
                continue;
            }
            kept.push(frame);
            if self.entrypoint.as_deref() == Some(frame.file.as_str()) {
                break;
            }
        }

        let frames = kept
            .into_iter()
            .rev()
            .map(|frame| {
                CallerFrame::new(
                    index.resolve(&frame.file),
                    frame.function.clone(),
                    Location::new(frame.file.clone(), frame.line),
                    0,
                )
            })
            .collect();
        CallerChain::from_frames(frames)
    }
}
