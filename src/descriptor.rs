//! Load-event records: what is being loaded and who is loading it.
//!
//! Both records are created fresh for every load attempt and never mutated
//! afterwards. The caller chain is assembled by the host (see
//! [`crate::host::ChainBuilder`]); the rule engine only reads it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Function name a host reports for code running at component initialization.
pub const MODULE_LEVEL: &str = "<module>";

/// Function name given to synthesized lazy callers.
pub const LAZY_MARKER: &str = "<lazy>";

/// Sub-name requesting every public element of a component.
pub const WILDCARD: &str = "*";

/// One requested element of a `from X import a, b` style load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubName {
    Name(String),
    Wildcard,
}

impl SubName {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl From<String> for SubName {
    fn from(value: String) -> Self {
        if value == WILDCARD {
            Self::Wildcard
        } else {
            Self::Name(value)
        }
    }
}

impl From<&str> for SubName {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<SubName> for String {
    fn from(value: SubName) -> Self {
        match value {
            SubName::Name(name) => name,
            SubName::Wildcard => WILDCARD.to_string(),
        }
    }
}

impl fmt::Display for SubName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Wildcard => f.write_str(WILDCARD),
        }
    }
}

/// What is being loaded.
///
/// `component_path` is always absolute; relative references are resolved by
/// the host before the descriptor is built and `relative_level` only records
/// that resolution happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDescriptor {
    pub component_path: String,
    #[serde(default)]
    pub sub_names: Vec<SubName>,
    #[serde(default)]
    pub relative_level: u32,
}

impl ImportDescriptor {
    pub fn new(component_path: impl Into<String>) -> Self {
        Self {
            component_path: component_path.into(),
            sub_names: Vec::new(),
            relative_level: 0,
        }
    }

    pub fn with_sub_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SubName>,
    {
        self.sub_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_relative_level(mut self, level: u32) -> Self {
        self.relative_level = level;
        self
    }

    pub fn is_star_import(&self) -> bool {
        self.sub_names.iter().any(SubName::is_wildcard)
    }
}

impl From<&str> for ImportDescriptor {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImportDescriptor {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Source position of a frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One frame of the caller chain.
///
/// `depth` counts hops from the immediate caller: the frame that issued the
/// load is depth 0, its caller depth 1, and so on back to the entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerFrame {
    pub component_path: String,
    pub function_name: String,
    pub location: Location,
    #[serde(default)]
    pub depth: usize,
}

impl CallerFrame {
    pub fn new(
        component_path: impl Into<String>,
        function_name: impl Into<String>,
        location: Location,
        depth: usize,
    ) -> Self {
        Self {
            component_path: component_path.into(),
            function_name: function_name.into(),
            location,
            depth,
        }
    }

    /// Synthesize a depth-0 caller for direct queries.
    pub fn from_component(component_path: impl Into<String>, top_level: bool) -> Self {
        let function_name = if top_level { MODULE_LEVEL } else { LAZY_MARKER };
        Self::new(
            component_path,
            function_name,
            Location::new("<query>", 0),
            0,
        )
    }

    /// A frame is lazy when the load runs inside a function body.
    pub fn is_lazy(&self) -> bool {
        self.function_name != MODULE_LEVEL
    }

    fn into_lazy(mut self) -> Self {
        self.function_name = format!("<lazy {}>", self.function_name);
        self
    }
}

/// Ordered caller frames, entrypoint first, immediate caller last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallerChain {
    frames: Vec<CallerFrame>,
}

impl CallerChain {
    /// Wrap frames exactly as given. Depths and laziness are taken verbatim.
    pub fn new(frames: Vec<CallerFrame>) -> Self {
        Self { frames }
    }

    /// Build a chain from root-first frames, assigning depths and applying
    /// sticky laziness: once some frame is lazy every deeper frame is too.
    pub fn from_frames(frames: Vec<CallerFrame>) -> Self {
        let len = frames.len();
        let mut lazy = false;
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(index, mut frame)| {
                frame.depth = len - 1 - index;
                let frame = if lazy { frame.into_lazy() } else { frame };
                lazy = lazy || frame.is_lazy();
                frame
            })
            .collect();
        Self { frames }
    }

    pub fn single(frame: CallerFrame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    pub fn frames(&self) -> &[CallerFrame] {
        &self.frames
    }

    /// The frame that issued the load.
    pub fn immediate(&self) -> Option<&CallerFrame> {
        self.frames.last()
    }

    /// Frames from the immediate caller back toward the entrypoint.
    pub fn nearest_first(&self) -> impl Iterator<Item = &CallerFrame> {
        self.frames.iter().rev()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.frames.iter().map(|f| f.location.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl From<CallerFrame> for CallerChain {
    fn from(frame: CallerFrame) -> Self {
        Self::single(frame)
    }
}
