//! Change detection between recorded and freshly assembled manifests
//!
//! Key features:
//! - Decide whether applying a configuration creates, updates or leaves a resource alone
//! - Show line diffs with context, like `kubectl diff`

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::state::ResourceState;

/// Outcome of planning a configuration against recorded state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Plan {
    /// Nothing is recorded at the address yet
    Create { manifest: String },

    /// The recorded manifest is byte-identical
    NoChange,

    /// The manifest changed
    Update { manifest: String, diff: DiffContent },
}

impl Plan {
    /// Whether applying this plan would write state
    pub fn has_changes(&self) -> bool {
        !matches!(self, Plan::NoChange)
    }

    /// Short label, e.g. `update (+2 -1)`
    pub fn summary(&self) -> String {
        match self {
            Plan::Create { manifest } => format!("create (+{})", manifest.lines().count()),
            Plan::NoChange => "no changes".to_string(),
            Plan::Update { diff, .. } => {
                format!("update (+{} -{})", diff.added(), diff.removed())
            }
        }
    }
}

/// Diff engine for manifest comparison
pub struct DiffEngine {
    /// Show context lines around changes
    pub context_lines: usize,
}

impl DiffEngine {
    /// Create a new diff engine
    pub fn new() -> Self {
        Self { context_lines: 3 }
    }

    /// Set the number of context lines
    pub fn with_context(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// Plan a new manifest against what is recorded, if anything
    pub fn plan(&self, recorded: Option<&ResourceState>, manifest: &str) -> Plan {
        match recorded {
            None => Plan::Create {
                manifest: manifest.to_string(),
            },
            Some(state) if state.yaml == manifest => Plan::NoChange,
            Some(state) => Plan::Update {
                manifest: manifest.to_string(),
                diff: self.compute_text_diff(&state.yaml, manifest),
            },
        }
    }

    /// Compute a line diff, keeping only `context_lines` around each change
    pub fn compute_text_diff(&self, old: &str, new: &str) -> DiffContent {
        let diff = TextDiff::from_lines(old, new);
        let mut lines = Vec::new();

        for group in diff.grouped_ops(self.context_lines) {
            for op in group {
                for change in diff.iter_changes(&op) {
                    let line_type = match change.tag() {
                        ChangeTag::Delete => LineType::Removed,
                        ChangeTag::Insert => LineType::Added,
                        ChangeTag::Equal => LineType::Context,
                    };

                    lines.push(DiffLine {
                        line_type,
                        content: change.value().trim_end().to_string(),
                        old_line_no: change.old_index(),
                        new_line_no: change.new_index(),
                    });
                }
            }
        }

        DiffContent { lines }
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Detailed diff content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffContent {
    /// Lines of the diff
    pub lines: Vec<DiffLine>,
}

impl DiffContent {
    pub fn added(&self) -> usize {
        self.count(LineType::Added)
    }

    pub fn removed(&self) -> usize {
        self.count(LineType::Removed)
    }

    fn count(&self, line_type: LineType) -> usize {
        self.lines.iter().filter(|l| l.line_type == line_type).count()
    }

    /// Generate a unified diff string
    pub fn to_unified_diff(&self) -> String {
        let mut output = String::new();

        for line in &self.lines {
            let prefix = match line.line_type {
                LineType::Added => "+",
                LineType::Removed => "-",
                LineType::Context => " ",
            };
            output.push_str(prefix);
            output.push_str(&line.content);
            output.push('\n');
        }

        output
    }
}

/// A single line in a diff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffLine {
    /// Type of line
    pub line_type: LineType,

    /// Content of the line
    pub content: String,

    /// Line number in old version
    pub old_line_no: Option<usize>,

    /// Line number in new version
    pub new_line_no: Option<usize>,
}

/// Type of diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    /// Line was added
    Added,

    /// Line was removed
    Removed,

    /// Unchanged context line
    Context,
}
