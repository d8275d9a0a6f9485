// src/matrix/mod.rs

//! Test matrix model and construction.
//!
//! A cycle's work is a flat, ordered list of [`TaskSpec`]s built from the
//! configured flavors and runtime variants:
//!
//! ```text
//! Dev            <- separator (label only, no process)
//!   jit          <- test command for (Dev, jit)
//!   51
//!   54
//! Dist
//!   jit
//!   ...
//! ```
//!
//! Slot indices follow that order, and the reporter prints results by slot.

pub mod builder;

use serde::Deserialize;

pub use builder::{build_matrix, render_command, SUFFIX_PLACEHOLDER, VARIANT_PLACEHOLDER};

/// Position of a task (and its result) in the cycle's ordered output.
pub type SlotIndex = usize;

/// A named build/test configuration contributing a command-line suffix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Flavor {
    pub label: String,
    #[serde(default)]
    pub suffix: String,
}

impl Flavor {
    pub fn new(label: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            suffix: suffix.into(),
        }
    }
}

/// Static inputs of the matrix builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixConfig {
    /// Test command template containing `{variant}` and/or `{suffix}`.
    pub template: String,
    /// Runtime variant labels.
    pub variants: Vec<String>,
    /// Flavors, outer loop of the matrix.
    pub flavors: Vec<Flavor>,
}

impl MatrixConfig {
    /// Number of specs one cycle produces: `F + F × V`.
    pub fn task_count(&self) -> usize {
        self.flavors.len() * (1 + self.variants.len())
    }
}

/// What a task does when executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// Visual group header; resolves to its label without a process.
    Separator,
    /// Shell command line to run with captured output.
    Command(String),
}

/// One unit of work in a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub slot: SlotIndex,
    /// Flavor label for separators, variant label for commands.
    pub label: String,
    /// Flavor this task belongs to.
    pub flavor: String,
    pub kind: TaskKind,
}

impl TaskSpec {
    /// The command line, for command tasks.
    pub fn command(&self) -> Option<&str> {
        match &self.kind {
            TaskKind::Command(cmd) => Some(cmd),
            TaskKind::Separator => None,
        }
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.kind, TaskKind::Separator)
    }
}
