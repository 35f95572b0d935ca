//! Paths from a root value to a nested position
//!
//! Errors carry a [`Path`] so callers can point at the exact place two
//! structures diverge, e.g. `[0]["weights"].bias<1>`.

use std::fmt;
use std::sync::Arc;

use crate::Key;

/// A single step from a container to one of its children
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Sequence element by position
    Index(usize),
    /// Mapping or view entry by key
    Key(Key),
    /// Record field by name
    Field(Arc<str>),
    /// Composite component by position
    Component(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Index(i) => write!(f, "[{}]", i),
            PathStep::Key(k) => write!(f, "[{}]", k),
            PathStep::Field(name) => write!(f, ".{}", name),
            PathStep::Component(i) => write!(f, "<{}>", i),
        }
    }
}

/// Steps from the root, outermost first
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    steps: Vec<PathStep>,
}

impl Path {
    pub const fn root() -> Self {
        Path { steps: Vec::new() }
    }

    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Path { steps }
    }

    pub fn push(&mut self, step: PathStep) {
        self.steps.push(step);
    }

    pub fn pop(&mut self) -> Option<PathStep> {
        self.steps.pop()
    }

    /// Keep only the first `depth` steps
    pub fn truncate(&mut self, depth: usize) {
        self.steps.truncate(depth);
    }

    /// A copy of this path extended by one step
    pub fn child(&self, step: PathStep) -> Path {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend(self.steps.iter().cloned());
        steps.push(step);
        Path { steps }
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps, which is also the depth of the addressed node
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<root>");
        }
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Path::from_steps(steps)
    }
}
