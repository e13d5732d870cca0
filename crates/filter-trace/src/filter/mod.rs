//! The filter capability and the engine that applies a set of filters to a
//! stack trace.

use std::collections::BTreeMap;
use std::fmt;

use eos_stackparser::{StackTrace, ThreadStack};

use crate::FilterError;

mod signature;
mod zmq;

pub use signature::{SignatureFilter, SignatureSpec};
pub use zmq::ZmqFilter;

/// Names accepted by [`builtin`].
pub const BUILTIN_NAMES: &[&str] = &[ZmqFilter::NAME, signature::XROOTD_IDLE];

/// Thread entry points that nearly every thread bottoms out in. They are
/// tolerated by every filter but never identify a signature on their own.
const THREAD_ENTRY_FUNCTIONS: &[&str] = &["start_thread", "clone", "clone3", "__clone", "__clone3"];

/// Classifies a thread as matching a known benign signature.
pub trait Filter: Send + Sync {
    /// Stable name used for selection and reporting.
    fn name(&self) -> &str;

    /// Whether the thread matches this filter's signature and may be left
    /// out of a report. Must be a pure function of the thread's frames.
    fn check(&self, stack: &ThreadStack) -> bool;
}

/// Construct a built-in filter by name.
pub fn builtin(name: &str) -> Result<Box<dyn Filter>, FilterError> {
    match name {
        ZmqFilter::NAME => Ok(Box::new(ZmqFilter)),
        signature::XROOTD_IDLE => Ok(Box::new(SignatureFilter::xrootd_idle())),
        _ => Err(FilterError::UnknownFilter(name.to_string())),
    }
}

pub(crate) fn is_thread_entry(function: &str) -> bool {
    THREAD_ENTRY_FUNCTIONS.contains(&function)
}

/// An ordered list of filters. A thread is filtered out as soon as any
/// filter matches it.
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterSet {
    pub fn new() -> Self {
        FilterSet {
            filters: Vec::new(),
        }
    }

    /// Add a filter. A filter whose name is already present is ignored.
    pub fn push(&mut self, filter: Box<dyn Filter>) {
        if self.contains(filter.name()) {
            log::debug!("filter {} already enabled", filter.name());
            return;
        }
        self.filters.push(filter);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.iter().any(|f| f.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// The name of the first filter matching the thread, if any.
    pub fn matching(&self, stack: &ThreadStack) -> Option<&str> {
        self.filters
            .iter()
            .find(|f| f.check(stack))
            .map(|f| f.name())
    }

    /// Split the threads of a trace into kept and filtered, preserving parse
    /// order on both sides.
    pub fn apply<'t>(&self, trace: &'t StackTrace) -> Partition<'t> {
        let mut partition = Partition::default();
        for stack in trace {
            match self.matching(stack) {
                Some(name) => {
                    log::debug!("filtered by {}: {}", name, stack.header());
                    partition.filtered.push((stack, name.to_string()));
                }
                None => partition.kept.push(stack),
            }
        }
        partition
    }
}

impl fmt::Debug for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// The result of applying a [`FilterSet`] to a trace.
#[derive(Debug, Default)]
pub struct Partition<'t> {
    kept: Vec<&'t ThreadStack>,
    filtered: Vec<(&'t ThreadStack, String)>,
}

impl<'t> Partition<'t> {
    /// Threads no filter matched, in parse order.
    pub fn kept(&self) -> &[&'t ThreadStack] {
        &self.kept
    }

    /// Filtered threads with the name of the filter that matched them.
    pub fn filtered(&self) -> &[(&'t ThreadStack, String)] {
        &self.filtered
    }

    pub fn summary(&self) -> Summary {
        let mut by_filter = BTreeMap::new();
        for (_, name) in &self.filtered {
            *by_filter.entry(name.clone()).or_insert(0) += 1;
        }
        Summary {
            total: self.kept.len() + self.filtered.len(),
            kept: self.kept.len(),
            by_filter,
        }
    }
}

/// Thread counts of a [`Partition`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub kept: usize,
    pub by_filter: BTreeMap<String, usize>,
}

impl Summary {
    pub fn filtered(&self) -> usize {
        self.total - self.kept
    }
}

/// `<total> threads, <kept> kept, <filtered> filtered (name=count, ...)`
impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} threads, {} kept, {} filtered",
            self.total,
            self.kept,
            self.filtered()
        )?;
        if !self.by_filter.is_empty() {
            let counts: Vec<String> = self
                .by_filter
                .iter()
                .map(|(name, count)| format!("{name}={count}"))
                .collect();
            write!(f, " ({})", counts.join(", "))?;
        }
        Ok(())
    }
}
