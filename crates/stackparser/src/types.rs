use std::fmt;
use std::str::FromStr;

use crate::parser;
use crate::reader;

// === Error types ===

/// Errors that can occur while parsing or inspecting a stack trace.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The header does not have the `Thread <N> (...)` shape.
    #[error("invalid thread header: {0:?}")]
    InvalidHeader(String),

    /// A frame or continuation line has no thread or frame to belong to.
    /// `line` is 1-based within the parsed input.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: &'static str },

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

// === Thread stacks ===

/// The backtrace of a single thread.
///
/// Holds the header line verbatim and the logical frame lines, innermost
/// frame first. Continued frames are stored in their joined form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadStack {
    header: String,
    frames: Vec<String>,
}

impl ThreadStack {
    pub(crate) fn new(header: String, frames: Vec<String>) -> Self {
        ThreadStack { header, frames }
    }

    /// Build a thread from raw lines: the first line is the header, the rest
    /// are frame and continuation lines.
    ///
    /// The header is not validated here; [`ThreadStack::thread_id`] reports
    /// an unrecognized header.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        parser::parse_thread_block(lines, 1)
    }

    /// The header line, without its trailing newline.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// The thread number from a `Thread <N> (...)` header.
    pub fn thread_id(&self) -> Result<u64, ParseError> {
        reader::parse_thread_id(&self.header)
            .ok_or_else(|| ParseError::InvalidHeader(self.header.clone()))
    }

    /// The logical frame at `index`, 0 being the innermost frame.
    pub fn frame(&self, index: usize) -> Result<&str, ParseError> {
        self.frames
            .get(index)
            .map(String::as_str)
            .ok_or(ParseError::IndexOutOfRange {
                index,
                len: self.frames.len(),
            })
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }
}

/// Writes the header and each frame on its own line, with no trailing newline.
impl fmt::Display for ThreadStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;
        for frame in &self.frames {
            write!(f, "\n{frame}")?;
        }
        Ok(())
    }
}

// === Stack traces ===

/// All thread backtraces of one debugger dump, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackTrace {
    threads: Vec<ThreadStack>,
}

impl StackTrace {
    pub(crate) fn new(threads: Vec<ThreadStack>) -> Self {
        StackTrace { threads }
    }

    /// Parse a dump from individual lines. Lines may keep their trailing
    /// newline or not.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        parser::parse_stack_trace(lines)
    }

    /// Parse a whole dump held in a string.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let lines: Vec<&str> = text.lines().collect();
        parser::parse_stack_trace(&lines)
    }

    pub fn num_threads(&self) -> usize {
        self.threads.len()
    }

    /// The thread at `index` in parse order.
    pub fn thread(&self, index: usize) -> Result<&ThreadStack, ParseError> {
        self.threads.get(index).ok_or(ParseError::IndexOutOfRange {
            index,
            len: self.threads.len(),
        })
    }

    pub fn threads(&self) -> &[ThreadStack] {
        &self.threads
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ThreadStack> {
        self.threads.iter()
    }
}

impl FromStr for StackTrace {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StackTrace::parse(s)
    }
}

impl<'a> IntoIterator for &'a StackTrace {
    type Item = &'a ThreadStack;
    type IntoIter = std::slice::Iter<'a, ThreadStack>;

    fn into_iter(self) -> Self::IntoIter {
        self.threads.iter()
    }
}
