use eos_stackparser::{Frame, ThreadStack};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use super::{is_thread_entry, Filter};
use crate::FilterError;

pub(crate) const XROOTD_IDLE: &str = "xrootd-idle";

/// A data-driven signature, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureSpec {
    pub name: String,
    /// Function-name patterns that must all match, in order from the
    /// innermost frame outwards.
    pub required: Vec<String>,
    /// Function-name patterns for additional frames that may appear anywhere.
    #[serde(default)]
    pub allowed: Vec<String>,
}

/// Matches threads whose function names follow a fixed signature.
///
/// The `required` patterns must match as an ordered subsequence of the
/// frames, and every frame must match a `required` or `allowed` pattern or
/// be a thread entry point. Patterns are regexes matched against
/// [`Frame::function`].
#[derive(Debug, Clone)]
pub struct SignatureFilter {
    name: String,
    required: Vec<Regex>,
    allowed: Vec<Regex>,
}

impl SignatureFilter {
    pub fn new(spec: &SignatureSpec) -> Result<Self, FilterError> {
        if spec.required.is_empty() {
            return Err(FilterError::EmptySignature(spec.name.clone()));
        }
        let compile = |patterns: &[String]| -> Result<Vec<Regex>, FilterError> {
            patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|source| FilterError::InvalidPattern {
                        name: spec.name.clone(),
                        pattern: p.clone(),
                        source,
                    })
                })
                .collect()
        };

        Ok(SignatureFilter {
            name: spec.name.clone(),
            required: compile(&spec.required)?,
            allowed: compile(&spec.allowed)?,
        })
    }

    /// Idle xrootd scheduler workers parked on a condition variable or
    /// semaphore, waiting for a job.
    pub fn xrootd_idle() -> Self {
        XROOTD_IDLE_FILTER.clone()
    }
}

static XROOTD_IDLE_FILTER: Lazy<SignatureFilter> = Lazy::new(|| {
    let spec = SignatureSpec {
        name: XROOTD_IDLE.to_string(),
        required: vec![
            r"^(XrdSysCondVar::Wait|XrdSysSemaphore::Wait)".to_string(),
            r"^XrdScheduler::Run$".to_string(),
            r"^XrdStartWorking$".to_string(),
            r"^XrdSysThread_Xeq$".to_string(),
        ],
        allowed: vec![
            r"^pthread_cond_(timed)?wait".to_string(),
            r"^(__new_sem_wait|__new_sem_wait_slow|sem_wait|do_futex_wait)".to_string(),
            r"^(__lll_lock_wait|__pthread_mutex_cond_lock|futex_wait)".to_string(),
            r"^XrdSys[A-Za-z]*::".to_string(),
        ],
    };
    SignatureFilter::new(&spec).unwrap()
});

impl Filter for SignatureFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, stack: &ThreadStack) -> bool {
        let mut next_required = 0;
        for line in stack.frames() {
            let Some(frame) = Frame::parse(line) else {
                return false;
            };
            let function = frame.function;

            if next_required < self.required.len() && self.required[next_required].is_match(function)
            {
                next_required += 1;
                continue;
            }
            let tolerated = is_thread_entry(function)
                || self.allowed.iter().any(|re| re.is_match(function))
                || self.required.iter().any(|re| re.is_match(function));
            if !tolerated {
                return false;
            }
        }
        next_required == self.required.len()
    }
}
