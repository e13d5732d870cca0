//! Line-level helpers: newline stripping, line classification and
//! continuation joining.

const HEADER_PREFIX: &str = "Thread ";

/// What a single physical line of a dump is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind {
    Blank,
    ThreadHeader,
    FrameStart,
    Continuation,
}

/// Strip a trailing `\n` or `\r\n`, and nothing else.
pub(crate) fn strip_newline(line: &str) -> &str {
    match line.strip_suffix('\n') {
        Some(line) => line.strip_suffix('\r').unwrap_or(line),
        None => line,
    }
}

/// Classify a line that has already had its newline stripped.
pub(crate) fn classify(line: &str) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if line.starts_with(HEADER_PREFIX) {
        LineKind::ThreadHeader
    } else if is_frame_start(line) {
        LineKind::FrameStart
    } else {
        LineKind::Continuation
    }
}

/// Whether the line matches `^\s*#<digits>(\s|$)`.
fn is_frame_start(line: &str) -> bool {
    let Some(rest) = line.trim_start().strip_prefix('#') else {
        return false;
    };
    let after_digits = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    after_digits.len() < rest.len()
        && (after_digits.is_empty() || after_digits.starts_with(char::is_whitespace))
}

/// Join a wrapped continuation onto the frame it belongs to.
///
/// Whitespace at the join point collapses to a single space.
pub(crate) fn join_continuation(frame: &mut String, continuation: &str) {
    let keep = frame.trim_end().len();
    frame.truncate(keep);
    let continuation = continuation.trim();
    if !continuation.is_empty() {
        frame.push(' ');
        frame.push_str(continuation);
    }
}

/// Parse `N` out of a `Thread <N> (...)` header.
pub(crate) fn parse_thread_id(header: &str) -> Option<u64> {
    let rest = header.strip_prefix(HEADER_PREFIX)?;
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 || !rest[digits_end..].starts_with(" (") {
        return None;
    }
    rest[..digits_end].parse().ok()
}
