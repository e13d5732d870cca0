use crate::reader::{self, LineKind};
use crate::types::*;

/// Parse a full dump into a [`StackTrace`].
///
/// Each `Thread ` line starts a new thread block that runs up to the next
/// header or the end of input. Blank lines before the first header are
/// skipped; any other line there is malformed.
pub fn parse_stack_trace<S: AsRef<str>>(lines: &[S]) -> Result<StackTrace, ParseError> {
    let mut threads = Vec::new();
    let mut block_start: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line = reader::strip_newline(line.as_ref());
        match reader::classify(line) {
            LineKind::ThreadHeader => {
                if let Some(start) = block_start.replace(idx) {
                    threads.push(parse_thread_block(&lines[start..idx], start + 1)?);
                }
            }
            LineKind::Blank => {}
            LineKind::FrameStart | LineKind::Continuation => {
                if block_start.is_none() {
                    return Err(ParseError::MalformedInput {
                        line: idx + 1,
                        reason: "frame line before any thread header",
                    });
                }
            }
        }
    }

    if let Some(start) = block_start {
        threads.push(parse_thread_block(&lines[start..], start + 1)?);
    }

    Ok(StackTrace::new(threads))
}

/// Join the frame lines of one thread into logical frames.
///
/// Frame-start lines open a new frame, continuation lines are joined onto
/// the previous one and a blank line ends the frame list. This works on any
/// slice of frame lines, with or without trailing newlines.
pub fn assemble_frames<S: AsRef<str>>(lines: &[S]) -> Result<Vec<String>, ParseError> {
    assemble_frames_at(lines, 1)
}

/// Parse one thread block. `first_line` is the 1-based position of the
/// header in the surrounding input, used for error reporting.
pub(crate) fn parse_thread_block<S: AsRef<str>>(
    lines: &[S],
    first_line: usize,
) -> Result<ThreadStack, ParseError> {
    let Some((header, rest)) = lines.split_first() else {
        return Err(ParseError::MalformedInput {
            line: first_line,
            reason: "empty thread block",
        });
    };
    let header = reader::strip_newline(header.as_ref()).to_string();
    let frames = assemble_frames_at(rest, first_line + 1)?;
    Ok(ThreadStack::new(header, frames))
}

fn assemble_frames_at<S: AsRef<str>>(
    lines: &[S],
    first_line: usize,
) -> Result<Vec<String>, ParseError> {
    let mut frames: Vec<String> = Vec::new();
    let mut open = true;

    for (offset, line) in lines.iter().enumerate() {
        let line_no = first_line + offset;
        let line = reader::strip_newline(line.as_ref());

        match reader::classify(line) {
            LineKind::Blank => open = false,
            LineKind::ThreadHeader => {
                return Err(ParseError::MalformedInput {
                    line: line_no,
                    reason: "thread header inside a thread block",
                });
            }
            LineKind::FrameStart | LineKind::Continuation if !open => {
                return Err(ParseError::MalformedInput {
                    line: line_no,
                    reason: "frame line after a blank separator without a thread header",
                });
            }
            LineKind::FrameStart => frames.push(line.to_string()),
            LineKind::Continuation => match frames.last_mut() {
                Some(frame) => reader::join_continuation(frame, line),
                None => {
                    return Err(ParseError::MalformedInput {
                        line: line_no,
                        reason: "continuation line with no frame to continue",
                    });
                }
            },
        }
    }

    Ok(frames)
}
