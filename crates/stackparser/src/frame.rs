//! Anatomy of a single logical frame line.
//!
//! GDB prints frames as
//!
//! ```text
//! #1  0x00007fa58ccd4309 in zmq::epoll_t::loop() () from /lib64/libzmq.so.5
//! #4  0x00007f8059aa1149 in XrdLink::DoIt (this=0x7f7faf3ea2d8) at XrdLink.cc:435
//! #0  main () at main.c:3
//! #5  <signal handler called>
//! ```
//!
//! [`Frame::parse`] splits such a line into its number, optional address,
//! function name and origin without copying.

/// Where the code of a frame lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin<'a> {
    /// `from <library>`: no debug info, only the shared object.
    Library(&'a str),
    /// `at <file>:<line>`.
    Source { file: &'a str, line: Option<u32> },
}

impl<'a> Origin<'a> {
    /// The file name of the shared object, if this is a library origin.
    pub fn library_name(&self) -> Option<&'a str> {
        match self {
            Origin::Library(path) => Some(path.rsplit('/').next().unwrap_or(path)),
            Origin::Source { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub number: u32,
    pub address: Option<&'a str>,
    /// The function name, including any C++ template or call-operator
    /// parentheses that are part of the symbol (`zmq::epoll_t::loop()`).
    pub function: &'a str,
    pub origin: Option<Origin<'a>>,
}

impl<'a> Frame<'a> {
    /// Parse a logical frame line. Returns `None` if the line does not start
    /// with `#<digits>` or has no function name.
    pub fn parse(text: &'a str) -> Option<Self> {
        let rest = text.trim_start().strip_prefix('#')?;
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let number = rest[..digits_end].parse().ok()?;
        let rest = rest[digits_end..].trim_start();

        let (address, rest) = if rest.starts_with("0x") {
            let (address, rest) = rest.split_once(" in ")?;
            (Some(address.trim()), rest.trim_start())
        } else {
            (None, rest)
        };

        let function_end = function_end(rest);
        let function = rest[..function_end].trim_end();
        if function.is_empty() {
            return None;
        }

        Some(Frame {
            number,
            address,
            function,
            origin: parse_origin(&rest[function_end..]),
        })
    }

    /// Whether the frame's code comes from a shared object whose file name
    /// starts with `prefix` (`libzmq.so` matches `/lib64/libzmq.so.5`).
    pub fn is_from_library(&self, prefix: &str) -> bool {
        self.origin
            .and_then(|origin| origin.library_name())
            .is_some_and(|name| name.starts_with(prefix))
    }
}

/// Characters that can follow the `operator` keyword as part of the name.
const OPERATOR_CHARS: &[u8] = b"<>=!+-*/%^&|~";

/// Byte offset where the function name ends.
///
/// The name runs up to the first ` (` that opens the argument list, an
/// ` at ` or ` from ` origin, or the end of the line. Text inside `<...>`
/// never ends the name, so template arguments like `<void ()>` survive.
/// Operator names (`operator<<`, `operator->`) are not template brackets.
fn function_end(s: &str) -> usize {
    if s.starts_with('<') {
        // Pseudo frames such as `<signal handler called>`.
        return s.find('>').map(|i| i + 1).unwrap_or(s.len());
    }

    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'o' if is_operator_keyword(s, i) => {
                i += "operator".len();
                while i < bytes.len() && OPERATOR_CHARS.contains(&bytes[i]) {
                    i += 1;
                }
                continue;
            }
            b'<' => depth += 1,
            b'>' => depth = depth.saturating_sub(1),
            b' ' if depth == 0 => {
                let tail = &s[i..];
                if tail.starts_with(" (") || tail.starts_with(" at ") || tail.starts_with(" from ")
                {
                    return i;
                }
            }
            _ => {}
        }
        i += 1;
    }
    s.len()
}

fn is_operator_keyword(s: &str, i: usize) -> bool {
    s[i..].starts_with("operator")
        && !s[..i].ends_with(|c: char| c.is_ascii_alphanumeric() || c == '_')
}

/// Byte offset just past the `)` that closes the argument list opening `s`.
/// Parentheses inside string and character literals do not count.
fn args_end(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse the origin following the function name. Only text after the
/// argument list is considered, so argument values never look like an origin.
fn parse_origin(rest: &str) -> Option<Origin<'_>> {
    let mut tail = rest.trim_start();
    if tail.starts_with('(') {
        tail = tail[args_end(tail)?..].trim_start();
    }
    if let Some(library) = tail.strip_prefix("from ") {
        return Some(Origin::Library(library.trim()));
    }
    let location = tail.strip_prefix("at ")?.trim();
    let origin = match location.rsplit_once(':') {
        Some((file, line)) => match line.parse() {
            Ok(line) => Origin::Source {
                file,
                line: Some(line),
            },
            Err(_) => Origin::Source {
                file: location,
                line: None,
            },
        },
        None => Origin::Source {
            file: location,
            line: None,
        },
    };
    Some(origin)
}
