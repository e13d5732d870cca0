//! Parser for GDB multi-thread backtraces.
//!
//! This crate turns the text produced by `thread apply all bt` into a
//! [`StackTrace`]: an ordered list of [`ThreadStack`]s, each holding the
//! thread's header line and its logical frame lines.
//!
//! # Format
//!
//! A dump is a sequence of thread blocks separated by blank lines:
//!
//! ```text
//! Thread 1132 (Thread 0x7fa4d93fc700 (LWP 114706)):
//! #0  0x00007fa5947dd923 in epoll_wait () from /lib64/libc.so.6
//! #1  0x00007fa58ccd4309 in zmq::epoll_t::loop() () from /lib64/libzmq.so.5
//! #2  0x00007fa58cd083a6 in thread_routine () from /lib64/libzmq.so.5
//!
//! Thread 1131 (Thread 0x7fa4d9bfd700 (LWP 114705)):
//! #0  0x00007f8059624094 in pthread_rwlock_rdlock () from /lib64/libpthread.so.0
//! ```
//!
//! | Line kind    | Shape                                   |
//! |--------------|-----------------------------------------|
//! | Header       | starts with `Thread `                   |
//! | Frame start  | `#<digits>` after optional whitespace   |
//! | Blank        | whitespace only, ends the current block |
//! | Continuation | anything else, joined onto the previous frame |
//!
//! GDB wraps long frames; continuation lines are joined back so every stored
//! frame is one logical line.
//!
//! # Usage
//!
//! ```
//! use eos_stackparser::StackTrace;
//!
//! let dump = "\
//! Thread 2 (Thread 0x7f7f0a6c1700 (LWP 118449)):
//! #0  0x00007f80596242ae in pthread_rwlock_wrlock () from /lib64/libpthread.so.0
//! #1  0x00007f8051b2075a in XrdMgmOfs::FSctl (this=0x7f8051ff94a0, args=..., \n\
//!     client=0x7f7faad8f488) at ../../mgm/XrdMgmOfs/fsctl/Drop.cc:47
//! ";
//!
//! let trace = StackTrace::parse(dump).unwrap();
//! let thread = trace.thread(0).unwrap();
//! assert_eq!(thread.thread_id().unwrap(), 2);
//! assert_eq!(thread.num_frames(), 2);
//! ```

pub mod frame;
mod parser;
mod reader;
pub mod types;

pub use frame::{Frame, Origin};
pub use parser::{assemble_frames, parse_stack_trace};
pub use types::{ParseError, StackTrace, ThreadStack};
