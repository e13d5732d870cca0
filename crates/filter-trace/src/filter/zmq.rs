use eos_stackparser::{Frame, ThreadStack};

use super::{is_thread_entry, Filter};

/// Syscalls an idle ZeroMQ I/O thread sits in.
const POLL_FUNCTIONS: &[&str] = &[
    "epoll_wait",
    "epoll_pwait",
    "__GI_epoll_wait",
    "poll",
    "__poll",
    "__GI___poll",
    "ppoll",
];

/// Matches idle ZeroMQ I/O threads:
///
/// ```text
/// #0  0x00007fa5947dd923 in epoll_wait () from /lib64/libc.so.6
/// #1  0x00007fa58ccd4309 in zmq::epoll_t::loop() () from /lib64/libzmq.so.5
/// #2  0x00007fa58cd083a6 in thread_routine () from /lib64/libzmq.so.5
/// #3  0x00007fa5954d7e25 in start_thread () from /lib64/libpthread.so.0
/// #4  0x00007fa5947dd34d in clone () from /lib64/libc.so.6
/// ```
///
/// Every frame has to be a ZeroMQ frame, a polling syscall or a thread entry
/// point, and at least one has to be a ZeroMQ frame. Anything else (an
/// application frame, an unparseable line) keeps the thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZmqFilter;

impl ZmqFilter {
    pub const NAME: &'static str = "zmq";
}

/// Entry point libzmq runs its own threads through.
const ZMQ_THREAD_ROUTINE: &str = "thread_routine";

/// `callee_is_zmq` covers `thread_routine` built with debug info, which
/// prints a source origin instead of `from libzmq.so`.
fn is_zmq_frame(frame: &Frame<'_>, callee_is_zmq: bool) -> bool {
    frame.function.starts_with("zmq::")
        || frame.is_from_library("libzmq.so")
        || (callee_is_zmq && frame.function == ZMQ_THREAD_ROUTINE)
}

impl Filter for ZmqFilter {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn check(&self, stack: &ThreadStack) -> bool {
        let mut saw_zmq = false;
        let mut callee_is_zmq = false;
        for line in stack.frames() {
            let Some(frame) = Frame::parse(line) else {
                return false;
            };
            callee_is_zmq = is_zmq_frame(&frame, callee_is_zmq);
            if callee_is_zmq {
                saw_zmq = true;
            } else if !POLL_FUNCTIONS.contains(&frame.function) && !is_thread_entry(frame.function)
            {
                return false;
            }
        }
        saw_zmq
    }
}
