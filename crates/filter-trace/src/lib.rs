//! Filters known-noise threads out of GDB backtrace dumps.
//!
//! This crate classifies the threads of an [`eos_stackparser::StackTrace`]
//! against known benign signatures (idle ZeroMQ pollers, idle xrootd
//! scheduler workers, user-defined signatures) so a crash report only shows
//! the threads worth reading.
//!
//! # Usage
//!
//! ```
//! use eos_filter_trace::{report, FilterSet, ZmqFilter};
//! use eos_stackparser::StackTrace;
//!
//! let dump = "\
//! Thread 2 (Thread 0x7fa4d93fc700 (LWP 114706)):
//! #0  0x00007fa5947dd923 in epoll_wait () from /lib64/libc.so.6
//! #1  0x00007fa58ccd4309 in zmq::epoll_t::loop() () from /lib64/libzmq.so.5
//! #2  0x00007fa58cd083a6 in thread_routine () from /lib64/libzmq.so.5
//!
//! Thread 1 (Thread 0x7fa4d9bfd700 (LWP 114705)):
//! #0  0x00007f8059624094 in pthread_rwlock_rdlock () from /lib64/libpthread.so.0
//! ";
//!
//! let trace = StackTrace::parse(dump).unwrap();
//! let mut filters = FilterSet::new();
//! filters.push(Box::new(ZmqFilter));
//!
//! let partition = filters.apply(&trace);
//! assert_eq!(partition.kept().len(), 1);
//! println!("{}", report::render(partition.kept().iter().copied()));
//! ```

pub mod cli;
pub mod config;
mod error;
pub mod filter;
pub mod report;

pub use config::Config;
pub use error::FilterError;
pub use filter::{Filter, FilterSet, Partition, SignatureFilter, SignatureSpec, Summary, ZmqFilter};
