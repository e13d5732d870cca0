//! Kept in its own test binary: it sets a process-wide environment variable.

use std::env;
use std::ffi::OsStr;

use assert_fs::prelude::*;
use assert_fs::TempDir;
use clap::Parser;

use eos_filter_trace::cli::{self, Args};
use eos_filter_trace::config::{load_config, CONFIG_ENV};
use eos_filter_trace::Config;

const DUMP: &str = "\
Thread 2 (Thread 0x7fa4d93fc700 (LWP 114706)):
#0  0x00007fa5947dd923 in epoll_wait () from /lib64/libc.so.6
#1  0x00007fa58ccd4309 in zmq::epoll_t::loop() () from /lib64/libzmq.so.5

Thread 1 (Thread 0x7f805a1f3840 (LWP 118300)):
#0  0x00007f8059621f47 in pthread_join () from /lib64/libpthread.so.0
";

#[test]
fn test_config_path_from_environment() {
    let dir = TempDir::new().unwrap();
    let from_env = dir.child("env.json");
    from_env.write_str(r#"{ "filters": ["zmq"] }"#).unwrap();
    let explicit = dir.child("explicit.json");
    explicit.write_str(r#"{ "filters": ["xrootd-idle"] }"#).unwrap();
    let dump = dir.child("mgm.txt");
    dump.write_str(DUMP).unwrap();

    env::set_var(CONFIG_ENV, from_env.path());
    let config = load_config(None).unwrap();
    let overridden = load_config(Some(explicit.path())).unwrap();

    let args = Args::try_parse_from([
        OsStr::new("eos-filter-stacktrace"),
        OsStr::new("--count"),
        dump.path().as_os_str(),
    ])
    .unwrap();
    let mut out = Vec::new();
    let skipped = cli::run(&args, &mut out).unwrap();
    env::remove_var(CONFIG_ENV);

    assert_eq!(config.filters, vec!["zmq"]);
    assert_eq!(overridden.filters, vec!["xrootd-idle"]);
    assert_eq!(skipped, 0);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!(
            "{}: 2 threads, 1 kept, 1 filtered (zmq=1)\n",
            dump.path().display()
        )
    );
    assert_eq!(load_config(None).unwrap(), Config::default());
}
