use std::fs;
use std::path::PathBuf;

use insta::assert_snapshot;
use similar_asserts::assert_eq;

use eos_filter_trace::filter::{self, FilterSet};
use eos_filter_trace::{report, Config, Filter, SignatureFilter, ZmqFilter};
use eos_stackparser::StackTrace;

fn load_dump(name: &str) -> StackTrace {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name);
    let text = fs::read_to_string(&path).unwrap();
    StackTrace::parse(&text).unwrap()
}

fn kept_ids(trace: &StackTrace, filters: &FilterSet) -> Vec<u64> {
    filters
        .apply(trace)
        .kept()
        .iter()
        .map(|t| t.thread_id().unwrap())
        .collect()
}

#[test]
fn test_dump_shape() {
    let trace = load_dump("mgm_dump.txt");
    assert_eq!(trace.num_threads(), 5);
    let frames: Vec<usize> = trace.iter().map(|t| t.num_frames()).collect();
    assert_eq!(frames, vec![5, 10, 7, 8, 4]);
}

#[test]
fn test_no_filters_keep_everything() {
    let trace = load_dump("mgm_dump.txt");
    assert_eq!(kept_ids(&trace, &FilterSet::new()), vec![5, 4, 3, 2, 1]);
}

#[test]
fn test_zmq_filter_on_dump() {
    let trace = load_dump("mgm_dump.txt");
    let mut filters = FilterSet::new();
    filters.push(Box::new(ZmqFilter));

    assert_eq!(kept_ids(&trace, &filters), vec![4, 3, 1]);
    assert_eq!(
        filters.apply(&trace).summary().to_string(),
        "5 threads, 3 kept, 2 filtered (zmq=2)"
    );
}

#[test]
fn test_all_builtins_on_dump() {
    let trace = load_dump("mgm_dump.txt");
    let mut filters = FilterSet::new();
    for name in filter::BUILTIN_NAMES {
        filters.push(filter::builtin(name).unwrap());
    }

    let partition = filters.apply(&trace);
    assert_snapshot!(report::render(partition.kept().iter().copied()), @r###"
Thread 4 (Thread 0x7f7f0a6c1700 (LWP 118449)):
#0  0x00007f80596242ae in pthread_rwlock_wrlock () from /lib64/libpthread.so.0
#1  0x00007f805161ef85 in eos::common::RWMutex::LockWrite (this=0x7f8051ffacd8 <XrdSfsGetFileSystem::myFS+6200>) at ../../common/RWMutex.cc:339
#2  0x00007f8051b2075a in XrdMgmOfs::FSctl (this=0x7f8051ff94a0 <XrdSfsGetFileSystem::myFS>, cmd=<optimized out>, args=..., error=..., client=0x7f7faad8f488) at ../../mgm/XrdMgmOfs/fsctl/Drop.cc:47
#3  0x00007f8059d27344 in XrdXrootdProtocol::do_Qopaque (this=0x7f7fc18b2e80, qopt=<optimized out>) at /usr/src/debug/xrootd/xrootd/src/XrdXrootd/XrdXrootdXeq.cc:1779
#4  0x00007f8059aa1149 in XrdLink::DoIt (this=0x7f7faf3ea2d8) at /usr/src/debug/xrootd/xrootd/src/Xrd/XrdLink.cc:435
#5  0x00007f8059aa453f in XrdScheduler::Run (this=0x610e78 <XrdMain::Config+440>) at /usr/src/debug/xrootd/xrootd/src/Xrd/XrdScheduler.cc:357
#6  0x00007f8059aa4689 in XrdStartWorking (carg=<optimized out>) at /usr/src/debug/xrootd/xrootd/src/Xrd/XrdScheduler.cc:87
#7  0x00007f8059a640f7 in XrdSysThread_Xeq (myargs=0x7f7faf3a1600) at /usr/src/debug/xrootd/xrootd/src/XrdSys/XrdSysPthread.cc:86
#8  0x00007f8059620e25 in start_thread () from /lib64/libpthread.so.0
#9  0x00007f805892634d in clone () from /lib64/libc.so.6

Thread 1 (Thread 0x7f805a1f3840 (LWP 118300)):
#0  0x00007f8059621f47 in pthread_join () from /lib64/libpthread.so.0
#1  0x00007f8059a64a2e in XrdSysThread::Join (tid=<optimized out>, ret=<optimized out>) at /usr/src/debug/xrootd/xrootd/src/XrdSys/XrdSysPthread.cc:282
#2  0x0000000000405b3f in mainAdmin (xrdP=<optimized out>) at /usr/src/debug/xrootd/xrootd/src/Xrd/XrdMain.cc:185
#3  main (argc=<optimized out>, argv=<optimized out>) at /usr/src/debug/xrootd/xrootd/src/Xrd/XrdMain.cc:242
"###);

    let by_filter: Vec<(String, usize)> = partition.summary().by_filter.into_iter().collect();
    assert_eq!(
        by_filter,
        vec![("xrootd-idle".to_string(), 1), ("zmq".to_string(), 2)]
    );
}

#[test]
fn test_configured_signature_on_dump() {
    let config = Config::from_json(
        r#"{
            "signatures": [
                {
                    "name": "main-join",
                    "required": ["^pthread_join$", "^XrdSysThread::Join$", "^mainAdmin$", "^main$"]
                }
            ]
        }"#,
    )
    .unwrap();
    let filters = config.build_filters().unwrap();

    let trace = load_dump("mgm_dump.txt");
    assert_eq!(kept_ids(&trace, &filters), vec![5, 4, 3, 2]);
}

#[test]
fn test_filters_do_not_mutate_trace() {
    let trace = load_dump("mgm_dump.txt");
    let before = trace.clone();
    let zmq = ZmqFilter;
    let idle = SignatureFilter::xrootd_idle();

    for stack in &trace {
        assert_eq!(zmq.check(stack), zmq.check(stack));
        assert_eq!(idle.check(stack), idle.check(stack));
    }
    assert_eq!(trace, before);
}
