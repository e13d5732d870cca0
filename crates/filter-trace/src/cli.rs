//! The `eos-filter-stacktrace` command line: argument parsing, reading
//! dumps, and printing what survives the filters.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use eos_stackparser::{StackTrace, ThreadStack};

use crate::config;
use crate::filter::{self, FilterSet, Summary, ZmqFilter};
use crate::report;

/// Filter known-noise threads out of GDB `thread apply all bt` dumps.
#[derive(Parser, Debug)]
#[command(name = "eos-filter-stacktrace", version)]
pub struct Args {
    /// Dump files to read. Reads stdin when none are given.
    pub files: Vec<PathBuf>,

    /// Filter out idle ZeroMQ I/O threads.
    #[arg(long)]
    pub zmq: bool,

    /// Enable a built-in filter by name (zmq, xrootd-idle). Repeatable.
    #[arg(short = 'f', long = "filter", value_name = "NAME")]
    pub filters: Vec<String>,

    /// JSON filter config. Falls back to $EOS_FILTER_TRACE_CONFIG.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print thread counts instead of the surviving threads.
    #[arg(long)]
    pub count: bool,
}

impl Args {
    /// Config file filters first, then `--filter` names, then `--zmq`.
    pub fn build_filters(&self) -> Result<FilterSet> {
        let config = config::load_config(self.config.as_deref())?;
        let mut filters = config.build_filters()?;
        for name in &self.filters {
            filters.push(filter::builtin(name)?);
        }
        if self.zmq {
            filters.push(Box::new(ZmqFilter));
        }
        Ok(filters)
    }
}

/// One dump to process.
#[derive(Debug)]
pub struct Input {
    pub label: String,
    pub text: String,
}

impl Input {
    /// Invalid UTF-8 is replaced rather than rejected; dumps routinely
    /// carry raw bytes in string arguments.
    pub fn from_bytes(label: impl Into<String>, bytes: &[u8]) -> Self {
        Input {
            label: label.into(),
            text: String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Input::from_bytes(path.display().to_string(), &bytes))
    }

    pub fn read_stdin() -> Result<Self> {
        let mut bytes = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut bytes)
            .context("failed to read stdin")?;
        Ok(Input::from_bytes("<stdin>", &bytes))
    }
}

/// Writes the result of each processed input.
pub struct Printer<W> {
    out: W,
    count: bool,
    wrote_threads: bool,
}

impl<W: Write> Printer<W> {
    pub fn new(out: W, count: bool) -> Self {
        Printer {
            out,
            count,
            wrote_threads: false,
        }
    }

    /// With `count`, one `<label>: <summary>` line. Otherwise the kept
    /// threads, separated from earlier inputs' threads by a blank line.
    pub fn print(
        &mut self,
        label: &str,
        summary: &Summary,
        kept: &[&ThreadStack],
    ) -> io::Result<()> {
        if self.count {
            return writeln!(self.out, "{label}: {summary}");
        }
        let text = report::render(kept.iter().copied());
        if text.is_empty() {
            return Ok(());
        }
        if self.wrote_threads {
            writeln!(self.out)?;
        }
        self.wrote_threads = true;
        writeln!(self.out, "{text}")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Parse, filter and print one dump. Returns `Ok(false)` when the input was
/// skipped; only output errors abort the run.
pub fn process<W: Write>(
    input: Result<Input>,
    filters: &FilterSet,
    printer: &mut Printer<W>,
) -> Result<bool> {
    let input = match input {
        Ok(input) => input,
        Err(err) => {
            log::error!("{:#}", err);
            return Ok(false);
        }
    };

    let trace = match StackTrace::parse(&input.text) {
        Ok(trace) => trace,
        Err(err) => {
            log::error!("{}: unrecognized input format: {}", input.label, err);
            return Ok(false);
        }
    };

    let partition = filters.apply(&trace);
    let summary = partition.summary();
    log::debug!("{}: {}", input.label, summary);

    printer.print(&input.label, &summary, partition.kept())?;
    Ok(true)
}

/// Process every file named in `args`, or stdin when there are none.
/// Returns how many inputs were skipped.
pub fn run<W: Write>(args: &Args, out: W) -> Result<usize> {
    let filters = args.build_filters()?;
    log::info!("active filters: {:?}", filters.names());

    let mut printer = Printer::new(out, args.count);
    let mut skipped = 0;

    if args.files.is_empty() && !process(Input::read_stdin(), &filters, &mut printer)? {
        skipped += 1;
    }
    for path in &args.files {
        if !process(Input::read_file(path), &filters, &mut printer)? {
            skipped += 1;
        }
    }

    printer.into_inner().flush()?;
    Ok(skipped)
}
