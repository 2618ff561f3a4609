use anyhow::Result;
use splltools::cfg::Capture;
use splltools::raw::RawWordSource;
use splltools::ser;
use std::fs::File;
use std::io::{stdout, BufReader};
use tracing::{info, span, Level};

use crate::pump::pumped_events;
use crate::CliArgs;

/// Load the capture declaration and apply command line overrides
pub fn load(args: &CliArgs) -> Result<Capture> {
    let mut capture = match &args.config {
        Some(path) => {
            let f = File::open(path)?;
            Capture::from_reader(BufReader::new(f))?
        }
        None => Capture::default(),
    };
    if let Some(addr) = &args.addr {
        capture.addr = addr.clone();
    }
    if let Some(n) = args.count {
        capture.count = n;
    }
    capture.validate()?;
    Ok(capture)
}

pub fn main(args: CliArgs) -> Result<()> {
    let capture = load(&args)?;
    let span = span!(Level::INFO, "capture", name = %capture.name);
    let _enter = span.enter();

    let (host, port) = capture.host_port()?;
    let source = RawWordSource::connect(&host, port)?;
    info!("connected to {}:{}", host, port);

    let events = pumped_events(source, capture.decode_options(), args.depth);
    let mut cycles = capture.filter().cycles(events);
    let mut kept = Vec::with_capacity(capture.count);
    for r in cycles.by_ref().take(capture.count) {
        kept.push(r?);
    }
    info!("captured {} events (triggered: {})", kept.len(), cycles.triggered());
    let stream = cycles.get_ref();
    let health = stream.source().health();
    info!(
        "{} records read, {} sequence gaps, {} resyncs",
        health.records,
        health.seq_gaps,
        stream.decoder().resyncs()
    );

    let stdout = stdout();
    let mut wtr = ser::tsv_writer(stdout.lock());
    if args.header {
        ser::tsv_header(&mut wtr)?;
    }
    ser::tsv(&mut wtr, &kept)?;
    Ok(())
}
