//! `spllcat [--addr HOST:PORT] [-n COUNT] [--trigger startup|locked]`
//!
//! Connect to an SPLL debug proxy, decode samples and print them as
//! tab-separated values, starting from the trigger event if one is given.
//!
//!     spllcat --addr wr-switch:12345 --trigger startup -n 50000 > startup.tsv

use anyhow::{bail, Result};
use argh::FromArgs;
use std::io::{stdout, Write};
use tracing::info;

use splltools::cfg::{Capture, SyncMode, Trigger};
use splltools::decode::EventStream;
use splltools::{ser, EventKind};

const GIT_VERSION: &str = git_version::git_version!(fallback = "unknown");

#[derive(Debug, FromArgs, Clone)]
/// Decode samples from an SPLL debug proxy and print tab-separated
/// events to standard output.
pub struct CliArgs {
    /// print version information
    #[argh(switch, short = 'v')]
    pub version: bool,
    /// proxy address
    #[argh(option, default = "String::from(\"localhost:12345\")")]
    pub addr: String,
    /// number of events to print
    #[argh(option, short = 'n', default = "50000")]
    pub count: usize,
    /// start at this event: startup, locked, or a raw event code (0 is
    /// the code of plain samples); omit to start immediately
    #[argh(option)]
    pub trigger: Option<String>,
    /// drop partial samples when the sequence counter skips
    #[argh(switch)]
    pub resync: bool,
    /// print human-readable lines instead of tab-separated values
    #[argh(switch, short = 'p')]
    pub pretty: bool,
}

fn parse_trigger(s: &str) -> Result<Trigger> {
    match s {
        "startup" => Ok(Trigger::PllStartup),
        "locked" => Ok(Trigger::PllLocked),
        _ => match s.parse::<u32>() {
            Ok(x) => Ok(Trigger::Raw(x)),
            Err(_) => bail!("unknown trigger {:?}", s),
        },
    }
}

fn main() -> Result<()> {
    let args: CliArgs = argh::from_env();
    if args.version {
        let stdout = stdout();
        let mut stdout = stdout.lock();
        writeln!(
            stdout,
            concat!(
                env!("CARGO_BIN_NAME"),
                " ",
                "{}",
            ),
            GIT_VERSION,
        )?;
        return Ok(())
    }
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let capture = Capture {
        addr: args.addr.clone(),
        trigger: args.trigger.as_deref().map(parse_trigger).transpose()?,
        count: args.count,
        sync: if args.resync { SyncMode::Resync } else { SyncMode::Strict },
        ..Default::default()
    };
    capture.validate()?;
    let (host, port) = capture.host_port()?;

    let stream = EventStream::connect(&host, port, capture.decode_options())?;
    info!(
        "reading {} events from {}:{} (trigger: {:?})",
        capture.count,
        host,
        port,
        capture.trigger.map(EventKind::from)
    );
    let events = capture.filter().read(capture.count, stream)?;

    let stdout = stdout();
    let stdout = stdout.lock();
    if args.pretty {
        let mut stdout = stdout;
        for e in events.iter() {
            writeln!(stdout, "{}", e)?;
        }
    } else {
        let mut wtr = ser::tsv_writer(stdout);
        ser::tsv(&mut wtr, &events)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_names() {
        assert_eq!(Trigger::PllStartup, parse_trigger("startup").unwrap());
        assert_eq!(Trigger::PllLocked, parse_trigger("locked").unwrap());
        assert_eq!(Trigger::Raw(7), parse_trigger("7").unwrap());
    }

    #[test]
    fn no_none_keyword() {
        // "none" would read as "no trigger" but match code 0
        assert!(parse_trigger("none").is_err());
        assert_eq!(EventKind::None, EventKind::from(parse_trigger("0").unwrap()));
    }
}
