//! Capture configuration
//!
//! A capture is declared in a JSON file. Every field is optional: an empty
//! object `{}` connects to a proxy on `localhost:12345`, starts logging
//! immediately and reads 50000 samples from any source.
//!
//! ```json
//! {
//!     "name": "aux channel startup",
//!     "addr": "wr-switch:12345",
//!     "trigger": "PllStartup",
//!     "source": "HelperPrelock",
//!     "count": 20000,
//!     "sync": "Resync",
//!     "max_sync_scan": 4096
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::cycle::LockCycleFilter;
use crate::decode::{DecodeOptions, SyncPolicy};
use crate::{EventKind, Result, SourceFlags, SpllError, DEFAULT_PORT};

/// Event code that opens a lock cycle
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    None,
    PllStartup,
    PllLocked,
    Raw(u32),
}

impl From<Trigger> for EventKind {
    fn from(t: Trigger) -> Self {
        match t {
            Trigger::None => EventKind::None,
            Trigger::PllStartup => EventKind::PllStartup,
            Trigger::PllLocked => EventKind::PllLocked,
            Trigger::Raw(x) => EventKind::from_raw(x),
        }
    }
}

/// PLL branch and lock phase to keep
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum Source {
    HelperPrelock,
    HelperPhase,
    MainPrelock,
    MainPhase,
}

impl From<Source> for SourceFlags {
    fn from(s: Source) -> Self {
        match s {
            Source::HelperPrelock => SourceFlags::HELPER | SourceFlags::PRELOCK,
            Source::HelperPhase => SourceFlags::HELPER,
            Source::MainPrelock => SourceFlags::MAIN | SourceFlags::PRELOCK,
            Source::MainPhase => SourceFlags::MAIN_PHASE,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum SyncMode {
    Strict,
    Resync,
}

impl From<SyncMode> for SyncPolicy {
    fn from(s: SyncMode) -> Self {
        match s {
            SyncMode::Strict => SyncPolicy::Strict,
            SyncMode::Resync => SyncPolicy::Resync,
        }
    }
}

/// Largest `refill_batch` or `low_watermark` a capture may ask for
pub const MAX_BATCH: usize = 1 << 20;
/// Largest `count` a capture may ask for; kept events are preallocated
pub const MAX_COUNT: usize = 1 << 24;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Capture {
    pub name:           String,
    /// `host:port` of the debug proxy
    pub addr:           String,
    pub trigger:        Option<Trigger>,
    pub source:         Option<Source>,
    pub count:          usize,
    pub sync:           SyncMode,
    pub low_watermark:  usize,
    pub refill_batch:   usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_sync_scan:  Option<usize>,
}

impl Default for Capture {
    fn default() -> Self {
        let opts = DecodeOptions::default();
        Capture {
            name:           String::new(),
            addr:           format!("localhost:{}", DEFAULT_PORT),
            trigger:        None,
            source:         None,
            count:          50_000,
            sync:           SyncMode::Strict,
            low_watermark:  opts.low_watermark,
            refill_batch:   opts.refill_batch,
            max_sync_scan:  None,
        }
    }
}

impl Capture {
    pub fn from_reader(rdr: impl Read) -> Result<Self> {
        let c: Capture = serde_json::from_reader(rdr).map_err(|e| SpllError::Config(e.to_string()))?;
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refill_batch == 0 {
            return Err(SpllError::Config("refill_batch must be at least 1".into()));
        }
        if self.refill_batch > MAX_BATCH {
            return Err(SpllError::Config(format!("refill_batch must be at most {}", MAX_BATCH)));
        }
        if self.low_watermark > MAX_BATCH {
            return Err(SpllError::Config(format!("low_watermark must be at most {}", MAX_BATCH)));
        }
        if self.count > MAX_COUNT {
            return Err(SpllError::Config(format!("count must be at most {}", MAX_COUNT)));
        }
        if self.max_sync_scan == Some(0) {
            return Err(SpllError::Config("max_sync_scan must be at least 1".into()));
        }
        self.host_port().map(|_| ())
    }

    /// Split `addr` into host and port, defaulting the port
    pub fn host_port(&self) -> Result<(String, u16)> {
        match self.addr.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|e| SpllError::Config(format!("bad port in {:?}: {}", self.addr, e)))?;
                Ok((host.to_string(), port))
            }
            None => Ok((self.addr.clone(), DEFAULT_PORT)),
        }
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            low_watermark: self.low_watermark,
            refill_batch: self.refill_batch,
            sync: self.sync.into(),
            max_sync_scan: self.max_sync_scan,
        }
    }

    pub fn filter(&self) -> LockCycleFilter {
        LockCycleFilter::new(self.trigger.map(Into::into), self.source.map(Into::into))
    }
}
