//! Word-aligned reading of the raw record stream
//!
//! The stream has no framing of its own. A reader joining mid-transmission
//! drops words until it sees one with the terminator bit set: that word
//! closes some sample we never saw the start of, so the word after it is
//! the first word of a complete sample. Alignment is acquired once per
//! connection and never re-checked here.

use std::io::{self, Read};
use std::net::TcpStream;
use tracing::{debug, warn};

use crate::word::{RawWord, RECORD_LEN};
use crate::{Result, SpllError};

/// Stream health counters, for debugging only
#[derive(Clone, Copy, Eq, PartialEq, Default, Debug)]
pub struct Health {
    /// Records read off the wire, including discarded ones
    pub records: u64,
    /// Discontinuities in the sequence counter
    pub seq_gaps: u64,
}

pub struct RawWordSource<R> {
    rdr: R,
    synced: bool,
    max_sync_scan: Option<usize>,
    last_seq: Option<u16>,
    health: Health,
}

impl RawWordSource<TcpStream> {
    /// Connect to a debug proxy
    pub fn connect(addr: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((addr, port)).map_err(|source| SpllError::Connection {
            addr: format!("{}:{}", addr, port),
            source,
        })?;
        stream.set_nodelay(true)?;
        debug!("connected to {}:{}", addr, port);
        Ok(RawWordSource::new(stream))
    }
}

impl<R: Read> RawWordSource<R> {
    pub fn new(rdr: R) -> Self {
        RawWordSource {
            rdr,
            synced: false,
            max_sync_scan: None,
            last_seq: None,
            health: Health::default(),
        }
    }

    /// Give up on alignment once more than `limit` words have gone by
    /// without a terminator
    pub fn with_max_sync_scan(mut self, limit: Option<usize>) -> Self {
        self.max_sync_scan = limit;
        self
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn health(&self) -> Health {
        self.health
    }

    /// Read until `n` aligned words have been collected.
    ///
    /// Blocks across as many socket reads as it takes. On error the words
    /// gathered by this call are dropped.
    pub fn read_n(&mut self, n: usize) -> Result<Vec<RawWord>> {
        let mut rv = Vec::with_capacity(n);
        let mut scanned = 0;
        while rv.len() < n {
            let w = self.read_record()?;
            if self.synced {
                rv.push(w);
            } else if w.is_terminator() {
                debug!("synchronized after {} words", scanned + 1);
                self.synced = true;
            } else {
                scanned += 1;
                if let Some(limit) = self.max_sync_scan {
                    if scanned > limit {
                        return Err(SpllError::DesyncTimeout { scanned });
                    }
                }
            }
        }
        Ok(rv)
    }

    fn read_record(&mut self) -> io::Result<RawWord> {
        let mut rec = [0u8; RECORD_LEN];
        self.rdr.read_exact(&mut rec)?;
        let w = RawWord::from_record(&rec);
        self.health.records += 1;
        if let Some(last) = self.last_seq {
            if w.seq != last.wrapping_add(1) {
                self.health.seq_gaps += 1;
                warn!("sequence gap: {:#06x} -> {:#06x}", last, w.seq);
            }
        }
        self.last_seq = Some(w.seq);
        Ok(w)
    }
}
