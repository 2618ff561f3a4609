//! Background word reader
//!
//! Moves a `RawWordSource` onto its own thread so socket reads overlap
//! with decoding. Batches travel over a bounded single-producer,
//! single-consumer channel; the decoder owns whatever it has received.

use parking_lot::Mutex;
use splltools::decode::{DecodeOptions, EventStream, WordSource};
use splltools::raw::{Health, RawWordSource};
use splltools::{RawWord, Result, SpllError};
use std::io::{self, Read};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct WordPump {
    receiver: flume::Receiver<Result<Vec<RawWord>>>,
    health: Arc<Mutex<Health>>,
}

impl WordPump {
    /// Start reading `batch` words at a time, with up to `depth` batches
    /// waiting in the channel.
    ///
    /// The reader thread stops after forwarding the first error, or once
    /// the pump is dropped and its next send fails. A thread blocked on a
    /// silent socket only notices the drop when the socket closes.
    pub fn spawn<R>(mut source: RawWordSource<R>, batch: usize, depth: usize) -> Self
    where
        R: Read + Send + 'static,
    {
        let (sender, receiver) = flume::bounded(depth);
        let health = Arc::new(Mutex::new(source.health()));
        let shared = health.clone();
        std::thread::spawn(move || loop {
            let r = source.read_n(batch);
            *shared.lock() = source.health();
            let failed = r.is_err();
            if let Err(e) = &r {
                warn!("word reader stopping: {}", e);
            }
            if sender.send(r).is_err() {
                debug!("word pump dropped");
                break;
            }
            if failed {
                break;
            }
        });
        WordPump { receiver, health }
    }

    /// Health counters as of the last completed batch
    pub fn health(&self) -> Health {
        *self.health.lock()
    }

    /// Next batch from the reader thread. The requested size is ignored:
    /// batches are sized when the pump is spawned.
    pub fn refill(&mut self, _n: usize) -> Result<Vec<RawWord>> {
        match self.receiver.recv() {
            Ok(r) => r,
            Err(_) => Err(SpllError::Transport(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "word reader has stopped",
            ))),
        }
    }
}

impl WordSource for WordPump {
    fn read_words(&mut self, n: usize) -> Result<Vec<RawWord>> {
        self.refill(n)
    }
}

/// Events decoded from a pump, one refill batch per channel message
pub type PumpedEvents = EventStream<WordPump>;

/// Spawn a pump sized for `opts` and decode from it
pub fn pumped_events<R>(source: RawWordSource<R>, opts: DecodeOptions, depth: usize) -> PumpedEvents
where
    R: Read + Send + 'static,
{
    let source = match opts.max_sync_scan {
        Some(_) => source.with_max_sync_scan(opts.max_sync_scan),
        None => source,
    };
    let pump = WordPump::spawn(source, opts.refill_batch, depth);
    EventStream::with_source(pump, opts)
}
