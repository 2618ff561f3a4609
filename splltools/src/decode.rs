//! Assembly of tagged words into events

use std::collections::VecDeque;
use std::io::{self, Read};
use std::net::TcpStream;
use tracing::{debug, warn};

use crate::bit::sign_extend;
use crate::raw::RawWordSource;
use crate::word::{FieldKind, RawWord, TaggedField};
use crate::{Event, EventKind, Result, SourceFlags, SpllError};

/// What the decoder does about words lost mid-stream
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum SyncPolicy {
    /// Never look at the sequence counter. A lost word silently corrupts
    /// the sample it belonged to, and possibly the next one.
    Strict,
    /// On a sequence discontinuity, drop the partial sample and skip ahead
    /// to the word after the next terminator.
    Resync,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        SyncPolicy::Strict
    }
}

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct DecodeOptions {
    /// Refill when fewer words than this are buffered
    pub low_watermark: usize,
    /// Words requested per refill
    pub refill_batch: usize,
    pub sync: SyncPolicy,
    /// Give up once more than this many words pass without a terminator
    pub max_sync_scan: Option<usize>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            low_watermark: 10,
            refill_batch: 100,
            sync: SyncPolicy::Strict,
            max_sync_scan: None,
        }
    }
}

/// 24-bit two's complement to `i32`
#[inline]
pub fn sign_extend_24(raw: u32) -> i32 {
    sign_extend(raw & 0xffffff, 24)
}

/// Apply one protocol word to an event under construction.
///
/// Returns true if the word closes the event.
pub fn decode_word(evt: &mut Event, word: u32) -> bool {
    let f = TaggedField::from(word);
    if f.source_helper {
        evt.source |= SourceFlags::HELPER;
    }
    if f.source_prelock {
        evt.source |= SourceFlags::PRELOCK;
    }
    match f.kind {
        FieldKind::SampleId => evt.sample_id = f.payload & 0xffffff,
        FieldKind::Y => evt.y = (f.payload & 0xffff) as u16,
        FieldKind::Err => evt.err = sign_extend_24(f.payload),
        FieldKind::Tag => evt.tag = f.payload & 0xffffff,
        FieldKind::Ref => evt.reference = f.payload & 0xffffff,
        FieldKind::Period => evt.period = (f.payload & 0xfff) as u16,
        FieldKind::Event => evt.event_code = EventKind::from_raw(f.payload & 0xffffff),
        FieldKind::Unknown(_) => {}
    }
    f.terminator
}

pub struct EventDecoder {
    opts: DecodeOptions,
    last_seq: Option<u16>,
    resyncs: u64,
}

impl EventDecoder {
    pub fn new(opts: DecodeOptions) -> Self {
        EventDecoder {
            opts,
            last_seq: None,
            resyncs: 0,
        }
    }

    /// Number of times the resync policy dropped a partial sample
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    /// Pop words off `buffer` until one event is complete.
    ///
    /// `refill(k)` must return at least one aligned word; it is called
    /// with `refill_batch` when the buffer drops under the low watermark
    /// before the event starts, or runs dry in the middle of one.
    pub fn decode_one<F>(&mut self, buffer: &mut VecDeque<RawWord>, mut refill: F) -> Result<Event>
    where
        F: FnMut(usize) -> Result<Vec<RawWord>>,
    {
        if buffer.len() < self.opts.low_watermark {
            self.fill(buffer, &mut refill)?;
        }
        let mut evt = Event::default();
        loop {
            let w = self.next_word(buffer, &mut refill)?;
            if self.opts.sync == SyncPolicy::Resync {
                if let Some(last) = self.last_seq {
                    if w.seq != last.wrapping_add(1) {
                        warn!(
                            "sequence gap {:#06x} -> {:#06x}, dropping partial sample",
                            last, w.seq
                        );
                        self.resyncs += 1;
                        evt = Event::default();
                        self.skip_to_terminator(w, buffer, &mut refill)?;
                        continue;
                    }
                }
                self.last_seq = Some(w.seq);
            }
            if decode_word(&mut evt, w.value) {
                return Ok(evt);
            }
        }
    }

    fn next_word<F>(&mut self, buffer: &mut VecDeque<RawWord>, refill: &mut F) -> Result<RawWord>
    where
        F: FnMut(usize) -> Result<Vec<RawWord>>,
    {
        loop {
            if let Some(w) = buffer.pop_front() {
                return Ok(w);
            }
            self.fill(buffer, refill)?;
        }
    }

    fn fill<F>(&mut self, buffer: &mut VecDeque<RawWord>, refill: &mut F) -> Result<()>
    where
        F: FnMut(usize) -> Result<Vec<RawWord>>,
    {
        let words = refill(self.opts.refill_batch)?;
        if words.is_empty() {
            return Err(SpllError::Transport(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "word source ran dry",
            )));
        }
        debug!("refilled {} words ({} buffered)", words.len(), buffer.len());
        buffer.extend(words);
        Ok(())
    }

    /// Discard words up to and including the next terminator, starting with `w`
    fn skip_to_terminator<F>(
        &mut self,
        mut w: RawWord,
        buffer: &mut VecDeque<RawWord>,
        refill: &mut F,
    ) -> Result<()>
    where
        F: FnMut(usize) -> Result<Vec<RawWord>>,
    {
        let mut scanned = 0;
        while !w.is_terminator() {
            scanned += 1;
            if let Some(limit) = self.opts.max_sync_scan {
                if scanned > limit {
                    return Err(SpllError::DesyncTimeout { scanned });
                }
            }
            w = self.next_word(buffer, refill)?;
        }
        self.last_seq = Some(w.seq);
        Ok(())
    }
}

/// Anything that can hand the decoder a batch of aligned words
pub trait WordSource {
    /// Return about `n` aligned words, blocking until they are available
    fn read_words(&mut self, n: usize) -> Result<Vec<RawWord>>;
}

impl<R: Read> WordSource for RawWordSource<R> {
    fn read_words(&mut self, n: usize) -> Result<Vec<RawWord>> {
        self.read_n(n)
    }
}

/// Unbounded sequence of events decoded from a word source
pub struct EventStream<S> {
    source: S,
    decoder: EventDecoder,
    buffer: VecDeque<RawWord>,
    done: bool,
}

impl EventStream<RawWordSource<TcpStream>> {
    pub fn connect(addr: &str, port: u16, opts: DecodeOptions) -> Result<Self> {
        let source = RawWordSource::connect(addr, port)?;
        Ok(EventStream::new(source, opts))
    }
}

impl<R: Read> EventStream<RawWordSource<R>> {
    /// Decode straight off a reader. A scan limit in `opts` also bounds
    /// initial alignment; without one, the source keeps its own limit.
    pub fn new(source: RawWordSource<R>, opts: DecodeOptions) -> Self {
        let source = match opts.max_sync_scan {
            Some(_) => source.with_max_sync_scan(opts.max_sync_scan),
            None => source,
        };
        EventStream::with_source(source, opts)
    }
}

impl<S: WordSource> EventStream<S> {
    pub fn with_source(source: S, opts: DecodeOptions) -> Self {
        EventStream {
            source,
            decoder: EventDecoder::new(opts),
            buffer: VecDeque::with_capacity(opts.refill_batch.saturating_add(opts.low_watermark)),
            done: false,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn decoder(&self) -> &EventDecoder {
        &self.decoder
    }
}

impl<S: WordSource> Iterator for EventStream<S> {
    type Item = Result<Event>;

    /// Yields events until the first error, which is yielded once
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let source = &mut self.source;
        let r = self.decoder.decode_one(&mut self.buffer, |n| source.read_words(n));
        if r.is_err() {
            self.done = true;
        }
        Some(r)
    }
}
