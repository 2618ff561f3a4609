#![allow(dead_code)]

use splltools::word::{encode_record, FieldKind, TaggedField};
use splltools::{Event, EventKind, SourceFlags};

/// Synthetic wire capture with a running sequence counter
pub struct Wire {
    pub bytes: Vec<u8>,
    pub counter: u32,
}

impl Wire {
    pub fn new() -> Self {
        Wire { bytes: Vec::new(), counter: 0 }
    }

    pub fn word(&mut self, w: u32) -> &mut Self {
        self.bytes.extend_from_slice(&encode_record(w, self.counter));
        self.counter = self.counter.wrapping_add(1);
        self
    }

    pub fn field(&mut self, f: TaggedField) -> &mut Self {
        self.word(f.word())
    }

    /// Skip the counter ahead as if `n` records were lost
    pub fn drop_records(&mut self, n: u32) -> &mut Self {
        self.counter = self.counter.wrapping_add(n);
        self
    }

    /// Append every word of one sample, terminator last
    pub fn event(&mut self, e: &Event) -> &mut Self {
        for f in fields(e) {
            self.field(f);
        }
        self
    }

    pub fn into_cursor(&self) -> std::io::Cursor<Vec<u8>> {
        std::io::Cursor::new(self.bytes.clone())
    }
}

/// Split an event into the words the PLL would send for it
pub fn fields(e: &Event) -> Vec<TaggedField> {
    let raw = [
        (FieldKind::SampleId, e.sample_id),
        (FieldKind::Y, e.y as u32),
        (FieldKind::Err, (e.err as u32) & 0xffffff),
        (FieldKind::Tag, e.tag),
        (FieldKind::Ref, e.reference),
        (FieldKind::Period, e.period as u32),
        (FieldKind::Event, e.event_code.raw()),
    ];
    let n = raw.len();
    raw.iter()
        .enumerate()
        .map(|(i, &(kind, payload))| {
            let mut f = TaggedField::new(kind, payload, i == n - 1);
            f.source_helper = e.source.is_helper();
            f.source_prelock = e.source.is_prelock();
            f
        })
        .collect()
}

pub fn sample(id: u32, code: EventKind, source: SourceFlags) -> Event {
    Event {
        sample_id: id,
        y: (id * 3) as u16,
        err: id as i32 - 500,
        tag: id * 7,
        reference: id * 11,
        period: (id % 4096) as u16,
        event_code: code,
        source,
    }
}

/// A capture joined mid-sample: a few stray words, one terminator, then `events`
pub fn capture(events: &[Event]) -> Wire {
    let mut w = Wire::new();
    w.field(TaggedField::new(FieldKind::Y, 1, false))
        .field(TaggedField::new(FieldKind::Tag, 2, false))
        .field(TaggedField::new(FieldKind::Err, 3, true));
    for e in events {
        w.event(e);
    }
    w
}

/// Like `capture`, with enough trailing samples that 100-word refills
/// never run into the end of the data while `events` are decoded
pub fn padded_capture(events: &[Event]) -> Wire {
    let mut w = capture(events);
    for i in 0..20 {
        w.event(&sample(10_000 + i, EventKind::None, SourceFlags::MAIN));
    }
    w
}
