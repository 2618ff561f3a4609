#[allow(unused_imports)]
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use splltools::cycle::LockCycleFilter;
use splltools::decode::{decode_word, DecodeOptions, EventStream};
use splltools::raw::RawWordSource;
use splltools::word::{encode_record, FieldKind, TaggedField};
use splltools::{Event, EventKind};
use std::io::Cursor;

const EVENTS: u32 = 10_000;

/// Seven-word samples, preceded by one sync marker
fn load_capture() -> Vec<u8> {
    let kinds = [
        FieldKind::SampleId,
        FieldKind::Y,
        FieldKind::Err,
        FieldKind::Tag,
        FieldKind::Ref,
        FieldKind::Period,
        FieldKind::Event,
    ];
    let mut b = Vec::new();
    let mut seq = 0;
    b.extend_from_slice(&encode_record(0x8000_0000, seq));
    for i in 0..EVENTS + 200 {
        for (j, &k) in kinds.iter().enumerate() {
            seq += 1;
            let payload = if k == FieldKind::Event { (i == 100) as u32 } else { i };
            let f = TaggedField::new(k, payload, j == kinds.len() - 1);
            b.extend_from_slice(&encode_record(f.word(), seq));
        }
    }
    b
}

fn words(c: &mut Criterion) {
    let w = TaggedField::new(FieldKind::Err, 0xfffffd, true).helper().word();
    c.bench_function("decode_word", |b| { b.iter( || {
        let mut e = Event::default();
        decode_word(&mut e, black_box(w));
        black_box(e);
    })});
}

fn stream(c: &mut Criterion) {
    let capture = load_capture();

    c.bench_function("event_stream", |b| { b.iter( || {
        let s = EventStream::new(RawWordSource::new(Cursor::new(&capture[..])), DecodeOptions::default());
        let n = s.take(EVENTS as usize).filter(|e| e.is_ok()).count();
        black_box(n);
    })});
}

fn cycle(c: &mut Criterion) {
    let capture = load_capture();

    c.bench_function("lock_cycle", |b| { b.iter( || {
        let s = EventStream::new(RawWordSource::new(Cursor::new(&capture[..])), DecodeOptions::default());
        let evts = LockCycleFilter::new(Some(EventKind::PllStartup), None)
            .read(EVENTS as usize - 100, s)
            .unwrap();
        black_box(evts);
    })});
}

criterion_group!(benches, words, stream, cycle);
criterion_main!(benches);
