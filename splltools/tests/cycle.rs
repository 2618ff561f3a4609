use splltools::cycle::LockCycleFilter;
use splltools::decode::{DecodeOptions, EventStream};
use splltools::raw::RawWordSource;
use splltools::{Event, EventKind, SourceFlags};
use std::convert::Infallible;

mod common;
use common::sample;

fn codes(events: &[Event]) -> Vec<EventKind> {
    events.iter().map(|e| e.event_code).collect()
}

#[test]
fn trigger_latch_never_resets() {
    let evts: Vec<Result<Event, Infallible>> = [
        EventKind::None,
        EventKind::PllStartup,
        EventKind::None,
        EventKind::PllLocked,
    ]
    .iter()
    .enumerate()
    .map(|(i, &code)| Ok(sample(i as u32, code, SourceFlags::MAIN)))
    .collect();
    let got = LockCycleFilter::new(Some(EventKind::PllStartup), None).read(3, evts).unwrap();
    assert_eq!(vec![EventKind::PllStartup, EventKind::None, EventKind::PllLocked], codes(&got));
}

#[test]
fn unknown_trigger_code_matches_verbatim() {
    let evts: Vec<Result<Event, Infallible>> = vec![
        Ok(sample(0, EventKind::Other(5), SourceFlags::MAIN)),
        Ok(sample(1, EventKind::Other(6), SourceFlags::MAIN)),
        Ok(sample(2, EventKind::None, SourceFlags::MAIN)),
    ];
    let got = LockCycleFilter::new(Some(EventKind::from_raw(6)), None).read(10, evts).unwrap();
    assert_eq!(vec![1, 2], got.iter().map(|e| e.sample_id).collect::<Vec<_>>());
}

/// Helper startup cycle picked out of an interleaved helper/main stream
#[test]
fn helper_cycle_from_wire() {
    let hp = SourceFlags::HELPER | SourceFlags::PRELOCK;
    let mut evts = Vec::new();
    for i in 0..10 {
        evts.push(sample(i, EventKind::None, SourceFlags::MAIN));
    }
    evts.push(sample(10, EventKind::PllStartup, hp));
    for i in 11..60 {
        let src = if i % 2 == 0 { hp } else { SourceFlags::MAIN };
        let code = if i == 40 { EventKind::PllLocked } else { EventKind::None };
        evts.push(sample(i, code, src));
    }
    let w = common::padded_capture(&evts);
    let stream = EventStream::new(RawWordSource::new(w.into_cursor()), DecodeOptions::default());
    let got = LockCycleFilter::new(Some(EventKind::PllStartup), Some(hp))
        .read(20, stream)
        .unwrap();
    assert_eq!(20, got.len());
    assert_eq!(EventKind::PllStartup, got[0].event_code);
    assert!(got.iter().all(|e| e.source == hp));
    assert_eq!(
        (0..20).map(|k| 10 + 2 * k).collect::<Vec<u32>>(),
        got.iter().map(|e| e.sample_id).collect::<Vec<_>>()
    );
    assert_eq!(EventKind::PllLocked, got[15].event_code);
}

#[test]
fn cycles_report_trigger_state() {
    let evts: Vec<Result<Event, Infallible>> = vec![
        Ok(sample(0, EventKind::None, SourceFlags::MAIN)),
        Ok(sample(1, EventKind::PllLocked, SourceFlags::MAIN)),
    ];
    let mut cycles = LockCycleFilter::new(Some(EventKind::PllLocked), None).cycles(evts);
    assert!(!cycles.triggered());
    assert_eq!(1, cycles.next().unwrap().unwrap().sample_id);
    assert!(cycles.triggered());
    assert!(cycles.next().is_none());
}
