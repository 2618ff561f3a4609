//! Tab-separated output of decoded events

use crate::Event;
use anyhow::Result;
use std::io::Write;

/// Column names, in record order
pub const COLUMNS: [&str; 8] = ["sample_id", "source", "event", "err", "y", "tag", "ref", "period"];

/// Serialize events to tab-separated values, one record per event.
///
/// The source is written as its 2-bit flag value and the event code as its
/// raw number, so the output can be read back without name lookups.
pub fn tsv(wtr: &mut csv::Writer<impl Write>, events: &[Event]) -> Result<()> {
    for e in events.iter() {
        wtr.write_record(&[
            e.sample_id.to_string(),
            e.source.bits().to_string(),
            e.event_code.raw().to_string(),
            e.err.to_string(),
            e.y.to_string(),
            e.tag.to_string(),
            e.reference.to_string(),
            e.period.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the column names as a header record
pub fn tsv_header(wtr: &mut csv::Writer<impl Write>) -> Result<()> {
    wtr.write_record(&COLUMNS)?;
    Ok(())
}

/// A tab-separated writer without automatic headers
pub fn tsv_writer<W: Write>(w: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .from_writer(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EventKind, SourceFlags};

    #[test]
    fn tsv_records() {
        let events = vec![
            Event { sample_id: 1, err: -3, y: 7, tag: 5, reference: 9, ..Default::default() },
            Event {
                sample_id: 2,
                event_code: EventKind::PllStartup,
                source: SourceFlags::HELPER | SourceFlags::PRELOCK,
                period: 12,
                ..Default::default()
            },
        ];
        let mut wtr = tsv_writer(Vec::new());
        tsv_header(&mut wtr).unwrap();
        tsv(&mut wtr, &events).unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(
            "sample_id\tsource\tevent\terr\ty\ttag\tref\tperiod\n1\t0\t0\t-3\t7\t5\t9\t0\n2\t3\t1\t0\t0\t0\t0\t12\n",
            out
        );
    }
}
