//! Extraction of lock cycles from a stream of events
//!
//! A lock cycle starts at the first event carrying the trigger code and
//! runs for as long as the caller keeps reading. Events before the trigger
//! are dropped, and an optional source filter keeps only the samples of
//! one PLL branch.

use crate::{Event, EventKind, SourceFlags};

#[derive(Clone, Copy, Eq, PartialEq, Default, Debug)]
pub struct LockCycleFilter {
    /// Start logging at this event code, or immediately if `None`
    pub trigger: Option<EventKind>,
    /// Keep only events from this source, or all if `None`
    pub source: Option<SourceFlags>,
}

impl LockCycleFilter {
    pub fn new(trigger: Option<EventKind>, source: Option<SourceFlags>) -> Self {
        LockCycleFilter { trigger, source }
    }

    /// Collect up to `n` events of the cycle.
    ///
    /// The trigger latch lives only for this call. The first error from
    /// `events` aborts the read; if `events` simply ends, whatever was
    /// collected so far is returned.
    pub fn read<I, E>(&self, n: usize, events: I) -> Result<Vec<Event>, E>
    where
        I: IntoIterator<Item = Result<Event, E>>,
    {
        self.cycles(events).take(n).collect()
    }

    /// Lazily filter `events` down to the cycle
    pub fn cycles<I, E>(&self, events: I) -> LockCycles<I::IntoIter>
    where
        I: IntoIterator<Item = Result<Event, E>>,
    {
        LockCycles {
            filter: *self,
            events: events.into_iter(),
            logging: false,
        }
    }

    fn triggers(&self, evt: &Event) -> bool {
        match self.trigger {
            None => true,
            Some(t) => evt.event_code == t,
        }
    }

    fn admits(&self, evt: &Event) -> bool {
        match self.source {
            None => true,
            Some(s) => evt.source == s,
        }
    }
}

/// Iterator adapter returned by [`LockCycleFilter::cycles`]
pub struct LockCycles<I> {
    filter: LockCycleFilter,
    events: I,
    logging: bool,
}

impl<I> LockCycles<I> {
    /// Whether the trigger has been seen yet
    pub fn triggered(&self) -> bool {
        self.logging
    }

    /// The underlying event sequence
    pub fn get_ref(&self) -> &I {
        &self.events
    }
}

impl<I, E> Iterator for LockCycles<I>
where
    I: Iterator<Item = Result<Event, E>>,
{
    type Item = Result<Event, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let evt = match self.events.next()? {
                Ok(evt) => evt,
                Err(e) => return Some(Err(e)),
            };
            if !self.logging && self.filter.triggers(&evt) {
                self.logging = true;
            }
            if self.logging && self.filter.admits(&evt) {
                return Some(Ok(evt));
            }
        }
    }
}
