//! Decoding tools for the SPLL debug stream.
//!
//! The soft PLL streams its internal state as a sequence of 32-bit words,
//! each followed by a 32-bit sequence counter. Words carry one tagged
//! field each, and the last word of every sample has its top bit set.
//! The modules here take that stream apart in three stages:
//!
//! ```text
//! socket bytes --> raw::RawWordSource --> decode::EventDecoder --> cycle::LockCycleFilter
//!                  (alignment)            (field assembly)         (trigger + source)
//! ```

use std::fmt;
use std::io;
use thiserror::Error;

pub mod bit;
pub mod cfg;
pub mod cycle;
pub mod decode;
pub mod raw;
pub mod ser;
pub mod word;

pub use word::{FieldKind, RawWord, TaggedField};

/// Default debug proxy port
pub const DEFAULT_PORT: u16 = 12345;

#[derive(Error, Debug)]
pub enum SpllError {
    #[error("cannot connect to {addr}: {source}")]
    Connection {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("no terminator word found after scanning {scanned} words")]
    DesyncTimeout { scanned: usize },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SpllError>;

/// PLL event code carried by `FieldKind::Event` words
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum EventKind {
    None,
    PllStartup,
    PllLocked,
    /// Any other 24-bit code, kept verbatim
    Other(u32),
}

impl EventKind {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => EventKind::None,
            1 => EventKind::PllStartup,
            2 => EventKind::PllLocked,
            x => EventKind::Other(x),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            EventKind::None => 0,
            EventKind::PllStartup => 1,
            EventKind::PllLocked => 2,
            EventKind::Other(x) => x,
        }
    }
}

impl Default for EventKind {
    fn default() -> Self {
        EventKind::None
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::None => Ok(()),
            EventKind::PllStartup => write!(f, "PLL Startup"),
            EventKind::PllLocked => write!(f, "PLL Locked"),
            EventKind::Other(x) => write!(f, "unknown({:#x})", x),
        }
    }
}

/// Which PLL branch and lock phase produced a sample.
///
/// `MAIN` and `PHASE` are the absence of `HELPER` and `PRELOCK`
/// respectively, so the four combinations are `MAIN_PHASE`,
/// `MAIN | PRELOCK`, `HELPER` and `HELPER | PRELOCK`.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Default, Debug)]
pub struct SourceFlags(u8);

impl SourceFlags {
    pub const MAIN: SourceFlags = SourceFlags(0x0);
    pub const PHASE: SourceFlags = SourceFlags(0x0);
    pub const MAIN_PHASE: SourceFlags = SourceFlags(0x0);
    pub const HELPER: SourceFlags = SourceFlags(0x1);
    pub const PRELOCK: SourceFlags = SourceFlags(0x2);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, other: SourceFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_helper(self) -> bool {
        self.contains(SourceFlags::HELPER)
    }

    pub fn is_prelock(self) -> bool {
        self.contains(SourceFlags::PRELOCK)
    }
}

impl std::ops::BitOr for SourceFlags {
    type Output = SourceFlags;

    fn bitor(self, rhs: SourceFlags) -> SourceFlags {
        SourceFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for SourceFlags {
    fn bitor_assign(&mut self, rhs: SourceFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for SourceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match (self.is_helper(), self.is_prelock()) {
            (true, true) => "Helper[prelocking]",
            (true, false) => "Helper[phase]",
            (false, true) => "Phase[prelocking]",
            (false, false) => "Phase[main]",
        };
        f.write_str(name)
    }
}

/// One fully assembled PLL sample
#[derive(Clone, Copy, Eq, PartialEq, Default, Debug)]
pub struct Event {
    /// 24-bit sample counter
    pub sample_id: u32,
    pub y: u16,
    /// Phase error, sign-extended from 24 bits
    pub err: i32,
    pub tag: u32,
    pub reference: u32,
    /// 12-bit period, 0 if the sample never carried one
    pub period: u16,
    pub event_code: EventKind,
    /// Union of the source bits of every word in the sample
    pub source: SourceFlags,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.event_code == EventKind::None {
            write!(f, "{:<9}: ", self.sample_id)?;
        } else {
            write!(f, "Evt: {}", self.event_code)?;
        }
        write!(
            f,
            " {} err {} y {} tag {} ref {}",
            self.source, self.err, self.y, self.tag, self.reference
        )
    }
}
