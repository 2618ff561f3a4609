//! Wire format of the SPLL debug stream
//!
//! Each record on the wire is 8 bytes: a little-endian protocol word
//! followed by a little-endian sequence counter. The protocol word is
//! laid out as
//!
//! ```text
//!  31   30        29       28  27..24  23..0
//! +----+---------+--------+---+-------+---------+
//! |term| prelock | helper | - | kind  | payload |
//! +----+---------+--------+---+-------+---------+
//! ```

use crate::bit::BitOps;

/// Bytes per wire record
pub const RECORD_LEN: usize = 8;

pub const TERMINATOR_BIT: usize = 31;
pub const PRELOCK_BIT: usize = 30;
pub const HELPER_BIT: usize = 29;

/// One protocol word together with the low half of its sequence counter
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct RawWord {
    pub value: u32,
    pub seq: u16,
}

impl RawWord {
    pub fn new(value: u32, seq: u16) -> Self {
        RawWord { value, seq }
    }

    /// Parse an 8-byte wire record
    pub fn from_record(rec: &[u8; RECORD_LEN]) -> Self {
        let value = u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]);
        let counter = u32::from_le_bytes([rec[4], rec[5], rec[6], rec[7]]);
        RawWord {
            value,
            seq: (counter & 0xffff) as u16,
        }
    }

    #[inline]
    pub fn is_terminator(&self) -> bool {
        self.value.check(TERMINATOR_BIT)
    }
}

/// Encode one wire record
pub fn encode_record(value: u32, counter: u32) -> [u8; RECORD_LEN] {
    let mut rec = [0u8; RECORD_LEN];
    rec[..4].copy_from_slice(&value.to_le_bytes());
    rec[4..].copy_from_slice(&counter.to_le_bytes());
    rec
}

/// Which event attribute a word's payload updates
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum FieldKind {
    Y,
    Err,
    Tag,
    Period,
    Event,
    Ref,
    SampleId,
    /// Unrecognized kind, ignored by the decoder
    Unknown(u8),
}

impl FieldKind {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => FieldKind::Y,
            1 => FieldKind::Err,
            2 => FieldKind::Tag,
            3 => FieldKind::Period,
            4 => FieldKind::Event,
            5 => FieldKind::Ref,
            6 => FieldKind::SampleId,
            x => FieldKind::Unknown(x),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            FieldKind::Y => 0,
            FieldKind::Err => 1,
            FieldKind::Tag => 2,
            FieldKind::Period => 3,
            FieldKind::Event => 4,
            FieldKind::Ref => 5,
            FieldKind::SampleId => 6,
            FieldKind::Unknown(x) => x & 0xf,
        }
    }
}

/// Decoded view of one protocol word
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct TaggedField {
    pub terminator: bool,
    pub source_helper: bool,
    pub source_prelock: bool,
    pub kind: FieldKind,
    /// Low 24 bits; narrowed further per kind by the decoder
    pub payload: u32,
}

impl TaggedField {
    /// Build a field with no source bits set
    pub fn new(kind: FieldKind, payload: u32, terminator: bool) -> Self {
        TaggedField {
            terminator,
            source_helper: false,
            source_prelock: false,
            kind,
            payload: payload & 0xffffff,
        }
    }

    pub fn helper(mut self) -> Self {
        self.source_helper = true;
        self
    }

    pub fn prelock(mut self) -> Self {
        self.source_prelock = true;
        self
    }

    /// Pack back into a protocol word
    pub fn word(&self) -> u32 {
        let mut v = (self.kind.raw() as u32) << 24 | (self.payload & 0xffffff);
        v.change(TERMINATOR_BIT, self.terminator);
        v.change(PRELOCK_BIT, self.source_prelock);
        v.change(HELPER_BIT, self.source_helper);
        v
    }
}

impl From<u32> for TaggedField {
    fn from(v: u32) -> Self {
        TaggedField {
            terminator: v.check(TERMINATOR_BIT),
            source_helper: v.check(HELPER_BIT),
            source_prelock: v.check(PRELOCK_BIT),
            kind: FieldKind::from_raw(v.field(24, 4) as u8),
            payload: v.field(0, 24),
        }
    }
}
