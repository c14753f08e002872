//! Sense state shared across commands.
//!
//! A failing handler latches a sense triplet here; the host retrieves it
//! with Request Sense, which also advances the state (see the handler in
//! `commands/request_sense.rs` for the Not Ready -> Unit Attention
//! promotion).

/// Sense key / additional sense code / qualifier triplet.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SenseData {
    pub key: u8,
    pub asc: u8,
    pub ascq: u8,
}

impl SenseData {
    const fn new(key: u8, asc: u8, ascq: u8) -> Self {
        SenseData { key, asc, ascq }
    }

    pub const NONE: SenseData = SenseData::new(0x00, 0x00, 0x00);

    /// NOT READY, LOGICAL UNIT NOT READY, CAUSE NOT REPORTABLE.
    pub const NOT_READY: SenseData = SenseData::new(0x02, 0x04, 0x00);
    /// NOT READY, MEDIUM NOT PRESENT.
    pub const MEDIUM_NOT_PRESENT: SenseData = SenseData::new(0x02, 0x3A, 0x00);
    /// UNIT ATTENTION, MEDIUM MAY HAVE CHANGED.
    pub const MEDIUM_CHANGED: SenseData = SenseData::new(0x06, 0x28, 0x00);
    /// MEDIUM ERROR, UNRECOVERED READ ERROR.
    pub const UNRECOVERED_READ_ERROR: SenseData = SenseData::new(0x03, 0x11, 0x00);
    /// ILLEGAL REQUEST, INVALID FIELD IN CDB.
    pub const INVALID_FIELD_IN_CDB: SenseData = SenseData::new(0x05, 0x24, 0x00);
    /// ILLEGAL REQUEST, LOGICAL BLOCK ADDRESS OUT OF RANGE.
    pub const LBA_OUT_OF_RANGE: SenseData = SenseData::new(0x05, 0x21, 0x00);
    /// ILLEGAL REQUEST, ILLEGAL MODE FOR THIS TRACK.
    pub const ILLEGAL_MODE_FOR_TRACK: SenseData = SenseData::new(0x05, 0x64, 0x00);
    /// ILLEGAL REQUEST, SAVING PARAMETERS NOT SUPPORTED.
    pub const SAVING_NOT_SUPPORTED: SenseData = SenseData::new(0x05, 0x39, 0x00);
    /// ILLEGAL REQUEST, PARAMETER LIST LENGTH ERROR.
    pub const PARAMETER_LIST_LENGTH_ERROR: SenseData = SenseData::new(0x05, 0x1A, 0x00);
    /// ILLEGAL REQUEST, INVALID COMMAND OPERATION CODE.
    pub const INVALID_OPCODE: SenseData = SenseData::new(0x05, 0x20, 0x00);
    /// HARDWARE ERROR.
    pub const HARDWARE_ERROR: SenseData = SenseData::new(0x04, 0x00, 0x00);

    /// Whether the key is NOT READY, which Request Sense promotes to
    /// UNIT ATTENTION after delivery.
    pub fn is_not_ready(&self) -> bool {
        self.key == 0x02
    }
}
