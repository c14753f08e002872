//! Command Block Wrapper: the 31-byte little-endian frame that opens every
//! Bulk-Only command (USB MSC BOT spec, section 5.1).

pub const CBW_LEN: usize = 31;
const CBW_SIGNATURE_LE: [u8; 4] = 0x43425355u32.to_le_bytes();

const MIN_CB_LEN: u8 = 1;
const MAX_CB_LEN: u8 = 16;

/// Direction of the data phase announced by the CBW.
#[repr(u8)]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataDirection {
    Out,
    In,
    #[default]
    NotExpected,
}

/// Reason a CBW was rejected. Any of these stalls both endpoints until the
/// host performs a Bulk-Only Mass Storage Reset (spec 6.6.1).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidCbw {
    Signature,
    Lun,
    CommandBlockLength,
}

#[derive(Default, Debug, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandBlockWrapper {
    pub tag: u32,
    pub data_transfer_len: u32,
    pub direction: DataDirection,
    pub lun: u8,
    pub block_len: usize,
    pub block: [u8; 16],
}

impl CommandBlockWrapper {
    /// Parse and validate a received CBW. Spec 6.2.1: signature must match,
    /// the LUN must exist (we expose exactly LUN 0) and the command block
    /// length must be in 1..=16.
    pub fn from_le_bytes(value: &[u8; CBW_LEN]) -> Result<Self, InvalidCbw> {
        if !value.starts_with(&CBW_SIGNATURE_LE) {
            return Err(InvalidCbw::Signature);
        }
        let value = &value[4..];

        let lun = value[9] & 0x0F;
        if lun != 0 {
            return Err(InvalidCbw::Lun);
        }

        let block_len = value[10];
        if !(MIN_CB_LEN..=MAX_CB_LEN).contains(&block_len) {
            return Err(InvalidCbw::CommandBlockLength);
        }

        let data_transfer_len = u32::from_le_bytes(value[4..8].try_into().unwrap());
        Ok(CommandBlockWrapper {
            tag: u32::from_le_bytes(value[..4].try_into().unwrap()),
            data_transfer_len,
            direction: if data_transfer_len != 0 {
                if value[8] & (1 << 7) != 0 {
                    DataDirection::In
                } else {
                    DataDirection::Out
                }
            } else {
                DataDirection::NotExpected
            },
            lun,
            block_len: block_len as usize,
            block: value[11..].try_into().unwrap(),
        })
    }

    /// The command descriptor block carried by this CBW.
    pub fn command_block(&self) -> &[u8] {
        &self.block[..self.block_len]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a raw CBW frame the way a host controller would.
    pub(crate) fn raw_cbw(tag: u32, transfer_len: u32, dir_in: bool, cb: &[u8]) -> [u8; CBW_LEN] {
        let mut raw = [0u8; CBW_LEN];
        raw[..4].copy_from_slice(&CBW_SIGNATURE_LE);
        raw[4..8].copy_from_slice(&tag.to_le_bytes());
        raw[8..12].copy_from_slice(&transfer_len.to_le_bytes());
        raw[12] = if dir_in { 0x80 } else { 0x00 };
        raw[13] = 0; // LUN
        raw[14] = cb.len() as u8;
        raw[15..15 + cb.len()].copy_from_slice(cb);
        raw
    }

    #[test]
    fn parses_valid_cbw() {
        let raw = raw_cbw(0xDEAD_BEEF, 2048, true, &[0x28, 0, 0, 0, 0, 0, 0, 0, 1, 0]);
        let cbw = CommandBlockWrapper::from_le_bytes(&raw).unwrap();
        assert_eq!(cbw.tag, 0xDEAD_BEEF);
        assert_eq!(cbw.data_transfer_len, 2048);
        assert_eq!(cbw.direction, DataDirection::In);
        assert_eq!(cbw.lun, 0);
        assert_eq!(cbw.command_block()[0], 0x28);
        assert_eq!(cbw.command_block().len(), 10);
    }

    #[test]
    fn zero_transfer_means_no_data_phase() {
        let raw = raw_cbw(1, 0, true, &[0x00, 0, 0, 0, 0, 0]);
        let cbw = CommandBlockWrapper::from_le_bytes(&raw).unwrap();
        assert_eq!(cbw.direction, DataDirection::NotExpected);
    }

    #[test]
    fn rejects_bad_signature() {
        let mut raw = raw_cbw(1, 0, false, &[0x00]);
        raw[0] = 0x55;
        raw[1] = 0x55;
        assert!(matches!(
            CommandBlockWrapper::from_le_bytes(&raw),
            Err(InvalidCbw::Signature)
        ));
    }

    #[test]
    fn rejects_nonzero_lun() {
        let mut raw = raw_cbw(1, 0, false, &[0x00]);
        raw[13] = 1;
        assert!(matches!(
            CommandBlockWrapper::from_le_bytes(&raw),
            Err(InvalidCbw::Lun)
        ));
    }

    #[test]
    fn rejects_bad_command_block_length() {
        let mut raw = raw_cbw(1, 0, false, &[0x00]);
        raw[14] = 0;
        assert!(matches!(
            CommandBlockWrapper::from_le_bytes(&raw),
            Err(InvalidCbw::CommandBlockLength)
        ));
        raw[14] = 17;
        assert!(matches!(
            CommandBlockWrapper::from_le_bytes(&raw),
            Err(InvalidCbw::CommandBlockLength)
        ));
    }
}
