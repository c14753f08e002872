//! Command Status Wrapper: the 13-byte status frame closing every command
//! (USB MSC BOT spec, section 5.2).

use super::cbw::CommandBlockWrapper;

pub const CSW_LEN: usize = 13;
const CSW_SIGNATURE_LE: [u8; 4] = 0x53425355u32.to_le_bytes();

#[repr(u8)]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandStatus {
    #[default]
    Passed = 0x00,
    Failed = 0x01,
    PhaseError = 0x02,
}

/// Build the CSW for `cbw`. `residue` is the difference between
/// `dCBWDataTransferLength` and the bytes actually moved in the data phase.
pub fn build_csw(cbw: &CommandBlockWrapper, residue: u32, status: CommandStatus) -> [u8; CSW_LEN] {
    let mut csw = [0u8; CSW_LEN];
    csw[..4].copy_from_slice(&CSW_SIGNATURE_LE);
    csw[4..8].copy_from_slice(&cbw.tag.to_le_bytes());
    csw[8..12].copy_from_slice(&residue.to_le_bytes());
    csw[12] = status as u8;
    csw
}
