//! GET PERFORMANCE (0xAC): fixed nominal-performance descriptor.
//!
//! 12-byte CDB; the data-phase budget is taken from the CBW transfer
//! length rather than a CDB allocation field.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

/// 8-byte performance header + one nominal descriptor.
const REPLY: [u8; 20] = [
    0x00, 0x00, 0x00, 0x0C, // performance data length
    0x00, // except
    0x00, // write
    0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, // start LBA
    0xFF, 0xFF, 0xFF, 0xFF, // end LBA
    0x00, 0x00, 0x00, 0xB0, // read speed, KB/s
];

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn get_performance(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        debug!("get performance");
        self.in_buf[..REPLY.len()].copy_from_slice(&REPLY);
        CommandOutcome::DataIn {
            len: REPLY.len().min(cbw.data_transfer_len as usize),
        }
    }
}
