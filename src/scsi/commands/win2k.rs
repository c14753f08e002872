//! Opcode 0xA4: Windows 2000 sends this during drive discovery. The reply
//! is a byte-for-byte capture from an ASUS CD-ROM drive; anything else
//! makes the OS mark the drive defective.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

const REPLY: [u8; 8] = [0x00, 0x06, 0x00, 0x00, 0x25, 0xFF, 0x01, 0x00];

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn win2k_specific(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        debug!("win2k-specific 0xA4");
        self.in_buf[..REPLY.len()].copy_from_slice(&REPLY);
        CommandOutcome::DataIn {
            len: REPLY.len().min(cbw.data_transfer_len as usize),
        }
    }
}
