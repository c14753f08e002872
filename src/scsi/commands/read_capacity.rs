//! READ CAPACITY (10) 0x25: last addressable LBA and the 2048-byte
//! logical block size.

use crate::audio::AudioPlayer;
use crate::catalog::Catalog;
use crate::disc::COOKED_SECTOR_SIZE;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

pub const READ_CAPACITY_REPLY_LEN: usize = 8;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read_capacity10(&mut self) -> CommandOutcome {
        let disc = match self.disc_or_fail() {
            Ok(disc) => disc,
            Err(outcome) => return outcome,
        };

        let last_lba = disc.leadout_lba() - 1;
        debug!("read capacity: last lba {}", last_lba);
        self.in_buf[..4].copy_from_slice(&last_lba.to_be_bytes());
        self.in_buf[4..8].copy_from_slice(&COOKED_SECTOR_SIZE.to_be_bytes());
        CommandOutcome::DataIn {
            len: READ_CAPACITY_REPLY_LEN,
        }
    }
}
