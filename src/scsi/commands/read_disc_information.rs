//! READ DISC INFORMATION (0x51): a finalized single-session disc.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::commands::be16;
use crate::scsi::{CommandOutcome, VirtualCdrom};

const DISC_INFO_LEN: usize = 34;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read_disc_information(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let disc = match self.disc_or_fail() {
            Ok(disc) => disc,
            Err(outcome) => return outcome,
        };
        let allocation = be16(&cbw.block, 7) as usize;
        debug!("read disc information");

        let reply = &mut self.in_buf[..DISC_INFO_LEN];
        reply.fill(0);
        reply[..2].copy_from_slice(&((DISC_INFO_LEN - 2) as u16).to_be_bytes());
        reply[2] = 0x02; // finalized disc
        reply[3] = 1; // first track
        reply[4] = 1; // number of sessions
        reply[5] = 1; // first track in last session
        reply[6] = disc.last_track_number();
        reply[8] = 0x00; // disc type: CD-DA or CD-ROM
        reply[20..24].copy_from_slice(&disc.leadout_lba().to_be_bytes());

        CommandOutcome::DataIn {
            len: DISC_INFO_LEN.min(allocation),
        }
    }
}
