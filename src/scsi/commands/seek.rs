//! SEEK (10) 0x2B: reposition the logical head and let the audio player
//! follow, so a Play Audio without a start address resumes from here.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::commands::be32;
use crate::scsi::{CommandOutcome, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn seek10(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let lba = be32(&cbw.block, 2);
        info!("seek(10) to lba {}", lba);
        self.current_lba = lba;
        self.player.seek(lba);
        CommandOutcome::None
    }
}
