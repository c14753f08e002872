//! START STOP UNIT (0x1B).
//!
//! Acknowledged without physical action: the tray is virtual and media
//! changes arrive through the catalog instead.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn start_stop_unit(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let start = cbw.block[4] & 0x01;
        let load_eject = (cbw.block[4] >> 1) & 0x01;
        debug!("start stop unit: start {}, loej {}", start, load_eject);
        CommandOutcome::None
    }
}
