//! PREVENT ALLOW MEDIUM REMOVAL (0x1E). Acknowledged; there is no tray
//! lock to operate.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn prevent_allow_medium_removal(
        &mut self,
        cbw: &CommandBlockWrapper,
    ) -> CommandOutcome {
        debug!("prevent/allow removal: prevent {}", cbw.block[4] & 0x01);
        CommandOutcome::None
    }
}
