//! SET CD SPEED (0xBB). The image reads at whatever the storage delivers;
//! acknowledged OK.

use crate::audio::AudioPlayer;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn set_cd_speed(&mut self) -> CommandOutcome {
        debug!("set cd speed");
        CommandOutcome::None
    }
}
