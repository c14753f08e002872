//! TEST UNIT READY (0x00).

use crate::audio::AudioPlayer;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    /// Ready drives answer with the inherited default status, so a pending
    /// Unit Attention keeps failing until the host collects it.
    pub(crate) fn test_unit_ready(&mut self) -> CommandOutcome {
        if !self.ready {
            debug!("test unit ready: no media");
            return self.fail(SenseData::NOT_READY);
        }
        CommandOutcome::None
    }
}
