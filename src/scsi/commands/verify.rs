//! VERIFY (10) 0x2F. Read-only media backed by a file needs no
//! verification pass; acknowledged OK.

use crate::audio::AudioPlayer;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn verify10(&mut self) -> CommandOutcome {
        debug!("verify(10)");
        CommandOutcome::None
    }
}
