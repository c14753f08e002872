//! PLAY AUDIO (10) 0x45, PLAY AUDIO MSF 0x47, PLAY AUDIO (12) 0xA5.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::disc::address::msf_to_lba;
use crate::media::MediaProvider;
use crate::scsi::commands::{be16, be32};
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

/// Start address some hosts use to mean "resume from where you paused".
const LBA_RESUME: u32 = 0xFFFF_FFFF;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn play_audio10(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let lba = be32(&cbw.block, 2);
        let blocks = be16(&cbw.block, 7) as u32;
        info!("play audio(10): lba {}, {} blocks", lba, blocks);
        self.play(lba, blocks)
    }

    pub(crate) fn play_audio12(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let lba = be32(&cbw.block, 2);
        let blocks = be32(&cbw.block, 6);
        info!("play audio(12): lba {}, {} blocks", lba, blocks);
        self.play(lba, blocks)
    }

    pub(crate) fn play_audio_msf(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let start = msf_to_lba(cbw.block[3], cbw.block[4], cbw.block[5]);
        let end = msf_to_lba(cbw.block[6], cbw.block[7], cbw.block[8]);
        info!("play audio msf: lba {}..{}", start, end);

        if start > end {
            return self.fail(SenseData::INVALID_FIELD_IN_CDB);
        }
        if start == end {
            // A zero-length window is how hosts pause an MSF-driven player.
            self.player.pause();
            return CommandOutcome::None;
        }
        if !self.audio_track_at(start) {
            return self.fail(SenseData::ILLEGAL_MODE_FOR_TRACK);
        }
        self.player.play(start, end - start);
        CommandOutcome::None
    }

    fn play(&mut self, lba: u32, blocks: u32) -> CommandOutcome {
        if blocks == 0 {
            debug!("play audio with zero length, ignored");
            return CommandOutcome::None;
        }
        if lba == LBA_RESUME {
            self.player.resume();
            return CommandOutcome::None;
        }
        if !self.audio_track_at(lba) {
            return self.fail(SenseData::ILLEGAL_MODE_FOR_TRACK);
        }
        self.player.play(lba, blocks);
        CommandOutcome::None
    }

    fn audio_track_at(&self, lba: u32) -> bool {
        self.disc
            .as_ref()
            .and_then(|d| d.track_for_lba(lba))
            .is_some_and(|t| t.mode.is_audio())
    }
}
