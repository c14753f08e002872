//! PAUSE/RESUME (0x4B) and STOP PLAY/SCAN (0x4E).

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn pause_resume(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        if cbw.block[8] & 0x01 != 0 {
            info!("resume audio");
            self.player.resume();
        } else {
            info!("pause audio");
            self.player.pause();
        }
        CommandOutcome::None
    }

    /// Stopping a virtual player is a pause: there is no pickup to park.
    pub(crate) fn stop_play_scan(&mut self) -> CommandOutcome {
        info!("stop play/scan");
        self.player.pause();
        CommandOutcome::None
    }
}

#[cfg(test)]
mod tests {
    use crate::scsi::testing::*;

    #[test]
    fn pause_and_resume() {
        let mut cd = drive_with(Some(mixed_disc()));
        let _ = cd.handle_command(&cbw_in(&[0x4B, 0, 0, 0, 0, 0, 0, 0, 0, 0], 0));
        assert_eq!(cd.player_mut().paused, 1);
        let _ = cd.handle_command(&cbw_in(&[0x4B, 0, 0, 0, 0, 0, 0, 0, 1, 0], 0));
        assert_eq!(cd.player_mut().resumed, 1);
    }

    #[test]
    fn stop_pauses() {
        let mut cd = drive_with(Some(mixed_disc()));
        let _ = cd.handle_command(&cbw_in(&[0x4E, 0, 0, 0, 0, 0, 0, 0, 0, 0], 0));
        assert_eq!(cd.player_mut().paused, 1);
    }
}
