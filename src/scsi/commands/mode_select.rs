//! MODE SELECT (10) 0x55: the one command with an OUT data phase.
//!
//! The begin half requests the parameter list from the host; the data is
//! processed once the transport has collected it. Only page 0x0E (CD audio
//! control) has an effect; other pages are logged and ignored.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::commands::be16;
use crate::scsi::commands::mode_sense::PAGE_CD_AUDIO_CONTROL;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, PendingOut, VirtualCdrom, MAX_PARAMETER_LIST_LEN};

/// Mode parameter header (10) length.
const HEADER_LEN: usize = 8;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn mode_select10(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let parameter_list_len = be16(&cbw.block, 7) as usize;
        debug!("mode select(10), parameter list {}", parameter_list_len);

        if parameter_list_len == 0 {
            return CommandOutcome::None;
        }
        if parameter_list_len > MAX_PARAMETER_LIST_LEN {
            return self.fail(SenseData::PARAMETER_LIST_LENGTH_ERROR);
        }

        self.pending_out = Some(PendingOut::ModeSelect10);
        CommandOutcome::DataOut {
            len: parameter_list_len,
        }
    }

    pub(crate) fn mode_select10_data(&mut self, data: &[u8]) {
        if data.len() < HEADER_LEN {
            error!("mode select parameter list too short: {}", data.len());
            self.fail(SenseData::PARAMETER_LIST_LENGTH_ERROR);
            return;
        }

        let block_descriptor_len = u16::from_be_bytes([data[6], data[7]]) as usize;
        let Some(page) = data.get(HEADER_LEN + block_descriptor_len..) else {
            self.fail(SenseData::PARAMETER_LIST_LENGTH_ERROR);
            return;
        };
        if page.is_empty() {
            debug!("mode select without mode page data");
            return;
        }

        match page[0] & 0x3F {
            PAGE_CD_AUDIO_CONTROL => {
                if page.len() < 10 {
                    error!("audio control page truncated: {}", page.len());
                    self.fail(SenseData::PARAMETER_LIST_LENGTH_ERROR);
                    return;
                }
                let volume0 = page[8];
                let volume1 = page[9];
                // Some hosts zero one channel while adjusting the other;
                // the lower of the two is the intended level.
                let volume = volume0.min(volume1);
                info!("audio volume {} (channels {}/{})", volume, volume0, volume1);
                self.audio_volume = volume;
                self.player.set_volume(volume);
            }
            other => {
                info!("ignoring mode select for page {:x}", other);
            }
        }
    }
}
