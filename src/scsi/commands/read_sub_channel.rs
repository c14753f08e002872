//! READ SUB-CHANNEL (0x42), format 0x01: current position from the audio
//! player.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::disc::address::encode_address;
use crate::media::MediaProvider;
use crate::scsi::commands::be16;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

const HEADER_LEN: usize = 4;
const POSITION_DATA_LEN: usize = 12;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read_sub_channel(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let msf = cbw.block[1] & 0x02 != 0;
        let mut format = cbw.block[3];
        let allocation = be16(&cbw.block, 7) as usize;

        // Format 0x00 is reserved; hosts that send it expect the current
        // position data, so treat it as 0x01.
        if format == 0x00 {
            format = 0x01;
        }

        if format != 0x01 {
            info!("read sub-channel: unsupported format {:x}", format);
            return self.fail(SenseData::INVALID_FIELD_IN_CDB);
        }
        let disc = match self.disc_or_fail() {
            Ok(disc) => disc,
            Err(outcome) => return outcome,
        };

        let lba = self.player.current_lba();
        let audio_status = self.player.state().audio_status();
        let track = disc.track_for_lba(lba).copied();

        debug!("sub-channel: lba {}, status {:x}", lba, audio_status);

        let header = &mut self.in_buf[..HEADER_LEN];
        header[0] = 0x00;
        header[1] = audio_status;
        header[2..4].copy_from_slice(&(POSITION_DATA_LEN as u16).to_be_bytes());

        let data = &mut self.in_buf[HEADER_LEN..HEADER_LEN + POSITION_DATA_LEN];
        data.fill(0);
        data[0] = 0x01; // current position data format
        match track {
            Some(track) => {
                data[1] = track.mode.adr_control();
                data[2] = track.number;
                data[3] = 0x01; // index
                data[4..8].copy_from_slice(&encode_address(lba, msf, false));
                data[8..12].copy_from_slice(&encode_address(lba - track.start_lba, msf, true));
            }
            None => {
                data[1] = 0x10;
                data[4..8].copy_from_slice(&encode_address(lba, msf, false));
                data[8..12].copy_from_slice(&encode_address(0, msf, true));
            }
        }

        CommandOutcome::DataIn {
            len: (HEADER_LEN + POSITION_DATA_LEN).min(allocation),
        }
    }
}
