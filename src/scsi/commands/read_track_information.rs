//! READ TRACK INFORMATION (0x52), addressed by LBA or track number.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::disc::Track;
use crate::media::MediaProvider;
use crate::scsi::commands::{be16, be32};
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

const TRACK_INFO_LEN: usize = 36;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read_track_information(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let disc = match self.disc_or_fail() {
            Ok(disc) => disc,
            Err(outcome) => return outcome,
        };

        let address_type = cbw.block[1] & 0x03;
        let address = be32(&cbw.block, 2);
        let allocation = be16(&cbw.block, 7) as usize;

        debug!(
            "read track information: type {}, address {}",
            address_type, address
        );

        let track: Option<Track> = match address_type {
            0x00 => disc.track_for_lba(address).copied(),
            0x01 => u8::try_from(address)
                .ok()
                .and_then(|n| disc.track_by_number(n))
                .copied(),
            _ => None,
        };

        let Some(track) = track else {
            info!("track information: no track for address {}", address);
            return self.fail(SenseData::LBA_OUT_OF_RANGE);
        };

        // Track end: next track's start, or the lead-out.
        let end_lba = disc
            .tracks()
            .iter()
            .find(|t| t.number == track.number + 1)
            .map(|t| t.start_lba)
            .unwrap_or_else(|| disc.leadout_lba());

        let reply = &mut self.in_buf[..TRACK_INFO_LEN];
        reply.fill(0);
        reply[..2].copy_from_slice(&((TRACK_INFO_LEN - 2) as u16).to_be_bytes());
        reply[2] = track.number;
        reply[3] = 1; // session
        reply[5] = if track.mode.is_audio() { 0x00 } else { 0x04 };
        reply[6] = 0x01; // data mode
        reply[8..12].copy_from_slice(&track.start_lba.to_be_bytes());
        reply[24..28].copy_from_slice(&(end_lba - track.start_lba).to_be_bytes());

        CommandOutcome::DataIn {
            len: TRACK_INFO_LEN.min(allocation),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bulk_only_transport::csw::CommandStatus;
    use crate::scsi::testing::*;

    fn track_info_cb(address_type: u8, address: u32, allocation: u16) -> [u8; 10] {
        let ad = address.to_be_bytes();
        let al = allocation.to_be_bytes();
        [0x52, address_type, ad[0], ad[1], ad[2], ad[3], 0, al[0], al[1], 0]
    }

    #[test]
    fn by_track_number() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (data, _) = exec_in(&mut cd, &track_info_cb(1, 2, 36), 36);
        assert_eq!(data[2], 2);
        assert_eq!(data[5], 0x04); // data track
        assert_eq!(&data[8..12], &20_000u32.to_be_bytes());
        assert_eq!(&data[24..28], &280_000u32.to_be_bytes());
    }

    #[test]
    fn by_lba() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (data, _) = exec_in(&mut cd, &track_info_cb(0, 100, 36), 36);
        assert_eq!(data[2], 1);
        assert_eq!(data[5], 0x00); // audio track
        assert_eq!(&data[24..28], &20_000u32.to_be_bytes());
    }

    #[test]
    fn missing_track_fails_out_of_range() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (_, status) = exec_in(&mut cd, &track_info_cb(1, 9, 36), 36);
        assert_eq!(status, CommandStatus::Failed);
        let (sense, _) = exec_in(&mut cd, &[0x03, 0, 0, 0, 18, 0], 18);
        assert_eq!(sense[12], 0x21);
    }
}
