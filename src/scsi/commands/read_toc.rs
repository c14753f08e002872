//! READ TOC/PMA/ATIP (0x43), formats 0x00 (TOC) and 0x01 (session info).

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::disc::address::encode_address;
use crate::media::MediaProvider;
use crate::scsi::commands::be16;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

const TOC_HEADER_LEN: usize = 4;
const TOC_ENTRY_LEN: usize = 8;

/// Track number naming the lead-out area.
const LEADOUT_TRACK: u8 = 0xAA;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read_toc(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        if !self.ready {
            error!("read toc with no media");
            return self.fail(SenseData::NOT_READY);
        }
        let disc = match self.disc_or_fail() {
            Ok(disc) => disc,
            Err(outcome) => return outcome,
        };

        let msf = cbw.block[1] & 0x02 != 0;
        let format = cbw.block[2] & 0x0F;
        let starting_track = cbw.block[6];
        let allocation = be16(&cbw.block, 7) as usize;

        info!(
            "read toc: format {}, msf {}, start {}",
            format, msf, starting_track
        );

        let mut at = TOC_HEADER_LEN;
        match format {
            0x00 => {
                if starting_track != LEADOUT_TRACK {
                    let first = if starting_track == 0 { 1 } else { starting_track };
                    for track in disc.tracks().iter().filter(|t| t.number >= first) {
                        at += write_entry(
                            &mut self.in_buf[at..],
                            track.mode.adr_control(),
                            track.number,
                            encode_address(track.start_lba, msf, false),
                        );
                    }
                }
                at += write_entry(
                    &mut self.in_buf[at..],
                    0x14,
                    LEADOUT_TRACK,
                    encode_address(disc.leadout_lba(), msf, false),
                );

                self.in_buf[..2].copy_from_slice(&((at - 2) as u16).to_be_bytes());
                self.in_buf[2] = 1; // first track
                self.in_buf[3] = disc.last_track_number();
            }
            0x01 => {
                // Single-session disc: one entry for the session's first track.
                if let Some(track) = disc.first_track() {
                    at += write_entry(
                        &mut self.in_buf[at..],
                        track.mode.adr_control(),
                        track.number,
                        encode_address(track.start_lba, msf, false),
                    );
                }
                self.in_buf[..2].copy_from_slice(&((at - 2) as u16).to_be_bytes());
                self.in_buf[2] = 1; // first session
                self.in_buf[3] = 1; // last session
            }
            other => {
                info!("read toc: unsupported format {}", other);
                return self.fail(SenseData::INVALID_FIELD_IN_CDB);
            }
        }

        CommandOutcome::DataIn {
            len: at.min(allocation),
        }
    }
}

fn write_entry(buf: &mut [u8], adr_control: u8, track: u8, address: [u8; 4]) -> usize {
    buf[0] = 0x00;
    buf[1] = adr_control;
    buf[2] = track;
    buf[3] = 0x00;
    buf[4..8].copy_from_slice(&address);
    TOC_ENTRY_LEN
}

#[cfg(test)]
mod tests {
    use crate::bulk_only_transport::csw::CommandStatus;
    use crate::scsi::testing::*;

    fn toc_cb(msf: bool, format: u8, start: u8, allocation: u16) -> [u8; 10] {
        let a = allocation.to_be_bytes();
        [
            0x43,
            if msf { 0x02 } else { 0 },
            format,
            0,
            0,
            0,
            start,
            a[0],
            a[1],
            0,
        ]
    }

    #[test]
    fn format0_msf_matches_reference_disc() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (data, status) = exec_in(&mut cd, &toc_cb(true, 0, 0, 28), 28);
        assert_eq!(status, CommandStatus::Passed);
        // Header: length 26, tracks 1..=2.
        assert_eq!(&data[..4], &[0x00, 0x1A, 0x01, 0x02]);
        // Track 1: audio at LBA 0 => MSF 00:02:00.
        assert_eq!(&data[4..12], &[0x00, 0x10, 0x01, 0x00, 0x00, 0x02, 0x00, 0x00]);
        // Track 2: data at LBA 20_000 => 20_150 frames => 04:28:50.
        assert_eq!(&data[12..20], &[0x00, 0x14, 0x02, 0x00, 0x00, 4, 28, 50]);
        // Lead-out at 300_000 => 300_150 frames => 66:42:00.
        assert_eq!(&data[20..28], &[0x00, 0x14, 0xAA, 0x00, 0x00, 66, 42, 0]);
    }

    #[test]
    fn format0_lba_encoding() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (data, _) = exec_in(&mut cd, &toc_cb(false, 0, 0, 64), 64);
        assert_eq!(&data[12..20], &[0x00, 0x14, 0x02, 0x00, 0x00, 0x00, 0x4E, 0x20]);
    }

    #[test]
    fn always_ends_with_leadout() {
        let mut cd = drive_with(Some(mixed_disc()));
        // Starting track past the last one still yields the lead-out.
        let (data, _) = exec_in(&mut cd, &toc_cb(false, 0, 5, 64), 64);
        assert_eq!(data.len(), 12);
        assert_eq!(data[6], 0xAA);

        let (only_leadout, _) = exec_in(&mut cd, &toc_cb(false, 0, 0xAA, 64), 64);
        assert_eq!(only_leadout.len(), 12);
        assert_eq!(only_leadout[6], 0xAA);
    }

    #[test]
    fn session_info_format() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (data, _) = exec_in(&mut cd, &toc_cb(false, 1, 0, 64), 64);
        assert_eq!(data.len(), 12);
        assert_eq!(&data[..4], &[0x00, 0x0A, 0x01, 0x01]);
        assert_eq!(data[6], 1); // first track of session 1
    }

    #[test]
    fn unsupported_format_fails() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (_, status) = exec_in(&mut cd, &toc_cb(false, 2, 0, 64), 64);
        assert_eq!(status, CommandStatus::Failed);
        let (sense, _) = exec_in(&mut cd, &[0x03, 0, 0, 0, 18, 0], 18);
        assert_eq!(sense[12], 0x24);
    }

    #[test]
    fn truncates_to_allocation() {
        let mut cd = drive_with(Some(mixed_disc()));
        let (data, _) = exec_in(&mut cd, &toc_cb(true, 0, 0, 20), 20);
        assert_eq!(data.len(), 20);
    }
}
