//! MODE SENSE (6) 0x1A and MODE SENSE (10) 0x5A.
//!
//! Pages 0x01 (error recovery), 0x0E (CD audio control), 0x1A (power
//! condition) and 0x2A (MM capabilities); 0x3F returns all of them. The
//! reply is assembled by iterating the candidate pages and appending the
//! ones the page-code filter selects.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::commands::be16;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

pub const PAGE_ERROR_RECOVERY: u8 = 0x01;
pub const PAGE_CD_AUDIO_CONTROL: u8 = 0x0E;
pub const PAGE_POWER_CONDITION: u8 = 0x1A;
pub const PAGE_MM_CAPABILITIES: u8 = 0x2A;
pub const PAGE_ALL: u8 = 0x3F;

const CANDIDATE_PAGES: [u8; 4] = [
    PAGE_ERROR_RECOVERY,
    PAGE_CD_AUDIO_CONTROL,
    PAGE_POWER_CONDITION,
    PAGE_MM_CAPABILITIES,
];

/// 4x CD data rate in KB/s, reported as both max and current speed.
const READ_SPEED_KBPS: u16 = 706 * 4;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn mode_sense6(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        const HEADER_LEN: usize = 4;
        let page_control = cbw.block[2] >> 6;
        let page_code = cbw.block[2] & 0x3F;
        let allocation = cbw.block[4] as usize;
        debug!("mode sense(6) page {:x}, pc {}", page_code, page_control);

        if page_control == 0b11 {
            return self.fail(SenseData::SAVING_NOT_SUPPORTED);
        }
        let Some(total) = self.build_mode_pages(HEADER_LEN, page_code) else {
            return self.fail(SenseData::INVALID_FIELD_IN_CDB);
        };

        let medium_type = self.disc.map(|d| d.medium_type()).unwrap_or(0x01);
        self.in_buf[0] = (total - 1) as u8; // mode data length
        self.in_buf[1] = medium_type;
        self.in_buf[2] = 0x80; // device specific: write protected
        self.in_buf[3] = 0x00; // no block descriptors

        CommandOutcome::DataIn {
            len: total.min(allocation),
        }
    }

    pub(crate) fn mode_sense10(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        const HEADER_LEN: usize = 8;
        let page_control = cbw.block[2] >> 6;
        let page_code = cbw.block[2] & 0x3F;
        let allocation = be16(&cbw.block, 7) as usize;
        debug!("mode sense(10) page {:x}, pc {}", page_code, page_control);

        if page_control == 0b11 {
            return self.fail(SenseData::SAVING_NOT_SUPPORTED);
        }
        let Some(total) = self.build_mode_pages(HEADER_LEN, page_code) else {
            return self.fail(SenseData::INVALID_FIELD_IN_CDB);
        };

        let medium_type = self.disc.map(|d| d.medium_type()).unwrap_or(0x01);
        let header = &mut self.in_buf[..HEADER_LEN];
        header[..2].copy_from_slice(&((total - 2) as u16).to_be_bytes());
        header[2] = medium_type;
        header[3] = 0x80;
        header[4] = 0x00;
        header[5] = 0x00;
        header[6..8].copy_from_slice(&0u16.to_be_bytes()); // block descriptor length

        CommandOutcome::DataIn {
            len: total.min(allocation),
        }
    }

    /// Append the selected pages after the parameter header. `None` when a
    /// specific page is requested that we do not carry.
    fn build_mode_pages(&mut self, header_len: usize, page_code: u8) -> Option<usize> {
        let mut at = header_len;
        let mut matched = false;

        for candidate in CANDIDATE_PAGES {
            if page_code != PAGE_ALL && page_code != candidate {
                continue;
            }
            matched = true;
            at += self.append_mode_page(at, candidate);
        }

        matched.then_some(at)
    }

    fn append_mode_page(&mut self, at: usize, page: u8) -> usize {
        let volume = self.audio_volume;
        match page {
            PAGE_ERROR_RECOVERY => {
                let body = [
                    page, 0x0A, //
                    0x80, // AWRE
                    0x01, // read retry count
                    0, 0, 0, 0, 0, 0, 0, 0,
                ];
                self.in_buf[at..at + body.len()].copy_from_slice(&body);
                body.len()
            }
            PAGE_CD_AUDIO_CONTROL => {
                let body = [
                    page, 0x0E, //
                    0x00, 0x00, //
                    0x04, // SOTC
                    0x00, //
                    0x01, 0x02, // output port 0 -> channel 0, port 1 -> channel 1
                    volume, volume, // port volumes
                    0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                ];
                self.in_buf[at..at + body.len()].copy_from_slice(&body);
                body.len()
            }
            PAGE_POWER_CONDITION => {
                let body = [page, 0x0A, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
                self.in_buf[at..at + body.len()].copy_from_slice(&body);
                body.len()
            }
            PAGE_MM_CAPABILITIES => {
                let speed = READ_SPEED_KBPS.to_be_bytes();
                let body = [
                    page, 0x14, //
                    0x01, // reads CD-R
                    0x00, // no write
                    0x01, // audio play
                    0x03, // CD-DA commands, accurate stream
                    0x28, // tray loader with eject
                    0x00, //
                    speed[0], speed[1], // max read speed
                    0x00, 0xFF, // 255 volume levels
                    0x00, 0x00, // buffer size
                    speed[0], speed[1], // current read speed
                    0, 0, 0, 0, 0, 0,
                ];
                self.in_buf[at..at + body.len()].copy_from_slice(&body);
                body.len()
            }
            _ => 0,
        }
    }
}
