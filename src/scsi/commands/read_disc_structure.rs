//! READ DISC STRUCTURE (0xAD): token replies only. Format 0x01 carries a
//! copyright descriptor saying "no protection, no region"; everything
//! else gets a bare header.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

const HEADER_LEN: usize = 4;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read_disc_structure(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let format = cbw.block[7];
        let allocation = u16::from_be_bytes([cbw.block[8], cbw.block[9]]) as usize;
        debug!("read disc structure format {:x}", format);

        let len = match format {
            0x01 => {
                // Copyright structure: not protected, all regions.
                let payload = [0x00, 0x00, 0x00];
                let total = HEADER_LEN + payload.len();
                self.in_buf[..2]
                    .copy_from_slice(&((total - 2) as u16).to_be_bytes());
                self.in_buf[2] = 0x00;
                self.in_buf[3] = 0x00;
                self.in_buf[HEADER_LEN..total].copy_from_slice(&payload);
                total
            }
            _ => {
                self.in_buf[..HEADER_LEN].fill(0);
                HEADER_LEN
            }
        };

        CommandOutcome::DataIn {
            len: len.min(allocation),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::scsi::testing::*;

    #[test]
    fn copyright_structure() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, _) = exec_in(&mut cd, &[0xAD, 0, 0, 0, 0, 0, 0, 0x01, 0, 32, 0, 0], 32);
        assert_eq!(data, &[0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn other_formats_get_a_bare_header() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, _) = exec_in(&mut cd, &[0xAD, 0, 0, 0, 0, 0, 0, 0x00, 0, 32, 0, 0], 32);
        assert_eq!(data, &[0x00, 0x00, 0x00, 0x00]);
    }
}
