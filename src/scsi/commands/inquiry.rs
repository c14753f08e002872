//! INQUIRY (0x12): standard data plus VPD pages 0x00/0x80/0x83.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::commands::be16;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

pub const STANDARD_INQUIRY_LEN: usize = 36;

const VPD_SUPPORTED_PAGES: u8 = 0x00;
const VPD_UNIT_SERIAL_NUMBER: u8 = 0x80;
const VPD_DEVICE_IDENTIFICATION: u8 = 0x83;

/// Peripheral qualifier 0, device type 0x05 (CD-ROM).
const PERIPHERAL_CDROM: u8 = 0x05;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn inquiry(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let evpd = cbw.block[1] & 0x01 != 0;
        let page_code = cbw.block[2];
        let allocation = be16(&cbw.block, 3) as usize;

        let len = if !evpd {
            debug!("standard inquiry, allocation {}", allocation);
            self.standard_inquiry()
        } else {
            debug!("vpd inquiry page {:x}", page_code);
            match page_code {
                VPD_SUPPORTED_PAGES => {
                    let page = [
                        PERIPHERAL_CDROM,
                        VPD_SUPPORTED_PAGES,
                        0x00,
                        0x03, // three pages follow
                        VPD_SUPPORTED_PAGES,
                        VPD_UNIT_SERIAL_NUMBER,
                        VPD_DEVICE_IDENTIFICATION,
                    ];
                    self.in_buf[..page.len()].copy_from_slice(&page);
                    page.len()
                }
                VPD_UNIT_SERIAL_NUMBER => {
                    let serial = self.identity.serial;
                    self.in_buf[0] = PERIPHERAL_CDROM;
                    self.in_buf[1] = VPD_UNIT_SERIAL_NUMBER;
                    self.in_buf[2] = 0x00;
                    self.in_buf[3] = serial.len() as u8;
                    self.in_buf[4..4 + serial.len()].copy_from_slice(&serial);
                    4 + serial.len()
                }
                VPD_DEVICE_IDENTIFICATION => self.vpd_device_identification(),
                _ => {
                    info!("unsupported vpd page {:x}", page_code);
                    return self.fail(SenseData::INVALID_FIELD_IN_CDB);
                }
            }
        };

        CommandOutcome::DataIn {
            len: len.min(allocation),
        }
    }

    fn standard_inquiry(&mut self) -> usize {
        let reply = &mut self.in_buf[..STANDARD_INQUIRY_LEN];
        reply.fill(0);
        reply[0] = PERIPHERAL_CDROM;
        reply[1] = 0x80; // RMB: removable medium
        reply[2] = 0x00; // version: unclaimed
        reply[3] = 0x02; // response data format
        reply[4] = (STANDARD_INQUIRY_LEN - 5) as u8; // additional length
        reply[8..16].copy_from_slice(&self.identity.vendor);
        reply[16..32].copy_from_slice(&self.identity.product);
        reply[32..36].copy_from_slice(&self.identity.revision);
        STANDARD_INQUIRY_LEN
    }

    /// T10 Vendor ID designation descriptor, SPC-4 layout: code set ASCII,
    /// association LU, designator type 1, eight ASCII bytes.
    fn vpd_device_identification(&mut self) -> usize {
        let vendor = self.identity.vendor;
        let reply = &mut self.in_buf[..16];
        reply[0] = PERIPHERAL_CDROM;
        reply[1] = VPD_DEVICE_IDENTIFICATION;
        reply[2] = 0x00;
        reply[3] = 0x0C; // one descriptor: 4-byte header + 8-byte id
        reply[4] = 0x02; // protocol id 0, code set ASCII
        reply[5] = 0x01; // PIV 0, association LU, type T10 vendor id
        reply[6] = 0x00;
        reply[7] = 0x08;
        reply[8..16].copy_from_slice(&vendor);
        16
    }
}

#[cfg(test)]
mod tests {
    use crate::bulk_only_transport::csw::CommandStatus;
    use crate::scsi::testing::*;

    #[test]
    fn standard_inquiry_reply() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, status) = exec_in(&mut cd, &[0x12, 0, 0, 0, 36, 0], 36);
        assert_eq!(status, CommandStatus::Passed);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..8], &[0x05, 0x80, 0x00, 0x02, 0x1F, 0, 0, 0]);
        assert_eq!(&data[8..16], b"USBODE  ");
        assert_eq!(&data[16..32], b"Virtual CDROM   ");
        assert_eq!(&data[32..36], b"1.00");
    }

    #[test]
    fn supported_vpd_pages() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, _) = exec_in(&mut cd, &[0x12, 0x01, 0x00, 0, 64, 0], 64);
        assert_eq!(data, &[0x05, 0x00, 0x00, 0x03, 0x00, 0x80, 0x83]);
    }

    #[test]
    fn unit_serial_number_page() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, _) = exec_in(&mut cd, &[0x12, 0x01, 0x80, 0, 64, 0], 64);
        assert_eq!(data.len(), 19);
        assert_eq!(&data[..4], &[0x05, 0x80, 0x00, 15]);
        assert_eq!(&data[4..], b"USBODE-00000001");
    }

    #[test]
    fn device_identification_page_uses_spc4_layout() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, _) = exec_in(&mut cd, &[0x12, 0x01, 0x83, 0, 64, 0], 64);
        assert_eq!(
            &data[..8],
            &[0x05, 0x83, 0x00, 0x0C, 0x02, 0x01, 0x00, 0x08]
        );
        assert_eq!(&data[8..], b"USBODE  ");
    }

    #[test]
    fn unsupported_vpd_page_fails() {
        let mut cd = drive_with(Some(data_disc()));
        let (_, status) = exec_in(&mut cd, &[0x12, 0x01, 0xB0, 0, 64, 0], 64);
        assert_eq!(status, CommandStatus::Failed);
        let (sense, _) = exec_in(&mut cd, &[0x03, 0, 0, 0, 18, 0], 18);
        assert_eq!(sense[12], 0x24);
    }

    #[test]
    fn truncates_to_allocation() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, _) = exec_in(&mut cd, &[0x12, 0, 0, 0, 5, 0], 5);
        assert_eq!(data.len(), 5);
    }
}
