//! READ CD (0xBE): streaming read with expected-sector-type selection and
//! main-channel synthesis.
//!
//! The expected sector type picks the physical/transfer geometry; the
//! main-channel selection bits say which portions of a full raw sector the
//! host wants. When the backing image stores cooked 2048-byte sectors the
//! missing SYNC/HEADER portions are synthesized and EDC/ECC is zero
//! filled (see `synthesize_sector` in the dispatcher).

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::disc::{TrackMode, COOKED_SECTOR_SIZE, RAW_SECTOR_SIZE};
use crate::media::MediaProvider;
use crate::scsi::commands::{be24, be32};
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, ReadContext, VirtualCdrom};

/// Main-channel selection bits (CDB byte 9, bits 7-3 shifted down).
const MCS_SYNC: u8 = 0x10;
const MCS_HEADER: u8 = 0x08;
const MCS_USER_DATA: u8 = 0x04;
const MCS_EDC_ECC: u8 = 0x02;

/// Bytes of a raw sector selected by `mcs`, in canonical order.
pub(crate) fn mcs_transfer_len(mcs: u8) -> u32 {
    let mut total = 0;
    if mcs & MCS_SYNC != 0 {
        total += 12;
    }
    if mcs & MCS_HEADER != 0 {
        total += 4;
    }
    if mcs & MCS_USER_DATA != 0 {
        total += COOKED_SECTOR_SIZE;
    }
    if mcs & MCS_EDC_ECC != 0 {
        total += 288;
    }
    total
}

/// Leading raw-sector bytes to drop when the host deselected the prefix
/// portions. Only the SYNC/HEADER prefix is skippable this way.
pub(crate) fn mcs_skip_bytes(mcs: u8) -> u32 {
    let mut skip = 0;
    if mcs & MCS_SYNC == 0 {
        skip += 12;
    }
    if mcs & MCS_HEADER == 0 {
        skip += 4;
    }
    skip
}

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read_cd(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        if !self.ready {
            error!("read cd with no media");
            return self.fail(SenseData::NOT_READY);
        }
        let disc = match self.disc_or_fail() {
            Ok(disc) => disc,
            Err(outcome) => return outcome,
        };

        let expected_sector_type = (cbw.block[1] >> 2) & 0x07;
        let lba = be32(&cbw.block, 2);
        let mut blocks = be24(&cbw.block, 6);
        let mcs = (cbw.block[9] >> 3) & 0x1F;

        let track_mode = disc.track_for_lba(lba).map(|t| t.mode);
        let track_block_size = track_mode.map_or(COOKED_SECTOR_SIZE, TrackMode::block_size);
        let track_skip = track_mode.map_or(0, TrackMode::skip_bytes);
        let header_mode = track_mode.map_or(0x01, TrackMode::header_mode_byte);

        let (block_size, transfer_block_size, skip_bytes, synthesize) = match expected_sector_type
        {
            0x01 => (RAW_SECTOR_SIZE, RAW_SECTOR_SIZE, 0, false), // CD-DA
            0x02 => (track_block_size, COOKED_SECTOR_SIZE, track_skip, false), // Mode 1
            0x03 => (RAW_SECTOR_SIZE, 2336, 16, false),           // Mode 2 formless
            0x04 => (track_block_size, COOKED_SECTOR_SIZE, track_skip, false), // Mode 2 form 1
            0x05 => (RAW_SECTOR_SIZE, COOKED_SECTOR_SIZE, 24, false), // Mode 2 form 2
            _ => {
                // Any type: audio tracks stream raw; data tracks follow
                // the main-channel selection. A raw source supplies the
                // selected portions directly, a cooked source only holds
                // user data and anything else must be synthesized.
                if track_mode.is_some_and(TrackMode::is_audio) {
                    (RAW_SECTOR_SIZE, RAW_SECTOR_SIZE, 0, false)
                } else if track_block_size == RAW_SECTOR_SIZE {
                    (track_block_size, mcs_transfer_len(mcs), mcs_skip_bytes(mcs), false)
                } else if mcs == MCS_USER_DATA {
                    (track_block_size, COOKED_SECTOR_SIZE, 0, false)
                } else {
                    (track_block_size, mcs_transfer_len(mcs), track_skip, true)
                }
            }
        };

        debug!(
            "read cd: est {:x}, mcs {:x} -> block {}, transfer {}, skip {}",
            expected_sector_type, mcs, block_size, transfer_block_size, skip_bytes
        );

        if blocks == 0 && cbw.data_transfer_len > 0 {
            if transfer_block_size == 0 {
                error!("read cd with empty main-channel selection");
                return self.fail(SenseData::INVALID_FIELD_IN_CDB);
            }
            blocks = cbw.data_transfer_len.div_ceil(transfer_block_size);
        }
        if blocks == 0 {
            return CommandOutcome::None;
        }
        if transfer_block_size == 0 {
            return self.fail(SenseData::INVALID_FIELD_IN_CDB);
        }

        info!("read cd: lba {}, {} blocks", lba, blocks);
        self.start_streaming(ReadContext {
            lba,
            remaining_blocks: blocks,
            block_size,
            transfer_block_size,
            skip_bytes,
            mcs,
            header_mode,
            synthesize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk_only_transport::csw::CommandStatus;
    use crate::scsi::testing::*;

    fn read_cd_cb(est: u8, lba: u32, blocks: u32, mcs: u8) -> [u8; 12] {
        let l = lba.to_be_bytes();
        let b = blocks.to_be_bytes();
        [
            0xBE,
            est << 2,
            l[0],
            l[1],
            l[2],
            l[3],
            b[1],
            b[2],
            b[3],
            mcs << 3,
            0,
            0,
        ]
    }

    #[test]
    fn mcs_lengths() {
        assert_eq!(mcs_transfer_len(0x1F), 2352);
        assert_eq!(mcs_transfer_len(0x04), 2048);
        assert_eq!(mcs_transfer_len(0x18), 16);
        assert_eq!(mcs_skip_bytes(0x1F), 0);
        assert_eq!(mcs_skip_bytes(0x04), 16);
        assert_eq!(mcs_skip_bytes(0x08), 12);
    }

    #[test]
    fn user_data_only_matches_read10() {
        let mut cd = drive_with(Some(data_disc()));
        let (via_read_cd, status) =
            exec_in(&mut cd, &read_cd_cb(0x02, 3, 2, 0x04), 2 * 2048);
        assert_eq!(status, CommandStatus::Passed);

        let (via_read10, _) = exec_in(
            &mut cd,
            &[0x28, 0, 0, 0, 0, 3, 0, 0, 2, 0],
            2 * 2048,
        );
        assert_eq!(via_read_cd, via_read10);
    }

    #[test]
    fn synthesizes_full_raw_sector_from_cooked_image() {
        let mut cd = drive_with(Some(data_disc()));
        // Any-type read of one block with everything selected from a
        // 2048-byte data image: SYNC + HEADER synthesized, EDC zeroed.
        let (data, status) = exec_in(&mut cd, &read_cd_cb(0x00, 16, 1, 0x1F), 2352);
        assert_eq!(status, CommandStatus::Passed);
        assert_eq!(data.len(), 2352);

        // SYNC pattern.
        assert_eq!(data[0], 0x00);
        assert!(data[1..11].iter().all(|&b| b == 0xFF));
        assert_eq!(data[11], 0x00);
        // HEADER: LBA 16 => absolute frame 166 => 00:02:16, mode 1.
        assert_eq!(&data[12..16], &[0, 2, 16, 1]);
        // USER DATA matches the image sector.
        let (sector, _) = exec_in(&mut cd, &[0x28, 0, 0, 0, 0, 16, 0, 0, 1, 0], 2048);
        assert_eq!(&data[16..16 + 2048], &sector[..]);
        // EDC/ECC zero filled.
        assert!(data[16 + 2048..].iter().all(|&b| b == 0));
    }

    #[test]
    fn header_only_selection() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, _) = exec_in(&mut cd, &read_cd_cb(0x00, 75, 1, 0x08), 4);
        // LBA 75 => absolute 225 frames => 00:03:00.
        assert_eq!(data, &[0, 3, 0, 1]);
    }

    #[test]
    fn cd_da_from_data_track_streams_raw_blocks() {
        let mut cd = drive_with(Some(data_disc()));
        // Expected sector type CD-DA forces 2352-byte blocks even though
        // the image is cooked; two image sectors supply one raw block.
        let (data, status) = exec_in(&mut cd, &read_cd_cb(0x01, 0, 1, 0x1F), 2352);
        assert_eq!(status, CommandStatus::Passed);
        assert_eq!(data.len(), 2352);
    }

    #[test]
    fn zero_blocks_passes() {
        let mut cd = drive_with(Some(data_disc()));
        let (data, status) = exec_in(&mut cd, &read_cd_cb(0x02, 0, 0, 0x04), 0);
        assert!(data.is_empty());
        assert_eq!(status, CommandStatus::Passed);
    }
}
