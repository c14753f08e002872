//! READ (10) 0x28: streaming data read, 2048 bytes per block regardless
//! of how the track is stored.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::disc::COOKED_SECTOR_SIZE;
use crate::media::MediaProvider;
use crate::scsi::commands::{be16, be32};
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, ReadContext, VirtualCdrom};

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn read10(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        if !self.ready {
            error!("read(10) with no media");
            return self.fail(SenseData::NOT_READY);
        }
        let disc = match self.disc_or_fail() {
            Ok(disc) => disc,
            Err(outcome) => return outcome,
        };

        let lba = be32(&cbw.block, 2);
        let mut blocks = be16(&cbw.block, 7) as u32;

        // Physical geometry comes from the track under the start address;
        // the host always receives cooked 2048-byte blocks.
        let (block_size, skip_bytes, header_mode) = match disc.track_for_lba(lba) {
            Some(track) => (
                track.mode.block_size(),
                track.mode.skip_bytes(),
                track.mode.header_mode_byte(),
            ),
            None => (COOKED_SECTOR_SIZE, 0, 0x01),
        };

        // Some hosts issue a zero block count and size the transfer purely
        // through the CBW; honor the byte count in that case.
        if blocks == 0 && cbw.data_transfer_len > 0 {
            blocks = cbw.data_transfer_len.div_ceil(COOKED_SECTOR_SIZE);
            debug!("read(10) derived {} blocks from transfer length", blocks);
        }
        if blocks == 0 {
            debug!("read(10) with nothing to transfer");
            return CommandOutcome::None;
        }

        info!("read(10): lba {}, {} blocks", lba, blocks);
        self.start_streaming(ReadContext {
            lba,
            remaining_blocks: blocks,
            block_size,
            transfer_block_size: COOKED_SECTOR_SIZE,
            skip_bytes,
            mcs: 0,
            header_mode,
            synthesize: false,
        })
    }
}
