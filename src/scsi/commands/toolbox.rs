//! Vendor toolbox opcodes (0xD0-0xDA): browse the image catalog and
//! request a media switch without any host-side driver.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::{Catalog, MAX_CATALOG_ENTRIES};
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom};

/// `{index, type, name[33], size[5]}` per catalog entry.
pub const FILE_ENTRY_LEN: usize = 40;
const NAME_LEN: usize = 33;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn toolbox_list_items(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let count = self.catalog.count().min(MAX_CATALOG_ENTRIES);
        info!("toolbox: listing {} catalog entries", count);

        for index in 0..count {
            let entry = &mut self.in_buf[index * FILE_ENTRY_LEN..][..FILE_ENTRY_LEN];
            entry.fill(0);
            entry[0] = index as u8;
            entry[1] = 0; // type: file

            let name = self.catalog.name(index).as_bytes();
            let name_len = name.len().min(NAME_LEN - 1);
            entry[2..2 + name_len].copy_from_slice(&name[..name_len]);

            // 40-bit big-endian size.
            let size = self.catalog.size(index);
            entry[35..40].copy_from_slice(&size.to_be_bytes()[3..8]);
        }

        CommandOutcome::DataIn {
            len: (count * FILE_ENTRY_LEN).min(cbw.data_transfer_len as usize),
        }
    }

    pub(crate) fn toolbox_get_count(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let count = self.catalog.count().min(MAX_CATALOG_ENTRIES) as u8;
        debug!("toolbox: {} catalog entries", count);
        self.in_buf[0] = count;
        CommandOutcome::DataIn {
            len: 1usize.min(cbw.data_transfer_len as usize),
        }
    }

    pub(crate) fn toolbox_set_next(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let index = cbw.block[1] as usize;
        info!("toolbox: switch to catalog entry {}", index);
        self.catalog.set_next(index);
        CommandOutcome::None
    }

    pub(crate) fn toolbox_list_devices(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        // Device 0 is this CD-ROM; the remaining slots are empty.
        const DEVICES: [u8; 8] = [0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        self.in_buf[..DEVICES.len()].copy_from_slice(&DEVICES);
        CommandOutcome::DataIn {
            len: DEVICES.len().min(cbw.data_transfer_len as usize),
        }
    }
}
