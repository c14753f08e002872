//! GET EVENT STATUS NOTIFICATION (0x4A), polled media events only.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::commands::be16;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

const HEADER_LEN: usize = 4;
const MEDIA_EVENT_LEN: usize = 4;

/// Media event class, bit 4 of the class mask.
const CLASS_MEDIA: u8 = 1 << 4;

const EVENT_NEW_MEDIA: u8 = 0x02;
const MEDIA_PRESENT: u8 = 0x02;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn get_event_status(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let polled = cbw.block[1] & 0x01 != 0;
        let class_request = cbw.block[4];
        let allocation = be16(&cbw.block, 7) as usize;

        if !polled {
            info!("asynchronous event status not supported");
            return self.fail(SenseData::INVALID_FIELD_IN_CDB);
        }

        let mut at = HEADER_LEN;
        let mut reported_class = 0u8;

        if class_request & CLASS_MEDIA != 0 {
            reported_class |= CLASS_MEDIA;

            let mut event = [0u8; MEDIA_EVENT_LEN];
            if self.disc_changed {
                event[0] = EVENT_NEW_MEDIA;
                event[1] = MEDIA_PRESENT;
                // Only drop the latch once the host can actually see the
                // event; a probe with a short allocation must not eat it.
                if allocation >= at + MEDIA_EVENT_LEN {
                    debug!("reporting new media event");
                    self.disc_changed = false;
                }
            } else {
                event[0] = 0x00; // no change
                event[1] = if self.ready { MEDIA_PRESENT } else { 0x00 };
            }

            if allocation >= at + MEDIA_EVENT_LEN {
                self.in_buf[at..at + MEDIA_EVENT_LEN].copy_from_slice(&event);
                at += MEDIA_EVENT_LEN;
            }
        }

        let header = &mut self.in_buf[..HEADER_LEN];
        header[..2].copy_from_slice(&((at - HEADER_LEN) as u16).to_be_bytes());
        header[2] = reported_class;
        header[3] = CLASS_MEDIA; // supported event classes

        CommandOutcome::DataIn {
            len: at.min(allocation),
        }
    }
}
