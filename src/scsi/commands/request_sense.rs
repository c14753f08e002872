//! REQUEST SENSE (0x03).
//!
//! Reports the latched sense triplet and then advances the sense state:
//! a delivered NOT READY becomes UNIT ATTENTION / MEDIUM MAY HAVE CHANGED
//! (the host must learn about the potential media change next), anything
//! else clears.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::bulk_only_transport::csw::CommandStatus;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::sense::SenseData;
use crate::scsi::{CommandOutcome, VirtualCdrom};

/// SPC fixed-format sense data, error code 0x70.
pub const SENSE_REPLY_LEN: usize = 18;

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub(crate) fn request_sense(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        let allocation = cbw.block[4] as usize;

        info!(
            "request sense: {:x}/{:x}/{:x}",
            self.sense.key, self.sense.asc, self.sense.ascq
        );

        let reply = &mut self.in_buf[..SENSE_REPLY_LEN];
        reply.fill(0);
        reply[0] = 0x70; // current error, fixed format
        reply[2] = self.sense.key;
        reply[7] = (SENSE_REPLY_LEN - 8) as u8; // additional sense length
        reply[12] = self.sense.asc;
        reply[13] = self.sense.ascq;

        // Reporting succeeds regardless of the sense being reported.
        self.status = CommandStatus::Passed;

        if self.sense.is_not_ready() {
            debug!("sense advances to unit attention");
            self.sense = SenseData::MEDIUM_CHANGED;
            self.default_status = CommandStatus::Failed;
        } else {
            self.sense = SenseData::NONE;
            self.default_status = CommandStatus::Passed;
        }

        CommandOutcome::DataIn {
            len: SENSE_REPLY_LEN.min(allocation),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::bulk_only_transport::csw::CommandStatus;
    use crate::scsi::testing::*;

    #[test]
    fn not_ready_promotes_to_unit_attention() {
        let mut cd = drive_with(None);
        let _ = cd.handle_command(&cbw_in(&[0x00, 0, 0, 0, 0, 0], 0));

        let (first, _) = exec_in(&mut cd, &[0x03, 0, 0, 0, 18, 0], 18);
        assert_eq!(first.len(), 18);
        assert_eq!(first[0], 0x70);
        assert_eq!(first[2] & 0x0F, 0x02);
        assert_eq!(first[7], 10);
        assert_eq!(first[12], 0x04);

        // The promotion keeps the default status failed...
        let _ = cd.handle_command(&cbw_in(&[0x12, 0, 0, 0, 36, 0], 36));
        assert_eq!(cd.csw_status(), CommandStatus::Failed);

        // ...and the next Request Sense reports the unit attention, after
        // which the state is clean.
        let (second, _) = exec_in(&mut cd, &[0x03, 0, 0, 0, 18, 0], 18);
        assert_eq!(second[2] & 0x0F, 0x06);
        assert_eq!(second[12], 0x28);
        let (third, _) = exec_in(&mut cd, &[0x03, 0, 0, 0, 18, 0], 18);
        assert_eq!(third[2] & 0x0F, 0x00);
        assert_eq!(third[12], 0x00);
    }

    #[test]
    fn reply_truncates_to_allocation_length() {
        let mut cd = drive_with(None);
        let (sense, _) = exec_in(&mut cd, &[0x03, 0, 0, 0, 8, 0], 8);
        assert_eq!(sense.len(), 8);
    }
}
