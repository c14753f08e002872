//! Disc data model: the track layout distilled from a CUE sheet.
//!
//! The CUE parser lives outside this crate; whatever parses the sheet
//! builds a [`DiscModel`] and hands it to the SCSI core on every media
//! change.

pub mod address;

/// TOC track number limit on a CD.
pub const MAX_TRACKS: usize = 99;

/// Sector payload size presented to the host for data reads.
pub const COOKED_SECTOR_SIZE: u32 = 2048;

/// Full raw sector size including sync, header and EDC/ECC.
pub const RAW_SECTOR_SIZE: u32 = 2352;

/// Track recording mode, named after the CUE sheet track types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrackMode {
    /// CD-DA audio, 2352 bytes per sector.
    Audio,
    /// Mode 1 data stored cooked, 2048 bytes per sector.
    Mode1,
    /// Mode 1 data stored raw, 2352 bytes per sector.
    Mode1Raw,
    /// Mode 2 data stored raw, 2352 bytes per sector.
    Mode2Raw,
}

impl TrackMode {
    /// Physical sector size of this track in the backing image.
    pub fn block_size(self) -> u32 {
        match self {
            TrackMode::Mode1 => COOKED_SECTOR_SIZE,
            TrackMode::Audio | TrackMode::Mode1Raw | TrackMode::Mode2Raw => RAW_SECTOR_SIZE,
        }
    }

    /// Bytes to skip from the start of a physical sector to reach the
    /// 2048-byte user data area.
    pub fn skip_bytes(self) -> u32 {
        match self {
            TrackMode::Audio | TrackMode::Mode1 => 0,
            TrackMode::Mode1Raw => 16,
            TrackMode::Mode2Raw => 24,
        }
    }

    pub fn is_audio(self) -> bool {
        matches!(self, TrackMode::Audio)
    }

    /// ADR/Control byte reported in TOC and sub-channel replies.
    pub fn adr_control(self) -> u8 {
        if self.is_audio() {
            0x10
        } else {
            0x14
        }
    }

    /// Mode byte placed in a synthesized sector header.
    pub fn header_mode_byte(self) -> u8 {
        match self {
            TrackMode::Mode2Raw => 0x02,
            _ => 0x01,
        }
    }
}

/// One track of the mounted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Track {
    /// TOC track number, 1-based.
    pub number: u8,
    /// First LBA of the track's data area.
    pub start_lba: u32,
    pub mode: TrackMode,
    /// Byte offset of the track's first sector in the image file.
    pub file_offset: u64,
}

impl Track {
    /// Byte offset in the image of `lba`, which must lie in this track.
    pub fn byte_offset(&self, lba: u32) -> u64 {
        self.file_offset + (lba - self.start_lba) as u64 * self.mode.block_size() as u64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscModelError {
    TooManyTracks,
    UnorderedTracks,
    LeadoutBeforeLastTrack,
}

/// Track table plus lead-out of the mounted disc.
#[derive(Clone, Copy, Debug)]
pub struct DiscModel {
    tracks: [Track; MAX_TRACKS],
    len: usize,
    leadout_lba: u32,
}

impl DiscModel {
    pub fn new(tracks: &[Track], leadout_lba: u32) -> Result<Self, DiscModelError> {
        if tracks.len() > MAX_TRACKS {
            return Err(DiscModelError::TooManyTracks);
        }
        for pair in tracks.windows(2) {
            if pair[1].start_lba < pair[0].start_lba {
                return Err(DiscModelError::UnorderedTracks);
            }
        }
        if let Some(last) = tracks.last() {
            if leadout_lba < last.start_lba {
                return Err(DiscModelError::LeadoutBeforeLastTrack);
            }
        }

        const EMPTY: Track = Track {
            number: 0,
            start_lba: 0,
            mode: TrackMode::Mode1,
            file_offset: 0,
        };
        let mut table = [EMPTY; MAX_TRACKS];
        table[..tracks.len()].copy_from_slice(tracks);
        Ok(DiscModel {
            tracks: table,
            len: tracks.len(),
            leadout_lba,
        })
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks[..self.len]
    }

    pub fn leadout_lba(&self) -> u32 {
        self.leadout_lba
    }

    /// Track containing `lba`: the last track whose start does not exceed it.
    pub fn track_for_lba(&self, lba: u32) -> Option<&Track> {
        self.tracks()
            .iter()
            .take_while(|t| t.start_lba <= lba)
            .last()
    }

    pub fn track_by_number(&self, number: u8) -> Option<&Track> {
        self.tracks().iter().find(|t| t.number == number)
    }

    pub fn first_track(&self) -> Option<&Track> {
        self.tracks().first()
    }

    pub fn last_track_number(&self) -> u8 {
        self.tracks().iter().map(|t| t.number).max().unwrap_or(1)
    }

    /// Medium type byte for the mode parameter header: 0x01 data,
    /// 0x02 audio, 0x03 mixed.
    pub fn medium_type(&self) -> u8 {
        let has_audio = self.tracks().iter().any(|t| t.mode.is_audio());
        let has_data = self.tracks().iter().any(|t| !t.mode.is_audio());
        match (has_audio, has_data) {
            (true, true) => 0x03,
            (true, false) => 0x02,
            _ => 0x01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_disc() -> DiscModel {
        DiscModel::new(
            &[
                Track {
                    number: 1,
                    start_lba: 0,
                    mode: TrackMode::Audio,
                    file_offset: 0,
                },
                Track {
                    number: 2,
                    start_lba: 20_000,
                    mode: TrackMode::Mode1,
                    file_offset: 20_000 * 2352,
                },
            ],
            300_000,
        )
        .unwrap()
    }

    #[test]
    fn track_lookup_by_lba() {
        let disc = mixed_disc();
        assert_eq!(disc.track_for_lba(0).unwrap().number, 1);
        assert_eq!(disc.track_for_lba(19_999).unwrap().number, 1);
        assert_eq!(disc.track_for_lba(20_000).unwrap().number, 2);
        assert_eq!(disc.track_for_lba(299_999).unwrap().number, 2);
    }

    #[test]
    fn medium_type_reflects_track_mix() {
        let disc = mixed_disc();
        assert_eq!(disc.medium_type(), 0x03);

        let audio_only = DiscModel::new(
            &[Track {
                number: 1,
                start_lba: 0,
                mode: TrackMode::Audio,
                file_offset: 0,
            }],
            1_000,
        )
        .unwrap();
        assert_eq!(audio_only.medium_type(), 0x02);
        assert!(DiscModel::new(&[], 150).unwrap().medium_type() == 0x01);
    }

    #[test]
    fn rejects_unordered_tracks() {
        let t1 = Track {
            number: 1,
            start_lba: 500,
            mode: TrackMode::Mode1,
            file_offset: 0,
        };
        let t2 = Track {
            number: 2,
            start_lba: 100,
            mode: TrackMode::Mode1,
            file_offset: 0,
        };
        assert_eq!(
            DiscModel::new(&[t1, t2], 1_000).unwrap_err(),
            DiscModelError::UnorderedTracks
        );
    }

    #[test]
    fn byte_offset_uses_physical_block_size() {
        let disc = mixed_disc();
        let track = disc.track_for_lba(20_010).unwrap();
        assert_eq!(
            track.byte_offset(20_010),
            20_000 * 2352 + 10 * 2048,
        );
    }
}
