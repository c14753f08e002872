//! SCSI MMC command dispatcher for the virtual CD-ROM drive.
//!
//! [`VirtualCdrom`] owns the cross-command state: the sense triplet, the
//! default CSW status, the streaming `ReadContext` and the staging
//! buffers. The transport hands it each parsed CBW and drives streaming
//! reads and OUT data phases through [`VirtualCdrom::continue_read`] and
//! [`VirtualCdrom::on_data_out`]. Handlers themselves are synchronous;
//! all waiting happens at the endpoint layer.

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::cbw::CommandBlockWrapper;
use crate::bulk_only_transport::csw::CommandStatus;
use crate::catalog::Catalog;
use crate::disc::address::lba_to_msf;
use crate::disc::{DiscModel, COOKED_SECTOR_SIZE, RAW_SECTOR_SIZE};
use crate::media::MediaProvider;
use crate::scsi::opcode::OpCode;
use crate::scsi::sense::SenseData;

pub mod commands;
pub mod opcode;
pub mod sense;

/// Blocks read from the image and streamed per IN transfer.
pub const MAX_CHUNK_BLOCKS: u32 = 16;

/// Staging buffer size: one full raw chunk, which also bounds every
/// non-read reply (TOC, toolbox listing, mode pages all fit well below).
pub const IN_BUFFER_LEN: usize = (MAX_CHUNK_BLOCKS * RAW_SECTOR_SIZE) as usize;

/// Upper bound on Mode Select parameter lists accepted from the host.
pub const MAX_PARAMETER_LIST_LEN: usize = 256;

/// What the transport must do next for the current command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    /// No data phase; send the CSW.
    None,
    /// `len` bytes are staged in the IN buffer; send them, then the CSW.
    DataIn { len: usize },
    /// A streaming read is registered; pump `continue_read` until it
    /// returns `None`, then send the CSW.
    Streaming,
    /// The host owes `len` bytes of OUT data; deliver them to
    /// `on_data_out`, then send the CSW.
    DataOut { len: usize },
}

/// Identification strings reported by Inquiry and the USB serial descriptor.
#[derive(Clone, Copy)]
pub struct InquiryIdentity {
    pub vendor: [u8; 8],
    pub product: [u8; 16],
    pub revision: [u8; 4],
    /// `USBODE-XXXXXXXX`, see [`crate::usb_mass_storage::format_serial`].
    pub serial: [u8; 15],
}

impl Default for InquiryIdentity {
    fn default() -> Self {
        InquiryIdentity {
            vendor: *b"USBODE  ",
            product: *b"Virtual CDROM   ",
            revision: *b"1.00",
            serial: *b"USBODE-00000001",
        }
    }
}

/// State of an in-progress Read(10)/Read CD, owned by the dispatcher and
/// consumed chunk by chunk between IN transfers.
#[derive(Debug, Copy, Clone)]
struct ReadContext {
    lba: u32,
    remaining_blocks: u32,
    /// Sector size in the backing image.
    block_size: u32,
    /// Bytes handed to the host per sector.
    transfer_block_size: u32,
    /// Offset into a physical sector where the transferred data starts.
    skip_bytes: u32,
    /// Read CD main-channel selection bits; 0 for Read(10).
    mcs: u8,
    /// Mode byte for synthesized headers.
    header_mode: u8,
    /// Whether sectors are assembled from selected portions instead of
    /// sliced straight out of the image (cooked source, raw selection).
    synthesize: bool,
}

/// Which handler owns a pending OUT data phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PendingOut {
    ModeSelect10,
}

/// The virtual drive: dispatcher plus all cross-command state.
pub struct VirtualCdrom<MP, AP, CAT> {
    provider: MP,
    player: AP,
    catalog: CAT,
    identity: InquiryIdentity,

    disc: Option<DiscModel>,
    ready: bool,
    disc_changed: bool,

    sense: SenseData,
    /// CSW status commands inherit until Request Sense advances the sense
    /// state; FAIL after any error.
    default_status: CommandStatus,
    /// CSW status of the command currently in flight.
    status: CommandStatus,

    read_ctx: Option<ReadContext>,
    pending_out: Option<PendingOut>,

    current_lba: u32,
    /// Last volume accepted through Mode Select page 0x0E; reported back
    /// by Mode Sense.
    audio_volume: u8,

    in_buf: [u8; IN_BUFFER_LEN],
    chunk_buf: [u8; IN_BUFFER_LEN],
}

impl<MP: MediaProvider, AP: AudioPlayer, CAT: Catalog> VirtualCdrom<MP, AP, CAT> {
    pub fn new(provider: MP, player: AP, catalog: CAT, identity: InquiryIdentity) -> Self {
        VirtualCdrom {
            provider,
            player,
            catalog,
            identity,
            disc: None,
            ready: false,
            disc_changed: false,
            sense: SenseData::NONE,
            default_status: CommandStatus::Passed,
            status: CommandStatus::Passed,
            read_ctx: None,
            pending_out: None,
            current_lba: 0,
            audio_volume: 0xFF,
            in_buf: [0; IN_BUFFER_LEN],
            chunk_buf: [0; IN_BUFFER_LEN],
        }
    }

    /// Mount a new disc. The next Test Unit Ready reports the change via
    /// Unit Attention and Get Event Status reports New Media.
    pub fn insert_media(&mut self, disc: DiscModel) {
        info!("media inserted, {} tracks", disc.tracks().len());
        self.disc = Some(disc);
        self.ready = true;
        self.disc_changed = true;
        self.sense = SenseData::MEDIUM_CHANGED;
        self.default_status = CommandStatus::Failed;
        self.current_lba = 0;
    }

    /// Unmount the disc; subsequent media access fails Not Ready.
    pub fn eject_media(&mut self) {
        info!("media ejected");
        self.disc = None;
        self.ready = false;
        self.disc_changed = true;
        self.sense = SenseData::MEDIUM_NOT_PRESENT;
        self.default_status = CommandStatus::Failed;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Logical head position: last Seek target or the LBA after the most
    /// recent streamed chunk.
    pub fn current_lba(&self) -> u32 {
        self.current_lba
    }

    pub fn player_mut(&mut self) -> &mut AP {
        &mut self.player
    }

    pub fn catalog_mut(&mut self) -> &mut CAT {
        &mut self.catalog
    }

    pub fn provider_mut(&mut self) -> &mut MP {
        &mut self.provider
    }

    /// CSW status for the command just handled.
    pub fn csw_status(&self) -> CommandStatus {
        self.status
    }

    /// Staged IN payload of the command just handled.
    pub fn staged(&self, len: usize) -> &[u8] {
        &self.in_buf[..len]
    }

    /// Host-initiated Bulk-Only Reset: discard any in-flight command
    /// state. Sense survives; only Request Sense clears it.
    pub fn reset(&mut self) {
        debug!("bulk-only reset, discarding command state");
        self.read_ctx = None;
        self.pending_out = None;
        self.status = self.default_status;
    }

    /// Route one CBW to its handler.
    pub fn handle_command(&mut self, cbw: &CommandBlockWrapper) -> CommandOutcome {
        self.status = self.default_status;
        self.read_ctx = None;
        self.pending_out = None;

        let Ok(op) = OpCode::try_from(cbw.block[0]) else {
            info!("unknown opcode {:x}", cbw.block[0]);
            return self.fail(SenseData::INVALID_OPCODE);
        };
        debug!("scsi opcode {:x}, transfer len {}", cbw.block[0], cbw.data_transfer_len);

        match op {
            OpCode::TestUnitReady => self.test_unit_ready(),
            OpCode::RequestSense => self.request_sense(cbw),
            OpCode::Inquiry => self.inquiry(cbw),
            OpCode::ModeSense6 => self.mode_sense6(cbw),
            OpCode::ModeSense10 => self.mode_sense10(cbw),
            OpCode::ModeSelect10 => self.mode_select10(cbw),
            OpCode::StartStopUnit => self.start_stop_unit(cbw),
            OpCode::PreventAllowMediumRemoval => self.prevent_allow_medium_removal(cbw),
            OpCode::ReadCapacity10 => self.read_capacity10(),
            OpCode::Read10 => self.read10(cbw),
            OpCode::Seek10 => self.seek10(cbw),
            OpCode::Verify10 => self.verify10(),
            OpCode::ReadSubChannel => self.read_sub_channel(cbw),
            OpCode::ReadTocPmaAtip => self.read_toc(cbw),
            OpCode::PlayAudio10 => self.play_audio10(cbw),
            OpCode::GetConfiguration => self.get_configuration(cbw),
            OpCode::PlayAudioMsf => self.play_audio_msf(cbw),
            OpCode::GetEventStatusNotification => self.get_event_status(cbw),
            OpCode::PauseResume => self.pause_resume(cbw),
            OpCode::StopPlayScan => self.stop_play_scan(),
            OpCode::ReadDiscInformation => self.read_disc_information(cbw),
            OpCode::ReadTrackInformation => self.read_track_information(cbw),
            OpCode::Win2kSpecific => self.win2k_specific(cbw),
            OpCode::PlayAudio12 => self.play_audio12(cbw),
            OpCode::GetPerformance => self.get_performance(cbw),
            OpCode::ReadDiscStructure => self.read_disc_structure(cbw),
            OpCode::SetCdSpeed => self.set_cd_speed(),
            OpCode::ReadCd => self.read_cd(cbw),
            OpCode::ToolboxListFiles | OpCode::ToolboxListCds => self.toolbox_list_items(cbw),
            OpCode::ToolboxGetFileCount | OpCode::ToolboxGetCdCount => {
                self.toolbox_get_count(cbw)
            }
            OpCode::ToolboxSetNextCd => self.toolbox_set_next(cbw),
            OpCode::ToolboxListDevices => self.toolbox_list_devices(cbw),
        }
    }

    /// Produce the next streamed chunk of a Read(10)/Read CD into the IN
    /// buffer. `None` once the command has finished or failed; the CSW
    /// status reflects which.
    pub fn continue_read(&mut self) -> Option<usize> {
        let mut ctx = self.read_ctx?;
        if ctx.remaining_blocks == 0 {
            self.read_ctx = None;
            return None;
        }
        if !self.ready {
            error!("media became unavailable mid-read");
            self.fail(SenseData::NOT_READY);
            self.read_ctx = None;
            return None;
        }

        let blocks = ctx.remaining_blocks.min(MAX_CHUNK_BLOCKS);
        let physical_len = (blocks * ctx.block_size) as usize;
        let offset = ctx.lba as u64 * ctx.block_size as u64;

        trace!("read chunk: lba {}, {} blocks", ctx.lba, blocks);

        if self.provider.seek(offset).is_err() {
            error!("seek failed at lba {}", ctx.lba);
            self.fail(SenseData::UNRECOVERED_READ_ERROR);
            self.read_ctx = None;
            return None;
        }
        match self.provider.read(&mut self.chunk_buf[..physical_len]) {
            Ok(n) if n == physical_len => {}
            _ => {
                error!("short read at lba {}", ctx.lba);
                self.fail(SenseData::UNRECOVERED_READ_ERROR);
                self.read_ctx = None;
                return None;
            }
        }

        let mut staged = 0;
        for i in 0..blocks as usize {
            let src = &self.chunk_buf[i * ctx.block_size as usize..][..ctx.block_size as usize];
            let dst = &mut self.in_buf[staged..];
            staged += if ctx.synthesize {
                synthesize_sector(
                    dst,
                    src,
                    ctx.lba + i as u32,
                    ctx.mcs,
                    ctx.skip_bytes as usize,
                    ctx.header_mode,
                )
            } else {
                let from = ctx.skip_bytes as usize;
                let len = ctx.transfer_block_size as usize;
                dst[..len].copy_from_slice(&src[from..from + len]);
                len
            };
        }

        ctx.lba += blocks;
        ctx.remaining_blocks -= blocks;
        self.current_lba = ctx.lba;
        self.read_ctx = Some(ctx);
        Some(staged)
    }

    /// Drop the streaming context without touching the command status;
    /// used when the host's transfer budget runs out mid-read.
    pub fn abort_read(&mut self) {
        self.read_ctx = None;
    }

    /// Deliver OUT-phase data to the handler that requested it.
    pub fn on_data_out(&mut self, data: &[u8]) {
        match self.pending_out.take() {
            Some(PendingOut::ModeSelect10) => self.mode_select10_data(data),
            None => {
                warn!("OUT data with no pending handler, {} bytes dropped", data.len());
            }
        }
    }

    /// Latch an error: sense triplet plus FAIL for this and subsequent
    /// commands until Request Sense advances the state.
    fn fail(&mut self, sense: SenseData) -> CommandOutcome {
        warn!(
            "check condition {:x}/{:x}/{:x}",
            sense.key, sense.asc, sense.ascq
        );
        self.sense = sense;
        self.default_status = CommandStatus::Failed;
        self.status = CommandStatus::Failed;
        CommandOutcome::None
    }

    /// Copy of the mounted disc model, or a Not Ready failure.
    fn disc_or_fail(&mut self) -> Result<DiscModel, CommandOutcome> {
        match self.disc {
            Some(disc) => Ok(disc),
            None => Err(self.fail(SenseData::MEDIUM_NOT_PRESENT)),
        }
    }

    fn start_streaming(&mut self, ctx: ReadContext) -> CommandOutcome {
        self.current_lba = ctx.lba;
        self.read_ctx = Some(ctx);
        CommandOutcome::Streaming
    }
}

/// Assemble the host-selected portions of a raw sector, in canonical
/// order, from a cooked (2048-byte) source sector. SYNC and HEADER are
/// synthesized, EDC/ECC is zero filled.
fn synthesize_sector(
    dst: &mut [u8],
    physical: &[u8],
    lba: u32,
    mcs: u8,
    skip_bytes: usize,
    header_mode: u8,
) -> usize {
    let mut off = 0;

    if mcs & 0x10 != 0 {
        // SYNC: 00 FF*10 00
        dst[0] = 0x00;
        dst[1..11].fill(0xFF);
        dst[11] = 0x00;
        off = 12;
    }
    if mcs & 0x08 != 0 {
        let (m, s, f) = lba_to_msf(lba);
        dst[off] = m;
        dst[off + 1] = s;
        dst[off + 2] = f;
        dst[off + 3] = header_mode;
        off += 4;
    }
    if mcs & 0x04 != 0 {
        let user_len = (COOKED_SECTOR_SIZE as usize).min(physical.len() - skip_bytes);
        dst[off..off + user_len].copy_from_slice(&physical[skip_bytes..skip_bytes + user_len]);
        off += user_len;
    }
    if mcs & 0x02 != 0 {
        dst[off..off + 288].fill(0);
        off += 288;
    }

    off
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for the command handler tests: an in-memory image,
    //! a recording audio player and a small fixed catalog.

    use super::*;
    use crate::audio::PlayState;
    use crate::disc::{Track, TrackMode};
    use crate::media::MediaError;

    pub struct MemoryImage {
        pub data: std::vec::Vec<u8>,
        pub pos: u64,
        pub fail_reads: bool,
    }

    impl MemoryImage {
        /// Image of `sectors` 2048-byte sectors, each filled with a pattern
        /// derived from its index.
        pub fn patterned(sectors: usize) -> Self {
            let mut data = std::vec::Vec::with_capacity(sectors * 2048);
            for sector in 0..sectors {
                for i in 0..2048usize {
                    data.push((sector as u8).wrapping_mul(31).wrapping_add(i as u8));
                }
            }
            MemoryImage {
                data,
                pos: 0,
                fail_reads: false,
            }
        }
    }

    impl MediaProvider for MemoryImage {
        fn seek(&mut self, offset: u64) -> Result<u64, MediaError> {
            if offset > self.data.len() as u64 {
                return Err(MediaError::OutOfRange);
            }
            self.pos = offset;
            Ok(offset)
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, MediaError> {
            if self.fail_reads {
                return Err(MediaError::Io);
            }
            let start = self.pos as usize;
            let len = buf.len().min(self.data.len().saturating_sub(start));
            buf[..len].copy_from_slice(&self.data[start..start + len]);
            self.pos += len as u64;
            Ok(len)
        }
    }

    #[derive(Default)]
    pub struct RecordingPlayer {
        pub state: Option<PlayState>,
        pub played: Option<(u32, u32)>,
        pub paused: u32,
        pub resumed: u32,
        pub sought: Option<u32>,
        pub volume: Option<u8>,
        pub lba: u32,
    }

    impl AudioPlayer for RecordingPlayer {
        fn play(&mut self, start_lba: u32, blocks: u32) {
            self.played = Some((start_lba, blocks));
            self.state = Some(PlayState::Playing);
        }
        fn pause(&mut self) {
            self.paused += 1;
            self.state = Some(PlayState::Paused);
        }
        fn resume(&mut self) {
            self.resumed += 1;
            self.state = Some(PlayState::Playing);
        }
        fn seek(&mut self, lba: u32) {
            self.sought = Some(lba);
        }
        fn set_volume(&mut self, volume: u8) {
            self.volume = Some(volume);
        }
        fn state(&self) -> PlayState {
            self.state.unwrap_or(PlayState::NoStatus)
        }
        fn current_lba(&self) -> u32 {
            self.lba
        }
    }

    #[derive(Default)]
    pub struct FixedCatalog {
        pub names: std::vec::Vec<&'static str>,
        pub sizes: std::vec::Vec<u64>,
        pub next: Option<usize>,
    }

    impl Catalog for FixedCatalog {
        fn count(&self) -> usize {
            self.names.len()
        }
        fn name(&self, index: usize) -> &str {
            self.names[index]
        }
        fn size(&self, index: usize) -> u64 {
            self.sizes[index]
        }
        fn set_next(&mut self, index: usize) {
            self.next = Some(index);
        }
    }

    pub type TestCdrom = VirtualCdrom<MemoryImage, RecordingPlayer, FixedCatalog>;

    /// A 300_000-block Mode 1 data disc over a small patterned image.
    pub fn data_disc() -> DiscModel {
        DiscModel::new(
            &[Track {
                number: 1,
                start_lba: 0,
                mode: TrackMode::Mode1,
                file_offset: 0,
            }],
            300_000,
        )
        .unwrap()
    }

    /// Audio track 1 at LBA 0, data track 2 at 20_000, lead-out 300_000
    /// (the reference disc of the TOC scenarios).
    pub fn mixed_disc() -> DiscModel {
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
                    file_offset: 0,
                },
            ],
            300_000,
        )
        .unwrap()
    }

    pub fn drive_with(disc: Option<DiscModel>) -> std::boxed::Box<TestCdrom> {
        let mut cd = std::boxed::Box::new(VirtualCdrom::new(
            MemoryImage::patterned(64),
            RecordingPlayer::default(),
            FixedCatalog {
                names: std::vec!["FF7_DISC1.cue", "QUAKE.cue"],
                sizes: std::vec![681_574_400, 0x1_2345_6789],
                next: None,
            },
            InquiryIdentity::default(),
        ));
        if let Some(disc) = disc {
            cd.insert_media(disc);
            // Swallow the insertion Unit Attention so scenarios start from
            // a clean slate, the way a host settles a drive after attach.
            let _ = cd.handle_command(&cbw_in(&[0x03, 0, 0, 0, 18, 0], 18));
        }
        cd
    }

    /// CBW for an IN (or no-data) command.
    pub fn cbw_in(cb: &[u8], transfer_len: u32) -> CommandBlockWrapper {
        let raw = crate::bulk_only_transport::cbw::tests::raw_cbw(0x1234, transfer_len, true, cb);
        CommandBlockWrapper::from_le_bytes(&raw).unwrap()
    }

    /// CBW for an OUT command.
    pub fn cbw_out(cb: &[u8], transfer_len: u32) -> CommandBlockWrapper {
        let raw = crate::bulk_only_transport::cbw::tests::raw_cbw(0x1234, transfer_len, false, cb);
        CommandBlockWrapper::from_le_bytes(&raw).unwrap()
    }

    /// Run an IN command and return (staged payload, CSW status).
    pub fn exec_in(
        cd: &mut TestCdrom,
        cb: &[u8],
        transfer_len: u32,
    ) -> (std::vec::Vec<u8>, CommandStatus) {
        let outcome = cd.handle_command(&cbw_in(cb, transfer_len));
        let data = match outcome {
            CommandOutcome::DataIn { len } => cd.staged(len).to_vec(),
            CommandOutcome::Streaming => {
                let mut all = std::vec::Vec::new();
                while let Some(len) = cd.continue_read() {
                    all.extend_from_slice(cd.staged(len));
                }
                all
            }
            _ => std::vec::Vec::new(),
        };
        (data, cd.csw_status())
    }
}
