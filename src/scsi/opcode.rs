use num_enum::TryFromPrimitive;

/// SCSI operation codes served by the virtual drive.
///
/// SPC/MMC commands plus the vendor toolbox range (0xD0-0xDA) used to
/// browse and switch the image catalog. Refer to SPC-4 and MMC-6.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OpCode {
    /* SPC */
    TestUnitReady = 0x00,
    RequestSense = 0x03,
    Inquiry = 0x12,
    ModeSense6 = 0x1A,
    StartStopUnit = 0x1B,
    PreventAllowMediumRemoval = 0x1E,
    ModeSelect10 = 0x55,
    ModeSense10 = 0x5A,

    /* SBC */
    ReadCapacity10 = 0x25,
    Read10 = 0x28,
    Seek10 = 0x2B,
    Verify10 = 0x2F,

    /* MMC */
    ReadSubChannel = 0x42,
    ReadTocPmaAtip = 0x43,
    PlayAudio10 = 0x45,
    GetConfiguration = 0x46,
    PlayAudioMsf = 0x47,
    GetEventStatusNotification = 0x4A,
    PauseResume = 0x4B,
    StopPlayScan = 0x4E,
    ReadDiscInformation = 0x51,
    ReadTrackInformation = 0x52,
    Win2kSpecific = 0xA4,
    PlayAudio12 = 0xA5,
    GetPerformance = 0xAC,
    ReadDiscStructure = 0xAD,
    SetCdSpeed = 0xBB,
    ReadCd = 0xBE,

    /* Vendor toolbox */
    ToolboxListFiles = 0xD0,
    ToolboxGetFileCount = 0xD2,
    ToolboxListCds = 0xD7,
    ToolboxSetNextCd = 0xD8,
    ToolboxListDevices = 0xD9,
    ToolboxGetCdCount = 0xDA,
}
