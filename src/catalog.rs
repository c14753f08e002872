//! Browsable image catalog behind the vendor toolbox opcodes (0xD0-0xDA).

/// The toolbox wire protocol caps enumeration at 100 entries.
pub const MAX_CATALOG_ENTRIES: usize = 100;

/// Catalog of disc images available for mounting.
///
/// `set_next` only records the request; the owner of the catalog performs
/// the actual media change and reports it back through
/// [`VirtualCdrom::insert_media`](crate::scsi::VirtualCdrom::insert_media).
pub trait Catalog {
    fn count(&self) -> usize;

    /// Image name for a valid index, truncated by the caller to the 32
    /// bytes the toolbox entry can carry.
    fn name(&self, index: usize) -> &str;

    /// Image size in bytes.
    fn size(&self, index: usize) -> u64;

    fn set_next(&mut self, index: usize);
}
