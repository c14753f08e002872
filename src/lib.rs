//! USB CD-ROM gadget core.
//!
//! Presents a CUE-described disc image to a USB host as a CD-ROM drive:
//! the Bulk-Only Mass Storage transport, the SCSI MMC command set, audio
//! playback delegation and the vendor toolbox for switching images.
//!
//! The board glue stays outside this crate. Firmware builds an
//! `embassy_usb::Builder` for its controller, registers the function with
//! [`usb_mass_storage::UsbCdrom::new`], constructs a
//! [`scsi::VirtualCdrom`] over its [`media::MediaProvider`],
//! [`audio::AudioPlayer`] and [`catalog::Catalog`] implementations, and
//! runs both futures on one executor:
//!
//! ```ignore
//! let mut usb_cdrom = UsbCdrom::new(&mut state, &mut builder, 64);
//! let mut drive = VirtualCdrom::new(image, player, catalog, identity);
//! drive.insert_media(disc_model);
//! join(usb.run(), usb_cdrom.run(&mut drive)).await;
//! ```

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod audio;
pub mod bulk_only_transport;
pub mod catalog;
pub mod disc;
pub mod media;
pub mod scsi;
pub mod usb_mass_storage;
