//! USB mass-storage function: interface descriptors, the class-specific
//! control requests (Get Max LUN, Bulk-Only Mass Storage Reset) and the
//! endpoint pair handed to the transport.

use core::mem::MaybeUninit;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embassy_usb::control::{InResponse, OutResponse, Recipient, Request, RequestType};
use embassy_usb::driver::{Driver, EndpointError};
use embassy_usb::Builder;

use crate::audio::AudioPlayer;
use crate::bulk_only_transport::BulkOnlyTransport;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::VirtualCdrom;

use self::endpoints::Endpoints;

pub mod endpoints;

const CLASS_MASS_STORAGE: u8 = 0x08;
/// MMC command set.
const SUBCLASS_MMC: u8 = 0x02;
const PROTOCOL_BULK_ONLY_TRANSPORT: u8 = 0x50;

const CLASS_SPECIFIC_BULK_ONLY_MASS_STORAGE_RESET: u8 = 0xFF;
const CLASS_SPECIFIC_GET_MAX_LUN: u8 = 0xFE;

/// Errors surfaced by the endpoint layer to the transport.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    Endpoint(EndpointError),
    /// The host performed a Bulk-Only Mass Storage Reset.
    Reset,
}

/// The USB CD-ROM function: call [`UsbCdrom::new`] while building the
/// device, then drive [`UsbCdrom::run`] from the USB task.
pub struct UsbCdrom<'d, D: Driver<'d>, M: RawMutex> {
    transport: BulkOnlyTransport<Endpoints<'d, D, M>>,
}

impl<'d, D: Driver<'d>, M: RawMutex> UsbCdrom<'d, D, M> {
    pub fn new(state: &'d mut State<'d, M>, builder: &mut Builder<'d, D>, packet_size: u16) -> Self {
        let mut func = builder.function(
            CLASS_MASS_STORAGE,
            SUBCLASS_MMC,
            PROTOCOL_BULK_ONLY_TRANSPORT,
        );
        let mut interface = func.interface();
        let mut alt = interface.alt_setting(
            CLASS_MASS_STORAGE,
            SUBCLASS_MMC,
            PROTOCOL_BULK_ONLY_TRANSPORT,
            None,
        );
        let endpoints = Endpoints::new(
            alt.endpoint_bulk_in(packet_size),
            alt.endpoint_bulk_out(packet_size),
            &state.reset_signal,
        );
        drop(func);

        let control = state.control.write(Control {
            reset_signal: &state.reset_signal,
        });
        builder.handler(control);

        Self {
            transport: BulkOnlyTransport::new(endpoints),
        }
    }

    pub async fn run<MP, AP, CAT>(&mut self, device: &mut VirtualCdrom<MP, AP, CAT>) -> !
    where
        MP: MediaProvider,
        AP: AudioPlayer,
        CAT: Catalog,
    {
        self.transport.run(device).await
    }
}

pub struct State<'d, M: RawMutex> {
    reset_signal: Signal<M, ()>,
    control: MaybeUninit<Control<'d, M>>,
}

impl<'d, M: RawMutex> Default for State<'d, M> {
    fn default() -> Self {
        Self {
            reset_signal: Signal::new(),
            control: MaybeUninit::uninit(),
        }
    }
}

pub struct Control<'d, M: RawMutex> {
    reset_signal: &'d Signal<M, ()>,
}

impl<'d, M: RawMutex> embassy_usb::Handler for Control<'d, M> {
    fn control_out(&mut self, req: Request, _data: &[u8]) -> Option<OutResponse> {
        if !(req.request_type == RequestType::Class && req.recipient == Recipient::Interface) {
            return None;
        }
        match req.request {
            // Spec. section 3.1
            CLASS_SPECIFIC_BULK_ONLY_MASS_STORAGE_RESET => {
                info!("bulk-only mass storage reset request");
                self.reset_signal.signal(());
                Some(OutResponse::Accepted)
            }
            _ => None,
        }
    }

    fn control_in<'a>(&'a mut self, req: Request, buf: &'a mut [u8]) -> Option<InResponse<'a>> {
        if !(req.request_type == RequestType::Class && req.recipient == Recipient::Interface) {
            return None;
        }
        match req.request {
            // Spec. section 3.2: a single LUN.
            CLASS_SPECIFIC_GET_MAX_LUN => {
                buf[0] = 0;
                Some(InResponse::Accepted(&buf[..1]))
            }
            _ => None,
        }
    }
}

/// Render the unit serial number, `USBODE-` followed by the hardware id
/// in uppercase hex. The result doubles as USB string descriptor 3 and
/// the VPD 0x80 payload.
pub fn format_serial(hardware_id: u32, buf: &mut [u8; 15]) -> &str {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    buf[..7].copy_from_slice(b"USBODE-");
    for i in 0..8 {
        let nibble = (hardware_id >> (28 - 4 * i)) & 0xF;
        buf[7 + i] = HEX[nibble as usize];
    }
    // Always ASCII by construction.
    core::str::from_utf8(buf).unwrap()
}
