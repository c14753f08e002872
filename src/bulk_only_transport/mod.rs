//! Bulk-Only Mass Storage transport (USB MSC BOT).
//!
//! One command cycle is: receive a CBW, run the data phase the handler
//! asked for, send the CSW, in that order and nothing in parallel. The
//! BOT state machine maps onto the await points of
//! [`BulkOnlyTransport::serve_command`]: CBW reception, IN staging,
//! streamed chunks, OUT collection and CSW emission. A malformed CBW stalls both
//! endpoints until the host issues a Bulk-Only Mass Storage Reset; a
//! reset during any phase abandons the command and returns to CBW
//! reception.

use embedded_io_async::{Read, Write};

use crate::audio::AudioPlayer;
use crate::catalog::Catalog;
use crate::media::MediaProvider;
use crate::scsi::{CommandOutcome, VirtualCdrom, MAX_PARAMETER_LIST_LEN};
use crate::usb_mass_storage::TransportError;

use self::cbw::{CommandBlockWrapper, DataDirection, CBW_LEN};
use self::csw::build_csw;

pub mod cbw;
pub mod csw;

/// Bus operations beyond the byte streams: needed for error recovery and
/// IN-transfer termination.
#[allow(async_fn_in_trait)]
pub trait BusControl {
    fn packet_size(&self) -> usize;

    /// Halt both bulk endpoints after a framing error (BOT spec 6.6.1).
    fn stall_endpoints(&mut self);

    /// Resolve when the host performs a Bulk-Only Mass Storage Reset.
    async fn wait_for_reset(&mut self);

    /// Send a zero-length IN packet to close a data phase that ended on a
    /// packet boundary short of the host's expectation.
    async fn send_zlp(&mut self) -> Result<(), TransportError>;
}

pub struct BulkOnlyTransport<E> {
    endpoints: E,
}

impl<E> BulkOnlyTransport<E>
where
    E: Read<Error = TransportError> + Write<Error = TransportError> + BusControl,
{
    pub fn new(endpoints: E) -> Self {
        Self { endpoints }
    }

    /// Serve commands forever.
    pub async fn run<MP, AP, CAT>(&mut self, device: &mut VirtualCdrom<MP, AP, CAT>) -> !
    where
        MP: MediaProvider,
        AP: AudioPlayer,
        CAT: Catalog,
    {
        loop {
            match self.serve_command(device).await {
                Ok(()) => {}
                Err(TransportError::Reset) => {
                    info!("bulk-only reset, back to CBW reception");
                    device.reset();
                }
                Err(TransportError::Endpoint(_)) => {
                    warn!("endpoint error, retrying after re-enable");
                    device.reset();
                }
            }
        }
    }

    /// One full CBW -> data phase -> CSW cycle.
    pub async fn serve_command<MP, AP, CAT>(
        &mut self,
        device: &mut VirtualCdrom<MP, AP, CAT>,
    ) -> Result<(), TransportError>
    where
        MP: MediaProvider,
        AP: AudioPlayer,
        CAT: Catalog,
    {
        let mut raw = [0u8; CBW_LEN];
        let received = self.endpoints.read(&mut raw).await?;

        let cbw = if received == CBW_LEN {
            CommandBlockWrapper::from_le_bytes(&raw).ok()
        } else {
            error!("CBW with invalid length {}", received);
            None
        };
        let Some(cbw) = cbw else {
            // BOT spec 6.6.1: not a meaningful CBW, no CSW either. Stall
            // until the host resets the interface.
            error!("invalid CBW, stalling endpoints");
            self.endpoints.stall_endpoints();
            self.endpoints.wait_for_reset().await;
            device.reset();
            return Ok(());
        };

        trace!(
            "cbw: tag {:x}, opcode {:x}, transfer {}",
            cbw.tag,
            cbw.block[0],
            cbw.data_transfer_len
        );

        let mut transferred: u32 = 0;
        match device.handle_command(&cbw) {
            CommandOutcome::None => {}
            CommandOutcome::DataIn { len } => {
                let len = len.min(cbw.data_transfer_len as usize);
                self.endpoints.write_all(device.staged(len)).await?;
                transferred = len as u32;
            }
            CommandOutcome::Streaming => {
                while let Some(chunk) = device.continue_read() {
                    let budget = (cbw.data_transfer_len - transferred) as usize;
                    let send = chunk.min(budget);
                    if send > 0 {
                        self.endpoints.write_all(device.staged(send)).await?;
                        transferred += send as u32;
                    }
                    if send < chunk || transferred == cbw.data_transfer_len {
                        // The host's budget is exhausted; drop whatever
                        // the command had left.
                        device.abort_read();
                        break;
                    }
                }
            }
            CommandOutcome::DataOut { len } => {
                let mut buf = [0u8; MAX_PARAMETER_LIST_LEN];
                let want = len.min(cbw.data_transfer_len as usize);
                let mut got = 0;
                while got < want {
                    let n = self.endpoints.read(&mut buf[got..want]).await?;
                    if n == 0 {
                        break;
                    }
                    got += n;
                }
                transferred = got as u32;
                device.on_data_out(&buf[..got]);
            }
        }

        // A data phase that stopped short of dCBWDataTransferLength on a
        // packet boundary needs a ZLP so the host's IN request completes
        // before the CSW.
        if cbw.direction == DataDirection::In
            && transferred < cbw.data_transfer_len
            && transferred as usize % self.endpoints.packet_size() == 0
        {
            self.endpoints.send_zlp().await?;
        }

        let residue = cbw.data_transfer_len.saturating_sub(transferred);
        let csw = build_csw(&cbw, residue, device.csw_status());
        trace!("csw: status {}, residue {}", csw[12], residue);
        self.endpoints.write_all(&csw).await?;
        Ok(())
    }
}
