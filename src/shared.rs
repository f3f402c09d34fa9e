//! embedded-sdspi - Shared peripheral transport
//!
//! Delegates every operation to a general-purpose SPI peripheral behind the
//! `embedded-hal` blocking traits. Use this when the card hangs off a bus a
//! HAL already owns and may time-share with other devices — which is also
//! why this transport asks the layer above for transaction bracketing.

use embedded_hal::blocking::spi::Transfer;

#[cfg(feature = "log")]
use log::debug;

#[cfg(feature = "defmt-log")]
use defmt::debug;

use crate::bus::{Error, SdSpiBus, IDLE_BYTE};

/// A card transport over a HAL-owned SPI peripheral.
pub struct SharedSpi<SPI> {
    spi: SPI,
}

impl<SPI> SharedSpi<SPI>
where
    SPI: Transfer<u8>,
{
    /// Wrap a configured SPI peripheral.
    pub fn new(spi: SPI) -> Self {
        SharedSpi { spi }
    }

    /// Release the underlying peripheral.
    pub fn free(self) -> SPI {
        self.spi
    }

    /// Send one byte and receive one byte.
    fn transfer(&mut self, out: u8) -> Result<u8, Error> {
        self.spi
            .transfer(&mut [out])
            .map(|b| b[0])
            .map_err(|_e| Error::Transport)
    }
}

impl<SPI> SdSpiBus for SharedSpi<SPI>
where
    SPI: Transfer<u8>,
{
    type Error = Error;

    fn begin(&mut self) {
        // Pin routing belongs to whoever constructed the peripheral.
    }

    fn init(&mut self, divisor: u8) {
        // The owning HAL fixes the clock rate; mode 0 and MSB-first are its
        // responsibility too. Record what was asked for.
        debug!("shared peripheral keeps its own clock, divider {} requested", divisor);
    }

    fn receive(&mut self) -> u8 {
        self.transfer(IDLE_BYTE).unwrap_or(IDLE_BYTE)
    }

    fn receive_buffer(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        for slot in buffer.iter_mut() {
            *slot = self.transfer(IDLE_BYTE)?;
        }
        Ok(())
    }

    fn send(&mut self, byte: u8) {
        self.transfer(byte).ok();
    }

    fn send_buffer(&mut self, buffer: &[u8]) {
        for &byte in buffer {
            self.transfer(byte).ok();
        }
    }

    fn uses_bus_locking(&self) -> bool {
        true
    }
}
