//! embedded-sdspi - Software bus emulation
//!
//! Reproduces the bus protocol by toggling three ordinary digital I/O pins:
//! mode 0, most significant bit first, data driven while the clock is low
//! and sampled on the rising edge. Slow, but it works on any pins — and
//! because those pins belong to this transport alone, the layer above can
//! skip bus locking entirely.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::bus::{Error, SdSpiBus, IDLE_BYTE};

/// A bit-banged card transport over three digital I/O pins.
pub struct SoftSpi<MISO, MOSI, SCK> {
    miso: MISO,
    mosi: MOSI,
    sck: SCK,
}

impl<MISO, MOSI, SCK> SoftSpi<MISO, MOSI, SCK>
where
    MISO: InputPin,
    MOSI: OutputPin,
    SCK: OutputPin,
{
    /// Take ownership of the three bus pins.
    pub fn new(miso: MISO, mosi: MOSI, sck: SCK) -> Self {
        SoftSpi { miso, mosi, sck }
    }

    /// Release the pins.
    pub fn free(self) -> (MISO, MOSI, SCK) {
        (self.miso, self.mosi, self.sck)
    }

    /// Exchange one byte, most significant bit first.
    fn transfer(&mut self, out: u8) -> Result<u8, Error> {
        let mut read = 0u8;
        for bit in (0..8).rev() {
            if out & (1 << bit) != 0 {
                self.mosi.set_high().map_err(|_| Error::Gpio)?;
            } else {
                self.mosi.set_low().map_err(|_| Error::Gpio)?;
            }
            self.sck.set_high().map_err(|_| Error::Gpio)?;
            if self.miso.is_high().map_err(|_| Error::Gpio)? {
                read |= 1 << bit;
            }
            self.sck.set_low().map_err(|_| Error::Gpio)?;
        }
        Ok(read)
    }
}

impl<MISO, MOSI, SCK> SdSpiBus for SoftSpi<MISO, MOSI, SCK>
where
    MISO: InputPin,
    MOSI: OutputPin,
    SCK: OutputPin,
{
    type Error = Error;

    fn begin(&mut self) {
        // Mode 0 idles the clock low; the data line rests at the idle level.
        self.sck.set_low().ok();
        self.mosi.set_high().ok();
    }

    fn init(&mut self, _divisor: u8) {
        // Bit timing is set by CPU speed alone; there is no divider here.
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
        false
    }
}
