//! embedded-sdspi - Dedicated hardware transport
//!
//! Drives one hardware SPI shift register directly, one byte at a time:
//! write a byte to start a transfer, busy-poll the completion flag, read the
//! byte that arrived in exchange. On top of that sit two buffer loops that
//! earn this transport its keep:
//!
//! * `send_buffer` pipelines the outgoing bytes, fetching the next byte
//!   while the current one is still shifting.
//! * `receive_buffer` replaces the per-byte flag poll with a fixed run of
//!   inert cycles that outlasts one byte time, retriggering the next
//!   transfer before the previous result is even stored. The gap between
//!   back-to-back bytes on the wire shrinks to nearly nothing — but the
//!   trick only holds at the clock rate the pad was sized for, so `init`
//!   re-enables flag polling at every other rate.
//!
//! All register and pin traffic goes through the [`ShiftRegister`] trait,
//! which keeps the loops portable and testable; [`MmioShiftRegister`] is the
//! real memory-mapped backend.


mod clock;
mod loopback;
mod mmio;

pub use clock::SckRate;
pub use loopback::LoopbackShiftRegister;
pub use mmio::{BusPins, Control, MmioShiftRegister, Status};

use core::convert::Infallible;

#[cfg(feature = "log")]
use log::debug;

#[cfg(feature = "defmt-log")]
use defmt::debug;

use crate::bus::{SdSpiBus, IDLE_BYTE};

/// The divider the receive pad is sized for.
///
/// One byte takes sixteen system clocks at divider 2; the pad plus the loop
/// instructions around it run longer than that, so the completion flag is
/// known to be set without reading it. At any slower rate the byte time
/// outgrows the pad and the flag must be polled again.
const PAD_CALIBRATED_DIVIDER: u8 = 2;

/// Narrow access layer over one hardware SPI shift register.
///
/// Everything the polling engine needs from the silicon, and nothing more:
/// this is the single platform-specific boundary of the crate. Implemented
/// by [`MmioShiftRegister`] for real hardware and by
/// [`LoopbackShiftRegister`] for bring-up without a card.
pub trait ShiftRegister {
    /// Deselect the card and switch the select, data-out and clock lines to
    /// outputs. The data-in line stays an input.
    fn setup_bus_pins(&mut self);

    /// Program the clock configuration for the given rate selection.
    /// Mode 0, most significant bit first.
    fn configure(&mut self, rate: SckRate);

    /// Write a byte into the shift register, starting a transfer.
    fn start_transfer(&mut self, byte: u8);

    /// Whether the current transfer has finished.
    fn transfer_complete(&mut self) -> bool;

    /// The byte shifted in by the last completed transfer.
    fn data(&mut self) -> u8;

    /// One inert cycle between a trigger and the first flag poll; the flag
    /// reads stale in the cycle right after the trigger.
    fn sync_delay(&mut self);

    /// Inert cycles adding up to no less than one byte time at the
    /// calibrated clock rate.
    fn pad_delay(&mut self);
}

/// The dedicated hardware transport.
///
/// Stateless apart from the registers it controls: the shift register is one
/// physical device per bus, so construct a single `HardSpi` at startup and
/// lend it out by reference. There is no teardown — the transport lives for
/// the life of the program.
pub struct HardSpi<HW> {
    hw: HW,
    padded: bool,
}

impl<HW> HardSpi<HW>
where
    HW: ShiftRegister,
{
    /// Wrap a shift register. Call [`begin`](SdSpiBus::begin) and
    /// [`init`](SdSpiBus::init) before transferring.
    pub fn new(hw: HW) -> Self {
        HardSpi { hw, padded: false }
    }

    /// Release the underlying shift register.
    pub fn free(self) -> HW {
        self.hw
    }

    fn wait_transfer_complete(&mut self) {
        while !self.hw.transfer_complete() {}
    }
}

impl<HW> SdSpiBus for HardSpi<HW>
where
    HW: ShiftRegister,
{
    type Error = Infallible;

    fn begin(&mut self) {
        debug!("claiming bus pins, card deselected");
        self.hw.setup_bus_pins();
    }

    fn init(&mut self, divisor: u8) {
        let rate = SckRate::nearest(divisor);
        self.padded = rate.divider() == PAD_CALIBRATED_DIVIDER;
        debug!(
            "sck divider: requested {}, selected {}",
            divisor,
            rate.divider()
        );
        self.hw.configure(rate);
    }

    fn receive(&mut self) -> u8 {
        self.hw.start_transfer(IDLE_BYTE);
        self.hw.sync_delay();
        self.wait_transfer_complete();
        self.hw.data()
    }

    fn receive_buffer(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        if buffer.is_empty() {
            return Ok(());
        }
        if !self.padded {
            // The pad is not valid at this clock rate; poll every byte.
            for slot in buffer.iter_mut() {
                *slot = self.receive();
            }
            return Ok(());
        }
        let last = buffer.len() - 1;
        self.hw.start_transfer(IDLE_BYTE);
        self.wait_transfer_complete();
        for slot in buffer[..last].iter_mut() {
            let byte = self.hw.data();
            // Retrigger before the store so the inter-byte gap on the wire
            // stays as close to zero as the hardware allows.
            self.hw.start_transfer(IDLE_BYTE);
            *slot = byte;
            // The pad outlasts one byte time, so the completion flag is
            // already set; skip the poll.
            self.hw.pad_delay();
        }
        // The final byte was not cycle-padded; poll it home.
        self.wait_transfer_complete();
        buffer[last] = self.hw.data();
        Ok(())
    }

    fn send(&mut self, byte: u8) {
        self.hw.start_transfer(byte);
        self.hw.sync_delay();
        self.wait_transfer_complete();
    }

    fn send_buffer(&mut self, buffer: &[u8]) {
        if buffer.is_empty() {
            return;
        }
        self.hw.start_transfer(buffer[0]);
        if buffer.len() > 1 {
            let mut next = buffer[1];
            let mut i = 2;
            loop {
                self.wait_transfer_complete();
                self.hw.start_transfer(next);
                if i == buffer.len() {
                    break;
                }
                next = buffer[i];
                i += 1;
            }
        }
        // Let the last byte shift all the way out before handing the bus
        // back to the caller.
        self.wait_transfer_complete();
    }

    fn uses_bus_locking(&self) -> bool {
        true
    }
}

// ****************************************************************************
//
// End Of File
//
// ****************************************************************************
