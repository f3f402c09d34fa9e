//! embedded-sdspi - Memory-mapped shift register access
//!
//! The one platform-specific, unsafe corner of the crate: raw volatile
//! access to the control, status and data registers of the SPI peripheral,
//! and to the pin bank `begin` claims the bus lines from. Everything above
//! this file is ordinary portable code.

use core::ptr::{read_volatile, write_volatile};

use super::{SckRate, ShiftRegister};

bitflags::bitflags! {
    /// Control register fields.
    pub struct Control: u8 {
        /// Raise an interrupt when a transfer completes. Never set here;
        /// the transport is strictly polled.
        const INTERRUPT_ENABLE = 1 << 7;
        /// Enable the peripheral.
        const ENABLE = 1 << 6;
        /// Shift the least significant bit first.
        const LSB_FIRST = 1 << 5;
        /// Run as bus controller rather than peripheral.
        const CONTROLLER = 1 << 4;
        /// Idle the clock line high (mode 2/3).
        const CLOCK_IDLE_HIGH = 1 << 3;
        /// Sample on the trailing clock edge (mode 1/3).
        const SAMPLE_TRAILING = 1 << 2;
        /// Clock rate selector field.
        const RATE = 0b11;
    }
}

bitflags::bitflags! {
    /// Status register fields.
    pub struct Status: u8 {
        /// The current transfer has finished.
        const TRANSFER_COMPLETE = 1 << 7;
        /// The data register was written mid-transfer.
        const WRITE_COLLISION = 1 << 6;
        /// Double the rate the selector field names.
        const DOUBLE_SPEED = 1 << 0;
    }
}

/// The pin bank holding the three bus control lines.
///
/// `port` drives output levels and `direction` selects output mode; the
/// three masks pick the select, data-out and clock bits within the bank.
pub struct BusPins {
    /// Output level register of the bank.
    pub port: *mut u8,
    /// Direction register of the bank.
    pub direction: *mut u8,
    /// Mask of the card-select line.
    pub select: u8,
    /// Mask of the data-out line.
    pub data_out: u8,
    /// Mask of the clock line.
    pub clock: u8,
}

/// The real, memory-mapped shift register backend.
pub struct MmioShiftRegister {
    control: *mut u8,
    status: *mut u8,
    data: *mut u8,
    pins: BusPins,
}

impl MmioShiftRegister {
    /// Claim the peripheral at the given register addresses.
    ///
    /// # Safety
    ///
    /// The three addresses must belong to one live SPI shift register and
    /// `pins` to its pin bank, and no other code may touch those registers
    /// while this handle exists. The peripheral is one physical device:
    /// construct a single handle at startup and lend it out by reference.
    pub const unsafe fn new(
        control: *mut u8,
        status: *mut u8,
        data: *mut u8,
        pins: BusPins,
    ) -> MmioShiftRegister {
        MmioShiftRegister {
            control,
            status,
            data,
            pins,
        }
    }
}

impl ShiftRegister for MmioShiftRegister {
    fn setup_bus_pins(&mut self) {
        unsafe {
            // Deselect before touching direction: the select line may double
            // as another device's chip select.
            let port = read_volatile(self.pins.port);
            write_volatile(self.pins.port, port | self.pins.select);
            let direction = read_volatile(self.pins.direction);
            write_volatile(
                self.pins.direction,
                direction | self.pins.select | self.pins.data_out | self.pins.clock,
            );
        }
    }

    fn configure(&mut self, rate: SckRate) {
        // Mode 0, MSB first: polarity, phase and order bits stay clear.
        let control =
            Control::ENABLE | Control::CONTROLLER | Control::from_bits_truncate(rate.selector_bits());
        let status = if rate.double_speed() {
            Status::DOUBLE_SPEED
        } else {
            Status::empty()
        };
        unsafe {
            write_volatile(self.control, control.bits());
            write_volatile(self.status, status.bits());
        }
    }

    fn start_transfer(&mut self, byte: u8) {
        unsafe { write_volatile(self.data, byte) }
    }

    fn transfer_complete(&mut self) -> bool {
        let status = Status::from_bits_truncate(unsafe { read_volatile(self.status) });
        status.contains(Status::TRANSFER_COMPLETE)
    }

    fn data(&mut self) -> u8 {
        unsafe { read_volatile(self.data) }
    }

    fn sync_delay(&mut self) {
        core::hint::spin_loop();
    }

    fn pad_delay(&mut self) {
        // A couple of forced reads plus the surrounding loop instructions
        // outlast the sixteen clocks one byte needs at the calibrated
        // divider.
        let dummy: u8 = 0;
        for _ in 0..2 {
            unsafe { read_volatile(&dummy) };
        }
    }
}
