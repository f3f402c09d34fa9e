//! # embedded-sdspi
//!
//! > The SPI byte-transfer layer for SD/SDHC cards, written in Embedded Rust
//!
//! This crate moves bytes to and from an SD card over a synchronous serial
//! bus without the caller having to know what actually drives the wires. It
//! is `#![no_std]`, does not allocate, and sits *below* any card command
//! protocol: everything above it only ever needs the [`SdSpiBus`] trait.
//!
//! Three transports satisfy the trait:
//!
//! * [`HardSpi`] — direct control of one hardware SPI shift register,
//!   through the narrow [`ShiftRegister`] register-access boundary. This is
//!   the fast path: polled byte transfers, a pipelined buffer send, and a
//!   cycle-padded buffer receive.
//! * [`SharedSpi`] — delegation to a general-purpose SPI peripheral behind
//!   the `embedded-hal` blocking traits, for cards that share a HAL-owned
//!   bus.
//! * [`SoftSpi`] — bit-banged bus emulation over three ordinary digital
//!   I/O pins, for boards where no peripheral is free.
//!
//! ## Using the crate
//!
//! ```rust,ignore
//! use embedded_sdspi::{HardSpi, SdSpiBus};
//!
//! // One shift register exists per bus; claim it once at startup.
//! let mut spi = HardSpi::new(unsafe { board_shift_register() });
//! spi.begin();
//! spi.init(2);
//!
//! spi.send_buffer(&command);
//! let mut response = [0u8; 5];
//! spi.receive_buffer(&mut response).unwrap();
//! ```
//!
//! ## Features
//!
//! * `defmt-log`: By turning off the default features and enabling the
//! `defmt-log` feature you can configure this crate to log messages over
//! defmt instead.
//!
//! Make sure that either the `log` feature or the `defmt-log` feature is
//! enabled.
//!
//! Exactly one of `hard-spi` (default), `shared-spi` and `soft-spi` must be
//! enabled; it picks which transport [`DefaultSpi`] names. Enabling none, or
//! more than one, fails the build.

#![cfg_attr(not(test), no_std)]

// ****************************************************************************
//
// Imports
//
// ****************************************************************************

#[cfg(test)]
mod test;

pub mod bus;
pub mod hard;
pub mod shared;
pub mod soft;

pub use crate::bus::{Error, SdSpiBus, IDLE_BYTE};
pub use crate::hard::{
    BusPins, HardSpi, LoopbackShiftRegister, MmioShiftRegister, SckRate, ShiftRegister,
};
pub use crate::shared::SharedSpi;
pub use crate::soft::SoftSpi;

// ****************************************************************************
//
// Default transport selection
//
// ****************************************************************************

/// The transport the build configuration elected as program-wide default.
#[cfg(feature = "hard-spi")]
pub type DefaultSpi = crate::hard::HardSpi<crate::hard::MmioShiftRegister>;

/// The transport the build configuration elected as program-wide default.
#[cfg(feature = "shared-spi")]
pub type DefaultSpi<SPI> = crate::shared::SharedSpi<SPI>;

/// The transport the build configuration elected as program-wide default.
#[cfg(feature = "soft-spi")]
pub type DefaultSpi<MISO, MOSI, SCK> = crate::soft::SoftSpi<MISO, MOSI, SCK>;

#[cfg(not(any(feature = "hard-spi", feature = "shared-spi", feature = "soft-spi")))]
compile_error!(
    "no default transport selected: enable one of the `hard-spi`, `shared-spi` or `soft-spi` features"
);

#[cfg(all(feature = "hard-spi", feature = "shared-spi"))]
compile_error!("the `hard-spi` and `shared-spi` features are mutually exclusive");

#[cfg(all(feature = "hard-spi", feature = "soft-spi"))]
compile_error!("the `hard-spi` and `soft-spi` features are mutually exclusive");

#[cfg(all(feature = "shared-spi", feature = "soft-spi"))]
compile_error!("the `shared-spi` and `soft-spi` features are mutually exclusive");

// ****************************************************************************
//
// End Of File
//
// ****************************************************************************
