//! embedded-sdspi - Transport contract
//!
//! The byte-transfer capability every card transport provides. Card command
//! code, block drivers and anything else that merely needs to shift bytes
//! talks to this trait and never to hardware.

#[cfg(feature = "refcell-bus")]
mod refcell;

/// The byte a transport shifts out while it is only listening.
pub const IDLE_BYTE: u8 = 0xFF;

/// The errors a delegating transport can hit while moving a buffer.
///
/// The dedicated hardware transport never produces one — its error type is
/// [`core::convert::Infallible`]. These variants exist for transports whose
/// underlying peripheral or pins can fault.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// The delegated SPI peripheral reported a transfer fault.
    Transport,
    /// A bus pin could not be driven or sampled.
    Gpio,
}

/// A byte-transfer channel to the card.
///
/// Call order: [`begin`](SdSpiBus::begin) once to claim the pins, then
/// [`init`](SdSpiBus::init) to set the clock (again whenever the speed
/// should change), then any sequence of transfers. Every operation blocks
/// until the bytes have actually moved; there is no cancellation. A card
/// that stops responding hangs the caller — the bus is a private
/// point-to-point link with a single known responder, so absence of a reply
/// is a wiring or configuration fault, not a runtime condition.
pub trait SdSpiBus {
    /// The errors buffer reception can report. Must be debug formattable.
    type Error: core::fmt::Debug;

    /// One-time bus pin setup. Must run before `init` or any transfer.
    fn begin(&mut self);

    /// Configure the bus clock for card access.
    ///
    /// `divisor` is the wanted clock divider relative to the system clock;
    /// the transport picks the nearest rate it can actually run at, never
    /// faster than requested.
    fn init(&mut self, divisor: u8);

    /// Exchange one byte: shift out the idle pattern, return the byte
    /// shifted in.
    fn receive(&mut self) -> u8;

    /// Fill `buffer` with received bytes. An empty buffer is a no-op.
    fn receive_buffer(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Shift one byte out, discarding whatever arrives in exchange.
    fn send(&mut self, byte: u8);

    /// Shift a whole buffer out, in order.
    ///
    /// Returns only once the final byte has fully left the wire, so the
    /// caller may reuse the buffer or deselect the card straight away.
    fn send_buffer(&mut self, buffer: &[u8]);

    /// Whether multi-step card transactions on this transport need
    /// exclusive-access bracketing by the layer above.
    ///
    /// The transport itself never locks anything; this is advisory
    /// metadata, invariant for the life of the transport.
    fn uses_bus_locking(&self) -> bool;
}

impl<T> SdSpiBus for &mut T
where
    T: SdSpiBus,
{
    type Error = T::Error;

    fn begin(&mut self) {
        (*self).begin()
    }

    fn init(&mut self, divisor: u8) {
        (*self).init(divisor)
    }

    fn receive(&mut self) -> u8 {
        (*self).receive()
    }

    fn receive_buffer(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        (*self).receive_buffer(buffer)
    }

    fn send(&mut self, byte: u8) {
        (*self).send(byte)
    }

    fn send_buffer(&mut self, buffer: &[u8]) {
        (*self).send_buffer(buffer)
    }

    fn uses_bus_locking(&self) -> bool {
        (**self).uses_bus_locking()
    }
}
