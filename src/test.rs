use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::{Error, SdSpiBus, SharedSpi, SoftSpi};

/// A shared peripheral whose responder answers with scripted bytes.
struct EchoSpi {
    queued: VecDeque<u8>,
    sent: Vec<u8>,
}

impl EchoSpi {
    fn new(queued: &[u8]) -> Self {
        EchoSpi {
            queued: queued.iter().copied().collect(),
            sent: Vec::new(),
        }
    }
}

impl Transfer<u8> for EchoSpi {
    type Error = ();

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        for word in words.iter_mut() {
            self.sent.push(*word);
            *word = self.queued.pop_front().unwrap_or(0xFF);
        }
        Ok(words)
    }
}

/// A peripheral that faults on every transfer.
struct BrokenSpi;

impl Transfer<u8> for BrokenSpi {
    type Error = ();

    fn transfer<'w>(&mut self, _words: &'w mut [u8]) -> Result<&'w [u8], Self::Error> {
        Err(())
    }
}

#[test]
fn shared_spi_delegates_to_the_peripheral() {
    let mut spi = SharedSpi::new(EchoSpi::new(&[0x01, 0x02, 0x03]));
    spi.begin();
    spi.init(2);

    let mut buf = [0u8; 3];
    spi.receive_buffer(&mut buf).unwrap();
    assert_eq!(buf, [0x01, 0x02, 0x03]);

    spi.send_buffer(&[0xDE, 0xAD]);
    spi.send(0x42);
    assert_eq!(spi.receive(), 0xFF);

    let peripheral = spi.free();
    assert_eq!(peripheral.sent, [0xFF, 0xFF, 0xFF, 0xDE, 0xAD, 0x42, 0xFF]);
}

#[test]
fn shared_spi_surfaces_transport_faults_on_buffer_receive() {
    let mut spi = SharedSpi::new(BrokenSpi);
    let mut buf = [0u8; 4];
    assert_eq!(spi.receive_buffer(&mut buf), Err(Error::Transport));
    // The single-byte operations have no error channel; they fall back to
    // the idle pattern and carry on.
    assert_eq!(spi.receive(), 0xFF);
    spi.send(0x55);
}

#[test]
fn shared_spi_wants_bus_locking() {
    let spi = SharedSpi::new(EchoSpi::new(&[]));
    assert!(spi.uses_bus_locking());
}

/// Data-out pin that records every level it is driven to.
struct MosiPin {
    history: Rc<RefCell<Vec<bool>>>,
}

impl OutputPin for MosiPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.history.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.history.borrow_mut().push(true);
        Ok(())
    }
}

/// Clock pin that counts rising edges.
struct SckPin {
    level: Rc<Cell<bool>>,
    rising_edges: Rc<Cell<u32>>,
}

impl OutputPin for SckPin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.level.get() {
            self.rising_edges.set(self.rising_edges.get() + 1);
        }
        self.level.set(true);
        Ok(())
    }
}

/// Data-in pin fed from a scripted bit stream, one bit per sample.
struct MisoScript {
    bits: RefCell<VecDeque<bool>>,
}

impl MisoScript {
    fn new(bytes: &[u8]) -> Self {
        let mut bits = VecDeque::new();
        for byte in bytes {
            for bit in (0..8).rev() {
                bits.push_back(byte & (1 << bit) != 0);
            }
        }
        MisoScript {
            bits: RefCell::new(bits),
        }
    }
}

impl InputPin for MisoScript {
    type Error = Infallible;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(self.bits.borrow_mut().pop_front().unwrap_or(false))
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        self.is_high().map(|level| !level)
    }
}

struct SoftHarness {
    mosi_history: Rc<RefCell<Vec<bool>>>,
    sck_level: Rc<Cell<bool>>,
    rising_edges: Rc<Cell<u32>>,
}

fn soft_spi(stimulus: &[u8]) -> (SoftSpi<MisoScript, MosiPin, SckPin>, SoftHarness) {
    let harness = SoftHarness {
        mosi_history: Rc::new(RefCell::new(Vec::new())),
        sck_level: Rc::new(Cell::new(false)),
        rising_edges: Rc::new(Cell::new(0)),
    };
    let spi = SoftSpi::new(
        MisoScript::new(stimulus),
        MosiPin {
            history: harness.mosi_history.clone(),
        },
        SckPin {
            level: harness.sck_level.clone(),
            rising_edges: harness.rising_edges.clone(),
        },
    );
    (spi, harness)
}

#[test]
fn soft_spi_shifts_msb_first() {
    let (mut spi, harness) = soft_spi(&[]);
    spi.begin();
    spi.send(0xC3);

    // begin() parks the data line high; the eight samples after that are
    // the bits of 0xC3, most significant first.
    let history = harness.mosi_history.borrow();
    assert_eq!(
        &history[1..],
        [true, true, false, false, false, false, true, true]
    );
    assert_eq!(harness.rising_edges.get(), 8);
    assert!(!harness.sck_level.get(), "clock must idle low after a byte");
}

#[test]
fn soft_spi_reassembles_scripted_bits() {
    let (mut spi, harness) = soft_spi(&[0xA5, 0x3C]);
    spi.begin();
    spi.init(2);

    let mut buf = [0u8; 2];
    spi.receive_buffer(&mut buf).unwrap();
    assert_eq!(buf, [0xA5, 0x3C]);

    // Receiving clocks out the idle pattern: the data line never drops.
    let history = harness.mosi_history.borrow();
    assert!(history[1..].iter().all(|&level| level));
    assert_eq!(harness.rising_edges.get(), 16);
}

#[test]
fn soft_spi_single_receive_matches_buffer_receive() {
    let (mut spi, _harness) = soft_spi(&[0x81]);
    spi.begin();
    assert_eq!(spi.receive(), 0x81);
    // Past the script the line floats low.
    assert_eq!(spi.receive(), 0x00);
}

#[test]
fn soft_spi_owns_its_pins_and_skips_bus_locking() {
    let (spi, _harness) = soft_spi(&[]);
    assert!(!spi.uses_bus_locking());
}

#[cfg(feature = "refcell-bus")]
#[test]
fn refcell_wrapped_transport_passes_calls_through() {
    let (spi, harness) = soft_spi(&[]);
    let mut cell = RefCell::new(spi);
    cell.begin();
    cell.send(0xF0);
    assert!(!cell.uses_bus_locking());
    assert_eq!(harness.rising_edges.get(), 8);
}
