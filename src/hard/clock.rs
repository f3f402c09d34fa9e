//! embedded-sdspi - SCK rate selection
//!
//! Maps a requested clock divider onto the staircase of dividers the shift
//! register hardware actually supports.

/// A hardware-supported SCK rate, held as the selector code the control and
/// status registers are programmed from.
///
/// The hardware offers the dividers {2, 4, 8, 16, 32, 64, 128} and nothing
/// in between. [`SckRate::nearest`] walks that staircase and picks the
/// smallest divider that is at least the requested one, so the bus never
/// runs faster than asked for; requests beyond the top clamp to 128.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SckRate {
    code: u8,
}

impl SckRate {
    /// Pick the smallest supported divider that is `>= divisor`.
    pub fn nearest(divisor: u8) -> SckRate {
        let mut step: u8 = 2;
        let mut code: u8 = 0;
        // Selector codes run 0..=5 then jump to 7: code 6 would name the
        // divider already reachable through the double-speed bit.
        while divisor > step && code < 7 {
            step <<= 1;
            code += if code < 5 { 1 } else { 2 };
        }
        SckRate { code }
    }

    /// The low bits of the selector, as programmed into the rate field of
    /// the control register.
    pub fn selector_bits(self) -> u8 {
        self.code >> 1
    }

    /// Whether the double-speed bit in the status register is set: the
    /// complement of the selector's lowest bit.
    pub fn double_speed(self) -> bool {
        self.code & 1 == 0
    }

    /// The divider the bus will actually run at.
    pub fn divider(self) -> u8 {
        let position = if self.code < 6 { self.code } else { 6 };
        2u8 << position
    }
}
