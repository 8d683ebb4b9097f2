// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MSM Top Level Mode Multiplexer pin configuration.

use num_derive::FromPrimitive;
use static_assertions::const_assert;

#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum Direction {
    Input = 0,
    Output = 1,
}

/// Settings for the pad's weak pull resistors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum Pull {
    None = 0,
    Down = 1,
    /// Bus keeper: holds the last driven level.
    Keeper = 2,
    Up = 3,
}

/// Pad drive strength.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum Drive {
    Ma2 = 0,
    Ma4,
    Ma6,
    Ma8,
    Ma10,
    Ma12,
    Ma14,
    Ma16,
}

/// One TLMM configuration record. `func` selects the mux function; 0 is
/// plain GPIO.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PinConfig {
    pub gpio: u16,
    pub func: u8,
    pub dir: Direction,
    pub pull: Pull,
    pub drive: Drive,
}

const GPIO_MASK: u32 = 0x3ff;
const FUNC_MASK: u32 = 0xf;

const_assert!((Drive::Ma16 as u32) <= 0xf);
const_assert!((Pull::Up as u32) <= 0x3);

impl PinConfig {
    pub const fn new(
        gpio: u16,
        func: u8,
        dir: Direction,
        pull: Pull,
        drive: Drive,
    ) -> Self {
        Self {
            gpio,
            func,
            dir,
            pull,
            drive,
        }
    }

    /// Plain GPIO output, no pull, weakest drive. Used for enable and reset
    /// lines.
    pub const fn gpio_output(gpio: u16) -> Self {
        Self::new(gpio, 0, Direction::Output, Pull::None, Drive::Ma2)
    }

    /// The 32-bit word the TLMM RPC expects; also what gets logged.
    pub const fn packed(self) -> u32 {
        ((self.gpio as u32 & GPIO_MASK) << 4)
            | (self.func as u32 & FUNC_MASK)
            | ((self.dir as u32) << 14)
            | ((self.pull as u32) << 15)
            | ((self.drive as u32) << 17)
    }
}
