// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! API crate for the Golfu WLAN power sequencers.
//!
//! This holds the board description (variants, rails, clock identifiers), the
//! error types shared by both sequencers, and the traits through which the
//! sequencers reach the platform's regulator, PMAPP, GPIO and delay services.
//! Nothing in here touches hardware.

#![cfg_attr(not(test), no_std)]

mod tlmm;

pub use embedded_hal::blocking::delay::DelayMs;
pub use num_traits::FromPrimitive;
pub use tlmm::{Direction, Drive, PinConfig, Pull};

use num_derive::FromPrimitive;
use static_assertions::const_assert;

/// Name under which all of our PMAPP votes are cast.
pub const VOTER_ID: &str = "WLAN";

/// 3.3V enable for the WLAN module. Only wired on the QRD7627a.
pub const GPIO_WLAN_3V3_EN: u16 = 119;

/// Reset/sleep control line as wired through the GPIO expander. Only held
/// until the first power-on selects the real line.
pub const GPIO_WLAN_SYS_REST_EN_LEGACY: u16 = 134;

/// Reset/sleep control line straight off the MSM. Every supported board
/// (QRD7627a, EVB1.0, QRD8625 and Golfu) wires it this way.
pub const GPIO_WLAN_SYS_REST_EN: u16 = 127;

/// Board variants that carry the QRF6285.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum Board {
    Golfu = 0,
    Qrd7627a,
    Evb1,
    Qrd8625,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "board-qrd7627a")] {
        const CONFIGURED_BOARD: Board = Board::Qrd7627a;
    } else if #[cfg(feature = "board-evb1")] {
        const CONFIGURED_BOARD: Board = Board::Evb1;
    } else if #[cfg(feature = "board-qrd8625")] {
        const CONFIGURED_BOARD: Board = Board::Qrd8625;
    } else {
        const CONFIGURED_BOARD: Board = Board::Golfu;
    }
}

impl Board {
    /// The variant selected at build time through the `board-*` features.
    pub const CONFIGURED: Board = CONFIGURED_BOARD;

    /// Index of the first rail in [`RAILS`] that this board actually has.
    /// The QRD7627a lacks the `msme1` and `bt` rails.
    pub const fn first_rail(self) -> usize {
        match self {
            Board::Qrd7627a => 2,
            _ => 0,
        }
    }

    /// Whether the module's 3.3V supply is switched by [`GPIO_WLAN_3V3_EN`].
    pub const fn has_3v3_enable(self) -> bool {
        matches!(self, Board::Qrd7627a)
    }

    /// Whether a failed bring-up hands rail handles back to the regulator
    /// framework in addition to disabling them.
    pub const fn releases_rails_on_unwind(self) -> bool {
        !matches!(self, Board::Qrd7627a)
    }
}

/// The voltage rails feeding the QRF6285, in bring-up order.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum Rail {
    Msme1 = 0,
    Bt = 1,
    Wlan4 = 2,
}

impl Rail {
    pub const ALL: [Rail; NUM_RAILS] = [Rail::Msme1, Rail::Bt, Rail::Wlan4];

    pub fn desc(self) -> &'static RailDesc {
        &RAILS[self as usize]
    }
}

/// Static description of one rail.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RailDesc {
    pub supply: &'static str,
    pub min_uv: u32,
    pub max_uv: u32,
    /// PMAPP regulator id used for low-power pin-control votes.
    pub pmapp_id: u32,
    pub pin_controlled: bool,
}

pub const NUM_RAILS: usize = 3;

pub static RAILS: [RailDesc; NUM_RAILS] = [
    RailDesc {
        supply: "msme1",
        min_uv: 1_800_000,
        max_uv: 1_800_000,
        pmapp_id: 2,
        pin_controlled: false,
    },
    RailDesc {
        supply: "bt",
        min_uv: 3_300_000,
        max_uv: 3_300_000,
        pmapp_id: 21,
        pin_controlled: true,
    },
    RailDesc {
        supply: "wlan4",
        min_uv: 1_800_000,
        max_uv: 1_800_000,
        pmapp_id: 23,
        pin_controlled: true,
    },
];

const_assert!(Board::Qrd7627a.first_rail() < NUM_RAILS);

/// PMIC clock buffers that can be voted through PMAPP.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum ClockId {
    D0 = 0,
    D1 = 1,
    A0 = 2,
    A1 = 3,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
pub enum ClockVote {
    Off = 0,
    On = 1,
    /// Let the consumer's `CLK_PWR_REQ` pin govern the buffer.
    PinCtrl = 2,
}

/// Failure reported by a platform service: a negative errno.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PlatformError(pub i32);

impl PlatformError {
    pub const EIO: PlatformError = PlatformError(-5);
    pub const ENOMEM: PlatformError = PlatformError(-12);
    pub const EBUSY: PlatformError = PlatformError(-16);
    pub const EINVAL: PlatformError = PlatformError(-22);
}

/// The individual hardware operations the sequencers perform, used to tag
/// failures.
#[derive(Copy, Clone, Debug, Eq, PartialEq, FromPrimitive)]
#[repr(u8)]
pub enum Step {
    AcquireRegulators = 1,
    SetVoltage,
    EnableRegulator,
    PinControlVote,
    Config3v3Enable,
    ConfigReset,
    ClockOn,
    ClockPinControl,
    ClockOff,
    ResetRelease,
    PinControlWithdraw,
    DisableRegulator,
    ConfigPinTable,
    RequestIrq,
    DriveIrq,
}

/// A sequencing failure: which step failed, on which rail if any, and the
/// platform's error code.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SeqError {
    pub step: Step,
    pub rail: Option<Rail>,
    pub code: i32,
}

impl SeqError {
    pub const fn new(step: Step, err: PlatformError) -> Self {
        Self {
            step,
            rail: None,
            code: err.0,
        }
    }

    pub const fn on_rail(step: Step, rail: Rail, err: PlatformError) -> Self {
        Self {
            step,
            rail: Some(rail),
            code: err.0,
        }
    }
}

impl From<SeqError> for i32 {
    fn from(e: SeqError) -> Self {
        e.code
    }
}

/// Regulator framework consumer interface.
pub trait Regulators {
    type Handle: Copy;

    /// Resolves every rail in `rails` in one request. Either all succeed or
    /// none are held.
    fn bulk_get<const N: usize>(
        &mut self,
        rails: &[RailDesc; N],
    ) -> Result<[Self::Handle; N], PlatformError>;

    fn set_voltage(
        &mut self,
        reg: Self::Handle,
        min_uv: u32,
        max_uv: u32,
    ) -> Result<(), PlatformError>;

    fn enable(&mut self, reg: Self::Handle) -> Result<(), PlatformError>;

    fn disable(&mut self, reg: Self::Handle) -> Result<(), PlatformError>;

    /// Returns a handle to the framework. The handle must not be used again.
    fn put(&mut self, reg: Self::Handle);
}

/// Votes cast through the modem's power management RPC service.
pub trait Pmapp {
    fn clock_vote(
        &mut self,
        voter: &'static str,
        clock: ClockId,
        vote: ClockVote,
    ) -> Result<(), PlatformError>;

    /// Ties regulator `vreg_id`'s low-power mode to `clock`'s pin control.
    fn vreg_pincntrl_vote(
        &mut self,
        voter: &'static str,
        vreg_id: u32,
        clock: ClockId,
        on: bool,
    ) -> Result<(), PlatformError>;
}

/// GPIO and pin-mux services.
pub trait Gpio {
    /// Writes (and enables) one TLMM pin configuration.
    fn tlmm_config(&mut self, config: PinConfig) -> Result<(), PlatformError>;

    fn set_value(&mut self, gpio: u16, high: bool);

    fn request(
        &mut self,
        gpio: u16,
        label: &'static str,
    ) -> Result<(), PlatformError>;

    fn free(&mut self, gpio: u16);

    fn direction_output(
        &mut self,
        gpio: u16,
        high: bool,
    ) -> Result<(), PlatformError>;

    fn direction_input(&mut self, gpio: u16) -> Result<(), PlatformError>;
}
