// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WLAN power sequencing for the Golfu handset.
//!
//! Two radios share this board file, and each gets its own sequencer:
//!
//! - [`qrf6285::Qrf6285Seq`] brings up the QRF6285 by walking its regulators,
//!   a pair of GPIO lines, and a PMIC clock vote in a fixed order, and unwinds
//!   whatever it managed to turn on if any step fails.
//! - [`ath6kl::Ath6klPower`] brings up the AR600x by pushing a table of pad
//!   configurations and toggling its shutdown line, with fixed settle delays.
//!
//! [`init::golfu_wifi_init`] is run once at board bring-up, and
//! [`firmware::FirmwareBuffers`] holds the buffers the ath6kl firmware loader
//! borrows.
//!
//! None of this is reentrant. The sequencers take `&mut self`, and the caller
//! (driver probe or suspend path) is expected to serialize calls.

#![cfg_attr(not(test), no_std)]

pub mod ath6kl;
pub mod firmware;
pub mod init;
pub mod pins;
pub mod qrf6285;

#[cfg(test)]
mod fakes;

pub use ath6kl::Ath6klPower;
pub use firmware::{FirmwareBuffers, FwType};
pub use init::golfu_wifi_init;
pub use qrf6285::Qrf6285Seq;
