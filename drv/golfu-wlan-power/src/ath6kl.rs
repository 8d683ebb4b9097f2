// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power sequencing for the Atheros AR600x.
//!
//! The AR600x gets its supplies from rails that are always on; "power" here
//! means muxing SDC2 onto the module's pads and releasing its shutdown line,
//! or the reverse. Nothing is latched between calls, so the caller must not
//! double-invoke.

use drv_golfu_wlan_api::{DelayMs, Gpio, PinConfig, SeqError, Step};
use ringbuf::{ringbuf, ringbuf_entry};

use crate::pins::{GOLFU_GPIO_WIFI_SHUTDOWN_N, WIFI_OFF_TABLE, WIFI_ON_TABLE};

/// Pads need this long in their new state before the module is released.
const PAD_SETTLE_MS: u32 = 200;
/// Shutdown asserted to pads parked.
const SHUTDOWN_SETTLE_MS: u32 = 1;
/// After the pads are parked.
const PARK_SETTLE_MS: u32 = 10;
/// Applied on both paths before returning to the caller.
const FINAL_SETTLE_MS: u32 = 250;

#[derive(Copy, Clone, PartialEq)]
enum Trace {
    None,
    Power(bool),
    PinConfigFailed { config: u32, err: SeqError },
    Done,
}

ringbuf!(Trace, 16, Trace::None);

pub struct Ath6klPower<P> {
    platform: P,
}

impl<P: Gpio + DelayMs<u32>> Ath6klPower<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Switches the radio on or off. Always returns 0; a pad that can't be
    /// configured is recorded and the rest of the sequence carries on.
    pub fn power(&mut self, on: bool) -> i32 {
        ringbuf_entry!(Trace::Power(on));

        if on {
            let _ = self.config_table(&WIFI_ON_TABLE);
            self.platform.delay_ms(PAD_SETTLE_MS);
            self.platform.set_value(GOLFU_GPIO_WIFI_SHUTDOWN_N, true);
        } else {
            self.platform.set_value(GOLFU_GPIO_WIFI_SHUTDOWN_N, false);
            self.platform.delay_ms(SHUTDOWN_SETTLE_MS);
            let _ = self.config_table(&WIFI_OFF_TABLE);
            self.platform.delay_ms(PARK_SETTLE_MS);
        }
        self.platform.delay_ms(FINAL_SETTLE_MS);

        ringbuf_entry!(Trace::Done);
        0
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Applies `table` in order, stopping at the first entry that fails.
    fn config_table(&mut self, table: &[PinConfig]) -> Result<(), SeqError> {
        for &config in table {
            if let Err(e) = self.platform.tlmm_config(config) {
                let err = SeqError::new(Step::ConfigPinTable, e);
                ringbuf_entry!(Trace::PinConfigFailed {
                    config: config.packed(),
                    err,
                });
                return Err(err);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakePlatform, Op};
    use drv_golfu_wlan_api::PlatformError;

    #[test]
    fn power_on_applies_table_then_releases_shutdown() {
        let mut uut = Ath6klPower::new(FakePlatform::new());

        assert_eq!(uut.power(true), 0);

        let mut expected: Vec<Op> =
            WIFI_ON_TABLE.iter().map(|&c| Op::Tlmm(c)).collect();
        expected.extend([
            Op::Delay(PAD_SETTLE_MS),
            Op::SetValue(GOLFU_GPIO_WIFI_SHUTDOWN_N, true),
            Op::Delay(FINAL_SETTLE_MS),
        ]);
        assert_eq!(uut.platform().ops, expected);
    }

    #[test]
    fn power_on_latency() {
        let mut uut = Ath6klPower::new(FakePlatform::new());
        uut.power(true);

        let ops = &uut.platform().ops;
        let released = Op::SetValue(GOLFU_GPIO_WIFI_SHUTDOWN_N, true);
        let release = ops.iter().position(|op| *op == released).unwrap();
        let delay = |ops: &[Op]| -> u32 {
            ops.iter()
                .map(|op| if let Op::Delay(ms) = op { *ms } else { 0 })
                .sum()
        };

        assert!(delay(&ops[..release]) >= 200);
        assert!(delay(&ops[release..]) >= 250);
        assert_eq!(uut.platform().total_delay(), 450);
    }

    #[test]
    fn power_off_asserts_shutdown_then_parks_pads() {
        let mut uut = Ath6klPower::new(FakePlatform::new());

        assert_eq!(uut.power(false), 0);

        let mut expected = vec![
            Op::SetValue(GOLFU_GPIO_WIFI_SHUTDOWN_N, false),
            Op::Delay(SHUTDOWN_SETTLE_MS),
        ];
        expected.extend(WIFI_OFF_TABLE.iter().map(|&c| Op::Tlmm(c)));
        expected.push(Op::Delay(PARK_SETTLE_MS));
        expected.push(Op::Delay(FINAL_SETTLE_MS));
        assert_eq!(uut.platform().ops, expected);
    }

    #[test]
    fn table_stops_at_first_failure() {
        let bad = WIFI_ON_TABLE[2];
        let platform =
            FakePlatform::new().fail_on(Op::Tlmm(bad), PlatformError::EIO);
        let mut uut = Ath6klPower::new(platform);

        assert_eq!(uut.power(true), 0);

        let applied: Vec<PinConfig> = uut
            .platform()
            .ops
            .iter()
            .filter_map(|op| if let Op::Tlmm(c) = op { Some(*c) } else { None })
            .collect();
        assert_eq!(applied, WIFI_ON_TABLE[..3]);

        // The rest of the sequence still runs.
        let released = Op::SetValue(GOLFU_GPIO_WIFI_SHUTDOWN_N, true);
        assert_eq!(uut.platform().count(released), 1);
        assert_eq!(uut.platform().total_delay(), 450);
    }

    #[test]
    fn off_table_failure_still_waits() {
        let platform = FakePlatform::new()
            .fail_on(Op::Tlmm(WIFI_OFF_TABLE[0]), PlatformError::EBUSY);
        let mut uut = Ath6klPower::new(platform);

        assert_eq!(uut.power(false), 0);
        assert_eq!(
            uut.platform().ops,
            [
                Op::SetValue(GOLFU_GPIO_WIFI_SHUTDOWN_N, false),
                Op::Delay(SHUTDOWN_SETTLE_MS),
                Op::Tlmm(WIFI_OFF_TABLE[0]),
                Op::Delay(PARK_SETTLE_MS),
                Op::Delay(FINAL_SETTLE_MS),
            ]
        );
    }

    #[test]
    fn nothing_is_latched_between_calls() {
        let mut uut = Ath6klPower::new(FakePlatform::new());
        uut.power(true);
        uut.power(true);

        let released = Op::SetValue(GOLFU_GPIO_WIFI_SHUTDOWN_N, true);
        assert_eq!(uut.platform().count(released), 2);
    }
}
