// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A recording stand-in for the platform services, for host tests.
//!
//! Every call is appended to `ops` in the order it was made, including calls
//! that were made to fail. Failures can be injected either by matching a
//! specific operation (`fail_on`) or by counting fallible calls
//! (`fail_nth`). Both are one-shot.

use drv_golfu_wlan_api::{
    ClockId, ClockVote, DelayMs, Gpio, PinConfig, PlatformError, Pmapp, Rail,
    RailDesc, Regulators,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Op {
    BulkGet(usize),
    SetVoltage(Rail, u32, u32),
    Enable(Rail),
    Disable(Rail),
    Put(Rail),
    Clock(ClockId, ClockVote),
    PinCtrl(u32, bool),
    Tlmm(PinConfig),
    SetValue(u16, bool),
    Request(u16),
    Free(u16),
    Output(u16, bool),
    Input(u16),
    Delay(u32),
}

#[derive(Default)]
pub struct FakePlatform {
    pub ops: Vec<Op>,
    /// Index into `ops` of the call that was made to fail, if any.
    pub failed_at: Option<usize>,
    fail_on: Vec<(Op, PlatformError)>,
    fail_nth: Option<usize>,
    fallible_calls: usize,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the next call matching `op` with `err`.
    pub fn fail_on(mut self, op: Op, err: PlatformError) -> Self {
        self.fail_on.push((op, err));
        self
    }

    /// Fails the `n`th fallible call (counting from zero) with `EIO`.
    pub fn fail_nth(mut self, n: usize) -> Self {
        self.fail_nth = Some(n);
        self
    }

    /// Forgets recorded calls. `fail_nth` counts from here on.
    pub fn clear(&mut self) {
        self.ops.clear();
        self.failed_at = None;
        self.fallible_calls = 0;
    }

    pub fn count(&self, op: Op) -> usize {
        self.ops.iter().filter(|&&o| o == op).count()
    }

    pub fn total_delay(&self) -> u32 {
        self.ops
            .iter()
            .map(|op| match op {
                Op::Delay(ms) => *ms,
                _ => 0,
            })
            .sum()
    }

    fn record(&mut self, op: Op) {
        self.ops.push(op);
    }

    fn fallible(&mut self, op: Op) -> Result<(), PlatformError> {
        self.record(op);

        let nth = self.fallible_calls;
        self.fallible_calls += 1;

        let injected = if self.fail_nth == Some(nth) {
            self.fail_nth = None;
            Some(PlatformError::EIO)
        } else if let Some(i) = self.fail_on.iter().position(|(o, _)| *o == op)
        {
            Some(self.fail_on.remove(i).1)
        } else {
            None
        };

        match injected {
            Some(err) => {
                self.failed_at = Some(self.ops.len() - 1);
                Err(err)
            }
            None => Ok(()),
        }
    }
}

impl Regulators for FakePlatform {
    type Handle = Rail;

    fn bulk_get<const N: usize>(
        &mut self,
        rails: &[RailDesc; N],
    ) -> Result<[Rail; N], PlatformError> {
        self.fallible(Op::BulkGet(N))?;

        let mut out = [Rail::Msme1; N];
        for (slot, desc) in out.iter_mut().zip(rails) {
            *slot = Rail::ALL
                .into_iter()
                .find(|r| r.desc().supply == desc.supply)
                .ok_or(PlatformError::EINVAL)?;
        }
        Ok(out)
    }

    fn set_voltage(
        &mut self,
        reg: Rail,
        min_uv: u32,
        max_uv: u32,
    ) -> Result<(), PlatformError> {
        self.fallible(Op::SetVoltage(reg, min_uv, max_uv))
    }

    fn enable(&mut self, reg: Rail) -> Result<(), PlatformError> {
        self.fallible(Op::Enable(reg))
    }

    fn disable(&mut self, reg: Rail) -> Result<(), PlatformError> {
        self.fallible(Op::Disable(reg))
    }

    fn put(&mut self, reg: Rail) {
        self.record(Op::Put(reg));
    }
}

impl Pmapp for FakePlatform {
    fn clock_vote(
        &mut self,
        _voter: &'static str,
        clock: ClockId,
        vote: ClockVote,
    ) -> Result<(), PlatformError> {
        self.fallible(Op::Clock(clock, vote))
    }

    fn vreg_pincntrl_vote(
        &mut self,
        _voter: &'static str,
        vreg_id: u32,
        _clock: ClockId,
        on: bool,
    ) -> Result<(), PlatformError> {
        self.fallible(Op::PinCtrl(vreg_id, on))
    }
}

impl Gpio for FakePlatform {
    fn tlmm_config(&mut self, config: PinConfig) -> Result<(), PlatformError> {
        self.fallible(Op::Tlmm(config))
    }

    fn set_value(&mut self, gpio: u16, high: bool) {
        self.record(Op::SetValue(gpio, high));
    }

    fn request(
        &mut self,
        gpio: u16,
        _label: &'static str,
    ) -> Result<(), PlatformError> {
        self.fallible(Op::Request(gpio))
    }

    fn free(&mut self, gpio: u16) {
        self.record(Op::Free(gpio));
    }

    fn direction_output(
        &mut self,
        gpio: u16,
        high: bool,
    ) -> Result<(), PlatformError> {
        self.fallible(Op::Output(gpio, high))
    }

    fn direction_input(&mut self, gpio: u16) -> Result<(), PlatformError> {
        self.fallible(Op::Input(gpio))
    }
}

impl DelayMs<u32> for FakePlatform {
    fn delay_ms(&mut self, ms: u32) {
        self.record(Op::Delay(ms));
    }
}
