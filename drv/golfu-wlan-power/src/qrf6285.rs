// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power sequencing for the QRF6285.
//!
//! # Bring-up
//!
//! On the first power-on we switch to the MSM reset/sleep line and resolve all
//! three rails with the regulator framework in one request. Those handles are
//! kept across power cycles, unless a failed power-on hands some back (see
//! below).
//!
//! The power-on sequence proper is:
//!
//! 1. For each rail the board has (all three, except on the QRD7627a, which
//!    only has `wlan4`): program its voltage, enable it, and if the rail is
//!    pin-controlled, vote its low-power mode onto the A0 clock request pin.
//! 2. QRD7627a only: mux `GPIO_WLAN_3V3_EN` as an output and drive it high.
//! 3. Mux the reset/sleep line as an output and drive it high.
//! 4. Vote the A0 clock buffer on.
//! 5. Hand the A0 vote to pin control, so that the QRF6285's `CLK_PWR_REQ`
//!    pin governs it from here on.
//!
//! Each step that takes effect is pushed onto a stack. If a later step fails,
//! the stack is popped and each entry undone, so only what was actually done
//! gets undone, newest first. Undo failures are recorded and otherwise
//! ignored; the caller sees the first failure. Except on the QRD7627a, an
//! undone rail is also handed back to the regulator framework, and the next
//! power-on requests it again.
//!
//! # Power-down
//!
//! The mirror image: clock vote off, reset line low, 3.3V enable low (where
//! present), then rails in reverse order. If a step fails, whatever is still
//! on from that point is forced off the same way a failed power-on is
//! unwound, without handing any rail back. The sequencer stays marked as
//! powered, so that the caller may try again.

use arrayvec::ArrayVec;
use drv_golfu_wlan_api::{
    Board, ClockId, ClockVote, DelayMs, Gpio, PinConfig, PlatformError, Pmapp,
    Rail, Regulators, SeqError, Step, GPIO_WLAN_3V3_EN, GPIO_WLAN_SYS_REST_EN,
    GPIO_WLAN_SYS_REST_EN_LEGACY, NUM_RAILS, RAILS, VOTER_ID,
};
use ringbuf::{ringbuf, ringbuf_entry};
use static_assertions::const_assert;

/// Time the reset line is held low (as an input) after release.
const RESET_RELEASE_MS: u32 = 100;

/// Something the power-on sequence did that must be undone if a later step
/// fails.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Done {
    RailEnabled(Rail),
    RailPinControlled(Rail),
    Aux3v3Asserted,
    ResetAsserted,
    ClockOn,
}

// Every rail can contribute an enable and a pin-control vote, plus the 3.3V
// enable, the reset line, and the clock.
const MAX_DONE: usize = NUM_RAILS * 2 + 3;
const_assert!(MAX_DONE == 9);

type DoneStack = ArrayVec<Done, MAX_DONE>;

static RAIL_ORDER: [Rail; NUM_RAILS] = Rail::ALL;

#[derive(Copy, Clone, PartialEq)]
enum Trace {
    None,
    AlreadyPoweredUp,
    NotPoweredUp,
    ResetGpioSelected(u16),
    RegulatorsAcquired(usize),
    RailOn(Rail),
    RailOff(Rail),
    VotingA0Clock,
    Failed(SeqError),
    Undo(Done),
    UndoFailed(SeqError),
    PowerUpSuccess,
    PowerUpFailed,
    PowerDownSuccess,
    PowerDownFailed,
}

ringbuf!(Trace, 64, Trace::None);

/// The QRF6285 sequencer, and the only owner of its rails.
///
/// `P` supplies every platform service the sequence touches.
///
/// Rails are normally requested from the regulator framework once. A failed
/// power-on that hands rails back (every board but the QRD7627a) means the
/// next power-on issues another `bulk_get` for just those rails.
pub struct Qrf6285Seq<P: Regulators> {
    platform: P,
    board: Board,
    reset_gpio: u16,
    regs: [Option<P::Handle>; NUM_RAILS],
    /// Set once the reset line is selected and every rail is held.
    init_done: bool,
    powered: bool,
}

impl<P> Qrf6285Seq<P>
where
    P: Regulators + Pmapp + Gpio + DelayMs<u32>,
{
    pub fn new(platform: P, board: Board) -> Self {
        Self {
            platform,
            board,
            reset_gpio: GPIO_WLAN_SYS_REST_EN_LEGACY,
            regs: [None; NUM_RAILS],
            init_done: false,
            powered: false,
        }
    }

    /// Entry point for the SDIO glue.
    ///
    /// Always returns 0: failures are recorded in the ring buffer and
    /// reflected in [`Self::is_powered`], but not reported here. Existing
    /// callers depend on that; use [`Self::set_power`] for the real result.
    pub fn wlan_power(&mut self, on: bool) -> i32 {
        let _ = self.set_power(on);
        0
    }

    pub fn set_power(&mut self, on: bool) -> Result<(), SeqError> {
        if on {
            self.power_up()
        } else {
            self.power_down()
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Whether every rail handle is currently held.
    pub fn is_acquired(&self) -> bool {
        self.init_done
    }

    pub fn reset_gpio(&self) -> u16 {
        self.reset_gpio
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    fn power_up(&mut self) -> Result<(), SeqError> {
        if self.powered {
            ringbuf_entry!(Trace::AlreadyPoweredUp);
            return Ok(());
        }

        if !self.init_done {
            self.reset_gpio = GPIO_WLAN_SYS_REST_EN;
            ringbuf_entry!(Trace::ResetGpioSelected(self.reset_gpio));

            if let Err(e) = self.acquire() {
                ringbuf_entry!(Trace::Failed(e));
                ringbuf_entry!(Trace::PowerUpFailed);
                return Err(e);
            }
            self.init_done = true;
        }

        let mut done = DoneStack::new();
        match self.bring_up(&mut done) {
            Ok(()) => {
                self.powered = true;
                ringbuf_entry!(Trace::PowerUpSuccess);
                Ok(())
            }
            Err(e) => {
                ringbuf_entry!(Trace::Failed(e));
                self.unwind(&mut done, true);
                self.powered = false;
                ringbuf_entry!(Trace::PowerUpFailed);
                Err(e)
            }
        }
    }

    /// Resolves rail handles. The first time through this is a single bulk
    /// request for all rails; after an unwind has handed some back, only the
    /// missing ones are requested.
    fn acquire(&mut self) -> Result<(), SeqError> {
        if self.regs.iter().all(Option::is_none) {
            let regs = self
                .platform
                .bulk_get(&RAILS)
                .map_err(|e| SeqError::new(Step::AcquireRegulators, e))?;
            self.regs = regs.map(Some);
            ringbuf_entry!(Trace::RegulatorsAcquired(NUM_RAILS));
            return Ok(());
        }

        for (slot, rail) in self.regs.iter_mut().zip(Rail::ALL) {
            if slot.is_none() {
                let [reg] = self
                    .platform
                    .bulk_get(core::array::from_ref(rail.desc()))
                    .map_err(|e| {
                        SeqError::on_rail(Step::AcquireRegulators, rail, e)
                    })?;
                *slot = Some(reg);
                ringbuf_entry!(Trace::RegulatorsAcquired(1));
            }
        }
        Ok(())
    }

    fn handle(&self, rail: Rail, step: Step) -> Result<P::Handle, SeqError> {
        self.regs[rail as usize]
            .ok_or(SeqError::on_rail(step, rail, PlatformError::EINVAL))
    }

    fn rails(&self) -> &'static [Rail] {
        &RAIL_ORDER[self.board.first_rail()..]
    }

    fn bring_up(&mut self, done: &mut DoneStack) -> Result<(), SeqError> {
        for &rail in self.rails() {
            let desc = rail.desc();
            let reg = self.handle(rail, Step::SetVoltage)?;

            self.platform
                .set_voltage(reg, desc.min_uv, desc.max_uv)
                .map_err(|e| SeqError::on_rail(Step::SetVoltage, rail, e))?;

            self.platform
                .enable(reg)
                .map_err(|e| {
                    SeqError::on_rail(Step::EnableRegulator, rail, e)
                })?;
            done.push(Done::RailEnabled(rail));

            if desc.pin_controlled {
                self.platform
                    .vreg_pincntrl_vote(
                        VOTER_ID,
                        desc.pmapp_id,
                        ClockId::A0,
                        true,
                    )
                    .map_err(|e| {
                        SeqError::on_rail(Step::PinControlVote, rail, e)
                    })?;
                done.push(Done::RailPinControlled(rail));
            }

            ringbuf_entry!(Trace::RailOn(rail));
        }

        if self.board.has_3v3_enable() {
            self.platform
                .tlmm_config(PinConfig::gpio_output(GPIO_WLAN_3V3_EN))
                .map_err(|e| SeqError::new(Step::Config3v3Enable, e))?;
            self.platform.set_value(GPIO_WLAN_3V3_EN, true);
            done.push(Done::Aux3v3Asserted);
        }

        self.platform
            .tlmm_config(PinConfig::gpio_output(self.reset_gpio))
            .map_err(|e| SeqError::new(Step::ConfigReset, e))?;
        self.platform.set_value(self.reset_gpio, true);
        done.push(Done::ResetAsserted);

        ringbuf_entry!(Trace::VotingA0Clock);
        self.platform
            .clock_vote(VOTER_ID, ClockId::A0, ClockVote::On)
            .map_err(|e| SeqError::new(Step::ClockOn, e))?;
        done.push(Done::ClockOn);

        self.platform
            .clock_vote(VOTER_ID, ClockId::A0, ClockVote::PinCtrl)
            .map_err(|e| SeqError::new(Step::ClockPinControl, e))?;

        Ok(())
    }

    /// Undoes everything on `done`, newest first. With `release`, boards that
    /// allow it also hand undone rails back to the regulator framework.
    fn unwind(&mut self, done: &mut DoneStack, release: bool) {
        while let Some(step) = done.pop() {
            ringbuf_entry!(Trace::Undo(step));
            if let Err(e) = self.undo(step, release) {
                ringbuf_entry!(Trace::UndoFailed(e));
            }
        }
    }

    fn undo(&mut self, step: Done, release: bool) -> Result<(), SeqError> {
        match step {
            Done::ClockOn => self
                .platform
                .clock_vote(VOTER_ID, ClockId::A0, ClockVote::Off)
                .map_err(|e| SeqError::new(Step::ClockOff, e)),
            Done::ResetAsserted => self.release_reset(),
            Done::Aux3v3Asserted => {
                self.platform.set_value(GPIO_WLAN_3V3_EN, false);
                self.platform.free(GPIO_WLAN_3V3_EN);
                Ok(())
            }
            Done::RailPinControlled(rail) => self
                .platform
                .vreg_pincntrl_vote(
                    VOTER_ID,
                    rail.desc().pmapp_id,
                    ClockId::A0,
                    false,
                )
                .map_err(|e| {
                    SeqError::on_rail(Step::PinControlWithdraw, rail, e)
                }),
            Done::RailEnabled(rail) => {
                let reg = self.handle(rail, Step::DisableRegulator)?;
                let r = self.platform.disable(reg).map_err(|e| {
                    SeqError::on_rail(Step::DisableRegulator, rail, e)
                });
                if release && self.board.releases_rails_on_unwind() {
                    // The handle is gone after this; the next power-on has
                    // to fetch it again.
                    self.platform.put(reg);
                    self.regs[rail as usize] = None;
                    self.init_done = false;
                }
                r
            }
        }
    }

    /// Drops the reset line and lets it float, then waits for the module to
    /// notice.
    fn release_reset(&mut self) -> Result<(), SeqError> {
        self.platform.set_value(self.reset_gpio, false);
        let r = self
            .platform
            .direction_input(self.reset_gpio)
            .map_err(|e| SeqError::new(Step::ResetRelease, e));
        self.platform.delay_ms(RESET_RELEASE_MS);
        r
    }

    fn power_down(&mut self) -> Result<(), SeqError> {
        if !self.powered {
            ringbuf_entry!(Trace::NotPoweredUp);
            return Ok(());
        }

        match self.tear_down() {
            Ok(()) => {
                self.powered = false;
                ringbuf_entry!(Trace::PowerDownSuccess);
                Ok(())
            }
            Err(e) => {
                ringbuf_entry!(Trace::Failed(e));
                let mut on = self.still_on(e);
                self.unwind(&mut on, false);
                ringbuf_entry!(Trace::PowerDownFailed);
                Err(e)
            }
        }
    }

    /// What a power-down that failed with `failed` left on, in bring-up
    /// order.
    fn still_on(&self, failed: SeqError) -> DoneStack {
        let rails = self.rails();
        let mut on = DoneStack::new();

        // Rails go down last-first, so the ones ahead of the failing rail are
        // all still up. A GPIO or clock failure leaves every rail up.
        let up = failed
            .rail
            .and_then(|r| rails.iter().position(|&x| x == r))
            .unwrap_or(rails.len());
        for &rail in &rails[..up] {
            on.push(Done::RailEnabled(rail));
            if rail.desc().pin_controlled {
                on.push(Done::RailPinControlled(rail));
            }
        }

        match (failed.step, failed.rail) {
            (Step::PinControlWithdraw, Some(rail)) => {
                on.push(Done::RailEnabled(rail));
            }
            (Step::ClockOff | Step::ConfigReset | Step::Config3v3Enable, _) => {
                if self.board.has_3v3_enable() {
                    on.push(Done::Aux3v3Asserted);
                }
                if failed.step == Step::ClockOff {
                    on.push(Done::ResetAsserted);
                    on.push(Done::ClockOn);
                }
            }
            _ => (),
        }

        on
    }

    fn tear_down(&mut self) -> Result<(), SeqError> {
        self.platform
            .clock_vote(VOTER_ID, ClockId::A0, ClockVote::Off)
            .map_err(|e| SeqError::new(Step::ClockOff, e))?;

        self.platform
            .tlmm_config(PinConfig::gpio_output(self.reset_gpio))
            .map_err(|e| SeqError::new(Step::ConfigReset, e))?;
        self.platform.set_value(self.reset_gpio, false);

        if self.board.has_3v3_enable() {
            self.platform
                .tlmm_config(PinConfig::gpio_output(GPIO_WLAN_3V3_EN))
                .map_err(|e| SeqError::new(Step::Config3v3Enable, e))?;
            self.platform.set_value(GPIO_WLAN_3V3_EN, false);
        }

        for &rail in self.rails().iter().rev() {
            let desc = rail.desc();
            let reg = self.handle(rail, Step::DisableRegulator)?;

            if desc.pin_controlled {
                self.platform
                    .vreg_pincntrl_vote(
                        VOTER_ID,
                        desc.pmapp_id,
                        ClockId::A0,
                        false,
                    )
                    .map_err(|e| {
                        SeqError::on_rail(Step::PinControlWithdraw, rail, e)
                    })?;
            }

            self.platform.disable(reg).map_err(|e| {
                SeqError::on_rail(Step::DisableRegulator, rail, e)
            })?;

            ringbuf_entry!(Trace::RailOff(rail));
        }

        Ok(())
    }
}
