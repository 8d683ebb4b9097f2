// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! One-time WLAN setup at board bring-up.

use drv_golfu_wlan_api::{Gpio, SeqError, Step};
use ringbuf::{ringbuf, ringbuf_entry};

use crate::firmware::FirmwareBuffers;
use crate::pins::GOLFU_GPIO_WIFI_IRQ;

#[derive(Copy, Clone, PartialEq)]
enum Trace {
    None,
    Init,
    IrqRequestFailed(SeqError),
    IrqDriveFailed(SeqError),
    IrqParked,
}

ringbuf!(Trace, 8, Trace::None);

/// Readies the firmware buffers and parks the WLAN IRQ line driven low, then
/// gives the line back so the SDIO driver can claim it later.
///
/// A failure to drive the line is still followed by releasing it, and is then
/// returned.
pub fn golfu_wifi_init<G: Gpio>(
    gpio: &mut G,
    buffers: &FirmwareBuffers,
) -> Result<(), SeqError> {
    ringbuf_entry!(Trace::Init);

    buffers.prealloc();

    if let Err(e) = gpio.request(GOLFU_GPIO_WIFI_IRQ, "WLAN_IRQ") {
        let err = SeqError::new(Step::RequestIrq, e);
        ringbuf_entry!(Trace::IrqRequestFailed(err));
        return Err(err);
    }

    let r = gpio
        .direction_output(GOLFU_GPIO_WIFI_IRQ, false)
        .map_err(|e| SeqError::new(Step::DriveIrq, e));
    match r {
        Ok(()) => ringbuf_entry!(Trace::IrqParked),
        Err(err) => ringbuf_entry!(Trace::IrqDriveFailed(err)),
    }

    gpio.free(GOLFU_GPIO_WIFI_IRQ);
    r
}
