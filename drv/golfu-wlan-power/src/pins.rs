// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Golfu pin assignments and the AR600x pad tables.

use drv_golfu_wlan_api::{Direction, Drive, PinConfig, Pull};

// SDC2, which carries the AR600x's SDIO bus.
pub const GOLFU_GPIO_SD_CLK_0: u16 = 62;
pub const GOLFU_GPIO_SD_CMD: u16 = 63;
pub const GOLFU_GPIO_SD_D3: u16 = 64;
pub const GOLFU_GPIO_SD_D2: u16 = 65;
pub const GOLFU_GPIO_SD_D1: u16 = 66;
pub const GOLFU_GPIO_SD_D0: u16 = 67;

/// Active-low shutdown for the AR600x.
pub const GOLFU_GPIO_WIFI_SHUTDOWN_N: u16 = 13;
pub const GOLFU_GPIO_WIFI_IRQ: u16 = 29;

/// SDC2 function on the bus pins.
const SDC2: u8 = 2;
const GPIO: u8 = 0;

pub const WIFI_TABLE_LEN: usize = 7;

/// Pad states while the radio is powered: SDC2 function, pulled-up data and
/// command lines, and a stronger clock driver.
pub static WIFI_ON_TABLE: [PinConfig; WIFI_TABLE_LEN] = [
    sdio(GOLFU_GPIO_SD_D3, Pull::Up, Drive::Ma8),
    sdio(GOLFU_GPIO_SD_D2, Pull::Up, Drive::Ma8),
    sdio(GOLFU_GPIO_SD_D1, Pull::Up, Drive::Ma8),
    sdio(GOLFU_GPIO_SD_D0, Pull::Up, Drive::Ma8),
    sdio(GOLFU_GPIO_SD_CMD, Pull::Up, Drive::Ma8),
    sdio(GOLFU_GPIO_SD_CLK_0, Pull::None, Drive::Ma10),
    PinConfig::gpio_output(GOLFU_GPIO_WIFI_SHUTDOWN_N),
];

/// Pad states while the radio is off: everything back to a weakly driven,
/// unpulled GPIO so nothing back-powers the module.
pub static WIFI_OFF_TABLE: [PinConfig; WIFI_TABLE_LEN] = [
    parked(GOLFU_GPIO_SD_D3),
    parked(GOLFU_GPIO_SD_D2),
    parked(GOLFU_GPIO_SD_D1),
    parked(GOLFU_GPIO_SD_D0),
    parked(GOLFU_GPIO_SD_CMD),
    parked(GOLFU_GPIO_SD_CLK_0),
    PinConfig::gpio_output(GOLFU_GPIO_WIFI_SHUTDOWN_N),
];

const fn sdio(gpio: u16, pull: Pull, drive: Drive) -> PinConfig {
    PinConfig::new(gpio, SDC2, Direction::Output, pull, drive)
}

const fn parked(gpio: u16) -> PinConfig {
    PinConfig::new(gpio, GPIO, Direction::Output, Pull::None, Drive::Ma2)
}
