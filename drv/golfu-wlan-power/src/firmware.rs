// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Preallocated firmware buffers for the ath6kl loader.
//!
//! The loader runs late, when a large contiguous allocation may no longer be
//! available, so the board file holds one buffer per firmware file type for
//! its whole life and lends them out on request. Each loan starts zeroed.

use core::ops::{Deref, DerefMut};
use num_traits::FromPrimitive;
use spin::{Mutex, MutexGuard};

pub const BOARD_DATA_FILE_SIZE: usize = 4 * 1024;
pub const FW_FILE_SIZE: usize = 124 * 1024;

/// Firmware file types, numbered as the loader asks for them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, num_derive::FromPrimitive)]
pub enum FwType {
    BoardData = 0,
    Firmware = 1,
}

impl FwType {
    pub const fn size(self) -> usize {
        match self {
            FwType::BoardData => BOARD_DATA_FILE_SIZE,
            FwType::Firmware => FW_FILE_SIZE,
        }
    }
}

#[derive(Debug)]
pub struct FirmwareBuffers {
    board_data: Mutex<[u8; BOARD_DATA_FILE_SIZE]>,
    firmware: Mutex<[u8; FW_FILE_SIZE]>,
}

impl Default for FirmwareBuffers {
    fn default() -> Self {
        Self::new()
    }
}

impl FirmwareBuffers {
    pub const fn new() -> Self {
        Self {
            board_data: Mutex::new([0; BOARD_DATA_FILE_SIZE]),
            firmware: Mutex::new([0; FW_FILE_SIZE]),
        }
    }

    /// Zeroes both buffers. Run once at init so that the first loan doesn't
    /// pay for it.
    pub fn prealloc(&self) {
        self.board_data.lock().fill(0);
        self.firmware.lock().fill(0);
    }

    /// Lends out the buffer for `ty`, zeroed.
    ///
    /// The buffer stays borrowed until the returned guard is dropped; asking
    /// for the same type again before then spins.
    pub fn get(&self, ty: FwType) -> FwBuf<'_> {
        let mut buf = match ty {
            FwType::BoardData => FwBuf::BoardData(self.board_data.lock()),
            FwType::Firmware => FwBuf::Firmware(self.firmware.lock()),
        };
        buf.fill(0);
        buf
    }

    /// Like [`Self::get`], with the loader's raw type number. Returns `None`
    /// for numbers that don't name a buffer.
    pub fn get_by_index(&self, index: u8) -> Option<FwBuf<'_>> {
        FwType::from_u8(index).map(|ty| self.get(ty))
    }
}

/// A borrowed firmware buffer.
pub enum FwBuf<'a> {
    BoardData(MutexGuard<'a, [u8; BOARD_DATA_FILE_SIZE]>),
    Firmware(MutexGuard<'a, [u8; FW_FILE_SIZE]>),
}

impl Deref for FwBuf<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FwBuf::BoardData(g) => &g[..],
            FwBuf::Firmware(g) => &g[..],
        }
    }
}

impl DerefMut for FwBuf<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            FwBuf::BoardData(g) => &mut g[..],
            FwBuf::Firmware(g) => &mut g[..],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BUFS: FirmwareBuffers = FirmwareBuffers::new();

    #[test]
    fn buffers_have_loader_sizes() {
        assert_eq!(BUFS.get(FwType::BoardData).len(), 4096);
        assert_eq!(BUFS.get(FwType::Firmware).len(), 124 * 1024);
        assert_eq!(FwType::Firmware.size(), FW_FILE_SIZE);
    }

    #[test]
    fn every_loan_starts_zeroed() {
        let bufs = Box::new(FirmwareBuffers::new());
        {
            let mut fw = bufs.get(FwType::Firmware);
            fw[..4].copy_from_slice(b"\x7fELF");
            fw[FW_FILE_SIZE - 1] = 0xaa;
        }

        let fw = bufs.get(FwType::Firmware);
        assert!(fw.iter().all(|&b| b == 0));
    }

    #[test]
    fn index_selects_type() {
        let bufs = Box::new(FirmwareBuffers::new());
        assert_eq!(
            bufs.get_by_index(0).map(|b| b.len()),
            Some(BOARD_DATA_FILE_SIZE)
        );
        assert_eq!(bufs.get_by_index(1).map(|b| b.len()), Some(FW_FILE_SIZE));
    }

    #[test]
    fn unknown_index_is_refused() {
        let bufs = Box::new(FirmwareBuffers::new());
        assert!(bufs.get_by_index(2).is_none());
        assert!(bufs.get_by_index(u8::MAX).is_none());
    }

    #[test]
    fn types_are_independent() {
        let bufs = Box::new(FirmwareBuffers::new());
        let mut board = bufs.get(FwType::BoardData);
        let fw = bufs.get(FwType::Firmware);
        board[0] = 1;
        assert_eq!(fw[0], 0);
    }
}
