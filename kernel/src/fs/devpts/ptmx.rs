// SPDX-License-Identifier: MPL-2.0

use super::PTMX_INO;
use crate::{
    device::{pty::PtyDrivers, tty::TtyFile},
    fs::{
        device::{DeviceId, DeviceType},
        utils::{InodeMode, Metadata},
    },
    prelude::*,
    process::{Gid, Uid},
};

/// Same major number with Linux.
const PTMX_MAJOR_NUM: u32 = 5;
/// Same minor number with Linux.
const PTMX_MINOR_NUM: u32 = 2;

/// Ptmx is the multiplexing master of devpts.
///
/// Every time the multiplexing master is opened, a new pty master is returned and the
/// corresponding pty slave is created.
pub struct Ptmx {
    ptys: Arc<PtyDrivers>,
}

impl Ptmx {
    pub(super) fn new(ptys: Arc<PtyDrivers>) -> Self {
        Self { ptys }
    }

    /// The open method for ptmx.
    ///
    /// Picks the lowest free pty number, creates the pair and returns a file opened on the
    /// master.
    pub fn open(&self) -> Result<Arc<TtyFile>> {
        let index = {
            let slaves = self.ptys.slave().lock_ttys();
            slaves.find_free_from(0, |slave| slave.strong_count() == 0)
        };
        let Some(index) = index else {
            warn!("all {} pty numbers are in use", self.ptys.capacity());
            return_errno_with_message!(Errno::ENOSPC, "no free pty number");
        };

        // The table lock is released by now, so another opener may race for the same number.
        // The loser fails with `EIO` when it finds the number taken.
        let master = self.ptys.master().get(index as u32).inspect_err(|_| {
            warn!("lost pty index {} to a concurrent allocation", index);
        })?;

        Ok(TtyFile::new(master))
    }

    /// Opens the slave numbered `index`, i.e., `/dev/pts/<index>`.
    pub fn open_slave(&self, index: u32) -> Result<Arc<TtyFile>> {
        self.ptys.open_slave(index)
    }

    pub fn device_type(&self) -> DeviceType {
        DeviceType::Char
    }

    pub fn device_id(&self) -> DeviceId {
        DeviceId::new(PTMX_MAJOR_NUM, PTMX_MINOR_NUM)
    }

    /// Returns the metadata of the `ptmx` node.
    pub fn metadata(&self) -> Metadata {
        Metadata::new_device(
            PTMX_INO,
            InodeMode::from_bits_truncate(0o666),
            Uid::new_root(),
            Gid::new_root(),
            self.device_type(),
            self.device_id(),
        )
    }
}
