// SPDX-License-Identifier: MPL-2.0

use crate::prelude::*;

/// The control requests understood by the pseudoterminal drivers.
#[expect(clippy::upper_case_acronyms)]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoctlCmd {
    /// Get Pty Number
    TIOCGPTN = 0x80045430,
    /// Lock/unlock Pty
    TIOCSPTLCK = 0x40045431,
    /// Get Pty lock state
    TIOCGPTLCK = 0x80045439,
}

impl TryFrom<u32> for IoctlCmd {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        let cmd = match value {
            0x80045430 => Self::TIOCGPTN,
            0x40045431 => Self::TIOCSPTLCK,
            0x80045439 => Self::TIOCGPTLCK,
            _ => return_errno_with_message!(Errno::EINVAL, "unknown ioctl command"),
        };
        Ok(cmd)
    }
}
