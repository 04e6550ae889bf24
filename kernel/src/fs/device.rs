// SPDX-License-Identifier: MPL-2.0

//! Device numbers of the nodes exposed by devpts.

/// The major number of pseudoterminal masters (same as Linux's UNIX98 ptys).
pub const PTY_MASTER_MAJOR: u32 = 128;
/// The major number of pseudoterminal slaves. The minor number is the pty index.
pub const PTY_SLAVE_MAJOR: u32 = 136;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Char,
    Block,
}

/// A device ID, containing a major device number and a minor device number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceId {
    major: u32,
    minor: u32,
}

impl DeviceId {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub const fn major(&self) -> u32 {
        self.major
    }

    pub const fn minor(&self) -> u32 {
        self.minor
    }

    /// Decodes a device ID produced by [`Self::as_encoded_u64`].
    pub fn from_encoded_u64(raw: u64) -> Self {
        let major = ((raw >> 32) & 0xffff_f000 | (raw >> 8) & 0x0000_0fff) as u32;
        let minor = ((raw >> 12) & 0xffff_ff00 | raw & 0x0000_00ff) as u32;
        Self::new(major, minor)
    }

    /// Encodes the device ID the way glibc's `makedev` does.
    ///
    /// The low 32 bits agree with the kernel's `new_encode_dev`, so small numbers such as the pty
    /// slave IDs keep the familiar `(major << 8) | minor` shape.
    pub fn as_encoded_u64(&self) -> u64 {
        let major = self.major() as u64;
        let minor = self.minor() as u64;
        ((major & 0xffff_f000) << 32)
            | ((major & 0x0000_0fff) << 8)
            | ((minor & 0xffff_ff00) << 12)
            | (minor & 0x0000_00ff)
    }
}
