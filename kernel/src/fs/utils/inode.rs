// SPDX-License-Identifier: MPL-2.0

use crate::{
    fs::device::{DeviceId, DeviceType},
    prelude::*,
    process::{Gid, Uid},
};

#[repr(u16)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InodeType {
    CharDevice = 0o020000,
    Dir = 0o040000,
    BlockDevice = 0o060000,
}

impl InodeType {
    pub fn is_directory(&self) -> bool {
        *self == InodeType::Dir
    }

    pub fn is_device(&self) -> bool {
        *self == InodeType::BlockDevice || *self == InodeType::CharDevice
    }
}

impl From<DeviceType> for InodeType {
    fn from(type_: DeviceType) -> InodeType {
        match type_ {
            DeviceType::Char => InodeType::CharDevice,
            DeviceType::Block => InodeType::BlockDevice,
        }
    }
}

bitflags! {
    /// The permission bits of an inode.
    pub struct InodeMode: u16 {
        /// set-user-ID
        const S_ISUID = 0o4000;
        /// set-group-ID
        const S_ISGID = 0o2000;
        /// sticky bit
        const S_ISVTX = 0o1000;
        /// read by owner
        const S_IRUSR = 0o0400;
        /// write by owner
        const S_IWUSR = 0o0200;
        /// execute/search by owner
        const S_IXUSR = 0o0100;
        /// read by group
        const S_IRGRP = 0o0040;
        /// write by group
        const S_IWGRP = 0o0020;
        /// execute/search by group
        const S_IXGRP = 0o0010;
        /// read by others
        const S_IROTH = 0o0004;
        /// write by others
        const S_IWOTH = 0o0002;
        /// execute/search by others
        const S_IXOTH = 0o0001;
    }
}

impl InodeMode {
    pub fn is_readable(&self) -> bool {
        self.contains(Self::S_IRUSR)
    }

    pub fn is_writable(&self) -> bool {
        self.contains(Self::S_IWUSR)
    }
}

/// The subset of `struct stat` that devpts reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// Corresponds to `st_ino`.
    pub ino: u64,
    pub type_: InodeType,
    pub mode: InodeMode,
    pub uid: Uid,
    pub gid: Gid,
    /// The device this inode represents, if it is a device node.
    ///
    /// Corresponds to `st_rdev`.
    pub rdev: u64,
}

impl Metadata {
    pub fn new_dir(ino: u64, mode: InodeMode) -> Self {
        Self {
            ino,
            type_: InodeType::Dir,
            mode,
            uid: Uid::new_root(),
            gid: Gid::new_root(),
            rdev: 0,
        }
    }

    pub fn new_device(
        ino: u64,
        mode: InodeMode,
        uid: Uid,
        gid: Gid,
        type_: DeviceType,
        id: DeviceId,
    ) -> Self {
        Self {
            ino,
            type_: InodeType::from(type_),
            mode,
            uid,
            gid,
            rdev: id.as_encoded_u64(),
        }
    }

    /// Returns the `st_mode` value, i.e., the file type bits plus the permission bits.
    pub fn st_mode(&self) -> u32 {
        self.type_ as u32 | self.mode.bits() as u32
    }
}

/// A directory entry produced by a single `readdir` step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub ino: u64,
}
