// SPDX-License-Identifier: MPL-2.0

//! VFS components

pub use inode::{DirEntry, InodeMode, InodeType, Metadata};
pub use ioctl::IoctlCmd;

mod inode;
mod ioctl;
