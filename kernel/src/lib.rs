// SPDX-License-Identifier: MPL-2.0

//! Pseudoterminals and the devpts filesystem.
//!
//! Opening [`Ptmx`] allocates a pty pair and returns a file on its master. The slave shows up in
//! [`DevPts`] as `/<n>`, where `n` is the pty number, until its master goes away.

pub mod device;
pub mod error;
pub mod fs;
mod prelude;
pub mod process;
pub mod util;

pub use self::{
    error::{Errno, Error, Result},
    fs::devpts::{DevPts, DevPtsHandle, DevPtsOptions, DevPtsType, Ptmx, PtsNode},
};
