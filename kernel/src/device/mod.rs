// SPDX-License-Identifier: MPL-2.0

pub mod pty;
pub mod tty;

pub use pty::{MAX_PTY_NUM, PtyAttrs, PtyDrivers};
pub use tty::{Tty, TtyDriver, TtyDriverOps, TtyFile};
