// SPDX-License-Identifier: MPL-2.0

pub mod credentials;

pub use credentials::{Gid, Uid};
