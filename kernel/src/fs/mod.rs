// SPDX-License-Identifier: MPL-2.0

pub mod device;
pub mod devpts;
pub mod registry;
pub mod utils;
