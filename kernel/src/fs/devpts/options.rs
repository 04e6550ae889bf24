// SPDX-License-Identifier: MPL-2.0

use crate::{
    device::pty::{MAX_PTY_NUM, PtyAttrs},
    fs::utils::InodeMode,
    prelude::*,
    process::{Gid, Uid},
};

/// The mount options of devpts.
///
/// The options come as a comma-separated list, e.g., `"mode=600,gid=5,max=64"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DevPtsOptions {
    /// The permissions, owner and group of newly created slaves.
    pub attrs: PtyAttrs,
    /// The max number of pty pairs.
    pub max: usize,
}

impl Default for DevPtsOptions {
    fn default() -> Self {
        Self {
            attrs: PtyAttrs::default(),
            max: MAX_PTY_NUM,
        }
    }
}

impl DevPtsOptions {
    pub fn parse(args: &str) -> Result<Self> {
        let mut options = Self::default();

        for option in args.split(',') {
            let option = option.trim();
            if option.is_empty() {
                continue;
            }

            let Some((key, value)) = option.split_once('=') else {
                trace!("ignore devpts option: {}", option);
                continue;
            };

            match key {
                "mode" => {
                    let bits = u16::from_str_radix(value, 8)?;
                    if bits & !0o7777 != 0 {
                        return_errno_with_message!(Errno::EINVAL, "invalid devpts mode");
                    }
                    options.attrs.mode = InodeMode::from_bits_truncate(bits);
                }
                "uid" => options.attrs.uid = Uid::new(value.parse()?),
                "gid" => options.attrs.gid = Gid::new(value.parse()?),
                "max" => {
                    let max: usize = value.parse()?;
                    if max == 0 || max > MAX_PTY_NUM {
                        return_errno_with_message!(Errno::EINVAL, "devpts max is out of range");
                    }
                    options.max = max;
                }
                _ => trace!("ignore devpts option: {}", option),
            }
        }

        Ok(options)
    }
}
