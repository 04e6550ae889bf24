// SPDX-License-Identifier: MPL-2.0

use crate::prelude::*;

/// A type of file system.
pub trait FsType: Send + Sync + 'static {
    /// The file system instances of this type.
    type Fs;

    /// Gets the name of this FS type such as `"devpts"`.
    fn name(&self) -> &'static str;

    /// Gets the magic number that identifies this FS type, as reported by `statfs`.
    fn magic(&self) -> u64;

    /// Creates an instance of this FS type.
    ///
    /// The optional `args` are the mount options, given as a comma-separated list.
    fn create(&self, args: Option<&str>) -> Result<Arc<Self::Fs>>;
}
