// SPDX-License-Identifier: MPL-2.0

pub use self::{options::DevPtsOptions, ptmx::Ptmx};
use crate::{
    device::pty::PtyDrivers,
    fs::{
        device::{DeviceId, DeviceType, PTY_SLAVE_MAJOR},
        registry::FsType,
        utils::{DirEntry, InodeMode, Metadata},
    },
    prelude::*,
};

mod options;
mod ptmx;

pub const DEVPTS_MAGIC: u64 = 0x1cd1;

const ROOT_INO: u64 = 1;
const PTMX_INO: u64 = 2;
const FIRST_SLAVE_INO: u64 = PTMX_INO + 1;

/// A node of devpts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PtsNode {
    /// The root directory.
    Root,
    /// The device file of the pty slave with the given number.
    Slave(u32),
}

impl PtsNode {
    pub fn ino(&self) -> u64 {
        match self {
            PtsNode::Root => ROOT_INO,
            PtsNode::Slave(index) => *index as u64 + FIRST_SLAVE_INO,
        }
    }
}

/// Devpts(device pseudo terminal filesystem) is a virtual filesystem.
///
/// It is normally mounted at "/dev/pts" and contains solely devices files which
/// represent slaves to the multiplexing master located at "/dev/ptmx".
///
/// Paths are relative to the mount point: `""` is the root directory and `"/<n>"` is the slave
/// numbered `n`.
pub struct DevPts {
    options: DevPtsOptions,
    ptys: Arc<PtyDrivers>,
    ptmx: Ptmx,
}

impl DevPts {
    pub fn new(options: DevPtsOptions) -> Arc<Self> {
        let ptys = Arc::new(PtyDrivers::new(options.max, options.attrs));
        Arc::new(Self {
            options,
            ptmx: Ptmx::new(ptys.clone()),
            ptys,
        })
    }

    pub fn name(&self) -> &'static str {
        "devpts"
    }

    pub fn magic(&self) -> u64 {
        DEVPTS_MAGIC
    }

    pub fn options(&self) -> &DevPtsOptions {
        &self.options
    }

    pub fn ptmx(&self) -> &Ptmx {
        &self.ptmx
    }

    pub fn ptys(&self) -> &Arc<PtyDrivers> {
        &self.ptys
    }

    /// Resolves `path` to a node.
    ///
    /// Besides the root, the only valid paths are a slash followed by the decimal number of an
    /// existing slave.
    pub fn lookup(&self, path: &str) -> Result<PtsNode> {
        if path.is_empty() {
            return Ok(PtsNode::Root);
        }

        let Some(index) = Self::parse_index(path) else {
            return_errno_with_message!(Errno::ENOENT, "malformed devpts path");
        };
        if index as usize >= self.ptys.capacity() || !self.ptys.slave_exists(index) {
            return_errno_with_message!(Errno::ENOENT, "the pty slave does not exist");
        }

        trace!("devpts lookup: {} -> {}", path, index);
        Ok(PtsNode::Slave(index))
    }

    fn parse_index(path: &str) -> Option<u32> {
        let digits = path.strip_prefix('/')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn open(&self, path: &str) -> Result<DevPtsHandle> {
        let node = self.lookup(path)?;
        Ok(DevPtsHandle::new(node))
    }

    pub fn stat(&self, path: &str) -> Result<Metadata> {
        let node = self.lookup(path)?;
        self.stat_node(node)
    }

    /// Stats the node that `handle` is opened on.
    ///
    /// This fails with `ENOENT` if the slave has gone since the handle was opened.
    pub fn fstat(&self, handle: &DevPtsHandle) -> Result<Metadata> {
        self.stat_node(handle.node())
    }

    fn stat_node(&self, node: PtsNode) -> Result<Metadata> {
        let index = match node {
            PtsNode::Root => {
                return Ok(Metadata::new_dir(
                    ROOT_INO,
                    InodeMode::from_bits_truncate(0o755),
                ));
            }
            PtsNode::Slave(index) => index,
        };

        let slave = self
            .ptys
            .lookup_slave(index)
            .ok_or(Error::with_message(Errno::ENOENT, "the pty slave does not exist"))?;
        let state = slave.lock();
        Ok(Metadata::new_device(
            node.ino(),
            state.pty().mode(),
            state.pty().uid(),
            state.pty().gid(),
            DeviceType::Char,
            DeviceId::new(PTY_SLAVE_MAJOR, index),
        ))
    }

    /// Reads the next directory entry of the root.
    ///
    /// The offset of `handle` is the first pty number to examine. On success, it is moved past the
    /// returned slave. `Ok(None)` means that there are no more entries.
    pub fn readdir(&self, handle: &mut DevPtsHandle) -> Result<Option<DirEntry>> {
        if handle.node() != PtsNode::Root {
            return_errno_with_message!(Errno::ENOTDIR, "not a devpts directory");
        }

        let found = self
            .ptys
            .slave()
            .lock_ttys()
            .find_used_from(handle.offset(), |slave| slave.strong_count() > 0);
        let Some(index) = found else {
            trace!("devpts readdir: end at offset {}", handle.offset());
            handle.seek(handle.offset().max(self.ptys.capacity()));
            return Ok(None);
        };

        trace!("devpts readdir: offset {} -> {}", handle.offset(), index);
        handle.seek(index + 1);
        Ok(Some(DirEntry {
            name: index.to_string(),
            ino: PtsNode::Slave(index as u32).ino(),
        }))
    }
}

impl core::fmt::Debug for DevPts {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DevPts")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// A file handle opened on a devpts node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevPtsHandle {
    node: PtsNode,
    /// The directory offset. Only meaningful for the root.
    offset: usize,
}

impl DevPtsHandle {
    fn new(node: PtsNode) -> Self {
        Self { node, offset: 0 }
    }

    pub fn node(&self) -> PtsNode {
        self.node
    }

    /// Returns the path of the node, relative to the mount point.
    pub fn path(&self) -> String {
        match self.node {
            PtsNode::Root => String::new(),
            PtsNode::Slave(index) => format!("/{}", index),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }
}

pub struct DevPtsType;

impl FsType for DevPtsType {
    type Fs = DevPts;

    fn name(&self) -> &'static str {
        "devpts"
    }

    fn magic(&self) -> u64 {
        DEVPTS_MAGIC
    }

    fn create(&self, args: Option<&str>) -> Result<Arc<DevPts>> {
        let options = args
            .map(DevPtsOptions::parse)
            .transpose()?
            .unwrap_or_default();
        debug!("create devpts: {:?}", options);
        Ok(DevPts::new(options))
    }
}
