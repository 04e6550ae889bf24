// SPDX-License-Identifier: MPL-2.0

//! Pseudoterminals.
//!
//! A pseudoterminal is a pair of terminals. Opening the multiplexer (see [`Ptmx`]) allocates the
//! master, and the master creates its slave as part of its initialization. Whatever is written to
//! one side shows up as input on the other side.
//!
//! The master holds the only counted reference to its slave, so the master is always torn down
//! first. Its teardown breaks the link from the slave back to the master before anything else, and
//! every slave-side operation checks that link. That way no slave-side code can reach a master that
//! is being destroyed.
//!
//! [`Ptmx`]: crate::fs::devpts::Ptmx

use self::{master::PtyMasterOps, slave::PtySlaveOps};
use crate::{
    device::tty::{Tty, TtyDriver, TtyFile},
    fs::{
        device::{PTY_MASTER_MAJOR, PTY_SLAVE_MAJOR},
        utils::InodeMode,
    },
    prelude::*,
    process::{Gid, Uid},
};

mod master;
mod slave;

/// The max number of pty pairs.
pub const MAX_PTY_NUM: usize = 4096;

/// The other side of a pseudoterminal.
pub(crate) enum PtyPeer {
    /// The slave of a master. This is the counted reference that keeps the slave alive.
    Slave(Arc<Tty>),
    /// The master of a slave.
    Master(Weak<Tty>),
}

/// The pseudoterminal-specific state of a terminal.
///
/// This is protected by the per-terminal lock (see [`Tty::lock`]).
pub struct PtyState {
    pub(crate) other: Option<PtyPeer>,
    /// Whether opening the slave is refused. Only meaningful for slaves.
    pub(crate) locked: bool,
    pub(crate) mode: InodeMode,
    pub(crate) uid: Uid,
    pub(crate) gid: Gid,
}

impl PtyState {
    pub(crate) fn new() -> Self {
        Self {
            other: None,
            locked: false,
            mode: InodeMode::empty(),
            uid: Uid::new_root(),
            gid: Gid::new_root(),
        }
    }

    /// Returns the other side of the pseudoterminal, if it is still linked.
    ///
    /// On a slave, this may create the last reference to the master. Dropping it while the slave
    /// lock is held deadlocks in the master cleanup.
    #[cfg(test)]
    pub(crate) fn other(&self) -> Option<Arc<Tty>> {
        match self.other.as_ref()? {
            PtyPeer::Slave(slave) => Some(slave.clone()),
            PtyPeer::Master(master) => master.upgrade(),
        }
    }

    /// Returns whether the other side is linked and alive.
    ///
    /// This never creates a reference to the other side, so it is safe to call while holding the
    /// per-terminal lock.
    pub fn has_other(&self) -> bool {
        match self.other.as_ref() {
            Some(PtyPeer::Slave(_)) => true,
            Some(PtyPeer::Master(master)) => master.strong_count() > 0,
            None => false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn mode(&self) -> InodeMode {
        self.mode
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn gid(&self) -> Gid {
        self.gid
    }

    pub(super) fn slave(&self) -> Option<Arc<Tty>> {
        match self.other.as_ref()? {
            PtyPeer::Slave(slave) => Some(slave.clone()),
            PtyPeer::Master(_) => None,
        }
    }

    pub(super) fn master(&self) -> Option<Arc<Tty>> {
        match self.other.as_ref()? {
            PtyPeer::Master(master) => master.upgrade(),
            PtyPeer::Slave(_) => None,
        }
    }
}

/// The ownership and permissions given to newly created slaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtyAttrs {
    pub mode: InodeMode,
    pub uid: Uid,
    pub gid: Gid,
}

impl Default for PtyAttrs {
    fn default() -> Self {
        Self {
            mode: InodeMode::from_bits_truncate(0o620),
            uid: Uid::new_root(),
            gid: Gid::new_root(),
        }
    }
}

/// The master driver and the slave driver of a set of pseudoterminals.
///
/// The terminal table of the slave driver is the registry of live pty numbers: a number is in use
/// if and only if a live slave is registered under it.
pub struct PtyDrivers {
    master: Arc<TtyDriver>,
    slave: Arc<TtyDriver>,
}

impl PtyDrivers {
    pub fn new(capacity: usize, attrs: PtyAttrs) -> Self {
        let slave = TtyDriver::new(PTY_SLAVE_MAJOR, capacity, Arc::new(PtySlaveOps));
        let master = TtyDriver::new(
            PTY_MASTER_MAJOR,
            capacity,
            Arc::new(PtyMasterOps::new(slave.clone(), attrs)),
        );
        Self { master, slave }
    }

    pub fn master(&self) -> &Arc<TtyDriver> {
        &self.master
    }

    pub fn slave(&self) -> &Arc<TtyDriver> {
        &self.slave
    }

    pub fn capacity(&self) -> usize {
        self.slave.capacity()
    }

    /// Returns whether the pty numbered `index` exists.
    pub fn slave_exists(&self, index: u32) -> bool {
        self.slave.contains(index)
    }

    /// Returns the slave numbered `index`, if it exists.
    pub fn lookup_slave(&self, index: u32) -> Option<Arc<Tty>> {
        self.slave.lookup(index)
    }

    /// Opens the slave numbered `index`.
    ///
    /// This is what opening `/dev/pts/<index>` does. It fails with `ENXIO` if `index` is not below
    /// the capacity. It fails with `EIO` if the slave does not exist, if its master has gone, or if
    /// it is still locked.
    pub fn open_slave(&self, index: u32) -> Result<Arc<TtyFile>> {
        let slave = self.slave.get(index)?;
        Ok(TtyFile::new(slave))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fs::utils::IoctlCmd;

    fn new_pair(drivers: &PtyDrivers, index: u32) -> (Arc<Tty>, Arc<Tty>) {
        let master = drivers.master().get(index).unwrap();
        let slave = drivers.lookup_slave(index).unwrap();
        (master, slave)
    }

    fn unlock(master: &Tty) {
        let mut arg = 0;
        master.ioctl(IoctlCmd::TIOCSPTLCK as u32, &mut arg).unwrap();
    }

    #[test]
    fn pairing_is_bidirectional() {
        let drivers = PtyDrivers::new(MAX_PTY_NUM, PtyAttrs::default());
        let (master, slave) = new_pair(&drivers, 0);

        let peer_of_master = master.lock().pty().other().unwrap();
        let peer_of_slave = slave.lock().pty().other().unwrap();
        assert!(Arc::ptr_eq(&peer_of_master, &slave));
        assert!(Arc::ptr_eq(&peer_of_slave, &master));

        assert_eq!(slave.index(), master.index());
        assert_eq!(slave.driver().major(), PTY_SLAVE_MAJOR);
        assert_eq!(master.driver().major(), PTY_MASTER_MAJOR);
        assert!(slave.lock().pty().is_locked());
    }

    #[test]
    fn slave_starts_with_configured_attrs() {
        let attrs = PtyAttrs {
            mode: InodeMode::from_bits_truncate(0o600),
            uid: Uid::new(1000),
            gid: Gid::new(5),
        };
        let drivers = PtyDrivers::new(4, attrs);
        let (_master, slave) = new_pair(&drivers, 2);

        let state = slave.lock();
        assert_eq!(state.pty().mode(), attrs.mode);
        assert_eq!(state.pty().uid(), attrs.uid);
        assert_eq!(state.pty().gid(), attrs.gid);
    }

    #[test]
    fn master_cleanup_unlinks_slave() {
        let drivers = PtyDrivers::new(4, PtyAttrs::default());
        let (master, slave) = new_pair(&drivers, 1);
        unlock(&master);

        drop(master);

        let state = slave.lock();
        assert!(state.pty().other().is_none());
        assert!(!state.pty().has_other());
        assert!(state.is_hung_up());
    }

    #[test]
    fn slave_is_freed_with_its_master() {
        let drivers = PtyDrivers::new(4, PtyAttrs::default());
        let master = drivers.master().get(0).unwrap();
        assert!(drivers.slave_exists(0));

        drop(master);
        assert!(!drivers.slave_exists(0));
        assert!(!drivers.master().contains(0));
    }

    #[test]
    fn slave_cannot_be_created_directly() {
        let drivers = PtyDrivers::new(4, PtyAttrs::default());
        assert_eq!(drivers.slave().get(0).unwrap_err().error(), Errno::EIO);
        assert_eq!(drivers.open_slave(3).unwrap_err().error(), Errno::EIO);
        assert_eq!(drivers.open_slave(4).unwrap_err().error(), Errno::ENXIO);
        assert!(!drivers.slave_exists(0));
    }
}
