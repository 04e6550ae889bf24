// SPDX-License-Identifier: MPL-2.0

use super::Tty;
use crate::{prelude::*, util::slot_table::SlotTable};

/// The operations of a TTY driver.
///
/// The generic terminal layer calls these hooks on the terminals that belong to the driver. The
/// hooks that a driver does not support fall back to the defaults below.
pub trait TtyDriverOps: Send + Sync + 'static {
    /// Initializes a terminal that has just been allocated.
    ///
    /// If this method fails, the terminal is discarded without being registered.
    fn init(&self, tty: &Arc<Tty>) -> Result<()>;

    /// Admits a new opener of an existing terminal.
    fn open(&self, _tty: &Arc<Tty>) -> Result<()> {
        Ok(())
    }

    /// Writes characters from the user of the terminal.
    fn write(&self, tty: &Tty, buf: &[u8], blocking: bool) -> Result<usize>;

    /// Performs a control request.
    fn ioctl(&self, _tty: &Tty, _cmd: u32, _arg: &mut u32) -> Result<i32> {
        return_errno_with_message!(Errno::ENOTTY, "the driver does not support ioctl");
    }

    /// Tears down a terminal whose last reference has been dropped.
    fn cleanup(&self, _tty: &Tty) {}
}

/// A TTY driver together with the table of its live terminals.
pub struct TtyDriver {
    major: u32,
    ops: Arc<dyn TtyDriverOps>,
    /// The terminals of this driver, indexed by their numbers.
    ///
    /// The table does not own the terminals. A slot is occupied only while its terminal is alive.
    ttys: SpinLock<SlotTable<Weak<Tty>>>,
}

impl TtyDriver {
    pub fn new(major: u32, capacity: usize, ops: Arc<dyn TtyDriverOps>) -> Arc<Self> {
        Arc::new(Self {
            major,
            ops,
            ttys: SpinLock::new(SlotTable::new(capacity)),
        })
    }

    /// Returns the major device number of the terminals of this driver.
    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn capacity(&self) -> usize {
        self.ttys.lock().capacity()
    }

    pub fn ops(&self) -> &dyn TtyDriverOps {
        self.ops.as_ref()
    }

    /// Acquires the lock of the terminal table.
    pub fn lock_ttys(&self) -> SpinLockGuard<'_, SlotTable<Weak<Tty>>> {
        self.ttys.lock()
    }

    /// Returns the live terminal numbered `index`, if any.
    pub fn lookup(&self, index: u32) -> Option<Arc<Tty>> {
        self.ttys.lock().get(index as usize).and_then(Weak::upgrade)
    }

    /// Returns whether a live terminal is numbered `index`.
    pub fn contains(&self, index: u32) -> bool {
        self.ttys
            .lock()
            .get(index as usize)
            .is_some_and(|tty| tty.strong_count() > 0)
    }

    /// Gets the terminal numbered `index`.
    ///
    /// If the terminal is alive, it is admitted through [`TtyDriverOps::open`]. Otherwise, a new
    /// terminal is allocated, initialized through [`TtyDriverOps::init`] and registered. The table
    /// lock is held across the initialization, so a number is never initialized twice at once.
    pub fn get(self: &Arc<Self>, index: u32) -> Result<Arc<Tty>> {
        let mut ttys = self.ttys.lock();
        if index as usize >= ttys.capacity() {
            return_errno_with_message!(Errno::ENXIO, "the terminal number is out of range");
        }

        if let Some(tty) = ttys.get(index as usize).and_then(Weak::upgrade) {
            drop(ttys);
            self.ops.open(&tty)?;
            return Ok(tty);
        }

        let tty = Tty::new(index, self.clone());
        if let Err(err) = self.ops.init(&tty) {
            drop(ttys);
            drop(tty);
            return Err(err);
        }
        ttys.put(index as usize, Arc::downgrade(&tty));
        Ok(tty)
    }
}
