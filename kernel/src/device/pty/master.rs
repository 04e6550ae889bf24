// SPDX-License-Identifier: MPL-2.0

use super::{PtyAttrs, PtyPeer};
use crate::{
    device::tty::{Tty, TtyDriver, TtyDriverOps},
    fs::utils::IoctlCmd,
    prelude::*,
};

/// The driver of pseudoterminal masters.
pub(super) struct PtyMasterOps {
    slave_driver: Arc<TtyDriver>,
    attrs: PtyAttrs,
}

impl PtyMasterOps {
    pub(super) fn new(slave_driver: Arc<TtyDriver>, attrs: PtyAttrs) -> Self {
        Self {
            slave_driver,
            attrs,
        }
    }

    fn slave_of(master: &Tty) -> Result<Arc<Tty>> {
        master
            .lock()
            .pty
            .slave()
            .ok_or(Error::with_message(Errno::EIO, "the pty master has no slave"))
    }
}

impl TtyDriverOps for PtyMasterOps {
    fn init(&self, master: &Arc<Tty>) -> Result<()> {
        let index = master.index();

        let mut slaves = self.slave_driver.lock_ttys();
        // The number was free when ptmx scanned the table, but the table lock was released since.
        if slaves
            .get(index as usize)
            .is_some_and(|slave| slave.strong_count() > 0)
        {
            warn!("pty index {} was taken by a concurrent allocation", index);
            return_errno_with_message!(Errno::EIO, "the pty slave is still in use");
        }

        let slave = Tty::new(index, self.slave_driver.clone());
        {
            let mut state = slave.lock();
            state.pty.other = Some(PtyPeer::Master(Arc::downgrade(master)));
            state.pty.locked = true;
            state.pty.mode = self.attrs.mode;
            state.pty.uid = self.attrs.uid;
            state.pty.gid = self.attrs.gid;
        }
        slaves.put(index as usize, Arc::downgrade(&slave));
        drop(slaves);

        master.lock().pty.other = Some(PtyPeer::Slave(slave));
        debug!("pty index = {}", index);
        Ok(())
    }

    fn open(&self, _master: &Arc<Tty>) -> Result<()> {
        return_errno_with_message!(
            Errno::EIO,
            "a pty master can only be allocated by opening ptmx"
        );
    }

    fn write(&self, master: &Tty, buf: &[u8], blocking: bool) -> Result<usize> {
        let slave = Self::slave_of(master)?;
        slave.push_input(buf, blocking)
    }

    fn ioctl(&self, master: &Tty, cmd: u32, arg: &mut u32) -> Result<i32> {
        let cmd = IoctlCmd::try_from(cmd)?;
        let slave = Self::slave_of(master)?;

        match cmd {
            IoctlCmd::TIOCSPTLCK => {
                slave.lock().pty.locked = *arg != 0;
            }
            IoctlCmd::TIOCGPTN => {
                *arg = slave.index();
            }
            IoctlCmd::TIOCGPTLCK => {
                *arg = slave.lock().pty.locked as u32;
            }
        }

        Ok(0)
    }

    fn cleanup(&self, master: &Tty) {
        let slave = match master.lock().pty.other.take() {
            Some(PtyPeer::Slave(slave)) => slave,
            _ => return,
        };
        // Unlink the slave from the master first. From now on, slave-side operations see no
        // master and fail, instead of racing with the rest of the teardown.
        slave.lock().pty.other = None;

        // Wake up the slave-side writers that are blocked on the input queue of the master.
        master.input().close();

        {
            let mut state = slave.lock();
            slave.hangup(&mut state);
        }

        debug!("pty index = {} closed", slave.index());
        // Release the counted reference. Unless someone still has the slave open, this frees the
        // pty number.
        drop(slave);
    }
}
