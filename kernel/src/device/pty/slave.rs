// SPDX-License-Identifier: MPL-2.0

use crate::{
    device::tty::{Tty, TtyDriverOps},
    prelude::*,
};

/// The driver of pseudoterminal slaves.
pub(super) struct PtySlaveOps;

impl TtyDriverOps for PtySlaveOps {
    fn init(&self, _slave: &Arc<Tty>) -> Result<()> {
        // Slaves are only created by their masters.
        return_errno_with_message!(Errno::EIO, "the pty slave does not exist");
    }

    fn open(&self, slave: &Arc<Tty>) -> Result<()> {
        let state = slave.lock();
        if !state.pty.has_other() {
            return_errno_with_message!(Errno::EIO, "the pty master has been closed");
        }
        if state.pty.is_locked() {
            return_errno_with_message!(Errno::EIO, "the pty slave is locked");
        }
        Ok(())
    }

    fn write(&self, slave: &Tty, buf: &[u8], blocking: bool) -> Result<usize> {
        let input = {
            let master = slave
                .lock()
                .pty
                .master()
                .ok_or(Error::with_message(Errno::EIO, "the pty master has been closed"))?;
            master.input().clone()
        };
        // Push without holding the master. Its cleanup closes the queue, which wakes a blocked
        // push with `EIO`.
        input.push(buf, blocking)
    }
}

#[cfg(test)]
mod test {
    use std::{thread, time::Duration};

    use super::*;
    use crate::{
        device::{
            pty::{MAX_PTY_NUM, PtyAttrs, PtyDrivers},
            tty::IO_CAPACITY,
        },
        fs::utils::IoctlCmd,
    };

    fn unlocked_pair(drivers: &PtyDrivers, index: u32) -> Arc<Tty> {
        let master = drivers.master().get(index).unwrap();
        let mut arg = 0;
        master.ioctl(IoctlCmd::TIOCSPTLCK as u32, &mut arg).unwrap();
        master
    }

    #[test]
    fn locked_slave_cannot_be_opened() {
        let drivers = PtyDrivers::new(MAX_PTY_NUM, PtyAttrs::default());
        let master = drivers.master().get(0).unwrap();

        assert_eq!(drivers.open_slave(0).unwrap_err().error(), Errno::EIO);

        let mut arg = 0;
        master.ioctl(IoctlCmd::TIOCSPTLCK as u32, &mut arg).unwrap();
        let file = drivers.open_slave(0).unwrap();
        assert_eq!(file.tty().index(), 0);
    }

    #[test]
    fn write_reaches_master_input() {
        let drivers = PtyDrivers::new(MAX_PTY_NUM, PtyAttrs::default());
        let master = unlocked_pair(&drivers, 3);
        let slave_file = drivers.open_slave(3).unwrap();

        assert_eq!(slave_file.write(b"$ "), Ok(2));
        let mut buf = [0u8; 4];
        assert_eq!(master.read(&mut buf, false), Ok(2));
        assert_eq!(&buf[..2], b"$ ");
    }

    #[test]
    fn slave_ioctl_is_unsupported() {
        let drivers = PtyDrivers::new(MAX_PTY_NUM, PtyAttrs::default());
        let _master = unlocked_pair(&drivers, 0);
        let slave_file = drivers.open_slave(0).unwrap();

        let mut arg = 0;
        let error = slave_file
            .ioctl(IoctlCmd::TIOCGPTN as u32, &mut arg)
            .unwrap_err();
        assert_eq!(error.error(), Errno::ENOTTY);
    }

    #[test]
    fn orphaned_slave() {
        let drivers = PtyDrivers::new(MAX_PTY_NUM, PtyAttrs::default());
        let master = unlocked_pair(&drivers, 1);
        let slave_file = drivers.open_slave(1).unwrap();
        let slave = slave_file.tty().clone();

        drop(master);

        // The open file sees the hang-up.
        assert!(slave_file.is_hung_up());
        let mut buf = [0u8; 4];
        assert_eq!(slave_file.read(&mut buf), Ok(0));
        assert_eq!(slave_file.write(b"x").unwrap_err().error(), Errno::EIO);

        // The slave itself can neither be reopened nor reach its master.
        assert_eq!(drivers.open_slave(1).unwrap_err().error(), Errno::EIO);
        assert_eq!(slave.write(b"x", false).unwrap_err().error(), Errno::EIO);
    }

    #[test]
    fn blocked_writer_does_not_keep_master_alive() {
        let drivers = PtyDrivers::new(MAX_PTY_NUM, PtyAttrs::default());
        let master = unlocked_pair(&drivers, 0);
        let slave_file = drivers.open_slave(0).unwrap();

        // Fill up the input queue of the master.
        assert_eq!(slave_file.write(&[b'x'; IO_CAPACITY]), Ok(IO_CAPACITY));

        let writer = {
            let slave_file = slave_file.clone();
            thread::spawn(move || slave_file.write(b"y"))
        };
        thread::sleep(Duration::from_millis(20));

        drop(master);
        assert_eq!(writer.join().unwrap().unwrap_err().error(), Errno::EIO);
        assert!(slave_file.is_hung_up());
        assert!(!drivers.master().contains(0));

        drop(slave_file);
        assert!(!drivers.slave_exists(0));
    }

    #[test]
    fn open_races_with_master_teardown() {
        let drivers = Arc::new(PtyDrivers::new(4, PtyAttrs::default()));

        for _ in 0..64 {
            let master = unlocked_pair(&drivers, 2);

            let opener = {
                let drivers = drivers.clone();
                thread::spawn(move || {
                    for _ in 0..256 {
                        match drivers.open_slave(2) {
                            Ok(file) => drop(file),
                            Err(error) => assert_eq!(error.error(), Errno::EIO),
                        }
                    }
                })
            };

            drop(master);
            opener.join().unwrap();

            assert_eq!(drivers.open_slave(2).unwrap_err().error(), Errno::EIO);
            assert!(!drivers.slave_exists(2));
        }
    }
}
