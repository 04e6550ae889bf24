// SPDX-License-Identifier: MPL-2.0

use core::sync::atomic::{AtomicBool, Ordering};

use super::Tty;
use crate::prelude::*;

/// A file opened on a terminal.
///
/// The file holds a reference to the terminal, so the terminal lives at least as long as the file.
/// Once the terminal is hung up, the file turns into a dead end: reads see end-of-file, and writes
/// and control requests fail with `EIO`.
pub struct TtyFile {
    tty: Arc<Tty>,
    is_nonblocking: AtomicBool,
    is_hung_up: AtomicBool,
}

impl TtyFile {
    /// Attaches a new file to `tty` and registers it on the descriptor list of `tty`.
    pub fn new(tty: Arc<Tty>) -> Arc<Self> {
        let file = Arc::new(Self {
            tty,
            is_nonblocking: AtomicBool::new(false),
            is_hung_up: AtomicBool::new(false),
        });
        file.tty.add_file(&file);
        file
    }

    pub fn tty(&self) -> &Arc<Tty> {
        &self.tty
    }

    pub fn set_nonblocking(&self, is_nonblocking: bool) {
        self.is_nonblocking.store(is_nonblocking, Ordering::Relaxed);
    }

    pub fn is_nonblocking(&self) -> bool {
        self.is_nonblocking.load(Ordering::Relaxed)
    }

    pub fn is_hung_up(&self) -> bool {
        self.is_hung_up.load(Ordering::Acquire)
    }

    pub(super) fn hang_up(&self) {
        self.is_hung_up.store(true, Ordering::Release);
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize> {
        if self.is_hung_up() {
            return Ok(0);
        }
        self.tty.read(buf, !self.is_nonblocking())
    }

    pub fn write(&self, buf: &[u8]) -> Result<usize> {
        if self.is_hung_up() {
            return_errno_with_message!(Errno::EIO, "the terminal has been hung up");
        }
        self.tty.write(buf, !self.is_nonblocking())
    }

    pub fn ioctl(&self, cmd: u32, arg: &mut u32) -> Result<i32> {
        if self.is_hung_up() {
            return_errno_with_message!(Errno::EIO, "the terminal has been hung up");
        }
        self.tty.ioctl(cmd, arg)
    }
}

impl core::fmt::Debug for TtyFile {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TtyFile")
            .field("tty", &self.tty)
            .field("is_hung_up", &self.is_hung_up())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::device::tty::{TtyDriver, TtyDriverOps};

    struct EchoOps;

    impl TtyDriverOps for EchoOps {
        fn init(&self, _tty: &Arc<Tty>) -> Result<()> {
            Ok(())
        }

        fn write(&self, tty: &Tty, buf: &[u8], blocking: bool) -> Result<usize> {
            tty.push_input(buf, blocking)
        }
    }

    #[test]
    fn files_are_registered_and_hung_up() {
        let driver = TtyDriver::new(4, 4, Arc::new(EchoOps));
        let tty = driver.get(0).unwrap();

        let file = TtyFile::new(tty.clone());
        let other = TtyFile::new(tty.clone());
        assert_eq!(tty.nr_files(), 2);
        drop(other);
        assert_eq!(tty.nr_files(), 1);

        assert_eq!(file.write(b"hi"), Ok(2));
        let mut buf = [0u8; 2];
        assert_eq!(file.read(&mut buf), Ok(2));
        assert_eq!(&buf, b"hi");

        {
            let mut state = tty.lock();
            tty.hangup(&mut state);
        }
        assert!(tty.is_hung_up());
        assert!(file.is_hung_up());
        assert_eq!(file.read(&mut buf), Ok(0));
        assert_eq!(file.write(b"x").unwrap_err().error(), Errno::EIO);
        let mut arg = 0;
        assert_eq!(file.ioctl(0, &mut arg).unwrap_err().error(), Errno::EIO);
    }

    #[test]
    fn nonblocking_read_of_empty_tty() {
        let driver = TtyDriver::new(4, 4, Arc::new(EchoOps));
        let file = TtyFile::new(driver.get(1).unwrap());
        file.set_nonblocking(true);
        assert!(file.is_nonblocking());

        let mut buf = [0u8; 4];
        assert_eq!(file.read(&mut buf).unwrap_err().error(), Errno::EAGAIN);
    }
}
