// SPDX-License-Identifier: MPL-2.0

//! Terminal objects.
//!
//! A [`Tty`] is the object a TTY driver works on: it has a number, a lock over its driver state,
//! an input queue that the driver (or the peer of a pseudoterminal) writes into, and a list of the
//! files that are currently open on it. The behavior of a particular kind of terminal lives in its
//! driver (see [`TtyDriverOps`]).

use crate::{
    device::pty::PtyState,
    fs::utils::InodeMode,
    prelude::*,
    process::{Gid, Uid},
};

mod driver;
mod file;
mod queue;

pub use driver::{TtyDriver, TtyDriverOps};
pub use file::TtyFile;
pub(crate) use queue::InputQueue;

/// The capacity of the input queue of a terminal.
pub const IO_CAPACITY: usize = 4096;

pub struct Tty {
    index: u32,
    driver: Arc<TtyDriver>,
    state: SpinLock<TtyState>,
    input: Arc<InputQueue>,
    /// The files opened on this terminal.
    ///
    /// This is protected by its own lock so that attaching a file never contends with the driver
    /// state.
    files: SpinLock<Vec<Weak<TtyFile>>>,
}

/// The state of a [`Tty`] that is protected by the per-terminal lock.
pub struct TtyState {
    pub(crate) pty: PtyState,
    hung_up: bool,
}

impl TtyState {
    pub fn pty(&self) -> &PtyState {
        &self.pty
    }

    pub fn is_hung_up(&self) -> bool {
        self.hung_up
    }
}

impl Tty {
    pub(crate) fn new(index: u32, driver: Arc<TtyDriver>) -> Arc<Self> {
        Arc::new(Self {
            index,
            driver,
            state: SpinLock::new(TtyState {
                pty: PtyState::new(),
                hung_up: false,
            }),
            input: Arc::new(InputQueue::new(IO_CAPACITY)),
            files: SpinLock::new(Vec::new()),
        })
    }

    /// Returns the number of the terminal, which is also its minor device number.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn driver(&self) -> &Arc<TtyDriver> {
        &self.driver
    }

    /// Acquires the per-terminal lock.
    pub fn lock(&self) -> SpinLockGuard<'_, TtyState> {
        self.state.lock()
    }

    /// Pushes characters into the input queue of the terminal.
    ///
    /// This method returns the number of bytes pushed. If the queue is full, it either waits for
    /// room (if `blocking` is true) or fails with `EAGAIN`.
    pub fn push_input(&self, chs: &[u8], blocking: bool) -> Result<usize> {
        self.input.push(chs, blocking)
    }

    /// Reads characters from the input queue of the terminal.
    ///
    /// Once the terminal has been hung up and the queue is drained, this returns `Ok(0)`.
    pub fn read(&self, buf: &mut [u8], blocking: bool) -> Result<usize> {
        self.input.pop(buf, blocking)
    }

    /// Returns the input queue of the terminal.
    ///
    /// Holding the queue does not keep the terminal alive.
    pub(crate) fn input(&self) -> &Arc<InputQueue> {
        &self.input
    }

    /// Returns the number of bytes waiting in the input queue.
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// Writes characters through the driver.
    pub fn write(&self, buf: &[u8], blocking: bool) -> Result<usize> {
        self.driver.ops().write(self, buf, blocking)
    }

    /// Performs a control request through the driver.
    pub fn ioctl(&self, cmd: u32, arg: &mut u32) -> Result<i32> {
        self.driver.ops().ioctl(self, cmd, arg)
    }

    /// Hangs up the terminal.
    ///
    /// Every file open on the terminal is marked as hung up, and the threads waiting on the input
    /// queue are woken up. The caller must hold the per-terminal lock, whose guard is `state`.
    pub fn hangup(&self, state: &mut TtyState) {
        state.hung_up = true;
        self.input.close();

        let files: Vec<Arc<TtyFile>> = self
            .files
            .lock()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for file in files.iter() {
            file.hang_up();
        }
        trace!("tty {} hung up, {} file(s) affected", self.index, files.len());
    }

    pub fn is_hung_up(&self) -> bool {
        self.lock().hung_up
    }

    /// Registers a file on the descriptor list of the terminal.
    pub(super) fn add_file(&self, file: &Arc<TtyFile>) {
        let mut files = self.files.lock();
        files.retain(|file| file.strong_count() > 0);
        files.push(Arc::downgrade(file));
    }

    /// Returns the number of files that are open on the terminal.
    pub fn nr_files(&self) -> usize {
        self.files
            .lock()
            .iter()
            .filter(|file| file.strong_count() > 0)
            .count()
    }

    pub fn set_mode(&self, mode: InodeMode) {
        self.lock().pty.mode = mode;
    }

    pub fn set_owner(&self, uid: Uid) {
        self.lock().pty.uid = uid;
    }

    pub fn set_group(&self, gid: Gid) {
        self.lock().pty.gid = gid;
    }
}

impl core::fmt::Debug for Tty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tty")
            .field("index", &self.index)
            .field("major", &self.driver.major())
            .finish_non_exhaustive()
    }
}

impl Drop for Tty {
    fn drop(&mut self) {
        self.driver.ops().cleanup(self);
    }
}
