// SPDX-License-Identifier: MPL-2.0

use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
};

use crate::prelude::*;

/// A bounded byte queue with blocking and non-blocking access.
///
/// Blocking callers sleep on a condition variable until the queue becomes readable or writable.
pub(crate) struct InputQueue {
    inner: Mutex<Inner>,
    readable: Condvar,
    writable: Condvar,
}

struct Inner {
    buf: VecDeque<u8>,
    capacity: usize,
    closed: bool,
}

impl InputQueue {
    pub(super) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                buf: VecDeque::with_capacity(capacity),
                capacity,
                closed: false,
            }),
            readable: Condvar::new(),
            writable: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn push(&self, chs: &[u8], blocking: bool) -> Result<usize> {
        if chs.is_empty() {
            return Ok(0);
        }

        let mut inner = self.lock();
        loop {
            if inner.closed {
                return_errno_with_message!(Errno::EIO, "the terminal has been hung up");
            }

            let room = inner.capacity - inner.buf.len();
            if room > 0 {
                let len = room.min(chs.len());
                inner.buf.extend(&chs[..len]);
                self.readable.notify_all();
                return Ok(len);
            }

            if !blocking {
                return_errno_with_message!(Errno::EAGAIN, "the input queue is full");
            }
            inner = self
                .writable
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(super) fn pop(&self, buf: &mut [u8], blocking: bool) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut inner = self.lock();
        loop {
            if !inner.buf.is_empty() {
                let len = inner.buf.len().min(buf.len());
                for (dst, src) in buf.iter_mut().zip(inner.buf.drain(..len)) {
                    *dst = src;
                }
                self.writable.notify_all();
                return Ok(len);
            }

            if inner.closed {
                return Ok(0);
            }
            if !blocking {
                return_errno!(Errno::EAGAIN);
            }
            inner = self
                .readable
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub(super) fn len(&self) -> usize {
        self.lock().buf.len()
    }

    /// Closes the queue and wakes up every waiter.
    ///
    /// Queued bytes can still be read; new bytes are refused with `EIO`.
    pub(crate) fn close(&self) {
        self.lock().closed = true;
        self.readable.notify_all();
        self.writable.notify_all();
    }
}

#[cfg(test)]
mod test {
    use std::{thread, time::Duration};

    use super::*;

    #[test]
    fn push_and_pop_preserve_order() {
        let queue = InputQueue::new(16);
        assert_eq!(queue.push(b"hello", false), Ok(5));
        assert_eq!(queue.push(b", world", false), Ok(7));
        assert_eq!(queue.len(), 12);

        let mut buf = [0u8; 32];
        assert_eq!(queue.pop(&mut buf, false), Ok(12));
        assert_eq!(&buf[..12], b"hello, world");
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn partial_push_when_nearly_full() {
        let queue = InputQueue::new(4);
        assert_eq!(queue.push(b"abcdef", false), Ok(4));
        assert_eq!(
            queue.push(b"g", false).unwrap_err().error(),
            Errno::EAGAIN
        );

        let mut buf = [0u8; 2];
        assert_eq!(queue.pop(&mut buf, false), Ok(2));
        assert_eq!(&buf, b"ab");
        assert_eq!(queue.push(b"xyz", false), Ok(2));
    }

    #[test]
    fn empty_queue_nonblocking_read() {
        let queue = InputQueue::new(4);
        let mut buf = [0u8; 4];
        assert_eq!(queue.pop(&mut buf, false).unwrap_err().error(), Errno::EAGAIN);
        assert_eq!(queue.pop(&mut [], false), Ok(0));
        assert_eq!(queue.push(&[], false), Ok(0));
    }

    #[test]
    fn close_drains_then_eof() {
        let queue = InputQueue::new(8);
        queue.push(b"bye", false).unwrap();
        queue.close();

        assert_eq!(queue.push(b"!", true).unwrap_err().error(), Errno::EIO);
        let mut buf = [0u8; 8];
        assert_eq!(queue.pop(&mut buf, true), Ok(3));
        assert_eq!(queue.pop(&mut buf, true), Ok(0));
    }

    #[test]
    fn blocking_push_waits_for_reader() {
        let queue = Arc::new(InputQueue::new(2));
        queue.push(b"ab", false).unwrap();

        let writer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(b"c", true))
        };
        thread::sleep(Duration::from_millis(20));

        let mut buf = [0u8; 1];
        assert_eq!(queue.pop(&mut buf, true), Ok(1));
        assert_eq!(writer.join().unwrap(), Ok(1));

        let mut buf = [0u8; 4];
        assert_eq!(queue.pop(&mut buf, true), Ok(2));
        assert_eq!(&buf[..2], b"bc");
    }

    #[test]
    fn close_wakes_blocked_reader() {
        let queue = Arc::new(InputQueue::new(2));
        let reader = {
            let queue = queue.clone();
            thread::spawn(move || {
                let mut buf = [0u8; 2];
                queue.pop(&mut buf, true)
            })
        };
        thread::sleep(Duration::from_millis(20));
        queue.close();
        assert_eq!(reader.join().unwrap(), Ok(0));
    }
}
