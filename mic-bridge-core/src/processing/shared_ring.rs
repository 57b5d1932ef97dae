//! Cross-thread wrapper around [`SampleRing`]: one mutex guarding the
//! cursors and contents, one condvar for the demand-driven consumer wait,
//! and a shutdown flag so teardown can never strand a blocked reader.

use parking_lot::{Condvar, Mutex};

use crate::models::error::BridgeError;
use crate::processing::ring_buffer::SampleRing;

struct Inner {
    ring: SampleRing,
    closed: bool,
}

/// Producer/consumer channel over a fixed-capacity sample ring.
///
/// The producer calls [`push`](Self::push) from the audio callback; the
/// critical section covers one converted frame batch and nothing else.
/// The consumer calls [`pop_blocking`](Self::pop_blocking), suspending on
/// the condvar while the ring is empty and re-validating on every wake.
pub struct SharedRing {
    inner: Mutex<Inner>,
    data_ready: Condvar,
}

impl SharedRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                ring: SampleRing::new(capacity),
                closed: false,
            }),
            data_ready: Condvar::new(),
        }
    }

    /// Producer side: write one converted frame batch and wake a waiting
    /// consumer. Never blocks on buffer state.
    ///
    /// Returns the number of unread samples lost to overrun.
    pub fn push(&self, samples: &[i16]) -> usize {
        let lost = {
            let mut inner = self.inner.lock();
            inner.ring.push(samples)
        };
        self.data_ready.notify_one();
        lost
    }

    /// Consumer side: block until at least one sample is available, then
    /// copy up to `dest.len()` samples in production order.
    ///
    /// Returns `Err(BridgeError::Stopped)` once the channel is closed and
    /// drained, so a reader blocked across `end`/`terminate` wakes up
    /// instead of waiting forever.
    pub fn pop_blocking(&self, dest: &mut [i16]) -> Result<usize, BridgeError> {
        let mut inner = self.inner.lock();
        loop {
            if !inner.ring.is_empty() {
                return Ok(inner.ring.pop(dest));
            }
            if inner.closed {
                return Err(BridgeError::Stopped);
            }
            self.data_ready.wait(&mut inner);
        }
    }

    /// Close the channel and wake every blocked reader.
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.data_ready.notify_all();
    }

    /// Re-open a closed channel (resume after terminate).
    pub fn reopen(&self) {
        self.inner.lock().closed = false;
    }

    /// Discard all unread samples.
    pub fn clear(&self) {
        self.inner.lock().ring.clear();
    }

    /// Unread sample count.
    pub fn len(&self) -> usize {
        self.inner.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().ring.is_empty()
    }

    /// Cumulative overrun loss.
    pub fn lost_samples(&self) -> u64 {
        self.inner.lock().ring.lost_samples()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn pop_returns_immediately_when_data_exists() {
        let ring = SharedRing::new(16);
        ring.push(&[1, 2, 3]);

        let mut out = [0i16; 8];
        assert_eq!(ring.pop_blocking(&mut out), Ok(3));
        assert_eq!(&out[..3], &[1, 2, 3]);
    }

    #[test]
    fn empty_pop_blocks_until_push() {
        let ring = Arc::new(SharedRing::new(16));

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                ring.push(&[7, 8]);
            })
        };

        let mut out = [0i16; 4];
        let got = ring.pop_blocking(&mut out).unwrap();
        assert!(got >= 1);
        assert_eq!(out[0], 7);

        producer.join().unwrap();
    }

    #[test]
    fn close_wakes_blocked_reader_with_stopped() {
        let ring = Arc::new(SharedRing::new(16));

        let reader = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                let mut out = [0i16; 4];
                ring.pop_blocking(&mut out)
            })
        };

        thread::sleep(Duration::from_millis(50));
        ring.close();

        assert_eq!(reader.join().unwrap(), Err(BridgeError::Stopped));
    }

    #[test]
    fn closed_channel_still_drains_buffered_data() {
        let ring = SharedRing::new(16);
        ring.push(&[1, 2]);
        ring.close();

        let mut out = [0i16; 4];
        assert_eq!(ring.pop_blocking(&mut out), Ok(2));
        assert_eq!(ring.pop_blocking(&mut out), Err(BridgeError::Stopped));
    }

    #[test]
    fn reopen_restores_blocking_reads() {
        let ring = SharedRing::new(16);
        ring.close();
        ring.reopen();
        ring.push(&[5]);

        let mut out = [0i16; 1];
        assert_eq!(ring.pop_blocking(&mut out), Ok(1));
        assert_eq!(out[0], 5);
    }

    #[test]
    fn ordering_survives_producer_thread_handoff() {
        let ring = Arc::new(SharedRing::new(1024));

        let producer = {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for chunk in (0..600i16).collect::<Vec<_>>().chunks(60) {
                    ring.push(chunk);
                    thread::sleep(Duration::from_millis(1));
                }
            })
        };

        let mut received = Vec::new();
        let mut out = [0i16; 128];
        while received.len() < 600 {
            let n = ring.pop_blocking(&mut out).unwrap();
            received.extend_from_slice(&out[..n]);
        }
        producer.join().unwrap();

        assert_eq!(received, (0..600i16).collect::<Vec<_>>());
        assert_eq!(ring.lost_samples(), 0);
    }
}
