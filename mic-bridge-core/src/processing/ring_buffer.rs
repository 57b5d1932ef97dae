/// Fixed-capacity circular buffer of converted fixed-point samples.
///
/// The synchronization point between the producer callback and the
/// consumer read path. Not thread-safe on its own; wrap in
/// [`SharedRing`](super::shared_ring::SharedRing) for cross-thread use.
///
/// Overrun behavior: the producer must never stall, so a write that
/// catches up with the unread region overwrites the oldest samples.
/// Every `push` reports how many unread samples it destroyed, and a
/// cumulative counter keeps the loss observable.
#[derive(Debug)]
pub struct SampleRing {
    buffer: Vec<i16>,
    write_index: usize,
    read_index: usize,
    available: usize,
    capacity: usize,
    lost_samples: u64,
}

impl SampleRing {
    /// Create a ring with a fixed capacity of `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be positive");
        Self {
            buffer: vec![0; capacity],
            write_index: 0,
            read_index: 0,
            available: 0,
            capacity,
            lost_samples: 0,
        }
    }

    /// Write samples at the write cursor, overwriting the oldest unread
    /// data if the buffer is full.
    ///
    /// Returns the number of unread samples lost to overrun (0 when the
    /// consumer has kept pace). Performs at most two contiguous copies and
    /// never allocates, so it stays cheap inside the producer's critical
    /// section.
    pub fn push(&mut self, samples: &[i16]) -> usize {
        if samples.is_empty() {
            return 0;
        }

        let mut lost = 0;

        // A push larger than the whole ring keeps only the most recent
        // `capacity` samples; everything before them is already lost.
        let samples = if samples.len() > self.capacity {
            lost += samples.len() - self.capacity;
            &samples[samples.len() - self.capacity..]
        } else {
            samples
        };

        // Advance the read cursor past data we are about to overwrite.
        let overrun = (self.available + samples.len()).saturating_sub(self.capacity);
        if overrun > 0 {
            self.read_index = (self.read_index + overrun) % self.capacity;
            self.available -= overrun;
            lost += overrun;
        }

        let first = samples.len().min(self.capacity - self.write_index);
        self.buffer[self.write_index..self.write_index + first].copy_from_slice(&samples[..first]);
        let rest = samples.len() - first;
        if rest > 0 {
            self.buffer[..rest].copy_from_slice(&samples[first..]);
        }
        self.write_index = (self.write_index + samples.len()) % self.capacity;
        self.available += samples.len();

        self.lost_samples += lost as u64;
        lost
    }

    /// Copy up to `dest.len()` samples into `dest` in production order,
    /// advancing the read cursor.
    ///
    /// Splits into two contiguous copies when the unread span wraps the
    /// end of the backing array. Returns the number of samples copied
    /// (0 when the buffer is empty).
    pub fn pop(&mut self, dest: &mut [i16]) -> usize {
        let to_read = dest.len().min(self.available);
        if to_read == 0 {
            return 0;
        }

        let first = to_read.min(self.capacity - self.read_index);
        dest[..first].copy_from_slice(&self.buffer[self.read_index..self.read_index + first]);
        let rest = to_read - first;
        if rest > 0 {
            dest[first..to_read].copy_from_slice(&self.buffer[..rest]);
        }
        self.read_index = (self.read_index + to_read) % self.capacity;
        self.available -= to_read;
        to_read
    }

    /// Number of unread samples. Never exceeds `capacity`.
    pub fn len(&self) -> usize {
        self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    /// Total unread samples destroyed by overruns since construction.
    pub fn lost_samples(&self) -> u64 {
        self.lost_samples
    }

    /// Discard all unread samples, making the buffer empty.
    ///
    /// The loss counter is left intact; discarding on request is not an
    /// overrun.
    pub fn clear(&mut self) {
        self.write_index = 0;
        self.read_index = 0;
        self.available = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
