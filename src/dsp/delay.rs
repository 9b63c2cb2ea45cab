/// Fixed-capacity circular sample store.
///
/// Capacity is chosen at `prepare` time; afterwards reads and writes never
/// allocate and every offset is reduced modulo the line's own capacity.
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            write_pos: 0,
        }
    }

    /// Resize to `capacity` samples, zeroing contents and cursor.
    ///
    /// Reuses the existing allocation when it is large enough.
    pub fn prepare(&mut self, capacity: usize) {
        self.buffer.clear();
        self.buffer.resize(capacity.max(1), 0.0);
        self.write_pos = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_prepared(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Read the sample written `offset` samples ago.
    ///
    /// `offset == 1` is the most recently written sample. Offsets wrap modulo
    /// the capacity, so any value is safe.
    #[inline]
    pub fn read(&self, offset: usize) -> f32 {
        let capacity = self.buffer.len();
        if capacity == 0 {
            return 0.0;
        }
        let offset = offset % capacity;
        let read_pos = (self.write_pos + capacity - offset) % capacity;
        self.buffer[read_pos]
    }

    /// Store `sample` at the cursor and advance it.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        let capacity = self.buffer.len();
        if capacity == 0 {
            return;
        }
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % capacity;
    }

    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}
