// Fixed-capacity ring of frame timestamps; the oldest slot is overwritten once full.

pub struct FrameRing {
    slots: Box<[u64]>,
    /// Index the next timestamp will be written to.
    head: usize,
    len: usize,
}

impl FrameRing {
    /// `capacity` is raised to 2 (the minimum for one frame interval).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity.max(2)].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, timestamp_ns: u64) {
        self.slots[self.head] = timestamp_ns;
        self.head = (self.head + 1) % self.slots.len();
        self.len = (self.len + 1).min(self.slots.len());
    }

    /// `i`-th timestamp counting from the oldest buffered one.
    fn get(&self, i: usize) -> u64 {
        let start = (self.head + self.slots.len() - self.len) % self.slots.len();
        self.slots[(start + i) % self.slots.len()]
    }

    pub fn oldest(&self) -> Option<u64> {
        (self.len > 0).then(|| self.get(0))
    }

    pub fn newest(&self) -> Option<u64> {
        (self.len > 0).then(|| self.get(self.len - 1))
    }

    /// The two most recent timestamps as (previous, newest).
    pub fn last_pair(&self) -> Option<(u64, u64)> {
        (self.len >= 2).then(|| (self.get(self.len - 2), self.get(self.len - 1)))
    }

    /// Timestamps oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}
