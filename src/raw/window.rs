use std::io::{self, Read};

use super::MAX_DISTANCE;

/// The sliding window buffer.
///
/// Owns a contiguous byte range `[data_zero, data_zero + len)` of the logical
/// input stream, where `data_zero` is the absolute offset of the first byte
/// held. Everything upstream works in absolute offsets; this type is the only
/// place that translates them to buffer indices.
///
/// After a block is emitted, [`retain_recent`](Window::retain_recent) discards
/// everything older than [`MAX_DISTANCE`] bytes so memory stays proportional
/// to window + block, not to the stream.
pub struct Window {
    data: Vec<u8>,
    data_zero: u64,
}

impl Window {
    pub fn new() -> Self {
        Window { data: Vec::new(), data_zero: 0 }
    }

    /// Install the tail of a dictionary as pre-history.
    ///
    /// Keeps the last [`MAX_DISTANCE`] dictionary bytes at most; older bytes
    /// could never be referenced anyway. Must be called before any input is
    /// read into the window.
    pub fn install_prefix(&mut self, dictionary: &[u8]) {
        debug_assert!(self.data.is_empty() && self.data_zero == 0);
        let tail = dictionary.len().min(MAX_DISTANCE);
        self.data.extend_from_slice(&dictionary[dictionary.len() - tail..]);
    }

    /// Absolute offset of the first byte held.
    pub fn data_zero(&self) -> u64 {
        self.data_zero
    }

    /// Absolute offset one past the last byte held.
    pub fn end(&self) -> u64 {
        self.data_zero + self.data.len() as u64
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Translate an absolute offset to an index into [`as_slice`](Window::as_slice).
    pub fn local(&self, abs: u64) -> usize {
        debug_assert!(abs >= self.data_zero);
        (abs - self.data_zero) as usize
    }

    /// Bytes of the absolute range `[from, to)`.
    pub fn range(&self, from: u64, to: u64) -> &[u8] {
        &self.data[self.local(from)..self.local(to)]
    }

    /// Append up to `max` bytes from `reader`, returning how many arrived.
    ///
    /// We basically want read_exact semantics, except at the end.
    /// Sadly read_exact specifies the buffer contents to be undefined
    /// on error, so we use the take/read_to_end construction instead.
    pub fn fill_from<R: Read>(&mut self, reader: &mut R, max: usize) -> io::Result<usize> {
        let before = self.data.len();
        reader.by_ref().take(max as u64).read_to_end(&mut self.data)?;
        Ok(self.data.len() - before)
    }

    /// Forget everything except the most recent [`MAX_DISTANCE`] bytes.
    pub fn retain_recent(&mut self) {
        if self.data.len() > MAX_DISTANCE {
            let how_much_to_forget = self.data.len() - MAX_DISTANCE;
            self.data.drain(..how_much_to_forget);
            self.data_zero += how_much_to_forget as u64;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_advances_data_zero() {
        let mut w = Window::new();
        let mut input: &[u8] = &[7u8; MAX_DISTANCE + 100];
        w.fill_from(&mut input, MAX_DISTANCE + 100).unwrap();
        w.retain_recent();
        assert_eq!(w.data_zero(), 100);
        assert_eq!(w.as_slice().len(), MAX_DISTANCE);
        assert_eq!(w.end(), MAX_DISTANCE as u64 + 100);
    }

    #[test]
    fn prefix_keeps_only_the_reachable_tail() {
        let mut w = Window::new();
        let dict: Vec<u8> = (0..MAX_DISTANCE + 10).map(|i| i as u8).collect();
        w.install_prefix(&dict);
        assert_eq!(w.as_slice().len(), MAX_DISTANCE);
        assert_eq!(w.as_slice()[0], dict[10]);
        assert_eq!(w.data_zero(), 0);
    }
}
