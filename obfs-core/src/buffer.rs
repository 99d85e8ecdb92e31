/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::collections::VecDeque;

/// A FIFO byte buffer: bytes are appended at the back and removed from the front.
///
/// This is the byte-buffer abstraction external collaborators (the socket-reading event loop)
/// and protocol modules pass data through. It intentionally does not try to be a zero-copy ring
/// buffer -- correctness and a small, obviously-right API matter more here than squeezing out
/// the last bit of throughput.
#[derive(Default, Clone)]
pub struct ByteBuffer(VecDeque<u8>);

impl ByteBuffer {
    #[inline(always)]
    pub fn new() -> Self {
        Self(VecDeque::new())
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append bytes to the back of the buffer.
    #[inline(always)]
    pub fn append(&mut self, bytes: &[u8]) {
        self.0.extend(bytes.iter().copied());
    }

    /// Remove up to `n` bytes from the front and return them, shortest-first if fewer are
    /// available.
    pub fn remove(&mut self, n: usize) -> Vec<u8> {
        let take = n.min(self.0.len());
        self.0.drain(..take).collect()
    }

    /// Remove and return every byte currently buffered.
    pub fn remove_all(&mut self) -> Vec<u8> {
        self.remove(self.0.len())
    }

    /// Discard up to `n` bytes from the front without returning them. Returns the number
    /// actually discarded.
    pub fn drain(&mut self, n: usize) -> usize {
        let take = n.min(self.0.len());
        self.0.drain(..take);
        take
    }

    /// Copy the first `n` bytes without consuming them. Panics if fewer than `n` are buffered;
    /// callers are expected to check `len()` first.
    pub fn peek(&self, n: usize) -> Vec<u8> {
        assert!(n <= self.0.len());
        self.0.iter().take(n).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_remove_preserves_order() {
        let mut b = ByteBuffer::new();
        b.append(b"abc");
        b.append(b"def");
        assert_eq!(b.len(), 6);
        assert_eq!(b.remove(4), b"abcd");
        assert_eq!(b.len(), 2);
        assert_eq!(b.remove(10), b"ef");
        assert!(b.is_empty());
    }

    #[test]
    fn drain_discards_without_returning() {
        let mut b = ByteBuffer::new();
        b.append(b"0123456789");
        assert_eq!(b.drain(3), 3);
        assert_eq!(b.remove_all(), b"3456789");
    }

    #[test]
    fn peek_does_not_consume() {
        let mut b = ByteBuffer::new();
        b.append(b"hello");
        assert_eq!(b.peek(3), b"hel");
        assert_eq!(b.len(), 5);
    }
}
