//! Bounded text chunks and the in-flight chunk queue.

use std::collections::VecDeque;

/// Maximum accumulated prose length of one chunk, in text units (chars).
/// The producer stops at the first event boundary at or past this size,
/// never mid-event.
pub const CHUNK_SIZE: usize = 4096;

/// A bounded slice of concatenated prose handed to the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub text: String,
    /// Logical position within the block where display starts.
    pub start_position: usize,
}

/// Marks the section that was active when a chunk began.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    pub section_id: Option<String>,
    pub section_title: Option<String>,
    /// Byte offset of the start of the chunk.
    pub byte_position: u64,
}

/// Queue of chunk boundaries for not-yet-acknowledged blocks.
///
/// One entry is pushed per produced block; the consumer either advances
/// past the oldest or rejects the newest, supporting a one-ahead prefetch
/// model.
#[derive(Debug, Default)]
pub struct ChunkQueue {
    inner: VecDeque<ChunkInfo>,
}

impl ChunkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the boundary of a freshly produced block.
    pub fn push(&mut self, info: ChunkInfo) {
        self.inner.push_back(info);
    }

    /// Oldest unconsumed chunk boundary, if any.
    pub fn oldest(&self) -> Option<&ChunkInfo> {
        self.inner.front()
    }

    /// Caller consumed the oldest block and moved on.
    pub fn pop_oldest(&mut self) -> Option<ChunkInfo> {
        self.inner.pop_front()
    }

    /// Caller rejected the most recently produced block.
    pub fn pop_newest(&mut self) -> Option<ChunkInfo> {
        self.inner.pop_back()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(n: u64) -> ChunkInfo {
        ChunkInfo {
            section_id: Some(format!("section{n}")),
            section_title: None,
            byte_position: n,
        }
    }

    #[test]
    fn test_queue_holds_one_entry_per_block() {
        let mut q = ChunkQueue::new();
        for n in 0..5 {
            q.push(info(n));
        }
        assert_eq!(q.len(), 5);
    }

    #[test]
    fn test_pop_newest_removes_most_recent() {
        let mut q = ChunkQueue::new();
        q.push(info(1));
        q.push(info(2));
        assert_eq!(q.pop_newest().unwrap().byte_position, 2);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_pop_oldest_removes_front() {
        let mut q = ChunkQueue::new();
        q.push(info(1));
        q.push(info(2));
        assert_eq!(q.pop_oldest().unwrap().byte_position, 1);
        assert_eq!(q.oldest().unwrap().byte_position, 2);
    }
}
