//! Immutable text snapshots and the spans that point into them.
//!
//! A [`Snapshot`] is a cheaply clonable handle to a read-only buffer of
//! characters. All offsets are zero-based *character* offsets, never byte
//! offsets. A [`Span`] is an offset + length into a snapshot and only
//! materializes its text when asked.
//!
//! Edits never mutate a snapshot: a host produces a new snapshot (usually with
//! a higher [`version`](Snapshot::version)) for every change, so any number of
//! threads can read the same snapshot concurrently.

use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

/// Character-indexed, read-only text.
///
/// Implement this to expose a host buffer (an editor rope, a memory map, ...)
/// to the engine without copying it.
pub trait TextSource: Send + Sync {
    /// Number of characters in the buffer.
    fn len(&self) -> usize;

    /// Character at `offset`. Only called with `offset < self.len()`.
    fn char_at(&self, offset: usize) -> char;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`TextSource`] backed by a decoded character vector.
#[derive(Debug, Clone, Default)]
pub struct CharBuffer {
    chars: Vec<char>,
}

impl CharBuffer {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }
}

impl TextSource for CharBuffer {
    fn len(&self) -> usize {
        self.chars.len()
    }

    fn char_at(&self, offset: usize) -> char {
        self.chars[offset]
    }
}

/// Whole-buffer string plus the byte offset of every character boundary.
struct Materialized {
    text: String,
    boundaries: Vec<usize>,
}

struct SnapshotInner {
    source: Box<dyn TextSource>,
    len: usize,
    version: u64,
    materialized: OnceCell<Materialized>,
}

/// Shared, immutable view over source text.
#[derive(Clone)]
pub struct Snapshot {
    inner: Arc<SnapshotInner>,
}

impl Snapshot {
    /// Creates a version 0 snapshot of `text`.
    pub fn new(text: &str) -> Self {
        Self::from_source(CharBuffer::new(text), 0)
    }

    /// Creates a snapshot of `text` tagged with `version`.
    pub fn with_version(text: &str, version: u64) -> Self {
        Self::from_source(CharBuffer::new(text), version)
    }

    /// Wraps an arbitrary host buffer.
    pub fn from_source(source: impl TextSource + 'static, version: u64) -> Self {
        let len = source.len();
        Self {
            inner: Arc::new(SnapshotInner {
                source: Box::new(source),
                len,
                version,
                materialized: OnceCell::new(),
            }),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    pub fn version(&self) -> u64 {
        self.inner.version
    }

    /// Character at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`.
    #[inline]
    pub fn char_at(&self, offset: usize) -> char {
        assert!(
            offset < self.inner.len,
            "offset {} out of bounds for snapshot of length {}",
            offset,
            self.inner.len
        );
        self.inner.source.char_at(offset)
    }

    /// Character at `offset`, or `None` past the end.
    #[inline]
    pub fn get(&self, offset: usize) -> Option<char> {
        (offset < self.inner.len).then(|| self.inner.source.char_at(offset))
    }

    /// The whole buffer as one string, built on first use and cached for the
    /// lifetime of the snapshot.
    pub fn whole_text(&self) -> &str {
        &self.materialized().text
    }

    /// Byte offset into [`whole_text`](Self::whole_text) of the character at
    /// `offset`. `offset == len()` maps to the end of the string.
    pub fn byte_offset(&self, offset: usize) -> usize {
        self.materialized().boundaries[offset]
    }

    /// Span covering the entire snapshot.
    pub fn extent(&self) -> Span {
        Span::new(self.clone(), 0, self.len())
    }

    /// Returns `true` if both handles refer to the same buffer.
    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn materialized(&self) -> &Materialized {
        self.inner.materialized.get_or_init(|| {
            let mut text = String::with_capacity(self.inner.len);
            let mut boundaries = Vec::with_capacity(self.inner.len + 1);
            for offset in 0..self.inner.len {
                boundaries.push(text.len());
                text.push(self.inner.source.char_at(offset));
            }
            boundaries.push(text.len());
            Materialized { text, boundaries }
        })
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("len", &self.inner.len)
            .field("version", &self.inner.version)
            .finish()
    }
}

/// An offset + length reference into a [`Snapshot`].
///
/// Spans never own characters; [`text`](Span::text) reads them on demand.
#[derive(Clone)]
pub struct Span {
    snapshot: Snapshot,
    start: usize,
    len: usize,
}

impl Span {
    /// # Panics
    ///
    /// Panics if the span reaches past the end of `snapshot`.
    pub fn new(snapshot: Snapshot, start: usize, len: usize) -> Self {
        assert!(
            start + len <= snapshot.len(),
            "span {}..{} exceeds snapshot length {}",
            start,
            start + len,
            snapshot.len()
        );
        Self {
            snapshot,
            start,
            len,
        }
    }

    /// Span from `start` up to (not including) `end`.
    pub fn from_range(snapshot: Snapshot, start: usize, end: usize) -> Self {
        assert!(start <= end, "span start {} is after end {}", start, end);
        Self::new(snapshot, start, end - start)
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Materializes the covered characters.
    pub fn text(&self) -> String {
        (self.start..self.end())
            .map(|offset| self.snapshot.char_at(offset))
            .collect()
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Span({}..{})", self.start, self.end())
    }
}

impl PartialEq for Span {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot.ptr_eq(&other.snapshot) && self.start == other.start && self.len == other.len
    }
}

impl Eq for Span {}
