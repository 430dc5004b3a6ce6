//! A safe, growable stand-in for `fd_set`, used by
//! [`Multiplexer::multiplex_sets`](crate::multiplexer::Multiplexer::multiplex_sets).
//!
//! Unlike the libc `fd_set`, this isn't capped at `FD_SETSIZE`, a
//! REDESIGN-class improvement over the source, which is itself unbounded
//! (it takes `nfds` as a parameter rather than hard-coding 1024), so this
//! just keeps that property rather than regressing to a fixed-size array.

/// A set of non-negative descriptor numbers, backed by a growable bitmap.
#[derive(Debug, Clone, Default)]
pub struct FdSet {
    words: Vec<u64>,
}

impl FdSet {
    /// An empty set.
    pub fn new() -> Self {
        Self { words: Vec::new() }
    }

    /// An empty set pre-sized to hold descriptors up to `nfds` without
    /// reallocating.
    pub fn with_capacity(nfds: usize) -> Self {
        Self {
            words: vec![0; nfds.div_ceil(64)],
        }
    }

    fn word_and_bit(fd: i32) -> Option<(usize, u32)> {
        let fd = usize::try_from(fd).ok()?;
        Some((fd / 64, (fd % 64) as u32))
    }

    /// Add `fd` to the set. Negative descriptors are ignored, matching
    /// `FD_SET`'s undefined-but-harmless treatment of them in practice.
    pub fn insert(&mut self, fd: i32) {
        if let Some((word, bit)) = Self::word_and_bit(fd) {
            if word >= self.words.len() {
                self.words.resize(word + 1, 0);
            }
            self.words[word] |= 1 << bit;
        }
    }

    /// Whether `fd` is a member.
    pub fn contains(&self, fd: i32) -> bool {
        Self::word_and_bit(fd)
            .and_then(|(word, bit)| self.words.get(word).map(|w| (w >> bit) & 1 != 0))
            .unwrap_or(false)
    }

    /// Empty the set in place, the way `FD_ZERO` does.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    /// Number of members currently set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether the set has no members.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }
}
