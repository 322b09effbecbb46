//! Interrupt Enable Bookkeeping
//!
//! The NVIC has one enable bit per interrupt line, far more lines than
//! [`InterruptMask`] names. [`IrqGate`] maps the named sources onto their
//! lines and keeps every other line accounted for: any enabled line outside
//! the named set reads back as [`InterruptMask::OTHER`], and clearing
//! `OTHER` parks those lines until a later mask asks for them again.
//!
//! This module is testable on the host; the HAL only copies words in and
//! out of the NVIC enable registers.

use crate::types::InterruptMask;

/// Enable words covering every STM32G474 interrupt line (102 lines)
pub const ENABLE_WORDS: usize = 4;

/// One bit per interrupt line, 32 lines per word
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EnableSet([u32; ENABLE_WORDS]);

impl EnableSet {
    /// No line enabled
    pub const EMPTY: Self = Self([0; ENABLE_WORDS]);

    /// Build from raw enable words
    #[must_use]
    pub const fn from_words(words: [u32; ENABLE_WORDS]) -> Self {
        Self(words)
    }

    /// Raw enable words
    #[must_use]
    pub const fn words(&self) -> [u32; ENABLE_WORDS] {
        self.0
    }

    /// Set containing only `line`
    #[must_use]
    pub const fn line(line: u16) -> Self {
        Self::EMPTY.with(line)
    }

    /// Add `line`
    #[must_use]
    pub const fn with(mut self, line: u16) -> Self {
        let line = line as usize;
        self.0[line / 32] |= 1 << (line % 32);
        self
    }

    /// Whether `line` is enabled
    #[must_use]
    pub const fn contains(&self, line: u16) -> bool {
        let line = line as usize;
        self.0[line / 32] & (1 << (line % 32)) != 0
    }

    /// Lines in either set
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        let mut out = self;
        for (w, o) in out.0.iter_mut().zip(other.0) {
            *w |= o;
        }
        out
    }

    /// Lines in `self` but not in `other`
    #[must_use]
    pub fn difference(self, other: Self) -> Self {
        let mut out = self;
        for (w, o) in out.0.iter_mut().zip(other.0) {
            *w &= !o;
        }
        out
    }

    /// Whether no line is enabled
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|w| *w == 0)
    }
}

/// Named sources over the full set of interrupt lines
pub struct IrqGate<const S: usize> {
    sources: [(InterruptMask, u16); S],
    named: EnableSet,
    parked: EnableSet,
}

impl<const S: usize> IrqGate<S> {
    /// Create a gate for `(source, line)` pairs
    #[must_use]
    pub fn new(sources: [(InterruptMask, u16); S]) -> Self {
        let named = sources
            .iter()
            .fold(EnableSet::EMPTY, |set, (_, line)| set.with(*line));
        Self {
            sources,
            named,
            parked: EnableSet::EMPTY,
        }
    }

    /// Mask describing the lines in `enabled`
    #[must_use]
    pub fn observe(&self, enabled: EnableSet) -> InterruptMask {
        let mut mask = self
            .sources
            .iter()
            .filter(|(_, line)| enabled.contains(*line))
            .fold(InterruptMask::empty(), |mask, (flag, _)| mask | *flag);
        if !enabled.difference(self.named).is_empty() {
            mask |= InterruptMask::OTHER;
        }
        mask
    }

    /// Lines to enable so that exactly `mask` is live.
    ///
    /// Unnamed lines currently in `enabled` are parked when `mask` lacks
    /// [`InterruptMask::OTHER`] and handed back once a mask contains it.
    pub fn retarget(&mut self, enabled: EnableSet, mask: InterruptMask) -> EnableSet {
        self.parked = self.parked.union(enabled.difference(self.named));

        let mut target = self
            .sources
            .iter()
            .filter(|(flag, _)| mask.contains(*flag))
            .fold(EnableSet::EMPTY, |set, (_, line)| set.with(*line));
        if mask.contains(InterruptMask::OTHER) {
            target = target.union(self.parked);
            self.parked = EnableSet::EMPTY;
        }
        target
    }

    /// Unnamed lines waiting to be re-enabled
    #[must_use]
    pub const fn parked(&self) -> EnableSet {
        self.parked
    }
}
