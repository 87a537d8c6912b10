//! TextRuns: prefix-sum model of the editable surface's text nodes
//!
//! The surface's text is an ordered list of runs (one per text node). A
//! linear caret offset maps to a `(run, offset_in_run)` pair by binary search
//! over the cumulative run ends, and back again by a prefix sum. Lengths are
//! UTF-16 code units so they agree with DOM selection offsets.

/// A caret location inside one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPosition {
    pub run: usize,
    pub offset: usize,
}

/// Ordered run lengths stored as cumulative ends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRuns {
    ends: Vec<usize>,
}

impl TextRuns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lengths<I: IntoIterator<Item = usize>>(lengths: I) -> Self {
        let mut runs = Self::new();
        for len in lengths {
            runs.push(len);
        }
        runs
    }

    pub fn push(&mut self, len: usize) {
        let end = self.total_len() + len;
        self.ends.push(end);
    }

    /// Number of runs
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.ends.last().copied().unwrap_or(0)
    }

    /// Start offset of run `run`; the total length past the last run
    pub fn start_of(&self, run: usize) -> usize {
        if run == 0 {
            0
        } else {
            self.ends.get(run - 1).copied().unwrap_or_else(|| self.total_len())
        }
    }

    pub fn run_len(&self, run: usize) -> usize {
        match self.ends.get(run) {
            Some(end) => end - self.start_of(run),
            None => 0,
        }
    }

    /// Linear offset of a position inside `run`. The in-run offset is
    /// clamped to the run length.
    pub fn offset_of(&self, run: usize, offset_in_run: usize) -> usize {
        if run >= self.ends.len() {
            return self.total_len();
        }
        self.start_of(run) + offset_in_run.min(self.run_len(run))
    }

    /// Resolve a linear offset to the first run whose end reaches it.
    ///
    /// Offsets past the end land at the end of the last run. Returns `None`
    /// only when there are no runs at all.
    pub fn locate(&self, offset: usize) -> Option<RunPosition> {
        if self.ends.is_empty() {
            return None;
        }

        let run = self.ends.partition_point(|&end| end < offset);
        if run >= self.ends.len() {
            let last = self.ends.len() - 1;
            return Some(RunPosition { run: last, offset: self.run_len(last) });
        }

        Some(RunPosition { run, offset: offset - self.start_of(run) })
    }
}

// =============================================================================
// Tests
// =============================================================================
