//! Append buffer: Fragments awaiting one batched flush per frame.

/// Ordered list of appended fragments.
///
/// Streaming producers may append many times per frame. The visible edit
/// happens immediately; this buffer only collects the fragments so the
/// follow-up bookkeeping (re-measure, reveal) runs once per frame.
#[derive(Debug, Default, Clone)]
pub struct AppendBuffer {
    fragments: Vec<String>,
    bytes: usize,
}

impl AppendBuffer {
    /// Create an empty append buffer.
    pub const fn new() -> Self {
        Self {
            fragments: Vec::new(),
            bytes: 0,
        }
    }

    /// Queue a fragment. Empty fragments are ignored.
    pub fn push(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        self.bytes += fragment.len();
        self.fragments.push(fragment.to_owned());
    }

    /// Number of queued fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Check if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Total queued bytes.
    pub const fn byte_len(&self) -> usize {
        self.bytes
    }

    /// Concatenate and clear the queued fragments.
    ///
    /// Returns `None` when nothing was queued.
    pub fn flush(&mut self) -> Option<String> {
        if self.fragments.is_empty() {
            return None;
        }
        let joined = self.fragments.concat();
        self.clear();
        Some(joined)
    }

    /// Drop all queued fragments.
    pub fn clear(&mut self) {
        self.fragments.clear();
        self.bytes = 0;
    }
}
