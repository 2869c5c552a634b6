//! Sequential code generation.

use std::sync::atomic::{AtomicU64, Ordering};

use royalty_distribution::CodeSequence;

/// `prefix` + zero-padded counter, e.g. `DIS0000001`.
///
/// The counter lives outside any transaction: a rolled-back run still
/// consumes its number.
#[derive(Debug)]
pub struct PrefixedSequence {
    prefix: String,
    width: usize,
    last: AtomicU64,
}

impl PrefixedSequence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_after(prefix, 0)
    }

    /// Continue after an already issued number (e.g. when reloading state).
    pub fn starting_after(prefix: impl Into<String>, last: u64) -> Self {
        Self {
            prefix: prefix.into(),
            width: 7,
            last: AtomicU64::new(last),
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

impl CodeSequence for PrefixedSequence {
    fn next_code(&self) -> String {
        let n = self.last.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}{:0width$}", self.prefix, n, width = self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_padded_and_sequential() {
        let seq = PrefixedSequence::new("DIS");
        assert_eq!(seq.next_code(), "DIS0000001");
        assert_eq!(seq.next_code(), "DIS0000002");
    }

    #[test]
    fn resumes_after_last_issued_number() {
        let seq = PrefixedSequence::starting_after("D-", 41).with_width(3);
        assert_eq!(seq.next_code(), "D-042");
    }

    #[test]
    fn shared_sequence_never_repeats() {
        use std::collections::HashSet;
        use std::sync::Arc;

        let seq = Arc::new(PrefixedSequence::new("X"));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let seq = seq.clone();
                std::thread::spawn(move || (0..50).map(|_| seq.next_code()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for code in h.join().unwrap() {
                assert!(seen.insert(code));
            }
        }
        assert_eq!(seen.len(), 200);
    }
}
