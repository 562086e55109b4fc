//! Canonical enumeration of every fixed-length sequence over a small alphabet.
//!
//! A catalog over alphabet `{H, T}` and length 10 holds all 1024 sequences in
//! lexicographic order, so a sequence's position doubles as its index in any
//! count or probability vector over the space.

use log::{debug, warn};

use crate::error::{Error, Result};

/// Largest sequence space a catalog will materialize.
pub const MAX_CATALOG_SIZE: usize = 1 << 22;

/// Spaces above this size are built with a memory warning.
pub const LARGE_CATALOG_SIZE: usize = 1 << 20;

/// Lazy odometer over `alphabet^length`.
///
/// The rightmost position turns fastest, so with a sorted alphabet the output
/// is already in lexicographic order. Finite and restartable via `clone`
/// before iteration or [`SequenceCatalog::iter`].
#[derive(Debug, Clone)]
pub struct SequenceIter {
    alphabet: Vec<char>,
    digits: Vec<usize>,
    remaining: usize,
}

impl SequenceIter {
    fn new(alphabet: Vec<char>, length: usize, size: usize) -> Self {
        Self {
            alphabet,
            digits: vec![0; length],
            remaining: size,
        }
    }

    fn advance(&mut self) {
        let base = self.alphabet.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return;
            }
            *digit = 0;
        }
    }
}

impl Iterator for SequenceIter {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.remaining == 0 {
            return None;
        }
        let current: String = self.digits.iter().map(|&d| self.alphabet[d]).collect();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SequenceIter {}

/// Every sequence of `length` symbols from `alphabet`, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCatalog {
    alphabet: Vec<char>,
    length: usize,
    sequences: Vec<String>,
}

impl SequenceCatalog {
    /// Build the catalog. Symbols are sorted; duplicates are rejected.
    pub fn new(alphabet: &str, length: usize) -> Result<Self> {
        let mut symbols: Vec<char> = alphabet.chars().collect();
        if symbols.is_empty() {
            return Err(Error::InvalidParameter("alphabet is empty".to_string()));
        }
        symbols.sort_unstable();
        if symbols.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::InvalidParameter(format!(
                "alphabet {alphabet:?} repeats a symbol"
            )));
        }

        let size = space_size(symbols.len(), length)?;
        if size > LARGE_CATALOG_SIZE {
            warn!(
                "materializing {size} sequences of length {length} (about {} MiB)",
                size * (length + std::mem::size_of::<String>()) >> 20
            );
        }
        let sequences: Vec<String> = SequenceIter::new(symbols.clone(), length, size).collect();
        debug!(
            "catalog over {:?} length {length}: {} sequences",
            symbols.iter().collect::<String>(),
            sequences.len()
        );
        Ok(Self {
            alphabet: symbols,
            length,
            sequences,
        })
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of sequences, `alphabet_size ^ length`.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Always false: even length 0 has the empty sequence.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.sequences.get(index).map(String::as_str)
    }

    /// Fresh lazy pass over the space without touching the stored list.
    pub fn iter(&self) -> SequenceIter {
        SequenceIter::new(self.alphabet.clone(), self.length, self.len())
    }

    /// Canonical index of `sequence`. Inverse of [`get`](Self::get).
    pub fn index_of(&self, sequence: &str) -> Result<usize> {
        let got = sequence.chars().count();
        if got != self.length {
            return Err(Error::InvalidSequence {
                sequence: sequence.to_string(),
                reason: format!("expected length {}, got {got}", self.length),
            });
        }
        let base = self.alphabet.len();
        sequence.chars().try_fold(0usize, |index, symbol| {
            let rank = self
                .alphabet
                .binary_search(&symbol)
                .map_err(|_| Error::InvalidSequence {
                    sequence: sequence.to_string(),
                    reason: format!("symbol {symbol:?} is not in the alphabet"),
                })?;
            Ok(index * base + rank)
        })
    }

    pub fn contains(&self, sequence: &str) -> bool {
        self.index_of(sequence).is_ok()
    }

    /// Probability of any one sequence when every symbol is uniform and independent.
    pub fn probability_of_any_specific_sequence(&self) -> f64 {
        1.0 / self.len() as f64
    }

    /// Occurrences of `symbol` in the sequence at `index`.
    pub fn symbol_count(&self, index: usize, symbol: char) -> usize {
        self.get(index)
            .map_or(0, |s| s.chars().filter(|&c| c == symbol).count())
    }
}

/// `alphabet_size ^ length`, bounded by [`MAX_CATALOG_SIZE`].
pub fn space_size(alphabet_size: usize, length: usize) -> Result<usize> {
    let exponent = u32::try_from(length).map_err(|_| Error::CatalogTooLarge {
        alphabet_size,
        length,
    })?;
    match alphabet_size.checked_pow(exponent) {
        Some(size) if size <= MAX_CATALOG_SIZE => Ok(size),
        _ => Err(Error::CatalogTooLarge {
            alphabet_size,
            length,
        }),
    }
}

/// Enumerate `alphabet^length` in canonical order.
pub fn enumerate(alphabet: &str, length: usize) -> Result<Vec<String>> {
    Ok(SequenceCatalog::new(alphabet, length)?.sequences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn coin_flips_of_ten() {
        let c = SequenceCatalog::new("HT", 10).unwrap();
        assert_eq!(c.len(), 1024);
        let unique: HashSet<_> = c.sequences().iter().collect();
        assert_eq!(unique.len(), 1024);
        assert_eq!(c.get(0), Some("HHHHHHHHHH"));
        assert_eq!(c.get(1023), Some("TTTTTTTTTT"));
        assert!((c.probability_of_any_specific_sequence() - 0.5f64.powi(10)).abs() < 1e-15);
    }

    #[test]
    fn canonical_order_is_sorted() {
        let c = SequenceCatalog::new("TH", 6).unwrap();
        assert!(c.sequences().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(c.alphabet(), &['H', 'T']);
    }

    #[test]
    fn index_of_is_bijection() {
        let c = SequenceCatalog::new("HT", 10).unwrap();
        for (i, s) in c.sequences().iter().enumerate() {
            assert_eq!(c.index_of(s).unwrap(), i);
        }
    }

    #[test]
    fn index_of_rejects_bad_sequences() {
        let c = SequenceCatalog::new("HT", 4).unwrap();
        assert!(matches!(c.index_of("HTH"), Err(Error::InvalidSequence { .. })));
        assert!(matches!(c.index_of("HTHTH"), Err(Error::InvalidSequence { .. })));
        assert!(matches!(c.index_of("HTXT"), Err(Error::InvalidSequence { .. })));
        assert!(!c.contains(""));
        assert!(c.contains("TTHH"));
    }

    #[test]
    fn lazy_iter_matches_stored() {
        let c = SequenceCatalog::new("ACGT", 3).unwrap();
        let it = c.iter();
        assert_eq!(it.len(), 64);
        let again: Vec<String> = it.clone().collect();
        assert_eq!(again, c.sequences());
        assert_eq!(it.count(), 64);
    }

    #[test]
    fn ternary_alphabet() {
        let seqs = enumerate("abc", 2).unwrap();
        assert_eq!(
            seqs,
            vec!["aa", "ab", "ac", "ba", "bb", "bc", "ca", "cb", "cc"]
        );
    }

    #[test]
    fn length_zero_has_empty_sequence() {
        let c = SequenceCatalog::new("HT", 0).unwrap();
        assert_eq!(c.sequences(), &[String::new()]);
        assert_eq!(c.index_of("").unwrap(), 0);
        assert!(!c.is_empty());
    }

    #[test]
    fn rejects_bad_alphabets() {
        assert!(matches!(SequenceCatalog::new("", 3), Err(Error::InvalidParameter(_))));
        assert!(matches!(SequenceCatalog::new("HTH", 3), Err(Error::InvalidParameter(_))));
        assert!(matches!(
            SequenceCatalog::new("HT", 64),
            Err(Error::CatalogTooLarge { .. })
        ));
    }

    #[test]
    fn size_cap_boundary() {
        assert_eq!(space_size(2, 22).unwrap(), MAX_CATALOG_SIZE);
        assert!(matches!(space_size(2, 23), Err(Error::CatalogTooLarge { .. })));
        assert!(matches!(
            SequenceCatalog::new("HT", 24),
            Err(Error::CatalogTooLarge { .. })
        ));
        assert!(matches!(
            SequenceCatalog::new("ACGT", 12),
            Err(Error::CatalogTooLarge { .. })
        ));
    }

    #[test]
    fn symbol_counts() {
        let c = SequenceCatalog::new("HT", 3).unwrap();
        let i = c.index_of("HTH").unwrap();
        assert_eq!(c.symbol_count(i, 'H'), 2);
        assert_eq!(c.symbol_count(i, 'T'), 1);
        assert_eq!(c.symbol_count(999, 'H'), 0);
    }
}
