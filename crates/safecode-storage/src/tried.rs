//! Set of codes already attempted.

use std::collections::HashSet;

use safecode_core::SecurityCode;

/// Codes that have been attempted, with set semantics.
///
/// Grows monotonically; there is no removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriedSet {
    codes: HashSet<SecurityCode>,
}

impl TriedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a code; returns `false` if it was already present.
    pub fn insert(&mut self, code: SecurityCode) -> bool {
        self.codes.insert(code)
    }

    /// Whether `code` was attempted.
    pub fn contains(&self, code: SecurityCode) -> bool {
        self.codes.contains(&code)
    }

    /// Number of distinct codes attempted.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether nothing was attempted yet.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of attempted codes below `max` (the searched range `[0, max)`).
    pub fn count_below(&self, max: u16) -> usize {
        self.codes.iter().filter(|c| c.value() < max).count()
    }

    /// Iterate over the attempted codes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = SecurityCode> + '_ {
        self.codes.iter().copied()
    }

    /// The attempted codes in ascending order.
    pub fn sorted(&self) -> Vec<SecurityCode> {
        let mut codes: Vec<_> = self.iter().collect();
        codes.sort_unstable();
        codes
    }
}

impl FromIterator<SecurityCode> for TriedSet {
    fn from_iter<I: IntoIterator<Item = SecurityCode>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

impl Extend<SecurityCode> for TriedSet {
    fn extend<I: IntoIterator<Item = SecurityCode>>(&mut self, iter: I) {
        self.codes.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(value: u16) -> SecurityCode {
        SecurityCode::new(value).unwrap()
    }

    #[test]
    fn test_duplicates_collapse() {
        let tried: TriedSet = [code(3), code(3), code(7)].into_iter().collect();
        assert_eq!(tried.len(), 2);
        assert!(tried.contains(code(3)));
        assert!(!tried.contains(code(4)));
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut tried = TriedSet::new();
        assert!(tried.insert(code(12)));
        assert!(!tried.insert(code(12)));
    }

    #[test]
    fn test_count_below() {
        let tried: TriedSet = [code(0), code(1999), code(2000), code(9999)].into_iter().collect();
        assert_eq!(tried.count_below(2000), 2);
        assert_eq!(tried.count_below(10_000), 4);
        assert_eq!(tried.sorted().first(), Some(&code(0)));
    }
}
