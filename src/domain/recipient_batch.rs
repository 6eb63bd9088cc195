use rand::seq::IndexedRandom;

use super::RecipientRecord;

/// A bounded, randomly sampled set of recipients for one dispatch cycle.
///
/// The batch owns its records by value, so whoever holds it can move it into a
/// job without sharing anything with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientBatch(Vec<RecipientRecord>);

impl RecipientBatch {
    /// Picks `k` records uniformly at random without replacement, or all of
    /// them when fewer than `k` are available. The input is left untouched.
    pub fn sample(records: &[RecipientRecord], k: usize) -> RecipientBatch {
        if records.len() < k {
            return Self(records.to_vec());
        }

        let mut rng = rand::rng();
        Self(records.choose_multiple(&mut rng, k).cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecipientRecord> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a RecipientBatch {
    type Item = &'a RecipientRecord;
    type IntoIter = std::slice::Iter<'a, RecipientRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Vec<RecipientRecord>> for RecipientBatch {
    fn from(records: Vec<RecipientRecord>) -> Self {
        Self(records)
    }
}
