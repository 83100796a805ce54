//! Input validation and normalisation.
//!
//! Turns a raw host number sequence into a [`Problem`]: entries sorted by
//! value descending (ties by ascending original index) plus the suffix sums
//! the pruning rules read.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Largest magnitude accepted for values and targets (2^53).
pub const MAX_SAFE_INTEGER: u64 = 1 << 53;

/// A validated value together with its original row index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub index: usize,
    pub value: u64,
}

/// Target and cardinality bounds for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub target: i64,
    pub min_count: usize,
    pub max_count: usize,
}

impl SearchParams {
    pub fn new(target: i64, min_count: usize, max_count: usize) -> Self {
        Self {
            target,
            min_count,
            max_count,
        }
    }

    /// Any subset size from 1 up to `n`.
    pub fn any_size(target: i64, n: usize) -> Self {
        Self::new(target, 1.min(n), n)
    }
}

/// Convert a host number into a target, rejecting what the engine can't represent.
pub fn parse_target(target: f64) -> Result<i64, ValidationError> {
    if target.is_nan() || (target.is_finite() && target.fract() != 0.0) {
        return Err(ValidationError::NonIntegerTarget);
    }
    if target < 0.0 {
        return Err(ValidationError::NegativeTarget);
    }
    if target > MAX_SAFE_INTEGER as f64 {
        return Err(ValidationError::TargetOutOfRange);
    }
    Ok(target as i64)
}

/// A validated search instance.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Sorted by value descending, ties by ascending original index
    entries: Vec<Entry>,
    /// suffix_sum[i] = sum of entries[i..].value, exact in u128
    suffix_sum: Vec<u128>,
    target: u64,
    min_count: usize,
    max_count: usize,
}

impl Problem {
    /// Validate host numbers (row index = position in `numbers`).
    pub fn new(numbers: &[f64], params: SearchParams) -> Result<Self, ValidationError> {
        let entries = validate_numbers(numbers)?;
        Self::from_entries(entries, params)
    }

    /// Validate host numbers and a host target in one pass.
    ///
    /// Checks run in the same order as [`new`](Self::new): values, then the
    /// count range, then the target.
    pub fn from_host(
        numbers: &[f64],
        target: f64,
        min_count: usize,
        max_count: usize,
    ) -> Result<Self, ValidationError> {
        let entries = validate_numbers(numbers)?;
        check_count_range(min_count, max_count, entries.len())?;
        let target = parse_target(target)?;
        Self::from_entries(entries, SearchParams::new(target, min_count, max_count))
    }

    /// Validate integer values (row index = position in `values`).
    pub fn from_values(values: &[u64], params: SearchParams) -> Result<Self, ValidationError> {
        if values.is_empty() {
            return Err(ValidationError::EmptyInput);
        }
        let entries = values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                if value == 0 {
                    Err(ValidationError::NonPositiveValue(index))
                } else if value > MAX_SAFE_INTEGER {
                    Err(ValidationError::ValueOutOfRange(index))
                } else {
                    Ok(Entry { index, value })
                }
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;
        Self::from_entries(entries, params)
    }

    fn from_entries(mut entries: Vec<Entry>, params: SearchParams) -> Result<Self, ValidationError> {
        let n = entries.len();
        check_count_range(params.min_count, params.max_count, n)?;
        if params.target < 0 {
            return Err(ValidationError::NegativeTarget);
        }
        let target = params.target as u64;
        if target > MAX_SAFE_INTEGER {
            return Err(ValidationError::TargetOutOfRange);
        }

        entries.sort_unstable_by(|a, b| b.value.cmp(&a.value).then(a.index.cmp(&b.index)));

        let mut suffix_sum = vec![0u128; n + 1];
        for i in (0..n).rev() {
            suffix_sum[i] = suffix_sum[i + 1] + entries[i].value as u128;
        }

        Ok(Problem {
            entries,
            suffix_sum,
            target,
            min_count: params.min_count,
            max_count: params.max_count,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a validated problem; kept for the `len` convention.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, pos: usize) -> Entry {
        self.entries[pos]
    }

    pub fn suffix_sum(&self) -> &[u128] {
        &self.suffix_sum
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn total(&self) -> u128 {
        self.suffix_sum[0]
    }

    /// Sum of the `k` largest values at sorted positions `pos..`.
    pub(crate) fn largest_from(&self, pos: usize, k: usize) -> u128 {
        let end = (pos + k).min(self.len());
        self.suffix_sum[pos] - self.suffix_sum[end]
    }

    /// Sum of the `k` smallest values overall (the tail of the sort order).
    pub(crate) fn smallest(&self, k: usize) -> u128 {
        self.suffix_sum[self.len() - k.min(self.len())]
    }

    /// True when no subset can possibly qualify, so search can be skipped.
    ///
    /// Covers the total-below-target case and the case where even the
    /// `min_count` smallest values overshoot.
    pub fn is_infeasible(&self) -> bool {
        let target = self.target as u128;
        self.total() < target || self.smallest(self.min_count) > target
    }
}

fn validate_numbers(numbers: &[f64]) -> Result<Vec<Entry>, ValidationError> {
    if numbers.is_empty() {
        return Err(ValidationError::EmptyInput);
    }
    numbers
        .iter()
        .enumerate()
        .map(|(index, &raw)| {
            let value = validate_number(index, raw)?;
            Ok(Entry { index, value })
        })
        .collect()
}

fn check_count_range(min: usize, max: usize, n: usize) -> Result<(), ValidationError> {
    if min > max || max > n {
        return Err(ValidationError::InvalidCountRange { min, max, n });
    }
    Ok(())
}

fn validate_number(index: usize, raw: f64) -> Result<u64, ValidationError> {
    if raw.is_nan() {
        return Err(ValidationError::NonIntegerValue(index));
    }
    if raw <= 0.0 {
        return Err(ValidationError::NonPositiveValue(index));
    }
    if raw.is_infinite() || raw > MAX_SAFE_INTEGER as f64 {
        return Err(ValidationError::ValueOutOfRange(index));
    }
    if raw.fract() != 0.0 {
        return Err(ValidationError::NonIntegerValue(index));
    }
    Ok(raw as u64)
}
