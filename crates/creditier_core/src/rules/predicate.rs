//! Rule predicates over one record.
//!
//! # Invariants
//! - A null amount fails every comparison.
//! - Ratio predicates never divide unless `total_amount > 0`.

use crate::model::record::Record;
use serde::{Deserialize, Serialize};

/// One side of an amount range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: f64,
    #[serde(default)]
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }
}

/// Optional lower/upper bounds on `available_amount`.
///
/// Inclusivity is explicit per side so boundary policy stays caller
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Bound>,
}

impl AmountRange {
    /// `value < max`.
    pub fn below(max: f64) -> Self {
        Self {
            min: None,
            max: Some(Bound::exclusive(max)),
        }
    }

    /// `value >= min`.
    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(Bound::inclusive(min)),
            max: None,
        }
    }

    /// Half-open `[min, max)`.
    pub fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(Bound::inclusive(min)),
            max: Some(Bound::exclusive(max)),
        }
    }

    /// Whether `value` lies within the range. `None` never does.
    pub fn contains(&self, value: Option<f64>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let above_min = match self.min {
            Some(bound) if bound.inclusive => value >= bound.value,
            Some(bound) => value > bound.value,
            None => true,
        };
        let below_max = match self.max {
            Some(bound) if bound.inclusive => value <= bound.value,
            Some(bound) => value < bound.value,
            None => true,
        };
        above_min && below_max
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        for bound in self.min.iter().chain(self.max.iter()) {
            if !bound.value.is_finite() {
                return Err(format!("bound {} is not finite", bound.value));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            let empty = min.value > max.value
                || (min.value == max.value && !(min.inclusive && max.inclusive));
            if empty {
                return Err(format!(
                    "range from {} to {} cannot contain any value",
                    min.value, max.value
                ));
            }
        }
        Ok(())
    }
}

/// Classification predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Compares `available_amount` against fixed bounds.
    Threshold { available: AmountRange },
    /// `available_amount / total_amount < below`, guarded by `total_amount > 0`,
    /// with `available_amount` inside `available`.
    Ratio {
        below: f64,
        #[serde(default)]
        available: AmountRange,
    },
    /// Both amounts present and different.
    AmountsDiffer,
}

impl Predicate {
    pub fn threshold(available: AmountRange) -> Self {
        Self::Threshold { available }
    }

    pub fn ratio_below(below: f64, available: AmountRange) -> Self {
        Self::Ratio { below, available }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Self::Threshold { available } => available.contains(record.available_amount()),
            Self::Ratio { below, available } => {
                let (Some(amount), Some(total)) = (record.available_amount(), record.total_amount())
                else {
                    return false;
                };
                if total <= 0.0 || !available.contains(Some(amount)) {
                    return false;
                }
                amount / total < *below
            }
            Self::AmountsDiffer => match (record.available_amount(), record.total_amount()) {
                (Some(amount), Some(total)) => amount != total,
                _ => false,
            },
        }
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        match self {
            Self::Threshold { available } => available.check(),
            Self::Ratio { below, available } => {
                if !below.is_finite() {
                    return Err(format!("ratio limit {below} is not finite"));
                }
                available.check()
            }
            Self::AmountsDiffer => Ok(()),
        }
    }
}
