//! Equality predicates over records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::record::Record;

/// A selector value: either the `All` wildcard or one concrete value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(v) => v == value,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Selection::All => None,
            Selection::Only(v) => Some(v),
        }
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    /// `"All"` (any case) is the wildcard; anything else parses as `T`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("All"),
            Selection::Only(v) => v.fmt(f),
        }
    }
}

/// Dashboard filter selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub disease: Selection<String>,
    pub district: Selection<String>,
    pub year: Selection<i32>,
    pub month: Selection<u32>,
}

impl FilterCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_disease(mut self, disease: &str) -> Self {
        self.disease = Selection::Only(disease.to_string());
        self
    }

    pub fn with_district(mut self, district: &str) -> Self {
        self.district = Selection::Only(district.to_string());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Selection::Only(year);
        self
    }

    pub fn with_month(mut self, month: u32) -> Self {
        self.month = Selection::Only(month);
        self
    }

    /// A record passes when every non-`All` criterion matches.
    pub fn accepts(&self, record: &Record) -> bool {
        self.disease.matches(&record.disease_clean)
            && self.district.matches(&record.district)
            && self.year.matches(&record.year)
            && match &self.month {
                Selection::All => true,
                Selection::Only(m) => record.month == Some(*m),
            }
    }
}

/// Returns the records accepted by `criteria`, in input order.
pub fn filter(records: &[Record], criteria: &FilterCriteria) -> Vec<Record> {
    records
        .iter()
        .filter(|r| criteria.accepts(r))
        .cloned()
        .collect()
}
