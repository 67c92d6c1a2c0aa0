//! The query plan: everything the run will do, decided before any data is read.

use crate::config::job_config::{JobConfig, ReductionConfig};
use crate::domain::calendar::{enumerate_windows, CalendarWindow};
use crate::utils::error::{Result, SstError};
use crate::utils::validation;
use std::fmt;

/// Labels carry a 4-digit year.
pub const YEAR_RANGE: (i32, i32) = (1000, 9999);

/// Immutable description of one monthly-mean job.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub band: String,
    pub start_year: i32,
    pub end_year: i32,
    pub reduction: ReductionConfig,
}

impl QueryPlan {
    pub fn new(
        band: impl Into<String>,
        start_year: i32,
        end_year: i32,
        reduction: ReductionConfig,
    ) -> Result<Self> {
        validation::validate_range("period.start_year", start_year, YEAR_RANGE.0, YEAR_RANGE.1)?;
        validation::validate_range("period.end_year", end_year, YEAR_RANGE.0, YEAR_RANGE.1)?;
        if start_year > end_year {
            return Err(SstError::ConfigValidationError {
                field: "period".to_string(),
                message: format!("start_year {} is after end_year {}", start_year, end_year),
            });
        }
        Ok(Self {
            band: band.into(),
            start_year,
            end_year,
            reduction,
        })
    }

    pub fn from_config(config: &JobConfig) -> Result<Self> {
        Self::new(
            config.band(),
            config.period.start_year,
            config.period.end_year,
            config.reduction,
        )
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start_year..=self.end_year
    }

    pub fn windows(&self) -> Vec<CalendarWindow> {
        enumerate_windows(self.start_year, self.end_year)
    }

    pub fn record_count(&self) -> usize {
        12 * self.years().count()
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  select band '{}'", self.band)?;
        writeln!(f, "  filter scenes intersecting region")?;
        writeln!(
            f,
            "  for {}..={} x January..December: calendar filter (UTC), temporal mean, areal mean",
            self.start_year, self.end_year
        )?;
        writeln!(
            f,
            "  scale {} (best effort: {}, max pixels: {})",
            self.reduction.scale, self.reduction.best_effort, self.reduction.max_pixels
        )?;
        write!(f, "  expected records: {}", self.record_count())
    }
}
