use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Money;
use crate::types::YearMonth;

/// recoverable anomalies found while generating a schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleWarning {
    /// drawdown assigned to a period past the term, not applied
    DrawdownBeyondTerm {
        date: NaiveDate,
        amount: Money,
        period: u32,
        term: u32,
    },
    /// custom capital reduced so the balance cannot go negative
    CustomCapitalClipped {
        period: u32,
        requested: Money,
        applied: Money,
    },
    /// two custom capital events keyed to the same month; the later one is used
    CustomCapitalCollision {
        year_month: YearMonth,
        replaced: Money,
        kept: Money,
    },
    /// custom capital event whose month has no period in the schedule
    CustomCapitalOutsideSchedule {
        year_month: YearMonth,
        amount: Money,
    },
    /// daily capital payment reduced to the outstanding balance
    CapitalPaymentClipped {
        date: NaiveDate,
        requested: Money,
        applied: Money,
    },
    /// final balance differs from the residual by more than the tolerance
    FinalBalanceMismatch {
        period: u32,
        actual: Money,
        expected: Money,
    },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::DrawdownBeyondTerm { date, amount, period, term } => write!(
                f,
                "drawdown of {} on {} falls in period {} after the {}-period term and was ignored",
                amount, date, period, term
            ),
            ScheduleWarning::CustomCapitalClipped { period, requested, applied } => write!(
                f,
                "period {}: custom capital of {} exceeds the remaining balance, applied {}",
                period, requested, applied
            ),
            ScheduleWarning::CustomCapitalCollision { year_month, replaced, kept } => write!(
                f,
                "multiple custom capital payments in {}: {} replaced by {}",
                year_month, replaced, kept
            ),
            ScheduleWarning::CustomCapitalOutsideSchedule { year_month, amount } => write!(
                f,
                "custom capital of {} in {} does not match any payment date and was ignored",
                amount, year_month
            ),
            ScheduleWarning::CapitalPaymentClipped { date, requested, applied } => write!(
                f,
                "{}: capital payment of {} exceeds the outstanding balance, applied {}",
                date, requested, applied
            ),
            ScheduleWarning::FinalBalanceMismatch { period, actual, expected } => write!(
                f,
                "final balance {} after period {} differs from expected {}",
                actual, period, expected
            ),
        }
    }
}

/// warning log for collecting anomalies during a run
#[derive(Debug, Default)]
pub struct WarningLog {
    warnings: Vec<ScheduleWarning>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    pub fn emit(&mut self, warning: ScheduleWarning) {
        tracing::warn!(%warning, "schedule anomaly");
        self.warnings.push(warning);
    }

    pub fn take_warnings(&mut self) -> Vec<ScheduleWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn warnings(&self) -> &[ScheduleWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }
}
