use chrono::NaiveDate;
use thiserror::Error;

use crate::decimal::Money;

/// configuration and calculation errors; all of these are raised before the
/// first ledger row is produced
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("invalid term: {term} periods, must be at least 1")]
    InvalidTerm {
        term: u32,
    },

    #[error("negative {field}: {amount}")]
    NegativeAmount {
        field: String,
        amount: Money,
    },

    #[error("inverted {schedule} range at entry {index}: from period {from} is after to period {to}")]
    InvertedRange {
        schedule: String,
        index: usize,
        from: u32,
        to: u32,
    },

    #[error("overlapping {schedule} ranges: {first_from}..={first_to} and {second_from}..={second_to}")]
    OverlappingRanges {
        schedule: String,
        first_from: u32,
        first_to: u32,
        second_from: u32,
        second_to: u32,
    },

    #[error("{schedule} schedule is empty")]
    EmptySchedule {
        schedule: String,
    },

    #[error("invalid period {period}: periods are numbered from 1")]
    InvalidPeriod {
        period: u32,
    },

    #[error("capitalisation window of {months} months must be within 1..={term}")]
    InvalidCapitalisationWindow {
        months: u32,
        term: u32,
    },

    #[error("payment day {day} must be within 1..=28")]
    InvalidPaymentDay {
        day: u32,
    },

    #[error("term of {term_months} months is not a whole number of {frequency} payment periods")]
    UnevenPaymentTerm {
        term_months: u32,
        frequency: String,
    },

    #[error("invalid prime rate changes: {message}")]
    InvalidPrimeChanges {
        message: String,
    },

    #[error("date out of range at period {period}: {message}")]
    DateOutOfRange {
        period: u32,
        message: String,
    },

    #[error("date out of range after {date}: {message}")]
    DailyDateOutOfRange {
        date: NaiveDate,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },
}

impl ScheduleError {
    pub(crate) fn negative(field: &str, amount: Money) -> Self {
        ScheduleError::NegativeAmount {
            field: field.to_string(),
            amount,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
