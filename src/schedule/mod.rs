pub mod daily;
pub mod monthly;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::warnings::ScheduleWarning;

pub use daily::generate_daily_schedule;
pub use monthly::generate_monthly_schedule;

/// tolerance for final balance checks
pub const FINAL_BALANCE_TOLERANCE: Money = Money::ONE;

/// one period of a monthly schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub period: u32,
    pub date: NaiveDate,
    pub opening_balance: Money,
    pub drawdown: Money,
    pub balance_before_interest: Money,
    /// annual rate applied this period
    pub rate: Rate,
    pub interest: Money,
    /// negative while interest is being capitalised
    pub regular_principal: Money,
    pub custom_capital: Money,
    pub total_principal: Money,
    pub total_payment: Money,
    pub ending_balance: Money,
}

/// one day of a daily schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLedgerRow {
    pub day: u32,
    pub date: NaiveDate,
    pub beginning_balance: Money,
    /// floating rate only
    pub prime: Option<Rate>,
    /// floating rate only
    pub margin: Option<Rate>,
    pub effective_rate: Rate,
    pub daily_rate: Rate,
    pub daily_interest: Money,
    pub capital_payment: Option<Money>,
    pub ending_balance: Money,
    /// set on capitalisation days (month end and maturity)
    pub capitalised_interest: Option<Money>,
}

/// output of the monthly engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySchedule {
    pub rows: Vec<LedgerRow>,
    pub warnings: Vec<ScheduleWarning>,
    /// installment used for the run (interest for the first period on
    /// interest only, zero for structured capital)
    pub installment: Money,
    /// facility amount plus capitalised fees
    pub full_capital: Money,
}

impl MonthlySchedule {
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary::from_rows(&self.rows)
    }

    pub fn final_balance(&self) -> Money {
        self.rows.last().map(|r| r.ending_balance).unwrap_or(Money::ZERO)
    }

    /// warning messages for display
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }
}

/// output of the daily engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub rows: Vec<DailyLedgerRow>,
    pub warnings: Vec<ScheduleWarning>,
    /// amount paid on each regular payment date
    pub payment_amount: Money,
}

impl DailySchedule {
    pub fn summary(&self) -> DailySummary {
        DailySummary::from_rows(&self.rows)
    }

    pub fn final_balance(&self) -> Money {
        self.rows.last().map(|r| r.ending_balance).unwrap_or(Money::ZERO)
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(|w| w.to_string()).collect()
    }
}

/// headline totals of a monthly schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub total_drawn: Money,
    pub total_interest: Money,
    /// repayments only; capitalisation periods are excluded
    pub total_principal_repaid: Money,
    pub total_custom_capital: Money,
    pub total_payments: Money,
    pub final_balance: Money,
}

impl ScheduleSummary {
    pub fn from_rows(rows: &[LedgerRow]) -> Self {
        Self {
            total_drawn: rows.iter().map(|r| r.drawdown).sum(),
            total_interest: rows.iter().map(|r| r.interest).sum(),
            total_principal_repaid: rows
                .iter()
                .map(|r| r.total_principal)
                .filter(|p| p.is_positive())
                .sum(),
            total_custom_capital: rows.iter().map(|r| r.custom_capital).sum(),
            total_payments: rows.iter().map(|r| r.total_payment).sum(),
            final_balance: rows.last().map(|r| r.ending_balance).unwrap_or(Money::ZERO),
        }
    }
}

/// headline totals of a daily schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub total_interest: Money,
    pub total_capital_payments: Money,
    pub total_capitalised_interest: Money,
    pub final_balance: Money,
}

impl DailySummary {
    pub fn from_rows(rows: &[DailyLedgerRow]) -> Self {
        Self {
            total_interest: rows.iter().map(|r| r.daily_interest).sum(),
            total_capital_payments: rows.iter().filter_map(|r| r.capital_payment).sum(),
            total_capitalised_interest: rows.iter().filter_map(|r| r.capitalised_interest).sum(),
            final_balance: rows.last().map(|r| r.ending_balance).unwrap_or(Money::ZERO),
        }
    }
}
