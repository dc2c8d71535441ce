use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::{Money, Rate};

/// repayment structure for the monthly engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepaymentStructure {
    /// fixed installment covering interest and principal
    EqualInstallments,
    /// interest each period, principal (less residual) in the final period
    InterestOnly,
    /// interest added to principal for a window, then equal installments
    CapitalisedInterest,
    /// principal amounts scheduled per period range
    StructuredCapital,
}

impl fmt::Display for RepaymentStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RepaymentStructure::EqualInstallments => "Equal Installments",
            RepaymentStructure::InterestOnly => "Interest Only",
            RepaymentStructure::CapitalisedInterest => "Capitalised Interest",
            RepaymentStructure::StructuredCapital => "Structured Capital",
        };
        f.write_str(label)
    }
}

/// calendar year-month, the key for custom capital events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// signed number of months from `other` to `self`
    pub fn months_since(&self, other: YearMonth) -> i64 {
        (self.year as i64 - other.year as i64) * 12 + (self.month as i64 - other.month as i64)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// a disbursement tranche
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawdownEvent {
    pub date: NaiveDate,
    pub amount: Money,
}

impl DrawdownEvent {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self { date, amount }
    }
}

/// inclusive range of periods in a rate or payment schedule
pub trait PeriodRange {
    fn from_period(&self) -> u32;
    fn to_period(&self) -> u32;

    fn contains(&self, period: u32) -> bool {
        self.from_period() <= period && period <= self.to_period()
    }
}

/// annual rate applying to a range of periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePeriod {
    pub from_period: u32,
    pub to_period: u32,
    pub rate: Rate,
}

impl RatePeriod {
    pub fn new(from_period: u32, to_period: u32, rate: Rate) -> Self {
        Self { from_period, to_period, rate }
    }

    pub fn prime_linked(from_period: u32, to_period: u32, prime: Rate, margin: Rate) -> Self {
        Self::new(from_period, to_period, prime + margin)
    }
}

impl PeriodRange for RatePeriod {
    fn from_period(&self) -> u32 {
        self.from_period
    }

    fn to_period(&self) -> u32 {
        self.to_period
    }
}

/// scheduled principal repayment for a range of periods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredPayment {
    pub from_period: u32,
    pub to_period: u32,
    pub principal_amount: Money,
}

impl StructuredPayment {
    pub fn new(from_period: u32, to_period: u32, principal_amount: Money) -> Self {
        Self { from_period, to_period, principal_amount }
    }
}

impl PeriodRange for StructuredPayment {
    fn from_period(&self) -> u32 {
        self.from_period
    }

    fn to_period(&self) -> u32 {
        self.to_period
    }
}

/// one-off capital repayment, applied in the period whose payment date falls
/// in the same calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomCapitalEvent {
    pub date: NaiveDate,
    pub amount: Money,
}

impl CustomCapitalEvent {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self { date, amount }
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}

/// how a fee amount is specified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeAmount {
    Nominal(Money),
    /// percentage of the facility amount (2.3 for 2.3%)
    PercentOfFacility(Decimal),
}

/// fee capitalised into principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    pub name: String,
    pub amount: FeeAmount,
}

impl Fee {
    pub fn nominal(name: impl Into<String>, amount: Money) -> Self {
        Self {
            name: name.into(),
            amount: FeeAmount::Nominal(amount),
        }
    }

    pub fn percent_of_facility(name: impl Into<String>, pct: Decimal) -> Self {
        Self {
            name: name.into(),
            amount: FeeAmount::PercentOfFacility(pct),
        }
    }

    /// resolved fee in currency
    pub fn resolve(&self, facility_amount: Money) -> Money {
        match &self.amount {
            FeeAmount::Nominal(amount) => *amount,
            FeeAmount::PercentOfFacility(pct) => facility_amount.percentage(*pct).round_currency(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.amount {
            FeeAmount::Nominal(_) => "Nominal Amount",
            FeeAmount::PercentOfFacility(_) => "% of Facility",
        }
    }
}

/// client and deal labels carried through to exports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DealInfo {
    pub client_name: String,
    pub facility_name: String,
}

impl DealInfo {
    pub fn new(client_name: impl Into<String>, facility_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
            facility_name: facility_name.into(),
        }
    }
}

/// prime rate level; the entry without a date is the initial prime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimeChange {
    pub effective_date: Option<NaiveDate>,
    pub prime: Rate,
}

impl PrimeChange {
    pub fn initial(prime: Rate) -> Self {
        Self { effective_date: None, prime }
    }

    pub fn on(date: NaiveDate, prime: Rate) -> Self {
        Self { effective_date: Some(date), prime }
    }
}

/// explicit capital payment on an exact date (daily engine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPayment {
    pub date: NaiveDate,
    pub amount: Money,
}

impl CustomPayment {
    pub fn new(date: NaiveDate, amount: Money) -> Self {
        Self { date, amount }
    }
}

/// capital payment cadence for the daily engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentFrequency {
    Monthly,
    Quarterly,
    Annual,
    /// payments only on the dates in the custom payment list
    Custom,
}

impl PaymentFrequency {
    /// months between regular payments, none for custom
    pub fn months_per_period(&self) -> Option<u32> {
        match self {
            PaymentFrequency::Monthly => Some(1),
            PaymentFrequency::Quarterly => Some(3),
            PaymentFrequency::Annual => Some(12),
            PaymentFrequency::Custom => None,
        }
    }

    pub fn periods_per_year(&self) -> Option<u32> {
        self.months_per_period().map(|m| 12 / m)
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentFrequency::Monthly => "Monthly",
            PaymentFrequency::Quarterly => "Quarterly",
            PaymentFrequency::Annual => "Annual",
            PaymentFrequency::Custom => "Custom",
        };
        f.write_str(label)
    }
}

/// repayment type for the daily engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyRepaymentType {
    /// interest capitalises; optional principal paid on each payment date
    InterestOnly { principal_payment: Money },
    /// annuity payment on each payment date, calculated unless overridden
    Amortising { payment_override: Option<Money> },
    /// original loan amount repaid at maturity
    Bullet,
    /// fixed amount on each payment date
    Custom { payment_amount: Money },
}

impl fmt::Display for DailyRepaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DailyRepaymentType::InterestOnly { .. } => "Interest Only",
            DailyRepaymentType::Amortising { .. } => "Amortising",
            DailyRepaymentType::Bullet => "Bullet",
            DailyRepaymentType::Custom { .. } => "Custom",
        };
        f.write_str(label)
    }
}
