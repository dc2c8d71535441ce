use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::interest::{normalize_prime_changes, normalize_ranges};
use crate::types::{
    CustomCapitalEvent, CustomPayment, DailyRepaymentType, DealInfo, DrawdownEvent, Fee,
    PaymentFrequency, PrimeChange, RatePeriod, RepaymentStructure, StructuredPayment,
};

/// how funds are disbursed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawdownStructure {
    /// full capital in period 1
    Single { date: Option<NaiveDate> },
    /// tranches assigned to periods by calendar month
    Multiple { tranches: Vec<DrawdownEvent> },
}

/// interest rate for the monthly engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateStructure {
    Fixed(Rate),
    Variable(Vec<RatePeriod>),
}

impl RateStructure {
    pub fn prime_linked(prime: Rate, margin: Rate) -> Self {
        RateStructure::Fixed(prime + margin)
    }
}

/// monthly loan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanConfig {
    #[serde(default)]
    pub deal: DealInfo,
    pub facility_amount: Money,
    #[serde(default)]
    pub residual: Money,
    pub term_months: u32,
    pub repayment: RepaymentStructure,
    pub drawdown: DrawdownStructure,
    pub first_payment_date: NaiveDate,
    pub rate: RateStructure,
    #[serde(default)]
    pub custom_capital: Vec<CustomCapitalEvent>,
    #[serde(default)]
    pub structured_payments: Vec<StructuredPayment>,
    #[serde(default)]
    pub fees: Vec<Fee>,
    #[serde(default)]
    pub capitalise_fees: bool,
    #[serde(default)]
    pub capitalisation_months: Option<u32>,
    #[serde(default)]
    pub payment_override: Option<Money>,
}

impl LoanConfig {
    pub fn builder() -> LoanConfigBuilder {
        LoanConfigBuilder::new()
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LoanConfig = serde_json::from_str(json).map_err(|e| {
            ScheduleError::InvalidConfiguration {
                message: format!("loan config: {}", e),
            }
        })?;
        config.validated()
    }

    /// sum of resolved fees, zero unless fees are capitalised
    pub fn total_fees(&self) -> Money {
        if !self.capitalise_fees {
            return Money::ZERO;
        }
        self.fees
            .iter()
            .map(|fee| fee.resolve(self.facility_amount))
            .sum()
    }

    /// facility amount plus capitalised fees
    pub fn full_capital(&self) -> Money {
        (self.facility_amount + self.total_fees()).round_currency()
    }

    /// payment date of the last period
    pub fn final_payment_date(&self) -> Result<NaiveDate> {
        let months = self.term_months.saturating_sub(1);
        self.first_payment_date
            .checked_add_months(Months::new(months))
            .ok_or_else(|| ScheduleError::DateOutOfRange {
                period: self.term_months,
                message: format!("cannot add {} months to {}", months, self.first_payment_date),
            })
    }

    /// normalise ordering and reject invalid configurations
    pub fn validated(mut self) -> Result<Self> {
        if self.term_months == 0 {
            return Err(ScheduleError::InvalidTerm { term: 0 });
        }
        self.final_payment_date()?;
        if self.facility_amount.is_negative() {
            return Err(ScheduleError::negative("facility amount", self.facility_amount));
        }
        if self.residual.is_negative() {
            return Err(ScheduleError::negative("residual", self.residual));
        }
        if let Some(payment) = self.payment_override {
            if payment.is_negative() {
                return Err(ScheduleError::negative("payment override", payment));
            }
        }

        for fee in &self.fees {
            let amount = fee.resolve(self.facility_amount);
            if amount.is_negative() {
                return Err(ScheduleError::negative(&format!("fee '{}'", fee.name), amount));
            }
        }

        if let DrawdownStructure::Multiple { tranches } = &mut self.drawdown {
            if tranches.is_empty() {
                return Err(ScheduleError::EmptySchedule {
                    schedule: "drawdown".to_string(),
                });
            }
            if let Some(bad) = tranches.iter().find(|t| t.amount.is_negative()) {
                return Err(ScheduleError::negative("drawdown", bad.amount));
            }
            tranches.sort_by_key(|t| t.date);
        }

        if let RateStructure::Variable(ranges) = &mut self.rate {
            normalize_ranges(ranges, "rate")?;
        }

        if self.repayment == RepaymentStructure::StructuredCapital {
            normalize_ranges(&mut self.structured_payments, "structured payment")?;
            if let Some(bad) = self
                .structured_payments
                .iter()
                .find(|p| p.principal_amount.is_negative())
            {
                return Err(ScheduleError::negative("structured principal", bad.principal_amount));
            }
        }

        if self.repayment == RepaymentStructure::CapitalisedInterest {
            let months = self.capitalisation_months.unwrap_or(0);
            if months == 0 || months > self.term_months {
                return Err(ScheduleError::InvalidCapitalisationWindow {
                    months,
                    term: self.term_months,
                });
            }
        }

        if let Some(bad) = self.custom_capital.iter().find(|c| c.amount.is_negative()) {
            return Err(ScheduleError::negative("custom capital", bad.amount));
        }

        Ok(self)
    }
}

/// builder for monthly loan configurations
pub struct LoanConfigBuilder {
    deal: DealInfo,
    facility_amount: Option<Money>,
    residual: Money,
    term_months: Option<u32>,
    repayment: RepaymentStructure,
    drawdown: DrawdownStructure,
    first_payment_date: Option<NaiveDate>,
    rate: Option<RateStructure>,
    custom_capital: Vec<CustomCapitalEvent>,
    structured_payments: Vec<StructuredPayment>,
    fees: Vec<Fee>,
    capitalise_fees: bool,
    capitalisation_months: Option<u32>,
    payment_override: Option<Money>,
}

impl Default for LoanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanConfigBuilder {
    pub fn new() -> Self {
        Self {
            deal: DealInfo::default(),
            facility_amount: None,
            residual: Money::ZERO,
            term_months: None,
            repayment: RepaymentStructure::EqualInstallments,
            drawdown: DrawdownStructure::Single { date: None },
            first_payment_date: None,
            rate: None,
            custom_capital: Vec::new(),
            structured_payments: Vec::new(),
            fees: Vec::new(),
            capitalise_fees: false,
            capitalisation_months: None,
            payment_override: None,
        }
    }

    pub fn deal(mut self, client_name: impl Into<String>, facility_name: impl Into<String>) -> Self {
        self.deal = DealInfo::new(client_name, facility_name);
        self
    }

    pub fn facility_amount(mut self, amount: Money) -> Self {
        self.facility_amount = Some(amount);
        self
    }

    pub fn residual(mut self, residual: Money) -> Self {
        self.residual = residual;
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn repayment(mut self, repayment: RepaymentStructure) -> Self {
        self.repayment = repayment;
        self
    }

    pub fn single_drawdown(mut self, date: NaiveDate) -> Self {
        self.drawdown = DrawdownStructure::Single { date: Some(date) };
        self
    }

    pub fn drawdowns(mut self, tranches: Vec<DrawdownEvent>) -> Self {
        self.drawdown = DrawdownStructure::Multiple { tranches };
        self
    }

    pub fn first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    pub fn fixed_rate(mut self, rate: Rate) -> Self {
        self.rate = Some(RateStructure::Fixed(rate));
        self
    }

    pub fn prime_linked_rate(mut self, prime: Rate, margin: Rate) -> Self {
        self.rate = Some(RateStructure::prime_linked(prime, margin));
        self
    }

    pub fn variable_rates(mut self, ranges: Vec<RatePeriod>) -> Self {
        self.rate = Some(RateStructure::Variable(ranges));
        self
    }

    pub fn custom_capital(mut self, events: Vec<CustomCapitalEvent>) -> Self {
        self.custom_capital = events;
        self
    }

    pub fn structured_payments(mut self, payments: Vec<StructuredPayment>) -> Self {
        self.structured_payments = payments;
        self
    }

    /// fees to capitalise into principal
    pub fn capitalised_fees(mut self, fees: Vec<Fee>) -> Self {
        self.fees = fees;
        self.capitalise_fees = true;
        self
    }

    pub fn capitalisation_months(mut self, months: u32) -> Self {
        self.capitalisation_months = Some(months);
        self
    }

    pub fn payment_override(mut self, payment: Money) -> Self {
        self.payment_override = Some(payment);
        self
    }

    pub fn build(self) -> Result<LoanConfig> {
        let facility_amount = self.facility_amount.ok_or(ScheduleError::InvalidConfiguration {
            message: "Facility amount required".to_string(),
        })?;

        let term_months = self.term_months.ok_or(ScheduleError::InvalidConfiguration {
            message: "Term required".to_string(),
        })?;

        let first_payment_date = self.first_payment_date.ok_or(ScheduleError::InvalidConfiguration {
            message: "First payment date required".to_string(),
        })?;

        let rate = self.rate.ok_or(ScheduleError::InvalidConfiguration {
            message: "Rate required".to_string(),
        })?;

        LoanConfig {
            deal: self.deal,
            facility_amount,
            residual: self.residual,
            term_months,
            repayment: self.repayment,
            drawdown: self.drawdown,
            first_payment_date,
            rate,
            custom_capital: self.custom_capital,
            structured_payments: self.structured_payments,
            fees: self.fees,
            capitalise_fees: self.capitalise_fees,
            capitalisation_months: self.capitalisation_months,
            payment_override: self.payment_override,
        }
        .validated()
    }
}

/// interest rate for the daily engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DailyRate {
    Fixed(Rate),
    /// prime + margin, prime following the change list
    Floating {
        margin: Rate,
        prime_changes: Vec<PrimeChange>,
    },
}

/// daily loan configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLoanConfig {
    pub loan_amount: Money,
    pub rate: DailyRate,
    pub start_date: NaiveDate,
    pub term_months: u32,
    pub repayment: DailyRepaymentType,
    pub frequency: PaymentFrequency,
    /// day of month for regular payments, ignored for custom frequency
    pub payment_day: u32,
    #[serde(default)]
    pub custom_payments: Vec<CustomPayment>,
}

impl DailyLoanConfig {
    pub fn builder() -> DailyLoanConfigBuilder {
        DailyLoanConfigBuilder::new()
    }

    /// parse and validate a json configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DailyLoanConfig = serde_json::from_str(json).map_err(|e| {
            ScheduleError::InvalidConfiguration {
                message: format!("daily loan config: {}", e),
            }
        })?;
        config.validated()
    }

    /// start date plus the term in calendar months
    pub fn maturity_date(&self) -> Result<NaiveDate> {
        self.start_date
            .checked_add_months(Months::new(self.term_months))
            .ok_or_else(|| ScheduleError::DailyDateOutOfRange {
                date: self.start_date,
                message: format!("cannot add {} months", self.term_months),
            })
    }

    /// effective annual rate on the start date
    pub fn initial_rate(&self) -> Rate {
        match &self.rate {
            DailyRate::Fixed(rate) => *rate,
            DailyRate::Floating { margin, prime_changes } => {
                crate::interest::prime_on(prime_changes, self.start_date).unwrap_or(Rate::ZERO) + *margin
            }
        }
    }

    /// normalise ordering and reject invalid configurations
    pub fn validated(mut self) -> Result<Self> {
        if self.term_months == 0 {
            return Err(ScheduleError::InvalidTerm { term: 0 });
        }
        if self.loan_amount.is_negative() {
            return Err(ScheduleError::negative("loan amount", self.loan_amount));
        }

        if let DailyRate::Floating { prime_changes, .. } = &mut self.rate {
            normalize_prime_changes(prime_changes)?;
        }

        match &self.repayment {
            DailyRepaymentType::InterestOnly { principal_payment } if principal_payment.is_negative() => {
                return Err(ScheduleError::negative("principal payment", *principal_payment));
            }
            DailyRepaymentType::Custom { payment_amount } if payment_amount.is_negative() => {
                return Err(ScheduleError::negative("payment amount", *payment_amount));
            }
            DailyRepaymentType::Amortising { payment_override: Some(p) } if p.is_negative() => {
                return Err(ScheduleError::negative("payment override", *p));
            }
            _ => {}
        }

        if let Some(months) = self.frequency.months_per_period() {
            if !(1..=28).contains(&self.payment_day) {
                return Err(ScheduleError::InvalidPaymentDay { day: self.payment_day });
            }
            let amortising = matches!(self.repayment, DailyRepaymentType::Amortising { payment_override: None });
            if amortising && self.term_months % months != 0 {
                return Err(ScheduleError::UnevenPaymentTerm {
                    term_months: self.term_months,
                    frequency: self.frequency.to_string(),
                });
            }
        }

        if let Some(bad) = self.custom_payments.iter().find(|p| p.amount.is_negative()) {
            return Err(ScheduleError::negative("custom payment", bad.amount));
        }
        self.custom_payments.sort_by_key(|p| p.date);

        self.maturity_date()?;

        Ok(self)
    }
}

/// builder for daily loan configurations
pub struct DailyLoanConfigBuilder {
    loan_amount: Option<Money>,
    rate: Option<DailyRate>,
    start_date: Option<NaiveDate>,
    term_months: Option<u32>,
    repayment: DailyRepaymentType,
    frequency: PaymentFrequency,
    payment_day: u32,
    custom_payments: Vec<CustomPayment>,
}

impl Default for DailyLoanConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DailyLoanConfigBuilder {
    pub fn new() -> Self {
        Self {
            loan_amount: None,
            rate: None,
            start_date: None,
            term_months: None,
            repayment: DailyRepaymentType::InterestOnly { principal_payment: Money::ZERO },
            frequency: PaymentFrequency::Monthly,
            payment_day: 1,
            custom_payments: Vec::new(),
        }
    }

    pub fn loan_amount(mut self, amount: Money) -> Self {
        self.loan_amount = Some(amount);
        self
    }

    pub fn fixed_rate(mut self, rate: Rate) -> Self {
        self.rate = Some(DailyRate::Fixed(rate));
        self
    }

    /// floating rate: initial prime plus margin, with dated prime changes
    pub fn floating_rate(mut self, initial_prime: Rate, margin: Rate, changes: Vec<PrimeChange>) -> Self {
        let mut prime_changes = vec![PrimeChange::initial(initial_prime)];
        prime_changes.extend(changes);
        self.rate = Some(DailyRate::Floating { margin, prime_changes });
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn repayment(mut self, repayment: DailyRepaymentType) -> Self {
        self.repayment = repayment;
        self
    }

    pub fn frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn payment_day(mut self, day: u32) -> Self {
        self.payment_day = day;
        self
    }

    /// explicit dated payments; switches the frequency to custom
    pub fn custom_payments(mut self, payments: Vec<CustomPayment>) -> Self {
        self.custom_payments = payments;
        self.frequency = PaymentFrequency::Custom;
        self
    }

    pub fn build(self) -> Result<DailyLoanConfig> {
        let loan_amount = self.loan_amount.ok_or(ScheduleError::InvalidConfiguration {
            message: "Loan amount required".to_string(),
        })?;

        let rate = self.rate.ok_or(ScheduleError::InvalidConfiguration {
            message: "Rate required".to_string(),
        })?;

        let start_date = self.start_date.ok_or(ScheduleError::InvalidConfiguration {
            message: "Start date required".to_string(),
        })?;

        let term_months = self.term_months.ok_or(ScheduleError::InvalidConfiguration {
            message: "Term required".to_string(),
        })?;

        DailyLoanConfig {
            loan_amount,
            rate,
            start_date,
            term_months,
            repayment: self.repayment,
            frequency: self.frequency,
            payment_day: self.payment_day,
            custom_payments: self.custom_payments,
        }
        .validated()
    }
}
