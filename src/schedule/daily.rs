use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::config::{DailyLoanConfig, DailyRate};
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::interest::{prime_on, InterestAccumulator};
use crate::payments::installment;
use crate::types::{DailyRepaymentType, PaymentFrequency};
use crate::warnings::{ScheduleWarning, WarningLog};

use super::{DailyLedgerRow, DailySchedule, FINAL_BALANCE_TOLERANCE};

/// precision of the daily rate shown on ledger rows
const DAILY_RATE_DP: u32 = 8;

/// Generate the day-by-day ledger from the start date to maturity inclusive.
///
/// Interest accrues daily on the opening balance of each day and is added to
/// the balance on the last day of every month and on maturity.
pub fn generate_daily_schedule(config: &DailyLoanConfig) -> Result<DailySchedule> {
    let config = config.clone().validated()?;
    DailyEngine::new(&config)?.run()
}

/// rate components in force on a given day
struct DayRate {
    prime: Option<Rate>,
    margin: Option<Rate>,
    effective: Rate,
}

struct DailyEngine<'a> {
    config: &'a DailyLoanConfig,
    maturity: NaiveDate,
    payment_amount: Money,
    custom_payments: BTreeMap<NaiveDate, Money>,
    log: WarningLog,
}

impl<'a> DailyEngine<'a> {
    fn new(config: &'a DailyLoanConfig) -> Result<Self> {
        let maturity = config.maturity_date()?;
        let payment_amount = regular_payment_amount(config)?;

        let mut custom_payments = BTreeMap::new();
        if config.frequency == PaymentFrequency::Custom {
            for payment in &config.custom_payments {
                *custom_payments.entry(payment.date).or_insert(Money::ZERO) += payment.amount;
            }
        }

        Ok(Self {
            config,
            maturity,
            payment_amount,
            custom_payments,
            log: WarningLog::new(),
        })
    }

    fn run(mut self) -> Result<DailySchedule> {
        let config = self.config;

        tracing::debug!(
            start = %config.start_date,
            maturity = %self.maturity,
            repayment = %config.repayment,
            frequency = %config.frequency,
            payment = %self.payment_amount,
            "generating daily schedule"
        );

        let mut rows = Vec::new();
        let mut accumulator = InterestAccumulator::new();
        let mut balance = config.loan_amount;
        let mut date = config.start_date;
        let mut day = 1u32;

        loop {
            let beginning_balance = balance;

            let rate = self.rate_on(date);
            let daily_rate = rate.effective.daily_rate();
            let daily_interest = accumulator.accrue_daily(balance, daily_rate);

            let requested = self.capital_due(date);
            let capital_payment = if requested.is_positive() {
                let applied = requested.min(balance.floor_zero());
                if applied < requested {
                    self.log.emit(ScheduleWarning::CapitalPaymentClipped {
                        date,
                        requested: requested.round_currency(),
                        applied: applied.round_currency(),
                    });
                }
                balance -= applied;
                Some(applied)
            } else {
                None
            };

            let capitalised_interest = if self.is_capitalisation_day(date) {
                let interest = accumulator.capitalise();
                balance += interest;
                Some(interest)
            } else {
                None
            };

            tracing::trace!(day, %date, interest = %daily_interest, balance = %balance, "day");

            rows.push(DailyLedgerRow {
                day,
                date,
                beginning_balance: beginning_balance.round_currency(),
                prime: rate.prime,
                margin: rate.margin,
                effective_rate: rate.effective,
                daily_rate: Rate::from_decimal(daily_rate.as_decimal().round_dp(DAILY_RATE_DP)),
                daily_interest: daily_interest.round_currency(),
                capital_payment: capital_payment.map(|p| p.round_currency()),
                ending_balance: balance.round_currency(),
                capitalised_interest: capitalised_interest.map(|i| i.round_currency()),
            });

            if date >= self.maturity {
                break;
            }
            date = date.succ_opt().ok_or_else(|| ScheduleError::DailyDateOutOfRange {
                date,
                message: "no following calendar day".to_string(),
            })?;
            day += 1;
        }

        if matches!(config.repayment, DailyRepaymentType::Amortising { .. }) {
            let actual = balance.round_currency();
            if actual.abs() > FINAL_BALANCE_TOLERANCE {
                self.log.emit(ScheduleWarning::FinalBalanceMismatch {
                    period: day,
                    actual,
                    expected: Money::ZERO,
                });
            }
        }

        let warnings = self.log.take_warnings();
        tracing::debug!(rows = rows.len(), warnings = warnings.len(), "daily schedule complete");

        Ok(DailySchedule {
            rows,
            warnings,
            payment_amount: self.payment_amount,
        })
    }

    fn rate_on(&self, date: NaiveDate) -> DayRate {
        match &self.config.rate {
            DailyRate::Fixed(rate) => DayRate {
                prime: None,
                margin: None,
                effective: *rate,
            },
            DailyRate::Floating { margin, prime_changes } => {
                // validation guarantees an initial entry
                let prime = prime_on(prime_changes, date).unwrap_or(Rate::ZERO);
                DayRate {
                    prime: Some(prime),
                    margin: Some(*margin),
                    effective: prime + *margin,
                }
            }
        }
    }

    /// capital requested for the day before clipping to the balance
    fn capital_due(&self, date: NaiveDate) -> Money {
        let mut due = if self.config.frequency == PaymentFrequency::Custom {
            self.custom_payments.get(&date).copied().unwrap_or(Money::ZERO)
        } else if self.is_regular_payment_day(date) {
            self.payment_amount
        } else {
            Money::ZERO
        };

        if self.config.repayment == DailyRepaymentType::Bullet && date == self.maturity {
            due += self.config.loan_amount;
        }
        due
    }

    /// day-of-month anchor, plus month alignment for quarterly and annual
    fn is_regular_payment_day(&self, date: NaiveDate) -> bool {
        let config = self.config;
        if date.day() != config.payment_day {
            return false;
        }
        match config.frequency {
            PaymentFrequency::Monthly => true,
            PaymentFrequency::Quarterly => date.month() % 3 == config.start_date.month() % 3,
            PaymentFrequency::Annual => date.month() == config.start_date.month(),
            PaymentFrequency::Custom => false,
        }
    }

    /// last day of a calendar month, or maturity
    fn is_capitalisation_day(&self, date: NaiveDate) -> bool {
        date == self.maturity
            || date
                .succ_opt()
                .map_or(true, |next| next.month() != date.month())
    }
}

/// Amount paid on each regular payment date.
///
/// Amortising loans use the annuity payment on the initial effective rate for
/// the frequency's periodic rate and period count; it is not recalculated when
/// a floating rate moves. Custom frequency has no regular amount.
pub fn regular_payment_amount(config: &DailyLoanConfig) -> Result<Money> {
    let (Some(months), Some(periods_per_year)) = (
        config.frequency.months_per_period(),
        config.frequency.periods_per_year(),
    ) else {
        return Ok(Money::ZERO);
    };

    match &config.repayment {
        DailyRepaymentType::InterestOnly { principal_payment } => Ok(*principal_payment),
        DailyRepaymentType::Amortising { payment_override: Some(payment) } => Ok(*payment),
        DailyRepaymentType::Amortising { payment_override: None } => installment(
            config.initial_rate().periodic_rate(periods_per_year),
            config.term_months / months,
            config.loan_amount,
            Money::ZERO,
        ),
        DailyRepaymentType::Bullet => Ok(Money::ZERO),
        DailyRepaymentType::Custom { payment_amount } => Ok(*payment_amount),
    }
}
