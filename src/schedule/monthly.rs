use std::collections::{BTreeMap, BTreeSet};

use chrono::{Months, NaiveDate};

use crate::config::{DrawdownStructure, LoanConfig, RateStructure};
use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::interest::{resolve_rate, resolve_structured_principal};
use crate::payments::installment;
use crate::types::{RepaymentStructure, YearMonth};
use crate::warnings::{ScheduleWarning, WarningLog};

use super::{LedgerRow, MonthlySchedule, FINAL_BALANCE_TOLERANCE};

/// Generate the monthly ledger for a loan.
///
/// The configuration is validated first; an invalid configuration produces an
/// error and no rows. Recoverable anomalies are returned as warnings alongside
/// the rows.
pub fn generate_monthly_schedule(config: &LoanConfig) -> Result<MonthlySchedule> {
    let config = config.clone().validated()?;
    MonthlyEngine::new(&config).run()
}

/// single forward pass over periods 1..=term
struct MonthlyEngine<'a> {
    config: &'a LoanConfig,
    full_capital: Money,
    log: WarningLog,
}

impl<'a> MonthlyEngine<'a> {
    fn new(config: &'a LoanConfig) -> Self {
        Self {
            config,
            full_capital: config.full_capital(),
            log: WarningLog::new(),
        }
    }

    fn run(mut self) -> Result<MonthlySchedule> {
        let config = self.config;
        let term = config.term_months;

        tracing::debug!(
            term,
            structure = %config.repayment,
            full_capital = %self.full_capital,
            "generating monthly schedule"
        );

        let installment = self.installment()?;
        let drawdowns = self.assign_drawdowns();
        let custom_capital = self.index_custom_capital();
        let mut used_months = BTreeSet::new();

        let mut rows = Vec::with_capacity(term as usize);
        let mut balance = Money::ZERO;
        let mut date = config.first_payment_date;

        for period in 1..=term {
            let opening_balance = balance;

            let drawdown = drawdowns.get(&period).copied().unwrap_or(Money::ZERO);
            balance += drawdown;
            let balance_before_interest = balance.round_currency();

            let rate = self.annual_rate(period)?;
            let interest = balance_before_interest
                .interest_at(rate.monthly_rate())
                .round_currency();

            let (mut regular_principal, mut regular_payment) =
                self.regular_repayment(period, interest, installment)?;

            if period == term {
                if config.repayment == RepaymentStructure::InterestOnly {
                    regular_principal = (balance_before_interest - config.residual).floor_zero();
                    regular_payment = interest + regular_principal;
                } else if config.residual.is_positive() {
                    let max_principal = (balance_before_interest - config.residual).floor_zero();
                    regular_principal = regular_principal.min(max_principal);
                    regular_payment = interest + regular_principal;
                }
            }

            let year_month = YearMonth::of(date);
            let custom = match custom_capital.get(&year_month) {
                Some(&requested) => {
                    used_months.insert(year_month);
                    let remaining = (balance_before_interest - regular_principal).floor_zero();
                    let applied = requested.min(remaining);
                    if applied < requested {
                        self.log.emit(ScheduleWarning::CustomCapitalClipped {
                            period,
                            requested,
                            applied,
                        });
                    }
                    applied
                }
                None => Money::ZERO,
            };

            let total_principal = regular_principal + custom;
            let total_payment = interest + total_principal;
            balance = (balance_before_interest - total_principal)
                .round_currency()
                .floor_zero();

            tracing::trace!(
                period,
                %date,
                %interest,
                principal = %total_principal,
                balance = %balance,
                payment = %regular_payment,
                "period"
            );

            rows.push(LedgerRow {
                period,
                date,
                opening_balance: opening_balance.round_currency(),
                drawdown: drawdown.round_currency(),
                balance_before_interest,
                rate,
                interest,
                regular_principal,
                custom_capital: custom,
                total_principal,
                total_payment,
                ending_balance: balance,
            });

            if period < term {
                date = date
                    .checked_add_months(Months::new(1))
                    .ok_or_else(|| ScheduleError::DateOutOfRange {
                        period,
                        message: format!("cannot advance {} by one month", date),
                    })?;
            }
        }

        for (year_month, amount) in custom_capital {
            if !used_months.contains(&year_month) {
                self.log.emit(ScheduleWarning::CustomCapitalOutsideSchedule { year_month, amount });
            }
        }

        let expected = config.residual;
        if (balance - expected).abs() > FINAL_BALANCE_TOLERANCE {
            self.log.emit(ScheduleWarning::FinalBalanceMismatch {
                period: term,
                actual: balance,
                expected,
            });
        }

        let warnings = self.log.take_warnings();
        tracing::debug!(rows = rows.len(), warnings = warnings.len(), "monthly schedule complete");

        Ok(MonthlySchedule {
            rows,
            warnings,
            installment,
            full_capital: self.full_capital,
        })
    }

    /// annual rate for a period, fixed or from the variable schedule
    fn annual_rate(&self, period: u32) -> Result<Rate> {
        match &self.config.rate {
            RateStructure::Fixed(rate) => Ok(*rate),
            RateStructure::Variable(ranges) => resolve_rate(ranges, period),
        }
    }

    /// fixed installment for the structure, honouring an override
    fn installment(&self) -> Result<Money> {
        let config = self.config;
        match config.repayment {
            RepaymentStructure::EqualInstallments => match config.payment_override {
                Some(payment) => Ok(payment),
                None => installment(
                    self.annual_rate(1)?.monthly_rate(),
                    config.term_months,
                    self.full_capital,
                    config.residual,
                ),
            },
            RepaymentStructure::InterestOnly => Ok(self
                .full_capital
                .interest_at(self.annual_rate(1)?.monthly_rate())
                .round_currency()),
            RepaymentStructure::CapitalisedInterest => {
                if let Some(payment) = config.payment_override {
                    return Ok(payment);
                }
                let window = config.capitalisation_months.unwrap_or(0);
                let remaining = config.term_months.saturating_sub(window);
                if remaining == 0 {
                    return Ok(Money::ZERO);
                }
                let projected = self.projected_capitalised_balance(window)?;
                installment(
                    self.annual_rate(1)?.monthly_rate(),
                    remaining,
                    projected,
                    config.residual,
                )
            }
            RepaymentStructure::StructuredCapital => Ok(Money::ZERO),
        }
    }

    /// full capital compounded monthly through the capitalisation window
    fn projected_capitalised_balance(&self, window: u32) -> Result<Money> {
        let mut balance = self.full_capital;
        for period in 1..=window {
            let interest = balance
                .interest_at(self.annual_rate(period)?.monthly_rate())
                .round_currency();
            balance = (balance + interest).round_currency();
        }
        Ok(balance)
    }

    /// Regular principal and payment before the final-period adjustment.
    ///
    /// Principal is not capped at the balance; the ending balance is floored
    /// at zero instead.
    fn regular_repayment(&self, period: u32, interest: Money, installment: Money) -> Result<(Money, Money)> {
        let config = self.config;
        let capitalising = config.repayment == RepaymentStructure::CapitalisedInterest
            && period <= config.capitalisation_months.unwrap_or(0);

        if capitalising {
            return Ok((-interest, Money::ZERO));
        }

        match config.repayment {
            RepaymentStructure::EqualInstallments | RepaymentStructure::CapitalisedInterest => {
                Ok(((installment - interest).floor_zero(), installment))
            }
            RepaymentStructure::InterestOnly => Ok((Money::ZERO, interest)),
            RepaymentStructure::StructuredCapital => {
                let principal = resolve_structured_principal(&config.structured_payments, period)?
                    .round_currency();
                Ok((principal, interest + principal))
            }
        }
    }

    /// drawdown amount per period; fees join period 1 in multi-drawdown mode
    fn assign_drawdowns(&mut self) -> BTreeMap<u32, Money> {
        let config = self.config;
        let mut lookup = BTreeMap::new();

        match &config.drawdown {
            DrawdownStructure::Single { .. } => {
                lookup.insert(1, self.full_capital);
            }
            DrawdownStructure::Multiple { tranches } => {
                for tranche in tranches {
                    let period = drawdown_period(tranche.date, config.first_payment_date);
                    if period > config.term_months {
                        self.log.emit(ScheduleWarning::DrawdownBeyondTerm {
                            date: tranche.date,
                            amount: tranche.amount,
                            period,
                            term: config.term_months,
                        });
                        continue;
                    }
                    *lookup.entry(period).or_insert(Money::ZERO) += tranche.amount;
                }

                let fees = config.total_fees();
                if fees.is_positive() {
                    *lookup.entry(1).or_insert(Money::ZERO) += fees;
                }
            }
        }

        lookup
    }

    /// custom capital keyed by year-month; a later event in the same month wins
    fn index_custom_capital(&mut self) -> BTreeMap<YearMonth, Money> {
        let mut lookup = BTreeMap::new();
        for event in &self.config.custom_capital {
            let year_month = event.year_month();
            if let Some(replaced) = lookup.insert(year_month, event.amount) {
                self.log.emit(ScheduleWarning::CustomCapitalCollision {
                    year_month,
                    replaced,
                    kept: event.amount,
                });
            }
        }
        lookup
    }
}

/// Period a drawdown lands in: period 1 for anything before the first payment
/// month, otherwise months after the first payment date plus one.
pub fn drawdown_period(drawdown_date: NaiveDate, first_payment_date: NaiveDate) -> u32 {
    let months = YearMonth::of(drawdown_date).months_since(YearMonth::of(first_payment_date));
    if months < 0 {
        1
    } else {
        u32::try_from(months + 1).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoanConfigBuilder;
    use crate::types::{CustomCapitalEvent, DrawdownEvent, Fee, RatePeriod, StructuredPayment};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn money(s: &str) -> Money {
        Money::from_str_exact(s).unwrap()
    }

    fn loan(amount: i64, term: u32, rate_pct: rust_decimal::Decimal) -> LoanConfigBuilder {
        LoanConfig::builder()
            .deal("Client XYZ", "Development Facility A")
            .facility_amount(Money::from_major(amount))
            .term_months(term)
            .single_drawdown(date(2025, 3, 1))
            .first_payment_date(date(2025, 4, 1))
            .fixed_rate(Rate::from_percentage(rate_pct))
    }

    #[test]
    fn test_equal_installments_first_row() {
        let config = loan(100_000, 12, dec!(12)).build().unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.installment, money("8884.88"));
        assert_eq!(schedule.rows.len(), 12);

        let first = &schedule.rows[0];
        assert_eq!(first.period, 1);
        assert_eq!(first.date, date(2025, 4, 1));
        assert_eq!(first.opening_balance, Money::ZERO);
        assert_eq!(first.drawdown, Money::from_major(100_000));
        assert_eq!(first.balance_before_interest, Money::from_major(100_000));
        assert_eq!(first.interest, money("1000.00"));
        assert_eq!(first.regular_principal, money("7884.88"));
        assert_eq!(first.total_payment, money("8884.88"));
        assert_eq!(first.ending_balance, money("92115.12"));

        assert_eq!(schedule.rows[1].date, date(2025, 5, 1));
        assert_eq!(schedule.rows[1].opening_balance, money("92115.12"));
    }

    #[test]
    fn test_equal_installments_amortize_to_zero() {
        let config = loan(1_200_000, 24, dec!(12)).build().unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert!(schedule.final_balance() <= FINAL_BALANCE_TOLERANCE);
        assert!(schedule.warnings.is_empty(), "{:?}", schedule.warning_messages());

        let principal: Money = schedule.rows.iter().map(|r| r.regular_principal).sum();
        assert!((principal - Money::from_major(1_200_000)).abs() <= FINAL_BALANCE_TOLERANCE);
    }

    #[test]
    fn test_equal_installments_with_residual() {
        let residual = Money::from_major(300_000);
        let config = loan(1_200_000, 24, dec!(12)).residual(residual).build().unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert!((schedule.final_balance() - residual).abs() <= FINAL_BALANCE_TOLERANCE);
        assert!(schedule.final_balance() >= residual);
        assert!(schedule.warnings.is_empty(), "{:?}", schedule.warning_messages());
    }

    #[test]
    fn test_interest_only_repays_in_final_period() {
        let config = loan(1_000_000, 12, dec!(12))
            .repayment(RepaymentStructure::InterestOnly)
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.installment, money("10000.00"));

        for row in &schedule.rows[..11] {
            assert_eq!(row.regular_principal, Money::ZERO);
            assert_eq!(row.total_payment, money("10000.00"));
            assert_eq!(row.ending_balance, Money::from_major(1_000_000));
        }

        let last = &schedule.rows[11];
        assert_eq!(last.regular_principal, Money::from_major(1_000_000));
        assert_eq!(last.total_payment, money("1010000.00"));
        assert_eq!(last.ending_balance, Money::ZERO);
        assert!(schedule.warnings.is_empty());
    }

    #[test]
    fn test_interest_only_leaves_residual() {
        let config = loan(1_000_000, 12, dec!(12))
            .repayment(RepaymentStructure::InterestOnly)
            .residual(Money::from_major(250_000))
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.rows[11].regular_principal, Money::from_major(750_000));
        assert_eq!(schedule.final_balance(), Money::from_major(250_000));
        assert!(schedule.warnings.is_empty());
    }

    #[test]
    fn test_capitalised_interest_window() {
        let config = loan(1_000_000, 24, dec!(12))
            .repayment(RepaymentStructure::CapitalisedInterest)
            .capitalisation_months(6)
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        for row in &schedule.rows[..6] {
            assert_eq!(row.total_payment, Money::ZERO);
            assert_eq!(row.regular_principal, -row.interest);
            assert_eq!(row.ending_balance, row.balance_before_interest + row.interest);
        }

        // balance at the end of the window is the one the installment was sized on
        let projected = schedule.rows[5].ending_balance;
        assert_eq!(projected, money("1061520.15"));

        for row in &schedule.rows[6..23] {
            assert_eq!(row.total_payment, schedule.installment);
        }

        assert!(schedule.final_balance() <= FINAL_BALANCE_TOLERANCE);
        assert!(schedule.warnings.is_empty(), "{:?}", schedule.warning_messages());

        // capitalisation periods are not repayments
        let summary = schedule.summary();
        let repaid: Money = schedule.rows[6..].iter().map(|r| r.total_principal).sum();
        assert_eq!(summary.total_principal_repaid, repaid);
    }

    #[test]
    fn test_structured_capital_forward_fills_principal() {
        let config = loan(1_200_000, 24, dec!(12))
            .repayment(RepaymentStructure::StructuredCapital)
            .structured_payments(vec![StructuredPayment::new(1, 12, Money::from_major(50_000))])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        for row in &schedule.rows {
            assert_eq!(row.regular_principal, Money::from_major(50_000));
            assert_eq!(row.total_payment, row.interest + Money::from_major(50_000));
        }
        assert_eq!(schedule.final_balance(), Money::ZERO);
        assert!(schedule.warnings.is_empty());
    }

    #[test]
    fn test_zero_structured_capital_matches_interest_only() {
        let residual = Money::from_major(1_000_000);
        let structured = loan(1_000_000, 12, dec!(12.5))
            .residual(residual)
            .repayment(RepaymentStructure::StructuredCapital)
            .structured_payments(vec![
                StructuredPayment::new(1, 6, Money::ZERO),
                StructuredPayment::new(7, 12, Money::ZERO),
            ])
            .build()
            .unwrap();
        let interest_only = loan(1_000_000, 12, dec!(12.5))
            .residual(residual)
            .repayment(RepaymentStructure::InterestOnly)
            .build()
            .unwrap();

        let a = generate_monthly_schedule(&structured).unwrap();
        let b = generate_monthly_schedule(&interest_only).unwrap();

        assert_eq!(a.rows, b.rows);
    }

    #[test]
    fn test_final_balance_mismatch_is_a_warning() {
        // structured principal never repays the loan
        let config = loan(1_000_000, 12, dec!(10))
            .repayment(RepaymentStructure::StructuredCapital)
            .structured_payments(vec![StructuredPayment::new(1, 12, Money::from_major(10_000))])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.rows.len(), 12);
        assert_eq!(schedule.final_balance(), Money::from_major(880_000));
        assert_eq!(
            schedule.warnings,
            vec![ScheduleWarning::FinalBalanceMismatch {
                period: 12,
                actual: Money::from_major(880_000),
                expected: Money::ZERO,
            }]
        );
    }

    #[test]
    fn test_variable_rates_by_period() {
        let config = loan(1_000_000, 12, dec!(0))
            .repayment(RepaymentStructure::InterestOnly)
            .variable_rates(vec![
                RatePeriod::new(7, 12, Rate::from_percentage(dec!(12))),
                RatePeriod::new(1, 6, Rate::from_percentage(dec!(10))),
            ])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.rows[0].rate, Rate::from_percentage(dec!(10)));
        assert_eq!(schedule.rows[0].interest, money("8333.33"));
        assert_eq!(schedule.rows[6].rate, Rate::from_percentage(dec!(12)));
        assert_eq!(schedule.rows[6].interest, money("10000.00"));
    }

    #[test]
    fn test_drawdown_period_assignment() {
        let first_payment = date(2025, 4, 1);

        assert_eq!(drawdown_period(date(2025, 3, 1), first_payment), 1);
        assert_eq!(drawdown_period(date(2024, 11, 20), first_payment), 1);
        assert_eq!(drawdown_period(date(2025, 4, 25), first_payment), 1);
        assert_eq!(drawdown_period(date(2025, 5, 1), first_payment), 2);
        assert_eq!(drawdown_period(date(2026, 4, 1), first_payment), 13);
    }

    #[test]
    fn test_multiple_drawdowns_with_fees() {
        let config = loan(1_000_000, 12, dec!(12))
            .repayment(RepaymentStructure::InterestOnly)
            .drawdowns(vec![
                DrawdownEvent::new(date(2025, 5, 1), Money::from_major(400_000)),
                DrawdownEvent::new(date(2025, 3, 1), Money::from_major(600_000)),
                DrawdownEvent::new(date(2027, 1, 1), Money::from_major(100_000)),
            ])
            .capitalised_fees(vec![Fee::nominal("Legal Fees", Money::from_major(20_000))])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.rows[0].drawdown, Money::from_major(620_000));
        assert_eq!(schedule.rows[1].opening_balance, Money::from_major(620_000));
        assert_eq!(schedule.rows[1].drawdown, Money::from_major(400_000));
        assert_eq!(schedule.rows[1].balance_before_interest, Money::from_major(1_020_000));

        assert_eq!(
            schedule.warnings,
            vec![ScheduleWarning::DrawdownBeyondTerm {
                date: date(2027, 1, 1),
                amount: Money::from_major(100_000),
                period: 22,
                term: 12,
            }]
        );

        let summary = schedule.summary();
        assert_eq!(summary.total_drawn, Money::from_major(1_020_000));
        assert_eq!(summary.final_balance, Money::ZERO);
    }

    #[test]
    fn test_custom_capital_applied_and_clipped() {
        let config = loan(1_000_000, 12, dec!(12))
            .repayment(RepaymentStructure::InterestOnly)
            .custom_capital(vec![
                CustomCapitalEvent::new(date(2025, 6, 15), Money::from_major(200_000)),
                CustomCapitalEvent::new(date(2025, 8, 1), Money::from_major(5_000_000)),
            ])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        let june = &schedule.rows[2];
        assert_eq!(june.date, date(2025, 6, 1));
        assert_eq!(june.custom_capital, Money::from_major(200_000));
        assert_eq!(june.total_principal, Money::from_major(200_000));
        assert_eq!(june.ending_balance, Money::from_major(800_000));

        let august = &schedule.rows[4];
        assert_eq!(august.custom_capital, Money::from_major(800_000));
        assert_eq!(august.ending_balance, Money::ZERO);

        assert_eq!(schedule.final_balance(), Money::ZERO);
        assert_eq!(
            schedule.warnings,
            vec![ScheduleWarning::CustomCapitalClipped {
                period: 5,
                requested: Money::from_major(5_000_000),
                applied: Money::from_major(800_000),
            }]
        );
        assert_eq!(schedule.summary().total_custom_capital, Money::from_major(1_000_000));
    }

    #[test]
    fn test_custom_capital_collision_and_outside_schedule() {
        let config = loan(1_000_000, 12, dec!(12))
            .repayment(RepaymentStructure::InterestOnly)
            .custom_capital(vec![
                CustomCapitalEvent::new(date(2025, 6, 1), Money::from_major(100_000)),
                CustomCapitalEvent::new(date(2025, 6, 20), Money::from_major(150_000)),
                CustomCapitalEvent::new(date(2030, 1, 1), Money::from_major(1)),
            ])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.rows[2].custom_capital, Money::from_major(150_000));
        assert_eq!(schedule.warnings.len(), 2);
        assert!(matches!(
            schedule.warnings[0],
            ScheduleWarning::CustomCapitalCollision { .. }
        ));
        assert!(matches!(
            schedule.warnings[1],
            ScheduleWarning::CustomCapitalOutsideSchedule { .. }
        ));
    }

    #[test]
    fn test_final_installment_is_paid_in_full() {
        let config = loan(100_000, 12, dec!(12)).build().unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        let last = schedule.rows.last().unwrap();
        assert_eq!(last.total_payment, schedule.installment);
        assert_eq!(last.total_payment, money("8884.88"));
        assert_eq!(last.ending_balance, Money::ZERO);
        assert!(schedule.warnings.is_empty());
    }

    #[test]
    fn test_installment_continues_after_early_payoff() {
        let config = loan(1_000_000, 12, dec!(12))
            .custom_capital(vec![CustomCapitalEvent::new(date(2025, 5, 1), Money::from_major(900_000))])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.rows[1].ending_balance, Money::ZERO);
        assert!(matches!(
            schedule.warnings[0],
            ScheduleWarning::CustomCapitalClipped { period: 2, .. }
        ));

        for row in &schedule.rows[2..] {
            assert_eq!(row.opening_balance, Money::ZERO);
            assert_eq!(row.interest, Money::ZERO);
            assert_eq!(row.regular_principal, schedule.installment);
            assert_eq!(row.total_payment, schedule.installment);
            assert_eq!(row.ending_balance, Money::ZERO);
        }
    }

    #[test]
    fn test_capitalised_interest_with_variable_rates() {
        let config = loan(1_000_000, 24, dec!(0))
            .repayment(RepaymentStructure::CapitalisedInterest)
            .capitalisation_months(6)
            .variable_rates(vec![
                RatePeriod::new(1, 3, Rate::from_percentage(dec!(10))),
                RatePeriod::new(4, 24, Rate::from_percentage(dec!(14))),
            ])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        // the window compounds at whichever rate applies in each period
        assert_eq!(schedule.rows[0].interest, money("8333.33"));
        assert_eq!(schedule.rows[3].rate, Rate::from_percentage(dec!(14)));
        assert_eq!(
            schedule.rows[3].interest,
            schedule.rows[3]
                .balance_before_interest
                .interest_at(Rate::from_percentage(dec!(14)).monthly_rate())
                .round_currency()
        );

        // priced like equal installments, on the first period's rate
        let projected = schedule.rows[5].ending_balance;
        let expected = installment(
            Rate::from_percentage(dec!(10)).monthly_rate(),
            18,
            projected,
            Money::ZERO,
        )
        .unwrap();
        assert_eq!(schedule.installment, expected);
        assert_eq!(schedule.rows[6].total_payment, expected);
    }

    #[test]
    fn test_capitalised_interest_priced_on_first_rate() {
        let config = loan(1_000_000, 24, dec!(0))
            .repayment(RepaymentStructure::CapitalisedInterest)
            .capitalisation_months(6)
            .variable_rates(vec![
                RatePeriod::new(1, 6, Rate::from_percentage(dec!(10))),
                RatePeriod::new(7, 24, Rate::from_percentage(dec!(14))),
            ])
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.installment, money("63123.19"));
        assert_eq!(schedule.rows[6].rate, Rate::from_percentage(dec!(14)));
    }

    #[test]
    fn test_payment_override() {
        let config = loan(1_000_000, 12, dec!(12))
            .payment_override(Money::from_major(50_000))
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        assert_eq!(schedule.installment, Money::from_major(50_000));
        assert_eq!(schedule.rows[0].total_payment, Money::from_major(50_000));
        assert_eq!(schedule.rows[0].regular_principal, Money::from_major(40_000));
        // underpaying leaves a balance, reported but not fatal
        assert_eq!(schedule.warnings.len(), 1);
    }

    #[test]
    fn test_invalid_config_produces_no_rows() {
        let mut config = loan(1_000_000, 12, dec!(12)).build().unwrap();
        config.term_months = 0;

        assert_eq!(
            generate_monthly_schedule(&config).unwrap_err(),
            ScheduleError::InvalidTerm { term: 0 }
        );
    }

    #[test]
    fn test_month_end_dates_step_by_calendar_month() {
        let config = LoanConfig::builder()
            .facility_amount(Money::from_major(10_000))
            .term_months(3)
            .first_payment_date(date(2025, 1, 31))
            .fixed_rate(Rate::from_percentage(dec!(10)))
            .build()
            .unwrap();
        let schedule = generate_monthly_schedule(&config).unwrap();

        let dates: Vec<NaiveDate> = schedule.rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 28)]);
    }

    #[test]
    fn test_identical_configs_give_identical_rows() {
        let config = loan(100_000_000, 120, dec!(13.75))
            .residual(Money::from_major(10_000_000))
            .capitalised_fees(vec![
                Fee::nominal("Legal Fees", Money::from_major(200_000)),
                Fee::percent_of_facility("Raising Fee", dec!(2.3)),
            ])
            .build()
            .unwrap();

        let first = generate_monthly_schedule(&config).unwrap();
        let second = generate_monthly_schedule(&config).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first.rows).unwrap(),
            serde_json::to_string(&second.rows).unwrap()
        );
    }
}
