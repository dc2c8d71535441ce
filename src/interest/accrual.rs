use crate::decimal::{Money, Rate};

/// running interest accrued since the last capitalisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterestAccumulator {
    accrued: Money,
}

impl InterestAccumulator {
    pub fn new() -> Self {
        Self { accrued: Money::ZERO }
    }

    /// accrue one day of interest on `balance` and return the day's amount
    pub fn accrue_daily(&mut self, balance: Money, daily_rate: Rate) -> Money {
        let interest = balance.interest_at(daily_rate);
        self.accrued += interest;
        interest
    }

    pub fn accrued(&self) -> Money {
        self.accrued
    }

    /// hand back the accrued interest and reset to zero
    pub fn capitalise(&mut self) -> Money {
        std::mem::take(&mut self.accrued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_accrue_then_capitalise() {
        let mut acc = InterestAccumulator::new();
        let daily = Rate::from_percentage(dec!(5)).daily_rate();
        let balance = Money::from_major(10_000);

        for _ in 0..3 {
            let day = acc.accrue_daily(balance, daily);
            assert_eq!(day.round_currency(), Money::from_str_exact("1.37").unwrap());
        }

        assert_eq!(acc.accrued().round_currency(), Money::from_str_exact("4.11").unwrap());

        let capitalised = acc.capitalise();
        assert_eq!(capitalised.round_currency(), Money::from_str_exact("4.11").unwrap());
        assert_eq!(acc.accrued(), Money::ZERO);
    }
}
