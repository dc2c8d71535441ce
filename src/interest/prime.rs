use chrono::NaiveDate;

use crate::decimal::Rate;
use crate::errors::{Result, ScheduleError};
use crate::types::PrimeChange;

/// Prime rate in force on `date`.
///
/// Changes must be sorted with the initial (undated) entry first. Every entry
/// is visited; the last one effective on or before `date` wins.
pub fn prime_on(changes: &[PrimeChange], date: NaiveDate) -> Option<Rate> {
    let mut current = None;
    for change in changes {
        match change.effective_date {
            None => current = Some(change.prime),
            Some(effective) if effective <= date => current = Some(change.prime),
            Some(_) => {}
        }
    }
    current
}

/// Sort prime changes (initial entry first, then by date) and check there is
/// exactly one initial entry.
pub fn normalize_prime_changes(changes: &mut [PrimeChange]) -> Result<()> {
    let initial_count = changes.iter().filter(|c| c.effective_date.is_none()).count();
    if initial_count != 1 {
        return Err(ScheduleError::InvalidPrimeChanges {
            message: format!("expected exactly one initial prime rate, found {}", initial_count),
        });
    }

    // None sorts before Some
    changes.sort_by_key(|c| c.effective_date);

    for pair in changes.windows(2) {
        if let (Some(a), Some(b)) = (pair[0].effective_date, pair[1].effective_date) {
            if a == b {
                return Err(ScheduleError::InvalidPrimeChanges {
                    message: format!("more than one prime change effective on {}", a),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn changes() -> Vec<PrimeChange> {
        vec![
            PrimeChange::initial(Rate::from_percentage(dec!(11))),
            PrimeChange::on(date(2025, 5, 30), Rate::from_percentage(dec!(10.75))),
            PrimeChange::on(date(2025, 8, 1), Rate::from_percentage(dec!(10.5))),
        ]
    }

    #[test]
    fn test_initial_prime_before_first_change() {
        assert_eq!(prime_on(&changes(), date(2025, 3, 1)), Some(Rate::from_percentage(dec!(11))));
    }

    #[test]
    fn test_change_effective_on_its_date() {
        assert_eq!(prime_on(&changes(), date(2025, 5, 30)), Some(Rate::from_percentage(dec!(10.75))));
        assert_eq!(prime_on(&changes(), date(2025, 7, 31)), Some(Rate::from_percentage(dec!(10.75))));
    }

    #[test]
    fn test_later_change_overrides_earlier() {
        assert_eq!(prime_on(&changes(), date(2026, 1, 1)), Some(Rate::from_percentage(dec!(10.5))));
    }

    #[test]
    fn test_normalize_orders_initial_first() {
        let mut unsorted = vec![
            PrimeChange::on(date(2025, 8, 1), Rate::from_percentage(dec!(10.5))),
            PrimeChange::initial(Rate::from_percentage(dec!(11))),
            PrimeChange::on(date(2025, 5, 30), Rate::from_percentage(dec!(10.75))),
        ];

        normalize_prime_changes(&mut unsorted).unwrap();
        assert_eq!(unsorted, changes());
    }

    #[test]
    fn test_normalize_requires_single_initial() {
        let mut none = vec![PrimeChange::on(date(2025, 5, 30), Rate::from_percentage(dec!(10)))];
        assert!(normalize_prime_changes(&mut none).is_err());

        let mut two = vec![
            PrimeChange::initial(Rate::from_percentage(dec!(11))),
            PrimeChange::initial(Rate::from_percentage(dec!(10))),
        ];
        assert!(normalize_prime_changes(&mut two).is_err());
    }
}
