use crate::decimal::{Money, Rate};
use crate::errors::{Result, ScheduleError};
use crate::types::{PeriodRange, RatePeriod, StructuredPayment};

/// Find the range governing `period`.
///
/// An exact match wins. Otherwise the closest range ending before `period` is
/// forward-filled, and a period before every range falls back to the first
/// range. Evaluated fresh on every call.
pub fn resolve_range<'a, T: PeriodRange>(ranges: &'a [T], period: u32, schedule: &str) -> Result<&'a T> {
    if period == 0 {
        return Err(ScheduleError::InvalidPeriod { period });
    }

    let first = ranges.first().ok_or_else(|| ScheduleError::EmptySchedule {
        schedule: schedule.to_string(),
    })?;

    if let Some(exact) = ranges.iter().find(|r| r.contains(period)) {
        return Ok(exact);
    }

    Ok(ranges
        .iter()
        .filter(|r| r.to_period() < period)
        .max_by_key(|r| r.to_period())
        .unwrap_or(first))
}

/// annual rate for a period of a variable rate schedule
pub fn resolve_rate(ranges: &[RatePeriod], period: u32) -> Result<Rate> {
    resolve_range(ranges, period, "rate").map(|r| r.rate)
}

/// scheduled principal for a period of a structured capital schedule
pub fn resolve_structured_principal(ranges: &[StructuredPayment], period: u32) -> Result<Money> {
    resolve_range(ranges, period, "structured payment").map(|r| r.principal_amount)
}

/// Sort ranges by start period and reject inverted, zero-based or
/// overlapping entries.
pub fn normalize_ranges<T: PeriodRange>(ranges: &mut [T], schedule: &str) -> Result<()> {
    if ranges.is_empty() {
        return Err(ScheduleError::EmptySchedule {
            schedule: schedule.to_string(),
        });
    }

    for (index, range) in ranges.iter().enumerate() {
        if range.from_period() == 0 {
            return Err(ScheduleError::InvalidPeriod { period: 0 });
        }
        if range.from_period() > range.to_period() {
            return Err(ScheduleError::InvertedRange {
                schedule: schedule.to_string(),
                index,
                from: range.from_period(),
                to: range.to_period(),
            });
        }
    }

    ranges.sort_by_key(|r| r.from_period());

    for pair in ranges.windows(2) {
        let (first, second) = (&pair[0], &pair[1]);
        if second.from_period() <= first.to_period() {
            return Err(ScheduleError::OverlappingRanges {
                schedule: schedule.to_string(),
                first_from: first.from_period(),
                first_to: first.to_period(),
                second_from: second.from_period(),
                second_to: second.to_period(),
            });
        }
    }

    Ok(())
}
