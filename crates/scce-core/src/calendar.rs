//! Academic calendar math.
//!
//! Thursday-anchored 28-day blocks. Results for `(block, academic_year)` are
//! memoised in a process-wide cache using `once_cell`-backed lazily
//! initialised lookups instead of ad-hoc statics.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid block number: {0} (must be 0..=13)")]
    InvalidBlock(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration_days: i64,
}

static BLOCK_CACHE: Lazy<Mutex<HashMap<(u8, i32), BlockDates>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// First Thursday on/after July 1 of `year`.
pub fn first_thursday(year: i32) -> NaiveDate {
    let july1 = NaiveDate::from_ymd_opt(year, 7, 1).expect("valid July 1");
    let offset = (Weekday::Thu.num_days_from_monday() as i64
        - july1.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    july1 + Duration::days(offset)
}

/// `BlockDates(n, academicYear)`.
pub fn block_dates(block_number: u8, academic_year: i32) -> Result<BlockDates, CalendarError> {
    if block_number > 13 {
        return Err(CalendarError::InvalidBlock(block_number));
    }
    if let Some(cached) = BLOCK_CACHE.lock().unwrap().get(&(block_number, academic_year)) {
        return Ok(*cached);
    }

    let july1 = NaiveDate::from_ymd_opt(academic_year, 7, 1).expect("valid July 1");
    let thursday0 = first_thursday(academic_year);

    let dates = if block_number == 0 {
        // May be empty if July 1 is itself a Thursday.
        let start = july1;
        let end = thursday0 - Duration::days(1);
        let duration = if end < start { 0 } else { (end - start).num_days() + 1 };
        BlockDates { start, end, duration_days: duration }
    } else if (1..=12).contains(&block_number) {
        let start = thursday0 + Duration::days(28 * (block_number as i64 - 1));
        let end = start + Duration::days(27);
        BlockDates { start, end, duration_days: 28 }
    } else {
        // Block 13: from end-of-block-12 + 1 day through June 30 next year.
        let block12_start = thursday0 + Duration::days(28 * 11);
        let block12_end = block12_start + Duration::days(27);
        let start = block12_end + Duration::days(1);
        let end = NaiveDate::from_ymd_opt(academic_year + 1, 6, 30).expect("valid June 30");
        let duration = (end - start).num_days() + 1;
        BlockDates { start, end, duration_days: duration }
    };

    BLOCK_CACHE
        .lock()
        .unwrap()
        .insert((block_number, academic_year), dates);
    Ok(dates)
}

/// `BlockNumberForDate(d) -> (blockNumber, academicYear)`.
///
/// Dates before July 1 belong to the previous academic year's Block 13.
pub fn block_number_for_date(date: NaiveDate) -> (u8, i32) {
    let ay = if date.month() >= 7 { date.year() } else { date.year() - 1 };
    let thursday0 = first_thursday(ay);
    if date < thursday0 {
        return (0, ay);
    }
    let block12_start = thursday0 + Duration::days(28 * 11);
    if date < block12_start {
        let offset_days = (date - thursday0).num_days();
        let block = 1 + (offset_days / 28) as u8;
        (block, ay)
    } else {
        (13, ay)
    }
}

/// `BlockHalf(d) -> 1 if within first 14 days of its block else 2`.
///
/// Block 0 and Block 13 have irregular lengths; "first 14 days of the
/// block" is still well-defined relative to the block's own start date.
pub fn block_half(date: NaiveDate) -> u8 {
    let (block_number, ay) = block_number_for_date(date);
    let dates = block_dates(block_number, ay).expect("block number derived from date is valid");
    let offset = (date - dates.start).num_days();
    if offset < 14 {
        1
    } else {
        2
    }
}

/// Verifies: blocks contiguous; total days = 365 or 366; blocks 1..=12
/// start Thursday and end Wednesday; block 13 ends June 30.
pub fn validate_alignment(year: i32) -> Result<(), String> {
    let mut total_days = 0i64;
    let mut prev_end: Option<NaiveDate> = None;

    for block_number in 0..=13u8 {
        let dates = block_dates(block_number, year).map_err(|e| e.to_string())?;
        if dates.duration_days > 0 {
            if let Some(prev) = prev_end {
                if dates.start != prev + Duration::days(1) {
                    return Err(format!(
                        "block {block_number} does not start the day after the prior block ends"
                    ));
                }
            }
            total_days += dates.duration_days;
            prev_end = Some(dates.end);
        }
        if (1..=12).contains(&block_number) {
            if dates.start.weekday() != Weekday::Thu {
                return Err(format!("block {block_number} does not start on a Thursday"));
            }
            if dates.end.weekday() != Weekday::Wed {
                return Err(format!("block {block_number} does not end on a Wednesday"));
            }
        }
    }

    let block13 = block_dates(13, year).map_err(|e| e.to_string())?;
    if block13.end != NaiveDate::from_ymd_opt(year + 1, 6, 30).unwrap() {
        return Err("block 13 does not end on June 30".to_string());
    }

    let is_leap = NaiveDate::from_ymd_opt(year + 1, 2, 29).is_some();
    let expected = if is_leap { 366 } else { 365 };
    if total_days != expected {
        return Err(format!(
            "academic year {year} totals {total_days} days, expected {expected}"
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_thursday_is_on_or_after_july1() {
        for year in 2020..2030 {
            let t = first_thursday(year);
            assert!(t >= NaiveDate::from_ymd_opt(year, 7, 1).unwrap());
            assert_eq!(t.weekday(), Weekday::Thu);
        }
    }

    #[test]
    fn blocks_1_through_12_are_28_days_thursday_to_wednesday() {
        for block in 1..=12u8 {
            let d = block_dates(block, 2025).unwrap();
            assert_eq!(d.duration_days, 28);
            assert_eq!(d.start.weekday(), Weekday::Thu);
            assert_eq!(d.end.weekday(), Weekday::Wed);
        }
    }

    #[test]
    fn block_13_ends_on_june_30() {
        let d = block_dates(13, 2025).unwrap();
        assert_eq!(d.end, NaiveDate::from_ymd_opt(2026, 6, 30).unwrap());
    }

    #[test]
    fn invalid_block_number_errors() {
        assert_eq!(block_dates(14, 2025), Err(CalendarError::InvalidBlock(14)));
    }

    #[test]
    fn block_number_for_date_round_trips() {
        for year in 2023..2027 {
            for block in 1..=13u8 {
                let d = block_dates(block, year).unwrap();
                if d.duration_days == 0 {
                    continue;
                }
                let (found_block, found_ay) = block_number_for_date(d.start);
                assert_eq!(found_block, block, "year {year} block {block}");
                assert_eq!(found_ay, year);
            }
        }
    }

    #[test]
    fn calendar_totality_validates_for_several_years() {
        for year in 2022..2030 {
            assert!(validate_alignment(year).is_ok(), "year {year} failed alignment");
        }
    }

    #[rstest::rstest]
    #[case::already_thursday(2027, 7, 1)]
    #[case::wraps_from_tuesday(2025, 7, 3)]
    #[case::wraps_from_friday(2022, 7, 7)]
    fn first_thursday_matches_known_dates(#[case] year: i32, #[case] month: u32, #[case] day: u32) {
        assert_eq!(first_thursday(year), NaiveDate::from_ymd_opt(year, month, day).unwrap());
    }
}
