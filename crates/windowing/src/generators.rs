//! Window generation policies.
//!
//! All generators are pure: given a date span and a policy's parameters they
//! return validated `WindowDefinition`s in chronological order (ascending
//! `start_date`). The reverse-anchored policies build backwards and reverse
//! before returning.

use crate::definition::WindowDefinition;
use crate::error::WindowError;
use chrono::{Datelike, Months, NaiveDate};
use core_types::{MarketId, ProgramId};
use serde::{Deserialize, Serialize};

/// Caller-supplied period for the bespoke generator, e.g. a named crisis
/// window. Deserializes from `{name, start_date, end_date}` JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BespokeWindow {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Non-overlapping windows aligned to calendar-year multiples.
///
/// The first window's start snaps to the nearest multiple of
/// `window_length_years` at or before `start_date`'s year (5-year windows
/// align to 1970, 1975, ...). Boundary windows are clipped to the supplied
/// range, never dropped, so the first and last window may be short.
pub fn non_overlapping_snapped(
    start_date: NaiveDate,
    end_date: NaiveDate,
    window_length_years: u32,
    program_ids: &[ProgramId],
    benchmark_ids: &[MarketId],
    window_set: Option<&str>,
) -> Result<Vec<WindowDefinition>, WindowError> {
    ensure_ordered(start_date, end_date)?;
    ensure_length(window_length_years)?;

    let length = window_length_years as i32;
    let snap_year = start_date.year().div_euclid(length) * length;

    let mut windows = Vec::new();
    let mut current_year = snap_year;
    let mut index = 0;

    loop {
        let win_start = first_of_year(current_year);
        let win_end = last_of_year(current_year + length - 1);

        // Past the end of the data range: done.
        if win_start > end_date {
            break;
        }

        windows.push(WindowDefinition {
            start_date: win_start.max(start_date),
            end_date: win_end.min(end_date),
            program_ids: program_ids.to_vec(),
            benchmark_ids: benchmark_ids.to_vec(),
            name: Some(format!("{}-{}", current_year, current_year + length - 1)),
            window_set: window_set.map(str::to_owned),
            index: Some(index),
            borrowed_data_start_date: None,
            borrowed_data_end_date: None,
        });

        current_year += length;
        index += 1;
    }

    Ok(windows)
}

/// Non-overlapping windows starting exactly at `start_date`.
///
/// No calendar alignment: each window spans `window_length_months` months
/// and the next one begins the day after it ends. Only the final window may
/// be shorter, clipped to `end_date`.
pub fn non_overlapping_sequential(
    start_date: NaiveDate,
    end_date: NaiveDate,
    window_length_months: u32,
    program_ids: &[ProgramId],
    benchmark_ids: &[MarketId],
    window_set: Option<&str>,
) -> Result<Vec<WindowDefinition>, WindowError> {
    ensure_ordered(start_date, end_date)?;
    ensure_length(window_length_months)?;

    let mut windows = Vec::new();
    let mut current_start = start_date;
    let mut index = 0;

    while current_start < end_date {
        let win_end = prev_day(months_after(current_start, window_length_months)).min(end_date);

        windows.push(WindowDefinition {
            start_date: current_start,
            end_date: win_end,
            program_ids: program_ids.to_vec(),
            benchmark_ids: benchmark_ids.to_vec(),
            name: Some(format!(
                "Period {} ({} to {})",
                index + 1,
                current_start.format("%Y-%m"),
                win_end.format("%Y-%m")
            )),
            window_set: window_set.map(str::to_owned),
            index: Some(index),
            borrowed_data_start_date: None,
            borrowed_data_end_date: None,
        });

        current_start = next_day(win_end);
        index += 1;
    }

    Ok(windows)
}

/// Non-overlapping windows walked backwards from `latest_date`.
///
/// The most recent window ends exactly at `latest_date` and spans exactly
/// `window_length_years` years inclusive; each earlier window ends the day
/// before its successor starts. Whatever span remains above `earliest_date`
/// becomes one final, chronologically-first, shorter window.
///
/// With `borrow_mode`, an incomplete first window is replaced by a derived
/// copy whose `end_date` is extended forward to make it full-length. The
/// extension overlaps the second window on purpose; the overlapped region is
/// tagged via the borrowed-range fields so reporting can render it
/// distinctly instead of double-counting it as new information. Borrowing is
/// skipped when the set holds a single window.
pub fn non_overlapping_reverse(
    earliest_date: NaiveDate,
    latest_date: NaiveDate,
    window_length_years: u32,
    program_ids: &[ProgramId],
    benchmark_ids: &[MarketId],
    window_set: Option<&str>,
    borrow_mode: bool,
) -> Result<Vec<WindowDefinition>, WindowError> {
    ensure_ordered(earliest_date, latest_date)?;
    ensure_length(window_length_years)?;

    let step_months = window_length_years * 12;
    let mut reversed = Vec::new();
    let mut current_end = latest_date;

    loop {
        // Inclusive span of exactly `window_length_years`: the day after the
        // end, minus the full length.
        let win_start = months_before(next_day(current_end), step_months);

        if win_start < earliest_date {
            if current_end >= earliest_date {
                reversed.push(make_reverse_window(
                    earliest_date,
                    current_end,
                    program_ids,
                    benchmark_ids,
                    window_set,
                ));
            }
            break;
        }

        reversed.push(make_reverse_window(
            win_start,
            current_end,
            program_ids,
            benchmark_ids,
            window_set,
        ));
        current_end = prev_day(win_start);
    }

    // Chronological order, indices assigned oldest-first.
    let mut windows: Vec<WindowDefinition> = reversed
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, mut w)| {
            w.index = Some(i);
            w
        })
        .collect();

    if borrow_mode && windows.len() > 1 {
        if let Some(extended) = borrow_extension(&windows[0], step_months) {
            windows[0] = extended;
        }
    }

    Ok(windows)
}

/// Overlapping windows rolling forward from `start_date`.
///
/// Fixed length, sliding by `slide_months` per step. A candidate whose end
/// would pass `end_date` is dropped, not clipped: rolling windows exist to
/// be cross-compared, so every emitted window is full-length.
pub fn overlapping_rolling(
    start_date: NaiveDate,
    end_date: NaiveDate,
    window_length_months: u32,
    slide_months: u32,
    program_ids: &[ProgramId],
    benchmark_ids: &[MarketId],
    window_set: Option<&str>,
) -> Result<Vec<WindowDefinition>, WindowError> {
    ensure_ordered(start_date, end_date)?;
    ensure_length(window_length_months)?;
    ensure_slide(slide_months)?;

    let mut windows = Vec::new();
    let mut current_start = start_date;
    let mut index = 0;

    loop {
        let win_end = prev_day(months_after(current_start, window_length_months));
        if win_end > end_date {
            break;
        }

        windows.push(WindowDefinition {
            start_date: current_start,
            end_date: win_end,
            program_ids: program_ids.to_vec(),
            benchmark_ids: benchmark_ids.to_vec(),
            name: Some(format!(
                "Rolling {}M ({})",
                window_length_months,
                current_start.format("%Y-%m")
            )),
            window_set: window_set.map(str::to_owned),
            index: Some(index),
            borrowed_data_start_date: None,
            borrowed_data_end_date: None,
        });

        current_start = months_after(current_start, slide_months);
        index += 1;
    }

    Ok(windows)
}

/// Overlapping trailing windows anchored at `end_date`.
///
/// Answers "what were the trailing N-month returns as of each month?": the
/// newest window ends at `end_date`, each earlier one ends `slide_months`
/// before, all with the same length. Generation stops once a candidate
/// would start before `earliest_date`. Output is chronological like every
/// other generator (built newest-first, reversed before returning).
pub fn overlapping_trailing(
    end_date: NaiveDate,
    earliest_date: NaiveDate,
    window_length_months: u32,
    slide_months: u32,
    program_ids: &[ProgramId],
    benchmark_ids: &[MarketId],
    window_set: Option<&str>,
) -> Result<Vec<WindowDefinition>, WindowError> {
    ensure_ordered(earliest_date, end_date)?;
    ensure_length(window_length_months)?;
    ensure_slide(slide_months)?;

    let mut reversed = Vec::new();
    let mut offset_months = 0;

    loop {
        let win_end = months_before(end_date, offset_months);
        let win_start = next_day(months_before(win_end, window_length_months));
        if win_start < earliest_date {
            break;
        }

        reversed.push(WindowDefinition {
            start_date: win_start,
            end_date: win_end,
            program_ids: program_ids.to_vec(),
            benchmark_ids: benchmark_ids.to_vec(),
            name: Some(format!(
                "Trailing {}M (as of {})",
                window_length_months,
                win_end.format("%Y-%m")
            )),
            window_set: window_set.map(str::to_owned),
            index: None,
            borrowed_data_start_date: None,
            borrowed_data_end_date: None,
        });

        offset_months += slide_months;
    }

    let windows = reversed
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, mut w)| {
            w.index = Some(i);
            w
        })
        .collect();

    Ok(windows)
}

/// Hand-picked analysis periods, e.g. crises or market regimes.
///
/// Preserves the supplied order; each period is validated on construction.
pub fn bespoke(
    specs: &[BespokeWindow],
    program_ids: &[ProgramId],
    benchmark_ids: &[MarketId],
    window_set: Option<&str>,
) -> Result<Vec<WindowDefinition>, WindowError> {
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let mut def = WindowDefinition::new(
                spec.start_date,
                spec.end_date,
                program_ids.to_vec(),
                benchmark_ids.to_vec(),
            )?;
            def.name = Some(spec.name.clone());
            def.window_set = window_set.map(str::to_owned);
            def.index = Some(index);
            Ok(def)
        })
        .collect()
}

fn make_reverse_window(
    start: NaiveDate,
    end: NaiveDate,
    program_ids: &[ProgramId],
    benchmark_ids: &[MarketId],
    window_set: Option<&str>,
) -> WindowDefinition {
    WindowDefinition {
        start_date: start,
        end_date: end,
        program_ids: program_ids.to_vec(),
        benchmark_ids: benchmark_ids.to_vec(),
        name: Some(format!("Period ending {}", end.format("%Y-%m-%d"))),
        window_set: window_set.map(str::to_owned),
        index: None,
        borrowed_data_start_date: None,
        borrowed_data_end_date: None,
    }
}

/// Derived copy of an incomplete first window, extended to full length with
/// the borrowed region tagged. Returns None when the window is already full.
fn borrow_extension(first: &WindowDefinition, step_months: u32) -> Option<WindowDefinition> {
    let full_end = prev_day(months_after(first.start_date, step_months));
    if first.end_date >= full_end {
        return None;
    }

    let mut extended = first.clone();
    extended.borrowed_data_start_date = Some(next_day(first.end_date));
    extended.borrowed_data_end_date = Some(full_end);
    extended.end_date = full_end;
    extended.name = Some(format!("Period ending {}", full_end.format("%Y-%m-%d")));
    Some(extended)
}

fn ensure_ordered(start: NaiveDate, end: NaiveDate) -> Result<(), WindowError> {
    if start > end {
        return Err(WindowError::InvalidBounds { start, end });
    }
    Ok(())
}

fn ensure_length(length: u32) -> Result<(), WindowError> {
    if length == 0 {
        return Err(WindowError::InvalidLength(length));
    }
    Ok(())
}

fn ensure_slide(slide: u32) -> Result<(), WindowError> {
    if slide == 0 {
        return Err(WindowError::InvalidSlide(slide));
    }
    Ok(())
}

fn months_after(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .expect("window date arithmetic overflowed the calendar range")
}

fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .expect("window date arithmetic overflowed the calendar range")
}

fn next_day(date: NaiveDate) -> NaiveDate {
    date.succ_opt()
        .expect("window date arithmetic overflowed the calendar range")
}

fn prev_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt()
        .expect("window date arithmetic overflowed the calendar range")
}

fn first_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).expect("invalid snap year")
}

fn last_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).expect("invalid snap year")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn assert_chronological(windows: &[WindowDefinition]) {
        for pair in windows.windows(2) {
            assert!(pair[0].start_date < pair[1].start_date);
        }
    }

    /// Non-overlapping sets must cover the range contiguously: each window
    /// begins the day after its predecessor ends.
    fn assert_contiguous(windows: &[WindowDefinition]) {
        for pair in windows.windows(2) {
            assert_eq!(pair[1].start_date, pair[0].end_date.succ_opt().unwrap());
        }
    }

    #[test]
    fn snapped_aligns_to_calendar_multiples_and_clips_boundaries() {
        let windows = non_overlapping_snapped(
            d(1973, 6, 1),
            d(2017, 5, 31),
            5,
            &[1, 2],
            &[5],
            Some("five-year"),
        )
        .unwrap();

        assert_eq!(windows.len(), 10);

        // First window snaps to 1970 but clips to the data start.
        assert_eq!(windows[0].start_date, d(1973, 6, 1));
        assert_eq!(windows[0].end_date, d(1974, 12, 31));
        assert_eq!(windows[0].name.as_deref(), Some("1970-1974"));

        // Interior windows are full five-year calendar blocks.
        assert_eq!(windows[1].start_date, d(1975, 1, 1));
        assert_eq!(windows[1].end_date, d(1979, 12, 31));

        // Last window clips its end to the data range instead of dropping.
        assert_eq!(windows[9].start_date, d(2015, 1, 1));
        assert_eq!(windows[9].end_date, d(2017, 5, 31));

        assert_chronological(&windows);
        assert_contiguous(&windows);
        assert_eq!(windows[3].index, Some(3));
        assert_eq!(windows[0].program_ids, vec![1, 2]);
        assert_eq!(windows[0].window_set.as_deref(), Some("five-year"));
    }

    #[test]
    fn sequential_starts_at_data_start_and_clips_only_the_tail() {
        let windows = non_overlapping_sequential(
            d(1973, 6, 1),
            d(2017, 5, 31),
            60,
            &[1],
            &[],
            None,
        )
        .unwrap();

        assert_eq!(windows.len(), 9);
        assert_eq!(windows[0].start_date, d(1973, 6, 1));
        assert_eq!(windows[0].end_date, d(1978, 5, 31));
        assert_eq!(
            windows[0].name.as_deref(),
            Some("Period 1 (1973-06 to 1978-05)")
        );
        assert_eq!(windows[8].start_date, d(2013, 6, 1));
        assert_eq!(windows[8].end_date, d(2017, 5, 31)); // clipped final window

        assert_chronological(&windows);
        assert_contiguous(&windows);
    }

    #[test]
    fn reverse_tiles_exact_multiples_without_borrowing() {
        let windows = non_overlapping_reverse(
            d(2006, 1, 1),
            d(2020, 12, 31),
            5,
            &[1],
            &[2],
            None,
            true,
        )
        .unwrap();

        // Fifteen years tile into three full windows; nothing to borrow.
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start_date, d(2006, 1, 1));
        assert_eq!(windows[0].end_date, d(2010, 12, 31));
        assert_eq!(windows[1].start_date, d(2011, 1, 1));
        assert_eq!(windows[1].end_date, d(2015, 12, 31));
        assert_eq!(windows[2].start_date, d(2016, 1, 1));
        assert_eq!(windows[2].end_date, d(2020, 12, 31));
        assert!(windows.iter().all(|w| !w.has_borrowed_data()));
        assert_eq!(
            windows.iter().map(|w| w.index).collect::<Vec<_>>(),
            vec![Some(0), Some(1), Some(2)]
        );
        assert_contiguous(&windows);
    }

    #[test]
    fn reverse_emits_short_leftover_window_oldest_first() {
        let windows = non_overlapping_reverse(
            d(2006, 1, 1),
            d(2019, 12, 31),
            5,
            &[1],
            &[],
            None,
            false,
        )
        .unwrap();

        assert_eq!(windows.len(), 3);
        // The leftover four-year window is chronologically first.
        assert_eq!(windows[0].start_date, d(2006, 1, 1));
        assert_eq!(windows[0].end_date, d(2009, 12, 31));
        assert_eq!(windows[1].start_date, d(2010, 1, 1));
        assert_eq!(windows[1].end_date, d(2014, 12, 31));
        assert_eq!(windows[2].start_date, d(2015, 1, 1));
        assert_eq!(windows[2].end_date, d(2019, 12, 31));
        assert!(windows.iter().all(|w| !w.has_borrowed_data()));
        assert_contiguous(&windows);
    }

    #[test]
    fn borrow_mode_extends_incomplete_first_window_into_its_neighbor() {
        let windows = non_overlapping_reverse(
            d(2006, 1, 1),
            d(2019, 12, 31),
            5,
            &[1],
            &[],
            Some("reverse-5y"),
            true,
        )
        .unwrap();

        assert_eq!(windows.len(), 3);

        let first = &windows[0];
        assert_eq!(first.start_date, d(2006, 1, 1));
        assert_eq!(first.end_date, d(2010, 12, 31)); // extended to 5 years
        assert_eq!(first.borrowed_data_start_date, Some(d(2010, 1, 1)));
        assert_eq!(first.borrowed_data_end_date, Some(d(2010, 12, 31)));
        assert_eq!(first.name.as_deref(), Some("Period ending 2010-12-31"));
        first.validate().unwrap();

        // The borrowed region is exactly the overlap with the second window.
        assert_eq!(first.borrowed_data_start_date, Some(windows[1].start_date));
        assert_eq!(windows[1].end_date, d(2014, 12, 31));

        // Extended span is a whole window length, within a day of 5 * 365.25.
        let span = (first.end_date - first.start_date).num_days() as f64;
        assert!((span - 5.0 * 365.25).abs() <= 1.5);
    }

    #[test]
    fn borrow_mode_is_skipped_for_a_single_window() {
        let windows = non_overlapping_reverse(
            d(2018, 1, 1),
            d(2020, 12, 31),
            5,
            &[1],
            &[],
            None,
            true,
        )
        .unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_date, d(2018, 1, 1));
        assert_eq!(windows[0].end_date, d(2020, 12, 31));
        assert!(!windows[0].has_borrowed_data());
    }

    #[test]
    fn rolling_drops_trailing_partial_windows() {
        let windows = overlapping_rolling(
            d(2020, 1, 1),
            d(2020, 12, 31),
            6,
            3,
            &[1],
            &[],
            None,
        )
        .unwrap();

        // A fourth window (Oct..Mar) would pass the end date: dropped.
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].start_date, d(2020, 1, 1));
        assert_eq!(windows[0].end_date, d(2020, 6, 30));
        assert_eq!(windows[2].start_date, d(2020, 7, 1));
        assert_eq!(windows[2].end_date, d(2020, 12, 31));
        assert_eq!(windows[1].name.as_deref(), Some("Rolling 6M (2020-04)"));
        assert_chronological(&windows);
    }

    #[test]
    fn rolling_monthly_slide_covers_every_start() {
        let windows = overlapping_rolling(
            d(2019, 1, 1),
            d(2020, 12, 31),
            12,
            1,
            &[1],
            &[],
            None,
        )
        .unwrap();

        assert_eq!(windows.len(), 13);
        assert_eq!(windows[12].start_date, d(2020, 1, 1));
        assert_eq!(windows[12].end_date, d(2020, 12, 31));
    }

    #[test]
    fn trailing_windows_share_length_and_walk_back_from_the_anchor() {
        let windows = overlapping_trailing(
            d(2020, 12, 31),
            d(2019, 1, 1),
            12,
            1,
            &[1],
            &[5],
            Some("trailing-12m"),
        )
        .unwrap();

        assert_eq!(windows.len(), 13);

        // Chronological: the oldest trailing window comes first.
        assert_eq!(windows[0].start_date, d(2019, 1, 1));
        assert_eq!(windows[0].end_date, d(2019, 12, 31));
        assert_eq!(windows[0].index, Some(0));

        // The newest ends exactly at the anchor.
        assert_eq!(windows[12].start_date, d(2020, 1, 1));
        assert_eq!(windows[12].end_date, d(2020, 12, 31));
        assert_eq!(
            windows[12].name.as_deref(),
            Some("Trailing 12M (as of 2020-12)")
        );

        // Month-end anchors clamp correctly when stepping back.
        assert_eq!(windows[11].end_date, d(2020, 11, 30));
        assert_eq!(windows[11].start_date, d(2019, 12, 1));

        assert_chronological(&windows);
    }

    #[test]
    fn bespoke_preserves_caller_order_and_names() {
        let specs = vec![
            BespokeWindow {
                name: "2008 Financial Crisis".to_string(),
                start_date: d(2007, 6, 1),
                end_date: d(2009, 3, 31),
            },
            BespokeWindow {
                name: "COVID Crash".to_string(),
                start_date: d(2020, 2, 1),
                end_date: d(2020, 4, 30),
            },
        ];

        let windows = bespoke(&specs, &[1], &[5], Some("events")).unwrap();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].name.as_deref(), Some("2008 Financial Crisis"));
        assert_eq!(windows[0].index, Some(0));
        assert_eq!(windows[1].name.as_deref(), Some("COVID Crash"));
        assert_eq!(windows[1].start_date, d(2020, 2, 1));
        assert_eq!(windows[1].benchmark_ids, vec![5]);
    }

    #[test]
    fn bespoke_rejects_inverted_periods() {
        let specs = vec![BespokeWindow {
            name: "backwards".to_string(),
            start_date: d(2020, 2, 1),
            end_date: d(2020, 1, 1),
        }];
        assert!(matches!(
            bespoke(&specs, &[], &[], None),
            Err(WindowError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn zero_lengths_are_rejected() {
        assert!(matches!(
            non_overlapping_snapped(d(2020, 1, 1), d(2020, 12, 31), 0, &[], &[], None),
            Err(WindowError::InvalidLength(0))
        ));
        assert!(matches!(
            overlapping_rolling(d(2020, 1, 1), d(2020, 12, 31), 12, 0, &[], &[], None),
            Err(WindowError::InvalidSlide(0))
        ));
    }
}
