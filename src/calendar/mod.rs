//! Monday-first week grids for a month or any inclusive date range.
//!
//! Everything here works on `NaiveDate`, so the partition never depends on the
//! host time zone. The zone only matters when resolving "today", see [`Clock`].
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

// ─── Data types ───────────────────────────────────────────────────────────────

/// One column of a week row. `None` = padding outside the partitioned range.
pub type DaySlot = Option<NaiveDate>;

/// Seven slots, Monday first.
pub type Week = [DaySlot; 7];

/// Weeks of a month split into the boundary weeks shared with the adjacent
/// months and the weeks that lie entirely inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthPartition {
    pub full_weeks:       Vec<Week>,
    pub extra_start_week: Option<Week>,
    pub extra_end_week:   Option<Week>,
}

impl MonthPartition {
    /// All weeks in display order: extra start, full weeks, extra end.
    pub fn weeks(&self) -> impl Iterator<Item = &Week> + '_ {
        self.extra_start_week.iter()
            .chain(self.full_weeks.iter())
            .chain(self.extra_end_week.iter())
    }

    /// Every concrete date, in calendar order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.weeks().flat_map(|w| w.iter().flatten().copied())
    }

    pub fn week_count(&self) -> usize {
        self.full_weeks.len()
            + usize::from(self.extra_start_week.is_some())
            + usize::from(self.extra_end_week.is_some())
    }

    pub fn is_empty(&self) -> bool { self.week_count() == 0 }
}

/// Which clock decides what "today" is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Clock {
    #[default]
    Local,
    Utc,
}

impl Clock {
    pub fn today(self) -> NaiveDate {
        match self {
            Clock::Local => chrono::Local::now().date_naive(),
            Clock::Utc   => chrono::Utc::now().date_naive(),
        }
    }
}

// ─── Public API ───────────────────────────────────────────────────────────────

/// Partitions the month `month` (zero-based, 0 = January) of `year`.
///
/// Out-of-range months roll over into neighbouring years the way date
/// arithmetic does: month 12 is January of `year + 1`, month -1 is December of
/// `year - 1`. Years outside chrono's representable range give an empty
/// partition.
pub fn partition_month(month: i32, year: i32) -> MonthPartition {
    let (year, month) = normalize_month(month, year);
    match month_bounds(year, month) {
        Some((first, last)) => partition_range(first, last),
        None => {
            debug!(year, month, "month outside representable date range");
            MonthPartition::default()
        }
    }
}

/// Partitions the inclusive range `first..=last` into Monday-first weeks.
///
/// The first emitted week becomes `extra_start_week` when it has padding, the
/// last becomes `extra_end_week` when it has padding. A lone padded week is
/// reported once: as `extra_start_week` if it has leading padding, otherwise
/// as `extra_end_week`.
/// An inverted range gives an empty partition.
pub fn partition_range(first: NaiveDate, last: NaiveDate) -> MonthPartition {
    if first > last {
        return MonthPartition::default();
    }
    let partition = classify(build_weeks(first, last));
    debug!(
        %first, %last,
        full = partition.full_weeks.len(),
        extra_start = partition.extra_start_week.is_some(),
        extra_end = partition.extra_end_week.is_some(),
        "partitioned date range"
    );
    partition
}

/// Returns the weeks for a month (`month` one-based) before classification.
pub fn month_weeks(year: i32, month: u32) -> Vec<Week> {
    month_bounds(year, month)
        .map(|(first, last)| build_weeks(first, last))
        .unwrap_or_default()
}

/// Maps a zero-based, possibly out-of-range month onto `(year, 1..=12)`.
pub fn normalize_month(month: i32, year: i32) -> (i32, u32) {
    let year = year.saturating_add(month.div_euclid(12));
    (year, month.rem_euclid(12) as u32 + 1)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    month_bounds(year, month).map(|(_, last)| last.day()).unwrap_or(0)
}

/// True if any slot of the week is padding.
pub fn has_gap(week: &Week) -> bool {
    week.iter().any(Option::is_none)
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1=>"January", 2=>"February", 3=>"March",    4=>"April",
        5=>"May",     6=>"June",     7=>"July",      8=>"August",
        9=>"September",10=>"October",11=>"November",12=>"December",
        _=>"???",
    }
}

/// Plain-text grid, one line per week, with a tag on the boundary weeks.
pub fn render_grid(partition: &MonthPartition) -> String {
    let mut out = String::from("Mo Tu We Th Fr Sa Su\n");
    let rows = partition.extra_start_week.iter().map(|w| (w, "  (extra start)"))
        .chain(partition.full_weeks.iter().map(|w| (w, "")))
        .chain(partition.extra_end_week.iter().map(|w| (w, "  (extra end)")));
    for (week, tag) in rows {
        let cells: Vec<String> = week.iter().map(|slot| match slot {
            Some(d) => format!("{:2}", d.day()),
            None    => "  ".to_owned(),
        }).collect();
        out.push_str(cells.join(" ").trim_end());
        out.push_str(tag);
        out.push('\n');
    }
    out
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last  = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

/// Column of `date` in a Monday-first row.
fn iso_column(date: NaiveDate) -> usize {
    date.weekday().num_days_from_monday() as usize
}

fn build_weeks(first: NaiveDate, last: NaiveDate) -> Vec<Week> {
    let mut weeks  = Vec::new();
    let mut week: Week = [None; 7];
    let mut filled = 0usize;

    for date in first.iter_days().take_while(|d| *d <= last) {
        // Only the very first row can start mid-week; later rows begin on a Monday.
        if filled == 0 { filled = iso_column(date); }
        week[filled] = Some(date);
        filled += 1;
        if filled == 7 {
            weeks.push(week);
            week   = [None; 7];
            filled = 0;
        }
    }
    if filled > 0 { weeks.push(week); }
    weeks
}

fn classify(mut weeks: Vec<Week>) -> MonthPartition {
    // A lone week is both first and last: leading padding makes it the extra
    // start, padding only at the end makes it the extra end.
    let lone_starts_on_monday = weeks.len() == 1 && weeks[0][0].is_some();
    let extra_end_week = if (weeks.len() > 1 || lone_starts_on_monday)
        && weeks.last().is_some_and(has_gap)
    {
        weeks.pop()
    } else {
        None
    };
    let extra_start_week = if weeks.first().is_some_and(has_gap) {
        Some(weeks.remove(0))
    } else {
        None
    };
    MonthPartition { full_weeks: weeks, extra_start_week, extra_end_week }
}
