//! X-axis label format for date-bucketed charts.

use time::macros::format_description;
use time::Date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisLabelFormat {
    /// `YYYY-MMM`, e.g. `2025-Jan`. Buckets collapse to calendar months.
    YearMonth,
    /// `MM-DD`.
    MonthDay,
}

/// Ranges longer than this many days switch to month labels (if they also cross a month).
pub const MONTH_LABEL_MIN_SPAN_DAYS: i64 = 30;

impl AxisLabelFormat {
    /// Month labels only when the range crosses a calendar-month boundary AND spans more
    /// than [`MONTH_LABEL_MIN_SPAN_DAYS`] days.
    pub fn for_range(start: Date, end: Date) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let crosses_month = (start.year(), start.month()) != (end.year(), end.month());
        let span_days = (end - start).whole_days();
        if crosses_month && span_days > MONTH_LABEL_MIN_SPAN_DAYS {
            AxisLabelFormat::YearMonth
        } else {
            AxisLabelFormat::MonthDay
        }
    }

    pub fn label(&self, date: Date) -> String {
        let formatted = match self {
            AxisLabelFormat::YearMonth => {
                date.format(&format_description!("[year]-[month repr:short]"))
            }
            AxisLabelFormat::MonthDay => date.format(&format_description!("[month]-[day]")),
        };
        formatted.unwrap_or_else(|_| date.to_string())
    }

    /// First day of the bucket `date` falls in.
    pub fn bucket(&self, date: Date) -> Date {
        match self {
            AxisLabelFormat::YearMonth => date.replace_day(1).unwrap_or(date),
            AxisLabelFormat::MonthDay => date,
        }
    }
}
