//! Date-range and community filter bar shared by the analytics page and the report
//! builder.

use api::AnalyticsQuery;
use dioxus::prelude::*;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::core::config::{ReportFilters, DEFAULT_RANGE_DAYS};

/// Raw text of the filter inputs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterForm {
    /// `YYYY-MM-DD`, as produced by `<input type="date">`.
    pub start: String,
    pub end: String,
    /// Comma-separated community ids.
    pub communities: String,
    pub sponsor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("`{0}` is not a valid date")]
    InvalidDate(String),
    #[error("the start date must not be after the end date")]
    InvertedRange,
}

impl FilterForm {
    /// Form prefilled with the trailing default window ending on `today`.
    pub fn trailing(today: Date) -> Self {
        let start = today - time::Duration::days(DEFAULT_RANGE_DAYS);
        Self {
            start: crate::core::format::format_date(start),
            end: crate::core::format::format_date(today),
            ..Self::default()
        }
    }

    pub fn community_ids(&self) -> Vec<String> {
        self.communities
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Inclusive day range. The end bound is pushed to the end of its day.
    pub fn range(&self) -> Result<(Option<OffsetDateTime>, Option<OffsetDateTime>), FilterError> {
        let start = parse_day(&self.start)?.map(|d| d.with_time(Time::MIDNIGHT).assume_utc());
        let end = parse_day(&self.end)?
            .map(|d| d.with_hms(23, 59, 59).map(|dt| dt.assume_utc()))
            .transpose()
            .map_err(|_| FilterError::InvalidDate(self.end.clone()))?;
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(FilterError::InvertedRange);
            }
        }
        Ok((start, end))
    }

    pub fn to_report_filters(&self) -> Result<ReportFilters, FilterError> {
        let (start_date, end_date) = self.range()?;
        let ids = self.community_ids();
        Ok(ReportFilters {
            start_date,
            end_date,
            community_ids: (!ids.is_empty()).then_some(ids),
            occurrence_id: None,
        })
    }

    pub fn to_query(&self, timezone: &str, now: OffsetDateTime) -> Result<AnalyticsQuery, FilterError> {
        let filters = self.to_report_filters()?;
        Ok(filters
            .to_query(timezone, now)
            .with_sponsor(Some(self.sponsor.clone())))
    }
}

fn parse_day(raw: &str) -> Result<Option<Date>, FilterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| FilterError::InvalidDate(raw.to_string()))
}

#[component]
pub fn FilterBar(
    mut form: Signal<FilterForm>,
    #[props(default = false)] show_sponsor: bool,
) -> Element {
    let current = form();
    let error = current.range().err().map(|err| err.to_string());

    rsx! {
        div { class: "filter-bar",
            label { class: "filter-bar__field",
                span { "From" }
                input {
                    r#type: "date",
                    value: "{current.start}",
                    oninput: move |evt| form.write().start = evt.value(),
                }
            }
            label { class: "filter-bar__field",
                span { "To" }
                input {
                    r#type: "date",
                    value: "{current.end}",
                    oninput: move |evt| form.write().end = evt.value(),
                }
            }
            label { class: "filter-bar__field filter-bar__field--wide",
                span { "Communities" }
                input {
                    r#type: "text",
                    placeholder: "All communities",
                    value: "{current.communities}",
                    oninput: move |evt| form.write().communities = evt.value(),
                }
            }
            if show_sponsor {
                label { class: "filter-bar__field",
                    span { "Sponsor" }
                    input {
                        r#type: "text",
                        value: "{current.sponsor}",
                        oninput: move |evt| form.write().sponsor = evt.value(),
                    }
                }
            }
            if let Some(message) = error {
                p { class: "filter-bar__error", "{message}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn communities_are_split_and_trimmed() {
        let form = FilterForm {
            communities: " north, ,south ,".into(),
            ..FilterForm::default()
        };
        assert_eq!(form.community_ids(), vec!["north", "south"]);
    }

    #[test]
    fn end_date_covers_the_whole_day() {
        let form = FilterForm {
            start: "2025-01-01".into(),
            end: "2025-01-31".into(),
            ..FilterForm::default()
        };
        let filters = form.to_report_filters().unwrap();
        assert_eq!(filters.start_date, Some(datetime!(2025-01-01 0:00 UTC)));
        assert_eq!(filters.end_date, Some(datetime!(2025-01-31 23:59:59 UTC)));
        assert_eq!(filters.community_ids, None);
    }

    #[test]
    fn bad_input_is_reported() {
        let form = FilterForm {
            start: "2025-02-30".into(),
            ..FilterForm::default()
        };
        assert_eq!(
            form.range().unwrap_err(),
            FilterError::InvalidDate("2025-02-30".into())
        );

        let inverted = FilterForm {
            start: "2025-03-01".into(),
            end: "2025-02-01".into(),
            ..FilterForm::default()
        };
        assert_eq!(inverted.range().unwrap_err(), FilterError::InvertedRange);
    }

    #[test]
    fn trailing_window_prefills_both_ends() {
        let form = FilterForm::trailing(date!(2025 - 05 - 31));
        assert_eq!(form.start, "2025-05-01");
        assert_eq!(form.end, "2025-05-31");
    }

    #[test]
    fn blank_sponsor_is_dropped_from_query() {
        let form = FilterForm::trailing(date!(2025 - 05 - 31));
        let query = form
            .to_query("UTC", datetime!(2025-05-31 12:00 UTC))
            .unwrap();
        assert_eq!(query.sponsor_id, None);
        assert_eq!(query.start, datetime!(2025-05-01 0:00 UTC));
    }
}
