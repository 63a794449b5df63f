//! Tabular shapes shared by the on-screen widgets and the export blocks.

use api::reports::{CancellationReport, FeedbackCategory, HostReport, MemberReport};

use crate::analytics::data::AnalyticsData;
use crate::analytics::views::value_label;
use crate::core::format::{format_count, format_date, format_optional_date, format_percent, format_rating};
use crate::core::widgets::AnalyticsType;

/// Rows shown per page in preview mode.
pub const PREVIEW_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    fn new(columns: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of page `page` (0-based) at `page_size` rows per page.
    pub fn page(&self, page: usize, page_size: usize) -> &[Vec<String>] {
        let (start, end) = page_bounds(self.rows.len(), page, page_size);
        &self.rows[start..end]
    }
}

/// Number of pages needed for `total` rows; an empty table still has one page.
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size).max(1)
}

/// Row range of a page, clamped to the last page.
pub fn page_bounds(total: usize, page: usize, page_size: usize) -> (usize, usize) {
    if page_size == 0 {
        return (0, total);
    }
    let page = page.min(page_count(total, page_size) - 1);
    let start = (page * page_size).min(total);
    let end = (start + page_size).min(total);
    (start, end)
}

pub fn feedback_table(category: &FeedbackCategory) -> TableData {
    TableData::new(
        &["Item", "Responses", "Avg. rating"],
        category
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.label.clone(),
                    format_count(u64::from(row.responses)),
                    format_rating(row.average_rating),
                ]
            })
            .collect(),
    )
}

pub fn member_table(report: &MemberReport) -> TableData {
    TableData::new(
        &["Name", "Email", "Community", "Events", "Last attended"],
        report
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.name.clone(),
                    row.email.clone(),
                    row.community.clone(),
                    format_count(u64::from(row.events_attended)),
                    format_optional_date(row.last_attended),
                ]
            })
            .collect(),
    )
}

pub fn host_table(report: &HostReport) -> TableData {
    TableData::new(
        &["Host", "Email", "Events hosted", "Attendees", "Avg. rating"],
        report
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.name.clone(),
                    row.email.clone(),
                    format_count(u64::from(row.events_hosted)),
                    format_count(u64::from(row.attendees)),
                    format_rating(row.average_rating),
                ]
            })
            .collect(),
    )
}

pub fn cancellation_table(report: &CancellationReport) -> TableData {
    TableData::new(
        &["Event", "Community", "Scheduled", "Reason", "Canceled by"],
        report
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.event_title.clone(),
                    row.community.clone(),
                    format_date(row.scheduled_for),
                    row.reason.clone().unwrap_or_else(|| "-".into()),
                    row.canceled_by.clone().unwrap_or_else(|| "-".into()),
                ]
            })
            .collect(),
    )
}

pub fn analytics_table(analytics_type: AnalyticsType, data: &AnalyticsData) -> TableData {
    match data {
        AnalyticsData::Sponsor(response) => TableData::new(
            &["Date", "Community", "Events"],
            response
                .events
                .iter()
                .map(|b| {
                    vec![
                        format_date(b.date),
                        b.community.clone(),
                        format_count(u64::from(b.count)),
                    ]
                })
                .collect(),
        ),
        AnalyticsData::Series(response) => {
            let split = response.points.iter().any(|p| p.series.is_some());
            let columns: &[&str] = if split {
                &["Date", "Series", "Value"]
            } else {
                &["Date", "Value"]
            };
            let mut rows: Vec<Vec<String>> = response
                .points
                .iter()
                .map(|p| {
                    let mut row = vec![format_date(p.date)];
                    if split {
                        row.push(p.series.clone().unwrap_or_default());
                    }
                    row.push(value_label(analytics_type, p.value));
                    row
                })
                .collect();
            if let Some(total) = response.total {
                let mut row = vec!["Total".to_string()];
                if split {
                    row.push(String::new());
                }
                row.push(value_label(analytics_type, total));
                rows.push(row);
            }
            TableData::new(columns, rows)
        }
        AnalyticsData::Retention(response) => {
            let mut columns = vec!["Cohort".to_string(), "Members".to_string()];
            columns.extend(response.periods.iter().cloned());
            let rows = response
                .cohorts
                .iter()
                .map(|cohort| {
                    let mut row = vec![cohort.cohort.clone(), format_count(u64::from(cohort.members))];
                    row.extend(
                        (0..response.periods.len())
                            .map(|i| cohort.retained.get(i).map(|r| format_percent(*r)).unwrap_or_default()),
                    );
                    row
                })
                .collect();
            TableData { columns, rows }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::analytics::{MetricPoint, MetricSeriesResponse};
    use api::reports::FeedbackRow;
    use time::macros::date;

    fn rows(n: usize) -> TableData {
        TableData {
            columns: vec!["n".into()],
            rows: (0..n).map(|i| vec![i.to_string()]).collect(),
        }
    }

    #[test]
    fn pages_split_rows_and_clamp() {
        let table = rows(23);
        assert_eq!(page_count(23, 10), 3);
        assert_eq!(table.page(0, 10).len(), 10);
        assert_eq!(table.page(2, 10).len(), 3);
        assert_eq!(table.page(9, 10), table.page(2, 10));
        assert_eq!(page_count(0, 10), 1);
        assert!(rows(0).page(0, 10).is_empty());
    }

    #[test]
    fn feedback_rows_format_ratings() {
        let category = FeedbackCategory {
            name: "Workshops".into(),
            rows: vec![
                FeedbackRow { label: "Intro".into(), responses: 1200, average_rating: Some(4.25) },
                FeedbackRow { label: "Advanced".into(), responses: 3, average_rating: None },
            ],
        };
        let table = feedback_table(&category);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.rows[0][1], "1,200");
        assert_eq!(table.rows[0][2], format_rating(Some(4.25)));
        assert_eq!(table.rows[1][2], format_rating(None));
    }

    #[test]
    fn series_table_appends_total_row() {
        let response = MetricSeriesResponse {
            points: vec![MetricPoint { date: date!(2025 - 03 - 01), value: 5.0, series: None }],
            total: Some(5.0),
        };
        let table = analytics_table(AnalyticsType::PageVisits, &AnalyticsData::Series(response));
        assert_eq!(table.columns, vec!["Date", "Value"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "Total");
    }
}
