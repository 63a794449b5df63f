use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Bucket size requested from aggregate endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
}

impl GroupBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
        }
    }
}

/// Time-windowed scope shared by every analytics and report-table request.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsQuery {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    /// IANA zone name, e.g. `Europe/Madrid`.
    pub timezone: String,
    pub community_ids: Vec<String>,
    /// Narrows every request to one event occurrence.
    pub occurrence_id: Option<String>,
    pub sponsor_id: Option<String>,
    pub user_email: Option<String>,
    pub group_by: Option<GroupBy>,
}

impl AnalyticsQuery {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime, timezone: impl Into<String>) -> Self {
        Self {
            start,
            end,
            timezone: timezone.into(),
            community_ids: Vec::new(),
            occurrence_id: None,
            sponsor_id: None,
            user_email: None,
            group_by: None,
        }
    }

    pub fn with_communities(mut self, ids: Vec<String>) -> Self {
        self.community_ids = ids;
        self
    }

    pub fn with_occurrence(mut self, occurrence_id: Option<String>) -> Self {
        self.occurrence_id = occurrence_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn with_sponsor(mut self, sponsor_id: Option<String>) -> Self {
        self.sponsor_id = sponsor_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn with_user_email(mut self, email: Option<String>) -> Self {
        self.user_email = email.filter(|e| !e.trim().is_empty());
        self
    }

    pub fn with_group_by(mut self, group_by: Option<GroupBy>) -> Self {
        self.group_by = group_by;
        self
    }

    /// Query pairs in the order the backend documents them. Absent options are omitted.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("start", format_timestamp(self.start)),
            ("end", format_timestamp(self.end)),
            ("timezone", self.timezone.clone()),
        ];

        if !self.community_ids.is_empty() {
            pairs.push(("communityIds", self.community_ids.join(",")));
        }
        if let Some(occurrence) = &self.occurrence_id {
            pairs.push(("occurrenceId", occurrence.clone()));
        }
        if let Some(sponsor) = &self.sponsor_id {
            pairs.push(("sponsorId", sponsor.clone()));
        }
        if let Some(email) = &self.user_email {
            pairs.push(("userEmail", email.clone()));
        }
        if let Some(group_by) = self.group_by {
            pairs.push(("groupBy", group_by.as_param().to_string()));
        }

        pairs
    }
}

fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn base() -> AnalyticsQuery {
        AnalyticsQuery::new(
            datetime!(2025-01-01 0:00 UTC),
            datetime!(2025-01-31 23:59:59 UTC),
            "America/New_York",
        )
    }

    #[test]
    fn required_params_only() {
        let pairs = base().to_pairs();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["start", "end", "timezone"]);
        assert_eq!(pairs[0].1, "2025-01-01T00:00:00Z");
    }

    #[test]
    fn optional_params_are_appended() {
        let pairs = base()
            .with_communities(vec!["c1".into(), "c2".into()])
            .with_occurrence(Some("occ-4".into()))
            .with_sponsor(Some("s9".into()))
            .with_user_email(Some("  ".into()))
            .with_group_by(Some(GroupBy::Month))
            .to_pairs();

        assert!(pairs.contains(&("communityIds", "c1,c2".to_string())));
        assert!(pairs.contains(&("occurrenceId", "occ-4".to_string())));
        assert!(pairs.contains(&("sponsorId", "s9".to_string())));
        assert!(pairs.contains(&("groupBy", "month".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "userEmail"));
    }
}
