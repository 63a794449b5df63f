//! Formatting helpers for presenting metrics.

use time::macros::format_description;
use time::{Date, OffsetDateTime};

pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `ratio` in 0..=1.
pub fn format_percent(ratio: f64) -> String {
    if !ratio.is_finite() {
        return "–".into();
    }
    format!("{:.1}%", ratio * 100.0)
}

pub fn format_minutes(minutes: f64) -> String {
    if !minutes.is_finite() {
        return "–".into();
    }
    let total = minutes.round() as i64;
    if total >= 60 {
        format!("{}h {:02}m", total / 60, total % 60)
    } else {
        format!("{total} min")
    }
}

pub fn format_rating(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "–".into(),
    }
}

pub fn format_date(date: Date) -> String {
    date.format(&format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

pub fn format_optional_date(date: Option<Date>) -> String {
    date.map(format_date).unwrap_or_else(|| "–".into())
}

pub fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| at.to_string())
}

/// File-name-safe slug: lowercase ASCII alphanumerics joined by single dashes.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn counts_get_thousands_separators() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn minutes_switch_to_hours() {
        assert_eq!(format_minutes(42.4), "42 min");
        assert_eq!(format_minutes(125.0), "2h 05m");
    }

    #[test]
    fn slug_is_file_safe() {
        assert_eq!(slugify("  Q3 Sponsor / Community Report! "), "q3-sponsor-community-report");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn dates_are_iso() {
        assert_eq!(format_date(date!(2025 - 01 - 31)), "2025-01-31");
        assert_eq!(format_optional_date(None), "–");
        assert_eq!(format_percent(0.125), "12.5%");
    }
}
