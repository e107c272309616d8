//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a stored `YYYY-MM` or `YYYY-MM-DD` date as e.g. "Mar 2024".
///
/// Anything else is passed through unchanged.
///
/// Usage in templates: `{{ item.date|month_year }}`
#[askama::filter_fn]
pub fn month_year(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_month_year(&value.to_string()))
}

fn format_month_year(raw: &str) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    let mut parts = raw.split('-');
    let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
        return raw.to_owned();
    };
    let month = month
        .parse::<usize>()
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|m| MONTHS.get(m));

    match month {
        Some(name) if year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit()) => {
            format!("{name} {year}")
        }
        _ => raw.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::format_month_year;

    #[test]
    fn test_month_year() {
        assert_eq!(format_month_year("2024-03"), "Mar 2024");
        assert_eq!(format_month_year("2019-12-01"), "Dec 2019");
    }

    #[test]
    fn test_month_year_passthrough() {
        assert_eq!(format_month_year("Present"), "Present");
        assert_eq!(format_month_year("2024-13"), "2024-13");
        assert_eq!(format_month_year("24-03"), "24-03");
        assert_eq!(format_month_year(""), "");
    }
}
