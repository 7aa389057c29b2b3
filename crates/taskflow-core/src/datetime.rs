use anyhow::anyhow;
use chrono::{Days, Local, NaiveDate};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Due-date expressions accepted on the command line: an ISO date, a couple
/// of named anchors, or a day offset. An empty value clears the date.
pub fn parse_due(value: &str, today: NaiveDate) -> anyhow::Result<Option<NaiveDate>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(Some(date));
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "today" => return Ok(Some(today)),
        "tomorrow" => {
            return today
                .checked_add_days(Days::new(1))
                .map(Some)
                .ok_or_else(|| anyhow!("date out of range: tomorrow"));
        }
        _ => {}
    }

    if let Some(days) = trimmed
        .strip_prefix('+')
        .and_then(|rest| rest.strip_suffix('d'))
        && let Ok(days) = days.parse::<u64>()
    {
        return today
            .checked_add_days(Days::new(days))
            .map(Some)
            .ok_or_else(|| anyhow!("date out of range: {trimmed}"));
    }

    Err(anyhow!("unrecognized date expression: {trimmed}"))
}

pub fn format_due(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{format_due, parse_due};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_and_relative_forms() {
        let today = day(2026, 3, 10);
        assert_eq!(parse_due("2026-04-01", today).unwrap(), Some(day(2026, 4, 1)));
        assert_eq!(parse_due("today", today).unwrap(), Some(today));
        assert_eq!(parse_due("tomorrow", today).unwrap(), Some(day(2026, 3, 11)));
        assert_eq!(parse_due("+7d", today).unwrap(), Some(day(2026, 3, 17)));
        assert_eq!(parse_due("", today).unwrap(), None);
        assert!(parse_due("soonish", today).is_err());
    }

    #[test]
    fn formats_optional_dates() {
        assert_eq!(format_due(Some(day(2026, 3, 10))), "2026-03-10");
        assert_eq!(format_due(None), "");
    }
}
