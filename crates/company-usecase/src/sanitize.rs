//! Input sanitization for company fields

use std::str::FromStr;

use chrono_tz::Tz;
use company_domain::{DayOfWeek, DirectoryError};

/// Map the wire value 0..=6 onto a weekday
pub fn sanitize_day_of_week(raw: i64) -> Result<DayOfWeek, DirectoryError> {
    DayOfWeek::from_index(raw)
        .ok_or_else(|| DirectoryError::invalid_argument("Invalid DefaultDayWeekStarts"))
}

/// Accept only names present in the IANA tz database
pub fn validate_timezone(timezone: &str) -> Result<(), DirectoryError> {
    Tz::from_str(timezone)
        .map(|_| ())
        .map_err(|_| DirectoryError::invalid_argument("invalid timezone"))
}

pub fn require_name(name: &str) -> Result<(), DirectoryError> {
    if name.trim().is_empty() {
        Err(DirectoryError::invalid_argument("name is required"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use company_domain::ErrorKind;

    #[test]
    fn test_day_of_week() {
        assert_eq!(sanitize_day_of_week(1).unwrap(), DayOfWeek::Monday);
        assert_eq!(
            sanitize_day_of_week(9).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_timezones() {
        for tz in [
            "UTC",
            "America/New_York",
            "America/Argentina/Buenos_Aires",
            "Europe/London",
            "Etc/GMT+5",
            "America/Port-au-Prince",
        ] {
            assert!(validate_timezone(tz).is_ok(), "{} should be valid", tz);
        }

        for tz in [
            "",
            "new york",
            "America/",
            "/London",
            "../../etc/passwd",
            "Mars/Olympus",
            "Foo/Bar",
            "Utopia/Nowhere",
        ] {
            assert!(validate_timezone(tz).is_err(), "{} should be invalid", tz);
        }
    }

    #[test]
    fn test_name_required() {
        assert!(require_name("Acme").is_ok());
        assert!(require_name("   ").is_err());
    }
}
