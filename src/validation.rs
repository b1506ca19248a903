use crate::constants::{MAX_EMAIL_LEN, MAX_TITLE_LEN};
use crate::error::AppError;
use crate::models::Weekday;
use chrono::NaiveDate;

/// Validate time format (HH:MM, 24-hour format).
pub fn validate_time_format(time: &str) -> Result<(), AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "time",
        reason: reason.into(),
    };

    if time.len() != 5 || time.get(2..3) != Some(":") {
        return Err(err("must be in HH:MM format"));
    }

    let hours: u32 = time
        .get(0..2)
        .and_then(|h| h.parse().ok())
        .ok_or_else(|| err("invalid hours"))?;
    let minutes: u32 = time
        .get(3..5)
        .and_then(|m| m.parse().ok())
        .ok_or_else(|| err("invalid minutes"))?;

    if hours >= 24 {
        return Err(err("hours must be 00-23"));
    }
    if minutes >= 60 {
        return Err(err("minutes must be 00-59"));
    }

    Ok(())
}

/// Validate an English weekday name ("Monday" .. "Sunday", case-sensitive).
pub fn validate_weekday(name: &str) -> Result<Weekday, AppError> {
    Weekday::from_name(name).ok_or_else(|| AppError::InvalidInput {
        field: "day",
        reason: format!("unknown weekday: '{name}'"),
    })
}

/// Validate a history date key (YYYY-MM-DD).
pub fn validate_date(date: &str) -> Result<NaiveDate, AppError> {
    let err = || AppError::InvalidInput {
        field: "date",
        reason: "must be in YYYY-MM-DD format".into(),
    };

    if date.len() != 10 {
        return Err(err());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| err())
}

/// Normalize a reported video title. Blank titles become "Unknown Title".
pub fn normalize_title(title: &str) -> String {
    let title = title.trim();
    if title.is_empty() {
        return "Unknown Title".to_string();
    }
    title.chars().take(MAX_TITLE_LEN).collect()
}

/// Validate the report email address. An empty string clears it.
pub fn validate_email(email: &str) -> Result<&str, AppError> {
    let email = email.trim();
    if email.is_empty() {
        return Ok(email);
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(AppError::InvalidInput {
            field: "email",
            reason: format!("cannot exceed {MAX_EMAIL_LEN} characters"),
        });
    }
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::InvalidInput {
            field: "email",
            reason: "must look like name@example.com".into(),
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time_format_valid() {
        assert!(validate_time_format("09:00").is_ok());
        assert!(validate_time_format("23:59").is_ok());
        assert!(validate_time_format("00:00").is_ok());
    }

    #[test]
    fn test_validate_time_format_invalid() {
        assert!(validate_time_format("9:00").is_err());
        assert!(validate_time_format("25:00").is_err());
        assert!(validate_time_format("12:60").is_err());
        assert!(validate_time_format("12-30").is_err());
        assert!(validate_time_format("ab:cd").is_err());
    }

    #[test]
    fn test_validate_weekday() {
        assert_eq!(validate_weekday("Monday").unwrap(), Weekday::Monday);
        assert_eq!(validate_weekday("Sunday").unwrap(), Weekday::Sunday);
        assert!(validate_weekday("monday").is_err());
        assert!(validate_weekday("Mon").is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-03-04").is_ok());
        assert!(validate_date("2024-3-4").is_err());
        assert!(validate_date("2024-02-30").is_err());
        assert!(validate_date("04/03/2024").is_err());
    }

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Rust in 100 seconds "), "Rust in 100 seconds");
        assert_eq!(normalize_title("   "), "Unknown Title");

        let long = "x".repeat(MAX_TITLE_LEN + 20);
        assert_eq!(normalize_title(&long).len(), MAX_TITLE_LEN);
    }

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email(" me@example.com ").unwrap(), "me@example.com");
        assert_eq!(validate_email("").unwrap(), "");
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
    }
}
