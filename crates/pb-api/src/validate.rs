//! Form validation.
//!
//! Errors are collected, not short-circuited: the caller sees every
//! violated rule in one response.

use pb_core::models::Reservation;

use crate::sanitize::strip_markup;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 10;
const PASSWORD_MIN: usize = 12;
const PASSWORD_MAX: usize = 70;

/// The collapsed credential error. Identical for a missing account and a
/// wrong password so error text cannot be used to enumerate usernames.
pub const LOGIN_FAILED: &str = "Invalid username or password";

pub const USERNAME_TAKEN: &str = "That username is already taken.";

/// Registration rules for a (pre-trimmed) username.
pub fn validate_username(username: &str, errors: &mut Vec<String>) {
    if username.is_empty() {
        errors.push("You must provide a username.".to_string());
        return;
    }
    if username.chars().count() < USERNAME_MIN {
        errors.push("Username must be at least 3 characters.".to_string());
    }
    if username.chars().count() > USERNAME_MAX {
        errors.push("Username cannot exceed 10 characters.".to_string());
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Username can only contain letters and numbers.".to_string());
    }
}

pub fn validate_password(password: &str, errors: &mut Vec<String>) {
    if password.is_empty() {
        errors.push("You must provide a password.".to_string());
        return;
    }
    if password.chars().count() < PASSWORD_MIN {
        errors.push("Password must be at least 12 characters.".to_string());
    }
    if password.chars().count() > PASSWORD_MAX {
        errors.push("Password cannot exceed 70 characters.".to_string());
    }
}

/// Pre-lookup login check. Emptiness of either field already yields the
/// collapsed message; nothing more specific is ever reported.
pub fn validate_login(username: &str, password: &str) -> Vec<String> {
    if username.trim().is_empty() || password.is_empty() {
        vec![LOGIN_FAILED.to_string()]
    } else {
        Vec::new()
    }
}

/// Post input after markup stripping.
pub fn validate_post(title: &str, body: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if title.is_empty() {
        errors.push("You must provide a title.".to_string());
    }
    if body.is_empty() {
        errors.push("You must provide some content.".to_string());
    }
    errors
}

/// Parses the delimited reservation field `place,spot,spots left,rating`
/// into a typed value. Strict: exactly four fields, numeric where the
/// schema is numeric. Malformed input reports every broken field.
pub fn parse_reservation(raw: &str) -> Result<Reservation, Vec<String>> {
    let fields: Vec<&str> = raw.split(',').collect();
    if fields.len() != 4 {
        return Err(vec![
            "A reservation needs a place, spot, spots left and rating.".to_string(),
        ]);
    }

    let mut errors = Vec::new();

    let place = strip_markup(fields[0].trim());
    if place.is_empty() {
        errors.push("You must provide a place.".to_string());
    }

    let parking_spot = parse_number(fields[1], "Parking spot", &mut errors);
    let spots_left = parse_number(fields[2], "Spots left", &mut errors);
    let rating = parse_number(fields[3], "Rating", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Reservation {
        place,
        parking_spot,
        spots_left,
        rating,
    })
}

fn parse_number(field: &str, label: &str, errors: &mut Vec<String>) -> i64 {
    match field.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            errors.push(format!("{label} must be a number."));
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration_errors(username: &str, password: &str) -> Vec<String> {
        let mut errors = Vec::new();
        validate_username(username, &mut errors);
        validate_password(password, &mut errors);
        errors
    }

    #[test]
    fn valid_registration_has_no_errors() {
        assert!(registration_errors("alice", "correcthorsebattery").is_empty());
    }

    #[test]
    fn all_violations_are_reported_together() {
        let errors = registration_errors("a!", "short");
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("at least 3"));
        assert!(errors[1].contains("letters and numbers"));
        assert!(errors[2].contains("at least 12"));
    }

    #[test]
    fn username_bounds() {
        let mut errors = Vec::new();
        validate_username("abcdefghijk", &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("exceed 10"));
    }

    #[test]
    fn missing_fields_short_circuit_to_one_error_each() {
        let errors = registration_errors("", "");
        assert_eq!(
            errors,
            vec![
                "You must provide a username.".to_string(),
                "You must provide a password.".to_string(),
            ]
        );
    }

    #[test]
    fn login_emptiness_collapses_to_generic_error() {
        assert_eq!(validate_login("", "x"), vec![LOGIN_FAILED.to_string()]);
        assert_eq!(validate_login("alice", ""), vec![LOGIN_FAILED.to_string()]);
        assert!(validate_login("alice", "pw").is_empty());
    }

    #[test]
    fn reservation_parses_delimited_fields() {
        let reservation = parse_reservation("LotA,12,3,5").unwrap();
        assert_eq!(reservation.place, "LotA");
        assert_eq!(reservation.parking_spot, 12);
        assert_eq!(reservation.spots_left, 3);
        assert_eq!(reservation.rating, 5);
    }

    #[test]
    fn reservation_rejects_wrong_field_count() {
        assert!(parse_reservation("LotA,12").is_err());
        assert!(parse_reservation("LotA,12,3,5,extra").is_err());
    }

    #[test]
    fn reservation_reports_every_bad_field() {
        let errors = parse_reservation("  ,a,b,c").unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
