use crate::constants::*;

pub const GENDERS: &[&str] = &["male", "female", "other"];

pub fn validate_username(username: &str) -> Result<(), String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err("Username cannot be empty".into());
    }
    if trimmed.len() > MAX_USERNAME_LENGTH {
        return Err(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LENGTH
        ));
    }
    Ok(())
}

pub fn validate_age(age: i64) -> Result<(), String> {
    if age < MIN_AGE || age > MAX_AGE {
        return Err(format!(
            "Please enter a valid age ({} - {})",
            MIN_AGE, MAX_AGE
        ));
    }
    Ok(())
}

pub fn validate_gender(gender: &str) -> Result<(), String> {
    if GENDERS.contains(&gender.trim().to_lowercase().as_str()) {
        Ok(())
    } else {
        Err("Please select a gender".into())
    }
}

pub fn validate_country(country: &str) -> Result<(), String> {
    if country.trim().is_empty() {
        return Err("Please select a country".into());
    }
    Ok(())
}

pub fn validate_message_body(body: &str) -> Result<(), String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err("Message cannot be empty".into());
    }
    if trimmed.len() > MAX_MESSAGE_LENGTH {
        return Err("Message too long".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rejects_whitespace_only() {
        assert!(validate_username("   ").is_err());
        assert!(validate_username("alice").is_ok());
    }

    #[test]
    fn age_bounds_are_inclusive() {
        assert!(validate_age(18).is_ok());
        assert!(validate_age(60).is_ok());
        assert!(validate_age(17).is_err());
        assert!(validate_age(61).is_err());
    }

    #[test]
    fn gender_is_case_insensitive() {
        assert!(validate_gender("Male").is_ok());
        assert!(validate_gender("FEMALE").is_ok());
        assert!(validate_gender("unknown").is_err());
    }
}
