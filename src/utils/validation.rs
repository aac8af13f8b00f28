use std::borrow::Cow;

use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub fn validate_person_name(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '-' | '.' | '\''));
    if ok {
        Ok(())
    } else {
        Err(invalid("name_chars", "Name contains invalid characters"))
    }
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let ok = value
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || matches!(c, '-' | '+' | '(' | ')'));
    if ok {
        Ok(())
    } else {
        Err(invalid("phone_format", "Invalid phone format"))
    }
}

/// Accepts `NNNNN` or `NNNNN-NNNN`.
pub fn validate_zipcode(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let digits = |s: &[u8]| s.iter().all(u8::is_ascii_digit);
    let ok = match bytes.len() {
        5 => digits(bytes),
        10 => digits(&bytes[..5]) && bytes[5] == b'-' && digits(&bytes[6..]),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(invalid("zipcode_format", "Zipcode must be NNNNN or NNNNN-NNNN"))
    }
}

pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid(
            "password_upper",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(invalid(
            "password_lower",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        return Err(invalid("password_digit", "Password must contain at least one digit"));
    }
    Ok(())
}
