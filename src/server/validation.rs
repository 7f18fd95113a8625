const MAX_USERNAME_LEN: usize = 64;

/// Usernames are free-form apart from length, whitespace and control characters.
pub fn validate_username(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if name.chars().count() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        ));
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err("Username cannot contain whitespace".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.lopes@lab").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("two words").is_err());
        assert!(validate_username("tab\there").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
    }
}
