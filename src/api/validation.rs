use super::ApiError;

pub fn validate_id(id: i32, resource: &str) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {} ID: {}. ID must be a positive integer",
            resource, id
        )));
    }
    Ok(id)
}

pub fn validate_service_payload(
    name: &str,
    duration_minutes: i32,
    price: f64,
) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::validation("Service name cannot be empty"));
    }
    if duration_minutes <= 0 {
        return Err(ApiError::validation("Duration must be greater than 0"));
    }
    if price < 0.0 {
        return Err(ApiError::validation("Price cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id(1, "service").is_ok());
        assert!(validate_id(12345, "user").is_ok());
        assert!(validate_id(0, "service").is_err());
        assert!(validate_id(-1, "service").is_err());
    }

    #[test]
    fn test_validate_service_payload() {
        assert!(validate_service_payload("Manicure", 30, 10.0).is_ok());
        assert!(validate_service_payload("", 30, 10.0).is_err());
        assert!(validate_service_payload("   ", 30, 10.0).is_err());
        assert!(validate_service_payload("Manicure", 0, 10.0).is_err());
        assert!(validate_service_payload("Manicure", 30, -0.5).is_err());
    }
}
