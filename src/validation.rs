use uuid::Uuid;

use crate::error::AppError;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Non-blank, at most [`MAX_NAME_LEN`] characters.
pub fn require_name(field: &str, value: Option<&str>) -> Result<String, AppError> {
    let value = value.ok_or_else(|| AppError::Validation(format!("{field} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} should not be empty")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(value.to_string())
}

pub fn check_description(value: &str) -> Result<(), AppError> {
    if value.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(AppError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

pub fn require_uuid(field: &str, value: Option<&str>) -> Result<Uuid, AppError> {
    let value = value.ok_or_else(|| AppError::Validation(format!("{field} is required")))?;
    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Validation(format!("{field} must be a UUID")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_must_be_present_and_non_blank() {
        assert!(matches!(require_name("name", None), Err(AppError::Validation(_))));
        assert!(matches!(require_name("name", Some("   ")), Err(AppError::Validation(_))));
        assert_eq!(require_name("name", Some("logo1")).unwrap(), "logo1");
    }

    #[test]
    fn overlong_values_are_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(require_name("name", Some(&long)).is_err());
        assert!(check_description(&"d".repeat(MAX_DESCRIPTION_LEN + 1)).is_err());
        assert!(check_description("").is_ok());
    }

    #[test]
    fn project_ids_must_be_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(require_uuid("projectId", Some(&id.to_string())).unwrap(), id);
        assert!(require_uuid("projectId", Some("not-a-uuid")).is_err());
        assert!(require_uuid("projectId", None).is_err());
    }
}
