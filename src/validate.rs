use validator::Validate;

use crate::error::AppError;

/// Trims `value` and rejects it when nothing is left.
pub fn required(field: &str, value: Option<&str>) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::BadRequest(format!("{field} is required"))),
    }
}

/// Required email, trimmed and lowercased; shape is checked by the DTO's
/// `Validate` derive.
pub fn email(field: &str, value: Option<&str>) -> Result<String, AppError> {
    Ok(required(field, value)?.to_lowercase())
}

/// Runs the `validator` rules declared on a request body.
pub fn payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(AppError::from)
}

/// Lowercase ASCII slug: alphanumerics joined by single dashes.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required("name", Some("  Asha ")).unwrap(), "Asha");
        assert!(required("name", Some("   ")).is_err());
        assert!(required("name", None).is_err());
    }

    #[derive(Validate)]
    struct Contact {
        #[validate(email(message = "must be a valid email address"))]
        client_email: Option<String>,
    }

    #[test]
    fn email_names_its_field() {
        assert_eq!(email("email", Some(" A@Example.com ")).unwrap(), "a@example.com");
        let err = email("client_email", Some("  ")).unwrap_err();
        assert_eq!(err.to_string(), "Bad Request: client_email is required");
    }

    #[test]
    fn malformed_addresses_are_rejected() {
        for bad in ["nope", "@example.com", "a@.com", "a b@c.d", "a@b.", "a@@b.com", "a@b..com"] {
            let contact = Contact { client_email: Some(bad.into()) };
            let err = payload(&contact).unwrap_err();
            assert!(err.to_string().contains("client_email"), "{bad}: {err}");
        }
        let ok = Contact { client_email: Some("asha.rao+tax@example.co.in".into()) };
        assert!(payload(&ok).is_ok());
        assert!(payload(&Contact { client_email: None }).is_ok());
    }

    #[test]
    fn slugs() {
        assert_eq!(slugify("Career Coaching & Mentoring"), "career-coaching-mentoring");
        assert_eq!(slugify("  --Rust 101--  "), "rust-101");
        assert_eq!(slugify("!!!"), "");
    }
}
