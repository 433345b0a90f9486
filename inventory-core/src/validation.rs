use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::{Location, NewAllocation, PersonQuery};

const CORPORATE_EMAIL_PATTERN: &str = r"(?i)^[A-Za-z0-9._%+-]+@t-systems\.com$";
const GENERAL_EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";

pub const CORPORATE_EMAIL_MESSAGE: &str = "Email must be a @t-systems.com address";
pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const MISSING_SERIAL_MESSAGE: &str = "Please enter a Mac Serial Number";
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter username and password";

static CORPORATE_EMAIL: OnceLock<Regex> = OnceLock::new();
static GENERAL_EMAIL: OnceLock<Regex> = OnceLock::new();

fn corporate_email_regex() -> &'static Regex {
    CORPORATE_EMAIL.get_or_init(|| Regex::new(CORPORATE_EMAIL_PATTERN).expect("corporate email pattern"))
}

fn general_email_regex() -> &'static Regex {
    GENERAL_EMAIL.get_or_init(|| Regex::new(GENERAL_EMAIL_PATTERN).expect("general email pattern"))
}

pub fn is_corporate_email(email: &str) -> bool {
    corporate_email_regex().is_match(email)
}

pub fn is_valid_email(email: &str) -> bool {
    general_email_regex().is_match(email)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Field name to message, in field-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    /// Drops the error for a field the user has edited.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Builds errors from whatever `errors` object a remote response carried.
    /// Non-string messages are rendered as JSON text.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut errors = FieldErrors::new();
        for (field, message) in object {
            let text = match message {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            errors.insert(field, text);
        }
        Some(errors)
    }
}

fn check_location(location: &str, errors: &mut FieldErrors) {
    if is_blank(location) {
        errors.insert("location", "Location is required");
    } else if !Location::is_allowed(location) {
        errors.insert("location", "Location must be Pune or Bangalore");
    }
}

fn check_corporate_email(email: &str, errors: &mut FieldErrors) {
    if is_blank(email) {
        errors.insert("email", "Email is required");
    } else if !is_corporate_email(email) {
        errors.insert("email", CORPORATE_EMAIL_MESSAGE);
    }
}

/// Allocation checks shared by the add page and the `/api/allocations` route.
/// The add page additionally requires details.
pub fn validate_allocation_fields(form: &NewAllocation) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if is_blank(&form.name) {
        errors.insert("name", "Name is required");
    }
    if is_blank(&form.serial_number) {
        errors.insert("serialNumber", "Serial Number is required");
    }
    if is_blank(&form.allocation_date) {
        errors.insert("allocationDate", "Allocation Date is required");
    }
    if is_blank(&form.po) {
        errors.insert("po", "PO is required");
    }
    check_location(&form.location, &mut errors);
    check_corporate_email(&form.email, &mut errors);
    errors
}

pub fn validate_new_allocation(form: &NewAllocation) -> FieldErrors {
    let mut errors = validate_allocation_fields(form);
    if is_blank(&form.detail) {
        errors.insert("details", "Allocation Details are required");
    }
    errors
}

pub fn validate_person_query(query: &PersonQuery) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if is_blank(&query.name) {
        errors.insert("name", "Name is required");
    }
    check_corporate_email(&query.email, &mut errors);
    errors
}

pub fn validate_serial(serial: &str) -> Result<(), &'static str> {
    if is_blank(serial) {
        Err(MISSING_SERIAL_MESSAGE)
    } else {
        Ok(())
    }
}

// Login only checks emptiness; whitespace is passed through as typed.
pub fn validate_login(username: &str, password: &str) -> Result<(), &'static str> {
    if username.is_empty() || password.is_empty() {
        Err(MISSING_CREDENTIALS_MESSAGE)
    } else {
        Ok(())
    }
}

/// The update page allows clearing the email; a non-empty value must look
/// like an address.
/// An empty email is allowed; anything else is matched as submitted, so
/// surrounding whitespace is rejected. The value is trimmed only when the
/// update payload is built.
pub fn validate_update_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() || is_valid_email(email) {
        Ok(())
    } else {
        Err(INVALID_EMAIL_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_allocation() -> NewAllocation {
        NewAllocation {
            name: "Priya Nair".to_string(),
            serial_number: "C02ZK0AAMD6T".to_string(),
            allocation_date: "2024-03-18".to_string(),
            po: "PO-7781".to_string(),
            location: "Pune".to_string(),
            email: "priya.nair@t-systems.com".to_string(),
            detail: "MacBook Pro 14 with charger".to_string(),
        }
    }

    #[test]
    fn test_corporate_email() {
        assert!(is_corporate_email("priya.nair@t-systems.com"));
        assert!(is_corporate_email("PRIYA@T-SYSTEMS.COM"));
        assert!(!is_corporate_email("priya@t-systems.com.evil"));
        assert!(!is_corporate_email("priya@gmail.com"));
        assert!(!is_corporate_email("@t-systems.com"));
        assert!(!is_corporate_email("priya nair@t-systems.com"));
    }

    #[test]
    fn test_general_email() {
        assert!(is_valid_email("someone@example.org"));
        assert!(!is_valid_email("someone@example"));
        assert!(!is_valid_email("someone@example.c"));
    }

    #[test]
    fn test_complete_allocation_is_valid() {
        assert!(validate_new_allocation(&complete_allocation()).is_empty());
    }

    #[test]
    fn test_blank_allocation_reports_every_field() {
        let errors = validate_new_allocation(&NewAllocation {
            name: "   ".to_string(),
            ..Default::default()
        });
        assert_eq!(errors.len(), 7);
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("details"), Some("Allocation Details are required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_location_must_be_known() {
        let mut form = complete_allocation();
        form.location = "Berlin".to_string();
        let errors = validate_new_allocation(&form);
        assert_eq!(errors.get("location"), Some("Location must be Pune or Bangalore"));
    }

    #[test]
    fn test_shared_checks_skip_details() {
        let mut form = complete_allocation();
        form.detail.clear();
        assert!(validate_allocation_fields(&form).is_empty());
        assert!(!validate_new_allocation(&form).is_empty());
    }

    #[test]
    fn test_person_query() {
        let errors = validate_person_query(&PersonQuery {
            name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
        });
        assert_eq!(errors.get("email"), Some(CORPORATE_EMAIL_MESSAGE));
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn test_field_errors_clear_on_edit() {
        let mut errors = validate_person_query(&PersonQuery::default());
        assert_eq!(errors.remove("name").as_deref(), Some("Name is required"));
        assert!(errors.get("name").is_none());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_field_errors_from_remote_json() {
        let errors = FieldErrors::from_json(&serde_json::json!({
            "po": "PO not found",
            "email": ["taken"]
        }))
        .unwrap();
        assert_eq!(errors.get("po"), Some("PO not found"));
        assert_eq!(errors.get("email"), Some("[\"taken\"]"));
        assert!(FieldErrors::from_json(&serde_json::json!("nope")).is_none());
    }

    #[test]
    fn test_serial_login_and_update_email() {
        assert_eq!(validate_serial("  "), Err(MISSING_SERIAL_MESSAGE));
        assert!(validate_serial("C02").is_ok());
        assert_eq!(validate_login("ops", ""), Err(MISSING_CREDENTIALS_MESSAGE));
        assert!(validate_login("ops", "pw").is_ok());
        assert!(validate_update_email("").is_ok());
        assert!(validate_update_email("a@b.io").is_ok());
        assert_eq!(validate_update_email(" a@b.io "), Err(INVALID_EMAIL_MESSAGE));
        assert_eq!(validate_update_email("  "), Err(INVALID_EMAIL_MESSAGE));
        assert_eq!(validate_update_email("nope"), Err(INVALID_EMAIL_MESSAGE));
    }
}
