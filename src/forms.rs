//! Request-payload validation, the server-side counterpart of the HTML form
//! cleaning the front-end used to rely on. Handlers call these before touching
//! the database and surface the collected errors in a 400 response.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::user_association::Role;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub const STORY_TYPES: [&str; 3] = ["feature", "bug", "chore"];
pub const STORY_STATUSES: [&str; 4] = ["todo", "started", "done", "accepted"];

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> FieldError {
        FieldError {
            field,
            message: message.to_string(),
        }
    }
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| FieldError::new(field, "Expected a date formatted as YYYY-MM-DD"))
}

pub fn validate_signup(
    username: &str,
    email: &str,
    password: &str,
    password_confirm: &str,
    role: &str,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    }
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !email.contains('@') {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }
    if password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    if password != password_confirm {
        errors.push(FieldError::new(
            "password_confirm",
            "The two password fields didn't match",
        ));
    }
    if Role::parse(role).is_none() {
        errors.push(FieldError::new(
            "role",
            "Role must be one of cli, own or dev",
        ));
    }
    errors
}

pub fn validate_password_change(new_password: &str, new_password_confirm: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if new_password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "new_password",
            "Password must be at least 8 characters long",
        ));
    }
    if new_password != new_password_confirm {
        errors.push(FieldError::new(
            "new_password_confirm",
            "The two password fields didn't match",
        ));
    }
    errors
}

pub fn validate_profile(username: &str, email: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if username.trim().is_empty() {
        errors.push(FieldError::new("username", "Username is required"));
    }
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !email.contains('@') {
        errors.push(FieldError::new("email", "Enter a valid email address"));
    }
    errors
}

// `today` is injected so the rule stays testable.
pub fn validate_iteration(
    title: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    today: NaiveDate,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if start_date < today {
        errors.push(FieldError::new(
            "start_date",
            "Iteration begin date should be later than the current date",
        ));
    }
    if end_date < start_date {
        errors.push(FieldError::new(
            "end_date",
            "Iteration end date should be later than its start date",
        ));
    }
    errors
}

pub fn validate_story(title: &str, hours: i32, story_type: &str, status: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if hours <= 0 {
        errors.push(FieldError::new("hours", "Hours should be greater than 0"));
    }
    if !STORY_TYPES.contains(&story_type) {
        errors.push(FieldError::new(
            "story_type",
            "Type must be one of feature, bug or chore",
        ));
    }
    if !STORY_STATUSES.contains(&status) {
        errors.push(FieldError::new(
            "status",
            "Status must be one of todo, started, done or accepted",
        ));
    }
    errors
}

pub fn validate_comment(title: &str, comment: &str) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if title.trim().is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }
    if comment.trim().is_empty() {
        errors.push(FieldError::new("comment", "Comment is required"));
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    fn fields(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.field).collect()
    }

    #[test]
    fn iteration_in_the_past_is_rejected() {
        let today = date(2024, 6, 10);
        let errors = validate_iteration("Sprint 1", date(2024, 6, 9), date(2024, 6, 20), today);
        assert_eq!(fields(&errors), vec!["start_date"]);
    }

    #[test]
    fn iteration_end_before_start_is_rejected() {
        let today = date(2024, 6, 10);
        let errors = validate_iteration("Sprint 1", date(2024, 6, 12), date(2024, 6, 11), today);
        assert_eq!(fields(&errors), vec!["end_date"]);
    }

    #[test]
    fn iteration_starting_today_is_accepted() {
        let today = date(2024, 6, 10);
        let errors = validate_iteration("Sprint 1", today, today, today);
        assert!(errors.is_empty());
    }

    #[test]
    fn story_hours_must_be_positive() {
        assert_eq!(
            fields(&validate_story("Checkout flow", 0, "feature", "todo")),
            vec!["hours"]
        );
        assert_eq!(
            fields(&validate_story("Checkout flow", -4, "feature", "todo")),
            vec!["hours"]
        );
        assert!(validate_story("Checkout flow", 1, "feature", "todo").is_empty());
    }

    #[test]
    fn story_choice_fields_are_checked() {
        let errors = validate_story("Checkout flow", 2, "epic", "paused");
        assert_eq!(fields(&errors), vec!["story_type", "status"]);
    }

    #[test]
    fn signup_rejects_mismatched_passwords_and_bad_role() {
        let errors = validate_signup("ada", "ada@example.com", "correcthorse", "staplebattery", "adm");
        assert_eq!(fields(&errors), vec!["password_confirm", "role"]);
    }

    #[test]
    fn signup_accepts_a_complete_form() {
        let errors = validate_signup("ada", "ada@example.com", "correcthorse", "correcthorse", "dev");
        assert!(errors.is_empty());
    }

    #[test]
    fn signup_requires_username_and_valid_email() {
        let errors = validate_signup("", "not-an-email", "correcthorse", "correcthorse", "cli");
        assert_eq!(fields(&errors), vec!["username", "email"]);
    }

    #[test]
    fn short_password_change_is_rejected() {
        let errors = validate_password_change("short", "short");
        assert_eq!(fields(&errors), vec!["new_password"]);
    }

    #[test]
    fn comment_requires_both_fields() {
        let errors = validate_comment(" ", "");
        assert_eq!(fields(&errors), vec!["title", "comment"]);
    }

    #[test]
    fn date_parsing_reports_the_field() {
        let err = parse_date("start_date", "06/10/2024").expect_err("bad format must fail");
        assert_eq!(err.field, "start_date");
        assert!(parse_date("start_date", "2024-06-10").is_ok());
    }
}
