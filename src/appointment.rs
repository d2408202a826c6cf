//! Appointment booking form: department → doctor cascade, synchronous
//! full-form validation, and the confirmation notice with its cancellable
//! auto-dismiss timer.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use fancy_regex::Regex;
use tracing::debug;

use crate::catalog;
use crate::page::NodeId;
use crate::{Action, App, EventInfo, Result};

pub const CONFIRMATION_DISMISS_MS: i64 = 5_000;

const INVALID_BORDER: &str = "#ef4444";
const DEFAULT_BORDER: &str = "#e5e7eb";
const DOCTOR_PLACEHOLDER: &str = "Select Doctor";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[\d\s\-\(\)]{10,}$").expect("phone pattern compiles")
});

/// Validated appointment fields, ordered the way errors are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Department,
    Doctor,
    Date,
    Time,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Department,
        Field::Doctor,
        Field::Date,
        Field::Time,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Department => "department",
            Field::Doctor => "doctor",
            Field::Date => "date",
            Field::Time => "time",
        }
    }

    pub fn error_slot(self) -> String {
        format!("{}-error", self.id())
    }
}

/// Snapshot of the form inputs at validation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub department: String,
    pub doctor: String,
    pub date: String,
    pub time: String,
}

#[derive(Debug, Default)]
pub(crate) struct AppointmentState {
    pub(crate) dismiss_timer: Option<i64>,
}

/// Checks every field and reports all failures at once; a field's message
/// is the last rule it broke, so a past Sunday reports the Sunday message.
pub fn validate(input: &AppointmentInput, today: NaiveDate) -> BTreeMap<Field, String> {
    let mut errors = BTreeMap::new();

    let name = input.name.trim();
    if name.is_empty() {
        errors.insert(Field::Name, "Name is required".to_string());
    } else if name.chars().count() < 2 {
        errors.insert(Field::Name, "Name must be at least 2 characters".to_string());
    }

    let email = input.email.trim();
    if email.is_empty() {
        errors.insert(Field::Email, "Email is required".to_string());
    } else if !pattern_matches(&EMAIL_PATTERN, email) {
        errors.insert(
            Field::Email,
            "Please enter a valid email address".to_string(),
        );
    }

    let phone = input.phone.trim();
    if phone.is_empty() {
        errors.insert(Field::Phone, "Phone number is required".to_string());
    } else if !pattern_matches(&PHONE_PATTERN, phone) {
        errors.insert(Field::Phone, "Please enter a valid phone number".to_string());
    }

    if input.department.is_empty() {
        errors.insert(Field::Department, "Please select a department".to_string());
    }

    if input.doctor.is_empty() {
        errors.insert(Field::Doctor, "Please select a doctor".to_string());
    }

    if input.date.is_empty() {
        errors.insert(Field::Date, "Please select a date".to_string());
    } else {
        match NaiveDate::parse_from_str(&input.date, "%Y-%m-%d") {
            Ok(date) => {
                // Today itself is rejected: bookings start tomorrow, the
                // same rule the date input's `min` attribute advertises.
                if date <= today {
                    errors.insert(Field::Date, "Please select a future date".to_string());
                }
                if date.weekday() == Weekday::Sun {
                    errors.insert(
                        Field::Date,
                        "Appointments not available on Sundays".to_string(),
                    );
                }
            }
            Err(_) => {
                errors.insert(Field::Date, "Please select a future date".to_string());
            }
        }
    }

    if input.time.is_empty() {
        errors.insert(Field::Time, "Please select a time".to_string());
    }

    errors
}

fn pattern_matches(pattern: &Regex, candidate: &str) -> bool {
    pattern.is_match(candidate).unwrap_or(false)
}

pub(crate) fn init(app: &mut App) -> Result<()> {
    let Some(form) = app.page.query_opt("#appointment-form")? else {
        return Ok(());
    };
    app.add_listener(form, "submit", Action::AppointmentSubmit);

    if let Some(department) = app.page.by_id("department") {
        app.add_listener(department, "change", Action::DepartmentChanged);
    }

    if let Some(modal) = app.page.by_id("confirmation-modal") {
        app.add_listener(modal, "click", Action::ConfirmationBackdropClick);
        for close in app.page.query_all(".close")? {
            if app.page.is_descendant_of(close, modal) {
                app.add_listener(close, "click", Action::DismissConfirmation);
            }
        }
    }

    if let Some(hero) = app.page.query_opt(".hero-btn")? {
        app.add_listener(hero, "click", Action::HeroScroll);
    }

    set_minimum_date(app)?;
    Ok(())
}

/// The booking page advertises tomorrow as the earliest selectable date.
fn set_minimum_date(app: &mut App) -> Result<()> {
    let Some(date_input) = app.page.by_id("date") else {
        return Ok(());
    };
    let tomorrow = app
        .config
        .today
        .checked_add_days(Days::new(1))
        .unwrap_or(app.config.today);
    app.page
        .set_attr(date_input, "min", &tomorrow.format("%Y-%m-%d").to_string())
}

pub(crate) fn department_changed(app: &mut App) -> Result<()> {
    let Some(department) = app.page.by_id("department") else {
        return Ok(());
    };
    let Some(doctor) = app.page.by_id("doctor") else {
        return Ok(());
    };

    let selected = app.page.value(department)?;
    let doctors: Vec<String> = app.config.catalog.doctors(&selected).to_vec();
    debug!(department = %selected, doctors = doctors.len(), "rebuilding doctor options");

    app.page.remove_children(doctor);
    append_option(app, doctor, "", DOCTOR_PLACEHOLDER);
    for label in &doctors {
        let value = catalog::option_value(label);
        append_option(app, doctor, &value, label);
    }
    app.page.set_value(doctor, "")?;
    clear_error(app, Field::Doctor)?;
    Ok(())
}

fn append_option(app: &mut App, select: NodeId, value: &str, label: &str) {
    let mut attrs = HashMap::new();
    attrs.insert("value".to_string(), value.to_string());
    let option = app.page.create_element(select, "option".to_string(), attrs);
    app.page.create_text(option, label.to_string());
}

fn read_input(app: &App) -> Result<AppointmentInput> {
    let mut input = AppointmentInput::default();
    for field in Field::ALL {
        let Some(node) = app.page.by_id(field.id()) else {
            continue;
        };
        let value = app.page.value(node)?;
        match field {
            Field::Name => input.name = value,
            Field::Email => input.email = value,
            Field::Phone => input.phone = value,
            Field::Department => input.department = value,
            Field::Doctor => input.doctor = value,
            Field::Date => input.date = value,
            Field::Time => input.time = value,
        }
    }
    Ok(input)
}

pub(crate) fn submit(app: &mut App) -> Result<()> {
    clear_all_errors(app)?;
    let input = read_input(app)?;
    let errors = validate(&input, app.config.today);
    debug!(errors = errors.len(), "appointment form submitted");

    if errors.is_empty() {
        show_confirmation(app)?;
        if let Some(form) = app.page.by_id("appointment-form") {
            app.page.reset_form(form);
        }
        reset_doctor_options(app)?;
        clear_all_errors(app)?;
    } else {
        for (field, message) in &errors {
            show_error(app, *field, message)?;
        }
    }
    Ok(())
}

fn reset_doctor_options(app: &mut App) -> Result<()> {
    let Some(doctor) = app.page.by_id("doctor") else {
        return Ok(());
    };
    app.page.remove_children(doctor);
    append_option(app, doctor, "", DOCTOR_PLACEHOLDER);
    app.page.sync_select(doctor);
    Ok(())
}

fn show_confirmation(app: &mut App) -> Result<()> {
    let Some(modal) = app.page.by_id("confirmation-modal") else {
        return Ok(());
    };
    app.page.add_class(modal, "show")?;
    if let Some(stale) = app.appointment.dismiss_timer.take() {
        app.clear_timer(stale);
    }
    let timer = app.schedule_timeout(Action::AutoDismissConfirmation, CONFIRMATION_DISMISS_MS);
    app.appointment.dismiss_timer = Some(timer);
    Ok(())
}

pub(crate) fn dismiss_confirmation(app: &mut App) -> Result<()> {
    let Some(modal) = app.page.by_id("confirmation-modal") else {
        return Ok(());
    };
    app.page.remove_class(modal, "show")?;
    if let Some(timer) = app.appointment.dismiss_timer.take() {
        app.clear_timer(timer);
    }
    Ok(())
}

pub(crate) fn backdrop_click(app: &mut App, event: &EventInfo) -> Result<()> {
    // Only a click on the backdrop itself dismisses; clicks on the dialog
    // content bubble up here with a different target.
    if event.target == event.current_target {
        dismiss_confirmation(app)?;
    }
    Ok(())
}

pub(crate) fn auto_dismiss_confirmation(app: &mut App) -> Result<()> {
    app.appointment.dismiss_timer = None;
    if let Some(modal) = app.page.by_id("confirmation-modal") {
        app.page.remove_class(modal, "show")?;
    }
    Ok(())
}

fn show_error(app: &mut App, field: Field, message: &str) -> Result<()> {
    if let Some(slot) = app.page.by_id(&field.error_slot()) {
        app.page.set_text(slot, message)?;
    }
    if let Some(input) = app.page.by_id(field.id()) {
        app.page.set_style(input, "border-color", INVALID_BORDER)?;
    }
    Ok(())
}

pub(crate) fn clear_error(app: &mut App, field: Field) -> Result<()> {
    if let Some(slot) = app.page.by_id(&field.error_slot()) {
        app.page.set_text(slot, "")?;
    }
    if let Some(input) = app.page.by_id(field.id()) {
        app.page.set_style(input, "border-color", DEFAULT_BORDER)?;
    }
    Ok(())
}

fn clear_all_errors(app: &mut App) -> Result<()> {
    for slot in app.page.query_all(".error-message")? {
        app.page.set_text(slot, "")?;
    }
    for tag in ["input", "select", "textarea"] {
        for control in app.page.query_all(tag)? {
            app.page.set_style(control, "border-color", DEFAULT_BORDER)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input(today: NaiveDate) -> AppointmentInput {
        // Pick the next non-Sunday after today.
        let mut date = today + Days::new(1);
        if date.weekday() == Weekday::Sun {
            date = date + Days::new(1);
        }
        AppointmentInput {
            name: "Asha Rao".into(),
            email: "asha@example.com".into(),
            phone: "+91 98765 43210".into(),
            department: "cardiology".into(),
            doctor: "dr.-rakesh-sharma---cardiologist".into(),
            date: date.format("%Y-%m-%d").to_string(),
            time: "10:00".into(),
        }
    }

    fn today() -> NaiveDate {
        // A Monday, so `today + 1` never trips the Sunday rule.
        NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date")
    }

    #[test]
    fn fully_valid_input_has_no_errors() {
        assert!(validate(&valid_input(today()), today()).is_empty());
    }

    #[test]
    fn all_failures_are_collected_not_just_the_first() {
        let errors = validate(&AppointmentInput::default(), today());
        assert_eq!(errors.len(), Field::ALL.len());
        assert_eq!(errors[&Field::Name], "Name is required");
        assert_eq!(errors[&Field::Time], "Please select a time");
    }

    #[test]
    fn single_character_name_is_too_short() {
        let mut input = valid_input(today());
        input.name = "A".into();
        assert_eq!(
            validate(&input, today())[&Field::Name],
            "Name must be at least 2 characters"
        );
        input.name = "Al".into();
        assert!(validate(&input, today()).is_empty());
    }

    #[test]
    fn email_format_is_checked() {
        let mut input = valid_input(today());
        input.email = "bad-email".into();
        assert_eq!(
            validate(&input, today())[&Field::Email],
            "Please enter a valid email address"
        );
        input.email = "a@b.co".into();
        assert!(validate(&input, today()).is_empty());
    }

    #[test]
    fn phone_needs_ten_characters_of_the_allowed_class() {
        let mut input = valid_input(today());
        input.phone = "12345".into();
        assert_eq!(
            validate(&input, today())[&Field::Phone],
            "Please enter a valid phone number"
        );
        input.phone = "letters-and-1234567".into();
        assert!(validate(&input, today()).contains_key(&Field::Phone));
        input.phone = "(022) 1234-5678".into();
        assert!(validate(&input, today()).is_empty());
    }

    #[test]
    fn date_equal_to_today_is_rejected() {
        let mut input = valid_input(today());
        input.date = today().format("%Y-%m-%d").to_string();
        assert_eq!(
            validate(&input, today())[&Field::Date],
            "Please select a future date"
        );
    }

    #[test]
    fn future_sunday_is_rejected() {
        let mut input = valid_input(today());
        // 2025-03-16 is the Sunday after the fixed Monday.
        input.date = "2025-03-16".into();
        assert_eq!(
            validate(&input, today())[&Field::Date],
            "Appointments not available on Sundays"
        );
    }

    #[test]
    fn past_sunday_reports_the_sunday_message() {
        let mut input = valid_input(today());
        input.date = "2025-03-09".into();
        assert_eq!(
            validate(&input, today())[&Field::Date],
            "Appointments not available on Sundays"
        );
    }

    #[test]
    fn unparseable_date_counts_as_not_future() {
        let mut input = valid_input(today());
        input.date = "not-a-date".into();
        assert_eq!(
            validate(&input, today())[&Field::Date],
            "Please select a future date"
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let mut input = valid_input(today());
        input.name = "A".into();
        input.email = "nope".into();
        let first = validate(&input, today());
        let second = validate(&input, today());
        assert_eq!(first, second);
    }

    #[test]
    fn whitespace_only_fields_are_missing_not_malformed() {
        let mut input = valid_input(today());
        input.name = "   ".into();
        input.email = " \t ".into();
        let errors = validate(&input, today());
        assert_eq!(errors[&Field::Name], "Name is required");
        assert_eq!(errors[&Field::Email], "Email is required");
    }
}
