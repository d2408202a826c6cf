//! Contact form: presence-only validation with a generic acknowledgment.

use tracing::debug;

use crate::{Action, App, Result};

pub const CONTACT_SUCCESS: &str = "Thank you for your message! We will get back to you soon.";
pub const CONTACT_INCOMPLETE: &str = "Please fill in all fields.";

pub(crate) fn init(app: &mut App) -> Result<()> {
    let Some(form) = app.page.query_opt("#contact-form")? else {
        return Ok(());
    };
    app.add_listener(form, "submit", Action::ContactSubmit);
    Ok(())
}

pub(crate) fn submit(app: &mut App) -> Result<()> {
    let Some(form) = app.page.by_id("contact-form") else {
        return Ok(());
    };

    let name = field_value(app, "contact-name")?;
    let email = field_value(app, "contact-email")?;
    let message = field_value(app, "message")?;

    let complete = !name.is_empty() && !email.is_empty() && !message.is_empty();
    debug!(complete, "contact form submitted");

    if complete {
        app.push_alert(CONTACT_SUCCESS);
        app.page.reset_form(form);
    } else {
        // Entered values stay put so the visitor can fill in the gap.
        app.push_alert(CONTACT_INCOMPLETE);
    }
    Ok(())
}

fn field_value(app: &App, id: &str) -> Result<String> {
    let Some(node) = app.page.by_id(id) else {
        return Ok(String::new());
    };
    Ok(app.page.value(node)?.trim().to_string())
}
