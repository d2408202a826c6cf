//! Hamburger menu: the toggle flips an `active` visual state on both the
//! control and the menu panel; any nav-link click closes the menu outright.

use crate::{Action, App, Result};

pub(crate) fn init(app: &mut App) -> Result<()> {
    if let Some(hamburger) = app.page.query_opt(".hamburger")? {
        app.add_listener(hamburger, "click", Action::ToggleMenu);
    }
    for link in app.page.query_all(".nav-link")? {
        app.add_listener(link, "click", Action::NavLinkClick(link));
    }
    Ok(())
}

pub(crate) fn toggle_menu(app: &mut App) -> Result<()> {
    if let Some(hamburger) = app.page.query_opt(".hamburger")? {
        app.page.toggle_class(hamburger, "active")?;
    }
    if let Some(menu) = app.page.query_opt(".nav-menu")? {
        app.page.toggle_class(menu, "active")?;
    }
    Ok(())
}

pub(crate) fn close_menu(app: &mut App) -> Result<()> {
    if let Some(hamburger) = app.page.query_opt(".hamburger")? {
        app.page.remove_class(hamburger, "active")?;
    }
    if let Some(menu) = app.page.query_opt(".nav-menu")? {
        app.page.remove_class(menu, "active")?;
    }
    Ok(())
}
