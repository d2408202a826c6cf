//! In-page navigation: smooth scroll to anchor targets below the fixed
//! header, and active-link highlighting driven by the scroll offset.

use tracing::trace;

use crate::page::NodeId;
use crate::{Action, App, Result};

/// A section activates this far above its top edge, matching the offset
/// the highlight probe uses on the real page.
const ACTIVATION_MARGIN: i64 = 100;

pub(crate) fn init(app: &mut App) -> Result<()> {
    app.add_window_listener("scroll", Action::HighlightNav);
    Ok(())
}

fn header_height(app: &App) -> Result<i64> {
    Ok(app
        .page
        .query_opt(".header")?
        .map(|header| app.page.client_height(header))
        .unwrap_or(0))
}

/// Scrolls so the target section clears the fixed header.
pub(crate) fn scroll_to_link_target(app: &mut App, link: NodeId) -> Result<()> {
    let Some(href) = app.page.attr(link, "href") else {
        return Ok(());
    };
    let Some(section_id) = href.strip_prefix('#') else {
        return Ok(());
    };
    let Some(section) = app.page.by_id(section_id) else {
        return Ok(());
    };
    let target = app.page.offset_top(section) - header_height(app)?;
    app.scroll_to(target)
}

/// Hero call-to-action: bring the booking section into view.
pub(crate) fn scroll_to_appointment(app: &mut App) -> Result<()> {
    let Some(section) = app.page.by_id("appointment") else {
        return Ok(());
    };
    let target = app.page.offset_top(section);
    app.scroll_to(target)
}

/// Recomputes which section owns the current scroll offset and moves the
/// `active` marker to its nav link; when no section matches, no link is
/// active. The last matching section wins, as on the real page.
pub(crate) fn highlight_active_link(app: &mut App) -> Result<()> {
    let offset = app.page.scroll_y();
    let header = header_height(app)?;

    let mut current = String::new();
    for section in app.page.query_all("section")? {
        let top = app.page.offset_top(section) - header - ACTIVATION_MARGIN;
        let height = app.page.client_height(section);
        if offset >= top && offset < top + height {
            if let Some(id) = app.page.attr(section, "id") {
                current = id;
            }
        }
    }
    trace!(offset, current = %current, "nav highlight recomputed");

    let wanted = format!("#{current}");
    for link in app.page.query_all(".nav-link")? {
        app.page.remove_class(link, "active")?;
        if !current.is_empty() && app.page.attr(link, "href").as_deref() == Some(&wanted) {
            app.page.add_class(link, "active")?;
        }
    }
    Ok(())
}
