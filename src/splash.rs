//! Splash screen: a one-shot fade-out on load. The overlay stays for a
//! fixed delay, fades, then is fully hidden once the fade has run.

use crate::{Action, App, Result};

pub const SPLASH_DELAY_MS: i64 = 1_500;
pub const SPLASH_FADE_MS: i64 = 500;

pub(crate) fn init(app: &mut App) -> Result<()> {
    if app.page.by_id("splash-screen").is_none() {
        return Ok(());
    }
    app.add_window_listener("load", Action::SplashFadeStart);
    Ok(())
}

pub(crate) fn schedule_fade(app: &mut App) {
    app.schedule_timeout(Action::SplashFade, SPLASH_DELAY_MS);
}

pub(crate) fn fade(app: &mut App) -> Result<()> {
    if let Some(splash) = app.page.by_id("splash-screen") {
        app.page.set_style(splash, "opacity", "0")?;
        app.schedule_timeout(Action::SplashHide, SPLASH_FADE_MS);
    }
    Ok(())
}

pub(crate) fn hide(app: &mut App) -> Result<()> {
    if let Some(splash) = app.page.by_id("splash-screen") {
        app.page.set_style(splash, "display", "none")?;
    }
    Ok(())
}
