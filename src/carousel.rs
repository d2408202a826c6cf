//! Testimonial carousel: an index over a fixed slide set with manual and
//! timed transitions. Pure index math is split out so the wrap-around
//! behavior is testable without a page.

use tracing::debug;

use crate::{Action, App, Result};

pub const AUTO_ADVANCE_MS: i64 = 5_000;

#[derive(Debug, Default)]
pub(crate) struct CarouselState {
    pub(crate) current: usize,
}

pub fn next_index(current: usize, count: usize) -> usize {
    debug_assert!(count > 0);
    (current + 1) % count
}

pub fn prev_index(current: usize, count: usize) -> usize {
    debug_assert!(count > 0);
    if current == 0 { count - 1 } else { current - 1 }
}

pub(crate) fn init(app: &mut App) -> Result<()> {
    let slides = app.page.query_all(".testimonial-card")?;
    if slides.is_empty() {
        // Nothing to rotate; leave the controls unwired and no interval.
        return Ok(());
    }

    if let Some(next) = app.page.by_id("next-testimonial") {
        app.add_listener(next, "click", Action::CarouselNext);
    }
    if let Some(prev) = app.page.by_id("prev-testimonial") {
        app.add_listener(prev, "click", Action::CarouselPrev);
    }
    for (index, dot) in app.page.query_all(".dot")?.into_iter().enumerate() {
        app.add_listener(dot, "click", Action::CarouselGoto(index));
    }

    app.schedule_interval(Action::CarouselAutoAdvance, AUTO_ADVANCE_MS);
    Ok(())
}

pub(crate) fn next(app: &mut App) -> Result<()> {
    let count = slide_count(app)?;
    if count == 0 {
        return Ok(());
    }
    let target = next_index(app.carousel.current, count);
    show(app, target)
}

pub(crate) fn prev(app: &mut App) -> Result<()> {
    let count = slide_count(app)?;
    if count == 0 {
        return Ok(());
    }
    let target = prev_index(app.carousel.current, count);
    show(app, target)
}

pub(crate) fn goto(app: &mut App, index: usize) -> Result<()> {
    let count = slide_count(app)?;
    if count == 0 || index >= count {
        return Ok(());
    }
    show(app, index)
}

fn slide_count(app: &App) -> Result<usize> {
    Ok(app.page.query_all(".testimonial-card")?.len())
}

/// One atomic transition: move the `active` markers and shift the track.
fn show(app: &mut App, index: usize) -> Result<()> {
    debug!(from = app.carousel.current, to = index, "carousel transition");

    for slide in app.page.query_all(".testimonial-card")? {
        app.page.remove_class(slide, "active")?;
    }
    for dot in app.page.query_all(".dot")? {
        app.page.remove_class(dot, "active")?;
    }

    let slides = app.page.query_all(".testimonial-card")?;
    if let Some(slide) = slides.get(index) {
        app.page.add_class(*slide, "active")?;
    }
    if let Some(dot) = app.page.query_all(".dot")?.get(index).copied() {
        app.page.add_class(dot, "active")?;
    }

    if let Some(track) = app.page.by_id("testimonial-track") {
        let shift = index * 100;
        app.page
            .set_style(track, "transform", &format!("translateX(-{shift}%)"))?;
    }

    app.carousel.current = index;
    Ok(())
}
