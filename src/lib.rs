//! Deterministic interactivity layer for the clinic marketing site.
//!
//! Everything the page does client-side — hamburger menu, appointment
//! booking with cascading department → doctor selects and validation, the
//! contact form, the testimonial carousel, smooth scrolling with active
//! nav highlighting, and the splash screen — runs against an in-memory
//! [`page::Page`] under an [`App`] harness with a virtual clock, so the
//! whole layer is testable without a browser.
//!
//! ```
//! use clinic_ui::{App, Config, CLINIC_PAGE};
//!
//! let mut app = App::boot(CLINIC_PAGE, Config::default())?;
//! app.select_value("#department", "cardiology")?;
//! assert_eq!(app.value("#doctor")?, "");
//! # Ok::<(), clinic_ui::Error>(())
//! ```

use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use tracing::{debug, trace};

pub mod appointment;
pub mod carousel;
pub mod catalog;
pub mod contact;
mod nav;
pub mod page;
mod scroll;
pub mod splash;

use appointment::AppointmentState;
use carousel::CarouselState;
use catalog::DoctorCatalog;
use page::{NodeId, Page};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("markup parse error: {0}")]
    MarkupParse(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("type mismatch for {selector}: expected {expected}, actual {actual}")]
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    #[error("assertion failed for {selector}: expected {expected}, actual {actual}, snippet {snippet}")]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        snippet: String,
    },
    #[error("page runtime error: {0}")]
    PageRuntime(String),
}

/// Handler payload stored in the listener table and in scheduled tasks.
/// Dispatch resolves an action to its controller at run time, so listener
/// execution never borrows the controllers while the page is being walked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    ToggleMenu,
    NavLinkClick(NodeId),
    HeroScroll,
    DepartmentChanged,
    AppointmentSubmit,
    DismissConfirmation,
    ConfirmationBackdropClick,
    AutoDismissConfirmation,
    ContactSubmit,
    CarouselNext,
    CarouselPrev,
    CarouselGoto(usize),
    CarouselAutoAdvance,
    HighlightNav,
    SplashFadeStart,
    SplashFade,
    SplashHide,
}

#[derive(Debug, Clone)]
pub(crate) struct EventInfo {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) default_prevented: bool,
}

impl EventInfo {
    fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            default_prevented: false,
        }
    }
}

#[derive(Debug, Default)]
struct ListenerStore {
    element: HashMap<(NodeId, String), Vec<Action>>,
    window: HashMap<String, Vec<Action>>,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: i64,
    due_at: i64,
    order: i64,
    interval_ms: Option<i64>,
    action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub interval_ms: Option<i64>,
}

/// Startup configuration. The doctor catalog and "today" are injected so
/// tests can pin both; everything else on the page is fixed behavior.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog: DoctorCatalog,
    pub today: NaiveDate,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: DoctorCatalog::default(),
            today: Local::now().date_naive(),
        }
    }
}

/// The page harness: owns the page model, the wired controllers, and the
/// virtual clock. Public methods simulate user interaction and drive time.
pub struct App {
    pub(crate) page: Page,
    pub(crate) config: Config,
    pub(crate) appointment: AppointmentState,
    pub(crate) carousel: CarouselState,
    listeners: ListenerStore,
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    next_timer_id: i64,
    next_task_order: i64,
    timer_step_limit: usize,
    alerts: Vec<String>,
}

impl App {
    /// Parses the markup, wires every controller that finds its elements,
    /// stamps the date input's `min` attribute, and fires the `load`
    /// event (which arms the splash-screen sequence).
    pub fn boot(markup: &str, config: Config) -> Result<Self> {
        let page = Page::from_markup(markup)?;
        let mut app = Self {
            page,
            config,
            appointment: AppointmentState::default(),
            carousel: CarouselState::default(),
            listeners: ListenerStore::default(),
            task_queue: Vec::new(),
            now_ms: 0,
            next_timer_id: 1,
            next_task_order: 0,
            timer_step_limit: 10_000,
            alerts: Vec::new(),
        };

        nav::init(&mut app)?;
        appointment::init(&mut app)?;
        contact::init(&mut app)?;
        carousel::init(&mut app)?;
        scroll::init(&mut app)?;
        splash::init(&mut app)?;

        app.dispatch_window("load")?;
        Ok(app)
    }

    pub(crate) fn add_listener(&mut self, node: NodeId, event_type: &str, action: Action) {
        trace!(?node, event_type, ?action, "listener registered");
        self.listeners
            .element
            .entry((node, event_type.to_string()))
            .or_default()
            .push(action);
    }

    pub(crate) fn add_window_listener(&mut self, event_type: &str, action: Action) {
        trace!(event_type, ?action, "window listener registered");
        self.listeners
            .window
            .entry(event_type.to_string())
            .or_default()
            .push(action);
    }

    // ----- simulated interaction ------------------------------------------

    /// Clicks an element; a click on a submit control that was not
    /// default-prevented also submits its enclosing form.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.page.query(selector)?;
        let event = self.dispatch_event(target, "click")?;
        if event.default_prevented {
            return Ok(());
        }
        if self.is_submit_control(target) {
            if let Some(form) = self.enclosing_form(target) {
                self.dispatch_event(form, "submit")?;
            }
        }
        Ok(())
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.page.query(selector)?;
        let tag = self
            .page
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }
        self.page.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn select_value(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.page.query(selector)?;
        let tag = self
            .page
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "select" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: tag,
            });
        }
        self.page.set_value(target, value)?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    /// Submits a form directly (or the enclosing form of any control).
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.page.query(selector)?;
        let form = if self
            .page
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.enclosing_form(target)
        };
        if let Some(form_id) = form {
            self.dispatch_event(form_id, "submit")?;
        }
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event_type: &str) -> Result<()> {
        let target = self.page.query(selector)?;
        self.dispatch_event(target, event_type)?;
        Ok(())
    }

    /// Moves the scroll offset and fires the window `scroll` event, which
    /// recomputes the active nav link.
    pub fn scroll_to(&mut self, offset: i64) -> Result<()> {
        self.page.set_scroll_y(offset);
        self.dispatch_window("scroll")
    }

    pub fn set_metrics(&mut self, selector: &str, offset_top: i64, client_height: i64) -> Result<()> {
        let target = self.page.query(selector)?;
        self.page.set_metrics(target, offset_top, client_height)
    }

    // ----- event plumbing -------------------------------------------------

    fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventInfo> {
        debug!(?target, event_type, "dispatch");
        let mut event = EventInfo::new(event_type, target);

        let mut path = vec![target];
        let mut cursor = self.page.parent(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.page.parent(node);
        }

        for node in path {
            event.current_target = node;
            let key = (node, event_type.to_string());
            let actions = self.listeners.element.get(&key).cloned().unwrap_or_default();
            for action in actions {
                self.run_action(action, &mut event)?;
            }
        }
        Ok(event)
    }

    pub(crate) fn dispatch_window(&mut self, event_type: &str) -> Result<()> {
        debug!(event_type, "window dispatch");
        let actions = self
            .listeners
            .window
            .get(event_type)
            .cloned()
            .unwrap_or_default();
        let mut event = EventInfo::new(event_type, NodeId(0));
        for action in actions {
            self.run_action(action, &mut event)?;
        }
        Ok(())
    }

    fn run_action(&mut self, action: Action, event: &mut EventInfo) -> Result<()> {
        trace!(?action, event_type = %event.event_type, "run action");
        match action {
            Action::ToggleMenu => nav::toggle_menu(self),
            Action::NavLinkClick(link) => {
                // Anchor default jump is suppressed; the scroll is ours.
                event.default_prevented = true;
                nav::close_menu(self)?;
                scroll::scroll_to_link_target(self, link)
            }
            Action::HeroScroll => scroll::scroll_to_appointment(self),
            Action::DepartmentChanged => appointment::department_changed(self),
            Action::AppointmentSubmit => {
                event.default_prevented = true;
                appointment::submit(self)
            }
            Action::DismissConfirmation => appointment::dismiss_confirmation(self),
            Action::ConfirmationBackdropClick => appointment::backdrop_click(self, event),
            Action::AutoDismissConfirmation => appointment::auto_dismiss_confirmation(self),
            Action::ContactSubmit => {
                event.default_prevented = true;
                contact::submit(self)
            }
            Action::CarouselNext | Action::CarouselAutoAdvance => carousel::next(self),
            Action::CarouselPrev => carousel::prev(self),
            Action::CarouselGoto(index) => carousel::goto(self, index),
            Action::HighlightNav => scroll::highlight_active_link(self),
            Action::SplashFadeStart => {
                splash::schedule_fade(self);
                Ok(())
            }
            Action::SplashFade => splash::fade(self),
            Action::SplashHide => splash::hide(self),
        }
    }

    fn is_submit_control(&self, node: NodeId) -> bool {
        let Some(tag) = self.page.tag_name(node) else {
            return false;
        };
        if tag.eq_ignore_ascii_case("button") {
            return self
                .page
                .attr(node, "type")
                .map(|kind| kind.eq_ignore_ascii_case("submit"))
                .unwrap_or(true);
        }
        if tag.eq_ignore_ascii_case("input") {
            return self
                .page
                .attr(node, "type")
                .map(|kind| kind.eq_ignore_ascii_case("submit"))
                .unwrap_or(false);
        }
        false
    }

    fn enclosing_form(&self, node: NodeId) -> Option<NodeId> {
        let mut cursor = self.page.parent(node);
        while let Some(current) = cursor {
            if self
                .page
                .tag_name(current)
                .map(|t| t.eq_ignore_ascii_case("form"))
                .unwrap_or(false)
            {
                return Some(current);
            }
            cursor = self.page.parent(current);
        }
        None
    }

    // ----- virtual clock --------------------------------------------------

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub(crate) fn schedule_timeout(&mut self, action: Action, delay_ms: i64) -> i64 {
        self.schedule_task(action, delay_ms, None)
    }

    pub(crate) fn schedule_interval(&mut self, action: Action, interval_ms: i64) -> i64 {
        self.schedule_task(action, interval_ms, Some(interval_ms))
    }

    fn schedule_task(&mut self, action: Action, delay_ms: i64, interval_ms: Option<i64>) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        debug!(id, due_at, ?interval_ms, ?action, "timer scheduled");
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            interval_ms,
            action,
        });
        id
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != timer_id);
        let existed = self.task_queue.len() != before;
        debug!(timer_id, existed, "timer cleared");
        existed
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.task_queue.len();
        self.task_queue.clear();
        debug!(cleared, "all timers cleared");
        cleared
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                interval_ms: task.interval_ms,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::PageRuntime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers_internal()?;
        debug!(delta_ms, now_ms = self.now_ms, ran, "time advanced");
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::PageRuntime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        self.now_ms = target_ms;
        let ran = self.run_due_timers_internal()?;
        debug!(now_ms = self.now_ms, ran, "time advanced to target");
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        self.run_due_timers_internal()
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::PageRuntime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_due_task_index() {
            steps += 1;
            if steps > self.timer_step_limit {
                return Err(Error::PageRuntime(format!(
                    "timer step limit exceeded (limit={}, now_ms={})",
                    self.timer_step_limit, self.now_ms
                )));
            }
            let task = self.task_queue.remove(next_idx);
            if let Some(every) = task.interval_ms {
                // Intervals re-arm from their previous deadline, so a long
                // advance catches up tick by tick.
                let order = self.next_task_order;
                self.next_task_order += 1;
                self.task_queue.push(ScheduledTask {
                    id: task.id,
                    due_at: task.due_at.saturating_add(every),
                    order,
                    interval_ms: Some(every),
                    action: task.action.clone(),
                });
            }
            debug!(id = task.id, due_at = task.due_at, "timer fired");
            let mut event = EventInfo::new("timer", NodeId(0));
            self.run_action(task.action, &mut event)?;
        }
        Ok(steps)
    }

    fn next_due_task_index(&self) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_at <= self.now_ms)
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    // ----- notifications --------------------------------------------------

    pub(crate) fn push_alert(&mut self, message: &str) {
        debug!(message, "alert");
        self.alerts.push(message.to_string());
    }

    /// Drains the acknowledgment messages shown since the last call (the
    /// headless stand-in for `window.alert`).
    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    // ----- inspection -----------------------------------------------------

    pub fn text(&self, selector: &str) -> Result<String> {
        let node = self.page.query(selector)?;
        Ok(self.page.text(node))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let node = self.page.query(selector)?;
        self.page.value(node)
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let node = self.page.query(selector)?;
        self.page.has_class(node, class_name)
    }

    pub fn style(&self, selector: &str, property: &str) -> Result<Option<String>> {
        let node = self.page.query(selector)?;
        Ok(self.page.style(node, property))
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let node = self.page.query(selector)?;
        Ok(self.page.attr(node, name))
    }

    pub fn scroll_y(&self) -> i64 {
        self.page.scroll_y()
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.page.query(selector)?;
        let actual = self.page.text(node);
        if actual == expected {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                snippet: self.page.dump(node),
            })
        }
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.page.query(selector)?;
        let actual = self.page.value(node)?;
        if actual == expected {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                snippet: self.page.dump(node),
            })
        }
    }
}

/// The clinic page structure: every id and class the controllers wire.
pub const CLINIC_PAGE: &str = r##"
<div id="splash-screen"><div class="spinner"></div></div>
<header class="header">
  <nav class="navbar">
    <div class="logo">CityCare Clinic</div>
    <ul class="nav-menu">
      <li><a class="nav-link" href="#home">Home</a></li>
      <li><a class="nav-link" href="#about">About</a></li>
      <li><a class="nav-link" href="#services">Services</a></li>
      <li><a class="nav-link" href="#doctors">Doctors</a></li>
      <li><a class="nav-link" href="#appointment">Appointment</a></li>
      <li><a class="nav-link" href="#testimonials">Testimonials</a></li>
      <li><a class="nav-link" href="#contact">Contact</a></li>
    </ul>
    <div class="hamburger"><span></span><span></span><span></span></div>
  </nav>
</header>
<section id="home" class="hero">
  <h1>Your Health, Our Priority</h1>
  <button class="hero-btn">Book Appointment</button>
</section>
<section id="about"><h2>About Us</h2></section>
<section id="services"><h2>Our Services</h2></section>
<section id="doctors"><h2>Our Doctors</h2></section>
<section id="appointment">
  <form id="appointment-form">
    <input id="name" type="text" placeholder="Full Name">
    <span id="name-error" class="error-message"></span>
    <input id="email" type="email" placeholder="Email Address">
    <span id="email-error" class="error-message"></span>
    <input id="phone" type="tel" placeholder="Phone Number">
    <span id="phone-error" class="error-message"></span>
    <select id="department">
      <option value="">Select Department</option>
      <option value="general">General Medicine</option>
      <option value="pediatrics">Pediatrics</option>
      <option value="cardiology">Cardiology</option>
      <option value="dentistry">Dentistry</option>
      <option value="orthopedics">Orthopedics</option>
      <option value="dermatology">Dermatology</option>
      <option value="neurology">Neurology</option>
      <option value="gynecology">Gynecology</option>
    </select>
    <span id="department-error" class="error-message"></span>
    <select id="doctor">
      <option value="">Select Doctor</option>
    </select>
    <span id="doctor-error" class="error-message"></span>
    <input id="date" type="date">
    <span id="date-error" class="error-message"></span>
    <select id="time">
      <option value="">Select Time</option>
      <option value="09:00">09:00 AM</option>
      <option value="10:00">10:00 AM</option>
      <option value="11:00">11:00 AM</option>
      <option value="14:00">02:00 PM</option>
      <option value="15:00">03:00 PM</option>
      <option value="16:00">04:00 PM</option>
      <option value="17:00">05:00 PM</option>
    </select>
    <span id="time-error" class="error-message"></span>
    <button type="submit" class="submit-btn">Book Appointment</button>
  </form>
</section>
<section id="testimonials">
  <div id="testimonial-track">
    <div class="testimonial-card active"><p>Wonderful care.</p><h4>Ramesh Iyer</h4></div>
    <div class="testimonial-card"><p>Very professional staff.</p><h4>Sunita Deshmukh</h4></div>
    <div class="testimonial-card"><p>Quick and friendly.</p><h4>Kabir Malhotra</h4></div>
  </div>
  <button id="prev-testimonial" type="button">Prev</button>
  <button id="next-testimonial" type="button">Next</button>
  <div class="dots">
    <span class="dot active"></span>
    <span class="dot"></span>
    <span class="dot"></span>
  </div>
</section>
<section id="contact">
  <form id="contact-form">
    <input id="contact-name" type="text" placeholder="Your Name">
    <input id="contact-email" type="email" placeholder="Your Email">
    <textarea id="message" placeholder="Your Message"></textarea>
    <button type="submit">Send Message</button>
  </form>
</section>
<div id="confirmation-modal" class="modal">
  <div class="modal-content">
    <span class="close">x</span>
    <h3>Appointment Booked!</h3>
    <p>We will contact you shortly to confirm your appointment.</p>
  </div>
</div>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use super::appointment::CONFIRMATION_DISMISS_MS;
    use super::carousel::AUTO_ADVANCE_MS;
    use super::splash::{SPLASH_DELAY_MS, SPLASH_FADE_MS};

    fn fixed_config() -> Config {
        Config {
            catalog: DoctorCatalog::default(),
            // A Monday, so tomorrow is always bookable.
            today: NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date"),
        }
    }

    fn booted() -> Result<App> {
        App::boot(CLINIC_PAGE, fixed_config())
    }

    fn fill_valid_appointment(app: &mut App) -> Result<()> {
        app.type_text("#name", "Asha Rao")?;
        app.type_text("#email", "asha@example.com")?;
        app.type_text("#phone", "+91 98765 43210")?;
        app.select_value("#department", "cardiology")?;
        app.select_value("#doctor", "dr.-rakesh-sharma---cardiologist")?;
        app.type_text("#date", "2025-03-11")?;
        app.select_value("#time", "10:00")?;
        Ok(())
    }

    #[test]
    fn boot_stamps_min_date_and_placeholder_doctor() -> Result<()> {
        let app = booted()?;
        assert_eq!(app.attr("#date", "min")?.as_deref(), Some("2025-03-11"));
        assert_eq!(app.value("#doctor")?, "");
        app.assert_text("#doctor", "Select Doctor")?;
        Ok(())
    }

    #[test]
    fn hamburger_toggles_and_nav_link_closes_menu() -> Result<()> {
        let mut app = booted()?;
        app.click(".hamburger")?;
        assert!(app.has_class(".hamburger", "active")?);
        assert!(app.has_class(".nav-menu", "active")?);
        app.click(".hamburger")?;
        assert!(!app.has_class(".nav-menu", "active")?);

        app.click(".hamburger")?;
        app.click(".nav-link")?;
        assert!(!app.has_class(".hamburger", "active")?);
        assert!(!app.has_class(".nav-menu", "active")?);
        Ok(())
    }

    #[test]
    fn department_change_rebuilds_doctor_options() -> Result<()> {
        let mut app = booted()?;
        app.select_value("#department", "cardiology")?;

        let doctor = app.page.query("#doctor")?;
        let options = app.page.children(doctor);
        assert_eq!(options.len(), 2);
        let added = options[1];
        assert_eq!(
            app.page.attr(added, "value").as_deref(),
            Some("dr.-rakesh-sharma---cardiologist")
        );
        assert_eq!(app.page.text(added), "Dr. Rakesh Sharma - Cardiologist");
        assert_eq!(app.value("#doctor")?, "");
        Ok(())
    }

    #[test]
    fn department_change_clears_stale_doctor_error() -> Result<()> {
        let mut app = booted()?;
        app.submit("#appointment-form")?;
        app.assert_text("#doctor-error", "Please select a doctor")?;

        app.select_value("#department", "neurology")?;
        app.assert_text("#doctor-error", "")?;
        assert_eq!(
            app.style("#doctor", "border-color")?.as_deref(),
            Some("#e5e7eb")
        );
        Ok(())
    }

    #[test]
    fn unmapped_department_leaves_placeholder_only() -> Result<()> {
        let markup = r#"
        <form id="appointment-form">
          <select id="department">
            <option value="">Select Department</option>
            <option value="oncology">Oncology</option>
          </select>
          <select id="doctor"><option value="">Select Doctor</option></select>
        </form>
        "#;
        let mut app = App::boot(markup, fixed_config())?;
        app.select_value("#department", "oncology")?;

        let doctor = app.page.query("#doctor")?;
        assert_eq!(app.page.children(doctor).len(), 1);
        app.assert_text("#doctor", "Select Doctor")?;
        assert_eq!(app.value("#doctor")?, "");
        Ok(())
    }

    #[test]
    fn invalid_submit_marks_every_failing_field() -> Result<()> {
        let mut app = booted()?;
        app.type_text("#name", "A")?;
        app.click(".submit-btn")?;

        app.assert_text("#name-error", "Name must be at least 2 characters")?;
        app.assert_text("#email-error", "Email is required")?;
        app.assert_text("#phone-error", "Phone number is required")?;
        app.assert_text("#department-error", "Please select a department")?;
        app.assert_text("#doctor-error", "Please select a doctor")?;
        app.assert_text("#date-error", "Please select a date")?;
        app.assert_text("#time-error", "Please select a time")?;
        assert_eq!(
            app.style("#name", "border-color")?.as_deref(),
            Some("#ef4444")
        );
        // Entered values survive a failed submit.
        app.assert_value("#name", "A")?;
        assert!(!app.has_class("#confirmation-modal", "show")?);
        Ok(())
    }

    #[test]
    fn resubmitting_unchanged_invalid_input_is_stable() -> Result<()> {
        let mut app = booted()?;
        app.type_text("#name", "A")?;
        app.submit("#appointment-form")?;
        let first = app.text("#name-error")?;
        app.submit("#appointment-form")?;
        assert_eq!(app.text("#name-error")?, first);
        app.assert_text("#email-error", "Email is required")?;
        Ok(())
    }

    #[test]
    fn valid_submit_confirms_resets_and_auto_dismisses() -> Result<()> {
        let mut app = booted()?;
        fill_valid_appointment(&mut app)?;
        app.click(".submit-btn")?;

        assert!(app.has_class("#confirmation-modal", "show")?);
        app.assert_value("#name", "")?;
        app.assert_value("#email", "")?;
        app.assert_value("#department", "")?;
        app.assert_value("#time", "")?;
        app.assert_text("#name-error", "")?;
        let doctor = app.page.query("#doctor")?;
        assert_eq!(app.page.children(doctor).len(), 1);
        app.assert_text("#doctor", "Select Doctor")?;

        app.advance_time(CONFIRMATION_DISMISS_MS)?;
        assert!(!app.has_class("#confirmation-modal", "show")?);
        Ok(())
    }

    #[test]
    fn valid_submit_clears_stale_errors_from_earlier_attempt() -> Result<()> {
        let mut app = booted()?;
        app.submit("#appointment-form")?;
        app.assert_text("#name-error", "Name is required")?;

        fill_valid_appointment(&mut app)?;
        app.submit("#appointment-form")?;
        app.assert_text("#name-error", "")?;
        assert_eq!(
            app.style("#name", "border-color")?.as_deref(),
            Some("#e5e7eb")
        );
        Ok(())
    }

    #[test]
    fn close_control_dismisses_and_cancels_the_timer() -> Result<()> {
        let mut app = booted()?;
        // Let the splash sequence finish so only the carousel interval and
        // the dismiss timer are in flight. The hide timeout is armed when
        // the fade fires, so it needs its own advance.
        app.advance_time(SPLASH_DELAY_MS)?;
        app.advance_time(SPLASH_FADE_MS)?;

        fill_valid_appointment(&mut app)?;
        app.submit("#appointment-form")?;
        assert!(app.has_class("#confirmation-modal", "show")?);
        assert!(app.pending_timers().iter().any(|t| t.interval_ms.is_none()));

        app.click(".close")?;
        assert!(!app.has_class("#confirmation-modal", "show")?);
        // Only the carousel interval remains.
        let pending = app.pending_timers();
        assert!(pending.iter().all(|t| t.interval_ms.is_some()));
        Ok(())
    }

    #[test]
    fn backdrop_click_dismisses_but_content_click_does_not() -> Result<()> {
        let mut app = booted()?;
        fill_valid_appointment(&mut app)?;
        app.submit("#appointment-form")?;

        app.click(".modal-content")?;
        assert!(app.has_class("#confirmation-modal", "show")?);
        app.click("#confirmation-modal")?;
        assert!(!app.has_class("#confirmation-modal", "show")?);
        Ok(())
    }

    #[test]
    fn contact_form_requires_all_three_fields() -> Result<()> {
        let mut app = booted()?;
        app.type_text("#contact-name", "Asha")?;
        app.type_text("#message", "Hello there")?;
        app.submit("#contact-form")?;

        assert_eq!(app.take_alerts(), [contact::CONTACT_INCOMPLETE]);
        // Form keeps what was typed.
        app.assert_value("#contact-name", "Asha")?;
        app.assert_value("#message", "Hello there")?;
        Ok(())
    }

    #[test]
    fn complete_contact_form_acknowledges_and_resets() -> Result<()> {
        let mut app = booted()?;
        app.type_text("#contact-name", "Asha")?;
        app.type_text("#contact-email", "asha@example.com")?;
        app.type_text("#message", "Hello there")?;
        app.submit("#contact-form")?;

        assert_eq!(app.take_alerts(), [contact::CONTACT_SUCCESS]);
        app.assert_value("#contact-name", "")?;
        app.assert_value("#message", "")?;
        Ok(())
    }

    #[test]
    fn whitespace_only_contact_fields_count_as_empty() -> Result<()> {
        let mut app = booted()?;
        app.type_text("#contact-name", "   ")?;
        app.type_text("#contact-email", "a@b.co")?;
        app.type_text("#message", "hi")?;
        app.submit("#contact-form")?;
        assert_eq!(app.take_alerts(), [contact::CONTACT_INCOMPLETE]);
        Ok(())
    }

    #[test]
    fn carousel_buttons_move_the_active_slide() -> Result<()> {
        let mut app = booted()?;
        let cards = app.page.query_all(".testimonial-card")?;
        assert_eq!(cards.len(), 3);
        assert!(app.page.has_class(cards[0], "active")?);

        app.click("#next-testimonial")?;
        assert!(app.page.has_class(cards[1], "active")?);
        assert!(!app.page.has_class(cards[0], "active")?);
        assert_eq!(
            app.style("#testimonial-track", "transform")?.as_deref(),
            Some("translateX(-100%)")
        );

        app.click("#prev-testimonial")?;
        app.click("#prev-testimonial")?;
        // Wrapped from 0 back to the last slide.
        assert!(app.page.has_class(cards[2], "active")?);
        assert_eq!(
            app.style("#testimonial-track", "transform")?.as_deref(),
            Some("translateX(-200%)")
        );
        Ok(())
    }

    #[test]
    fn dot_click_jumps_to_its_slide() -> Result<()> {
        let mut app = booted()?;
        let dots = app.page.query_all(".dot")?;
        app.dispatch_event(dots[2], "click")?;
        let cards = app.page.query_all(".testimonial-card")?;
        assert!(app.page.has_class(cards[2], "active")?);
        assert!(app.page.has_class(dots[2], "active")?);
        assert!(!app.page.has_class(dots[0], "active")?);
        assert_eq!(
            app.style("#testimonial-track", "transform")?.as_deref(),
            Some("translateX(-200%)")
        );
        Ok(())
    }

    #[test]
    fn auto_advance_fires_on_the_interval_and_rearms() -> Result<()> {
        let mut app = booted()?;
        let cards = app.page.query_all(".testimonial-card")?;

        app.advance_time(AUTO_ADVANCE_MS)?;
        assert!(app.page.has_class(cards[1], "active")?);

        // The interval re-armed for the next tick.
        let pending = app.pending_timers();
        assert!(pending
            .iter()
            .any(|t| t.interval_ms == Some(AUTO_ADVANCE_MS) && t.due_at == 2 * AUTO_ADVANCE_MS));

        app.advance_time(2 * AUTO_ADVANCE_MS)?;
        assert!(app.page.has_class(cards[0], "active")?);
        Ok(())
    }

    #[test]
    fn carousel_with_no_slides_schedules_nothing() -> Result<()> {
        let markup = r#"<div id="testimonial-track"></div>"#;
        let app = App::boot(markup, fixed_config())?;
        assert!(app.pending_timers().is_empty());
        Ok(())
    }

    #[test]
    fn nav_link_scrolls_below_the_fixed_header() -> Result<()> {
        let mut app = booted()?;
        app.set_metrics(".header", 0, 80)?;
        app.set_metrics("#about", 700, 500)?;

        let about_link = app.page.query_all(".nav-link")?[1];
        assert_eq!(app.page.attr(about_link, "href").as_deref(), Some("#about"));
        app.dispatch_event(about_link, "click")?;
        assert_eq!(app.scroll_y(), 700 - 80);
        // The landing scroll also recomputed the active link.
        assert!(app.page.has_class(about_link, "active")?);
        Ok(())
    }

    #[test]
    fn scroll_highlight_tracks_the_matching_section() -> Result<()> {
        let mut app = booted()?;
        app.set_metrics(".header", 0, 80)?;
        app.set_metrics("#home", 0, 600)?;
        app.set_metrics("#about", 600, 600)?;

        app.scroll_to(0)?;
        let links = app.page.query_all(".nav-link")?;
        assert!(app.page.has_class(links[0], "active")?);

        app.scroll_to(600)?;
        assert!(app.page.has_class(links[1], "active")?);
        assert!(!app.page.has_class(links[0], "active")?);

        // Far past every section: nothing is active.
        app.scroll_to(50_000)?;
        for link in links {
            assert!(!app.page.has_class(link, "active")?);
        }
        Ok(())
    }

    #[test]
    fn hero_button_scrolls_to_the_appointment_section() -> Result<()> {
        let mut app = booted()?;
        app.set_metrics("#appointment", 2_400, 900)?;
        app.click(".hero-btn")?;
        assert_eq!(app.scroll_y(), 2_400);
        Ok(())
    }

    #[test]
    fn splash_fades_then_hides_on_schedule() -> Result<()> {
        let mut app = booted()?;
        assert_eq!(app.style("#splash-screen", "opacity")?, None);

        app.advance_time(SPLASH_DELAY_MS)?;
        assert_eq!(
            app.style("#splash-screen", "opacity")?.as_deref(),
            Some("0")
        );
        assert_eq!(app.style("#splash-screen", "display")?, None);

        app.advance_time(SPLASH_FADE_MS)?;
        assert_eq!(
            app.style("#splash-screen", "display")?.as_deref(),
            Some("none")
        );
        Ok(())
    }

    #[test]
    fn timers_fire_in_deadline_then_fifo_order() -> Result<()> {
        let mut app = booted()?;
        let timers = app.pending_timers();
        // Splash fade (1500) fires before the carousel interval (5000).
        assert!(timers[0].due_at < timers[1].due_at);
        app.advance_time_to(SPLASH_DELAY_MS)?;
        assert_eq!(
            app.style("#splash-screen", "opacity")?.as_deref(),
            Some("0")
        );
        Ok(())
    }

    #[test]
    fn negative_advance_is_rejected() {
        let mut app = booted().expect("boot");
        let err = app.advance_time(-1).unwrap_err();
        assert!(matches!(err, Error::PageRuntime(_)));
    }

    #[test]
    fn step_limit_catches_runaway_intervals() -> Result<()> {
        let mut app = booted()?;
        app.set_timer_step_limit(3)?;
        // 50 interval ticks due at once exceeds the limit.
        let err = app.advance_time(50 * AUTO_ADVANCE_MS).unwrap_err();
        assert!(matches!(err, Error::PageRuntime(_)));
        Ok(())
    }

    #[test]
    fn assert_helpers_report_expected_and_actual() -> Result<()> {
        let app = booted()?;
        let err = app.assert_text("#doctor", "nope").unwrap_err();
        match err {
            Error::AssertionFailed {
                selector,
                expected,
                actual,
                ..
            } => {
                assert_eq!(selector, "#doctor");
                assert_eq!(expected, "nope");
                assert_eq!(actual, "Select Doctor");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn type_text_rejects_non_text_controls() {
        let mut app = booted().expect("boot");
        let err = app.type_text("#department", "x").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn missing_optional_elements_degrade_to_no_op() -> Result<()> {
        // No splash, no carousel, no hamburger: boot still succeeds and
        // the forms work.
        let markup = r#"
        <form id="contact-form">
          <input id="contact-name">
          <input id="contact-email">
          <textarea id="message"></textarea>
        </form>
        "#;
        let mut app = App::boot(markup, fixed_config())?;
        app.type_text("#contact-name", "A")?;
        app.submit("#contact-form")?;
        assert_eq!(app.take_alerts(), [contact::CONTACT_INCOMPLETE]);
        Ok(())
    }
}
