//! Page surface the button renders into
//!
//! A [`Host`] stands for the container element of one button and the page around
//! it: it receives markup, answers confirmation prompts, guards page unload,
//! navigates, and receives the custom events the button emits. Browser bindings
//! implement it on top of the DOM; [`HeadlessHost`] records every call.

use crate::events::{ButtonEvent, EventKind};
use crate::template::Overlay;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

/// Container element and page of a payment button
pub trait Host: Send + Sync {
    /// Read a markup attribute of the container element
    fn attribute(&self, _name: &str) -> Option<String> {
        None
    }

    /// Whether the container element is still part of the page
    fn is_attached(&self) -> bool;

    /// Add a stylesheet to the page
    fn inject_styles(&self, css: &str);

    /// Render the button inside the container
    fn mount_button(&self, markup: &str);

    /// Attach the overlay to the page
    fn attach_overlay(&self, overlay: &Overlay);

    /// Remove the overlay from the page
    fn detach_overlay(&self);

    /// Ask the user to confirm an action
    fn confirm(&self, message: &str) -> bool;

    /// Install (`Some`) or remove (`None`) the prompt shown before leaving the page
    fn set_unload_guard(&self, message: Option<&str>);

    /// Navigate the page to a URL
    fn navigate(&self, url: &str);

    /// Dispatch a custom event on the container element
    fn dispatch_event(&self, _event: &ButtonEvent) {}
}

#[derive(Debug, Default)]
struct HeadlessState {
    attached: bool,
    attributes: HashMap<String, String>,
    styles: Vec<String>,
    button: Option<String>,
    overlay: Option<Overlay>,
    confirm_default: bool,
    confirm_answers: VecDeque<bool>,
    prompts: Vec<String>,
    unload_guard: Option<String>,
    navigations: Vec<String>,
    events: Vec<ButtonEvent>,
}

/// Host that keeps the page in memory
///
/// Useful for driving buttons outside a browser and for tests. Confirmation
/// prompts are answered from a queue of scripted answers, falling back to a
/// default answer (initially `true`).
#[derive(Debug)]
pub struct HeadlessHost {
    state: Mutex<HeadlessState>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Create an attached host with no attributes
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HeadlessState {
                attached: true,
                confirm_default: true,
                ..HeadlessState::default()
            }),
        }
    }

    /// Set a container attribute
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.state.lock().attributes.insert(name.into(), value.into());
        self
    }

    /// Set the answer given when no scripted answer is queued
    pub fn with_confirm_answer(self, answer: bool) -> Self {
        self.state.lock().confirm_default = answer;
        self
    }

    /// Queue an answer for the next confirmation prompt
    pub fn push_confirm_answer(&self, answer: bool) {
        self.state.lock().confirm_answers.push_back(answer);
    }

    /// Remove the container from the page
    pub fn detach(&self) {
        self.state.lock().attached = false;
    }

    /// Stylesheets injected so far
    pub fn injected_styles(&self) -> Vec<String> {
        self.state.lock().styles.clone()
    }

    /// Markup of the mounted button
    pub fn button(&self) -> Option<String> {
        self.state.lock().button.clone()
    }

    /// Overlay currently attached to the page
    pub fn overlay(&self) -> Option<Overlay> {
        self.state.lock().overlay.clone()
    }

    /// Confirmation prompts shown so far
    pub fn prompts(&self) -> Vec<String> {
        self.state.lock().prompts.clone()
    }

    /// Message of the installed unload guard
    pub fn unload_guard(&self) -> Option<String> {
        self.state.lock().unload_guard.clone()
    }

    /// URLs navigated to so far
    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    /// Events dispatched on the container so far
    pub fn events(&self) -> Vec<ButtonEvent> {
        self.state.lock().events.clone()
    }

    /// Kinds of the events dispatched so far, in order
    pub fn event_kinds(&self) -> Vec<EventKind> {
        self.state.lock().events.iter().map(|event| event.kind).collect()
    }
}

impl Host for HeadlessHost {
    fn attribute(&self, name: &str) -> Option<String> {
        self.state.lock().attributes.get(name).cloned()
    }

    fn is_attached(&self) -> bool {
        self.state.lock().attached
    }

    fn inject_styles(&self, css: &str) {
        self.state.lock().styles.push(css.to_string());
    }

    fn mount_button(&self, markup: &str) {
        self.state.lock().button = Some(markup.to_string());
    }

    fn attach_overlay(&self, overlay: &Overlay) {
        self.state.lock().overlay = Some(overlay.clone());
    }

    fn detach_overlay(&self) {
        self.state.lock().overlay = None;
    }

    fn confirm(&self, message: &str) -> bool {
        let mut state = self.state.lock();
        state.prompts.push(message.to_string());
        let default = state.confirm_default;
        state.confirm_answers.pop_front().unwrap_or(default)
    }

    fn set_unload_guard(&self, message: Option<&str>) {
        self.state.lock().unload_guard = message.map(str::to_string);
    }

    fn navigate(&self, url: &str) {
        self.state.lock().navigations.push(url.to_string());
    }

    fn dispatch_event(&self, event: &ButtonEvent) {
        self.state.lock().events.push(event.clone());
    }
}
