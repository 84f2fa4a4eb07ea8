//! Payment button and its overlay lifecycle
//!
//! ```text
//!            open / activate
//!   Closed ───────────────────► Open
//!     ▲                          │
//!     └──────────────────────────┘
//!      request_close (confirmed, or skipped once accepted)
//! ```
//!
//! Opening attaches the overlay with the checkout frame, installs the unload guard,
//! emits `onOpenPaymentWindow` and starts status polling. A confirmed close undoes
//! all of it and emits `onClosePaymentWindow`.

use crate::checkout::checkout_url;
use crate::client::StatusSource;
use crate::config::{ButtonConfig, WidgetConfig};
use crate::events::{ButtonEvent, EventBus, EventKind, SubscriptionId};
use crate::host::Host;
use crate::poller::{self, PollOutcome};
use crate::template::{self, ButtonTheme};
use crate::types::TransactionStatus;
use crate::{PayButtonError, Result};
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Prompt shown before closing an unpaid checkout
pub const CLOSE_CONFIRMATION: &str =
    "Are you sure you want to close the payment window? Your payment may not be completed.";

/// Prompt shown before leaving the page while the checkout is open
pub const UNLOAD_WARNING: &str =
    "A payment is in progress. Are you sure you want to leave this page?";

/// Overlay state of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// No overlay on the page
    Closed,
    /// Overlay with the checkout frame attached
    Open,
}

/// User action that asked for the overlay to close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    /// The close control inside the overlay
    CloseControl,
    /// A click on the backdrop outside the checkout frame
    Backdrop,
}

#[derive(Debug)]
struct ButtonState {
    overlay: OverlayState,
    transaction: Option<TransactionStatus>,
    poller: Option<JoinHandle<()>>,
}

impl ButtonState {
    fn is_accepted(&self) -> bool {
        self.transaction.as_ref().is_some_and(|status| status.accepted)
    }
}

pub(crate) struct ButtonInner {
    pub(crate) config: ButtonConfig,
    pub(crate) host: Arc<dyn Host>,
    pub(crate) source: Arc<dyn StatusSource>,
    pub(crate) poll_interval: Duration,
    checkout_base: String,
    theme: ButtonTheme,
    events: EventBus,
    state: Mutex<ButtonState>,
    // Held while lifecycle events go out; listeners may re-enter to close.
    dispatch: ReentrantMutex<()>,
}

impl ButtonInner {
    fn emit(&self, event: ButtonEvent) {
        self.host.dispatch_event(&event);
        self.events.emit(&event);
    }

    fn is_open(&self) -> bool {
        self.state.lock().overlay == OverlayState::Open
    }

    /// Store a fresh snapshot and react to acceptance
    pub(crate) fn apply_status(&self, status: TransactionStatus) -> PollOutcome {
        let _dispatch = self.dispatch.lock();

        let accepted = {
            let mut state = self.state.lock();
            if state.overlay == OverlayState::Closed {
                return PollOutcome::Stop;
            }
            if state.is_accepted() {
                debug!(
                    reference = %self.config.reference(),
                    "Ignoring status received after acceptance"
                );
                return PollOutcome::Stop;
            }
            state.transaction = Some(status.clone());
            if status.accepted {
                // The poll task is finishing on its own; detach it.
                state.poller = None;
            }
            status.accepted
        };

        self.emit(ButtonEvent::with_detail(EventKind::Updated, status.clone()));

        if !accepted {
            return PollOutcome::Continue;
        }
        if !self.is_open() {
            debug!(
                reference = %self.config.reference(),
                "Closed by a listener, acceptance not announced"
            );
            return PollOutcome::Stop;
        }

        info!(
            reference = %self.config.reference(),
            transaction = ?status.id,
            "Payment accepted"
        );
        self.emit(ButtonEvent::with_detail(EventKind::PaymentAccepted, status.clone()));
        if !self.is_open() {
            return PollOutcome::Stop;
        }
        self.host.set_unload_guard(None);

        let target = status
            .redirect_target()
            .map(str::to_string)
            .or_else(|| self.config.redirect_url().map(|url| url.to_string()));
        if let Some(url) = target {
            info!(reference = %self.config.reference(), "Redirecting to {}", url);
            self.host.navigate(&url);
        }

        PollOutcome::Stop
    }
}

/// A payment button bound to a host container
///
/// Cloning is cheap and yields a handle to the same button.
#[derive(Clone)]
pub struct PayButton {
    inner: Arc<ButtonInner>,
}

impl fmt::Debug for PayButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PayButton")
            .field("reference", &self.inner.config.reference())
            .field("amount", &self.inner.config.amount())
            .field("overlay", &state.overlay)
            .field("accepted", &state.is_accepted())
            .finish()
    }
}

impl PayButton {
    /// Create a button; nothing is rendered until [`PayButton::render`]
    ///
    /// Fails when the widget configuration does not validate.
    pub fn new(
        config: ButtonConfig,
        host: Arc<dyn Host>,
        source: Arc<dyn StatusSource>,
        widget: &WidgetConfig,
    ) -> Result<Self> {
        widget.validate()?;

        Ok(Self {
            inner: Arc::new(ButtonInner {
                config,
                host,
                source,
                poll_interval: widget.poll_interval(),
                checkout_base: widget.checkout_url.clone(),
                theme: widget.theme.clone(),
                events: EventBus::new(),
                state: Mutex::new(ButtonState {
                    overlay: OverlayState::Closed,
                    transaction: None,
                    poller: None,
                }),
                dispatch: ReentrantMutex::new(()),
            }),
        })
    }

    /// Render the button into its container
    pub fn render(&self) {
        template::ensure_styles(self.inner.host.as_ref(), &self.inner.theme);
        self.inner
            .host
            .mount_button(&template::button_markup(&self.inner.config));
    }

    /// Handle a click on the button
    pub fn activate(&self) -> Result<()> {
        self.open()
    }

    /// Open the checkout overlay and start polling
    ///
    /// Opening an open button does nothing. Must be called from within a tokio
    /// runtime.
    pub fn open(&self) -> Result<()> {
        let runtime = Handle::try_current().map_err(|_| PayButtonError::NoRuntime)?;
        let url = checkout_url(&self.inner.checkout_base, &self.inner.config)?;
        let _dispatch = self.inner.dispatch.lock();

        {
            let mut state = self.inner.state.lock();
            if state.overlay == OverlayState::Open {
                debug!(reference = %self.reference(), "Payment window already open");
                return Ok(());
            }
            state.overlay = OverlayState::Open;
        }

        let host = &self.inner.host;
        host.attach_overlay(&template::overlay_markup(&url));
        host.set_unload_guard(Some(UNLOAD_WARNING));

        info!(reference = %self.reference(), "Payment window opened");
        self.inner.emit(ButtonEvent::new(EventKind::OpenPaymentWindow));

        self.start_polling(&runtime);
        Ok(())
    }

    fn start_polling(&self, runtime: &Handle) {
        if self.reference().is_empty() || !self.inner.host.is_attached() {
            debug!("No reference or container, status polling skipped");
            return;
        }

        let mut state = self.inner.state.lock();
        if state.overlay != OverlayState::Open || state.is_accepted() || state.poller.is_some() {
            return;
        }
        state.poller = Some(poller::spawn(runtime, Arc::clone(&self.inner)));
    }

    /// Ask to close the overlay
    ///
    /// Unless the payment was accepted, the user must confirm. Returns whether the
    /// overlay was closed.
    pub fn request_close(&self, trigger: CloseTrigger) -> bool {
        let accepted = {
            let state = self.inner.state.lock();
            if state.overlay == OverlayState::Closed {
                return false;
            }
            state.is_accepted()
        };

        if !accepted && !self.inner.host.confirm(CLOSE_CONFIRMATION) {
            debug!(reference = %self.reference(), ?trigger, "Close cancelled by user");
            return false;
        }

        self.teardown(trigger);
        true
    }

    fn teardown(&self, trigger: CloseTrigger) {
        let _dispatch = self.inner.dispatch.lock();

        let poller = {
            let mut state = self.inner.state.lock();
            if state.overlay == OverlayState::Closed {
                return;
            }
            state.overlay = OverlayState::Closed;
            state.poller.take()
        };

        if let Some(handle) = poller {
            handle.abort();
        }

        let host = &self.inner.host;
        host.detach_overlay();
        host.set_unload_guard(None);

        info!(reference = %self.reference(), ?trigger, "Payment window closed");
        self.inner.emit(ButtonEvent::new(EventKind::ClosePaymentWindow));
    }

    /// Register a callback for one kind of event
    pub fn on<F>(&self, kind: EventKind, callback: F) -> SubscriptionId
    where
        F: Fn(&ButtonEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(kind, callback)
    }

    /// Remove a callback registered with [`PayButton::on`]
    pub fn off(&self, id: SubscriptionId) -> bool {
        self.inner.events.unsubscribe(id)
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ButtonEvent> {
        self.inner.events.channel()
    }

    /// Resolved configuration
    pub fn config(&self) -> &ButtonConfig {
        &self.inner.config
    }

    /// Reference of the transaction
    pub fn reference(&self) -> &str {
        self.inner.config.reference()
    }

    /// Current overlay state
    pub fn overlay_state(&self) -> OverlayState {
        self.inner.state.lock().overlay
    }

    /// Whether the overlay is open
    pub fn is_open(&self) -> bool {
        self.overlay_state() == OverlayState::Open
    }

    /// Whether the status poll task is running
    pub fn is_polling(&self) -> bool {
        self.inner
            .state
            .lock()
            .poller
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Latest transaction snapshot
    pub fn transaction(&self) -> Option<TransactionStatus> {
        self.inner.state.lock().transaction.clone()
    }

    /// Whether the latest snapshot reports acceptance
    pub fn is_accepted(&self) -> bool {
        self.inner.state.lock().is_accepted()
    }
}
