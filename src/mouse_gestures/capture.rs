//! Pointer capture state machine.
//!
//! A press of the trigger button opens a [`CaptureSession`] in
//! [`CaptureState::Pending`]. Once the pointer has travelled further than the
//! distance threshold the session goes [`CaptureState::Active`] and every
//! movement batch is fed to the [`PatternConstructor`]. Release or leaving the
//! surface ends the gesture; the inactivity timer, the suppression key and a
//! hidden surface abort it. Every terminal step drops the session, clears the
//! constructor and disarms the timer before returning.

use crate::mouse_gestures::clock::Clock;
use crate::mouse_gestures::constructor::PatternConstructor;
use crate::mouse_gestures::pattern::{Pattern, PointSample};
use crate::mouse_gestures::suppression::{SuppressionGuard, SuppressionMessage};
use crate::settings::{GestureSettings, SettingsError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

impl PointerButton {
    /// Bit of this button in a `buttons` mask.
    pub fn mask(self) -> u8 {
        match self {
            PointerButton::Primary => 1,
            PointerButton::Secondary => 2,
            PointerButton::Auxiliary => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModifierKey {
    Shift,
    Ctrl,
    Alt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// One position in both coordinate spaces.
///
/// `screen` stays stable across scrolling and zoom and is what gets matched;
/// `client` is relative to the surface and meant for drawing feedback.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerSample {
    pub screen: PointSample,
    pub client: PointSample,
}

impl PointerSample {
    pub fn at(x: f64, y: f64) -> Self {
        let point = PointSample::new(x, y);
        Self {
            screen: point,
            client: point,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    #[serde(flatten)]
    pub sample: PointerSample,
    /// Button whose state changed, for presses and releases.
    pub button: PointerButton,
    /// Mask of the buttons held after the event.
    pub buttons: u8,
    #[serde(default = "default_trusted")]
    pub trusted: bool,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// Finer samples delivered together with this event, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coalesced: Vec<PointerSample>,
    /// Opaque reference to the frame or element under the pointer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl PointerEvent {
    pub fn new(button: PointerButton, buttons: u8, x: f64, y: f64) -> Self {
        Self {
            sample: PointerSample::at(x, y),
            button,
            buttons,
            trusted: true,
            modifiers: Modifiers::default(),
            coalesced: Vec::new(),
            target: None,
        }
    }

    /// Samples this event stands for: the coalesced batch, or the event itself.
    pub fn batch(&self) -> Vec<PointerSample> {
        if self.coalesced.is_empty() {
            vec![self.sample]
        } else {
            self.coalesced.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type", content = "data")]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    /// The pointer left the capture surface or window.
    PointerLeave,
    KeyDown(ModifierKey),
    /// The surface was hidden, e.g. by switching tabs.
    VisibilityHidden,
    /// Timer poll; aborts an active gesture once its inactivity timer expired.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Passive,
    Pending,
    Active,
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureNotification {
    Start {
        first: PointerEvent,
        batch: Vec<PointerSample>,
    },
    Update {
        batch: Vec<PointerSample>,
    },
    Change {
        pattern: Pattern,
    },
    Abort,
    /// `aborted` is set when the gesture was aborted before release or when
    /// nothing survived simplification; such an end carries an empty pattern,
    /// only closes feedback and must not dispatch a command.
    End {
        pattern: Pattern,
        aborted: bool,
    },
}

/// Output of one step of the state machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    pub notifications: Vec<CaptureNotification>,
    /// Message for every peer surface.
    pub broadcast: Option<SuppressionMessage>,
    /// Whether the host should prevent the default action of the event just processed.
    pub suppress_default: bool,
}

impl Transition {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty() && self.broadcast.is_none() && !self.suppress_default
    }
}

/// Single re-armable deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InactivityTimer {
    deadline_ms: Option<u64>,
}

impl InactivityTimer {
    pub fn arm(&mut self, now_ms: u64, duration_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(duration_ms));
    }

    pub fn disarm(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    pub fn has_expired(&self, now_ms: u64) -> bool {
        self.deadline_ms.map_or(false, |deadline| now_ms >= deadline)
    }
}

#[derive(Debug)]
struct CaptureSession {
    state: CaptureState,
    reference_point: PointSample,
    first_event: PointerEvent,
    buffered: Vec<PointerSample>,
    timer: InactivityTimer,
    target: Option<String>,
}

pub struct CaptureMachine {
    settings: GestureSettings,
    clock: Arc<dyn Clock>,
    constructor: PatternConstructor,
    session: Option<CaptureSession>,
    guard: SuppressionGuard,
    enabled: bool,
}

impl CaptureMachine {
    pub fn new(settings: GestureSettings, clock: Arc<dyn Clock>) -> Result<Self, SettingsError> {
        settings.validate()?;
        let constructor =
            PatternConstructor::new(settings.jitter_distance, settings.difference_threshold);
        Ok(Self {
            settings,
            clock,
            constructor,
            session: None,
            guard: SuppressionGuard::default(),
            enabled: true,
        })
    }

    pub fn settings(&self) -> &GestureSettings {
        &self.settings
    }

    /// Validate and apply new settings. A gesture in progress is cancelled.
    pub fn update_settings(
        &mut self,
        settings: GestureSettings,
    ) -> Result<Transition, SettingsError> {
        settings.validate()?;
        let transition = self.cancel();
        self.constructor =
            PatternConstructor::new(settings.jitter_distance, settings.difference_threshold);
        self.settings = settings;
        Ok(transition)
    }

    pub fn state(&self) -> CaptureState {
        self.session
            .as_ref()
            .map_or(CaptureState::Passive, |session| session.state)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn timer_armed(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |session| session.timer.is_armed())
    }

    /// Target reference of the engagement event of the current session.
    pub fn target(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|session| session.target.as_deref())
    }

    /// Pattern drawn so far; empty outside an active gesture.
    pub fn pattern(&self) -> Pattern {
        self.constructor.pattern()
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) -> Transition {
        let transition = self.cancel();
        self.enabled = false;
        transition
    }

    /// Drop any session without notifications. Safe to call in any state.
    pub fn cancel(&mut self) -> Transition {
        let mut transition = Transition::default();
        self.teardown(&mut transition);
        transition
    }

    /// Apply a message broadcast by a peer surface.
    pub fn receive_broadcast(&mut self, message: SuppressionMessage) {
        self.guard.receive(message);
    }

    /// Whether a late default action (context menu, click) should be prevented now.
    pub fn should_suppress_default(&self) -> bool {
        matches!(
            self.state(),
            CaptureState::Active | CaptureState::Aborted
        ) || self.guard.is_suppressing(self.clock.now_ms())
    }

    pub fn process(&mut self, event: &InputEvent) -> Transition {
        let mut transition = Transition::default();
        if !self.enabled {
            return transition;
        }

        match event {
            InputEvent::PointerDown(pointer) => self.on_pointer_down(pointer, &mut transition),
            InputEvent::PointerMove(pointer) => self.on_pointer_move(pointer, &mut transition),
            InputEvent::PointerUp(pointer) => self.on_pointer_up(pointer, &mut transition),
            InputEvent::PointerLeave => self.on_leave(&mut transition),
            InputEvent::KeyDown(key) => {
                if self.settings.suppression_key.matches(*key) {
                    self.interrupt(&mut transition);
                }
            }
            InputEvent::VisibilityHidden => self.interrupt(&mut transition),
            InputEvent::Tick => {
                let now = self.clock.now_ms();
                let expired = self.session.as_ref().map_or(false, |session| {
                    session.state == CaptureState::Active && session.timer.has_expired(now)
                });
                if expired {
                    tracing::debug!("gesture inactivity timeout");
                    self.abort(&mut transition);
                }
            }
        }
        transition
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, transition: &mut Transition) {
        if self.state() == CaptureState::Aborted {
            self.teardown(transition);
        }
        if self.session.is_some() {
            return;
        }
        if !event.trusted
            || event.buttons != self.settings.trigger_button.mask()
            || self.settings.suppression_key.is_held(&event.modifiers)
        {
            return;
        }

        self.constructor.clear();
        self.session = Some(CaptureSession {
            state: CaptureState::Pending,
            reference_point: event.sample.screen,
            first_event: event.clone(),
            buffered: Vec::new(),
            timer: InactivityTimer::default(),
            target: event.target.clone(),
        });
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, transition: &mut Transition) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match session.state {
            CaptureState::Pending => {
                session.buffered.extend(event.batch());
                let travelled = session
                    .buffered
                    .last()
                    .map_or(0.0, |last| session.reference_point.distance_to(last.screen));
                if travelled > self.settings.distance_threshold {
                    self.activate(transition);
                }
            }
            CaptureState::Active => {
                let batch = event.batch();
                let mut changed = false;
                for sample in &batch {
                    changed |= self.constructor.add_point(sample.screen.x, sample.screen.y);
                }
                if self.settings.timeout_active {
                    session
                        .timer
                        .arm(self.clock.now_ms(), self.settings.timeout_duration);
                }
                transition
                    .notifications
                    .push(CaptureNotification::Update { batch });
                if changed {
                    transition.notifications.push(CaptureNotification::Change {
                        pattern: self.constructor.pattern(),
                    });
                }
                transition.suppress_default = true;
            }
            CaptureState::Aborted => transition.suppress_default = true,
            CaptureState::Passive => {}
        }
    }

    fn activate(&mut self, transition: &mut Transition) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.state = CaptureState::Active;
        let batch = std::mem::take(&mut session.buffered);

        let reference = session.reference_point;
        let mut changed = self.constructor.add_point(reference.x, reference.y);
        for sample in &batch {
            changed |= self.constructor.add_point(sample.screen.x, sample.screen.y);
        }
        if self.settings.timeout_active {
            session
                .timer
                .arm(self.clock.now_ms(), self.settings.timeout_duration);
        }

        transition.notifications.push(CaptureNotification::Start {
            first: session.first_event.clone(),
            batch,
        });
        if changed {
            transition.notifications.push(CaptureNotification::Change {
                pattern: self.constructor.pattern(),
            });
        }
        self.guard.receive(SuppressionMessage::Prepare);
        transition.broadcast = Some(SuppressionMessage::Prepare);
        transition.suppress_default = true;
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, transition: &mut Transition) {
        if event.button != self.settings.trigger_button {
            return;
        }
        match self.state() {
            CaptureState::Pending => self.teardown(transition),
            CaptureState::Active | CaptureState::Aborted if event.trusted => {
                self.finish(transition);
            }
            _ => {}
        }
    }

    fn on_leave(&mut self, transition: &mut Transition) {
        match self.state() {
            CaptureState::Pending => self.teardown(transition),
            CaptureState::Active | CaptureState::Aborted => self.finish(transition),
            CaptureState::Passive => {}
        }
    }

    /// Suppression key or hidden surface: abort an active gesture, drop a pending one.
    fn interrupt(&mut self, transition: &mut Transition) {
        match self.state() {
            CaptureState::Pending => self.teardown(transition),
            CaptureState::Active => self.abort(transition),
            CaptureState::Aborted | CaptureState::Passive => {}
        }
    }

    fn abort(&mut self, transition: &mut Transition) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.state = CaptureState::Aborted;
        session.timer.disarm();
        self.constructor.clear();
        transition.notifications.push(CaptureNotification::Abort);
    }

    fn finish(&mut self, transition: &mut Transition) {
        let pattern = if self.state() == CaptureState::Aborted {
            Pattern::default()
        } else {
            self.constructor.pattern()
        };
        // an empty pattern is a click that wandered back, never a match candidate
        let aborted = pattern.is_empty();
        transition
            .notifications
            .push(CaptureNotification::End { pattern, aborted });
        transition.suppress_default = true;
        self.teardown(transition);
    }

    fn teardown(&mut self, transition: &mut Transition) {
        if let Some(mut session) = self.session.take() {
            session.timer.disarm();
            if matches!(session.state, CaptureState::Active | CaptureState::Aborted) {
                let message = SuppressionMessage::Release {
                    sent_at_ms: self.clock.now_ms(),
                };
                self.guard.receive(message);
                transition.broadcast = Some(message);
            }
        }
        self.constructor.clear();
    }
}

fn default_trusted() -> bool {
    true
}
