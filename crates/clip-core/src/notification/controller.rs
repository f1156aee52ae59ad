//! Notification state machine.
//!
//! Pure and clock-agnostic: every transition takes `now` explicitly and the
//! controller only records *when* its single timer should fire. The overlay
//! runtime sleeps until [`NotificationController::next_deadline`] and then
//! calls [`NotificationController::fire_due`].

use std::time::Duration;

use tokio::time::Instant;

use crate::config::Configuration;
use crate::presentation::{PresentationBinder, Visibility, VisualTarget};
use crate::types::ClipboardKind;

use super::session::{
    FADE_OUT, NotificationSession, Phase, ScheduledTask, SessionId, TaskKey, TaskPurpose,
};

pub struct NotificationController<T> {
    target: T,
    binder: PresentationBinder,
    session: Option<NotificationSession>,
    /// The only armed task. Arming replaces (cancels) the previous one.
    timer: Option<ScheduledTask>,
    last_session: u64,
    generation: u64,
}

impl<T: VisualTarget> NotificationController<T> {
    pub fn new(target: T, binder: PresentationBinder) -> Self {
        Self {
            target,
            binder,
            session: None,
            timer: None,
            last_session: 0,
            generation: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.session
            .as_ref()
            .map_or(Phase::Idle, NotificationSession::phase)
    }

    pub fn session(&self) -> Option<&NotificationSession> {
        self.session.as_ref()
    }

    pub fn armed(&self) -> Option<&ScheduledTask> {
        self.timer.as_ref()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.map(|task| task.deadline)
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    /// Show a notification for `kind`, superseding any live session.
    ///
    /// Returns `false` when the render is suppressed (custom theme without an
    /// image for `kind`); a live session is then closed.
    pub fn notify(&mut self, kind: ClipboardKind, config: &Configuration, now: Instant) -> bool {
        self.cancel_timer();

        if !self.binder.render(&mut self.target, config, kind) {
            if let Some(old) = self.session.take() {
                tracing::debug!(session = %old.id, "Live notification closed by suppressed render");
                self.target.set_visibility(Visibility::Hidden);
            }
            tracing::debug!(%kind, "Notification suppressed: no custom image for kind");
            return false;
        }

        self.last_session += 1;
        let session = NotificationSession::new(SessionId(self.last_session), kind);
        tracing::debug!(session = %session.id, %kind, "Showing notification");
        self.session = Some(session);
        self.target.set_visibility(Visibility::Shown);
        self.schedule_hide(config, now);
        true
    }

    /// Pointer entered the notification: suspend auto-hide.
    pub fn pointer_entered(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.phase() != Phase::Showing {
            return;
        }
        session.hover_locked = true;
        tracing::trace!(session = %session.id, "Hover lock engaged");
        self.cancel_timer();
    }

    /// Pointer left the notification: re-arm the hide timer with the
    /// current display time.
    pub fn pointer_left(&mut self, config: &Configuration, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.phase() != Phase::HoverLocked {
            return;
        }
        session.hover_locked = false;
        tracing::trace!(session = %session.id, "Hover lock released");
        self.schedule_hide(config, now);
    }

    /// Fire the armed task if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.timer {
            Some(task) if task.deadline <= now => self.on_timer(task.key, now),
            _ => false,
        }
    }

    /// Run the task identified by `key`. Stale keys are ignored.
    pub fn on_timer(&mut self, key: TaskKey, now: Instant) -> bool {
        let Some(task) = self.timer.filter(|task| task.key == key) else {
            tracing::trace!(session = %key.session, generation = key.generation, "Ignoring cancelled task");
            return false;
        };
        self.timer = None;

        match task.purpose {
            TaskPurpose::Hide => {
                let Some(session) = self.session.as_mut() else {
                    return false;
                };
                session.visible = false;
                session.pending_hide_at = None;
                tracing::debug!(session = %session.id, "Hiding notification");
                self.target.set_visibility(Visibility::FadingOut);
                self.arm(TaskPurpose::FadeOut, FADE_OUT, now);
            }
            TaskPurpose::FadeOut => {
                if let Some(session) = self.session.take() {
                    tracing::debug!(session = %session.id, "Notification hidden");
                }
                self.target.set_visibility(Visibility::Hidden);
            }
        }
        true
    }

    fn schedule_hide(&mut self, config: &Configuration, now: Instant) {
        if self.session.as_ref().is_none_or(|s| s.hover_locked) {
            return;
        }
        let delay = Duration::from_secs(config.display_time.into());
        let deadline = self.arm(TaskPurpose::Hide, delay, now);
        if let Some(session) = self.session.as_mut() {
            session.pending_hide_at = Some(deadline);
        }
    }

    fn arm(&mut self, purpose: TaskPurpose, delay: Duration, now: Instant) -> Instant {
        let Some(session) = self.session.as_ref().map(|s| s.id) else {
            return now;
        };
        self.generation += 1;
        let task = ScheduledTask {
            key: TaskKey {
                session,
                generation: self.generation,
            },
            purpose,
            deadline: now + delay,
        };
        if let Some(previous) = self.timer.replace(task) {
            tracing::trace!(generation = previous.key.generation, "Replaced armed task");
        }
        task.deadline
    }

    fn cancel_timer(&mut self) {
        if let Some(task) = self.timer.take() {
            tracing::trace!(session = %task.key.session, purpose = ?task.purpose, "Cancelled task");
        }
        if let Some(session) = self.session.as_mut() {
            session.pending_hide_at = None;
        }
    }
}
