//! Modal and toast lifecycle on top of a [`Surface`].

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::Instant;

use watchdesk_core::ElementId;

use crate::content::{AlertOptions, ConfirmOptions, Element, Severity, ToastContent, UserAction};
use crate::surface::{ActionResponder, Surface, Visibility};

/// Animation and lifetime timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogTimings {
    /// Time between a modal closing and its removal from the surface.
    pub close_delay: Duration,
    pub toast_fade_in: Duration,
    pub toast_fade_out: Duration,
    pub default_toast_duration: Duration,
}

impl Default for DialogTimings {
    fn default() -> Self {
        Self {
            close_delay: Duration::from_millis(200),
            toast_fade_in: Duration::from_millis(10),
            toast_fade_out: Duration::from_millis(300),
            default_toast_duration: Duration::from_millis(3000),
        }
    }
}

/// Shows confirm and alert modals and transient toasts.
///
/// Cheap to clone; clones share the surface and the timer count.
#[derive(Debug)]
pub struct DialogService<S> {
    surface: Arc<S>,
    timings: DialogTimings,
    pending: Arc<AtomicUsize>,
}

impl<S> Clone for DialogService<S> {
    fn clone(&self) -> Self {
        Self {
            surface: Arc::clone(&self.surface),
            timings: self.timings,
            pending: Arc::clone(&self.pending),
        }
    }
}

/// Closes a modal and schedules its removal when dropped, whether the wait
/// finished or was abandoned.
struct OpenModal<'a, S: Surface + 'static> {
    service: &'a DialogService<S>,
    id: ElementId,
}

impl<S: Surface + 'static> Drop for OpenModal<'_, S> {
    fn drop(&mut self) {
        self.service.dismantle(self.id);
    }
}

/// Decrements the pending timer count when a timer task ends, however it ends.
struct PendingTimer(Arc<AtomicUsize>);

impl Drop for PendingTimer {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S> DialogService<S>
where
    S: Surface + 'static,
{
    pub fn new(surface: Arc<S>) -> Self {
        Self::with_timings(surface, DialogTimings::default())
    }

    pub fn with_timings(surface: Arc<S>, timings: DialogTimings) -> Self {
        Self {
            surface,
            timings,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }

    pub fn timings(&self) -> DialogTimings {
        self.timings
    }

    /// Close and removal timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Ask the user to confirm. Resolves `true` only for the confirm button;
    /// cancel and dismissal both resolve `false`.
    pub async fn show_confirm(&self, options: ConfirmOptions) -> bool {
        let severity = options.severity;
        let action = self.present(Element::Modal(options.into_content())).await;
        tracing::debug!(%severity, ?action, "confirm dialog settled");
        action == UserAction::Confirm
    }

    /// Show an informational modal. Resolves once it is acknowledged or dismissed.
    pub async fn show_alert(&self, message: impl Into<String>, options: AlertOptions) {
        let severity = options.severity;
        let action = self
            .present(Element::Modal(options.into_content(message)))
            .await;
        tracing::debug!(%severity, ?action, "alert dialog settled");
    }

    /// Show a toast. Returns immediately; the toast fades in, stays for
    /// `duration` (default 3s), fades out and is removed.
    ///
    /// Severity defaults to [`Severity::Success`].
    pub fn show_toast(
        &self,
        message: impl Into<String>,
        severity: Option<Severity>,
        duration: Option<Duration>,
    ) {
        let severity = severity.unwrap_or(Severity::Success);
        let surface = Arc::clone(&self.surface);
        let id = surface.attach(Element::Toast(ToastContent::new(message, severity)), None);

        let timings = self.timings;
        let duration = duration.unwrap_or(timings.default_toast_duration);
        let start = Instant::now();
        let timer_surface = Arc::clone(&surface);
        let spawned = self.spawn_timer(async move {
            // Both marks count from attachment; a toast hidden before its
            // fade-in mark is never shown.
            if timings.toast_fade_in < duration {
                tokio::time::sleep_until(start + timings.toast_fade_in).await;
                timer_surface.set_visibility(id, Visibility::Visible);
            }
            tokio::time::sleep_until(start + duration).await;
            timer_surface.set_visibility(id, Visibility::Hidden);
            tokio::time::sleep(timings.toast_fade_out).await;
            timer_surface.detach(id);
        });

        if !spawned {
            tracing::warn!(%id, "no async runtime for toast timers; removing toast");
            surface.detach(id);
        }
    }

    /// Attach a modal and wait for the user. The modal is closed once
    /// settled, or when this future is dropped first, and removed from the
    /// surface after the close delay.
    async fn present(&self, element: Element) -> UserAction {
        let (tx, rx) = oneshot::channel();
        let id = self
            .surface
            .attach(element, Some(ActionResponder::new(tx)));
        let _open = OpenModal { service: self, id };

        // A responder dropped without an answer counts as dismissal.
        rx.await.unwrap_or(UserAction::Dismiss)
    }

    fn dismantle(&self, id: ElementId) {
        self.surface.close(id);

        let surface = Arc::clone(&self.surface);
        let close_delay = self.timings.close_delay;
        let spawned = self.spawn_timer(async move {
            tokio::time::sleep(close_delay).await;
            surface.detach(id);
        });
        if !spawned {
            self.surface.detach(id);
        }
    }

    fn spawn_timer<F>(&self, timer: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = Handle::try_current() else {
            return false;
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingTimer(Arc::clone(&self.pending));
        handle.spawn(async move {
            let _guard = guard;
            timer.await;
        });
        true
    }
}
