//! Presentation surface capability and a headless implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use watchdesk_core::ElementId;

use crate::content::{Element, UserAction};

/// Settles a modal. Consumed on use, so a modal settles at most once.
#[derive(Debug)]
pub struct ActionResponder(oneshot::Sender<UserAction>);

impl ActionResponder {
    pub fn new(sender: oneshot::Sender<UserAction>) -> Self {
        Self(sender)
    }

    /// Returns `false` if nobody is waiting any more.
    pub fn respond(self, action: UserAction) -> bool {
        self.0.send(action).is_ok()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

/// Where dialogs and toasts are drawn.
///
/// Dropping a responder without responding counts as a dismissal.
pub trait Surface: Send + Sync {
    /// Attach `element`. Modals start visible and open; toasts start hidden.
    fn attach(&self, element: Element, responder: Option<ActionResponder>) -> ElementId;

    /// Close an open modal; it stays attached until detached.
    fn close(&self, id: ElementId);

    fn set_visibility(&self, id: ElementId, visibility: Visibility);

    fn detach(&self, id: ElementId);
}

impl<S> Surface for Arc<S>
where
    S: Surface + ?Sized,
{
    fn attach(&self, element: Element, responder: Option<ActionResponder>) -> ElementId {
        (**self).attach(element, responder)
    }

    fn close(&self, id: ElementId) {
        (**self).close(id)
    }

    fn set_visibility(&self, id: ElementId, visibility: Visibility) {
        (**self).set_visibility(id, visibility)
    }

    fn detach(&self, id: ElementId) {
        (**self).detach(id)
    }
}

/// What happened on a headless surface, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Attached(ElementId),
    Shown(ElementId),
    Hidden(ElementId),
    Closed(ElementId),
    Detached(ElementId),
}

#[derive(Debug)]
struct Mounted {
    id: ElementId,
    element: Element,
    visibility: Visibility,
    open: bool,
    responder: Option<ActionResponder>,
}

#[derive(Debug, Default)]
struct Inner {
    mounted: Vec<Mounted>,
    events: Vec<SurfaceEvent>,
}

/// In-memory surface; tests drive it with [`HeadlessSurface::press`].
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    inner: Mutex<Inner>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulate the user ending modal `id` with `action`.
    ///
    /// Returns `false` when the modal already settled or is gone.
    pub fn press(&self, id: ElementId, action: UserAction) -> bool {
        let responder = self
            .lock()
            .mounted
            .iter_mut()
            .find(|m| m.id == id)
            .and_then(|m| m.responder.take());

        match responder {
            Some(responder) => responder.respond(action),
            None => false,
        }
    }

    /// Backdrop click or close key.
    pub fn dismiss(&self, id: ElementId) -> bool {
        self.press(id, UserAction::Dismiss)
    }

    pub fn element(&self, id: ElementId) -> Option<Element> {
        self.lock()
            .mounted
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.element.clone())
    }

    pub fn is_attached(&self, id: ElementId) -> bool {
        self.lock().mounted.iter().any(|m| m.id == id)
    }

    pub fn is_open(&self, id: ElementId) -> bool {
        self.lock().mounted.iter().any(|m| m.id == id && m.open)
    }

    pub fn visibility(&self, id: ElementId) -> Option<Visibility> {
        self.lock()
            .mounted
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.visibility)
    }

    pub fn attached(&self) -> Vec<ElementId> {
        self.lock().mounted.iter().map(|m| m.id).collect()
    }

    /// Most recently attached element still on the surface.
    pub fn latest(&self) -> Option<ElementId> {
        self.lock().mounted.last().map(|m| m.id)
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().events.clone()
    }
}

impl Surface for HeadlessSurface {
    fn attach(&self, element: Element, responder: Option<ActionResponder>) -> ElementId {
        let id = ElementId::new();
        let modal = element.is_modal();
        let mut inner = self.lock();
        inner.mounted.push(Mounted {
            id,
            element,
            visibility: if modal { Visibility::Visible } else { Visibility::Hidden },
            open: modal,
            responder,
        });
        inner.events.push(SurfaceEvent::Attached(id));
        id
    }

    fn close(&self, id: ElementId) {
        let mut inner = self.lock();
        let Some(mounted) = inner.mounted.iter_mut().find(|m| m.id == id) else {
            return;
        };
        if !mounted.open {
            return;
        }
        mounted.open = false;
        mounted.responder = None;
        inner.events.push(SurfaceEvent::Closed(id));
    }

    fn set_visibility(&self, id: ElementId, visibility: Visibility) {
        let mut inner = self.lock();
        let Some(mounted) = inner.mounted.iter_mut().find(|m| m.id == id) else {
            return;
        };
        if mounted.visibility == visibility {
            return;
        }
        mounted.visibility = visibility;
        inner.events.push(match visibility {
            Visibility::Visible => SurfaceEvent::Shown(id),
            Visibility::Hidden => SurfaceEvent::Hidden(id),
        });
    }

    fn detach(&self, id: ElementId) {
        let mut inner = self.lock();
        let before = inner.mounted.len();
        // Dropping the responder here settles a still-pending modal as dismissed.
        inner.mounted.retain(|m| m.id != id);
        if inner.mounted.len() != before {
            inner.events.push(SurfaceEvent::Detached(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ConfirmOptions, Severity, ToastContent};

    #[tokio::test]
    async fn press_settles_once() {
        let surface = HeadlessSurface::new();
        let (tx, rx) = oneshot::channel();
        let id = surface.attach(
            Element::Modal(ConfirmOptions::default().into_content()),
            Some(ActionResponder::new(tx)),
        );

        assert!(surface.press(id, UserAction::Cancel));
        assert!(!surface.press(id, UserAction::Confirm));
        assert_eq!(rx.await.unwrap(), UserAction::Cancel);
    }

    #[tokio::test]
    async fn detaching_pending_modal_drops_responder() {
        let surface = HeadlessSurface::new();
        let (tx, rx) = oneshot::channel();
        let id = surface.attach(
            Element::Modal(ConfirmOptions::default().into_content()),
            Some(ActionResponder::new(tx)),
        );
        surface.detach(id);
        assert!(rx.await.is_err());
        assert!(!surface.is_attached(id));
    }

    #[test]
    fn toasts_start_hidden_and_record_transitions() {
        let surface = HeadlessSurface::new();
        let id = surface.attach(Element::Toast(ToastContent::new("hi", Severity::Info)), None);
        assert_eq!(surface.visibility(id), Some(Visibility::Hidden));
        assert!(!surface.is_open(id));

        surface.set_visibility(id, Visibility::Visible);
        surface.set_visibility(id, Visibility::Visible);
        surface.detach(id);

        assert_eq!(
            surface.events(),
            vec![
                SurfaceEvent::Attached(id),
                SurfaceEvent::Shown(id),
                SurfaceEvent::Detached(id),
            ]
        );
    }
}
