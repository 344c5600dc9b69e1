//! Identity provider contract and an in-memory implementation.
//!
//! The provider pushes the authentication state to listeners on every change,
//! including the initial state once it is known. A listener decides after each
//! notification whether it stays registered; returning
//! [`ListenerControl::Detach`] removes it before the provider moves on.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;

use watchdesk_core::SubscriptionId;

use crate::{AuthState, Principal};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The provider could not determine the auth state (network, SDK failure).
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider released the listener without ever notifying it.
    #[error("identity provider dropped the listener before reporting a state")]
    ListenerDropped,

    #[error("identity provider did not report a state within {0:?}")]
    Timeout(Duration),
}

/// Notification delivered to a listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Changed(AuthState),
    Failed(IdentityError),
}

/// Returned by a listener to stay subscribed or detach itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListenerControl {
    Keep,
    Detach,
}

pub type AuthListener = Box<dyn FnMut(AuthEvent) -> ListenerControl + Send>;

/// Source of the current authentication state.
pub trait IdentityProvider: Send + Sync {
    /// Register `listener`. If the state is already known the listener may be
    /// notified before this returns.
    fn subscribe(&self, listener: AuthListener) -> SubscriptionId;

    /// Remove a listener. Unknown or already-detached ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

impl<P> IdentityProvider for Arc<P>
where
    P: IdentityProvider + ?Sized,
{
    fn subscribe(&self, listener: AuthListener) -> SubscriptionId {
        (**self).subscribe(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        (**self).unsubscribe(id)
    }
}

/// Provider-side session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The provider has not established the initial state yet.
    Initializing,
    Ready(AuthState),
}

struct Inner {
    state: SessionState,
    listeners: Vec<(SubscriptionId, AuthListener)>,
    /// Listeners still inside their first (subscribe-time) callback, with the
    /// events published meanwhile. Delivered before the listener is registered.
    joining: HashMap<SubscriptionId, Vec<AuthEvent>>,
    notifying: bool,
    removed_while_notifying: HashSet<SubscriptionId>,
}

/// In-memory identity provider for tests and local runs.
///
/// - Listeners are invoked without the internal lock held.
/// - A provider created with [`InMemoryIdentityProvider::new`] stays
///   `Initializing` until a state is set, so subscribers wait.
/// - A change published while a new listener is still handling its initial
///   state is replayed to that listener before it joins the regular list.
pub struct InMemoryIdentityProvider {
    inner: Mutex<Inner>,
}

impl core::fmt::Debug for InMemoryIdentityProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.lock();
        f.debug_struct("InMemoryIdentityProvider")
            .field("state", &inner.state)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::with_state(SessionState::Initializing)
    }

    pub fn signed_out() -> Self {
        Self::with_state(SessionState::Ready(AuthState::SignedOut))
    }

    pub fn signed_in(principal: Principal) -> Self {
        Self::with_state(SessionState::Ready(AuthState::SignedIn(principal)))
    }

    fn with_state(state: SessionState) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state,
                listeners: Vec::new(),
                joining: HashMap::new(),
                notifying: false,
                removed_while_notifying: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    pub fn sign_in(&self, principal: Principal) {
        self.set_state(AuthState::SignedIn(principal));
    }

    pub fn sign_out(&self) {
        self.set_state(AuthState::SignedOut);
    }

    /// Record a new state and notify every listener.
    pub fn set_state(&self, state: AuthState) {
        tracing::debug!(signed_in = state.is_signed_in(), "auth state changed");
        self.notify(AuthEvent::Changed(state));
    }

    /// Report a provider failure to every listener. The state is unchanged.
    pub fn fail(&self, error: IdentityError) {
        tracing::debug!(%error, "identity provider failure");
        self.notify(AuthEvent::Failed(error));
    }

    fn notify(&self, event: AuthEvent) {
        let listeners = {
            let mut inner = self.lock();
            if let AuthEvent::Changed(state) = &event {
                inner.state = SessionState::Ready(state.clone());
            }
            for queued in inner.joining.values_mut() {
                queued.push(event.clone());
            }
            inner.notifying = true;
            std::mem::take(&mut inner.listeners)
        };

        let mut kept = Vec::with_capacity(listeners.len());
        for (id, mut listener) in listeners {
            if listener(event.clone()) == ListenerControl::Keep {
                kept.push((id, listener));
            }
        }

        let mut inner = self.lock();
        let removed = std::mem::take(&mut inner.removed_while_notifying);
        kept.retain(|(id, _)| !removed.contains(id));
        // Listeners registered during the notification go after the old ones.
        kept.append(&mut inner.listeners);
        inner.listeners = kept;
        inner.notifying = false;
    }

    /// Deliver the initial state, then anything published while the listener
    /// was busy, until nothing is left to replay.
    fn join(&self, id: SubscriptionId, mut listener: AuthListener, initial: AuthState) {
        let mut pending = vec![AuthEvent::Changed(initial)];

        loop {
            for event in pending {
                if listener(event) == ListenerControl::Detach {
                    self.lock().joining.remove(&id);
                    return;
                }
            }

            let mut inner = self.lock();
            match inner.joining.get_mut(&id).map(std::mem::take) {
                Some(queued) if !queued.is_empty() => pending = queued,
                _ => {
                    inner.joining.remove(&id);
                    inner.listeners.push((id, listener));
                    return;
                }
            }
        }
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    fn subscribe(&self, listener: AuthListener) -> SubscriptionId {
        let id = SubscriptionId::new();

        let initial = {
            let mut inner = self.lock();
            match inner.state.clone() {
                SessionState::Initializing => {
                    inner.listeners.push((id, listener));
                    return id;
                }
                SessionState::Ready(state) => {
                    inner.joining.insert(id, Vec::new());
                    state
                }
            }
        };

        self.join(id, listener, initial);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.lock();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _)| *existing != id);
        if inner.listeners.len() == before && inner.notifying {
            inner.removed_while_notifying.insert(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use watchdesk_core::PrincipalUid;

    fn principal() -> Principal {
        Principal::new(PrincipalUid::new("uid-1").unwrap(), None)
    }

    fn counting_listener(counter: Arc<AtomicUsize>, control: ListenerControl) -> AuthListener {
        Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            control
        })
    }

    #[test]
    fn ready_provider_notifies_on_subscribe() {
        let provider = InMemoryIdentityProvider::signed_out();
        let seen = Arc::new(AtomicUsize::new(0));
        provider.subscribe(counting_listener(seen.clone(), ListenerControl::Keep));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(provider.listener_count(), 1);
    }

    #[test]
    fn detaching_listener_is_not_registered() {
        let provider = InMemoryIdentityProvider::signed_in(principal());
        let seen = Arc::new(AtomicUsize::new(0));
        provider.subscribe(counting_listener(seen.clone(), ListenerControl::Detach));
        provider.sign_out();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(provider.listener_count(), 0);
    }

    #[test]
    fn initializing_provider_defers_notification() {
        let provider = InMemoryIdentityProvider::new();
        let seen = Arc::new(AtomicUsize::new(0));
        provider.subscribe(counting_listener(seen.clone(), ListenerControl::Keep));
        assert_eq!(seen.load(Ordering::SeqCst), 0);

        provider.sign_in(principal());
        provider.sign_out();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_removes_listener() {
        let provider = InMemoryIdentityProvider::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let id = provider.subscribe(counting_listener(seen.clone(), ListenerControl::Keep));
        provider.unsubscribe(id);
        provider.sign_out();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failure_reaches_listeners_without_changing_state() {
        let provider = InMemoryIdentityProvider::new();
        let failed = Arc::new(AtomicUsize::new(0));
        let seen = failed.clone();
        provider.subscribe(Box::new(move |event| {
            if matches!(event, AuthEvent::Failed(_)) {
                seen.fetch_add(1, Ordering::SeqCst);
            }
            ListenerControl::Keep
        }));
        provider.fail(IdentityError::Unavailable("offline".into()));
        assert_eq!(failed.load(Ordering::SeqCst), 1);
        assert_eq!(provider.state(), SessionState::Initializing);
    }

    #[test]
    fn change_during_initial_callback_is_replayed() {
        use std::sync::mpsc;

        let provider = Arc::new(InMemoryIdentityProvider::signed_out());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();

        let subscriber = {
            let provider = provider.clone();
            let seen = seen.clone();
            std::thread::spawn(move || {
                let mut first = true;
                provider.subscribe(Box::new(move |event| {
                    seen.lock().unwrap().push(event);
                    if first {
                        first = false;
                        entered_tx.send(()).unwrap();
                        release_rx.recv().unwrap();
                    }
                    ListenerControl::Keep
                }));
            })
        };

        entered_rx.recv().unwrap();
        provider.sign_in(principal());
        release_tx.send(()).unwrap();
        subscriber.join().unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                AuthEvent::Changed(AuthState::SignedOut),
                AuthEvent::Changed(AuthState::SignedIn(principal())),
            ]
        );
        assert_eq!(provider.listener_count(), 1);

        provider.sign_out();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }
}
