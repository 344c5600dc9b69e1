//! One-shot resolution of the current principal.

use std::time::Duration;

use tokio::sync::oneshot;

use watchdesk_core::SubscriptionId;

use crate::{
    AuthEvent, AuthState, IdentityError, IdentityProvider, ListenerControl, Principal,
};

/// Turns the provider's subscription model into a single awaitable answer.
///
/// Each call registers a fresh listener that detaches itself on the first
/// notification. There is no retry, and no timeout unless one is configured.
#[derive(Debug, Clone)]
pub struct AuthResolver<P> {
    provider: P,
    timeout: Option<Duration>,
}

/// Unsubscribes on drop unless disarmed (the listener already detached).
struct Registration<'a, P: IdentityProvider> {
    provider: &'a P,
    id: SubscriptionId,
    armed: bool,
}

impl<P: IdentityProvider> Drop for Registration<'_, P> {
    fn drop(&mut self) {
        if self.armed {
            self.provider.unsubscribe(self.id);
        }
    }
}

impl<P: IdentityProvider> AuthResolver<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Wait for the provider's first report and return it.
    pub async fn resolve_state(&self) -> Result<AuthState, IdentityError> {
        let (tx, rx) = oneshot::channel::<Result<AuthState, IdentityError>>();
        let mut tx = Some(tx);

        let id = self.provider.subscribe(Box::new(move |event| {
            if let Some(tx) = tx.take() {
                let outcome = match event {
                    AuthEvent::Changed(state) => Ok(state),
                    AuthEvent::Failed(error) => Err(error),
                };
                // The resolver may have given up (timeout, dropped future).
                let _ = tx.send(outcome);
            }
            ListenerControl::Detach
        }));
        let mut registration = Registration {
            provider: &self.provider,
            id,
            armed: true,
        };

        let received = match self.timeout {
            None => rx.await,
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::warn!(timeout = ?limit, "identity provider did not report in time");
                    return Err(IdentityError::Timeout(limit));
                }
            },
        };

        registration.armed = false;
        received.map_err(|_| IdentityError::ListenerDropped)?
    }

    /// `Some(principal)` when signed in, `None` when signed out.
    pub async fn resolve_current_principal(&self) -> Result<Option<Principal>, IdentityError> {
        Ok(self.resolve_state().await?.into_principal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use watchdesk_core::{Email, PrincipalUid};

    use crate::InMemoryIdentityProvider;

    fn principal() -> Principal {
        Principal::new(
            PrincipalUid::new("uid-1").unwrap(),
            Some(Email::parse("a@example.com").unwrap()),
        )
    }

    #[tokio::test]
    async fn resolves_signed_in_principal_and_detaches() {
        let provider = Arc::new(InMemoryIdentityProvider::signed_in(principal()));
        let resolver = AuthResolver::new(provider.clone());

        let resolved = resolver.resolve_current_principal().await.unwrap();
        assert_eq!(resolved, Some(principal()));
        assert_eq!(provider.listener_count(), 0);
    }

    #[tokio::test]
    async fn signed_out_resolves_to_none() {
        let resolver = AuthResolver::new(InMemoryIdentityProvider::signed_out());
        assert_eq!(resolver.resolve_current_principal().await.unwrap(), None);
    }

    #[tokio::test]
    async fn waits_for_initial_state() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let resolver = AuthResolver::new(provider.clone());

        let pending = tokio::spawn(async move { resolver.resolve_state().await });
        tokio::task::yield_now().await;
        provider.sign_in(principal());

        let state = pending.await.unwrap().unwrap();
        assert_eq!(state, AuthState::SignedIn(principal()));
        assert_eq!(provider.listener_count(), 0);
    }

    #[tokio::test]
    async fn only_first_notification_counts() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let resolver = AuthResolver::new(provider.clone());

        let pending = tokio::spawn(async move { resolver.resolve_state().await });
        tokio::task::yield_now().await;
        provider.sign_out();
        provider.sign_in(principal());

        assert_eq!(pending.await.unwrap().unwrap(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn provider_failure_propagates() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let resolver = AuthResolver::new(provider.clone());

        let pending = tokio::spawn(async move { resolver.resolve_state().await });
        tokio::task::yield_now().await;
        provider.fail(IdentityError::Unavailable("network down".into()));

        assert_eq!(
            pending.await.unwrap(),
            Err(IdentityError::Unavailable("network down".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn configured_timeout_fails_and_unsubscribes() {
        let provider = Arc::new(InMemoryIdentityProvider::new());
        let resolver =
            AuthResolver::new(provider.clone()).with_timeout(Some(Duration::from_secs(5)));

        let err = resolver.resolve_state().await.unwrap_err();
        assert_eq!(err, IdentityError::Timeout(Duration::from_secs(5)));
        assert_eq!(provider.listener_count(), 0);
    }
}
