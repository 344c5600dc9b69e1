//! `watchdesk-auth`: identity resolution and role lookup boundary.
//!
//! The identity provider and the role store are external services; this crate
//! only defines the contracts it consumes, the one-shot [`AuthResolver`], and
//! in-memory implementations used by tests and the demo binary.

pub mod principal;
pub mod provider;
pub mod resolver;
pub mod roles;
pub mod store;

pub use principal::{AuthState, Principal};
pub use provider::{
    AuthEvent, AuthListener, IdentityError, IdentityProvider, InMemoryIdentityProvider,
    ListenerControl, SessionState,
};
pub use resolver::AuthResolver;
pub use roles::{Role, RoleFlags, RoleKeyStrategy};
pub use store::{InMemoryRoleStore, RoleRecord, RoleStore, RoleStoreError};
