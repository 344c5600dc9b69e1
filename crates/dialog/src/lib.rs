//! `watchdesk-dialog`: confirm/alert modals and toasts.
//!
//! What a dialog says and how it settles lives here; drawing it is the job of
//! a [`Surface`]. [`HeadlessSurface`] keeps elements in memory so the whole
//! lifecycle can run without a display.

pub mod content;
pub mod service;
pub mod surface;

pub use content::{
    ActionButton, AlertOptions, ConfirmOptions, Element, ModalContent, Severity, ToastContent,
    UserAction,
};
pub use service::{DialogService, DialogTimings};
pub use surface::{ActionResponder, HeadlessSurface, Surface, SurfaceEvent, Visibility};
