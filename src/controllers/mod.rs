//! Built-in controllers.
//!
//! Each controller declares its routes next to the handlers that serve them;
//! [`default_controllers`] is the discovery set used by the binary.

pub mod echo;
pub mod status;

pub use echo::EchoController;
pub use status::StatusController;

use crate::routing::ControllerSet;

/// Every built-in controller.
pub fn default_controllers() -> ControllerSet {
    ControllerSet::new()
        .with(StatusController)
        .with(EchoController)
}
