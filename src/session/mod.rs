//! Session state, guarding, and authentication flows.

pub mod context;
pub mod flows;
pub mod guard;

pub use context::SessionContext;
pub use flows::AuthFlows;
pub use guard::{Navigator, Route, SessionGuard};
