//! User profile domain — model and workflow.

pub mod model;
pub mod workflow;

pub use model::{ProfilePatch, UserProfile};
pub use workflow::{PhotoUpload, ProfileWorkflow};
