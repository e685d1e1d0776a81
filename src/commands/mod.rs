//! Commands Layer
//!
//! User actions over the application state. Each returns the user-visible
//! failure message as its error; the detail goes to the log.

mod idea_cmd;
mod vendor_cmd;

pub use idea_cmd::*;
pub use vendor_cmd::*;

use crate::domain::DomainError;

/// Log a failed action and turn it into the message shown to the user
fn report(action: &str, error: DomainError) -> String {
    log::error!("{} failed: {}", action, error);
    error.to_string()
}
