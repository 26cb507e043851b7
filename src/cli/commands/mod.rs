//! CLI command implementations.

mod audiobook;
mod config;
mod doctor;
mod fetch;
mod narrate;
mod subs;

pub use audiobook::{run_audiobook, AudiobookArgs};
pub use config::run_config;
pub use doctor::run_doctor;
pub use fetch::run_fetch;
pub use narrate::run_narrate;
pub use subs::run_subs;
