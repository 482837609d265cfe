//! Fragment-swap controller of the OpenKIM admin console: every console
//! action as an async method over a typed page model, driven by a command
//! queue.

pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;
pub mod page;

pub use config::{load_settings, ConsoleSettings};
pub use controller::{ActionOutcome, FragmentSwapController};
pub use error::ConsoleError;
pub use page::{Page, PageError};
