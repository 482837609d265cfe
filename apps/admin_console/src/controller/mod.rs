//! Controller layer: action context, fragment-swap actions, toggles and
//! command orchestration.

pub mod actions;
pub mod context;
pub mod events;
pub mod orchestration;
pub mod toggles;

pub use actions::{FragmentSwapController, NavigationSettings};
pub use context::ActionContext;
pub use events::{ActionOutcome, ConsoleEvent, UiError, UiErrorCategory, UiErrorContext};
pub use orchestration::{
    command_queue, dispatch_console_command, run_console, CommandQueue, ConsoleCommand,
    DispatchError,
};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
