pub mod actions;
pub mod touch_source;

pub use actions::{build_actions, ActionInvoker, CommandAction, LogAction};
pub use touch_source::{create_touch_source, ReplayTrace, TouchSourceTrait};
