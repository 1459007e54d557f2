//! TouchSource service: responsibility and boundaries
//!
//! This module is responsible ONLY for turning some input (an evdev multi-touch device,
//! a replay trace, or scripted emulation) into ManipulationEvent(s) published on a
//! TouchSurface. It MUST NOT classify gestures or know about listeners; all of that
//! happens in GestureRegistry, which subscribes to the surface.

mod contact_tracker;
mod dry_touch_source;
mod touch_source;
mod r#trait;

pub use self::contact_tracker::ContactTracker;
pub use self::dry_touch_source::{ReplayTrace, TraceStep};
pub use self::r#trait::{create_touch_source, TouchSourceTrait};
