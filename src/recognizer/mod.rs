//! Ядро распознавания: классификатор, накопитель касаний, выбор модификатора и реестр
//! подписок, который связывает их с поверхностями и слушателями.

pub mod classifier;
pub mod listener;
pub mod modifier;
pub mod registry;
pub mod surface;
pub mod touch_samples;

pub use classifier::{classify, TapDetection};
pub use listener::{should_fire, GestureListener, GestureTrigger, ListenerConfig};
pub use modifier::resolve;
pub use registry::GestureRegistry;
pub use surface::{ManipulationSurface, SubscriptionId, TelemetryHandler, TouchSurface};
pub use touch_samples::{TouchHistogram, TouchSampleAggregator};
