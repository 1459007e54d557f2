use crate::events::{ManipulationEvent, SurfaceId};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Обработчик низкоуровневой телеметрии поверхности
pub type TelemetryHandler = Arc<dyn Fn(&ManipulationEvent) + Send + Sync>;

/// Идентификатор одной низкоуровневой подписки на поверхности
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Поверхность, генерирующая телеметрию манипуляций (начало, кадры, завершение).
///
/// Каждое событие доставляется всем текущим подписчикам синхронно и в порядке генерации.
pub trait ManipulationSurface: Send + Sync {
    fn id(&self) -> SurfaceId;

    fn subscribe(&self, handler: TelemetryHandler) -> SubscriptionId;

    /// Неизвестные идентификаторы подписок игнорируются
    fn unsubscribe(&self, subscription: SubscriptionId);
}

/// Поверхность, в которую источник касаний (evdev, реплей, тест) публикует события
pub struct TouchSurface {
    id: SurfaceId,
    name: String,
    next_subscription: AtomicU64,
    handlers: RwLock<Vec<(SubscriptionId, TelemetryHandler)>>,
}

impl TouchSurface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SurfaceId::next(),
            name: name.into(),
            next_subscription: AtomicU64::new(1),
            handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Разослать событие всем подписчикам.
    ///
    /// Список копируется до вызова, поэтому обработчик может (от)подписываться изнутри.
    pub fn emit(&self, event: &ManipulationEvent) {
        let handlers: Vec<TelemetryHandler> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        crate::trace_if_enabled!("{} '{}': {} -> {} подписчиков", self.id, self.name, event, handlers.len());

        for handler in handlers {
            handler(event);
        }
    }
}

impl ManipulationSurface for TouchSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn subscribe(&self, handler: TelemetryHandler) -> SubscriptionId {
        let subscription = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((subscription, handler));
        subscription
    }

    fn unsubscribe(&self, subscription: SubscriptionId) {
        self.handlers.write().retain(|(id, _)| *id != subscription);
    }
}
