//! GestureRegistry: единая точка подписки на телеметрию поверхностей.
//!
//! Responsibilities (strict):
//! - Keep exactly one low-level subscription per surface, however many listeners it has.
//! - Own the per-surface session state (touch histogram); listeners never see it directly.
//! - On completion resolve the modifier once and classify once per listener, because tap
//!   thresholds are per-listener.
//! - Do NOT decide whether a listener fires; that is the listener's own filter policy.

use super::classifier::classify;
use super::listener::GestureListener;
use super::modifier::resolve;
use super::surface::{ManipulationSurface, SubscriptionId, TelemetryHandler};
use super::touch_samples::{TouchHistogram, TouchSampleAggregator};
use crate::events::{ManipulationEvent, SurfaceId, Vector};
use crate::{debug_if_enabled, trace_if_enabled};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use smallvec::SmallVec;
use std::sync::{Arc, Weak};
use tracing::{info, warn};

type ListenerSet = SmallVec<[Arc<dyn GestureListener>; 4]>;

/// Состояние одной поверхности. Живёт, пока у поверхности есть хотя бы один слушатель.
struct SurfaceEntry {
    surface: Arc<dyn ManipulationSurface>,
    subscription: SubscriptionId,
    listeners: ListenerSet,
    samples: TouchSampleAggregator,
}

#[derive(Default)]
pub struct GestureRegistry {
    // Шард DashMap служит блокировкой "один писатель на поверхность"
    surfaces: DashMap<SurfaceId, SurfaceEntry>,
}

impl GestureRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Привязать слушателя к поверхности.
    ///
    /// Первый слушатель подписывает реестр на телеметрию поверхности; повторное
    /// добавление той же пары ничего не меняет. Подписка оформляется без блокировки
    /// реестра: поверхность может прислать событие прямо из `subscribe`.
    pub fn add_listener(self: &Arc<Self>, listener: Arc<dyn GestureListener>, surface: &Arc<dyn ManipulationSurface>) {
        let surface_id = surface.id();

        loop {
            if let Some(mut entry) = self.surfaces.get_mut(&surface_id) {
                if entry.listeners.iter().any(|known| same_listener(known, &listener)) {
                    debug_if_enabled!("Слушатель '{}' уже привязан к {}", listener.name(), surface_id);
                } else {
                    info!("Слушатель '{}' привязан к {}", listener.name(), surface_id);
                    entry.listeners.push(listener);
                }
                return;
            }

            let subscription = surface.subscribe(self.telemetry_handler(surface_id));

            match self.surfaces.entry(surface_id) {
                Entry::Vacant(vacant) => {
                    info!("Подписка на телеметрию {} оформлена", surface_id);
                    info!("Слушатель '{}' привязан к {}", listener.name(), surface_id);
                    let mut listeners = ListenerSet::new();
                    listeners.push(listener);
                    vacant.insert(SurfaceEntry {
                        surface: Arc::clone(surface),
                        subscription,
                        listeners,
                        samples: TouchSampleAggregator::new(),
                    });
                    return;
                }
                Entry::Occupied(occupied) => {
                    // другой поток успел подписаться первым
                    drop(occupied);
                    surface.unsubscribe(subscription);
                }
            }
        }
    }

    /// Отвязать слушателя. Последний ушедший слушатель снимает подписку и состояние сессии.
    pub fn remove_listener(&self, listener: &Arc<dyn GestureListener>, surface: &Arc<dyn ManipulationSurface>) {
        let surface_id = surface.id();

        let emptied = match self.surfaces.get_mut(&surface_id) {
            Some(mut entry) => {
                let before = entry.listeners.len();
                entry.listeners.retain(|known| !same_listener(known, listener));
                if entry.listeners.len() == before {
                    debug_if_enabled!("Слушатель '{}' не был привязан к {}", listener.name(), surface_id);
                    return;
                }
                info!("Слушатель '{}' отвязан от {}", listener.name(), surface_id);
                entry.listeners.is_empty()
            }
            None => {
                debug_if_enabled!("{} не зарегистрирована, удалять нечего", surface_id);
                return;
            }
        };

        if emptied {
            if let Some((_, entry)) = self.surfaces.remove_if(&surface_id, |_, entry| entry.listeners.is_empty()) {
                entry.surface.unsubscribe(entry.subscription);
                info!("Слушателей у {} не осталось, подписка снята", surface_id);
            }
        }
    }

    /// Обработать одно событие телеметрии поверхности
    pub fn handle_event(&self, surface_id: SurfaceId, event: &ManipulationEvent) {
        match *event {
            ManipulationEvent::Started => {
                if let Some(mut entry) = self.surfaces.get_mut(&surface_id) {
                    entry.samples.start_session();
                    debug_if_enabled!("{}: начало сессии", surface_id);
                } else {
                    trace_if_enabled!("{}: started для незарегистрированной поверхности", surface_id);
                }
            }
            ManipulationEvent::Delta { touch_count } => {
                if let Some(mut entry) = self.surfaces.get_mut(&surface_id) {
                    if !entry.samples.record_sample(touch_count) {
                        trace_if_enabled!("{}: кадр без касаний пропущен", surface_id);
                    }
                }
            }
            ManipulationEvent::Completed { translation, velocity } => {
                self.complete_session(surface_id, translation, velocity);
            }
        }
    }

    fn complete_session(&self, surface_id: SurfaceId, translation: Vector, velocity: Vector) {
        // Снимок берётся под блокировкой, рассылка идёт уже без неё
        let (listeners, histogram) = match self.surfaces.get(&surface_id) {
            Some(entry) => (entry.listeners.clone(), entry.samples.snapshot()),
            None => {
                trace_if_enabled!("{}: completed для незарегистрированной поверхности", surface_id);
                return;
            }
        };

        if !translation.is_finite() || !velocity.is_finite() {
            warn!(
                "{}: нечисловая телеметрия (смещение {}, скорость {}), жест будет распознан как tap",
                surface_id, translation, velocity
            );
        }

        let modifier = resolve(&histogram);
        debug_if_enabled!(
            "{}: завершение сессии, смещение {}, скорость {}, касания {} -> {:?}",
            surface_id,
            translation,
            velocity,
            histogram,
            modifier
        );

        for listener in &listeners {
            let config = listener.snapshot();
            let gesture = classify(translation, velocity, config.tap_detection());
            debug_if_enabled!("{}: '{}' получает {}", surface_id, listener.name(), gesture);
            listener.on_gesture(gesture, modifier, &config);
        }
    }

    fn telemetry_handler(self: &Arc<Self>, surface_id: SurfaceId) -> TelemetryHandler {
        let registry: Weak<Self> = Arc::downgrade(self);
        Arc::new(move |event: &ManipulationEvent| {
            if let Some(registry) = registry.upgrade() {
                registry.handle_event(surface_id, event);
            }
        })
    }

    pub fn listener_count(&self, surface_id: SurfaceId) -> usize {
        self.surfaces
            .get(&surface_id)
            .map_or(0, |entry| entry.listeners.len())
    }

    pub fn is_subscribed(&self, surface_id: SurfaceId) -> bool {
        self.surfaces.contains_key(&surface_id)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    /// Текущая гистограмма касаний поверхности, если она зарегистрирована
    pub fn histogram(&self, surface_id: SurfaceId) -> Option<TouchHistogram> {
        self.surfaces.get(&surface_id).map(|entry| entry.samples.snapshot())
    }
}

impl Drop for GestureRegistry {
    fn drop(&mut self) {
        for entry in self.surfaces.iter() {
            entry.surface.unsubscribe(entry.subscription);
        }
    }
}

// Сравниваем только адрес данных: vtable у одного типа может различаться между единицами кодогенерации
fn same_listener(a: &Arc<dyn GestureListener>, b: &Arc<dyn GestureListener>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
