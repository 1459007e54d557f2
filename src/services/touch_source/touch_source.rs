use crate::config::Config;
use crate::error::Result;
use crate::recognizer::TouchSurface;
use crate::{recognizer_error, trace_if_enabled};
use crate::utils::DeviceFinder;
use evdev::{Device, EventType, InputEvent};
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::{error, info};

use super::contact_tracker::{ContactTracker, EV_ABS, EV_SYN};
use super::r#trait::TouchSourceTrait;

pub struct RealTouchSource {
    surface: Arc<TouchSurface>,
    device: Device,
    tracker: ContactTracker,
}

impl RealTouchSource {
    pub fn new(config: Arc<Config>, surface: Arc<TouchSurface>) -> Result<Self> {
        info!("Инициализация RealTouchSource");

        let device_path = DeviceFinder::find_touch_device(&config.input.device_path)?;

        let device = Device::open(&device_path).map_err(|e| {
            recognizer_error!(device_not_found, "Не удалось открыть устройство {:?}: {}", device_path, e)
        })?;

        info!("Устройство: {}", device.name().unwrap_or("Unknown"));
        info!("Физический путь: {:?}", device.physical_path());

        Ok(Self {
            surface,
            device,
            tracker: ContactTracker::new(config.input.units_per_pixel),
        })
    }

    async fn run_impl(mut self) -> Result<()> {
        info!(
            "RealTouchSource запущен, события публикуются на поверхность '{}'",
            self.surface.name()
        );

        loop {
            let events_vec = match self.device.fetch_events() {
                Ok(events) => events.collect::<Vec<_>>(),
                Err(e) => {
                    error!("Ошибка чтения событий: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            for event in events_vec {
                self.handle_event(&event);
            }

            // Небольшая задержка для предотвращения 100% загрузки CPU
            tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
        }
    }

    fn handle_event(&mut self, event: &InputEvent) {
        let event_type = if event.event_type() == EventType::ABSOLUTE {
            EV_ABS
        } else if event.event_type() == EventType::SYNCHRONIZATION {
            EV_SYN
        } else {
            return;
        };

        let time_ms = event
            .timestamp()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64() * 1000.0)
            .unwrap_or_default();

        for manipulation in self.tracker.feed(event_type, event.code(), event.value(), time_ms) {
            trace_if_enabled!("Событие манипуляции: {}", manipulation);
            self.surface.emit(&manipulation);
        }
    }
}

#[async_trait::async_trait]
impl TouchSourceTrait for RealTouchSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
