use crate::error::{RecognizerError, Result};
use crate::events::{ManipulationEvent, Vector};
use crate::recognizer::TouchSurface;
use crate::recognizer_error;
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::time::{interval, sleep, Duration};
use tracing::{debug, info};

/// Записанная последовательность событий манипуляции
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayTrace {
    #[serde(default)]
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceStep {
    /// Пауза перед событием
    #[serde(default)]
    pub delay_ms: u64,
    pub event: ManipulationEvent,
}

impl ReplayTrace {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            recognizer_error!(replay, "Не удалось прочитать трассу {:?}: {}", path, e)
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Figment::from(Toml::string(content))
            .extract()
            .map_err(|e| RecognizerError::Replay(e.to_string()))
    }
}

pub struct DryRunTouchSource {
    surface: Arc<TouchSurface>,
    trace: Option<ReplayTrace>,
}

impl DryRunTouchSource {
    pub fn new(surface: Arc<TouchSurface>, replay: Option<&Path>) -> Result<Self> {
        info!("Инициализация DryRunTouchSource");
        let trace = replay.map(ReplayTrace::load).transpose()?;
        Ok(Self { surface, trace })
    }

    async fn run_impl(self) -> Result<()> {
        match &self.trace {
            Some(trace) => {
                self.replay(trace).await;
                Ok(())
            }
            None => self.emulate().await,
        }
    }

    async fn replay(&self, trace: &ReplayTrace) {
        info!("Воспроизведение трассы: {} шагов", trace.steps.len());
        for (i, step) in trace.steps.iter().enumerate() {
            if step.delay_ms > 0 {
                sleep(Duration::from_millis(step.delay_ms)).await;
            }
            debug!("Шаг #{}: {}", i + 1, step.event);
            self.surface.emit(&step.event);
        }
        info!("Трасса воспроизведена");
    }

    async fn emulate(&self) -> Result<()> {
        info!("Dry-run режим - TouchSource работает в режиме эмуляции");

        let scripts: [(&str, Vec<ManipulationEvent>); 2] = [
            ("tap одним пальцем", vec![
                ManipulationEvent::Started,
                ManipulationEvent::completed(Vector::ZERO, Vector::ZERO),
            ]),
            ("swipe влево двумя пальцами", two_finger_swipe_left()),
        ];

        let mut script_index = 0;
        let mut interval = interval(Duration::from_secs(5));

        loop {
            interval.tick().await;

            let (name, events) = &scripts[script_index];
            info!("Dry-run: эмулируем {}", name);
            for event in events {
                self.surface.emit(event);
            }

            script_index = (script_index + 1) % scripts.len();
        }
    }
}

fn two_finger_swipe_left() -> Vec<ManipulationEvent> {
    let mut events = vec![ManipulationEvent::Started];
    events.extend(std::iter::repeat(ManipulationEvent::delta(2)).take(6));
    events.push(ManipulationEvent::completed(Vector::new(-120.0, 4.0), Vector::new(-1.5, 0.0)));
    events
}

#[async_trait::async_trait]
impl super::r#trait::TouchSourceTrait for DryRunTouchSource {
    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
