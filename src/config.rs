use crate::events::{GestureTarget, ModifierTarget};
use crate::recognizer::listener::{ListenerConfig, DEFAULT_TAP_THRESHOLD_PX};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub listeners: Vec<ListenerSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    pub device_path: String,
    /// Во сколько пикселей переводится единица координат устройства
    pub units_per_pixel: f64,
}

/// Описание одного слушателя жестов
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenerSpec {
    pub name: String,
    #[serde(default)]
    pub gesture: GestureTarget,
    #[serde(default)]
    pub modifier: ModifierTarget,
    #[serde(default = "default_tap_threshold")]
    pub tap_threshold_px: u32,
    #[serde(default)]
    pub use_velocity_for_tap: bool,
    /// Команда оболочки; без неё жест только логируется
    #[serde(default)]
    pub command: Option<String>,
}

fn default_tap_threshold() -> u32 {
    DEFAULT_TAP_THRESHOLD_PX
}

impl ListenerSpec {
    pub fn named(name: impl Into<String>) -> Self {
        let defaults = ListenerConfig::default();
        Self {
            name: name.into(),
            gesture: defaults.target_gesture,
            modifier: defaults.target_modifier,
            tap_threshold_px: defaults.tap_threshold_px,
            use_velocity_for_tap: defaults.use_velocity_for_tap,
            command: None,
        }
    }

    pub fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            target_gesture: self.gesture,
            tap_threshold_px: self.tap_threshold_px,
            use_velocity_for_tap: self.use_velocity_for_tap,
            target_modifier: self.modifier,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            input: InputConfig {
                device_path: "auto".to_string(),
                units_per_pixel: 1.0,
            },
            listeners: Vec::new(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("GESTURE_").split("__"));

        let mut config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;
        config.ensure_listeners();

        Ok(config)
    }

    /// Без явных слушателей ставим один, логирующий любые жесты любым числом пальцев
    pub fn ensure_listeners(&mut self) {
        if self.listeners.is_empty() {
            let mut listener = ListenerSpec::named("log-all");
            listener.modifier = ModifierTarget::Any;
            self.listeners.push(listener);
        }
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "pretty" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        // Валидация настроек ввода
        if self.input.device_path.is_empty() {
            anyhow::bail!("device_path не может быть пустым (используйте \"auto\")");
        }

        if !self.input.units_per_pixel.is_finite() || self.input.units_per_pixel <= 0.0 {
            anyhow::bail!(
                "units_per_pixel должно быть положительным числом, получено {}",
                self.input.units_per_pixel
            );
        }

        // Валидация слушателей
        let mut names = HashSet::new();
        for (i, listener) in self.listeners.iter().enumerate() {
            if listener.name.trim().is_empty() {
                anyhow::bail!("Пустое имя слушателя #{}", i + 1);
            }
            if !names.insert(listener.name.as_str()) {
                anyhow::bail!("Повторяющееся имя слушателя '{}'", listener.name);
            }
            if matches!(&listener.command, Some(command) if command.trim().is_empty()) {
                anyhow::bail!("Пустая команда у слушателя '{}'", listener.name);
            }
        }

        Ok(())
    }
}
