use crate::error::{RecognizerError, Result};
use crate::recognizer_error;
use evdev::AbsoluteAxisCode;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct DeviceFinder;

impl DeviceFinder {
    /// Найти подходящее мультитач-устройство
    pub fn find_touch_device(device_path: &str) -> Result<PathBuf> {
        if device_path != "auto" {
            let path = PathBuf::from(device_path);
            return if path.exists() {
                info!("Используется указанное устройство: {:?}", path);
                Ok(path)
            } else {
                RecognizerError::device_not_found(format!("Указанное устройство не найдено: {:?}", path))
            };
        }

        // Автопоиск сенсорного устройства
        Self::auto_find_touch()
    }

    fn auto_find_touch() -> Result<PathBuf> {
        info!("Начинаем автопоиск мультитач-устройства...");

        // Попробуем найти устройство по ID
        if let Ok(device) = Self::find_by_id() {
            info!("Найдено устройство по ID: {:?}", device);
            return Ok(device);
        }

        // Попробуем найти устройство в /dev/input/event*
        if let Ok(device) = Self::find_by_event_devices() {
            info!("Найдено устройство среди event устройств: {:?}", device);
            return Ok(device);
        }

        RecognizerError::device_not_found(
            "Не удалось найти мультитач-устройство. \
             Убедитесь, что пользователь добавлен в группу 'input'",
        )
    }

    fn find_by_id() -> Result<PathBuf> {
        let by_id_dir = Path::new("/dev/input/by-id");

        if !by_id_dir.exists() {
            debug!("Директория /dev/input/by-id не существует");
            return RecognizerError::device_not_found("Директория by-id не найдена");
        }

        let entries = fs::read_dir(by_id_dir)
            .map_err(|e| recognizer_error!(permission, "Нет доступа к /dev/input/by-id: {}", e))?;

        let mut candidates = Vec::new();

        for entry in entries {
            let path = entry?.path();
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("").to_string();

            if !name.contains("event") {
                continue;
            }

            if !Self::is_device_accessible(&path) {
                warn!("Устройство {:?} недоступно", path);
                continue;
            }

            if Self::is_touch_device(&path) {
                let priority = Self::priority(&name);
                info!("Добавлено сенсорное устройство: {} (приоритет: {})", name, priority);
                candidates.push((path, priority));
            }
        }

        // Сортируем по приоритету и возвращаем лучшее
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        candidates
            .into_iter()
            .next()
            .map(|(path, _)| path)
            .map_or_else(|| RecognizerError::device_not_found("Сенсорное устройство не найдено в by-id"), Ok)
    }

    fn find_by_event_devices() -> Result<PathBuf> {
        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir)
            .map_err(|e| recognizer_error!(permission, "Нет доступа к /dev/input: {}", e))?;

        let mut event_devices = Vec::new();

        for entry in entries {
            let path = entry?.path();
            let is_event = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with("event"));

            if is_event {
                event_devices.push(path);
            }
        }

        // Сортируем устройства по номеру
        event_devices.sort();

        for device_path in event_devices {
            debug!("Проверяем устройство: {:?}", device_path);

            if Self::is_device_accessible(&device_path) && Self::is_touch_device(&device_path) {
                return Ok(device_path);
            }
        }

        RecognizerError::device_not_found("Не найдено доступное мультитач-устройство среди event устройств")
    }

    /// Сенсорные экраны важнее тачпадов: у экрана координаты совпадают с пикселями
    fn priority(name: &str) -> u32 {
        let name = name.to_lowercase();
        if name.contains("touchscreen") {
            100
        } else if name.contains("touch") {
            50
        } else {
            10
        }
    }

    fn is_touch_device(device_path: &Path) -> bool {
        match evdev::Device::open(device_path) {
            Ok(device) => {
                // Нужен протокол multi-touch type B: слоты и координаты касаний
                let is_touch = device.supported_absolute_axes().is_some_and(|axes| {
                    axes.contains(AbsoluteAxisCode::ABS_MT_SLOT)
                        && axes.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
                        && axes.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
                });

                if is_touch {
                    info!(
                        "Устройство {:?} подходит как мультитач ({})",
                        device_path,
                        device.name().unwrap_or("Unknown")
                    );
                } else {
                    debug!("Устройство {:?} не поддерживает multi-touch", device_path);
                }

                is_touch
            }
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                false
            }
        }
    }

    fn is_device_accessible(device_path: &Path) -> bool {
        match fs::File::open(device_path) {
            Ok(_) => true,
            Err(e) => {
                debug!("Устройство {:?} недоступно: {}", device_path, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_touch_device_with_specific_path() {
        // Тест с несуществующим путем
        let result = DeviceFinder::find_touch_device("/non/existent/path");
        assert!(matches!(result, Err(RecognizerError::DeviceNotFound(_))));
    }

    #[test]
    fn test_priority_prefers_touchscreens() {
        assert!(DeviceFinder::priority("usb-ELAN_Touchscreen-event-if00") > DeviceFinder::priority("Synaptics_TouchPad-event"));
        assert!(DeviceFinder::priority("Synaptics_TouchPad-event") > DeviceFinder::priority("usb-Wacom-event"));
    }
}
