//! Классификация завершённой манипуляции в дискретный жест.
//!
//! Функция чистая: никакого состояния, никакого логирования. Всё, что зависит от
//! слушателя, приходит снимком [`TapDetection`].

use crate::events::{Gesture, Vector};

// Коэффициенты логистической регрессии "tap или swipe" по длине смещения и скорости.
const TRANSLATION_LENGTH_COEFF: f64 = -0.029;
const VELOCITY_LENGTH_COEFF: f64 = -0.029;
const INTERCEPT: f64 = 1.638;

/// Снимок настроек распознавания tap, взятый у слушателя в момент диспетчеризации
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapDetection {
    pub threshold_px: f64,
    pub use_velocity: bool,
}

impl TapDetection {
    pub fn by_threshold(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            use_velocity: false,
        }
    }

    pub fn by_velocity() -> Self {
        Self {
            threshold_px: 0.0,
            use_velocity: true,
        }
    }
}

/// Определить жест по суммарному смещению и финальной скорости.
///
/// Нечисловые компоненты (NaN, бесконечность) классифицируются как `Tap`.
/// При равных расстояниях по осям предпочтение отдаётся вертикальному свайпу.
pub fn classify(translation: Vector, velocity: Vector, tap: TapDetection) -> Gesture {
    if !translation.is_finite() || !velocity.is_finite() {
        return Gesture::Tap;
    }

    let dist_x = translation.x.abs();
    let dist_y = translation.y.abs();

    let is_tap = if tap.use_velocity {
        is_tap_by_velocity(translation, velocity)
    } else {
        dist_x <= tap.threshold_px && dist_y <= tap.threshold_px
    };

    if is_tap {
        Gesture::Tap
    } else if dist_y >= dist_x {
        if translation.y > 0.0 {
            Gesture::SwipeDown
        } else {
            Gesture::SwipeUp
        }
    } else if translation.x > 0.0 {
        Gesture::SwipeRight
    } else {
        Gesture::SwipeLeft
    }
}

fn is_tap_by_velocity(translation: Vector, velocity: Vector) -> bool {
    let score = TRANSLATION_LENGTH_COEFF * translation.length()
        + VELOCITY_LENGTH_COEFF * velocity.length()
        + INTERCEPT;
    let probability = 1.0 / (1.0 + (-score).exp());
    probability > 0.5
}
