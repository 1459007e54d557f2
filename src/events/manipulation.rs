use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Идентификатор поверхности, генерирующей телеметрию касаний
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Выделить новый уникальный в пределах процесса идентификатор
    pub fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Двумерный вектор (смещение или скорость)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Событие жизненного цикла манипуляции на поверхности
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManipulationEvent {
    /// Первое касание, начало сессии
    Started,
    /// Промежуточный кадр с текущим числом одновременных касаний
    Delta { touch_count: u32 },
    /// Завершение: суммарное смещение и финальная линейная скорость
    Completed { translation: Vector, velocity: Vector },
}

impl ManipulationEvent {
    pub fn delta(touch_count: u32) -> Self {
        Self::Delta { touch_count }
    }

    pub fn completed(translation: Vector, velocity: Vector) -> Self {
        Self::Completed { translation, velocity }
    }
}

impl fmt::Display for ManipulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Delta { touch_count } => write!(f, "delta[{} касаний]", touch_count),
            Self::Completed { translation, velocity } => {
                write!(f, "completed[смещение {}, скорость {}]", translation, velocity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_ids_are_unique() {
        let a = SurfaceId::next();
        let b = SurfaceId::next();
        assert_ne!(a, b);
        assert!(b.value() > a.value());
    }

    #[test]
    fn test_vector_length_and_finiteness() {
        assert_eq!(Vector::new(3.0, -4.0).length(), 5.0);
        assert!(Vector::ZERO.is_finite());
        assert!(!Vector::new(f64::NAN, 0.0).is_finite());
        assert!(!Vector::new(0.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_vector_arithmetic() {
        let v = Vector::new(1.0, 2.0) + Vector::new(3.0, 4.0) - Vector::new(1.0, 1.0);
        assert_eq!(v, Vector::new(3.0, 5.0));
        assert_eq!(v.scaled(2.0), Vector::new(6.0, 10.0));
    }

    #[test]
    fn test_event_display() {
        assert_eq!(ManipulationEvent::Started.to_string(), "started");
        assert_eq!(ManipulationEvent::delta(2).to_string(), "delta[2 касаний]");
    }
}
