//! Распознавание дискретных жестов (tap и четыре свайпа) по телеметрии мультитач-манипуляций;
//! у одной поверхности может быть много независимо настроенных слушателей.

pub mod config;
pub mod error;
pub mod events;
pub mod recognizer;
pub mod services;
pub mod utils;

pub use error::{RecognizerError, Result};
