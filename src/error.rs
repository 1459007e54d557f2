use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Ошибка воспроизведения трассы: {0}")]
    Replay(String),
}

impl RecognizerError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(RecognizerError::DeviceNotFound(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, RecognizerError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! recognizer_error {
    (device_not_found, $($arg:tt)*) => {
        $crate::error::RecognizerError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::RecognizerError::Permission(format!($($arg)*))
    };
    (replay, $($arg:tt)*) => {
        $crate::error::RecognizerError::Replay(format!($($arg)*))
    };
}
