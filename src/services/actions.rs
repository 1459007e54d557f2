use crate::config::ListenerSpec;
use crate::events::Gesture;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Действие, которое выполняет сработавший слушатель
pub trait ActionInvoker: Send + Sync {
    fn invoke(&self, gesture: Gesture);
}

/// Просто пишет распознанный жест в лог
pub struct LogAction {
    listener: String,
}

impl LogAction {
    pub fn new(listener: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
        }
    }
}

impl ActionInvoker for LogAction {
    fn invoke(&self, gesture: Gesture) {
        info!("[{}] жест: {}", self.listener, gesture);
    }
}

/// Запускает команду оболочки; жест передаётся через переменные окружения
pub struct CommandAction {
    listener: String,
    command: String,
    dry_run: bool,
}

impl CommandAction {
    pub fn new(listener: impl Into<String>, command: impl Into<String>, dry_run: bool) -> Self {
        Self {
            listener: listener.into(),
            command: command.into(),
            dry_run,
        }
    }

    fn build_command(&self, gesture: Gesture) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&self.command)
            .env("GESTURE", gesture.as_str())
            .env("GESTURE_LISTENER", &self.listener);
        command
    }
}

impl ActionInvoker for CommandAction {
    fn invoke(&self, gesture: Gesture) {
        if self.dry_run {
            info!("[DRY RUN] [{}] {} -> `{}`", self.listener, gesture, self.command);
            return;
        }

        match self.build_command(gesture).spawn() {
            Ok(mut child) => {
                debug!("[{}] запущена команда `{}` (pid {})", self.listener, self.command, child.id());
                // Не блокируем поток рассылки, но и не оставляем зомби
                let listener = self.listener.clone();
                std::thread::spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        error!("[{}] команда завершилась с кодом {}", listener, status);
                    }
                    Ok(_) => {}
                    Err(e) => error!("[{}] не удалось дождаться команды: {}", listener, e),
                });
            }
            Err(e) => {
                error!("[{}] не удалось запустить `{}`: {}", self.listener, self.command, e);
            }
        }
    }
}

/// Собрать действия для слушателя из конфигурации
pub fn build_actions(spec: &ListenerSpec, dry_run: bool) -> Vec<Arc<dyn ActionInvoker>> {
    match &spec.command {
        Some(command) => vec![Arc::new(CommandAction::new(&spec.name, command, dry_run)) as Arc<dyn ActionInvoker>],
        None => vec![Arc::new(LogAction::new(&spec.name)) as Arc<dyn ActionInvoker>],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_environment() {
        let action = CommandAction::new("swipes", "echo $GESTURE", false);
        let command = action.build_command(Gesture::SwipeLeft);

        let envs: Vec<_> = command
            .get_envs()
            .map(|(key, value)| (key.to_owned(), value.map(|v| v.to_owned())))
            .collect();
        assert!(envs.contains(&("GESTURE".into(), Some("swipe_left".into()))));
        assert!(envs.contains(&("GESTURE_LISTENER".into(), Some("swipes".into()))));
        assert_eq!(command.get_program(), "sh");
    }

    #[test]
    fn test_build_actions_picks_kind() {
        let mut spec = ListenerSpec::named("logger");
        assert_eq!(build_actions(&spec, false).len(), 1);

        spec.command = Some("true".to_string());
        let actions = build_actions(&spec, true);
        assert_eq!(actions.len(), 1);
        // dry-run ничего не запускает
        actions[0].invoke(Gesture::Tap);
    }
}
