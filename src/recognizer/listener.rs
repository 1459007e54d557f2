use super::classifier::TapDetection;
use crate::events::{FingerModifier, Gesture, GestureTarget, ModifierTarget};
use crate::services::actions::ActionInvoker;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Порог tap по умолчанию, подобран по наблюдениям за tap и swipe
pub const DEFAULT_TAP_THRESHOLD_PX: u32 = 40;

/// Слушатель жестов, привязанный к поверхности через [`GestureRegistry`](super::GestureRegistry)
pub trait GestureListener: Send + Sync {
    /// Имя для логов
    fn name(&self) -> &str;

    /// Снимок настроек. Реестр берёт его один раз на завершённую сессию и по нему же
    /// классифицирует жест.
    fn snapshot(&self) -> ListenerConfig;

    /// Вердикт для этого слушателя, посчитанный по снимку `config`.
    /// `modifier` равен `None`, если в сессии не было кадров с касаниями (обычно лёгкий tap).
    fn on_gesture(&self, gesture: Gesture, modifier: Option<FingerModifier>, config: &ListenerConfig);
}

/// Настройки одного слушателя
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListenerConfig {
    pub target_gesture: GestureTarget,
    pub tap_threshold_px: u32,
    pub use_velocity_for_tap: bool,
    pub target_modifier: ModifierTarget,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            target_gesture: GestureTarget::All,
            tap_threshold_px: DEFAULT_TAP_THRESHOLD_PX,
            use_velocity_for_tap: false,
            target_modifier: ModifierTarget::default(),
        }
    }
}

impl ListenerConfig {
    pub fn tap_detection(&self) -> TapDetection {
        TapDetection {
            threshold_px: f64::from(self.tap_threshold_px),
            use_velocity: self.use_velocity_for_tap,
        }
    }
}

/// Решить, должен ли слушатель с настройками `config` сработать на вердикт.
pub fn should_fire(config: &ListenerConfig, gesture: Gesture, modifier: Option<FingerModifier>) -> bool {
    match config.target_gesture {
        // любой жест с подходящим модификатором
        GestureTarget::All => config.target_modifier.accepts(modifier),
        // tap не порождает delta-кадров, поэтому отсутствующий модификатор тоже подходит
        GestureTarget::Only(Gesture::Tap) if gesture == Gesture::Tap => {
            modifier.is_none() || config.target_modifier.accepts(modifier)
        }
        GestureTarget::Only(expected) => expected == gesture && config.target_modifier.accepts(modifier),
    }
}

/// Слушатель, запускающий список действий при совпадении жеста
pub struct GestureTrigger {
    name: String,
    config: RwLock<ListenerConfig>,
    actions: Vec<Arc<dyn ActionInvoker>>,
}

impl GestureTrigger {
    pub fn new(name: impl Into<String>, config: ListenerConfig, actions: Vec<Arc<dyn ActionInvoker>>) -> Self {
        Self {
            name: name.into(),
            config: RwLock::new(config),
            actions,
        }
    }

    /// Настройки можно менять на лету, следующая сессия увидит новые значения
    pub fn update_config(&self, update: impl FnOnce(&mut ListenerConfig)) {
        update(&mut *self.config.write());
    }
}

impl GestureListener for GestureTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> ListenerConfig {
        *self.config.read()
    }

    fn on_gesture(&self, gesture: Gesture, modifier: Option<FingerModifier>, config: &ListenerConfig) {
        if !should_fire(config, gesture, modifier) {
            debug!(
                "'{}': жест {} ({:?}) не подходит под фильтр {}/{}",
                self.name, gesture, modifier, config.target_gesture, config.target_modifier
            );
            return;
        }

        info!("'{}': срабатывание на {} ({:?})", self.name, gesture, modifier);
        for action in &self.actions {
            action.invoke(gesture);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Действие, запоминающее все вызовы
    #[derive(Default)]
    pub(crate) struct RecordingAction {
        pub(crate) invoked: Mutex<Vec<Gesture>>,
    }

    impl ActionInvoker for RecordingAction {
        fn invoke(&self, gesture: Gesture) {
            self.invoked.lock().push(gesture);
        }
    }

    fn config(target_gesture: GestureTarget, target_modifier: ModifierTarget) -> ListenerConfig {
        ListenerConfig {
            target_gesture,
            target_modifier,
            ..ListenerConfig::default()
        }
    }

    const TWO: Option<FingerModifier> = Some(FingerModifier::TwoFingers);
    const ONE: Option<FingerModifier> = Some(FingerModifier::OneFinger);

    #[test]
    fn test_defaults() {
        let config = ListenerConfig::default();
        assert_eq!(config.target_gesture, GestureTarget::All);
        assert_eq!(config.tap_threshold_px, 40);
        assert!(!config.use_velocity_for_tap);
        assert_eq!(config.target_modifier, ModifierTarget::Exactly(FingerModifier::OneFinger));
    }

    #[test]
    fn test_all_gestures_with_modifier_filter() {
        let any = config(GestureTarget::All, ModifierTarget::Any);
        assert!(should_fire(&any, Gesture::SwipeLeft, None));
        assert!(should_fire(&any, Gesture::Tap, TWO));

        let two = config(GestureTarget::All, ModifierTarget::Exactly(FingerModifier::TwoFingers));
        assert!(should_fire(&two, Gesture::SwipeUp, TWO));
        assert!(!should_fire(&two, Gesture::SwipeUp, ONE));
        assert!(!should_fire(&two, Gesture::SwipeUp, None));
    }

    #[test]
    fn test_tap_accepts_absent_modifier() {
        let tap_two = config(
            GestureTarget::Only(Gesture::Tap),
            ModifierTarget::Exactly(FingerModifier::TwoFingers),
        );
        assert!(should_fire(&tap_two, Gesture::Tap, None));
        assert!(should_fire(&tap_two, Gesture::Tap, TWO));
        assert!(!should_fire(&tap_two, Gesture::Tap, ONE));
        assert!(!should_fire(&tap_two, Gesture::SwipeRight, TWO));
    }

    #[test]
    fn test_specific_swipe_requires_match() {
        let swipe = config(GestureTarget::Only(Gesture::SwipeRight), ModifierTarget::default());
        assert!(should_fire(&swipe, Gesture::SwipeRight, ONE));
        assert!(!should_fire(&swipe, Gesture::SwipeRight, None));
        assert!(!should_fire(&swipe, Gesture::SwipeLeft, ONE));

        let swipe_any = config(GestureTarget::Only(Gesture::SwipeRight), ModifierTarget::Any);
        assert!(should_fire(&swipe_any, Gesture::SwipeRight, None));
        assert!(!should_fire(&swipe_any, Gesture::Tap, None));
    }

    #[test]
    fn test_trigger_invokes_actions_only_on_match() {
        let action = Arc::new(RecordingAction::default());
        let trigger = GestureTrigger::new(
            "down",
            config(GestureTarget::Only(Gesture::SwipeDown), ModifierTarget::Any),
            vec![action.clone() as Arc<dyn ActionInvoker>],
        );

        let snapshot = trigger.snapshot();
        trigger.on_gesture(Gesture::SwipeUp, ONE, &snapshot);
        trigger.on_gesture(Gesture::SwipeDown, TWO, &snapshot);
        assert_eq!(*action.invoked.lock(), vec![Gesture::SwipeDown]);
    }

    #[test]
    fn test_filter_uses_dispatch_snapshot() {
        let action = Arc::new(RecordingAction::default());
        let trigger = GestureTrigger::new(
            "right",
            config(GestureTarget::Only(Gesture::SwipeRight), ModifierTarget::Any),
            vec![action.clone() as Arc<dyn ActionInvoker>],
        );

        let snapshot = trigger.snapshot();
        // настройки поменялись между классификацией и фильтром
        trigger.update_config(|config| config.target_gesture = GestureTarget::Only(Gesture::Tap));
        trigger.on_gesture(Gesture::SwipeRight, ONE, &snapshot);

        assert_eq!(*action.invoked.lock(), vec![Gesture::SwipeRight]);
        assert_eq!(trigger.snapshot().target_gesture, GestureTarget::Only(Gesture::Tap));
    }

    #[test]
    fn test_config_changes_apply_to_next_dispatch() {
        let trigger = GestureTrigger::new("live", ListenerConfig::default(), Vec::new());
        assert_eq!(trigger.snapshot().tap_detection(), TapDetection::by_threshold(40.0));

        trigger.update_config(|config| {
            config.tap_threshold_px = 15;
            config.use_velocity_for_tap = true;
        });
        let detection = trigger.snapshot().tap_detection();
        assert_eq!(detection.threshold_px, 15.0);
        assert!(detection.use_velocity);
    }
}
