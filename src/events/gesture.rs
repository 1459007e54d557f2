use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Распознаваемый жест
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    SwipeUp,
    SwipeDown,
    SwipeLeft,
    SwipeRight,
    Tap,
}

impl Gesture {
    pub const ALL: [Gesture; 5] = [
        Gesture::SwipeUp,
        Gesture::SwipeDown,
        Gesture::SwipeLeft,
        Gesture::SwipeRight,
        Gesture::Tap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::SwipeUp => "swipe_up",
            Gesture::SwipeDown => "swipe_down",
            Gesture::SwipeLeft => "swipe_left",
            Gesture::SwipeRight => "swipe_right",
            Gesture::Tap => "tap",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gesture::ALL
            .into_iter()
            .find(|gesture| gesture.as_str() == s)
            .ok_or_else(|| format!("Неизвестный жест: '{}'", s))
    }
}

/// Модификатор жеста: количество пальцев, которыми он выполнен
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerModifier {
    OneFinger,
    TwoFingers,
    ThreeFingers,
    FourFingers,
    FiveFingers,
}

impl FingerModifier {
    /// Пять и более касаний сводятся к `FiveFingers`, ноль касаний модификатора не даёт
    pub fn from_touch_count(touch_count: u32) -> Option<Self> {
        match touch_count {
            0 => None,
            1 => Some(FingerModifier::OneFinger),
            2 => Some(FingerModifier::TwoFingers),
            3 => Some(FingerModifier::ThreeFingers),
            4 => Some(FingerModifier::FourFingers),
            _ => Some(FingerModifier::FiveFingers),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FingerModifier::OneFinger => "one_finger",
            FingerModifier::TwoFingers => "two_fingers",
            FingerModifier::ThreeFingers => "three_fingers",
            FingerModifier::FourFingers => "four_fingers",
            FingerModifier::FiveFingers => "five_fingers",
        }
    }
}

impl fmt::Display for FingerModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Какие жесты интересуют слушателя
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GestureTarget {
    #[default]
    All,
    Only(Gesture),
}

impl FromStr for GestureTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(GestureTarget::All),
            other => other.parse().map(GestureTarget::Only),
        }
    }
}

impl TryFrom<String> for GestureTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GestureTarget> for String {
    fn from(target: GestureTarget) -> Self {
        target.to_string()
    }
}

impl fmt::Display for GestureTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureTarget::All => f.write_str("all"),
            GestureTarget::Only(gesture) => write!(f, "{}", gesture),
        }
    }
}

/// Какой модификатор требуется слушателю
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModifierTarget {
    Any,
    Exactly(FingerModifier),
}

impl Default for ModifierTarget {
    fn default() -> Self {
        ModifierTarget::Exactly(FingerModifier::OneFinger)
    }
}

impl ModifierTarget {
    /// `Any` принимает всё, включая отсутствующий модификатор
    pub fn accepts(&self, detected: Option<FingerModifier>) -> bool {
        match self {
            ModifierTarget::Any => true,
            ModifierTarget::Exactly(expected) => detected == Some(*expected),
        }
    }
}

impl FromStr for ModifierTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "any" {
            return Ok(ModifierTarget::Any);
        }
        (1..=5)
            .filter_map(FingerModifier::from_touch_count)
            .find(|modifier| modifier.as_str() == s)
            .map(ModifierTarget::Exactly)
            .ok_or_else(|| format!("Неизвестный модификатор: '{}'", s))
    }
}

impl TryFrom<String> for ModifierTarget {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModifierTarget> for String {
    fn from(target: ModifierTarget) -> Self {
        target.to_string()
    }
}

impl fmt::Display for ModifierTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierTarget::Any => f.write_str("any"),
            ModifierTarget::Exactly(modifier) => write!(f, "{}", modifier),
        }
    }
}
