use super::touch_samples::TouchHistogram;
use crate::events::FingerModifier;

/// Выбрать модификатор по самому частому числу касаний в сессии.
///
/// При равной частоте побеждает меньшее число касаний. Пустая гистограмма (например,
/// мгновенный tap без промежуточных кадров) модификатора не даёт.
pub fn resolve(histogram: &TouchHistogram) -> Option<FingerModifier> {
    histogram
        .iter()
        .fold(None, |best: Option<(u32, u32)>, (count, occurrences)| match best {
            Some((_, best_occurrences)) if best_occurrences >= occurrences => best,
            _ => Some((count, occurrences)),
        })
        .and_then(|(count, _)| FingerModifier::from_touch_count(count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(pairs: &[(u32, u32)]) -> TouchHistogram {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_empty_histogram_is_absent() {
        assert_eq!(resolve(&TouchHistogram::new()), None);
    }

    #[test]
    fn test_most_common_touch_count_wins() {
        assert_eq!(resolve(&histogram(&[(1, 2), (2, 5)])), Some(FingerModifier::TwoFingers));
        assert_eq!(resolve(&histogram(&[(3, 7), (1, 1)])), Some(FingerModifier::ThreeFingers));
    }

    #[test]
    fn test_tie_prefers_fewer_touches() {
        assert_eq!(resolve(&histogram(&[(3, 4), (2, 4)])), Some(FingerModifier::TwoFingers));
        assert_eq!(resolve(&histogram(&[(5, 1), (1, 1), (4, 1)])), Some(FingerModifier::OneFinger));
    }

    #[test]
    fn test_five_or_more_touches() {
        assert_eq!(resolve(&histogram(&[(7, 3)])), Some(FingerModifier::FiveFingers));
        assert_eq!(resolve(&histogram(&[(4, 2), (5, 3)])), Some(FingerModifier::FiveFingers));
    }
}
