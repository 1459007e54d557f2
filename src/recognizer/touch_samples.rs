use std::collections::BTreeMap;
use std::fmt;

/// Гистограмма: число одновременных касаний -> сколько кадров оно наблюдалось
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchHistogram {
    buckets: BTreeMap<u32, u32>,
}

impl TouchHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn occurrences(&self, touch_count: u32) -> u32 {
        self.buckets.get(&touch_count).copied().unwrap_or(0)
    }

    pub fn total_samples(&self) -> u32 {
        self.buckets.values().sum()
    }

    /// Пары (число касаний, частота) по возрастанию числа касаний
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.buckets.iter().map(|(count, occurrences)| (*count, *occurrences))
    }

    fn record(&mut self, touch_count: u32) {
        *self.buckets.entry(touch_count).or_insert(0) += 1;
    }

    fn clear(&mut self) {
        self.buckets.clear();
    }
}

impl FromIterator<(u32, u32)> for TouchHistogram {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self {
            buckets: iter.into_iter().filter(|(_, occurrences)| *occurrences > 0).collect(),
        }
    }
}

impl fmt::Display for TouchHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(count, occurrences)| format!("{}:{}", count, occurrences))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Накопитель отсчётов касаний для одной поверхности.
///
/// Сбрасывается ровно один раз за сессию, в момент её начала; снимок после завершения
/// остаётся доступным до следующего старта.
#[derive(Debug, Default)]
pub struct TouchSampleAggregator {
    histogram: TouchHistogram,
    sessions_started: u64,
}

impl TouchSampleAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_session(&mut self) {
        self.histogram.clear();
        self.sessions_started += 1;
    }

    /// Возвращает `false`, если отсчёт без касаний (инерция) был пропущен.
    /// Сессия, в которой были только такие кадры, тоже даёт отсутствующий модификатор.
    pub fn record_sample(&mut self, touch_count: u32) -> bool {
        if touch_count == 0 {
            return false;
        }
        self.histogram.record(touch_count);
        true
    }

    pub fn snapshot(&self) -> TouchHistogram {
        self.histogram.clone()
    }

    pub fn sessions_started(&self) -> u64 {
        self.sessions_started
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creates_and_increments_buckets() {
        let mut aggregator = TouchSampleAggregator::new();
        aggregator.start_session();
        aggregator.record_sample(2);
        aggregator.record_sample(2);
        aggregator.record_sample(1);

        let histogram = aggregator.snapshot();
        assert_eq!(histogram.occurrences(2), 2);
        assert_eq!(histogram.occurrences(1), 1);
        assert_eq!(histogram.occurrences(3), 0);
        assert_eq!(histogram.total_samples(), 3);
        assert_eq!(histogram.to_string(), "{1:1, 2:2}");
    }

    #[test]
    fn test_start_session_clears_previous_samples() {
        let mut aggregator = TouchSampleAggregator::new();
        aggregator.start_session();
        aggregator.record_sample(3);
        let first = aggregator.snapshot();

        aggregator.start_session();
        assert!(aggregator.snapshot().is_empty());
        // снимок не зависит от дальнейших изменений
        assert_eq!(first.occurrences(3), 1);
        assert_eq!(aggregator.sessions_started(), 2);
    }

    #[test]
    fn test_zero_touch_samples_are_skipped() {
        let mut aggregator = TouchSampleAggregator::new();
        aggregator.start_session();
        assert!(!aggregator.record_sample(0));
        assert!(aggregator.snapshot().is_empty());
    }

    #[test]
    fn test_histogram_from_iter_drops_empty_buckets() {
        let histogram: TouchHistogram = [(1, 0), (2, 4)].into_iter().collect();
        assert_eq!(histogram.iter().collect::<Vec<_>>(), vec![(2, 4)]);
    }
}
