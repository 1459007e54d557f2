use crate::events::{ManipulationEvent, Vector};
use smallvec::SmallVec;

// Коды событий из linux/input-event-codes.h
pub const EV_SYN: u16 = 0x00;
pub const EV_ABS: u16 = 0x03;
pub const SYN_REPORT: u16 = 0x00;
pub const ABS_MT_SLOT: u16 = 0x2f;
pub const ABS_MT_POSITION_X: u16 = 0x35;
pub const ABS_MT_POSITION_Y: u16 = 0x36;
pub const ABS_MT_TRACKING_ID: u16 = 0x39;

const MAX_SLOTS: usize = 10;

pub type TrackerOutput = SmallVec<[ManipulationEvent; 2]>;

#[derive(Debug, Clone, Copy, Default)]
struct Contact {
    x: f64,
    y: f64,
}

/// Превращает сырые события протокола multi-touch (type B) в события манипуляции.
///
/// Кадр завершается SYN_REPORT. Первый кадр с касаниями начинает сессию, кадр без
/// касаний её завершает. Пока число касаний не меняется, смещение центра масс
/// накапливается в translation, а скорость считается в пикселях за миллисекунду.
/// Скорость - последний шаг центра масс, делённый на время от его начала до текущего
/// кадра: пока палец стоит (и в кадре отрыва), она убывает к нулю.
/// Кадр со сменой числа касаний только переносит опорную точку.
#[derive(Debug)]
pub struct ContactTracker {
    units_per_pixel: f64,
    // ядро может не повторять координаты для нового касания в том же слоте
    positions: [Contact; MAX_SLOTS],
    active: [bool; MAX_SLOTS],
    current_slot: usize,
    session: Option<Session>,
}

#[derive(Debug)]
struct Session {
    translation: Vector,
    velocity: Vector,
    anchor: Vector,
    anchor_time_ms: f64,
    touch_count: u32,
    last_step: Vector,
    last_step_start_ms: f64,
}

impl Session {
    fn settle_velocity(&mut self, time_ms: f64) {
        let elapsed_ms = time_ms - self.last_step_start_ms;
        if self.last_step != Vector::ZERO && elapsed_ms > 0.0 {
            self.velocity = Vector::new(self.last_step.x / elapsed_ms, self.last_step.y / elapsed_ms);
        }
    }
}

impl ContactTracker {
    pub fn new(units_per_pixel: f64) -> Self {
        Self {
            units_per_pixel,
            positions: [Contact::default(); MAX_SLOTS],
            active: [false; MAX_SLOTS],
            current_slot: 0,
            session: None,
        }
    }

    pub fn in_session(&self) -> bool {
        self.session.is_some()
    }

    /// Обработать одно сырое событие; `time_ms` - метка времени события в миллисекундах
    pub fn feed(&mut self, event_type: u16, code: u16, value: i32, time_ms: f64) -> TrackerOutput {
        match (event_type, code) {
            (EV_ABS, ABS_MT_SLOT) => {
                // слоты за пределами MAX_SLOTS игнорируются
                self.current_slot = usize::try_from(value).unwrap_or(MAX_SLOTS);
            }
            (EV_ABS, ABS_MT_TRACKING_ID) => {
                if let Some(active) = self.active.get_mut(self.current_slot) {
                    *active = value >= 0;
                }
            }
            (EV_ABS, ABS_MT_POSITION_X) => {
                if let Some(contact) = self.positions.get_mut(self.current_slot) {
                    contact.x = f64::from(value);
                }
            }
            (EV_ABS, ABS_MT_POSITION_Y) => {
                if let Some(contact) = self.positions.get_mut(self.current_slot) {
                    contact.y = f64::from(value);
                }
            }
            (EV_SYN, SYN_REPORT) => return self.finish_frame(time_ms),
            _ => {}
        }
        TrackerOutput::new()
    }

    fn finish_frame(&mut self, time_ms: f64) -> TrackerOutput {
        let mut output = TrackerOutput::new();
        let contacts: SmallVec<[Contact; MAX_SLOTS]> = self
            .positions
            .iter()
            .zip(self.active.iter())
            .filter(|(_, active)| **active)
            .map(|(contact, _)| *contact)
            .collect();
        let touch_count = contacts.len() as u32;

        if touch_count == 0 {
            if let Some(mut session) = self.session.take() {
                session.settle_velocity(time_ms);
                output.push(ManipulationEvent::completed(session.translation, session.velocity));
            }
            return output;
        }

        let centroid = self.centroid(&contacts);
        match self.session.as_mut() {
            None => {
                self.session = Some(Session {
                    translation: Vector::ZERO,
                    velocity: Vector::ZERO,
                    anchor: centroid,
                    anchor_time_ms: time_ms,
                    touch_count,
                    last_step: Vector::ZERO,
                    last_step_start_ms: time_ms,
                });
                output.push(ManipulationEvent::Started);
            }
            Some(session) if session.touch_count != touch_count => {
                session.anchor = centroid;
                session.anchor_time_ms = time_ms;
                session.touch_count = touch_count;
                session.settle_velocity(time_ms);
            }
            Some(session) => {
                let step = centroid - session.anchor;
                if step == Vector::ZERO {
                    session.settle_velocity(time_ms);
                } else {
                    session.translation = session.translation + step;
                    session.last_step = step;
                    session.last_step_start_ms = session.anchor_time_ms;
                    session.settle_velocity(time_ms);
                    session.anchor = centroid;
                    session.anchor_time_ms = time_ms;
                    output.push(ManipulationEvent::delta(touch_count));
                }
            }
        }
        output
    }

    fn centroid(&self, contacts: &[Contact]) -> Vector {
        let count = contacts.len() as f64;
        let (sum_x, sum_y) = contacts
            .iter()
            .fold((0.0, 0.0), |(x, y), contact| (x + contact.x, y + contact.y));
        Vector::new(sum_x / count, sum_y / count).scaled(1.0 / self.units_per_pixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Тестовый помощник: пишет кадры в трекер и собирает результат
    struct Frames {
        tracker: ContactTracker,
        time: f64,
        events: Vec<ManipulationEvent>,
    }

    impl Frames {
        fn new(units_per_pixel: f64) -> Self {
            Self {
                tracker: ContactTracker::new(units_per_pixel),
                time: 0.0,
                events: Vec::new(),
            }
        }

        fn abs(&mut self, code: u16, value: i32) -> &mut Self {
            let out = self.tracker.feed(EV_ABS, code, value, self.time);
            self.events.extend(out);
            self
        }

        fn touch(&mut self, slot: i32, tracking_id: i32, x: i32, y: i32) -> &mut Self {
            self.abs(ABS_MT_SLOT, slot)
                .abs(ABS_MT_TRACKING_ID, tracking_id)
                .abs(ABS_MT_POSITION_X, x)
                .abs(ABS_MT_POSITION_Y, y)
        }

        fn move_to(&mut self, slot: i32, x: i32, y: i32) -> &mut Self {
            self.abs(ABS_MT_SLOT, slot).abs(ABS_MT_POSITION_X, x).abs(ABS_MT_POSITION_Y, y)
        }

        fn lift(&mut self, slot: i32) -> &mut Self {
            self.abs(ABS_MT_SLOT, slot).abs(ABS_MT_TRACKING_ID, -1)
        }

        fn sync(&mut self, advance_ms: f64) -> &mut Self {
            self.time += advance_ms;
            let out = self.tracker.feed(EV_SYN, SYN_REPORT, 0, self.time);
            self.events.extend(out);
            self
        }
    }

    #[test]
    fn test_stationary_tap_has_no_deltas() {
        let mut frames = Frames::new(1.0);
        frames.touch(0, 1, 100, 100).sync(0.0).sync(10.0).lift(0).sync(10.0);

        assert_eq!(
            frames.events,
            vec![
                ManipulationEvent::Started,
                ManipulationEvent::completed(Vector::ZERO, Vector::ZERO),
            ]
        );
        assert!(!frames.tracker.in_session());
    }

    #[test]
    fn test_single_finger_swipe() {
        let mut frames = Frames::new(1.0);
        frames
            .touch(0, 7, 100, 100)
            .sync(0.0)
            .move_to(0, 150, 100)
            .sync(10.0)
            .move_to(0, 200, 110)
            .sync(10.0)
            .lift(0)
            .sync(10.0);

        assert_eq!(frames.events.len(), 4);
        assert_eq!(frames.events[1], ManipulationEvent::delta(1));
        assert_eq!(frames.events[2], ManipulationEvent::delta(1));
        match frames.events[3] {
            ManipulationEvent::Completed { translation, velocity } => {
                assert_eq!(translation, Vector::new(100.0, 10.0));
                // последний шаг (50, 10) начался за 20 мс до отрыва
                assert_eq!(velocity, Vector::new(2.5, 0.5));
            }
            other => panic!("ожидалось completed, получено {:?}", other),
        }
    }

    #[test]
    fn test_second_finger_reanchors_without_jump() {
        let mut frames = Frames::new(1.0);
        frames
            .touch(0, 1, 100, 100)
            .sync(0.0)
            .touch(1, 2, 300, 100)
            .sync(10.0)
            .move_to(0, 100, 150)
            .move_to(1, 300, 150)
            .sync(10.0)
            .lift(0)
            .lift(1)
            .sync(10.0);

        assert_eq!(
            frames.events,
            vec![
                ManipulationEvent::Started,
                ManipulationEvent::delta(2),
                ManipulationEvent::completed(Vector::new(0.0, 50.0), Vector::new(0.0, 2.5)),
            ]
        );
    }

    #[test]
    fn test_units_are_scaled_to_pixels() {
        let mut frames = Frames::new(2.0);
        frames.touch(0, 1, 0, 0).sync(0.0).move_to(0, 200, 0).sync(20.0).lift(0).sync(5.0);

        assert_eq!(
            frames.events.last(),
            Some(&ManipulationEvent::completed(Vector::new(100.0, 0.0), Vector::new(4.0, 0.0)))
        );
    }

    #[test]
    fn test_velocity_fades_while_finger_rests() {
        let mut frames = Frames::new(1.0);
        frames.touch(0, 1, 100, 100).sync(0.0).move_to(0, 160, 100).sync(10.0);
        for _ in 0..200 {
            frames.sync(10.0);
        }
        frames.lift(0).sync(10.0);

        match frames.events.last() {
            Some(ManipulationEvent::Completed { translation, velocity }) => {
                assert_eq!(*translation, Vector::new(60.0, 0.0));
                assert!(velocity.length() < 0.1, "скорость после паузы: {:?}", velocity);
            }
            other => panic!("ожидалось completed, получено {:?}", other),
        }
    }

    #[test]
    fn test_velocity_fades_at_lift_without_rest_frames() {
        let mut frames = Frames::new(1.0);
        frames.touch(0, 1, 0, 0).sync(0.0).move_to(0, 60, 0).sync(10.0).lift(0).sync(1990.0);

        assert_eq!(
            frames.events.last(),
            Some(&ManipulationEvent::completed(Vector::new(60.0, 0.0), Vector::new(0.03, 0.0)))
        );
    }

    #[test]
    fn test_out_of_range_slot_is_ignored() {
        let mut frames = Frames::new(1.0);
        frames.touch(42, 1, 10, 10).sync(0.0);
        assert!(frames.events.is_empty());
        assert!(!frames.tracker.in_session());
    }
}
