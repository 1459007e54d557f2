pub mod gesture;
pub mod manipulation;

pub use gesture::{FingerModifier, Gesture, GestureTarget, ModifierTarget};
pub use manipulation::{ManipulationEvent, SurfaceId, Vector};
