//! Playback simulation: timeline, buffers, fill, selection and the engine tying them together

pub mod buffer_store;
pub mod controller;
pub mod engine;
pub mod fill;
pub mod scheduler;
pub mod selector;
pub mod timeline;

pub use buffer_store::BufferStore;
pub use controller::{PlaybackController, TickOutcome, TickProgress};
pub use engine::{EngineSnapshot, SimulationEngine};
pub use fill::{FillReport, FillSimulator};
pub use scheduler::{ScheduledTask, TaskControl};
pub use selector::{QualitySelector, Selection};
pub use timeline::Timeline;
