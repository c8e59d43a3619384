//! ECS компоненты симуляции, сгруппированные по доменам.

pub mod actor;
pub mod input;
pub mod motion;

// Реэкспорт для удобства (use crate::components::*)
pub use actor::*;
pub use input::*;
pub use motion::*;
