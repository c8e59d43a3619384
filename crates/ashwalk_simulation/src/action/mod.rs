//! Поведенческая машина персонажа: режимы, переходы, визуальная вертикаль.

pub mod state;
pub mod systems;

pub use state::{resolve_roll_direction, ActionState, ControllerTuning};
pub use systems::{action_fsm, update_render_offset};
