//! Состояния поведенческой машины персонажа.
//!
//! Один режим в каждый момент времени. Данные, живущие только внутри
//! режима (таймер переката, его направление, очередь), лежат в payload
//! варианта — вне режима их структурно не существует.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Направление короче этого считается вырожденным (нельзя нормализовать).
const MIN_DIR_LEN_SQ: f32 = 1e-6;

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum ActionState {
    Idle,
    Move,
    Jump,
    /// Неуправляемый рывок. direction зафиксировано на входе,
    /// queued — одноместный буфер на следующий перекат.
    Roll {
        timer: f32,
        direction: Vec2,
        queued: bool,
    },
    /// Пока никто сюда не переходит: зарезервировано под пост-ролл
    /// окно уязвимости, если перекат станет слишком сильным.
    Recovery { timer: f32 },
    /// Заглушка под боевую ветку (оружейные тайминги живут в адаптере).
    Attack,
    /// Заглушка под блок.
    Block,
}

impl Default for ActionState {
    fn default() -> Self {
        ActionState::Idle
    }
}

impl ActionState {
    /// I-frames: перекат неуязвим на всей длительности.
    pub fn is_invincible(&self) -> bool {
        matches!(self, ActionState::Roll { .. })
    }

    /// Короткое имя для логов.
    pub fn name(&self) -> &'static str {
        match self {
            ActionState::Idle => "Idle",
            ActionState::Move => "Move",
            ActionState::Jump => "Jump",
            ActionState::Roll { .. } => "Roll",
            ActionState::Recovery { .. } => "Recovery",
            ActionState::Attack => "Attack",
            ActionState::Block => "Block",
        }
    }
}

/// Направление переката: удерживаемый ввод (уже в iso-осях) приоритетнее,
/// иначе берём текущий импульс. Ни того ни другого — переката не будет
/// (None), перекат на месте запрещён.
pub fn resolve_roll_direction(iso_dir: Vec2, momentum: Vec2) -> Option<Vec2> {
    if iso_dir.length_squared() > MIN_DIR_LEN_SQ {
        return Some(iso_dir.normalize());
    }
    if momentum.length_squared() > MIN_DIR_LEN_SQ {
        return Some(momentum.normalize());
    }
    None
}

/// Параметры контроллера. Компонент на персонаже: разные акторы могут
/// иметь разные значения, адаптер может грузить overrides через serde.
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct ControllerTuning {
    /// px/sec базовой ходьбы
    pub base_speed: f32,
    /// множитель sprint
    pub sprint_multiplier: f32,
    /// px/sec^2 торможения в Idle
    pub idle_deceleration: f32,
    /// стартовый импульс прыжка, px/sec
    pub jump_force: f32,
    /// px/sec^2, прибавляется к z_velocity (экранная конвенция)
    pub gravity: f32,
    /// px/sec рывка переката
    pub roll_speed: f32,
    /// сек одного переката
    pub roll_duration: f32,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            base_speed: 120.0,
            sprint_multiplier: 1.6,
            idle_deceleration: 600.0,
            jump_force: 320.0,
            gravity: 980.0,
            roll_speed: 260.0,
            roll_duration: 0.4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(ActionState::default(), ActionState::Idle);
    }

    #[test]
    fn test_only_roll_is_invincible() {
        assert!(ActionState::Roll {
            timer: 0.4,
            direction: Vec2::X,
            queued: false
        }
        .is_invincible());

        assert!(!ActionState::Idle.is_invincible());
        assert!(!ActionState::Move.is_invincible());
        assert!(!ActionState::Jump.is_invincible());
        assert!(!ActionState::Attack.is_invincible());
        assert!(!ActionState::Block.is_invincible());
        assert!(!ActionState::Recovery { timer: 0.2 }.is_invincible());
    }

    #[test]
    fn test_roll_direction_prefers_input() {
        // Ввод и импульс в разные стороны — побеждает ввод
        let dir = resolve_roll_direction(Vec2::new(0.0, 2.0), Vec2::new(5.0, 0.0)).unwrap();
        assert!((dir - Vec2::new(0.0, 1.0)).length() < 0.001);
    }

    #[test]
    fn test_roll_direction_falls_back_to_momentum() {
        let dir = resolve_roll_direction(Vec2::ZERO, Vec2::new(-3.0, 0.0)).unwrap();
        assert!((dir - Vec2::new(-1.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_roll_direction_normalized() {
        let dir = resolve_roll_direction(Vec2::new(3.0, 4.0), Vec2::ZERO).unwrap();
        assert!((dir.length() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_roll_direction_none_when_standing() {
        // Стоим на месте без ввода — переката нет
        assert_eq!(resolve_roll_direction(Vec2::ZERO, Vec2::ZERO), None);
    }
}
