//! Player input компоненты (протокол с engine-адаптером).
//!
//! Адаптер (Godot/SDL/скрипт теста) каждый кадр пишет сырой ввод в
//! `PlayerInput` на entity персонажа. Симуляция читает его в FixedUpdate
//! и НИКОГДА не трогает устройства ввода напрямую — это граница headless.

use bevy::prelude::*;

/// Стик/WASD ниже этого порога считается отпущенным (deadzone).
/// Порог на length_squared, чтобы не брать корень.
pub const INPUT_DEADZONE_SQ: f32 = 0.01;

/// Сырой ввод за текущий кадр. Edge-поля (jump/roll) адаптер выставляет
/// на один кадр и сбрасывает через `clear_edges()` после FixedUpdate.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    /// Направление движения в экранных осях (до изометрической проекции)
    pub move_dir: Vec2,
    /// Направление панорамирования камеры (pass-through в CameraSink)
    pub pan_dir: Vec2,
    /// Sprint удерживается
    pub sprint_held: bool,
    /// Jump нажат в этом кадре (edge)
    pub jump_pressed: bool,
    /// Roll нажат в этом кадре (edge)
    pub roll_pressed: bool,
}

impl PlayerInput {
    /// Ввод с защитой от мусора из адаптера (NaN от калибровки стика).
    pub fn sanitized_move_dir(&self) -> Vec2 {
        if self.move_dir.x.is_nan() || self.move_dir.y.is_nan() {
            return Vec2::ZERO;
        }
        self.move_dir
    }

    /// Сброс edge-полей. Зовёт адаптер после того, как тик их потребил.
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.roll_pressed = false;
    }
}

/// Направление выше deadzone?
pub fn dir_active(dir: Vec2) -> bool {
    dir.length_squared() > INPUT_DEADZONE_SQ
}

/// Изометрическая проекция ввода: экранные оси -> мировые оси 2:1 ромба.
///
/// iso = (x - y, (x + y) * 0.5)
///
/// Чистая функция без нормализации: длина результата зависит от направления,
/// это и даёт классическое «по диагонали экрана быстрее» изометрик-чувство.
/// Битово стабильна: одни входы -> одни биты на любой платформе.
pub fn iso_project(dir: Vec2) -> Vec2 {
    Vec2::new(dir.x - dir.y, (dir.x + dir.y) * 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_project_axes() {
        // Чистый «вправо» на экране -> вправо-вниз по ромбу
        assert_eq!(iso_project(Vec2::new(1.0, 0.0)), Vec2::new(1.0, 0.5));
        // Чистый «вниз» -> влево-вниз
        assert_eq!(iso_project(Vec2::new(0.0, 1.0)), Vec2::new(-1.0, 0.5));
        // Диагональ схлопывается в вертикаль ромба
        assert_eq!(iso_project(Vec2::new(1.0, 1.0)), Vec2::new(0.0, 1.0));
        // Ноль остаётся нулём
        assert_eq!(iso_project(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_iso_project_bit_stable() {
        // Повторный вызов с теми же входами обязан дать те же биты
        let samples = [
            Vec2::new(0.7071, -0.7071),
            Vec2::new(-0.333, 0.918),
            Vec2::new(1.0, 1.0),
            Vec2::new(-0.05, 0.0),
        ];
        for dir in samples {
            let a = iso_project(dir);
            let b = iso_project(dir);
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }
    }

    #[test]
    fn test_sanitized_move_dir_nan_guard() {
        let mut input = PlayerInput::default();
        input.move_dir = Vec2::new(f32::NAN, 0.5);
        assert_eq!(input.sanitized_move_dir(), Vec2::ZERO);

        input.move_dir = Vec2::new(0.3, -0.4);
        assert_eq!(input.sanitized_move_dir(), Vec2::new(0.3, -0.4));
    }

    #[test]
    fn test_clear_edges() {
        let mut input = PlayerInput {
            move_dir: Vec2::X,
            pan_dir: Vec2::Y,
            sprint_held: true,
            jump_pressed: true,
            roll_pressed: true,
        };
        input.clear_edges();
        // Edge-поля сброшены, удержания не тронуты
        assert!(!input.jump_pressed);
        assert!(!input.roll_pressed);
        assert!(input.sprint_held);
        assert_eq!(input.move_dir, Vec2::X);
    }

    #[test]
    fn test_dir_active_deadzone() {
        assert!(!dir_active(Vec2::ZERO));
        assert!(!dir_active(Vec2::new(0.05, 0.05)));
        assert!(dir_active(Vec2::new(0.2, 0.0)));
        assert!(dir_active(Vec2::new(-1.0, 1.0)));
    }
}
