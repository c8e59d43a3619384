//! Движение: горизонтальная скорость, вертикальная ось, walk bob, facing.
//!
//! Экранная конвенция по вертикали: ось z растёт ВНИЗ, поэтому «в воздухе»
//! означает z_height < 0, а гравитация ПРИБАВЛЯЕТ к z_velocity. Земля — z = 0.

use bevy::prelude::*;

use super::input::INPUT_DEADZONE_SQ;

/// Горизонтальная скорость персонажа (мировые px/sec).
/// Симуляция пишет, интегратор (headless или engine-адаптер) читает.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PhysicsBody {
    pub velocity: Vec2,
}

/// Вертикальная ось (прыжки). Невидима для горизонтальной физики:
/// z_height влияет только на картинку через RenderOffset.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct VerticalMotion {
    /// 0 на земле, отрицательная в воздухе (экранная конвенция)
    pub z_height: f32,
    /// px/sec, отрицательная — движение вверх
    pub z_velocity: f32,
}

impl VerticalMotion {
    /// Старт прыжка: мгновенный импульс вверх.
    pub fn launch(&mut self, jump_force: f32) {
        self.z_velocity = -jump_force;
    }

    /// Один шаг Euler-интеграции. Возвращает true при приземлении
    /// (z зажат в 0, z_velocity обнулена).
    pub fn integrate(&mut self, gravity: f32, delta: f32) -> bool {
        self.z_velocity += gravity * delta;
        self.z_height += self.z_velocity * delta;
        if self.z_height >= 0.0 {
            self.z_height = 0.0;
            self.z_velocity = 0.0;
            return true;
        }
        false
    }

    pub fn is_grounded(&self) -> bool {
        self.z_height >= 0.0
    }
}

/// Синусоидальный walk bob. Фаза тикает только в Move,
/// в остальных состояниях сбрасывается в 0.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct WalkBob {
    pub phase: f32,
    pub frequency: f32,
    pub amplitude: f32,
}

impl Default for WalkBob {
    fn default() -> Self {
        Self {
            phase: 0.0,
            frequency: 10.0,
            amplitude: 3.0,
        }
    }
}

impl WalkBob {
    pub fn advance(&mut self, delta: f32) {
        self.phase += delta * self.frequency;
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Вклад bob в визуальный офсет. Всегда <= 0: спрайт поднимается
    /// над якорем, но никогда не проседает под него.
    pub fn offset(&self) -> f32 {
        -(self.phase.sin() * self.amplitude).abs()
    }
}

/// Итоговый вертикальный сдвиг спрайта относительно мирового якоря.
/// Рендер читает, симуляция пишет (z_height + bob).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct RenderOffset {
    pub y: f32,
}

/// Куда смотрит персонаж (4 стороны изометрического спрайта).
/// Обновляется только при ненулевом вводе — при отпускании стика
/// персонаж продолжает смотреть туда же.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum Facing {
    North,
    #[default]
    South,
    East,
    West,
}

impl Facing {
    /// Facing из сырого (до-изометрического) ввода. None — ввод в deadzone.
    /// Ничья |x| == |y| уходит в горизонталь: спрайты East/West читаются
    /// лучше на диагоналях.
    pub fn from_input(dir: Vec2) -> Option<Facing> {
        if dir.length_squared() <= INPUT_DEADZONE_SQ {
            return None;
        }
        Some(if dir.x.abs() >= dir.y.abs() {
            if dir.x > 0.0 {
                Facing::East
            } else {
                Facing::West
            }
        } else if dir.y > 0.0 {
            // Экранная вертикаль растёт вниз: +y значит «к камере»
            Facing::South
        } else {
            Facing::North
        })
    }
}
