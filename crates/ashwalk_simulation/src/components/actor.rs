//! Персонаж и его ресурсы: health, stamina с exhaustion-гистерезисом,
//! таблица стоимостей действий.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::action::{ActionState, ControllerTuning};

use super::input::PlayerInput;
use super::motion::{Facing, PhysicsBody, RenderOffset, VerticalMotion, WalkBob};

/// Маркер управляемого персонажа. Required components добавляются
/// автоматически при spawn — достаточно заспавнить сам маркер и Transform.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    Health,
    Stamina,
    ActionState,
    PhysicsBody,
    VerticalMotion,
    WalkBob,
    Facing,
    RenderOffset,
    PlayerInput,
    Appearance,
    ControllerTuning
)]
pub struct PlayerCharacter;

/// Здоровье. Целочисленное, с насыщением на нуле.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current = (self.current + amount).min(self.max);
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }
}

/// Доля от max, до которой надо отрегениться, чтобы выйти из exhaustion.
pub const EXHAUSTION_CLEAR_FRACTION: f32 = 0.15;

/// Stamina с гистерезисом: на нуле ставится exhausted и держится,
/// пока пул не восстановится до 15% max. Без этого персонаж дребезжит
/// sprint/не-sprint на границе нуля.
///
/// Латч обновляет только FSM (в Move-ветке): try_deduct для jump/roll
/// гистерезис не трогает, их гейтит сама цена.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
    /// units/sec
    pub regen_rate: f32,
    pub exhausted: bool,
}

impl Default for Stamina {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Stamina {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            max,
            regen_rate: 10.0,
            exhausted: false,
        }
    }

    /// Разовая оплата (jump, roll). Атомарно: либо хватает и списываем,
    /// либо пул не тронут и возвращаем false.
    pub fn try_deduct(&mut self, cost: f32) -> bool {
        if self.current >= cost {
            self.current -= cost;
            true
        } else {
            false
        }
    }

    /// Непрерывный расход (sprint), зажат на нуле.
    pub fn drain(&mut self, per_sec: f32, delta: f32) {
        self.current = (self.current - per_sec * delta).max(0.0);
    }

    /// Регенерация, зажата на max.
    pub fn regen(&mut self, delta: f32) {
        self.current = (self.current + self.regen_rate * delta).min(self.max);
    }

    /// Шаг гистерезиса: вход в exhaustion на нуле, выход на >= 15% max.
    /// Порог сравниваем по доле, не по произведению: max * 0.15 в f32
    /// округляется чуть выше 15.0, и ровно 15% не снимал бы латч.
    pub fn update_exhaustion(&mut self) {
        if self.current <= 0.0 {
            self.exhausted = true;
        } else if self.exhausted && self.fraction() >= EXHAUSTION_CLEAR_FRACTION {
            self.exhausted = false;
        }
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

/// Таблица стоимостей. Один источник правды для FSM;
/// адаптер может подменить при старте (serde override из конфига).
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActionCosts {
    /// units/sec удержания sprint
    pub sprint_per_sec: f32,
    /// разовая цена прыжка
    pub jump: f32,
    /// разовая цена переката (и каждого звена цепочки)
    pub roll: f32,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            sprint_per_sec: 20.0,
            jump: 15.0,
            roll: 15.0,
        }
    }
}

/// Визуальный пресет персонажа — что рендерить. Симуляции важен только
/// как снапшот для ghost trail, содержимое расшифровывает адаптер.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct Appearance {
    pub sprite_path: String,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            sprite_path: "res://actors/ashwalker.tscn".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_take_damage() {
        let mut health = Health::new(100);
        health.take_damage(30);
        assert_eq!(health.current, 70);
        assert!(health.is_alive());
    }

    #[test]
    fn test_health_saturates_at_zero() {
        let mut health = Health::new(50);
        health.take_damage(200);
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_health_heal_clamped() {
        let mut health = Health::new(100);
        health.take_damage(40);
        health.heal(100);
        assert_eq!(health.current, 100);
    }

    #[test]
    fn test_try_deduct_success() {
        let mut stamina = Stamina::new(100.0);
        assert!(stamina.try_deduct(15.0));
        assert!((stamina.current - 85.0).abs() < 0.001);
    }

    #[test]
    fn test_try_deduct_insufficient_leaves_pool() {
        // 10 stamina < цена 15: отказ, пул не тронут
        let mut stamina = Stamina::new(100.0);
        stamina.current = 10.0;
        assert!(!stamina.try_deduct(15.0));
        assert!((stamina.current - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_drain_clamps_at_zero() {
        let mut stamina = Stamina::new(100.0);
        stamina.current = 0.2;
        stamina.drain(20.0, 0.1); // 2.0 за шаг
        assert_eq!(stamina.current, 0.0);
    }

    #[test]
    fn test_regen_clamps_at_max() {
        let mut stamina = Stamina::new(100.0);
        stamina.current = 99.9;
        stamina.regen(1.0);
        assert_eq!(stamina.current, 100.0);
    }

    #[test]
    fn test_exhaustion_hysteresis() {
        let mut stamina = Stamina::new(100.0);

        // Высадили в ноль -> exhausted
        stamina.current = 0.0;
        stamina.update_exhaustion();
        assert!(stamina.exhausted);

        // 5% недостаточно для выхода
        stamina.current = 5.0;
        stamina.update_exhaustion();
        assert!(stamina.exhausted);

        // 14.9% всё ещё мало
        stamina.current = 14.9;
        stamina.update_exhaustion();
        assert!(stamina.exhausted);

        // 15% — порог выхода
        stamina.current = 15.0;
        stamina.update_exhaustion();
        assert!(!stamina.exhausted);
    }

    #[test]
    fn test_exhaustion_clears_at_exact_threshold() {
        // Ровно 15% обязаны снимать латч: сравнение по произведению
        // (max * 0.15) в f32 давало 15.000000596 и держало латч вечно.
        // Проверяем на разных max с точной долей 15/100
        for (max, current) in [(100.0, 15.0), (80.0, 12.0), (40.0, 6.0)] {
            let mut stamina = Stamina::new(max);
            stamina.current = 0.0;
            stamina.update_exhaustion();
            assert!(stamina.exhausted);

            stamina.current = current;
            stamina.update_exhaustion();
            assert!(!stamina.exhausted, "порог не взят при max = {}", max);
        }
    }

    #[test]
    fn test_exhaustion_not_set_above_zero() {
        // Гистерезис несимметричен: вход только на нуле
        let mut stamina = Stamina::new(100.0);
        stamina.current = 3.0;
        stamina.update_exhaustion();
        assert!(!stamina.exhausted);
    }

    #[test]
    fn test_costs_default_table() {
        let costs = ActionCosts::default();
        assert_eq!(costs.sprint_per_sec, 20.0);
        assert_eq!(costs.jump, 15.0);
        assert_eq!(costs.roll, 15.0);
    }
}
