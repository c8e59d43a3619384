//! Headless-физика: счётчик тиков и прямой интегратор скорости.
//!
//! В связке с движком horizontal displacement резолвит адаптер
//! (коллизии об геометрию уровня). Headless-режим и тесты интегрируют
//! скорость напрямую — мир без стен.

use bevy::prelude::*;

/// Номер текущего тика FixedUpdate. Инкрементится первым в цепочке,
/// так что все системы одного тика видят одно значение.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

pub fn begin_tick(mut tick: ResMut<SimTick>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// Euler-интеграция горизонтальной скорости в Transform.
/// Вертикаль сюда не попадает: z_height — экранная иллюзия, живёт
/// в RenderOffset и не двигает мировую позицию.
pub fn integrate_velocity(
    mut query: Query<(&crate::components::PhysicsBody, &mut Transform)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs().max(0.0);
    for (body, mut transform) in query.iter_mut() {
        transform.translation.x += body.velocity.x * delta;
        transform.translation.y += body.velocity.y * delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_wraps_without_panic() {
        let mut tick = SimTick(u64::MAX);
        tick.0 = tick.0.wrapping_add(1);
        assert_eq!(tick.0, 0);
    }
}
