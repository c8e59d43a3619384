//! Hit reception pipeline.
//!
//! Детектор попаданий живёт в engine-адаптере (hurtbox overlap, снаряды).
//! Адаптер шлёт `HurtboxHit`, симуляция решает, что удар значит:
//! i-frames переката, урон, knockback, смерть. События применяются
//! в порядке прихода, по одному за раз.

use bevy::prelude::*;

use crate::action::ActionState;
use crate::components::{Health, PhysicsBody};
use crate::logger::{log, log_warning};

/// Входящий удар от детектора адаптера.
#[derive(Event, Debug, Clone)]
pub struct HurtboxHit {
    pub target: Entity,
    pub damage: u32,
    /// Мировая скорость отброса (уже в iso-осях). Заменяет скорость цели,
    /// не складывается с ней.
    pub knockback: Vec2,
}

/// Явная неуязвимость поверх i-frames переката (бафф, катсцена).
/// Снимает тот, кто повесил.
#[derive(Component, Debug, Default)]
pub struct Invincible;

/// Персонаж мёртв: FSM и удары его больше не трогают.
/// Смертную анимацию и respawn разруливает адаптер.
#[derive(Component, Debug)]
pub struct Dead;

/// Наружу: health дошёл до нуля в этом тике.
#[derive(Event, Debug, Clone)]
pub struct CharacterDied {
    pub entity: Entity,
}

/// Применение ударов в порядке прихода. Каждое событие проходит полный
/// цикл: i-frame check → урон → knockback → death check. Повторные удары
/// вне переката применяются каждый раз — окно милосердия не выдаётся.
pub fn apply_hurtbox_hits(
    mut commands: Commands,
    mut hits: EventReader<HurtboxHit>,
    mut died: EventWriter<CharacterDied>,
    mut targets: Query<
        (
            &mut Health,
            &mut PhysicsBody,
            &ActionState,
            Option<&Invincible>,
        ),
        Without<Dead>,
    >,
) {
    for hit in hits.read() {
        let Ok((mut health, mut body, state, granted)) = targets.get_mut(hit.target) else {
            // Цель умерла/деспавнулась, пока событие летело
            log_warning(&format!(
                "💥 hit по несуществующей цели {:?} (damage {})",
                hit.target, hit.damage
            ));
            continue;
        };

        // Dead вешается отложенной командой: второй летальный удар того же
        // тика ещё видит цель в query. Отсекаем по health, иначе его
        // knockback перетёр бы заморозку трупа
        if !health.is_alive() {
            continue;
        }

        if state.is_invincible() || granted.is_some() {
            log(&format!(
                "🛡️ {:?}: hit поглощён i-frames (damage {})",
                hit.target, hit.damage
            ));
            continue;
        }

        health.take_damage(hit.damage);
        body.velocity = hit.knockback;
        log(&format!(
            "💥 {:?}: -{} HP ({}/{}), knockback {:.1?}",
            hit.target, hit.damage, health.current, health.max, hit.knockback
        ));

        if !health.is_alive() {
            body.velocity = Vec2::ZERO;
            commands.entity(hit.target).insert(Dead);
            died.write(CharacterDied { entity: hit.target });
            log(&format!("⚰️ {:?}: персонаж погиб", hit.target));
        }
    }
}
