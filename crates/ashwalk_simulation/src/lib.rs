//! ASHWALK Simulation Core
//!
//! Детерминированный контроллер персонажа для изометрической 2D-симуляции
//! на Bevy 0.16. Fixed timestep 60Hz, без рендера и ввода — всё внешнее
//! заходит через компоненты/события и выходит через sinks.
//!
//! HYBRID ARCHITECTURE:
//! - ECS = поведение (FSM, stamina, приём ударов, эффекты)
//! - Engine-адаптер = тактический слой (ввод с устройств, коллизии,
//!   рендер спрайтов, HUD)

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod action;
pub mod combat;
pub mod components;
pub mod effects;
pub mod logger;
pub mod physics;
pub mod sinks;

// Re-export для удобства (адаптеру хватает use ashwalk_simulation::*)
pub use action::{action_fsm, resolve_roll_direction, update_render_offset, ActionState, ControllerTuning};
pub use combat::{apply_hurtbox_hits, CharacterDied, Dead, HurtboxHit, Invincible};
pub use components::*;
pub use effects::{
    spawn_roll_ghosts, fade_roll_ghosts, ProceduralPalette, RollGhost, TerrainColorSource,
    TerrainPalette, GHOST_FADE_DURATION, GHOST_START_ALPHA, GHOST_TICK_INTERVAL,
};
pub use physics::{begin_tick, integrate_velocity, SimTick};
pub use sinks::{CameraSink, HudSink};

/// Частота симуляции. 60Hz — удобно считать интервалы кадрами.
pub const SIM_TICK_HZ: f64 = 60.0;

/// Seed по умолчанию, если хост не передал свой.
pub const DEFAULT_SEED: u64 = 42;

/// Главный plugin симуляции: ресурсы, события и вся цепочка тика.
///
/// Порядок систем в FixedUpdate жёсткий (chain): номер тика → камера →
/// FSM → интеграция → удары → эффекты → картинка/UI. Ввод адаптер пишет
/// ДО тика, выходы читает ПОСЛЕ.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIM_TICK_HZ))
            .init_resource::<DeterministicRng>()
            .init_resource::<SimTick>()
            .init_resource::<ActionCosts>()
            .add_event::<HurtboxHit>()
            .add_event::<CharacterDied>()
            .add_systems(Startup, sinks::check_collaborator_wiring)
            .add_systems(
                FixedUpdate,
                (
                    // Фаза 0: номер тика (все системы видят одно значение)
                    physics::begin_tick,
                    // Фаза 1: камера — не зависит от исхода FSM
                    sinks::forward_camera_pan,
                    // Фаза 2: контроллер (переходы, скорость, stamina)
                    action::action_fsm,
                    // Фаза 3: скорость -> позиция (headless, без коллизий)
                    physics::integrate_velocity,
                    // Фаза 4: входящие удары (после физики, до эффектов)
                    combat::apply_hurtbox_hits,
                    // Фаза 5: транзиентные эффекты
                    effects::spawn_roll_ghosts,
                    effects::fade_roll_ghosts,
                    // Фаза 6: визуальная вертикаль и HUD
                    action::update_render_offset,
                    sinks::sync_hud,
                )
                    .chain(),
            );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Minimal Bevy App для headless симуляции. SimulationPlugin хост
/// добавляет сам — так тесты могут вставить ресурсы до Startup.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Spawn персонажа: маркер + позиция, остальное досыпят
/// required components.
pub fn spawn_player_character(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            PlayerCharacter,
            Transform::from_translation(position.extend(0.0)),
        ))
        .id()
}

/// Snapshot персонажей для сравнения детерминизма: все значимые
/// компоненты, отсортировано по Entity ID, сериализовано через Debug.
pub fn character_snapshot(world: &mut World) -> Vec<u8> {
    let mut snapshot = Vec::new();

    let mut query = world.query::<(
        Entity,
        &Health,
        &Stamina,
        &ActionState,
        &PhysicsBody,
        &VerticalMotion,
        &Transform,
    )>();
    let mut rows: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    rows.sort_by_key(|(entity, ..)| entity.index());

    for (entity, health, stamina, state, body, vertical, transform) in rows {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(
            format!(
                "{:?}|{:?}|{:?}|{:?}|{:?}|{:?}",
                health, stamina, state, body, vertical, transform.translation
            )
            .as_bytes(),
        );
    }

    snapshot
}
