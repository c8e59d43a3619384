//! Транзиентные визуальные сущности: ghost trail переката, палитра террейна.
//!
//! Ghost — fire-and-forget: контроллер спавнит и забывает, ссылок не хранит.
//! Жизненный цикл (fade + despawn) ведёт отдельная система, переживает
//! любые переходы состояний спавнера.

use std::collections::HashMap;
use std::sync::Mutex;

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::action::ActionState;
use crate::components::{Appearance, Facing, PlayerCharacter};
use crate::logger::log;
use crate::physics::SimTick;

/// Каждый N-й тик симуляции, пока перекат активен.
pub const GHOST_TICK_INTERVAL: u64 = 5;
/// Секунд от спавна до полного растворения.
pub const GHOST_FADE_DURATION: f32 = 0.35;
/// Стартовая прозрачность отпечатка.
pub const GHOST_START_ALPHA: f32 = 0.5;

/// Застывший отпечаток персонажа. Остальной снапшот (спрайт, facing,
/// позиция) лежит в обычных компонентах сущности.
#[derive(Component, Debug, Clone)]
pub struct RollGhost {
    pub fade_timer: f32,
    pub fade_duration: f32,
    /// Тон террейна в точке спавна, подмешивается рендером
    pub tint: Color,
}

impl RollGhost {
    pub fn new(tint: Color) -> Self {
        Self {
            fade_timer: GHOST_FADE_DURATION,
            fade_duration: GHOST_FADE_DURATION,
            tint,
        }
    }

    /// Текущая прозрачность: линейно от стартовой к нулю.
    pub fn alpha(&self) -> f32 {
        GHOST_START_ALPHA * (self.fade_timer / self.fade_duration).clamp(0.0, 1.0)
    }

    /// Шаг таймера. true — отпечаток догорел, пора деспавнить.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.fade_timer -= delta;
        self.fade_timer <= 0.0
    }
}

/// Цвет террейна в мировой точке. Реализацию даёт хост: адаптер читает
/// реальные тайлы, headless подставляет процедурную палитру.
pub trait TerrainColorSource: Send + Sync {
    fn color_at(&self, world_pos: Vec2) -> Color;
}

/// Опциональный ресурс. Не вставлен — ghost'ы спавнятся с белым тоном.
#[derive(Resource)]
pub struct TerrainPalette {
    pub source: Box<dyn TerrainColorSource>,
}

impl TerrainPalette {
    pub fn new(source: Box<dyn TerrainColorSource>) -> Self {
        Self { source }
    }
}

/// Процедурная палитра для headless-прогонов: мир бьётся на квадратные
/// тайлы, каждому тайлу — свой цвет из seeded RNG. Мемоизация обязательна:
/// один тайл всегда одного цвета в рамках прогона.
pub struct ProceduralPalette {
    tile_size: f32,
    seed: u64,
    cache: Mutex<HashMap<IVec2, Color>>,
}

impl ProceduralPalette {
    pub fn new(seed: u64, tile_size: f32) -> Self {
        Self {
            tile_size,
            seed,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn tile_of(&self, world_pos: Vec2) -> IVec2 {
        IVec2::new(
            (world_pos.x / self.tile_size).floor() as i32,
            (world_pos.y / self.tile_size).floor() as i32,
        )
    }
}

impl TerrainColorSource for ProceduralPalette {
    fn color_at(&self, world_pos: Vec2) -> Color {
        let tile = self.tile_of(world_pos);
        let mut cache = self.cache.lock().unwrap();
        *cache.entry(tile).or_insert_with(|| {
            // Seed тайла: координаты подмешиваются в глобальный seed.
            // `as i64 as u64` сохраняет знак в битах — тайлы (-1, 0) и (1, 0)
            // получают разные потоки
            let tile_seed = self
                .seed
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .wrapping_add((tile.x as i64 as u64).wrapping_mul(0x85EB_CA6B))
                .wrapping_add((tile.y as i64 as u64).wrapping_mul(0xC2B2_AE35));
            let mut rng = ChaCha8Rng::seed_from_u64(tile_seed);
            // Приглушённые земляные тона
            Color::srgb(
                rng.gen_range(0.25..0.55),
                rng.gen_range(0.30..0.60),
                rng.gen_range(0.20..0.45),
            )
        })
    }
}

/// Спавн отпечатков: каждый GHOST_TICK_INTERVAL-й тик, пока персонаж
/// в перекате. Перекаты стартуют только с земли, так что Transform
/// без вертикальной поправки.
pub fn spawn_roll_ghosts(
    mut commands: Commands,
    tick: Res<SimTick>,
    palette: Option<Res<TerrainPalette>>,
    players: Query<(&ActionState, &Transform, &Appearance, &Facing), With<PlayerCharacter>>,
) {
    if tick.0 % GHOST_TICK_INTERVAL != 0 {
        return;
    }
    for (state, transform, appearance, facing) in players.iter() {
        if !matches!(state, ActionState::Roll { .. }) {
            continue;
        }
        let world_pos = transform.translation.truncate();
        let tint = palette
            .as_ref()
            .map(|p| p.source.color_at(world_pos))
            .unwrap_or(Color::WHITE);

        // Fire-and-forget: id никому не отдаём
        commands.spawn((RollGhost::new(tint), appearance.clone(), *facing, *transform));
        log(&format!(
            "👻 ghost @ ({:.1}, {:.1}), tick {}",
            world_pos.x, world_pos.y, tick.0
        ));
    }
}

/// Догорание отпечатков. Деспавн на том же тике, где alpha дошла до нуля.
pub fn fade_roll_ghosts(
    mut commands: Commands,
    mut ghosts: Query<(Entity, &mut RollGhost)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs().max(0.0);
    for (entity, mut ghost) in ghosts.iter_mut() {
        if ghost.tick(delta) {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ghost_alpha_fades_linear() {
        let mut ghost = RollGhost::new(Color::WHITE);
        assert!((ghost.alpha() - 0.5).abs() < 0.001);

        // Половина времени — половина стартовой прозрачности
        ghost.tick(GHOST_FADE_DURATION / 2.0);
        assert!((ghost.alpha() - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_ghost_expires() {
        let mut ghost = RollGhost::new(Color::WHITE);
        assert!(!ghost.tick(0.1));
        assert!(!ghost.tick(0.2));
        // 0.35 суммарно — догорел
        assert!(ghost.tick(0.1));
        assert_eq!(ghost.alpha(), 0.0);
    }

    #[test]
    fn test_palette_memoized() {
        let palette = ProceduralPalette::new(42, 32.0);
        // Две точки одного тайла — один цвет
        let a = palette.color_at(Vec2::new(5.0, 5.0));
        let b = palette.color_at(Vec2::new(30.0, 31.0));
        assert_eq!(a, b);
        // Повторный запрос — тот же цвет (кеш, не новый бросок RNG)
        let c = palette.color_at(Vec2::new(5.0, 5.0));
        assert_eq!(a, c);
    }

    #[test]
    fn test_palette_negative_tiles_distinct() {
        let palette = ProceduralPalette::new(42, 32.0);
        let pos = palette.color_at(Vec2::new(10.0, 0.0)); // тайл (0, 0)
        let neg = palette.color_at(Vec2::new(-10.0, 0.0)); // тайл (-1, 0)
        assert_ne!(pos, neg);
    }

    #[test]
    fn test_palette_deterministic_across_instances() {
        let first = ProceduralPalette::new(7, 32.0);
        let second = ProceduralPalette::new(7, 32.0);
        let p = Vec2::new(100.0, -64.0);
        assert_eq!(first.color_at(p), second.color_at(p));

        // Другой seed — другая палитра
        let other = ProceduralPalette::new(8, 32.0);
        assert_ne!(first.color_at(p), other.color_at(p));
    }
}
