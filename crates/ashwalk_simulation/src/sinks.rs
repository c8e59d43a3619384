//! Опциональные выходы наружу: HUD и камера.
//!
//! Оба ресурса вставляет хост; симуляция лишь заполняет их раз в тик.
//! Отсутствие ресурса — не ошибка, а headless-прогон без UI, но на
//! старте об этом честно предупреждаем: забытая проводка — классика.

use bevy::prelude::*;

use crate::components::{Health, PlayerCharacter, PlayerInput, Stamina};
use crate::effects::TerrainPalette;
use crate::logger::{log_info, log_warning};

/// Снимок ресурсов персонажа для UI. Адаптер читает после тика
/// и рисует бары stamina/health.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct HudSink {
    pub stamina: f32,
    pub max_stamina: f32,
    pub exhausted: bool,
    pub health: u32,
    pub max_health: u32,
}

/// Панорамирование камеры. Контроллер камерой не владеет — только
/// пробрасывает намерение игрока.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct CameraSink {
    pub pan_dir: Vec2,
}

/// Одноразовая проверка проводки на старте. Ловит типовую ошибку
/// «собрали симуляцию, забыли подключить HUD/камеру/палитру».
pub fn check_collaborator_wiring(
    hud: Option<Res<HudSink>>,
    camera: Option<Res<CameraSink>>,
    palette: Option<Res<TerrainPalette>>,
) {
    if hud.is_some() {
        log_info("✅ HUD sink подключен");
    } else {
        log_warning("⚠️ HUD sink не подключен — stamina bar обновляться не будет");
    }
    if camera.is_some() {
        log_info("✅ Camera sink подключен");
    } else {
        log_warning("⚠️ Camera sink не подключен — панорамирование уйдёт в пустоту");
    }
    if palette.is_none() {
        log_warning("⚠️ Terrain палитра не вставлена — ghost trail будет белым");
    }
}

/// Снимок stamina и health в HUD, раз в тик, последним в цепочке.
pub fn sync_hud(
    hud: Option<ResMut<HudSink>>,
    players: Query<(&Stamina, &Health), With<PlayerCharacter>>,
) {
    let Some(mut hud) = hud else {
        return;
    };
    let Ok((stamina, health)) = players.single() else {
        return;
    };
    hud.stamina = stamina.current;
    hud.max_stamina = stamina.max;
    hud.exhausted = stamina.exhausted;
    hud.health = health.current;
    hud.max_health = health.max;
}

/// Проброс панорамирования. Выполняется до FSM: камера не должна
/// зависеть от исхода переходов.
pub fn forward_camera_pan(
    camera: Option<ResMut<CameraSink>>,
    players: Query<&PlayerInput, With<PlayerCharacter>>,
) {
    let Some(mut camera) = camera else {
        return;
    };
    let Ok(input) = players.single() else {
        return;
    };
    camera.pan_dir = input.pan_dir;
}
