//! Headless прогон ASHWALK
//!
//! Запускает контроллер без рендера: скриптованный ввод, печать
//! телеметрии раз в 100 тиков. Удобно для профилирования и проверки
//! детерминизма глазами.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use ashwalk_simulation::{
    character_snapshot, create_headless_app, spawn_player_character, ActionState, HudSink,
    PlayerInput, ProceduralPalette, SimulationPlugin, Stamina, TerrainPalette,
};

fn main() {
    let seed = 42;
    println!("Starting ASHWALK headless simulation (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin)
        .insert_resource(HudSink::default())
        .insert_resource(TerrainPalette::new(Box::new(ProceduralPalette::new(
            seed, 32.0,
        ))));

    // Ровно один FixedUpdate на app.update(), без привязки к wall-clock
    let step = app.world().resource::<Time<Fixed>>().timestep();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(step));

    let player = {
        let world = app.world_mut();
        let player = {
            let mut commands = world.commands();
            spawn_player_character(&mut commands, Vec2::ZERO)
        };
        world.flush();
        player
    };

    // Первый update — нулевая дельта (Time только запоминает старт)
    app.update();

    // 1000 тиков со скриптованным вводом
    for tick in 0..1000u64 {
        if let Some(mut input) = app.world_mut().get_mut::<PlayerInput>(player) {
            input.clear_edges();
            script_input(tick, &mut input);
        }

        app.update();

        if tick % 100 == 0 {
            let state = app.world().get::<ActionState>(player).cloned();
            let stamina = app.world().get::<Stamina>(player).cloned();
            let entity_count = app.world().entities().len();
            if let (Some(state), Some(stamina)) = (state, stamina) {
                println!(
                    "Tick {}: {} entities, state {}, stamina {:.1}",
                    tick,
                    entity_count,
                    state.name(),
                    stamina.current
                );
            }
        }
    }

    let digest: u64 = character_snapshot(app.world_mut())
        .iter()
        .fold(0u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(*byte as u64));
    println!("Simulation complete! snapshot digest: {:016x}", digest);
}

/// Сценарий прогона: походили, поспринтовали до exhaustion, попрыгали,
/// покатались цепочкой перекатов.
fn script_input(tick: u64, input: &mut PlayerInput) {
    match tick {
        // Идём на восток экрана
        0..=149 => {
            input.move_dir = Vec2::new(1.0, 0.0);
            input.sprint_held = false;
        }
        // Sprint до упора (высадит пул и включит exhaustion)
        150..=549 => {
            input.move_dir = Vec2::new(1.0, 0.0);
            input.sprint_held = true;
        }
        // Отдых на месте
        550..=699 => {
            input.move_dir = Vec2::ZERO;
            input.sprint_held = false;
        }
        // Прыжок с разбега
        700 => {
            input.move_dir = Vec2::new(0.0, 1.0);
            input.jump_pressed = true;
        }
        701..=799 => {
            input.move_dir = Vec2::new(0.0, 1.0);
        }
        // Перекат + запрос цепочки следом
        800 => {
            input.move_dir = Vec2::new(1.0, 1.0);
            input.roll_pressed = true;
        }
        810 => {
            input.move_dir = Vec2::new(1.0, 1.0);
            input.roll_pressed = true;
        }
        801..=899 => {
            input.move_dir = Vec2::new(1.0, 1.0);
        }
        // Дохаживаем спокойно
        _ => {
            input.move_dir = Vec2::ZERO;
            input.sprint_held = false;
        }
    }
}
