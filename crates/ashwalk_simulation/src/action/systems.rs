//! Покадровая логика контроллера: одна система-FSM на все режимы.
//!
//! Порядок внутри тика:
//! 1. Санитизация ввода + изометрическая проекция (ровно один раз)
//! 2. Facing из сырого ввода
//! 3. Ветка текущего режима: переходы + скорость + stamina
//!
//! Переходы:
//! - Idle: jump (есть stamina) → Jump; roll → Roll; ввод → Move; иначе тормозим
//! - Move: jump → Jump; roll → Roll; нет ввода → Idle; иначе walk/sprint
//! - Jump: воздушный контроль + Euler-гравитация; z >= 0 → Idle
//! - Roll: фиксированный рывок; таймер вышел → цепочка из буфера или Idle
//! - Recovery: таймер → Idle (входящих переходов пока нет)
//! - Attack/Block: держим режим, им владеет боевой слой адаптера

use bevy::prelude::*;

use crate::combat::Dead;
use crate::components::{
    dir_active, iso_project, ActionCosts, Facing, PhysicsBody, PlayerCharacter, PlayerInput,
    RenderOffset, Stamina, VerticalMotion, WalkBob,
};
use crate::logger::log;

use super::state::{resolve_roll_direction, ActionState, ControllerTuning};

pub fn action_fsm(
    mut query: Query<
        (
            Entity,
            &PlayerInput,
            &mut ActionState,
            &mut PhysicsBody,
            &mut Stamina,
            &mut VerticalMotion,
            &mut Facing,
            &ControllerTuning,
        ),
        (With<PlayerCharacter>, Without<Dead>),
    >,
    costs: Res<ActionCosts>,
    time: Res<Time>,
) {
    // Fixed clock не выдаёт отрицательный Δt; кламп держит инвариант
    // и при ручном прогоне системы из тестов
    let delta = time.delta_secs().max(0.0);

    for (entity, input, mut state, mut body, mut stamina, mut vertical, mut facing, tuning) in
        query.iter_mut()
    {
        let raw_dir = input.sanitized_move_dir();
        let steer = if dir_active(raw_dir) {
            iso_project(raw_dir)
        } else {
            Vec2::ZERO
        };

        // Facing обновляется только при живом вводе
        if let Some(new_facing) = Facing::from_input(raw_dir) {
            if *facing != new_facing {
                *facing = new_facing;
            }
        }

        let new_state = match state.as_ref() {
            ActionState::Idle => {
                if input.jump_pressed && stamina.try_deduct(costs.jump) {
                    vertical.launch(tuning.jump_force);
                    log(&format!(
                        "🦵 {:?}: Idle → Jump (stamina {:.1})",
                        entity, stamina.current
                    ));
                    ActionState::Jump
                } else if let Some(direction) =
                    try_start_roll(input, steer, body.velocity, &mut stamina, costs.roll, entity)
                {
                    body.velocity = direction * tuning.roll_speed;
                    log(&format!(
                        "🌀 {:?}: Idle → Roll (stamina {:.1})",
                        entity, stamina.current
                    ));
                    ActionState::Roll {
                        timer: tuning.roll_duration,
                        direction,
                        queued: false,
                    }
                } else if dir_active(raw_dir) {
                    ActionState::Move
                } else {
                    body.velocity = decay_velocity(body.velocity, tuning.idle_deceleration * delta);
                    stamina.regen(delta);
                    ActionState::Idle
                }
            }

            ActionState::Move => {
                if input.jump_pressed && stamina.try_deduct(costs.jump) {
                    vertical.launch(tuning.jump_force);
                    log(&format!(
                        "🦵 {:?}: Move → Jump (stamina {:.1})",
                        entity, stamina.current
                    ));
                    ActionState::Jump
                } else if let Some(direction) =
                    try_start_roll(input, steer, body.velocity, &mut stamina, costs.roll, entity)
                {
                    body.velocity = direction * tuning.roll_speed;
                    log(&format!(
                        "🌀 {:?}: Move → Roll (stamina {:.1})",
                        entity, stamina.current
                    ));
                    ActionState::Roll {
                        timer: tuning.roll_duration,
                        direction,
                        queued: false,
                    }
                } else if !dir_active(raw_dir) {
                    // Скорость не трогаем: торможение сделает Idle-ветка
                    // со следующего тика
                    ActionState::Idle
                } else {
                    // Латч exhaustion шагает ровно здесь, до решения о sprint
                    stamina.update_exhaustion();
                    let sprinting =
                        input.sprint_held && !stamina.exhausted && stamina.current > 0.0;
                    if sprinting {
                        body.velocity = steer * tuning.base_speed * tuning.sprint_multiplier;
                        stamina.drain(costs.sprint_per_sec, delta);
                    } else {
                        body.velocity = steer * tuning.base_speed;
                        stamina.regen(delta);
                    }
                    ActionState::Move
                }
            }

            ActionState::Jump => {
                // Воздушный контроль живой, sprint продолжает жечь пул.
                // Латч exhaustion здесь не шагает — только в Move.
                let sprinting = input.sprint_held && !stamina.exhausted && stamina.current > 0.0;
                if sprinting {
                    body.velocity = steer * tuning.base_speed * tuning.sprint_multiplier;
                    stamina.drain(costs.sprint_per_sec, delta);
                } else {
                    body.velocity = steer * tuning.base_speed;
                    stamina.regen(delta);
                }

                if vertical.integrate(tuning.gravity, delta) {
                    log(&format!("🦵 {:?}: Jump → Idle (приземление)", entity));
                    ActionState::Idle
                } else {
                    ActionState::Jump
                }
            }

            ActionState::Roll {
                timer,
                direction,
                queued,
            } => {
                let direction = *direction;
                // Одноместный буфер: повторное нажатие во время переката
                // запоминается до конца текущего
                let queued = *queued || input.roll_pressed;
                let timer = *timer - delta;

                if timer > 0.0 {
                    // Направление заморожено на входе, ввод его не меняет
                    body.velocity = direction * tuning.roll_speed;
                    ActionState::Roll {
                        timer,
                        direction,
                        queued,
                    }
                } else if queued {
                    // Цепочка стартует в этот же тик, без кадра простоя.
                    // Направление пересчитываем: удерживаемый ввод важнее импульса
                    if let Some(next_dir) = resolve_roll_direction(steer, body.velocity) {
                        if stamina.try_deduct(costs.roll) {
                            body.velocity = next_dir * tuning.roll_speed;
                            log(&format!(
                                "🌀 {:?}: Roll → Roll (цепочка, stamina {:.1})",
                                entity, stamina.current
                            ));
                            ActionState::Roll {
                                timer: tuning.roll_duration,
                                direction: next_dir,
                                queued: false,
                            }
                        } else {
                            body.velocity = Vec2::ZERO;
                            log(&format!(
                                "🌀 {:?}: Roll → Idle (на цепочку не хватило stamina)",
                                entity
                            ));
                            ActionState::Idle
                        }
                    } else {
                        body.velocity = Vec2::ZERO;
                        ActionState::Idle
                    }
                } else {
                    body.velocity = Vec2::ZERO;
                    log(&format!("🌀 {:?}: Roll → Idle", entity));
                    ActionState::Idle
                }
            }

            ActionState::Recovery { timer } => {
                // Lockout: ввод игнорируется, стоим и дышим.
                // Входящих переходов пока нет, но ветка полная
                let timer = *timer - delta;
                if timer > 0.0 {
                    body.velocity = decay_velocity(body.velocity, tuning.idle_deceleration * delta);
                    stamina.regen(delta);
                    ActionState::Recovery { timer }
                } else {
                    ActionState::Idle
                }
            }

            // Боевыми режимами владеет боевой слой адаптера:
            // контроллер их не входит и не выходит
            ActionState::Attack => ActionState::Attack,
            ActionState::Block => ActionState::Block,
        };

        if *state != new_state {
            *state = new_state;
        }
    }
}

/// Гейты входа в перекат, по порядку: нажатие → направление → цена.
/// None означает «перекат не состоялся», причина уже в логе,
/// состояние и скорость не тронуты (stamina списана только при Some).
fn try_start_roll(
    input: &PlayerInput,
    steer: Vec2,
    momentum: Vec2,
    stamina: &mut Stamina,
    cost: f32,
    entity: Entity,
) -> Option<Vec2> {
    if !input.roll_pressed {
        return None;
    }
    let Some(direction) = resolve_roll_direction(steer, momentum) else {
        log(&format!(
            "🌀 {:?}: roll отклонён — нет направления (стоим на месте)",
            entity
        ));
        return None;
    };
    if !stamina.try_deduct(cost) {
        log(&format!(
            "🌀 {:?}: roll отклонён — не хватает stamina ({:.1} < {:.1})",
            entity, stamina.current, cost
        ));
        return None;
    }
    Some(direction)
}

/// Линейное торможение к нулю без овершута.
fn decay_velocity(velocity: Vec2, amount: f32) -> Vec2 {
    let speed = velocity.length();
    if speed <= amount {
        Vec2::ZERO
    } else {
        velocity * ((speed - amount) / speed)
    }
}

/// Визуальная вертикаль спрайта: прыжковая высота + walk bob.
///
/// Bob шагает только в Move; в остальных режимах фаза сбрасывается,
/// чтобы спрайт не замирал в случайной точке синусоиды. Итоговый офсет
/// всегда <= 0 (спрайт поднимается над якорем, не проседает).
pub fn update_render_offset(
    mut query: Query<
        (&ActionState, &VerticalMotion, &mut WalkBob, &mut RenderOffset),
        (With<PlayerCharacter>, Without<Dead>),
    >,
    time: Res<Time>,
) {
    let delta = time.delta_secs().max(0.0);
    for (state, vertical, mut bob, mut offset) in query.iter_mut() {
        if matches!(state, ActionState::Move) {
            bob.advance(delta);
        } else if bob.phase != 0.0 {
            bob.reset();
        }
        offset.y = vertical.z_height + bob.offset();
    }
}
