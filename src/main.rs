use anyhow::Result;
use glam::Vec3;
use log::info;

use emberfall::engine::game_loop::GameLoop;
use emberfall::engine::input::{Action, PlayerInput};
use emberfall::engine::world::{CollisionChannel, StaticWorld, WallPanel};
use emberfall::game::arena::Arena;
use emberfall::game::characters::{CharacterConfig, CharacterId};

/// Forward buffered input edges and axes to a character
fn dispatch_input(arena: &mut Arena, id: CharacterId, input: &PlayerInput) {
    let _ = arena.with_character(id, |character, body| {
        character.move_up(input.axis_move_up());
        character.move_right(input.axis_move_right());

        if input.just_pressed(Action::Jump) {
            character.jump_press(body);
        }
        if input.just_released(Action::Jump) {
            character.jump_release(body);
        }
        if input.just_pressed(Action::Sprint) {
            character.sprint_press(body);
        }
        if input.just_released(Action::Sprint) {
            character.sprint_release(body);
        }
        if input.just_pressed(Action::Dash) {
            character.dash_press(body);
        }
        if input.just_pressed(Action::QuickStep) {
            character.quick_step_press(body);
        }
        if input.just_pressed(Action::Glide) {
            character.glide_press(body);
        }
        if input.just_pressed(Action::Attack) {
            character.attack_press();
        }
    });
}

/// Scripted demo input: walk, jump, glide a moment, dash, then attack the
/// training dummy
fn script(tick: u64, input: &mut PlayerInput) {
    match tick {
        0 => input.set_axis_move_up(1.0),
        60 => {
            input.set_axis_move_up(0.0);
            input.press(Action::Jump);
        }
        70 => input.release(Action::Jump),
        80 => input.press(Action::Glide),
        81 => input.release(Action::Glide),
        130 => input.press(Action::Glide),
        131 => input.release(Action::Glide),
        170 => input.press(Action::Dash),
        171 => input.release(Action::Dash),
        220 => input.press(Action::Attack),
        221 => input.release(Action::Attack),
        _ => {}
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting emberfall demo...");

    // a single wall ahead of the player, slideable
    let mut world = StaticWorld::new();
    world.add_panel(WallPanel::new(
        1,
        Vec3::new(400.0, 0.0, 200.0),
        Vec3::new(-1.0, 0.0, 0.0),
        400.0,
        400.0,
        CollisionChannel::WallSlide,
    )?);

    let mut arena = Arena::new(world);
    let player = arena.spawn_character(100, CharacterConfig::default(), Vec3::ZERO, 34.0);
    let dummy = arena.spawn_character(
        101,
        CharacterConfig::default(),
        Vec3::new(300.0, 200.0, 0.0),
        34.0,
    );
    info!("Spawned player {} and training dummy {}", player, dummy);

    let mut input = PlayerInput::new();
    let mut game_loop = GameLoop::new();
    let mut tick: u64 = 0;

    while tick < 300 {
        let updates = game_loop.begin_frame();
        for _ in 0..updates {
            script(tick, &mut input);
            dispatch_input(&mut arena, player, &input);
            input.update();

            arena.update(game_loop.fixed_timestep());

            // a fresh attack swing lands on the dummy
            for event in arena.drain_events(player) {
                use emberfall::game::characters::CharacterEvent;
                info!("player event: {:?}", event);
                if event == CharacterEvent::AttackStarted {
                    if let Some(outcome) = arena.resolve_attack(player, dummy) {
                        info!("attack dealt {:.2} damage", outcome.damage);
                    }
                }
            }
            for event in arena.drain_events(dummy) {
                info!("dummy event: {:?}", event);
            }

            tick += 1;
        }
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    let dummy_health = arena
        .character(dummy)
        .map(|character| character.attributes().health())
        .unwrap_or_default();
    info!("Demo complete; dummy health at {:.1}", dummy_health);

    Ok(())
}
