use anyhow::{Context, Result};
use glam::Vec3;
use log::{debug, info, trace, warn};
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

use avatar_sync::engine::assets::{LoadedModel, MemoryModelSource, ModelLoader};
use avatar_sync::engine::game_loop::GameLoop;
use avatar_sync::engine::input::{Action, InputManager};
use avatar_sync::engine::scene::Transform;
use avatar_sync::game::characters::{CharacterManager, Classification};
use avatar_sync::game::net::{Replicator, SnapshotRouter};
use avatar_sync::game::GameConfig;

const LOCAL_USER: &str = "local";
/// Remote user fed by the local character's own snapshots
const ECHO_USER: &str = "echo";
/// Echo stands beside the local character instead of inside it
const ECHO_OFFSET: Vec3 = Vec3::new(3.0, 0.0, 0.0);

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => GameConfig::default(),
    };

    info!("Starting Avatar Sync...");

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Avatar Sync")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    // No asset pipeline yet: serve a stand-in rig carrying the configured clips
    let clip_names: Vec<&str> = Classification::ALL
        .iter()
        .map(|c| config.clips.name_for(*c))
        .collect();
    let source = MemoryModelSource::new()
        .with_model(&config.model_path, LoadedModel::mannequin("testCharacter", &clip_names))
        .with_latency(std::time::Duration::from_millis(250));
    let mut loader = ModelLoader::spawn(source)?;

    let mut input = InputManager::new();
    let mut router = SnapshotRouter::new();
    let mut replicator = Replicator::new(LOCAL_USER, config.replication.send_rate);
    let mut game_loop = GameLoop::with_tick_rate(config.tick_rate);
    let mut characters = CharacterManager::new(config.clone());

    let local = characters.spawn_local(LOCAL_USER, input.handle(), Transform::IDENTITY)?;
    let echo = characters.spawn_remote(
        ECHO_USER,
        router.register(ECHO_USER),
        Transform::from_position(ECHO_OFFSET),
    )?;

    for id in [local, echo] {
        characters.load_model(id, &mut loader, move |result| match result {
            Ok(()) => info!("Character {} ready", id),
            Err(err) => warn!("Character {} stays unloaded: {}", id, err),
        });
    }

    info!("Window created, {} characters spawned", characters.count());

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                ..
            } => {
                let action = input.process_keyboard_event(&event);
                if action == Some(Action::Menu) && event.state == ElementState::Pressed {
                    info!("Escape pressed, shutting down...");
                    elwt.exit();
                }
            }
            Event::WindowEvent {
                event: WindowEvent::Focused(false),
                ..
            } => {
                // Keys released while unfocused never reach us
                input.reset();
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                let ticks = game_loop.begin_frame();
                let dt = game_loop.tick_duration();

                for _ in 0..ticks {
                    characters.tick_all(dt);

                    let Some(player) = characters.get(local) else {
                        continue;
                    };
                    let Some(mut snapshot) =
                        replicator.update(dt, player.transform(), player.classification())
                    else {
                        continue;
                    };

                    // Loop the local state back in as the echo user
                    snapshot.user_id = ECHO_USER.to_string();
                    snapshot.position += ECHO_OFFSET;
                    let routed = snapshot
                        .encode()
                        .and_then(|bytes| router.route_bytes(&bytes));
                    if let Err(err) = routed {
                        warn!("Dropping echo snapshot: {}", err);
                    }
                }

                characters.poll_loads(&mut loader);
                input.update();

                for state in characters.render_states() {
                    trace!(
                        "{} at {:?}, {} active clips",
                        state.user_id,
                        state.transform.position,
                        state.pose.len()
                    );
                }
                if game_loop.frame_count() % 600 == 0 {
                    debug!("FPS: {:.1}", game_loop.fps());
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
