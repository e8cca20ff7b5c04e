//! Strafe headless simulator
//!
//! Loads a level config, then plays it with a scripted player: aim at the
//! nearest living enemy and hold the trigger, and once the level is clear
//! walk to the exit. Prints the level summary at the end.
//!
//! Run with: cargo run --bin strafe-sim [level.json] [seconds]

use glam::Vec3;
use strafe_combat::TriggerInput;
use strafe_core::{EffectKind, Feedback};
use strafe_gamestate::SceneLoader;
use strafe_runtime::{GameConfig, GameEvent, Host, LevelSession, PlayerInput, DEFAULT_LEVEL};

const TICK_RATE: f32 = 60.0;
const DEFAULT_SECONDS: f32 = 120.0;
const WALK_SPEED: f32 = 5.0;

/// Feedback sink that writes every cue to the log
struct LogFeedback;

impl Feedback for LogFeedback {
    fn play_effect(&mut self, kind: EffectKind, position: Vec3, _normal: Vec3) {
        log::trace!("effect {:?} at {:?}", kind, position);
    }

    fn play_sound(&mut self, clip: &str, position: Option<Vec3>) {
        log::trace!("sound {} at {:?}", clip, position);
    }

    fn camera_shake(&mut self, intensity: f32, duration: f32) {
        log::trace!("shake {} for {}s", intensity, duration);
    }
}

/// Scene loader that only remembers the request
#[derive(Default)]
struct LogScenes {
    requested: Option<String>,
}

impl SceneLoader for LogScenes {
    fn load_level(&mut self, name: &str) {
        log::info!("Scene change requested: {}", name);
        self.requested = Some(name.to_string());
    }

    fn restart_level(&mut self) {
        log::info!("Level restart requested");
        self.requested = Some("<restart>".to_string());
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("strafe-sim failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::from_json_str(DEFAULT_LEVEL)?,
    };
    let seconds = match args.next() {
        Some(s) => s.parse::<f32>()?,
        None => DEFAULT_SECONDS,
    };

    let mut session = LevelSession::new(config)?;
    let mut feedback = LogFeedback;
    let mut scenes = LogScenes::default();
    let dt = 1.0 / TICK_RATE;
    let ticks = (seconds * TICK_RATE) as u32;

    let mut position = session.player().position();
    for _ in 0..ticks {
        let input = scripted_input(&session, &mut position, dt);
        let mut host = Host {
            feedback: &mut feedback,
            scenes: &mut scenes,
        };
        for event in session.tick(dt, &input, &mut host)? {
            log_event(&event);
        }
        if scenes.requested.is_some() {
            break;
        }
    }

    let player = session.player().vitals();
    log::info!(
        "Finished at {:.1}s with {:.0} health, {:.0} armor, {} ammo ({:?})",
        session.now(),
        player.health(),
        player.armor(),
        session.weapons().ammo_display(),
        session.status()
    );
    println!("{}", session.summary());
    Ok(())
}

/// Shoot the nearest living enemy, otherwise walk to the exit
fn scripted_input(session: &LevelSession, position: &mut Vec3, dt: f32) -> PlayerInput {
    let eye = session.player().eye();
    let target = session
        .enemies()
        .iter()
        .filter(|e| !e.is_dead())
        .min_by(|a, b| {
            a.position()
                .distance_squared(*position)
                .total_cmp(&b.position().distance_squared(*position))
        });

    if let Some(enemy) = target {
        let look = enemy.position() - eye;
        let reload = session
            .weapons()
            .active_slot()
            .map_or(false, |s| s.current_ammo() == 0 && s.can_reload());
        let mut input = PlayerInput::at(*position, look).firing(TriggerInput::press());
        input.reload = reload;
        return input;
    }

    if let Some(exit) = session.config().exit {
        let to_exit = exit.position - *position;
        let step = WALK_SPEED * dt;
        if to_exit.length() > step {
            *position += to_exit.normalize_or_zero() * step;
        } else {
            *position = exit.position;
        }
        return PlayerInput::at(*position, to_exit);
    }
    PlayerInput::at(*position, session.player().look())
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::EnemyKilled { enemy, total_kills } => {
            log::info!("Killed {} ({} total)", enemy, total_kills)
        }
        GameEvent::PlayerDamaged { info, outcome } => log::info!(
            "Player hit for {:.0} ({:.1} health lost)",
            info.amount,
            outcome.health_lost()
        ),
        GameEvent::PickupCollected { effect, .. } => log::info!("Picked up {:?}", effect),
        GameEvent::LevelStatusChanged(status) => log::info!("Level status: {:?}", status),
        GameEvent::LevelTransition(transition) => log::info!("Transition: {:?}", transition),
        other => log::debug!("{:?}", other),
    }
}
