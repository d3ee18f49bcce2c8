//! Headless Duel Sandbox
//!
//! Spawns a player facing an enemy, mashes the primary attack through the
//! staff combo and reports what happened.

use std::path::PathBuf;

use ability_forge::animation::MontageLibrary;
use ability_forge::attributes::{Attribute, HasAttributes};
use ability_forge::character::{CharacterEvent, InputAction, InputValue, TriggerEvent};
use ability_forge::core::{GameplayConfig, GasError};
use ability_forge::world::World;
use clap::Parser;
use glam::Vec3;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Headless duel sandbox for the ability core
#[derive(Parser, Debug)]
#[command(name = "ability-forge")]
#[command(about = "Run a scripted player vs enemy duel and print a report")]
struct Args {
    /// Gameplay config (TOML); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra montage definitions (TOML) layered over the defaults
    #[arg(long)]
    montages: Option<PathBuf>,

    /// Random seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds
    #[arg(long, default_value_t = 10.0)]
    duration: f32,

    /// Ticks per simulated second
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,

    /// Distance between the duellists
    #[arg(long, default_value_t = 100.0)]
    distance: f32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Include the full event log in the report
    #[arg(long)]
    events: bool,
}

#[derive(Serialize)]
struct DuelReport {
    outcome: String,
    seed: u64,
    elapsed: f32,
    ticks: u64,
    hits_landed: usize,
    critical_hits: usize,
    combo_chains: u32,
    enemy_health: f32,
    player_stamina: f32,
    player_level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    log: Option<serde_json::Value>,
}

fn main() -> Result<(), GasError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ability_forge=info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameplayConfig::load_from_toml(path)?,
        None => GameplayConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let mut montages = MontageLibrary::with_defaults();
    if let Some(path) = &args.montages {
        let added = montages.load_from_toml(path)?;
        tracing::info!("Loaded {} montages from {}", added, path.display());
    }

    let mut world = World::new(config).with_montages(montages);
    let player = world.spawn_player("Wukong", Vec3::ZERO);
    let enemy = world.spawn_enemy("Minion", Vec3::new(args.distance, 0.0, 0.0));

    let dt = 1.0 / args.tick_rate.max(1) as f32;
    let total_ticks = (args.duration / dt).ceil() as u64;
    let mut ticks = 0;
    let mut combo_chains = 0;

    while ticks < total_ticks {
        let enemy_alive = world.character(enemy).is_some_and(|c| c.is_alive());
        if !enemy_alive {
            break;
        }

        let combo_open = world
            .character(player)
            .is_some_and(|c| c.abilities.is_combo_window_open());
        let attacked = world.handle_input(player, InputAction::PrimaryAttack, TriggerEvent::Started, InputValue::None)?;
        if attacked && combo_open {
            combo_chains += 1;
        }

        world.tick(dt);
        ticks += 1;
    }

    let log = world.log();
    let hits_landed = log.count_matching(|e| matches!(e, CharacterEvent::HitLanded { .. }));
    let critical_hits = log.count_matching(|e| matches!(e, CharacterEvent::DamageTaken { critical: true, .. }));
    let enemy_alive = world.character(enemy).is_some_and(|c| c.is_alive());

    let report = DuelReport {
        outcome: if enemy_alive { "timeout" } else { "enemy_defeated" }.to_string(),
        seed,
        elapsed: world.time(),
        ticks,
        hits_landed,
        critical_hits,
        combo_chains,
        enemy_health: world.character(enemy).map_or(0.0, |c| c.attribute(Attribute::Health)),
        player_stamina: world.character(player).map_or(0.0, |c| c.attribute(Attribute::Stamina)),
        player_level: world.character(player).map_or(0, |c| c.state.level()),
        log: if args.events {
            Some(serde_json::to_value(log.entries())?)
        } else {
            None
        },
    };

    match args.format.as_str() {
        "text" => {
            println!("=== Duel ({}) ===", report.outcome);
            println!("Seed:           {}", report.seed);
            println!("Elapsed:        {:.2}s over {} ticks", report.elapsed, report.ticks);
            println!("Hits landed:    {} ({} critical)", report.hits_landed, report.critical_hits);
            println!("Combo chains:   {}", report.combo_chains);
            println!("Enemy health:   {:.1}", report.enemy_health);
            println!("Player stamina: {:.1}", report.player_stamina);
        }
        _ => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
