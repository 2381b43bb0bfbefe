//! Scripted scenario exercising the shield and the trigger volume.
mod config;

use ability_content::ContentFactory;
use ability_core::{AbilityState, EntityId, Vec3};
use ability_runtime::{RuntimeConfig, World};
use anyhow::Result;
use config::SandboxConfig;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const VOLUME_CENTER: Vec3 = Vec3::new(500.0, 0.0, 0.0);

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    setup_logging();
    let config = SandboxConfig::from_env();

    let content = ContentFactory::new(&config.content_dir);
    let ability = content.load_config()?;
    let heroes = content.load_heroes()?;
    info!(dir = %config.content_dir.display(), heroes = heroes.len(), "content loaded");

    let mut world = World::builder()
        .config(RuntimeConfig { ability })
        .heroes(heroes)
        .volume(VOLUME_CENTER)
        .build();

    for signal in ability_core::Signal::ALL {
        world.bus_mut().subscribe(signal, |message| {
            info!(verb = %message.verb, instigator = ?message.instigator, "hud");
        });
    }

    let hero = world.spawn_hero(&config.hero, Vec3::ZERO)?;
    if let Some(character) = world.character_mut(hero) {
        character.mana_component_mut().on_mana_changed.add(|change| {
            info!(
                actor = %change.component,
                old = change.old_value,
                new = change.new_value,
                "mana changed"
            );
        });
    }

    shield_phase(&mut world, hero, &config)?;
    trigger_phase(&mut world, hero, &config)?;

    world.despawn(hero)?;
    info!("scenario finished");
    Ok(())
}

/// Raises the shield and lets it drain until depletion cancels it.
fn shield_phase(world: &mut World, hero: EntityId, config: &SandboxConfig) -> Result<()> {
    if !world.activate_shield(hero)? {
        info!("shield refused to activate");
        return Ok(());
    }

    for frame in 0..config.max_frames {
        world.step(config.frame_dt)?;
        if shield_state(world, hero) != Some(AbilityState::Active) {
            info!(frame, "shield ended");
            break;
        }
    }
    Ok(())
}

/// Walks the hero into the trigger volume, waits, and walks back out.
fn trigger_phase(world: &mut World, hero: EntityId, config: &SandboxConfig) -> Result<()> {
    world.move_actor(hero, VOLUME_CENTER)?;
    let stay = config.max_frames / 4;
    for _ in 0..stay.max(1) {
        world.step(config.frame_dt)?;
    }
    if let Some(character) = world.character(hero) {
        info!(mana = character.mana(), max = character.max_mana(), "leaving volume");
    }

    world.move_actor(hero, Vec3::ZERO)?;
    world.step(config.frame_dt)?;
    Ok(())
}

fn shield_state(world: &World, hero: EntityId) -> Option<AbilityState> {
    let character = world.character(hero)?;
    character
        .ability_system()
        .ability_state(character.shield_spec())
}

/// Setup logging to stderr, filtered by `RUST_LOG` (default: info)
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
