use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use glam::Vec2;
use log::{info, warn};
use winit::keyboard::KeyCode;

use summit_climber::engine::assets::{parse_sprite_sheets, AssetManager, ObjectId, SpriteSheet};
use summit_climber::engine::input::{InputConfig, Key, KeyMask};
use summit_climber::engine::physics::{CollisionWorld, EntityId, SurfaceType};
use summit_climber::game::characters::{CharacterManager, CharacterProfile, CharacterState, MotionStats};

/// Sprite sheets used when no asset file is given
const DEMO_ASSETS: &str = include_str!("../assets/sprites.dat");

const BRICK_SHEET: ObjectId = 10;
const ICE_SHEET: ObjectId = 11;
const CLOUD_SHEET: ObjectId = 12;
const CLOUD: EntityId = 500;

/// Scripted player input: (label, ticks, physical keys held).
///
/// The climber starts on the ground floor under the hole, swings the
/// hammer, then jumps through the hole onto the bricks of the first floor.
const PLAYER_SCRIPT: &[(&str, u32, &[KeyCode])] = &[
    ("stand", 10, &[]),
    ("hammer", 12, &[KeyCode::ArrowDown]),
    ("step right", 1, &[KeyCode::ArrowRight]),
    ("running jump", 1, &[KeyCode::ArrowRight, KeyCode::ArrowUp]),
    ("airborne", 70, &[]),
    ("run left", 60, &[KeyCode::KeyA]),
    ("let go", 30, &[]),
    ("jump", 1, &[KeyCode::Space]),
    ("wait", 90, &[]),
];

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Summit Climber demo...");

    let assets = match std::env::args().nth(1) {
        Some(path) => {
            let mut manager = AssetManager::new(".");
            manager.load(&path)?;
            manager
        }
        None => AssetManager::with_library("assets", parse_sprite_sheets(DEMO_ASSETS)),
    };
    let stats = assets.stats();
    info!(
        "{} sprite sheets, {} frames, texture {:?}",
        stats.sheet_count,
        stats.frame_count,
        assets.texture_filename()
    );

    let mut world = build_level(&assets)?;
    let motion = MotionStats::standard();

    let mut characters = CharacterManager::new();
    let player_profile = CharacterProfile::player();
    let player = characters.spawn_character(
        "climber",
        player_profile.clone(),
        motion.clone(),
        sheet_or_warn(&assets, player_profile.sheet_id),
        Vec2::new(104.0, 8.0),
    );
    let walker_profile = CharacterProfile::scripted();
    let walker = characters.spawn_character(
        "walker",
        walker_profile.clone(),
        motion.clone(),
        sheet_or_warn(&assets, walker_profile.sheet_id),
        Vec2::new(200.0, 8.0),
    );

    let input = InputConfig::default();
    let mut last_states: HashMap<EntityId, CharacterState> = HashMap::new();
    let mut cloud_dx = 0.5;
    let mut tick = 0u32;

    for &(label, ticks, codes) in PLAYER_SCRIPT {
        info!("Tick {}: {}", tick, label);
        let keys = input.mask(codes.iter().copied());
        for _ in 0..ticks {
            tick += 1;

            // Level objects move before the characters look at them
            world.begin_tick();
            let cloud_x = world
                .objects()
                .iter()
                .find(|o| o.owner == CLOUD)
                .map(|o| o.position.x)
                .unwrap_or_default();
            if cloud_x < 40.0 || cloud_x > 180.0 {
                cloud_dx = -cloud_dx;
            }
            world.move_object(CLOUD, Vec2::new(cloud_dx, 0.0));

            // The walker paces back and forth
            let walker_keys = if (tick / 60) % 2 == 0 {
                KeyMask::of(&[Key::Left])
            } else {
                KeyMask::of(&[Key::Right])
            };

            let removed = characters.update(&world, |c| {
                if c.id == player {
                    keys
                } else if c.id == walker {
                    walker_keys
                } else {
                    KeyMask::NONE
                }
            });
            for id in removed {
                info!("Tick {}: character {} left the level", tick, id);
            }

            for character in characters.all() {
                let state = character.state();
                if last_states.insert(character.id, state) != Some(state) {
                    info!(
                        "Tick {}: {} is {} at ({:.1}, {:.1})",
                        tick,
                        character.name,
                        state,
                        unsigned_zero(character.position().x),
                        unsigned_zero(character.position().y)
                    );
                }
            }
        }
    }

    match characters.get(player) {
        Some(climber) => info!(
            "Done after {} ticks: highest altitude {:.1} ({} records)",
            tick,
            unsigned_zero(climber.highest_altitude()),
            climber.altitude_records()
        ),
        None => info!("Done after {} ticks: the climber fell", tick),
    }

    Ok(())
}

/// Two floors of bricks with an icy stretch, a hole to jump through and a cloud
fn build_level(assets: &AssetManager) -> Result<CollisionWorld> {
    let brick = assets.sprite_sheet(BRICK_SHEET)?;
    let ice = assets.sprite_sheet(ICE_SHEET)?;
    let cloud = assets.sprite_sheet(CLOUD_SHEET)?;

    let first_frame = |sheet: &Arc<SpriteSheet>| {
        sheet
            .animations()
            .first()
            .and_then(|animation| animation.frame(0))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Sprite sheet {} has no frames", sheet.id))
    };
    let brick = first_frame(&brick)?;
    let ice = first_frame(&ice)?;
    let cloud = first_frame(&cloud)?;

    let mut world = CollisionWorld::new();
    let mut owner: EntityId = 1;

    // Ground floor
    for column in 0..16 {
        world.add_frame_object(owner, Vec2::new(column as f32 * 16.0, 0.0), &brick, SurfaceType::Simple);
        owner += 1;
    }

    // First floor: ice on the left, a hole, bricks on the right
    for column in 0..16 {
        let x = column as f32 * 16.0;
        match column {
            0..=5 => world.add_frame_object(owner, Vec2::new(x, 56.0), &ice, SurfaceType::Sliding),
            6..=8 => continue,
            _ => world.add_frame_object(owner, Vec2::new(x, 56.0), &brick, SurfaceType::Simple),
        }
        owner += 1;
    }

    world.add_frame_object(CLOUD, Vec2::new(60.0, 110.0), &cloud, SurfaceType::Mobile);

    info!("Level built with {} objects", world.object_count());
    Ok(world)
}

fn sheet_or_warn(assets: &AssetManager, id: ObjectId) -> Option<Arc<SpriteSheet>> {
    match assets.sprite_sheet(id) {
        Ok(sheet) => Some(sheet),
        Err(err) => {
            warn!("{}; falling back to plain collision boxes", err);
            None
        }
    }
}

/// Print -0.0 as 0.0
fn unsigned_zero(value: f32) -> f32 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
