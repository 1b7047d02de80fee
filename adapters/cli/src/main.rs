#![deny(unsafe_code, dead_code, unused_results, non_snake_case)]

//! Headless driver: loads a level, runs the simulation for a fixed number
//! of ticks, and reports the draw traffic and final sprite states. Input
//! events are injected from the command line instead of a keyboard.

mod assets;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pondlife_core::{
    CommandSet, DrawQueue, GameTime, InputAction, InputEvent, InputQueue, KeyCode,
    PairInteraction, SpriteId,
};
use pondlife_system_behavior::{BehaviorRegistry, PLAYER_ROLE, STATIONARY_ROLE};
use pondlife_system_interaction::{InteractionRegistry, PredatorPreyPair};
use pondlife_world::{query, step, Level};

use crate::assets::{asset_base, FileCatalog};

/// A key press scheduled for a specific tick, written as `tick:key`.
#[derive(Debug, Clone, Copy)]
struct ScheduledPress {
    tick: GameTime,
    key: KeyCode,
}

fn parse_press(text: &str) -> Result<ScheduledPress> {
    let (tick, key) = text
        .split_once(':')
        .with_context(|| format!("expected tick:key, got {text:?}"))?;
    Ok(ScheduledPress {
        tick: tick.parse().with_context(|| format!("bad tick in {text:?}"))?,
        key: KeyCode::new(key.parse().with_context(|| format!("bad key in {text:?}"))?),
    })
}

#[derive(Parser, Debug)]
#[command(about = "Tick-driven pond simulation")]
struct Args {
    /// Level file to load.
    level: PathBuf,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 100)]
    ticks: GameTime,

    /// Screen width in pixels, for the viewport report.
    #[arg(long, default_value_t = 640)]
    screen_width: i32,

    /// Screen height in pixels, for the viewport report.
    #[arg(long, default_value_t = 480)]
    screen_height: i32,

    /// Key presses to inject, as repeated `tick:key` pairs.
    #[arg(long = "press", value_parser = parse_press)]
    presses: Vec<ScheduledPress>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let text = fs::read_to_string(&args.level)
        .with_context(|| format!("reading level {}", args.level.display()))?;
    let lines: Vec<&str> = text.lines().collect();
    let catalog = FileCatalog::new(asset_base(&args.level));

    let pair_interactions: Vec<Box<dyn PairInteraction>> = vec![Box::new(
        PredatorPreyPair::new(STATIONARY_ROLE, PLAYER_ROLE),
    )];
    let mut level = Level::load(
        &lines,
        &catalog,
        &BehaviorRegistry,
        &InteractionRegistry::new(STATIONARY_ROLE, PLAYER_ROLE),
        pair_interactions,
        &CommandSet::standard_movement(),
    )
    .with_context(|| format!("loading level {}", args.level.display()))?;
    if level.sprite_count() == 0 {
        bail!("level {} contains no sprites", args.level.display());
    }
    log::info!(
        "loaded {}x{} tile map with {} sprites",
        level.grid().width_tiles(),
        level.grid().height_tiles(),
        level.sprite_count()
    );

    let mut inputs = InputQueue::default();
    let mut draws = DrawQueue::default();
    let mut frames_drawn: u64 = 0;

    for now in 1..=args.ticks {
        for press in args.presses.iter().filter(|p| p.tick == now) {
            inputs
                .push(InputEvent {
                    key: press.key,
                    action: InputAction::Pressed,
                })
                .context("input channel overflowed")?;
        }
        step(&mut level, &mut inputs, now, &mut draws)
            .with_context(|| format!("tick {now} failed"))?;
        while let Some(request) = draws.pop() {
            frames_drawn += 1;
            log::debug!(
                "tick {now}: frame {} at ({}, {})",
                request.frame.get(),
                request.x,
                request.y
            );
        }
    }

    let anchor = query::find_role(&level, PLAYER_ROLE).unwrap_or(SpriteId::new(0));
    let viewport = query::viewport(&level, anchor, args.screen_width, args.screen_height);
    let tiles = query::visible_tiles(&level, viewport, args.screen_width, args.screen_height);

    println!(
        "{} ticks, {} sprite frames, {} visible tiles at viewport ({}, {})",
        args.ticks,
        frames_drawn,
        tiles.len(),
        viewport.x,
        viewport.y
    );
    for observation in query::observations(&level) {
        let target = observation
            .target
            .map_or("-".to_owned(), |t| format!("({}, {})", t.x(), t.y()));
        println!(
            "sprite {} [{}] at ({}, {}) target {} energy {}",
            observation.id.get(),
            observation.roles.join(","),
            observation.location.x(),
            observation.location.y(),
            target,
            observation.energy
        );
    }
    Ok(())
}
