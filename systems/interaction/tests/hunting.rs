//! Full predator and prey scenarios driven through a loaded level.

use pondlife_core::{
    keys, Animation, CommandSet, DrawQueue, FrameHandle, InputAction, InputEvent, InputQueue,
    PairInteraction, PixelPoint, SpriteId,
};
use pondlife_system_behavior::{BehaviorRegistry, PLAYER_ROLE, STATIONARY_ROLE};
use pondlife_system_interaction::{InteractionRegistry, PredatorPreyPair};
use pondlife_world::{query, step, AssetCatalog, AssetError, Level, TileArt};

struct PondCatalog {
    frog_start: &'static str,
    plant_start: &'static str,
}

impl AssetCatalog for PondCatalog {
    fn tile_art(&self, path: &str) -> Result<TileArt, AssetError> {
        match path {
            "art/grass" => Ok(TileArt {
                handle: FrameHandle::new(100),
                size: 16,
            }),
            "art/water" => Ok(TileArt {
                handle: FrameHandle::new(101),
                size: 16,
            }),
            _ => Err(AssetError {
                path: path.to_owned(),
                reason: "unknown tile art".to_owned(),
            }),
        }
    }

    fn sprite_descriptor(&self, path: &str) -> Result<Vec<(String, String)>, AssetError> {
        match path {
            "frog" => Ok(vec![
                ("VELOCITY".to_owned(), "2".to_owned()),
                ("START_AT".to_owned(), self.frog_start.to_owned()),
                ("MAX_MOVE".to_owned(), "8".to_owned()),
                ("COMMAND.STAY".to_owned(), "0;0".to_owned()),
                ("BEHAVIOR.1".to_owned(), PLAYER_ROLE.to_owned()),
                ("RIGHT".to_owned(), "anim/hop;W".to_owned()),
                ("STAY".to_owned(), "anim/hop".to_owned()),
            ]),
            "plant" => Ok(vec![
                ("VELOCITY".to_owned(), "4".to_owned()),
                ("START_AT".to_owned(), self.plant_start.to_owned()),
                ("MAX_MOVE".to_owned(), "3".to_owned()),
                ("COMMAND.STAY".to_owned(), "0;0".to_owned()),
                ("COMMAND.HUNT".to_owned(), "0;0".to_owned()),
                ("BEHAVIOR.1".to_owned(), STATIONARY_ROLE.to_owned()),
                ("STAY".to_owned(), "anim/sway".to_owned()),
                ("HUNT".to_owned(), "anim/sway".to_owned()),
            ]),
            _ => Err(AssetError {
                path: path.to_owned(),
                reason: "unknown descriptor".to_owned(),
            }),
        }
    }

    fn animation(&self, path: &str) -> Result<Animation, AssetError> {
        match path {
            "anim/hop" | "anim/sway" => Animation::new(
                vec![FrameHandle::new(1), FrameHandle::new(2)],
                vec![0.5, 0.5],
            )
            .map_err(|e| AssetError {
                path: path.to_owned(),
                reason: e.to_string(),
            }),
            _ => Err(AssetError {
                path: path.to_owned(),
                reason: "unknown animation".to_owned(),
            }),
        }
    }
}

fn load(lines: &[&str], catalog: &PondCatalog) -> Level {
    Level::load(
        lines,
        catalog,
        &BehaviorRegistry,
        &InteractionRegistry::new(STATIONARY_ROLE, PLAYER_ROLE),
        vec![Box::new(PredatorPreyPair::new(STATIONARY_ROLE, PLAYER_ROLE))
            as Box<dyn PairInteraction>],
        &CommandSet::standard_movement(),
    )
    .expect("level loads")
}

fn press_right(inputs: &mut InputQueue) {
    inputs
        .push(InputEvent {
            key: keys::RIGHT,
            action: InputAction::Pressed,
        })
        .expect("queue input");
}

#[test]
fn a_frog_hopping_past_a_plant_is_ambushed() {
    // Plant at tile (4, 1) with a 3-tile reach; the frog's path to the
    // water at tile (7, 1) leads straight through it.
    let mut level = load(
        &[
            "G:art/grass",
            "W:art/water",
            "sprite:frog",
            "sprite:plant",
            "GGGGGGGW",
            "GGGGGGGW",
            "GGGGGGGW",
        ],
        &PondCatalog {
            frog_start: "0;16",
            plant_start: "64;16",
        },
    );
    let mut inputs = InputQueue::default();
    let mut draws = DrawQueue::default();
    let frog = SpriteId::new(0);
    let plant = SpriteId::new(1);

    press_right(&mut inputs);
    step(&mut level, &mut inputs, 1, &mut draws).expect("tick");

    // The frog committed to the water but is still 4 tiles from the
    // plant, outside its reach.
    let state = query::sprite_state(&level, frog).expect("frog");
    assert_eq!(state.end(), Some(PixelPoint::new(112, 16)));
    assert!(!state.is_dead());

    step(&mut level, &mut inputs, 2, &mut draws).expect("tick");

    // One hop later the plant can reach the frog's path and the ambush
    // is unavoidable.
    let state = query::sprite_state(&level, frog).expect("frog");
    assert!(state.is_dead());
    assert_eq!(state.energy(), 0);
    let plant_state = query::sprite_state(&level, plant).expect("plant");
    assert_eq!(plant_state.energy(), 200);

    // The kill happened mid-path, well short of the water.
    assert!(state.current().x() < 112);
    let killed_at = state.current();

    // The dead frog stays put and keeps being drawn; the plant's hunt
    // runs out and it settles back into its default command.
    let drawn_before = draws.len();
    step(&mut level, &mut inputs, 3, &mut draws).expect("tick");
    assert_eq!(draws.len(), drawn_before + 2);
    let state = query::sprite_state(&level, frog).expect("frog");
    assert_eq!(state.current(), killed_at);
    let plant_state = query::sprite_state(&level, plant).expect("plant");
    assert_eq!(
        plant_state.current_command().map(|c| c.name().to_owned()),
        Some("STAY".to_owned())
    );
    assert_eq!(plant_state.current(), PixelPoint::new(64, 16));
}

#[test]
fn a_frog_outside_the_plants_reach_crosses_safely() {
    // The plant sits 4 tiles above the frog's path, one tile beyond its
    // reach for the whole crossing.
    let mut level = load(
        &[
            "G:art/grass",
            "W:art/water",
            "sprite:frog",
            "sprite:plant",
            "GGGGGGGW",
            "GGGGGGGW",
            "GGGGGGGW",
            "GGGGGGGW",
            "GGGGGGGW",
        ],
        &PondCatalog {
            frog_start: "0;64",
            plant_start: "0;0",
        },
    );
    let mut inputs = InputQueue::default();
    let mut draws = DrawQueue::default();
    let frog = SpriteId::new(0);
    let plant = SpriteId::new(1);

    press_right(&mut inputs);
    for now in 1..=58 {
        step(&mut level, &mut inputs, now, &mut draws).expect("tick");
        while draws.pop().is_some() {}
    }

    let state = query::sprite_state(&level, frog).expect("frog");
    assert!(!state.is_dead());
    assert_eq!(state.energy(), 100);
    assert_eq!(state.current(), PixelPoint::new(112, 64));
    // With the hop finished, the frog is back on its default command.
    assert_eq!(
        state.current_command().map(|c| c.name().to_owned()),
        Some("STAY".to_owned())
    );
    // The plant never found anything to hunt.
    let plant_state = query::sprite_state(&level, plant).expect("plant");
    assert_eq!(plant_state.energy(), 100);
    assert_eq!(plant_state.current(), PixelPoint::new(0, 0));
}
