#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Predator and prey interaction rules.
//!
//! Three rules cover the hunt: the prey's own check for an unavoidable
//! ambush, the predator's scan for catchable prey, and the close-quarters
//! pairwise resolution the level applies when the two are within touching
//! distance. All three lean on the interception solver: a hunt only
//! matters if the predator can actually reach the prey's path in time.

use pondlife_core::{
    intercept, CommandSet, GameTime, Interaction, PairInteraction, PairParticipant, SpriteId,
    SpriteKinetics, SpriteObservation, SpriteState,
};
use pondlife_world::InteractionSource;

/// Command a predator commits when chasing prey.
pub const HUNT_COMMAND: &str = "HUNT";

/// Command sprites revert to when a hunt ends.
const DEFAULT_COMMAND: &str = "STAY";

/// Energy lost by prey caught in an unavoidable ambush.
const AMBUSH_ENERGY_LOSS: i32 = -100_000;

/// Energy lost by prey each tick it is within a predator's reach.
const CONTACT_ENERGY_LOSS: i32 = -10_000;

/// Energy gained by a predator with prey in reach.
const PREDATOR_ENERGY_GAIN: i32 = 100;

/// Tile distance at which the pairwise rule applies.
const CONTACT_DISTANCE: u32 = 2;

fn revert_to_default(state: &mut SpriteState, commands: &CommandSet) {
    match commands.by_name(DEFAULT_COMMAND) {
        Some(command) => state.set_command(command.clone()),
        None => log::error!("command set has no {DEFAULT_COMMAND} command to fall back to"),
    }
}

fn is_hunting(state: &SpriteState) -> bool {
    state
        .current_command()
        .is_some_and(|command| command.name() == HUNT_COMMAND)
}

/// The prey's own ambush check.
///
/// Scans for predators close enough to react and able to intercept the
/// prey's committed path. The first such predator is fatal: the loss is
/// far larger than any sprite's energy pool.
#[derive(Debug)]
pub struct AmbushedPrey {
    predator_role: String,
}

impl AmbushedPrey {
    /// Creates the check against predators carrying `predator_role`.
    #[must_use]
    pub fn new(predator_role: impl Into<String>) -> Self {
        Self {
            predator_role: predator_role.into(),
        }
    }
}

impl Interaction for AmbushedPrey {
    fn process(
        &self,
        me: SpriteId,
        state: &mut SpriteState,
        _commands: &CommandSet,
        kinetics: &SpriteKinetics,
        others: &[SpriteObservation],
        distances: &[u32],
        _now: GameTime,
    ) {
        if state.is_dead() {
            return;
        }
        for (index, other) in others.iter().enumerate() {
            if other.id == me || !other.has_role(&self.predator_role) {
                continue;
            }
            if distances[index] as f32 > other.max_move_tiles {
                continue;
            }
            let ambush = intercept(
                state.current(),
                state.end(),
                kinetics.velocity,
                other.location,
                other.velocity,
            );
            if ambush.is_some() {
                log::debug!("sprite {} is ambushed by sprite {}", me.get(), other.id.get());
                state.change_energy(AMBUSH_ENERGY_LOSS);
                break;
            }
        }
    }
}

/// The predator's hunt.
///
/// Without a governing command the predator settles into the default.
/// A finished hunt reverts to the default at the hunt's goal. Otherwise
/// the predator scans for prey within its reach whose path it can
/// intercept, commits a hunt toward the ambush point, and feeds.
#[derive(Debug)]
pub struct AmbushPredator {
    prey_role: String,
}

impl AmbushPredator {
    /// Creates the hunt against prey carrying `prey_role`.
    #[must_use]
    pub fn new(prey_role: impl Into<String>) -> Self {
        Self {
            prey_role: prey_role.into(),
        }
    }
}

impl Interaction for AmbushPredator {
    fn process(
        &self,
        me: SpriteId,
        state: &mut SpriteState,
        commands: &CommandSet,
        kinetics: &SpriteKinetics,
        others: &[SpriteObservation],
        distances: &[u32],
        now: GameTime,
    ) {
        if state.is_dead() {
            return;
        }
        if state.current_command().is_none() {
            revert_to_default(state, commands);
            return;
        }
        if is_hunting(state) && state.move_elapsed(now) {
            state.advance(now);
            revert_to_default(state, commands);
            return;
        }
        for (index, other) in others.iter().enumerate() {
            if other.id == me || !other.has_role(&self.prey_role) || other.energy <= 0 {
                continue;
            }
            if distances[index] as f32 > kinetics.max_move_tiles {
                continue;
            }
            let Some(point) = intercept(
                other.location,
                other.target,
                other.velocity,
                state.current(),
                kinetics.velocity,
            ) else {
                continue;
            };
            state.change_energy(PREDATOR_ENERGY_GAIN);
            if !is_hunting(state) {
                match commands.by_name(HUNT_COMMAND).cloned() {
                    Some(hunt) => state.commit_move(hunt, point, now, kinetics.velocity),
                    None => {
                        log::error!("sprite {} has no {HUNT_COMMAND} command", me.get());
                    }
                }
            }
            state.advance(now);
            break;
        }
    }
}

/// Close-quarters resolution for a predator and prey within touching
/// distance.
///
/// The predator is identified by role tag, never by argument position. A
/// predator already mid-hunt only advances along it, settling at the goal
/// once the window runs out. Otherwise, if the prey is alive and its path
/// can still be intercepted, the predator feeds, the prey takes heavy
/// damage, and a hunt is committed toward the ambush point.
#[derive(Debug)]
pub struct PredatorPreyPair {
    predator_role: String,
    prey_role: String,
}

impl PredatorPreyPair {
    /// Creates the rule for the provided role pair.
    #[must_use]
    pub fn new(predator_role: impl Into<String>, prey_role: impl Into<String>) -> Self {
        Self {
            predator_role: predator_role.into(),
            prey_role: prey_role.into(),
        }
    }
}

impl PairInteraction for PredatorPreyPair {
    fn interaction_distance(&self) -> u32 {
        CONTACT_DISTANCE
    }

    fn interacting_roles(&self) -> [&str; 2] {
        [&self.predator_role, &self.prey_role]
    }

    fn interact(&self, a: PairParticipant<'_>, b: PairParticipant<'_>, now: GameTime) {
        let a_is_predator = a.roles.iter().any(|role| role == &self.predator_role);
        let (predator, prey) = if a_is_predator { (a, b) } else { (b, a) };

        // A committed hunt runs to completion: no feeding, no fresh strike
        // until a later tick finds the predator at rest again.
        if is_hunting(predator.state) {
            predator.state.advance(now);
            if predator.state.move_elapsed(now) {
                revert_to_default(predator.state, predator.commands);
            }
            return;
        }
        if prey.state.is_dead() {
            return;
        }
        let ambush = intercept(
            prey.state.current(),
            prey.state.end(),
            prey.kinetics.velocity,
            predator.state.current(),
            predator.kinetics.velocity,
        );
        let Some(point) = ambush else {
            return;
        };
        predator.state.change_energy(PREDATOR_ENERGY_GAIN);
        prey.state.change_energy(CONTACT_ENERGY_LOSS);
        if !is_hunting(predator.state) {
            match predator.commands.by_name(HUNT_COMMAND).cloned() {
                Some(hunt) => {
                    predator
                        .state
                        .commit_move(hunt, point, now, predator.kinetics.velocity);
                }
                None => log::error!("predator has no {HUNT_COMMAND} command"),
            }
        }
        predator.state.advance(now);
    }
}

/// Resolves the built-in interactions per role tag.
#[derive(Debug)]
pub struct InteractionRegistry {
    predator_role: String,
    prey_role: String,
}

impl InteractionRegistry {
    /// Creates a registry for the provided role pair.
    #[must_use]
    pub fn new(predator_role: impl Into<String>, prey_role: impl Into<String>) -> Self {
        Self {
            predator_role: predator_role.into(),
            prey_role: prey_role.into(),
        }
    }
}

impl InteractionSource for InteractionRegistry {
    fn interactions(&self, role: &str) -> Vec<Box<dyn Interaction>> {
        if role == self.prey_role {
            vec![Box::new(AmbushedPrey::new(self.predator_role.clone()))]
        } else if role == self.predator_role {
            vec![Box::new(AmbushPredator::new(self.prey_role.clone()))]
        } else {
            Vec::new()
        }
    }
}
