//! Sprite kinematic state and the capability traits plugged into it.
//!
//! A sprite's observable condition is a small record: where it is, where it
//! is going, when the move started and when it completes, plus an energy
//! level. Behaviors decide goals, interactions adjust state based on other
//! sprites, and the level drives both through the traits defined here.

use crate::{
    coordinate_change, distance, Command, CommandSet, GameTime, PixelPoint, SpriteId,
};

/// Energy every sprite starts with.
pub const STARTING_ENERGY: i32 = 100;

/// Kinematic and vital state of one sprite.
///
/// Movement is a committed interval: once a command picks a goal, `start`,
/// `end`, `start_time` and `completion_time` are fixed, and the current
/// position is re-derived from them on every advance. Positions are never
/// accumulated incrementally, so repeated advances at the same time are
/// idempotent.
#[derive(Debug, Clone)]
pub struct SpriteState {
    current: PixelPoint,
    start: PixelPoint,
    end: Option<PixelPoint>,
    start_time: GameTime,
    completion_time: GameTime,
    state_changed_at: GameTime,
    energy: i32,
    current_command: Option<Command>,
}

impl SpriteState {
    /// Creates a resting sprite at the provided position with full energy
    /// and no committed move.
    #[must_use]
    pub fn new(position: PixelPoint) -> Self {
        Self {
            current: position,
            start: position,
            end: None,
            start_time: 0,
            completion_time: 0,
            state_changed_at: 0,
            energy: STARTING_ENERGY,
            current_command: None,
        }
    }

    /// Position the sprite currently occupies.
    #[must_use]
    pub const fn current(&self) -> PixelPoint {
        self.current
    }

    /// Position the committed move departed from.
    #[must_use]
    pub const fn start(&self) -> PixelPoint {
        self.start
    }

    /// Goal of the committed move, if one exists.
    #[must_use]
    pub const fn end(&self) -> Option<PixelPoint> {
        self.end
    }

    /// Time the committed move began.
    #[must_use]
    pub const fn start_time(&self) -> GameTime {
        self.start_time
    }

    /// Time the committed move completes.
    #[must_use]
    pub const fn completion_time(&self) -> GameTime {
        self.completion_time
    }

    /// Last time this state was updated by an advance.
    #[must_use]
    pub const fn state_changed_at(&self) -> GameTime {
        self.state_changed_at
    }

    /// Remaining energy. Zero means the sprite is dead.
    #[must_use]
    pub const fn energy(&self) -> i32 {
        self.energy
    }

    /// Whether the sprite has run out of energy.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.energy <= 0
    }

    /// Command currently governing the sprite, if any.
    #[must_use]
    pub const fn current_command(&self) -> Option<&Command> {
        self.current_command.as_ref()
    }

    /// Whether the committed movement window has elapsed at `now`.
    #[must_use]
    pub const fn move_elapsed(&self, now: GameTime) -> bool {
        now >= self.completion_time
    }

    /// Replaces the governing command without touching the movement
    /// interval.
    pub fn set_command(&mut self, command: Command) {
        self.current_command = Some(command);
    }

    /// Adjusts energy by `delta`, clamping at zero. A later gain can bring
    /// a sprite back from zero.
    pub fn change_energy(&mut self, delta: i32) {
        self.energy = self.energy.saturating_add(delta).max(0);
    }

    /// Commits a new move: from the current position toward `target` under
    /// `command`, starting at `now`. The completion time is the travel
    /// distance over `velocity`, rounded to the nearest tick.
    pub fn commit_move(
        &mut self,
        command: Command,
        target: PixelPoint,
        now: GameTime,
        velocity: f32,
    ) {
        let travel = distance(self.current, target);
        self.start = self.current;
        self.end = Some(target);
        self.start_time = now;
        self.completion_time = now + (travel / f64::from(velocity)).round() as GameTime;
        self.current_command = Some(command);
    }

    /// Re-derives the current position for the moment `now` from the
    /// committed interval and records the update time.
    pub fn advance(&mut self, now: GameTime) {
        self.state_changed_at = now;
        if let Some(end) = self.end {
            self.current = PixelPoint::new(
                coordinate_change(
                    self.start.x(),
                    end.x(),
                    self.start_time,
                    self.completion_time,
                    now,
                ),
                coordinate_change(
                    self.start.y(),
                    end.y(),
                    self.start_time,
                    self.completion_time,
                    now,
                ),
            );
        }
    }
}

/// Fixed movement parameters configured per sprite.
#[derive(Debug, Clone, Copy)]
pub struct SpriteKinetics {
    /// Movement speed in pixels per time unit.
    pub velocity: f32,
    /// Furthest the sprite reacts or moves in one decision, in tiles.
    pub max_move_tiles: f32,
}

/// Read-only snapshot of another sprite, handed to interactions instead of
/// a live reference.
#[derive(Debug, Clone)]
pub struct SpriteObservation {
    /// Identifier of the observed sprite.
    pub id: SpriteId,
    /// Where the sprite currently is.
    pub location: PixelPoint,
    /// Goal of its committed move, if any.
    pub target: Option<PixelPoint>,
    /// Its movement speed in pixels per time unit.
    pub velocity: f32,
    /// Its reaction range in tiles.
    pub max_move_tiles: f32,
    /// Its remaining energy.
    pub energy: i32,
    /// Role tags the sprite was configured with.
    pub roles: Vec<String>,
}

impl SpriteObservation {
    /// Whether the observed sprite carries the provided role tag.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// A movement strategy: decides which goal a sprite commits to.
///
/// Behaviors are stateful per sprite and are driven once per input event or
/// idle tick. They must leave the state coherent on every call: either a
/// newly committed move or the existing one advanced to `now`.
pub trait Behavior {
    /// Called once after the sprite is fully configured, before the first
    /// tick.
    fn initialize(&mut self, state: &mut SpriteState, velocity: f32, commands: &CommandSet);

    /// Reacts to an explicit command with a pre-resolved map target.
    /// `target` is `None` when the command's goal tile could not be found.
    fn select_goal_with_command(
        &mut self,
        state: &mut SpriteState,
        commands: &CommandSet,
        command: Option<&Command>,
        target: Option<PixelPoint>,
        now: GameTime,
    );

    /// Reacts to an idle tick with no new command.
    fn select_goal(&mut self, state: &mut SpriteState, commands: &CommandSet, now: GameTime);
}

/// A unilateral interaction: one sprite reacting to everything else it can
/// observe this tick.
pub trait Interaction {
    /// Processes the acting sprite against the tick's observations.
    ///
    /// `others` holds one observation per sprite in level order, including
    /// the actor itself; `distances` is the actor's row of the tile
    /// distance matrix, indexed the same way. Implementations skip the
    /// actor's own entry.
    #[allow(clippy::too_many_arguments)]
    fn process(
        &self,
        me: SpriteId,
        state: &mut SpriteState,
        commands: &CommandSet,
        kinetics: &SpriteKinetics,
        others: &[SpriteObservation],
        distances: &[u32],
        now: GameTime,
    );
}

/// Mutable view of one participant in a pairwise interaction.
pub struct PairParticipant<'a> {
    /// The participant's kinematic state.
    pub state: &'a mut SpriteState,
    /// The participant's command vocabulary.
    pub commands: &'a CommandSet,
    /// The participant's movement parameters.
    pub kinetics: &'a SpriteKinetics,
    /// The participant's role tags.
    pub roles: &'a [String],
}

/// A bilateral interaction resolved by the level for sprite pairs within
/// range.
pub trait PairInteraction {
    /// Tile distance at or under which the pair interacts.
    fn interaction_distance(&self) -> u32;

    /// The two role tags this interaction applies to. The level only
    /// invokes [`PairInteraction::interact`] for pairs where each sprite
    /// carries one of the two roles.
    fn interacting_roles(&self) -> [&str; 2];

    /// Resolves the interaction. Participants arrive in level order;
    /// implementations assign roles from the participants' tags, not from
    /// argument position.
    fn interact(&self, a: PairParticipant<'_>, b: PairParticipant<'_>, now: GameTime);
}
