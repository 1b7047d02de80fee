#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement strategies: the input-driven wanderer and the fixture that
//! never moves, plus the registry levels resolve them from.

use pondlife_core::{Behavior, Command, CommandSet, GameTime, PixelPoint, SpriteState};
use pondlife_world::BehaviorSource;

/// Behavior name and role tag for input-driven sprites.
pub const PLAYER_ROLE: &str = "PLAYER";

/// Behavior name and role tag for fixed sprites.
pub const STATIONARY_ROLE: &str = "IMMOVABLE";

/// Command a sprite reverts to when it has nothing better to do.
const DEFAULT_COMMAND: &str = "STAY";

fn revert_to_default(state: &mut SpriteState, commands: &CommandSet) {
    match commands.by_name(DEFAULT_COMMAND) {
        Some(command) => state.set_command(command.clone()),
        None => log::error!("command set has no {DEFAULT_COMMAND} command to fall back to"),
    }
}

/// Input-driven movement.
///
/// A pressed command commits a new move only when the sprite is free to
/// take one: it has no governing command, the governing command is
/// interruptible, or its movement window has elapsed. Once a committed
/// move's window runs out, an idle tick lands the sprite at its goal and
/// reverts it to the default command.
#[derive(Debug, Default)]
pub struct PlayerDriven {
    velocity: f32,
}

impl PlayerDriven {
    fn may_commit(state: &SpriteState, now: GameTime) -> bool {
        match state.current_command() {
            None => true,
            Some(command) => command.is_interruptible() || state.move_elapsed(now),
        }
    }

    fn finish_elapsed_move(&self, state: &mut SpriteState, commands: &CommandSet, now: GameTime) {
        if state.current_command().is_none() {
            revert_to_default(state, commands);
        } else if state.move_elapsed(now) {
            state.advance(now);
            revert_to_default(state, commands);
        }
    }
}

impl Behavior for PlayerDriven {
    fn initialize(&mut self, state: &mut SpriteState, velocity: f32, commands: &CommandSet) {
        self.velocity = velocity;
        revert_to_default(state, commands);
    }

    fn select_goal_with_command(
        &mut self,
        state: &mut SpriteState,
        commands: &CommandSet,
        command: Option<&Command>,
        target: Option<PixelPoint>,
        now: GameTime,
    ) {
        if let (Some(command), Some(target)) = (command, target) {
            if Self::may_commit(state, now) {
                state.commit_move(command.clone(), target, now, self.velocity);
                return;
            }
        }
        self.finish_elapsed_move(state, commands, now);
    }

    fn select_goal(&mut self, state: &mut SpriteState, commands: &CommandSet, now: GameTime) {
        self.finish_elapsed_move(state, commands, now);
    }
}

/// A fixture: adopts the default command once and then ignores every
/// input and tick.
#[derive(Debug, Default)]
pub struct Stationary;

impl Behavior for Stationary {
    fn initialize(&mut self, state: &mut SpriteState, _velocity: f32, commands: &CommandSet) {
        revert_to_default(state, commands);
    }

    fn select_goal_with_command(
        &mut self,
        _state: &mut SpriteState,
        _commands: &CommandSet,
        _command: Option<&Command>,
        _target: Option<PixelPoint>,
        _now: GameTime,
    ) {
    }

    fn select_goal(&mut self, _state: &mut SpriteState, _commands: &CommandSet, _now: GameTime) {}
}

/// Resolves the built-in behaviors by name.
#[derive(Debug, Default)]
pub struct BehaviorRegistry;

impl BehaviorSource for BehaviorRegistry {
    fn behavior(&self, name: &str) -> Option<Box<dyn Behavior>> {
        match name {
            PLAYER_ROLE => Some(Box::<PlayerDriven>::default()),
            STATIONARY_ROLE => Some(Box::<Stationary>::default()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BehaviorRegistry, PlayerDriven, Stationary, PLAYER_ROLE, STATIONARY_ROLE};
    use pondlife_core::{Behavior, Command, CommandSet, PixelPoint, SpriteState};
    use pondlife_world::BehaviorSource;

    fn commands() -> CommandSet {
        let mut set = CommandSet::standard_movement();
        set.add(Command::new("STAY", 0, 0, false, None)).expect("add");
        set
    }

    fn player_at_origin() -> (PlayerDriven, SpriteState, CommandSet) {
        let commands = commands();
        let mut behavior = PlayerDriven::default();
        let mut state = SpriteState::new(PixelPoint::new(0, 0));
        behavior.initialize(&mut state, 2.0, &commands);
        (behavior, state, commands)
    }

    #[test]
    fn initialization_adopts_the_default_command() {
        let (_, state, _) = player_at_origin();
        assert_eq!(state.current_command().map(Command::name), Some("STAY"));
    }

    #[test]
    fn a_command_with_a_target_commits_a_move() {
        let (mut behavior, mut state, commands) = player_at_origin();
        let right = commands.by_name("RIGHT").cloned().expect("RIGHT");
        behavior.select_goal_with_command(
            &mut state,
            &commands,
            Some(&right),
            Some(PixelPoint::new(10, 0)),
            0,
        );
        assert_eq!(state.end(), Some(PixelPoint::new(10, 0)));
        assert_eq!(state.completion_time(), 5);
        assert_eq!(state.current_command().map(Command::name), Some("RIGHT"));
    }

    #[test]
    fn a_running_move_blocks_new_commands_until_it_elapses() {
        let (mut behavior, mut state, commands) = player_at_origin();
        let right = commands.by_name("RIGHT").cloned().expect("RIGHT");
        let up = commands.by_name("UP").cloned().expect("UP");
        behavior.select_goal_with_command(
            &mut state,
            &commands,
            Some(&right),
            Some(PixelPoint::new(10, 0)),
            0,
        );
        // Key-bound commands are non-interruptible, so UP at tick 2 is
        // ignored.
        behavior.select_goal_with_command(
            &mut state,
            &commands,
            Some(&up),
            Some(PixelPoint::new(0, -10)),
            2,
        );
        assert_eq!(state.end(), Some(PixelPoint::new(10, 0)));
        // At tick 5 the window has elapsed and UP takes over.
        behavior.select_goal_with_command(
            &mut state,
            &commands,
            Some(&up),
            Some(PixelPoint::new(10, -10)),
            5,
        );
        assert_eq!(state.end(), Some(PixelPoint::new(10, -10)));
    }

    #[test]
    fn an_unresolved_target_never_commits() {
        let (mut behavior, mut state, commands) = player_at_origin();
        let right = commands.by_name("RIGHT").cloned().expect("RIGHT");
        behavior.select_goal_with_command(&mut state, &commands, Some(&right), None, 0);
        assert!(state.end().is_none());
        assert_eq!(state.current_command().map(Command::name), Some("STAY"));
    }

    #[test]
    fn an_elapsed_move_reverts_to_the_default_command() {
        let (mut behavior, mut state, commands) = player_at_origin();
        let right = commands.by_name("RIGHT").cloned().expect("RIGHT");
        behavior.select_goal_with_command(
            &mut state,
            &commands,
            Some(&right),
            Some(PixelPoint::new(10, 0)),
            0,
        );
        behavior.select_goal(&mut state, &commands, 6);
        assert_eq!(state.current(), PixelPoint::new(10, 0));
        assert_eq!(state.current_command().map(Command::name), Some("STAY"));
    }

    #[test]
    fn repeated_idle_ticks_are_idempotent() {
        let (mut behavior, mut state, commands) = player_at_origin();
        let right = commands.by_name("RIGHT").cloned().expect("RIGHT");
        behavior.select_goal_with_command(
            &mut state,
            &commands,
            Some(&right),
            Some(PixelPoint::new(10, 0)),
            0,
        );
        behavior.select_goal(&mut state, &commands, 6);
        let settled = state.current();
        behavior.select_goal(&mut state, &commands, 7);
        behavior.select_goal(&mut state, &commands, 8);
        assert_eq!(state.current(), settled);
        assert_eq!(state.current_command().map(Command::name), Some("STAY"));
    }

    #[test]
    fn stationary_ignores_commands_and_ticks() {
        let commands = commands();
        let mut behavior = Stationary;
        let mut state = SpriteState::new(PixelPoint::new(32, 32));
        behavior.initialize(&mut state, 1.0, &commands);
        let right = commands.by_name("RIGHT").cloned().expect("RIGHT");
        behavior.select_goal_with_command(
            &mut state,
            &commands,
            Some(&right),
            Some(PixelPoint::new(64, 32)),
            1,
        );
        behavior.select_goal(&mut state, &commands, 2);
        assert_eq!(state.current(), PixelPoint::new(32, 32));
        assert!(state.end().is_none());
        assert_eq!(state.current_command().map(Command::name), Some("STAY"));
    }

    #[test]
    fn registry_resolves_the_built_in_names() {
        let registry = BehaviorRegistry;
        assert!(registry.behavior(PLAYER_ROLE).is_some());
        assert!(registry.behavior(STATIONARY_ROLE).is_some());
        assert!(registry.behavior("GHOST").is_none());
    }
}
