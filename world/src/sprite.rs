//! The live sprite: configured state, behaviors, animations, and the
//! per-tick message handling that drives them.

use std::collections::HashMap;

use pondlife_core::{
    parse_command_description, Animation, Behavior, Command, CommandSet, DrawQueue, DrawRequest,
    GameTime, InputAction, InputEvent, Interaction, PairParticipant, PixelPoint, QueueOverflow,
    SpriteId, SpriteKinetics, SpriteObservation, SpriteState,
};

use crate::{AssetCatalog, BehaviorSource, InteractionSource, LevelError, TileGrid};

const KEY_VELOCITY: &str = "VELOCITY";
const KEY_MAX_MOVE: &str = "MAX_MOVE";
const KEY_START_AT: &str = "START_AT";
const PREFIX_COMMAND: &str = "COMMAND.";
const PREFIX_BEHAVIOR: &str = "BEHAVIOR.";

/// A sprite owned by a level: kinematic state plus everything configured
/// from its descriptor.
pub struct Sprite {
    id: SpriteId,
    state: SpriteState,
    kinetics: SpriteKinetics,
    roles: Vec<String>,
    commands: CommandSet,
    behaviors: Vec<Box<dyn Behavior>>,
    interactions: Vec<Box<dyn Interaction>>,
    animations: Vec<Animation>,
    bindings: HashMap<String, usize>,
    action_targets: HashMap<String, char>,
}

impl Sprite {
    /// Builds a sprite from descriptor entries.
    ///
    /// The descriptor is parsed in two passes: scalar settings, `COMMAND.*`
    /// registrations and `BEHAVIOR.*` selections first, then every
    /// remaining entry as an animation binding of the form
    /// `<command>=<animation path>[;<target tile symbol>]`. Bindings may
    /// only refer to commands that exist after the first pass. The
    /// `BEHAVIOR.*` names double as the sprite's role tags.
    pub(crate) fn from_descriptor(
        id: SpriteId,
        descriptor_path: &str,
        entries: &[(String, String)],
        catalog: &dyn AssetCatalog,
        behavior_source: &dyn BehaviorSource,
        interaction_source: &dyn InteractionSource,
        base_commands: &CommandSet,
    ) -> Result<Self, LevelError> {
        let mut velocity: Option<f32> = None;
        let mut max_move: Option<f32> = None;
        let mut start_at: Option<PixelPoint> = None;
        let mut commands = base_commands.clone();
        let mut behavior_entries: Vec<(&str, &str)> = Vec::new();
        let mut binding_entries: Vec<(&str, &str)> = Vec::new();

        for (key, value) in entries {
            if let Some(name) = key.strip_prefix(PREFIX_COMMAND) {
                commands.add(parse_command_description(name, value)?)?;
            } else if key.starts_with(PREFIX_BEHAVIOR) {
                behavior_entries.push((key.as_str(), value.as_str()));
            } else if key == KEY_VELOCITY {
                velocity = Some(parse_scalar(key, value)?);
            } else if key == KEY_MAX_MOVE {
                max_move = Some(parse_scalar(key, value)?);
            } else if key == KEY_START_AT {
                start_at = Some(parse_point(key, value)?);
            } else {
                binding_entries.push((key.as_str(), value.as_str()));
            }
        }

        let velocity = velocity.ok_or_else(|| missing(descriptor_path, KEY_VELOCITY))?;
        let max_move = max_move.ok_or_else(|| missing(descriptor_path, KEY_MAX_MOVE))?;
        let position = start_at.ok_or_else(|| missing(descriptor_path, KEY_START_AT))?;
        let kinetics = SpriteKinetics {
            velocity,
            max_move_tiles: max_move,
        };

        let mut animations: Vec<Animation> = Vec::new();
        let mut loaded_paths: HashMap<String, usize> = HashMap::new();
        let mut bindings: HashMap<String, usize> = HashMap::new();
        let mut action_targets: HashMap<String, char> = HashMap::new();
        for (command_name, value) in binding_entries {
            if commands.by_name(command_name).is_none() {
                return Err(LevelError::UnknownCommandBinding {
                    command: command_name.to_owned(),
                });
            }
            let (path, symbol) = match value.split_once(';') {
                Some((path, symbol)) => {
                    let mut chars = symbol.chars();
                    match (chars.next(), chars.next()) {
                        (Some(symbol), None) => (path, Some(symbol)),
                        _ => {
                            return Err(LevelError::MalformedDescriptorEntry {
                                key: command_name.to_owned(),
                                value: value.to_owned(),
                            })
                        }
                    }
                }
                None => (value, None),
            };
            let slot = match loaded_paths.get(path) {
                Some(slot) => *slot,
                None => {
                    let animation = catalog.animation(path)?;
                    animations.push(animation);
                    let slot = animations.len() - 1;
                    let _ = loaded_paths.insert(path.to_owned(), slot);
                    slot
                }
            };
            let _ = bindings.insert(command_name.to_owned(), slot);
            if let Some(symbol) = symbol {
                let _ = action_targets.insert(command_name.to_owned(), symbol);
            }
        }
        if animations.is_empty() {
            return Err(LevelError::NoAnimations {
                path: descriptor_path.to_owned(),
            });
        }

        // Behavior order follows the entry keys so descriptors can layer
        // strategies deterministically.
        behavior_entries.sort_by(|a, b| a.0.cmp(b.0));
        let mut behaviors: Vec<Box<dyn Behavior>> = Vec::new();
        for (_, name) in &behavior_entries {
            let behavior = behavior_source
                .behavior(name)
                .ok_or_else(|| LevelError::UnknownBehavior((*name).to_owned()))?;
            behaviors.push(behavior);
        }
        if behaviors.is_empty() {
            return Err(LevelError::NoBehaviors {
                path: descriptor_path.to_owned(),
            });
        }
        let roles: Vec<String> = behavior_entries
            .iter()
            .map(|(_, name)| (*name).to_owned())
            .collect();

        let mut interactions: Vec<Box<dyn Interaction>> = Vec::new();
        for role in &roles {
            interactions.extend(interaction_source.interactions(role));
        }

        let mut state = SpriteState::new(position);
        for behavior in &mut behaviors {
            behavior.initialize(&mut state, kinetics.velocity, &commands);
        }

        Ok(Self {
            id,
            state,
            kinetics,
            roles,
            commands,
            behaviors,
            interactions,
            animations,
            bindings,
            action_targets,
        })
    }

    /// Identifier assigned at level load.
    #[must_use]
    pub fn id(&self) -> SpriteId {
        self.id
    }

    /// The sprite's kinematic state.
    #[must_use]
    pub fn state(&self) -> &SpriteState {
        &self.state
    }

    /// The sprite's configured movement parameters.
    #[must_use]
    pub fn kinetics(&self) -> &SpriteKinetics {
        &self.kinetics
    }

    /// Role tags from the descriptor.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// Whether the sprite carries the provided role tag.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Read-only snapshot for this tick's interaction phase.
    pub(crate) fn observe(&self) -> SpriteObservation {
        SpriteObservation {
            id: self.id,
            location: self.state.current(),
            target: self.state.end(),
            velocity: self.kinetics.velocity,
            max_move_tiles: self.kinetics.max_move_tiles,
            energy: self.state.energy(),
            roles: self.roles.clone(),
        }
    }

    /// Handles one input event at `now`.
    ///
    /// Dead sprites ignore input entirely. A release is treated as an idle
    /// tick. A press resolves the bound command and its map target, hands
    /// both to every behavior, and the state is advanced to `now` whether
    /// or not a new goal was committed. Goal selection runs at most once
    /// per timestamp; later events in the same tick only re-advance.
    pub(crate) fn process_message(&mut self, event: InputEvent, now: GameTime, grid: &TileGrid) {
        if self.state.is_dead() {
            return;
        }
        if event.action == InputAction::Released {
            self.process_game_tick(now, grid);
            return;
        }
        if self.state.state_changed_at() < now {
            if let Some(command) = self.commands.by_key(event.key).cloned() {
                let target = self.resolve_target(&command, grid);
                for behavior in &mut self.behaviors {
                    behavior.select_goal_with_command(
                        &mut self.state,
                        &self.commands,
                        Some(&command),
                        target,
                        now,
                    );
                }
            } else {
                log::debug!("sprite {} ignores unbound key {}", self.id.get(), event.key.get());
            }
        }
        self.state.advance(now);
    }

    /// Handles an idle tick at `now`: behaviors pick a goal with no new
    /// command, then the state is advanced.
    pub(crate) fn process_game_tick(&mut self, now: GameTime, _grid: &TileGrid) {
        if self.state.is_dead() {
            return;
        }
        if self.state.state_changed_at() < now {
            for behavior in &mut self.behaviors {
                behavior.select_goal(&mut self.state, &self.commands, now);
            }
        }
        self.state.advance(now);
    }

    /// Map target for a pressed command: the nearest tile matching the
    /// command's target symbol along its direction. A command with no
    /// target symbol resolves nothing, so behaviors see the press but
    /// commit no move.
    fn resolve_target(&self, command: &Command, grid: &TileGrid) -> Option<PixelPoint> {
        let symbol = self.action_targets.get(command.name())?;
        grid.find_tile(
            self.state.current(),
            command,
            *symbol,
            self.kinetics.max_move_tiles,
        )
    }

    /// Runs every unilateral interaction configured for this sprite
    /// against the tick's observations.
    pub(crate) fn run_interactions(
        &mut self,
        others: &[SpriteObservation],
        distances: &[u32],
        now: GameTime,
    ) {
        for interaction in &self.interactions {
            interaction.process(
                self.id,
                &mut self.state,
                &self.commands,
                &self.kinetics,
                others,
                distances,
                now,
            );
        }
    }

    /// Mutable participant view for a pairwise interaction.
    pub(crate) fn pair_participant(&mut self) -> PairParticipant<'_> {
        PairParticipant {
            state: &mut self.state,
            commands: &self.commands,
            kinetics: &self.kinetics,
            roles: &self.roles,
        }
    }

    /// Emits this sprite's draw request for the moment `now`.
    ///
    /// The frame comes from the animation bound to the governing command.
    /// A sprite with no governing command, or one whose command has no
    /// binding, falls back to the first loaded animation's resting frame;
    /// that is an anomaly worth flagging but never worth losing a frame
    /// over. Dead sprites stay visible at their final position.
    pub(crate) fn queue_draw(
        &self,
        queue: &mut DrawQueue,
        now: GameTime,
    ) -> Result<(), QueueOverflow> {
        let bound = self
            .state
            .current_command()
            .and_then(|command| self.bindings.get(command.name()))
            .map(|slot| &self.animations[*slot]);
        let frame = match bound {
            Some(animation) if !self.state.is_dead() => {
                animation.frame_at(self.state.start_time(), self.state.completion_time(), now)
            }
            Some(animation) => animation.last_frame(),
            None => {
                log::error!(
                    "sprite {} has no animation for its governing command",
                    self.id.get()
                );
                self.animations[0].last_frame()
            }
        };
        let position = self.state.current();
        queue.push(DrawRequest {
            frame,
            x: position.x(),
            y: position.y(),
        })
    }
}

fn parse_scalar(key: &str, value: &str) -> Result<f32, LevelError> {
    value
        .parse()
        .map_err(|_| LevelError::MalformedDescriptorEntry {
            key: key.to_owned(),
            value: value.to_owned(),
        })
}

/// Parses an `x;y` pixel position.
fn parse_point(key: &str, value: &str) -> Result<PixelPoint, LevelError> {
    let malformed = || LevelError::MalformedDescriptorEntry {
        key: key.to_owned(),
        value: value.to_owned(),
    };
    let (x, y) = value.split_once(';').ok_or_else(malformed)?;
    Ok(PixelPoint::new(
        x.trim().parse().map_err(|_| malformed())?,
        y.trim().parse().map_err(|_| malformed())?,
    ))
}

fn missing(path: &str, key: &str) -> LevelError {
    LevelError::MissingDescriptorKey {
        path: path.to_owned(),
        key: key.to_owned(),
    }
}
