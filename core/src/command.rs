//! Movement vocabulary: named commands with tile displacements, optional key
//! bindings, and the registry a sprite resolves them from.

use std::collections::HashMap;

use thiserror::Error;

use crate::KeyCode;

/// Key codes used by the standard movement commands.
///
/// The values follow the conventional cursor-block layout with the diagonal
/// neighbours on the numeric-pad codes around it.
pub mod keys {
    use crate::KeyCode;

    /// Arrow down.
    pub const DOWN: KeyCode = KeyCode::new(40);
    /// Numeric pad 2 block, down and right.
    pub const DOWN_RIGHT: KeyCode = KeyCode::new(34);
    /// Arrow right.
    pub const RIGHT: KeyCode = KeyCode::new(39);
    /// Numeric pad 9 block, up and right.
    pub const UP_RIGHT: KeyCode = KeyCode::new(33);
    /// Arrow up.
    pub const UP: KeyCode = KeyCode::new(38);
    /// Home block, up and left.
    pub const UP_LEFT: KeyCode = KeyCode::new(36);
    /// Arrow left.
    pub const LEFT: KeyCode = KeyCode::new(37);
    /// End block, down and left.
    pub const DOWN_LEFT: KeyCode = KeyCode::new(35);
}

/// Error raised while parsing command descriptions or populating a
/// [`CommandSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// A command with the same name was already registered.
    #[error("command {0:?} is already registered")]
    Duplicate(String),
    /// A command description did not match the expected grammar.
    #[error("command {name:?} has a malformed description {value:?}")]
    Malformed {
        /// Name of the command being parsed.
        name: String,
        /// The offending description text.
        value: String,
    },
}

/// A named movement intent: a tile-grid displacement, an interruption
/// policy, and an optional key binding.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    dx: i32,
    dy: i32,
    interruptible: bool,
    key: Option<KeyCode>,
}

impl Command {
    /// Creates a command with the provided fields.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        dx: i32,
        dy: i32,
        interruptible: bool,
        key: Option<KeyCode>,
    ) -> Self {
        Self {
            name: name.into(),
            dx,
            dy,
            interruptible,
            key,
        }
    }

    /// Name the command is registered and resolved under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Horizontal displacement measured in whole tiles.
    #[must_use]
    pub const fn grid_dx(&self) -> i32 {
        self.dx
    }

    /// Vertical displacement measured in whole tiles.
    #[must_use]
    pub const fn grid_dy(&self) -> i32 {
        self.dy
    }

    /// Whether a new command may replace this one before its movement
    /// window has elapsed.
    #[must_use]
    pub const fn is_interruptible(&self) -> bool {
        self.interruptible
    }

    /// Key bound to this command, if any.
    #[must_use]
    pub const fn key(&self) -> Option<KeyCode> {
        self.key
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Command {}

impl std::hash::Hash for Command {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Parses a command description of the form `dx;dy;[key];[interruptible]`.
///
/// `dx` and `dy` are signed tile displacements. The third field is an
/// optional numeric key code and the fourth an optional `true`/`false`
/// interruptibility flag. A command that carries a key binding is always
/// non-interruptible, regardless of the flag: key-driven moves run to
/// completion.
pub fn parse_command_description(name: &str, value: &str) -> Result<Command, CommandError> {
    let malformed = || CommandError::Malformed {
        name: name.to_owned(),
        value: value.to_owned(),
    };

    let fields: Vec<&str> = value.split(';').collect();
    if fields.len() < 2 || fields.len() > 4 {
        return Err(malformed());
    }
    let dx: i32 = fields[0].parse().map_err(|_| malformed())?;
    let dy: i32 = fields[1].parse().map_err(|_| malformed())?;

    let key = match fields.get(2) {
        Some(text) if !text.is_empty() => {
            Some(KeyCode::new(text.parse().map_err(|_| malformed())?))
        }
        _ => None,
    };

    let flag = match fields.get(3) {
        Some(text) if !text.is_empty() => text.parse().map_err(|_| malformed())?,
        _ => false,
    };
    let interruptible = if key.is_some() { false } else { flag };

    Ok(Command::new(name, dx, dy, interruptible, key))
}

/// Registry of commands addressable by name and by bound key.
///
/// Cloning a set produces a fully independent copy; sprites each own their
/// own set so one sprite's vocabulary never leaks into another's.
#[derive(Debug, Clone, Default)]
pub struct CommandSet {
    by_name: HashMap<String, Command>,
    by_key: HashMap<KeyCode, String>,
}

impl CommandSet {
    /// Creates an empty command set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the standard eight-direction movement vocabulary, each
    /// command bound to its cursor-block key and moving one tile.
    #[must_use]
    pub fn standard_movement() -> Self {
        let mut set = Self::new();
        let bindings = [
            ("DOWN", 0, 1, keys::DOWN),
            ("DOWN_RIGHT", 1, 1, keys::DOWN_RIGHT),
            ("RIGHT", 1, 0, keys::RIGHT),
            ("UP_RIGHT", 1, -1, keys::UP_RIGHT),
            ("UP", 0, -1, keys::UP),
            ("UP_LEFT", -1, -1, keys::UP_LEFT),
            ("LEFT", -1, 0, keys::LEFT),
            ("DOWN_LEFT", -1, 1, keys::DOWN_LEFT),
        ];
        for (name, dx, dy, key) in bindings {
            // Names and keys are distinct by construction.
            set.add(Command::new(name, dx, dy, false, Some(key)))
                .unwrap_or_else(|_| unreachable!("standard commands never collide"));
        }
        set
    }

    /// Registers a command, indexing it by name and by key when bound.
    pub fn add(&mut self, command: Command) -> Result<(), CommandError> {
        if self.by_name.contains_key(command.name()) {
            return Err(CommandError::Duplicate(command.name().to_owned()));
        }
        if let Some(key) = command.key() {
            let _ = self.by_key.insert(key, command.name().to_owned());
        }
        let _ = self.by_name.insert(command.name().to_owned(), command);
        Ok(())
    }

    /// Looks up a command by its registered name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&Command> {
        self.by_name.get(name)
    }

    /// Looks up the command bound to the provided key.
    #[must_use]
    pub fn by_key(&self, key: KeyCode) -> Option<&Command> {
        self.by_key.get(&key).and_then(|name| self.by_name.get(name))
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the set holds no commands.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
