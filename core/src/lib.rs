#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the pondlife simulation.
//!
//! This crate defines the value types and capability interfaces that connect
//! the authoritative level state, the pluggable movement and interaction
//! systems, and the external collaborators (input capture and rendering).
//! The simulation itself is tick driven and single threaded: one tick is
//! processed to completion before the next begins, and the only queue-like
//! boundaries are the bounded input and draw channels defined here.

mod animation;
mod channel;
mod command;
mod geometry;
mod sprite_state;

pub use animation::{Animation, AnimationError};
pub use channel::{BoundedQueue, QueueOverflow, DEFAULT_QUEUE_CAPACITY};
pub use command::{keys, parse_command_description, Command, CommandError, CommandSet};
pub use geometry::{coordinate_change, distance, intercept, PixelPoint};
pub use sprite_state::{
    Behavior, Interaction, PairInteraction, PairParticipant, SpriteKinetics, SpriteObservation,
    SpriteState, STARTING_ENERGY,
};

use serde::{Deserialize, Serialize};

/// Monotonic simulation timestamp. One unit is one abstract time step; the
/// driving loop decides how it maps to wall-clock time.
pub type GameTime = u64;

/// Unique identifier assigned to a sprite when its level is loaded.
///
/// Identifiers are dense indices into the level's sprite list, so distance
/// rows and observation slices can be addressed directly by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteId(u32);

impl SpriteId {
    /// Creates a new sprite identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the sprite within its level's sprite list.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Logical key code delivered by the input collaborator.
///
/// Codes are opaque to the core; the default command set uses the original
/// cursor-block codes but nothing in the simulation depends on that.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(u32);

impl KeyCode {
    /// Creates a new key code wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying code.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Whether an input event reports a key going down or coming back up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// The key was pressed.
    Pressed,
    /// The key was released. Sprites treat this as an idle tick rather than
    /// a new command.
    Released,
}

/// Abstract input event handed to the simulation in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    /// Logical key the event refers to.
    pub key: KeyCode,
    /// Press or release.
    pub action: InputAction,
}

/// Handle to a frame image owned by the rendering collaborator.
///
/// The core never inspects pixels; it only routes handles from loaded
/// animations into draw requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(u32);

impl FrameHandle {
    /// Creates a new frame handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Request to present one frame at an absolute map position, consumed by the
/// rendering collaborator in FIFO order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRequest {
    /// Frame image to present.
    pub frame: FrameHandle,
    /// Absolute x position in pixels.
    pub x: i32,
    /// Absolute y position in pixels.
    pub y: i32,
}

/// Bounded channel carrying input events into the simulation.
pub type InputQueue = BoundedQueue<InputEvent>;

/// Bounded channel carrying draw requests out of the simulation.
pub type DrawQueue = BoundedQueue<DrawRequest>;
