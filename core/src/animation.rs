//! Frame schedules: which frame of an animation is current given how far
//! the sprite is through its movement window.

use thiserror::Error;

use crate::{FrameHandle, GameTime};

/// Tolerance applied when checking that schedule fractions sum to one.
const SCHEDULE_SUM_TOLERANCE: f32 = 1e-3;

/// Error raised when an animation's frame schedule is inconsistent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnimationError {
    /// The animation has no frames at all.
    #[error("animation has no frames")]
    Empty,
    /// The number of schedule entries does not match the number of frames.
    #[error("animation has {frames} frames but {fractions} schedule entries")]
    MismatchedSchedule {
        /// Number of frames supplied.
        frames: usize,
        /// Number of schedule fractions supplied.
        fractions: usize,
    },
    /// The schedule fractions do not sum to one.
    #[error("animation schedule sums to {sum}, expected 1")]
    UnbalancedSchedule {
        /// The actual sum of the supplied fractions.
        sum: f32,
    },
}

/// An ordered set of frames with a duration fraction for each.
///
/// The schedule is a partition of the movement window: a frame whose
/// fraction is 0.25 is shown for the first quarter of the window, and so
/// on cumulatively through the frame list.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<FrameHandle>,
    schedule: Vec<f32>,
}

impl Animation {
    /// Builds an animation, validating that the schedule partitions the
    /// window: one fraction per frame, summing to one.
    pub fn new(frames: Vec<FrameHandle>, schedule: Vec<f32>) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::Empty);
        }
        if frames.len() != schedule.len() {
            return Err(AnimationError::MismatchedSchedule {
                frames: frames.len(),
                fractions: schedule.len(),
            });
        }
        let sum: f32 = schedule.iter().sum();
        if (sum - 1.0).abs() > SCHEDULE_SUM_TOLERANCE {
            return Err(AnimationError::UnbalancedSchedule { sum });
        }
        Ok(Self { frames, schedule })
    }

    /// Picks the frame for the moment `now` within the window from
    /// `start_time` to `completion_time`.
    ///
    /// An elapsed or zero-length window resolves to the last frame, so a
    /// sprite standing at its goal keeps showing its resting pose.
    #[must_use]
    pub fn frame_at(
        &self,
        start_time: GameTime,
        completion_time: GameTime,
        now: GameTime,
    ) -> FrameHandle {
        if now >= completion_time || completion_time <= start_time {
            return self.last_frame();
        }
        let total = (completion_time - start_time) as f32;
        let elapsed = now.saturating_sub(start_time) as f32;
        let progress = elapsed / total;

        let mut cumulative = 0.0;
        for (frame, fraction) in self.frames.iter().zip(&self.schedule) {
            cumulative += fraction;
            if progress < cumulative {
                return *frame;
            }
        }
        self.last_frame()
    }

    /// The final frame, shown while the sprite is at rest.
    #[must_use]
    pub fn last_frame(&self) -> FrameHandle {
        // new() rejects empty frame lists.
        self.frames[self.frames.len() - 1]
    }

    /// Number of frames in the animation.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
