//! wangtile_animation - Frame-based tile animations
//!
//! A tile may carry an [`AnimationSpec`]: an ordered list of frames, each naming
//! the tile to draw and for how long. Animations always cycle. Frame durations
//! are independent per frame.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use wangtile_animation::{AnimationScheduler, AnimationSpec, Frame, PhaseMode};
//!
//! let flower = AnimationSpec::new(vec![
//!     Frame::new(15, 300),
//!     Frame::new(16, 300),
//! ])?;
//!
//! let mut scheduler = AnimationScheduler::new(PhaseMode::Synchronized);
//! scheduler.insert(15, flower);
//!
//! assert_eq!(scheduler.current_frame(15, Duration::from_millis(450)), 16);
//! ```

mod scheduler;

#[cfg(feature = "bevy")]
mod plugin;

pub use scheduler::{AnimationClock, AnimationScheduler, PhaseMode};

#[cfg(feature = "bevy")]
pub use plugin::{SharedAnimationClock, TileAnimationPlugin};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Reasons an animation cannot be built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("animation has no frames")]
    NoFrames,
    #[error("animation cycle has zero total duration")]
    ZeroCycle,
}

/// A single animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Frame {
    /// Tile drawn while this frame is active
    pub tile_id: u32,
    /// How long the frame stays on screen, in milliseconds
    pub duration_ms: u32,
}

impl Frame {
    pub const fn new(tile_id: u32, duration_ms: u32) -> Self {
        Self {
            tile_id,
            duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(u64::from(self.duration_ms))
    }
}

/// A cycling sequence of frames with per-frame durations
///
/// Always holds at least one frame and a non-zero cycle length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Frame>", into = "Vec<Frame>")]
pub struct AnimationSpec {
    frames: Vec<Frame>,
    cycle_ms: u64,
}

impl AnimationSpec {
    /// Build an animation, rejecting empty frame lists and zero-length cycles
    pub fn new(frames: Vec<Frame>) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames);
        }

        let cycle_ms: u64 = frames.iter().map(|f| u64::from(f.duration_ms)).sum();
        if cycle_ms == 0 {
            return Err(AnimationError::ZeroCycle);
        }

        Ok(Self { frames, cycle_ms })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Every tile id referenced by a frame, in frame order
    pub fn frame_tiles(&self) -> impl Iterator<Item = u32> + '_ {
        self.frames.iter().map(|f| f.tile_id)
    }

    /// Total length of one loop in milliseconds
    pub fn cycle_ms(&self) -> u64 {
        self.cycle_ms
    }

    /// Total length of one loop
    pub fn cycle(&self) -> Duration {
        Duration::from_millis(self.cycle_ms)
    }

    /// Index of the frame active at `elapsed`
    ///
    /// Elapsed time is reduced modulo the cycle length, then frames are walked
    /// in order accumulating their durations. Zero-length frames are never active.
    pub fn frame_index_at(&self, elapsed: Duration) -> usize {
        let mut t = (elapsed.as_millis() % u128::from(self.cycle_ms)) as u64;

        for (index, frame) in self.frames.iter().enumerate() {
            let duration = u64::from(frame.duration_ms);
            if t < duration {
                return index;
            }
            t -= duration;
        }

        // t < cycle_ms == sum of durations, so the loop always returns
        self.frames.len() - 1
    }

    /// Tile id of the frame active at `elapsed`
    pub fn frame_at(&self, elapsed: Duration) -> u32 {
        self.frames[self.frame_index_at(elapsed)].tile_id
    }
}

impl TryFrom<Vec<Frame>> for AnimationSpec {
    type Error = AnimationError;

    fn try_from(frames: Vec<Frame>) -> Result<Self, Self::Error> {
        Self::new(frames)
    }
}

impl From<AnimationSpec> for Vec<Frame> {
    fn from(spec: AnimationSpec) -> Self {
        spec.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn two_frames() -> AnimationSpec {
        AnimationSpec::new(vec![Frame::new(15, 300), Frame::new(16, 300)]).unwrap()
    }

    #[test]
    fn test_two_frame_cycle() {
        let spec = two_frames();
        assert_eq!(spec.cycle_ms(), 600);
        assert_eq!(spec.frame_at(ms(0)), 15);
        assert_eq!(spec.frame_at(ms(299)), 15);
        assert_eq!(spec.frame_at(ms(300)), 16);
        assert_eq!(spec.frame_at(ms(599)), 16);
        assert_eq!(spec.frame_at(ms(600)), 15);
    }

    #[test]
    fn test_uneven_durations() {
        let spec = AnimationSpec::new(vec![
            Frame::new(1, 100),
            Frame::new(2, 50),
            Frame::new(3, 250),
        ])
        .unwrap();

        assert_eq!(spec.frame_at(ms(99)), 1);
        assert_eq!(spec.frame_at(ms(100)), 2);
        assert_eq!(spec.frame_at(ms(149)), 2);
        assert_eq!(spec.frame_at(ms(150)), 3);
        assert_eq!(spec.frame_at(ms(399)), 3);
        assert_eq!(spec.frame_at(ms(400)), 1);
    }

    #[test]
    fn test_frame_at_is_periodic() {
        let spec = AnimationSpec::new(vec![
            Frame::new(7, 120),
            Frame::new(8, 45),
            Frame::new(9, 300),
        ])
        .unwrap();
        let cycle = spec.cycle();

        for t in (0..2_000).step_by(7) {
            let t = ms(t);
            assert_eq!(spec.frame_at(t), spec.frame_at(t + cycle));
            assert_eq!(spec.frame_at(t), spec.frame_at(t + cycle * 5));
        }
    }

    #[test]
    fn test_zero_length_frame_is_skipped() {
        let spec = AnimationSpec::new(vec![Frame::new(1, 0), Frame::new(2, 100)]).unwrap();
        assert_eq!(spec.frame_at(ms(0)), 2);
        assert_eq!(spec.frame_at(ms(100)), 2);
    }

    #[test]
    fn test_invalid_animations_rejected() {
        assert_eq!(AnimationSpec::new(Vec::new()), Err(AnimationError::NoFrames));
        assert_eq!(
            AnimationSpec::new(vec![Frame::new(1, 0), Frame::new(2, 0)]),
            Err(AnimationError::ZeroCycle)
        );
    }

    #[test]
    fn test_sub_millisecond_elapsed() {
        let spec = two_frames();
        assert_eq!(spec.frame_at(Duration::from_micros(299_999)), 15);
        assert_eq!(spec.frame_at(Duration::from_micros(300_000)), 16);
    }

    #[test]
    fn test_serde_roundtrip_validates() {
        let json = r#"[{"tile_id":15,"duration_ms":300},{"tile_id":16,"duration_ms":300}]"#;
        let spec: AnimationSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec, two_frames());

        let empty: Result<AnimationSpec, _> = serde_json::from_str("[]");
        assert!(empty.is_err());
    }
}
