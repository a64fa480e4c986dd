//! Compiles keyframe transitions into a looping sequence of frames.
//!
//! A frame is one tick of the animation: the color reported while it is shown
//! and the ready-to-write duty cycle command for it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;
use crate::fixture::{ChannelMap, Selector};

/// Upper bound on the frames a single transition list may compile to.
pub const MAX_FRAMES: usize = 1_000_000;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Fixed frame rate shared by compilation and playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    frames_per_second: u32,
}

impl Timing {
    pub const DEFAULT_FRAMES_PER_SECOND: u32 = 30;

    pub fn new(frames_per_second: u32) -> Timing {
        Timing {
            frames_per_second: frames_per_second.max(1),
        }
    }

    pub fn frames_per_second(&self) -> u32 {
        self.frames_per_second
    }

    pub fn tick_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.frames_per_second)
    }

    /// Whole frames that fit into `duration_ms`.
    ///
    /// Anything shorter than one tick, negative or not finite is zero frames.
    pub fn frame_count(&self, duration_ms: f64) -> usize {
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            return 0;
        }
        (duration_ms * f64::from(self.frames_per_second) / 1000.0).floor() as usize
    }

    /// Index of the tick that contains `elapsed`.
    pub fn tick_at(&self, elapsed: Duration) -> u64 {
        (elapsed.as_nanos() * u128::from(self.frames_per_second) / NANOS_PER_SEC) as u64
    }

    /// Offset from the epoch at which `tick` begins.
    pub fn tick_start(&self, tick: u64) -> Duration {
        let fps = u128::from(self.frames_per_second);
        let nanos = (u128::from(tick) * NANOS_PER_SEC + fps - 1) / fps;
        Duration::from_nanos(nanos as u64)
    }
}

impl Default for Timing {
    fn default() -> Timing {
        Timing::new(Timing::DEFAULT_FRAMES_PER_SECOND)
    }
}

/// A color and how long to take getting from it to the next keyframe.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Keyframe {
    pub color: Color,
    /// Milliseconds. Ignored when the list has a single keyframe.
    #[serde(rename = "duration", default)]
    pub duration_ms: f64,
}

impl Keyframe {
    pub fn new(color: Color, duration_ms: f64) -> Keyframe {
        Keyframe { color, duration_ms }
    }
}

/// One precomputed instant of an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    effective_color: Color,
    command: String,
}

impl Frame {
    pub fn render(color: &Color, selector: Selector, channels: &ChannelMap) -> Frame {
        let selection = selector.select(color);
        Frame {
            effective_color: selection.effective_color,
            command: channels.command(&selection.values),
        }
    }

    pub fn effective_color(&self) -> Color {
        self.effective_color
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("transition list is empty")]
    Empty,
    #[error("transition list needs {frames} frames, limit is {limit}")]
    TooManyFrames { frames: usize, limit: usize },
}

/// Turns keyframes into frames for one fixture.
#[derive(Debug, Clone)]
pub struct Compiler {
    selector: Selector,
    channels: ChannelMap,
    timing: Timing,
}

impl Compiler {
    pub fn new(selector: Selector, channels: ChannelMap, timing: Timing) -> Compiler {
        Compiler {
            selector,
            channels,
            timing,
        }
    }

    pub fn frame(&self, color: &Color) -> Frame {
        Frame::render(color, self.selector, &self.channels)
    }

    /// Compile a cyclic keyframe list. The last keyframe transitions back to the first.
    ///
    /// Segments shorter than one tick contribute no frames. If no segment
    /// contributes anything the result is a single frame of the first color.
    pub fn compile(&self, keyframes: &[Keyframe]) -> Result<Vec<Frame>, TransitionError> {
        let first = keyframes.first().ok_or(TransitionError::Empty)?;
        if keyframes.len() == 1 {
            return Ok(vec![self.frame(&first.color)]);
        }

        let counts: Vec<usize> = keyframes
            .iter()
            .map(|keyframe| self.timing.frame_count(keyframe.duration_ms))
            .collect();
        let total = counts
            .iter()
            .try_fold(0usize, |sum, count| sum.checked_add(*count))
            .unwrap_or(usize::MAX);
        if total > MAX_FRAMES {
            return Err(TransitionError::TooManyFrames {
                frames: total,
                limit: MAX_FRAMES,
            });
        }
        if total == 0 {
            return Ok(vec![self.frame(&first.color)]);
        }

        let mut frames = Vec::with_capacity(total);
        for (index, (from, count)) in keyframes.iter().zip(&counts).enumerate() {
            let to = &keyframes[(index + 1) % keyframes.len()];
            for frame in 0..*count {
                let fraction = frame as f64 / *count as f64;
                frames.push(self.frame(&from.color.mix(&to.color, fraction)));
            }
        }

        Ok(frames)
    }
}
