//! A light fixture with its compiled animation and on/off state.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::info;

use crate::color::Color;
use crate::compiler::{Compiler, Frame, Keyframe, Timing, TransitionError};
use crate::fixture::{ChannelMap, Fixture, Selector};
use crate::host::CommandSink;

pub mod playback;
use playback::Ticker;

/// State shared between a light and its ticker thread.
pub(crate) struct Shared {
    /// Published whole; never modified in place.
    frames: Arc<Vec<Frame>>,
    is_on: bool,
    effective_color: Color,
    /// Bumped by every on/off/restart so stale tickers retire.
    generation: u64,
}

/// Snapshot returned by [`Light::status`].
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub is_on: bool,
    pub effective_color: Color,
    pub channels: Vec<&'static str>,
}

pub struct Light {
    name: Arc<String>,
    channels: ChannelMap,
    compiler: Compiler,
    timing: Timing,
    sink: Arc<dyn CommandSink>,
    shared: Arc<Mutex<Shared>>,
    /// Also serializes on/off/transitions against each other.
    ticker: Mutex<Option<Ticker>>,
}

impl Light {
    /// Create a light that is off and holds a single white frame.
    ///
    /// Nothing is written to the hardware until [`Light::on`] or [`Light::off`].
    pub fn new(
        name: &str,
        channels: ChannelMap,
        selector: Selector,
        timing: Timing,
        sink: Arc<dyn CommandSink>,
    ) -> Light {
        let compiler = Compiler::new(selector, channels.clone(), timing);
        let initial = compiler.frame(&Color::WHITE);

        Light {
            name: Arc::new(name.to_owned()),
            channels,
            compiler,
            timing,
            sink,
            shared: Arc::new(Mutex::new(Shared {
                effective_color: initial.effective_color(),
                frames: Arc::new(vec![initial]),
                is_on: false,
                generation: 0,
            })),
            ticker: Mutex::new(None),
        }
    }

    pub fn from_fixture(
        name: &str,
        fixture: &Fixture,
        timing: Timing,
        sink: Arc<dyn CommandSink>,
    ) -> Light {
        Light::new(name, fixture.channel_map(), fixture.selector(), timing, sink)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    /// Start (or restart) playback from frame 0.
    pub fn on(&self) {
        let mut ticker = self.lock_ticker();
        let generation = {
            let mut state = playback::lock(&self.shared);
            state.generation += 1;
            state.is_on = true;
            state.generation
        };
        self.start_ticker(&mut ticker, generation);
        info!(light = %self.name, "on");
    }

    /// Stop playback and set every channel to zero duty cycle.
    ///
    /// The compiled frames are kept for the next [`Light::on`].
    pub fn off(&self) {
        let mut ticker = self.lock_ticker();
        let stale = {
            let mut state = playback::lock(&self.shared);
            state.generation += 1;
            state.is_on = false;
            state.effective_color = Color::BLACK;
            self.sink.execute(&self.channels.off_command());
            ticker.take()
        };
        drop(stale);
        info!(light = %self.name, "off");
    }

    /// Replace the animation. A running light restarts from the first frame.
    pub fn transitions(&self, keyframes: &[Keyframe]) -> Result<(), TransitionError> {
        // Built completely before anyone can see it.
        let frames = Arc::new(self.compiler.compile(keyframes)?);
        let count = frames.len();

        let mut ticker = self.lock_ticker();
        let restart = {
            let mut state = playback::lock(&self.shared);
            state.frames = frames;
            // Retire the running ticker in the same step, so it never shows
            // the new frames with the old epoch.
            if state.is_on {
                state.generation += 1;
                Some(state.generation)
            } else {
                None
            }
        };
        if let Some(generation) = restart {
            self.start_ticker(&mut ticker, generation);
        }

        info!(light = %self.name, keyframes = keyframes.len(), frames = count, "transitions replaced");
        Ok(())
    }

    pub fn status(&self) -> Status {
        let state = playback::lock(&self.shared);
        Status {
            is_on: state.is_on,
            effective_color: state.effective_color,
            channels: self.channels.names(),
        }
    }

    /// Number of frames in the current animation.
    pub fn frame_count(&self) -> usize {
        playback::lock(&self.shared).frames.len()
    }

    fn start_ticker(&self, ticker: &mut Option<Ticker>, generation: u64) {
        let fresh = Ticker::start(
            Arc::clone(&self.name),
            Arc::clone(&self.shared),
            Arc::clone(&self.sink),
            self.timing,
            generation,
        );
        // The old thread sees the new generation and exits; join it unlocked.
        drop(ticker.replace(fresh));
    }

    fn lock_ticker(&self) -> MutexGuard<'_, Option<Ticker>> {
        match self.ticker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Drop for Light {
    fn drop(&mut self) {
        playback::lock(&self.shared).generation += 1;
        self.lock_ticker().take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingSink;

    fn light(sink: &Arc<RecordingSink>) -> Light {
        let fixture = Fixture::Rgb {
            red: 17,
            green: 27,
            blue: 22,
        };
        Light::from_fixture("accent", &fixture, Timing::default(), Arc::clone(sink) as Arc<dyn CommandSink>)
    }

    #[test]
    fn starts_off_with_one_white_frame() {
        let sink = Arc::new(RecordingSink::new());
        let light = light(&sink);
        let status = light.status();
        assert!(!status.is_on);
        assert_eq!(status.effective_color, Color::WHITE);
        assert_eq!(status.channels, vec!["Red", "Green", "Blue"]);
        assert_eq!(light.frame_count(), 1);
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn off_zeroes_every_channel() {
        let sink = Arc::new(RecordingSink::new());
        let light = light(&sink);
        light.off();
        assert_eq!(sink.last().as_deref(), Some("17=0.0000 27=0.0000 22=0.0000"));
        assert_eq!(light.status().effective_color, Color::BLACK);
        assert!(!light.status().is_on);
    }

    #[test]
    fn empty_transitions_are_rejected() {
        let sink = Arc::new(RecordingSink::new());
        let light = light(&sink);
        assert_eq!(light.transitions(&[]), Err(TransitionError::Empty));
        assert_eq!(light.frame_count(), 1);
    }
}
