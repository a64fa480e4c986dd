//! Fixtures map abstract colors onto physical PWM channels.

use serde::{Deserialize, Serialize};

use crate::color::Color;

/// GPIO line number understood by the PWM daemon.
pub type Pin = u8;

/// Decimal places used for every duty cycle written to the hardware.
pub const DUTY_CYCLE_PRECISION: usize = 4;

/// Logical channel of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    White,
    Warm,
    Cool,
}

impl Channel {
    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
            Channel::White => "White",
            Channel::Warm => "Warm",
            Channel::Cool => "Cool",
        }
    }
}

/// Logical channel -> physical pin, in declaration order.
///
/// Fixed for the lifetime of a light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMap {
    channels: Vec<(Channel, Pin)>,
}

impl ChannelMap {
    pub fn new(channels: Vec<(Channel, Pin)>) -> ChannelMap {
        ChannelMap { channels }
    }

    pub fn pin(&self, channel: Channel) -> Option<Pin> {
        self.channels
            .iter()
            .find(|(candidate, _)| *candidate == channel)
            .map(|(_, pin)| *pin)
    }

    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.iter().map(|(channel, _)| *channel)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.channels().map(Channel::name).collect()
    }

    /// Render `pin=value` pairs for the given intensities.
    ///
    /// Channels missing from the map are left out of the command; the daemon
    /// keeps whatever it last had for pins that aren't mentioned.
    pub fn command(&self, values: &[(Channel, f64)]) -> String {
        values
            .iter()
            .filter_map(|(channel, value)| {
                self.pin(*channel).map(|pin| {
                    format!(
                        "{}={:.*}",
                        pin,
                        DUTY_CYCLE_PRECISION,
                        clamp_duty_cycle(*value)
                    )
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Command setting every known channel to zero duty cycle.
    pub fn off_command(&self) -> String {
        let zeros: Vec<(Channel, f64)> = self.channels().map(|channel| (channel, 0.0)).collect();
        self.command(&zeros)
    }
}

fn clamp_duty_cycle(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0).min(1.0)
    }
}

/// Output of a [`Selector`] for one color.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Color the fixture can actually show for the input.
    pub effective_color: Color,
    /// Intensity per channel in `0.0..=1.0`.
    pub values: Vec<(Channel, f64)>,
}

/// How a fixture type turns a color into channel intensities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Independent red, green and blue channels.
    Rgb,
    /// One white channel driven by the color's luminosity.
    SingleWhite,
    /// Warm and cool white channels driven by red and blue. Green is dropped.
    DualWhite,
}

impl Selector {
    pub fn select(self, color: &Color) -> Selection {
        match self {
            Selector::Rgb => Selection {
                effective_color: *color,
                values: vec![
                    (Channel::Red, color.red()),
                    (Channel::Green, color.green()),
                    (Channel::Blue, color.blue()),
                ],
            },
            Selector::SingleWhite => {
                let luminosity = color.luminosity();
                Selection {
                    effective_color: Color::BLACK.with_lightness(luminosity),
                    values: vec![(Channel::White, luminosity)],
                }
            }
            Selector::DualWhite => Selection {
                effective_color: Color::new(color.red(), 0.0, color.blue()),
                values: vec![(Channel::Warm, color.red()), (Channel::Cool, color.blue())],
            },
        }
    }
}

/// Fixture wiring as it appears in the configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Fixture {
    Rgb { red: Pin, green: Pin, blue: Pin },
    White { white: Pin },
    DualWhite { warm: Pin, cool: Pin },
}

impl Fixture {
    pub fn selector(&self) -> Selector {
        match self {
            Fixture::Rgb { .. } => Selector::Rgb,
            Fixture::White { .. } => Selector::SingleWhite,
            Fixture::DualWhite { .. } => Selector::DualWhite,
        }
    }

    pub fn channel_map(&self) -> ChannelMap {
        match *self {
            Fixture::Rgb { red, green, blue } => ChannelMap::new(vec![
                (Channel::Red, red),
                (Channel::Green, green),
                (Channel::Blue, blue),
            ]),
            Fixture::White { white } => ChannelMap::new(vec![(Channel::White, white)]),
            Fixture::DualWhite { warm, cool } => {
                ChannelMap::new(vec![(Channel::Warm, warm), (Channel::Cool, cool)])
            }
        }
    }

    pub fn pins(&self) -> Vec<Pin> {
        self.channel_map().channels.iter().map(|(_, pin)| *pin).collect()
    }
}
