//! Animated PWM light fixtures driven through pi-blaster.
//!
//! Keyframe transitions are compiled into frames ([`compiler`]), each light
//! plays its frames at a fixed rate ([`light`]) and writes duty cycle commands
//! to the PWM daemon ([`host`]).

pub mod color;
pub mod compiler;
pub mod config;
pub mod fixture;
pub mod host;
pub mod light;
pub mod listener;
pub mod mapper;

pub use color::Color;
pub use compiler::{Frame, Keyframe, Timing};
pub use fixture::{Channel, ChannelMap, Fixture, Selector};
pub use light::{Light, Status};
pub use mapper::Mapper;
