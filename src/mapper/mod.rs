//! The Mapper maps light names to lights and their host device.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::compiler::Timing;
use crate::config::Root;
use crate::host::CommandSink;
use crate::light::Light;

/// Every configured light, by name.
pub struct Mapper {
    lights: BTreeMap<String, Arc<Light>>,
}

impl Mapper {
    /// Set up the configured lights on top of a command sink.
    ///
    /// Every light is switched off once so the hardware starts dark.
    pub fn from_config(config: &Root, sink: Arc<dyn CommandSink>) -> Mapper {
        let timing = Timing::new(config.frames_per_second);
        info!(
            fps = timing.frames_per_second(),
            tick_ms = timing.tick_interval_ms(),
            "setting up lights"
        );
        let mut lights = BTreeMap::new();

        for (name, fixture) in &config.lights {
            let light = Light::from_fixture(name, fixture, timing, Arc::clone(&sink));
            light.off();
            info!(light = light.name(), channels = ?light.channels().names(), "light ready");
            lights.insert(name.clone(), Arc::new(light));
        }

        Mapper { lights }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Light>> {
        self.lights.get(name)
    }

    /// Light names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.lights.keys().cloned().collect()
    }

    /// Turn everything off, e.g. before shutting down.
    pub fn all_off(&self) {
        for light in self.lights.values() {
            light.off();
        }
    }
}
