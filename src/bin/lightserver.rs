use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use excessive_desk::host::{CommandSink, Daemon, PiBlaster};
use excessive_desk::{config, listener, Mapper};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "./config.yaml".to_owned());
    let mut config_root = config::read_config(&path).with_context(|| format!("loading {}", path))?;
    config_root.apply_env(|key| std::env::var(key).ok())?;

    let _daemon = config_root
        .device
        .daemon
        .as_ref()
        .and_then(|daemon| Daemon::spawn_or_warn(&daemon.bin, &daemon.args));

    let device = Arc::new(PiBlaster::new(&config_root.device.path));
    let mapper = Arc::new(Mapper::from_config(&config_root, Arc::clone(&device) as Arc<dyn CommandSink>));

    listener::serve(&config_root.server.web_addr, Arc::clone(&mapper))
        .with_context(|| format!("serving on {}", config_root.server.web_addr))?;

    mapper.all_off();
    info!("all lights off");
    Ok(())
}
