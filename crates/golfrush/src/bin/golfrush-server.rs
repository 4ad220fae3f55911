//! `golfrush-server [config.toml]`
//!
//! Runs the Golf Rush room server. Without a config path, defaults are
//! used; `GOLFRUSH_BIND` / `GOLFRUSH_ROOM_CAPACITY` override either way.

use golfrush::prelude::*;

#[tokio::main]
async fn main() -> Result<(), GolfRushError> {
    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    }
    .with_env_overrides()?;

    init_tracing(&config.log_level);
    tracing::info!(
        bind = %config.bind,
        capacity = config.room.capacity,
        admin_only = config.room.admin_only_controls,
        "starting Golf Rush server"
    );

    let server = GolfRushServerBuilder::from_config(config).build().await?;
    server.run().await
}
