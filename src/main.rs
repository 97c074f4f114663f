use daynight::{DayNightApp, SceneConfig};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SceneConfig::from_env();
    log::info!("Loading assets from {:?}", config.asset_dir);

    DayNightApp::new(config).run()?;
    Ok(())
}
