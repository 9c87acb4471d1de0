use anyhow::{Context, Result};
use simplelog::*;

#[derive(clap::ArgEnum, Debug, Copy, Clone)]
pub enum Color {
    Auto,
    Always,
    Never,
}

impl From<Color> for ColorChoice {
    fn from(color: Color) -> Self {
        match color {
            Color::Always => ColorChoice::AlwaysAnsi,
            Color::Never => ColorChoice::Never,
            Color::Auto if atty::is(atty::Stream::Stderr) => ColorChoice::Auto,
            Color::Auto => ColorChoice::Never,
        }
    }
}

/// Logs the loader's own messages to stderr.
///
/// Each -v raises the level by one step from warnings. From debug on, messages are tagged with
/// the module they came from (the pipeline, the session, the image decoder).
pub fn init_logger(verbosity: u8, color: Color) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let config = ConfigBuilder::new()
        .add_filter_allow_str("xzimage")
        .add_filter_allow_str("xzinfo")
        .set_target_level(LevelFilter::Debug)
        .set_location_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_time_level(LevelFilter::Off)
        .build();

    TermLogger::init(level, config.clone(), TerminalMode::Stderr, color.into())
        .or_else(|_| SimpleLogger::init(level, config))
        .context("Couldn't init logger")
}
