use splitlog::{FileLogConfig, Level, init_logging, shutdown_logging};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let config = FileLogConfig::new(temp_dir.path(), "app", Level::Debug);

    let logger = init_logging(&config)?;

    tracing::debug!(component = "startup", "configuration loaded");
    tracing::info!("serving requests");
    tracing::warn!(retries = 3, "upstream slow");

    shutdown_logging();

    for path in [logger.main_path(), logger.warn_path()] {
        println!("== {}", path.display());
        print!("{}", std::fs::read_to_string(path)?);
    }

    Ok(())
}
