use std::collections::HashMap;

use splitlog::FileLogger;

fn init_logger(log_path: &str, log_name: &str, level: &str) -> splitlog::Result<FileLogger> {
    let mut config = HashMap::new();
    config.insert("logPath".to_string(), log_path.to_string());
    config.insert("logName".to_string(), log_name.to_string());
    config.insert("logLevel".to_string(), level.to_string());
    config.insert("logSplitType".to_string(), "size".to_string());
    config.insert("logSplitSize".to_string(), "1M".to_string());

    let logger = FileLogger::from_map(&config)?;
    splitlog::info!(logger, "init logger success");
    Ok(logger)
}

fn run(logger: &FileLogger) {
    for i in 0..100_000 {
        splitlog::info!(logger, "user server is running, iteration {}", i);
        if i % 10_000 == 0 {
            splitlog::warn!(logger, "checkpoint {}", i);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let log_path = temp_dir.path().to_string_lossy().into_owned();

    let logger = init_logger(&log_path, "user_server", "debug")?;
    run(&logger);
    logger.close();

    println!("dropped under load: {}", logger.dropped());
    for entry in std::fs::read_dir(temp_dir.path())? {
        let entry = entry?;
        println!("{} ({} bytes)", entry.file_name().to_string_lossy(), entry.metadata()?.len());
    }

    Ok(())
}
