use {
    logsplit::{log_error, log_info, log_warn, FileLogger, Logger},
    std::path::Path,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("./logs")?;
    let mut logger = FileLogger::new("info", Path::new("basic.log"), Path::new("./logs"))?;

    log_info!(logger, "This is an info message");
    log_warn!(logger, "This is a warning message");
    // Also mirrored to ./logs/basic.log.err
    log_error!(logger, "This is an error message");

    logger.close()?;
    Ok(())
}
