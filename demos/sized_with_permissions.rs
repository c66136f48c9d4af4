use {
    logsplit::{log_debug, log_error, FileLoggerBuilder, Logger, Role, RotationSize},
    std::path::Path,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("./logs")?;
    let mut logger = FileLoggerBuilder::new(Path::new("./logs"), Path::new("sized.log"))
        .max_size(RotationSize::KB(64)) // Rotate at 64KB
        .file_mode(0o640) // Set file permissions to: owner rw, group r, others none
        .rotated_file_mode(0o640)
        .build()?;

    // Simulate writing logs that will trigger size-based rotation
    for i in 1..=5000 {
        log_debug!(
            logger,
            "Log entry #{}: This is a sample log message that will contribute to file size",
            i
        );
        if i % 500 == 0 {
            log_error!(logger, "Checkpoint {} reached", i);
        }
    }

    for backup in logger.backups(Role::Main)? {
        println!("{}", backup.display());
    }
    logger.close()?;
    Ok(())
}
