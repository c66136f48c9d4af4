use {
    logsplit::{FileLoggerBuilder, RotationSize, DIAGNOSTICS_TARGET},
    std::path::Path,
    tracing_subscriber::{util::SubscriberInitExt, EnvFilter},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("./logs")?;
    // Raw writes only reach the main file; the error mirror stays empty.
    let appender = FileLoggerBuilder::new(Path::new("./logs"), Path::new("tracing.log"))
        .max_size(RotationSize::MB(1))
        .build()?;
    let (non_blocking, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        // The appender's own rotation events would otherwise land in tracing.log
        .with_env_filter(EnvFilter::new(format!("info,{DIAGNOSTICS_TARGET}=off")))
        .with_ansi(false)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .finish()
        .try_init()?;

    tracing::info!("This is an info message");
    tracing::warn!("This is a warning message");
    tracing::error!("This is an error message");

    Ok(())
}
