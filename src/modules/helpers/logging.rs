use fern::Dispatch;

use crate::modules::helpers::config::Config;

/// where the console half of the log goes.
/// binaries that print json on stdout log to stderr instead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
}

pub fn setup_logging(config: &Config, output: LogOutput) -> Result<(), fern::InitError> {
    let base_config = Dispatch::new()
        .level(config.logging_level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        });

    let console = match output {
        LogOutput::Stdout => Dispatch::new().chain(std::io::stdout()),
        LogOutput::Stderr => Dispatch::new().chain(std::io::stderr()),
    };

    let file_logger_config = Dispatch::new().chain(fern::log_file(&config.log_file)?);

    base_config
        .chain(console)
        .chain(file_logger_config)
        .apply()?;

    Ok(())
}
