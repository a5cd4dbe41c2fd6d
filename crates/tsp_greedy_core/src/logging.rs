use std::{fs::File, io::Write};

use env_logger::{Builder, Target, WriteStyle, fmt::Formatter};
use log::Record;

use crate::{
    Error, Result,
    io::options::{LogFormat, TourOptions},
};

/// Installs the global logger. Fails if one is already installed.
pub fn init_logger(options: &TourOptions) -> Result<()> {
    let log_format = options.log_format;
    let log_timestamp = options.log_timestamp;

    let mut builder = Builder::new();
    builder
        .filter_level(options.log_level.to_filter())
        .write_style(WriteStyle::Never)
        .target(log_target(options)?)
        .format(move |buf: &mut Formatter, record: &Record<'_>| {
            if log_timestamp {
                write!(buf, "{} ", buf.timestamp_millis())?;
            }
            let level = record.level().as_str();
            match log_format {
                LogFormat::Compact => writeln!(buf, "{level} {}", record.args()),
                LogFormat::Pretty => {
                    writeln!(buf, "{level} [{}] {}", record.target(), record.args())
                }
            }
        });

    builder
        .try_init()
        .map_err(|e| Error::other(format!("logger init failed: {e}")))
}

fn log_target(options: &TourOptions) -> Result<Target> {
    let Some(log_path) = options.log_output_path() else {
        return Ok(Target::Stderr);
    };
    let log_file = File::create(log_path).map_err(|e| {
        Error::other(format!(
            "failed to create log output file {}: {e}",
            log_path.display()
        ))
    })?;
    Ok(Target::Pipe(Box::new(log_file)))
}
