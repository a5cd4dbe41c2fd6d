use std::{env, path::Path};

use log::LevelFilter;
use tsp_greedy_derive::{CliOptions, CliValue, KvDisplay};

use crate::{
    Error, Result,
    constants::{DEFAULT_CONFIG_PATH, DEFAULT_INITIAL_RADIUS, DEFAULT_QUADTREE_BUCKET},
    index::SpatialIndexKind,
    io::config::ConfigFile,
};

/// Runtime options for tour construction.
///
/// Sources, lowest precedence first: defaults, the key-value config file,
/// the command line.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct TourOptions {
    /// Key-value configuration file. Empty means none.
    #[cli(long = "config")]
    #[kv(fmt = "empty_dash")]
    pub config: String,
    /// Coordinate file (TSPLIB or plain `x y` rows). `-` reads stdin.
    #[cli(long = "input", key = "tsp_file_path")]
    #[kv(fmt = "empty_dash")]
    pub input: String,
    /// Tour output file, one point id per line. `-` writes stdout, empty skips writing.
    #[cli(long = "output", key = "output_path")]
    #[kv(fmt = "empty_dash")]
    pub output: String,
    /// Base seed for permutations and candidate shuffles. `None` draws a fresh one.
    #[cli(long = "seed", parse_with = "parse_seed")]
    #[kv(fmt = "opt")]
    pub seed: Option<u64>,
    /// Independent constructions; the shortest tour is kept.
    #[cli(long = "runs")]
    pub runs: usize,
    /// Half-width of the first query box.
    #[cli(long = "initial-radius")]
    pub initial_radius: f64,
    #[cli(long = "spatial-index", parse_with = "SpatialIndexKind::parse")]
    pub spatial_index: SpatialIndexKind,
    /// Points per quadtree leaf before it splits.
    #[cli(long = "quadtree-bucket")]
    pub quadtree_bucket: usize,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    pub log_timestamp: bool,
    /// Optional output file path for logs. Empty means stderr.
    #[cli(long = "log-output")]
    #[kv(fmt = "empty_dash")]
    pub log_output: String,
    /// Config-file keys that matched no option.
    #[kv(skip)]
    pub ignored_config_keys: Vec<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for TourOptions {
    fn default() -> Self {
        Self {
            config: String::new(),
            input: String::new(),
            output: String::new(),
            seed: None,
            runs: 1,
            initial_radius: DEFAULT_INITIAL_RADIUS,
            spatial_index: SpatialIndexKind::Quadtree,
            quadtree_bucket: DEFAULT_QUADTREE_BUCKET,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            ignored_config_keys: Vec::new(),
        }
    }
}

impl TourOptions {
    pub fn from_args() -> Result<Self> {
        Self::from_iter(env::args().skip(1))
    }

    /// Parses the command line, layering it over the config file when one is
    /// named with `--config` (or `config.txt` exists and no `--input` is given).
    pub fn from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        Self::layered(&args, Path::new(DEFAULT_CONFIG_PATH))
    }

    /// `default_config` is read when neither `--config` nor `--input` is given
    /// and the file exists.
    fn layered(args: &[String], default_config: &Path) -> Result<Self> {
        let cli = Self::parse_from_iter(Self::default(), args)?;

        let config_path = match cli.config_path() {
            Some(path) => Some(path.to_path_buf()),
            None if cli.input.trim().is_empty() && default_config.is_file() => {
                Some(default_config.to_path_buf())
            }
            None => None,
        };
        let Some(config_path) = config_path else {
            cli.validate()?;
            return Ok(cli);
        };

        let mut options = Self {
            config: config_path.display().to_string(),
            ..Self::default()
        };
        options.apply_config(&ConfigFile::load(&config_path)?)?;
        let options = Self::parse_from_iter(options, args)?;
        options.validate()?;
        Ok(options)
    }

    fn parse_from_iter(mut options: Self, args: &[String]) -> Result<Self> {
        let mut args = args.iter().cloned().peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);

            if options.apply_cli_option(&name, value.clone())? {
                continue;
            }

            match name.as_str() {
                "log-timestamp" => {
                    options.log_timestamp = match value {
                        Some(v) => parse_bool("--log-timestamp", &v)?,
                        None => true,
                    };
                }
                "no-log-timestamp" => {
                    if value.is_some() {
                        return Err(Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    options.log_timestamp = false;
                }
                _ => {
                    return Err(Error::invalid_input(format!(
                        "Unknown option: --{name}\n\n{}",
                        Self::usage()
                    )));
                }
            }
        }

        Ok(options)
    }

    fn apply_config(&mut self, config: &ConfigFile) -> Result<()> {
        for (key, value) in config.iter() {
            if self.apply_config_entry(key, value)? {
                continue;
            }
            match key {
                "log_timestamp" => self.log_timestamp = parse_bool(key, value)?,
                _ => self.ignored_config_keys.push(key.to_owned()),
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(Error::invalid_input("--runs must be at least 1"));
        }
        if !(self.initial_radius.is_finite() && self.initial_radius > 0.0) {
            return Err(Error::invalid_input(format!(
                "--initial-radius must be finite and > 0, got {}",
                self.initial_radius
            )));
        }
        if self.quadtree_bucket == 0 {
            return Err(Error::invalid_input("--quadtree-bucket must be at least 1"));
        }
        Ok(())
    }

    pub fn usage() -> String {
        format!(
            "Usage:
  tsp-greedy [options] --input points.tsp
  tsp-greedy --config config.txt [options]

Options:
  --config <path>          key-value file (tsp_file_path, output_path, ...)
  --input <path|->
  --output <path|->
  --seed <u64|random>
  --runs <usize>
  --initial-radius <f64>
  --spatial-index <{}>
  --quadtree-bucket <usize>
  --log-level <{}>
  --log-format <{}>
  --log-timestamp[=<bool>]
  --no-log-timestamp
  --log-output <path>
  --help

Examples:
  tsp-greedy --input lrb744710.tsp --output tour.txt
  tsp-greedy --config config.txt --seed 42 --log-level debug
  tsp-greedy --input points.txt --runs 8 --spatial-index kd-tree --output -
",
            SpatialIndexKind::EXPECTED,
            LogLevel::EXPECTED,
            LogFormat::EXPECTED,
        )
    }

    pub fn config_path(&self) -> Option<&Path> {
        non_empty_path(&self.config)
    }

    /// The coordinate file; required.
    pub fn input_path(&self) -> Result<&Path> {
        non_empty_path(&self.input).ok_or_else(|| {
            Error::invalid_input(
                "tsp_file_path not specified (use --input <path> or set tsp_file_path in the config file)",
            )
        })
    }

    pub fn output_path(&self) -> Option<&Path> {
        non_empty_path(&self.output)
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        let log_output = self.log_output.trim();
        if log_output.is_empty() || log_output == "-" {
            None
        } else {
            Some(Path::new(log_output))
        }
    }
}

fn non_empty_path(value: &str) -> Option<&Path> {
    let value = value.trim();
    (!value.is_empty()).then(|| Path::new(value))
}

fn parse_seed(raw: &str) -> Result<Option<u64>> {
    match raw.trim() {
        "" | "random" => Ok(None),
        seed => seed
            .parse()
            .map(Some)
            .map_err(|e| Error::invalid_input(format!("Invalid value for seed: {seed} ({e})"))),
    }
}

fn parse_bool(label: &str, value: &str) -> Result<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON" => Ok(true),
        "0" | "false" | "FALSE" | "False" | "no" | "NO" | "off" | "OFF" => Ok(false),
        _ => Err(Error::invalid_input(format!(
            "Invalid boolean for {label}: {value} (expected true/false)"
        ))),
    }
}
