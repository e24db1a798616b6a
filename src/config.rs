use clap::{Parser, Subcommand, ValueEnum};
use vector2d::{Vector2D, VectorInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub format: OutputFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
        }
    }
}

#[derive(Parser)]
#[command(name = "vector2d")]
#[command(about = "Inspect and combine 2D vectors in cartesian or polar form", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Vectors are given as `x,y` or as JSON, e.g. `{"d":2,"a":1}` or `[1,2]`.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print a vector in cartesian, polar and string form
    Show {
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        vector: VectorInput,
    },

    /// Add two vectors
    Add {
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        a: VectorInput,
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        b: VectorInput,
    },

    /// Subtract the second vector from the first
    Subtract {
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        a: VectorInput,
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        b: VectorInput,
    },

    /// Compare two vectors for exact cartesian equality
    Equals {
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        a: VectorInput,
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        b: VectorInput,
    },

    /// Advance the angle of a vector step by step, printing `vector + offset`
    Rotate {
        #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
        vector: VectorInput,

        /// Angle added per step, in radians
        #[arg(short, long, default_value = "0.04", allow_negative_numbers = true)]
        step: f64,

        /// Number of steps to print
        #[arg(short = 'n', long, default_value = "10")]
        steps: u32,

        /// Offset added to every printed position
        #[arg(
            short,
            long,
            value_parser = parse_vector,
            allow_hyphen_values = true,
            default_value = "0,0"
        )]
        offset: VectorInput,
    },
}

/// Parses a vector argument, rejecting input that would not coerce.
///
/// clap values must be `Sync` and `Vector2D` is not, so the raw input is kept
/// and coerced again when the command runs. The coerce here only validates.
fn parse_vector(s: &str) -> Result<VectorInput, String> {
    let input: VectorInput = s.parse().map_err(|e: vector2d::VectorError| e.to_string())?;
    Vector2D::coerce(input.clone()).map_err(|e| e.to_string())?;
    Ok(input)
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut config = Config::default();
        config.format = cli.format;
        config
    }
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            log::LevelFilter::Error
        } else if self.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        }
    }
}
