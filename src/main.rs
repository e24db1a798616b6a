mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, Command, Config, OutputFormat};
use std::io::{self, Write};
use vector2d::{Vector2D, VectorInput};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .init();

    log::debug!("Starting vector2d v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_cli(&cli);
    log::debug!("Configuration: {:?}", config);

    let stdout = io::stdout();
    run(cli.command, &config, &mut stdout.lock())
}

fn vector(input: VectorInput) -> Result<Vector2D> {
    let shown = format!("{:?}", input);
    Vector2D::coerce(input).with_context(|| format!("Failed to build vector from {}", shown))
}

fn print(out: &mut impl Write, vector: &Vector2D, config: &Config) -> Result<()> {
    match config.format {
        OutputFormat::Text => writeln!(out, "{}", vector)?,
        OutputFormat::Json => writeln!(
            out,
            "{}",
            serde_json::to_string(vector).context("Failed to serialize vector")?
        )?,
    }
    Ok(())
}

fn run(command: Command, config: &Config, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Show { vector: input } => {
            let v = vector(input)?;
            match config.format {
                OutputFormat::Text => {
                    let [x, y] = v.to_cartesian();
                    let [d, a] = v.to_polar();
                    writeln!(out, "cartesian: x={} y={}", x, y)?;
                    writeln!(out, "polar:     d={} a={}", d, a)?;
                    writeln!(out, "string:    {}", v)?;
                }
                OutputFormat::Json => {
                    let shown = serde_json::json!({
                        "cartesian": v.to_cartesian(),
                        "polar": v.to_polar(),
                        "string": v.to_string(),
                    });
                    writeln!(out, "{}", shown)?;
                }
            }
        }
        Command::Add { a, b } => print(out, &vector(a)?.add(&vector(b)?), config)?,
        Command::Subtract { a, b } => print(out, &vector(a)?.subtract(&vector(b)?), config)?,
        Command::Equals { a, b } => {
            let equal = vector(a)?.equals(Some(&vector(b)?));
            writeln!(out, "{}", equal)?;
        }
        Command::Rotate {
            vector: input,
            step,
            steps,
            offset,
        } => {
            let mut v = vector(input)?;
            let offset = vector(offset)?;
            log::info!("Rotating {} by {} rad over {} steps", v, step, steps);

            for _ in 0..steps {
                let angle = v.a() + step;
                v.set_a(angle);
                print(out, &v.add(&offset), config)?;
            }
        }
    }
    Ok(())
}
