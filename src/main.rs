use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use confique::Config;
use gcc_tdoa::{
    BearingConfig, GccConfig, InvalidPairs, Medium, PairSelection, PcmFormat, Recording,
    Weighting, F,
};
use tracing_subscriber::EnvFilter;

/// Time difference of arrival and bearing estimation.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// One of phat, roth, scot, mle or none.
    #[arg(long, global = true)]
    weighting: Option<Weighting>,
    /// Ambient temperature in degrees Celsius.
    #[arg(long, global = true, allow_hyphen_values = true)]
    temperature: Option<F>,
    /// Distance between neighbouring microphones in meters.
    #[arg(long, global = true)]
    spacing: Option<F>,
    /// Microphone pairs to compare, adjacent or reference.
    #[arg(long, global = true)]
    pairs: Option<PairSelection>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prints the speed of sound.
    Speed,
    /// Prints the delay of channel `b` relative to channel `a`.
    Delay {
        #[command(flatten)]
        input: Input,
        #[arg(short, default_value_t = 0)]
        a: usize,
        #[arg(short, default_value_t = 1)]
        b: usize,
    },
    /// Prints the per pair delays and angles and the bearing.
    Locate {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Raw interleaved pcm file, `-` for stdin.
    input: PathBuf,
    #[arg(long)]
    channels: usize,
    /// Sample rate in Hz.
    #[arg(long)]
    rate: F,
    #[arg(long, default_value = "F32LE")]
    format: PcmFormat,
}

impl Input {
    fn read(&self) -> Result<Recording> {
        let data = if self.input == Path::new("-") {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .context("reading stdin")?;
            data
        } else {
            fs::read(&self.input).with_context(|| format!("reading {:?}", self.input))?
        };
        if self.channels == 0 {
            bail!("need at least one channel");
        }
        Ok(Recording::from_pcm_bytes(
            self.format,
            self.rate,
            self.channels,
            &data,
        ))
    }
}

#[derive(Config)]
struct Conf {
    weighting: Option<Weighting>,
    #[config(default = 1e-6)]
    imaginary_tolerance: F,
    #[config(default = 25.0, env = "GCC_TDOA_TEMPERATURE")]
    temperature: F,
    #[config(default = 331.3)]
    calibration: F,
    #[config(default = 0.1, env = "GCC_TDOA_SPACING")]
    spacing: F,
    pairs: Option<PairSelection>,
    invalid_pairs: Option<InvalidPairs>,
    #[config(default = 0.0)]
    min_peak: F,
}

impl Cli {
    fn bearing_config(&self) -> Result<BearingConfig> {
        let mut builder = Conf::builder().env();
        if let Some(config) = &self.config {
            builder = builder.file(config);
        }
        let conf = builder.load().context("loading configuration")?;
        Ok(BearingConfig {
            gcc: GccConfig {
                weighting: self.weighting.or(conf.weighting).unwrap_or_default(),
                imaginary_tolerance: conf.imaginary_tolerance,
            },
            medium: Medium {
                temperature: self.temperature.unwrap_or(conf.temperature),
                calibration: conf.calibration,
            },
            spacing: self.spacing.unwrap_or(conf.spacing),
            pairs: self.pairs.or(conf.pairs).unwrap_or_default(),
            invalid_pairs: conf.invalid_pairs.unwrap_or_default(),
            min_peak: conf.min_peak,
            ..BearingConfig::default()
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.bearing_config()?;

    match &cli.command {
        Command::Speed => {
            println!("{:.3} m/s", config.medium.speed_of_sound());
        }
        Command::Delay { input, a, b } => {
            let recording = input.read()?;
            if *a >= recording.channels() || *b >= recording.channels() {
                bail!(
                    "channels {a} and {b} need to be below {}",
                    recording.channels()
                );
            }
            let estimate = config.gcc.estimate(
                recording.channel(*a),
                recording.channel(*b),
                recording.sample_rate(),
            )?;
            println!(
                "tdoa: {:e} s ({} samples, peak {:e})",
                estimate.tdoa,
                estimate.delay_samples(),
                estimate.peak
            );
        }
        Command::Locate { input } => {
            let recording = input.read()?;
            let estimate = BearingConfig {
                mics: recording.channels(),
                ..config
            }
            .create()?
            .locate(&recording)?;
            println!("speed of sound: {:.3} m/s", estimate.speed_of_sound);
            for pair in &estimate.pairs {
                match &pair.angle {
                    Ok(angle) => println!(
                        "mics {} -> {}: tdoa {:e} s, angle {angle:.2} deg",
                        pair.pair.a, pair.pair.b, pair.estimate.tdoa
                    ),
                    Err(e) => println!(
                        "mics {} -> {}: tdoa {:e} s, {e}",
                        pair.pair.a, pair.pair.b, pair.estimate.tdoa
                    ),
                }
            }
            println!("bearing: {:.2} deg", estimate.bearing);
        }
    }
    Ok(())
}
