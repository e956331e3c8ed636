use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::Context;
use boids_core::options::{FieldSize, RunOptions};
use clap::Parser;
use clap_serde_derive::ClapSerde;
use serde::Serialize;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Real-time 2D boids flocking on a toroidal field.
pub struct Args {
    /// Config file, YAML unless the extension is .toml
    #[arg(short, long = "config", default_value = "boids.yaml")]
    pub config_path: std::path::PathBuf,

    /// Print the merged configuration as YAML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Run this many ticks without a window, then print the last statistics
    #[arg(long, default_value_t = 0)]
    pub headless: u64,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by the config file, which in turn
/// is overwritten by command line arguments
pub struct Config {
    #[default(200)]
    #[arg(short = 'n', long)]
    /// number of boids
    pub no_boids: usize,

    #[default(1080)]
    #[arg(short = 'x', long)]
    /// field and window width
    pub width: u32,

    #[default(1080)]
    #[arg(short = 'y', long)]
    /// field and window height
    pub height: u32,

    #[default(5.)]
    #[arg(long = "max_init_speed")]
    pub max_init_speed: f64,

    #[default(40.)]
    #[arg(short = 'r', long = "radius")]
    /// neighbourhood radius
    pub neighbourhood_radius: f64,

    #[default(3.)]
    #[arg(long = "size")]
    /// radius of the circle drawn for every boid
    pub boid_size: f32,

    #[default(60)]
    #[arg(long)]
    /// target simulation steps per second
    pub fps: u8,

    #[default(0)]
    #[arg(short = 's', long)]
    /// seed of the random generator, 0 picks a fresh one
    pub seed: u64,

    #[default(60)]
    #[arg(long = "sample_rate")]
    /// ticks in between two statistics samples
    pub sample_rate: u64,
}

impl From<&Config> for RunOptions {
    fn from(config: &Config) -> Self {
        RunOptions {
            init_boids: config.no_boids,
            field: FieldSize::new(config.width as f64, config.height as f64),
            max_init_speed: config.max_init_speed,
            neighbourhood_radius: config.neighbourhood_radius,
            sample_rate: config.sample_rate,
            ..Default::default()
        }
    }
}

/// Merges the config file, if there is one, with the command line arguments
pub fn load_config(args: &mut Args) -> anyhow::Result<Config> {
    let file = match File::open(&args.config_path) {
        Ok(f) => f,
        Err(_) => {
            log::debug!(
                "no config file at {}, using defaults and arguments",
                args.config_path.display()
            );
            return Ok(Config::from(&mut args.config));
        }
    };

    let config = parse_config_file(file, &args.config_path)
        .with_context(|| format!("Error in configuration file {}", args.config_path.display()))?;
    log::info!("loaded configuration from {}", args.config_path.display());

    Ok(Config::from(config).merge(&mut args.config))
}

fn parse_config_file(file: File, path: &Path) -> anyhow::Result<<Config as ClapSerde>::Opt> {
    let mut reader = BufReader::new(file);

    if path.extension().map_or(false, |ext| ext == "toml") {
        let mut contents = String::new();
        reader.read_to_string(&mut contents)?;
        Ok(toml::from_str(&contents)?)
    } else {
        Ok(serde_yaml::from_reader(reader)?)
    }
}

/// Seed actually used for the run, a zero seed is replaced by a random one
pub fn effective_seed(config: &Config) -> u64 {
    match config.seed {
        0 => rand::random(),
        seed => seed,
    }
}
