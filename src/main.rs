use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Error};
use structopt::StructOpt;
use tracing::info;

use crowd_forecast::{
    config::{Config, EngineConfig},
    logger, CrowdPredictor, Registry,
};

fn main() {
    logger::init_logger();
    if let Err(err) = run() {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

#[derive(StructOpt)]
#[structopt(
    name = "crowd_forecast",
    about = "Predict crowding on a bus trip segment."
)]
pub enum Options {
    /// Predict from cli arguments
    Launch(Launch),
    /// Predict from a json config file
    ConfigFile(ConfigFile),
    /// Print the json config built from cli arguments
    CreateConfig(Config),
    /// List the known stops and routes
    Stops(EngineConfig),
}

#[derive(StructOpt)]
pub struct Launch {
    #[structopt(flatten)]
    pub config: Config,

    /// Print the prediction as json
    #[structopt(long)]
    pub json: bool,
}

#[derive(StructOpt)]
pub struct ConfigFile {
    /// path to the json config file
    #[structopt(parse(from_os_str))]
    file: PathBuf,

    /// Print the prediction as json
    #[structopt(long)]
    pub json: bool,
}

pub fn run() -> Result<(), Error> {
    match Options::from_args() {
        Options::Launch(launch) => predict(&launch.config, launch.json),
        Options::ConfigFile(config_file) => {
            let config = read_config(&config_file.file)?;
            predict(&config, config_file.json)
        }
        Options::CreateConfig(config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Options::Stops(engine) => {
            let registry = engine.registry()?;
            list_stops(&registry);
            Ok(())
        }
    }
}

pub fn read_config(path: &Path) -> Result<Config, Error> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            bail!("Error opening config file {:?} : {}", path, e)
        }
    };
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Could not parse config file {:?}", path))?;
    Ok(config)
}

fn predict(config: &Config, json: bool) -> Result<(), Error> {
    let registry = config.engine.registry()?;
    info!("Using crowd model {:?}", config.engine.model_command);

    let now = chrono::Local::now().naive_local();
    let input = config.trip.trip_input(
        &registry,
        &config.engine.extractor(),
        &config.engine.ticket_parser()?,
        now,
    )?;

    let predictor = CrowdPredictor::new(&registry, config.engine.model());
    let prediction = predictor.predict(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("{}", prediction);
    }
    Ok(())
}

fn list_stops(registry: &Registry) {
    println!("Stops:");
    for stop in registry.display_stops() {
        if let Some(id) = stop.id {
            println!("  {:>3}  {} ({:+})", id, stop.name, stop.flow_bias);
        }
    }
    println!("Routes:");
    for route in registry.routes() {
        println!("  {}: {}", route.label(), route.stops.join(", "));
    }
}
