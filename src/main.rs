use anyhow::{Context, Result, bail};
use birdwatch::audio::capture::{CpalAudioSource, list_devices, suppress_audio_warnings};
use birdwatch::audio::recorder::AudioSourceConfig;
use birdwatch::classify::command::CommandClassifier;
use birdwatch::cli::{Cli, Commands};
use birdwatch::config::Config;
use birdwatch::pipeline::{Pipeline, PipelineConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Devices) => {
            suppress_audio_warnings();
            for device in list_devices()? {
                println!("{}", device);
            }
            Ok(())
        }
        None => run(cli).await,
    }
}

async fn run(cli: Cli) -> Result<()> {
    suppress_audio_warnings();

    let mut config = load_config(cli.config.as_deref())?.with_env_overrides();
    if let Some(device) = cli.device {
        config.audio.device = Some(device);
    }
    if let Some(database) = cli.database {
        config.database.path = database;
    }
    if let Some(classifier) = cli.classifier {
        config.detection.command = Some(classifier);
    }
    config.validate()?;

    let Some(command) = config.detection.command.clone() else {
        bail!(
            "no classifier configured; set [detection].command in the config file \
             or pass --classifier"
        );
    };
    let classifier = CommandClassifier::new(command, config.detection.args.clone());

    let source = CpalAudioSource::new(
        config.audio.device.as_deref(),
        AudioSourceConfig {
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            blocksize: config.audio.blocksize,
        },
    )?;

    let pipeline = Pipeline::new(PipelineConfig::from_config(&config));
    let handle = pipeline.start(source, classifier)?;

    tracing::info!(
        "birdwatch {} listening, recording detections to {}",
        birdwatch::version_string(),
        config.database.path.display()
    );
    tracing::info!("press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to wait for Ctrl-C")?;

    handle.stop();
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => match Config::default_path() {
            Some(default) => Config::load_or_default(&default),
            None => Ok(Config::default()),
        },
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("birdwatch={}", default_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
