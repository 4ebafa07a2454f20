mod cli;
mod error;

use crate::cli::{Cli, Commands};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use folio_config::Config;
use folio_container::{Container, ContainerSet};
use folio_reader::Session;
use folio_scene::{Direction, find_boundary};
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    debug!(?config, "resolved configuration");
    match cli.command {
        Commands::Entries { path } => entries(&config, &path),
        Commands::Siblings { path } => siblings(&path),
        Commands::Hash { path, indices } => hash(&config, &path, indices),
        Commands::Diff { path, a, b } => diff(&config, &path, a, b),
        Commands::Scene { path, from, backward, skip, threshold } => {
            let mut options = config.scan_options();
            options.skip = skip.unwrap_or(options.skip);
            options.threshold = threshold.unwrap_or(options.threshold);
            let direction = match backward {
                true => Direction::Backward,
                false => Direction::Forward,
            };
            let mut container = open(&config, &path)?;
            match find_boundary(&mut container, from, direction, &options).or_raise(|| ErrorKind::Scene)? {
                Some(index) => println!("{index}\t{}", container.name_at(index).or_raise(|| ErrorKind::Container)?),
                None => println!("no scene change {direction} of {from}"),
            }
            Ok(())
        },
        Commands::Walk { path } => walk(config, &path),
    }
}

fn open(config: &Config, path: &Path) -> Result<Container> {
    let container = Container::open(path, &config.image_extensions()).or_raise(|| ErrorKind::Container)?;
    debug!(path = %path.display(), entries = container.len(), "opened container");
    Ok(container)
}

fn entries(config: &Config, path: &Path) -> Result<()> {
    let container = open(config, path)?;
    for (index, name) in container.names().enumerate() {
        println!("{index}\t{name}");
    }
    Ok(())
}

fn siblings(path: &Path) -> Result<()> {
    let (set, current) = ContainerSet::of(path).or_raise(|| ErrorKind::Container)?;
    for name in set.list().or_raise(|| ErrorKind::Container)? {
        let marker = if name == current { "*" } else { " " };
        println!("{marker} {name}");
    }
    Ok(())
}

fn hash(config: &Config, path: &Path, indices: Vec<usize>) -> Result<()> {
    let mut container = open(config, path)?;
    let indices = match indices.is_empty() {
        true => (0..container.len()).collect(),
        false => indices,
    };
    let autorotate = config.embedded_orientation;
    for index in indices {
        let fingerprint = container.fingerprint_at(index, autorotate).or_raise(|| ErrorKind::Container)?;
        println!("{index}\t{fingerprint}\t{}", container.name_at(index).or_raise(|| ErrorKind::Container)?);
    }
    Ok(())
}

fn diff(config: &Config, path: &Path, a: usize, b: usize) -> Result<()> {
    let mut container = open(config, path)?;
    let autorotate = config.embedded_orientation;
    let first = container.fingerprint_at(a, autorotate).or_raise(|| ErrorKind::Container)?;
    let second = container.fingerprint_at(b, autorotate).or_raise(|| ErrorKind::Container)?;
    let threshold = config.scene.threshold;
    let normalized = first.normalized_distance(&second);
    println!("{first} {second}");
    println!("distance {} ({normalized:.4}), threshold {threshold}", first.distance(&second));
    if normalized > threshold {
        println!("different scenes");
    } else {
        println!("same scene");
    }
    Ok(())
}

fn walk(config: Config, path: &Path) -> Result<()> {
    let mut session = Session::new(config);
    session.open(path).or_raise(|| ErrorKind::Session)?;
    let name_at = |session: &Session, index: usize| {
        session.container().and_then(|container| container.name_at(index).ok()).unwrap_or_default().to_string()
    };
    println!("{}\t{}", session.position(), name_at(&session, 0));
    while let Some(index) = session.next_scene().or_raise(|| ErrorKind::Session)? {
        println!("{index}\t{}", name_at(&session, index));
    }
    Ok(())
}
