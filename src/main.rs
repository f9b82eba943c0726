mod announce;
mod cli;
mod error;
mod progress;

use crate::announce::Announcer;
use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use reel_config::Config;
use reel_library::{Context, DiscoveryMethod, Library, orchestrate};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = cli.init_logging() {
        eprintln!("{err:?}");
        return ExitCode::FAILURE;
    }
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let started = Instant::now();
    let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    cli.apply(&mut config);
    config.validate().or_raise(|| ErrorKind::Config)?;
    let ctx = Context::new(&config.data_dir).with_verbose(cli.is_verbose());

    let mut libraries: Vec<Arc<Library>> = Vec::with_capacity(config.libraries.len());
    for entry in &config.libraries {
        match Library::open(&ctx, &entry.path, config.max_depth_for(entry), &libraries).await {
            Ok(library) => {
                tracing::info!("Opened library {library}");
                libraries.push(Arc::new(library));
            },
            Err(err) => {
                let kind: &reel_library::error::ErrorKind = &err;
                tracing::warn!(path = %entry.path.display(), "Skipping library: {kind}");
            },
        }
    }
    if libraries.is_empty() {
        exn::bail!(ErrorKind::NoLibraries);
    }

    let (sender, feed) = Announcer::channel();
    let view = tokio::spawn(announce::consume(feed));
    let ticker = tokio::spawn(progress::tick(Arc::clone(&ctx.busy)));
    let tasks = orchestrate::populate(&ctx, &libraries, |method| Announcer::new(method, sender.clone()));
    // Announcers now live in the library tasks; the feed closes once they finish.
    drop(sender);

    let mut total = 0;
    for result in orchestrate::join_all(tasks).await {
        match result {
            Ok(populated) => total += populated.total(),
            Err(err) => {
                let kind: &reel_library::error::ErrorKind = &err;
                tracing::error!("{kind}");
            },
        }
    }
    ticker.abort();
    match view.await {
        Ok(view) => tracing::debug!(
            entities = view.len(),
            loaded = view.count(DiscoveryMethod::Load),
            found = view.count(DiscoveryMethod::Scan),
            "Front end received every discovery"
        ),
        Err(err) => tracing::warn!("Discovery feed did not shut down cleanly: {err}"),
    }
    tracing::info!("Initialization complete ({total} things found in {:.2?})", started.elapsed());

    for library in &libraries {
        library.database().close().await;
    }
    Ok(())
}
