pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod filter;
pub mod preferences;
pub mod render;
pub mod task;
pub mod todos;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args);
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting ticklist"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let backend =
    datastore::FileBackend::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open data \
         directory {}",
        data_dir.display()
      )
    })?;
  let mut app = app::App::open(backend);

  let command = match cli.command {
    | Some(command) => command,
    | None => {
      let name = cfg
        .get("default.command")
        .unwrap_or_else(|| {
          "list".to_string()
        });
      debug!(command = %name, "no explicit command, using default");
      cli::Command::from_default(&name)?
    }
  };

  commands::dispatch(
    &mut app,
    &cfg,
    command,
    io::stdout().lock()
  )?;

  info!("done");
  Ok(())
}
