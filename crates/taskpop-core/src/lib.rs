pub mod config;
pub mod datastore;
pub mod filter;
pub mod manager;
pub mod task;
pub mod theme;
pub mod view;

#[cfg(feature = "native")]
pub mod cli;
#[cfg(feature = "native")]
pub mod commands;
#[cfg(feature = "native")]
pub mod render;

#[cfg(feature = "native")]
pub use native::run;

#[cfg(feature = "native")]
mod native {
  use std::ffi::OsString;

  use anyhow::Context;
  use clap::Parser;
  use tracing::{
    debug,
    info
  };

  use crate::cli::Command;
  use crate::{
    cli,
    commands,
    config,
    datastore,
    manager,
    render
  };

  #[tracing::instrument(skip_all)]
  pub fn run(
    raw_args: Vec<OsString>
  ) -> anyhow::Result<()> {
    let pre =
      cli::preprocess_args(&raw_args)?;
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
      "starting taskpop CLI"
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

    let data_file =
      config::resolve_data_file(
        &cfg,
        cli.data.as_deref()
      )
      .context(
        "failed to resolve data file"
      )?;

    let area =
      datastore::JsonFileArea::open(
        &data_file
      )
      .with_context(|| {
        format!(
          "failed to open task store \
           at {}",
          data_file.display()
        )
      })?;

    let manager =
      manager::TaskManager::new(
        area,
        cfg.storage_key()
      );
    let mut renderer =
      render::Renderer::new(&cfg)?;
    let command =
      cli.command.unwrap_or(
        Command::List {
          category: String::new(),
          priority: String::new()
        }
      );

    let mut stdout =
      std::io::stdout().lock();
    futures::executor::block_on(
      commands::dispatch(
        &manager,
        &mut renderer,
        &mut stdout,
        command
      )
    )?;

    info!("done");
    Ok(())
  }
}
