//! Release-sync pipeline controller.
//!
//! Sequences tooling validation, config loading, discovery, downloading,
//! config rewriting, and the repository build. The staging directory is
//! owned by a [`StagingArea`] for the whole run and removed exactly once,
//! whether the run succeeds, fails, or is interrupted by a signal.

mod signal;
mod staging;
mod types;

pub use signal::{Signal, shutdown_signal};
pub use staging::StagingArea;
pub use types::{PipelineError, Stage, SyncReport};

use std::cell::{Cell, RefCell};
use std::future::Future;

use reqwest::Client;
use tracing::{debug, error, info, warn};

use crate::builder::{Builder, CommandRunner};
use crate::config::{ConfigStore, package_paths, rewrite_packages};
use crate::fetch::fetch_all;
use crate::release::ReleaseClient;
use crate::settings::{SyncSettings, http_client};

/// One configured sync run.
pub struct Pipeline<R> {
  settings: SyncSettings,
  http: Client,
  releases: ReleaseClient,
  builder: Builder<R>,
  stage: Cell<Stage>,
  history: RefCell<Vec<Stage>>,
}

impl<R: CommandRunner> Pipeline<R> {
  /// Build a pipeline from resolved settings and a command runner.
  ///
  /// # Errors
  ///
  /// Fails if the HTTP client cannot be built or the API URL is invalid.
  pub fn new(settings: SyncSettings, runner: R) -> Result<Self, PipelineError> {
    let http = http_client().map_err(PipelineError::HttpClient)?;
    let releases = ReleaseClient::new(http.clone(), &settings.api_url)?.with_timeout(settings.api_timeout);
    let builder = Builder::new(runner, settings.builder.clone()).with_timeout(settings.build_timeout);

    Ok(Self {
      settings,
      http,
      releases,
      builder,
      stage: Cell::new(Stage::Idle),
      history: RefCell::new(vec![Stage::Idle]),
    })
  }

  pub fn builder(&self) -> &Builder<R> {
    &self.builder
  }

  /// The stage the pipeline is in.
  pub fn stage(&self) -> Stage {
    self.stage.get()
  }

  /// Every stage entered by the last run, in order.
  pub fn history(&self) -> Vec<Stage> {
    self.history.borrow().clone()
  }

  /// Run the pipeline until it finishes or `shutdown` resolves.
  ///
  /// Cleanup runs once on every path before this returns.
  ///
  /// # Errors
  ///
  /// Returns the first fatal error, or [`PipelineError::Interrupted`] if
  /// `shutdown` resolved first.
  pub async fn run<S>(&self, shutdown: S) -> Result<SyncReport, PipelineError>
  where
    S: Future<Output = Signal>,
  {
    self.history.borrow_mut().clear();
    self.enter(Stage::Idle);

    let staging = StagingArea::acquire(&self.settings.staging_dir);

    let result = tokio::select! {
      result = self.execute(&staging) => result,
      signal = shutdown => {
        warn!(signal = %signal, stage = %self.stage(), "interrupted");
        Err(PipelineError::Interrupted(signal))
      }
    };

    let last_stage = self.stage();
    self.enter(Stage::Cleanup);
    staging.release();

    match &result {
      Ok(report) => {
        self.enter(Stage::Succeeded);
        info!(
          version = %report.version,
          staged = report.staged.len(),
          attempted = report.attempted,
          "sync complete"
        );
      }
      Err(err) => {
        self.enter(Stage::Failed);
        error!(stage = %last_stage, error = %err, "sync failed");
      }
    }

    result
  }

  async fn execute(&self, staging: &StagingArea) -> Result<SyncReport, PipelineError> {
    self.enter(Stage::ValidatingTooling);
    self.builder.check_version().await?;

    self.enter(Stage::LoadingConfig);
    let store = ConfigStore::new(&self.settings.config_path);
    let mut config = store.load()?;

    self.enter(Stage::Discovering);
    let release = self.releases.latest().await?;

    self.enter(Stage::PreparingStaging);
    staging.prepare().await.map_err(|source| PipelineError::Staging {
      path: staging.path().to_path_buf(),
      source,
    })?;

    self.enter(Stage::Downloading);
    let outcome = fetch_all(
      &self.http,
      &release.assets,
      staging.path(),
      self.settings.download_timeout,
    )
    .await;

    if outcome.is_partial() {
      warn!(
        succeeded = outcome.staged.len(),
        attempted = outcome.attempted,
        "some downloads failed, publishing the rest"
      );
    }
    let attempted = outcome.attempted;
    let staged = outcome.into_result()?;

    self.enter(Stage::RewritingConfig);
    let packages = package_paths(&staged, store.base_dir());
    rewrite_packages(&mut config, &packages);

    self.enter(Stage::SavingConfig);
    store.save(&config)?;

    self.enter(Stage::Building);
    self.builder.build(store.path(), &self.settings.output_dir).await?;

    Ok(SyncReport {
      version: release.version,
      staged,
      attempted,
      packages,
      output_dir: self.settings.output_dir.clone(),
    })
  }

  fn enter(&self, stage: Stage) {
    debug!(from = %self.stage.get(), to = %stage, "stage transition");
    self.stage.set(stage);
    self.history.borrow_mut().push(stage);

    if stage.is_terminal() {
      let path: Vec<&str> = self.history.borrow().iter().map(Stage::as_str).collect();
      debug!(stages = %path.join(" -> "), "run finished");
    }
  }
}
