//! the core app
use {
    super::{cli::Cli, host, logging},
    crate::{
        config::instance::init_config,
        controller::DatasetController,
        getopt,
        index::suggest_with_limit,
        loader::{HttpFetcher, LoadOptions},
        opt_and,
    },
    clap::Parser,
    color_eyre::eyre::{Context, Result},
    owo_colors::OwoColorize,
    std::sync::Arc,
    tracing::info,
};

/// the tagcomplete app
pub struct TcApp {
    /// the parsed command line
    cli: Cli,
    /// what the app loads
    options: LoadOptions,
    /// owns the dataset
    controller: Arc<DatasetController>,
}

impl TcApp {
    /// initialize tagcomplete
    ///
    /// - 1. parses the command line and runs the generators if asked to
    /// - 2. loads the config file
    /// - 3. sets up logging
    /// - 4. builds the http client
    /// - 5. loads the tag dataset
    ///
    /// returns `None` if a generator flag was given and there's nothing left to do
    ///
    /// # Errors
    ///
    /// returns an error if the generators fail
    /// returns an error if the config is invalid
    /// returns an error if logging or the http client can't be set up
    /// returns an error if a local file can't be read
    pub async fn init() -> Result<Option<Self>> {
        let cli = Cli::parse();
        if cli.run_generators()? {
            return Ok(None);
        }

        init_config().wrap_err("failed to load configuration")?;
        opt_and!(logging.enable, logging::setup()?);

        info!(
            "Starting {} v{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        );

        let http = getopt!(raw http).unwrap_or_default().settings();
        let completion = getopt!(raw completion).unwrap_or_default().settings();
        let fetcher = Arc::new(HttpFetcher::new(&http).wrap_err("failed to build http client")?);

        let options = cli.load_options().await?;
        let controller = Arc::new(DatasetController::init(&options, fetcher, completion).await);

        Ok(Some(Self {
            cli,
            options,
            controller,
        }))
    }

    /// run the app
    ///
    /// with `--query` the matches are printed once, otherwise the interactive host runs
    ///
    /// # Errors
    ///
    /// returns an error if the host fails to read input
    pub async fn run(self) -> Result<()> {
        match self.cli.query {
            Some(ref query) => {
                let limit = getopt!(completion.max_results);
                for suggestion in suggest_with_limit(&self.controller.dataset(), query, limit) {
                    println!(
                        "{} {}",
                        suggestion.tag().bright_white(),
                        suggestion.record.meta_line().unwrap_or_default().dimmed()
                    );
                }
                Ok(())
            }
            None => host::run(Arc::clone(&self.controller), self.options.clone()).await,
        }
    }

    /// the dataset controller
    pub fn controller(&self) -> &Arc<DatasetController> {
        &self.controller
    }
}
