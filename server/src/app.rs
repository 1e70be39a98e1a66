//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiServer, AuthManager};
use crate::core::cli::{self, CliConfig, Commands, SystemCommands};
use crate::core::config::AppConfig;
use crate::core::constants::{DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::DatastoreService;
use crate::data::cache::CacheService;
use crate::domain::tasks::{self, Task, TaskQueue};
use crate::domain::Services;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<DatastoreService>,
    pub cache: Arc<CacheService>,
    pub auth: Arc<AuthManager>,
    pub services: Services,
    task_rx: Option<tokio::sync::mpsc::Receiver<Task>>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::System {
                command: system_cmd,
            }) => {
                return Self::handle_system_command(system_cmd);
            }
            Some(Commands::Token { user, email }) => {
                return Self::print_token(&cli_config, &user, email);
            }
            Some(Commands::Start) | None => {}
        }

        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init().await?;

        let database = Arc::new(
            DatastoreService::init(&storage)
                .await
                .context("Failed to initialize datastore")?,
        );

        let cache = Arc::new(
            CacheService::new(&config.cache)
                .map_err(|e| anyhow::anyhow!("Failed to initialize cache service: {}", e))?,
        );
        tracing::debug!(backend = cache.backend_name(), "Cache initialized");

        let auth = Arc::new(AuthManager::new(&config.auth));

        let (tasks, task_rx) = TaskQueue::new(config.tasks.queue_capacity);
        let services = Services::new(database.store(), cache.clone(), tasks);
        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            cache,
            auth,
            services,
            task_rx: Some(task_rx),
        })
    }

    fn handle_system_command(cmd: SystemCommands) -> Result<()> {
        match cmd {
            SystemCommands::Prune { yes } => Self::prune_data(yes),
        }
    }

    fn print_token(cli: &CliConfig, user: &str, email: Option<String>) -> Result<()> {
        let config = AppConfig::load(cli)?;
        let auth = AuthManager::new(&config.auth);
        let email = email.unwrap_or_else(|| format!("{}@localhost", user));
        let token = auth.issue_token(user, &email)?;
        println!("{}", token);
        Ok(())
    }

    fn prune_data(skip_confirm: bool) -> Result<()> {
        let data_dir = AppStorage::resolve_data_dir();

        if !data_dir.exists() {
            println!(
                "Nothing to prune. Data directory does not exist: {}",
                data_dir.display()
            );
            return Ok(());
        }

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        println!("This will permanently delete all conferences, sessions and profiles in:");
        println!("  {}", data_dir.display());
        println!();
        println!("Stop the server first; pruning a live database corrupts it.");

        if !skip_confirm {
            print!("\nContinue? [y/N] ");
            std::io::Write::flush(&mut std::io::stdout())?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            if !matches!(input.trim().to_lowercase().as_str(), "y" | "yes") {
                println!("Aborted.");
                return Ok(());
            }
        }

        std::fs::remove_dir_all(&data_dir)
            .with_context(|| format!("Failed to delete data directory: {}", data_dir.display()))?;
        println!("Pruned: {}", data_dir.display());
        Ok(())
    }

    fn init_logging() {
        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(mut app: Self) -> Result<()> {
        // Signal handlers go in before anything can block
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await?;

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }

    pub async fn start_background_tasks(&mut self) -> Result<()> {
        self.shutdown
            .register(
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        let task_rx = self
            .task_rx
            .take()
            .context("Background tasks already started")?;
        self.shutdown
            .register(tasks::start_task_worker(
                task_rx,
                self.services.speakers.clone(),
                self.shutdown.subscribe(),
            ))
            .await;

        self.shutdown
            .register(tasks::start_announcement_task(
                self.services.announcements.clone(),
                self.config.tasks.announcement_interval(),
                self.shutdown.subscribe(),
            ))
            .await;

        tracing::debug!(
            cache = self.cache.backend_name(),
            announcement_interval_secs = self.config.tasks.announcement_interval_secs,
            "Background tasks started"
        );
        Ok(())
    }
}
