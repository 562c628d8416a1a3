pub mod auth;
pub mod content;
pub mod payments;
pub mod render;
pub mod scan;
pub mod system;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use dracin_client::{
    ApiClient, FileStore, FlashMessage, FlashStore, KeyValueStore, SessionStore,
};
use dracin_config::{ClientConfig, ConfigLoad, ConfigLoader};
use dracin_model::Ack;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "dracinctl",
    version,
    about = "Operator CLI for the Dracin admin API"
)]
pub struct Cli {
    /// Print raw payloads as pretty JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in administrator
    Whoami,
    /// Control and monitor the library scan job
    Scan {
        #[command(subcommand)]
        action: scan::ScanAction,
    },
    /// App users
    Users {
        #[command(subcommand)]
        action: content::UserAction,
    },
    /// Series catalogue
    Series {
        #[command(subcommand)]
        action: content::SeriesAction,
    },
    /// Episode catalogue
    Episodes {
        #[command(subcommand)]
        action: content::EpisodeAction,
    },
    /// Tags
    Tags {
        #[command(subcommand)]
        action: content::TagAction,
    },
    /// Payment orders
    Orders {
        #[command(subcommand)]
        action: payments::OrderAction,
    },
    /// Subscription plans
    Plans {
        #[command(subcommand)]
        action: payments::PlanAction,
    },
    /// Payment providers
    Providers {
        #[command(subcommand)]
        action: payments::ProviderAction,
    },
    /// Key/value settings
    Settings {
        #[command(subcommand)]
        action: system::SettingsAction,
    },
    /// In-app surfaces: switchboard, ads and announcements
    App {
        #[command(subcommand)]
        action: system::AppAction,
    },
}

/// Everything a command needs: the loaded configuration, the client bound to
/// the persisted session, and the flash store.
#[derive(Debug)]
pub struct Context {
    pub config: ClientConfig,
    pub client: Arc<ApiClient>,
    pub store: Arc<dyn KeyValueStore>,
    pub flash: FlashStore,
    pub json: bool,
}

impl Context {
    pub fn load(json: bool) -> Result<Self> {
        let ConfigLoad { config, source } = ConfigLoader::new().load()?;
        debug!(source = ?source, "configuration loaded");

        let store: Arc<dyn KeyValueStore> = match &config.state_dir {
            Some(dir) => Arc::new(
                FileStore::open(dir)
                    .with_context(|| format!("opening state dir {}", dir.display()))?,
            ),
            None => Arc::new(
                FileStore::default_location()
                    .context("opening default state dir")?,
            ),
        };

        let session = SessionStore::restored(Arc::clone(&store));
        let client = ApiClient::new(&config, session)
            .context("building API client")?;

        Ok(Self {
            config,
            client: Arc::new(client),
            flash: FlashStore::new(Arc::clone(&store)),
            store,
            json,
        })
    }

    /// Print the message a previous command left for `scope`.
    pub fn show_flash(&self, scope: &str) {
        if let Some(message) = self.flash.take(scope) {
            render::print_flash(&message);
        }
    }

    /// Report a successful mutation now and leave it for the next listing
    /// of `scope`.
    pub fn acknowledged(&self, scope: &str, ack: &Ack) {
        println!("{}", ack.message);
        self.flash
            .publish(FlashMessage::success(scope, ack.message.clone()));
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.json)?;

    match cli.command {
        Command::Login { email, password } => {
            auth::login(&ctx, email, password).await
        }
        Command::Logout => auth::logout(&ctx),
        Command::Whoami => auth::whoami(&ctx),
        Command::Scan { action } => scan::run(&ctx, action).await,
        Command::Users { action } => content::users(&ctx, action).await,
        Command::Series { action } => content::series(&ctx, action).await,
        Command::Episodes { action } => content::episodes(&ctx, action).await,
        Command::Tags { action } => content::tags(&ctx, action).await,
        Command::Orders { action } => payments::orders(&ctx, action).await,
        Command::Plans { action } => payments::plans(&ctx, action).await,
        Command::Providers { action } => payments::providers(&ctx, action).await,
        Command::Settings { action } => system::settings(&ctx, action).await,
        Command::App { action } => system::app(&ctx, action).await,
    }
}
