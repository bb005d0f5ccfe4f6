//! Menuboard - browse and administer a restaurant digital menu from the
//! command line.
//!
//! `menuboard show` prints the current menu (or the bundled one when the
//! store is unreachable). The other commands edit the catalog and need a
//! configured store.

mod render;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use menuboard_core::{
    CategoryPatch, Config, CredentialStore, ItemPatch, MenuError, MenuService, MoveDirection,
    NewCategory, NewItem, NewSubCategory, RowId, StoreClient, SubCategoryPatch,
};

/// Log file name used when `--log-dir` is given
const LOG_FILE: &str = "menuboard.log";

#[derive(Parser, Debug)]
#[command(name = "menuboard", version)]
#[command(about = "Browse and edit a restaurant digital menu")]
struct Cli {
    /// Write logs to this directory instead of stderr.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the menu tree.
    Show {
        /// Print the tree as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Save the store URL and put the API key in the OS keychain.
    Configure {
        /// Store base URL, e.g. https://abcd.supabase.co
        #[arg(long, required_unless_present = "forget")]
        url: Option<String>,
        /// Request timeout in seconds.
        #[arg(long, conflicts_with = "forget")]
        timeout: Option<u64>,
        /// Remove the saved key from the keychain and clear the store URL.
        #[arg(long)]
        forget: bool,
    },
    /// Edit categories.
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Edit subcategories.
    #[command(subcommand)]
    Subcategory(SubCategoryCommand),
    /// Edit items.
    #[command(subcommand)]
    Item(ItemCommand),
    /// Replace the whole catalog with the starter menu.
    Reset {
        /// Confirm that every category, subcategory and item is deleted.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        icon: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_icon")]
        icon: Option<String>,
        /// Remove the category's icon.
        #[arg(long)]
        clear_icon: bool,
        #[arg(long)]
        order: Option<i32>,
    },
    Delete {
        id: String,
    },
    /// Set the order index directly.
    Reorder {
        id: String,
        index: i32,
    },
    /// Swap with the neighbouring category.
    Move {
        id: String,
        #[arg(value_enum)]
        direction: Direction,
    },
}

#[derive(Subcommand, Debug)]
enum SubCategoryCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: String,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        order: Option<i32>,
    },
    Delete {
        id: String,
    },
    Reorder {
        id: String,
        index: i32,
    },
    /// Swap with the neighbouring subcategory of the same category.
    Move {
        id: String,
        #[arg(value_enum)]
        direction: Direction,
    },
}

#[derive(Subcommand, Debug)]
enum ItemCommand {
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        sub_category: String,
        #[arg(long)]
        price: f64,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        image: Option<String>,
        /// Add the item as not currently available.
        #[arg(long)]
        unavailable: bool,
    },
    Update(ItemUpdate),
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ItemUpdate {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    sub_category: Option<String>,
    #[arg(long)]
    available: Option<bool>,
    #[arg(long, conflicts_with = "clear_image")]
    image: Option<String>,
    /// Remove the item's picture.
    #[arg(long)]
    clear_image: bool,
}

impl ItemUpdate {
    fn into_patch(self) -> (String, ItemPatch) {
        let image = if self.clear_image {
            Some(None)
        } else {
            self.image.map(Some)
        };
        let patch = ItemPatch {
            name: self.name,
            description: self.description,
            price: self.price,
            sub_category_id: self.sub_category.map(RowId::from),
            available: self.available,
            image,
        };
        (self.id, patch)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG to control the level (e.g. RUST_LOG=debug). The returned
/// guard must live until exit so buffered file logs are flushed.
fn init_tracing(log_dir: Option<&PathBuf>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            Ok(None)
        }
    }
}

/// Attach the user-facing hint to a service error.
fn explain(err: MenuError) -> anyhow::Error {
    let hint = err.hint();
    anyhow::Error::new(err).context(hint)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_ref())?;
    info!("Menuboard starting");

    let config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Command::Configure {
            url,
            timeout,
            forget,
        } => {
            if forget {
                forget_store(config, url)
            } else {
                configure(config, url.unwrap_or_default(), timeout)
            }
        }
        command => {
            let service = MenuService::from_config(&config)?;
            run(&service, command).await
        }
    }
}

type Service = MenuService<StoreClient>;

fn configure(mut config: Config, url: String, timeout: Option<u64>) -> Result<()> {
    let url = url.trim().trim_end_matches('/').to_string();
    if !url.starts_with("https://") {
        bail!("Store URL must start with https://");
    }

    let key = rpassword::prompt_password("API key: ")?;
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    CredentialStore::store_key(&url, key.trim())?;

    config.store_url = Some(url);
    if timeout.is_some() {
        config.request_timeout_secs = timeout;
    }
    config.save().context("Failed to save configuration")?;

    println!("Saved. Key stored in the OS keychain.");
    Ok(())
}

fn forget_store(mut config: Config, url: Option<String>) -> Result<()> {
    let Some(url) = url.or_else(|| config.store_url.clone()) else {
        bail!("No store URL configured, nothing to forget");
    };
    let url = url.trim().trim_end_matches('/').to_string();

    if let Err(e) = CredentialStore::delete(&url) {
        // The key may only ever have been set through the environment.
        warn!(error = %e, "No keychain entry removed");
    }
    if config.store_url.as_deref() == Some(url.as_str()) {
        config.store_url = None;
        config.save().context("Failed to save configuration")?;
    }

    println!("Forgot the API key for {url}.");
    Ok(())
}

async fn run(service: &Service, command: Command) -> Result<()> {
    match command {
        Command::Show { json } => {
            let menu = service.get_menu_data().await;
            let mut out = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &menu)?;
                writeln!(out)?;
            } else {
                if !service.is_configured() {
                    writeln!(out, "(store not configured, showing the bundled menu)\n")?;
                }
                write!(out, "{}", render::menu_tree(&menu))?;
            }
        }
        Command::Configure { .. } => {
            bail!("`configure` does not use the menu store");
        }
        Command::Category(command) => category(service, command).await.map_err(explain)?,
        Command::Subcategory(command) => sub_category(service, command)
            .await
            .map_err(explain)?,
        Command::Item(command) => item(service, command).await.map_err(explain)?,
        Command::Reset { yes } => {
            if !yes {
                bail!("Reset deletes the whole catalog. Re-run with --yes to confirm.");
            }
            service.reset_to_initial_data().await.map_err(explain)?;
            println!("Menu reset to the starter catalog.");
        }
    }
    Ok(())
}

async fn category(
    service: &Service,
    command: CategoryCommand,
) -> Result<(), MenuError> {
    match command {
        CategoryCommand::Add { name, icon } => {
            let id = service.add_category(&NewCategory { name, icon }).await?;
            println!("Added category {id}");
        }
        CategoryCommand::Update {
            id,
            name,
            icon,
            clear_icon,
            order,
        } => {
            let icon = if clear_icon { Some(None) } else { icon.map(Some) };
            let patch = CategoryPatch {
                name,
                icon,
                order_index: order,
            };
            service.update_category(&id, &patch).await?;
            println!("Updated category {id}");
        }
        CategoryCommand::Delete { id } => {
            service.delete_category(&id).await?;
            println!("Deleted category {id}");
        }
        CategoryCommand::Reorder { id, index } => {
            service.reorder_category(&id, index).await?;
            println!("Category {id} now at index {index}");
        }
        CategoryCommand::Move { id, direction } => {
            service.move_category(&id, direction.into()).await?;
            println!("Moved category {id}");
        }
    }
    Ok(())
}

async fn sub_category(
    service: &Service,
    command: SubCategoryCommand,
) -> Result<(), MenuError> {
    match command {
        SubCategoryCommand::Add { name, category } => {
            let draft = NewSubCategory {
                name,
                category_id: RowId::from(category),
            };
            let id = service.add_sub_category(&draft).await?;
            println!("Added subcategory {id}");
        }
        SubCategoryCommand::Update {
            id,
            name,
            category,
            order,
        } => {
            let patch = SubCategoryPatch {
                name,
                category_id: category.map(RowId::from),
                order_index: order,
            };
            service.update_sub_category(&id, &patch).await?;
            println!("Updated subcategory {id}");
        }
        SubCategoryCommand::Delete { id } => {
            service.delete_sub_category(&id).await?;
            println!("Deleted subcategory {id}");
        }
        SubCategoryCommand::Reorder { id, index } => {
            service.reorder_sub_category(&id, index).await?;
            println!("Subcategory {id} now at index {index}");
        }
        SubCategoryCommand::Move { id, direction } => {
            service.move_sub_category(&id, direction.into()).await?;
            println!("Moved subcategory {id}");
        }
    }
    Ok(())
}

async fn item(
    service: &Service,
    command: ItemCommand,
) -> Result<(), MenuError> {
    match command {
        ItemCommand::Add {
            name,
            sub_category,
            price,
            description,
            image,
            unavailable,
        } => {
            let draft = NewItem {
                name,
                description,
                price,
                sub_category_id: RowId::from(sub_category),
                available: !unavailable,
                image,
            };
            let id = service.add_item(&draft).await?;
            println!("Added item {id}");
        }
        ItemCommand::Update(update) => {
            let (id, patch) = update.into_patch();
            service.update_item(&id, &patch).await?;
            println!("Updated item {id}");
        }
        ItemCommand::Delete { id } => {
            service.delete_item(&id).await?;
            println!("Deleted item {id}");
        }
    }
    Ok(())
}
