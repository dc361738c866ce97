use clap::{Parser, Subcommand};
use item_shop::bot::{ShopBot, Stop, supervise};
use item_shop::cache::IconCache;
use item_shop::config::{self, BotConfig};
use item_shop::date::DateLabeler;
use item_shop::imaging::{DiskAssets, Quality, RustTypeface};
use item_shop::output;
use item_shop::publish::{OAuthCredentials, Publisher, TwitterClient};
use item_shop::shop::render_to_file;
use item_shop::tracker::{CatalogTracker, HttpCatalogSource};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that download icons.
#[derive(clap::Args, Clone, Default)]
struct CacheArgs {
    /// Disable the icon cache and download every icon
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "item-shop")]
#[command(about = "Renders the Fortnite item shop and posts it to Twitter")]
#[command(long_about = "\
Renders the Fortnite item shop and posts it to Twitter

Polls the catalog API every `checkForUpdates` seconds. When the catalog
changes, every featured and daily entry is drawn as a card onto a single
JPEG, which is then tweeted with the date as caption.

Assets structure:

  assets/
  ├── fonts/
  │   ├── BurbankBigRegular-Black.ttf  # Display font
  │   └── LuckiestGuy-Regular.ttf      # Fallback font
  └── images/
      ├── background.png               # Stretched over the whole canvas
      ├── vbucks.png                   # Currency glyph next to prices
      └── shopTemplates/
          ├── CommonBG.png             # Card background per rarity
          ├── CommonOV.png             # Card overlay per rarity
          └── ...

Run 'item-shop gen-config' to print a configuration.json with all defaults.")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "configuration.json", global = true)]
    config: PathBuf,

    /// Assets directory (fonts and images)
    #[arg(long, default_value = "assets", global = true)]
    assets: PathBuf,

    /// Rendered image path
    #[arg(long, default_value = "itemshop.jpeg", global = true)]
    output: PathBuf,

    /// Directory for downloaded icons
    #[arg(long, default_value = ".item-shop-cache", global = true)]
    cache_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Poll the item shop and publish every new catalog (default)
    Run(CacheArgs),
    /// Fetch and render the current catalog once, without publishing
    Render(CacheArgs),
    /// Validate the config and list which assets are present
    Check,
    /// Print a stock configuration.json with all defaults
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match cli.command.clone().unwrap_or(Command::Run(CacheArgs::default())) {
        Command::Run(cache_args) => run(&cli, &cache_args)?,
        Command::Render(cache_args) => {
            let config = config::load_config(&cli.config)?;
            let assets = open_assets(&cli, &cache_args)?;
            let source = HttpCatalogSource::new(&config.fortnite_api, &config.language)?;
            let snapshot = CatalogTracker::new(source).poll()?.snapshot;
            let face = RustTypeface::load(&assets.fonts_dir())?;
            let date = DateLabeler::new(&config.language).today();
            let report = render_to_file(
                &snapshot,
                &date,
                &assets,
                &face,
                &cli.output,
                Quality::default(),
            )?;
            output::print_render_report(&report, &cli.output, assets.cache_stats());
        }
        Command::Check => {
            config::load_config(&cli.config)?;
            let audit = DiskAssets::new(&cli.assets)?.audit();
            output::print_asset_check(&cli.config, cli.config.exists(), &audit);
            if !audit.is_renderable() {
                return Err(format!("{} is missing required assets", cli.assets.display()).into());
            }
        }
        Command::GenConfig => {
            println!("{}", config::stock_config_json()?);
        }
    }

    Ok(())
}

fn open_assets(
    cli: &Cli,
    cache_args: &CacheArgs,
) -> Result<DiskAssets, Box<dyn std::error::Error>> {
    let assets = DiskAssets::new(&cli.assets)?;
    if cache_args.no_cache {
        return Ok(assets);
    }
    Ok(assets.with_cache(IconCache::open(&cli.cache_dir)?))
}

fn publisher(config: &BotConfig) -> Result<Option<Publisher>, Box<dyn std::error::Error>> {
    if !config.twitter.enabled {
        tracing::info!("Twitter disabled, images are rendered only");
        return Ok(None);
    }
    let client = TwitterClient::new(OAuthCredentials::from(&config.twitter))?;
    Ok(Some(Publisher::new(
        Box::new(client),
        config.creator_code().map(str::to_string),
    )))
}

/// Poll on the blocking pool until Ctrl-C or until the loop dies.
fn run(cli: &Cli, cache_args: &CacheArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(&cli.config)?;
    let assets = open_assets(cli, cache_args)?;
    let fonts_dir = assets.fonts_dir();
    let source = HttpCatalogSource::new(&config.fortnite_api, &config.language)?;

    let mut bot = ShopBot::new(&config, source, Box::new(assets), cli.output.clone())
        .with_fonts_dir(fonts_dir);
    if let Some(publisher) = publisher(&config)? {
        bot = bot.with_publisher(publisher);
    }

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl-C");
        }
    };
    let stop = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(supervise(bot, interrupt))?;
    if stop == Stop::WorkerExited {
        return Err("poll loop stopped unexpectedly".into());
    }
    tracing::info!("Exiting...");
    Ok(())
}
