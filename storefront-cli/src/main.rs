use clap::{Parser, Subcommand};
use colored::Colorize;
use storefront::storefront_cart::QuantityStep;
use storefront::{init_tracing, LogConfig, Storefront, StorefrontConfig};
use storefront_cli::commands::{self, cart, catalog, register};

#[derive(Parser)]
#[command(
    name = "storefront",
    version,
    about = "Browse the storefront catalog and manage your cart"
)]
struct Cli {
    /// Configuration profile (overridden by STOREFRONT_PROFILE)
    #[arg(long, global = true, default_value = "dev")]
    profile: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every product in the catalog
    Products,
    /// Search products by name or category
    Search {
        /// Search text
        text: String,
    },
    /// Show the cart and its total
    Cart,
    /// Add a product to the cart
    Add {
        /// Product id
        product_id: String,
        /// Quantity to add
        #[arg(long, default_value_t = 1)]
        qty: u32,
    },
    /// Increase a cart line's quantity by one
    Inc {
        /// Product id
        product_id: String,
    },
    /// Decrease a cart line's quantity by one (removes it at zero)
    Dec {
        /// Product id
        product_id: String,
    },
    /// Show the order summary
    Checkout,
    /// Create an account
    Register {
        username: String,
        #[arg(long)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },
}

async fn run(cli: Cli) -> Result<String, Box<dyn std::error::Error>> {
    let config = StorefrontConfig::load(&cli.profile)?;
    init_tracing(&config.section::<LogConfig>()?);

    let (shop, mut events) = Storefront::connect(&config)?;
    let output = match cli.command {
        Commands::Products => catalog::products(&shop).await?,
        Commands::Search { text } => catalog::search(&shop, &mut events, &text).await?,
        Commands::Cart => cart::show(&shop).await?,
        Commands::Add { product_id, qty } => cart::add(&shop, &product_id, qty).await?,
        Commands::Inc { product_id } => {
            cart::step(&shop, &product_id, QuantityStep::Increment).await?
        }
        Commands::Dec { product_id } => {
            cart::step(&shop, &product_id, QuantityStep::Decrement).await?
        }
        Commands::Checkout => cart::checkout(&shop).await?,
        Commands::Register {
            username,
            password,
            confirm,
        } => register::run(&shop, &username, &password, &confirm).await?,
    };
    shop.shutdown();
    Ok(output)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => println!("{}", output.trim_end()),
        Err(e) => {
            eprintln!("{}", format!("Error: {}", commands::describe(e.as_ref())).red());
            std::process::exit(1);
        }
    }
}
