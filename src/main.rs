use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};

use messmate::api::{HttpApi, MessApi, NewMess, NewReview, RegisterForm};
use messmate::models::{CuisineType, Price, UserRole};
use messmate::session::Session;
use messmate::store::ListingStore;
use messmate::views::{self, FilterParams, SortBy};

#[derive(Parser)]
#[command(name = "messmate", about = "Find, add and review mess services from the terminal")]
struct Cli {
    /// Base URL of the MessMate backend
    #[arg(
        long,
        global = true,
        env = "MESSMATE_API_URL",
        default_value = "http://localhost:5000/api"
    )]
    api_url: String,

    /// File where the login token is kept between runs
    #[arg(
        long,
        global = true,
        env = "MESSMATE_TOKEN_FILE",
        default_value = ".messmate_token"
    )]
    token_file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch listings and show them filtered and sorted
    List(ListArgs),
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value = "student")]
        role: UserRole,
    },
    /// Log out and forget the stored token
    Logout,
    /// Show the currently signed-in user
    Whoami,
    /// Add a new mess listing (requires login)
    AddMess(AddMessArgs),
    /// Leave a rating and comment on a listing
    Review {
        /// Id of the mess to review
        mess_id: String,
        /// Star rating, 1 to 5
        #[arg(long)]
        rating: u8,
        #[arg(long)]
        comment: String,
    },
    /// Sign in through Google
    GoogleLogin {
        /// Redirect URL pasted back from the browser after the Google
        /// round trip
        #[arg(long)]
        callback: Option<String>,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Free-text search across name, address, city and state
    #[arg(long, default_value = "")]
    search: String,
    /// Keep listings rated at least this
    #[arg(long, default_value_t = 0.0)]
    min_rating: f64,
    /// Highest acceptable monthly price
    #[arg(long)]
    max_price: Option<u32>,
    /// Show only this cuisine
    #[arg(long, value_enum)]
    cuisine: Option<CuisineType>,
    /// Exact city to filter by
    #[arg(long, default_value = "")]
    city: String,
    /// Exact state to filter by
    #[arg(long, default_value = "")]
    state: String,
    #[arg(long, value_enum, default_value = "rating")]
    sort: SortBy,
    /// Write the filtered listings to this JSON file
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Args)]
struct AddMessArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    address: String,
    /// 10-digit contact number
    #[arg(long)]
    contact: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    /// Price of a single meal
    #[arg(long, default_value_t = 0)]
    one_time: u32,
    /// Price of two meals a day
    #[arg(long, default_value_t = 0)]
    two_time: u32,
    /// Monthly plan price
    #[arg(long, default_value_t = 0)]
    monthly: u32,
    #[arg(long)]
    maps_link: String,
    #[arg(long, value_enum)]
    cuisine: CuisineType,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();
    let api = HttpApi::new(&cli.api_url)?;
    let mut session = Session::with_token_file(&cli.token_file);

    match cli.command {
        Command::List(args) => run_list(&api, args).await?,
        Command::Login { email, password } => {
            let user = api.login(&mut session, &email, &password).await?;
            info!("✅ Logged in as {} ({})", user.display_name(), user.role);
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let form = RegisterForm {
                name,
                email,
                password,
                role,
            };
            let user = api.register(&mut session, &form).await?;
            info!("✅ Registered {} ({})", user.display_name(), user.role);
        }
        Command::Logout => {
            api.logout(&mut session).await?;
            info!("Logged out");
        }
        Command::Whoami => match api.profile(&mut session).await? {
            Some(user) => println!(
                "{} <{}> {}",
                user.display_name(),
                user.email.as_deref().unwrap_or("-"),
                user.role
            ),
            None => println!("Not signed in."),
        },
        Command::AddMess(args) => {
            let new_mess = NewMess {
                name: args.name,
                address: args.address,
                contact: args.contact,
                city: args.city,
                state: args.state,
                price: Price {
                    one_time: args.one_time,
                    two_time: args.two_time,
                    monthly: args.monthly,
                },
                google_maps_link: args.maps_link,
                cuisine_type: args.cuisine,
            };
            let created = api.create_mess(&session, &new_mess).await?;
            info!("✅ Added {} (id {})", created.name, created.id);
        }
        Command::Review {
            mess_id,
            rating,
            comment,
        } => {
            // sign the review with the logged-in name when there is one
            let author = match api.profile(&mut session).await? {
                Some(user) => user.display_name().to_string(),
                None => "Anonymous".to_string(),
            };
            let review = NewReview {
                rating,
                comment,
                author,
            };
            let updated = api.add_review(&session, &mess_id, &review).await?;
            info!(
                "✅ Review added; {} now has {} reviews",
                updated.name,
                updated.reviews.len()
            );
        }
        Command::GoogleLogin { callback } => match callback {
            Some(url) => {
                let user = api.complete_external_auth(&mut session, &url).await?;
                info!("✅ Logged in as {} via Google", user.display_name());
            }
            None => {
                println!("Open this URL in your browser to sign in with Google:");
                println!("  {}", api.begin_external_auth());
                println!();
                println!("After the redirect, finish with:");
                println!("  messmate google-login --callback <redirect url>");
            }
        },
    }

    Ok(())
}

async fn run_list(api: &HttpApi, args: ListArgs) -> anyhow::Result<()> {
    info!("🍛 MessMate - fetching listings...");

    let mut store = ListingStore::new();
    store.replace_all(
        api.fetch_messes()
            .await
            .context("Failed to fetch mess listings")?,
    );

    let params = FilterParams {
        search: args.search,
        min_rating: args.min_rating,
        max_price: args.max_price,
        cuisine: args.cuisine,
        city: args.city,
        state: args.state,
        sort_by: args.sort,
    };
    let view = views::derive_view(store.messes(), &params);

    if !view.cities.is_empty() {
        info!("Cities: {}", view.cities.join(", "));
    }
    if !view.states.is_empty() {
        info!("States: {}", view.states.join(", "));
    }
    if !view.price_options.is_empty() {
        let menu: Vec<String> = view
            .price_options
            .iter()
            .map(|price| format!("under ₹{price}"))
            .collect();
        info!("Price buckets: {}", menu.join(", "));
    }

    info!(
        "\n✅ Showing {} of {} listings\n",
        view.messes.len(),
        store.len()
    );

    for (i, mess) in view.messes.iter().enumerate() {
        let rating = views::average_rating(mess);
        println!("{}. {} ({}, {})", i + 1, mess.name, mess.city, mess.state);
        println!("   {}", mess.address);
        match mess.monthly_price() {
            Some(price) => println!("   ₹{price}/month, rated {rating:.1}"),
            None => println!("   no monthly plan, rated {rating:.1}"),
        }
        println!("   {} | contact {}", mess.cuisine_type, mess.contact);
        if !mess.reviews.is_empty() {
            println!("   {} reviews", mess.reviews.len());
        }
        println!("   id: {}", mess.id);
        println!();
    }

    if view.messes.is_empty() {
        println!("No messes found matching your criteria.");
    }

    if let Some(path) = args.save {
        let json = serde_json::to_string_pretty(&view.messes)?;
        tokio::fs::write(&path, json)
            .await
            .context("Failed to write listings file")?;
        info!("💾 Saved {} listings to {}", view.messes.len(), path.display());
    }

    Ok(())
}
