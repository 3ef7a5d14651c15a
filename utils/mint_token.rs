use clap::Parser;
use uuid::Uuid;

use entry_kit::middleware::auth::issue_token;

/// Issue a bearer token for the session API.
#[derive(Parser)]
#[command(name = "mint_token", version)]
struct Args {
    /// User id to embed as the token subject (random when omitted)
    #[arg(long)]
    user_id: Option<Uuid>,

    /// Token lifetime in minutes
    #[arg(long, default_value_t = 60)]
    ttl_minutes: u64,

    /// Signing secret; defaults to JWT_SECRET
    #[arg(long)]
    secret: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let secret = match args.secret {
        Some(secret) => secret,
        None => std::env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set or --secret given")?,
    };

    let user_id = args.user_id.unwrap_or_else(Uuid::new_v4);
    let token = issue_token(&secret, user_id, args.ttl_minutes * 60)?;

    eprintln!("user_id: {user_id}");
    println!("{token}");
    Ok(())
}
