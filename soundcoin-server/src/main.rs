use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use soundcoin_server::{run_server, Args};

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env().add_directive("soundcoin=info".parse()?);
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real environment variables still apply.
    dotenv::dotenv().ok();
    init_tracing()?;
    let args = Args::parse();
    info!("SoundCoin starting. addr={}, ad_interval={}", args.server_addr, args.ad_interval);

    if let Err(e) = run_server(args).await {
        error!("Server error: {:?}", e);
        return Err(e.into());
    }
    info!("Main finished. Goodbye!");
    Ok(())
}
