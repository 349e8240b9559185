//! Spinitron command-line client
//!
//! Prints results as JSON on stdout; logs go to stderr.
//!
//! ```text
//! spinitron --station wxyz api get-songs -p PlaylistID=1234
//! spinitron --station wxyz api get-current-playlist --cache 0
//! spinitron --station wxyz playlist -p num=10
//! ```

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use spinitron_core::{ApiMethod, PlaylistConfig, Result, SpinPapiConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "spinitron")]
#[command(about = "Query Spinitron playlist and show data", long_about = None)]
struct Cli {
    /// Station identifier
    #[arg(long, env = "SPINITRON_STATION")]
    station: String,

    /// Redis URL for a shared cache (e.g., redis://127.0.0.1/)
    #[arg(long, env = "SPINITRON_REDIS_URL")]
    redis_url: Option<String>,

    /// Base URL of the Spinitron host
    #[arg(long, env = "SPINITRON_BASE_URL", default_value = "https://spinitron.com")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RequestArgs {
    /// Request parameter, repeatable
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Cache TTL override in milliseconds (0 disables caching)
    #[arg(long, allow_negative_numbers = true)]
    cache: Option<i64>,
}

#[derive(Args)]
struct ApiAuth {
    /// API user name
    #[arg(long, env = "SPINITRON_USER")]
    user: String,

    /// API secret
    #[arg(long, env = "SPINITRON_SECRET", hide_env_values = true)]
    secret: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a SpinPapi method
    Api {
        #[arg(value_enum)]
        method: MethodArg,

        #[command(flatten)]
        auth: ApiAuth,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Call a SpinPapi method by its wire name
    Query {
        /// Remote method name (e.g., getSongs)
        method: String,

        #[command(flatten)]
        auth: ApiAuth,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Scrape the station playlist and enrich it with cover art
    Playlist {
        #[command(flatten)]
        request: RequestArgs,

        /// Per-lookup catalog timeout in seconds
        #[arg(long, default_value_t = 10)]
        lookup_timeout: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    GetSong,
    GetSongs,
    GetCurrentPlaylist,
    GetPlaylistInfo,
    GetPlaylistsInfo,
    GetShowInfo,
    GetRegularShowsInfo,
}

impl From<MethodArg> for ApiMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::GetSong => ApiMethod::GetSong,
            MethodArg::GetSongs => ApiMethod::GetSongs,
            MethodArg::GetCurrentPlaylist => ApiMethod::GetCurrentPlaylist,
            MethodArg::GetPlaylistInfo => ApiMethod::GetPlaylistInfo,
            MethodArg::GetPlaylistsInfo => ApiMethod::GetPlaylistsInfo,
            MethodArg::GetShowInfo => ApiMethod::GetShowInfo,
            MethodArg::GetRegularShowsInfo => ApiMethod::GetRegularShowsInfo,
        }
    }
}

fn api_config(cli: &Cli, auth: &ApiAuth) -> SpinPapiConfig {
    SpinPapiConfig {
        base_url: cli.base_url.clone(),
        ..SpinPapiConfig::new(cli.station.clone(), auth.user.clone(), auth.secret.clone())
    }
}

async fn run(cli: Cli) -> Result<serde_json::Value> {
    let store = commands::open_store(cli.redis_url.as_deref()).await?;

    match cli.command {
        Commands::Api {
            method,
            ref auth,
            ref request,
        } => {
            let params = commands::parse_params(&request.params, request.cache)?;
            let config = api_config(&cli, auth);
            commands::call_api(config, store, method.into(), params).await
        }
        Commands::Query {
            ref method,
            ref auth,
            ref request,
        } => {
            let params = commands::parse_params(&request.params, request.cache)?;
            let config = api_config(&cli, auth);
            commands::call_raw(config, store, method, params).await
        }
        Commands::Playlist {
            ref request,
            lookup_timeout,
        } => {
            let params = commands::parse_params(&request.params, request.cache)?;
            let config = PlaylistConfig {
                base_url: cli.base_url.clone(),
                lookup_timeout_secs: lookup_timeout,
                ..PlaylistConfig::new(cli.station.clone())
            };
            commands::scrape_playlist(config, store, params).await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "spinitron=info,spinitron_core=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(value) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "request failed");
            println!("{}", serde_json::json!({ "error": e }));
            ExitCode::FAILURE
        }
    }
}
