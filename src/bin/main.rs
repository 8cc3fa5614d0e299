use anyhow::Result;
use clap::{Parser, Subcommand};
use directory_auth::{
    DEFAULT_TOKEN_TTL_HOURS, DatabaseConfig, ServiceConfig, SigningSecret, build_state,
    create_router,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "directory-auth")]
#[command(about = "User directory with token authentication and role-based access")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server
    Server {
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: String,
        #[arg(short, long, env = "PORT", default_value = "9999")]
        port: u16,
        /// HMAC secret used to sign bearer tokens
        #[arg(long, env = "SECRET", hide_env_values = true)]
        secret: String,
        #[arg(long, env = "DATABASE_URL", default_value = "memory")]
        db_url: String,
        /// Bootstrap password for the moderator account
        #[arg(long, env = "MODERATOR_PASS", hide_env_values = true)]
        moderator_password: String,
        #[arg(long, env = "TOKEN_TTL_HOURS", default_value_t = DEFAULT_TOKEN_TTL_HOURS)]
        token_ttl_hours: i64,
    },
    /// Initialize the database and seed the moderator
    Init {
        #[arg(long, env = "DATABASE_URL", default_value = "memory")]
        db_url: String,
        #[arg(long, env = "MODERATOR_PASS", hide_env_values = true)]
        moderator_password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("directory_auth=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Server {
            host,
            port,
            secret,
            db_url,
            moderator_password,
            token_ttl_hours,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for REST server: {}", db_config.url);

            let config = ServiceConfig::new(
                &host,
                port,
                db_config,
                SigningSecret::new(secret),
                moderator_password,
            )
            .with_token_ttl_hours(token_ttl_hours);

            let state = build_state(&config).await?;
            let app = create_router(state);

            let listener = tokio::net::TcpListener::bind(&config.bind).await?;
            info!("Server listening on http://{}", config.bind);

            axum::serve(listener, app).await?;
        }
        Commands::Init {
            db_url,
            moderator_password,
        } => {
            let db_config = DatabaseConfig {
                url: db_url,
                ..Default::default()
            };
            info!("Using database url for initialization: {}", db_config.url);

            // The signing secret is not used during initialization.
            let config = ServiceConfig::new(
                "127.0.0.1",
                0,
                db_config,
                SigningSecret::new("init"),
                moderator_password,
            );

            info!("Initializing database...");
            build_state(&config).await?;
            info!("Database initialized successfully");
        }
    }

    Ok(())
}
