use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use tokio::net::TcpListener;
use tokio::signal;

use garden::create_router;
use garden::config::{ConfigOverrides, ServerConfig};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "PostgreSQL connection URL (falls back to DATABASE_URL)")]
    database_url: Option<String>,
    #[arrrg(optional, "Host to bind the HTTP server")]
    host: Option<String>,
    #[arrrg(optional, "Port to bind the HTTP server")]
    port: Option<String>,
    #[arrrg(optional, "Maximum number of pooled database connections")]
    max_connections: Option<String>,
    #[arrrg(flag, "Enable verbose logging")]
    verbose: bool,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            database_url: args.database_url,
            host: args.host,
            port: args.port,
            max_connections: args.max_connections,
            verbose: args.verbose,
        }
    }
}

const HELP_TEXT: &str = r#"gardend - Garden records daemon

USAGE:
    gardend [OPTIONS]

OPTIONS:
    --database-url <URL>       PostgreSQL connection URL [env: DATABASE_URL]
    --host <HOST>              Host to bind the HTTP server [env: GARDEN_HOST] [default: 127.0.0.1]
    --port <PORT>              Port to bind the HTTP server [env: GARDEN_PORT] [default: 8080]
    --max-connections <N>      Maximum pooled database connections [default: 5]
    --verbose                  Enable debug logging (GARDEN_LOG overrides)

DESCRIPTION:
    Serves garden locations, irrigation zones, plants, observations and
    measurements as JSON under /api/v1/. Run garden-migrate-up first.

    The server supports graceful shutdown via Ctrl+C.

API ENDPOINTS:
    Irrigation Zones:
      GET    /api/v1/irrigation_zones                           List all zones
      POST   /api/v1/irrigation_zones                           Create a zone
      GET    /api/v1/irrigation_zones/{id}                      Get a zone
      PUT    /api/v1/irrigation_zones/{id}                      Update a zone
      DELETE /api/v1/irrigation_zones/{id}                      Delete a zone
      GET    /api/v1/irrigation_zones/{id}/garden_locations     Locations watered by a zone
      GET    /api/v1/irrigation_zones/{id}/water_usage          Gallons per watering
      POST   /api/v1/irrigation_zones/{id}/scheduled_days/{day} Add a scheduled day
      DELETE /api/v1/irrigation_zones/{id}/scheduled_days/{day} Remove a scheduled day

    Garden Locations:
      GET    /api/v1/garden_locations                        List all locations
      POST   /api/v1/garden_locations                        Create a location
      GET    /api/v1/garden_locations/{id}                   Get a location
      PUT    /api/v1/garden_locations/{id}                   Update a location
      DELETE /api/v1/garden_locations/{id}                   Delete a location
      GET    /api/v1/garden_locations/{id}/plants            Plants at a location
      GET    /api/v1/garden_locations/{id}/measurements      Measurements at a location

    Plants:
      GET    /api/v1/plants                         List all plants
      POST   /api/v1/plants                         Create a plant
      GET    /api/v1/plants/{id}                    Get a plant
      PUT    /api/v1/plants/{id}                    Update a plant
      DELETE /api/v1/plants/{id}                    Delete a plant
      GET    /api/v1/plants/{id}/observations       Observations of a plant

    Observations and Measurements:
      GET    /api/v1/observations                   List all observations
      POST   /api/v1/observations                   Create an observation
      GET    /api/v1/observations/{id}              Get an observation
      PUT    /api/v1/observations/{id}              Update an observation
      DELETE /api/v1/observations/{id}              Delete an observation
      GET    /api/v1/measurements                   List all measurements
      POST   /api/v1/measurements                   Create a measurement
      GET    /api/v1/measurements/{id}              Get a measurement
      PUT    /api/v1/measurements/{id}              Update a measurement
      DELETE /api/v1/measurements/{id}              Delete a measurement

    Health:
      GET    /health                                Liveness probe"#;

fn init_tracing(filter: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {}", e))?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    println!();
    println!("🛑 Shutdown signal received, stopping server gracefully...");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line("USAGE: gardend [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }

    let config = ServerConfig::from_env(args.into())?;
    init_tracing(&config.log_filter)?;

    let pool = config
        .connect()
        .await
        .map_err(|e| format!("Failed to connect to database: {}", e))?;
    tracing::debug!(max_connections = config.max_connections, "connected to database");

    let app = create_router(pool);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("🚀 Garden daemon started successfully!");
    println!("📡 Server listening on: http://{}", addr);
    println!("💡 Use Ctrl+C for graceful shutdown");
    println!();
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("👋 Garden daemon stopped");
    Ok(())
}
