use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use garden::{
    cli_utils,
    commands::{
        handle_location_command, handle_measurement_command, handle_observation_command,
        handle_plant_command, handle_zone_command,
    },
    http_utils,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the garden API server")]
    base_url: String,
}

const USAGE: &str = r#"Usage: gardenctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the garden API server (default: http://localhost:8080)

Commands:
  zone list                                    List all irrigation zones
  zone get <id>                                Get an irrigation zone
  zone create <json>                           Create an irrigation zone
  zone update <id> <json>                      Update fields of an irrigation zone
  zone delete <id>                             Delete an irrigation zone
  zone locations <id>                          List garden locations watered by a zone
  zone water-usage <id>                        Show gallons used per watering
  zone add-day <id> <day>                      Add a day to a zone's schedule
  zone remove-day <id> <day>                   Remove a day from a zone's schedule
  location list|get|create|update|delete       Manage garden locations
  location plants <id>                         List plants at a garden location
  location measurements <id>                   List measurements at a garden location
  plant list|get|create|update|delete          Manage plants
  plant observations <id>                      List observations of a plant
  observation list|get|create|update|delete    Manage observations
  measurement list|get|create|update|delete    Manage measurements

Example:
  gardenctl zone create '{"name": "Front beds", "scheduled_days": ["Mon", "Wed", "Fri"],
                          "start_time": "06:00", "duration_minutes": 30, "flow_rate_gpm": 2.5}'"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) =
        Options::from_command_line_relaxed("USAGE: gardenctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        options.base_url
    };

    let client = http_utils::GardenClient::new(base_url);

    match free[0].as_str() {
        "zone" => {
            handle_zone_command(&free[1..], &client).await;
        }
        "location" => {
            handle_location_command(&free[1..], &client).await;
        }
        "plant" => {
            handle_plant_command(&free[1..], &client).await;
        }
        "observation" => {
            handle_observation_command(&free[1..], &client).await;
        }
        "measurement" => {
            handle_measurement_command(&free[1..], &client).await;
        }
        "help" => {
            println!("{}", USAGE);
        }
        _ => {
            cli_utils::exit_with_error(&format!(
                "Unknown command '{}'. Available commands: zone, location, plant, observation, measurement",
                free[0]
            ));
        }
    }

    Ok(())
}
