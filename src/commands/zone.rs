use serde_json::Value;

use crate::cli_utils;
use crate::commands::Resource;
use crate::commands::resource::{
    handle_children, handle_create, handle_delete, handle_get, handle_list, handle_update,
};
use crate::commands::shared::{
    HttpOperations, dispatch_command, parse_id_or_exit, validate_args_count_or_exit,
};
use crate::http_utils::GardenClient;
use crate::{Vocabulary, Weekday};

const ZONE_USAGE: &str = "Usage: gardenctl zone <list|get|create|update|delete|locations|water-usage|add-day|remove-day> [args...]
  list                      List every irrigation zone
  get <id>                  Show one irrigation zone
  create <json>             Create an irrigation zone from a JSON object
  update <id> <json>        Update fields of an irrigation zone
  delete <id>               Delete an irrigation zone
  locations <id>            List the garden locations watered by a zone
  water-usage <id>          Show the gallons a zone uses per watering
  add-day <id> <day>        Add a day (MONDAY, mon, or 1) to a zone's schedule
  remove-day <id> <day>     Remove a day from a zone's schedule";

pub async fn handle_zone_command(args: &[String], client: &GardenClient) {
    dispatch_command!("zone", ZONE_USAGE, args, client, Resource::IrrigationZone, {
        "list" => handle_list,
        "get" => handle_get,
        "create" => handle_create,
        "update" => handle_update,
        "delete" => handle_delete,
        "locations" => handle_children,
        "water-usage" => handle_water_usage,
        "add-day" => handle_add_day,
        "remove-day" => handle_remove_day,
    });
}

async fn handle_water_usage(args: &[String], client: &GardenClient, resource: Resource, usage: &str) {
    validate_args_count_or_exit(args, 2, 2, "water-usage", usage);
    let id = parse_id_or_exit(&args[1], resource.label(), usage);

    let response: Value = HttpOperations::get(
        client,
        &format!("{}/water_usage", resource.item_url(id)),
        "get water usage",
    )
    .await;
    let usage_data = cli_utils::data(response);
    match usage_data.get("gallons").and_then(Value::as_f64) {
        Some(gallons) => println!("{} gallons per watering", gallons),
        None => cli_utils::print_json_or_exit(&usage_data, "water usage"),
    }
}

async fn handle_add_day(args: &[String], client: &GardenClient, resource: Resource, usage: &str) {
    validate_args_count_or_exit(args, 3, 3, "add-day", usage);
    let id = parse_id_or_exit(&args[1], resource.label(), usage);
    let day = parse_day_or_exit(&args[2], usage);

    let response: Value = HttpOperations::post_empty(
        client,
        &format!("{}/scheduled_days/{}", resource.item_url(id), day.name()),
        "add scheduled day",
    )
    .await;
    cli_utils::print_json_or_exit(&cli_utils::data(response), resource.label());
}

async fn handle_remove_day(
    args: &[String],
    client: &GardenClient,
    resource: Resource,
    usage: &str,
) {
    validate_args_count_or_exit(args, 3, 3, "remove-day", usage);
    let id = parse_id_or_exit(&args[1], resource.label(), usage);
    let day = parse_day_or_exit(&args[2], usage);

    let response: Value = HttpOperations::delete_with_body(
        client,
        &format!("{}/scheduled_days/{}", resource.item_url(id), day.name()),
        "remove scheduled day",
    )
    .await;
    cli_utils::print_json_or_exit(&cli_utils::data(response), resource.label());
}

/// Resolves a weekday locally so typos fail before any request is made.
fn parse_day_or_exit(raw: &str, usage: &str) -> Weekday {
    Weekday::parse_token(raw)
        .unwrap_or_else(|e| cli_utils::exit_with_usage_error(&e.to_string(), usage))
}
