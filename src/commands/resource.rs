use serde_json::Value;

use crate::cli_utils;
use crate::commands::Resource;
use crate::commands::shared::{
    HttpOperations, dispatch_command, parse_id_or_exit, validate_args_count_or_exit,
};
use crate::http_utils::GardenClient;

const LOCATION_USAGE: &str = "Usage: gardenctl location <list|get|create|update|delete|plants|measurements> [args...]
  list                      List every garden location
  get <id>                  Show one garden location
  create <json>             Create a garden location from a JSON object
  update <id> <json>        Update fields of a garden location
  delete <id>               Delete a garden location
  plants <id>               List the plants at a garden location
  measurements <id>         List the measurements taken at a garden location";

const PLANT_USAGE: &str = "Usage: gardenctl plant <list|get|create|update|delete|observations> [args...]
  list                      List every plant
  get <id>                  Show one plant
  create <json>             Create a plant from a JSON object
  update <id> <json>        Update fields of a plant
  delete <id>               Delete a plant
  observations <id>         List the observations of a plant";

const OBSERVATION_USAGE: &str = "Usage: gardenctl observation <list|get|create|update|delete> [args...]
  list                      List every observation
  get <id>                  Show one observation
  create <json>             Create an observation from a JSON object
  update <id> <json>        Update fields of an observation
  delete <id>               Delete an observation";

const MEASUREMENT_USAGE: &str = "Usage: gardenctl measurement <list|get|create|update|delete> [args...]
  list                      List every measurement
  get <id>                  Show one measurement
  create <json>             Create a measurement from a JSON object
  update <id> <json>        Update fields of a measurement
  delete <id>               Delete a measurement";

pub async fn handle_location_command(args: &[String], client: &GardenClient) {
    dispatch_command!("location", LOCATION_USAGE, args, client, Resource::GardenLocation, {
        "list" => handle_list,
        "get" => handle_get,
        "create" => handle_create,
        "update" => handle_update,
        "delete" => handle_delete,
        "plants" => handle_children,
        "measurements" => handle_children,
    });
}

pub async fn handle_plant_command(args: &[String], client: &GardenClient) {
    dispatch_command!("plant", PLANT_USAGE, args, client, Resource::Plant, {
        "list" => handle_list,
        "get" => handle_get,
        "create" => handle_create,
        "update" => handle_update,
        "delete" => handle_delete,
        "observations" => handle_children,
    });
}

pub async fn handle_observation_command(args: &[String], client: &GardenClient) {
    dispatch_command!("observation", OBSERVATION_USAGE, args, client, Resource::Observation, {
        "list" => handle_list,
        "get" => handle_get,
        "create" => handle_create,
        "update" => handle_update,
        "delete" => handle_delete,
    });
}

pub async fn handle_measurement_command(args: &[String], client: &GardenClient) {
    dispatch_command!("measurement", MEASUREMENT_USAGE, args, client, Resource::Measurement, {
        "list" => handle_list,
        "get" => handle_get,
        "create" => handle_create,
        "update" => handle_update,
        "delete" => handle_delete,
    });
}

pub(crate) async fn handle_list(
    args: &[String],
    client: &GardenClient,
    resource: Resource,
    usage: &str,
) {
    validate_args_count_or_exit(args, 1, 1, "list", usage);

    let response: Value = HttpOperations::get(
        client,
        &resource.collection_url(),
        &format!("list {}s", resource.label()),
    )
    .await;
    let records = cli_utils::data(response);

    if records.as_array().is_some_and(|records| records.is_empty()) {
        println!("No {}s found", resource.label());
    } else {
        cli_utils::print_json_or_exit(&records, resource.label());
    }
}

pub(crate) async fn handle_get(
    args: &[String],
    client: &GardenClient,
    resource: Resource,
    usage: &str,
) {
    validate_args_count_or_exit(args, 2, 2, "get", usage);
    let id = parse_id_or_exit(&args[1], resource.label(), usage);

    let response: Value = HttpOperations::get(
        client,
        &resource.item_url(id),
        &format!("get {}", resource.label()),
    )
    .await;
    cli_utils::print_json_or_exit(&cli_utils::data(response), resource.label());
}

pub(crate) async fn handle_create(
    args: &[String],
    client: &GardenClient,
    resource: Resource,
    usage: &str,
) {
    validate_args_count_or_exit(args, 2, 2, "create", usage);
    let body = cli_utils::parse_json_object_or_exit(&args[1], usage);

    let response: Value = HttpOperations::post(
        client,
        &resource.collection_url(),
        &body,
        &format!("create {}", resource.label()),
    )
    .await;
    let record = cli_utils::data(response);
    if let Some(id) = record.get("id").and_then(Value::as_i64) {
        println!("Created {} {}", resource.label(), id);
    }
    cli_utils::print_json_or_exit(&record, resource.label());
}

pub(crate) async fn handle_update(
    args: &[String],
    client: &GardenClient,
    resource: Resource,
    usage: &str,
) {
    validate_args_count_or_exit(args, 3, 3, "update", usage);
    let id = parse_id_or_exit(&args[1], resource.label(), usage);
    let body = cli_utils::parse_json_object_or_exit(&args[2], usage);

    let response: Value = HttpOperations::put(
        client,
        &resource.item_url(id),
        &body,
        &format!("update {}", resource.label()),
    )
    .await;
    cli_utils::print_json_or_exit(&cli_utils::data(response), resource.label());
}

pub(crate) async fn handle_delete(
    args: &[String],
    client: &GardenClient,
    resource: Resource,
    usage: &str,
) {
    validate_args_count_or_exit(args, 2, 2, "delete", usage);
    let id = parse_id_or_exit(&args[1], resource.label(), usage);

    HttpOperations::delete(
        client,
        &resource.item_url(id),
        &format!("delete {}", resource.label()),
    )
    .await;
    println!("Deleted {} {}", resource.label(), id);
}

/// Lists a nested collection; the subcommand name selects which one.
pub(crate) async fn handle_children(
    args: &[String],
    client: &GardenClient,
    resource: Resource,
    usage: &str,
) {
    validate_args_count_or_exit(args, 2, 2, &args[0], usage);
    let Some(child) = resource.child_path(&args[0]) else {
        cli_utils::exit_with_usage_error(
            &format!("{} has no '{}' listing", resource.label(), args[0]),
            usage,
        );
    };
    let id = parse_id_or_exit(&args[1], resource.label(), usage);

    let response: Value = HttpOperations::get(
        client,
        &format!("{}/{}", resource.item_url(id), child),
        &format!("list {} of {} {}", child, resource.label(), id),
    )
    .await;
    cli_utils::print_json_or_exit(&cli_utils::data(response), child);
}
