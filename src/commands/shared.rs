//! # Shared Command Utilities
//!
//! Argument validation, parsing, and the dispatch macro used by every command handler.

use serde::{Deserialize, Serialize};

use crate::{cli_utils, http_utils};

/// Parses a record identifier, exiting with a usage error if it is not a positive integer.
pub fn parse_id_or_exit(id_str: &str, label: &str, usage: &str) -> i64 {
    match id_str.trim().parse::<i64>() {
        Ok(id) if id > 0 => id,
        _ => cli_utils::exit_with_usage_error(
            &format!("Invalid {} ID '{}': expected a positive integer", label, id_str),
            usage,
        ),
    }
}

/// Validates both minimum and maximum argument counts.
///
/// # Arguments
/// * `args` - The command arguments array
/// * `min_count` - The minimum number of arguments required (including subcommand)
/// * `max_count` - The maximum number of arguments allowed (including subcommand)
/// * `command` - The command name for error message
/// * `usage` - The usage string to display
pub fn validate_args_count_or_exit(
    args: &[String],
    min_count: usize,
    max_count: usize,
    command: &str,
    usage: &str,
) {
    if args.len() < min_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command requires more arguments", command),
            usage,
        );
    }
    if args.len() > max_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command has too many arguments", command),
            usage,
        );
    }
}

/// Macro to generate command dispatcher boilerplate.
macro_rules! dispatch_command {
    ($command_name:expr, $usage:expr, $args:expr, $client:expr, $resource:expr, {
        $($subcommand:expr => $handler:expr),* $(,)?
    }) => {
        if $args.is_empty() {
            crate::cli_utils::exit_with_usage_error(
                &format!("{} command requires a subcommand", $command_name),
                $usage,
            );
        }

        match $args[0].as_str() {
            $(
                $subcommand => $handler($args, $client, $resource, $usage).await,
            )*
            _ => {
                let available_subcommands = vec![$($subcommand),*];
                crate::cli_utils::exit_with_usage_error(
                    &format!(
                        "Unknown {} subcommand '{}'. Available subcommands: {}",
                        $command_name,
                        $args[0],
                        available_subcommands.join(", ")
                    ),
                    $usage,
                );
            }
        }
    };
}

pub(crate) use dispatch_command;

/// HTTP operation helper utilities to reduce duplicate request patterns.
pub struct HttpOperations;

impl HttpOperations {
    /// Generic POST operation with error handling.
    pub async fn post<Req, Resp>(
        client: &http_utils::GardenClient,
        path: &str,
        request: &Req,
        context: &str,
    ) -> Resp
    where
        Req: Serialize,
        Resp: for<'de> Deserialize<'de>,
    {
        http_utils::execute_or_exit(
            || client.post::<Req, Resp>(path, request),
            &format!("Failed to {}", context),
        )
        .await
    }

    /// Generic POST operation without a request body.
    pub async fn post_empty<Resp>(
        client: &http_utils::GardenClient,
        path: &str,
        context: &str,
    ) -> Resp
    where
        Resp: for<'de> Deserialize<'de>,
    {
        http_utils::execute_or_exit(
            || client.post_empty::<Resp>(path),
            &format!("Failed to {}", context),
        )
        .await
    }

    /// Generic GET operation with error handling.
    pub async fn get<Resp>(client: &http_utils::GardenClient, path: &str, context: &str) -> Resp
    where
        Resp: for<'de> Deserialize<'de>,
    {
        http_utils::execute_or_exit(
            || client.get::<Resp>(path),
            &format!("Failed to {}", context),
        )
        .await
    }

    /// Generic PUT operation with error handling.
    pub async fn put<Req, Resp>(
        client: &http_utils::GardenClient,
        path: &str,
        request: &Req,
        context: &str,
    ) -> Resp
    where
        Req: Serialize,
        Resp: for<'de> Deserialize<'de>,
    {
        http_utils::execute_or_exit(
            || client.put::<Req, Resp>(path, request),
            &format!("Failed to {}", context),
        )
        .await
    }

    /// Generic DELETE operation with error handling.
    pub async fn delete(client: &http_utils::GardenClient, path: &str, context: &str) {
        http_utils::execute_or_exit(|| client.delete(path), &format!("Failed to {}", context))
            .await;
    }

    /// DELETE operation whose response body is returned.
    pub async fn delete_with_body<Resp>(
        client: &http_utils::GardenClient,
        path: &str,
        context: &str,
    ) -> Resp
    where
        Resp: for<'de> Deserialize<'de>,
    {
        http_utils::execute_or_exit(
            || client.delete_with_body::<Resp>(path),
            &format!("Failed to {}", context),
        )
        .await
    }
}
