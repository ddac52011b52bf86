use std::process;

use serde_json::Value;

/// Exits the program with an error message
pub fn exit_with_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Exits the program with an error message and usage information
pub fn exit_with_usage_error(message: &str, usage: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("{}", usage);
    process::exit(1);
}

/// Prints formatted JSON with proper indentation
pub fn print_json<T>(value: &T) -> Result<(), serde_json::Error>
where
    T: serde::Serialize,
{
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Prints a formatted JSON value or exits with error
pub fn print_json_or_exit<T>(value: &T, context: &str)
where
    T: serde::Serialize,
{
    if let Err(e) = print_json(value) {
        exit_with_error(&format!("Failed to format {} JSON: {}", context, e));
    }
}

/// Parses a JSON object given on the command line or exits with error
pub fn parse_json_object_or_exit(raw: &str, usage: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => exit_with_usage_error("expected a JSON object", usage),
        Err(e) => exit_with_usage_error(&format!("invalid JSON: {}", e), usage),
    }
}

/// Unwraps the `{"data": ...}` envelope of an API response
pub fn data(response: Value) -> Value {
    match response {
        Value::Object(mut fields) => fields.remove("data").unwrap_or(Value::Null),
        other => other,
    }
}
