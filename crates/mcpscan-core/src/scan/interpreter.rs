//! Composition interpreter: first server entry to [`RuntimeInfo`].

use serde_json::{Map, Value};

use super::ScanError;
use super::error::{ANALYSIS_EXCEPTION_PREFIX, EMPTY_COMPOSITION, MISSING_SERVERS_KEY, NO_SERVERS};
use crate::domain::{McpComposition, RuntimeInfo, ServerSpec, ServerType};

/// Classify the first declared server of a composition.
///
/// Only the first entry of `mcpServers` (in declaration order) is examined.
pub fn interpret(composition: &McpComposition) -> Result<RuntimeInfo, ScanError> {
    let value = composition.value();

    if is_falsy(value) {
        return Err(ScanError::new(EMPTY_COMPOSITION));
    }

    let Some(servers) = value.as_object().and_then(|root| root.get("mcpServers")) else {
        return Err(ScanError::new(MISSING_SERVERS_KEY).with_json_config(composition.to_pretty_json()));
    };

    if servers.as_object().is_some_and(Map::is_empty) {
        return Err(ScanError::new(NO_SERVERS).with_json_config(composition.to_pretty_json()));
    }

    let (server, spec) = first_server(servers).map_err(|message| {
        ScanError::new(format!("{ANALYSIS_EXCEPTION_PREFIX}{message}"))
            .with_json_config(composition.to_pretty_json())
    })?;

    Ok(RuntimeInfo {
        server,
        server_type: ServerType::classify(&spec.command),
        command: spec.command,
        args: spec.args,
    })
}

/// Validate and extract the first entry of a non-empty `mcpServers` value.
pub fn first_server(servers: &Value) -> Result<(String, ServerSpec), String> {
    let servers = servers
        .as_object()
        .ok_or_else(|| format!("'mcpServers' must be an object, found {}", kind(servers)))?;
    let (name, entry) = servers
        .iter()
        .next()
        .ok_or_else(|| "'mcpServers' has no entries".to_string())?;

    let entry = entry
        .as_object()
        .ok_or_else(|| format!("server '{name}' must be an object, found {}", kind(entry)))?;

    let command = match entry.get("command") {
        None => String::new(),
        Some(Value::String(command)) => command.clone(),
        Some(other) => {
            return Err(format!(
                "'command' of server '{name}' must be a string, found {}",
                kind(other)
            ));
        }
    };

    let args = match entry.get("args") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| render_arg(item).ok_or_else(|| {
                format!("'args' of server '{name}' contains a non-scalar {}", kind(item))
            }))
            .collect::<Result<Vec<_>, _>>()?,
        Some(other) => {
            return Err(format!(
                "'args' of server '{name}' must be an array, found {}",
                kind(other)
            ));
        }
    };

    let env = entry
        .get("env")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Ok((name.clone(), ServerSpec { command, args, env }))
}

fn render_arg(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) | Value::Null => Some(item.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
