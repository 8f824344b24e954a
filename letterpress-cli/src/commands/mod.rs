//! Subcommand implementations

mod preview;
mod send;
mod serve;
mod templates;
mod transfer;

pub use preview::PreviewCommand;
pub use send::SendCommand;
pub use serve::ServeCommand;
pub use templates::TemplatesCommand;
pub use transfer::TransferCommand;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

/// Parse a JSON object argument; blank input is an empty object
fn parse_object(input: &str, what: &str) -> Result<Map<String, Value>> {
    if input.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(input).with_context(|| format!("{what} is not valid JSON"))? {
        Value::Object(map) => Ok(map),
        _ => bail!("{what} must be a JSON object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object() {
        assert!(parse_object("", "variables").unwrap().is_empty());
        assert_eq!(parse_object(r#"{"a": 1}"#, "variables").unwrap()["a"], 1);

        let err = parse_object("[1]", "variables").unwrap_err();
        assert_eq!(err.to_string(), "variables must be a JSON object");
        assert!(parse_object("{", "kwargs").is_err());
    }
}
