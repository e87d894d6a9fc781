//! Patch command implementation.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::Value;

use roster_core::{FieldEdit, PatchRequest, Reply};
use roster_live::LiveClient;

use crate::output;

#[derive(Args, Debug)]
pub struct PatchArgs {
    /// Collection name (e.g., students)
    pub collection: String,

    /// Record id
    pub id: String,

    /// Field edit as field=value; repeatable. Values are read as JSON when
    /// they parse, otherwise as plain strings.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_edit)]
    pub edits: Vec<FieldEdit>,

    /// Server URL
    #[arg(long, env = "ROSTER_URL", default_value = "ws://127.0.0.1:3000")]
    pub url: String,

    /// Session token
    #[arg(long, env = "ROSTER_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Name recorded in the server's audit log
    #[arg(long)]
    pub from: Option<String>,

    /// Seconds to wait for the reply
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

fn parse_edit(s: &str) -> std::result::Result<FieldEdit, String> {
    let (field, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got '{}'", s))?;
    if field.is_empty() {
        return Err("field name is empty".to_string());
    }

    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok(FieldEdit::new(field, value))
}

pub async fn run(args: PatchArgs) -> Result<()> {
    let request = PatchRequest {
        origin: args.from,
        session_token: args.token,
        target_collection: args.collection,
        target_id: args.id,
        field_edits: args.edits,
    };

    let mut client = LiveClient::connect(&args.url)
        .await
        .with_context(|| format!("Failed to connect to {}", args.url))?
        .with_reply_timeout(Duration::from_secs(args.timeout));

    let reply = client.send(&request).await.context("Patch failed")?;
    if let Err(e) = client.close().await {
        tracing::debug!(error = %e, "Close handshake failed");
    }

    output::json_pretty(&reply)?;

    match &reply {
        Reply::Failed(e) => {
            output::error(&format!(
                "{}: {}",
                e.error,
                e.details.as_deref().unwrap_or("no details")
            ));
            bail!("Server rejected the patch");
        }
        Reply::Patched(result) if !result.record_found => {
            bail!("No record {} in {}", result.target_id, result.target_class);
        }
        Reply::Patched(result) => {
            output::outcomes(&result.outcomes);
            let rejected = result.outcomes.len() - result.applied_count();
            if rejected > 0 {
                output::error(&format!("{} of {} edits rejected", rejected, result.outcomes.len()));
            } else {
                output::success(&format!("{} edits applied", result.applied_count()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_edit_values() {
        assert_eq!(parse_edit("max=30").unwrap().value, json!(30));
        assert_eq!(parse_edit("name=Anna").unwrap().value, json!("Anna"));
        assert_eq!(parse_edit("name=\"42\"").unwrap().value, json!("42"));
        assert_eq!(parse_edit("classroom=null").unwrap().value, Value::Null);
        assert_eq!(parse_edit("formal=a=b").unwrap().value, json!("a=b"));
        assert_eq!(parse_edit("packs=[1,2]").unwrap().value, json!([1, 2]));
    }

    #[test]
    fn test_parse_edit_rejects_bad_input() {
        assert!(parse_edit("nameAnna").is_err());
        assert!(parse_edit("=x").is_err());
    }
}
