//! Basket lifecycle commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use emmsa_core::load_store_config;
use emmsa_pantry::{basket_name, PantryClient};

/// Sub-commands available under `basket`.
#[derive(Debug, Subcommand)]
pub enum BasketCommands {
    /// List all baskets in the pantry
    List,
    /// Print a basket's JSON contents
    Get { name: String },
    /// Report whether a basket exists
    Exists { name: String },
    /// Create an empty basket
    Create { name: String },
    /// Replace a basket's contents with JSON read from a file or stdin
    Update {
        name: String,
        /// JSON file to upload (reads stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a basket
    Delete { name: String },
    /// Print the basket name for a date without contacting Pantry
    Name {
        /// Date as YYYY-MM-DD (defaults to today in UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub(crate) async fn run_basket(command: BasketCommands) -> anyhow::Result<()> {
    match command {
        BasketCommands::Name { date } => {
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            println!("{}", basket_name(&date));
        }
        BasketCommands::List => {
            for name in store_client()?.list().await? {
                println!("{name}");
            }
        }
        BasketCommands::Get { name } => {
            let contents: serde_json::Value = store_client()?.get(&name).await?;
            println!("{}", serde_json::to_string_pretty(&contents)?);
        }
        BasketCommands::Exists { name } => {
            let exists = store_client()?.exists(&name).await?;
            println!("{exists}");
        }
        BasketCommands::Create { name } => {
            store_client()?.create(&name).await?;
            println!("created basket {name}");
        }
        BasketCommands::Update { name, file } => {
            // Validate the payload before any request goes out.
            let payload = read_payload(file.as_deref())?;
            store_client()?.update(&name, &payload).await?;
            println!("updated basket {name}");
        }
        BasketCommands::Delete { name } => {
            store_client()?.delete(&name).await?;
            println!("deleted basket {name}");
        }
    }
    Ok(())
}

fn store_client() -> anyhow::Result<PantryClient> {
    let config = load_store_config()?;
    PantryClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build Pantry client: {e}"))
}

fn read_payload(file: Option<&Path>) -> anyhow::Result<serde_json::Value> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| anyhow::anyhow!("failed to read stdin: {e}"))?;
            buf
        }
    };
    parse_payload(&raw)
}

fn parse_payload(raw: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("basket payload is not valid JSON: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_payload_accepts_json_object() {
        let value = parse_payload(r#"{"key": "test"}"#).unwrap();
        assert_eq!(value["key"], "test");
    }

    #[test]
    fn parse_payload_rejects_invalid_json() {
        let err = parse_payload("{not json").unwrap_err();
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn read_payload_reports_missing_file() {
        let err = read_payload(Some(Path::new("/nonexistent/payload.json"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
