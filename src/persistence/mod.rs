use crate::error::BotError;
use crate::models::{Summary, TradeRecord};
use crate::Result;
use anyhow::Context;
use serde_json::Deserializer;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Flat-file trade log: a single JSON array, rewritten on every append.
///
/// Execution is single-threaded, so there is no locking; crash-safety of
/// the read-modify-write is acknowledged as weak.
#[derive(Debug, Clone)]
pub struct TradeLogStore {
    path: PathBuf,
}

impl TradeLogStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Create the log file with an empty array if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.path.exists() {
            fs::write(&self.path, "[]")
                .with_context(|| format!("Failed to create {}", self.path.display()))
                .map_err(BotError::storage)?;
        }
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<TradeRecord>> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
            .map_err(BotError::storage)?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Corrupt trade log {}", self.path.display()))
            .map_err(BotError::storage)
    }

    pub fn append(&self, record: &TradeRecord) -> Result<()> {
        self.ensure_exists()?;
        let mut trades = self.read_all()?;
        trades.push(record.clone());

        let json = serde_json::to_string_pretty(&trades)
            .context("Failed to serialize trade log")
            .map_err(BotError::storage)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))
            .map_err(BotError::storage)?;

        tracing::info!(
            profit_loss = record.profit_loss,
            trade_type = %record.trade_type,
            "Logged trade"
        );
        Ok(())
    }

    /// Reset the log to an empty array (after a summary rollover).
    pub fn reset(&self) -> Result<()> {
        fs::write(&self.path, "[]")
            .with_context(|| format!("Failed to reset {}", self.path.display()))
            .map_err(BotError::storage)
    }
}

/// Append-only summary archive.
///
/// The file holds concatenated pretty-printed JSON objects separated by
/// blank lines, not a single JSON document. The format is kept for
/// compatibility with archives written by earlier versions of the bot;
/// `read_all` parses each record independently.
#[derive(Debug, Clone)]
pub struct SummaryArchive {
    path: PathBuf,
}

impl SummaryArchive {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn append(&self, summary: &Summary) -> Result<()> {
        let json = serde_json::to_string_pretty(summary)
            .context("Failed to serialize summary")
            .map_err(BotError::storage)?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))
            .map_err(BotError::storage)?;

        file.write_all(json.as_bytes())
            .and_then(|_| file.write_all(b"\n\n"))
            .with_context(|| format!("Failed to append to {}", self.path.display()))
            .map_err(BotError::storage)?;

        tracing::info!(
            total_profit_loss = summary.total_profit_loss,
            trade_count = summary.trade_count,
            "Archived summary"
        );
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<Summary>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))
            .map_err(BotError::storage)?;

        Deserializer::from_str(&contents)
            .into_iter::<Summary>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("Corrupt summary archive {}", self.path.display()))
            .map_err(BotError::storage)
    }
}
