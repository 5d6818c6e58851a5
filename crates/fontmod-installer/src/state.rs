use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use sha2::{Digest, Sha256};

use crate::elevation::Elevation;
use crate::layout::InstallLayout;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub source: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupHealth {
    Ok,
    Modified,
    Unrecorded,
}

impl BackupHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Modified => "modified",
            Self::Unrecorded => "unrecorded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupStatus {
    pub source: String,
    pub health: BackupHealth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    Ready { recorded_api: Option<u32> },
    ApiMismatchWithoutHelper { recorded_api: u32, current_api: u32 },
    MissingProvenance,
}

pub fn read_api_marker(layout: &InstallLayout) -> Result<Option<u32>> {
    let path = layout.api_marker_path();
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read api level marker: {}", path.display()))?;
    let level = raw
        .trim()
        .parse::<u32>()
        .with_context(|| format!("invalid api level marker: {}", path.display()))?;
    Ok(Some(level))
}

pub fn write_api_marker(layout: &InstallLayout, api_level: u32) -> Result<()> {
    let path = layout.api_marker_path();
    fs::write(&path, format!("{api_level}\n"))
        .with_context(|| format!("failed to write api level marker: {}", path.display()))
}

pub fn check_compatibility(
    layout: &InstallLayout,
    elevation: Elevation,
    api_level: u32,
    prior_output: &Path,
) -> Result<Compatibility> {
    let recorded_api = read_api_marker(layout)?;

    if !elevation.is_available() {
        if let Some(recorded) = recorded_api {
            if recorded != api_level {
                return Ok(Compatibility::ApiMismatchWithoutHelper {
                    recorded_api: recorded,
                    current_api: api_level,
                });
            }
        }
    }

    if !layout.backup_store_exists() && prior_output.exists() {
        return Ok(Compatibility::MissingProvenance);
    }

    Ok(Compatibility::Ready { recorded_api })
}

pub fn prepare_backup_store(layout: &InstallLayout, api_level: u32) -> Result<()> {
    layout.ensure_backup_root()?;
    write_api_marker(layout, api_level)
}

pub fn read_backup_ledger(layout: &InstallLayout) -> Result<Vec<BackupRecord>> {
    let path = layout.ledger_path();
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read backup ledger: {}", path.display()))?;
    parse_backup_ledger(&raw)
        .with_context(|| format!("failed to parse backup ledger: {}", path.display()))
}

pub(crate) fn parse_backup_ledger(raw: &str) -> Result<Vec<BackupRecord>> {
    let mut records = Vec::new();
    for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((key, value)) = line.split_once('=') else {
            return Err(anyhow!("invalid backup ledger row: {line}"));
        };
        if key != "backup" {
            continue;
        }
        let Some((source, sha256)) = value.split_once('\t') else {
            return Err(anyhow!("invalid backup ledger row: {line}"));
        };
        if source.trim().is_empty() || sha256.trim().is_empty() {
            return Err(anyhow!("backup ledger row fields must not be empty"));
        }
        records.push(BackupRecord {
            source: source.to_string(),
            sha256: sha256.to_string(),
        });
    }
    Ok(records)
}

pub fn append_backup_record(layout: &InstallLayout, record: &BackupRecord) -> Result<()> {
    let path = layout.ledger_path();
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open backup ledger: {}", path.display()))?;
    file.write_all(format!("backup={}\t{}\n", record.source, record.sha256).as_bytes())
        .with_context(|| format!("failed to append backup ledger: {}", path.display()))
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn verify_backups(layout: &InstallLayout) -> Result<Vec<BackupStatus>> {
    let records = read_backup_ledger(layout)?;
    let mut statuses = Vec::new();
    for entry in layout.backup_entries()? {
        let rel = entry
            .strip_prefix(layout.backup_root())
            .context("backup entry outside the backup store")?;
        let source = format!("/{}", rel.display());
        let bytes = fs::read(&entry)
            .with_context(|| format!("failed to read backup copy: {}", entry.display()))?;
        let digest = sha256_hex(&bytes);
        let health = match records.iter().find(|record| record.source == source) {
            None => BackupHealth::Unrecorded,
            Some(record) if record.sha256 == digest => BackupHealth::Ok,
            Some(_) => BackupHealth::Modified,
        };
        statuses.push(BackupStatus { source, health });
    }
    statuses.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(statuses)
}
