use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fontmod_core::{
    has_customization_marker, rewrite_customizations, transform_fonts_config, FontProfile,
};

use crate::elevation::{read_source, source_exists, Elevation};
use crate::layout::{InstallLayout, CUSTOMIZATION_SOURCE};
use crate::state::{append_backup_record, sha256_hex, BackupRecord};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatus {
    pub source: String,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigratedFile {
    pub source: String,
    pub output: PathBuf,
    pub newly_backed_up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredFile {
    pub source: String,
    pub output: PathBuf,
}

pub fn discover_targets(layout: &InstallLayout, elevation: Elevation) -> Vec<TargetStatus> {
    InstallLayout::target_sources()
        .into_iter()
        .map(|source| {
            let present = source_exists(&layout.source_path(&source), elevation);
            TargetStatus { source, present }
        })
        .collect()
}

pub fn migrate_target(
    layout: &InstallLayout,
    profile: &FontProfile,
    elevation: Elevation,
    source: &str,
) -> Result<Option<MigratedFile>> {
    let source_path = layout.source_path(source);
    if !source_exists(&source_path, elevation) {
        return Ok(None);
    }

    let newly_backed_up = ensure_backup(layout, elevation, source)?;

    // The transformer always starts from the pristine backup copy, never
    // from a previously transformed output.
    let backup_path = layout.backup_path(source);
    let content = fs::read_to_string(&backup_path)
        .with_context(|| format!("failed to read backup copy: {}", backup_path.display()))?;
    let transformed = transform_fonts_config(&content, profile)
        .with_context(|| format!("failed to transform {source}"))?;

    let output_path = layout.output_path(source);
    write_output(&output_path, transformed.as_bytes())?;

    Ok(Some(MigratedFile {
        source: source.to_string(),
        output: output_path,
        newly_backed_up,
    }))
}

pub fn run_customization_pass(
    layout: &InstallLayout,
    profile: &FontProfile,
    elevation: Elevation,
) -> Result<Option<MigratedFile>> {
    let source = CUSTOMIZATION_SOURCE;
    let source_path = layout.source_path(source);
    if !source_exists(&source_path, elevation) {
        return Ok(None);
    }

    let backup_path = layout.backup_path(source);
    let raw = if backup_path.exists() {
        fs::read(&backup_path)
            .with_context(|| format!("failed to read backup copy: {}", backup_path.display()))?
    } else {
        read_source(&source_path, elevation)?
    };
    let content = String::from_utf8(raw)
        .with_context(|| format!("customization file is not utf-8: {source}"))?;

    // The vendor marker gate runs before any backup or copy.
    if !has_customization_marker(&content, profile) {
        return Ok(None);
    }

    let newly_backed_up = if backup_path.exists() {
        false
    } else {
        write_backup(layout, source, content.as_bytes())?;
        true
    };

    let rewritten = rewrite_customizations(&content, profile)
        .with_context(|| format!("failed to rewrite {source}"))?;
    let output_path = layout.output_path(source);
    write_output(&output_path, rewritten.as_bytes())?;

    Ok(Some(MigratedFile {
        source: source.to_string(),
        output: output_path,
        newly_backed_up,
    }))
}

pub fn restore_backups(layout: &InstallLayout) -> Result<Vec<RestoredFile>> {
    let mut restored = Vec::new();
    for entry in layout.backup_entries()? {
        let rel = entry
            .strip_prefix(layout.backup_root())
            .context("backup entry outside the backup store")?;
        let source = format!("/{}", rel.display());
        let output = layout.output_path(&source);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory: {}", parent.display())
            })?;
        }
        fs::copy(&entry, &output)
            .with_context(|| format!("failed to restore backup: {}", entry.display()))?;
        restored.push(RestoredFile { source, output });
    }
    restored.sort_by(|a, b| a.source.cmp(&b.source));
    Ok(restored)
}

fn ensure_backup(layout: &InstallLayout, elevation: Elevation, source: &str) -> Result<bool> {
    let backup_path = layout.backup_path(source);
    if backup_path.exists() {
        return Ok(false);
    }
    let bytes = read_source(&layout.source_path(source), elevation)?;
    write_backup(layout, source, &bytes)?;
    Ok(true)
}

fn write_backup(layout: &InstallLayout, source: &str, bytes: &[u8]) -> Result<()> {
    let backup_path = layout.backup_path(source);
    if let Some(parent) = backup_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create backup directory: {}", parent.display()))?;
    }
    fs::write(&backup_path, bytes)
        .with_context(|| format!("failed to write backup copy: {}", backup_path.display()))?;
    append_backup_record(
        layout,
        &BackupRecord {
            source: source.to_string(),
            sha256: sha256_hex(bytes),
        },
    )
}

fn write_output(output_path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }
    fs::write(output_path, bytes)
        .with_context(|| format!("failed to write module output: {}", output_path.display()))
}
