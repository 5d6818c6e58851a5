use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::fs_utils::collect_files;

pub const TARGET_FILE_NAMES: [&str; 3] = ["fonts.xml", "fonts_base.xml", "font_fallback.xml"];
pub const TARGET_DIRS: [&str; 2] = ["/system/etc", "/system_ext/etc"];
pub const CUSTOMIZATION_SOURCE: &str = "/product/etc/fonts_customization.xml";

pub const API_MARKER_FILE: &str = "api_level";
pub const BACKUP_LEDGER_FILE: &str = "backups.state";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    system_root: PathBuf,
    module_root: PathBuf,
    backup_root: PathBuf,
}

impl InstallLayout {
    pub fn new(
        system_root: impl Into<PathBuf>,
        module_root: impl Into<PathBuf>,
        backup_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            system_root: system_root.into(),
            module_root: module_root.into(),
            backup_root: backup_root.into(),
        }
    }

    pub fn system_root(&self) -> &Path {
        &self.system_root
    }

    pub fn module_root(&self) -> &Path {
        &self.module_root
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    pub fn target_sources() -> Vec<String> {
        TARGET_DIRS
            .iter()
            .flat_map(|dir| {
                TARGET_FILE_NAMES
                    .iter()
                    .map(move |name| format!("{dir}/{name}"))
            })
            .collect()
    }

    // Files already under /system/ keep their subpath in the module tree;
    // other partitions are grafted below system/.
    pub fn canonical_subpath(source: &str) -> PathBuf {
        let trimmed = source.trim_start_matches('/');
        if source.starts_with("/system/") {
            PathBuf::from(trimmed)
        } else {
            Path::new("system").join(trimmed)
        }
    }

    pub fn source_path(&self, source: &str) -> PathBuf {
        self.system_root.join(source.trim_start_matches('/'))
    }

    pub fn backup_path(&self, source: &str) -> PathBuf {
        self.backup_root.join(source.trim_start_matches('/'))
    }

    pub fn output_path(&self, source: &str) -> PathBuf {
        self.module_root.join(Self::canonical_subpath(source))
    }

    pub fn api_marker_path(&self) -> PathBuf {
        self.backup_root.join(API_MARKER_FILE)
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.backup_root.join(BACKUP_LEDGER_FILE)
    }

    pub fn backup_store_exists(&self) -> bool {
        self.backup_root.is_dir()
    }

    pub fn ensure_backup_root(&self) -> Result<()> {
        fs::create_dir_all(&self.backup_root)
            .with_context(|| format!("failed to create backup store: {}", self.backup_root.display()))
    }

    pub fn backup_entries(&self) -> Result<Vec<PathBuf>> {
        if !self.backup_store_exists() {
            return Ok(Vec::new());
        }
        let files = collect_files(&self.backup_root)
            .with_context(|| format!("failed to scan backup store: {}", self.backup_root.display()))?;
        let marker = self.api_marker_path();
        let ledger = self.ledger_path();
        Ok(files
            .into_iter()
            .filter(|path| *path != marker && *path != ledger)
            .collect())
    }
}
