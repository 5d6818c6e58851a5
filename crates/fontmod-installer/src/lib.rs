mod elevation;
mod fs_utils;
mod layout;
mod migrate;
mod state;

pub use elevation::{
    detect_elevation, detect_elevation_with_runner, read_source, source_exists, Elevation,
};
pub use layout::{
    InstallLayout, API_MARKER_FILE, BACKUP_LEDGER_FILE, CUSTOMIZATION_SOURCE, TARGET_DIRS,
    TARGET_FILE_NAMES,
};
pub use migrate::{
    discover_targets, migrate_target, restore_backups, run_customization_pass, MigratedFile,
    RestoredFile, TargetStatus,
};
pub use state::{
    append_backup_record, check_compatibility, prepare_backup_store, read_api_marker,
    read_backup_ledger, verify_backups, write_api_marker, BackupHealth, BackupRecord,
    BackupStatus, Compatibility,
};

pub const MIN_API_LEVEL: u32 = 31;
