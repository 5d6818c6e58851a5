use std::path::Path;

use anyhow::{anyhow, Result};
use fontmod_core::FontProfile;
use fontmod_installer::{
    check_compatibility, detect_elevation, discover_targets, migrate_target, prepare_backup_store,
    read_api_marker, restore_backups, run_customization_pass, verify_backups, BackupStatus,
    Compatibility, Elevation, InstallLayout, MigratedFile, TargetStatus, MIN_API_LEVEL,
};

use crate::render::{
    current_output_style, print_abort, render_status_line, start_progress, OutputStyle,
};
use crate::{InstallArgs, RestoreArgs, StatusArgs};

const HELPER_PROBE_SOURCE: &str = "/system/etc";

pub fn run_install(args: &InstallArgs) -> Result<()> {
    let style = current_output_style();

    if args.api_level < MIN_API_LEVEL {
        return Err(abort(style, &format_api_gate_abort_lines(args.api_level)));
    }

    let profile = load_profile(args.profile.as_deref())?;
    let layout = InstallLayout::new(&args.system_root, &args.module_root, &args.backup_root);
    let elevation = detect_elevation(&layout.source_path(HELPER_PROBE_SOURCE));
    println!(
        "{}",
        render_status_line(
            style,
            "step",
            &format!("privileged helper: {}", elevation.as_str())
        )
    );

    let prior_output = args.installed_root.join("system");
    match check_compatibility(&layout, elevation, args.api_level, &prior_output)? {
        Compatibility::Ready { recorded_api } => {
            if let Some(recorded) = recorded_api {
                println!(
                    "{}",
                    render_status_line(style, "step", &format!("recorded api level: {recorded}"))
                );
            }
        }
        Compatibility::ApiMismatchWithoutHelper {
            recorded_api,
            current_api,
        } => {
            return Err(abort(
                style,
                &format_api_mismatch_abort_lines(recorded_api, current_api),
            ));
        }
        Compatibility::MissingProvenance => {
            return Err(abort(style, &format_missing_provenance_abort_lines()));
        }
    }

    let targets = discover_targets(&layout, elevation);
    if args.dry_run {
        for line in format_dry_run_lines(&targets) {
            println!("{}", render_status_line(style, "step", &line));
        }
        return Ok(());
    }

    prepare_backup_store(&layout, args.api_level)?;

    let mut migrated: Vec<MigratedFile> = Vec::new();
    let mut skipped = 0usize;
    let mut progress = start_progress(style, "migrate", targets.len() as u64);
    for (position, target) in targets.iter().enumerate() {
        if target.present {
            if let Some(file) = migrate_target(&layout, &profile, elevation, &target.source)? {
                migrated.push(file);
            }
        } else {
            skipped += 1;
        }
        progress.set(position as u64 + 1);
    }
    progress.finish();

    for file in &migrated {
        println!(
            "{}",
            render_status_line(style, "ok", &format_migrated_line(file))
        );
    }
    if skipped > 0 {
        println!(
            "{}",
            render_status_line(style, "step", &format!("skipped {skipped} absent targets"))
        );
    }

    match run_customization_pass(&layout, &profile, elevation)? {
        Some(file) => println!(
            "{}",
            render_status_line(style, "ok", &format_migrated_line(&file))
        ),
        None => println!(
            "{}",
            render_status_line(style, "step", "customization: nothing to rewrite")
        ),
    }

    println!(
        "{}",
        render_status_line(
            style,
            "ok",
            &format_install_summary_line(migrated.len(), args.api_level)
        )
    );
    Ok(())
}

pub fn run_restore(args: &RestoreArgs) -> Result<()> {
    let style = current_output_style();
    let layout = InstallLayout::new(&args.system_root, &args.module_root, &args.backup_root);

    let restored = restore_backups(&layout)?;
    if restored.is_empty() {
        println!(
            "{}",
            render_status_line(style, "step", "no backups to restore")
        );
        return Ok(());
    }
    for file in &restored {
        println!(
            "{}",
            render_status_line(style, "ok", &format!("restored {}", file.source))
        );
    }
    println!(
        "{}",
        render_status_line(
            style,
            "ok",
            &format!("restore summary: files={}", restored.len())
        )
    );
    Ok(())
}

pub fn run_status(args: &StatusArgs) -> Result<()> {
    let layout = InstallLayout::new(&args.system_root, &args.module_root, &args.backup_root);
    let recorded_api = read_api_marker(&layout)?;
    let elevation = detect_elevation(&layout.source_path(HELPER_PROBE_SOURCE));
    let backups = verify_backups(&layout)?;
    let module_output_present = args.module_root.join("system").is_dir();

    if args.json {
        let payload = serde_json::json!({
            "backup_root": layout.backup_root().display().to_string(),
            "recorded_api_level": recorded_api,
            "privileged_helper": elevation.as_str(),
            "module_output_present": module_output_present,
            "backups": backups
                .iter()
                .map(|status| {
                    serde_json::json!({
                        "source": status.source,
                        "health": status.health.as_str(),
                    })
                })
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let style = current_output_style();
    for line in format_status_lines(recorded_api, elevation, module_output_present, &backups) {
        println!("{}", render_status_line(style, "step", &line));
    }
    Ok(())
}

fn load_profile(path: Option<&Path>) -> Result<FontProfile> {
    match path {
        Some(path) => FontProfile::load(path),
        None => Ok(FontProfile::default()),
    }
}

fn abort(style: OutputStyle, lines: &[String]) -> anyhow::Error {
    print_abort(style, lines);
    anyhow!("installation aborted")
}

pub(crate) fn format_api_gate_abort_lines(api_level: u32) -> Vec<String> {
    vec![
        format!("Unsupported OS version: api level {api_level}."),
        format!("This module requires api level {MIN_API_LEVEL} (Android 12) or newer."),
    ]
}

pub(crate) fn format_api_mismatch_abort_lines(recorded: u32, current: u32) -> Vec<String> {
    vec![
        format!("OS updated since the last install (api {recorded} -> {current})."),
        "No privileged helper is available to refresh the backups.".to_string(),
        "Uninstall the module, reboot, then install it again.".to_string(),
    ]
}

pub(crate) fn format_missing_provenance_abort_lines() -> Vec<String> {
    vec![
        "A previous install exists but its backup store is missing.".to_string(),
        "Uninstall the module, reboot, then install it again.".to_string(),
    ]
}

pub(crate) fn format_migrated_line(file: &MigratedFile) -> String {
    let note = if file.newly_backed_up {
        "backed up + installed"
    } else {
        "installed from backup"
    };
    format!("{}: {note}", file.source)
}

pub(crate) fn format_install_summary_line(migrated: usize, api_level: u32) -> String {
    format!("install summary: migrated={migrated} api_level={api_level}")
}

pub(crate) fn format_dry_run_lines(targets: &[TargetStatus]) -> Vec<String> {
    targets
        .iter()
        .map(|target| {
            let verdict = if target.present {
                "would migrate"
            } else {
                "absent"
            };
            format!("{}: {verdict}", target.source)
        })
        .collect()
}

pub(crate) fn format_status_lines(
    recorded_api: Option<u32>,
    elevation: Elevation,
    module_output_present: bool,
    backups: &[BackupStatus],
) -> Vec<String> {
    let mut lines = vec![
        match recorded_api {
            Some(level) => format!("recorded api level: {level}"),
            None => "recorded api level: none".to_string(),
        },
        format!("privileged helper: {}", elevation.as_str()),
        format!(
            "module output present: {}",
            if module_output_present { "yes" } else { "no" }
        ),
    ];
    if backups.is_empty() {
        lines.push("backups: none".to_string());
    }
    for status in backups {
        lines.push(format!("backup {}: {}", status.source, status.health.as_str()));
    }
    lines
}
