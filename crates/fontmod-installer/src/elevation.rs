use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{anyhow, Context, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    None,
    SuCommand,
    SuUid,
}

impl Elevation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SuCommand => "su -c",
            Self::SuUid => "su 0",
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, Self::None)
    }

    fn read_command(&self, path: &Path) -> Option<Command> {
        match self {
            Self::None => None,
            Self::SuCommand => {
                let mut command = Command::new("su");
                command.arg("-c").arg(format!("cat {}", shell_quote(path)));
                Some(command)
            }
            Self::SuUid => {
                let mut command = Command::new("su");
                command.arg("0").arg("cat").arg(path);
                Some(command)
            }
        }
    }

    fn probe_command(&self, path: &Path) -> Option<Command> {
        match self {
            Self::None => None,
            Self::SuCommand => Some(build_su_command_probe(path)),
            Self::SuUid => Some(build_su_uid_probe(path)),
        }
    }
}

pub fn detect_elevation(probe_dir: &Path) -> Elevation {
    detect_elevation_with_runner(probe_dir, |command| {
        run_command(command, "helper probe failed")
    })
}

pub fn detect_elevation_with_runner(
    probe_dir: &Path,
    mut runner: impl FnMut(&mut Command) -> Result<()>,
) -> Elevation {
    if runner(&mut build_su_command_probe(probe_dir)).is_ok() {
        return Elevation::SuCommand;
    }
    if runner(&mut build_su_uid_probe(probe_dir)).is_ok() {
        return Elevation::SuUid;
    }
    Elevation::None
}

pub(crate) fn build_su_command_probe(probe_dir: &Path) -> Command {
    let mut command = Command::new("su");
    command
        .arg("-c")
        .arg(format!("ls {}", shell_quote(probe_dir)));
    command
}

pub(crate) fn build_su_uid_probe(probe_dir: &Path) -> Command {
    let mut command = Command::new("su");
    command.arg("0").arg("ls").arg(probe_dir);
    command
}

pub fn read_source(path: &Path, elevation: Elevation) -> Result<Vec<u8>> {
    read_source_with_reader(path, elevation, |command| {
        run_command_capture(command, "privileged read failed")
    })
}

pub(crate) fn read_source_with_reader(
    path: &Path,
    elevation: Elevation,
    mut reader: impl FnMut(&mut Command) -> Result<Vec<u8>>,
) -> Result<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(direct_err) => match elevation.read_command(path) {
            Some(mut command) => reader(&mut command).with_context(|| {
                format!(
                    "failed to read source file {} (direct read: {direct_err})",
                    path.display()
                )
            }),
            None => Err(direct_err)
                .with_context(|| format!("failed to read source file: {}", path.display())),
        },
    }
}

pub fn source_exists(path: &Path, elevation: Elevation) -> bool {
    source_exists_with_runner(path, elevation, |command| {
        run_command(command, "helper probe failed")
    })
}

pub(crate) fn source_exists_with_runner(
    path: &Path,
    elevation: Elevation,
    mut runner: impl FnMut(&mut Command) -> Result<()>,
) -> bool {
    if path.exists() {
        return true;
    }
    match elevation.probe_command(path) {
        Some(mut command) => runner(&mut command).is_ok(),
        None => false,
    }
}

fn shell_quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "'\\''"))
}

pub(crate) fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(anyhow!(
        "{context_message}: status={} stderr='{}'",
        output.status,
        stderr.trim()
    ))
}

pub(crate) fn run_command_capture(command: &mut Command, context_message: &str) -> Result<Vec<u8>> {
    let output = command
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "{context_message}: status={} stderr='{}'",
            output.status,
            stderr.trim()
        ));
    }
    Ok(output.stdout)
}
