use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod flows;
mod render;

use flows::{run_install, run_restore, run_status};

#[derive(Parser, Debug)]
#[command(name = "fontmod")]
#[command(about = "CJK variable font configuration installer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Install(InstallArgs),
    Restore(RestoreArgs),
    Status(StatusArgs),
    Completions { shell: Shell },
    Version,
}

#[derive(Args, Debug)]
struct InstallArgs {
    #[arg(long, env = "API")]
    api_level: u32,
    #[arg(long, env = "MODPATH")]
    module_root: PathBuf,
    #[arg(long, default_value = "/")]
    system_root: PathBuf,
    #[arg(long, default_value = "/data/adb/fontmod/backup")]
    backup_root: PathBuf,
    #[arg(long, default_value = "/data/adb/modules/fontmod")]
    installed_root: PathBuf,
    #[arg(long)]
    profile: Option<PathBuf>,
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct RestoreArgs {
    #[arg(long, env = "MODPATH", default_value = "/data/adb/modules/fontmod")]
    module_root: PathBuf,
    #[arg(long, default_value = "/")]
    system_root: PathBuf,
    #[arg(long, default_value = "/data/adb/fontmod/backup")]
    backup_root: PathBuf,
}

#[derive(Args, Debug)]
struct StatusArgs {
    #[arg(long, env = "MODPATH", default_value = "/data/adb/modules/fontmod")]
    module_root: PathBuf,
    #[arg(long, default_value = "/")]
    system_root: PathBuf,
    #[arg(long, default_value = "/data/adb/fontmod/backup")]
    backup_root: PathBuf,
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Install(args) => run_install(&args),
        Commands::Restore(args) => run_restore(&args),
        Commands::Status(args) => run_status(&args),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "fontmod", &mut std::io::stdout());
            Ok(())
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
