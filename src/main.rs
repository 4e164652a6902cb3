mod action;
mod app;
mod async_docs;
mod cli;
mod components;
mod config;
mod display_map;
mod event;
mod git;
mod state;
mod sync;
mod theme;
mod tui;
mod watch;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::app::App;
use crate::cli::{repo_relative, Cli, Command};
use crate::config::VdiffConfig;
use crate::git::{Executor, GitCli, Revision};
use crate::sync::DiffTarget;

/// Log to `~/.config/vdiff/vdiff.log` while the TUI owns the terminal,
/// to stderr otherwise. `VDIFF_LOG` takes an `EnvFilter` directive.
fn init_tracing(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_env("VDIFF_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    if to_file {
        let dir = config::config_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = dir.join("vdiff.log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .with(filter)
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .try_init()?;
    }
    Ok(())
}

/// Resolve the repository root from `start` and build the git layer on it.
async fn open_repo(config: &VdiffConfig, start: PathBuf) -> Result<GitCli> {
    let probe = GitCli::new(Executor::new(config.git_binary.clone(), &start));
    let root = probe.toplevel().await.map_err(|e| {
        anyhow::anyhow!(
            "{}: not a git repository ({e})\nRun this command from inside a git working tree.",
            start.display()
        )
    })?;
    let exec = Executor::new(config.git_binary.clone(), &PathBuf::from(root))
        .with_timeout(config.command_timeout);
    Ok(GitCli::new(exec).with_upstream(&config.remote, &config.branch))
}

async fn run_command(git: &GitCli, command: Command) -> Result<String> {
    let out = match command {
        Command::View { .. } => String::new(),
        Command::Add { path, update } => git.add(&path, update).await.map(|()| String::new())?,
        Command::Commit { message } => git.commit(&message).await.map(|()| String::new())?,
        Command::Diff { path, cached } => git.diff(&path, cached).await?,
        Command::Files { cached } => {
            let files = git.diff_files(cached).await?;
            files.iter().map(|f| format!("{f}\n")).collect()
        }
        Command::Pull => git.pull().await.map(|()| String::new())?,
        Command::Push => git.push().await.map(|()| String::new())?,
        Command::Restore { path, staged } => {
            git.restore(&path, staged).await.map(|()| String::new())?
        }
        Command::Show { path, rev } => {
            let revision = Revision::parse(rev.as_deref().unwrap_or_default());
            git.show(&revision, &path).await?
        }
        Command::Stage { path } => {
            let mut data = String::new();
            tokio::io::stdin()
                .read_to_string(&mut data)
                .await
                .context("failed to read stdin")?;
            git.stage(&path, &data).await.map(|()| String::new())?
        }
        Command::Record { path, message } => git
            .record_entry(&path, &message)
            .await
            .map(|()| String::new())?,
    };
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install().ok();

    let cli = Cli::parse();
    let tui_mode = cli.command.is_view();
    init_tracing(tui_mode)?;

    let mut config = config::load_config();
    if let Some(git) = cli.git {
        config.git_binary = git;
    }
    if let Some(secs) = cli.timeout {
        config.command_timeout = (secs > 0).then(|| Duration::from_secs(secs));
    }

    let cwd = std::env::current_dir()?;
    let start = cli.dir.map(|dir| cwd.join(dir)).unwrap_or(cwd);
    let git = match open_repo(&config, start.clone()).await {
        Ok(git) => git,
        Err(e) => {
            eprintln!("vdiff: {e:#}");
            std::process::exit(1);
        }
    };
    let root = git.executor().workdir().to_path_buf();
    let command = cli
        .command
        .map_paths(|p| repo_relative(&root, &start, p));

    if let Command::View { path, cached } = command {
        let mut app = App::new(git, DiffTarget::new(path, cached), &config);

        let mut terminal = tui::init()?;
        let result = app.run(&mut terminal).await;
        tui::restore()?;

        if let Err(ref e) = result {
            eprintln!("vdiff: {e:#}");
        }
        return result;
    }

    match run_command(&git, command).await {
        Ok(out) => {
            print!("{out}");
            Ok(())
        }
        Err(e) => {
            eprintln!("{e:#}");
            std::process::exit(1);
        }
    }
}
