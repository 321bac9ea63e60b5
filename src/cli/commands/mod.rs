//! CLI command implementations
//!
//! Each command is implemented in its own submodule.

pub mod pack;
pub mod status;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::core::command::{CommandId, GeneratePackageCommand};
use crate::core::properties::SettingsPackageProperty;
use crate::core::settings::Settings;
use crate::core::target::{CommandTarget, NodeKind, ProjectNode};
use crate::infra::dirs::PackgateDirs;
use crate::infra::process_manager::ProcessBuildManager;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show whether generate-package is available for a selection
    Status(SelectionArgs),

    /// Build the project and generate its package
    Pack(SelectionArgs),
}

impl Commands {
    /// Execute the command
    pub async fn run(self) -> Result<()> {
        match self {
            Self::Status(args) => status::execute(&args),
            Self::Pack(args) => pack::execute(&args).await,
        }
    }
}

/// Menu the command is invoked from
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuArg {
    /// Project node context menu
    ContextMenu,
    /// Top-level build menu
    TopLevel,
}

impl From<MenuArg> for CommandId {
    fn from(menu: MenuArg) -> Self {
        match menu {
            MenuArg::ContextMenu => Self::ProjectContextMenu,
            MenuArg::TopLevel => Self::TopLevelBuild,
        }
    }
}

/// Project and node selection shared by all commands
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Project directory (defaults to the current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Menu the command is invoked from
    #[arg(long, value_enum, default_value = "context-menu")]
    pub command: MenuArg,

    /// Selected nodes (defaults to the project itself)
    pub paths: Vec<PathBuf>,
}

impl SelectionArgs {
    /// Canonical project directory
    pub fn project_dir(&self) -> Result<PathBuf> {
        let dir = match &self.project {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        fs::canonicalize(&dir)
            .with_context(|| format!("Project directory not found: {}", dir.display()))
    }

    /// The selected nodes as a command target
    ///
    /// The project directory itself is the project root node; any other
    /// directory is a folder and anything else a file.
    pub fn target(&self, project_dir: &Path) -> Result<CommandTarget> {
        if self.paths.is_empty() {
            return Ok(CommandTarget::project(project_dir));
        }

        let nodes = self
            .paths
            .iter()
            .map(|path| {
                let path = fs::canonicalize(path)
                    .with_context(|| format!("Selected path not found: {}", path.display()))?;
                Ok(node_for(project_dir, path))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CommandTarget::new(nodes))
    }
}

fn node_for(project_dir: &Path, path: PathBuf) -> ProjectNode {
    if path == project_dir {
        return ProjectNode::project_root(path);
    }
    let kind = if path.is_dir() {
        NodeKind::Folder
    } else {
        NodeKind::File
    };
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    ProjectNode::new(name, path, kind)
}

/// A generate-package command wired to a process-backed build manager
pub struct CommandSession {
    pub command: GeneratePackageCommand,
    pub manager: Arc<ProcessBuildManager>,
}

impl CommandSession {
    /// Load settings for `project_dir` and create the command
    pub fn open(project_dir: &Path, id: CommandId) -> Result<Self> {
        let dirs = PackgateDirs::new();
        let settings = Settings::load(&dirs, project_dir).context("Failed to load settings")?;

        let property = Arc::new(SettingsPackageProperty::new(dirs));
        let manager = Arc::new(
            ProcessBuildManager::new(&settings, property.clone())
                .context("Build manager unavailable")?,
        );
        let command = GeneratePackageCommand::new(id, manager.clone(), property)
            .context("Failed to register generate-package command")?;

        Ok(Self { command, manager })
    }
}
