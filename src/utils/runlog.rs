//! Append-only run log.
//!
//! One plain text line per event: `[<local time>] <LEVEL> <message>`.
//! Written next to the generated artifacts so an operator can audit what a
//! run attempted, simulated, or failed on.

use crate::services::provider::Mutation;
use crate::Result;
use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Log line severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

/// Append-only log file for a single run.
pub struct RunLog {
    path: PathBuf,
    file: File,
}

impl RunLog {
    /// Open (or create) a log file in append mode.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.write(Level::Info, message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.write(Level::Warn, message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.write(Level::Error, message.as_ref());
    }

    /// Record a mutation that was skipped because of simulate mode.
    pub fn would_run(&mut self, mutation: &Mutation) {
        self.write(Level::Info, &format!("WhatIf: would run: {}", mutation));
    }

    /// Record a mutation that is about to be issued.
    pub fn running(&mut self, mutation: &Mutation) {
        self.write(Level::Info, &format!("Running: {}", mutation));
    }

    /// Record a failed command together with its text.
    pub fn command_failed(&mut self, command: impl std::fmt::Display, error: impl std::fmt::Display) {
        self.write(
            Level::Error,
            &format!("Command failed: {} | {}", command, error),
        );
    }

    fn write(&mut self, level: Level, message: &str) {
        let line = format!(
            "[{}] {} {}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            level.as_str(),
            message
        );

        if let Err(e) = self.file.write_all(line.as_bytes()) {
            tracing::error!("Failed to write run log {:?}: {}", self.path, e);
        }
    }
}
