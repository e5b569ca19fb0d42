//! Script discovery.

use super::Stage;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::report::ReportBuilder;
use crate::script::{Script, Tag};
use crate::sink::{EventSink, PipelineEvent};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Discovers scripts below the configured scan path.
///
/// Directory entries are visited in file-name order and hidden entries
/// (leading `.`) are ignored.
pub struct Scanner<'a> {
    config: &'a PipelineConfig,
    sink: &'a dyn EventSink,
}

impl<'a> Scanner<'a> {
    /// Create a scanner.
    pub fn new(config: &'a PipelineConfig, sink: &'a dyn EventSink) -> Self {
        Self { config, sink }
    }

    /// Scan for scripts, recording each one in the report.
    pub fn scan(&self, report: &mut ReportBuilder) -> Result<Vec<Script>> {
        self.sink.record(PipelineEvent::StageStarted { stage: Stage::Scan });

        let root = &self.config.scan_path;
        let mut files = Vec::new();
        collect_files(root, &mut files)?;

        let mut scripts = Vec::with_capacity(files.len());
        for file in files {
            let script = self.load(root, &file)?;
            report.add_scanned_script(script.clone());
            scripts.push(script);
        }

        self.sink.record(PipelineEvent::StageCompleted {
            stage: Stage::Scan,
            kept: scripts.len(),
            skipped: 0,
        });
        Ok(scripts)
    }

    fn load(&self, root: &Path, file: &Path) -> Result<Script> {
        let content = fs::read_to_string(file).map_err(|source| Error::Io {
            path: file.to_path_buf(),
            source,
        })?;
        let relative = file.strip_prefix(root).unwrap_or(file).to_path_buf();
        let tags = self.tags_for(&relative);

        Ok(Script::new(relative, content, &self.config.identifier_pattern)?.with_tags(tags))
    }

    fn tags_for(&self, relative: &Path) -> BTreeSet<Tag> {
        let mut tags: BTreeSet<Tag> = self
            .config
            .tag_matchers
            .iter()
            .filter(|matcher| matcher.matches_path(relative))
            .map(|matcher| matcher.tag().clone())
            .collect();

        if self.config.create_tags_from_folder {
            if let Some(parent) = relative.parent() {
                tags.extend(
                    parent
                        .components()
                        .map(|c| Tag::new(c.as_os_str().to_string_lossy())),
                );
            }
        }
        tags
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let io_error = |source| Error::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_error)?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(io_error)?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        // Follows symlinks, so linked directories are walked like real ones.
        let metadata = fs::metadata(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        if metadata.is_dir() {
            collect_files(&path, files)?;
        } else if metadata.is_file() {
            files.push(path);
        }
    }
    Ok(())
}
