//! Flat-file export of a finished plan.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::markdown::to_markdown;
use crate::models::WeeklyPlan;

/// Default file stem for exported plans.
pub const DEFAULT_STEM: &str = "meal_plan";

/// Errors from writing or reading exported plan files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize plan: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("{path} is not a valid plan file: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Paths written by [`export_plan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExportError> {
    fs::write(path, contents).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the plan as pretty-printed UTF-8 JSON.
pub fn write_json(path: &Path, plan: &WeeklyPlan) -> Result<(), ExportError> {
    let mut json = serde_json::to_string_pretty(plan).map_err(ExportError::Serialize)?;
    json.push('\n');
    write_file(path, &json)?;
    info!(path = %path.display(), "plan written as JSON");
    Ok(())
}

/// Write the plan as Markdown.
pub fn write_markdown(path: &Path, plan: &WeeklyPlan) -> Result<(), ExportError> {
    write_file(path, &to_markdown(plan))?;
    info!(path = %path.display(), "plan written as Markdown");
    Ok(())
}

fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `<stem>.json` into `dir`, creating it if needed.
pub fn export_json(dir: &Path, stem: &str, plan: &WeeklyPlan) -> Result<PathBuf, ExportError> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{stem}.json"));
    write_json(&path, plan)?;
    Ok(path)
}

/// Write `<stem>.json` and `<stem>.md` into `dir`, creating it if needed.
pub fn export_plan(dir: &Path, stem: &str, plan: &WeeklyPlan) -> Result<ExportPaths, ExportError> {
    let json = export_json(dir, stem, plan)?;
    let markdown = dir.join(format!("{stem}.md"));
    write_markdown(&markdown, plan)?;
    Ok(ExportPaths { json, markdown })
}

/// Read a plan previously written by [`write_json`].
pub fn load_plan(path: &Path) -> Result<WeeklyPlan, ExportError> {
    let contents = fs::read_to_string(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ExportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_plan(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ExportError::Read { .. }));
    }

    #[test]
    fn load_garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"week_plan\": 3}").unwrap();
        let err = load_plan(&path).unwrap_err();
        assert!(matches!(err, ExportError::Parse { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn export_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("out").join("week1");
        let plan = WeeklyPlan {
            week_plan: vec![],
            summary: "empty".to_string(),
        };
        let paths = export_plan(&nested, DEFAULT_STEM, &plan).unwrap();
        assert_eq!(paths.json, nested.join("meal_plan.json"));
        assert!(paths.markdown.exists());
    }
}
