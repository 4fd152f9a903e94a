//! Loading forms, catalogs and captured images from disk

use crate::error::{InstallError, InstallResult};
use crate::models::{content_type_for, CapturedImage, CompletionForm, MediaKind};
use crate::resolver::Catalogs;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

fn read_json<T: DeserializeOwned>(path: &Path) -> InstallResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| InstallError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| InstallError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_form(path: &Path) -> InstallResult<CompletionForm> {
    read_json(path)
}

pub fn load_catalogs(path: &Path) -> InstallResult<Catalogs> {
    read_json(path)
}

/// Parse a `<kind>=<path>` command-line argument
pub fn parse_media_arg(arg: &str) -> InstallResult<(MediaKind, PathBuf)> {
    let (kind, path) = arg
        .split_once('=')
        .ok_or_else(|| InstallError::MediaArg(arg.to_string()))?;
    let kind: MediaKind = kind
        .trim()
        .parse()
        .map_err(|_| InstallError::MediaArg(arg.to_string()))?;
    let path = path.trim();
    if path.is_empty() {
        return Err(InstallError::MediaArg(arg.to_string()));
    }
    Ok((kind, PathBuf::from(path)))
}

/// Read a captured image file
pub fn read_capture(path: &Path) -> InstallResult<CapturedImage> {
    let bytes = std::fs::read(path).map_err(|source| InstallError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string());
    let content_type = content_type_for(&file_name);
    Ok(CapturedImage::new(file_name, content_type, bytes))
}
