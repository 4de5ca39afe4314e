extern crate serde;

#[macro_use]
extern crate serde_derive;

pub extern crate url;

mod loaders;
mod project_manifest;

pub use loaders::{FileSystemSourceLoader, ManifestSourceLoader, RemoteSourceLoader};
pub use project_manifest::{
    ContractConfig, ContractConfigFile, ProjectConfig, ProjectConfigFile, ProjectManifest,
    ProjectManifestFile,
};

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const MANIFEST_FILE_NAME: &str = "Deployer.toml";

/// Where a manifest or contract source lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileLocation {
    FileSystem { path: PathBuf },
    Url { url: Url },
}

impl FileLocation {
    /// Parses a contract location. Urls are taken as is; relative paths are
    /// joined to `project_root` and rejected when there is none.
    pub fn try_parse(location: &str, project_root: Option<&FileLocation>) -> Option<FileLocation> {
        if let Ok(parsed) = FileLocation::from_url_string(location) {
            return Some(parsed);
        }
        let path = PathBuf::from(location);
        if !path.is_relative() {
            return Some(FileLocation::from_path(path));
        }
        let mut resolved = project_root?.clone();
        resolved.append_path(location).ok()?;
        Some(resolved)
    }

    pub fn from_path(path: PathBuf) -> FileLocation {
        FileLocation::FileSystem { path }
    }

    /// `file://` urls become file system locations.
    pub fn from_url_string(url_string: &str) -> Result<FileLocation, String> {
        let url = Url::parse(url_string)
            .map_err(|e| format!("unable to parse {} as a url: {}", url_string, e))?;
        if url.scheme() != "file" {
            return Ok(FileLocation::Url { url });
        }
        url.to_file_path()
            .map(FileLocation::from_path)
            .map_err(|_| format!("unable to convert {} to a path", url))
    }

    pub fn from_path_string(path_string: &str) -> Result<FileLocation, String> {
        if path_string.trim().is_empty() {
            return Err("empty path".to_string());
        }
        Ok(FileLocation::from_path(PathBuf::from(path_string)))
    }

    /// Searches `start_dir` and its ancestors for a project manifest.
    pub fn find_project_manifest(start_dir: &Path) -> Option<FileLocation> {
        start_dir
            .ancestors()
            .map(|dir| dir.join(MANIFEST_FILE_NAME))
            .find(|candidate| candidate.is_file())
            .map(FileLocation::from_path)
    }

    pub fn is_remote(&self) -> bool {
        match self {
            FileLocation::Url { url } => matches!(url.scheme(), "http" | "https"),
            FileLocation::FileSystem { .. } => false,
        }
    }

    pub fn append_path(&mut self, relative: &str) -> Result<(), String> {
        let relative = Path::new(relative);
        match self {
            FileLocation::FileSystem { path } => path.push(relative),
            FileLocation::Url { url } => {
                let mut segments = url
                    .path_segments_mut()
                    .map_err(|_| "url can not hold a path".to_string())?;
                for component in relative.components() {
                    let segment = component
                        .as_os_str()
                        .to_str()
                        .ok_or_else(|| format!("{:?} is not valid utf-8", component))?;
                    segments.push(segment);
                }
            }
        }
        Ok(())
    }

    /// Location of the enclosing directory.
    pub fn get_parent_location(&self) -> Result<FileLocation, String> {
        match self {
            FileLocation::FileSystem { path } => path
                .parent()
                .map(|parent| FileLocation::from_path(parent.to_path_buf()))
                .ok_or_else(|| format!("{} has no parent directory", self)),
            FileLocation::Url { url } => {
                let mut parent = url.clone();
                parent
                    .path_segments_mut()
                    .map_err(|_| format!("{} has no parent", url))?
                    .pop();
                Ok(FileLocation::Url { url: parent })
            }
        }
    }

    /// Reads a file system location. Remote locations go through
    /// `RemoteSourceLoader` instead.
    pub fn read_content(&self) -> Result<Vec<u8>, String> {
        match self {
            FileLocation::FileSystem { path } => {
                fs::read(path).map_err(|e| format!("unable to read file {}: {}", path.display(), e))
            }
            FileLocation::Url { url } => Err(format!(
                "unable to read {} from disk, remote locations must be fetched",
                url
            )),
        }
    }

    pub fn read_content_as_utf8(&self) -> Result<String, String> {
        String::from_utf8(self.read_content()?)
            .map_err(|e| format!("{} is not valid utf-8: {}", self, e))
    }
}

impl fmt::Display for FileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileLocation::FileSystem { path } => write!(f, "{}", path.display()),
            FileLocation::Url { url } => write!(f, "{}", url),
        }
    }
}
