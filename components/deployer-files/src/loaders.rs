use std::time::Duration;

use deployer_resolver::{LoadError, SourceLoader};
use reqwest::blocking::Client;
use tracing::debug;

use crate::FileLocation;

const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads contract sources from disk. Relative locations are resolved against
/// the project root.
#[derive(Debug, Clone)]
pub struct FileSystemSourceLoader {
    project_root_location: FileLocation,
}

impl FileSystemSourceLoader {
    pub fn new(project_root_location: FileLocation) -> FileSystemSourceLoader {
        FileSystemSourceLoader {
            project_root_location,
        }
    }

    pub fn resolve(&self, location: &str) -> Result<FileLocation, LoadError> {
        FileLocation::try_parse(location, Some(&self.project_root_location))
            .filter(|resolved| !resolved.is_remote())
            .ok_or_else(|| LoadError::new(location, "not a file system location"))
    }
}

impl SourceLoader for FileSystemSourceLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        let resolved = self.resolve(location)?;
        debug!("reading contract source {}", resolved);
        resolved
            .read_content()
            .map_err(|message| LoadError::new(location, message))
    }
}

/// Fetches contract sources over http(s).
#[derive(Debug, Clone)]
pub struct RemoteSourceLoader {
    client: Client,
}

impl RemoteSourceLoader {
    pub fn new() -> Result<RemoteSourceLoader, String> {
        let client = Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .map_err(|e| format!("unable to initialize http client: {}", e))?;
        Ok(RemoteSourceLoader { client })
    }
}

impl SourceLoader for RemoteSourceLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        debug!("fetching contract source {}", location);
        let response = self
            .client
            .get(location)
            .send()
            .map_err(|e| LoadError::new(location, format!("unable to retrieve contract: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::new(
                location,
                format!("unable to retrieve contract: http status {}", status),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| LoadError::new(location, format!("unable to read response: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

/// Loader used for manifest projects: http(s) locations are fetched, every
/// other location is read from disk.
#[derive(Debug, Clone)]
pub struct ManifestSourceLoader {
    file_system: FileSystemSourceLoader,
    remote: RemoteSourceLoader,
}

impl ManifestSourceLoader {
    pub fn new(project_root_location: FileLocation) -> Result<ManifestSourceLoader, String> {
        Ok(ManifestSourceLoader {
            file_system: FileSystemSourceLoader::new(project_root_location),
            remote: RemoteSourceLoader::new()?,
        })
    }
}

impl SourceLoader for ManifestSourceLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        match FileLocation::from_url_string(location) {
            Ok(parsed) if parsed.is_remote() => self.remote.load(location),
            _ => self.file_system.load(location),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answers a single http request with `status` and `body`, returning the
    /// base url of the server.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buffer = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let read = stream.read(&mut buffer).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buffer[..read]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}", address)
    }

    fn local_remote_loader() -> RemoteSourceLoader {
        RemoteSourceLoader {
            client: Client::builder()
                .timeout(REMOTE_TIMEOUT)
                .no_proxy()
                .build()
                .unwrap(),
        }
    }

    #[test]
    fn remote_loader_fetches_source() {
        let base = serve_once("200 OK", "pub contract A {}");
        let location = format!("{}/A.cdc", base);
        assert_eq!(
            local_remote_loader().load(&location).unwrap(),
            b"pub contract A {}".to_vec()
        );
    }

    #[test]
    fn remote_loader_rejects_error_status() {
        let base = serve_once("404 Not Found", "missing");
        let location = format!("{}/A.cdc", base);
        let err = local_remote_loader().load(&location).unwrap_err();
        assert_eq!(err.location, location);
        assert!(err.message.contains("404"));
    }

    #[test]
    fn manifest_loader_routes_by_location() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("B.cdc"), "pub contract B {}").unwrap();
        let loader = ManifestSourceLoader {
            file_system: FileSystemSourceLoader::new(FileLocation::from_path(
                dir.path().to_path_buf(),
            )),
            remote: local_remote_loader(),
        };

        let base = serve_once("200 OK", "pub contract A {}");
        assert_eq!(
            loader.load(&format!("{}/A.cdc", base)).unwrap(),
            b"pub contract A {}".to_vec()
        );
        assert_eq!(loader.load("./B.cdc").unwrap(), b"pub contract B {}".to_vec());
    }

    #[test]
    fn file_system_loader_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("contracts")).unwrap();
        fs::write(dir.path().join("contracts/A.cdc"), "pub contract A {}").unwrap();

        let loader = FileSystemSourceLoader::new(FileLocation::from_path(dir.path().to_path_buf()));
        assert_eq!(
            loader.load("./contracts/A.cdc").unwrap(),
            b"pub contract A {}".to_vec()
        );

        let err = loader.load("./contracts/Missing.cdc").unwrap_err();
        assert_eq!(err.location, "./contracts/Missing.cdc");
    }

    #[test]
    fn file_system_loader_refuses_remote_locations() {
        let loader = FileSystemSourceLoader::new(FileLocation::from_path("/project".into()));
        assert!(loader.load("https://example.com/A.cdc").is_err());
    }
}
