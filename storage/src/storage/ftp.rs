// FTP-backed FileStorage implementation
// One synchronous FTP exchange per operation, fresh connection each call

use crate::config::FtpStorageConfig;
use crate::errors::StorageError;
use crate::storage::{format_version, FileStorage};
use chrono::{DateTime, Utc};
use std::io::{self, Read};
use std::net::ToSocketAddrs;
use std::time::Duration;
use suppaftp::types::FileType;
use suppaftp::{FtpStream, Mode};
use tracing::{debug, error, info, instrument};

/// FtpFileStorage translates each FileStorage capability into one
/// synchronous FTP protocol exchange against `base_path + name`.
///
/// No state is shared across calls beyond the parsed connection settings,
/// and nothing is cached: every operation round-trips to the server.
/// Concurrent calls on the same file name are not coordinated; two
/// simultaneous uploads to one name race at the server.
pub struct FtpFileStorage {
    host: String,
    port: u16,
    root: String,
    username: String,
    password: String,
    timeout: Duration,
}

impl FtpFileStorage {
    /// Create an adapter from validated connection settings
    ///
    /// The base path is parsed once here; operations only concatenate the
    /// file name onto the parsed root.
    pub fn new(config: FtpStorageConfig) -> Result<Self, StorageError> {
        config
            .validate()
            .map_err(|reason| StorageError::InvalidBasePath {
                path: config.base_path.clone(),
                reason,
            })?;

        let url = url::Url::parse(&config.base_path).map_err(|e| StorageError::InvalidBasePath {
            path: config.base_path.clone(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "ftp" {
            return Err(StorageError::InvalidBasePath {
                path: config.base_path.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let host = url
            .host_str()
            .ok_or_else(|| StorageError::InvalidBasePath {
                path: config.base_path.clone(),
                reason: "missing host".to_string(),
            })?
            .to_string();

        Ok(Self {
            host,
            port: url.port().unwrap_or(21),
            root: url.path().to_string(),
            username: config.username,
            password: config.password,
            timeout: Duration::from_secs(config.timeout_seconds),
        })
    }

    fn remote_path(&self, name: &str) -> String {
        format!("{}{}", self.root, name)
    }

    /// Open a fresh control connection, authenticate, and switch to binary
    /// transfer mode
    #[instrument(skip(self), fields(host = %self.host, port = %self.port))]
    fn connect(&self) -> Result<FtpStream, StorageError> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                error!(error = %e, host = %self.host, "Failed to resolve FTP server address");
                StorageError::ConnectionFailed(format!(
                    "Failed to resolve {}:{}: {}",
                    self.host, self.port, e
                ))
            })?
            .next()
            .ok_or_else(|| {
                StorageError::ConnectionFailed(format!(
                    "No addresses found for {}:{}",
                    self.host, self.port
                ))
            })?;

        let mut ftp = FtpStream::connect_timeout(addr, self.timeout).map_err(|e| {
            error!(error = %e, host = %self.host, port = %self.port, "Failed to connect to FTP server");
            StorageError::ConnectionFailed(format!(
                "Failed to connect to {}:{}: {}",
                self.host, self.port, e
            ))
        })?;

        ftp.get_ref()
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| {
                StorageError::ConnectionFailed(format!("Failed to set read timeout: {}", e))
            })?;

        ftp.get_ref()
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| {
                StorageError::ConnectionFailed(format!("Failed to set write timeout: {}", e))
            })?;

        ftp.login(&self.username, &self.password).map_err(|e| {
            error!(error = %e, username = %self.username, "FTP login failed");
            StorageError::AuthenticationFailed(format!(
                "Login failed for user {}: {}",
                self.username, e
            ))
        })?;

        // Binary transfer mode is always used, no ASCII translation
        ftp.transfer_type(FileType::Binary).map_err(|e| {
            StorageError::OperationFailed(format!("Failed to set binary transfer mode: {}", e))
        })?;

        debug!("FTP connection established");
        Ok(ftp)
    }

    fn try_file_size(&self, name: &str) -> Result<u64, StorageError> {
        let path = self.remote_path(name);
        let mut ftp = self.connect()?;
        let size = ftp.size(&path).map_err(|e| {
            StorageError::OperationFailed(format!("SIZE failed for {}: {}", path, e))
        })?;
        let _ = ftp.quit();
        Ok(size as u64)
    }

    fn try_last_modified(&self, name: &str) -> Result<DateTime<Utc>, StorageError> {
        let path = self.remote_path(name);
        let mut ftp = self.connect()?;
        let modified = ftp.mdtm(&path).map_err(|e| {
            StorageError::OperationFailed(format!("MDTM failed for {}: {}", path, e))
        })?;
        let _ = ftp.quit();
        // MDTM replies are defined in UTC
        Ok(modified.and_utc())
    }

    fn try_get_file(&self, name: &str) -> Result<FtpFileReader, StorageError> {
        let path = self.remote_path(name);
        let mut ftp = self.connect()?;
        ftp.set_mode(Mode::Passive);
        let data = ftp.retr_as_stream(&path).map_err(|e| {
            StorageError::OperationFailed(format!("RETR failed for {}: {}", path, e))
        })?;
        debug!(path = %path, "Download stream opened");
        Ok(FtpFileReader {
            data: Box::new(data),
            _control: ftp,
        })
    }

    fn try_upload(&self, name: &str, stream: &mut dyn Read) -> Result<u64, StorageError> {
        let path = self.remote_path(name);
        let mut ftp = self.connect()?;
        ftp.set_mode(Mode::Passive);

        let mut data = ftp.put_with_stream(&path).map_err(|e| {
            StorageError::OperationFailed(format!("STOR failed for {}: {}", path, e))
        })?;

        let copied = io::copy(stream, &mut data);
        // Close the data channel even when the copy failed mid-way; the
        // remote file is left in an indeterminate state on failure.
        let finalized = ftp.finalize_put_stream(data);

        let written = copied.map_err(|e| {
            StorageError::OperationFailed(format!("Transfer to {} failed: {}", path, e))
        })?;
        finalized.map_err(|e| {
            StorageError::OperationFailed(format!("Failed to finalize upload to {}: {}", path, e))
        })?;

        let _ = ftp.quit();
        info!(path = %path, bytes = written, "File uploaded");
        Ok(written)
    }
}

impl FileStorage for FtpFileStorage {
    #[instrument(skip(self))]
    fn file_size(&self, name: &str) -> i64 {
        match self.try_file_size(name) {
            Ok(size) => size as i64,
            Err(e) => {
                debug!(name = %name, error = %e, "Size query failed, returning sentinel");
                -1
            }
        }
    }

    #[instrument(skip(self))]
    fn last_modified(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.try_last_modified(name) {
            Ok(modified) => Some(modified),
            Err(e) => {
                debug!(name = %name, error = %e, "Modification time query failed");
                None
            }
        }
    }

    #[instrument(skip(self))]
    fn get_file(&self, name: &str) -> Option<Box<dyn Read + Send>> {
        match self.try_get_file(name) {
            Ok(reader) => Some(Box::new(reader)),
            Err(e) => {
                debug!(name = %name, error = %e, "Download failed");
                None
            }
        }
    }

    #[instrument(skip(self, stream))]
    fn upload_file(&self, name: &str, stream: &mut dyn Read) -> i32 {
        match self.try_upload(name, stream) {
            Ok(_) => 0,
            Err(e) => {
                error!(name = %name, error = %e, "Upload failed");
                -1
            }
        }
    }

    // Listing errors propagate to the caller, unlike the sentinel
    // operations above.
    #[instrument(skip(self))]
    fn file_names(&self) -> Result<Vec<String>, StorageError> {
        let mut ftp = self
            .connect()
            .map_err(|e| StorageError::ListingFailed(e.to_string()))?;
        ftp.set_mode(Mode::Passive);
        let names = ftp.nlst(Some(self.root.as_str())).map_err(|e| {
            error!(root = %self.root, error = %e, "Directory listing failed");
            StorageError::ListingFailed(format!("NLST failed for {}: {}", self.root, e))
        })?;
        let _ = ftp.quit();
        debug!(count = names.len(), "Directory listed");
        Ok(names)
    }

    #[instrument(skip(self))]
    fn file_version(&self, name: &str) -> Result<String, StorageError> {
        let modified = self
            .last_modified(name)
            .ok_or_else(|| StorageError::MissingTimestamp(name.to_string()))?;
        Ok(format_version(modified))
    }

    fn read_only_status(&self, _name: &str) -> bool {
        // FTP files are always treated as read/write; no network call
        false
    }

    fn get_directory(&self) -> Result<Vec<String>, StorageError> {
        Err(StorageError::NotSupported {
            operation: "get_directory",
        })
    }

    fn delete_file(&self, _name: &str) -> Result<(), StorageError> {
        Err(StorageError::NotSupported {
            operation: "delete_file",
        })
    }

    fn create_or_overwrite_file(
        &self,
        _name: &str,
        _stream: &mut dyn Read,
    ) -> Result<(), StorageError> {
        Err(StorageError::NotSupported {
            operation: "create_or_overwrite_file",
        })
    }

    fn rename_file(&self, _name: &str, _new_name: &str) -> Result<(), StorageError> {
        Err(StorageError::NotSupported {
            operation: "rename_file",
        })
    }
}

/// Live download stream handed back by `get_file`.
///
/// Owns both the control connection and the data channel; dropping the
/// reader closes both without awaiting the server's end-of-transfer
/// reply, so aborting a partially read file never blocks. The caller is
/// expected to read to completion (or abort) before dropping.
pub struct FtpFileReader {
    data: Box<dyn Read + Send>,
    _control: FtpStream,
}

impl Read for FtpFileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}
