//! FTP upload
//!
//! [`SuppaFtpTransport`] uses the blocking `suppaftp` client on the tokio
//! blocking pool. Plain FTP is always available; FTPS (explicit TLS) comes
//! from the default `ftps` cargo feature.

use std::io::Cursor;

use async_trait::async_trait;
use suppaftp::{FtpError, FtpStream, types::FileType};

use crate::{
    config::FtpSettings,
    error::{DeliveryError, DeliveryResult},
};

/// Uploads captures to an FTP server
#[async_trait]
pub trait FtpTransport: Send + Sync {
    /// Uploads `bytes` as `filename` into the configured remote path
    ///
    /// The remote path is created when missing.
    ///
    /// # Errors
    ///
    /// - [`DeliveryError::FtpAuth`] - Login was rejected
    /// - [`DeliveryError::FtpNetwork`] - Connection or transfer failed
    async fn upload(&self, settings: &FtpSettings, filename: &str, bytes: &[u8]) -> DeliveryResult<()>;

    /// Connects and logs in, then disconnects
    async fn test_connection(&self, settings: &FtpSettings) -> DeliveryResult<()>;
}

/// Builds the public URL of an uploaded file
///
/// The base is `base_url` when set, otherwise `https://<host>` for FTPS and
/// `http://<host>` for plain FTP. Redundant slashes around the base and the
/// remote path are dropped before joining.
///
/// # Examples
///
/// ```
/// use shotpipe::{config::FtpSettings, delivery::remote_url};
///
/// let settings = FtpSettings {
///     host: "ftp.example.com".to_string(),
///     remote_path: "shots".to_string(),
///     base_url: "https://cdn.example.com".to_string(),
///     ..Default::default()
/// };
///
/// assert_eq!(
///     remote_url(&settings, "screenshot_2025-08-07_14-30-52.png"),
///     "https://cdn.example.com/shots/screenshot_2025-08-07_14-30-52.png"
/// );
/// ```
pub fn remote_url(settings: &FtpSettings, filename: &str) -> String {
    let base_url = settings.base_url.trim();
    let base = if base_url.is_empty() {
        let scheme = if settings.secure { "https" } else { "http" };
        format!("{}://{}", scheme, settings.host.trim())
    } else {
        base_url.trim_end_matches('/').to_string()
    };

    let remote_path = settings.remote_path.trim().trim_matches('/');
    if remote_path.is_empty() {
        format!("{}/{}", base, filename)
    } else {
        format!("{}/{}/{}", base, remote_path, filename)
    }
}

/// FTP transport over `suppaftp`
#[derive(Debug, Default, Clone, Copy)]
pub struct SuppaFtpTransport;

impl SuppaFtpTransport {
    /// Creates a new transport
    pub fn new() -> Self {
        Self
    }

    async fn blocking<T, F>(settings: &FtpSettings, job: F) -> DeliveryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(FtpSettings) -> DeliveryResult<T> + Send + 'static,
    {
        let host = settings.host.clone();
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || job(settings))
            .await
            .map_err(|e| DeliveryError::FtpNetwork {
                host,
                reason: format!("FTP task failed: {}", e),
            })?
    }
}

#[async_trait]
impl FtpTransport for SuppaFtpTransport {
    async fn upload(&self, settings: &FtpSettings, filename: &str, bytes: &[u8]) -> DeliveryResult<()> {
        let filename = filename.to_string();
        let bytes = bytes.to_vec();

        Self::blocking(settings, move |settings| {
            let mut session = open_session(&settings)?;
            let written = transfer(session.as_mut(), &settings, &filename, &bytes)?;
            tracing::debug!(host = %settings.host, "Uploaded {} bytes as {}", written, filename);

            if let Err(e) = session.quit() {
                tracing::debug!("FTP QUIT failed after upload: {}", e);
            }
            Ok(())
        })
        .await
    }

    async fn test_connection(&self, settings: &FtpSettings) -> DeliveryResult<()> {
        Self::blocking(settings, |settings| {
            let mut session = open_session(&settings)?;
            session.quit().map_err(network_error(&settings))
        })
        .await
    }
}

fn network_error(settings: &FtpSettings) -> impl Fn(FtpError) -> DeliveryError + '_ {
    move |e| DeliveryError::FtpNetwork {
        host:   settings.host.clone(),
        reason: e.to_string(),
    }
}

/// Connects (with TLS when `secure`) and logs in
fn open_session(settings: &FtpSettings) -> DeliveryResult<Box<dyn FtpSession>> {
    let mut session = if settings.secure {
        connect_secure(settings)?
    } else {
        let stream = FtpStream::connect(settings.address()).map_err(network_error(settings))?;
        Box::new(stream) as Box<dyn FtpSession>
    };

    login(session.as_mut(), settings)?;
    Ok(session)
}

/// Rejected credentials are an auth failure, not a network one
fn login(session: &mut dyn FtpSession, settings: &FtpSettings) -> DeliveryResult<()> {
    session
        .login(&settings.username, &settings.password)
        .map_err(|e| DeliveryError::FtpAuth {
            host:   settings.host.clone(),
            reason: e.to_string(),
        })?;

    tracing::debug!(host = %settings.host, secure = settings.secure, "FTP login succeeded");
    Ok(())
}

/// Switches to binary mode, enters the remote path and stores the file
fn transfer(
    session: &mut dyn FtpSession,
    settings: &FtpSettings,
    filename: &str,
    bytes: &[u8],
) -> DeliveryResult<u64> {
    let network = network_error(settings);

    session.binary().map_err(&network)?;
    ensure_dir(session, &settings.remote_path).map_err(&network)?;
    session.put(filename, bytes).map_err(&network)
}

#[cfg(feature = "ftps")]
fn connect_secure(settings: &FtpSettings) -> DeliveryResult<Box<dyn FtpSession>> {
    use suppaftp::{NativeTlsConnector, NativeTlsFtpStream, native_tls::TlsConnector};

    let connector = TlsConnector::new().map_err(|e| DeliveryError::FtpNetwork {
        host:   settings.host.clone(),
        reason: format!("TLS setup failed: {}", e),
    })?;

    let stream = NativeTlsFtpStream::connect(settings.address())
        .and_then(|stream| {
            stream.into_secure(NativeTlsConnector::from(connector), settings.host.trim())
        })
        .map_err(network_error(settings))?;

    Ok(Box::new(stream))
}

#[cfg(not(feature = "ftps"))]
fn connect_secure(settings: &FtpSettings) -> DeliveryResult<Box<dyn FtpSession>> {
    Err(DeliveryError::FtpNetwork {
        host:   settings.host.clone(),
        reason: "FTPS support not compiled in (build with the `ftps` feature)".to_string(),
    })
}

/// Changes into `remote_path`, creating each missing segment
fn ensure_dir(session: &mut dyn FtpSession, remote_path: &str) -> Result<(), FtpError> {
    let remote_path = remote_path.trim();
    if remote_path.starts_with('/') {
        session.cwd("/")?;
    }

    for segment in remote_path.split('/').filter(|s| !s.is_empty()) {
        if session.cwd(segment).is_err() {
            session.mkdir(segment)?;
            session.cwd(segment)?;
        }
    }
    Ok(())
}

/// The client operations used here, over plain and TLS streams
trait FtpSession: Send {
    fn login(&mut self, user: &str, password: &str) -> Result<(), FtpError>;
    fn binary(&mut self) -> Result<(), FtpError>;
    fn cwd(&mut self, path: &str) -> Result<(), FtpError>;
    fn mkdir(&mut self, path: &str) -> Result<(), FtpError>;
    fn put(&mut self, filename: &str, bytes: &[u8]) -> Result<u64, FtpError>;
    fn quit(&mut self) -> Result<(), FtpError>;
}

macro_rules! impl_ftp_session {
    ($stream:ty) => {
        impl FtpSession for $stream {
            fn login(&mut self, user: &str, password: &str) -> Result<(), FtpError> {
                <$stream>::login(self, user, password)
            }

            fn binary(&mut self) -> Result<(), FtpError> {
                self.transfer_type(FileType::Binary)
            }

            fn cwd(&mut self, path: &str) -> Result<(), FtpError> {
                <$stream>::cwd(self, path)
            }

            fn mkdir(&mut self, path: &str) -> Result<(), FtpError> {
                <$stream>::mkdir(self, path)
            }

            fn put(&mut self, filename: &str, bytes: &[u8]) -> Result<u64, FtpError> {
                self.put_file(filename, &mut Cursor::new(bytes))
            }

            fn quit(&mut self) -> Result<(), FtpError> {
                <$stream>::quit(self)
            }
        }
    };
}

impl_ftp_session!(FtpStream);
#[cfg(feature = "ftps")]
impl_ftp_session!(suppaftp::NativeTlsFtpStream);
