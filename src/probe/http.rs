use crate::probe::error::{ProbeError, Result};
use crate::probe::rate::RawRate;
use crate::probe::service::SpeedProbe;
use reqwest::blocking::Client;
use std::io;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default speed test endpoint
pub const DEFAULT_SERVER: &str = "https://speed.cloudflare.com";

/// Default download payload size in bytes
pub const DEFAULT_DOWNLOAD_BYTES: u64 = 25_000_000;

/// Default upload payload size in bytes
pub const DEFAULT_UPLOAD_BYTES: u64 = 10_000_000;

/// Largest payload accepted in either direction (1 GiB)
pub const MAX_PAYLOAD_BYTES: u64 = 1 << 30;

/// Settings for the HTTP speed probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Base URL exposing `/__down` and `/__up`
    pub server: String,
    pub download_bytes: u64,
    pub upload_bytes: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            download_bytes: DEFAULT_DOWNLOAD_BYTES,
            upload_bytes: DEFAULT_UPLOAD_BYTES,
        }
    }
}

impl ProbeSettings {
    fn base(&self) -> &str {
        self.server.trim_end_matches('/')
    }

    fn download_url(&self, bytes: u64) -> String {
        format!("{}/__down?bytes={}", self.base(), bytes)
    }

    fn upload_url(&self) -> String {
        format!("{}/__up", self.base())
    }
}

/// Speed probe backed by a Cloudflare-style HTTP speed endpoint.
///
/// Download speed is the size of a fetched payload over the time taken to
/// receive it; upload speed is the size of a posted payload over the time
/// until the server acknowledges it. Requests carry no timeout.
#[derive(Debug)]
pub struct HttpSpeedProbe {
    client: Client,
    settings: ProbeSettings,
}

impl HttpSpeedProbe {
    /// Build the HTTP client and check that the server is reachable
    pub fn connect(settings: ProbeSettings) -> Result<Self> {
        debug!(server = %settings.server, "Initializing HTTP speed probe");
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to build HTTP client");
                ProbeError::Init(format!("Failed to build HTTP client: {}", e))
            })?;

        let url = settings.download_url(0);
        let response = client.get(&url).send().map_err(|e| {
            warn!(error = %e, url = %url, "Speed server unreachable");
            ProbeError::Init(format!("Cannot reach {}: {}", settings.server, e))
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, url = %url, "Speed server rejected probe request");
            return Err(ProbeError::Init(format!(
                "{} responded with {}",
                settings.server, status
            )));
        }

        debug!("HTTP speed probe ready");
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ProbeSettings {
        &self.settings
    }
}

/// Bytes over seconds, refusing empty transfers
fn rate_from_transfer(bytes: u64, elapsed: Duration) -> Option<RawRate> {
    let secs = elapsed.as_secs_f64();
    if bytes == 0 || secs <= 0.0 {
        return None;
    }
    Some(RawRate(bytes as f64 / secs))
}

impl SpeedProbe for HttpSpeedProbe {
    fn measure_download(&mut self) -> Result<RawRate> {
        let url = self.settings.download_url(self.settings.download_bytes);
        debug!(url = %url, "Starting download measurement");

        let start = Instant::now();
        let mut response = self.client.get(&url).send().map_err(|e| {
            warn!(error = %e, "Download request failed");
            ProbeError::Download(e.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Download rejected by server");
            return Err(ProbeError::Download(format!("server responded with {}", status)));
        }
        let received = response.copy_to(&mut io::sink()).map_err(|e| {
            warn!(error = %e, "Download interrupted");
            ProbeError::Download(format!("transfer interrupted: {}", e))
        })?;
        let elapsed = start.elapsed();

        let rate = rate_from_transfer(received, elapsed)
            .ok_or_else(|| ProbeError::Download("no payload received".into()))?;
        info!(
            bytes = received,
            elapsed_ms = elapsed.as_millis() as u64,
            bytes_per_sec = rate.0,
            "Download measurement completed"
        );
        Ok(rate)
    }

    fn measure_upload(&mut self) -> Result<RawRate> {
        let url = self.settings.upload_url();
        let size = self.settings.upload_bytes;
        debug!(url = %url, bytes = size, "Starting upload measurement");
        let len = usize::try_from(size)
            .ok()
            .filter(|&len| len as u64 <= MAX_PAYLOAD_BYTES)
            .ok_or_else(|| {
                ProbeError::Upload(format!(
                    "payload of {} bytes exceeds the {} byte limit",
                    size, MAX_PAYLOAD_BYTES
                ))
            })?;
        let payload = vec![0u8; len];

        let start = Instant::now();
        let response = self.client.post(&url).body(payload).send().map_err(|e| {
            warn!(error = %e, "Upload request failed");
            ProbeError::Upload(e.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Upload rejected by server");
            return Err(ProbeError::Upload(format!("server responded with {}", status)));
        }
        response.bytes().map_err(|e| {
            warn!(error = %e, "Upload acknowledgement interrupted");
            ProbeError::Upload(format!("transfer interrupted: {}", e))
        })?;
        let elapsed = start.elapsed();

        let rate = rate_from_transfer(size, elapsed)
            .ok_or_else(|| ProbeError::Upload("no payload sent".into()))?;
        info!(
            bytes = size,
            elapsed_ms = elapsed.as_millis() as u64,
            bytes_per_sec = rate.0,
            "Upload measurement completed"
        );
        Ok(rate)
    }
}
