// ── Runtime dashboard configuration ──
//
// Describes *how* to reach a dashboard server and how the sync engine
// paces itself. Never touches disk: the CLI (via sensornet-config)
// builds a `DashboardConfig` and hands it in.

use std::time::Duration;

use sensornet_api::TransportConfig;
pub use sensornet_api::{ReconnectConfig, TlsMode};
use url::Url;

use crate::error::CoreError;

/// Default push channel path on the dashboard server.
pub const PUSH_PATH: &str = "ws/devices/";

/// Configuration for one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Server root, e.g. `http://127.0.0.1:8000`.
    pub base_url: Url,
    /// Websocket URL for device push events.
    pub push_url: Url,
    /// TLS verification strategy.
    pub tls: TlsMode,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Telemetry readout/chart polling cadence. Zero disables polling.
    pub telemetry_poll_interval: Duration,
    /// Quiet period before text-driven searches are dispatched.
    pub search_debounce: Duration,
    /// Push channel reconnect backoff.
    pub reconnect: ReconnectConfig,
    /// How long to wait for a push confirmation after a toggle.
    pub command_timeout: Duration,
}

impl DashboardConfig {
    /// Build a config with default pacing for the given server.
    ///
    /// The push URL is derived from `base_url` (see [`default_push_url`]).
    pub fn new(base_url: Url) -> Result<Self, CoreError> {
        let push_url = default_push_url(&base_url)?;
        Ok(Self {
            base_url,
            push_url,
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            telemetry_poll_interval: Duration::from_secs(5),
            search_debounce: Duration::from_millis(500),
            reconnect: ReconnectConfig::default(),
            command_timeout: Duration::from_secs(10),
        })
    }

    /// Transport settings for the REST client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }
}

/// Derive the push channel URL from a server root: `http` becomes `ws`,
/// `https` becomes `wss`, and the path is [`PUSH_PATH`].
pub fn default_push_url(base_url: &Url) -> Result<Url, CoreError> {
    let scheme = match base_url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(CoreError::Config {
                message: format!("unsupported URL scheme '{other}' (expected http or https)"),
            });
        }
    };

    let mut root = base_url.clone();
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    let mut url = root.join(PUSH_PATH).map_err(|e| CoreError::Config {
        message: format!("invalid push URL: {e}"),
    })?;
    url.set_scheme(scheme).map_err(|()| CoreError::Config {
        message: format!("cannot derive push URL from {base_url}"),
    })?;
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn push_url_follows_scheme() {
        let http = Url::parse("http://127.0.0.1:8000").unwrap();
        assert_eq!(
            default_push_url(&http).unwrap().as_str(),
            "ws://127.0.0.1:8000/ws/devices/"
        );

        let https = Url::parse("https://iot.example.com/panel").unwrap();
        assert_eq!(
            default_push_url(&https).unwrap().as_str(),
            "wss://iot.example.com/panel/ws/devices/"
        );
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let ftp = Url::parse("ftp://example.com").unwrap();
        assert!(matches!(
            default_push_url(&ftp),
            Err(CoreError::Config { .. })
        ));
    }

    #[test]
    fn defaults_match_dashboard_cadence() {
        let cfg = DashboardConfig::new(Url::parse("http://localhost:8000").unwrap()).unwrap();
        assert_eq!(cfg.search_debounce, Duration::from_millis(500));
        assert_eq!(cfg.telemetry_poll_interval, Duration::from_secs(5));
        assert_eq!(cfg.transport().timeout, Duration::from_secs(30));
    }
}
