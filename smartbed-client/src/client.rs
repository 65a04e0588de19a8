use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use tokio::sync::broadcast;

use crate::configs::Device;
use crate::error::{Error, Result};
use crate::models::{CommandOutcome, DeviceState, MotorCommand};

pub const SET_STATE_ENDPOINT: &str = "set";
pub const STATUS_ENDPOINT: &str = "status";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Disconnected,
}

/// Published once per connectivity edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Lost { reason: String },
    Restored,
}

/// Any HTTP answer from the device, whatever its status.
#[derive(Debug)]
struct DeviceResponse {
    status: StatusCode,
    url: String,
    text: String,
}

/// Client for the bed controller's HTTP API.
///
/// The HTTP session is injected and shared; the client never builds or tears
/// down connection pools itself. Connectivity is tracked from the outcome of
/// the most recent request only: any response counts as reachable, only a
/// transport failure or timeout counts as unreachable.
pub struct DeviceApiClient {
    base_url: String,
    session: reqwest::Client,
    connected: AtomicBool,
    events: broadcast::Sender<ConnectionEvent>,
}

impl DeviceApiClient {
    pub fn new<S: Into<String>>(base_url: S, session: reqwest::Client) -> Self {
        let (events, _receiver) = broadcast::channel(EVENT_CAPACITY);

        Self {
            base_url: base_url.into(),
            session,
            connected: AtomicBool::new(true),
            events,
        }
    }

    pub fn from_settings(device: &Device, session: reqwest::Client) -> Self {
        Self::new(device.base_url.clone(), session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn connection_state(&self) -> ConnectionState {
        if self.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// Receive a [`ConnectionEvent`] whenever the connection flag flips.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    /// Probe the base url. Only a 200 counts as a working connection.
    pub async fn test_connection(&self) -> bool {
        self.request("", &[])
            .await
            .is_some_and(|response| response.status == StatusCode::OK)
    }

    pub async fn set_motor_state(&self, command: &MotorCommand) -> CommandOutcome {
        let params = command.query_params();

        match self.request(SET_STATE_ENDPOINT, params.as_slice()).await {
            Some(response) if response.status == StatusCode::OK => CommandOutcome::Success,
            Some(response) => CommandOutcome::Rejected {
                status: response.status,
            },
            None => CommandOutcome::Unreachable,
        }
    }

    /// Fetch the current bed state.
    ///
    /// Returns `Ok(None)` both when the device answers with a non-200 status and
    /// when it cannot be reached. A 200 with an unparsable body is an error.
    pub async fn get_status(&self) -> Result<Option<DeviceState>> {
        match self.request(STATUS_ENDPOINT, &[]).await {
            Some(response) => Self::handle_status_response(response),
            None => Ok(None),
        }
    }

    fn handle_status_response(response: DeviceResponse) -> Result<Option<DeviceState>> {
        tracing::debug!("Sent GET request was: {}", response.url);

        if response.status != StatusCode::OK {
            tracing::error!(
                "Response status code: {} | Response text: {}",
                response.status.as_u16(),
                response.text
            );
            return Ok(None);
        }

        tracing::debug!(
            "Response status code: {} | Response text: {}",
            response.status.as_u16(),
            response.text
        );

        serde_json::from_str(&response.text)
            .map(Some)
            .map_err(|source| Error::Decode {
                url: response.url,
                source,
            })
    }

    async fn request(&self, endpoint: &str, params: &[(String, bool)]) -> Option<DeviceResponse> {
        let mut builder = self
            .session
            .get(format!("{}/{}", self.base_url, endpoint))
            .timeout(DEFAULT_TIMEOUT);

        if !params.is_empty() {
            builder = builder.query(params);
        }

        let result = async {
            let response = builder.send().await?;
            let status = response.status();
            let url = response.url().to_string();
            let text = response.text().await?;

            Ok::<_, reqwest::Error>(DeviceResponse { status, url, text })
        }
        .await;

        match result {
            Ok(response) => {
                self.mark_connected();
                Some(response)
            }
            Err(err) => {
                self.mark_disconnected(&err);
                None
            }
        }
    }

    fn mark_connected(&self) {
        if !self.connected.swap(true, Ordering::AcqRel) {
            tracing::info!("SmartBed reconnected");
            let _ = self.events.send(ConnectionEvent::Restored);
        }
    }

    fn mark_disconnected(&self, err: &reqwest::Error) {
        if self.connected.swap(false, Ordering::AcqRel) {
            tracing::warn!("Connection to SmartBed failed: {}", err);
            let _ = self.events.send(ConnectionEvent::Lost {
                reason: err.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: StatusCode, text: &str) -> DeviceResponse {
        DeviceResponse {
            status,
            url: "http://bed.local/status".to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_new_client_starts_connected() {
        let client = DeviceApiClient::new("http://bed.local", reqwest::Client::new());

        assert!(client.is_connected());
        assert_eq!(client.connection_state(), ConnectionState::Connected);
        assert_eq!(client.base_url(), "http://bed.local");
    }

    #[test]
    fn test_from_settings_uses_device_base_url() {
        let device = Device {
            base_url: "http://10.0.0.7".to_string(),
        };
        let client = DeviceApiClient::from_settings(&device, reqwest::Client::new());

        assert_eq!(client.base_url(), "http://10.0.0.7");
    }

    #[test]
    fn test_status_response_ok() {
        let state = DeviceApiClient::handle_status_response(response(
            StatusCode::OK,
            r#"{"headPosition": 10, "feetPosition": 20}"#,
        ))
        .unwrap();

        assert_eq!(
            state,
            Some(DeviceState {
                head_position: 10,
                feet_position: 20
            })
        );
    }

    #[test]
    fn test_status_response_error_status() {
        let state = DeviceApiClient::handle_status_response(response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "boom",
        ))
        .unwrap();

        assert!(state.is_none());
    }

    #[test]
    fn test_status_response_malformed_body() {
        let result =
            DeviceApiClient::handle_status_response(response(StatusCode::OK, "<html>"));

        match result {
            Err(Error::Decode { url, .. }) => assert_eq!(url, "http://bed.local/status"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }
}
