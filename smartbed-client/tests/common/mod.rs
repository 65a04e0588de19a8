use std::net::SocketAddr;

use smartbed_client::DeviceApiClient;
use smartbed_mock::MockDevice;
use tokio::net::TcpListener;

pub const STEP: u8 = 10;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A session that never reuses connections, so a stopped device is noticed immediately.
pub fn session() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

pub async fn spawn_device() -> MockDevice {
    init_tracing();
    MockDevice::spawn("127.0.0.1:0".parse().unwrap(), STEP)
        .await
        .unwrap()
}

/// An address nothing is listening on.
pub async fn vacant_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn client_for(device: &MockDevice) -> DeviceApiClient {
    DeviceApiClient::new(device.base_url(), session())
}

pub fn client_at(addr: SocketAddr) -> DeviceApiClient {
    DeviceApiClient::new(format!("http://{addr}"), session())
}
