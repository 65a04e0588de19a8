use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::settings::Settings;

pub use axum::http::StatusCode;

pub use crate::bed::{BedState, Drive, MAX_POSITION, MockState, Motor};

mod bed;
mod handles;
pub mod settings;

pub fn create_app(state: MockState) -> Router {
    Router::new()
        .route("/", get(handles::probe))
        .route("/set", get(handles::set_motor_state))
        .route("/status", get(handles::get_status))
        .with_state(state)
}

/// A simulated bed controller served in the background.
pub struct MockDevice {
    addr: SocketAddr,
    state: MockState,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl MockDevice {
    pub async fn spawn(addr: SocketAddr, step: u8) -> io::Result<Self> {
        Self::spawn_with_state(addr, MockState::new(step)).await
    }

    /// Serve an existing state, e.g. to bring a stopped device back with its positions.
    pub async fn spawn_with_state(addr: SocketAddr, state: MockState) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        let app = create_app(state.clone());
        let (shutdown, signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await;

            if let Err(e) = served {
                tracing::error!("Mock device stopped with error: {}", e);
            }
        });

        tracing::debug!("Mock device listening on {}", addr);

        Ok(Self {
            addr,
            state,
            shutdown,
            handle,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &MockState {
        &self.state
    }

    /// Stop serving and wait until every open connection is closed.
    pub async fn shutdown(self) -> MockState {
        let MockDevice {
            state,
            shutdown,
            handle,
            ..
        } = self;

        let _ = shutdown.send(());
        let _ = handle.await;

        state
    }
}

pub async fn run(settings: &Arc<Settings>) -> io::Result<()> {
    let ip_addr = settings
        .server
        .host
        .parse::<IpAddr>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let address = SocketAddr::from((ip_addr, settings.server.port));

    let device = MockDevice::spawn(address, settings.bed.step).await?;
    tracing::info!("listening on {}", device.addr());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    device.shutdown().await;

    Ok(())
}
