//! Client side of the orchestrator's command channel.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::command::protocol::{Request, Response, StatusReport};
use crate::config::Settings;
use crate::download::{EventBus, Notification};
use crate::error::{Error, Result};

/// A request paired with the channel its single response goes back on.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: oneshot::Sender<Response>,
}

/// Cloneable handle for sending commands and listening to notifications.
#[derive(Debug, Clone)]
pub struct OrchestratorHandle {
    requests: mpsc::Sender<Envelope>,
    events: EventBus,
}

impl OrchestratorHandle {
    pub fn new(requests: mpsc::Sender<Envelope>, events: EventBus) -> Self {
        Self { requests, events }
    }

    /// Send a request and wait for its response.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(Envelope { request, reply })
            .await
            .map_err(|_| Error::OrchestratorGone)?;
        response.await.map_err(|_| Error::OrchestratorGone)
    }

    pub async fn enqueue(&self, urls: Vec<String>, owner_name: &str) -> Result<Response> {
        self.send(Request::enqueue(urls, owner_name)).await
    }

    pub async fn stop(&self) -> Result<Response> {
        self.send(Request::Stop).await
    }

    pub async fn resume(&self) -> Result<Response> {
        self.send(Request::Resume).await
    }

    pub async fn clear(&self) -> Result<Response> {
        self.send(Request::Clear).await
    }

    pub async fn status(&self) -> Result<StatusReport> {
        match self.send(Request::Status).await? {
            Response::Status(report) => Ok(report),
            other => Err(Error::Protocol(format!(
                "Unexpected response to status request: {:?}",
                other
            ))),
        }
    }

    pub async fn update_settings(&self, settings: Settings) -> Result<Response> {
        self.send(Request::update_settings(settings)).await
    }

    /// Listen to notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events.subscribe()
    }
}
