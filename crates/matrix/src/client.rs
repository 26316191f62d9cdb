use crate::Settings;
use std::time::Duration;

/// RoomMessage is the `m.room.message` event content of an HTML-formatted text message.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RoomMessage {
    pub msgtype: String,
    /// Plain-text rendering, shown by clients which don't render HTML.
    pub body: String,
    pub format: String,
    /// HTML rendering. Interpolated text must already be escaped.
    pub formatted_body: String,
}

impl RoomMessage {
    pub fn html(body: impl Into<String>, formatted_body: impl Into<String>) -> Self {
        RoomMessage {
            msgtype: "m.text".to_string(),
            body: body.into(),
            format: "org.matrix.custom.html".to_string(),
            formatted_body: formatted_body.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SendError {
    #[error("homeserver URL {0} cannot carry a room path")]
    Endpoint(url::Url),
    #[error("HTTP {status} from room {room_id}: {body}")]
    Status {
        room_id: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("sending to room {room_id} failed")]
    Transport {
        room_id: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Client posts messages to rooms of a single homeserver.
#[derive(Debug, Clone)]
pub struct Client {
    // Base URL of the homeserver.
    server: url::Url,
    // Bearer token of the posting user.
    token: String,
    http_client: reqwest::Client,
}

impl Client {
    /// Build a Client whose requests fail after `timeout`.
    pub fn new(
        server: url::Url,
        token: impl Into<String>,
        timeout: Duration,
    ) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            server,
            token: token.into(),
            http_client,
        })
    }

    pub fn from_settings(settings: &Settings, timeout: Duration) -> reqwest::Result<Self> {
        Self::new(settings.server.clone(), settings.token.clone(), timeout)
    }

    /// URL of the `m.room.message` send endpoint of `room_id`.
    pub fn message_url(&self, room_id: &str) -> Result<url::Url, SendError> {
        let mut url = self.server.clone();

        url.path_segments_mut()
            .map_err(|()| SendError::Endpoint(self.server.clone()))?
            .pop_if_empty()
            .extend([
                "_matrix",
                "client",
                "r0",
                "rooms",
                room_id,
                "send",
                "m.room.message",
            ]);

        Ok(url)
    }

    /// Post `message` to `room_id`. Any 2xx status is a success.
    pub async fn send(&self, room_id: &str, message: &RoomMessage) -> Result<(), SendError> {
        let url = self.message_url(room_id)?;
        let transport = |source| SendError::Transport {
            room_id: room_id.to_string(),
            source,
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(&self.token)
            .json(message)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%room_id, %status, "posted room message");
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => err.to_string(),
        };
        Err(SendError::Status {
            room_id: room_id.to_string(),
            status,
            body,
        })
    }
}

/// MessageSender delivers a RoomMessage to a room.
pub trait MessageSender: std::fmt::Debug + Send + Sync {
    fn send<'s>(
        &'s self,
        room_id: &'s str,
        message: &'s RoomMessage,
    ) -> impl std::future::Future<Output = Result<(), SendError>> + Send + 's;
}

#[derive(Debug)]
pub enum Sender {
    /// Messages are logged rather than sent.
    Disabled,
    Matrix(Client),
}

impl MessageSender for Sender {
    async fn send<'s>(&'s self, room_id: &'s str, message: &'s RoomMessage) -> Result<(), SendError> {
        match self {
            Sender::Disabled => {
                tracing::warn!(
                    %room_id,
                    body = %message.body,
                    formatted_body = %message.formatted_body,
                    "skipping sending room message (disabled)"
                );
                Ok(())
            }
            Sender::Matrix(client) => client.send(room_id, message).await,
        }
    }
}
