use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::dao::{
    models::RoomRecord,
    room_store::{RoomStore, room_key},
    storage::{StorageError, StorageResult},
};

use super::{
    config::RedisConfig,
    error::{RedisDaoError, RedisResult},
};

/// Room store backed by an Upstash-compatible Redis REST endpoint.
///
/// Commands map onto path segments (`get/<key>`, `set/<key>`, `del/<key>`);
/// stored documents are JSON strings holding a [`RoomRecord`].
#[derive(Clone)]
pub struct RedisRoomStore {
    client: Client,
    base_url: Arc<str>,
    token: Option<Arc<str>>,
}

/// Envelope every REST command answers with.
#[derive(Debug, Deserialize)]
struct RestResponse {
    #[serde(default)]
    result: Option<Value>,
}

impl RedisRoomStore {
    /// Build the client and verify the endpoint responds to a ping.
    pub async fn connect(config: RedisConfig) -> RedisResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RedisDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            token: config.token.map(Arc::from),
        };

        store.ping().await?;
        Ok(store)
    }

    /// Issue one REST command; `body` turns the request into a POST carrying
    /// the value payload (the SET calling convention).
    async fn command(&self, path: String, body: Option<String>) -> RedisResult<RestResponse> {
        let url = format!("{}/{}", self.base_url, path);
        let mut builder = match body {
            Some(payload) => self.client.post(&url).body(payload),
            None => self.client.get(&url),
        };
        if let Some(ref token) = self.token {
            builder = builder.bearer_auth(token.as_ref());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| RedisDaoError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(RedisDaoError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        response
            .json::<RestResponse>()
            .await
            .map_err(|source| RedisDaoError::DecodeResponse { path, source })
    }

    async fn ping(&self) -> RedisResult<()> {
        self.command("ping".to_string(), None).await.map(|_| ())
    }
}

impl RoomStore for RedisRoomStore {
    fn save_room(&self, record: RoomRecord) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let payload = serde_json::to_string(&record)
                .map_err(|source| StorageError::unavailable("serializing room record", source))?;
            store
                .command(format!("set/{}", room_key(&record.id)), Some(payload))
                .await
                .map(|_| ())
                .map_err(Into::into)
        })
    }

    fn find_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<Option<RoomRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            let key = room_key(&room_id);
            let response = store.command(format!("get/{key}"), None).await?;
            let raw = match response.result {
                None | Some(Value::Null) => return Ok(None),
                Some(Value::String(raw)) => raw,
                // A non-string result is not something we ever wrote.
                Some(other) => other.to_string(),
            };

            match serde_json::from_str::<RoomRecord>(&raw) {
                Ok(record) => Ok(Some(record)),
                Err(err) => {
                    warn!(room_id = %room_id, error = %err, "discarding undecodable room record");
                    store.command(format!("del/{key}"), None).await?;
                    Ok(None)
                }
            }
        })
    }

    fn delete_room(&self, room_id: String) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .command(format!("del/{}", room_key(&room_id)), None)
                .await
                .map(|_| ())
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
