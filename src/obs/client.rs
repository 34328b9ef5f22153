//! The obs-websocket client: handshake, request/response correlation,
//! and the narrow control-surface implementation.

use super::protocol::{
    self, AuthChallenge, Envelope, Hello, Identify, Request, RequestResponse, OP_HELLO,
    OP_IDENTIFIED, OP_IDENTIFY, OP_REQUEST, OP_REQUEST_RESPONSE,
};
use super::ObsError;
use crate::actions::{BackendError, ObsControl};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};
use uuid::Uuid;

type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<RequestResponse>>>>;

/// Handle to a connected OBS instance.
///
/// Requests are correlated with responses by request id through a
/// pending map; the driver task owns the socket.
pub struct ObsClient {
    outbound: mpsc::Sender<WsMessage>,
    pending: PendingMap,
}

impl ObsClient {
    /// Connect, complete the Hello/Identify handshake, and spawn the
    /// socket driver.
    pub async fn connect(url: &str, password: Option<&str>) -> Result<Self, ObsError> {
        let (stream, _) = tokio_tungstenite::connect_async(url).await?;
        let (mut sink, mut source) = stream.split();

        // Hello is the first message on the wire
        let hello: Hello = loop {
            match source.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    let envelope: Envelope = serde_json::from_str(&text)?;
                    if envelope.op == OP_HELLO {
                        break serde_json::from_value(envelope.d)?;
                    }
                    return Err(ObsError::Handshake(format!(
                        "expected Hello, got op {}",
                        envelope.op
                    )));
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Err(err.into()),
                None => return Err(ObsError::Closed),
            }
        };

        debug!(rpc_version = hello.rpc_version, "obs hello received");
        let authentication = match hello.authentication {
            Some(AuthChallenge { challenge, salt }) => {
                let Some(password) = password else {
                    return Err(ObsError::Handshake(
                        "obs requires authentication but no password is configured".into(),
                    ));
                };
                Some(protocol::auth_response(password, &salt, &challenge))
            }
            None => None,
        };

        let identify = Envelope {
            op: OP_IDENTIFY,
            d: serde_json::to_value(Identify { rpc_version: 1, authentication })?,
        };
        sink.send(WsMessage::Text(serde_json::to_string(&identify)?))
            .await?;

        // Wait for Identified before accepting requests
        loop {
            match source.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    let envelope: Envelope = serde_json::from_str(&text)?;
                    if envelope.op == OP_IDENTIFIED {
                        break;
                    }
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => return Err(err.into()),
                None => return Err(ObsError::Closed),
            }
        }
        info!(url = %url, "connected to obs");

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let (outbound, mut outbound_rx) = mpsc::channel::<WsMessage>(64);

        let driver_pending = Arc::clone(&pending);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    queued = outbound_rx.recv() => match queued {
                        Some(msg) => {
                            if let Err(err) = sink.send(msg).await {
                                warn!(error = %err, "obs send failed");
                                break;
                            }
                        }
                        None => break,
                    },
                    frame = source.next() => match frame {
                        Some(Ok(WsMessage::Text(text))) => route_frame(&text, &driver_pending),
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            warn!(error = %err, "obs read failed");
                            break;
                        }
                        None => break,
                    },
                }
            }
            // Wake every waiter with a closed channel
            driver_pending.lock().clear();
            info!("obs connection closed");
        });

        Ok(Self { outbound, pending })
    }

    /// Issue one request and wait for its response data.
    pub async fn request(
        &self,
        request_type: &str,
        request_data: Option<Value>,
    ) -> Result<Value, ObsError> {
        let request_id = Uuid::new_v4().to_string();
        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(request_id.clone(), tx);

        let envelope = Envelope {
            op: OP_REQUEST,
            d: serde_json::to_value(Request {
                request_type: request_type.to_string(),
                request_id: request_id.clone(),
                request_data,
            })?,
        };
        let frame = WsMessage::Text(serde_json::to_string(&envelope)?);
        if self.outbound.send(frame).await.is_err() {
            self.pending.lock().remove(&request_id);
            return Err(ObsError::Closed);
        }

        let response = rx.await.map_err(|_| ObsError::Closed)?;
        if !response.request_status.result {
            return Err(ObsError::Request {
                request: request_type.to_string(),
                code: response.request_status.code,
                comment: response.request_status.comment.unwrap_or_default(),
            });
        }
        Ok(response.response_data.unwrap_or(Value::Null))
    }

    async fn current_scene(&self) -> Result<String, ObsError> {
        let data = self.request("GetCurrentProgramScene", None).await?;
        data.get("currentProgramSceneName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ObsError::BadResponse("missing currentProgramSceneName".into()))
    }

    async fn scene_item_id(&self, scene: &str, source: &str) -> Result<i64, ObsError> {
        let data = self
            .request(
                "GetSceneItemId",
                Some(json!({"sceneName": scene, "sourceName": source})),
            )
            .await?;
        data.get("sceneItemId")
            .and_then(Value::as_i64)
            .ok_or_else(|| ObsError::BadResponse("missing sceneItemId".into()))
    }
}

fn route_frame(text: &str, pending: &PendingMap) {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(error = %err, "unparseable obs frame");
            return;
        }
    };
    if envelope.op != OP_REQUEST_RESPONSE {
        return;
    }
    let response: RequestResponse = match serde_json::from_value(envelope.d) {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "unparseable obs response");
            return;
        }
    };
    match pending.lock().remove(&response.request_id) {
        Some(waiter) => {
            // Receiver may have given up; nothing to do then
            let _ = waiter.send(response);
        }
        None => debug!(
            request_id = %response.request_id,
            request = %response.request_type,
            "orphan obs response"
        ),
    }
}

#[async_trait]
impl ObsControl for ObsClient {
    async fn set_scene(&self, scene: &str) -> Result<(), BackendError> {
        self.request("SetCurrentProgramScene", Some(json!({"sceneName": scene})))
            .await
            .map(|_| ())
            .map_err(|err| BackendError(err.to_string()))
    }

    async fn set_source_visible(
        &self,
        scene: Option<&str>,
        source: &str,
        visible: bool,
    ) -> Result<(), BackendError> {
        let scene = match scene {
            Some(scene) => scene.to_string(),
            None => self
                .current_scene()
                .await
                .map_err(|err| BackendError(err.to_string()))?,
        };
        let item_id = self
            .scene_item_id(&scene, source)
            .await
            .map_err(|err| BackendError(err.to_string()))?;
        self.request(
            "SetSceneItemEnabled",
            Some(json!({
                "sceneName": scene,
                "sceneItemId": item_id,
                "sceneItemEnabled": visible,
            })),
        )
        .await
        .map(|_| ())
        .map_err(|err| BackendError(err.to_string()))
    }
}
