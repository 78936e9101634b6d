//! ScriptedClient - 決め打ち応答のインメモリ推論クライアント
//!
//! テストとオフライン実行で使います。応答（またはエラー）は FIFO 順に返し、
//! キューが空になったら繰り返し応答を使います。それも無ければ
//! 以降の呼び出しはすべて失敗します。

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::TransportError;
use crate::ports::{InferenceClient, InferenceRequest};

type Responder = dyn Fn(&InferenceRequest) -> Result<String, TransportError> + Send + Sync;

/// ネットワークに触れない決定的な `InferenceClient`
///
/// # Thread Safety
/// - 内部状態は `tokio::sync::Mutex` と atomic で保護（両席から同時に呼べる）
#[derive(Default)]
pub struct ScriptedClient {
    queue: Mutex<VecDeque<Result<String, TransportError>>>,
    repeat: Option<String>,
    responder: Option<Arc<Responder>>,
    latency: Duration,
    calls: AtomicUsize,
    requests: Mutex<Vec<InferenceRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// どのリクエストにも `reply` を返すクライアント
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            repeat: Some(reply.into()),
            ..Self::default()
        }
    }

    /// リクエストから応答を計算するクライアント
    ///
    /// 繰り返し応答より優先されるが、キュー済みのエントリよりは後
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&InferenceRequest) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Arc::new(responder)),
            ..Self::default()
        }
    }

    /// 成功応答をキューに積む（チェーン可能）
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.queue.get_mut().push_back(Ok(reply.into()));
        self
    }

    /// エラーをキューに積む（チェーン可能）
    pub fn with_error(mut self, error: TransportError) -> Self {
        self.queue.get_mut().push_back(Err(error));
        self
    }

    /// 各呼び出しで応答前にこの時間だけ待つ
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// これまでに受けた `complete` 呼び出しの回数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// これまでに受けたリクエスト（受信順）
    pub async fn requests(&self) -> Vec<InferenceRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn complete(&self, request: &InferenceRequest) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(request.clone());

        let queued = self.queue.lock().await.pop_front();

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(entry) = queued {
            return entry;
        }
        if let Some(responder) = &self.responder {
            return responder(request);
        }
        match &self.repeat {
            Some(reply) => Ok(reply.clone()),
            None => Err(TransportError::Request(
                "scripted client has no queued replies".to_string(),
            )),
        }
    }
}
