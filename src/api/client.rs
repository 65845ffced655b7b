// ==========================================
// 植物养护记录系统 - API 客户端
// ==========================================
// 职责: 拼接 URL、合并请求头、序列化请求体、GET 重试与错误归一化
// 约定:
// - GET 默认最多 3 次，退避 [0, 200, 500] ms；非 GET 仅 1 次
// - 只重试网络层失败；HTTP 非 2xx 从不重试
// - 取消信号立即透传，不重试、不包装
// ==========================================

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::api::abort::AbortSignal;
use crate::api::error::{extract_detail, ApiError, ApiResult};
use crate::api::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError,
};
use crate::config::ClientConfig;

// ==========================================
// RetryPolicy - 重试策略
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// GET 默认总尝试次数
    pub get_attempts: u32,
    /// 第 i 次尝试前的等待（毫秒），超出长度取最后一项
    pub backoff_ms: Vec<u64>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            get_attempts: 3,
            backoff_ms: vec![0, 200, 500],
        }
    }
}

impl RetryPolicy {
    /// 无等待的策略（测试用）
    pub fn without_delays(get_attempts: u32) -> Self {
        Self {
            get_attempts,
            backoff_ms: vec![0],
        }
    }

    /// 计算总尝试次数
    ///
    /// - 非 GET: 1
    /// - GET + 显式 retry: retry + 1
    /// - GET: get_attempts
    pub fn attempts_for(&self, method: HttpMethod, explicit_retry: Option<u32>) -> u32 {
        if method != HttpMethod::Get {
            return 1;
        }
        explicit_retry
            .map(|r| r.saturating_add(1))
            .unwrap_or(self.get_attempts)
            .max(1)
    }

    /// 第 attempt 次（从 0 计）尝试前的等待
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if self.backoff_ms.is_empty() {
            return Duration::ZERO;
        }
        let idx = (attempt as usize).min(self.backoff_ms.len() - 1);
        Duration::from_millis(self.backoff_ms[idx])
    }
}

// ==========================================
// 请求选项与请求/响应体
// ==========================================

/// 请求体
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// 自动序列化为 JSON 并设置 content-type
    Json(Value),
    /// 原样发送
    Text(String),
}

/// 请求选项
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub signal: Option<AbortSignal>,
    /// 显式重试次数（总次数 = retry + 1，仅 GET 生效）
    pub retry: Option<u32>,
}

impl RequestOptions {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidInput(format!("请求体序列化失败: {}", e)))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn signal(mut self, signal: Option<AbortSignal>) -> Self {
        self.signal = signal;
        self
    }

    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = Some(retry);
        self
    }
}

/// 已解析的响应体
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// JSON 优先，失败回退为文本，空体为 Empty
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return ResponseBody::Empty;
        }
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw.to_string()),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Empty => Value::Null,
            ResponseBody::Json(v) => v,
            ResponseBody::Text(t) => Value::String(t),
        }
    }
}

// ==========================================
// ApiClient
// ==========================================
pub struct ApiClient {
    base_url: String,
    default_headers: Vec<(String, String)>,
    retry: RetryPolicy,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// 使用 reqwest 传输创建客户端
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        let transport = ReqwestTransport::new(config.timeout())
            .map_err(|e| ApiError::Other(anyhow::anyhow!(e.to_string())))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// 使用自定义传输创建客户端
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_headers: config
                .headers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            retry: config.retry.clone(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// 拼接完整 URL（含查询参数）
    pub fn url(&self, path: &str, query: &[(String, String)]) -> ApiResult<String> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let raw = format!("{}{}", self.base_url, path);

        if query.is_empty() {
            return Ok(raw);
        }

        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| ApiError::InvalidInput(format!("URL 无效 ({}): {}", raw, e)))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url.to_string())
    }

    /// 合并请求头: 默认 < 配置 < 单次请求，键不区分大小写
    fn merge_headers(&self, options: &RequestOptions) -> Vec<(String, String)> {
        let mut merged: BTreeMap<String, String> = BTreeMap::new();
        merged.insert("accept".to_string(), "application/json".to_string());

        if matches!(options.body, Some(RequestBody::Json(_))) {
            merged.insert("content-type".to_string(), "application/json".to_string());
        }

        for (k, v) in self.default_headers.iter().chain(options.headers.iter()) {
            merged.insert(k.trim().to_ascii_lowercase(), v.clone());
        }

        merged.into_iter().collect()
    }

    /// 发送请求
    ///
    /// # 返回
    /// - Ok(ResponseBody): 2xx 响应的解析结果
    /// - Err(ApiError::Http): 非 2xx（不重试）
    /// - Err(ApiError::Network): 网络失败且重试耗尽
    /// - Err(ApiError::Aborted): 被取消
    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<ResponseBody> {
        let url = self.url(path, &options.query)?;
        let body = match &options.body {
            None => None,
            Some(RequestBody::Json(v)) => Some(v.to_string()),
            Some(RequestBody::Text(t)) => Some(t.clone()),
        };
        let request = HttpRequest {
            method: options.method,
            url,
            headers: self.merge_headers(&options),
            body,
        };
        let signal = options.signal.as_ref();
        let attempts = self.retry.attempts_for(options.method, options.retry);

        let mut last_failure = String::new();
        for attempt in 0..attempts {
            if signal.map_or(false, |s| s.is_aborted()) {
                return Err(ApiError::Aborted);
            }

            let delay = self.retry.delay_before(attempt);
            if !delay.is_zero() {
                sleep_or_abort(delay, signal).await?;
            }

            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                attempts,
                "发送请求"
            );

            match send_or_abort(self.transport.as_ref(), request.clone(), signal).await {
                Ok(response) => return finish(response),
                Err(TransportError::Aborted) => return Err(ApiError::Aborted),
                Err(TransportError::Network(detail)) => {
                    if attempt + 1 < attempts {
                        tracing::warn!(
                            method = %request.method,
                            url = %request.url,
                            attempt = attempt + 1,
                            "网络失败，准备重试: {}",
                            detail
                        );
                    }
                    last_failure = detail;
                }
            }
        }

        Err(ApiError::Network {
            detail: last_failure,
        })
    }

    // ==========================================
    // 便捷方法
    // ==========================================

    pub async fn get(&self, path: &str, options: RequestOptions) -> ApiResult<ResponseBody> {
        self.request(path, RequestOptions { method: HttpMethod::Get, ..options })
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<ResponseBody> {
        let options = RequestOptions { method: HttpMethod::Post, ..options }.json(body)?;
        self.request(path, options).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<ResponseBody> {
        let options = RequestOptions { method: HttpMethod::Put, ..options }.json(body)?;
        self.request(path, options).await
    }

    pub async fn delete(&self, path: &str, options: RequestOptions) -> ApiResult<ResponseBody> {
        self.request(path, RequestOptions { method: HttpMethod::Delete, ..options })
            .await
    }

    // ==========================================
    // 类型化便捷方法
    // ==========================================

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        decode(self.get(path, options).await?)
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<T> {
        decode(self.post(path, body, options).await?)
    }

    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<T> {
        decode(self.put(path, body, options).await?)
    }

    pub async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        decode(self.delete(path, options).await?)
    }
}

/// 非 2xx 归一化为 ApiError::Http
fn finish(response: HttpResponse) -> ApiResult<ResponseBody> {
    let body = ResponseBody::parse(&response.body);
    if response.is_success() {
        return Ok(body);
    }

    let value = body.into_value();
    Err(ApiError::Http {
        status: response.status,
        detail: extract_detail(response.status, &value),
        body: value,
    })
}

/// 将响应体解码为 DTO
pub fn decode<T: DeserializeOwned>(body: ResponseBody) -> ApiResult<T> {
    serde_json::from_value(body.into_value()).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn send_or_abort(
    transport: &dyn HttpTransport,
    request: HttpRequest,
    signal: Option<&AbortSignal>,
) -> Result<HttpResponse, TransportError> {
    match signal {
        None => transport.send(request).await,
        Some(signal) => {
            tokio::select! {
                biased;
                _ = signal.aborted() => Err(TransportError::Aborted),
                result = transport.send(request) => result,
            }
        }
    }
}

async fn sleep_or_abort(delay: Duration, signal: Option<&AbortSignal>) -> ApiResult<()> {
    match signal {
        None => {
            tokio::time::sleep(delay).await;
            Ok(())
        }
        Some(signal) => {
            tokio::select! {
                biased;
                _ = signal.aborted() => Err(ApiError::Aborted),
                _ = tokio::time::sleep(delay) => Ok(()),
            }
        }
    }
}
