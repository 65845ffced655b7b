// ==========================================
// 植物养护记录系统 - HTTP 传输层
// ==========================================
// 职责: 定义传输接口（不含重试/错误归一化）
// 实现者: ReqwestTransport（生产）；测试使用脚本化传输
// ==========================================

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次发送的请求
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    /// 已合并、键为小写
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// 原始响应
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 传输层错误（只区分网络失败与取消）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("请求已取消")]
    Aborted,
}

// ==========================================
// HttpTransport Trait
// ==========================================
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发送一次请求；非 2xx 也返回 Ok（由客户端归一化）
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

// ==========================================
// ReqwestTransport - 基于 reqwest 的实现
// ==========================================
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 创建传输实例
    ///
    /// # 参数
    /// - timeout: 单次请求超时
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("PlantCare/{}", crate::VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self { client })
    }

    fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("读取响应失败: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}
