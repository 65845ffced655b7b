// ==========================================
// 脚本化 HTTP 传输
// ==========================================
// 职责: 按 (方法, 路径) 回放预置响应，记录所有请求
// 每条路由的队列按顺序消费，最后一项重复使用
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use plant_care_client::api::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// 预置应答
#[derive(Debug, Clone)]
pub enum Reply {
    /// 返回响应（任意状态码）
    Respond(HttpResponse),
    /// 网络层失败
    Fail(String),
    /// 永不返回，直到请求被取消
    Stall,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Reply::Respond(HttpResponse::new(status, body.to_string()))
    }

    pub fn text(status: u16, body: &str) -> Self {
        Reply::Respond(HttpResponse::new(status, body))
    }
}

pub struct MockTransport {
    base_url: String,
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<Reply>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(base_url: &str) -> Arc<Self> {
        Arc::new(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            routes: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// 为路由追加一条应答
    pub fn on(&self, method: HttpMethod, path: &str, reply: Reply) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn on_json(&self, method: HttpMethod, path: &str, status: u16, body: Value) -> &Self {
        self.on(method, path, Reply::json(status, body))
    }

    /// 已记录的全部请求（按发送顺序）
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 命中某路由的请求
    pub fn requests_to(&self, method: HttpMethod, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && self.path_of(&r.url) == path)
            .collect()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests_to(method, path).len()
    }

    /// 最后一个请求体（JSON）
    pub fn last_body(&self, method: HttpMethod, path: &str) -> Option<Value> {
        self.requests_to(method, path)
            .last()
            .and_then(|r| r.body.as_deref())
            .and_then(|b| serde_json::from_str(b).ok())
    }

    fn path_of(&self, url: &str) -> String {
        let rest = url.strip_prefix(&self.base_url).unwrap_or(url);
        rest.split('?').next().unwrap_or("").to_string()
    }

    fn next_reply(&self, method: HttpMethod, path: &str) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap();
        let queue = routes.get_mut(&(method, path.to_string()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = self.path_of(&request.url);
        let method = request.method;
        self.requests.lock().unwrap().push(request);

        match self.next_reply(method, &path) {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(detail)) => Err(TransportError::Network(detail)),
            Some(Reply::Stall) => std::future::pending().await,
            None => Ok(HttpResponse::new(
                404,
                format!(r#"{{"detail":"no route for {} {}"}}"#, method, path),
            )),
        }
    }
}
