use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{PortalError, PortalResult};
use crate::protocol::{ApiRequest, HttpMethod, RequestBody};

#[cfg(test)]
use std::cell::RefCell;

#[cfg(test)]
mod tests;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        if let Some(content_type) = body.content_type() {
            self = self.with_header("Content-Type", content_type);
        }
        self.body = body;
        self
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析响应体，空响应体按 JSON `null` 处理
    pub fn json<T: DeserializeOwned>(&self) -> PortalResult<T> {
        let text = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(text).map_err(|e| PortalError::decode(e.to_string()))
    }
}

/// 传输层：浏览器中是 `fetch`，测试中是 `MockHttpClient`
///
/// 网络层失败（请求未能完成）返回 `PortalErrorKind::Network`，
/// 任何 HTTP 状态码都作为 `Ok(HttpResponse)` 返回。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> PortalResult<HttpResponse>;
}

#[async_trait::async_trait(?Send)]
impl<H: HttpClient> HttpClient for std::rc::Rc<H> {
    async fn send(&self, req: HttpRequest) -> PortalResult<HttpResponse> {
        (**self).send(req).await
    }
}

/// 当前访问令牌的来源
pub trait TokenSource {
    fn token(&self) -> Option<String>;
}

/// 固定令牌（或无令牌），主要用于测试
impl TokenSource for Option<String> {
    fn token(&self) -> Option<String> {
        self.clone()
    }
}

// =========================================================
// API 客户端
// =========================================================

/// 所有后端请求的唯一出口
///
/// 每次发送时从 `TokenSource` 读取令牌，存在即附加 `Authorization: Bearer` 头。
/// 不做重试、缓存或熔断。
pub struct ApiClient<C, T> {
    config: ClientConfig,
    http: C,
    tokens: T,
}

impl<C: HttpClient, T: TokenSource> ApiClient<C, T> {
    pub fn new(config: ClientConfig, http: C, tokens: T) -> Self {
        Self {
            config,
            http,
            tokens,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.config.api_base_url, path)
        } else {
            format!("{}/{}", self.config.api_base_url, path)
        }
    }

    /// 构造 HTTP 请求（不发送）
    pub fn build<R: ApiRequest>(&self, req: &R) -> PortalResult<HttpRequest> {
        let mut http_req = HttpRequest::new(&self.url(&req.path()), R::METHOD)
            .with_header("Accept", "application/json")
            .with_body(req.body()?);

        if let Some(token) = self.tokens.token().filter(|t| !t.is_empty()) {
            http_req = http_req.with_header("Authorization", &format!("Bearer {}", token));
        }
        Ok(http_req)
    }

    pub async fn send<R: ApiRequest>(&self, req: &R) -> PortalResult<R::Response> {
        let http_req = self.build(req)?;
        let resp = self.http.send(http_req).await?;
        if !resp.is_success() {
            return Err(PortalError::from_response(resp.status, &resp.body));
        }
        resp.json()
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub struct MockHttpClient {
    // (Method URL, (Status, Response Body))
    responses: RefCell<HashMap<String, (u16, String)>>,
    // 记录发出的请求
    pub requests: RefCell<Vec<HttpRequest>>,
    // 模拟网络失败
    pub offline: std::cell::Cell<bool>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            offline: std::cell::Cell::new(false),
        }
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .insert(Self::key(method, url), (status, body.to_string()));
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> PortalResult<HttpResponse> {
        self.requests.borrow_mut().push(req.clone());
        if self.offline.get() {
            return Err(PortalError::network("Failed to fetch"));
        }

        let responses = self.responses.borrow();
        match responses.get(&Self::key(req.method, &req.url)) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: r#"{"detail":"Not Found"}"#.to_string(),
            }),
        }
    }
}
