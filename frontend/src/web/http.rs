//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现共享库中的 `HttpClient` 抽象。
//! 状态码不在这里解释：任何完成的响应都原样交给 `ApiClient`。

use aptportal_shared::{
    HttpClient, HttpRequest, HttpResponse, MultipartForm, PortalError, PortalResult, RequestBody,
};
use js_sys::{Array, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, FormData, Headers, Request, RequestInit, Response, UrlSearchParams};

/// 传输层错误
#[derive(Debug)]
enum FetchError {
    /// 请求构建失败
    RequestBuildFailed(String),
    /// 网络请求失败
    NetworkError(String),
    /// 响应读取失败
    ResponseReadFailed(String),
}

impl core::fmt::Display for FetchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FetchError::RequestBuildFailed(msg) => write!(f, "request build failed: {}", msg),
            FetchError::NetworkError(msg) => write!(f, "network error: {}", msg),
            FetchError::ResponseReadFailed(msg) => write!(f, "response read failed: {}", msg),
        }
    }
}

impl From<FetchError> for PortalError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::ResponseReadFailed(_) => PortalError::decode(e.to_string()),
            _ => PortalError::network(e.to_string()),
        }
    }
}

fn js_err(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

/// 把文件字节包装为 `Blob`
fn bytes_to_blob(bytes: &[u8], mime: &str) -> Result<Blob, FetchError> {
    let array = Uint8Array::from(bytes);
    let parts = Array::new();
    parts.push(&array);
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_buffer_source_sequence_and_options(&parts, &options)
        .map_err(|e| FetchError::RequestBuildFailed(format!("Blob: {}", js_err(e))))
}

fn multipart_body(form: &MultipartForm) -> Result<FormData, FetchError> {
    let data = FormData::new()
        .map_err(|e| FetchError::RequestBuildFailed(format!("FormData: {}", js_err(e))))?;
    for (name, value) in &form.fields {
        data.append_with_str(name, value)
            .map_err(|e| FetchError::RequestBuildFailed(js_err(e)))?;
    }
    for (name, file) in &form.files {
        let blob = bytes_to_blob(&file.bytes, &file.mime)?;
        data.append_with_blob_and_filename(name, &blob, &file.file_name)
            .map_err(|e| FetchError::RequestBuildFailed(js_err(e)))?;
    }
    Ok(data)
}

fn form_body(pairs: &[(String, String)]) -> Result<UrlSearchParams, FetchError> {
    let params = UrlSearchParams::new()
        .map_err(|e| FetchError::RequestBuildFailed(format!("UrlSearchParams: {}", js_err(e))))?;
    for (key, value) in pairs {
        params.append(key, value);
    }
    Ok(params)
}

/// 浏览器 `fetch` 传输
#[derive(Clone, Copy, Default)]
pub struct FetchHttpClient;

impl FetchHttpClient {
    async fn fetch(&self, req: HttpRequest) -> Result<HttpResponse, FetchError> {
        let headers = Headers::new()
            .map_err(|e| FetchError::RequestBuildFailed(format!("Headers: {}", js_err(e))))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| FetchError::RequestBuildFailed(js_err(e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());

        match &req.body {
            RequestBody::Empty => {}
            RequestBody::Json(text) => opts.set_body(&JsValue::from_str(text)),
            RequestBody::Form(pairs) => opts.set_body(&form_body(pairs)?.into()),
            // 浏览器会自动生成带 boundary 的 Content-Type
            RequestBody::Multipart(form) => opts.set_body(&multipart_body(form)?.into()),
        }

        let request = Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| FetchError::RequestBuildFailed(js_err(e)))?;

        let window = web_sys::window()
            .ok_or_else(|| FetchError::NetworkError("window is not available".to_string()))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| FetchError::NetworkError(js_err(e)))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| FetchError::ResponseReadFailed(format!("not a Response: {:?}", e)))?;

        let status = response.status();
        let promise = response
            .text()
            .map_err(|e| FetchError::ResponseReadFailed(js_err(e)))?;
        let body = JsFuture::from(promise)
            .await
            .map_err(|e| FetchError::ResponseReadFailed(js_err(e)))?
            .as_string()
            .unwrap_or_default();

        Ok(HttpResponse { status, body })
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> PortalResult<HttpResponse> {
        Ok(self.fetch(req).await?)
    }
}
