use serde::Deserialize;
use thiserror::Error;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误分类
///
/// 路由层的权限不匹配不属于错误，直接通过重定向处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalErrorKind {
    /// 网络/传输层失败（请求未能完成）
    Network,
    /// 服务端返回的非 2xx 响应
    Server,
    /// 客户端校验失败（证件号格式、必填字段、文件类型等），发生在任何网络请求之前
    Validation,
    /// 响应体无法解析为预期结构
    Decode,
}

impl PortalErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            PortalErrorKind::Network => "NETWORK_ERROR",
            PortalErrorKind::Server => "SERVER_ERROR",
            PortalErrorKind::Validation => "INVALID_INPUT",
            PortalErrorKind::Decode => "DECODE_ERROR",
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Error)]
#[error("[{}] {message}", .kind.error_code())]
pub struct PortalError {
    pub kind: PortalErrorKind,
    pub message: String,
    /// HTTP 状态码（仅服务端错误）
    pub status: Option<u16>,
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;

impl PortalError {
    pub fn new(kind: PortalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PortalErrorKind::Network, message)
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: PortalErrorKind::Server,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(PortalErrorKind::Validation, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(PortalErrorKind::Decode, message)
    }

    /// 由非 2xx 响应构造错误，优先使用响应体中的 `detail` / `message`
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = ServerErrorBody::parse(body)
            .and_then(|b| b.into_message())
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Self::server(status, message)
    }

    pub fn is_validation(&self) -> bool {
        self.kind == PortalErrorKind::Validation
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    /// 界面上显示的消息
    ///
    /// 服务端和校验错误直接展示其消息；网络与解析错误使用调用方提供的兜底文案。
    pub fn user_message(&self, fallback: &str) -> String {
        match self.kind {
            PortalErrorKind::Server | PortalErrorKind::Validation if !self.message.is_empty() => {
                self.message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(e: serde_json::Error) -> Self {
        PortalError::decode(e.to_string())
    }
}

// =========================================================
// 服务端错误响应体
// =========================================================

/// FastAPI 风格的错误体：`detail` 可能是字符串，也可能是字段错误数组
#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    #[serde(default)]
    detail: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Fields(Vec<FieldError>),
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct FieldError {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

impl FieldError {
    fn describe(&self) -> String {
        // loc 形如 ["body", "email"]，只保留最后一段字段名
        match self.loc.last() {
            Some(serde_json::Value::String(field)) => format!("{field}: {}", self.msg),
            Some(other) => format!("{other}: {}", self.msg),
            None => self.msg.clone(),
        }
    }
}

impl ServerErrorBody {
    fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    fn into_message(self) -> Option<String> {
        let detail = match self.detail {
            Some(ErrorDetail::Text(text)) if !text.trim().is_empty() => Some(text),
            Some(ErrorDetail::Fields(fields)) if !fields.is_empty() => Some(
                fields
                    .iter()
                    .map(FieldError::describe)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Some(ErrorDetail::Other(value)) if !value.is_null() => Some(value.to_string()),
            _ => None,
        };
        detail.or(self.message.filter(|m| !m.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_string_becomes_message() {
        let err = PortalError::from_response(400, r#"{"detail":"Room already booked"}"#);
        assert_eq!(err.kind, PortalErrorKind::Server);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.message, "Room already booked");
    }

    #[test]
    fn field_error_arrays_are_joined() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"field required","type":"value_error.missing"},
            {"loc":["body",0],"msg":"bad item","type":"x"}
        ]}"#;
        let err = PortalError::from_response(422, body);
        assert_eq!(err.message, "email: field required; 0: bad item");
    }

    #[test]
    fn message_field_and_fallbacks() {
        let err = PortalError::from_response(500, r#"{"message":"boom"}"#);
        assert_eq!(err.message, "boom");

        let err = PortalError::from_response(502, "<html>bad gateway</html>");
        assert_eq!(err.message, "Request failed with status 502");
        assert_eq!(err.user_message("fallback"), "Request failed with status 502");

        let err = PortalError::network("connection refused");
        assert_eq!(err.user_message("Could not reach server"), "Could not reach server");
    }

    #[test]
    fn display_includes_error_code() {
        let err = PortalError::validation("Passport number is invalid");
        assert_eq!(err.to_string(), "[INVALID_INPUT] Passport number is invalid");
        assert!(err.is_validation());
        assert!(PortalError::server(401, "expired").is_unauthorized());
    }
}
