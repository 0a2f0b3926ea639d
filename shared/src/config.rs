//! 客户端配置
//!
//! 后端地址在构建时确定：优先读取编译期环境变量，没有定义则使用默认值。

/// 这些是默认值，如果构建时没有设置对应的环境变量，则使用这些值
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

const API_BASE_VAR: Option<&str> = option_env!("APTPORTAL_API_BASE");
const MEDIA_BASE_VAR: Option<&str> = option_env!("APTPORTAL_MEDIA_BASE");

/// 客户端配置结构体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST API 根地址
    pub api_base_url: String,
    /// 上传文件（证件照、合同 PDF、房间图片）的访问根地址，通常与 API 相同
    pub media_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        let api_base_url = trim_base(&api_base_url.into());
        Self {
            media_base_url: api_base_url.clone(),
            api_base_url,
        }
    }

    /// 按 "变量或默认值" 规则构建
    pub fn from_build_env() -> Self {
        let mut config = Self::new(API_BASE_VAR.unwrap_or(DEFAULT_API_BASE));
        if let Some(media) = MEDIA_BASE_VAR {
            config.media_base_url = trim_base(media);
        }
        config
    }

    /// 将后端返回的相对路径（如 `/media/rooms/a.jpg` 或 `media/...`）转换为完整 URL
    ///
    /// 已经是完整 URL 的值原样返回；空值返回 `None`。
    pub fn media_url(&self, raw: Option<&str>) -> Option<String> {
        let path = raw?.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        if path.starts_with('/') {
            Some(format!("{}{}", self.media_base_url, path))
        } else {
            Some(format!("{}/{}", self.media_base_url, path))
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_urls_are_made_absolute() {
        let config = ClientConfig::new("http://127.0.0.1:8000/");
        assert_eq!(
            config.media_url(Some("/media/a.jpg")).as_deref(),
            Some("http://127.0.0.1:8000/media/a.jpg")
        );
        assert_eq!(
            config.media_url(Some("media/a.jpg")).as_deref(),
            Some("http://127.0.0.1:8000/media/a.jpg")
        );
        assert_eq!(
            config.media_url(Some("https://cdn.example.com/a.jpg")).as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(config.media_url(Some("  ")), None);
        assert_eq!(config.media_url(None), None);
    }
}
