//! 前端使用的 API 客户端
//!
//! 共享库的 `ApiClient` 装配上浏览器 `fetch` 与 LocalStorage 中的令牌。

use crate::auth::use_auth;
use crate::web::{FetchHttpClient, LocalStorage};
use aptportal_shared::{ApiClient, ClientConfig, PersistedToken};
use std::sync::Arc;

pub type PortalApi = ApiClient<FetchHttpClient, PersistedToken<LocalStorage>>;

/// 按构建期配置创建客户端
pub fn portal_api() -> PortalApi {
    ApiClient::new(
        ClientConfig::from_build_env(),
        FetchHttpClient,
        PersistedToken::new(LocalStorage),
    )
}

/// 从认证上下文取得客户端
pub fn use_api() -> Arc<PortalApi> {
    use_auth().api()
}

/// 服务器返回的相对媒体路径转为绝对地址
pub fn media_url(api: &PortalApi, raw: Option<&str>) -> Option<String> {
    api.config().media_url(raw)
}
