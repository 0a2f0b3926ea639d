//! 认证模块
//!
//! 会话只在这里被修改：`SessionStore` 负责持久化，`RwSignal<Session>`
//! 负责驱动界面。路由服务通过注入的布局信号感知会话变化。

use crate::api::{PortalApi, portal_api};
use crate::web::LocalStorage;
use aptportal_shared::protocol::{LoginRequest, LoginResponse};
use aptportal_shared::{Layout, PortalResult, RestoreOutcome, Role, Session, SessionStore};
use leptos::logging::{log, warn};
use leptos::prelude::*;
use std::sync::Arc;

/// 认证上下文
///
/// `Copy`，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 当前会话（界面读取）
    pub session: RwSignal<Session>,
    store: StoredValue<SessionStore<LocalStorage>>,
    api: StoredValue<Arc<PortalApi>>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self {
            session: RwSignal::new(Session::default()),
            store: StoredValue::new(SessionStore::new(LocalStorage)),
            api: StoredValue::new(Arc::new(portal_api())),
        }
    }

    /// 布局信号（用于路由服务注入）
    pub fn layout_signal(&self) -> Signal<Layout> {
        let session = self.session;
        Signal::derive(move || session.with(Layout::from_session))
    }

    /// 共享的 API 客户端
    pub fn api(&self) -> Arc<PortalApi> {
        self.api.get_value()
    }

    /// 当前用户名（未登录时为空）
    pub fn user_name(&self) -> String {
        self.session.with_untracked(|s| {
            s.user
                .as_ref()
                .map(|u| u.user_name.clone())
                .unwrap_or_default()
        })
    }

    fn sync(&self) {
        let snapshot = self.store.with_value(|store| store.session().clone());
        self.session.set(snapshot);
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 页面加载时从 LocalStorage 恢复会话
pub fn init_auth(ctx: &AuthContext) {
    let outcome = ctx.store.try_update_value(|store| store.restore());
    match outcome {
        Some(RestoreOutcome::Restored) => log!("[Auth] Session restored."),
        Some(RestoreOutcome::Empty) | None => log!("[Auth] No saved session."),
        Some(RestoreOutcome::Corrupted(reason)) => {
            warn!("[Auth] Saved session is unreadable, starting signed out: {}", reason)
        }
    }
    ctx.sync();
}

/// 登录并保存会话，返回登录后的角色
pub async fn login(ctx: &AuthContext, username: String, password: String) -> PortalResult<Role> {
    let api = ctx.api();
    let req = LoginRequest {
        username: username.clone(),
        password,
    };
    let resp: LoginResponse = api.send(&req).await?;

    // 后端未返回用户名时使用登录名
    let name = if resp.user_name.trim().is_empty() {
        username.clone()
    } else {
        resp.user_name.clone()
    };
    let image = resp
        .profile_image
        .as_deref()
        .and_then(|raw| api.config().media_url(Some(raw)));

    let role = ctx
        .store
        .try_update_value(|store| {
            store
                .login(&resp.access_token, &resp.user_role, &name, &username, image)
                .role()
        })
        .flatten()
        .unwrap_or_default();
    ctx.sync();
    log!("[Auth] Signed in as {}.", role.as_str());
    Ok(role)
}

/// 注销并清除会话
///
/// 导航由路由服务的布局守卫自动处理。
pub fn logout(ctx: &AuthContext) {
    ctx.store.update_value(|store| store.logout());
    ctx.sync();
    log!("[Auth] Signed out.");
}

/// 个人资料修改成功后更新显示名与头像
pub fn update_user(ctx: &AuthContext, name: &str, image: Option<String>) {
    let updated = ctx
        .store
        .try_update_value(|store| store.update_user(name, image))
        .unwrap_or(false);
    if updated {
        ctx.sync();
    }
}
