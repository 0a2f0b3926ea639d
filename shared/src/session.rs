//! 会话存储
//!
//! 全应用唯一读写持久化存储的地方。浏览器中由 LocalStorage 承载，
//! 测试中使用 [`MemoryStorage`]。每次变更都同步写入 `user` 与 `token` 两个键。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::client::TokenSource;
use crate::models::{AuthUser, Role};

pub const USER_KEY: &str = "user";
pub const TOKEN_KEY: &str = "token";

/// 同步键值存储
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    /// 写入失败（配额、隐私模式）时返回 `false`
    fn set(&self, key: &str, value: &str) -> bool;
    fn delete(&self, key: &str) -> bool;
}

/// 内存存储，克隆后共享同一份数据（模拟页面刷新前后的同一个 LocalStorage）
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.items.borrow_mut().remove(key);
        true
    }
}

// =========================================================
// 会话状态
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: Option<AuthUser>,
    pub token: Option<String>,
    /// 启动时从存储恢复完成前为 `true`
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            user: None,
            token: None,
            loading: true,
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.user_role)
    }
}

/// 启动恢复结果
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreOutcome {
    Restored,
    /// 存储中没有完整会话
    Empty,
    /// 存储的数据无法解析，按未登录处理
    Corrupted(String),
}

// =========================================================
// 会话存储
// =========================================================

pub struct SessionStore<S> {
    storage: S,
    session: Session,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// 从持久化存储恢复会话
    ///
    /// 任何结果都会结束 loading 状态；损坏的数据不会作为错误向上传播。
    pub fn restore(&mut self) -> RestoreOutcome {
        self.session = Session {
            user: None,
            token: None,
            loading: false,
        };

        let (Some(raw_user), Some(token)) =
            (self.storage.get(USER_KEY), self.storage.get(TOKEN_KEY))
        else {
            return RestoreOutcome::Empty;
        };

        if token.trim().is_empty() {
            return RestoreOutcome::Empty;
        }

        match serde_json::from_str::<AuthUser>(&raw_user) {
            Ok(user) => {
                self.session.user = Some(user);
                self.session.token = Some(token);
                RestoreOutcome::Restored
            }
            Err(e) => RestoreOutcome::Corrupted(e.to_string()),
        }
    }

    /// 登录成功后写入会话
    ///
    /// `role` 为登录接口返回的原始字符串，空值按 `tenant` 处理。
    pub fn login(
        &mut self,
        token: &str,
        role: &str,
        name: &str,
        email: &str,
        profile_image: Option<String>,
    ) -> &Session {
        let user = AuthUser {
            user_name: name.to_string(),
            user_role: Role::from_login(role),
            email: email.to_string(),
            profile_image,
        };
        self.persist_user(&user);
        self.storage.set(TOKEN_KEY, token);

        self.session = Session {
            user: Some(user),
            token: Some(token.to_string()),
            loading: false,
        };
        &self.session
    }

    pub fn logout(&mut self) {
        self.storage.delete(USER_KEY);
        self.storage.delete(TOKEN_KEY);
        self.session = Session {
            user: None,
            token: None,
            loading: false,
        };
    }

    /// 修改个人资料后更新显示名与头像，令牌保持不变
    ///
    /// 未登录时不做任何事并返回 `false`。
    pub fn update_user(&mut self, new_name: &str, new_image: Option<String>) -> bool {
        let Some(mut user) = self.session.user.clone() else {
            return false;
        };
        user.user_name = new_name.to_string();
        if new_image.is_some() {
            user.profile_image = new_image;
        }
        self.persist_user(&user);
        self.session.user = Some(user);
        true
    }

    fn persist_user(&self, user: &AuthUser) {
        // AuthUser 只包含字符串与枚举，序列化不会失败
        if let Ok(json) = serde_json::to_string(user) {
            self.storage.set(USER_KEY, &json);
        }
    }
}

/// API 客户端使用的令牌来源：每次请求时直接读取持久化的 `token`
#[derive(Debug, Clone)]
pub struct PersistedToken<S> {
    storage: S,
}

impl<S: KeyValueStorage> PersistedToken<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}

impl<S: KeyValueStorage> TokenSource for PersistedToken<S> {
    fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_survives_reload() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());
        store.login("tok-1", "admin", "Somchai", "s@example.com", None);

        // 新的 store 模拟页面刷新
        let mut reloaded = SessionStore::new(storage);
        assert!(reloaded.session().loading);
        assert_eq!(reloaded.restore(), RestoreOutcome::Restored);

        let session = reloaded.session();
        assert!(!session.loading);
        assert!(session.is_authenticated());
        assert_eq!(session.token.as_deref(), Some("tok-1"));
        let user = session.user.as_ref().unwrap();
        assert_eq!(user.user_name, "Somchai");
        assert_eq!(user.user_role, Role::Admin);
        assert_eq!(user.email, "s@example.com");
    }

    #[test]
    fn logout_then_restore_is_empty() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());
        store.login("tok-1", "tenant", "Anna", "a@example.com", None);
        store.logout();
        assert!(!store.session().is_authenticated());

        let mut reloaded = SessionStore::new(storage.clone());
        assert_eq!(reloaded.restore(), RestoreOutcome::Empty);
        assert_eq!(reloaded.session().user, None);
        assert_eq!(reloaded.session().token, None);
        assert_eq!(PersistedToken::new(storage).token(), None);
    }

    #[test]
    fn corrupt_user_is_treated_as_logged_out() {
        let storage = MemoryStorage::new();
        storage.set(USER_KEY, "{not json");
        storage.set(TOKEN_KEY, "tok");

        let mut store = SessionStore::new(storage);
        assert!(matches!(store.restore(), RestoreOutcome::Corrupted(_)));
        assert!(!store.session().loading);
        assert!(!store.session().is_authenticated());
    }

    #[test]
    fn token_without_user_is_not_a_session() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "tok");
        let mut store = SessionStore::new(storage);
        assert_eq!(store.restore(), RestoreOutcome::Empty);
        assert!(!store.session().loading);
    }

    #[test]
    fn blank_role_defaults_to_tenant() {
        let mut store = SessionStore::new(MemoryStorage::new());
        let session = store.login("tok", "", "Anna", "a@example.com", None);
        assert_eq!(session.role(), Some(Role::Tenant));
    }

    #[test]
    fn update_user_keeps_token_and_persists() {
        let storage = MemoryStorage::new();
        let mut store = SessionStore::new(storage.clone());
        assert!(!store.update_user("Nobody", None));

        store.login("tok", "tenant", "Anna", "a@example.com", Some("/media/a.png".into()));
        assert!(store.update_user("Anna K", None));
        assert_eq!(
            store.session().user.as_ref().unwrap().profile_image.as_deref(),
            Some("/media/a.png")
        );
        assert!(store.update_user("Anna K", Some("/media/b.png".into())));

        let mut reloaded = SessionStore::new(storage.clone());
        reloaded.restore();
        let user = reloaded.session().user.clone().unwrap();
        assert_eq!(user.user_name, "Anna K");
        assert_eq!(user.profile_image.as_deref(), Some("/media/b.png"));
        assert_eq!(PersistedToken::new(storage).token().as_deref(), Some("tok"));
    }
}
