//! Smart Apartment 门户的客户端核心
//!
//! 与浏览器无关的部分：领域模型、接口协议、API 客户端、会话、
//! 路由授权表，以及预订、日历、付款表单等页面规则。

pub mod account;
pub mod admin;
pub mod booking;
pub mod calendar;
pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod identity;
pub mod models;
pub mod payment;
pub mod protocol;
pub mod review;
pub mod route;
pub mod session;

pub use client::{ApiClient, HttpClient, HttpRequest, HttpResponse, TokenSource};
pub use config::ClientConfig;
pub use error::{PortalError, PortalErrorKind, PortalResult};
pub use models::*;
pub use protocol::{ApiRequest, HttpMethod, MultipartForm, RequestBody, UploadFile};
pub use route::{AppRoute, Layout, MenuItem, RouteDecision, authorize, menu_items};
pub use session::{KeyValueStorage, PersistedToken, RestoreOutcome, Session, SessionStore};
