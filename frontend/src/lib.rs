//! Somkid Apartment 门户前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `aptportal_shared::route`: 路由与授权表（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `auth`: 会话状态管理
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod announcements;
    mod booking_modal;
    pub mod calendar;
    mod clock;
    mod confirm;
    pub mod dashboard;
    pub mod finances;
    pub mod forgot_password;
    pub mod home;
    mod icons;
    pub mod layout;
    pub mod login;
    pub mod meters;
    pub mod my_room;
    mod notice;
    mod notification_bell;
    pub mod payments;
    pub mod profile;
    pub mod register;
    pub mod rooms;
    pub mod tenants;
}

use crate::auth::{AuthContext, init_auth};
use crate::components::announcements::{AdminAnnouncementsPage, TenantAnnouncementsPage};
use crate::components::calendar::{AdminCalendarPage, TenantCalendarPage};
use crate::components::dashboard::DashboardPage;
use crate::components::finances::AdminFinancesPage;
use crate::components::forgot_password::ForgotPasswordPage;
use crate::components::home::HomePage;
use crate::components::layout::{GuestShell, PortalShell};
use crate::components::login::LoginPage;
use crate::components::meters::AdminMetersPage;
use crate::components::my_room::MyRoomPage;
use crate::components::payments::PaymentsPage;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;
use crate::components::rooms::AdminRoomsPage;
use crate::components::tenants::AdminTenantsPage;

use aptportal_shared::{AppRoute, Layout};
use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，替代 gloo-* 系列 crate，
// 以减小 WASM 二进制体积。
pub(crate) mod web {
    mod http;
    pub mod media;
    pub mod router;
    mod storage;
    mod timer;

    pub use http::FetchHttpClient;
    pub use storage::LocalStorage;
    pub use timer::Interval;
}

use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。授权已由路由服务完成。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::ForgotPassword => view! { <ForgotPasswordPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::MyRoom => view! { <MyRoomPage /> }.into_any(),
        AppRoute::Payments => view! { <PaymentsPage /> }.into_any(),
        AppRoute::TenantAnnouncements => view! { <TenantAnnouncementsPage /> }.into_any(),
        AppRoute::TenantCalendar => view! { <TenantCalendarPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::AdminRooms => view! { <AdminRoomsPage /> }.into_any(),
        AppRoute::AdminTenants => view! { <AdminTenantsPage /> }.into_any(),
        AppRoute::AdminTenantFinances => view! { <AdminFinancesPage /> }.into_any(),
        AppRoute::AdminMeters => view! { <AdminMetersPage /> }.into_any(),
        AppRoute::AdminCalendar => view! { <AdminCalendarPage /> }.into_any(),
        AppRoute::AdminAnnouncements => view! { <AdminAnnouncementsPage /> }.into_any(),
        // 未知路径在任何布局下都会被守卫重定向到落地页
        AppRoute::NotFound => ().into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 2. 从 LocalStorage 恢复会话
    init_auth(&auth_ctx);

    // 3. 布局信号注入路由服务，守卫据此授权
    let layout = auth_ctx.layout_signal();

    view! {
        <Router layout=layout>
            {move || match layout.get() {
                Layout::Guest => view! {
                    <GuestShell>
                        <RouterOutlet matcher=route_matcher />
                    </GuestShell>
                }
                .into_any(),
                portal => view! {
                    <PortalShell layout=portal>
                        <RouterOutlet matcher=route_matcher />
                    </PortalShell>
                }
                .into_any(),
            }}
        </Router>
    }
}
