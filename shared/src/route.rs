//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由，以及 "布局 × 路由" 的授权表。

use std::fmt::Display;

use crate::models::Role;
use crate::session::Session;

/// 应用路由枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AppRoute {
    /// 公共首页 (默认路由)
    #[default]
    Home,
    Login,
    Register,
    ForgotPassword,
    Profile,

    // --- 租户 ---
    MyRoom,
    Payments,
    TenantAnnouncements,
    TenantCalendar,

    // --- 管理员 ---
    Dashboard,
    AdminRooms,
    AdminTenants,
    AdminTenantFinances,
    AdminMeters,
    AdminCalendar,
    AdminAnnouncements,

    /// 页面未找到
    NotFound,
}

impl AppRoute {
    pub const ALL: [AppRoute; 17] = [
        AppRoute::Home,
        AppRoute::Login,
        AppRoute::Register,
        AppRoute::ForgotPassword,
        AppRoute::Profile,
        AppRoute::MyRoom,
        AppRoute::Payments,
        AppRoute::TenantAnnouncements,
        AppRoute::TenantCalendar,
        AppRoute::Dashboard,
        AppRoute::AdminRooms,
        AppRoute::AdminTenants,
        AppRoute::AdminTenantFinances,
        AppRoute::AdminMeters,
        AppRoute::AdminCalendar,
        AppRoute::AdminAnnouncements,
        AppRoute::NotFound,
    ];

    /// 将 URL path 解析为路由枚举（忽略查询串与末尾斜杠）
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match path {
            "/" => Self::Home,
            "/login" => Self::Login,
            "/register" => Self::Register,
            "/forgot-password" => Self::ForgotPassword,
            "/profile" => Self::Profile,
            "/my-room" => Self::MyRoom,
            "/payments" => Self::Payments,
            "/tenant/announcements" => Self::TenantAnnouncements,
            "/tenant/calendar" => Self::TenantCalendar,
            "/dashboard" => Self::Dashboard,
            "/admin/rooms" => Self::AdminRooms,
            "/admin/tenants" => Self::AdminTenants,
            "/admin/tenant-finances" => Self::AdminTenantFinances,
            "/admin/meters" => Self::AdminMeters,
            "/admin/calendar" => Self::AdminCalendar,
            "/admin/announcements" => Self::AdminAnnouncements,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::ForgotPassword => "/forgot-password",
            Self::Profile => "/profile",
            Self::MyRoom => "/my-room",
            Self::Payments => "/payments",
            Self::TenantAnnouncements => "/tenant/announcements",
            Self::TenantCalendar => "/tenant/calendar",
            Self::Dashboard => "/dashboard",
            Self::AdminRooms => "/admin/rooms",
            Self::AdminTenants => "/admin/tenants",
            Self::AdminTenantFinances => "/admin/tenant-finances",
            Self::AdminMeters => "/admin/meters",
            Self::AdminCalendar => "/admin/calendar",
            Self::AdminAnnouncements => "/admin/announcements",
            Self::NotFound => "/404",
        }
    }

    pub fn is_admin_route(&self) -> bool {
        matches!(
            self,
            Self::Dashboard
                | Self::AdminRooms
                | Self::AdminTenants
                | Self::AdminTenantFinances
                | Self::AdminMeters
                | Self::AdminCalendar
                | Self::AdminAnnouncements
        )
    }

    pub fn is_tenant_route(&self) -> bool {
        matches!(
            self,
            Self::MyRoom | Self::Payments | Self::TenantAnnouncements | Self::TenantCalendar
        )
    }

    /// 未登录即可访问的页面
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Self::Home | Self::Login | Self::Register | Self::ForgotPassword
        )
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

// =========================================================
// 布局与授权
// =========================================================

/// 页面外壳：访客顶部导航 / 租户侧边栏 / 管理员侧边栏
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Guest,
    Tenant,
    Admin,
}

impl Layout {
    /// 已登录但角色为 `guest` 的用户同样使用访客布局
    pub fn from_session(session: &Session) -> Self {
        if !session.is_authenticated() {
            return Layout::Guest;
        }
        match session.role() {
            Some(Role::Admin) => Layout::Admin,
            Some(Role::Tenant) => Layout::Tenant,
            _ => Layout::Guest,
        }
    }

    /// 该布局的落地页
    pub fn home(&self) -> AppRoute {
        match self {
            Layout::Guest => AppRoute::Home,
            Layout::Tenant => AppRoute::MyRoom,
            Layout::Admin => AppRoute::Dashboard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(AppRoute),
    /// 跳转到目标路由（使用 replaceState）
    Redirect(AppRoute),
}

impl RouteDecision {
    /// 最终要渲染的路由
    pub fn target(&self) -> AppRoute {
        match self {
            RouteDecision::Render(r) | RouteDecision::Redirect(r) => *r,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, RouteDecision::Redirect(_))
    }
}

/// **核心守卫逻辑：布局 × 路由 → 渲染或重定向**
///
/// 纯函数，只依赖布局与路由。
pub fn authorize(layout: Layout, route: AppRoute) -> RouteDecision {
    let allowed = match layout {
        Layout::Guest => route.is_public(),
        Layout::Tenant => route.is_tenant_route() || route == AppRoute::Profile,
        // 管理员通过注册页添加租户
        Layout::Admin => {
            route.is_admin_route() || matches!(route, AppRoute::Profile | AppRoute::Register)
        }
    };

    if allowed {
        RouteDecision::Render(route)
    } else {
        RouteDecision::Redirect(layout.home())
    }
}

/// 侧边栏 / 导航栏条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub route: AppRoute,
    pub label: &'static str,
}

const fn item(route: AppRoute, label: &'static str) -> MenuItem {
    MenuItem { route, label }
}

const GUEST_MENU: &[MenuItem] = &[
    item(AppRoute::Home, "Rooms"),
    item(AppRoute::Login, "Sign in"),
    item(AppRoute::Register, "Register"),
];

const TENANT_MENU: &[MenuItem] = &[
    item(AppRoute::MyRoom, "My room"),
    item(AppRoute::Payments, "Payments"),
    item(AppRoute::TenantAnnouncements, "Announcements"),
    item(AppRoute::TenantCalendar, "Calendar"),
    item(AppRoute::Profile, "Profile"),
];

const ADMIN_MENU: &[MenuItem] = &[
    item(AppRoute::Dashboard, "Dashboard"),
    item(AppRoute::AdminRooms, "Rooms"),
    item(AppRoute::AdminTenants, "Tenants"),
    item(AppRoute::AdminTenantFinances, "Tenant finances"),
    item(AppRoute::AdminMeters, "Meters"),
    item(AppRoute::AdminCalendar, "Calendar"),
    item(AppRoute::AdminAnnouncements, "Announcements"),
    item(AppRoute::Register, "Add tenant"),
    item(AppRoute::Profile, "Profile"),
];

pub fn menu_items(layout: Layout) -> &'static [MenuItem] {
    match layout {
        Layout::Guest => GUEST_MENU,
        Layout::Tenant => TENANT_MENU,
        Layout::Admin => ADMIN_MENU,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthUser;

    fn decide(layout: Layout, path: &str) -> RouteDecision {
        authorize(layout, AppRoute::from_path(path))
    }

    fn session(role: Role) -> Session {
        Session {
            user: Some(AuthUser {
                user_name: "u".into(),
                user_role: role,
                email: "u@example.com".into(),
                profile_image: None,
            }),
            token: Some("tok".into()),
            loading: false,
        }
    }

    #[test]
    fn paths_round_trip() {
        for route in AppRoute::ALL {
            if route != AppRoute::NotFound {
                assert_eq!(AppRoute::from_path(route.to_path()), route);
            }
        }
        assert_eq!(AppRoute::from_path("/admin/rooms/"), AppRoute::AdminRooms);
        assert_eq!(AppRoute::from_path("/payments?tab=slip"), AppRoute::Payments);
        assert_eq!(AppRoute::from_path("/nowhere"), AppRoute::NotFound);
    }

    #[test]
    fn unknown_paths_never_render() {
        for layout in [Layout::Guest, Layout::Tenant, Layout::Admin] {
            assert_eq!(
                decide(layout, "/nowhere"),
                RouteDecision::Redirect(layout.home()),
                "{layout:?}"
            );
            assert_ne!(authorize(layout, AppRoute::NotFound).target(), AppRoute::NotFound);
        }
    }

    #[test]
    fn guest_redirects_to_home() {
        assert_eq!(
            decide(Layout::Guest, "/dashboard"),
            RouteDecision::Redirect(AppRoute::Home)
        );
        assert_eq!(
            decide(Layout::Guest, "/my-room"),
            RouteDecision::Redirect(AppRoute::Home)
        );
        assert_eq!(
            decide(Layout::Guest, "/profile"),
            RouteDecision::Redirect(AppRoute::Home)
        );
        assert_eq!(
            decide(Layout::Guest, "/unknown"),
            RouteDecision::Redirect(AppRoute::Home)
        );
        for path in ["/", "/login", "/register", "/forgot-password"] {
            assert!(!decide(Layout::Guest, path).is_redirect(), "{path}");
        }
    }

    #[test]
    fn tenant_is_kept_inside_tenant_area() {
        assert_eq!(
            decide(Layout::Tenant, "/admin/rooms"),
            RouteDecision::Redirect(AppRoute::MyRoom)
        );
        assert_eq!(
            decide(Layout::Tenant, "/"),
            RouteDecision::Redirect(AppRoute::MyRoom)
        );
        assert_eq!(
            decide(Layout::Tenant, "/dashboard"),
            RouteDecision::Redirect(AppRoute::MyRoom)
        );
        assert_eq!(
            decide(Layout::Tenant, "/register"),
            RouteDecision::Redirect(AppRoute::MyRoom)
        );
        assert_eq!(
            decide(Layout::Tenant, "/payments"),
            RouteDecision::Render(AppRoute::Payments)
        );
        assert_eq!(
            decide(Layout::Tenant, "/profile"),
            RouteDecision::Render(AppRoute::Profile)
        );
    }

    #[test]
    fn admin_lands_on_dashboard() {
        assert_eq!(
            decide(Layout::Admin, "/"),
            RouteDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            decide(Layout::Admin, "/login"),
            RouteDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            decide(Layout::Admin, "/my-room"),
            RouteDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            decide(Layout::Admin, "/register"),
            RouteDecision::Render(AppRoute::Register)
        );
        assert_eq!(
            decide(Layout::Admin, "/admin/meters"),
            RouteDecision::Render(AppRoute::AdminMeters)
        );
    }

    #[test]
    fn decision_never_targets_a_forbidden_route() {
        for layout in [Layout::Guest, Layout::Tenant, Layout::Admin] {
            for route in AppRoute::ALL {
                let target = authorize(layout, route).target();
                assert_eq!(
                    authorize(layout, target),
                    RouteDecision::Render(target),
                    "{layout:?} {route}"
                );
            }
        }
    }

    #[test]
    fn every_menu_item_renders() {
        for layout in [Layout::Guest, Layout::Tenant, Layout::Admin] {
            for entry in menu_items(layout) {
                assert_eq!(
                    authorize(layout, entry.route),
                    RouteDecision::Render(entry.route),
                    "{layout:?} {}",
                    entry.label
                );
            }
        }
    }

    #[test]
    fn layout_follows_session() {
        assert_eq!(Layout::from_session(&Session::default()), Layout::Guest);
        assert_eq!(Layout::from_session(&session(Role::Admin)), Layout::Admin);
        assert_eq!(Layout::from_session(&session(Role::Tenant)), Layout::Tenant);
        assert_eq!(Layout::from_session(&session(Role::Guest)), Layout::Guest);

        let mut no_token = session(Role::Admin);
        no_token.token = None;
        assert_eq!(Layout::from_session(&no_token), Layout::Guest);
    }
}
