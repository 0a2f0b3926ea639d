//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 每次导航都经过共享库的 `authorize`：
//! 请求 -> 授权(Guard) -> 渲染或重定向。

use aptportal_shared::{AppRoute, Layout, RouteDecision, authorize};
use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 应用授权结果：渲染时按需推入历史，重定向时总是替换当前历史记录
fn apply_decision(decision: RouteDecision, requested: AppRoute, push: bool) -> AppRoute {
    match decision {
        RouteDecision::Render(route) => {
            if push {
                push_history_state(route.to_path());
            }
            route
        }
        RouteDecision::Redirect(target) => {
            log!("[Router] {} is not available here. Redirecting to {}.", requested, target);
            replace_history_state(target.to_path());
            target
        }
    }
}

/// 路由器服务
///
/// 通过注入的布局信号实现与会话系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 当前布局（注入的信号）
    layout: Signal<Layout>,
}

impl RouterService {
    fn new(layout: Signal<Layout>) -> Self {
        let initial = AppRoute::from_path(&current_path());
        let (current_route, set_route) = signal(initial);
        Self {
            current_route,
            set_route,
            layout,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    pub fn navigate_to_route(&self, target: AppRoute) {
        let decision = authorize(self.layout.get_untracked(), target);
        let route = apply_decision(decision, target, true);
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let layout = self.layout;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            let decision = authorize(layout.get_untracked(), target);
            set_route.set(apply_decision(decision, target, false));
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 布局变化时（登录、登出、会话恢复）重新授权当前路由
    ///
    /// 首次运行即完成初始加载时的授权。
    fn setup_layout_guard(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let layout = self.layout;

        Effect::new(move |_| {
            let layout = layout.get();
            let route = current_route.get_untracked();
            let decision = authorize(layout, route);
            if decision.is_redirect() {
                log!("[Router] Layout changed to {:?}.", layout);
                set_route.set(apply_decision(decision, route, false));
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(layout: Signal<Layout>) -> RouterService {
    let router = RouterService::new(layout);

    router.init_popstate_listener();
    router.setup_layout_guard();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(AppRoute) + Clone + Copy {
    let router = use_router();
    move |to: AppRoute| {
        router.navigate_to_route(to);
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 当前布局信号
    layout: Signal<Layout>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(layout);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: Signal<String>,
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate_to_route(to);
    };

    view! {
        <a href=to.to_path() class=move || class.get() on:click=on_click>
            {children()}
        </a>
    }
}
