//! 三种布局的外壳：访客顶栏、租户与管理员侧边栏
//!
//! 菜单来自 `menu_items(layout)`，与路由授权表保持一致。

use crate::auth::{logout, use_auth};
use crate::components::clock::DigitalClock;
use crate::components::icons::{Home, LogOut};
use crate::components::notification_bell::NotificationBell;
use crate::web::router::{Link, use_router};
use aptportal_shared::review::APARTMENT_NAME;
use aptportal_shared::{Layout, menu_items};
use leptos::prelude::*;

fn menu_class(active: bool) -> &'static str {
    if active { "active" } else { "" }
}

#[component]
pub fn GuestShell(children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let current = router.current_route();
    let signed_in = move || auth.session.with(|s| s.is_authenticated());

    view! {
        <div class="min-h-screen bg-base-200 font-sans">
            <div class="navbar bg-base-100 shadow">
                <div class="flex-1 gap-2">
                    <Home attr:class="text-primary h-6 w-6" />
                    <span class="btn btn-ghost text-xl">{APARTMENT_NAME}</span>
                </div>
                <ul class="menu menu-horizontal px-1">
                    {menu_items(Layout::Guest)
                        .iter()
                        .map(|item| {
                            let route = item.route;
                            view! {
                                <li>
                                    <Link to=route class=move || menu_class(current.get() == route).to_string()>
                                        {item.label}
                                    </Link>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
                // 角色为 guest 的已登录用户
                <Show when=signed_in>
                    <div class="flex-none gap-2">
                        <span class="hidden md:inline text-sm">{move || auth.user_name()}</span>
                        <button on:click=move |_| logout(&auth) class="btn btn-ghost btn-sm gap-2">
                            <LogOut attr:class="h-4 w-4" /> "Sign out"
                        </button>
                    </div>
                </Show>
            </div>
            <main class="max-w-7xl mx-auto p-4 md:p-8">{children()}</main>
        </div>
    }
}

#[component]
pub fn PortalShell(layout: Layout, children: Children) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let current = router.current_route();

    let user_name = move || {
        auth.session
            .with(|s| s.user.as_ref().map(|u| u.user_name.clone()))
            .unwrap_or_default()
    };
    let avatar = move || {
        auth.session.with(|s| {
            s.user
                .as_ref()
                .map(|u| (u.profile_image.clone(), u.initial()))
                .unwrap_or_default()
        })
    };
    let title = match layout {
        Layout::Admin => "Management",
        _ => "Resident portal",
    };

    view! {
        <div class="drawer lg:drawer-open min-h-screen bg-base-200 font-sans">
            <input id="portal-drawer" type="checkbox" class="drawer-toggle" />
            <div class="drawer-content flex flex-col">
                <div class="navbar bg-base-100 shadow sticky top-0 z-10">
                    <div class="flex-1 gap-2">
                        <label for="portal-drawer" class="btn btn-ghost lg:hidden">"☰"</label>
                        <span class="text-lg font-bold">{title}</span>
                    </div>
                    <div class="flex-none gap-3">
                        <DigitalClock />
                        <Show when=move || layout == Layout::Tenant>
                            <NotificationBell />
                        </Show>
                        <div class="flex items-center gap-2">
                            {move || {
                                let (image, initial) = avatar();
                                match image {
                                    Some(src) => view! {
                                        <div class="avatar">
                                            <div class="w-9 rounded-full"><img src=src alt="avatar" /></div>
                                        </div>
                                    }
                                    .into_any(),
                                    None => view! {
                                        <div class="avatar placeholder">
                                            <div class="bg-neutral text-neutral-content w-9 rounded-full">
                                                <span>{initial}</span>
                                            </div>
                                        </div>
                                    }
                                    .into_any(),
                                }
                            }}
                            <span class="hidden md:inline text-sm">{user_name}</span>
                        </div>
                        <button on:click=move |_| logout(&auth) class="btn btn-outline btn-error btn-sm gap-2">
                            <LogOut attr:class="h-4 w-4" /> "Sign out"
                        </button>
                    </div>
                </div>
                <main class="p-4 md:p-8 max-w-7xl w-full mx-auto">{children()}</main>
            </div>
            <div class="drawer-side z-20">
                <label for="portal-drawer" class="drawer-overlay"></label>
                <aside class="bg-base-100 w-64 min-h-full">
                    <div class="p-4 text-xl font-bold text-primary">{APARTMENT_NAME}</div>
                    <ul class="menu p-4 gap-1">
                        {menu_items(layout)
                            .iter()
                            .map(|item| {
                                let route = item.route;
                                view! {
                                    <li>
                                        <Link to=route class=move || menu_class(current.get() == route).to_string()>
                                            {item.label}
                                        </Link>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                </aside>
            </div>
        </div>
    }
}
