//! 租户通知铃铛
//!
//! 每 30 秒轮询未读数；打开下拉时拉取通知并全部标记为已读。
//! 存在押金到期通知时提供到付款页的快捷入口。

use crate::api::use_api;
use crate::components::icons::Bell;
use crate::web::Interval;
use crate::web::router::use_navigate;
use aptportal_shared::protocol::{
    MyNotificationsRequest, ReadAllNotificationsRequest, UnreadCountRequest,
};
use aptportal_shared::{AppRoute, Notification, deposit_notice};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

const POLL_INTERVAL_MS: u32 = 30_000;

#[component]
pub fn NotificationBell() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();

    let (unread, set_unread) = signal(0u32);
    let (items, set_items) = signal(Vec::<Notification>::new());
    let (loading, set_loading) = signal(false);

    let refresh_count = {
        let api = api.clone();
        move || {
            let api = api.clone();
            spawn_local(async move {
                match api.send(&UnreadCountRequest).await {
                    Ok(count) => set_unread.set(count.unread_count),
                    Err(e) => warn!("[Notifications] unread count failed: {}", e),
                }
            });
        }
    };

    refresh_count();
    StoredValue::new_local(Interval::new(POLL_INTERVAL_MS, refresh_count));

    let open_list = move |_| {
        let api = api.clone();
        set_loading.set(true);
        spawn_local(async move {
            match api.send(&MyNotificationsRequest).await {
                Ok(list) => set_items.set(list),
                Err(e) => warn!("[Notifications] list failed: {}", e),
            }
            if unread.get_untracked() > 0 {
                match api.send(&ReadAllNotificationsRequest).await {
                    Ok(_) => set_unread.set(0),
                    Err(e) => warn!("[Notifications] mark read failed: {}", e),
                }
            }
            set_loading.set(false);
        });
    };

    let deposit = move || items.with(|list| deposit_notice(list));

    view! {
        <div class="dropdown dropdown-end">
            <div tabindex="0" role="button" class="btn btn-ghost btn-circle" on:click=open_list>
                <div class="indicator">
                    <Bell attr:class="h-5 w-5" />
                    <Show when=move || { unread.get() > 0 }>
                        <span class="badge badge-xs badge-error indicator-item">{move || unread.get()}</span>
                    </Show>
                </div>
            </div>
            <div tabindex="0" class="dropdown-content z-[1] card card-compact w-80 p-2 shadow bg-base-100">
                <div class="card-body">
                    <h3 class="font-bold">"Notifications"</h3>
                    <Show when=move || loading.get()>
                        <span class="loading loading-spinner loading-sm"></span>
                    </Show>
                    {move || {
                        deposit()
                            .map(|notice| {
                                view! {
                                    <div class="alert alert-warning text-sm">
                                        <span>{format!("Deposit for room {} is due", notice.room_id)}</span>
                                        <button class="btn btn-xs" on:click=move |_| navigate(AppRoute::Payments)>
                                            "Pay now"
                                        </button>
                                    </div>
                                }
                            })
                    }}
                    <Show when=move || items.with(|i| i.is_empty()) && !loading.get()>
                        <p class="text-sm text-base-content/50">"No notifications"</p>
                    </Show>
                    <ul class="space-y-2 max-h-72 overflow-y-auto">
                        <For
                            each=move || items.get()
                            key=|n| n.id
                            children=move |n| {
                                let class = if n.is_read { "text-sm opacity-60" } else { "text-sm font-semibold" };
                                view! {
                                    <li class=class>
                                        <div>{n.title}</div>
                                        <div class="text-xs text-base-content/70">{n.message}</div>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </div>
            </div>
        </div>
    }
}
