//! 公共首页：公告、可预订房间与设施筛选

use crate::api::{media_url, use_api};
use crate::auth::use_auth;
use crate::components::booking_modal::BookingModal;
use crate::components::notice::{Notice, NoticeToast};
use aptportal_shared::date::display_datetime;
use aptportal_shared::payment::format_baht;
use aptportal_shared::protocol::{ListAnnouncementsRequest, ListRoomsRequest};
use aptportal_shared::{
    AMENITIES, Announcement, Room, amenity_label, filter_rooms, toggle_amenity,
};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notice = Notice::new();

    let (rooms, set_rooms) = signal(Vec::<Room>::new());
    let (announcements, set_announcements) = signal(Vec::<Announcement>::new());
    let (loading, set_loading) = signal(true);
    let (load_error, set_load_error) = signal(Option::<String>::None);
    let (show_all_news, set_show_all_news) = signal(false);
    let selected = RwSignal::new(Vec::<String>::new());
    let booking_room = RwSignal::new(None::<Room>);

    {
        let api = api.clone();
        spawn_local(async move {
            match api.send(&ListRoomsRequest).await {
                Ok(list) => set_rooms.set(list),
                Err(e) => set_load_error.set(Some(e.user_message("Could not load rooms"))),
            }
            set_loading.set(false);
            match api.send(&ListAnnouncementsRequest).await {
                Ok(list) => set_announcements.set(list),
                Err(e) => warn!("[Home] announcements failed: {}", e),
            }
        });
    }

    let visible_rooms = move || {
        rooms.with(|all| {
            selected.with(|wanted| {
                filter_rooms(all, wanted)
                    .into_iter()
                    .cloned()
                    .collect::<Vec<_>>()
            })
        })
    };

    let visible_news = move || {
        announcements.with(|all| {
            let take = if show_all_news.get() { all.len() } else { 1 };
            all.iter().take(take).cloned().collect::<Vec<_>>()
        })
    };

    let on_book = move |room: Room| {
        if auth.session.with_untracked(|s| s.is_authenticated()) {
            booking_room.set(Some(room));
        } else {
            notice.error("Please sign in before booking. No account yet? Register first.");
        }
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-8">
            <Show when=move || announcements.with(|a| !a.is_empty())>
                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h2 class="card-title">"Announcements"</h2>
                        <For
                            each=visible_news
                            key=|a| (a.id, a.title.clone())
                            children=|a| view! {
                                <div class="border-l-4 border-primary pl-3">
                                    <div class="font-semibold">{a.title}</div>
                                    <div class="text-xs text-base-content/60">{display_datetime(a.created_at.as_deref())}</div>
                                    <p class="text-sm whitespace-pre-line">{a.content}</p>
                                </div>
                            }
                        />
                        <Show when=move || announcements.with(|a| a.len() > 1)>
                            <button class="btn btn-ghost btn-sm self-start" on:click=move |_| set_show_all_news.update(|v| *v = !*v)>
                                {move || if show_all_news.get() { "Show less" } else { "Show all" }}
                            </button>
                        </Show>
                    </div>
                </div>
            </Show>

            <div class="flex flex-wrap gap-2 items-center">
                <span class="font-semibold mr-2">"Amenities:"</span>
                {AMENITIES
                    .iter()
                    .map(|(value, label)| {
                        let value = *value;
                        view! {
                            <label class="label cursor-pointer gap-2 bg-base-100 rounded-box px-3">
                                <input
                                    type="checkbox"
                                    class="checkbox checkbox-sm checkbox-primary"
                                    prop:checked=move || selected.with(|s| s.iter().any(|a| a == value))
                                    on:change=move |_| selected.update(|s| toggle_amenity(s, value))
                                />
                                <span class="label-text">{*label}</span>
                            </label>
                        }
                    })
                    .collect_view()}
            </div>

            <Show when=move || loading.get()>
                <div class="flex justify-center py-8"><span class="loading loading-spinner loading-lg text-primary"></span></div>
            </Show>
            {move || load_error.get().map(|msg| view! { <div class="alert alert-error">{msg}</div> })}
            <Show when=move || !loading.get() && load_error.get().is_none() && visible_rooms().is_empty()>
                <p class="text-center text-base-content/50 py-8">"No rooms match the selected amenities."</p>
            </Show>

            <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-3 gap-6">
                <For
                    each=visible_rooms
                    key=|r| r.id
                    children={
                        let api = api.clone();
                        move |room| {
                            let image = media_url(&api, room.image_url.as_deref());
                            let booked = room.clone();
                            view! {
                                <div class="card bg-base-100 shadow-xl">
                                    {image.map(|src| view! {
                                        <figure><img src=src alt="room" class="h-48 w-full object-cover" /></figure>
                                    })}
                                    <div class="card-body">
                                        <h3 class="card-title">
                                            {format!("Room {}", room.room_number)}
                                            {room.promotion.clone().filter(|p| !p.is_empty()).map(|p| view! {
                                                <span class="badge badge-secondary">{p}</span>
                                            })}
                                        </h3>
                                        <p class="text-sm text-base-content/70">
                                            {format!("{} • building {} • floor {}", room.room_type, room.building, room.floor)}
                                        </p>
                                        <div class="flex flex-wrap gap-1">
                                            {room.amenities.iter().map(|a| view! {
                                                <span class="badge badge-outline badge-sm">{amenity_label(a).to_string()}</span>
                                            }).collect_view()}
                                        </div>
                                        <div class="card-actions items-center justify-between mt-2">
                                            <span class="text-xl font-bold text-primary">
                                                {format!("{} THB", format_baht(room.price))}
                                            </span>
                                            <button class="btn btn-primary btn-sm" on:click=move |_| on_book(booked.clone())>
                                                "Book"
                                            </button>
                                        </div>
                                    </div>
                                </div>
                            }
                        }
                    }
                />
            </div>
        </div>

        {move || booking_room.get().map(|room| view! {
            <BookingModal room=room notice=notice on_close=move |_| booking_room.set(None) />
        })}
    }
}
