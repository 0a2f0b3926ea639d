//! 月历：管理员与租户共用，差别由 `CalendarSurface` 决定

use crate::api::{PortalApi, use_api};
use crate::components::icons::{CalendarDays, ChevronLeft, ChevronRight, Plus, X};
use crate::components::notice::{Notice, NoticeToast};
use aptportal_shared::calendar::{
    CalendarEvent, CalendarSurface, EventAccess, EventCategory, EventDetail, EventDraft,
    Visibility, events_on, month_grid, open_event, shift_month, tenant_feed, upsert_event,
};
use aptportal_shared::date::to_input_value;
use aptportal_shared::protocol::{
    CreateAdminEventRequest, CreateMyEventRequest, DeleteAdminEventRequest, DeleteMyEventRequest,
    ListAdminEventsRequest, ListMyEventsRequest, MyRoomRequest, UpdateAdminEventRequest,
    UpdateMyEventRequest,
};
use aptportal_shared::PortalResult;
use chrono::{Datelike, Local, NaiveDate};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[component]
pub fn AdminCalendarPage() -> impl IntoView {
    view! { <EventCalendar surface=CalendarSurface::Admin /> }
}

#[component]
pub fn TenantCalendarPage() -> impl IntoView {
    view! { <EventCalendar surface=CalendarSurface::Tenant /> }
}

// =========================================================
// 请求分发
// =========================================================

async fn load_events(api: &PortalApi, surface: CalendarSurface) -> PortalResult<Vec<CalendarEvent>> {
    match surface {
        CalendarSurface::Admin => api.send(&ListAdminEventsRequest).await,
        CalendarSurface::Tenant => {
            let events = api.send(&ListMyEventsRequest).await?;
            // 没有房间时只是看不到针对房间的事件
            let my_room = match api.send(&MyRoomRequest).await {
                Ok(room) => Some(room.room_id),
                Err(e) => {
                    warn!("[Calendar] room lookup failed: {}", e);
                    None
                }
            };
            Ok(tenant_feed(&events, my_room))
        }
    }
}

async fn save_event(
    api: &PortalApi,
    surface: CalendarSurface,
    draft: &EventDraft,
) -> PortalResult<CalendarEvent> {
    let payload = draft.to_payload(surface)?;
    match (surface, draft.id) {
        (CalendarSurface::Admin, None) => api.send(&CreateAdminEventRequest(payload)).await,
        (CalendarSurface::Admin, Some(id)) => {
            api.send(&UpdateAdminEventRequest { id, payload }).await
        }
        (CalendarSurface::Tenant, None) => api.send(&CreateMyEventRequest(payload)).await,
        (CalendarSurface::Tenant, Some(id)) => api.send(&UpdateMyEventRequest { id, payload }).await,
    }
}

async fn delete_event(api: &PortalApi, surface: CalendarSurface, id: i64) -> PortalResult<()> {
    match surface {
        CalendarSurface::Admin => api.send(&DeleteAdminEventRequest { id }).await.map(|_| ()),
        CalendarSurface::Tenant => api.send(&DeleteMyEventRequest { id }).await.map(|_| ()),
    }
}

// =========================================================
// 组件
// =========================================================

#[component]
fn EventCalendar(surface: CalendarSurface) -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let today = Local::now().date_naive();
    let (cursor, set_cursor) = signal((today.year(), today.month()));
    let events = RwSignal::new(Vec::<CalendarEvent>::new());
    let (loading, set_loading) = signal(true);
    let opened = RwSignal::new(None::<EventAccess>);
    let (saving, set_saving) = signal(false);

    {
        let api = api.clone();
        spawn_local(async move {
            match load_events(&api, surface).await {
                Ok(list) => events.set(list),
                Err(e) => notice.failure(&e, "Could not load the calendar"),
            }
            set_loading.set(false);
        });
    }

    let days = move || {
        let (year, month) = cursor.get();
        month_grid(year, month).unwrap_or_default()
    };
    let shift = move |delta: i32| {
        set_cursor.update(|(y, m)| (*y, *m) = shift_month(*y, *m, delta));
    };
    let new_on = move |day: NaiveDate| {
        let start = format!("{}T09:00", day.format("%Y-%m-%d"));
        opened.set(Some(EventAccess::Edit(EventDraft::from_selection(surface, &start, None))));
    };

    let on_save = {
        let api = api.clone();
        Callback::new(move |draft: EventDraft| {
            let api = api.clone();
            set_saving.set(true);
            spawn_local(async move {
                match save_event(&api, surface, &draft).await {
                    Ok(saved) => {
                        events.update(|list| upsert_event(list, saved));
                        opened.set(None);
                        notice.success("Event saved");
                    }
                    Err(e) if e.is_validation() => notice.error(e.message),
                    Err(e) => notice.failure(&e, "Could not save the event"),
                }
                set_saving.set(false);
            });
        })
    };

    let on_delete = {
        let api = api.clone();
        Callback::new(move |id: i64| {
            let api = api.clone();
            spawn_local(async move {
                match delete_event(&api, surface, id).await {
                    Ok(()) => {
                        events.update(|list| list.retain(|e| e.id != id));
                        opened.set(None);
                        notice.success("Event deleted");
                    }
                    Err(e) => notice.failure(&e, "Could not delete the event"),
                }
            });
        })
    };

    let title = match surface {
        CalendarSurface::Admin => "Building calendar",
        CalendarSurface::Tenant => "My calendar",
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-4">
            <div class="flex flex-wrap justify-between items-center gap-2">
                <h1 class="text-2xl font-bold flex items-center gap-2">
                    <CalendarDays attr:class="h-6 w-6 text-primary" />
                    {title}
                </h1>
                <div class="flex items-center gap-2">
                    <button class="btn btn-sm btn-square btn-ghost" on:click=move |_| shift(-1)>
                        <ChevronLeft attr:class="h-4 w-4" />
                    </button>
                    <span class="font-semibold w-36 text-center">
                        {move || {
                            let (y, m) = cursor.get();
                            NaiveDate::from_ymd_opt(y, m, 1)
                                .map(|d| d.format("%B %Y").to_string())
                                .unwrap_or_default()
                        }}
                    </span>
                    <button class="btn btn-sm btn-square btn-ghost" on:click=move |_| shift(1)>
                        <ChevronRight attr:class="h-4 w-4" />
                    </button>
                    <button class="btn btn-sm" on:click=move |_| set_cursor.set((today.year(), today.month()))>
                        "Today"
                    </button>
                    <button class="btn btn-sm btn-primary" on:click=move |_| new_on(today)>
                        <Plus attr:class="h-4 w-4" /> "Add"
                    </button>
                </div>
            </div>

            <Show when=move || loading.get()>
                <progress class="progress progress-primary w-full"></progress>
            </Show>

            <div class="grid grid-cols-7 gap-px bg-base-300 rounded-box overflow-hidden border border-base-300">
                {WEEKDAYS.iter().map(|d| view! {
                    <div class="bg-base-200 text-center text-xs font-semibold py-2">{*d}</div>
                }).collect_view()}
                {move || {
                    let (_, month) = cursor.get();
                    let list = events.get();
                    days().into_iter().map(|day| {
                        let in_month = day.month() == month;
                        let cell_class = match (in_month, day == today) {
                            (_, true) => "bg-primary/10 min-h-24 p-1 cursor-pointer",
                            (true, false) => "bg-base-100 min-h-24 p-1 cursor-pointer",
                            (false, false) => "bg-base-100 opacity-50 min-h-24 p-1 cursor-pointer",
                        };
                        let chips = events_on(&list, day).into_iter().map(|event| {
                            let color = surface.color(event);
                            let label = surface.display_title(event);
                            let event = event.clone();
                            view! {
                                <div
                                    class="text-xs text-white rounded px-1 mb-1 truncate"
                                    style=format!("background-color: {}", color)
                                    title=label.clone()
                                    on:click=move |ev| {
                                        ev.stop_propagation();
                                        opened.set(Some(open_event(surface, &event)));
                                    }
                                >
                                    {label.clone()}
                                </div>
                            }
                        }).collect_view();
                        view! {
                            <div class=cell_class on:click=move |_| new_on(day)>
                                <div class="text-xs text-right mb-1">{day.day()}</div>
                                {chips}
                            </div>
                        }
                    }).collect_view()
                }}
            </div>
        </div>

        {move || opened.get().map(|access| match access {
            EventAccess::Edit(draft) => view! {
                <EventEditor
                    surface=surface
                    draft=draft
                    saving=saving
                    on_save=on_save
                    on_delete=on_delete
                    on_close=move |_| opened.set(None)
                />
            }.into_any(),
            EventAccess::ReadOnly(detail) => view! {
                <EventDetailView detail=detail on_close=move |_| opened.set(None) />
            }.into_any(),
        })}
    }
}

#[component]
fn EventEditor(
    surface: CalendarSurface,
    draft: EventDraft,
    #[prop(into)] saving: Signal<bool>,
    on_save: Callback<EventDraft>,
    on_delete: Callback<i64>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let existing = draft.id;
    let draft = RwSignal::new(draft);

    let datetime_input = move |label: &'static str,
                               get: fn(&EventDraft) -> String,
                               set: fn(&mut EventDraft, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type="datetime-local"
                    class="input input-bordered"
                    prop:value=move || draft.with(|d| to_input_value(&get(d)))
                    on:input=move |ev| draft.update(|d| set(d, event_target_value(&ev)))
                />
            </div>
        }
    };

    view! {
        <div class="modal modal-open">
            <div class="modal-box">
                <button class="btn btn-sm btn-circle btn-ghost absolute right-2 top-2" on:click=move |_| on_close.run(())>
                    <X attr:class="h-4 w-4" />
                </button>
                <h3 class="font-bold text-lg mb-2">
                    {if existing.is_some() { "Edit event" } else { "New event" }}
                </h3>
                <div class="space-y-2">
                    <input
                        class="input input-bordered w-full"
                        placeholder="Title"
                        prop:value=move || draft.with(|d| d.title.clone())
                        on:input=move |ev| draft.update(|d| d.title = event_target_value(&ev))
                    />
                    <textarea
                        class="textarea textarea-bordered w-full"
                        placeholder="Description"
                        prop:value=move || draft.with(|d| d.description.clone())
                        on:input=move |ev| draft.update(|d| d.description = event_target_value(&ev))
                    ></textarea>
                    <div class="grid grid-cols-2 gap-2">
                        {datetime_input("Start", |d| d.start.clone(), |d, v| d.start = v)}
                        {datetime_input("End", |d| d.end.clone(), |d, v| d.end = v)}
                    </div>
                    <div class="grid grid-cols-2 gap-2">
                        <select
                            class="select select-bordered"
                            on:change=move |ev| draft.update(|d| d.category = EventCategory::from_value(&event_target_value(&ev)))
                        >
                            {EventCategory::ALL.iter().map(|c| {
                                let c = *c;
                                view! {
                                    <option value=c.as_str() selected=move || draft.with(|d| d.category == c)>{c.label()}</option>
                                }
                            }).collect_view()}
                        </select>
                        <select
                            class="select select-bordered"
                            disabled={surface == CalendarSurface::Tenant}
                            on:change=move |ev| draft.update(|d| d.visibility = Visibility::from_value(&event_target_value(&ev)))
                        >
                            {surface.visibility_options().iter().map(|v| {
                                let v = *v;
                                view! {
                                    <option value=v.as_str() selected=move || draft.with(|d| surface.coerce_visibility(d.visibility) == v)>{v.label()}</option>
                                }
                            }).collect_view()}
                        </select>
                    </div>
                    <Show when=move || surface == CalendarSurface::Admin>
                        <input
                            type="number"
                            class="input input-bordered w-full"
                            placeholder="Room id (optional)"
                            prop:value=move || draft.with(|d| d.room_id.map(|r| r.to_string()).unwrap_or_default())
                            on:input=move |ev| draft.update(|d| d.room_id = event_target_value(&ev).trim().parse().ok())
                        />
                    </Show>
                </div>
                <div class="modal-action">
                    {existing.map(|id| view! {
                        <button class="btn btn-error btn-outline mr-auto" on:click=move |_| on_delete.run(id)>"Delete"</button>
                    })}
                    <button class="btn btn-ghost" on:click=move |_| on_close.run(())>"Cancel"</button>
                    <button
                        class="btn btn-primary"
                        disabled=move || saving.get()
                        on:click=move |_| on_save.run(draft.get_untracked())
                    >
                        "Save"
                    </button>
                </div>
            </div>
            <div class="modal-backdrop" on:click=move |_| on_close.run(())></div>
        </div>
    }
}

#[component]
fn EventDetailView(detail: EventDetail, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    view! {
        <div class="modal modal-open">
            <div class="modal-box">
                <h3 class="font-bold text-lg mb-2">"Event details"</h3>
                {detail.lines().into_iter().map(|line| view! { <p class="py-1">{line}</p> }).collect_view()}
                <div class="modal-action">
                    <button class="btn" on:click=move |_| on_close.run(())>"Close"</button>
                </div>
            </div>
            <div class="modal-backdrop" on:click=move |_| on_close.run(())></div>
        </div>
    }
}
