//! 管理员：房间列表、新增与删除

use crate::api::{media_url, use_api};
use crate::components::confirm::{ConfirmDialog, Confirmation};
use crate::components::icons::{Plus, RefreshCw, Trash2, Upload, X};
use crate::components::notice::{Notice, NoticeToast};
use crate::web::media::{ObjectUrl, read_file, selected_file};
use aptportal_shared::admin::{ROOM_TYPES, RoomForm};
use aptportal_shared::payment::format_baht;
use aptportal_shared::protocol::{DeleteRoomRequest, ListRoomsRequest};
use aptportal_shared::{AMENITIES, Room, UploadFile, amenity_label, toggle_amenity};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn AdminRoomsPage() -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let (rooms, set_rooms) = signal(Vec::<Room>::new());
    let (loading, set_loading) = signal(true);
    let (adding, set_adding) = signal(false);
    let pending_delete = RwSignal::new(None::<Room>);

    let load_rooms = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.send(&ListRoomsRequest).await {
                    Ok(list) => set_rooms.set(list),
                    Err(e) => notice.failure(&e, "Could not load rooms"),
                }
                set_loading.set(false);
            });
        }
    };
    load_rooms();

    let handle_delete = {
        let api = api.clone();
        let load_rooms = load_rooms.clone();
        move |answer: Confirmation| {
            let target = pending_delete.get_untracked();
            pending_delete.set(None);
            let (Confirmation::Confirmed, Some(room)) = (answer, target) else {
                return;
            };
            let api = api.clone();
            let load_rooms = load_rooms.clone();
            spawn_local(async move {
                match api.send(&DeleteRoomRequest { id: room.id }).await {
                    Ok(_) => {
                        notice.success(format!("Room {} deleted", room.room_number));
                        load_rooms();
                    }
                    Err(e) => notice.failure(&e, "Could not delete the room"),
                }
            });
        }
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-2xl font-bold">"Rooms"</h1>
                <div class="flex gap-2">
                    <button class="btn btn-ghost btn-sm" on:click={
                        let load_rooms = load_rooms.clone();
                        move |_| load_rooms()
                    }>
                        <RefreshCw attr:class=move || if loading.get() { "h-4 w-4 animate-spin" } else { "h-4 w-4" } />
                        "Refresh"
                    </button>
                    <button class="btn btn-primary btn-sm" on:click=move |_| set_adding.set(true)>
                        <Plus attr:class="h-4 w-4" /> "Add room"
                    </button>
                </div>
            </div>

            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table">
                    <thead>
                        <tr>
                            <th>"Photo"</th>
                            <th>"Room"</th>
                            <th>"Type"</th>
                            <th>"Price / month"</th>
                            <th class="hidden md:table-cell">"Amenities"</th>
                            <th>"Status"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || rooms.with(Vec::is_empty) && !loading.get()>
                            <tr><td colspan="7" class="text-center py-8 text-base-content/50">"No rooms yet"</td></tr>
                        </Show>
                        <For
                            each=move || rooms.get()
                            key=|r| r.id
                            children={
                                let api = api.clone();
                                move |room| {
                                    let image = media_url(&api, room.image_url.as_deref());
                                    let target = room.clone();
                                    let status_class = if room.is_available() { "badge badge-success" } else { "badge badge-ghost" };
                                    view! {
                                        <tr>
                                            <td>
                                                {image.map(|src| view! {
                                                    <img src=src alt="room" class="w-20 h-14 object-cover rounded" />
                                                })}
                                            </td>
                                            <td>
                                                <div class="font-bold">{room.room_number.clone()}</div>
                                                <div class="text-xs opacity-60">{format!("Building {} • floor {}", room.building, room.floor)}</div>
                                            </td>
                                            <td>{room.room_type.clone()}</td>
                                            <td>
                                                {format!("{} THB", format_baht(room.price))}
                                                {room.promotion.clone().filter(|p| !p.trim().is_empty()).map(|p| view! {
                                                    <div class="badge badge-secondary badge-sm">{p}</div>
                                                })}
                                            </td>
                                            <td class="hidden md:table-cell">
                                                <div class="flex flex-wrap gap-1">
                                                    {room.amenities.iter().map(|a| view! {
                                                        <span class="badge badge-outline badge-sm">{amenity_label(a).to_string()}</span>
                                                    }).collect_view()}
                                                </div>
                                            </td>
                                            <td><span class=status_class>{room.status.clone()}</span></td>
                                            <td>
                                                <button class="btn btn-ghost btn-sm btn-square text-error" title="Delete"
                                                    on:click=move |_| pending_delete.set(Some(target.clone()))>
                                                    <Trash2 attr:class="h-4 w-4" />
                                                </button>
                                            </td>
                                        </tr>
                                    }
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
        </div>

        <Show when=move || adding.get()>
            <AddRoomModal
                notice=notice
                on_close=move |_| set_adding.set(false)
                on_success={
                    let load_rooms = load_rooms.clone();
                    move |_| load_rooms()
                }
            />
        </Show>

        <ConfirmDialog
            open=Signal::derive(move || pending_delete.with(Option::is_some))
            title="Delete room"
            message=Signal::derive(move || {
                pending_delete.with(|r| r.as_ref().map(|r| format!("Delete room {}? This cannot be undone.", r.room_number)).unwrap_or_default())
            })
            confirm_label="Delete"
            danger=true
            on_close=handle_delete
        />
    }
}

#[component]
fn AddRoomModal(
    notice: Notice,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_success: Callback<()>,
) -> impl IntoView {
    let api = use_api();

    let form = RwSignal::new(RoomForm::default());
    let image = RwSignal::new(None::<UploadFile>);
    let preview = RwSignal::new_local(None::<ObjectUrl>);
    let (saving, set_saving) = signal(false);

    let on_file = move |ev: leptos::ev::Event| {
        let Some(file) = selected_file(&ev) else {
            return;
        };
        spawn_local(async move {
            match read_file(&file).await {
                Ok(upload) => {
                    match ObjectUrl::new(&upload) {
                        Ok(url) => preview.set(Some(url)),
                        Err(e) => warn!("[Rooms] preview failed: {}", e),
                    }
                    image.set(Some(upload));
                }
                Err(e) => notice.failure(&e, "Could not read the image"),
            }
        });
    };

    let on_submit = move |_: leptos::ev::MouseEvent| {
        let req = image.with_untracked(|img| form.with_untracked(|f| f.to_request(img.as_ref())));
        let req = match req {
            Ok(req) => req,
            Err(e) => return notice.error(e.message),
        };
        let api = api.clone();
        set_saving.set(true);
        spawn_local(async move {
            match api.send(&req).await {
                Ok(_) => {
                    notice.success(format!("Room {} added", req.room_number));
                    on_success.run(());
                    on_close.run(());
                }
                Err(e) => notice.failure(&e, "Could not save the room"),
            }
            set_saving.set(false);
        });
    };

    let text = move |label: &'static str,
                     kind: &'static str,
                     get: fn(&RoomForm) -> String,
                     set: fn(&mut RoomForm, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type=kind
                    class="input input-bordered input-sm"
                    prop:value=move || form.with(get)
                    on:input=move |ev| form.update(|f| set(f, event_target_value(&ev)))
                />
            </div>
        }
    };

    view! {
        <div class="modal modal-open">
            <div class="modal-box max-w-xl">
                <button class="btn btn-sm btn-circle btn-ghost absolute right-2 top-2" on:click=move |_| on_close.run(())>
                    <X attr:class="h-4 w-4" />
                </button>
                <h3 class="font-bold text-lg mb-4">"Add room"</h3>

                <div class="flex flex-col items-center gap-2 mb-4">
                    {move || match preview.with(|p| p.as_ref().map(|u| u.as_str().to_string())) {
                        Some(src) => view! { <img src=src alt="room" class="w-40 h-28 object-cover rounded-box" /> }.into_any(),
                        None => view! {
                            <div class="w-40 h-28 rounded-box border border-dashed flex items-center justify-center text-sm opacity-60">"Room photo"</div>
                        }.into_any(),
                    }}
                    <label class="btn btn-outline btn-sm">
                        <Upload attr:class="h-4 w-4" /> "Upload photo"
                        <input type="file" accept="image/*" class="hidden" on:change=on_file />
                    </label>
                </div>

                <div class="grid grid-cols-2 gap-2">
                    {text("Room number *", "text", |f| f.room_number.clone(), |f, v| f.room_number = v)}
                    {text("Building *", "text", |f| f.building.clone(), |f, v| f.building = v)}
                    {text("Floor *", "number", |f| f.floor.clone(), |f, v| f.floor = v)}
                    {text("Price / month *", "text", |f| f.price.clone(), |f, v| f.price = v)}
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Room type"</span></label>
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| form.update(|f| f.room_type = event_target_value(&ev))
                        >
                            {ROOM_TYPES.iter().map(|t| view! {
                                <option value=*t selected=move || form.with(|f| f.room_type == *t)>{*t}</option>
                            }).collect_view()}
                        </select>
                    </div>
                    {text("Promotion", "text", |f| f.promotion.clone(), |f, v| f.promotion = v)}
                </div>

                <div class="mt-4">
                    <p class="text-sm font-semibold mb-2">"Amenities"</p>
                    <div class="flex flex-wrap gap-3">
                        {AMENITIES.iter().map(|(value, label)| view! {
                            <label class="label cursor-pointer gap-2">
                                <input
                                    type="checkbox"
                                    class="checkbox checkbox-sm"
                                    prop:checked=move || form.with(|f| f.amenities.iter().any(|a| a == *value))
                                    on:change=move |_| form.update(|f| toggle_amenity(&mut f.amenities, value))
                                />
                                <span class="label-text">{*label}</span>
                            </label>
                        }).collect_view()}
                    </div>
                </div>

                <div class="modal-action">
                    <button class="btn btn-ghost" on:click=move |_| on_close.run(())>"Cancel"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=on_submit>
                        <Show when=move || saving.get()>
                            <span class="loading loading-spinner"></span>
                        </Show>
                        "Save"
                    </button>
                </div>
            </div>
        </div>
    }
}
