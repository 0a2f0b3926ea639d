//! 管理员：水电表设备与最近一期抄表

use crate::api::{media_url, use_api};
use crate::components::icons::{Plus, RefreshCw, Upload, X};
use crate::components::notice::{Notice, NoticeToast};
use crate::web::media::{ObjectUrl, read_file, selected_file};
use aptportal_shared::admin::MeterForm;
use aptportal_shared::date::display_datetime;
use aptportal_shared::protocol::{LastReadingsRequest, ListMetersRequest};
use aptportal_shared::{LastReadingRow, MeterDevice, MeterStatus, MeterType, UploadFile};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn status_badge(status: MeterStatus) -> (&'static str, &'static str) {
    match status {
        MeterStatus::Active => ("badge badge-success", "Active"),
        MeterStatus::Maintenance => ("badge badge-warning", "Maintenance"),
        MeterStatus::Inactive => ("badge badge-ghost", "Inactive"),
    }
}

fn reading(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".to_string())
}

#[component]
pub fn AdminMetersPage() -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let meters = RwSignal::new(Vec::<MeterDevice>::new());
    let (readings, set_readings) = signal(Vec::<LastReadingRow>::new());
    let (loading, set_loading) = signal(true);
    let (adding, set_adding) = signal(false);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.send(&ListMetersRequest).await {
                    Ok(list) => meters.set(list),
                    Err(e) => notice.failure(&e, "Could not load meters"),
                }
                match api.send(&LastReadingsRequest).await {
                    Ok(rows) => set_readings.set(rows),
                    Err(e) => warn!("[Meters] last readings unavailable: {}", e),
                }
                set_loading.set(false);
            });
        }
    };
    load();

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-2xl font-bold">"Water & electricity meters"</h1>
                <div class="flex gap-2">
                    <button class="btn btn-ghost btn-sm" on:click=move |_| load()>
                        <RefreshCw attr:class=move || if loading.get() { "h-4 w-4 animate-spin" } else { "h-4 w-4" } />
                    </button>
                    <button class="btn btn-primary btn-sm" on:click=move |_| set_adding.set(true)>
                        <Plus attr:class="h-4 w-4" /> "Add meter"
                    </button>
                </div>
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h2 class="card-title">"Latest readings"</h2>
                    <div class="overflow-x-auto">
                        <table class="table table-sm">
                            <thead>
                                <tr><th>"Room"</th><th>"Period"</th><th>"Water"</th><th>"Electricity"</th><th>"Status"</th></tr>
                            </thead>
                            <tbody>
                                {move || readings.get().into_iter().map(|row| view! {
                                    <tr>
                                        <td>{row.room_label}</td>
                                        <td>{row.period_label}</td>
                                        <td>{reading(row.water_reading)}</td>
                                        <td>{reading(row.electric_reading)}</td>
                                        <td><span class="badge badge-outline">{row.status}</span></td>
                                    </tr>
                                }).collect_view()}
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>

            <div class="card bg-base-100 shadow">
                <div class="card-body">
                    <h2 class="card-title">"Devices"</h2>
                    <div class="overflow-x-auto">
                        <table class="table">
                            <thead>
                                <tr>
                                    <th>"Photo"</th><th>"Code"</th><th>"Type"</th><th>"Room"</th>
                                    <th>"Status"</th><th class="hidden md:table-cell">"Installed"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || meters.get()
                                    key=|m| (m.id, m.meter_code.clone())
                                    children={
                                        let api = api.clone();
                                        move |m| {
                                            let image = media_url(&api, m.image_url.as_deref());
                                            let (status_class, status_label) = status_badge(m.status);
                                            let type_label = match m.meter_type {
                                                MeterType::Water => "Water",
                                                MeterType::Electric => "Electric",
                                            };
                                            view! {
                                                <tr>
                                                    <td>
                                                        {image.map(|src| view! {
                                                            <img src=src alt=m.meter_code.clone() class="w-14 h-14 object-cover rounded" />
                                                        })}
                                                    </td>
                                                    <td class="font-mono">{m.meter_code.clone()}</td>
                                                    <td>{type_label}</td>
                                                    <td>{m.room_label.clone().unwrap_or_else(|| m.room_id.to_string())}</td>
                                                    <td><span class=status_class>{status_label}</span></td>
                                                    <td class="hidden md:table-cell text-xs">{display_datetime(m.installed_at.as_deref())}</td>
                                                </tr>
                                            }
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>

        <Show when=move || adding.get()>
            <AddMeterModal
                notice=notice
                on_close=move |_| set_adding.set(false)
                on_saved=move |saved: MeterDevice| meters.update(|list| list.push(saved))
            />
        </Show>
    }
}

#[component]
fn AddMeterModal(
    notice: Notice,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_saved: Callback<MeterDevice>,
) -> impl IntoView {
    let api = use_api();

    let form = RwSignal::new(MeterForm::default());
    let image = RwSignal::new(None::<UploadFile>);
    let preview = RwSignal::new_local(None::<ObjectUrl>);
    let (saving, set_saving) = signal(false);

    let on_file = move |ev: leptos::ev::Event| {
        let Some(file) = selected_file(&ev) else {
            return;
        };
        spawn_local(async move {
            let upload = match read_file(&file).await {
                Ok(upload) => upload,
                Err(e) => return notice.failure(&e, "Could not read the image"),
            };
            if !upload.is_image() {
                return notice.error("Only image files (JPG / PNG) are accepted");
            }
            match ObjectUrl::new(&upload) {
                Ok(url) => preview.set(Some(url)),
                Err(e) => warn!("[Meters] preview failed: {}", e),
            }
            image.set(Some(upload));
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
                Ok(saved) => {
                    notice.success(format!("Meter {} added", saved.meter_code));
                    on_saved.run(saved);
                    on_close.run(());
                }
                Err(e) => notice.failure(&e, "Could not save the meter"),
            }
            set_saving.set(false);
        });
    };

    let text = move |label: &'static str,
                     kind: &'static str,
                     get: fn(&MeterForm) -> String,
                     set: fn(&mut MeterForm, String)| {
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
            <div class="modal-box">
                <button class="btn btn-sm btn-circle btn-ghost absolute right-2 top-2" on:click=move |_| on_close.run(())>
                    <X attr:class="h-4 w-4" />
                </button>
                <h3 class="font-bold text-lg mb-4">"Add meter"</h3>
                <div class="grid grid-cols-2 gap-2">
                    {text("Meter code *", "text", |f| f.meter_code.clone(), |f, v| f.meter_code = v)}
                    {text("Room id *", "number", |f| f.room_id.clone(), |f, v| f.room_id = v)}
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Type"</span></label>
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| form.update(|f| {
                                f.meter_type = if event_target_value(&ev) == "electric" { MeterType::Electric } else { MeterType::Water };
                            })
                        >
                            <option value="water">"Water"</option>
                            <option value="electric">"Electric"</option>
                        </select>
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Status"</span></label>
                        <select
                            class="select select-bordered select-sm"
                            on:change=move |ev| form.update(|f| {
                                f.status = match event_target_value(&ev).as_str() {
                                    "maintenance" => MeterStatus::Maintenance,
                                    "inactive" => MeterStatus::Inactive,
                                    _ => MeterStatus::Active,
                                };
                            })
                        >
                            {[MeterStatus::Active, MeterStatus::Maintenance, MeterStatus::Inactive].into_iter().map(|s| view! {
                                <option value=s.as_str()>{status_badge(s).1}</option>
                            }).collect_view()}
                        </select>
                    </div>
                    {text("Installed", "date", |f| f.installed_at.clone(), |f, v| f.installed_at = v)}
                    {text("Removed", "date", |f| f.removed_at.clone(), |f, v| f.removed_at = v)}
                </div>
                {text("Location note", "text", |f| f.location_note.clone(), |f, v| f.location_note = v)}
                <div class="flex items-center gap-4 mt-4">
                    <label class="btn btn-outline btn-sm">
                        <Upload attr:class="h-4 w-4" /> "Photo"
                        <input type="file" accept="image/*" class="hidden" on:change=on_file />
                    </label>
                    {move || preview.with(|p| p.as_ref().map(|u| u.as_str().to_string())).map(|src| view! {
                        <img src=src alt="meter" class="w-20 h-20 object-cover rounded" />
                    })}
                </div>
                <div class="modal-action">
                    <button class="btn btn-ghost" on:click=move |_| on_close.run(())>"Cancel"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=on_submit>"Save"</button>
                </div>
            </div>
        </div>
    }
}
