//! 管理员：租户名册与手动新增（证件 OCR 预填）

use crate::api::use_api;
use crate::components::icons::{Plus, RefreshCw, Upload, X};
use crate::components::notice::{Notice, NoticeToast};
use crate::web::media::{read_file, selected_file};
use aptportal_shared::admin::TenantForm;
use aptportal_shared::identity::inline_error;
use aptportal_shared::protocol::{ListTenantsRequest, OcrIdCardRequest};
use aptportal_shared::Tenant;
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn AdminTenantsPage() -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let (tenants, set_tenants) = signal(Vec::<Tenant>::new());
    let (loading, set_loading) = signal(true);
    let (adding, set_adding) = signal(false);
    let (search, set_search) = signal(String::new());

    let load_tenants = move || {
        let api = api.clone();
        set_loading.set(true);
        spawn_local(async move {
            match api.send(&ListTenantsRequest).await {
                Ok(list) => set_tenants.set(list),
                Err(e) => notice.failure(&e, "Could not load tenants"),
            }
            set_loading.set(false);
        });
    };
    load_tenants();

    let visible = move || {
        let needle = search.get().trim().to_lowercase();
        tenants.with(|list| {
            list.iter()
                .filter(|t| {
                    needle.is_empty()
                        || t.full_name().to_lowercase().contains(&needle)
                        || t.phone.contains(&needle)
                        || t.id_card_number.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-6">
            <div class="flex flex-wrap justify-between items-center gap-2">
                <h1 class="text-2xl font-bold">"Tenants"</h1>
                <div class="flex gap-2">
                    <input
                        type="search"
                        class="input input-bordered input-sm"
                        placeholder="Search name, phone or ID"
                        on:input=move |ev| set_search.set(event_target_value(&ev))
                    />
                    <button class="btn btn-ghost btn-sm" on:click={
                        let load_tenants = load_tenants.clone();
                        move |_| load_tenants()
                    }>
                        <RefreshCw attr:class=move || if loading.get() { "h-4 w-4 animate-spin" } else { "h-4 w-4" } />
                    </button>
                    <button class="btn btn-primary btn-sm" on:click=move |_| set_adding.set(true)>
                        <Plus attr:class="h-4 w-4" /> "Add tenant"
                    </button>
                </div>
            </div>

            <div class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-3 gap-4">
                <For
                    each=visible
                    key=|t| (t.id, t.id_card_number.clone())
                    children=move |tenant| {
                        let active = tenant.status == "active";
                        view! {
                            <div class="card bg-base-100 shadow-sm border border-base-200">
                                <div class="card-body p-4">
                                    <div class="flex justify-between items-start">
                                        <h2 class="card-title text-base">{tenant.full_name()}</h2>
                                        <span class=if active { "badge badge-success" } else { "badge badge-ghost" }>
                                            {tenant.status.clone()}
                                        </span>
                                    </div>
                                    <p class="text-sm">{format!("Phone: {}", tenant.phone)}</p>
                                    <p class="text-sm font-mono">{format!("ID: {}", tenant.id_card_number)}</p>
                                </div>
                            </div>
                        }
                    }
                />
            </div>
            <Show when=move || !loading.get() && tenants.with(Vec::is_empty)>
                <div class="text-center text-base-content/60 py-10">"No tenants yet"</div>
            </Show>
        </div>

        <Show when=move || adding.get()>
            <AddTenantModal
                notice=notice
                on_close=move |_| set_adding.set(false)
                on_success={
                    let load_tenants = load_tenants.clone();
                    move |_| load_tenants()
                }
            />
        </Show>
    }
}

#[component]
fn AddTenantModal(
    notice: Notice,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_success: Callback<()>,
) -> impl IntoView {
    let api = use_api();

    let form = RwSignal::new(TenantForm::default());
    let (scanning, set_scanning) = signal(false);
    let (scan_error, set_scan_error) = signal(None::<String>);
    let (saving, set_saving) = signal(false);

    let on_scan = {
        let api = api.clone();
        move |ev: leptos::ev::Event| {
            let Some(file) = selected_file(&ev) else {
                return;
            };
            let api = api.clone();
            set_scanning.set(true);
            set_scan_error.set(None);
            spawn_local(async move {
                let result = match read_file(&file).await {
                    Ok(image) => api.send(&OcrIdCardRequest { image }).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(resp) => match form.try_update(|f| f.apply_ocr(&resp)).flatten() {
                        Some(id) => notice.success(format!("ID number read: {}", id)),
                        None => set_scan_error.set(Some(
                            "The image was read but no ID number was found. Try a clearer photo.".to_string(),
                        )),
                    },
                    Err(e) => {
                        warn!("[Tenants] ID OCR failed: {}", e);
                        set_scan_error.set(Some("Could not reach the recognition service".to_string()));
                    }
                }
                set_scanning.set(false);
            });
        }
    };

    let on_submit = move |_: leptos::ev::MouseEvent| {
        let req = match form.with_untracked(TenantForm::to_request) {
            Ok(req) => req,
            Err(e) => return notice.error(e.message),
        };
        let api = api.clone();
        set_saving.set(true);
        spawn_local(async move {
            match api.send(&req).await {
                Ok(_) => {
                    notice.success("Tenant added");
                    on_success.run(());
                    on_close.run(());
                }
                Err(e) => notice.failure(&e, "Could not add the tenant"),
            }
            set_saving.set(false);
        });
    };

    let text = move |label: &'static str,
                     get: fn(&TenantForm) -> String,
                     set: fn(&mut TenantForm, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
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
                <h3 class="font-bold text-lg mb-4">"Add tenant"</h3>

                <div class="rounded-box border border-dashed p-4 text-center mb-4 bg-base-200">
                    <p class="text-sm mb-2">"Upload an ID card photo to fill in the form automatically"</p>
                    <label class="btn btn-info btn-sm" class:btn-disabled=move || scanning.get()>
                        <Upload attr:class="h-4 w-4" />
                        {move || if scanning.get() { "Analysing..." } else { "Choose ID card image" }}
                        <input type="file" accept="image/*" class="hidden" on:change=on_scan />
                    </label>
                    {move || scan_error.get().map(|msg| view! {
                        <div class="alert alert-warning text-sm mt-2">{msg}</div>
                    })}
                </div>

                <div class="grid grid-cols-2 gap-2">
                    {text("First name", |f| f.first_name.clone(), |f, v| f.first_name = v)}
                    {text("Last name", |f| f.last_name.clone(), |f, v| f.last_name = v)}
                    {text("Phone", |f| f.phone.clone(), |f, v| f.phone = v)}
                    {text("ID card / passport", |f| f.id_card_number.clone(), |f, v| f.id_card_number = v)}
                </div>
                {move || form.with(|f| inline_error(&f.id_card_number)).map(|msg| view! {
                    <p class="text-error text-xs mt-1">{msg}</p>
                })}

                <div class="modal-action">
                    <button class="btn btn-ghost" on:click=move |_| on_close.run(())>"Cancel"</button>
                    <button class="btn btn-primary" disabled=move || saving.get() on:click=on_submit>"Save"</button>
                </div>
            </div>
        </div>
    }
}
