//! 管理员首页：预订申请审批

use crate::api::{media_url, use_api};
use crate::components::confirm::{ConfirmDialog, Confirmation};
use crate::components::icons::*;
use crate::components::notice::{Notice, NoticeToast};
use aptportal_shared::date::display_datetime;
use aptportal_shared::protocol::{
    ApproveBookingRequest, ContractByBookingRequest, ListBookingsRequest, ListTenantsRequest,
    RejectBookingRequest,
};
use aptportal_shared::review::default_contract_text;
use aptportal_shared::{BookingRequest, BookingStatus, Tenant, sort_newest_first};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

fn status_badge(status: BookingStatus) -> (&'static str, &'static str) {
    match status {
        BookingStatus::Pending => ("badge badge-warning", "Pending"),
        BookingStatus::Approved => ("badge badge-success", "Approved"),
        BookingStatus::Rejected => ("badge badge-error", "Rejected"),
        BookingStatus::Unknown => ("badge badge-ghost", "Unknown"),
    }
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let (bookings, set_bookings) = signal(Vec::<BookingRequest>::new());
    let (tenants, set_tenants) = signal(Vec::<Tenant>::new());
    let (loading, set_loading) = signal(true);
    let approving = RwSignal::new(None::<(BookingRequest, String)>);
    let rejecting = RwSignal::new(None::<BookingRequest>);
    let (busy, set_busy) = signal(false);

    let load_bookings = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.send(&ListBookingsRequest).await {
                    Ok(mut data) => {
                        sort_newest_first(&mut data);
                        set_bookings.set(data);
                    }
                    Err(e) => notice.failure(&e, "Could not load booking requests"),
                }
                set_loading.set(false);
            });
        }
    };
    load_bookings();

    {
        let api = api.clone();
        spawn_local(async move {
            match api.send(&ListTenantsRequest).await {
                Ok(list) => set_tenants.set(list),
                Err(e) => warn!("[Dashboard] tenant roster unavailable: {}", e),
            }
        });
    }

    let handle_approve = {
        let api = api.clone();
        let load_bookings = load_bookings.clone();
        move |_: leptos::ev::MouseEvent| {
            let Some((booking, contract_text)) = approving.get_untracked() else {
                return;
            };
            if contract_text.trim().is_empty() {
                return notice.error("The contract text cannot be empty");
            }
            let api = api.clone();
            let load_bookings = load_bookings.clone();
            set_busy.set(true);
            spawn_local(async move {
                let req = ApproveBookingRequest {
                    id: booking.id,
                    contract_text,
                };
                match api.send(&req).await {
                    Ok(_) => {
                        notice.success("Booking approved. The deposit contract was sent to the tenant.");
                        approving.set(None);
                        load_bookings();
                    }
                    Err(e) => notice.failure(&e, "Could not approve the booking"),
                }
                set_busy.set(false);
            });
        }
    };

    let handle_reject = {
        let api = api.clone();
        let load_bookings = load_bookings.clone();
        move |answer: Confirmation| {
            let target = rejecting.get_untracked();
            rejecting.set(None);
            let (Confirmation::Confirmed, Some(booking)) = (answer, target) else {
                return;
            };
            let api = api.clone();
            let load_bookings = load_bookings.clone();
            spawn_local(async move {
                match api.send(&RejectBookingRequest { id: booking.id }).await {
                    Ok(_) => {
                        notice.success("Booking rejected");
                        load_bookings();
                    }
                    Err(e) => notice.failure(&e, "Could not reject the booking"),
                }
            });
        }
    };

    // 合同 PDF 的地址需要先按预订号查询
    let open_contract = {
        let api = api.clone();
        move |booking_id: i64| {
            let api = api.clone();
            spawn_local(async move {
                let link = match api.send(&ContractByBookingRequest { booking_id }).await {
                    Ok(link) => link,
                    Err(e) => return notice.failure(&e, "No contract found for this booking"),
                };
                let Some(url) = media_url(&api, Some(&link.pdf_path())) else {
                    return;
                };
                if let Err(e) = window().open_with_url_and_target(&url, "_blank") {
                    warn!("[Dashboard] could not open contract: {:?}", e);
                }
            });
        }
    };

    let pending_count = move || bookings.with(|b| b.iter().filter(|b| b.is_pending()).count());
    let approved_count = move || {
        bookings.with(|b| b.iter().filter(|b| b.status == BookingStatus::Approved).count())
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-8">
            <h1 class="text-2xl font-bold">"Dashboard"</h1>

            <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                <div class="stat">
                    <div class="stat-figure text-warning"><FileText attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Waiting for review"</div>
                    <div class="stat-value text-warning">{pending_count}</div>
                </div>
                <div class="stat">
                    <div class="stat-figure text-success"><Check attr:class="h-8 w-8" /></div>
                    <div class="stat-title">"Approved"</div>
                    <div class="stat-value text-success">{approved_count}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"All requests"</div>
                    <div class="stat-value">{move || bookings.with(Vec::len)}</div>
                </div>
                <div class="stat">
                    <div class="stat-title">"Tenants"</div>
                    <div class="stat-value text-primary">{move || tenants.with(Vec::len)}</div>
                </div>
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <div>
                            <h3 class="card-title">"Booking requests"</h3>
                            <p class="text-base-content/70 text-sm">
                                "The AI check on the ID card is advisory only. Please review every request."
                            </p>
                        </div>
                        <button on:click={
                            let load_bookings = load_bookings.clone();
                            move |_| load_bookings()
                        } disabled=move || loading.get() class="btn btn-ghost btn-circle">
                            <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                        </button>
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"Applicant"</th>
                                    <th>"Room"</th>
                                    <th class="hidden md:table-cell">"ID / Passport"</th>
                                    <th>"AI check"</th>
                                    <th>"Status"</th>
                                    <th class="hidden md:table-cell">"Submitted"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || bookings.with(Vec::is_empty) && !loading.get()>
                                    <tr>
                                        <td colspan="7" class="text-center py-8 text-base-content/50">
                                            "No booking requests yet."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || bookings.get()
                                    key=|b| (b.id, b.is_pending())
                                    children={
                                        let api = api.clone();
                                        let open_contract = open_contract.clone();
                                        move |booking| {
                                            let (status_class, status_label) = status_badge(booking.status);
                                            let ai_class = booking.ai_status.tone(booking.ai_confidence).badge_class();
                                            let id_image = media_url(&api, booking.id_image_url.as_deref());
                                            let pending = booking.is_pending();
                                            let approved = booking.status == BookingStatus::Approved;
                                            let id = booking.id;
                                            let for_approve = booking.clone();
                                            let for_reject = booking.clone();
                                            let open_contract = open_contract.clone();
                                            view! {
                                                <tr>
                                                    <td>
                                                        <div class="font-bold">{booking.full_name()}</div>
                                                        <div class="text-xs opacity-60">{booking.phone.clone()}</div>
                                                    </td>
                                                    <td>{booking.room_id}</td>
                                                    <td class="hidden md:table-cell font-mono text-sm">
                                                        {booking.id_card_number.clone()}
                                                        {id_image.map(|href| view! {
                                                            <a class="link link-primary text-xs ml-2" href=href target="_blank" rel="noopener">"image"</a>
                                                        })}
                                                    </td>
                                                    <td>
                                                        <div class="tooltip" data-tip=booking.ai_remark.clone()>
                                                            <span class=ai_class>{format!("{:.0}%", booking.ai_confidence)}</span>
                                                        </div>
                                                    </td>
                                                    <td><span class=status_class>{status_label}</span></td>
                                                    <td class="hidden md:table-cell text-xs">{display_datetime(Some(&booking.created_at))}</td>
                                                    <td>
                                                        <div class="flex gap-1 justify-end">
                                                            <Show when=move || pending>
                                                                <button class="btn btn-success btn-xs" on:click={
                                                                    let b = for_approve.clone();
                                                                    move |_| {
                                                                        let text = default_contract_text(&b, chrono::Local::now().date_naive());
                                                                        approving.set(Some((b.clone(), text)));
                                                                    }
                                                                }>"Approve"</button>
                                                                <button class="btn btn-error btn-outline btn-xs" on:click={
                                                                    let b = for_reject.clone();
                                                                    move |_| rejecting.set(Some(b.clone()))
                                                                }>"Reject"</button>
                                                            </Show>
                                                            <Show when=move || approved>
                                                                <button class="btn btn-ghost btn-xs" on:click={
                                                                    let open_contract = open_contract.clone();
                                                                    move |_| open_contract(id)
                                                                }>
                                                                    <FileText attr:class="h-4 w-4" /> "Contract"
                                                                </button>
                                                            </Show>
                                                        </div>
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
            </div>

            <div class="card bg-base-100 shadow-xl">
                <div class="card-body">
                    <h3 class="card-title">"Current tenants"</h3>
                    <div class="overflow-x-auto">
                        <table class="table table-sm">
                            <thead>
                                <tr><th>"Name"</th><th>"Phone"</th><th>"ID / Passport"</th><th>"Status"</th></tr>
                            </thead>
                            <tbody>
                                {move || tenants.get().into_iter().map(|t| view! {
                                    <tr>
                                        <td>{t.full_name()}</td>
                                        <td>{t.phone}</td>
                                        <td class="font-mono text-sm">{t.id_card_number}</td>
                                        <td><span class="badge badge-outline">{t.status}</span></td>
                                    </tr>
                                }).collect_view()}
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>

        <Show when=move || approving.with(Option::is_some)>
            <div class="modal modal-open">
                <div class="modal-box max-w-3xl">
                    <h3 class="font-bold text-lg">
                        {move || approving.with(|a| a.as_ref().map(|(b, _)| format!("Approve booking for {}", b.full_name())).unwrap_or_default())}
                    </h3>
                    <p class="text-sm text-base-content/70 py-2">
                        "Review or edit the deposit contract. A PDF is generated from this text and sent to the tenant."
                    </p>
                    <textarea
                        class="textarea textarea-bordered w-full h-80 font-mono text-sm"
                        prop:value=move || approving.with(|a| a.as_ref().map(|(_, t)| t.clone()).unwrap_or_default())
                        on:input=move |ev| approving.update(|a| if let Some((_, t)) = a { *t = event_target_value(&ev) })
                    ></textarea>
                    <div class="modal-action">
                        <button class="btn btn-ghost" on:click=move |_| approving.set(None)>"Cancel"</button>
                        <button class="btn btn-success" disabled=move || busy.get() on:click=handle_approve.clone()>
                            <Show when=move || busy.get()>
                                <span class="loading loading-spinner"></span>
                            </Show>
                            "Approve & send contract"
                        </button>
                    </div>
                </div>
            </div>
        </Show>

        <ConfirmDialog
            open=Signal::derive(move || rejecting.with(Option::is_some))
            title="Reject booking"
            message=Signal::derive(move || {
                rejecting.with(|b| b.as_ref().map(|b| format!("Reject the request from {}?", b.full_name())).unwrap_or_default())
            })
            confirm_label="Reject"
            danger=true
            on_close=handle_reject
        />
    }
}
