use crate::api::{media_url, use_api};
use crate::web::router::Link;
use aptportal_shared::date::display_datetime;
use aptportal_shared::payment::format_baht;
use aptportal_shared::protocol::{MyLatestContractRequest, MyRoomRequest};
use aptportal_shared::{AppRoute, Contract, MyRoom};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn MyRoomPage() -> impl IntoView {
    let api = use_api();

    let (room, set_room) = signal(None::<MyRoom>);
    let (contract, set_contract) = signal(None::<Contract>);
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(None::<String>);

    {
        let api = api.clone();
        spawn_local(async move {
            match api.send(&MyRoomRequest).await {
                Ok(r) => set_room.set(Some(r)),
                Err(e) => set_error_msg.set(Some(
                    e.user_message("No room is linked to your account yet"),
                )),
            }
            // 没有合同是正常情况
            match api.send(&MyLatestContractRequest).await {
                Ok(c) => set_contract.set(Some(c)),
                Err(e) => warn!("[MyRoom] no contract: {}", e),
            }
            set_loading.set(false);
        });
    }

    view! {
        <div class="space-y-6">
            <h1 class="text-2xl font-bold">"My room"</h1>
            <Show when=move || loading.get()>
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </Show>
            {move || error_msg.get().map(|msg| view! { <div class="alert alert-warning">{msg}</div> })}
            {move || room.get().map(|r| view! {
                <div class="card bg-base-100 shadow">
                    <div class="card-body">
                        <h2 class="card-title">{format!("Room {}", r.room_id)}</h2>
                        {r.building.map(|b| view! { <p>{format!("Building: {}", b)}</p> })}
                        {r.floor.map(|f| view! { <p>{format!("Floor: {}", f)}</p> })}
                        {r.status.map(|s| view! { <p>{format!("Status: {}", s)}</p> })}
                    </div>
                </div>
            })}
            {
                let api = api.clone();
                move || contract.get().map(|c| {
                    let pdf = media_url(&api, Some(&c.pdf_path()));
                    let status = c.deposit_status;
                    view! {
                        <div class="card bg-base-100 shadow">
                            <div class="card-body">
                                <h2 class="card-title">"Contract & deposit"</h2>
                                <p>{format!("Contract no. {}", c.contract_id)}</p>
                                <p>
                                    "Deposit: " <strong>{format!("{} THB", format_baht(c.deposit_amount))}</strong>
                                    " " <span class=status.tone().badge_class()>{status.label()}</span>
                                </p>
                                {c.deposit_due_date.clone().map(|d| view! {
                                    <p class="text-sm">{format!("Due: {}", display_datetime(Some(&d)))}</p>
                                })}
                                <div class="card-actions mt-2">
                                    {pdf.map(|href| view! {
                                        <a class="btn btn-outline btn-sm" href=href target="_blank" rel="noopener">"View contract PDF"</a>
                                    })}
                                    <Show when=move || status.accepts_payment()>
                                        <Link to=AppRoute::Payments class="btn btn-primary btn-sm">"Pay deposit"</Link>
                                    </Show>
                                </div>
                            </div>
                        </div>
                    }
                })
            }
        </div>
    }
}
