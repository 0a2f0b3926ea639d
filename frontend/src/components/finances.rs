//! 管理员：押金付款审核

use crate::api::{media_url, use_api};
use crate::components::icons::{Check, RefreshCw, X};
use crate::components::notice::{Notice, NoticeToast};
use aptportal_shared::date::display_datetime;
use aptportal_shared::payment::format_baht;
use aptportal_shared::protocol::{ListAdminPaymentsRequest, ReviewAction, ReviewPaymentRequest};
use aptportal_shared::{Payment, PaymentStatus};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn AdminFinancesPage() -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let payments = RwSignal::new(Vec::<Payment>::new());
    let (loading, set_loading) = signal(true);
    // 正在处理的付款单，避免重复点击
    let (reviewing, set_reviewing) = signal(None::<i64>);

    let load_payments = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.send(&ListAdminPaymentsRequest).await {
                    Ok(list) => payments.set(list),
                    Err(e) => notice.failure(&e, "Could not load payments"),
                }
                set_loading.set(false);
            });
        }
    };
    load_payments();

    let review = {
        let api = api.clone();
        move |payment_id: i64, action: ReviewAction| {
            let api = api.clone();
            set_reviewing.set(Some(payment_id));
            spawn_local(async move {
                match api.send(&ReviewPaymentRequest { payment_id, action }).await {
                    Ok(updated) => {
                        // 服务端返回更新后的付款单，原地替换
                        payments.update(|list| {
                            if let Some(slot) = list.iter_mut().find(|p| p.payment_id == payment_id) {
                                *slot = updated;
                            }
                        });
                        notice.success(match action {
                            ReviewAction::Approve => "Payment approved",
                            ReviewAction::Reject => "Payment rejected",
                        });
                    }
                    Err(e) => notice.failure(&e, "Could not update the payment"),
                }
                set_reviewing.set(None);
            });
        }
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-2xl font-bold">"Tenant finances"</h1>
                <button class="btn btn-ghost btn-sm" on:click={
                    let load_payments = load_payments.clone();
                    move |_| load_payments()
                }>
                    <RefreshCw attr:class=move || if loading.get() { "h-4 w-4 animate-spin" } else { "h-4 w-4" } />
                    "Refresh"
                </button>
            </div>

            <div class="overflow-x-auto bg-base-100 rounded-box shadow">
                <table class="table table-zebra">
                    <thead>
                        <tr>
                            <th>"Date"</th>
                            <th>"Tenant"</th>
                            <th>"Room"</th>
                            <th>"Amount"</th>
                            <th>"Slip"</th>
                            <th>"Status"</th>
                            <th></th>
                        </tr>
                    </thead>
                    <tbody>
                        <Show when=move || payments.with(Vec::is_empty) && !loading.get()>
                            <tr><td colspan="7" class="text-center py-8 text-base-content/50">"No payments yet"</td></tr>
                        </Show>
                        <For
                            each=move || payments.get()
                            key=|p| (p.payment_id, p.payment_status == PaymentStatus::Pending)
                            children={
                                let api = api.clone();
                                move |p| {
                                    let slip = media_url(&api, p.slip_image_url.as_deref());
                                    let id = p.payment_id;
                                    let settled = matches!(p.payment_status, PaymentStatus::Approved | PaymentStatus::Rejected);
                                    let approve = review.clone();
                                    let reject = review.clone();
                                    view! {
                                        <tr>
                                            <td class="text-xs">{display_datetime(Some(&p.created_at))}</td>
                                            <td>
                                                <div class="font-bold">{p.tenant_name.clone().unwrap_or_else(|| "-".to_string())}</div>
                                                <div class="text-xs opacity-60">{format!("Payer: {}", p.payer_name)}</div>
                                            </td>
                                            <td>{p.room_no.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())}</td>
                                            <td>{format!("{} THB", format_baht(p.amount_paid))}</td>
                                            <td>
                                                {match slip {
                                                    Some(href) => view! {
                                                        <a class="link link-primary" href=href target="_blank" rel="noopener">"View"</a>
                                                    }.into_any(),
                                                    None => view! { <span class="opacity-50">"-"</span> }.into_any(),
                                                }}
                                            </td>
                                            <td><span class=p.payment_status.tone().badge_class()>{p.payment_status.label()}</span></td>
                                            <td>
                                                <Show when=move || !settled>
                                                    <div class="flex gap-1">
                                                        <button
                                                            class="btn btn-success btn-xs"
                                                            disabled=move || reviewing.get().is_some()
                                                            on:click={
                                                                let approve = approve.clone();
                                                                move |_| approve(id, ReviewAction::Approve)
                                                            }
                                                        >
                                                            <Check attr:class="h-3 w-3" /> "Approve"
                                                        </button>
                                                        <button
                                                            class="btn btn-error btn-outline btn-xs"
                                                            disabled=move || reviewing.get().is_some()
                                                            on:click={
                                                                let reject = reject.clone();
                                                                move |_| reject(id, ReviewAction::Reject)
                                                            }
                                                        >
                                                            <X attr:class="h-3 w-3" /> "Reject"
                                                        </button>
                                                    </div>
                                                </Show>
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
    }
}
