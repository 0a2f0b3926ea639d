//! 租户押金：合同状态与转账凭证提交

use crate::api::{media_url, use_api};
use crate::components::notice::{Notice, NoticeToast};
use crate::web::media::{ObjectUrl, read_file, selected_file};
use aptportal_shared::date::display_datetime;
use aptportal_shared::payment::{SlipForm, check_slip_file, format_baht};
use aptportal_shared::protocol::{MyLatestContractRequest, OcrSlipRequest};
use aptportal_shared::{Contract, DepositStatus, UploadFile};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn PaymentsPage() -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let (contract, set_contract) = signal(None::<Contract>);
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(None::<String>);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.send(&MyLatestContractRequest).await {
                    Ok(c) => {
                        set_contract.set(Some(c));
                        set_error_msg.set(None);
                    }
                    Err(e) => set_error_msg.set(Some(e.user_message("No deposit contract was found"))),
                }
                set_loading.set(false);
            });
        }
    };
    load();

    let status_hint = |status: DepositStatus| match status {
        DepositStatus::Pending => "Please transfer the deposit and upload the slip below.",
        DepositStatus::PendingReview => "Your slip has been received and is waiting for review.",
        DepositStatus::Overdue => "The deposit is overdue. Please pay as soon as possible.",
        DepositStatus::Paid => "Thank you. Your deposit has been confirmed.",
        DepositStatus::Unknown => "",
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-6">
            <h1 class="text-2xl font-bold">"Deposit payment"</h1>
            <Show when=move || loading.get()>
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </Show>
            {move || error_msg.get().map(|msg| view! { <div class="alert alert-warning">{msg}</div> })}
            {
                let api = api.clone();
                move || contract.get().map(|c| {
                    let status = c.deposit_status;
                    let slip = media_url(&api, c.deposit_slip_url.as_deref());
                    view! {
                        <div class="card bg-base-100 shadow">
                            <div class="card-body">
                                <h2 class="card-title">
                                    {format!("Contract no. {}", c.contract_id)}
                                    <span class=status.tone().badge_class()>{status.label()}</span>
                                </h2>
                                <p>{format!("Room {} • deposit {} THB", c.room_id, format_baht(c.deposit_amount))}</p>
                                {c.deposit_due_date.clone().map(|d| view! {
                                    <p class="text-sm">{format!("Due: {}", display_datetime(Some(&d)))}</p>
                                })}
                                <p class="text-sm text-base-content/70">{status_hint(status)}</p>
                                {slip.map(|href| view! {
                                    <a class="link link-primary text-sm" href=href target="_blank" rel="noopener">"View submitted slip"</a>
                                })}
                            </div>
                        </div>
                    }
                })
            }
            {
                let load = load.clone();
                move || {
                    contract
                        .get()
                        .filter(|c| c.deposit_status.accepts_payment())
                        .map(|c| {
                            let load = load.clone();
                            view! {
                                <PaymentForm
                                    contract_id=c.contract_id
                                    deposit_amount=c.deposit_amount
                                    notice=notice
                                    on_submitted=move |_| load()
                                />
                            }
                        })
                }
            }
        </div>
    }
}

#[component]
fn PaymentForm(
    contract_id: i64,
    deposit_amount: f64,
    notice: Notice,
    #[prop(into)] on_submitted: Callback<()>,
) -> impl IntoView {
    let api = use_api();

    let form = RwSignal::new(SlipForm::default());
    let slip = RwSignal::new(None::<UploadFile>);
    let preview = RwSignal::new_local(None::<ObjectUrl>);
    let (ocr_loading, set_ocr_loading) = signal(false);
    let (submitting, set_submitting) = signal(false);

    let on_file = {
        let api = api.clone();
        move |ev: leptos::ev::Event| {
            let Some(file) = selected_file(&ev) else {
                return;
            };
            let api = api.clone();
            spawn_local(async move {
                let upload = match read_file(&file).await {
                    Ok(upload) => upload,
                    Err(e) => return notice.failure(&e, "Could not read the slip"),
                };
                if let Err(e) = check_slip_file(&upload) {
                    return notice.error(e.message);
                }
                match ObjectUrl::new(&upload) {
                    Ok(url) => preview.set(Some(url)),
                    Err(e) => warn!("[Payments] preview failed: {}", e),
                }
                slip.set(Some(upload.clone()));

                // OCR 只负责预填，失败时手动输入
                set_ocr_loading.set(true);
                match api.send(&OcrSlipRequest { image: upload }).await {
                    Ok(resp) => {
                        if form.try_update(|f| f.apply_ocr(&resp)).unwrap_or(false) {
                            notice.success("Slip details filled in. Please check them before sending.");
                        }
                    }
                    Err(e) => {
                        warn!("[Payments] slip OCR failed: {}", e);
                        notice.error("Could not read the slip. Please fill in the details yourself.");
                    }
                }
                set_ocr_loading.set(false);
            });
        }
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = slip.with_untracked(|file| {
            form.with_untracked(|f| f.to_request(contract_id, Some(deposit_amount), file.as_ref()))
        });
        let req = match req {
            Ok(req) => req,
            Err(e) => return notice.error(e.message),
        };
        let api = api.clone();
        set_submitting.set(true);
        spawn_local(async move {
            match api.send(&req).await {
                Ok(_) => {
                    notice.success("Payment slip sent");
                    form.set(SlipForm::default());
                    slip.set(None);
                    preview.set(None);
                    on_submitted.run(());
                }
                Err(e) => notice.failure(&e, "Could not send the payment"),
            }
            set_submitting.set(false);
        });
    };

    let input = move |label: &'static str,
                      kind: &'static str,
                      get: fn(&SlipForm) -> String,
                      set: fn(&mut SlipForm, String)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    type=kind
                    class="input input-bordered"
                    prop:value=move || form.with(get)
                    on:input=move |ev| form.update(|f| set(f, event_target_value(&ev)))
                />
            </div>
        }
    };

    view! {
        <div class="card bg-base-100 shadow">
            <form class="card-body" on:submit=on_submit>
                <h2 class="card-title">"Upload transfer slip"</h2>
                <input
                    type="file"
                    accept="image/*"
                    class="file-input file-input-bordered w-full max-w-sm"
                    on:change=on_file
                />
                <Show when=move || ocr_loading.get()>
                    <div class="text-sm"><span class="loading loading-spinner loading-xs"></span>" Reading slip..."</div>
                </Show>
                {move || preview.with(|p| p.as_ref().map(|u| u.as_str().to_string())).map(|src| view! {
                    <img src=src alt="slip" class="max-h-64 rounded-box border self-start" />
                })}
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    {input("Bank", "text", |f| f.bank_name.clone(), |f, v| f.bank_name = v)}
                    {input("Reference number", "text", |f| f.reference_number.clone(), |f, v| f.reference_number = v)}
                    {input("Amount (THB)", "text", |f| f.amount_paid.clone(), |f, v| f.amount_paid = v)}
                    {input("Payer name", "text", |f| f.payer_name.clone(), |f, v| f.payer_name = v)}
                </div>
                <p class="text-xs text-base-content/60">
                    {format!("The amount must equal the deposit of {} THB.", format_baht(deposit_amount))}
                </p>
                <div class="card-actions justify-end">
                    <button class="btn btn-primary" disabled=move || submitting.get() || ocr_loading.get()>
                        <Show when=move || submitting.get()>
                            <span class="loading loading-spinner"></span>
                        </Show>
                        "Send payment"
                    </button>
                </div>
            </form>
        </div>
    }
}
