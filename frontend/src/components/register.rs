//! 注册页；管理员登录时作为"添加租户"使用

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::confirm::{ConfirmDialog, Confirmation};
use crate::components::notice::{Notice, NoticeToast};
use crate::web::router::use_navigate;
use aptportal_shared::account::RegisterForm;
use aptportal_shared::{AppRoute, Layout};
use leptos::prelude::*;
use leptos::task::spawn_local;

const PDPA_TEXT: &str = "We collect your name, email, phone number and identity documents \
to manage your tenancy, deposits and building access. Your data is kept by the apartment \
management, is not sold to third parties, and you may request access or deletion at any time \
under the Personal Data Protection Act B.E. 2562.";

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let navigate = use_navigate();
    let notice = Notice::new();

    let layout = auth.layout_signal();
    let is_admin = move || layout.get() == Layout::Admin;
    let form = RwSignal::new(RegisterForm::default());
    let (consent_open, set_consent_open) = signal(false);
    let (submitting, set_submitting) = signal(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        // 先校验，通过后再请求 PDPA 同意
        match form.with_untracked(RegisterForm::validate) {
            Ok(()) => set_consent_open.set(true),
            Err(e) => notice.error(e.message),
        }
    };

    let on_consent = move |answer: Confirmation| {
        set_consent_open.set(false);
        if answer == Confirmation::Cancelled {
            return;
        }
        let req = match form.with_untracked(RegisterForm::to_request) {
            Ok(req) => req,
            Err(e) => return notice.error(e.message),
        };
        let admin = is_admin();
        let api = api.clone();
        set_submitting.set(true);
        spawn_local(async move {
            match api.send(&req).await {
                Ok(_) if admin => {
                    notice.success("Tenant account created");
                    form.set(RegisterForm::default());
                    navigate(AppRoute::Dashboard);
                }
                Ok(_) => {
                    notice.success("Registration complete. Please sign in.");
                    navigate(AppRoute::Login);
                }
                Err(e) => notice.failure(&e, "Registration failed"),
            }
            set_submitting.set(false);
        });
    };

    let field = move |id: &'static str,
                      label: &'static str,
                      kind: &'static str,
                      required: bool,
                      get: fn(&RegisterForm) -> &String,
                      set: fn(&mut RegisterForm, String)| {
        view! {
            <div class="form-control">
                <label class="label" for=id>
                    <span class="label-text">{label}</span>
                </label>
                <input
                    id=id
                    type=kind
                    required=required
                    class="input input-bordered w-full"
                    prop:value=move || form.with(|f| get(f).clone())
                    on:input=move |ev| form.update(|f| set(f, event_target_value(&ev)))
                />
            </div>
        }
    };

    view! {
        <NoticeToast notice=notice />
        <div class="card max-w-2xl mx-auto bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h2 class="card-title text-2xl">
                    {move || if is_admin() { "Add tenant" } else { "Create an account" }}
                </h2>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    {field("reg_first", "First name", "text", true, |f| &f.first_name, |f, v| f.first_name = v)}
                    {field("reg_last", "Last name", "text", true, |f| &f.last_name, |f, v| f.last_name = v)}
                    {field("reg_user", "Username", "text", true, |f| &f.username, |f, v| f.username = v)}
                    {field("reg_phone", "Phone", "tel", false, |f| &f.phone, |f, v| f.phone = v)}
                </div>
                {field("reg_email", "Email", "email", true, |f| &f.email, |f, v| f.email = v)}
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    {field("reg_pass", "Password", "password", true, |f| &f.password, |f, v| f.password = v)}
                    {field("reg_confirm", "Confirm password", "password", true, |f| &f.confirm_password, |f, v| f.confirm_password = v)}
                </div>
                <div class="card-actions justify-end mt-4">
                    <button class="btn btn-primary" disabled=move || submitting.get()>
                        <Show when=move || submitting.get()>
                            <span class="loading loading-spinner"></span>
                        </Show>
                        {move || if is_admin() { "Create tenant" } else { "Register" }}
                    </button>
                </div>
            </form>
        </div>
        <ConfirmDialog
            open=consent_open
            title="Personal data consent (PDPA)"
            message=Signal::derive(|| PDPA_TEXT.to_string())
            confirm_label="I agree"
            on_close=on_consent
        />
    }
}
