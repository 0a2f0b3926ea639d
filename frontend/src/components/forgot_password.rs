use crate::api::use_api;
use crate::components::notice::{Notice, NoticeToast};
use crate::web::router::{Link, use_navigate};
use aptportal_shared::AppRoute;
use aptportal_shared::account::ResetStep;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ForgotPasswordPage() -> impl IntoView {
    let api = use_api();
    let navigate = use_navigate();
    let notice = Notice::new();

    let step = RwSignal::new(ResetStep::default());
    let (contact, set_contact) = signal(String::new());
    let (code, set_code) = signal(String::new());
    let (new_password, set_new_password) = signal(String::new());
    let (confirm_password, set_confirm_password) = signal(String::new());
    let (busy, set_busy) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let request_code = {
        let api = api.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            set_error_msg.set(None);
            let contact = contact.get_untracked();
            let req = match ResetStep::request_code(&contact) {
                Ok(req) => req,
                Err(e) => return set_error_msg.set(Some(e.message)),
            };
            let api = api.clone();
            set_busy.set(true);
            spawn_local(async move {
                match api.send(&req).await {
                    Ok(_) => {
                        notice.success("A verification code has been sent");
                        step.set(ResetStep::code_sent(&contact));
                    }
                    Err(e) => set_error_msg.set(Some(
                        e.user_message("No account matches that email or phone number"),
                    )),
                }
                set_busy.set(false);
            });
        }
    };

    let reset_password = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        set_error_msg.set(None);
        let req = step.with_untracked(|s| {
            s.reset(
                &code.get_untracked(),
                &new_password.get_untracked(),
                &confirm_password.get_untracked(),
            )
        });
        let req = match req {
            Ok(req) => req,
            Err(e) => return set_error_msg.set(Some(e.message)),
        };
        let api = api.clone();
        set_busy.set(true);
        spawn_local(async move {
            match api.send(&req).await {
                Ok(_) => {
                    notice.success("Password changed. Please sign in with the new password.");
                    navigate(AppRoute::Login);
                }
                Err(e) => set_error_msg.set(Some(
                    e.user_message("The code is invalid or has expired"),
                )),
            }
            set_busy.set(false);
        });
    };

    let on_code_step = move || matches!(step.get(), ResetStep::EnterCode { .. });

    view! {
        <NoticeToast notice=notice />
        <div class="card max-w-md mx-auto bg-base-100 shadow-xl">
            <div class="card-body">
                <h2 class="card-title text-2xl">"Recover your account"</h2>
                <ul class="steps w-full my-4">
                    <li class="step step-primary">"Email or phone"</li>
                    <li class=move || if on_code_step() { "step step-primary" } else { "step" }>
                        "Code & new password"
                    </li>
                </ul>
                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error text-sm py-2">
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>
                <Show
                    when=on_code_step
                    fallback=move || view! {
                        <form class="space-y-4" on:submit=request_code.clone()>
                            <input
                                type="text"
                                placeholder="Email or phone number"
                                class="input input-bordered w-full"
                                prop:value=contact
                                on:input=move |ev| set_contact.set(event_target_value(&ev))
                                required
                            />
                            <button class="btn btn-primary w-full" disabled=move || busy.get()>
                                "Send code"
                            </button>
                        </form>
                    }
                >
                    <form class="space-y-4" on:submit=reset_password.clone()>
                        <p class="text-sm text-base-content/70">
                            {move || match step.get() {
                                ResetStep::EnterCode { contact } => format!("Code sent to {}", contact),
                                ResetStep::RequestCode => String::new(),
                            }}
                        </p>
                        <input
                            type="text"
                            placeholder="Verification code"
                            class="input input-bordered w-full"
                            prop:value=code
                            on:input=move |ev| set_code.set(event_target_value(&ev))
                            required
                        />
                        <input
                            type="password"
                            placeholder="New password"
                            class="input input-bordered w-full"
                            prop:value=new_password
                            on:input=move |ev| set_new_password.set(event_target_value(&ev))
                            required
                        />
                        <input
                            type="password"
                            placeholder="Confirm new password"
                            class="input input-bordered w-full"
                            prop:value=confirm_password
                            on:input=move |ev| set_confirm_password.set(event_target_value(&ev))
                            required
                        />
                        <button class="btn btn-primary w-full" disabled=move || busy.get()>
                            "Change password"
                        </button>
                    </form>
                </Show>
                <Link to=AppRoute::Login class="link link-hover text-sm text-center">
                    "Back to sign in"
                </Link>
            </div>
        </div>
    }
}
