//! 个人资料：修改姓名与头像

use crate::api::{media_url, use_api};
use crate::auth::{update_user, use_auth};
use crate::components::notice::{Notice, NoticeToast};
use crate::web::media::{ObjectUrl, read_file, selected_file};
use aptportal_shared::UploadFile;
use aptportal_shared::account::{check_profile_image, profile_request, split_display_name};
use leptos::logging::warn;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let api = use_api();
    let notice = Notice::new();

    let user = auth.session.get_untracked().user;
    let (first, last) = user
        .as_ref()
        .map(|u| split_display_name(&u.user_name))
        .unwrap_or_default();
    let email = user.as_ref().map(|u| u.email.clone()).unwrap_or_default();

    let (first_name, set_first_name) = signal(first);
    let (last_name, set_last_name) = signal(last);
    let (saving, set_saving) = signal(false);
    let image = RwSignal::new(None::<UploadFile>);
    // 替换时旧的 Object URL 随之释放
    let preview = RwSignal::new_local(None::<ObjectUrl>);

    let current_image = move || {
        preview
            .with(|p| p.as_ref().map(|u| u.as_str().to_string()))
            .or_else(|| auth.session.with(|s| s.user.as_ref().and_then(|u| u.profile_image.clone())))
    };

    let on_file = move |ev: leptos::ev::Event| {
        let Some(file) = selected_file(&ev) else {
            return;
        };
        spawn_local(async move {
            let upload = match read_file(&file).await {
                Ok(upload) => upload,
                Err(e) => return notice.failure(&e, "Could not read the image"),
            };
            if let Err(e) = check_profile_image(&upload) {
                return notice.error(e.message);
            }
            match ObjectUrl::new(&upload) {
                Ok(url) => preview.set(Some(url)),
                Err(e) => warn!("[Profile] preview failed: {}", e),
            }
            image.set(Some(upload));
        });
    };

    let on_save = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = image.with_untracked(|img| {
            profile_request(&first_name.get_untracked(), &last_name.get_untracked(), img.as_ref())
        });
        let req = match req {
            Ok(req) => req,
            Err(e) => return notice.error(e.message),
        };
        let api = api.clone();
        set_saving.set(true);
        spawn_local(async move {
            match api.send(&req).await {
                Ok(resp) => {
                    let new_image = media_url(&api, resp.profile_image.as_deref());
                    update_user(&auth, &resp.display_name(), new_image);
                    image.set(None);
                    notice.success("Profile saved");
                }
                Err(e) => notice.failure(&e, "Could not save the profile"),
            }
            set_saving.set(false);
        });
    };

    view! {
        <NoticeToast notice=notice />
        <div class="card max-w-xl mx-auto bg-base-100 shadow-xl">
            <form class="card-body items-center" on:submit=on_save>
                <h2 class="card-title text-2xl self-start">"My profile"</h2>
                <div class="avatar placeholder my-4">
                    <div class="w-28 rounded-full bg-neutral text-neutral-content">
                        {move || match current_image() {
                            Some(src) => view! { <img src=src alt="profile" /> }.into_any(),
                            None => view! { <span class="text-3xl">{move || first_name.get().chars().next().unwrap_or('?').to_string()}</span> }.into_any(),
                        }}
                    </div>
                </div>
                <input
                    type="file"
                    accept="image/*"
                    class="file-input file-input-bordered file-input-sm w-full max-w-xs"
                    on:change=on_file
                />
                <p class="text-xs text-base-content/60">"JPG or PNG, up to 2 MB"</p>
                <div class="grid grid-cols-1 md:grid-cols-2 gap-4 w-full mt-4">
                    <div class="form-control">
                        <label class="label"><span class="label-text">"First name"</span></label>
                        <input
                            class="input input-bordered"
                            prop:value=first_name
                            on:input=move |ev| set_first_name.set(event_target_value(&ev))
                            required
                        />
                    </div>
                    <div class="form-control">
                        <label class="label"><span class="label-text">"Last name"</span></label>
                        <input
                            class="input input-bordered"
                            prop:value=last_name
                            on:input=move |ev| set_last_name.set(event_target_value(&ev))
                        />
                    </div>
                </div>
                <div class="form-control w-full">
                    <label class="label"><span class="label-text">"Email"</span></label>
                    <input class="input input-bordered" prop:value=email disabled />
                </div>
                <div class="card-actions w-full justify-end mt-4">
                    <button class="btn btn-primary" disabled=move || saving.get()>
                        <Show when=move || saving.get()>
                            <span class="loading loading-spinner"></span>
                        </Show>
                        "Save"
                    </button>
                </div>
            </form>
        </div>
    }
}
