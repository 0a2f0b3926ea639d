//! 预订弹窗：上传或拍摄证件 → OCR 预填 → 校验 → 提交
//!
//! 状态全部在 `BookingFlow` 中；这里负责摄像头、预览 URL 与网络请求。

use crate::api::use_api;
use crate::auth::use_auth;
use crate::components::icons::{Camera, Upload, X};
use crate::components::notice::Notice;
use crate::web::media::{
    capture_frame, create_object_url, read_file, revoke_object_url, selected_file, start_camera,
    stop_camera,
};
use aptportal_shared::booking::{BookingFlow, BookingPhase, CaptureSource, CapturedImage};
use aptportal_shared::{PortalResult, Room, UploadFile};
use leptos::logging::{log, warn};
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::MediaStream;

fn revoke(url: Option<String>) {
    if let Some(url) = url {
        revoke_object_url(&url);
    }
}

#[component]
pub fn BookingModal(
    room: Room,
    notice: Notice,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let auth = use_auth();
    let api = use_api();

    let flow = RwSignal::new(BookingFlow::new(&auth.user_name()));
    let video_ref = NodeRef::<leptos::html::Video>::new();
    let stream = StoredValue::new_local(None::<MediaStream>);
    let camera_starting = StoredValue::new(false);

    let stop_stream = move || {
        if let Some(s) = stream.try_update_value(Option::take).flatten() {
            stop_camera(&s);
            log!("[Booking] camera stopped");
        }
    };

    // 需要实时画面时打开摄像头，否则关闭
    Effect::new(move |_| {
        let live = flow.with(BookingFlow::camera_live);
        let Some(video) = video_ref.get() else {
            return;
        };
        if !live {
            stop_stream();
            return;
        }
        if stream.with_value(Option::is_some) || camera_starting.get_value() {
            return;
        }
        camera_starting.set_value(true);
        spawn_local(async move {
            match start_camera(&video).await {
                // 等待授权期间弹窗可能已关闭或已切换到上传
                Ok(s) if flow.try_with_untracked(BookingFlow::camera_live).unwrap_or(false) => {
                    stream.set_value(Some(s))
                }
                Ok(s) => {
                    stop_camera(&s);
                    log!("[Booking] camera no longer needed, stopped");
                }
                Err(e) => notice.failure(&e, "Cannot open the camera. Please upload a photo instead."),
            }
            camera_starting.try_set_value(false);
        });
    });

    on_cleanup(move || {
        stop_stream();
        revoke(flow.with_untracked(|f| f.preview_url().map(str::to_string)));
    });

    // 新图片 → OCR
    let accept_image = {
        let api = api.clone();
        move |image: CapturedImage| {
            let (req, superseded) = match flow.try_update(|f| f.acquire_image(image.clone())) {
                Some(Ok(pair)) => pair,
                Some(Err(e)) => {
                    revoke_object_url(&image.preview_url);
                    return notice.error(e.message);
                }
                None => return,
            };
            revoke(superseded);
            let api = api.clone();
            spawn_local(async move {
                match api.send(&req).await {
                    Ok(resp) => {
                        flow.update(|f| f.apply_ocr(resp));
                        if let BookingPhase::OcrFailed(reason) = flow.with_untracked(|f| f.phase().clone()) {
                            notice.error(reason);
                        }
                    }
                    Err(e) => {
                        warn!("[Booking] OCR failed: {}", e);
                        flow.update(|f| f.ocr_failed(e.user_message("Could not reach the OCR service")));
                    }
                }
            });
        }
    };

    let on_file = {
        let accept_image = accept_image.clone();
        move |ev: leptos::ev::Event| {
            let Some(file) = selected_file(&ev) else {
                return;
            };
            let accept_image = accept_image.clone();
            spawn_local(async move {
                let loaded: PortalResult<(UploadFile, String)> = async {
                    let upload = read_file(&file).await?;
                    let url = create_object_url(&upload)?;
                    Ok((upload, url))
                }
                .await;
                match loaded {
                    Ok((file, preview_url)) => accept_image(CapturedImage { file, preview_url }),
                    Err(e) => notice.failure(&e, "Could not read the image"),
                }
            });
        }
    };

    let on_capture = move |_| {
        let Some(video) = video_ref.get_untracked() else {
            return;
        };
        match capture_frame(&video) {
            Ok((file, preview_url)) => accept_image(CapturedImage { file, preview_url }),
            Err(e) => notice.failure(&e, "Could not take the photo"),
        }
    };

    let on_retake = move |_| revoke(flow.try_update(BookingFlow::begin_capture).flatten());

    let room_id = room.id;
    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let req = match flow.try_update(|f| f.begin_submit(room_id)) {
            Some(Ok(req)) => req,
            Some(Err(e)) => return notice.error(e.message),
            None => return,
        };
        let api = api.clone();
        spawn_local(async move {
            match api.send(&req).await {
                Ok(_) => {
                    let kind = flow.with_untracked(|f| f.id_check().kind);
                    revoke(flow.try_update(BookingFlow::submit_succeeded).flatten());
                    log!("[Booking] submitted for room {}", room_id);
                    notice.success(format!("Booking request sent (identified by {})", kind));
                    on_close.run(());
                }
                Err(e) => {
                    let reason = e.user_message("The booking could not be sent");
                    flow.update(|f| f.submit_failed(reason.clone()));
                    notice.error(reason);
                }
            }
        });
    };

    let tab_class = move |source: CaptureSource| {
        if flow.with(|f| f.source() == source) {
            "tab tab-active gap-2"
        } else {
            "tab gap-2"
        }
    };
    let select = move |source: CaptureSource| {
        flow.update(|f| {
            f.select_source(source);
        })
    };
    let busy = move || flow.with(|f| f.phase().is_busy());
    let text_input = move |label: &'static str,
                           get: fn(&BookingFlow) -> String,
                           set: fn(&mut BookingFlow, &str)| {
        view! {
            <div class="form-control">
                <label class="label"><span class="label-text">{label}</span></label>
                <input
                    class="input input-bordered input-sm"
                    prop:value=move || flow.with(get)
                    on:input=move |ev| flow.update(|f| set(f, &event_target_value(&ev)))
                />
            </div>
        }
    };

    view! {
        <div class="modal modal-open">
            <div class="modal-box max-w-3xl">
                <button class="btn btn-sm btn-circle btn-ghost absolute right-2 top-2" on:click=move |_| on_close.run(())>
                    <X attr:class="h-4 w-4" />
                </button>
                <h3 class="font-bold text-lg">{format!("Book room {}", room.room_number)}</h3>
                <p class="text-sm text-base-content/70">
                    {format!("{} • floor {} • {} THB / month", room.building, room.floor, room.price)}
                </p>

                <div role="tablist" class="tabs tabs-boxed my-4">
                    <a role="tab" class=move || tab_class(CaptureSource::Upload) on:click=move |_| select(CaptureSource::Upload)>
                        <Upload attr:class="h-4 w-4" /> "Upload"
                    </a>
                    <a role="tab" class=move || tab_class(CaptureSource::Camera) on:click=move |_| select(CaptureSource::Camera)>
                        <Camera attr:class="h-4 w-4" /> "Camera"
                    </a>
                </div>

                <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                    <div class="space-y-2">
                        <video
                            node_ref=video_ref
                            autoplay
                            class=move || if flow.with(BookingFlow::camera_live) { "w-full rounded-box bg-black" } else { "hidden" }
                        ></video>
                        <Show when=move || flow.with(BookingFlow::camera_live)>
                            <button type="button" class="btn btn-primary btn-sm w-full" on:click=on_capture.clone()>
                                "Take photo"
                            </button>
                        </Show>
                        <Show when=move || flow.with(|f| f.source() == CaptureSource::Upload)>
                            <input
                                type="file"
                                accept="image/*"
                                class="file-input file-input-bordered file-input-sm w-full"
                                disabled=busy
                                on:change=on_file.clone()
                            />
                        </Show>
                        {move || flow.with(|f| f.preview_url().map(str::to_string)).map(|src| view! {
                            <img src=src alt="ID document" class="w-full rounded-box border" />
                        })}
                        <Show when=move || flow.with(|f| f.source() == CaptureSource::Camera && f.image().is_some())>
                            <button type="button" class="btn btn-ghost btn-sm w-full" disabled=busy on:click=on_retake>
                                "Retake"
                            </button>
                        </Show>
                        {move || match flow.with(|f| f.phase().clone()) {
                            BookingPhase::OcrPending => Some(view! {
                                <div class="alert text-sm"><span class="loading loading-spinner loading-sm"></span>"Reading your document..."</div>
                            }.into_any()),
                            BookingPhase::OcrDone => flow.with(|f| f.detected_id().map(str::to_string)).map(|id| view! {
                                <div class="alert alert-success text-sm">{format!("Detected ID: {}", id)}</div>
                            }.into_any()),
                            BookingPhase::OcrFailed(reason) => Some(view! {
                                <div class="alert alert-warning text-sm">{reason}</div>
                            }.into_any()),
                            _ => None,
                        }}
                    </div>

                    <form class="space-y-2" on:submit=on_submit>
                        {text_input("First name", |f| f.form().first_name.clone(), BookingFlow::set_first_name)}
                        {text_input("Last name", |f| f.form().last_name.clone(), BookingFlow::set_last_name)}
                        {text_input("Phone", |f| f.form().phone.clone(), BookingFlow::set_phone)}
                        <div class="form-control">
                            <label class="label"><span class="label-text">"ID card / passport number"</span></label>
                            <input
                                class=move || if flow.with(|f| f.id_error().is_some()) {
                                    "input input-bordered input-sm input-error font-mono"
                                } else {
                                    "input input-bordered input-sm font-mono"
                                }
                                prop:value=move || flow.with(|f| f.form().id_card_number.clone())
                                on:input=move |ev| flow.update(|f| {
                                    f.edit_id_number(&event_target_value(&ev));
                                })
                            />
                            <label class="label">
                                <span class="label-text-alt text-error">
                                    {move || flow.with(|f| f.id_error().map(str::to_string))}
                                </span>
                                <span class="label-text-alt">
                                    {move || flow.with(|f| {
                                        let check = f.id_check();
                                        check.is_valid.then(|| check.kind.to_string())
                                    })}
                                </span>
                            </label>
                        </div>
                        {move || match flow.with(|f| f.phase().clone()) {
                            BookingPhase::SubmitFailed(reason) => Some(view! {
                                <div class="alert alert-error text-sm">{reason}</div>
                            }),
                            _ => None,
                        }}
                        <ul class="text-xs text-base-content/60 list-disc pl-4">
                            <For
                                each=move || flow.with(|f| f.submit_blockers())
                                key=|b| b.to_string()
                                children=|b| view! { <li>{b.to_string()}</li> }
                            />
                        </ul>
                        <button class="btn btn-primary w-full" disabled=move || !flow.with(BookingFlow::can_submit)>
                            <Show when=move || flow.with(|f| *f.phase() == BookingPhase::Submitting)>
                                <span class="loading loading-spinner"></span>
                            </Show>
                            "Send booking request"
                        </button>
                    </form>
                </div>
            </div>
        </div>
    }
}
