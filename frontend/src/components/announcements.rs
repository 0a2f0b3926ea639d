//! 公告：管理员维护，租户只读

use crate::api::use_api;
use crate::components::confirm::{ConfirmDialog, Confirmation};
use crate::components::icons::{Pencil, Plus, Trash2};
use crate::components::notice::{Notice, NoticeToast};
use aptportal_shared::date::display_datetime;
use aptportal_shared::protocol::{
    AnnouncementPayload, CreateAnnouncementRequest, DeleteAnnouncementRequest,
    ListAnnouncementsRequest, UpdateAnnouncementRequest,
};
use aptportal_shared::{Announcement, PortalError, PortalResult};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 编辑中的公告，`id` 为 `None` 表示新建
#[derive(Debug, Clone, Default)]
struct AnnouncementDraft {
    id: Option<i64>,
    title: String,
    content: String,
}

impl AnnouncementDraft {
    fn payload(&self) -> PortalResult<AnnouncementPayload> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(PortalError::validation("Please enter a title and content"));
        }
        Ok(AnnouncementPayload {
            title: title.to_string(),
            content: content.to_string(),
        })
    }
}

#[component]
pub fn AdminAnnouncementsPage() -> impl IntoView {
    view! { <AnnouncementBoard editable=true /> }
}

#[component]
pub fn TenantAnnouncementsPage() -> impl IntoView {
    view! { <AnnouncementBoard editable=false /> }
}

#[component]
fn AnnouncementBoard(editable: bool) -> impl IntoView {
    let api = use_api();
    let notice = Notice::new();

    let (items, set_items) = signal(Vec::<Announcement>::new());
    let (loading, set_loading) = signal(true);
    let draft = RwSignal::new(None::<AnnouncementDraft>);
    let (saving, set_saving) = signal(false);
    let pending_delete = RwSignal::new(None::<Announcement>);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            spawn_local(async move {
                match api.send(&ListAnnouncementsRequest).await {
                    Ok(list) => set_items.set(list),
                    Err(e) => notice.failure(&e, "Could not load announcements"),
                }
                set_loading.set(false);
            });
        }
    };
    load();

    let on_save = {
        let api = api.clone();
        let load = load.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let Some(current) = draft.get_untracked() else {
                return;
            };
            let payload = match current.payload() {
                Ok(p) => p,
                Err(e) => return notice.error(e.message),
            };
            let api = api.clone();
            let load = load.clone();
            set_saving.set(true);
            spawn_local(async move {
                let result = match current.id {
                    Some(id) => api
                        .send(&UpdateAnnouncementRequest { id, payload })
                        .await
                        .map(|_| "Announcement updated"),
                    None => api
                        .send(&CreateAnnouncementRequest(payload))
                        .await
                        .map(|_| "Announcement posted"),
                };
                match result {
                    Ok(msg) => {
                        notice.success(msg);
                        draft.set(None);
                        load();
                    }
                    Err(e) => notice.failure(&e, "Could not save the announcement"),
                }
                set_saving.set(false);
            });
        }
    };

    let on_delete = {
        let api = api.clone();
        let load = load.clone();
        move |answer: Confirmation| {
            let target = pending_delete.get_untracked();
            pending_delete.set(None);
            let (Confirmation::Confirmed, Some(Announcement { id: Some(id), .. })) = (answer, target)
            else {
                return;
            };
            let api = api.clone();
            let load = load.clone();
            spawn_local(async move {
                match api.send(&DeleteAnnouncementRequest { id }).await {
                    Ok(_) => {
                        notice.success("Announcement deleted");
                        load();
                    }
                    Err(e) => notice.failure(&e, "Could not delete the announcement"),
                }
            });
        }
    };

    view! {
        <NoticeToast notice=notice />
        <div class="space-y-6">
            <div class="flex justify-between items-center">
                <h1 class="text-2xl font-bold">"Announcements"</h1>
                <Show when=move || editable>
                    <button class="btn btn-primary btn-sm" on:click=move |_| draft.set(Some(AnnouncementDraft::default()))>
                        <Plus attr:class="h-4 w-4" /> "New announcement"
                    </button>
                </Show>
            </div>

            <Show when=move || draft.with(Option::is_some)>
                <div class="card bg-base-100 shadow">
                    <form class="card-body" on:submit=on_save.clone()>
                        <h2 class="card-title">
                            {move || if draft.with(|d| d.as_ref().is_some_and(|d| d.id.is_some())) { "Edit announcement" } else { "New announcement" }}
                        </h2>
                        <input
                            class="input input-bordered"
                            placeholder="Title"
                            prop:value=move || draft.with(|d| d.as_ref().map(|d| d.title.clone()).unwrap_or_default())
                            on:input=move |ev| draft.update(|d| if let Some(d) = d { d.title = event_target_value(&ev) })
                        />
                        <textarea
                            class="textarea textarea-bordered h-32"
                            placeholder="Content"
                            prop:value=move || draft.with(|d| d.as_ref().map(|d| d.content.clone()).unwrap_or_default())
                            on:input=move |ev| draft.update(|d| if let Some(d) = d { d.content = event_target_value(&ev) })
                        ></textarea>
                        <div class="card-actions justify-end">
                            <button type="button" class="btn btn-ghost" on:click=move |_| draft.set(None)>"Cancel"</button>
                            <button class="btn btn-primary" disabled=move || saving.get()>"Save"</button>
                        </div>
                    </form>
                </div>
            </Show>

            <Show when=move || loading.get()>
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </Show>
            <Show when=move || !loading.get() && items.with(Vec::is_empty)>
                <div class="text-center text-base-content/60 py-10">"No announcements yet"</div>
            </Show>

            <div class="space-y-4">
                <For
                    each=move || items.get()
                    key=|a| (a.id, a.title.clone())
                    children=move |a| {
                        let edit = a.clone();
                        let remove = a.clone();
                        view! {
                            <div class="card bg-base-100 shadow-sm border border-base-200">
                                <div class="card-body">
                                    <div class="flex justify-between items-start gap-4">
                                        <div>
                                            <h2 class="card-title">{a.title.clone()}</h2>
                                            <p class="text-xs text-base-content/60">{display_datetime(a.created_at.as_deref())}</p>
                                        </div>
                                        <Show when=move || editable>
                                            <div class="flex gap-1">
                                                <button class="btn btn-ghost btn-sm btn-square" title="Edit" on:click={
                                                    let edit = edit.clone();
                                                    move |_| draft.set(Some(AnnouncementDraft {
                                                        id: edit.id,
                                                        title: edit.title.clone(),
                                                        content: edit.content.clone(),
                                                    }))
                                                }>
                                                    <Pencil attr:class="h-4 w-4" />
                                                </button>
                                                <button class="btn btn-ghost btn-sm btn-square text-error" title="Delete" on:click={
                                                    let remove = remove.clone();
                                                    move |_| pending_delete.set(Some(remove.clone()))
                                                }>
                                                    <Trash2 attr:class="h-4 w-4" />
                                                </button>
                                            </div>
                                        </Show>
                                    </div>
                                    <p class="whitespace-pre-line">{a.content.clone()}</p>
                                </div>
                            </div>
                        }
                    }
                />
            </div>
        </div>

        <ConfirmDialog
            open=Signal::derive(move || pending_delete.with(Option::is_some))
            title="Delete announcement"
            message=Signal::derive(move || {
                pending_delete.with(|a| a.as_ref().map(|a| format!("Delete \"{}\"?", a.title)).unwrap_or_default())
            })
            confirm_label="Delete"
            danger=true
            on_close=on_delete
        />
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_requires_title_and_content() {
        let mut draft = AnnouncementDraft {
            id: None,
            title: " Water shutdown ".into(),
            content: "   ".into(),
        };
        assert!(draft.payload().is_err());
        draft.content = "Tuesday 9:00-12:00".into();
        let payload = draft.payload().unwrap();
        assert_eq!(payload.title, "Water shutdown");
    }
}
