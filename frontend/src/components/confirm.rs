//! 确认对话框
//!
//! 调用方只关心结果：`on_close` 收到 `Confirmation`，
//! 由调用方决定确认后做什么。

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Cancelled,
}

#[component]
pub fn ConfirmDialog(
    #[prop(into)] open: Signal<bool>,
    #[prop(into)] title: String,
    #[prop(into)] message: Signal<String>,
    #[prop(into, default = "Confirm".to_string())] confirm_label: String,
    #[prop(optional)] danger: bool,
    #[prop(into)] on_close: Callback<Confirmation>,
) -> impl IntoView {
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            if open.get() {
                if !dialog.open() {
                    let _ = dialog.show_modal();
                }
            } else if dialog.open() {
                dialog.close();
            }
        }
    });

    let confirm_class = if danger { "btn btn-error" } else { "btn btn-primary" };

    view! {
        // Esc 关闭视为取消
        <dialog
            class="modal"
            node_ref=dialog_ref
            on:cancel=move |ev: leptos::ev::Event| {
                ev.prevent_default();
                on_close.run(Confirmation::Cancelled);
            }
        >
            <div class="modal-box">
                <h3 class="font-bold text-lg">{title}</h3>
                <p class="py-4 text-base-content/70">{move || message.get()}</p>
                <div class="modal-action">
                    <button class="btn btn-ghost" on:click=move |_| on_close.run(Confirmation::Cancelled)>
                        "Cancel"
                    </button>
                    <button class=confirm_class on:click=move |_| on_close.run(Confirmation::Confirmed)>
                        {confirm_label}
                    </button>
                </div>
            </div>
        </dialog>
    }
}
