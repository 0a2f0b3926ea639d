//! 页眉中的数字时钟

use crate::web::Interval;
use chrono::Local;
use leptos::prelude::*;

fn now_text() -> (String, String) {
    let now = Local::now();
    (
        now.format("%H:%M:%S").to_string(),
        now.format("%a %d %b %Y").to_string(),
    )
}

#[component]
pub fn DigitalClock() -> impl IntoView {
    let (time, set_time) = signal(now_text());

    // 随组件销毁而释放
    StoredValue::new_local(Interval::new(1000, move || set_time.set(now_text())));

    view! {
        <div class="hidden md:flex flex-col items-end leading-tight">
            <span class="font-mono text-lg font-bold">{move || time.get().0}</span>
            <span class="text-xs text-base-content/60">{move || time.get().1}</span>
        </div>
    }
}
