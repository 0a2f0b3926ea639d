//! 页面内提示（toast）
//!
//! 每个页面持有一个 `Notice`，3 秒后自动清除。

use aptportal_shared::PortalError;
use leptos::prelude::*;

const NOTICE_TTL: std::time::Duration = std::time::Duration::from_secs(3);

/// 当前消息与代数；每条新消息代数加一，过期计时只清除自己那一代
#[derive(Debug, Clone, Default, PartialEq)]
struct NoticeState {
    generation: u64,
    /// 消息内容, 是否出错
    message: Option<(String, bool)>,
}

impl NoticeState {
    fn show(&mut self, message: String, is_err: bool) -> u64 {
        self.generation += 1;
        self.message = Some((message, is_err));
        self.generation
    }

    fn expire(&mut self, generation: u64) {
        if self.generation == generation {
            self.message = None;
        }
    }
}

#[derive(Clone, Copy)]
pub struct Notice(RwSignal<NoticeState>);

impl Notice {
    pub fn new() -> Self {
        Self(RwSignal::new(NoticeState::default()))
    }

    fn show(&self, message: String, is_err: bool) {
        let state = self.0;
        let Some(generation) = state.try_update(|s| s.show(message, is_err)) else {
            return;
        };
        // 3秒后清除通知
        set_timeout(
            move || {
                state.try_update(|s| s.expire(generation));
            },
            NOTICE_TTL,
        );
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message.into(), false);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message.into(), true);
    }

    /// 以失败提示展示错误，服务端未给出原因时使用 `fallback`
    pub fn failure(&self, err: &PortalError, fallback: &str) {
        self.error(err.user_message(fallback));
    }

    fn current(&self) -> Option<(String, bool)> {
        self.0.with(|s| s.message.clone())
    }
}

impl Default for Notice {
    fn default() -> Self {
        Self::new()
    }
}

#[component]
pub fn NoticeToast(notice: Notice) -> impl IntoView {
    move || {
        notice.current().map(|(message, is_err)| {
            let class = if is_err {
                "alert alert-error shadow-lg"
            } else {
                "alert alert-success shadow-lg"
            };
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div class=class>
                        <span>{message}</span>
                    </div>
                </div>
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::NoticeState;

    #[test]
    fn older_timer_does_not_clear_newer_message() {
        let mut state = NoticeState::default();
        let first = state.show("Save failed".into(), true);
        let second = state.show("Saved".into(), false);

        state.expire(first);
        assert_eq!(state.message, Some(("Saved".to_string(), false)));

        state.expire(second);
        assert_eq!(state.message, None);
    }

    #[test]
    fn same_text_twice_still_gets_full_lifetime() {
        let mut state = NoticeState::default();
        let first = state.show("Saved".into(), false);
        state.show("Saved".into(), false);
        state.expire(first);
        assert!(state.message.is_some());
    }
}
