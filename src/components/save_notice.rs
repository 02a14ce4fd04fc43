//! Save Notice Component
//!
//! Shows why a milestone change did not stick.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

const AUTO_DISMISS_MS: u32 = 8_000;

/// Id of the failure a notice is about
fn failure_id(notice: &Option<(u64, String)>) -> Option<u64> {
    notice.as_ref().map(|(id, _)| *id)
}

/// Dismissible failure banner; hides itself after a few seconds.
///
/// `notice` pairs the failure count with its message, so a repeated
/// identical error still gets its own countdown.
#[component]
pub fn SaveNotice(
    #[prop(into)] notice: Signal<Option<(u64, String)>>,
    #[prop(into)] on_dismiss: Callback<()>,
) -> impl IntoView {
    Effect::new(move |_| {
        if let Some(shown) = notice.with(failure_id) {
            spawn_local(async move {
                TimeoutFuture::new(AUTO_DISMISS_MS).await;
                // A newer failure restarts the countdown
                if notice.try_with_untracked(failure_id).flatten() == Some(shown) {
                    on_dismiss.run(());
                }
            });
        }
    });

    view! {
        {move || notice.get().map(|(_, msg)| view! {
            <div class="save-notice" role="alert">
                <span class="save-notice-text">"Couldn't save: " {msg} ". The change was undone."</span>
                <button class="save-notice-close" on:click=move |_| on_dismiss.run(())>"×"</button>
            </div>
        })}
    }
}
