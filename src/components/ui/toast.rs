use icons::X;
use leptos::prelude::*;
use std::time::Duration;
use tw_merge::tw_merge;

use crate::api::ApiError;

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Transient notifications shared through context.
#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            items: RwSignal::new(vec![]),
            next_id: StoredValue::new(1),
        }
    }

    fn push(&self, kind: ToastKind, message: String) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.items.update(|v| v.push(Toast { id, kind, message }));

        let this = *self;
        set_timeout(move || this.dismiss(id), TOAST_TTL);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastKind::Error, message.into());
    }

    pub fn api_error(&self, e: &ApiError) {
        log::warn!("request failed: {e}");
        self.error(e.user_message());
    }

    pub fn dismiss(&self, id: u64) {
        self.items.update(|v| v.retain(|t| t.id != id));
    }
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}

#[component]
pub fn Toaster() -> impl IntoView {
    let toasts = use_toasts();

    view! {
        <div data-name="Toaster" class="pointer-events-none fixed bottom-4 right-4 z-[60] flex w-80 flex-col gap-2">
            <For each=move || toasts.items.get() key=|t| t.id let:toast>
                {
                    let class = tw_merge!(
                        "pointer-events-auto flex items-start gap-2 rounded-md border px-3 py-2 text-sm shadow-md bg-background",
                        match toast.kind {
                            ToastKind::Success => "border-border text-foreground",
                            ToastKind::Error => "border-destructive/40 text-destructive",
                        }
                    );
                    let id = toast.id;
                    view! {
                        <div class=class role="status">
                            <span class="flex-1">{toast.message}</span>
                            <button
                                type="button"
                                class="text-muted-foreground hover:text-foreground [&_svg]:size-3.5"
                                aria-label="Dismiss"
                                on:click=move |_| toasts.dismiss(id)
                            >
                                <X />
                            </button>
                        </div>
                    }
                }
            </For>
        </div>
    }
}
