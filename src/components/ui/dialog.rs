use icons::X;
use leptos::ev;
use leptos::prelude::*;
use leptos_dom::helpers::window_event_listener;
use leptos_ui::clx;
use tw_merge::*;

use crate::components::hooks::use_random::use_random_id_for;

mod components {
    use super::*;
    clx! {DialogBody, div, "flex flex-col gap-3"}
    clx! {DialogHeader, div, "mb-3 flex flex-col gap-1 text-left"}
    clx! {DialogDescription, p, "text-muted-foreground text-xs"}
    clx! {DialogFooter, footer, "flex items-center justify-end gap-2 pt-2"}
}

pub use components::*;

#[derive(Clone)]
struct DialogContext {
    title_id: String,
}

/// Modal driven by `open`. Closing (backdrop, Escape, close button) sets it to
/// `false` and then runs `on_close`.
#[component]
pub fn Dialog(
    open: RwSignal<bool>,
    children: ChildrenFn,
    #[prop(optional, into)] class: String,
    #[prop(default = true)] close_on_backdrop_click: bool,
    #[prop(optional)] on_close: Option<Callback<()>>,
) -> impl IntoView {
    let title_id = use_random_id_for("dialog_title");
    provide_context(DialogContext {
        title_id: title_id.clone(),
    });

    let close = move || {
        if open.get_untracked() {
            open.set(false);
            if let Some(cb) = on_close {
                cb.run(());
            }
        }
    };

    let escape = window_event_listener(ev::keydown, move |e| {
        if e.key() == "Escape" {
            close();
        }
    });
    on_cleanup(move || escape.remove());

    let merged_class = tw_merge!(
        "relative w-full max-w-md max-h-[85vh] overflow-y-auto rounded-md border border-border bg-background p-4 shadow-lg",
        class
    );
    let children = StoredValue::new(children);

    view! {
        <Show when=move || open.get() fallback=|| ().into_view()>
            <div
                data-name="DialogBackdrop"
                class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4"
                on:click=move |_| {
                    if close_on_backdrop_click {
                        close();
                    }
                }
            >
                <div
                    data-name="DialogContent"
                    role="dialog"
                    aria-modal="true"
                    aria-labelledby=title_id.clone()
                    class=merged_class.clone()
                    on:click=|ev: web_sys::MouseEvent| ev.stop_propagation()
                >
                    <button
                        type="button"
                        class="absolute top-3 right-3 rounded-sm p-1 text-muted-foreground hover:text-foreground [&_svg:not([class*='size-'])]:size-4"
                        aria-label="Close dialog"
                        on:click=move |_| close()
                    >
                        <X />
                    </button>
                    {move || children.with_value(|c| c())}
                </div>
            </div>
        </Show>
    }
}

#[component]
pub fn DialogTitle(children: Children, #[prop(optional, into)] class: String) -> impl IntoView {
    let ctx = expect_context::<DialogContext>();
    let merged_class = tw_merge!("pr-6 text-sm font-medium leading-none", class);

    view! {
        <h3 id=ctx.title_id class=merged_class>
            {children()}
        </h3>
    }
}
