use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::TrashAction;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Dialog, DialogDescription, DialogFooter, DialogHeader,
    DialogTitle, Spinner, use_toasts,
};
use crate::models::Selection;
use crate::state::AppContext;

/// Confirmation for soft delete, restore and permanent delete.
#[component]
pub fn TrashDialog(
    open: RwSignal<bool>,
    #[prop(into)] action: Signal<TrashAction>,
    #[prop(into)] selection: Signal<Selection>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();
    let loading = RwSignal::new(false);

    let confirm = move |_| {
        if loading.get_untracked() {
            return;
        }
        let action = action.get_untracked();
        let selection = selection.get_untracked();
        if selection.is_empty() {
            open.set(false);
            return;
        }
        loading.set(true);
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.trash_action(action, &selection).await {
                Ok(()) => toasts.success(action.done_message(selection.len())),
                Err(e) => toasts.api_error(&e),
            }
            loading.set(false);
            open.set(false);
            app_state.bump_reload();
        });
    };

    let title = move || match action.get() {
        TrashAction::SoftDelete => "Move to trash?",
        TrashAction::Restore => "Restore items?",
        TrashAction::DeletePermanently => "Delete forever?",
    };
    let description = move || {
        let n = selection.with(|s| s.len());
        match action.get() {
            TrashAction::SoftDelete => format!("{n} item(s) will be moved to the trash."),
            TrashAction::Restore => format!("{n} item(s) will be restored to their folders."),
            TrashAction::DeletePermanently => {
                format!("{n} item(s) will be deleted permanently. This cannot be undone.")
            }
        }
    };
    let destructive = move || action.get() != TrashAction::Restore;

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>{title}</DialogTitle>
                <DialogDescription>{description}</DialogDescription>
            </DialogHeader>
            <DialogFooter>
                <Button
                    variant=ButtonVariant::Outline
                    size=ButtonSize::Sm
                    on:click=move |_| open.set(false)
                >
                    "Cancel"
                </Button>
                <Show
                    when=destructive
                    fallback=move || {
                        view! {
                            <Button size=ButtonSize::Sm attr:disabled=move || loading.get() on:click=confirm>
                                "Restore"
                            </Button>
                        }
                    }
                >
                    <Button
                        variant=ButtonVariant::Destructive
                        size=ButtonSize::Sm
                        attr:disabled=move || loading.get()
                        on:click=confirm
                    >
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Delete"
                    </Button>
                </Show>
            </DialogFooter>
        </Dialog>
    }
}
