use leptos::prelude::*;
use leptos::task::spawn_local;

use super::file_table::shows_empty_state;
use super::FileKindIcon;
use crate::api::{FileView, TransferKind};
use crate::components::hooks::use_paged_list;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogDescription, DialogFooter,
    DialogHeader, DialogTitle, LoadingLine, Spinner, use_toasts,
};
use crate::models::{FileItem, FileKind, Folder, Selection};
use crate::state::AppContext;

/// A folder cannot be copied or moved into itself.
pub(crate) fn is_valid_target(selection: &Selection, target: Option<i64>) -> bool {
    match target {
        Some(id) => !selection.contains(FileKind::Folder, id),
        None => true,
    }
}

/// Copy/move dialog with a folder browser starting at the root.
#[component]
pub fn TransferDialog(
    open: RwSignal<bool>,
    #[prop(into)] kind: Signal<TransferKind>,
    #[prop(into)] selection: Signal<Selection>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    // Breadcrumb of opened folders; empty means the root.
    let trail: RwSignal<Vec<(i64, String)>> = RwSignal::new(vec![]);
    let current = Memo::new(move |_| trail.with(|t| t.last().map(|(id, _)| *id)));
    let loading = RwSignal::new(false);
    let local_reload = RwSignal::new(0u64);

    Effect::new(move |_| {
        if open.get() {
            trail.set(vec![]);
        }
    });

    let endpoint = Signal::derive(move || {
        if !open.get() {
            return None;
        }
        Some(match current.get() {
            Some(id) => FileView::Folder(id).endpoint(),
            None => FileView::MyFiles.endpoint(),
        })
    });
    let list = use_paged_list::<FileItem>(endpoint, local_reload.into());

    let folders = Memo::new(move |_| {
        list.items
            .get()
            .into_iter()
            .filter_map(|item| match item {
                FileItem::Folder(f) if !f.is_deleted => Some(f),
                _ => None,
            })
            .collect::<Vec<Folder>>()
    });

    let target_ok = move || selection.with(|s| is_valid_target(s, current.get()));

    let submit = move |_| {
        if loading.get_untracked() || !target_ok() {
            return;
        }
        let kind = kind.get_untracked();
        let selection = selection.get_untracked();
        let target = current.get_untracked();
        loading.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.transfer(kind, &selection, target).await {
                Ok(()) => toasts.success(format!("{} item(s) {}", selection.len(), kind.past_tense())),
                Err(e) => toasts.api_error(&e),
            }
            loading.set(false);
            open.set(false);
            app_state.bump_reload();
        });
    };

    let location = move || {
        trail.with(|t| {
            std::iter::once("My files".to_string())
                .chain(t.iter().map(|(_, name)| name.clone()))
                .collect::<Vec<_>>()
                .join(" / ")
        })
    };

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>
                    {move || match kind.get() {
                        TransferKind::Copy => "Copy to…",
                        TransferKind::Move => "Move to…",
                    }}
                </DialogTitle>
                <DialogDescription>{location}</DialogDescription>
            </DialogHeader>
            <DialogBody>
                <div class="max-h-72 overflow-y-auto rounded-md border border-border">
                    <Show when=move || !trail.with(Vec::is_empty) fallback=|| ().into_view()>
                        <button
                            type="button"
                            class="flex w-full items-center gap-2 px-3 py-2 text-left text-sm text-muted-foreground hover:bg-muted/40"
                            on:click=move |_| trail.update(|t| {
                                t.pop();
                            })
                        >
                            ".."
                        </button>
                    </Show>
                    <For each=move || folders.get() key=|f| f.id let:folder>
                        {
                            let id = folder.id;
                            let name = folder.name.clone();
                            let blocked = move || selection.with(|s| s.contains(FileKind::Folder, id));
                            view! {
                                <button
                                    type="button"
                                    class="flex w-full items-center gap-2 px-3 py-2 text-left text-sm hover:bg-muted/40 disabled:opacity-50"
                                    disabled=blocked
                                    on:click=move |_| trail.update(|t| t.push((id, name.clone())))
                                >
                                    <FileKindIcon kind=FileKind::Folder />
                                    <span class="truncate">{folder.name.clone()}</span>
                                </button>
                            }
                        }
                    </For>
                    <Show
                        when=move || shows_empty_state(list.loading.get(), list.has_more.get(), folders.with(Vec::len))
                        fallback=|| ().into_view()
                    >
                        <div class="px-3 py-2 text-xs text-muted-foreground">"No subfolders."</div>
                    </Show>
                    <Show when=move || list.loading.get() fallback=|| ().into_view()>
                        <div class="px-3">
                            <LoadingLine />
                        </div>
                    </Show>
                    <div node_ref=list.sentinel class="h-1" aria-hidden="true"></div>
                </div>
                <Show when=move || !target_ok() fallback=|| ().into_view()>
                    <p class="text-xs text-destructive">"A folder cannot be placed inside itself."</p>
                </Show>
            </DialogBody>
            <DialogFooter>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| open.set(false)>
                    "Cancel"
                </Button>
                <Button
                    size=ButtonSize::Sm
                    attr:disabled=move || loading.get() || !target_ok()
                    on:click=submit
                >
                    <Show when=move || loading.get() fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                    {move || match kind.get() {
                        TransferKind::Copy => "Copy here",
                        TransferKind::Move => "Move here",
                    }}
                </Button>
            </DialogFooter>
        </Dialog>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_cannot_be_its_own_target() {
        let mut s = Selection::default();
        s.toggle(FileKind::Folder, 4);
        s.toggle(FileKind::Document, 9);
        assert!(!is_valid_target(&s, Some(4)));
        assert!(is_valid_target(&s, Some(9)));
        assert!(is_valid_target(&s, Some(5)));
        assert!(is_valid_target(&s, None));
    }
}
