use leptos::prelude::*;

use super::{drag_payload, parse_drag_payload, FileActions, FileKindIcon, DRAG_MIME};
use crate::access::guards;
use crate::api::FileView;
use crate::components::access::use_can;
use crate::components::hooks::use_paged_list;
use crate::components::ui::{Button, ButtonSize, ButtonVariant, LoadingLine};
use crate::models::{FileItem, FileKind, HttpMethod, Selection};
use crate::state::AppContext;
use crate::util::{format_file_size, format_optional_timestamp};

/// Paging is finished and nothing survived the view filter.
pub(crate) fn shows_empty_state(loading: bool, has_more: bool, visible_rows: usize) -> bool {
    !loading && !has_more && visible_rows == 0
}

/// Paginated folder/document listing for one [`FileView`], with selection
/// checkboxes and drag-to-folder moves.
#[component]
pub fn FileTable(
    #[prop(into)] view: Signal<FileView>,
    selection: RwSignal<Selection>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let endpoint = Signal::derive(move || Some(view.get().endpoint()));
    let list = use_paged_list::<FileItem>(endpoint, app_state.reload.into());

    // Any reload or view switch invalidates the ticked rows.
    Effect::new(move |_| {
        app_state.reload.track();
        view.track();
        selection.set(Selection::default());
    });

    let rows = Memo::new(move |_| {
        let v = view.get();
        list.items
            .get()
            .into_iter()
            .filter(|item| v.admits(item))
            .collect::<Vec<_>>()
    });

    let all_selected = move || {
        let rows = rows.get();
        !rows.is_empty() && selection.with(|s| rows.iter().all(|i| s.contains(i.kind(), i.id())))
    };
    let toggle_all = move |_| {
        if all_selected() {
            selection.set(Selection::default());
        } else {
            let mut s = Selection::default();
            for item in rows.get_untracked() {
                s.toggle(item.kind(), item.id());
            }
            selection.set(s);
        }
    };

    view! {
        <div class="overflow-hidden rounded-md border border-border">
            <table class="w-full text-sm">
                <thead class="bg-muted/40 text-left text-xs text-muted-foreground">
                    <tr>
                        <th class="w-8 px-3 py-2">
                            <input
                                type="checkbox"
                                aria-label="Select all"
                                prop:checked=all_selected
                                on:change=toggle_all
                            />
                        </th>
                        <th class="px-3 py-2 font-medium">"Name"</th>
                        <th class="hidden px-3 py-2 font-medium md:table-cell">"Updated"</th>
                        <th class="hidden w-24 px-3 py-2 font-medium sm:table-cell">"Size"</th>
                        <th class="w-32 px-3 py-2"></th>
                    </tr>
                </thead>
                <tbody>
                    <For
                        each=move || rows.get()
                        key=|item| (item.kind(), item.id(), item.name().to_string(), item.updated_at().map(str::to_string))
                        let:item
                    >
                        <FileRow item=item view=view selection=selection />
                    </For>
                </tbody>
            </table>

            <Show
                when=move || shows_empty_state(list.loading.get(), list.has_more.get(), rows.with(Vec::len))
                fallback=|| ().into_view()
            >
                <div class="px-3 py-6 text-center text-sm text-muted-foreground">
                    {move || if view.get().is_trash() { "Trash is empty." } else { "No files here yet." }}
                </div>
            </Show>
            <Show when=move || list.loading.get() fallback=|| ().into_view()>
                <div class="px-3">
                    <LoadingLine />
                </div>
            </Show>
            <div node_ref=list.sentinel class="h-1" aria-hidden="true"></div>
            <Show
                when=move || list.has_more.get() && !list.loading.get()
                fallback=|| ().into_view()
            >
                <div class="flex justify-center py-2">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Xs
                        on:click=move |_| list.load_more.run(())
                    >
                        "Load more"
                    </Button>
                </div>
            </Show>
        </div>
    }
}

#[component]
fn FileRow(item: FileItem, view: Signal<FileView>, selection: RwSignal<Selection>) -> impl IntoView {
    let actions = expect_context::<FileActions>();
    let can_move = use_can(guards::MOVE, HttpMethod::Post);
    let can_download = use_can(guards::DOCUMENT_DOWNLOAD, HttpMethod::Get);
    let can_share = use_can(guards::DOCUMENT_SIGNED_URL, HttpMethod::Post);
    let can_rename = use_can(guards::FOLDER_ITEM, HttpMethod::Put);
    let can_preview = use_can(guards::DOCUMENT_PREVIEW, HttpMethod::Get);

    let kind = item.kind();
    let id = item.id();
    let in_trash = view.get_untracked().is_trash();
    let drag_over = RwSignal::new(false);

    let checked = move || selection.with(|s| s.contains(kind, id));
    let name = item.name().to_string();
    let updated = format_optional_timestamp(item.updated_at());
    let size = item.size().map(format_file_size).unwrap_or_default();

    let href = match (kind, in_trash) {
        (_, true) => None,
        (FileKind::Folder, false) => Some(format!("/files/folder/{id}")),
        (FileKind::Document, false) => Some(format!("/documents/{id}")),
    };
    let name_cell = match href {
        Some(href) => view! {
            <a href=href class="truncate hover:underline underline-offset-4">{name}</a>
        }
        .into_any(),
        None => view! { <span class="truncate text-muted-foreground">{name}</span> }.into_any(),
    };

    let on_dragstart = move |ev: web_sys::DragEvent| {
        if let Some(dt) = ev.data_transfer() {
            let _ = dt.set_data(DRAG_MIME, &drag_payload(kind, id));
            dt.set_effect_allowed("move");
        }
    };
    let accepts_drop = kind == FileKind::Folder && !in_trash;
    let on_dragover = move |ev: web_sys::DragEvent| {
        if !accepts_drop {
            return;
        }
        ev.prevent_default();
        if let Some(dt) = ev.data_transfer() {
            dt.set_drop_effect("move");
        }
        drag_over.set(true);
    };
    let on_drop = move |ev: web_sys::DragEvent| {
        drag_over.set(false);
        if !accepts_drop {
            return;
        }
        ev.prevent_default();
        let dragged = ev
            .data_transfer()
            .and_then(|dt| dt.get_data(DRAG_MIME).ok())
            .and_then(|raw| parse_drag_payload(&raw));
        let Some((dragged_kind, dragged_id)) = dragged else {
            return;
        };
        if dragged_kind == FileKind::Folder && dragged_id == id {
            return;
        }
        let mut moving = Selection::default();
        moving.toggle(dragged_kind, dragged_id);
        actions.move_into.run((moving, id));
    };

    let row_actions = match item.clone() {
        _ if in_trash => ().into_any(),
        FileItem::Document(doc) => {
            let previewable = doc.is_previewable();
            let for_preview = doc.clone();
            let for_download = doc.clone();
            let for_share = doc;
            view! {
                <Show when=move || previewable && can_preview.get() fallback=|| ().into_view()>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Xs
                        on:click={
                            let doc = for_preview.clone();
                            move |_| actions.open_preview.run(doc.clone())
                        }
                    >
                        "Preview"
                    </Button>
                </Show>
                <Show when=move || can_download.get() fallback=|| ().into_view()>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Xs
                        on:click={
                            let doc = for_download.clone();
                            move |_| actions.download.run(doc.clone())
                        }
                    >
                        "Download"
                    </Button>
                </Show>
                <Show when=move || can_share.get() fallback=|| ().into_view()>
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Xs
                        on:click={
                            let doc = for_share.clone();
                            move |_| actions.open_share_link.run(doc.clone())
                        }
                    >
                        "Link"
                    </Button>
                </Show>
            }
            .into_any()
        }
        FileItem::Folder(folder) => view! {
            <Show when=move || can_rename.get() fallback=|| ().into_view()>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Xs
                    on:click={
                        let folder = folder.clone();
                        move |_| actions.open_rename.run(folder.clone())
                    }
                >
                    "Rename"
                </Button>
            </Show>
        }
        .into_any(),
    };

    view! {
        <tr
            class=move || {
                if drag_over.get() {
                    "border-t border-border bg-accent/60"
                } else {
                    "border-t border-border hover:bg-muted/30"
                }
            }
            draggable=move || if !in_trash && can_move.get() { "true" } else { "false" }
            on:dragstart=on_dragstart
            on:dragover=on_dragover
            on:dragleave=move |_| drag_over.set(false)
            on:drop=on_drop
        >
            <td class="px-3 py-2">
                <input
                    type="checkbox"
                    aria-label="Select"
                    prop:checked=checked
                    on:change=move |_| selection.update(|s| s.toggle(kind, id))
                />
            </td>
            <td class="px-3 py-2">
                <div class="flex min-w-0 items-center gap-2">
                    <FileKindIcon kind=kind />
                    {name_cell}
                </div>
            </td>
            <td class="hidden px-3 py-2 text-xs text-muted-foreground md:table-cell">{updated}</td>
            <td class="hidden px-3 py-2 text-xs text-muted-foreground sm:table-cell">{size}</td>
            <td class="px-3 py-2">
                <div class="flex justify-end gap-1">{row_actions}</div>
            </td>
        </tr>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    #[test]
    fn empty_state_counts_only_rows_the_view_admits() {
        let page = vec![FileItem::Document(Document {
            id: 1,
            name: "gone.pdf".to_string(),
            is_deleted: true,
            ..Default::default()
        })];
        let visible = page.iter().filter(|i| FileView::MyFiles.admits(i)).count();
        assert_eq!(visible, 0);
        assert!(shows_empty_state(false, false, visible));
    }

    #[test]
    fn empty_state_waits_for_paging_to_finish() {
        assert!(!shows_empty_state(true, false, 0));
        assert!(!shows_empty_state(false, true, 0));
        assert!(!shows_empty_state(false, false, 2));
    }
}
