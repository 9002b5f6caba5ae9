use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_location, use_query_map};

use crate::access::guards;
use crate::api::{FileView, TransferKind, TrashAction};
use crate::components::access::{use_can, Access};
use crate::components::files::{
    FileActions, FileTable, FolderDialog, FolderDialogMode, PreviewDialog, ShareLinkDialog,
    ShareUsersDialog, TransferDialog, TrashDialog, UploadDialog,
};
use crate::components::ui::{use_toasts, Button, ButtonSize, ButtonVariant};
use crate::models::{Document, HttpMethod, Selection};
use crate::state::AppContext;
use crate::util::trigger_download;

const ZIP_NAME: &str = "documents.zip";

/// Maps `/files/...` routes onto a listing.
pub(crate) fn view_from_route(path: &str, query: Option<&str>) -> FileView {
    let rest = path.trim_end_matches('/').trim_start_matches("/files");
    match rest {
        "/shared" => FileView::Shared,
        "/trash" => FileView::Trash,
        "/search" => match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => FileView::Search(q.to_string()),
            None => FileView::MyFiles,
        },
        _ => rest
            .strip_prefix("/folder/")
            .and_then(|id| id.parse().ok())
            .map(FileView::Folder)
            .unwrap_or(FileView::MyFiles),
    }
}

#[component]
fn ViewTab(#[prop(into)] href: String, #[prop(into)] label: String, active: Signal<bool>) -> impl IntoView {
    view! {
        <a
            href=href
            class=move || {
                if active.get() {
                    "border-b-2 border-primary px-1 pb-2 text-sm font-medium text-foreground"
                } else {
                    "border-b-2 border-transparent px-1 pb-2 text-sm text-muted-foreground hover:text-foreground"
                }
            }
        >
            {label}
        </a>
    }
}

#[component]
pub fn FileManagerPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();
    let location = use_location();
    let query = use_query_map();

    let view = Memo::new(move |_| {
        let q = query.with(|q| q.get("q"));
        view_from_route(&location.pathname.get(), q.as_deref())
    });
    let selection: RwSignal<Selection> = RwSignal::new(Selection::default());

    let folder_name: RwSignal<Option<String>> = RwSignal::new(None);
    Effect::new(move |_| {
        let FileView::Folder(id) = view.get() else {
            folder_name.set(None);
            return;
        };
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_folder(id).await {
                Ok(folder) if view.get_untracked() == FileView::Folder(id) => folder_name.set(Some(folder.name)),
                Ok(_) => {}
                Err(e) => log::warn!("loading folder {id} failed: {e}"),
            }
        });
    });

    // Dialog state.
    let upload_open = RwSignal::new(false);
    let folder_open = RwSignal::new(false);
    let folder_mode = RwSignal::new(FolderDialogMode::Create { parent_id: None });
    let transfer_open = RwSignal::new(false);
    let transfer_kind = RwSignal::new(TransferKind::Copy);
    let trash_open = RwSignal::new(false);
    let trash_action = RwSignal::new(TrashAction::SoftDelete);
    let share_open = RwSignal::new(false);
    let link_open = RwSignal::new(false);
    let link_doc: RwSignal<Option<Document>> = RwSignal::new(None);
    let preview_open = RwSignal::new(false);
    let preview_doc: RwSignal<Option<Document>> = RwSignal::new(None);

    let download = move |doc: Document| {
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.download_document(doc.id).await {
                Ok(data) => trigger_download(&data, &doc.name),
                Err(e) => toasts.api_error(&e),
            }
        });
    };

    provide_context(FileActions {
        open_preview: Callback::new(move |doc| {
            preview_doc.set(Some(doc));
            preview_open.set(true);
        }),
        open_rename: Callback::new(move |folder: crate::models::Folder| {
            folder_mode.set(FolderDialogMode::Rename {
                id: folder.id,
                name: folder.name,
            });
            folder_open.set(true);
        }),
        open_share_link: Callback::new(move |doc| {
            link_doc.set(Some(doc));
            link_open.set(true);
        }),
        download: Callback::new(download),
        move_into: Callback::new(move |(moving, target): (Selection, i64)| {
            let api_client = app_state.api_client.get_untracked();
            spawn_local(async move {
                match api_client.transfer(TransferKind::Move, &moving, Some(target)).await {
                    Ok(()) => toasts.success(format!("{} item(s) moved", moving.len())),
                    Err(e) => toasts.api_error(&e),
                }
                app_state.bump_reload();
            });
        }),
    });

    let has_selection = move || selection.with(|s| !s.is_empty());
    let can_create_here = move || matches!(view.get(), FileView::MyFiles | FileView::Folder(_));
    let can_download_many = use_can(guards::DOWNLOAD_MANY, HttpMethod::Post);

    let open_transfer = move |kind: TransferKind| {
        transfer_kind.set(kind);
        transfer_open.set(true);
    };
    let open_trash = move |action: TrashAction| {
        trash_action.set(action);
        trash_open.set(true);
    };
    let download_selected = move |_| {
        let current = selection.get_untracked();
        if current.is_empty() {
            return;
        }
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.download_many(&current).await {
                Ok(data) => trigger_download(&data, ZIP_NAME),
                Err(e) => toasts.api_error(&e),
            }
        });
    };

    let title = move || match view.get() {
        FileView::Folder(_) => folder_name.get().unwrap_or_else(|| "Folder".to_string()),
        other => other.title(),
    };
    let is_tab = move |target: FileView| Signal::derive(move || view.get() == target);

    view! {
        <div class="space-y-4">
            <div class="flex gap-4 border-b border-border">
                <ViewTab href="/files" label="My files" active=is_tab(FileView::MyFiles) />
                <Access api_path=guards::SHARED_FILES hide_children=true>
                    <ViewTab href="/files/shared" label="Shared with me" active=is_tab(FileView::Shared) />
                </Access>
                <Access api_path=guards::TRASH_FILES hide_children=true>
                    <ViewTab href="/files/trash" label="Trash" active=is_tab(FileView::Trash) />
                </Access>
            </div>

            <div class="flex flex-wrap items-center justify-between gap-2">
                <div class="min-w-0 space-y-0.5">
                    <Show when=move || matches!(view.get(), FileView::Folder(_)) fallback=|| ().into_view()>
                        <a href="/files" class="text-xs text-muted-foreground hover:underline">"My files /"</a>
                    </Show>
                    <h1 class="truncate text-xl font-semibold">{title}</h1>
                </div>

                <div class="flex flex-wrap items-center gap-1.5">
                    <Show when=move || !view.get().is_trash() fallback=|| ().into_view()>
                        <Show when=can_create_here fallback=|| ().into_view()>
                            <Access api_path=guards::FOLDERS method=HttpMethod::Post hide_children=true>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| {
                                        folder_mode.set(FolderDialogMode::Create {
                                            parent_id: view.get_untracked().target_folder(),
                                        });
                                        folder_open.set(true);
                                    }
                                >
                                    "New folder"
                                </Button>
                            </Access>
                            <Access api_path=guards::UPLOAD method=HttpMethod::Post hide_children=true>
                                <Button size=ButtonSize::Sm on:click=move |_| upload_open.set(true)>
                                    "Upload"
                                </Button>
                            </Access>
                        </Show>
                        <Show when=has_selection fallback=|| ().into_view()>
                            <Show when=move || can_download_many.get() fallback=|| ().into_view()>
                                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=download_selected>
                                    "Download"
                                </Button>
                            </Show>
                            <Access api_path=guards::COPY method=HttpMethod::Post hide_children=true>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| open_transfer(TransferKind::Copy)
                                >
                                    "Copy"
                                </Button>
                            </Access>
                            <Access api_path=guards::MOVE method=HttpMethod::Post hide_children=true>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| open_transfer(TransferKind::Move)
                                >
                                    "Move"
                                </Button>
                            </Access>
                            <Access api_path=guards::SHARE method=HttpMethod::Post hide_children=true>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| share_open.set(true)
                                >
                                    "Share"
                                </Button>
                            </Access>
                            <Access api_path=guards::SOFT_DELETE method=HttpMethod::Post hide_children=true>
                                <Button
                                    variant=ButtonVariant::Destructive
                                    size=ButtonSize::Sm
                                    on:click=move |_| open_trash(TrashAction::SoftDelete)
                                >
                                    "Delete"
                                </Button>
                            </Access>
                        </Show>
                    </Show>

                    <Show when=move || view.get().is_trash() && has_selection() fallback=|| ().into_view()>
                        <Access api_path=guards::RESTORE method=HttpMethod::Post hide_children=true>
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                on:click=move |_| open_trash(TrashAction::Restore)
                            >
                                "Restore"
                            </Button>
                        </Access>
                        <Access api_path=guards::DELETE_PERMANENTLY method=HttpMethod::Post hide_children=true>
                            <Button
                                variant=ButtonVariant::Destructive
                                size=ButtonSize::Sm
                                on:click=move |_| open_trash(TrashAction::DeletePermanently)
                            >
                                "Delete forever"
                            </Button>
                        </Access>
                    </Show>
                </div>
            </div>

            <Show when=has_selection fallback=|| ().into_view()>
                <div class="text-xs text-muted-foreground">
                    {move || format!("{} selected", selection.with(|s| s.len()))}
                </div>
            </Show>

            <FileTable view=view selection=selection />

            <UploadDialog open=upload_open folder_id=Signal::derive(move || view.get().target_folder()) />
            <FolderDialog open=folder_open mode=folder_mode />
            <TransferDialog open=transfer_open kind=transfer_kind selection=selection />
            <TrashDialog open=trash_open action=trash_action selection=selection />
            <ShareUsersDialog open=share_open selection=selection />
            <ShareLinkDialog open=link_open document=link_doc />
            <PreviewDialog open=preview_open document=preview_doc />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_map_to_views() {
        assert_eq!(view_from_route("/files", None), FileView::MyFiles);
        assert_eq!(view_from_route("/files/", None), FileView::MyFiles);
        assert_eq!(view_from_route("/files/shared", None), FileView::Shared);
        assert_eq!(view_from_route("/files/trash", None), FileView::Trash);
        assert_eq!(view_from_route("/files/folder/12", None), FileView::Folder(12));
        assert_eq!(
            view_from_route("/files/search", Some(" invoice ")),
            FileView::Search("invoice".to_string())
        );
    }

    #[test]
    fn malformed_routes_fall_back_to_my_files() {
        assert_eq!(view_from_route("/files/search", Some("  ")), FileView::MyFiles);
        assert_eq!(view_from_route("/files/folder/abc", None), FileView::MyFiles);
        assert_eq!(view_from_route("/", None), FileView::MyFiles);
    }
}
