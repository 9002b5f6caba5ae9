mod file_table;
mod folder_dialog;
mod preview;
mod share;
mod transfer;
mod trash;
mod upload;

pub use file_table::FileTable;
pub use folder_dialog::{FolderDialog, FolderDialogMode};
pub use preview::PreviewDialog;
pub use share::{ShareLinkDialog, ShareUsersDialog};
pub use transfer::TransferDialog;
pub use trash::TrashDialog;
pub use upload::UploadDialog;

use crate::models::{Document, FileKind, Folder, Selection};
use leptos::prelude::*;

pub(crate) const DRAG_MIME: &str = "application/x-docvault-item";

/// Row-level actions, provided by the file manager page.
#[derive(Clone, Copy)]
pub struct FileActions {
    pub open_preview: Callback<Document>,
    pub open_rename: Callback<Folder>,
    pub open_share_link: Callback<Document>,
    pub download: Callback<Document>,
    /// Drop of a dragged row onto a folder row.
    pub move_into: Callback<(Selection, i64)>,
}

/// `folder:3` / `document:9`, carried in the drag's DataTransfer.
pub(crate) fn drag_payload(kind: FileKind, id: i64) -> String {
    format!("{kind}:{id}")
}

pub(crate) fn parse_drag_payload(raw: &str) -> Option<(FileKind, i64)> {
    let (kind, id) = raw.split_once(':')?;
    let kind = match kind {
        "folder" => FileKind::Folder,
        "document" => FileKind::Document,
        _ => return None,
    };
    Some((kind, id.parse().ok()?))
}

#[component]
pub fn FileKindIcon(kind: FileKind) -> impl IntoView {
    let path = match kind {
        FileKind::Folder => view! {
            <path d="M4 20h16a2 2 0 0 0 2-2V8a2 2 0 0 0-2-2h-7.93a2 2 0 0 1-1.66-.9l-.82-1.2A2 2 0 0 0 7.93 3H4a2 2 0 0 0-2 2v13c0 1.1.9 2 2 2Z" />
        }
        .into_any(),
        FileKind::Document => view! {
            <path d="M15 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V7Z" />
            <path d="M14 2v4a2 2 0 0 0 2 2h4" />
        }
        .into_any(),
    };

    view! {
        <svg
            xmlns="http://www.w3.org/2000/svg"
            width="16"
            height="16"
            viewBox="0 0 24 24"
            fill="none"
            stroke="currentColor"
            stroke-width="2"
            stroke-linecap="round"
            stroke-linejoin="round"
            class="shrink-0 text-muted-foreground"
            aria-hidden="true"
        >
            {path}
        </svg>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_payload_round_trip() {
        let raw = drag_payload(FileKind::Folder, 42);
        assert_eq!(raw, "folder:42");
        assert_eq!(parse_drag_payload(&raw), Some((FileKind::Folder, 42)));
        assert_eq!(parse_drag_payload("document:7"), Some((FileKind::Document, 7)));
    }

    #[test]
    fn drag_payload_rejects_foreign_data() {
        assert_eq!(parse_drag_payload("https://example.com"), None);
        assert_eq!(parse_drag_payload("folder:abc"), None);
        assert_eq!(parse_drag_payload(""), None);
    }
}
