use super::{ApiClient, ApiError, ApiResult, BlobData, UploadFile};
use crate::access::guards;
use crate::models::{Document, ExtractedData, FileItem, Folder, HttpMethod, Selection, SignedUrl};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Which listing the file manager is showing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FileView {
    MyFiles,
    Search(String),
    Shared,
    Trash,
    Folder(i64),
}

impl FileView {
    pub fn endpoint(&self) -> String {
        match self {
            FileView::MyFiles => guards::MY_FILES.to_string(),
            FileView::Search(keyword) => format!(
                "/api/secure/search-files?keyword={}",
                urlencoding::encode(keyword.trim())
            ),
            FileView::Shared => guards::SHARED_FILES.to_string(),
            FileView::Trash => guards::TRASH_FILES.to_string(),
            FileView::Folder(id) => format!("/api/secure/folder-files/{id}"),
        }
    }

    /// Soft-deleted entries only ever show up in the trash.
    pub fn admits(&self, item: &FileItem) -> bool {
        match self {
            FileView::Trash => item.is_deleted(),
            _ => !item.is_deleted(),
        }
    }

    pub fn is_trash(&self) -> bool {
        matches!(self, FileView::Trash)
    }

    /// Folder new uploads and folders land in; `None` is the root.
    pub fn target_folder(&self) -> Option<i64> {
        match self {
            FileView::Folder(id) => Some(*id),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        match self {
            FileView::MyFiles => "My files".to_string(),
            FileView::Search(q) => format!("Search: {q}"),
            FileView::Shared => "Shared with me".to_string(),
            FileView::Trash => "Trash".to_string(),
            FileView::Folder(_) => "Folder".to_string(),
        }
    }
}

pub(crate) fn preview_path(id: i64) -> String {
    guards::DOCUMENT_PREVIEW.replace("{id}", &id.to_string())
}

/// How a name collision on upload is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum UploadConflictMode {
    Replace,
    KeepBoth,
}

pub(crate) const UPLOAD_PATH: &str = "/api/secure/documents/upload";

impl UploadConflictMode {
    pub fn endpoint(&self) -> String {
        format!("{UPLOAD_PATH}/{}", self.as_ref())
    }
}

/// Outcome of the first upload attempt.
#[derive(Clone, Debug)]
pub(crate) enum UploadOutcome {
    Uploaded(Document),
    /// The name is taken; the caller must pick an [`UploadConflictMode`].
    Conflict { file: UploadFile, message: String },
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ItemIds {
    pub folder_ids: Vec<i64>,
    pub document_ids: Vec<i64>,
}

impl From<&Selection> for ItemIds {
    fn from(s: &Selection) -> Self {
        Self {
            folder_ids: s.folder_ids.clone(),
            document_ids: s.document_ids.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransferRequest {
    #[serde(flatten)]
    pub items: ItemIds,
    pub target_folder_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShareRequest {
    #[serde(flatten)]
    pub items: ItemIds,
    pub user_ids: Vec<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub(crate) enum TransferKind {
    Copy,
    Move,
}

impl TransferKind {
    fn path(&self) -> &'static str {
        match self {
            TransferKind::Copy => "/api/secure/files/copy",
            TransferKind::Move => "/api/secure/files/move",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            TransferKind::Copy => "copied",
            TransferKind::Move => "moved",
        }
    }
}

/// Trash lifecycle actions over a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TrashAction {
    SoftDelete,
    Restore,
    DeletePermanently,
}

impl TrashAction {
    fn path(&self) -> &'static str {
        match self {
            TrashAction::SoftDelete => "/api/secure/files/soft-delete",
            TrashAction::Restore => "/api/secure/files/restore",
            TrashAction::DeletePermanently => "/api/secure/files/delete-permanently",
        }
    }

    pub fn done_message(&self, count: usize) -> String {
        let verb = match self {
            TrashAction::SoftDelete => "moved to trash",
            TrashAction::Restore => "restored",
            TrashAction::DeletePermanently => "deleted permanently",
        };
        format!("{count} item(s) {verb}")
    }
}

pub(crate) const SIGNED_URL_MAX_MINUTES: u32 = 7 * 24 * 60;

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignedUrlRequest {
    pub expires_in_minutes: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DocumentUpdate {
    pub name: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FolderCreate {
    pub name: String,
    pub parent_id: Option<i64>,
}

fn folder_fields(folder_id: Option<i64>) -> Vec<(&'static str, String)> {
    folder_id
        .map(|id| vec![("folderId", id.to_string())])
        .unwrap_or_default()
}

impl ApiClient {
    pub async fn get_document(&self, id: i64) -> ApiResult<Document> {
        self.get_json(&format!("/api/secure/documents/{id}")).await
    }

    pub async fn update_document(&self, id: i64, body: &DocumentUpdate) -> ApiResult<Document> {
        self.send_json(HttpMethod::Put, &format!("/api/secure/documents/{id}"), body)
            .await
    }

    pub async fn get_folder(&self, id: i64) -> ApiResult<Folder> {
        self.get_json(&format!("/api/secure/folders/{id}")).await
    }

    pub async fn create_folder(&self, name: &str, parent_id: Option<i64>) -> ApiResult<Folder> {
        self.send_json(
            HttpMethod::Post,
            "/api/secure/folders",
            &FolderCreate {
                name: name.trim().to_string(),
                parent_id,
            },
        )
        .await
    }

    pub async fn rename_folder(&self, id: i64, name: &str) -> ApiResult<Folder> {
        self.send_json(
            HttpMethod::Put,
            &format!("/api/secure/folders/{id}"),
            &serde_json::json!({ "name": name.trim() }),
        )
        .await
    }

    pub async fn preview_document(&self, id: i64) -> ApiResult<BlobData> {
        self.get_blob(&preview_path(id)).await
    }

    pub async fn download_document(&self, id: i64) -> ApiResult<BlobData> {
        self.get_blob(&format!("/api/secure/documents/{id}/download")).await
    }

    /// Zips every selected folder and document.
    pub async fn download_many(&self, selection: &Selection) -> ApiResult<BlobData> {
        self.post_blob("/api/secure/files/download", &ItemIds::from(selection))
            .await
    }

    /// First attempt; a 409 comes back as [`UploadOutcome::Conflict`] with the file handed back.
    pub async fn upload(&self, file: UploadFile, folder_id: Option<i64>) -> ApiResult<UploadOutcome> {
        match self
            .post_multipart(UPLOAD_PATH, file.clone(), &folder_fields(folder_id))
            .await
        {
            Ok(res) => res
                .json()
                .await
                .map(UploadOutcome::Uploaded)
                .map_err(ApiError::parse),
            Err(e) if e.is_conflict() => Ok(UploadOutcome::Conflict {
                file,
                message: e.user_message(),
            }),
            Err(e) => Err(e),
        }
    }

    pub async fn upload_resolving(
        &self,
        file: UploadFile,
        folder_id: Option<i64>,
        mode: UploadConflictMode,
    ) -> ApiResult<Document> {
        let res = self
            .post_multipart(&mode.endpoint(), file, &folder_fields(folder_id))
            .await?;
        res.json().await.map_err(ApiError::parse)
    }

    pub async fn trash_action(&self, action: TrashAction, selection: &Selection) -> ApiResult<()> {
        let body = serde_json::to_value(ItemIds::from(selection)).map_err(ApiError::parse)?;
        self.send_empty(HttpMethod::Post, action.path(), Some(&body)).await
    }

    pub async fn transfer(
        &self,
        kind: TransferKind,
        selection: &Selection,
        target_folder_id: Option<i64>,
    ) -> ApiResult<()> {
        let body = serde_json::to_value(TransferRequest {
            items: selection.into(),
            target_folder_id,
        })
        .map_err(ApiError::parse)?;
        self.send_empty(HttpMethod::Post, kind.path(), Some(&body)).await
    }

    pub async fn share_with_users(&self, request: &ShareRequest) -> ApiResult<()> {
        let body = serde_json::to_value(request).map_err(ApiError::parse)?;
        self.send_empty(HttpMethod::Post, "/api/secure/files/share", Some(&body))
            .await
    }

    pub async fn create_signed_url(&self, document_id: i64, minutes: u32) -> ApiResult<SignedUrl> {
        self.send_json(
            HttpMethod::Post,
            &format!("/api/secure/documents/{document_id}/signed-url"),
            &SignedUrlRequest {
                expires_in_minutes: minutes.clamp(1, SIGNED_URL_MAX_MINUTES),
            },
        )
        .await
    }

    /// Embeds `data` into the PDF and returns the new PDF.
    pub async fn hide_data(&self, pdf: UploadFile, data: &str) -> ApiResult<BlobData> {
        let res = self
            .post_multipart("/api/secure/stego/hide", pdf, &[("data", data.to_string())])
            .await?;
        Self::read_blob(res).await
    }

    pub async fn extract_data(&self, pdf: UploadFile) -> ApiResult<ExtractedData> {
        let res = self.post_multipart("/api/secure/stego/extract", pdf, &[]).await?;
        res.json().await.map_err(ApiError::parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i64, deleted: bool) -> FileItem {
        FileItem::Document(Document {
            id,
            name: format!("d{id}.pdf"),
            is_deleted: deleted,
            ..Default::default()
        })
    }

    #[test]
    fn view_endpoints() {
        assert_eq!(FileView::MyFiles.endpoint(), "/api/secure/my-files");
        assert_eq!(FileView::Folder(12).endpoint(), "/api/secure/folder-files/12");
        assert_eq!(
            FileView::Search("q 1".to_string()).endpoint(),
            "/api/secure/search-files?keyword=q%201"
        );
        assert_eq!(FileView::Trash.endpoint(), "/api/secure/trash-files");
        assert_eq!(FileView::Shared.endpoint(), "/api/secure/shared-files");
        assert_eq!(preview_path(42), "/api/secure/documents/42/preview");
    }

    #[test]
    fn soft_delete_then_restore_moves_between_listings() {
        let mut item = doc(1, false);
        assert!(FileView::MyFiles.admits(&item));
        assert!(!FileView::Trash.admits(&item));

        if let FileItem::Document(d) = &mut item {
            d.is_deleted = true;
        }
        assert!(FileView::Trash.admits(&item));
        assert!(!FileView::MyFiles.admits(&item));
        assert!(!FileView::Folder(3).admits(&item));
        assert!(!FileView::Shared.admits(&item));

        if let FileItem::Document(d) = &mut item {
            d.is_deleted = false;
        }
        assert!(FileView::MyFiles.admits(&item));
        assert!(!FileView::Trash.admits(&item));
    }

    #[test]
    fn upload_conflict_modes_choose_distinct_endpoints() {
        assert_eq!(
            UploadConflictMode::Replace.endpoint(),
            "/api/secure/documents/upload/replace"
        );
        assert_eq!(
            UploadConflictMode::KeepBoth.endpoint(),
            "/api/secure/documents/upload/keep-both"
        );
        assert_ne!(UploadConflictMode::Replace.endpoint(), UPLOAD_PATH);
    }

    #[test]
    fn transfer_request_flattens_ids() {
        let mut sel = Selection::default();
        sel.folder_ids.push(2);
        sel.document_ids.push(5);
        let v = serde_json::to_value(TransferRequest {
            items: (&sel).into(),
            target_folder_id: None,
        })
        .expect("should serialize");
        assert_eq!(v["folderIds"], serde_json::json!([2]));
        assert_eq!(v["documentIds"], serde_json::json!([5]));
        assert!(v["targetFolderId"].is_null());
    }

    #[test]
    fn share_request_lists_recipients() {
        let sel = Selection {
            folder_ids: vec![],
            document_ids: vec![8],
        };
        let v = serde_json::to_value(ShareRequest {
            items: (&sel).into(),
            user_ids: vec![1, 2],
        })
        .expect("should serialize");
        assert_eq!(v["userIds"], serde_json::json!([1, 2]));
    }

    #[test]
    fn upload_targets_folder_only_inside_folder_view() {
        assert_eq!(FileView::Folder(4).target_folder(), Some(4));
        assert_eq!(FileView::MyFiles.target_folder(), None);
        assert_eq!(folder_fields(Some(4)), vec![("folderId", "4".to_string())]);
        assert!(folder_fields(None).is_empty());
    }

    #[test]
    fn trash_messages() {
        assert_eq!(TrashAction::Restore.done_message(2), "2 item(s) restored");
    }
}
