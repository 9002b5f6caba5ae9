use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// HTTP verb as it appears in permission rows and capability checks.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Permission {
    pub id: i64,
    pub name: String,
    pub api_path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub module: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

/// The signed-in user as returned by the profile and admin endpoints.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Account {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Account {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    pub fn initials(&self) -> String {
        let name = self.display_name();
        name.split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Document {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub stored_filename: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Document {
    fn mime(&self) -> &str {
        self.mime_type.as_deref().unwrap_or_default()
    }

    pub fn is_pdf(&self) -> bool {
        self.mime() == "application/pdf" || self.name.to_lowercase().ends_with(".pdf")
    }

    pub fn is_image(&self) -> bool {
        self.mime().starts_with("image/")
    }

    pub fn is_previewable(&self) -> bool {
        self.is_pdf() || self.is_image() || self.mime().starts_with("text/")
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Folder {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub inherit_permissions: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub sub_folders: Vec<Folder>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Setting {
    pub id: i64,
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub updated_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum FileKind {
    Folder,
    Document,
}

/// Wire shape of a mixed listing entry: `{type, folder?, document?}`.
#[derive(Serialize, Deserialize, Clone, Debug)]
struct RawFileItem {
    #[serde(rename = "type")]
    kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    folder: Option<Folder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<Document>,
}

/// One entry of a mixed folder/document listing page.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RawFileItem", into = "RawFileItem")]
pub(crate) enum FileItem {
    Folder(Folder),
    Document(Document),
}

impl TryFrom<RawFileItem> for FileItem {
    type Error = String;

    fn try_from(raw: RawFileItem) -> Result<Self, Self::Error> {
        match (raw.kind, raw.folder, raw.document) {
            (FileKind::Folder, Some(f), _) => Ok(FileItem::Folder(f)),
            (FileKind::Document, _, Some(d)) => Ok(FileItem::Document(d)),
            (kind, _, _) => Err(format!("file item of type `{kind}` has no `{kind}` payload")),
        }
    }
}

impl From<FileItem> for RawFileItem {
    fn from(item: FileItem) -> Self {
        match item {
            FileItem::Folder(f) => RawFileItem {
                kind: FileKind::Folder,
                folder: Some(f),
                document: None,
            },
            FileItem::Document(d) => RawFileItem {
                kind: FileKind::Document,
                folder: None,
                document: Some(d),
            },
        }
    }
}

impl FileItem {
    pub fn kind(&self) -> FileKind {
        match self {
            FileItem::Folder(_) => FileKind::Folder,
            FileItem::Document(_) => FileKind::Document,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            FileItem::Folder(f) => f.id,
            FileItem::Document(d) => d.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FileItem::Folder(f) => &f.name,
            FileItem::Document(d) => &d.name,
        }
    }

    pub fn is_deleted(&self) -> bool {
        match self {
            FileItem::Folder(f) => f.is_deleted,
            FileItem::Document(d) => d.is_deleted,
        }
    }

    pub fn updated_at(&self) -> Option<&str> {
        match self {
            FileItem::Folder(f) => f.updated_at.as_deref().or(f.created_at.as_deref()),
            FileItem::Document(d) => d.updated_at.as_deref().or(d.created_at.as_deref()),
        }
    }

    /// Documents report their byte size; folders have none.
    pub fn size(&self) -> Option<u64> {
        match self {
            FileItem::Folder(_) => None,
            FileItem::Document(d) => Some(d.size),
        }
    }
}

/// One page of a server-paginated listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page<T> {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub total_items: Option<u64>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default = "Vec::new")]
    pub result: Vec<T>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FieldError {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignedUrl {
    pub url: String,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ExtractedData {
    #[serde(default)]
    pub data: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub account: Option<Account>,
}

/// Ids of the rows currently ticked in a file listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Selection {
    pub folder_ids: Vec<i64>,
    pub document_ids: Vec<i64>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.folder_ids.is_empty() && self.document_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.folder_ids.len() + self.document_ids.len()
    }

    pub fn contains(&self, kind: FileKind, id: i64) -> bool {
        match kind {
            FileKind::Folder => self.folder_ids.contains(&id),
            FileKind::Document => self.document_ids.contains(&id),
        }
    }

    pub fn toggle(&mut self, kind: FileKind, id: i64) {
        let ids = match kind {
            FileKind::Folder => &mut self.folder_ids,
            FileKind::Document => &mut self.document_ids,
        };
        if let Some(pos) = ids.iter().position(|x| *x == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
    }

    pub fn single(item: &FileItem) -> Self {
        let mut s = Self::default();
        s.toggle(item.kind(), item.id());
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_item_accepts_wrapper_shape() {
        let json = r#"[
            {"type": "folder", "folder": {"id": 3, "name": "Invoices", "isDeleted": false}, "document": null},
            {"type": "document", "document": {"id": 9, "name": "a.pdf", "size": 2048, "mimeType": "application/pdf"}}
        ]"#;
        let items: Vec<FileItem> = serde_json::from_str(json).expect("listing should parse");
        assert_eq!(items[0].kind(), FileKind::Folder);
        assert_eq!(items[0].name(), "Invoices");
        assert_eq!(items[1].id(), 9);
        assert_eq!(items[1].size(), Some(2048));
    }

    #[test]
    fn file_item_without_payload_is_rejected() {
        let json = r#"{"type": "document", "folder": {"id": 1, "name": "x"}}"#;
        assert!(serde_json::from_str::<FileItem>(json).is_err());
    }

    #[test]
    fn file_item_serializes_back_to_wrapper() {
        let item = FileItem::Folder(Folder {
            id: 1,
            name: "x".to_string(),
            ..Default::default()
        });
        let v = serde_json::to_value(&item).expect("should serialize");
        assert_eq!(v["type"], "folder");
        assert_eq!(v["folder"]["id"], 1);
        assert!(v.get("document").is_none());
    }

    #[test]
    fn permission_method_is_uppercase_on_the_wire() {
        let p: Permission = serde_json::from_str(
            r#"{"id": 1, "name": "List users", "apiPath": "/api/secure/users", "method": "GET", "module": "USERS"}"#,
        )
        .expect("permission should parse");
        assert_eq!(p.method, HttpMethod::Get);
        assert_eq!(p.method.to_string(), "GET");
        assert_eq!("delete".parse::<HttpMethod>().ok(), Some(HttpMethod::Delete));
    }

    #[test]
    fn account_display_name_falls_back_to_email() {
        let mut a: Account =
            serde_json::from_str(r#"{"id": 1, "email": "u@example.com"}"#).expect("parse");
        assert_eq!(a.display_name(), "u@example.com");
        a.first_name = "Ada".to_string();
        a.last_name = "Lovelace".to_string();
        assert_eq!(a.display_name(), "Ada Lovelace");
        assert_eq!(a.initials(), "AL");
    }

    #[test]
    fn selection_toggle_adds_and_removes() {
        let mut s = Selection::default();
        s.toggle(FileKind::Document, 4);
        s.toggle(FileKind::Folder, 4);
        assert_eq!(s.len(), 2);
        assert!(s.contains(FileKind::Document, 4));
        s.toggle(FileKind::Document, 4);
        assert!(!s.contains(FileKind::Document, 4));
        assert_eq!(s.folder_ids, vec![4]);
    }

    #[test]
    fn document_preview_kinds() {
        let d = Document {
            name: "scan.PDF".to_string(),
            ..Default::default()
        };
        assert!(d.is_pdf());
        assert!(d.is_previewable());
        let img = Document {
            mime_type: Some("image/png".to_string()),
            ..Default::default()
        };
        assert!(img.is_image());
        let zip = Document {
            mime_type: Some("application/zip".to_string()),
            ..Default::default()
        };
        assert!(!zip.is_previewable());
    }
}
