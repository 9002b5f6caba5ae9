//! Client-side capability cache backing the `Access` gate.
//!
//! Gates register the `(apiPath, method)` pair they need; registrations made in
//! the same tick are sent to the backend as one `check-permissions` batch.
//! Anything not answered with `true` is treated as denied.

use crate::models::HttpMethod;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Route templates exactly as they appear in the backend's permission rows.
pub(crate) mod guards {
    pub const USERS: &str = "/api/secure/users";
    pub const USER_ITEM: &str = "/api/secure/users/{id}";
    pub const USER_SEARCH: &str = "/api/secure/users/search";
    pub const ROLES: &str = "/api/secure/roles";
    pub const ROLE_ITEM: &str = "/api/secure/roles/{id}";
    pub const PERMISSIONS: &str = "/api/secure/permissions";
    pub const PERMISSION_ITEM: &str = "/api/secure/permissions/{id}";
    pub const SETTINGS: &str = "/api/secure/settings";
    pub const SETTING_ITEM: &str = "/api/secure/settings/{id}";

    pub const MY_FILES: &str = "/api/secure/my-files";
    pub const SHARED_FILES: &str = "/api/secure/shared-files";
    pub const TRASH_FILES: &str = "/api/secure/trash-files";
    pub const FOLDERS: &str = "/api/secure/folders";
    pub const FOLDER_ITEM: &str = "/api/secure/folders/{id}";
    pub const DOCUMENT_ITEM: &str = "/api/secure/documents/{id}";
    pub const DOCUMENT_PREVIEW: &str = "/api/secure/documents/{id}/preview";
    pub const DOCUMENT_DOWNLOAD: &str = "/api/secure/documents/{id}/download";
    pub const DOCUMENT_SIGNED_URL: &str = "/api/secure/documents/{id}/signed-url";
    pub const UPLOAD: &str = "/api/secure/documents/upload";
    pub const DOWNLOAD_MANY: &str = "/api/secure/files/download";
    pub const SOFT_DELETE: &str = "/api/secure/files/soft-delete";
    pub const RESTORE: &str = "/api/secure/files/restore";
    pub const DELETE_PERMANENTLY: &str = "/api/secure/files/delete-permanently";
    pub const COPY: &str = "/api/secure/files/copy";
    pub const MOVE: &str = "/api/secure/files/move";
    pub const SHARE: &str = "/api/secure/files/share";
    pub const STEGO_HIDE: &str = "/api/secure/stego/hide";
    pub const STEGO_EXTRACT: &str = "/api/secure/stego/extract";
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PermissionKey {
    pub api_path: String,
    pub method: HttpMethod,
}

impl PermissionKey {
    pub fn new(api_path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            api_path: api_path.into(),
            method,
        }
    }
}

/// One entry of the `check-permissions` request body.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionQuery {
    pub api_path: String,
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
}

/// One entry of the `check-permissions` response.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionCheck {
    pub api_path: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub allowed: bool,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CapabilityMap {
    granted: HashMap<PermissionKey, bool>,
    modules: HashMap<PermissionKey, String>,
    pending: BTreeSet<PermissionKey>,
    in_flight: BTreeSet<PermissionKey>,
}

impl CapabilityMap {
    /// Registers interest in `key`. Returns `true` if it was newly queued.
    pub fn request(&mut self, key: &PermissionKey, module: Option<&str>) -> bool {
        if let Some(m) = module {
            self.modules.insert(key.clone(), m.to_string());
        }
        if self.granted.contains_key(key) || self.in_flight.contains(key) {
            return false;
        }
        self.pending.insert(key.clone())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Moves everything pending to in-flight and returns the batch to send.
    pub fn take_pending(&mut self) -> Vec<PermissionQuery> {
        let batch = std::mem::take(&mut self.pending);
        batch
            .into_iter()
            .map(|key| {
                let query = PermissionQuery {
                    api_path: key.api_path.clone(),
                    method: key.method,
                    module: self.modules.get(&key).cloned(),
                };
                self.in_flight.insert(key);
                query
            })
            .collect()
    }

    /// Stores the backend's answers; batch entries it did not mention become `false`.
    pub fn resolve(&mut self, batch: &[PermissionQuery], results: &[PermissionCheck]) {
        for q in batch {
            let key = PermissionKey::new(q.api_path.clone(), q.method);
            self.in_flight.remove(&key);
            self.granted.insert(key, false);
        }
        for r in results {
            let key = PermissionKey::new(r.api_path.clone(), r.method);
            self.in_flight.remove(&key);
            self.granted.insert(key, r.allowed);
        }
    }

    /// A failed check denies the whole batch; it is not retried.
    pub fn deny_all(&mut self, batch: &[PermissionQuery]) {
        self.resolve(batch, &[]);
    }

    /// Exact `(apiPath, method)` match; unknown pairs are denied.
    pub fn is_allowed(&self, key: &PermissionKey) -> bool {
        self.granted.get(key).copied().unwrap_or(false)
    }

    pub fn is_resolved(&self, key: &PermissionKey) -> bool {
        self.granted.contains_key(key)
    }

    /// Forget every answer but keep the registered keys queued for the next session.
    pub fn clear(&mut self) {
        let known: Vec<PermissionKey> = self
            .granted
            .drain()
            .map(|(k, _)| k)
            .chain(std::mem::take(&mut self.in_flight))
            .collect();
        self.pending.extend(known);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(path: &str, m: HttpMethod) -> PermissionKey {
        PermissionKey::new(path, m)
    }

    fn check(path: &str, m: HttpMethod, allowed: bool) -> PermissionCheck {
        PermissionCheck {
            api_path: path.to_string(),
            method: m,
            allowed,
        }
    }

    #[test]
    fn unknown_pairs_are_denied() {
        let map = CapabilityMap::default();
        assert!(!map.is_allowed(&key("/api/secure/users", HttpMethod::Get)));
    }

    #[test]
    fn registrations_batch_and_deduplicate() {
        let mut map = CapabilityMap::default();
        let users = key("/api/secure/users", HttpMethod::Get);
        assert!(map.request(&users, Some("USERS")));
        assert!(!map.request(&users, None));
        assert!(map.request(&key("/api/secure/users", HttpMethod::Post), None));

        let batch = map.take_pending();
        assert_eq!(batch.len(), 2);
        assert!(!map.has_pending());
        assert_eq!(batch[0].module.as_deref(), Some("USERS"));

        // Still in flight: no second request for the same pair.
        assert!(!map.request(&users, None));
    }

    #[test]
    fn only_exact_true_pairs_are_allowed() {
        let mut map = CapabilityMap::default();
        let get = key("/api/secure/users", HttpMethod::Get);
        let del = key("/api/secure/users", HttpMethod::Delete);
        let other = key("/api/secure/users/", HttpMethod::Get);
        map.request(&get, None);
        map.request(&del, None);
        map.request(&other, None);
        let batch = map.take_pending();

        map.resolve(
            &batch,
            &[
                check("/api/secure/users", HttpMethod::Get, true),
                check("/api/secure/users", HttpMethod::Delete, false),
            ],
        );

        assert!(map.is_allowed(&get));
        assert!(!map.is_allowed(&del));
        // Missing from the response: resolved as denied.
        assert!(map.is_resolved(&other));
        assert!(!map.is_allowed(&other));
        assert!(!map.is_allowed(&key("/api/secure/users", HttpMethod::Put)));
    }

    #[test]
    fn in_flight_pair_is_closed_but_not_yet_known() {
        let mut map = CapabilityMap::default();
        let k = key("/api/secure/settings", HttpMethod::Get);
        map.request(&k, None);
        let batch = map.take_pending();
        assert!(!map.is_allowed(&k));
        assert!(!map.is_resolved(&k));

        map.resolve(&batch, &[check("/api/secure/settings", HttpMethod::Get, false)]);
        assert!(map.is_resolved(&k));
    }

    #[test]
    fn failed_batch_denies_everything() {
        let mut map = CapabilityMap::default();
        let k = key("/api/secure/roles", HttpMethod::Get);
        map.request(&k, None);
        let batch = map.take_pending();
        map.deny_all(&batch);
        assert!(map.is_resolved(&k));
        assert!(!map.is_allowed(&k));
        assert!(!map.request(&k, None));
    }

    #[test]
    fn clear_requeues_known_pairs() {
        let mut map = CapabilityMap::default();
        let k = key("/api/secure/settings", HttpMethod::Get);
        map.request(&k, None);
        let batch = map.take_pending();
        map.resolve(&batch, &[check("/api/secure/settings", HttpMethod::Get, true)]);
        assert!(map.is_allowed(&k));

        map.clear();
        assert!(!map.is_allowed(&k));
        assert!(map.has_pending());
    }

    #[test]
    fn query_serializes_camel_case() {
        let v = serde_json::to_value(PermissionQuery {
            api_path: "/api/secure/files/share".to_string(),
            method: HttpMethod::Post,
            module: None,
        })
        .expect("should serialize");
        assert_eq!(v, serde_json::json!({"apiPath": "/api/secure/files/share", "method": "POST"}));
    }
}
