use super::{ApiClient, ApiResult};
use crate::access::{guards, PermissionCheck, PermissionQuery};
use crate::models::{Account, HttpMethod, Permission, Role, Setting};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Admin-managed resources; each lives under `/api/secure/<name>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum AdminEntity {
    Users,
    Roles,
    Permissions,
    Settings,
}

impl AdminEntity {
    pub fn base_path(&self) -> String {
        format!("/api/secure/{}", self.as_ref())
    }

    /// Permission row guarding listing and creation.
    pub fn collection_guard(&self) -> &'static str {
        match self {
            AdminEntity::Users => guards::USERS,
            AdminEntity::Roles => guards::ROLES,
            AdminEntity::Permissions => guards::PERMISSIONS,
            AdminEntity::Settings => guards::SETTINGS,
        }
    }

    /// Permission row guarding update and delete of one record.
    pub fn item_guard(&self) -> &'static str {
        match self {
            AdminEntity::Users => guards::USER_ITEM,
            AdminEntity::Roles => guards::ROLE_ITEM,
            AdminEntity::Permissions => guards::PERMISSION_ITEM,
            AdminEntity::Settings => guards::SETTING_ITEM,
        }
    }

    pub fn module(&self) -> &'static str {
        match self {
            AdminEntity::Users => "USERS",
            AdminEntity::Roles => "ROLES",
            AdminEntity::Permissions => "PERMISSIONS",
            AdminEntity::Settings => "SETTINGS",
        }
    }

    pub fn item_path(&self, id: i64) -> String {
        format!("{}/{}", self.base_path(), id)
    }

    /// Listing endpoint with an optional keyword filter (paging is appended by the loader).
    pub fn list_endpoint(&self, keyword: &str) -> String {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.base_path()
        } else {
            format!("{}?keyword={}", self.base_path(), urlencoding::encode(keyword))
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserPayload {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub role_id: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RolePayload {
    pub name: String,
    pub description: String,
    pub permission_ids: Vec<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PermissionPayload {
    pub name: String,
    pub api_path: String,
    pub method: HttpMethod,
    pub module: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SettingPayload {
    pub key: String,
    pub value: String,
    pub description: String,
}

impl ApiClient {
    /// `id = None` creates, `Some(id)` updates.
    async fn save_entity<T: serde::de::DeserializeOwned>(
        &self,
        entity: AdminEntity,
        id: Option<i64>,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        match id {
            Some(id) => self.send_json(HttpMethod::Put, &entity.item_path(id), body).await,
            None => self.send_json(HttpMethod::Post, &entity.base_path(), body).await,
        }
    }

    pub async fn save_user(&self, id: Option<i64>, body: &UserPayload) -> ApiResult<Account> {
        self.save_entity(AdminEntity::Users, id, body).await
    }

    pub async fn save_role(&self, id: Option<i64>, body: &RolePayload) -> ApiResult<Role> {
        self.save_entity(AdminEntity::Roles, id, body).await
    }

    pub async fn save_permission(
        &self,
        id: Option<i64>,
        body: &PermissionPayload,
    ) -> ApiResult<Permission> {
        self.save_entity(AdminEntity::Permissions, id, body).await
    }

    pub async fn save_setting(&self, id: Option<i64>, body: &SettingPayload) -> ApiResult<Setting> {
        self.save_entity(AdminEntity::Settings, id, body).await
    }

    pub async fn delete_entity(&self, entity: AdminEntity, id: i64) -> ApiResult<()> {
        self.send_empty(HttpMethod::Delete, &entity.item_path(id), None)
            .await
    }

    pub async fn get_all_roles(&self) -> ApiResult<Vec<Role>> {
        self.get_json("/api/secure/roles/all").await
    }

    pub async fn get_all_permissions(&self) -> ApiResult<Vec<Permission>> {
        self.get_json("/api/secure/permissions/all").await
    }

    pub async fn search_users(&self, keyword: &str) -> ApiResult<Vec<Account>> {
        self.get_json(&format!(
            "{}?keyword={}",
            guards::USER_SEARCH,
            urlencoding::encode(keyword.trim())
        ))
        .await
    }

    pub async fn check_permissions(
        &self,
        queries: &[PermissionQuery],
    ) -> ApiResult<Vec<PermissionCheck>> {
        self.send_json(HttpMethod::Post, "/api/secure/check-permissions", &queries)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_paths() {
        assert_eq!(AdminEntity::Roles.base_path(), "/api/secure/roles");
        assert_eq!(AdminEntity::Settings.item_path(7), "/api/secure/settings/7");
        assert_eq!(AdminEntity::Users.list_endpoint("  "), "/api/secure/users");
        assert_eq!(
            AdminEntity::Users.list_endpoint("ada l"),
            "/api/secure/users?keyword=ada%20l"
        );
    }

    #[test]
    fn guards_match_the_paths_each_entity_calls() {
        for entity in [
            AdminEntity::Users,
            AdminEntity::Roles,
            AdminEntity::Permissions,
            AdminEntity::Settings,
        ] {
            assert_eq!(entity.collection_guard(), entity.base_path());
            assert_eq!(entity.item_guard(), format!("{}/{{id}}", entity.base_path()));
            assert_eq!(entity.module(), entity.as_ref().to_uppercase());
        }
        assert_eq!(AdminEntity::Users.item_guard(), "/api/secure/users/{id}");
    }

    #[test]
    fn user_payload_omits_password_on_update() {
        let v = serde_json::to_value(UserPayload {
            email: "u@example.com".to_string(),
            role_id: Some(2),
            ..Default::default()
        })
        .expect("should serialize");
        assert!(v.get("password").is_none());
        assert_eq!(v["roleId"], 2);
    }

    #[test]
    fn permission_payload_uses_wire_names() {
        let v = serde_json::to_value(PermissionPayload {
            name: "Delete user".to_string(),
            api_path: "/api/secure/users/{id}".to_string(),
            method: HttpMethod::Delete,
            module: "USERS".to_string(),
        })
        .expect("should serialize");
        assert_eq!(v["apiPath"], "/api/secure/users/{id}");
        assert_eq!(v["method"], "DELETE");
    }
}
