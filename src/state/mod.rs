use crate::access::{CapabilityMap, PermissionKey};
use crate::api::ApiClient;
use crate::models::{Account, AuthResponse};
use crate::storage::{
    apply_preferences, load_language, load_search_history, load_theme, load_user_from_storage,
    save_language, save_theme, save_user_to_storage, Language, Theme,
};
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::time::Duration;

/// Progress of the `GET /profile` bootstrap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ProfileStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<Account>>,
    pub profile_status: RwSignal<ProfileStatus>,

    /// Capability answers for every `Access` gate mounted so far.
    pub capabilities: RwSignal<CapabilityMap>,
    capability_flush_scheduled: RwSignal<bool>,

    /// Bumped after every mutation; listings restart when it changes.
    pub reload: RwSignal<u64>,

    pub theme: RwSignal<Theme>,
    pub language: RwSignal<Language>,
    pub search_history: RwSignal<Vec<String>>,
}

impl AppState {
    pub fn new() -> Self {
        let theme = load_theme();
        let language = load_language();
        apply_preferences(theme, language);

        let api_client = ApiClient::load_from_storage();
        // A cached account without a token is stale.
        let stored_user = load_user_from_storage().filter(|_| api_client.is_authenticated());

        Self {
            api_client: RwSignal::new(api_client),
            current_user: RwSignal::new(stored_user),
            profile_status: RwSignal::new(ProfileStatus::Idle),
            capabilities: RwSignal::new(CapabilityMap::default()),
            capability_flush_scheduled: RwSignal::new(false),
            reload: RwSignal::new(0),
            theme: RwSignal::new(theme),
            language: RwSignal::new(language),
            search_history: RwSignal::new(load_search_history()),
        }
    }

    pub fn bump_reload(&self) {
        self.reload.update(|n| *n = n.wrapping_add(1));
    }

    pub fn is_authenticated(&self) -> bool {
        self.api_client.with(|c| c.is_authenticated())
    }

    pub fn can(&self, key: &PermissionKey) -> bool {
        self.capabilities.with(|m| m.is_allowed(key))
    }

    /// The backend has answered for `key`, either way.
    pub fn capability_known(&self, key: &PermissionKey) -> bool {
        self.capabilities.with(|m| m.is_resolved(key))
    }

    /// Registers a gate's pair; the check itself is batched per tick.
    pub fn require_capability(&self, key: &PermissionKey, module: Option<&str>) {
        let mut queued = false;
        self.capabilities.update_untracked(|m| queued = m.request(key, module));
        if queued {
            self.schedule_capability_flush();
        }
    }

    fn schedule_capability_flush(&self) {
        if self.capability_flush_scheduled.get_untracked() {
            return;
        }
        if self.profile_status.get_untracked() != ProfileStatus::Ready {
            // Flushed once the profile has loaded.
            return;
        }
        self.capability_flush_scheduled.set(true);
        let state = *self;
        set_timeout(move || state.flush_capabilities(), Duration::ZERO);
    }

    pub fn flush_capabilities(&self) {
        self.capability_flush_scheduled.set(false);

        let mut batch = vec![];
        self.capabilities.update_untracked(|m| batch = m.take_pending());
        if batch.is_empty() {
            return;
        }

        let state = *self;
        let api_client = self.api_client.get_untracked();
        spawn_local(async move {
            match api_client.check_permissions(&batch).await {
                Ok(results) => state.capabilities.update(|m| m.resolve(&batch, &results)),
                Err(e) => {
                    log::warn!("permission check failed, denying {} pair(s): {e}", batch.len());
                    state.capabilities.update(|m| m.deny_all(&batch));
                }
            }
            if state.capabilities.with_untracked(|m| m.has_pending()) {
                state.schedule_capability_flush();
            }
        });
    }

    /// Loads the current account once per session.
    pub fn bootstrap_profile(&self) {
        if !self.is_authenticated() || self.profile_status.get_untracked() == ProfileStatus::Loading {
            return;
        }
        self.profile_status.set(ProfileStatus::Loading);

        let state = *self;
        let api_client = self.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_profile().await {
                Ok(account) => {
                    save_user_to_storage(&account);
                    state.current_user.set(Some(account));
                    state.profile_status.set(ProfileStatus::Ready);
                    state.flush_capabilities();
                }
                Err(e) if e.is_unauthorized() => {
                    log::info!("session expired, signing out");
                    state.sign_out();
                    redirect_to("/login");
                }
                Err(e) => {
                    log::error!("profile bootstrap failed: {e}");
                    state.profile_status.set(ProfileStatus::Failed(e.user_message()));
                }
            }
        });
    }

    pub fn sign_in(&self, response: AuthResponse) {
        let mut c = self.api_client.get_untracked();
        c.set_token(response.token);
        c.save_to_storage();
        self.api_client.set(c);

        if let Some(account) = &response.account {
            save_user_to_storage(account);
        }
        self.current_user.set(response.account);
        self.capabilities.update(|m| m.clear());
        self.profile_status.set(ProfileStatus::Idle);
    }

    pub fn sign_out(&self) {
        let mut c = self.api_client.get_untracked();
        c.logout();
        self.api_client.set(c);
        self.current_user.set(None);
        self.capabilities.update(|m| m.clear());
        self.profile_status.set(ProfileStatus::Idle);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.set(theme);
        save_theme(theme);
        apply_preferences(theme, self.language.get_untracked());
    }

    pub fn set_language(&self, language: Language) {
        self.language.set(language);
        save_language(language);
        apply_preferences(self.theme.get_untracked(), language);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

/// Full page navigation, used where router state must be discarded.
pub(crate) fn redirect_to(path: &str) {
    if let Some(w) = web_sys::window() {
        let _ = w.location().set_href(path);
    }
}
