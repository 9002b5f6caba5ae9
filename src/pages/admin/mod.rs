//! Administration console: users, roles, permissions and settings.
//!
//! Every page follows the same shape: a keyword filter, an infinite list fed by
//! `use_paged_list`, a create/edit dialog and a delete confirmation. Mutations
//! bump the global reload token so the list starts over from page 1.

mod permissions;
mod roles;
mod settings;
mod users;

pub use permissions::PermissionsPage;
pub use roles::RolesPage;
pub use settings::SettingsPage;
pub use users::UsersPage;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{AdminEntity, ApiError};
use crate::components::access::{use_can, Access};
use crate::components::hooks::{use_paged_list, PagedListHandle};
use crate::components::ui::{
    use_toasts, Button, ButtonSize, ButtonVariant, Dialog, DialogDescription, DialogFooter,
    DialogHeader, DialogTitle, Input, LoadingLine, Spinner,
};
use crate::models::HttpMethod;
use crate::state::AppContext;
use crate::validation::FormErrors;

/// 400s go to the fields they name; anything else becomes one message.
pub(super) fn apply_save_error(e: &ApiError, errors: RwSignal<FormErrors>, error: RwSignal<Option<String>>) {
    let fields = FormErrors::from_api(e);
    if fields.is_empty() {
        error.set(Some(e.user_message()));
    } else {
        errors.set(fields);
    }
}

/// `None` until the list capability is granted, so nothing is requested before then.
pub(super) fn admin_list_endpoint(allowed: bool, entity: AdminEntity, keyword: &str) -> Option<String> {
    allowed.then(|| entity.list_endpoint(keyword))
}

/// The entity's list, fetched only once the viewer may read it.
pub(super) fn use_admin_list<T>(entity: AdminEntity, keyword: RwSignal<String>) -> PagedListHandle<T>
where
    T: serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
{
    let app_state = expect_context::<AppContext>().0;
    let can_list = use_can(entity.collection_guard(), HttpMethod::Get);
    use_paged_list::<T>(
        Signal::derive(move || keyword.with(|k| admin_list_endpoint(can_list.get(), entity, k))),
        app_state.reload.into(),
    )
}

/// Title row with keyword filter and the gated "New" button.
#[component]
pub(super) fn AdminHeader(
    #[prop(into)] title: String,
    #[prop(into)] description: String,
    entity: AdminEntity,
    applied_keyword: RwSignal<String>,
    on_create: Callback<()>,
) -> impl IntoView {
    let keyword = RwSignal::new(applied_keyword.get_untracked());

    view! {
        <div class="space-y-3">
            <div class="flex flex-wrap items-end justify-between gap-2">
                <div class="space-y-1">
                    <h1 class="text-xl font-semibold">{title}</h1>
                    <p class="text-sm text-muted-foreground">{description}</p>
                </div>
                <Access api_path={entity.collection_guard()} method=HttpMethod::Post hide_children=true>
                    <Button size=ButtonSize::Sm on:click=move |_| on_create.run(())>"New"</Button>
                </Access>
            </div>
            <div
                class="max-w-sm"
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        applied_keyword.set(keyword.get_untracked().trim().to_string());
                    }
                }
            >
                <Input r#type="search" placeholder="Filter… (Enter)" bind_value=keyword class="h-8 text-sm" />
            </div>
        </div>
    }
}

/// Loading / empty / load-more area under an admin table.
#[component]
pub(super) fn ListStatus<T: Send + Sync + 'static>(list: PagedListHandle<T>) -> impl IntoView {
    view! {
        <Show when=move || list.loaded_empty.get() fallback=|| ().into_view()>
            <div class="px-3 py-6 text-center text-sm text-muted-foreground">"Nothing found."</div>
        </Show>
        <Show when=move || list.loading.get() fallback=|| ().into_view()>
            <div class="px-3">
                <LoadingLine />
            </div>
        </Show>
        <div node_ref=list.sentinel class="h-1" aria-hidden="true"></div>
        <Show when=move || list.has_more.get() && !list.loading.get() fallback=|| ().into_view()>
            <div class="flex justify-center py-2">
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=move |_| list.load_more.run(())>
                    "Load more"
                </Button>
            </div>
        </Show>
    }
}

/// Edit / Delete buttons, each behind its own capability.
#[component]
pub(super) fn RowActions(entity: AdminEntity, on_edit: Callback<()>, on_delete: Callback<()>) -> impl IntoView {
    view! {
        <div class="flex justify-end gap-1">
            <Access api_path={entity.item_guard()} method=HttpMethod::Put hide_children=true>
                <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=move |_| on_edit.run(())>
                    "Edit"
                </Button>
            </Access>
            <Access api_path={entity.item_guard()} method=HttpMethod::Delete hide_children=true>
                <Button
                    variant=ButtonVariant::Ghost
                    size=ButtonSize::Xs
                    class="text-destructive"
                    on:click=move |_| on_delete.run(())
                >
                    "Delete"
                </Button>
            </Access>
        </div>
    }
}

#[component]
pub(super) fn DeleteDialog(
    open: RwSignal<bool>,
    entity: AdminEntity,
    /// `(id, label)` of the row being deleted.
    target: RwSignal<Option<(i64, String)>>,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();
    let loading = RwSignal::new(false);

    let confirm = move |_| {
        let Some((id, label)) = target.get_untracked() else {
            return;
        };
        if loading.get_untracked() {
            return;
        }
        loading.set(true);
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.delete_entity(entity, id).await {
                Ok(()) => toasts.success(format!("Deleted {label}")),
                Err(e) => toasts.api_error(&e),
            }
            loading.set(false);
            open.set(false);
            app_state.bump_reload();
        });
    };

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>"Delete?"</DialogTitle>
                <DialogDescription>
                    {move || {
                        format!(
                            "\"{}\" will be removed. This cannot be undone.",
                            target.with(|t| t.as_ref().map(|(_, l)| l.clone()).unwrap_or_default()),
                        )
                    }}
                </DialogDescription>
            </DialogHeader>
            <DialogFooter>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| open.set(false)>
                    "Cancel"
                </Button>
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
            </DialogFooter>
        </Dialog>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_not_requested_without_the_capability() {
        assert_eq!(admin_list_endpoint(false, AdminEntity::Users, ""), None);
        assert_eq!(admin_list_endpoint(false, AdminEntity::Roles, "ops"), None);
        assert_eq!(
            admin_list_endpoint(true, AdminEntity::Roles, "ops"),
            Some("/api/secure/roles?keyword=ops".to_string())
        );
    }
}
