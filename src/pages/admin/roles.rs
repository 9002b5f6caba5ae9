use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::{BTreeMap, BTreeSet};

use super::{apply_save_error, use_admin_list, AdminHeader, DeleteDialog, ListStatus, RowActions};
use crate::api::{AdminEntity, RolePayload};
use crate::components::access::Access;
use crate::components::ui::{
    use_toasts, Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogFooter, DialogHeader,
    DialogTitle, ErrorAlert, FormField, Label, LoadingLine, Spinner, Textarea,
};
use crate::models::{Permission, Role};
use crate::state::AppContext;
use crate::validation::FormErrors;

const NO_MODULE: &str = "OTHER";

/// Buckets permissions by module; unnamed modules land under `OTHER`.
pub(crate) fn group_by_module(permissions: &[Permission]) -> BTreeMap<String, Vec<Permission>> {
    let mut groups: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
    for p in permissions {
        let module = p
            .module
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(NO_MODULE)
            .to_uppercase();
        groups.entry(module).or_default().push(p.clone());
    }
    for list in groups.values_mut() {
        list.sort_by(|a, b| a.api_path.cmp(&b.api_path).then(a.method.cmp(&b.method)));
    }
    groups
}

#[component]
fn PermissionChecklist(all: RwSignal<Vec<Permission>>, checked: RwSignal<BTreeSet<i64>>) -> impl IntoView {
    let groups = Memo::new(move |_| all.with(|a| group_by_module(a)).into_iter().collect::<Vec<_>>());

    let toggle_module = move |ids: Vec<i64>| {
        checked.update(|set| {
            if ids.iter().all(|id| set.contains(id)) {
                for id in &ids {
                    set.remove(id);
                }
            } else {
                set.extend(ids);
            }
        });
    };

    view! {
        <div class="max-h-72 space-y-3 overflow-y-auto rounded-md border border-border p-2">
            <For each=move || groups.get() key=|(module, perms)| (module.clone(), perms.len()) let:group>
                {
                    let (module, perms) = group;
                    let ids: Vec<i64> = perms.iter().map(|p| p.id).collect();
                    let all_ids = ids.clone();
                    let all_on = move || checked.with(|set| all_ids.iter().all(|id| set.contains(id)));
                    view! {
                        <div class="space-y-1">
                            <label class="flex items-center gap-2 text-xs font-medium uppercase tracking-wide text-muted-foreground">
                                <input
                                    type="checkbox"
                                    prop:checked=all_on
                                    on:change=move |_| toggle_module(ids.clone())
                                />
                                {module}
                            </label>
                            {perms
                                .into_iter()
                                .map(|p| {
                                    let id = p.id;
                                    view! {
                                        <label class="flex items-center gap-2 pl-5 text-sm">
                                            <input
                                                type="checkbox"
                                                prop:checked=move || checked.with(|set| set.contains(&id))
                                                on:change=move |_| {
                                                    checked.update(|set| {
                                                        if !set.remove(&id) {
                                                            set.insert(id);
                                                        }
                                                    })
                                                }
                                            />
                                            <span class="truncate">{p.name.clone()}</span>
                                            <span class="ml-auto shrink-0 font-mono text-[11px] text-muted-foreground">
                                                {format!("{} {}", p.method, p.api_path)}
                                            </span>
                                        </label>
                                    }
                                })
                                .collect_view()}
                        </div>
                    }
                }
            </For>
        </div>
    }
}

#[component]
fn RoleDialog(open: RwSignal<bool>, editing: RwSignal<Option<Role>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let checked: RwSignal<BTreeSet<i64>> = RwSignal::new(BTreeSet::new());
    let all: RwSignal<Vec<Permission>> = RwSignal::new(vec![]);
    let loading_all = RwSignal::new(false);
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving = RwSignal::new(false);

    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        let current = editing.get_untracked();
        name.set(current.as_ref().map(|r| r.name.clone()).unwrap_or_default());
        description.set(current.as_ref().and_then(|r| r.description.clone()).unwrap_or_default());
        checked.set(
            current
                .as_ref()
                .map(|r| r.permissions.iter().map(|p| p.id).collect())
                .unwrap_or_default(),
        );
        errors.set(FormErrors::default());
        error.set(None);

        loading_all.set(true);
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_all_permissions().await {
                Ok(perms) => all.set(perms),
                Err(e) => error.set(Some(e.user_message())),
            }
            loading_all.set(false);
        });
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let id = editing.get_untracked().map(|r| r.id);
        let body = RolePayload {
            name: name.get_untracked().trim().to_string(),
            description: description.get_untracked().trim().to_string(),
            permission_ids: checked.get_untracked().into_iter().collect(),
        };
        let mut form = FormErrors::default();
        form.require("name", &body.name, "Name");
        if let Err(form) = form.into_result() {
            errors.set(form);
            return;
        }
        errors.set(FormErrors::default());
        error.set(None);
        saving.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.save_role(id, &body).await {
                Ok(role) => {
                    toasts.success(format!("Saved role {}", role.name));
                    open.set(false);
                    app_state.bump_reload();
                }
                Err(e) => apply_save_error(&e, errors, error),
            }
            saving.set(false);
        });
    };

    view! {
        <Dialog open=open class="max-w-2xl">
            <DialogHeader>
                <DialogTitle>{move || if editing.with(Option::is_none) { "New role" } else { "Edit role" }}</DialogTitle>
            </DialogHeader>
            <form on:submit=on_submit>
                <DialogBody>
                    <FormField
                        label="Name"
                        id="role-name"
                        bind_value=name
                        error=Signal::derive(move || errors.with(|e| e.get("name")))
                    />
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="role-description" class="text-xs">"Description"</Label>
                        <Textarea id="role-description" bind_value=description rows=2 />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label class="text-xs">
                            {move || format!("Permissions ({} selected)", checked.with(BTreeSet::len))}
                        </Label>
                        <Show when=move || loading_all.get() fallback=move || view! { <PermissionChecklist all=all checked=checked /> }>
                            <LoadingLine />
                        </Show>
                    </div>
                    <ErrorAlert message=error />
                </DialogBody>
                <DialogFooter>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:r#type="button"
                        on:click=move |_| open.set(false)
                    >
                        "Cancel"
                    </Button>
                    <Button size=ButtonSize::Sm attr:disabled=move || saving.get()>
                        <Show when=move || saving.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Save"
                    </Button>
                </DialogFooter>
            </form>
        </Dialog>
    }
}

#[component]
pub fn RolesPage() -> impl IntoView {
    let keyword = RwSignal::new(String::new());
    let list = use_admin_list::<Role>(AdminEntity::Roles, keyword);

    let dialog_open = RwSignal::new(false);
    let editing: RwSignal<Option<Role>> = RwSignal::new(None);
    let delete_open = RwSignal::new(false);
    let delete_target: RwSignal<Option<(i64, String)>> = RwSignal::new(None);

    view! {
        <Access api_path={AdminEntity::Roles.collection_guard()} module={AdminEntity::Roles.module()}>
            <div class="space-y-4">
                <AdminHeader
                    title="Roles"
                    description="Named bundles of permissions assigned to users."
                    entity=AdminEntity::Roles
                    applied_keyword=keyword
                    on_create=Callback::new(move |_| {
                        editing.set(None);
                        dialog_open.set(true);
                    })
                />
                <div class="overflow-x-auto rounded-md border border-border">
                    <table class="w-full text-sm">
                        <thead class="bg-muted/40 text-left text-xs text-muted-foreground">
                            <tr>
                                <th class="px-3 py-2 font-medium">"Name"</th>
                                <th class="px-3 py-2 font-medium">"Description"</th>
                                <th class="px-3 py-2 font-medium">"Permissions"</th>
                                <th class="px-3 py-2"></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || list.items.get()
                                key=|r| (r.id, r.name.clone(), r.description.clone(), r.permissions.len())
                                let:role
                            >
                                {
                                    let id = role.id;
                                    let label = role.name.clone();
                                    let row = role.clone();
                                    view! {
                                        <tr class="border-t border-border">
                                            <td class="px-3 py-2 font-medium">{role.name.clone()}</td>
                                            <td class="px-3 py-2 text-muted-foreground">
                                                {role.description.clone().unwrap_or_default()}
                                            </td>
                                            <td class="px-3 py-2">{role.permissions.len()}</td>
                                            <td class="px-3 py-2">
                                                <RowActions
                                                    entity=AdminEntity::Roles
                                                    on_edit=Callback::new(move |_| {
                                                        editing.set(Some(row.clone()));
                                                        dialog_open.set(true);
                                                    })
                                                    on_delete=Callback::new(move |_| {
                                                        delete_target.set(Some((id, label.clone())));
                                                        delete_open.set(true);
                                                    })
                                                />
                                            </td>
                                        </tr>
                                    }
                                }
                            </For>
                        </tbody>
                    </table>
                    <ListStatus list=list />
                </div>
            </div>
            <RoleDialog open=dialog_open editing=editing />
            <DeleteDialog open=delete_open entity=AdminEntity::Roles target=delete_target />
        </Access>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;

    fn perm(id: i64, path: &str, method: HttpMethod, module: Option<&str>) -> Permission {
        Permission {
            id,
            name: format!("p{id}"),
            api_path: path.to_string(),
            method,
            module: module.map(str::to_string),
        }
    }

    #[test]
    fn groups_by_module_and_sorts_within() {
        let groups = group_by_module(&[
            perm(1, "/api/secure/users/{id}", HttpMethod::Delete, Some("USERS")),
            perm(2, "/api/secure/users", HttpMethod::Get, Some("users")),
            perm(3, "/api/secure/files/copy", HttpMethod::Post, Some("FILES")),
            perm(4, "/api/secure/users", HttpMethod::Post, Some("USERS")),
        ]);
        assert_eq!(groups.keys().cloned().collect::<Vec<_>>(), vec!["FILES", "USERS"]);
        let users: Vec<i64> = groups["USERS"].iter().map(|p| p.id).collect();
        assert_eq!(users, vec![2, 4, 1]);
    }

    #[test]
    fn missing_module_goes_to_other() {
        let groups = group_by_module(&[
            perm(1, "/a", HttpMethod::Get, None),
            perm(2, "/b", HttpMethod::Get, Some("  ")),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[NO_MODULE].len(), 2);
    }
}
