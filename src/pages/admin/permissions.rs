use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::IntoEnumIterator;

use super::{apply_save_error, use_admin_list, AdminHeader, DeleteDialog, ListStatus, RowActions};
use crate::api::{AdminEntity, PermissionPayload};
use crate::components::access::Access;
use crate::components::ui::{
    use_toasts, Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogFooter, DialogHeader,
    DialogTitle, ErrorAlert, FormField, Label, Spinner,
};
use crate::models::{HttpMethod, Permission};
use crate::state::AppContext;
use crate::validation::FormErrors;

pub(crate) fn validate_permission(body: &PermissionPayload) -> FormErrors {
    let mut errors = FormErrors::default();
    errors.require("name", &body.name, "Name");
    if body.api_path.trim().is_empty() {
        errors.add("apiPath", "API path is required");
    } else if !body.api_path.starts_with('/') {
        errors.add("apiPath", "API path must start with /");
    }
    errors.require("module", &body.module, "Module");
    errors
}

#[component]
fn PermissionDialog(open: RwSignal<bool>, editing: RwSignal<Option<Permission>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    let name = RwSignal::new(String::new());
    let api_path = RwSignal::new(String::new());
    let method = RwSignal::new(HttpMethod::Get);
    let module = RwSignal::new(String::new());
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving = RwSignal::new(false);

    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        let current = editing.get_untracked();
        name.set(current.as_ref().map(|p| p.name.clone()).unwrap_or_default());
        api_path.set(current.as_ref().map(|p| p.api_path.clone()).unwrap_or_default());
        method.set(current.as_ref().map(|p| p.method).unwrap_or_default());
        module.set(current.as_ref().and_then(|p| p.module.clone()).unwrap_or_default());
        errors.set(FormErrors::default());
        error.set(None);
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let id = editing.get_untracked().map(|p| p.id);
        let body = PermissionPayload {
            name: name.get_untracked().trim().to_string(),
            api_path: api_path.get_untracked().trim().to_string(),
            method: method.get_untracked(),
            module: module.get_untracked().trim().to_uppercase(),
        };
        if let Err(form) = validate_permission(&body).into_result() {
            errors.set(form);
            return;
        }
        errors.set(FormErrors::default());
        error.set(None);
        saving.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.save_permission(id, &body).await {
                Ok(p) => {
                    toasts.success(format!("Saved {} {}", p.method, p.api_path));
                    open.set(false);
                    app_state.bump_reload();
                }
                Err(e) => apply_save_error(&e, errors, error),
            }
            saving.set(false);
        });
    };

    let field_error = move |field: &'static str| Signal::derive(move || errors.with(|e| e.get(field)));

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>
                    {move || if editing.with(Option::is_none) { "New permission" } else { "Edit permission" }}
                </DialogTitle>
            </DialogHeader>
            <form on:submit=on_submit>
                <DialogBody>
                    <FormField label="Name" id="permission-name" bind_value=name error=field_error("name") />
                    <FormField
                        label="API path"
                        id="permission-path"
                        placeholder="/api/secure/users/{id}"
                        bind_value=api_path
                        error=field_error("apiPath")
                    />
                    <div class="grid grid-cols-2 gap-3">
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="permission-method" class="text-xs">"Method"</Label>
                            <select
                                id="permission-method"
                                class="h-9 rounded-md border border-input bg-transparent px-2 text-sm"
                                on:change=move |ev| {
                                    if let Ok(m) = event_target_value(&ev).parse::<HttpMethod>() {
                                        method.set(m);
                                    }
                                }
                            >
                                {HttpMethod::iter()
                                    .map(|m| {
                                        view! {
                                            <option value=m.to_string() selected=move || method.get() == m>
                                                {m.to_string()}
                                            </option>
                                        }
                                    })
                                    .collect_view()}
                            </select>
                        </div>
                        <FormField
                            label="Module"
                            id="permission-module"
                            placeholder="USERS"
                            bind_value=module
                            error=field_error("module")
                        />
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
pub fn PermissionsPage() -> impl IntoView {
    let keyword = RwSignal::new(String::new());
    let list = use_admin_list::<Permission>(AdminEntity::Permissions, keyword);

    let dialog_open = RwSignal::new(false);
    let editing: RwSignal<Option<Permission>> = RwSignal::new(None);
    let delete_open = RwSignal::new(false);
    let delete_target: RwSignal<Option<(i64, String)>> = RwSignal::new(None);

    view! {
        <Access api_path={AdminEntity::Permissions.collection_guard()} module={AdminEntity::Permissions.module()}>
            <div class="space-y-4">
                <AdminHeader
                    title="Permissions"
                    description="API routes a role can be granted."
                    entity=AdminEntity::Permissions
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
                                <th class="px-3 py-2 font-medium">"Method"</th>
                                <th class="px-3 py-2 font-medium">"API path"</th>
                                <th class="px-3 py-2 font-medium">"Module"</th>
                                <th class="px-3 py-2"></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || list.items.get()
                                key=|p| (p.id, p.name.clone(), p.api_path.clone(), p.method, p.module.clone())
                                let:permission
                            >
                                {
                                    let id = permission.id;
                                    let label = format!("{} {}", permission.method, permission.api_path);
                                    let row = permission.clone();
                                    view! {
                                        <tr class="border-t border-border">
                                            <td class="px-3 py-2">{permission.name.clone()}</td>
                                            <td class="px-3 py-2 font-mono text-xs">{permission.method.to_string()}</td>
                                            <td class="px-3 py-2 font-mono text-xs">{permission.api_path.clone()}</td>
                                            <td class="px-3 py-2 text-muted-foreground">
                                                {permission.module.clone().unwrap_or_default()}
                                            </td>
                                            <td class="px-3 py-2">
                                                <RowActions
                                                    entity=AdminEntity::Permissions
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
            <PermissionDialog open=dialog_open editing=editing />
            <DeleteDialog open=delete_open entity=AdminEntity::Permissions target=delete_target />
        </Access>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(api_path: &str) -> PermissionPayload {
        PermissionPayload {
            name: "List users".to_string(),
            api_path: api_path.to_string(),
            method: HttpMethod::Get,
            module: "USERS".to_string(),
        }
    }

    #[test]
    fn path_must_be_absolute() {
        assert!(validate_permission(&payload("/api/secure/users")).is_empty());
        assert_eq!(
            validate_permission(&payload("api/secure/users")).get("apiPath").as_deref(),
            Some("API path must start with /")
        );
        assert_eq!(
            validate_permission(&payload(" ")).get("apiPath").as_deref(),
            Some("API path is required")
        );
    }

    #[test]
    fn every_method_is_selectable() {
        let names: Vec<String> = HttpMethod::iter().map(|m| m.to_string()).collect();
        assert_eq!(names, vec!["GET", "POST", "PUT", "PATCH", "DELETE"]);
        assert_eq!("delete".parse::<HttpMethod>().ok(), Some(HttpMethod::Delete));
    }
}
