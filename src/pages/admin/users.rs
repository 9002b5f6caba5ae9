use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{apply_save_error, use_admin_list, AdminHeader, DeleteDialog, ListStatus, RowActions};
use crate::api::{AdminEntity, UserPayload};
use crate::components::access::Access;
use crate::components::ui::{
    use_toasts, Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogFooter, DialogHeader,
    DialogTitle, ErrorAlert, FormField, Label, Spinner,
};
use crate::models::{Account, Role};
use crate::state::AppContext;
use crate::validation::FormErrors;

/// Create needs a password; edit leaves it alone.
pub(crate) fn validate_user(body: &UserPayload, creating: bool) -> FormErrors {
    let mut errors = FormErrors::default();
    errors.email("email", &body.email);
    errors.require("firstName", &body.first_name, "First name");
    errors.require("lastName", &body.last_name, "Last name");
    if creating {
        errors.password("password", body.password.as_deref().unwrap_or_default());
    }
    errors
}

#[component]
fn UserDialog(open: RwSignal<bool>, editing: RwSignal<Option<Account>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    let email = RwSignal::new(String::new());
    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let role_id = RwSignal::new(String::new());
    let roles: RwSignal<Vec<Role>> = RwSignal::new(vec![]);
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving = RwSignal::new(false);

    let creating = move || editing.with(Option::is_none);

    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        let current = editing.get_untracked();
        email.set(current.as_ref().map(|u| u.email.clone()).unwrap_or_default());
        first_name.set(current.as_ref().map(|u| u.first_name.clone()).unwrap_or_default());
        last_name.set(current.as_ref().map(|u| u.last_name.clone()).unwrap_or_default());
        role_id.set(
            current
                .as_ref()
                .and_then(|u| u.role.as_ref())
                .map(|r| r.id.to_string())
                .unwrap_or_default(),
        );
        password.set(String::new());
        errors.set(FormErrors::default());
        error.set(None);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_all_roles().await {
                Ok(all) => roles.set(all),
                Err(e) => log::warn!("loading roles failed: {e}"),
            }
        });
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let id = editing.get_untracked().map(|u| u.id);
        let body = UserPayload {
            email: email.get_untracked().trim().to_string(),
            first_name: first_name.get_untracked().trim().to_string(),
            last_name: last_name.get_untracked().trim().to_string(),
            password: id.is_none().then(|| password.get_untracked()),
            role_id: role_id.get_untracked().parse().ok(),
        };
        if let Err(form) = validate_user(&body, id.is_none()).into_result() {
            errors.set(form);
            return;
        }
        errors.set(FormErrors::default());
        error.set(None);
        saving.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.save_user(id, &body).await {
                Ok(user) => {
                    toasts.success(format!("Saved {}", user.email));
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
                <DialogTitle>{move || if creating() { "New user" } else { "Edit user" }}</DialogTitle>
            </DialogHeader>
            <form on:submit=on_submit>
                <DialogBody>
                    <FormField label="Email" id="user-email" r#type="email" bind_value=email error=field_error("email") />
                    <div class="grid grid-cols-2 gap-3">
                        <FormField label="First name" id="user-first" bind_value=first_name error=field_error("firstName") />
                        <FormField label="Last name" id="user-last" bind_value=last_name error=field_error("lastName") />
                    </div>
                    <Show when=creating fallback=|| ().into_view()>
                        <FormField
                            label="Password"
                            id="user-password"
                            r#type="password"
                            autocomplete="new-password"
                            bind_value=password
                            error=field_error("password")
                        />
                    </Show>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="user-role" class="text-xs">"Role"</Label>
                        <select
                            id="user-role"
                            class="h-9 rounded-md border border-input bg-transparent px-2 text-sm"
                            prop:value=move || role_id.get()
                            on:change=move |ev| role_id.set(event_target_value(&ev))
                        >
                            <option value="">"No role"</option>
                            <For each=move || roles.get() key=|r| r.id let:role>
                                <option value=role.id.to_string() selected=move || role_id.get() == role.id.to_string()>
                                    {role.name.clone()}
                                </option>
                            </For>
                        </select>
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
pub fn UsersPage() -> impl IntoView {
    let keyword = RwSignal::new(String::new());
    let list = use_admin_list::<Account>(AdminEntity::Users, keyword);

    let dialog_open = RwSignal::new(false);
    let editing: RwSignal<Option<Account>> = RwSignal::new(None);
    let delete_open = RwSignal::new(false);
    let delete_target: RwSignal<Option<(i64, String)>> = RwSignal::new(None);

    view! {
        <Access api_path={AdminEntity::Users.collection_guard()} module={AdminEntity::Users.module()}>
            <div class="space-y-4">
                <AdminHeader
                    title="Users"
                    description="Accounts and the role each one holds."
                    entity=AdminEntity::Users
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
                                <th class="px-3 py-2 font-medium">"Email"</th>
                                <th class="px-3 py-2 font-medium">"Role"</th>
                                <th class="px-3 py-2"></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || list.items.get()
                                key=|u| (u.id, u.email.clone(), u.display_name(), u.role.as_ref().map(|r| r.id))
                                let:user
                            >
                                {
                                    let label = user.email.clone();
                                    let id = user.id;
                                    let row = user.clone();
                                    view! {
                                        <tr class="border-t border-border">
                                            <td class="px-3 py-2">{user.display_name()}</td>
                                            <td class="px-3 py-2 text-muted-foreground">{user.email.clone()}</td>
                                            <td class="px-3 py-2">
                                                {user.role.as_ref().map(|r| r.name.clone()).unwrap_or_else(|| "-".to_string())}
                                            </td>
                                            <td class="px-3 py-2">
                                                <RowActions
                                                    entity=AdminEntity::Users
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
            <UserDialog open=dialog_open editing=editing />
            <DeleteDialog open=delete_open entity=AdminEntity::Users target=delete_target />
        </Access>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> UserPayload {
        UserPayload {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: Some("secret1".to_string()),
            role_id: None,
        }
    }

    #[test]
    fn complete_user_passes() {
        assert!(validate_user(&payload(), true).is_empty());
    }

    #[test]
    fn password_only_checked_on_create() {
        let body = UserPayload {
            password: None,
            ..payload()
        };
        assert!(validate_user(&body, false).is_empty());
        assert!(validate_user(&body, true).get("password").is_some());
    }

    #[test]
    fn names_and_email_are_required() {
        let body = UserPayload {
            email: "nope".to_string(),
            first_name: " ".to_string(),
            last_name: String::new(),
            ..payload()
        };
        let errors = validate_user(&body, false);
        assert_eq!(errors.get("email").as_deref(), Some("Email is not valid"));
        assert_eq!(errors.get("firstName").as_deref(), Some("First name is required"));
        assert_eq!(errors.get("lastName").as_deref(), Some("Last name is required"));
    }
}
