use leptos::prelude::*;
use leptos::task::spawn_local;

use super::{apply_save_error, use_admin_list, AdminHeader, DeleteDialog, ListStatus, RowActions};
use crate::api::{AdminEntity, SettingPayload};
use crate::components::access::Access;
use crate::components::ui::{
    use_toasts, Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogFooter, DialogHeader,
    DialogTitle, ErrorAlert, FormField, Label, Spinner, Textarea,
};
use crate::models::Setting;
use crate::state::AppContext;
use crate::util::format_optional_timestamp;
use crate::validation::FormErrors;

#[component]
fn SettingDialog(open: RwSignal<bool>, editing: RwSignal<Option<Setting>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    let key = RwSignal::new(String::new());
    let value = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving = RwSignal::new(false);

    Effect::new(move |_| {
        if !open.get() {
            return;
        }
        let current = editing.get_untracked();
        key.set(current.as_ref().map(|s| s.key.clone()).unwrap_or_default());
        value.set(current.as_ref().map(|s| s.value.clone()).unwrap_or_default());
        description.set(current.as_ref().and_then(|s| s.description.clone()).unwrap_or_default());
        errors.set(FormErrors::default());
        error.set(None);
    });

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let id = editing.get_untracked().map(|s| s.id);
        let body = SettingPayload {
            key: key.get_untracked().trim().to_string(),
            value: value.get_untracked(),
            description: description.get_untracked().trim().to_string(),
        };
        let mut form = FormErrors::default();
        form.require("key", &body.key, "Key");
        if let Err(form) = form.into_result() {
            errors.set(form);
            return;
        }
        errors.set(FormErrors::default());
        error.set(None);
        saving.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.save_setting(id, &body).await {
                Ok(s) => {
                    toasts.success(format!("Saved {}", s.key));
                    open.set(false);
                    app_state.bump_reload();
                }
                Err(e) => apply_save_error(&e, errors, error),
            }
            saving.set(false);
        });
    };

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>{move || if editing.with(Option::is_none) { "New setting" } else { "Edit setting" }}</DialogTitle>
            </DialogHeader>
            <form on:submit=on_submit>
                <DialogBody>
                    <FormField
                        label="Key"
                        id="setting-key"
                        placeholder="storage.max-upload-mb"
                        bind_value=key
                        error=Signal::derive(move || errors.with(|e| e.get("key")))
                    />
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="setting-value" class="text-xs">"Value"</Label>
                        <Textarea id="setting-value" bind_value=value rows=3 class="font-mono text-xs" />
                    </div>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="setting-description" class="text-xs">"Description"</Label>
                        <Textarea id="setting-description" bind_value=description rows=2 />
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
pub fn SettingsPage() -> impl IntoView {
    let keyword = RwSignal::new(String::new());
    let list = use_admin_list::<Setting>(AdminEntity::Settings, keyword);

    let dialog_open = RwSignal::new(false);
    let editing: RwSignal<Option<Setting>> = RwSignal::new(None);
    let delete_open = RwSignal::new(false);
    let delete_target: RwSignal<Option<(i64, String)>> = RwSignal::new(None);

    view! {
        <Access api_path={AdminEntity::Settings.collection_guard()} module={AdminEntity::Settings.module()}>
            <div class="space-y-4">
                <AdminHeader
                    title="Settings"
                    description="Key/value configuration read by the backend."
                    entity=AdminEntity::Settings
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
                                <th class="px-3 py-2 font-medium">"Key"</th>
                                <th class="px-3 py-2 font-medium">"Value"</th>
                                <th class="px-3 py-2 font-medium">"Updated"</th>
                                <th class="px-3 py-2"></th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || list.items.get()
                                key=|s| (s.id, s.key.clone(), s.value.clone(), s.updated_at.clone())
                                let:setting
                            >
                                {
                                    let id = setting.id;
                                    let label = setting.key.clone();
                                    let row = setting.clone();
                                    view! {
                                        <tr class="border-t border-border">
                                            <td class="px-3 py-2">
                                                <div class="font-mono text-xs">{setting.key.clone()}</div>
                                                <div class="text-xs text-muted-foreground">
                                                    {setting.description.clone().unwrap_or_default()}
                                                </div>
                                            </td>
                                            <td class="max-w-xs truncate px-3 py-2 font-mono text-xs">{setting.value.clone()}</td>
                                            <td class="px-3 py-2 text-xs text-muted-foreground">
                                                {format_optional_timestamp(setting.updated_at.as_deref())}
                                            </td>
                                            <td class="px-3 py-2">
                                                <RowActions
                                                    entity=AdminEntity::Settings
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
            <SettingDialog open=dialog_open editing=editing />
            <DeleteDialog open=delete_open entity=AdminEntity::Settings target=delete_target />
        </Access>
    }
}
