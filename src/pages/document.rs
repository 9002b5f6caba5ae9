use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_params;
use leptos_router::params::Params;

use crate::access::guards;
use crate::api::DocumentUpdate;
use crate::components::access::{use_can, Access};
use crate::components::files::{PreviewDialog, ShareLinkDialog};
use crate::components::ui::{
    use_toasts, Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle,
    ErrorAlert, FormField, Label, LoadingLine, Spinner, Textarea,
};
use crate::models::{Document, HttpMethod};
use crate::state::AppContext;
use crate::util::{format_file_size, format_optional_timestamp, trigger_download};
use crate::validation::FormErrors;

#[derive(Params, PartialEq, Clone, Debug)]
pub struct DocumentRouteParams {
    pub document_id: Option<i64>,
}

/// Name and description as typed into the edit form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MetadataForm {
    pub name: String,
    pub description: String,
}

impl MetadataForm {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            name: doc.name.clone(),
            description: doc.description.clone().unwrap_or_default(),
        }
    }

    /// Whether a fresh load may overwrite the form. Unsaved edits survive.
    pub fn accepts_reload(&self, last_loaded: Option<&Document>) -> bool {
        last_loaded.is_none_or(|doc| *self == Self::from_document(doc))
    }
}

#[component]
pub fn DocumentPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();
    let params = use_params::<DocumentRouteParams>();
    let document_id = Memo::new(move |_| params.get().ok().and_then(|p| p.document_id));

    let document: RwSignal<Option<Document>> = RwSignal::new(None);
    let load_error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading = RwSignal::new(false);

    let name = RwSignal::new(String::new());
    let description = RwSignal::new(String::new());
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let save_error: RwSignal<Option<String>> = RwSignal::new(None);
    let saving = RwSignal::new(false);

    let preview_open = RwSignal::new(false);
    let link_open = RwSignal::new(false);
    let can_edit = use_can(guards::DOCUMENT_ITEM, HttpMethod::Put);

    Effect::new(move |_| {
        let Some(id) = document_id.get() else {
            load_error.set(Some("Unknown document.".to_string()));
            return;
        };
        app_state.reload.track();
        loading.set(true);
        load_error.set(None);
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_document(id).await {
                Ok(doc) => {
                    let form = MetadataForm {
                        name: name.get_untracked(),
                        description: description.get_untracked(),
                    };
                    if document.with_untracked(|prev| form.accepts_reload(prev.as_ref())) {
                        let fresh = MetadataForm::from_document(&doc);
                        name.set(fresh.name);
                        description.set(fresh.description);
                    }
                    document.set(Some(doc));
                }
                Err(e) => {
                    log::warn!("loading document {id} failed: {e}");
                    load_error.set(Some(e.user_message()));
                }
            }
            loading.set(false);
        });
    });

    let on_save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(id) = document_id.get_untracked() else {
            return;
        };
        if saving.get_untracked() {
            return;
        }
        let body = DocumentUpdate {
            name: name.get_untracked().trim().to_string(),
            description: description.get_untracked().trim().to_string(),
        };
        let mut form = FormErrors::default();
        form.require("name", &body.name, "Name");
        if let Err(form) = form.into_result() {
            errors.set(form);
            return;
        }
        errors.set(FormErrors::default());
        save_error.set(None);
        saving.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.update_document(id, &body).await {
                Ok(saved) => {
                    let form = MetadataForm::from_document(&saved);
                    name.set(form.name);
                    description.set(form.description);
                    document.set(Some(saved));
                    toasts.success("Document saved");
                    app_state.bump_reload();
                }
                Err(e) => {
                    let fields = FormErrors::from_api(&e);
                    if fields.is_empty() {
                        save_error.set(Some(e.user_message()));
                    } else {
                        errors.set(fields);
                    }
                }
            }
            saving.set(false);
        });
    };

    let on_download = move |_| {
        let Some(doc) = document.get_untracked() else {
            return;
        };
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.download_document(doc.id).await {
                Ok(data) => trigger_download(&data, &doc.name),
                Err(e) => toasts.api_error(&e),
            }
        });
    };

    let field = move |f: fn(&Document) -> String| move || document.with(|d| d.as_ref().map(f).unwrap_or_default());
    let previewable = move || document.with(|d| d.as_ref().is_some_and(Document::is_previewable));

    view! {
        <div class="space-y-4">
            <a href="/files" class="text-xs text-muted-foreground hover:underline">"← My files"</a>

            <Show when=move || loading.get() && document.with(Option::is_none) fallback=|| ().into_view()>
                <LoadingLine />
            </Show>
            <ErrorAlert message=load_error />

            <Show when=move || document.with(Option::is_some) fallback=|| ().into_view()>
                <div class="flex flex-wrap items-center justify-between gap-2">
                    <h1 class="truncate text-xl font-semibold">{field(|d| d.name.clone())}</h1>
                    <div class="flex gap-1.5">
                        <Show when=previewable fallback=|| ().into_view()>
                            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| preview_open.set(true)>
                                "Preview"
                            </Button>
                        </Show>
                        <Access api_path=guards::DOCUMENT_DOWNLOAD hide_children=true>
                            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_download>
                                "Download"
                            </Button>
                        </Access>
                        <Access api_path=guards::DOCUMENT_SIGNED_URL method=HttpMethod::Post hide_children=true>
                            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| link_open.set(true)>
                                "Share link"
                            </Button>
                        </Access>
                    </div>
                </div>

                <div class="grid gap-4 md:grid-cols-2">
                    <Card>
                        <CardHeader>
                            <CardTitle class="text-sm">"Details"</CardTitle>
                        </CardHeader>
                        <CardContent>
                            <dl class="grid grid-cols-[8rem_1fr] gap-x-3 gap-y-1.5 text-sm">
                                <dt class="text-muted-foreground">"Original name"</dt>
                                <dd class="truncate">{field(|d| d.original_filename.clone().unwrap_or_default())}</dd>
                                <dt class="text-muted-foreground">"Type"</dt>
                                <dd class="truncate">{field(|d| d.mime_type.clone().unwrap_or_default())}</dd>
                                <dt class="text-muted-foreground">"Size"</dt>
                                <dd>{field(|d| format_file_size(d.size))}</dd>
                                <dt class="text-muted-foreground">"Storage"</dt>
                                <dd>{field(|d| d.storage_type.clone().unwrap_or_default())}</dd>
                                <dt class="text-muted-foreground">"Created"</dt>
                                <dd>
                                    {field(|d| format!(
                                        "{} {}",
                                        format_optional_timestamp(d.created_at.as_deref()),
                                        d.created_by.clone().map(|by| format!("by {by}")).unwrap_or_default(),
                                    ))}
                                </dd>
                                <dt class="text-muted-foreground">"Updated"</dt>
                                <dd>
                                    {field(|d| format!(
                                        "{} {}",
                                        format_optional_timestamp(d.updated_at.as_deref()),
                                        d.updated_by.clone().map(|by| format!("by {by}")).unwrap_or_default(),
                                    ))}
                                </dd>
                            </dl>
                        </CardContent>
                    </Card>

                    <Card>
                        <CardHeader>
                            <CardTitle class="text-sm">"Edit"</CardTitle>
                        </CardHeader>
                        <CardContent>
                            <form class="flex flex-col gap-3" on:submit=on_save>
                                <FormField
                                    label="Name"
                                    id="document-name"
                                    bind_value=name
                                    error=Signal::derive(move || errors.with(|e| e.get("name")))
                                />
                                <div class="flex flex-col gap-1.5">
                                    <Label html_for="document-description" class="text-xs">"Description"</Label>
                                    <Textarea id="document-description" bind_value=description rows=4 />
                                </div>
                                <ErrorAlert message=save_error />
                                <Show when=move || can_edit.get() fallback=|| ().into_view()>
                                    <Button size=ButtonSize::Sm class="self-end" attr:disabled=move || saving.get()>
                                        <Show when=move || saving.get() fallback=|| ().into_view()>
                                            <Spinner />
                                        </Show>
                                        "Save"
                                    </Button>
                                </Show>
                            </form>
                        </CardContent>
                    </Card>
                </div>
            </Show>

            <PreviewDialog open=preview_open document=document />
            <ShareLinkDialog open=link_open document=document />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, description: Option<&str>) -> Document {
        Document {
            id: 3,
            name: name.to_string(),
            description: description.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn failed_save_keeps_unsaved_edits_through_a_reload() {
        let loaded = doc("report.pdf", Some("draft"));
        let edited = MetadataForm {
            name: "report-final.pdf".to_string(),
            description: "signed".to_string(),
        };
        // The server still has the old values after the rejected save.
        assert!(!edited.accepts_reload(Some(&loaded)));
    }

    #[test]
    fn untouched_form_follows_the_server() {
        let loaded = doc("report.pdf", None);
        let form = MetadataForm::from_document(&loaded);
        assert_eq!(form.description, "");
        assert!(form.accepts_reload(Some(&loaded)));
        assert!(MetadataForm::default().accepts_reload(None));
    }
}
