use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogFooter, DialogHeader, DialogTitle,
    ErrorAlert, FormField, Spinner, use_toasts,
};
use crate::state::AppContext;
use crate::validation::FormErrors;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FolderDialogMode {
    Create { parent_id: Option<i64> },
    Rename { id: i64, name: String },
}

impl FolderDialogMode {
    fn title(&self) -> &'static str {
        match self {
            FolderDialogMode::Create { .. } => "New folder",
            FolderDialogMode::Rename { .. } => "Rename folder",
        }
    }

    fn initial_name(&self) -> String {
        match self {
            FolderDialogMode::Create { .. } => String::new(),
            FolderDialogMode::Rename { name, .. } => name.clone(),
        }
    }
}

#[component]
pub fn FolderDialog(open: RwSignal<bool>, #[prop(into)] mode: Signal<FolderDialogMode>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    let name = RwSignal::new(String::new());
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading = RwSignal::new(false);

    Effect::new(move |_| {
        if open.get() {
            name.set(mode.get_untracked().initial_name());
            errors.set(FormErrors::default());
            error.set(None);
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let value = name.get_untracked();
        let mut form = FormErrors::default();
        form.require("name", &value, "Folder name");
        if let Err(form) = form.into_result() {
            errors.set(form);
            return;
        }
        errors.set(FormErrors::default());
        error.set(None);
        loading.set(true);

        let api_client = app_state.api_client.get_untracked();
        let mode = mode.get_untracked();
        spawn_local(async move {
            let result = match &mode {
                FolderDialogMode::Create { parent_id } => api_client.create_folder(&value, *parent_id).await,
                FolderDialogMode::Rename { id, .. } => api_client.rename_folder(*id, &value).await,
            };
            loading.set(false);
            match result {
                Ok(folder) => {
                    toasts.success(match mode {
                        FolderDialogMode::Create { .. } => format!("Folder \"{}\" created", folder.name),
                        FolderDialogMode::Rename { .. } => format!("Renamed to \"{}\"", folder.name),
                    });
                    open.set(false);
                    app_state.bump_reload();
                }
                Err(e) => {
                    let fields = FormErrors::from_api(&e);
                    if fields.is_empty() {
                        error.set(Some(e.user_message()));
                    } else {
                        errors.set(fields);
                    }
                }
            }
        });
    };

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>{move || mode.get().title()}</DialogTitle>
            </DialogHeader>
            <form on:submit=on_submit>
                <DialogBody>
                    <FormField
                        label="Name"
                        id="folder-name"
                        bind_value=name
                        error=Signal::derive(move || errors.with(|e| e.get("name")))
                        placeholder="Untitled folder"
                    />
                    <ErrorAlert message=error />
                </DialogBody>
                <DialogFooter>
                    <Button
                        attr:r#type="button"
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| open.set(false)
                    >
                        "Cancel"
                    </Button>
                    <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Save"
                    </Button>
                </DialogFooter>
            </form>
        </Dialog>
    }
}
