use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::access::guards;
use crate::api::UploadFile;
use crate::components::access::Access;
use crate::components::ui::{
    use_toasts, Button, ButtonSize, Card, CardContent, CardDescription, CardHeader,
    CardTitle, ErrorAlert, Label, Spinner, Textarea,
};
use crate::models::HttpMethod;
use crate::state::AppContext;
use crate::util::{files_from_list, format_file_size, is_pdf_file, read_upload_file, suffixed_file_name, trigger_download};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StegoTab {
    Hide,
    Extract,
}

/// Reads the first picked file into `target`, accepting PDFs only.
fn pick_pdf(ev: web_sys::Event, target: RwSignal<Option<UploadFile>>, error: RwSignal<Option<String>>) {
    use wasm_bindgen::JsCast;
    let Some(input) = ev
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
    else {
        return;
    };
    let Some(file) = files_from_list(input.files()).into_iter().next() else {
        target.set(None);
        return;
    };
    if !is_pdf_file(&file.name(), &file.type_()) {
        target.set(None);
        error.set(Some("Please choose a PDF file.".to_string()));
        return;
    }
    error.set(None);
    spawn_local(async move {
        match read_upload_file(&file).await {
            Ok(pdf) => target.set(Some(pdf)),
            Err(msg) => error.set(Some(msg)),
        }
    });
}

#[component]
fn PdfPicker(id: &'static str, file: RwSignal<Option<UploadFile>>, error: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <div class="flex flex-col gap-1.5">
            <Label html_for=id class="text-xs">"PDF file"</Label>
            <input
                id=id
                type="file"
                accept="application/pdf,.pdf"
                class="text-sm file:mr-3 file:rounded-md file:border file:border-border file:bg-transparent file:px-3 file:py-1 file:text-sm"
                on:change=move |ev| pick_pdf(ev, file, error)
            />
            <Show when=move || file.with(Option::is_some) fallback=|| ().into_view()>
                <p class="text-xs text-muted-foreground">
                    {move || {
                        file.with(|f| {
                            f.as_ref()
                                .map(|f| format!("{} ({})", f.name, format_file_size(f.bytes.len() as u64)))
                                .unwrap_or_default()
                        })
                    }}
                </p>
            </Show>
        </div>
    }
}

#[component]
fn HideForm() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();
    let file: RwSignal<Option<UploadFile>> = RwSignal::new(None);
    let data = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let Some(pdf) = file.get_untracked() else {
            error.set(Some("Please choose a PDF file.".to_string()));
            return;
        };
        let text = data.get_untracked();
        if text.trim().is_empty() {
            error.set(Some("Enter the text to hide.".to_string()));
            return;
        }
        error.set(None);
        loading.set(true);

        let out_name = suffixed_file_name(&pdf.name, "hidden");
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.hide_data(pdf, &text).await {
                Ok(blob) => {
                    trigger_download(&blob, &out_name);
                    toasts.success(format!("Saved {out_name}"));
                }
                Err(e) => error.set(Some(e.user_message())),
            }
            loading.set(false);
        });
    };

    view! {
        <form class="flex flex-col gap-3" on:submit=on_submit>
            <PdfPicker id="hide-pdf" file=file error=error />
            <div class="flex flex-col gap-1.5">
                <Label html_for="hide-text" class="text-xs">"Text to hide"</Label>
                <Textarea id="hide-text" bind_value=data rows=5 placeholder="Secret message" />
            </div>
            <ErrorAlert message=error />
            <Button size=ButtonSize::Sm class="self-end" attr:disabled=move || loading.get()>
                <Show when=move || loading.get() fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                "Hide and download"
            </Button>
        </form>
    }
}

#[component]
fn ExtractForm() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let file: RwSignal<Option<UploadFile>> = RwSignal::new(None);
    let extracted: RwSignal<Option<String>> = RwSignal::new(None);
    let extracted_text = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let Some(pdf) = file.get_untracked() else {
            error.set(Some("Please choose a PDF file.".to_string()));
            return;
        };
        error.set(None);
        extracted.set(None);
        loading.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.extract_data(pdf).await {
                Ok(found) => {
                    extracted_text.set(found.data.clone());
                    extracted.set(Some(found.data));
                }
                Err(e) => error.set(Some(e.user_message())),
            }
            loading.set(false);
        });
    };

    view! {
        <form class="flex flex-col gap-3" on:submit=on_submit>
            <PdfPicker id="extract-pdf" file=file error=error />
            <ErrorAlert message=error />
            <Button size=ButtonSize::Sm class="self-end" attr:disabled=move || loading.get()>
                <Show when=move || loading.get() fallback=|| ().into_view()>
                    <Spinner />
                </Show>
                "Extract"
            </Button>
            <Show when=move || extracted.with(Option::is_some) fallback=|| ().into_view()>
                <div class="flex flex-col gap-1.5">
                    <Label class="text-xs">"Hidden text"</Label>
                    <Show
                        when=move || extracted.with(|t| t.as_ref().is_some_and(|t| !t.is_empty()))
                        fallback=|| view! { <p class="text-xs text-muted-foreground">"No hidden data found."</p> }
                    >
                        <Textarea bind_value=extracted_text rows=5 readonly=true />
                    </Show>
                </div>
            </Show>
        </form>
    }
}

#[component]
pub fn HideDataPage() -> impl IntoView {
    let tab = RwSignal::new(StegoTab::Hide);
    let tab_button = move |target: StegoTab, label: &'static str| {
        view! {
            <button
                type="button"
                class=move || {
                    if tab.get() == target {
                        "h-8 rounded-md bg-secondary px-3 text-sm font-medium text-secondary-foreground"
                    } else {
                        "h-8 rounded-md px-3 text-sm text-muted-foreground hover:bg-accent hover:text-accent-foreground"
                    }
                }
                on:click=move |_| tab.set(target)
            >
                {label}
            </button>
        }
    };

    view! {
        <div class="mx-auto max-w-xl space-y-4">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Hide data"</h1>
                <p class="text-sm text-muted-foreground">"Embed text inside a PDF, or read it back out."</p>
            </div>

            <div class="flex gap-1">
                {tab_button(StegoTab::Hide, "Hide")}
                {tab_button(StegoTab::Extract, "Extract")}
            </div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-sm">
                        {move || match tab.get() {
                            StegoTab::Hide => "Hide text in a PDF",
                            StegoTab::Extract => "Extract text from a PDF",
                        }}
                    </CardTitle>
                    <CardDescription class="text-xs">
                        {move || match tab.get() {
                            StegoTab::Hide => "The new PDF is downloaded with a -hidden suffix.",
                            StegoTab::Extract => "Only PDFs produced by this tool carry hidden text.",
                        }}
                    </CardDescription>
                </CardHeader>
                <CardContent>
                    {move || match tab.get() {
                        StegoTab::Hide => view! {
                            <Access api_path=guards::STEGO_HIDE method=HttpMethod::Post>
                                <HideForm />
                            </Access>
                        }
                        .into_any(),
                        StegoTab::Extract => view! {
                            <Access api_path=guards::STEGO_EXTRACT method=HttpMethod::Post>
                                <ExtractForm />
                            </Access>
                        }
                        .into_any(),
                    }}
                </CardContent>
            </Card>
        </div>
    }
}
