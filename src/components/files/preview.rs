use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::ui::{Dialog, DialogHeader, DialogTitle, ErrorAlert, LoadingLine};
use crate::models::Document;
use crate::state::AppContext;
use crate::util::BlobUrl;

/// Inline preview of a PDF or image. The object URL lives only while the
/// dialog shows the document it was made for.
#[component]
pub fn PreviewDialog(open: RwSignal<bool>, #[prop(into)] document: Signal<Option<Document>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let blob_url: RwSignal<Option<(i64, BlobUrl)>> = RwSignal::new(None);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading = RwSignal::new(false);

    Effect::new(move |_| {
        let doc = document.get();
        if !open.get() {
            blob_url.set(None);
            return;
        }
        let Some(doc) = doc else {
            return;
        };
        if blob_url.with_untracked(|u| u.as_ref().is_some_and(|(id, _)| *id == doc.id)) {
            return;
        }
        blob_url.set(None);
        error.set(None);
        loading.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            let result = api_client.preview_document(doc.id).await;
            loading.set(false);
            let still_wanted =
                open.get_untracked() && document.with_untracked(|d| d.as_ref().is_some_and(|d| d.id == doc.id));
            match result {
                // Dropping the BlobUrl revokes it.
                Ok(_) if !still_wanted => {}
                Ok(data) => match BlobUrl::new(&data) {
                    Some(url) => blob_url.set(Some((doc.id, url))),
                    None => error.set(Some("Could not display this file.".to_string())),
                },
                Err(e) => {
                    log::warn!("preview of document {} failed: {e}", doc.id);
                    error.set(Some(e.user_message()));
                }
            }
        });
    });

    let src = move || blob_url.with(|u| u.as_ref().map(|(_, url)| url.as_str().to_string()));
    let is_image = move || document.with(|d| d.as_ref().is_some_and(Document::is_image));
    let title = move || document.with(|d| d.as_ref().map(|d| d.name.clone()).unwrap_or_default());

    view! {
        <Dialog open=open class="max-w-4xl">
            <DialogHeader>
                <DialogTitle class="truncate">{title}</DialogTitle>
            </DialogHeader>
            <Show when=move || loading.get() fallback=|| ().into_view()>
                <LoadingLine label="Loading preview…" />
            </Show>
            <ErrorAlert message=error />
            {move || {
                src()
                    .map(|src| {
                        if is_image() {
                            view! {
                                <img src=src alt=title() class="mx-auto max-h-[70vh] rounded-md object-contain" />
                            }
                            .into_any()
                        } else {
                            view! {
                                <iframe src=src class="h-[70vh] w-full rounded-md border border-border" title="Preview"></iframe>
                            }
                            .into_any()
                        }
                    })
            }}
        </Dialog>
    }
}
