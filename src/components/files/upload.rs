use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use std::collections::VecDeque;

use crate::api::{ApiError, UploadConflictMode, UploadFile, UploadOutcome};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogDescription, DialogFooter,
    DialogHeader, DialogTitle, ErrorAlert, Spinner, Toasts, use_toasts,
};
use crate::state::{AppContext, AppState};
use crate::util::{files_from_list, format_file_size, read_upload_file};

/// A file in the upload queue. `id` is stable for the life of the dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct QueuedFile {
    pub id: u64,
    pub file: UploadFile,
}

/// Next request the queue wants sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum UploadStep {
    Send(QueuedFile),
    /// Retry of a clashing file at the conflict endpoint.
    Resolve(QueuedFile, UploadConflictMode),
    /// Waiting for the user to settle a name clash.
    Paused,
    Done,
}

/// Files waiting to go up, one at a time. A 409 parks the file in `conflict`
/// and nothing else is sent until the user picks how to resolve it.
#[derive(Clone, Debug, Default)]
pub(crate) struct UploadPlan {
    pending: VecDeque<QueuedFile>,
    conflict: Option<(QueuedFile, String)>,
    uploaded: usize,
    next_id: u64,
}

impl UploadPlan {
    pub fn push(&mut self, file: UploadFile) {
        self.next_id += 1;
        self.pending.push_back(QueuedFile { id: self.next_id, file });
    }

    pub fn pending(&self) -> Vec<QueuedFile> {
        self.pending.iter().cloned().collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn conflict(&self) -> Option<&(QueuedFile, String)> {
        self.conflict.as_ref()
    }

    pub fn uploaded(&self) -> usize {
        self.uploaded
    }

    pub fn next_step(&mut self) -> UploadStep {
        if self.conflict.is_some() {
            return UploadStep::Paused;
        }
        match self.pending.pop_front() {
            Some(next) => UploadStep::Send(next),
            None => UploadStep::Done,
        }
    }

    pub fn record_uploaded(&mut self) {
        self.uploaded += 1;
    }

    pub fn record_conflict(&mut self, file: QueuedFile, message: String) {
        self.conflict = Some((file, message));
    }

    /// `None` skips the clashing file and moves on to the rest.
    pub fn resolve(&mut self, mode: Option<UploadConflictMode>) -> UploadStep {
        let Some((file, _)) = self.conflict.take() else {
            return self.next_step();
        };
        match mode {
            Some(mode) => UploadStep::Resolve(file, mode),
            None => self.next_step(),
        }
    }

    /// Drops the parked file and everything still queued.
    pub fn cancel(&mut self) {
        self.pending.clear();
        self.conflict = None;
    }
}

#[derive(Clone, Copy)]
struct UploadQueue {
    plan: RwSignal<UploadPlan>,
    busy: RwSignal<bool>,
    error: RwSignal<Option<String>>,
    open: RwSignal<bool>,
    folder_id: Signal<Option<i64>>,
    app_state: AppState,
    toasts: Toasts,
}

impl UploadQueue {
    fn reset(&self) {
        self.plan.set(UploadPlan::default());
        self.busy.set(false);
        self.error.set(None);
    }

    fn step(&self) -> UploadStep {
        self.plan.try_update(UploadPlan::next_step).unwrap_or(UploadStep::Done)
    }

    fn start(self) {
        if self.busy.get_untracked() || !self.plan.with_untracked(UploadPlan::has_pending) {
            return;
        }
        self.error.set(None);
        let first = self.step();
        spawn_local(async move { self.run(first).await });
    }

    /// Sends `step` and whatever follows it until the queue pauses or empties.
    async fn run(self, mut step: UploadStep) {
        self.busy.set(true);
        let api_client = self.app_state.api_client.get_untracked();
        let folder_id = self.folder_id.get_untracked();
        loop {
            match step {
                UploadStep::Send(QueuedFile { id, file }) => match api_client.upload(file, folder_id).await {
                    Ok(UploadOutcome::Uploaded(_)) => self.plan.update(UploadPlan::record_uploaded),
                    Ok(UploadOutcome::Conflict { file, message }) => {
                        self.plan.update(|p| p.record_conflict(QueuedFile { id, file }, message));
                    }
                    Err(e) => return self.fail(&e),
                },
                UploadStep::Resolve(QueuedFile { file, .. }, mode) => {
                    let name = file.name.clone();
                    match api_client.upload_resolving(file, folder_id, mode).await {
                        Ok(_) => self.plan.update(UploadPlan::record_uploaded),
                        Err(e) => {
                            log::warn!("resolving upload of {name} with {mode} failed");
                            return self.fail(&e);
                        }
                    }
                }
                UploadStep::Paused => {
                    self.busy.set(false);
                    return;
                }
                UploadStep::Done => return self.finish(),
            }
            step = self.step();
        }
    }

    fn resolve(self, mode: Option<UploadConflictMode>) {
        if self.plan.with_untracked(|p| p.conflict().is_none()) {
            return;
        }
        let step = self.plan.try_update(|p| p.resolve(mode)).unwrap_or(UploadStep::Done);
        spawn_local(async move { self.run(step).await });
    }

    fn cancel(&self) {
        self.plan.update(UploadPlan::cancel);
        self.open.set(false);
    }

    fn fail(&self, e: &ApiError) {
        log::warn!("upload failed: {e}");
        self.error.set(Some(e.user_message()));
        self.busy.set(false);
        self.app_state.bump_reload();
    }

    fn finish(&self) {
        self.busy.set(false);
        let n = self.plan.with_untracked(UploadPlan::uploaded);
        if n > 0 {
            self.toasts.success(format!("{n} file(s) uploaded"));
        }
        self.app_state.bump_reload();
        self.open.set(false);
    }

    fn enqueue(self, files: Vec<web_sys::File>) {
        if files.is_empty() {
            return;
        }
        spawn_local(async move {
            for f in files {
                match read_upload_file(&f).await {
                    Ok(file) => self.plan.update(|p| p.push(file)),
                    Err(msg) => {
                        log::warn!("{msg}");
                        self.error.set(Some(msg));
                    }
                }
            }
        });
    }
}

#[component]
pub fn UploadDialog(open: RwSignal<bool>, #[prop(into)] folder_id: Signal<Option<i64>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let queue = UploadQueue {
        plan: RwSignal::new(UploadPlan::default()),
        busy: RwSignal::new(false),
        error: RwSignal::new(None),
        open,
        folder_id,
        app_state,
        toasts: use_toasts(),
    };
    let drag_over = RwSignal::new(false);
    let file_input: NodeRef<html::Input> = NodeRef::new();

    Effect::new(move |_| {
        if open.get() {
            queue.reset();
        }
    });

    let on_drop = move |ev: web_sys::DragEvent| {
        ev.prevent_default();
        drag_over.set(false);
        let files = files_from_list(ev.data_transfer().and_then(|dt| dt.files()));
        queue.enqueue(files);
    };
    let on_pick = move |_| {
        let Some(input) = file_input.get() else {
            return;
        };
        queue.enqueue(files_from_list(input.files()));
        input.set_value("");
    };

    let conflict_message =
        move || queue.plan.with(|p| p.conflict().map(|(_, m)| m.clone()).unwrap_or_default());
    let conflict_name =
        move || queue.plan.with(|p| p.conflict().map(|(q, _)| q.file.name.clone()).unwrap_or_default());
    let has_conflict = move || queue.plan.with(|p| p.conflict().is_some());

    view! {
        <Dialog open=open close_on_backdrop_click=false>
            <DialogHeader>
                <DialogTitle>"Upload files"</DialogTitle>
                <DialogDescription>"Drop files here or pick them from your computer."</DialogDescription>
            </DialogHeader>
            <DialogBody>
                <label
                    class=move || {
                        if drag_over.get() {
                            "flex h-32 cursor-pointer flex-col items-center justify-center gap-1 rounded-md border-2 border-dashed border-primary bg-accent/40 text-sm"
                        } else {
                            "flex h-32 cursor-pointer flex-col items-center justify-center gap-1 rounded-md border-2 border-dashed border-border text-sm text-muted-foreground hover:bg-muted/30"
                        }
                    }
                    on:dragover=move |ev: web_sys::DragEvent| {
                        ev.prevent_default();
                        if let Some(dt) = ev.data_transfer() {
                            dt.set_drop_effect("copy");
                        }
                        drag_over.set(true);
                    }
                    on:dragleave=move |_| drag_over.set(false)
                    on:drop=on_drop
                >
                    <span>"Drag & drop files"</span>
                    <span class="text-xs">"or click to browse"</span>
                    <input node_ref=file_input type="file" multiple class="hidden" on:change=on_pick />
                </label>

                <ul class="flex flex-col gap-1 text-xs">
                    <For each=move || queue.plan.with(UploadPlan::pending) key=|q| q.id let:queued>
                        <li class="flex justify-between gap-2">
                            <span class="truncate">{queued.file.name.clone()}</span>
                            <span class="text-muted-foreground">{format_file_size(queued.file.bytes.len() as u64)}</span>
                        </li>
                    </For>
                </ul>

                <Show when=has_conflict fallback=|| ().into_view()>
                    <div class="flex flex-col gap-2 rounded-md border border-border bg-muted/30 p-3 text-sm">
                        <p>
                            <span class="font-medium">{conflict_name}</span>
                            " already exists here."
                        </p>
                        <p class="text-xs text-muted-foreground">{conflict_message}</p>
                        <div class="flex flex-wrap gap-2">
                            <Button size=ButtonSize::Xs on:click=move |_| queue.resolve(Some(UploadConflictMode::Replace))>
                                "Replace"
                            </Button>
                            <Button
                                variant=ButtonVariant::Secondary
                                size=ButtonSize::Xs
                                on:click=move |_| queue.resolve(Some(UploadConflictMode::KeepBoth))
                            >
                                "Keep both"
                            </Button>
                            <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=move |_| queue.resolve(None)>
                                "Skip"
                            </Button>
                        </div>
                    </div>
                </Show>

                <ErrorAlert message=queue.error />
            </DialogBody>
            <DialogFooter>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| queue.cancel()>
                    "Cancel"
                </Button>
                <Button
                    size=ButtonSize::Sm
                    attr:disabled=move || {
                        queue.busy.get() || has_conflict() || !queue.plan.with(UploadPlan::has_pending)
                    }
                    on:click=move |_| queue.start()
                >
                    <Show when=move || queue.busy.get() fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                    "Upload"
                </Button>
            </DialogFooter>
        </Dialog>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            mime: "application/pdf".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    fn send(step: UploadStep) -> QueuedFile {
        match step {
            UploadStep::Send(q) => q,
            other => panic!("expected a send, got {other:?}"),
        }
    }

    #[test]
    fn conflict_pauses_until_replace_is_picked() {
        let mut plan = UploadPlan::default();
        plan.push(file("a.pdf"));
        plan.push(file("b.pdf"));

        let a = send(plan.next_step());
        plan.record_conflict(a.clone(), "a.pdf already exists".to_string());
        assert_eq!(plan.next_step(), UploadStep::Paused);
        assert_eq!(plan.pending().len(), 1);

        let retry = plan.resolve(Some(UploadConflictMode::Replace));
        assert_eq!(retry, UploadStep::Resolve(a, UploadConflictMode::Replace));
        assert_eq!(
            UploadConflictMode::Replace.endpoint(),
            "/api/secure/documents/upload/replace"
        );
        plan.record_uploaded();

        assert_eq!(send(plan.next_step()).file.name, "b.pdf");
        plan.record_uploaded();
        assert_eq!(plan.next_step(), UploadStep::Done);
        assert_eq!(plan.uploaded(), 2);
    }

    #[test]
    fn keep_both_retries_at_its_own_endpoint() {
        let mut plan = UploadPlan::default();
        plan.push(file("a.pdf"));
        let a = send(plan.next_step());
        plan.record_conflict(a.clone(), String::new());

        match plan.resolve(Some(UploadConflictMode::KeepBoth)) {
            UploadStep::Resolve(q, mode) => {
                assert_eq!(q, a);
                assert_eq!(mode.endpoint(), "/api/secure/documents/upload/keep-both");
            }
            other => panic!("expected a retry, got {other:?}"),
        }
        assert!(plan.conflict().is_none());
    }

    #[test]
    fn skip_drops_the_clashing_file_and_continues() {
        let mut plan = UploadPlan::default();
        plan.push(file("a.pdf"));
        plan.push(file("b.pdf"));
        let a = send(plan.next_step());
        plan.record_conflict(a, String::new());

        assert_eq!(send(plan.resolve(None)).file.name, "b.pdf");
        assert_eq!(plan.uploaded(), 0);
    }

    #[test]
    fn cancel_drops_the_parked_file_and_the_rest() {
        let mut plan = UploadPlan::default();
        plan.push(file("a.pdf"));
        plan.push(file("b.pdf"));
        let a = send(plan.next_step());
        plan.record_conflict(a, String::new());

        plan.cancel();
        assert!(plan.conflict().is_none());
        assert!(!plan.has_pending());
        assert_eq!(plan.next_step(), UploadStep::Done);
    }

    #[test]
    fn queued_files_keep_distinct_ids_even_with_equal_names() {
        let mut plan = UploadPlan::default();
        plan.push(file("scan.pdf"));
        plan.push(file("scan.pdf"));
        let ids: Vec<u64> = plan.pending().iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);

        let first = send(plan.next_step());
        plan.push(file("scan.pdf"));
        assert!(plan.pending().iter().all(|q| q.id != first.id));
    }
}
