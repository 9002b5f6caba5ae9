use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::access::guards;
use crate::api::{ShareRequest, SIGNED_URL_MAX_MINUTES};
use crate::components::access::use_can;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Dialog, DialogBody, DialogDescription, DialogFooter,
    DialogHeader, DialogTitle, ErrorAlert, FormField, Input, Spinner, use_toasts,
};
use crate::models::{Account, Document, HttpMethod, Selection, SignedUrl};
use crate::state::AppContext;
use crate::util::format_optional_timestamp;

const DEFAULT_LINK_MINUTES: &str = "60";

pub(crate) fn parse_link_minutes(raw: &str) -> Result<u32, String> {
    let out_of_range = || format!("Enter a whole number of minutes between 1 and {SIGNED_URL_MAX_MINUTES}");
    let minutes: u32 = raw.trim().parse().map_err(|_| out_of_range())?;
    if (1..=SIGNED_URL_MAX_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(out_of_range())
    }
}

/// Body for one share attempt. `items` is the selection captured when the dialog opened.
pub(crate) fn share_request(items: &Selection, recipients: &[Account]) -> Result<ShareRequest, String> {
    if items.is_empty() {
        return Err("Nothing is selected to share.".to_string());
    }
    if recipients.is_empty() {
        return Err("Pick at least one person to share with.".to_string());
    }
    Ok(ShareRequest {
        items: items.into(),
        user_ids: recipients.iter().map(|a| a.id).collect(),
    })
}

/// Grants other accounts access to the selected items.
#[component]
pub fn ShareUsersDialog(open: RwSignal<bool>, #[prop(into)] selection: Signal<Selection>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    let keyword = RwSignal::new(String::new());
    let results: RwSignal<Vec<Account>> = RwSignal::new(vec![]);
    let recipients: RwSignal<Vec<Account>> = RwSignal::new(vec![]);
    let searching = RwSignal::new(false);
    let loading = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    // The file table clears its selection on every reload.
    let items: RwSignal<Selection> = RwSignal::new(Selection::default());
    let can_search = use_can(guards::USER_SEARCH, HttpMethod::Get);

    Effect::new(move |_| {
        if open.get() {
            items.set(selection.get_untracked());
            keyword.set(String::new());
            results.set(vec![]);
            recipients.set(vec![]);
            error.set(None);
        }
    });

    let search = move || {
        let q = keyword.get_untracked().trim().to_string();
        if q.is_empty() || searching.get_untracked() {
            return;
        }
        searching.set(true);
        let api_client = app_state.api_client.get_untracked();
        let me = app_state.current_user.with_untracked(|u| u.as_ref().map(|u| u.id));
        spawn_local(async move {
            match api_client.search_users(&q).await {
                Ok(found) => results.set(found.into_iter().filter(|a| Some(a.id) != me).collect()),
                Err(e) => error.set(Some(e.user_message())),
            }
            searching.set(false);
        });
    };

    let add = move |account: Account| {
        recipients.update(|r| {
            if !r.iter().any(|a| a.id == account.id) {
                r.push(account);
            }
        });
    };

    let submit = move |_| {
        if loading.get_untracked() {
            return;
        }
        let count = items.with_untracked(Selection::len);
        let request = match items.with_untracked(|i| recipients.with_untracked(|r| share_request(i, r))) {
            Ok(request) => request,
            Err(message) => {
                error.set(Some(message));
                return;
            }
        };
        loading.set(true);
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.share_with_users(&request).await {
                Ok(()) => {
                    toasts.success(format!("Shared {count} item(s)"));
                    open.set(false);
                    app_state.bump_reload();
                }
                Err(e) => error.set(Some(e.user_message())),
            }
            loading.set(false);
        });
    };

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>"Share"</DialogTitle>
                <DialogDescription>
                    {move || format!("{} item(s) selected", items.with(Selection::len))}
                </DialogDescription>
            </DialogHeader>
            <DialogBody>
                <Show
                    when=move || can_search.get()
                    fallback=|| view! {
                        <p class="text-sm text-muted-foreground">"You are not allowed to look up other accounts."</p>
                    }
                >
                    <div class="flex gap-2">
                        <div
                            class="flex-1"
                            on:keydown=move |ev: web_sys::KeyboardEvent| {
                                if ev.key() == "Enter" {
                                    ev.prevent_default();
                                    search();
                                }
                            }
                        >
                            <Input bind_value=keyword placeholder="Search people by name or email" class="h-8 text-sm" />
                        </div>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || searching.get()
                            on:click=move |_| search()
                        >
                            "Search"
                        </Button>
                    </div>
                </Show>

                <Show when=move || !recipients.with(Vec::is_empty) fallback=|| ().into_view()>
                    <div class="flex flex-wrap gap-1.5">
                        <For each=move || recipients.get() key=|a| a.id let:account>
                            {
                                let id = account.id;
                                view! {
                                    <span class="inline-flex items-center gap-1 rounded-full bg-secondary px-2 py-0.5 text-xs">
                                        {account.display_name()}
                                        <button
                                            type="button"
                                            class="text-muted-foreground hover:text-foreground"
                                            aria-label="Remove"
                                            on:click=move |_| recipients.update(|r| r.retain(|a| a.id != id))
                                        >
                                            "×"
                                        </button>
                                    </span>
                                }
                            }
                        </For>
                    </div>
                </Show>

                <div class="max-h-48 overflow-y-auto">
                    <For each=move || results.get() key=|a| a.id let:account>
                        {
                            let label = format!("{} · {}", account.display_name(), account.email);
                            view! {
                                <button
                                    type="button"
                                    class="flex w-full items-center gap-2 rounded-md px-2 py-1.5 text-left text-sm hover:bg-muted/40"
                                    on:click=move |_| add(account.clone())
                                >
                                    <span class="flex size-6 items-center justify-center rounded-full bg-muted text-[10px] font-medium">
                                        {account.initials()}
                                    </span>
                                    <span class="truncate">{label}</span>
                                </button>
                            }
                        }
                    </For>
                </div>

                <ErrorAlert message=error />
            </DialogBody>
            <DialogFooter>
                <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=move |_| open.set(false)>
                    "Cancel"
                </Button>
                <Button size=ButtonSize::Sm attr:disabled=move || loading.get() on:click=submit>
                    <Show when=move || loading.get() fallback=|| ().into_view()>
                        <Spinner />
                    </Show>
                    "Share"
                </Button>
            </DialogFooter>
        </Dialog>
    }
}

/// Time-limited public link for a single document.
#[component]
pub fn ShareLinkDialog(open: RwSignal<bool>, #[prop(into)] document: Signal<Option<Document>>) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let toasts = use_toasts();

    let minutes = RwSignal::new(DEFAULT_LINK_MINUTES.to_string());
    let minutes_error: RwSignal<Option<String>> = RwSignal::new(None);
    let link: RwSignal<Option<SignedUrl>> = RwSignal::new(None);
    let link_text = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading = RwSignal::new(false);

    Effect::new(move |_| {
        if open.get() {
            minutes.set(DEFAULT_LINK_MINUTES.to_string());
            minutes_error.set(None);
            link.set(None);
            link_text.set(String::new());
            error.set(None);
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }
        let Some(doc_id) = document.with_untracked(|d| d.as_ref().map(|d| d.id)) else {
            return;
        };
        let mins = match parse_link_minutes(&minutes.get_untracked()) {
            Ok(m) => m,
            Err(msg) => {
                minutes_error.set(Some(msg));
                return;
            }
        };
        minutes_error.set(None);
        error.set(None);
        loading.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.create_signed_url(doc_id, mins).await {
                Ok(signed) => {
                    link_text.set(signed.url.clone());
                    link.set(Some(signed));
                    toasts.success("Link created");
                }
                Err(e) => error.set(Some(e.user_message())),
            }
            loading.set(false);
        });
    };

    view! {
        <Dialog open=open>
            <DialogHeader>
                <DialogTitle>"Share link"</DialogTitle>
                <DialogDescription class="truncate">
                    {move || document.with(|d| d.as_ref().map(|d| d.name.clone()).unwrap_or_default())}
                </DialogDescription>
            </DialogHeader>
            <form on:submit=on_submit>
                <DialogBody>
                    <FormField
                        label="Expires after (minutes)"
                        id="signed-url-minutes"
                        r#type="number"
                        bind_value=minutes
                        error=minutes_error
                    />
                    <Show when=move || link.with(Option::is_some) fallback=|| ().into_view()>
                        <div class="flex flex-col gap-1.5">
                            <Input bind_value=link_text readonly=true class="h-8 text-xs" />
                            <p class="text-xs text-muted-foreground">
                                {move || {
                                    format!(
                                        "Valid until {}",
                                        link.with(|l| format_optional_timestamp(
                                            l.as_ref().and_then(|l| l.expires_at.as_deref()),
                                        )),
                                    )
                                }}
                            </p>
                        </div>
                    </Show>
                    <ErrorAlert message=error />
                </DialogBody>
                <DialogFooter>
                    <Button
                        attr:r#type="button"
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| open.set(false)
                    >
                        "Close"
                    </Button>
                    <Button size=ButtonSize::Sm attr:disabled=move || loading.get()>
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        "Create link"
                    </Button>
                </DialogFooter>
            </form>
        </Dialog>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileKind;

    fn account(id: i64) -> Account {
        serde_json::from_value(serde_json::json!({"id": id, "email": format!("u{id}@example.com")}))
            .expect("account should parse")
    }

    #[test]
    fn retry_after_failure_shares_the_items_captured_at_open() {
        let mut live = Selection::default();
        live.toggle(FileKind::Document, 9);
        live.toggle(FileKind::Folder, 3);
        let captured = live.clone();
        let recipients = vec![account(5)];

        let first = share_request(&captured, &recipients).expect("first attempt");
        // A reload clears the table selection between attempts.
        live = Selection::default();
        assert!(live.is_empty());

        let retry = share_request(&captured, &recipients).expect("retry");
        assert_eq!(retry, first);
        assert_eq!(retry.items.document_ids, vec![9]);
        assert_eq!(retry.items.folder_ids, vec![3]);
        assert_eq!(retry.user_ids, vec![5]);
    }

    #[test]
    fn share_request_needs_items_and_recipients() {
        let mut items = Selection::default();
        assert!(share_request(&items, &[account(1)]).is_err());
        items.toggle(FileKind::Document, 1);
        assert!(share_request(&items, &[]).is_err());
        assert!(share_request(&items, &[account(1)]).is_ok());
    }

    #[test]
    fn link_minutes_bounds() {
        assert_eq!(parse_link_minutes("60"), Ok(60));
        assert_eq!(parse_link_minutes(" 1 "), Ok(1));
        assert_eq!(parse_link_minutes("10080"), Ok(10080));
        assert!(parse_link_minutes("0").is_err());
        assert!(parse_link_minutes("10081").is_err());
        assert!(parse_link_minutes("-5").is_err());
        assert!(parse_link_minutes("1.5").is_err());
        assert!(parse_link_minutes("").is_err());
    }
}
