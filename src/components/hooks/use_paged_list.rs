use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;

use crate::models::Page;
use crate::paging::{with_page, PageStatus, PagedList, DEFAULT_PAGE_SIZE};
use crate::state::AppContext;

type ObserverSlot = Option<(web_sys::IntersectionObserver, Closure<dyn FnMut(js_sys::Array)>)>;

/// Reactive view over a [`PagedList`] fed by an infinite-scroll sentinel.
pub struct PagedListHandle<T: Send + Sync + 'static> {
    pub items: Signal<Vec<T>>,
    pub loading: Signal<bool>,
    pub has_more: Signal<bool>,
    /// First page arrived and was empty.
    pub loaded_empty: Signal<bool>,
    /// Attach to a `<div>` after the last row.
    pub sentinel: NodeRef<html::Div>,
    pub load_more: Callback<()>,
}

impl<T: Send + Sync + 'static> Clone for PagedListHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Send + Sync + 'static> Copy for PagedListHandle<T> {}

fn in_viewport(el: &web_sys::HtmlDivElement) -> bool {
    let height = web_sys::window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|h| h.as_f64())
        .unwrap_or(0.0);
    el.is_connected() && el.get_bounding_client_rect().top() < height
}

/// Loads `endpoint` page by page. A change of `endpoint` or `reload` drops
/// everything accumulated so far and starts again from page 1.
pub fn use_paged_list<T>(
    endpoint: Signal<Option<String>>,
    reload: Signal<u64>,
) -> PagedListHandle<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    let app_state = expect_context::<AppContext>().0;
    let state: RwSignal<PagedList<T>> = RwSignal::new(PagedList::default());
    let sentinel: NodeRef<html::Div> = NodeRef::new();

    let fetch_next = move || {
        let Some(base) = endpoint.get_untracked() else {
            return;
        };
        let mut next = None;
        state.update(|s| next = s.begin_fetch());
        let Some(req) = next else {
            return;
        };

        let url = with_page(&base, req.page, DEFAULT_PAGE_SIZE);
        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.get_json::<Page<T>>(&url).await {
                Ok(page) => state.update(|s| {
                    if !s.complete(req, page) {
                        log::debug!("dropped stale page {} of {url}", req.page);
                    }
                }),
                Err(e) => {
                    log::warn!("loading {url} failed: {e}");
                    state.update(|s| {
                        s.fail(req);
                    });
                }
            }
        });
    };

    Effect::new(move |_| {
        reload.track();
        let ep = endpoint.get();
        state.update(|s| s.reset());
        if ep.is_some() {
            fetch_next();
        }
    });

    // A short first page can leave the sentinel on screen, and the observer
    // only fires on changes, so keep pulling while it stays visible.
    Effect::new(move |_| {
        let (loading, status) = state.with(|s| (s.is_loading(), s.status()));
        if loading || status != PageStatus::HasMore {
            return;
        }
        if sentinel.get().is_some_and(|el| in_viewport(&el)) {
            fetch_next();
        }
    });

    let observer: StoredValue<ObserverSlot, LocalStorage> = StoredValue::new_local(None);
    Effect::new(move |_| {
        let Some(el) = sentinel.get() else {
            return;
        };
        let on_entries = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            let visible = entries.iter().any(|e| {
                e.unchecked_into::<web_sys::IntersectionObserverEntry>()
                    .is_intersecting()
            });
            if visible {
                fetch_next();
            }
        });
        match web_sys::IntersectionObserver::new(on_entries.as_ref().unchecked_ref()) {
            Ok(obs) => {
                obs.observe(&el);
                observer.update_value(|slot| {
                    if let Some((old, _)) = slot.take() {
                        old.disconnect();
                    }
                    *slot = Some((obs, on_entries));
                });
            }
            Err(e) => log::warn!("IntersectionObserver unavailable: {e:?}"),
        }
    });
    on_cleanup(move || {
        observer.update_value(|slot| {
            if let Some((obs, _)) = slot.take() {
                obs.disconnect();
            }
        })
    });

    PagedListHandle {
        items: Signal::derive(move || state.with(|s| s.items().to_vec())),
        loading: Signal::derive(move || state.with(|s| s.is_loading())),
        has_more: Signal::derive(move || state.with(|s| s.has_more())),
        loaded_empty: Signal::derive(move || {
            state.with(|s| s.status() == PageStatus::Exhausted && s.items().is_empty())
        }),
        sentinel,
        load_more: Callback::new(move |_| fetch_next()),
    }
}
