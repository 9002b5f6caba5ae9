use leptos::prelude::*;

use crate::access::PermissionKey;
use crate::components::ui::{Card, CardContent, CardDescription, CardHeader, CardTitle};
use crate::models::HttpMethod;
use crate::state::AppContext;

/// Renders `children` only when the backend allows `method` on `api_path`.
///
/// Until the batched capability check answers, the gate stays closed and
/// renders nothing; guarded controls appear once the check resolves. A denial
/// shows the fallback card, or nothing with `hide_children`.
#[component]
pub fn Access(
    #[prop(into)] api_path: String,
    #[prop(default = HttpMethod::Get)] method: HttpMethod,
    #[prop(optional, into)] module: Option<String>,
    #[prop(optional)] hide_children: bool,
    children: ChildrenFn,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let key = PermissionKey::new(api_path, method);
    app_state.require_capability(&key, module.as_deref());

    let allowed = Memo::new({
        let key = key.clone();
        move |_| app_state.can(&key)
    });
    let known = Memo::new(move |_| app_state.capability_known(&key));
    let children = StoredValue::new(children);

    view! {
        <Show
            when=move || allowed.get()
            fallback=move || {
                if hide_children || !known.get() {
                    ().into_any()
                } else {
                    view! { <AccessDenied /> }.into_any()
                }
            }
        >
            {move || children.with_value(|c| c())}
        </Show>
    }
}

#[component]
pub fn AccessDenied() -> impl IntoView {
    view! {
        <Card class="border-dashed">
            <CardHeader>
                <CardTitle class="text-sm">"Access denied"</CardTitle>
                <CardDescription class="text-xs">
                    "You do not have permission to view this content."
                </CardDescription>
            </CardHeader>
            <CardContent>
                <a href="/files" class="text-xs text-primary underline underline-offset-4">"Back to my files"</a>
            </CardContent>
        </Card>
    }
}

/// Reactive capability lookup for non-wrapping uses (e.g. disabling a button).
pub fn use_can(api_path: &str, method: HttpMethod) -> Memo<bool> {
    let app_state = expect_context::<AppContext>().0;
    let key = PermissionKey::new(api_path, method);
    app_state.require_capability(&key, None);
    Memo::new(move |_| app_state.can(&key))
}
