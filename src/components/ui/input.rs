use leptos::html;
use leptos::prelude::*;
use tw_merge::tw_merge;
use wasm_bindgen::JsCast;

#[component]
pub fn Input(
    #[prop(into, optional)] class: String,

    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, optional)] name: String,
    #[prop(into, optional)] id: String,
    #[prop(into, default = "off")] autocomplete: &'static str,
    #[prop(optional)] disabled: bool,
    #[prop(optional)] readonly: bool,
    #[prop(optional)] required: bool,

    // Manual two-way binding; `bind:value` has shifted between Leptos releases.
    #[prop(into)] bind_value: RwSignal<String>,

    /// Marks the field invalid (red ring) when it returns `true`.
    #[prop(into, optional)] invalid: Signal<bool>,

    #[prop(optional)] node_ref: NodeRef<html::Input>,
) -> impl IntoView {
    let merged_class = tw_merge!(
        "file:text-foreground placeholder:text-muted-foreground selection:bg-primary selection:text-primary-foreground dark:bg-input/30 border-input flex h-9 w-full min-w-0 rounded-md border bg-transparent px-3 py-1 text-base shadow-xs transition-[color,box-shadow] outline-none disabled:pointer-events-none disabled:cursor-not-allowed disabled:opacity-50 md:text-sm",
        "focus-visible:border-ring focus-visible:ring-ring/50 focus-visible:ring-2",
        "aria-invalid:ring-destructive/20 dark:aria-invalid:ring-destructive/40 aria-invalid:border-destructive",
        "read-only:bg-muted",
        class
    );

    let on_input = move |ev: web_sys::Event| {
        if let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        {
            bind_value.set(input.value());
        }
    };

    view! {
        <input
            data-name="Input"
            type=r#type
            class=merged_class
            placeholder=placeholder
            name=name
            id=id
            autocomplete=autocomplete
            disabled=disabled
            readonly=readonly
            required=required
            aria-invalid=move || if invalid.get() { "true" } else { "false" }
            prop:value=move || bind_value.get()
            on:input=on_input
            node_ref=node_ref
        />
    }
}

/// Input + label + field error, the common form row.
#[component]
pub fn FormField(
    #[prop(into)] label: String,
    #[prop(into)] id: String,
    #[prop(into)] bind_value: RwSignal<String>,
    #[prop(into)] error: Signal<Option<String>>,
    #[prop(into, default = "text")] r#type: &'static str,
    #[prop(into, optional)] placeholder: String,
    #[prop(into, default = "off")] autocomplete: &'static str,
) -> impl IntoView {
    view! {
        <div class="flex flex-col gap-1.5">
            <crate::components::ui::Label
                html_for=id.clone()
                class="text-xs"
                invalid=Signal::derive(move || error.get().is_some())
            >
                {label}
            </crate::components::ui::Label>
            <Input
                id=id
                r#type=r#type
                placeholder=placeholder
                autocomplete=autocomplete
                bind_value=bind_value
                invalid=Signal::derive(move || error.get().is_some())
                class="h-8 text-sm"
            />
            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                <p class="text-xs text-destructive">{move || error.get().unwrap_or_default()}</p>
            </Show>
        </div>
    }
}
