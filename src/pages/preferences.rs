use leptos::prelude::*;
use strum::IntoEnumIterator;

use crate::components::ui::{Card, CardContent, CardDescription, CardHeader, CardTitle, Label};
use crate::state::AppContext;
use crate::storage::{Language, Theme};

const SELECT_CLASS: &str = "h-9 w-48 rounded-md border border-input bg-transparent px-2 text-sm";

#[component]
pub fn PreferencesPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    view! {
        <div class="mx-auto max-w-xl space-y-4">
            <h1 class="text-xl font-semibold">"Preferences"</h1>
            <Card>
                <CardHeader>
                    <CardTitle class="text-sm">"Appearance"</CardTitle>
                    <CardDescription class="text-xs">"Stored in this browser only."</CardDescription>
                </CardHeader>
                <CardContent class="space-y-4">
                    <div class="flex items-center justify-between gap-3">
                        <Label html_for="pref-theme">"Theme"</Label>
                        <select
                            id="pref-theme"
                            class=SELECT_CLASS
                            on:change=move |ev| {
                                if let Ok(theme) = event_target_value(&ev).parse::<Theme>() {
                                    app_state.set_theme(theme);
                                }
                            }
                        >
                            {Theme::iter()
                                .map(|t| {
                                    let label = match t {
                                        Theme::Light => "Light",
                                        Theme::Dark => "Dark",
                                    };
                                    view! {
                                        <option value=t.to_string() selected=move || app_state.theme.get() == t>
                                            {label}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </div>
                    <div class="flex items-center justify-between gap-3">
                        <Label html_for="pref-language">"Language"</Label>
                        <select
                            id="pref-language"
                            class=SELECT_CLASS
                            on:change=move |ev| {
                                if let Ok(language) = event_target_value(&ev).parse::<Language>() {
                                    app_state.set_language(language);
                                }
                            }
                        >
                            {Language::iter()
                                .map(|l| {
                                    view! {
                                        <option value=l.to_string() selected=move || app_state.language.get() == l>
                                            {l.label()}
                                        </option>
                                    }
                                })
                                .collect_view()}
                        </select>
                    </div>
                </CardContent>
            </Card>
        </div>
    }
}
