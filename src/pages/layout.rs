use leptos::html;
use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use std::time::Duration;

use super::auth::LoginPage;
use crate::access::guards;
use crate::components::access::{use_can, Access};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Input, LoadingLine, Separator,
};
use crate::models::HttpMethod;
use crate::state::{redirect_to, AppContext, ProfileStatus};
use crate::storage::{clear_search_history, write_search_query, Theme};

/// Secure routes: login form without a token, profile bootstrap, then the shell.
#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let is_authenticated = move || app_state.api_client.with(|c| c.is_authenticated());

    Effect::new(move |_| {
        if is_authenticated() && app_state.profile_status.get() == ProfileStatus::Idle {
            app_state.bootstrap_profile();
        }
    });

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            {move || match app_state.profile_status.get() {
                ProfileStatus::Ready => view! {
                    <AppLayout>{move || children.with_value(|c| c())}</AppLayout>
                }
                .into_any(),
                ProfileStatus::Failed(message) => view! { <ProfileFailed message=message /> }.into_any(),
                ProfileStatus::Idle | ProfileStatus::Loading => view! {
                    <div class="flex min-h-screen items-center justify-center bg-background">
                        <LoadingLine label="Loading your account…" />
                    </div>
                }
                .into_any(),
            }}
        </Show>
    }
}

#[component]
fn ProfileFailed(message: String) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    view! {
        <div class="flex min-h-screen items-center justify-center bg-background px-4">
            <Card class="w-full max-w-sm">
                <CardHeader>
                    <CardTitle class="text-sm">"Could not load your account"</CardTitle>
                    <CardDescription class="text-xs text-destructive">{message}</CardDescription>
                </CardHeader>
                <CardContent class="flex gap-2">
                    <Button size=ButtonSize::Sm on:click=move |_| {
                        app_state.profile_status.set(ProfileStatus::Idle);
                    }>
                        "Retry"
                    </Button>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        on:click=move |_| {
                            app_state.sign_out();
                            redirect_to("/login");
                        }
                    >
                        "Sign out"
                    </Button>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn NavLink(#[prop(into)] href: String, #[prop(into)] label: String) -> impl IntoView {
    let location = use_location();
    let target = href.clone();
    let class = move || {
        let p = location.pathname.get();
        let active = if target == "/files" { p == "/files" || p.starts_with("/files/folder") } else { p.starts_with(&target) };
        if active {
            "block rounded-md bg-accent px-3 py-1.5 text-sm font-medium text-accent-foreground"
        } else {
            "block rounded-md px-3 py-1.5 text-sm text-muted-foreground transition-colors hover:bg-muted/40 hover:text-foreground"
        }
    };

    view! { <a href=href class=class>{label}</a> }
}

#[component]
fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let on_logout = move |_| {
        app_state.sign_out();
        redirect_to("/login");
    };
    let toggle_theme = move |_| {
        app_state.set_theme(match app_state.theme.get_untracked() {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        });
    };

    let user_name = move || app_state.current_user.with(|u| u.as_ref().map(|u| u.display_name()).unwrap_or_default());
    let user_role = move || {
        app_state
            .current_user
            .with(|u| u.as_ref().and_then(|u| u.role.as_ref()).map(|r| r.name.clone()).unwrap_or_default())
    };
    let user_initials = move || app_state.current_user.with(|u| u.as_ref().map(|u| u.initials()).unwrap_or_default());

    let admin_gates = [
        use_can(guards::USERS, HttpMethod::Get),
        use_can(guards::ROLES, HttpMethod::Get),
        use_can(guards::PERMISSIONS, HttpMethod::Get),
        use_can(guards::SETTINGS, HttpMethod::Get),
    ];
    let any_admin = move || admin_gates.iter().any(|gate| gate.get());

    let children = StoredValue::new(children);

    view! {
        <div class="min-h-screen bg-background text-foreground">
            <div class="mx-auto flex min-h-screen w-full max-w-6xl gap-6 px-4 py-6">
                <aside class="w-56 shrink-0">
                    <div class="sticky top-6 space-y-4">
                        <a href="/files" class="block text-sm font-medium text-foreground">"DocVault"</a>

                        <SearchBox />

                        <nav class="space-y-0.5">
                            <NavLink href="/files" label="My files" />
                            <Access api_path=guards::SHARED_FILES hide_children=true>
                                <NavLink href="/files/shared" label="Shared with me" />
                            </Access>
                            <Access api_path=guards::TRASH_FILES hide_children=true>
                                <NavLink href="/files/trash" label="Trash" />
                            </Access>
                            <Access api_path=guards::STEGO_HIDE method=HttpMethod::Post hide_children=true>
                                <NavLink href="/tools/hide-data" label="Hide data" />
                            </Access>
                        </nav>

                        <Show when=any_admin fallback=|| ().into_view()>
                            <Separator />
                            <div class="space-y-0.5">
                                <div class="px-3 pb-1 text-[11px] font-medium uppercase tracking-wide text-muted-foreground">
                                    "Administration"
                                </div>
                                <Access api_path=guards::USERS module="USERS" hide_children=true>
                                    <NavLink href="/admin/users" label="Users" />
                                </Access>
                                <Access api_path=guards::ROLES module="ROLES" hide_children=true>
                                    <NavLink href="/admin/roles" label="Roles" />
                                </Access>
                                <Access api_path=guards::PERMISSIONS module="PERMISSIONS" hide_children=true>
                                    <NavLink href="/admin/permissions" label="Permissions" />
                                </Access>
                                <Access api_path=guards::SETTINGS module="SETTINGS" hide_children=true>
                                    <NavLink href="/admin/settings" label="Settings" />
                                </Access>
                            </div>
                        </Show>

                        <Separator />

                        <div class="flex items-center gap-2 px-1">
                            <span class="flex size-8 shrink-0 items-center justify-center rounded-full bg-muted text-xs font-medium">
                                {user_initials}
                            </span>
                            <div class="min-w-0">
                                <div class="truncate text-sm font-medium">{user_name}</div>
                                <div class="truncate text-xs text-muted-foreground">{user_role}</div>
                            </div>
                        </div>
                        <div class="flex flex-wrap gap-1">
                            <a
                                href="/preferences"
                                class="inline-flex h-7 items-center rounded-md px-2 text-xs font-medium hover:bg-accent hover:text-accent-foreground"
                            >
                                "Preferences"
                            </a>
                            <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=toggle_theme>
                                {move || match app_state.theme.get() {
                                    Theme::Light => "Dark mode",
                                    Theme::Dark => "Light mode",
                                }}
                            </Button>
                            <Button variant=ButtonVariant::Ghost size=ButtonSize::Xs on:click=on_logout>
                                "Log out"
                            </Button>
                        </div>
                    </div>
                </aside>

                <main class="min-w-0 flex-1">{move || children.with_value(|c| c())}</main>
            </div>
        </div>
    }
}

/// Search input with a dropdown of recent queries.
#[component]
fn SearchBox() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let navigate = StoredValue::new(use_navigate());
    let query: RwSignal<String> = RwSignal::new(String::new());
    let focused = RwSignal::new(false);
    let search_ref: NodeRef<html::Input> = NodeRef::new();

    let run_search = move |q: String| {
        let q = q.trim().to_string();
        if q.is_empty() {
            return;
        }
        app_state.search_history.set(write_search_query(&q));
        query.set(q.clone());
        focused.set(false);
        if let Some(input) = search_ref.get_untracked() {
            let _ = input.blur();
        }
        navigate.with_value(|nav| {
            nav(&format!("/files/search?q={}", urlencoding::encode(&q)), Default::default());
        });
    };

    let show_history = move || focused.get() && !app_state.search_history.with(Vec::is_empty);

    view! {
        <div class="relative">
            <Input
                node_ref=search_ref
                r#type="search"
                placeholder="Search files…"
                bind_value=query
                class="h-8 text-sm"
                on:focus=move |_| focused.set(true)
                // Leave time for a click on a history entry to land.
                on:blur=move |_| set_timeout(move || focused.set(false), Duration::from_millis(150))
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if ev.key() == "Enter" {
                        run_search(query.get_untracked());
                    }
                }
            />
            <Show when=show_history fallback=|| ().into_view()>
                <div class="absolute z-40 mt-1 w-full rounded-md border border-border bg-background p-1 shadow-md">
                    <div class="flex items-center justify-between px-2 py-1 text-[11px] text-muted-foreground">
                        <span>"Recent searches"</span>
                        <button
                            type="button"
                            class="hover:text-foreground"
                            on:mousedown=move |ev: web_sys::MouseEvent| {
                                ev.prevent_default();
                                clear_search_history();
                                app_state.search_history.set(vec![]);
                            }
                        >
                            "Clear"
                        </button>
                    </div>
                    <For each=move || app_state.search_history.get() key=|q| q.clone() let:entry>
                        <button
                            type="button"
                            class="block w-full truncate rounded-sm px-2 py-1 text-left text-sm hover:bg-muted/40"
                            on:mousedown={
                                let entry = entry.clone();
                                move |ev: web_sys::MouseEvent| {
                                    ev.prevent_default();
                                    run_search(entry.clone());
                                }
                            }
                        >
                            {entry.clone()}
                        </button>
                    </For>
                </div>
            </Show>
        </div>
    }
}
