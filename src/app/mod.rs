use crate::components::ui::{Toaster, Toasts};
use crate::pages::{
    DocumentPage, FileManagerPage, GoogleCallbackPage, HideDataPage, LoginPage, PermissionsPage,
    PreferencesPage, RolesPage, RootAuthed, SettingsPage, SignupPage, UsersPage,
};
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos_router::components::{Redirect, Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    provide_context(AppContext(AppState::new()));
    provide_context(Toasts::new());

    // Router hooks need a <Router> context; every secure page sits under <RootAuthed>.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("login") view=LoginPage />
                <Route path=path!("signup") view=SignupPage />
                <Route path=path!("auth/google/callback") view=GoogleCallbackPage />

                <Route path=path!("files") view=move || view! {
                    <RootAuthed>
                        <FileManagerPage />
                    </RootAuthed>
                } />
                <Route path=path!("files/shared") view=move || view! {
                    <RootAuthed>
                        <FileManagerPage />
                    </RootAuthed>
                } />
                <Route path=path!("files/trash") view=move || view! {
                    <RootAuthed>
                        <FileManagerPage />
                    </RootAuthed>
                } />
                <Route path=path!("files/search") view=move || view! {
                    <RootAuthed>
                        <FileManagerPage />
                    </RootAuthed>
                } />
                <Route path=path!("files/folder/:folder_id") view=move || view! {
                    <RootAuthed>
                        <FileManagerPage />
                    </RootAuthed>
                } />
                <Route path=path!("documents/:document_id") view=move || view! {
                    <RootAuthed>
                        <DocumentPage />
                    </RootAuthed>
                } />
                <Route path=path!("tools/hide-data") view=move || view! {
                    <RootAuthed>
                        <HideDataPage />
                    </RootAuthed>
                } />
                <Route path=path!("admin/users") view=move || view! {
                    <RootAuthed>
                        <UsersPage />
                    </RootAuthed>
                } />
                <Route path=path!("admin/roles") view=move || view! {
                    <RootAuthed>
                        <RolesPage />
                    </RootAuthed>
                } />
                <Route path=path!("admin/permissions") view=move || view! {
                    <RootAuthed>
                        <PermissionsPage />
                    </RootAuthed>
                } />
                <Route path=path!("admin/settings") view=move || view! {
                    <RootAuthed>
                        <SettingsPage />
                    </RootAuthed>
                } />
                <Route path=path!("preferences") view=move || view! {
                    <RootAuthed>
                        <PreferencesPage />
                    </RootAuthed>
                } />
                <Route path=path!("") view=|| view! { <Redirect path="/files" /> } />
            </Routes>
        </Router>
        <Toaster />
    }
}
