use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::{
    google_authorize_url, id_token_from_fragment, nonce_matches, ApiError, EnvConfig,
    SignupRequest, GOOGLE_CALLBACK_PATH,
};
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    ErrorAlert, FormField, LoadingLine, Separator, Spinner,
};
use crate::models::AuthResponse;
use crate::state::{redirect_to, AppContext, AppState};
use crate::storage::{save_oauth_nonce, take_oauth_nonce};
use crate::util::random_token;
use crate::validation::FormErrors;

const AFTER_LOGIN: &str = "/files";

/// Splits a failed auth call into per-field messages or one form-level message.
fn auth_error(e: &ApiError, errors: RwSignal<FormErrors>, error: RwSignal<Option<String>>) {
    let fields = FormErrors::from_api(e);
    if !fields.is_empty() {
        errors.set(fields);
    } else if e.is_unauthorized() {
        error.set(Some("Invalid email or password".to_string()));
    } else {
        error.set(Some(e.user_message()));
    }
}

/// Full navigation so the authed shell starts from a clean state.
fn finish_sign_in(app_state: AppState, response: AuthResponse) {
    app_state.sign_in(response);
    redirect_to(AFTER_LOGIN);
}

#[component]
fn AuthShell(#[prop(into)] title: String, #[prop(into)] description: String, children: Children) -> impl IntoView {
    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6 flex items-center justify-center">
                    <a href="/" class="text-sm font-medium text-foreground">"DocVault"</a>
                </div>
                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">{title}</CardTitle>
                        <CardDescription class="text-xs">{description}</CardDescription>
                    </CardHeader>
                    <CardContent>{children()}</CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
fn GoogleButton() -> impl IntoView {
    let client_id = EnvConfig::new().google_client_id;
    let enabled = client_id.is_some();

    let on_click = move |_| {
        let Some(client_id) = client_id.as_deref() else {
            return;
        };
        let Some(window) = web_sys::window() else {
            return;
        };
        let origin = window.location().origin().unwrap_or_default();
        let nonce = random_token();
        save_oauth_nonce(&nonce);
        let url = google_authorize_url(client_id, &format!("{origin}{GOOGLE_CALLBACK_PATH}"), &nonce);
        let _ = window.location().set_href(&url);
    };

    view! {
        <Show when=move || enabled fallback=|| ().into_view()>
            <Separator class="my-1" label="or" />
            <Button
                attr:r#type="button"
                variant=ButtonVariant::Outline
                size=ButtonSize::Sm
                class="w-full"
                on:click=on_click.clone()
            >
                "Continue with Google"
            </Button>
        </Show>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let email_val = email.get_untracked().trim().to_string();
        let password_val = password.get_untracked();
        let mut form = FormErrors::default();
        form.email("email", &email_val);
        form.require("password", &password_val, "Password");
        if let Err(form) = form.into_result() {
            errors.set(form);
            return;
        }

        errors.set(FormErrors::default());
        error.set(None);
        loading.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.login(&email_val, &password_val).await {
                Ok(response) => finish_sign_in(app_state, response),
                Err(e) => auth_error(&e, errors, error),
            }
            loading.set(false);
        });
    };

    view! {
        <AuthShell title="Log in" description="Use your email and password to continue.">
            <form class="flex flex-col gap-3" on:submit=on_submit>
                <FormField
                    label="Email"
                    id="email"
                    r#type="email"
                    placeholder="you@example.com"
                    autocomplete="email"
                    bind_value=email
                    error=Signal::derive(move || errors.with(|e| e.get("email")))
                />
                <FormField
                    label="Password"
                    id="password"
                    r#type="password"
                    placeholder="••••••••"
                    autocomplete="current-password"
                    bind_value=password
                    error=Signal::derive(move || errors.with(|e| e.get("password")))
                />

                <ErrorAlert message=error />

                <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || if loading.get() { "Signing in..." } else { "Continue" }}
                    </span>
                </Button>

                <GoogleButton />

                <div class="pt-1 text-xs text-muted-foreground">
                    "No account? "
                    <a class="text-primary underline underline-offset-4" href="/signup">"Sign up"</a>
                </div>
            </form>
        </AuthShell>
    }
}

/// Client-side checks run before `POST /api/signup`.
pub(crate) fn validate_signup(req: &SignupRequest, confirm: &str) -> FormErrors {
    let mut form = FormErrors::default();
    form.email("email", &req.email);
    form.require("firstName", &req.first_name, "First name");
    form.require("lastName", &req.last_name, "Last name");
    form.password("password", &req.password);
    if req.password != confirm {
        form.add("confirmPassword", "Passwords do not match");
    }
    form
}

#[component]
pub fn SignupPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;

    let email: RwSignal<String> = RwSignal::new(String::new());
    let first_name: RwSignal<String> = RwSignal::new(String::new());
    let last_name: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let confirm: RwSignal<String> = RwSignal::new(String::new());
    let errors: RwSignal<FormErrors> = RwSignal::new(FormErrors::default());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let field_error = move |field: &'static str| Signal::derive(move || errors.with(|e| e.get(field)));

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if loading.get_untracked() {
            return;
        }

        let req = SignupRequest {
            email: email.get_untracked().trim().to_string(),
            first_name: first_name.get_untracked().trim().to_string(),
            last_name: last_name.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        if let Err(form) = validate_signup(&req, &confirm.get_untracked()).into_result() {
            errors.set(form);
            return;
        }

        errors.set(FormErrors::default());
        error.set(None);
        loading.set(true);

        let api_client = app_state.api_client.get_untracked();
        spawn_local(async move {
            match api_client.signup(&req).await {
                Ok(response) => finish_sign_in(app_state, response),
                Err(e) => auth_error(&e, errors, error),
            }
            loading.set(false);
        });
    };

    view! {
        <AuthShell title="Create account" description="Sign up to start storing documents.">
            <form class="flex flex-col gap-3" on:submit=on_submit>
                <div class="grid grid-cols-2 gap-2">
                    <FormField label="First name" id="first-name" bind_value=first_name error=field_error("firstName") />
                    <FormField label="Last name" id="last-name" bind_value=last_name error=field_error("lastName") />
                </div>
                <FormField
                    label="Email"
                    id="email"
                    r#type="email"
                    placeholder="you@example.com"
                    autocomplete="email"
                    bind_value=email
                    error=field_error("email")
                />
                <FormField
                    label="Password"
                    id="password"
                    r#type="password"
                    autocomplete="new-password"
                    bind_value=password
                    error=field_error("password")
                />
                <FormField
                    label="Confirm password"
                    id="confirm-password"
                    r#type="password"
                    autocomplete="new-password"
                    bind_value=confirm
                    error=field_error("confirmPassword")
                />

                <ErrorAlert message=error />

                <Button class="w-full" size=ButtonSize::Sm attr:disabled=move || loading.get()>
                    <span class="inline-flex items-center gap-2">
                        <Show when=move || loading.get() fallback=|| ().into_view()>
                            <Spinner />
                        </Show>
                        {move || if loading.get() { "Creating..." } else { "Continue" }}
                    </span>
                </Button>

                <GoogleButton />

                <div class="pt-1 text-xs text-muted-foreground">
                    "Already have an account? "
                    <a class="text-primary underline underline-offset-4" href="/login">"Log in"</a>
                </div>
            </form>
        </AuthShell>
    }
}

/// Landing page of the Google implicit flow; the `id_token` arrives in the fragment.
#[component]
pub fn GoogleCallbackPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>().0;
    let error: RwSignal<Option<String>> = RwSignal::new(None);

    let fragment = web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default();

    let expected_nonce = take_oauth_nonce();

    match id_token_from_fragment(&fragment) {
        Some(token) if !nonce_matches(&token, expected_nonce.as_deref()) => {
            log::warn!("google sign-in dropped: nonce mismatch");
            error.set(Some("This sign-in was not started from this browser. Please try again.".to_string()));
        }
        Some(token) => {
            let api_client = app_state.api_client.get_untracked();
            spawn_local(async move {
                match api_client.login_with_google(&token).await {
                    Ok(response) => finish_sign_in(app_state, response),
                    Err(e) => {
                        log::warn!("google sign-in rejected: {e}");
                        error.set(Some(e.user_message()));
                    }
                }
            });
        }
        None => error.set(Some("Google did not return a sign-in token.".to_string())),
    }

    view! {
        <AuthShell title="Signing in with Google" description="Hold on while we finish signing you in.">
            <Show
                when=move || error.get().is_some()
                fallback=|| view! { <LoadingLine label="Verifying…" /> }
            >
                <div class="flex flex-col gap-3">
                    <ErrorAlert message=error />
                    <a class="text-xs text-primary underline underline-offset-4" href="/login">"Back to log in"</a>
                </div>
            </Show>
        </AuthShell>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn signup_accepts_complete_form() {
        assert!(validate_signup(&req("ada@example.com", "secret1"), "secret1").is_empty());
    }

    #[test]
    fn signup_flags_each_problem() {
        let errors = validate_signup(&req("ada@example", "abc"), "abd");
        assert!(errors.get("email").is_some());
        assert!(errors.get("password").is_some());
        assert_eq!(errors.get("confirmPassword").as_deref(), Some("Passwords do not match"));
    }
}
