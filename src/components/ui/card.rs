use leptos::prelude::*;
use leptos_ui::clx;

mod components {
    use super::*;
    clx! {Card, div, "bg-card text-card-foreground flex flex-col gap-3 rounded-lg border border-border py-4 shadow-xs"}
    clx! {CardHeader, div, "flex flex-col items-start gap-1 px-4"}
    clx! {CardTitle, h2, "leading-none font-semibold"}
    clx! {CardDescription, p, "text-muted-foreground text-sm"}
    clx! {CardContent, div, "px-4"}
}

pub use components::*;
