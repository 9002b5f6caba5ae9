use leptos::prelude::*;
use tw_merge::*;

/// Horizontal rule; with `label` the text sits centred between two lines.
#[component]
pub fn Separator(
    #[prop(optional)] orientation: SeparatorOrientation,
    #[prop(into, optional)] class: String,
    #[prop(into, optional)] label: Option<String>,
) -> impl IntoView {
    let line = SeparatorClass { orientation };

    match label {
        None => view! { <div class=line.with_class(class) role="separator" /> }.into_any(),
        Some(text) => {
            let wrapper = tw_merge!("flex items-center gap-3", class);
            let line = line.with_class("flex-1");
            view! {
                <div class=wrapper role="separator">
                    <div class=line.clone() />
                    <span class="text-[11px] uppercase tracking-wide text-muted-foreground">{text}</span>
                    <div class=line />
                </div>
            }
            .into_any()
        }
    }
}

#[derive(TwClass, Default)]
#[tw(class = "shrink-0 bg-border")]
pub struct SeparatorClass {
    orientation: SeparatorOrientation,
}

#[derive(TwVariant)]
pub enum SeparatorOrientation {
    #[tw(default, class = "w-full h-[1px]")]
    Horizontal,
    #[tw(class = "h-full w-[1px]")]
    Vertical,
}
