use crate::component::ButtonStyle;
use crate::error::ViewError;
use crate::render::Embed;
use crate::view::ViewType;

pub const PAGER_PAGES: [&str; 4] = [
    "Page 1 Content",
    "Page 2 Content",
    "Page 3 Content",
    "Page 4 Content",
];

/// Zero-based page index. Hosts may set any value; pages past the end
/// render an out-of-range notice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagerState {
    pub page: usize,
}

/// Four pages picked from a select menu, plus a quit button.
pub fn pager() -> Result<ViewType<PagerState>, ViewError> {
    let options: Vec<(String, String)> = (1..=PAGER_PAGES.len())
        .map(|n| (format!("Page {}", n), n.to_string()))
        .collect();

    let mut builder = ViewType::builder("pager");
    builder
        .define_select_menu(
            "page",
            options,
            Some("Page"),
            None,
            None,
            |state: &mut PagerState, interaction| {
                let Some(page) = interaction
                    .value()
                    .and_then(|value| value.parse::<usize>().ok())
                    .filter(|page| (1..=PAGER_PAGES.len()).contains(page))
                else {
                    tracing::debug!(values = ?interaction.values(), "Ignoring invalid page selection");
                    return false;
                };
                state.page = page - 1;
                true
            },
        )?
        .define_button("quit", "Quit", ButtonStyle::Danger, None, |_: &mut PagerState, interaction| {
            interaction.stop_default();
            false
        })?;

    builder
        .define_view_if(
            |state, _| state.page >= PAGER_PAGES.len(),
            |state, result| {
                result.set_content(format!("Out of range: Page {}", state.page + 1));
                result.set_components(["page", "quit"]);
            },
        )
        .define_view(|state, result| {
            let Some(text) = PAGER_PAGES.get(state.page) else {
                return;
            };
            result.set_content(*text);
            result.push_embed(
                Embed::new("Pager").footer(format!("{} / {}", state.page + 1, PAGER_PAGES.len())),
            );
            result.set_components(["page", "quit"]);
        });

    Ok(builder.build())
}
