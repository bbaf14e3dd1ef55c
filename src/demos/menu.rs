use crate::component::ButtonStyle;
use crate::error::ViewError;
use crate::view::ViewType;

pub const MENU_TEXTS: [&str; 2] = ["A", "B"];

/// Current page of the menu. May leave the valid range; the out-of-range
/// view takes over until the user steps back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuState {
    pub page: i64,
}

impl MenuState {
    fn in_range(&self) -> bool {
        (0..MENU_TEXTS.len() as i64).contains(&self.page)
    }
}

/// `<` / `>` pager over [`MENU_TEXTS`] with a quit button.
pub fn menu() -> Result<ViewType<MenuState>, ViewError> {
    let mut builder = ViewType::builder("menu");
    builder
        .define_button("left", "<", ButtonStyle::Primary, None, |state: &mut MenuState, _| {
            state.page -= 1;
            true
        })?
        .define_button("right", ">", ButtonStyle::Primary, None, |state: &mut MenuState, _| {
            state.page += 1;
            true
        })?
        .define_button("quit", "Quit", ButtonStyle::Danger, None, |_: &mut MenuState, interaction| {
            interaction.stop_default();
            false
        })?;

    builder
        .define_view_if(
            |state, _| !state.in_range(),
            |state, result| {
                result.set_content(format!("Out of range: Page {}", state.page + 1));
                result.set_components(["left", "right", "quit"]);
            },
        )
        .define_view(|state, result| {
            let index = state.page.rem_euclid(MENU_TEXTS.len() as i64) as usize;
            result.set_content(MENU_TEXTS[index]);
            result.set_components(["left", "right", "quit"]);
        });

    Ok(builder.build())
}
