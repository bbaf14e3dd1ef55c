//! Ready-made views used by the `chatview` binary and the integration
//! tests: a two-page menu driven by buttons and a four-page pager driven by
//! a select menu.

mod menu;
mod pager;

pub use menu::{menu, MenuState, MENU_TEXTS};
pub use pager::{pager, PagerState, PAGER_PAGES};
