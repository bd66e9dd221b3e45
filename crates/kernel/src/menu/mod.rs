//! Menu system for page navigation.
//!
//! Navigation is composed per render from:
//! - the page tree, through the built-in page menu provider
//! - registered menu providers, spliced in through navigation extenders
//! - modifiers that mark, filter, and level the resulting tree

mod modifiers;
mod node;
mod provider;
mod registry;
mod request;
mod tags;

pub use modifiers::{
    AuthVisibility, Level, Marker, Modifier, ModifierContext, NavExtender, SoftRootCutter,
    default_modifiers,
};
pub use node::{
    MenuItem, NavTree, NavigationNode, NodeArena, NodeAttr, NodeIndex, NodeRef, NodeSource,
};
pub use provider::{MenuEntry, MenuProvider, PAGE_MENU, PageMenu, StaticMenu};
pub use registry::MenuPool;
pub use request::{MenuRequest, Visitor};
pub use tags::{
    ShowMenu, cut_levels, show_breadcrumb, show_menu, show_menu_below_id, show_sub_menu,
};
