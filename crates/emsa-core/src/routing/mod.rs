//! Client-side routing: the route table, the route guard and per-role menus.

pub mod guard;
pub mod nav;
pub mod route;

pub use guard::{guard, resolve, GuardDecision};
pub use nav::{label_for, menu_for, NavItem};
pub use route::{Route, DEFAULT_ROUTE};
