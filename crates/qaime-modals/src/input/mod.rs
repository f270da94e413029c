//! Keyboard accelerators for modal windows.
//!
//! Raw key events resolve to a [`ModalAction`] through a [`KeyMap`]. Scoping
//! to the active instance happens in the page; this module only knows about
//! modifiers and whether focus sits in a text input.

mod action;
mod binding;
mod defaults;
mod map;

pub use action::ModalAction;
pub use binding::{Binding, Key, KeyContext, KeyEvent, Modifiers};
pub use defaults::default_bindings;
pub use map::KeyMap;
