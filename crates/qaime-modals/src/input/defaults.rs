//! The out-of-box modal binding table.

use super::action::ModalAction;
use super::binding::{Binding, Key, KeyContext, Modifiers};

pub fn default_bindings() -> Vec<Binding> {
    let mut b = Vec::with_capacity(8);

    b.push(Binding::key(Key::Escape, KeyContext::Anywhere, ModalAction::Close, "Close"));
    b.push(Binding::key_mod(Key::Char('s'), Modifiers::CTRL, KeyContext::Anywhere, ModalAction::Save, "Save"));
    b.push(Binding::key_mod(Key::Char('p'), Modifiers::CTRL, KeyContext::Anywhere, ModalAction::Print, "Print"));

    b.push(Binding::key(Key::Insert, KeyContext::OutsideText, ModalAction::InsertLine, "Add line"));
    b.push(Binding::key(Key::Delete, KeyContext::OutsideText, ModalAction::DeleteSelected, "Delete selected lines"));
    b.push(Binding::key(Key::F(9), KeyContext::OutsideText, ModalAction::DuplicateSelected, "Copy selected lines"));

    b
}
