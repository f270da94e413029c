//! Binding lookup.

use tracing::trace;

use super::action::ModalAction;
use super::binding::{Binding, KeyEvent};
use super::defaults::default_bindings;

/// Ordered binding table. First match wins.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<Binding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::new(default_bindings())
    }
}

impl KeyMap {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Put a binding ahead of the existing ones.
    pub fn override_with(&mut self, binding: Binding) {
        self.bindings.insert(0, binding);
    }

    pub fn resolve(&self, event: &KeyEvent) -> Option<ModalAction> {
        let action = self
            .bindings
            .iter()
            .find(|b| b.matches(event))
            .map(|b| b.action);
        trace!("key {:?} -> {:?}", event, action);
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Key, KeyContext, Modifiers};

    #[test]
    fn default_accelerators() {
        let map = KeyMap::default();
        assert_eq!(map.resolve(&KeyEvent::new(Key::Escape)), Some(ModalAction::Close));
        assert_eq!(map.resolve(&KeyEvent::ctrl(Key::Char('S'))), Some(ModalAction::Save));
        assert_eq!(map.resolve(&KeyEvent::ctrl(Key::Char('p'))), Some(ModalAction::Print));
        assert_eq!(map.resolve(&KeyEvent::new(Key::Insert)), Some(ModalAction::InsertLine));
        assert_eq!(map.resolve(&KeyEvent::new(Key::Delete)), Some(ModalAction::DeleteSelected));
        assert_eq!(map.resolve(&KeyEvent::new(Key::F(9))), Some(ModalAction::DuplicateSelected));
        assert_eq!(map.resolve(&KeyEvent::new(Key::Char('s'))), None);
    }

    #[test]
    fn meta_works_like_ctrl() {
        let map = KeyMap::default();
        let event = KeyEvent {
            modifiers: Modifiers::META,
            ..KeyEvent::new(Key::Char('s'))
        };
        assert_eq!(map.resolve(&event), Some(ModalAction::Save));
    }

    #[test]
    fn line_accelerators_suppressed_in_text() {
        let map = KeyMap::default();
        assert_eq!(map.resolve(&KeyEvent::new(Key::Delete).in_text()), None);
        assert_eq!(map.resolve(&KeyEvent::new(Key::Insert).in_text()), None);
        assert_eq!(map.resolve(&KeyEvent::new(Key::Escape).in_text()), Some(ModalAction::Close));
        assert_eq!(
            map.resolve(&KeyEvent::ctrl(Key::Char('s')).in_text()),
            Some(ModalAction::Save)
        );
    }

    #[test]
    fn override_takes_precedence() {
        let mut map = KeyMap::default();
        map.override_with(Binding::key(
            Key::Escape,
            KeyContext::OutsideText,
            ModalAction::Save,
            "custom",
        ));
        assert_eq!(map.resolve(&KeyEvent::new(Key::Escape)), Some(ModalAction::Save));
        assert_eq!(map.resolve(&KeyEvent::new(Key::Escape).in_text()), Some(ModalAction::Close));
    }
}
