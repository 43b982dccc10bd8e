//! Configuration-backed [`UserState`].

use super::UserState;
use parking_lot::RwLock;

/// User state that the host updates explicitly.
///
/// Starts from configured values; the host may update either field as the
/// user logs in or renames.
#[derive(Debug, Default)]
pub struct StaticUserState {
    user_id: RwLock<Option<String>>,
    display_name: RwLock<Option<String>>,
}

impl StaticUserState {
    pub fn new(user_id: Option<String>, display_name: Option<String>) -> Self {
        Self {
            user_id: RwLock::new(user_id.filter(|s| !s.is_empty())),
            display_name: RwLock::new(display_name.filter(|s| !s.is_empty())),
        }
    }

    pub fn set_user_id(&self, user_id: Option<String>) {
        *self.user_id.write() = user_id;
    }

    pub fn set_display_name(&self, display_name: Option<String>) {
        *self.display_name.write() = display_name;
    }
}

impl UserState for StaticUserState {
    fn user_id(&self) -> Option<String> {
        self.user_id.read().clone()
    }

    fn display_name(&self) -> Option<String> {
        self.display_name.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_values_are_treated_as_absent() {
        let state = StaticUserState::new(Some(String::new()), None);
        assert_eq!(state.user_id(), None);
        assert_eq!(state.display_name(), None);
    }

    #[test]
    fn updates_are_visible() {
        let state = StaticUserState::new(None, None);
        state.set_display_name(Some("Alice".into()));
        assert_eq!(state.display_name().as_deref(), Some("Alice"));
    }
}
