//! Raw key events as delivered by the host input framework.
//!
//! Keyvals are X11 keysyms, keycodes are evdev scan codes and modifiers use
//! the IBus modifier bit layout, so a host adapter can pass its event fields
//! through untouched.

use phf::phf_map;

/// Modifier bits carried in `PhysicalKeyEvent::modifiers`.
pub mod modifier {
    pub const SHIFT: u32 = 1 << 0;
    pub const LOCK: u32 = 1 << 1;
    pub const CONTROL: u32 = 1 << 2;
    pub const MOD1: u32 = 1 << 3;
    pub const SUPER: u32 = 1 << 26;
    pub const HYPER: u32 = 1 << 27;
    pub const META: u32 = 1 << 28;
    pub const RELEASE: u32 = 1 << 30;

    /// Bits that do not make a key event a "shortcut".
    pub const PLAIN: u32 = RELEASE | SHIFT | LOCK;
}

/// Keysyms the engine reacts to.
pub mod keyval {
    pub const SPACE: u32 = 0x020;
    pub const LOWER_D: u32 = 0x064;
    pub const LOWER_E: u32 = 0x065;
    pub const LOWER_T: u32 = 0x074;
    pub const BACKSPACE: u32 = 0xff08;
    pub const TAB: u32 = 0xff09;
    pub const RETURN: u32 = 0xff0d;
    pub const ESCAPE: u32 = 0xff1b;
    pub const SHIFT_L: u32 = 0xffe1;
    pub const SHIFT_R: u32 = 0xffe2;
}

/// A single hardware key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalKeyEvent {
    pub keyval: u32,
    pub keycode: u32,
    pub modifiers: u32,
    pub is_press: bool,
}

impl PhysicalKeyEvent {
    /// Build an event from host fields; press/release is read from the
    /// release bit of `modifiers`.
    pub fn new(keyval: u32, keycode: u32, modifiers: u32) -> Self {
        Self {
            keyval,
            keycode,
            modifiers,
            is_press: modifiers & modifier::RELEASE == 0,
        }
    }

    pub fn press(keyval: u32, keycode: u32) -> Self {
        Self::new(keyval, keycode, 0)
    }

    pub fn release(keyval: u32, keycode: u32) -> Self {
        Self::new(keyval, keycode, modifier::RELEASE)
    }

    /// Same event with extra modifier bits set.
    pub fn with_modifiers(mut self, modifiers: u32) -> Self {
        self.modifiers |= modifiers;
        self
    }

    /// True when a modifier other than Shift/Lock is held.
    pub fn has_shortcut_modifiers(&self) -> bool {
        self.modifiers & !modifier::PLAIN != 0
    }
}

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was handled by the engine
    Handled,
    /// Key was not handled (pass through to application)
    NotHandled,
}

impl KeyResult {
    pub fn is_handled(self) -> bool {
        self == KeyResult::Handled
    }
}

impl From<bool> for KeyResult {
    fn from(handled: bool) -> Self {
        if handled {
            KeyResult::Handled
        } else {
            KeyResult::NotHandled
        }
    }
}

/// Named keys a translator may ask to inject: name → (keyval, keycode).
static KEY_COMBINATIONS: phf::Map<&'static str, (u32, u32)> = phf_map! {
    "escape" => (0xff1b, 1),
    "backspace" => (0xff08, 14),
    "tab" => (0xff09, 15),
    "return" => (0xff0d, 28),
    "space" => (0x020, 57),
    "home" => (0xff50, 102),
    "up" => (0xff52, 103),
    "page_up" => (0xff55, 104),
    "left" => (0xff51, 105),
    "right" => (0xff53, 106),
    "end" => (0xff57, 107),
    "down" => (0xff54, 108),
    "page_down" => (0xff56, 109),
    "delete" => (0xffff, 111),
};

/// Resolve a key combination name (case-insensitive) to keyval and keycode.
pub fn resolve_key_combination(name: &str) -> Option<(u32, u32)> {
    KEY_COMBINATIONS
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_bit_sets_direction() {
        assert!(PhysicalKeyEvent::new(0x71, 16, 0).is_press);
        assert!(!PhysicalKeyEvent::new(0x71, 16, modifier::RELEASE).is_press);
        assert!(!PhysicalKeyEvent::release(0x71, 16).is_press);
    }

    #[test]
    fn test_shortcut_modifiers() {
        let plain = PhysicalKeyEvent::press(0x71, 16).with_modifiers(modifier::SHIFT | modifier::LOCK);
        assert!(!plain.has_shortcut_modifiers());
        assert!(!PhysicalKeyEvent::release(0x71, 16).has_shortcut_modifiers());

        let ctrl = PhysicalKeyEvent::press(0x71, 16).with_modifiers(modifier::CONTROL);
        assert!(ctrl.has_shortcut_modifiers());
    }

    #[test]
    fn test_key_combination_lookup() {
        assert_eq!(resolve_key_combination("Return"), Some((0xff0d, 28)));
        assert_eq!(resolve_key_combination("page_down"), Some((0xff56, 109)));
        assert_eq!(resolve_key_combination("control_l(z)"), None);
    }
}
