//! Physical keycode → steno key mapping.
//!
//! Two tables are kept: the primary table and an alternate one for keyboards
//! whose rows are split differently. Both come either from the compiled-in
//! defaults or from a configured [`KeyboardLayout`], which names physical keys
//! (`"q"`, `";"`, `"f1"`) and is resolved through [`keycode_for_name`].

use crate::chord::StenoKey;
use crate::error::{Result, StenoError};
use ahash::AHashMap;
use phf::phf_map;
use std::collections::BTreeMap;
use std::ops::Range;

/// Configured layout: steno key label → names of the physical keys that
/// produce it.
pub type KeyboardLayout = BTreeMap<String, Vec<String>>;

/// Named physical key → evdev scan code.
static PSEUDOKEY_TO_KEYCODE: phf::Map<&'static str, u32> = phf_map! {
    // Function bar.
    "esc" => 1,
    "f1" => 59,
    "f2" => 60,
    "f3" => 61,
    "f4" => 62,
    "f5" => 63,
    "f6" => 64,
    "f7" => 65,
    "f8" => 66,
    "f9" => 67,
    "f10" => 68,
    "f11" => 87,
    "f12" => 88,
    // Number row.
    "`" => 41,
    "1" => 2,
    "2" => 3,
    "3" => 4,
    "4" => 5,
    "5" => 6,
    "6" => 7,
    "7" => 8,
    "8" => 9,
    "9" => 10,
    "0" => 11,
    "-" => 12,
    "=" => 13,
    "\\" => 43,
    // Upper row.
    "q" => 16,
    "w" => 17,
    "e" => 18,
    "r" => 19,
    "t" => 20,
    "y" => 21,
    "u" => 22,
    "i" => 23,
    "o" => 24,
    "p" => 25,
    "[" => 26,
    "]" => 27,
    // Home row.
    "a" => 30,
    "s" => 31,
    "d" => 32,
    "f" => 33,
    "g" => 34,
    "h" => 35,
    "j" => 36,
    "k" => 37,
    "l" => 38,
    ";" => 39,
    "'" => 40,
    // Bottom row.
    "z" => 44,
    "x" => 45,
    "c" => 46,
    "v" => 47,
    "b" => 48,
    "n" => 49,
    "m" => 50,
    "," => 51,
    "." => 52,
    "/" => 53,
    // Space bar.
    " " => 57,
    "space" => 57,
};

/// Scan code ranges of the three letter rows used for steno input.
const FENCE_ROWS: [Range<u32>; 3] = [16..28, 30..41, 44..54];

/// Default table: standard QWERTY steno placement, number bar on space.
const DEFAULT_TABLE: &[(u32, &str)] = &[
    (16, "S-"),
    (30, "S-"),
    (17, "T-"),
    (31, "K-"),
    (18, "P-"),
    (32, "W-"),
    (19, "H-"),
    (33, "R-"),
    (20, "*"),
    (34, "*"),
    (21, "*"),
    (35, "*"),
    (22, "-F"),
    (36, "-R"),
    (23, "-P"),
    (37, "-B"),
    (24, "-L"),
    (38, "-G"),
    (25, "-T"),
    (39, "-S"),
    (26, "-D"),
    (40, "-Z"),
    (46, "A-"),
    (47, "O-"),
    (49, "-E"),
    (50, "-U"),
    (57, "#"),
];

/// Alternate table for split keyboards: the right bank starts one column
/// further left and the asterisk only sits on the left half.
const ALT_TABLE: &[(u32, &str)] = &[
    (16, "S-"),
    (30, "S-"),
    (17, "T-"),
    (31, "K-"),
    (18, "P-"),
    (32, "W-"),
    (19, "H-"),
    (33, "R-"),
    (20, "*"),
    (34, "*"),
    (21, "-F"),
    (35, "-R"),
    (22, "-P"),
    (36, "-B"),
    (23, "-L"),
    (37, "-G"),
    (24, "-T"),
    (38, "-S"),
    (25, "-D"),
    (39, "-Z"),
    (46, "A-"),
    (47, "O-"),
    (49, "-E"),
    (50, "-U"),
    (57, "#"),
];

/// Look up the scan code of a named physical key (case-insensitive).
pub fn keycode_for_name(name: &str) -> Option<u32> {
    if name == " " {
        return PSEUDOKEY_TO_KEYCODE.get(" ").copied();
    }
    PSEUDOKEY_TO_KEYCODE
        .get(name.trim().to_lowercase().as_str())
        .copied()
}

/// True when `keycode` lies in one of the steno letter rows.
pub fn in_fence(keycode: u32) -> bool {
    FENCE_ROWS.iter().any(|row| row.contains(&keycode))
}

type Table = AHashMap<u32, StenoKey>;

fn table_from_pairs(pairs: &[(u32, &str)]) -> Table {
    pairs
        .iter()
        .map(|&(code, label)| (code, StenoKey::new(label)))
        .collect()
}

fn table_from_layout(layout: &KeyboardLayout, which: &str) -> Result<Table> {
    let mut table = Table::new();
    for (steno_key, key_names) in layout {
        let label = StenoKey::new(steno_key);
        for name in key_names {
            match keycode_for_name(name) {
                Some(code) => {
                    if let Some(previous) = table.insert(code, label.clone()) {
                        tracing::warn!(
                            "{} keymap: key '{}' reassigned from {} to {}",
                            which,
                            name,
                            previous,
                            label
                        );
                    }
                }
                None => tracing::warn!("{} keymap: unknown key name '{}' ignored", which, name),
            }
        }
    }
    if table.is_empty() {
        return Err(StenoError::Config(format!(
            "{} keymap does not map any known key",
            which
        )));
    }
    Ok(table)
}

/// Resolves keycodes to steno keys through the active table.
#[derive(Debug, Clone)]
pub struct KeycodeMapper {
    primary: Table,
    alternate: Table,
    use_alternate: bool,
}

impl Default for KeycodeMapper {
    fn default() -> Self {
        Self {
            primary: table_from_pairs(DEFAULT_TABLE),
            alternate: table_from_pairs(ALT_TABLE),
            use_alternate: false,
        }
    }
}

impl KeycodeMapper {
    /// Build the mapper from optional configured layouts; absent layouts fall
    /// back to the compiled-in tables.
    pub fn from_layouts(
        primary: Option<&KeyboardLayout>,
        alternate: Option<&KeyboardLayout>,
    ) -> Result<Self> {
        let mut mapper = Self::default();
        if let Some(layout) = primary {
            mapper.primary = table_from_layout(layout, "primary")?;
        }
        if let Some(layout) = alternate {
            mapper.alternate = table_from_layout(layout, "alternate")?;
        }
        Ok(mapper)
    }

    pub fn resolve(&self, keycode: u32) -> Option<StenoKey> {
        let table = if self.use_alternate {
            &self.alternate
        } else {
            &self.primary
        };
        table.get(&keycode).cloned()
    }

    pub fn uses_alternate(&self) -> bool {
        self.use_alternate
    }

    /// Switch tables. Callers must not do this while a chord is forming.
    pub fn set_alternate(&mut self, enable: bool) {
        self.use_alternate = enable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let mapper = KeycodeMapper::default();
        assert_eq!(mapper.resolve(16), Some(StenoKey::new("S-")));
        assert_eq!(mapper.resolve(30), Some(StenoKey::new("S-")));
        assert_eq!(mapper.resolve(22), Some(StenoKey::new("-F")));
        assert_eq!(mapper.resolve(57), Some(StenoKey::new("#")));
        // 'z' sits inside the fence but is unmapped.
        assert_eq!(mapper.resolve(44), None);
    }

    #[test]
    fn test_alternate_table_switch() {
        let mut mapper = KeycodeMapper::default();
        assert_eq!(mapper.resolve(21), Some(StenoKey::new("*")));
        mapper.set_alternate(true);
        assert!(mapper.uses_alternate());
        assert_eq!(mapper.resolve(21), Some(StenoKey::new("-F")));
        assert_eq!(mapper.resolve(26), None);
    }

    #[test]
    fn test_configured_layout() {
        let mut layout = KeyboardLayout::new();
        layout.insert("S-".into(), vec!["Q".into(), "a".into(), "nonsense".into()]);
        layout.insert("#".into(), vec!["1".into(), "F1".into()]);

        let mapper = KeycodeMapper::from_layouts(Some(&layout), None).unwrap();
        assert_eq!(mapper.resolve(16), Some(StenoKey::new("S-")));
        assert_eq!(mapper.resolve(30), Some(StenoKey::new("S-")));
        assert_eq!(mapper.resolve(2), Some(StenoKey::new("#")));
        assert_eq!(mapper.resolve(59), Some(StenoKey::new("#")));
        // Default entries are replaced, not merged.
        assert_eq!(mapper.resolve(17), None);
    }

    #[test]
    fn test_empty_layout_is_rejected() {
        let mut layout = KeyboardLayout::new();
        layout.insert("S-".into(), vec!["nonsense".into()]);
        let err = KeycodeMapper::from_layouts(None, Some(&layout)).unwrap_err();
        assert!(matches!(err, StenoError::Config(_)));
    }

    #[test]
    fn test_fence_rows() {
        assert!(in_fence(16));
        assert!(in_fence(27));
        assert!(!in_fence(28));
        assert!(!in_fence(29));
        assert!(in_fence(40));
        assert!(!in_fence(41));
        assert!(in_fence(53));
        assert!(!in_fence(54));
        assert!(!in_fence(57));
    }

    #[test]
    fn test_keycode_names() {
        assert_eq!(keycode_for_name(";"), Some(39));
        assert_eq!(keycode_for_name(" "), Some(57));
        assert_eq!(keycode_for_name("Space"), Some(57));
        assert_eq!(keycode_for_name("F12"), Some(88));
        assert_eq!(keycode_for_name("kp_enter"), None);
    }
}
