//! Dictionary-backed stroke translator.
//!
//! Each stroke becomes a [`Translation`]. A stroke that completes a longer
//! outline together with the preceding strokes replaces their translations:
//! their text is retracted with backspaces and the combined entry is emitted
//! instead. The asterisk stroke undoes the last translation and restores
//! whatever it replaced.
//!
//! Only the last `min_undo_length` translations stay undoable; the newest one
//! pushed out becomes the history tail, which supplies spacing context.

use crate::dictionary::DictionaryCollection;
use crate::format::{render, Action, Rendered};
use crate::stroke::Stroke;
use libsteno_core::{Chord, HistoryReset, Output, Result, Translator, NB_PREEDIT_STROKES};

#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub strokes: Vec<Stroke>,
    /// Dictionary entry, `None` for an untranslated stroke
    pub english: Option<String>,
    /// Text emitted for this translation
    pub text: String,
    /// The following translation attaches without a space
    pub attach_next: bool,
    /// Translations folded into this one by a multi-stroke match
    pub replaced: Vec<Translation>,
}

impl Translation {
    /// Start-of-text boundary. The first word after it gets no leading space.
    pub fn sentinel() -> Self {
        Self {
            strokes: vec![Stroke::star()],
            english: None,
            text: String::new(),
            attach_next: true,
            replaced: Vec::new(),
        }
    }
}

pub struct PloverTranslator {
    dictionaries: DictionaryCollection,
    translations: Vec<Translation>,
    tail: Option<Translation>,
    min_undo_length: usize,
}

impl PloverTranslator {
    pub fn new(dictionaries: DictionaryCollection) -> Self {
        Self {
            dictionaries,
            translations: Vec::new(),
            tail: Some(Translation::sentinel()),
            min_undo_length: NB_PREEDIT_STROKES,
        }
    }

    pub fn dictionaries(&self) -> &DictionaryCollection {
        &self.dictionaries
    }

    /// Undoable translations, oldest first.
    pub fn translations(&self) -> &[Translation] {
        &self.translations
    }

    fn previous_attach(&self) -> bool {
        self.translations
            .last()
            .or(self.tail.as_ref())
            .map(|t| t.attach_next)
            .unwrap_or(false)
    }

    /// Find the longest outline ending in `stroke`. Returns the index of the
    /// first translation it replaces and the entry, if any.
    fn longest_match(&self, stroke: Stroke) -> (usize, Option<String>) {
        let longest = self.dictionaries.longest_key();
        for start in 0..self.translations.len() {
            let mut outline: Vec<Stroke> = self.translations[start..]
                .iter()
                .flat_map(|t| t.strokes.iter().copied())
                .collect();
            if outline.len() >= longest {
                continue;
            }
            outline.push(stroke);
            if let Some(text) = self.dictionaries.lookup(&outline) {
                return (start, Some(text.to_string()));
            }
        }
        let single = self.dictionaries.lookup(&[stroke]).map(str::to_string);
        (self.translations.len(), single)
    }

    fn emit(rendered: &Rendered, output: &mut dyn Output) {
        for action in &rendered.actions {
            match action {
                Action::Text(text) => output.append_text(text),
                Action::KeyCombination(name) => output.run_key_combination(name),
                Action::EngineCommand(name) => output.run_engine_command(name),
            }
        }
    }

    fn undo(&mut self, output: &mut dyn Output) {
        let Some(last) = self.translations.pop() else {
            tracing::debug!("nothing to undo");
            return;
        };
        let count = last.text.chars().count();
        if count > 0 {
            output.delete_backward(count);
        }
        for restored in last.replaced {
            if !restored.text.is_empty() {
                output.append_text(&restored.text);
            }
            self.translations.push(restored);
        }
    }

    fn trim(&mut self) {
        if self.translations.len() <= self.min_undo_length {
            return;
        }
        let excess = self.translations.len() - self.min_undo_length;
        if let Some(newest) = self.translations.drain(..excess).last() {
            self.tail = Some(newest);
        }
    }
}

impl Translator for PloverTranslator {
    type Tail = Translation;

    fn translate(&mut self, chord: &Chord, output: &mut dyn Output) -> Result<()> {
        let stroke = Stroke::from_chord(chord)?;
        if stroke.is_star() {
            self.undo(output);
            return Ok(());
        }

        let (start, english) = self.longest_match(stroke);
        let replaced: Vec<Translation> = self.translations.drain(start..).collect();
        let retract: usize = replaced.iter().map(|t| t.text.chars().count()).sum();
        if retract > 0 {
            output.delete_backward(retract);
        }

        let mut strokes: Vec<Stroke> = replaced
            .iter()
            .flat_map(|t| t.strokes.iter().copied())
            .collect();
        strokes.push(stroke);

        let entry = english.clone().unwrap_or_else(|| stroke.rtfcre());
        let rendered = render(&entry, self.previous_attach());
        tracing::debug!("{} -> {:?}", crate::stroke::outline_to_string(&strokes), entry);
        Self::emit(&rendered, output);

        self.translations.push(Translation {
            strokes,
            english,
            text: rendered.text(),
            attach_next: rendered.attach_next,
            replaced,
        });
        self.trim();
        Ok(())
    }

    fn history_tail(&self) -> Option<Translation> {
        self.translations.last().or(self.tail.as_ref()).cloned()
    }

    fn set_history(&mut self, reset: HistoryReset<Translation>) {
        self.translations.clear();
        self.tail = Some(match reset {
            HistoryReset::StartOfText => Translation::sentinel(),
            HistoryReset::CarryForward(tail) => tail,
        });
    }

    fn set_min_undo_length(&mut self, strokes: usize) {
        self.min_undo_length = strokes;
        self.trim();
    }

    fn describe(&self, chord: &Chord) -> String {
        match Stroke::from_chord(chord) {
            Ok(stroke) => stroke.rtfcre(),
            Err(_) => chord
                .keys()
                .map(|k| k.as_str().trim_matches('-'))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use libsteno_core::StenoError;

    /// Output that applies edits to a string and logs every call.
    #[derive(Default)]
    struct Capture {
        text: String,
        calls: Vec<String>,
    }

    impl Output for Capture {
        fn append_text(&mut self, text: &str) {
            self.text.push_str(text);
            self.calls.push(format!("+{}", text));
        }

        fn delete_backward(&mut self, count: usize) {
            let keep = self.text.chars().count().saturating_sub(count);
            self.text = self.text.chars().take(keep).collect();
            self.calls.push(format!("-{}", count));
        }

        fn run_key_combination(&mut self, combo: &str) {
            self.calls.push(format!("key:{}", combo));
        }

        fn run_engine_command(&mut self, command: &str) {
            self.calls.push(format!("cmd:{}", command));
        }
    }

    fn translator(json: &str) -> PloverTranslator {
        let dict = Dictionary::from_json_str(json, "test").unwrap();
        PloverTranslator::new(DictionaryCollection::new(vec![dict]))
    }

    fn chord(rtfcre: &str) -> Chord {
        Chord::new(Stroke::parse(rtfcre).unwrap().keys())
    }

    fn run(t: &mut PloverTranslator, out: &mut Capture, strokes: &[&str]) {
        for s in strokes {
            t.translate(&chord(s), out).unwrap();
        }
    }

    const DICT: &str = r#"{
        "KAT": "cat",
        "TKOG": "dog",
        "PWAOE": "be",
        "PWAOE/-FL": "beautiful",
        "-G": "{^ing}",
        "R-R": "{#Return}",
        "TPH-FS": "{PLOVER:toggle}"
    }"#;

    #[test]
    fn test_words_after_sentinel() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["KAT", "TKOG"]);
        assert_eq!(out.text, "cat dog");
        assert_eq!(out.calls, vec!["+cat", "+ dog"]);
    }

    #[test]
    fn test_multi_stroke_replaces_prefix() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["KAT", "PWAOE"]);
        assert_eq!(out.text, "cat be");
        run(&mut t, &mut out, &["-FL"]);
        assert_eq!(out.text, "cat beautiful");
        assert_eq!(out.calls[2..], ["-3", "+ beautiful"]);
        assert_eq!(t.translations().len(), 2);
    }

    #[test]
    fn test_undo_restores_replaced() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["PWAOE", "-FL", "*"]);
        assert_eq!(out.text, "be");
        run(&mut t, &mut out, &["*"]);
        assert_eq!(out.text, "");
        run(&mut t, &mut out, &["*"]);
        assert_eq!(out.text, "");
        assert!(t.translations().is_empty());
    }

    #[test]
    fn test_untranslated_stroke_is_echoed() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["ST", "-T"]);
        assert_eq!(out.text, "ST -T");
        assert_eq!(t.translations()[0].english, None);
    }

    #[test]
    fn test_suffix_attaches() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["KAT", "-G"]);
        assert_eq!(out.text, "cating");
    }

    #[test]
    fn test_meta_commands() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["R-R", "TPH-FS"]);
        assert_eq!(out.calls, vec!["key:Return", "cmd:TOGGLE"]);
        assert_eq!(out.text, "");
    }

    #[test]
    fn test_undo_window_and_tail() {
        let mut t = translator(DICT);
        t.set_min_undo_length(2);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["KAT", "TKOG", "KAT"]);
        assert_eq!(t.translations().len(), 2);
        assert_eq!(t.history_tail().map(|h| h.text), Some(" cat".to_string()));

        run(&mut t, &mut out, &["*", "*", "*"]);
        assert_eq!(out.text, "cat");
    }

    #[test]
    fn test_one_append_per_translation() {
        let mut t = translator(r#"{"S": "a{#Tab}b", "T": "dog"}"#);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["S", "T", "*"]);
        assert_eq!(out.calls, vec!["+a b", "key:Tab", "+ dog", "-4"]);
        assert_eq!(out.text, "a b");
    }

    #[test]
    fn test_history_resets() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        run(&mut t, &mut out, &["KAT"]);

        let tail = t.history_tail().unwrap();
        t.set_history(HistoryReset::CarryForward(tail));
        assert!(t.translations().is_empty());
        run(&mut t, &mut out, &["TKOG"]);
        assert_eq!(out.text, "cat dog");

        t.set_history(HistoryReset::StartOfText);
        run(&mut t, &mut out, &["KAT"]);
        assert_eq!(out.text, "cat dogcat");
    }

    #[test]
    fn test_unknown_key_fails() {
        let mut t = translator(DICT);
        let mut out = Capture::default();
        let err = t.translate(&Chord::new(["S-", "X-"]), &mut out).unwrap_err();
        assert!(matches!(err, StenoError::Translate(_)));
        assert!(out.calls.is_empty());
    }

    #[test]
    fn test_describe_uses_steno_order() {
        let t = translator(DICT);
        assert_eq!(t.describe(&Chord::new(["-T", "S-", "#"])), "1-9");
        assert_eq!(t.describe(&Chord::new(["-Z", "A-"])), "AZ");
        assert_eq!(t.describe(&Chord::new(["X-"])), "X");
    }
}
