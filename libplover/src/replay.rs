//! Key event scripts for exercising an engine without an input-method
//! framework.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! chord s d          # press both, then release both
//! press q            # key names are physical positions: "q", ";", "space"
//! release q
//! key Return         # press and release a named key
//! hyper t            # Hyper+t (toggle mute)
//! both-shift         # press and release both shift keys
//! ctrl-tab           # Control+Tab (toggle immediate mode)
//! capabilities 0x20
//! reset
//! focus-in
//! focus-out
//! ```

use anyhow::{anyhow, bail, Context, Result};
use libsteno_core::key_event::{keyval, modifier, resolve_key_combination};
use libsteno_core::keymap::keycode_for_name;
use libsteno_core::{HostEvent, PhysicalKeyEvent, RecordingHost, StenoEngine, Translator};
use std::io::Write;

const SHIFT_L_CODE: u32 = 42;
const SHIFT_R_CODE: u32 = 54;
const TAB_CODE: u32 = 15;

/// A physical key named in a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptKey {
    pub keyval: u32,
    pub keycode: u32,
}

impl ScriptKey {
    fn parse(name: &str) -> Result<Self> {
        let keycode =
            keycode_for_name(name).ok_or_else(|| anyhow!("unknown key name '{}'", name))?;
        let keyval = match name.to_ascii_lowercase().as_str() {
            "space" | " " => keyval::SPACE,
            other if other.chars().count() == 1 => other.chars().next().map_or(0, u32::from),
            _ => 0,
        };
        Ok(Self { keyval, keycode })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    Chord(Vec<ScriptKey>),
    Press(Vec<ScriptKey>),
    Release(Vec<ScriptKey>),
    Key(ScriptKey),
    Hyper(ScriptKey),
    BothShift,
    CtrlTab,
    Capabilities(u32),
    Reset,
    FocusIn,
    FocusOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub number: usize,
    pub source: String,
    pub command: ScriptCommand,
}

fn keys(args: &[&str]) -> Result<Vec<ScriptKey>> {
    if args.is_empty() {
        bail!("expected at least one key name");
    }
    args.iter().map(|a| ScriptKey::parse(a)).collect()
}

fn single<'a>(args: &[&'a str]) -> Result<&'a str> {
    match args {
        [one] => Ok(one),
        _ => bail!("expected exactly one argument"),
    }
}

fn parse_number(text: &str) -> Result<u32> {
    let value = match text.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    value.with_context(|| format!("invalid number '{}'", text))
}

fn parse_command(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.split('#').next().unwrap_or("").trim();
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let command = match verb {
        "chord" => ScriptCommand::Chord(keys(&args)?),
        "press" => ScriptCommand::Press(keys(&args)?),
        "release" => ScriptCommand::Release(keys(&args)?),
        "key" => {
            let name = single(&args)?;
            let (keyval, keycode) = resolve_key_combination(name)
                .ok_or_else(|| anyhow!("unknown key combination '{}'", name))?;
            ScriptCommand::Key(ScriptKey { keyval, keycode })
        }
        "hyper" => ScriptCommand::Hyper(ScriptKey::parse(single(&args)?)?),
        "both-shift" => ScriptCommand::BothShift,
        "ctrl-tab" => ScriptCommand::CtrlTab,
        "capabilities" => ScriptCommand::Capabilities(parse_number(single(&args)?)?),
        "reset" => ScriptCommand::Reset,
        "focus-in" => ScriptCommand::FocusIn,
        "focus-out" => ScriptCommand::FocusOut,
        other => bail!("unknown command '{}'", other),
    };
    Ok(Some(command))
}

/// Parse a whole script. Errors name the offending line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, source) in text.lines().enumerate() {
        let number = index + 1;
        let parsed = parse_command(source).with_context(|| format!("line {}", number))?;
        if let Some(command) = parsed {
            lines.push(ScriptLine {
                number,
                source: source.trim().to_string(),
                command,
            });
        }
    }
    Ok(lines)
}

/// Key events a command expands to.
fn events(command: &ScriptCommand) -> Vec<PhysicalKeyEvent> {
    let press = |k: &ScriptKey| PhysicalKeyEvent::press(k.keyval, k.keycode);
    let release = |k: &ScriptKey| PhysicalKeyEvent::release(k.keyval, k.keycode);
    match command {
        ScriptCommand::Chord(keys) => keys
            .iter()
            .map(press)
            .chain(keys.iter().map(release))
            .collect(),
        ScriptCommand::Press(keys) => keys.iter().map(press).collect(),
        ScriptCommand::Release(keys) => keys.iter().map(release).collect(),
        ScriptCommand::Key(key) => vec![press(key), release(key)],
        ScriptCommand::Hyper(key) => {
            vec![PhysicalKeyEvent::new(key.keyval, key.keycode, modifier::HYPER)]
        }
        ScriptCommand::BothShift => vec![
            PhysicalKeyEvent::press(keyval::SHIFT_L, SHIFT_L_CODE),
            PhysicalKeyEvent::press(keyval::SHIFT_R, SHIFT_R_CODE).with_modifiers(modifier::SHIFT),
            PhysicalKeyEvent::release(keyval::SHIFT_R, SHIFT_R_CODE).with_modifiers(modifier::SHIFT),
            PhysicalKeyEvent::release(keyval::SHIFT_L, SHIFT_L_CODE).with_modifiers(modifier::SHIFT),
        ],
        ScriptCommand::CtrlTab => vec![
            PhysicalKeyEvent::press(keyval::TAB, TAB_CODE).with_modifiers(modifier::CONTROL),
            PhysicalKeyEvent::release(keyval::TAB, TAB_CODE).with_modifiers(modifier::CONTROL),
        ],
        _ => Vec::new(),
    }
}

/// One line per host call.
pub fn describe_event(event: &HostEvent) -> String {
    match event {
        HostEvent::Preedit(Some(text)) => format!("preedit {:?}", text),
        HostEvent::Preedit(None) => "preedit hidden".to_string(),
        HostEvent::Commit(text) => format!("commit {:?}", text),
        HostEvent::DeleteSurrounding(count) => format!("delete {}", count),
        HostEvent::ForwardKey {
            keyval,
            keycode,
            modifiers,
        } => format!("forward 0x{:04x} {} {:04x}", keyval, keycode, modifiers),
        HostEvent::EngineCommand(name) => format!("command {}", name),
    }
}

/// Run a parsed script, writing the verdict for every key event and every
/// host call to `out`.
pub fn run_script<T, W>(
    engine: &mut StenoEngine<T, RecordingHost>,
    script: &[ScriptLine],
    out: &mut W,
) -> Result<()>
where
    T: Translator,
    W: Write,
{
    for line in script {
        writeln!(out, "{:>3}: {}", line.number, line.source)?;
        match &line.command {
            ScriptCommand::Capabilities(caps) => engine.set_capabilities(*caps),
            ScriptCommand::Reset => engine.reset(),
            ScriptCommand::FocusIn => engine.focus_in(),
            ScriptCommand::FocusOut => engine.focus_out(),
            command => {
                for event in events(command) {
                    let result = engine.process_key(event);
                    writeln!(
                        out,
                        "     {} {} -> {}",
                        if event.is_press { "press" } else { "release" },
                        event.keycode,
                        if result.is_handled() { "handled" } else { "forwarded" }
                    )?;
                }
            }
        }
        for event in engine.host_mut().take_events() {
            writeln!(out, "     {}", describe_event(&event))?;
        }
    }
    writeln!(out, "committed: {:?}", engine.host().committed)?;
    if let Some(preedit) = &engine.host().preedit {
        writeln!(out, "preedit: {:?}", preedit)?;
    }
    Ok(())
}
