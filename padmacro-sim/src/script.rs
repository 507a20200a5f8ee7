//! Event scripts.
//!
//! One event per line, `#` starts a comment:
//!
//! ```text
//! 0     down 3
//! 40    up 3
//! 500   rotate +1
//! 900   estop
//! ```
use anyhow::{Context, Result, anyhow, bail};
use padmacro::NUM_BUTTONS;
use padmacro::event::InputEvent;

/// An input event at a point of simulated time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptEvent {
    pub at_ms: u64,
    pub event: InputEvent,
}

/// Parse a script, events are returned in time order
pub fn parse_script(text: &str) -> Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let event = parse_line(line).with_context(|| format!("line {}: '{}'", number + 1, line))?;
        events.push(event);
    }
    // Stable, events at the same time keep their order
    events.sort_by_key(|e| e.at_ms);
    Ok(events)
}

fn parse_line(line: &str) -> Result<ScriptEvent> {
    let mut words = line.split_whitespace();
    let at_ms = words
        .next()
        .ok_or_else(|| anyhow!("missing time"))?
        .parse::<u64>()
        .context("invalid time")?;

    let event = match words.next() {
        Some("down") => InputEvent::down(button(words.next())?),
        Some("up") => InputEvent::up(button(words.next())?),
        Some("rotate") => {
            let step = words.next().ok_or_else(|| anyhow!("missing rotation step"))?;
            InputEvent::Rotate(step.parse::<i8>().context("invalid rotation step")?)
        }
        Some("estop") => InputEvent::EmergencyStop,
        Some(other) => bail!("unknown event '{}'", other),
        None => bail!("missing event"),
    };
    if let Some(extra) = words.next() {
        bail!("unexpected '{}'", extra);
    }
    Ok(ScriptEvent { at_ms, event })
}

fn button(word: Option<&str>) -> Result<u8> {
    let index = word
        .ok_or_else(|| anyhow!("missing button"))?
        .parse::<u8>()
        .context("invalid button")?;
    if index as usize >= NUM_BUTTONS {
        bail!("button {} out of range 0..{}", index, NUM_BUTTONS);
    }
    Ok(index)
}
