//! Compact one-character-per-event rendering of traces.
//!
//! A char map assigns each action name a single, unique character, so a
//! whole trace can be shown as a short string such as `"SOPOOS"`.

use crate::model::event::Event;
use crate::utils::config::{wildcard_chars, ANSI_RED, ANSI_RESET};
use log::warn;
use std::collections::{BTreeMap, BTreeSet};

/// Action name to display character
pub type CharMap = BTreeMap<String, char>;

/// Shown for actions missing from the char map
const UNMAPPED_CHAR: char = '?';

/// Guess a readable char map for a set of action names
///
/// **Public** - default mapping behind `TraceSet::get_event_chars`
///
/// Names are visited in sorted order. Each takes, in turn:
/// - its first letter, when a following name extends it
/// - otherwise the first letter after the prefix it shares with its
///   neighbours, if still free
/// - otherwise (second pass) the first free char of its own name, then of
///   a pool of visible ASCII characters
///
/// # Arguments
/// * `actions` - all action names; duplicates are ignored
/// * `given` - preferred chars for some actions, always kept
///
/// # Returns
/// A map covering every name in `actions` plus everything in `given`
pub fn default_map_to_chars<I, S>(actions: I, given: &CharMap) -> CharMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let sorted: BTreeSet<String> = actions.into_iter().map(|a| a.as_ref().to_string()).collect();
    let names: Vec<Vec<char>> = sorted.iter().map(|name| name.chars().collect()).collect();

    let mut result = given.clone();
    let mut used: BTreeSet<char> = result.values().copied().collect();
    let mut curr_prefix: Vec<char> = Vec::new();
    let mut pass2: Vec<String> = Vec::new();

    for (i, name) in names.iter().enumerate() {
        let key: String = name.iter().collect();
        if result.contains_key(&key) {
            continue;
        }

        // skip the prefix shared with the previous name
        let mut pos = if name.starts_with(&curr_prefix) {
            curr_prefix.len()
        } else {
            0
        };

        let prefix = match names.get(i + 1) {
            Some(next) => {
                if let Some(&first) = name.first().filter(|c| next.starts_with(name) && !used.contains(*c)) {
                    used.insert(first);
                    result.insert(key, first);
                    curr_prefix = name.clone();
                    continue;
                }
                let shared = common_prefix_len(name, next);
                curr_prefix = name[..shared].to_vec();
                shared
            }
            None => {
                curr_prefix.clear();
                0
            }
        };
        pos = pos.max(prefix);

        match name.get(pos) {
            Some(&ch) if !used.contains(&ch) => {
                used.insert(ch);
                result.insert(key, ch);
            }
            _ => pass2.push(key),
        }
    }

    for key in pass2 {
        match key.chars().chain(wildcard_chars()).find(|ch| !used.contains(ch)) {
            Some(ch) => {
                used.insert(ch);
                result.insert(key, ch);
            }
            None => warn!("No display character left for action '{}'", key),
        }
    }
    result
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Render events as one char per event
///
/// **Public** - compact trace summaries for terminals and logs
///
/// # Arguments
/// * `events` - events to render
/// * `to_char` - char map; unmapped actions show as `?`
/// * `compress` - actions whose consecutive repeats show only once
/// * `color_status` - wrap chars of failed events (non-zero status) in
///   ANSI red; a compressed run is coloured by its first event
pub fn trace_to_string(events: &[Event], to_char: &CharMap, compress: &[&str], color_status: bool) -> String {
    let mut out = String::with_capacity(events.len());
    let mut prev_action: Option<&str> = None;
    for event in events {
        let action = event.action();
        let repeated = prev_action == Some(action) && compress.contains(&action);
        if !repeated {
            let ch = to_char.get(action).copied().unwrap_or(UNMAPPED_CHAR);
            if color_status && event.status() != 0 {
                out.push_str(ANSI_RED);
                out.push(ch);
                out.push_str(ANSI_RESET);
            } else {
                out.push(ch);
            }
        }
        prev_action = Some(action);
    }
    out
}

/// Replace every character that is not an ASCII letter or digit with `_`
///
/// **Public** - builds identifiers and file names from dataset names
pub fn safe_name(text: &str) -> String {
    text.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}
