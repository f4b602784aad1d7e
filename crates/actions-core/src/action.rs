//! The `Action` entity, form-field normalization, and the pure collection
//! commands the store applies to the committed collection.

use crate::error::{ActionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Longest emoji icon accepted, in Unicode scalar values.
pub const MAX_EMOJI_CHARS: usize = 3;

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// Discriminator stored under `type`. Custom actions are always `"action"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    #[default]
    Action,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Action => f.write_str("action"),
        }
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One user-configured shortcut. Identified by `url` within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type", default)]
    pub kind: ActionKind,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub emoji: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji_char: Option<String>,
    #[serde(default)]
    pub keycheck: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    /// Form fields with no dedicated attribute, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Action {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            desc: title.clone(),
            title,
            kind: ActionKind::Action,
            url: url.into(),
            fav_icon_url: None,
            emoji: false,
            emoji_char: None,
            keycheck: false,
            keys: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = true;
        self.emoji_char = Some(emoji.into());
        self
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keycheck = true;
        self.keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Fold an ordered sequence of form fields into an Action.
    ///
    /// Later fields win over earlier ones, so a `desc` after `name` replaces
    /// the description `name` filled in. The result is not validated.
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut action = Action::new("", "");
        action.apply_fields(fields);
        action.fill_defaults();
        action
    }

    /// Apply form fields on top of the current values, in order.
    pub fn apply_fields<I, K, V>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in fields {
            let value: String = value.into();
            match name.as_ref() {
                "name" => {
                    self.title = value.clone();
                    self.desc = value;
                }
                "emoji" | "emojiChar" => {
                    // An empty value turns the emoji icon off.
                    self.emoji = !value.is_empty();
                    self.emoji_char = self.emoji.then_some(value);
                }
                "title" => self.title = value,
                "desc" => self.desc = value,
                "url" => self.url = value,
                "favIconUrl" => {
                    self.fav_icon_url = (!value.is_empty()).then_some(value);
                }
                "keys" => {
                    let keys = parse_keys(&value);
                    self.keycheck = !keys.is_empty();
                    self.keys = (!keys.is_empty()).then_some(keys);
                }
                "keycheck" => {
                    self.keycheck = parse_flag(&value);
                    if !self.keycheck {
                        self.keys = None;
                    }
                }
                // The discriminator is not user-controlled.
                "type" => {}
                other => {
                    self.extra.insert(other.to_string(), value);
                }
            }
        }
        self.kind = ActionKind::Action;
    }

    /// `desc` falls back to `title` when left empty.
    pub fn fill_defaults(&mut self) {
        if self.desc.is_empty() {
            self.desc = self.title.clone();
        }
    }

    /// Check the entity invariants that every persisted Action must hold.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ActionError::InvalidAction(
                "title must not be empty (supply a 'name' field)".to_string(),
            ));
        }
        match (&self.emoji_char, self.emoji) {
            (Some(c), true) => {
                let len = c.chars().count();
                if len > MAX_EMOJI_CHARS {
                    return Err(ActionError::InvalidAction(format!(
                        "emoji '{c}' is {len} characters, at most {MAX_EMOJI_CHARS} allowed"
                    )));
                }
            }
            (None, false) => {}
            (Some(_), false) => {
                return Err(ActionError::InvalidAction(
                    "emojiChar is set but emoji is off".to_string(),
                ))
            }
            (None, true) => {
                return Err(ActionError::InvalidAction(
                    "emoji is on but no emojiChar was given".to_string(),
                ))
            }
        }
        match (&self.keys, self.keycheck) {
            (Some(_), true) | (None, false) => Ok(()),
            (Some(_), false) => Err(ActionError::InvalidAction(
                "keys are set but keycheck is off".to_string(),
            )),
            (None, true) => Err(ActionError::InvalidAction(
                "keycheck is on but no keys were given".to_string(),
            )),
        }
    }

    /// Icon shown in front of the title: the emoji if set, else the favicon.
    pub fn icon(&self) -> Option<Icon<'_>> {
        match (self.emoji, &self.emoji_char, &self.fav_icon_url) {
            (true, Some(c), _) => Some(Icon::Emoji(c)),
            (_, _, Some(src)) => Some(Icon::Favicon(src)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon<'a> {
    Emoji(&'a str),
    Favicon(&'a str),
}

fn parse_keys(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}

// ---------------------------------------------------------------------------
// Collection commands (operate on a mutable Vec<Action>)
// ---------------------------------------------------------------------------

/// A single write against the committed collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(Action),
    Upsert(Action),
    Delete(Action),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Upsert(_) => "upsert",
            Command::Delete(_) => "delete",
        }
    }
}

/// Apply `cmd` to `prior`, returning the next collection and whether it changed.
pub fn apply(mut actions: Vec<Action>, cmd: Command) -> (Vec<Action>, bool) {
    let changed = match cmd {
        Command::Add(action) => {
            actions.push(action);
            true
        }
        Command::Upsert(action) => {
            upsert_action(&mut actions, action);
            true
        }
        Command::Delete(action) => remove_action(&mut actions, &action.url),
    };
    (actions, changed)
}

/// Replace the entry sharing `action.url` in place, or append it.
/// Returns the index the action now occupies.
pub fn upsert_action(actions: &mut Vec<Action>, action: Action) -> usize {
    match actions.iter().position(|a| a.url == action.url) {
        Some(pos) => {
            actions[pos] = action;
            // Drop any later duplicates so the key stays unique.
            let url = actions[pos].url.clone();
            let mut idx = 0;
            actions.retain(|a| {
                let keep = idx <= pos || a.url != url;
                idx += 1;
                keep
            });
            pos
        }
        None => {
            actions.push(action);
            actions.len() - 1
        }
    }
}

/// Remove every entry matching `url`. Returns `false` if none matched.
pub fn remove_action(actions: &mut Vec<Action>, url: &str) -> bool {
    let before = actions.len();
    actions.retain(|a| a.url != url);
    actions.len() != before
}

pub fn find<'a>(actions: &'a [Action], url: &str) -> Option<&'a Action> {
    actions.iter().find(|a| a.url == url)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
