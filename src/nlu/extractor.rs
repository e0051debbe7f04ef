use std::collections::BTreeMap;

use chrono::{Duration as ChronoDuration, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A single extracted value, tagged with its slot kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntityValue {
    Text(String),
    Number(f64),
    /// Whole seconds.
    Duration(u64),
    Timestamp(NaiveDateTime),
    PathLike(String),
}

/// Slot name -> extracted value. Entities absent from the utterance are
/// simply missing keys; there are no null placeholders. BTreeMap keeps
/// iteration (and serialized tokens) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntitySet {
    slots: BTreeMap<String, EntityValue>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: EntityValue) {
        self.slots.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&EntityValue> {
        self.slots.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Text-ish slots: both free text and path-like values.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.slots.get(name) {
            Some(EntityValue::Text(s)) | Some(EntityValue::PathLike(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.slots.get(name) {
            Some(EntityValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn duration_secs(&self, name: &str) -> Option<u64> {
        match self.slots.get(name) {
            Some(EntityValue::Duration(secs)) => Some(*secs),
            _ => None,
        }
    }

    pub fn timestamp(&self, name: &str) -> Option<NaiveDateTime> {
        match self.slots.get(name) {
            Some(EntityValue::Timestamp(t)) => Some(*t),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityValue)> {
        self.slots.iter()
    }
}

/// Words the app-verb capture must never treat as an application name.
const NOT_AN_APP: &[&str] = &["a", "an", "my", "this", "that", "file", "folder", "files"];

/// Pulls structured slots out of raw utterance text. Pure function of
/// (text, now): the wall clock is injected by the caller so relative time
/// expressions resolve deterministically under test.
pub struct EntityExtractor {
    clock: Regex,
    at_hour: Regex,
    duration: Regex,
    percent: Regex,
    bare_number: Regex,
    move_pair: Regex,
    app_verb: Regex,
    path_like: Regex,
    delete_object: Regex,
    location: Regex,
    task_trigger: Regex,
    mark_done: Regex,
    complete_task: Regex,
    note_trigger: Regex,
    search_trigger: Regex,
}

impl EntityExtractor {
    pub fn new() -> Self {
        // The patterns mirror the command phrasings the classifier is
        // trained on; all matching happens on lowercased text.
        Self {
            clock: Regex::new(r"\b(?:at\s+)?(\d{1,2}):(\d{2})\s*(am|pm)?").unwrap(),
            at_hour: Regex::new(r"\bat\s+(\d{1,2})\s*(am|pm)\b").unwrap(),
            duration: Regex::new(
                r"\b(?:in|for)\s+(\d+)\s*(seconds?|secs?|minutes?|mins?|hours?|hrs?)\b",
            )
            .unwrap(),
            percent: Regex::new(r"\b(\d{1,3})\s*(?:percent|%)").unwrap(),
            bare_number: Regex::new(r"\b(\d{1,3})\b").unwrap(),
            move_pair: Regex::new(
                r"\b(?:move|transfer|put)\s+(?:the\s+)?(.+?)\s+(?:to|into|in)\s+(.+)$",
            )
            .unwrap(),
            app_verb: Regex::new(
                r"\b(?:open|launch|close|quit|kill|start|run)\s+(?:the\s+)?([a-z][a-z0-9_.-]*)",
            )
            .unwrap(),
            path_like: Regex::new(r"\b([\w-]+\.[a-z0-9]{1,4})\b").unwrap(),
            delete_object: Regex::new(
                r"\b(?:delete|remove|erase)\s+(?:the\s+)?(?:file\s+)?(.+?)\s*$",
            )
            .unwrap(),
            location: Regex::new(r"\bweather\s+(?:like\s+)?(?:in|for)\s+([a-z][a-z\s]*[a-z])")
                .unwrap(),
            task_trigger: Regex::new(
                r"^\s*(?:remind me to|add a task(?:\s+to)?|create a task(?:\s+to)?|new task)\s+(.+?)\s*$",
            )
            .unwrap(),
            mark_done: Regex::new(r"^\s*mark\s+(?:the\s+)?(.+?)\s+as\s+done\s*$").unwrap(),
            complete_task: Regex::new(r"^\s*(?:complete|finish)\s+(?:the\s+)?task\s+(.+?)\s*$")
                .unwrap(),
            note_trigger: Regex::new(
                r"^\s*(?:take a note(?:\s+that)?|note that|make a note(?:\s+(?:about|that))?|write down)\s+(.+?)\s*$",
            )
            .unwrap(),
            search_trigger: Regex::new(
                r"^\s*(?:search|find)\s+(?:my\s+)?notes?\s+(?:for|about|on)\s+(.+?)\s*$",
            )
            .unwrap(),
        }
    }

    /// Extract everything recognizable. Never fails: an utterance with no
    /// entities yields an empty set.
    pub fn extract(&self, text: &str, now: NaiveDateTime) -> EntitySet {
        let lower = text.to_lowercase();
        let mut entities = EntitySet::new();

        // Time expressions are resolved first and blanked out of a working
        // copy, so later numeric and free-text captures cannot re-consume
        // the digits of "5pm" or "10 minutes".
        let mut masked = lower.clone();
        self.extract_when(&lower, &mut masked, now, &mut entities);
        self.extract_duration(&mut masked, &mut entities);
        self.extract_numbers(&masked, &mut entities);

        if let Some(caps) = self.move_pair.captures(&lower) {
            let source = trim_object(&caps[1]);
            let dest = trim_object(&caps[2]);
            if !source.is_empty() && !dest.is_empty() {
                entities.insert("source_path", EntityValue::PathLike(source));
                entities.insert("destination_path", EntityValue::PathLike(dest));
            }
        } else if let Some(caps) = self.path_like.captures(&lower) {
            entities.insert("path", EntityValue::PathLike(caps[1].to_string()));
        } else if let Some(caps) = self.delete_object.captures(&masked) {
            let object = squeeze(&caps[1]);
            if !object.is_empty() {
                entities.insert("path", EntityValue::PathLike(object));
            }
        }

        if let Some(caps) = self.app_verb.captures(&lower) {
            let name = caps[1].to_string();
            if !NOT_AN_APP.contains(&name.as_str()) {
                entities.insert("target_app", EntityValue::Text(name));
            }
        }

        if let Some(caps) = self.location.captures(&masked) {
            let loc = squeeze(&caps[1]);
            if !loc.is_empty() {
                entities.insert("location", EntityValue::Text(loc));
            }
        }

        // Payload capture runs on the masked copy so note/task content does
        // not drag the already-parsed time expression along.
        let content = self
            .task_trigger
            .captures(&masked)
            .or_else(|| self.mark_done.captures(&masked))
            .or_else(|| self.complete_task.captures(&masked))
            .or_else(|| self.note_trigger.captures(&masked))
            .map(|caps| squeeze(&caps[1]));
        if let Some(content) = content {
            if !content.is_empty() {
                entities.insert("content", EntityValue::Text(content));
            }
        }

        if let Some(caps) = self.search_trigger.captures(&masked) {
            let query = squeeze(&caps[1]);
            if !query.is_empty() {
                entities.insert("query", EntityValue::Text(query));
            }
        }

        entities
    }

    fn extract_when(
        &self,
        lower: &str,
        masked: &mut String,
        now: NaiveDateTime,
        entities: &mut EntitySet,
    ) {
        let tomorrow = lower.contains("tomorrow");
        let tonight = lower.contains("tonight");

        let mut clock_time: Option<(u32, u32, Option<String>, std::ops::Range<usize>)> = None;
        if let Some(caps) = self.clock.captures(lower) {
            let span = caps.get(0).unwrap().range();
            let hour = caps[1].parse().unwrap_or(0);
            let minute = caps[2].parse().unwrap_or(0);
            let meridiem = caps.get(3).map(|m| m.as_str().to_string());
            clock_time = Some((hour, minute, meridiem, span));
        } else if let Some(caps) = self.at_hour.captures(lower) {
            let span = caps.get(0).unwrap().range();
            let hour = caps[1].parse().unwrap_or(0);
            let meridiem = Some(caps[2].to_string());
            clock_time = Some((hour, 0, meridiem, span));
        }

        let when = match clock_time {
            Some((mut hour, minute, meridiem, span)) => {
                match meridiem.as_deref() {
                    Some("pm") if hour < 12 => hour += 12,
                    Some("am") if hour == 12 => hour = 0,
                    _ => {}
                }
                mask(masked, span);
                NaiveTime::from_hms_opt(hour, minute, 0).map(|time| {
                    let mut when = now.date().and_time(time);
                    if tomorrow {
                        when += ChronoDuration::days(1);
                    } else if when <= now {
                        // "at 5pm" after 5pm means the next occurrence.
                        when += ChronoDuration::days(1);
                    }
                    when
                })
            }
            // Day words without a clock time get conventional defaults.
            None if tomorrow => NaiveTime::from_hms_opt(9, 0, 0)
                .map(|t| now.date().and_time(t) + ChronoDuration::days(1)),
            None if tonight => NaiveTime::from_hms_opt(20, 0, 0).map(|t| now.date().and_time(t)),
            None => None,
        };

        for word in ["tomorrow", "tonight", "today"] {
            if let Some(pos) = masked.find(word) {
                mask(masked, pos..pos + word.len());
            }
        }

        if let Some(when) = when {
            entities.insert("when", EntityValue::Timestamp(when));
        }
    }

    fn extract_duration(&self, masked: &mut String, entities: &mut EntitySet) {
        if let Some(caps) = self.duration.captures(masked) {
            let span = caps.get(0).unwrap().range();
            let amount: u64 = caps[1].parse().unwrap_or(0);
            let secs = match caps[2].chars().next() {
                Some('h') => amount * 3600,
                Some('m') => amount * 60,
                _ => amount,
            };
            mask(masked, span);
            if secs > 0 {
                entities.insert("duration_secs", EntityValue::Duration(secs));
            }
        }
    }

    fn extract_numbers(&self, masked: &str, entities: &mut EntitySet) {
        let level = self
            .percent
            .captures(masked)
            .or_else(|| self.bare_number.captures(masked))
            .and_then(|caps| caps[1].parse::<f64>().ok());
        if let Some(level) = level {
            entities.insert("level", EntityValue::Number(level));
        }
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Blank a byte range with spaces, preserving offsets for later captures.
fn mask(text: &mut String, range: std::ops::Range<usize>) {
    let len = range.len();
    text.replace_range(range, &" ".repeat(len));
}

fn squeeze(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn trim_object(text: &str) -> String {
    squeeze(text.trim_matches(|c: char| c.is_whitespace() || c == '.' || c == ','))
}
