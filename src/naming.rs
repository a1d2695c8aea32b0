//! Output file naming.
//!
//! Custom templates are parsed into a token list once, so placeholders are
//! resolved in a single pass and never see each other's substituted text.

use chrono::{Local, NaiveDateTime};
use serde::Deserialize;

use crate::types::Segment;

/// Source of the wall-clock time stamped into `Timestamp` and `{date}`/`{time}` names.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock frozen at a given instant, for reproducible names.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Naming pattern chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamingPattern {
    /// `{prefix}_part{NN}`
    #[default]
    Simple,
    /// `{prefix}_{YYYYMMDD}_{HHMMSS}_part{NN}`
    Timestamp,
    /// `{prefix}_{start}-{end}`
    Duration,
    /// User template with `{...}` placeholders
    Custom(String),
}

/// Pattern names accepted in configuration files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PatternName {
    #[default]
    Simple,
    Timestamp,
    Duration,
}

impl From<PatternName> for NamingPattern {
    fn from(name: PatternName) -> Self {
        match name {
            PatternName::Simple => NamingPattern::Simple,
            PatternName::Timestamp => NamingPattern::Timestamp,
            PatternName::Duration => NamingPattern::Duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Prefix,
    Original,
    Date,
    Time,
    Num { width: usize },
    Start,
    End,
    Duration,
}

/// Resolves segment names for one split operation.
///
/// The wall-clock time is captured once at construction so every segment of
/// a batch carries the same date and time.
#[derive(Debug, Clone)]
pub struct Namer {
    prefix: String,
    original: String,
    pattern: NamingPattern,
    template: Vec<Token>,
    stamped_at: NaiveDateTime,
}

impl Namer {
    pub fn new(
        prefix: impl Into<String>,
        original_base_name: impl Into<String>,
        pattern: NamingPattern,
        clock: &dyn Clock,
    ) -> Self {
        let original = original_base_name.into();
        let prefix = prefix.into();
        let prefix = if prefix.trim().is_empty() {
            original.clone()
        } else {
            prefix
        };
        let template = match &pattern {
            NamingPattern::Custom(template) => parse_template(template),
            _ => Vec::new(),
        };
        Self {
            prefix,
            original,
            pattern,
            template,
            stamped_at: clock.now(),
        }
    }

    /// `Simple` naming with the system clock.
    pub fn simple(prefix: impl Into<String>, original_base_name: impl Into<String>) -> Self {
        Self::new(prefix, original_base_name, NamingPattern::Simple, &SystemClock)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn pattern(&self) -> &NamingPattern {
        &self.pattern
    }

    /// Name (without extension) of the `index`-th (1-based) segment spanning `start..end`.
    pub fn name(&self, index: usize, start: f64, end: f64) -> String {
        match &self.pattern {
            NamingPattern::Simple => format!("{}_part{:02}", self.prefix, index),
            NamingPattern::Timestamp => format!(
                "{}_{}_{}_part{:02}",
                self.prefix,
                self.stamped_at.format("%Y%m%d"),
                self.stamped_at.format("%H%M%S"),
                index
            ),
            NamingPattern::Duration => format!(
                "{}_{}-{}",
                self.prefix,
                format_minutes_seconds(start),
                format_minutes_seconds(end)
            ),
            NamingPattern::Custom(_) => self.render_template(index, start, end),
        }
    }

    pub fn name_segment(&self, index: usize, segment: &Segment) -> String {
        self.name(index, segment.start, segment.end)
    }

    fn render_template(&self, index: usize, start: f64, end: f64) -> String {
        let mut out = String::new();
        for token in &self.template {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Prefix => out.push_str(&self.prefix),
                Token::Original => out.push_str(&self.original),
                Token::Date => out.push_str(&self.stamped_at.format("%Y%m%d").to_string()),
                Token::Time => out.push_str(&self.stamped_at.format("%H%M%S").to_string()),
                Token::Num { width } => out.push_str(&format!("{:0width$}", index, width = *width)),
                Token::Start => out.push_str(&format_minutes_seconds(start)),
                Token::End => out.push_str(&format_minutes_seconds(end)),
                Token::Duration => out.push_str(&format_minutes_seconds(end - start)),
            }
        }
        out
    }
}

/// Format seconds as `<m>m<s>s` with whole seconds, e.g. `90.4` -> `1m30s`.
pub fn format_minutes_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}m{}s", total / 60, total % 60)
}

fn parse_template(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        literal.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find(['{', '}']) else {
            break;
        };
        if after.as_bytes()[close] == b'{' {
            // stray brace: keep it and rescan from the inner one
            literal.push('{');
            literal.push_str(&after[..close]);
            rest = &after[close..];
            continue;
        }
        let raw = &after[..close];
        match placeholder(raw) {
            Some(token) => {
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(token);
            }
            None => {
                literal.push('{');
                literal.push_str(raw);
                literal.push('}');
            }
        }
        rest = &after[close + 1..];
    }
    if let Some(open) = rest.find('{') {
        // unterminated placeholder: keep it verbatim
        literal.push_str(&rest[open..]);
    } else {
        literal.push_str(rest);
    }
    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}

fn placeholder(raw: &str) -> Option<Token> {
    let token = match raw {
        "prefix" => Token::Prefix,
        "original" => Token::Original,
        "date" => Token::Date,
        "time" => Token::Time,
        "num" => Token::Num { width: 0 },
        "start" => Token::Start,
        "end" => Token::End,
        "duration" => Token::Duration,
        _ => {
            let spec = raw.strip_prefix("num:")?.strip_suffix('d')?;
            if spec.is_empty() || !spec.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let width = spec.parse().ok()?;
            Token::Num { width }
        }
    };
    Some(token)
}
