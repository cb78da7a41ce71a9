//! CSS-like target selectors.
//!
//! Supported grammar, enough for interaction rules:
//!
//! ```text
//! selector  := chain ("," chain)*
//! chain     := compound (whitespace compound)*      descendant combinator
//! compound  := "*" | tag? ("#" ident | "." ident)*
//! ```
//!
//! `node.selected`, `canvas node`, `#inspector, .panel` are all valid.

use super::{EventTarget, TargetElement};
use crate::error::SelectorError;
use std::fmt;
use std::str::FromStr;

/// One compound selector: an optional tag, an optional id and required classes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl CompoundSelector {
    /// `*`
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn matches(&self, element: &TargetElement) -> bool {
        if self.tag.as_ref().is_some_and(|t| *t != element.tag) {
            return false;
        }
        if self.id.is_some() && self.id != element.id {
            return false;
        }
        self.classes.iter().all(|c| element.has_class(c))
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tag {
            Some(tag) => f.write_str(tag)?,
            None if self.id.is_none() && self.classes.is_empty() => f.write_str("*")?,
            None => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        Ok(())
    }
}

/// A list of alternative descendant chains. Matches if any chain matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    /// Each chain is ordered outermost ancestor first, subject last.
    alternatives: Vec<Vec<CompoundSelector>>,
}

impl Default for Selector {
    fn default() -> Self {
        Self::any()
    }
}

impl From<CompoundSelector> for Selector {
    fn from(compound: CompoundSelector) -> Self {
        Self {
            alternatives: vec![vec![compound]],
        }
    }
}

impl Selector {
    pub fn any() -> Self {
        CompoundSelector::any().into()
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        CompoundSelector::tag(tag).into()
    }

    pub fn id(id: impl Into<String>) -> Self {
        CompoundSelector::any().with_id(id).into()
    }

    /// Require `class` on the subject of every alternative.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        for chain in &mut self.alternatives {
            if let Some(subject) = chain.last_mut() {
                subject.classes.push(class.clone());
            }
        }
        self
    }

    /// Require the subject to sit somewhere inside `ancestor`.
    pub fn inside(mut self, ancestor: CompoundSelector) -> Self {
        for chain in &mut self.alternatives {
            chain.insert(0, ancestor.clone());
        }
        self
    }

    /// `self, other`
    pub fn or(mut self, other: Selector) -> Self {
        self.alternatives.extend(other.alternatives);
        self
    }

    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        let mut offset = 0;
        for part in source.split(',') {
            let chain = parse_chain(source, part, offset)?;
            if chain.is_empty() {
                return Err(SelectorError::Empty);
            }
            alternatives.push(chain);
            offset += part.len() + 1;
        }
        Ok(Self { alternatives })
    }

    pub fn matches(&self, target: &EventTarget) -> bool {
        self.alternatives
            .iter()
            .any(|chain| chain_matches(chain, target))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chain) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for (j, compound) in chain.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{compound}")?;
            }
        }
        Ok(())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_chain(
    source: &str,
    part: &str,
    base: usize,
) -> Result<Vec<CompoundSelector>, SelectorError> {
    let unexpected = |ch: char, at: usize| SelectorError::UnexpectedChar {
        selector: source.to_string(),
        ch,
        offset: base + at,
    };

    let mut chain = Vec::new();
    let mut chars = part.char_indices().peekable();
    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let mut compound = CompoundSelector::default();
        if c == '*' {
            chars.next();
        } else if is_ident_char(c) {
            let mut tag = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !is_ident_char(c) {
                    break;
                }
                tag.push(c);
                chars.next();
            }
            compound.tag = Some(tag);
        } else if c != '#' && c != '.' {
            return Err(unexpected(c, start));
        }

        while let Some(&(at, sigil)) = chars.peek() {
            if sigil != '#' && sigil != '.' {
                break;
            }
            chars.next();
            let mut name = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if !is_ident_char(c) {
                    break;
                }
                name.push(c);
                chars.next();
            }
            if name.is_empty() {
                return Err(unexpected(sigil, at));
            }
            if sigil == '#' {
                compound.id = Some(name);
            } else {
                compound.classes.push(name);
            }
        }

        if let Some(&(at, c)) = chars.peek() {
            if !c.is_whitespace() {
                return Err(unexpected(c, at));
            }
        }
        chain.push(compound);
    }
    Ok(chain)
}

/// Right-to-left: the subject must match the element itself, every earlier
/// compound must match some ancestor further out than the previous match.
fn chain_matches(chain: &[CompoundSelector], target: &EventTarget) -> bool {
    let Some((subject, ancestors)) = chain.split_last() else {
        return false;
    };
    if !subject.matches(&target.element) {
        return false;
    }
    let mut remaining = target.ancestors.iter();
    ancestors
        .iter()
        .rev()
        .all(|wanted| remaining.any(|element| wanted.matches(element)))
}
