//! `{placeholder}` templates.

use crate::core::metadata::{is_known_key, ResolvedAttributes};
use crate::error::TemplateError;

/// One parsed piece of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed naming template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NamingTemplate {
    /// Parse and validate a template
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let unbalanced = || TemplateError::Unbalanced {
            template: template.to_string(),
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => return Err(unbalanced()),
                            Some(other) => name.push(other),
                        }
                    }
                    if !is_known_key(&name) {
                        return Err(TemplateError::UnknownPlaceholder {
                            name,
                            template: template.to_string(),
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => return Err(unbalanced()),
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn uses(&self, key: &str) -> bool {
        self.placeholders().any(|name| name == key)
    }

    /// Substitute attribute values.
    ///
    /// Fails when an attribute the template names (a GPS field, say) is not
    /// present for this file.
    pub fn render(&self, attrs: &ResolvedAttributes) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.source.len() * 2);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = attrs.get(name).ok_or_else(|| TemplateError::MissingValue {
                        name: name.clone(),
                        template: self.source.clone(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

impl std::fmt::Display for NamingTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}
