//! Tokenizer for selector templates.
//!
//! A template is plain text with variable placeholders in two forms, `$NAME` and
//! `${NAME}`. Anything that does not form a valid placeholder stays literal, so regex
//! syntax such as `job.*$` or `a{2}` passes through untouched.

/// A part of a template: either literal text or a variable placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    /// Literal text that requires no further processing.
    Literal(String),
    /// Variable placeholder, `$NAME` or `${NAME}` when `braced` is set.
    Var { name: String, braced: bool },
}

impl TemplatePart {
    /// The text of this part exactly as it was written in the template.
    pub fn source(&self) -> String {
        match self {
            TemplatePart::Literal(text) => text.clone(),
            TemplatePart::Var { name, braced: true } => format!("${{{}}}", name),
            TemplatePart::Var {
                name,
                braced: false,
            } => format!("${}", name),
        }
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

fn is_braced_name_char(ch: char) -> bool {
    is_name_char(ch) || ch == '.'
}

struct TemplateLexer {
    input: Vec<char>,
    pos: usize,
    parts: Vec<TemplatePart>,
    buffer: String,
}

impl TemplateLexer {
    fn new(template: &str) -> Self {
        TemplateLexer {
            input: template.chars().collect(),
            pos: 0,
            parts: Vec::new(),
            buffer: String::new(),
        }
    }

    fn make_parts(mut self) -> Vec<TemplatePart> {
        while let Some(ch) = self.read_char() {
            if ch != '$' {
                self.buffer.push(ch);
                continue;
            }

            match self.peek_char() {
                Some('{') => match self.collect_braced_name() {
                    Some(name) => {
                        self.finalize_literal();
                        self.parts.push(TemplatePart::Var { name, braced: true });
                    }
                    None => self.buffer.push('$'),
                },
                Some(c) if is_name_char(c) => {
                    let name = self.collect_name();
                    self.finalize_literal();
                    self.parts.push(TemplatePart::Var {
                        name,
                        braced: false,
                    });
                }
                _ => self.buffer.push('$'),
            }
        }

        self.finalize_literal();
        self.parts
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    /// Collects a bare `$NAME` placeholder name. The cursor sits right after `$`.
    fn collect_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.pos += 1;
        }
        name
    }

    /// Collects the name inside `${...}`. The cursor sits on the opening brace.
    ///
    /// Returns `None` and leaves the cursor untouched when the braces are unterminated,
    /// empty, or hold a character that can't appear in a name.
    fn collect_braced_name(&mut self) -> Option<String> {
        let mut end = self.pos + 1;
        let mut name = String::new();
        loop {
            match self.input.get(end).copied() {
                Some('}') if !name.is_empty() => break,
                Some(c) if is_braced_name_char(c) => name.push(c),
                _ => return None,
            }
            end += 1;
        }
        self.pos = end + 1;
        Some(name)
    }

    fn finalize_literal(&mut self) {
        if !self.buffer.is_empty() {
            self.parts
                .push(TemplatePart::Literal(std::mem::take(&mut self.buffer)));
        }
    }
}

/// Splits a selector template into literal text and variable placeholders.
///
/// Lexing never fails: malformed placeholders are kept as literal text.
pub fn split_template(template: &str) -> Vec<TemplatePart> {
    TemplateLexer::new(template).make_parts()
}
