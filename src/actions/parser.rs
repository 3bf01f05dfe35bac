//! Action language parser
//!
//! Turns action text such as
//!
//! ```text
//! mode(LB, button(KEY_LEFTSHIFT), RT > 0.5, axis(ABS_Z), button(KEY_A))
//! ```
//!
//! into an action tree. Grammar:
//!
//! ```text
//! action := IDENT [ '(' [ param { ',' param } ] ')' ]
//! param  := action-call | IDENT CMP NUMBER | NUMBER | STRING | IDENT
//! CMP    := '<' | '<=' | '>' | '>='
//! NUMBER := [ '+' | '-' ] DIGITS [ '.' DIGITS ] [ ( 'e' | 'E' ) [ '+' | '-' ] DIGITS ]
//! ```
//!
//! An identifier followed by `(` is a nested action, built immediately through
//! the registry; followed by a comparison it is a range; otherwise it is a
//! string parameter. A bare `None` parameter is the `NoAction` sentinel.
//!
//! Parameter lists nest at most [`MAX_DEPTH`] deep. Deeper text is a parse
//! error.

use super::error::ActionError;
use super::param::{Parameter, ParameterList, RangeOp, RangeParam};
use super::registry::{self, ActionRegistry};
use super::{no_action, ActionRef, KW_NONE};

/// Deepest allowed nesting of parenthesised parameter lists
pub const MAX_DEPTH: usize = 64;

type ConstructFn<'a> = dyn Fn(&str, &ParameterList) -> Result<ActionRef, ActionError> + 'a;

/// Parse action text using the process-wide registry
pub fn parse_action(text: &str) -> Result<ActionRef, ActionError> {
    let construct = |keyword: &str, params: &ParameterList| registry::construct(keyword, params);
    Parser::new(text, &construct).parse()
}

/// Parse action text using a specific registry
pub fn parse_action_with(
    registry: &ActionRegistry,
    text: &str,
) -> Result<ActionRef, ActionError> {
    let construct = |keyword: &str, params: &ParameterList| registry.construct(keyword, params);
    Parser::new(text, &construct).parse()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    construct: &'a ConstructFn<'a>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, construct: &'a ConstructFn<'a>) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
            construct,
        }
    }

    fn parse(mut self) -> Result<ActionRef, ActionError> {
        self.skip_whitespace();
        let action = self.action()?;
        self.skip_whitespace();
        if self.pos < self.src.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(action)
    }

    fn error(&self, message: impl Into<String>) -> ActionError {
        ActionError::Parse {
            position: self.pos,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.bump();
            },
            _ => return None,
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.bump();
        }
        Some(&self.src[start..self.pos])
    }

    /// Top-level action: a call, or a bare keyword taking no parameters
    fn action(&mut self) -> Result<ActionRef, ActionError> {
        let keyword = self
            .ident()
            .ok_or_else(|| self.error("expected action keyword"))?;
        self.skip_whitespace();
        let params = if self.eat('(') {
            self.nested_params()?
        } else {
            ParameterList::new()
        };
        (self.construct)(keyword, &params)
    }

    fn nested_params(&mut self) -> Result<ParameterList, ActionError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("actions nested too deeply"));
        }
        self.depth += 1;
        let params = self.params();
        self.depth -= 1;
        params
    }

    /// Parameter list after the opening parenthesis, through the closing one
    fn params(&mut self) -> Result<ParameterList, ActionError> {
        let mut params = ParameterList::new();
        self.skip_whitespace();
        if self.eat(')') {
            return Ok(params);
        }
        loop {
            params.push(self.param()?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(')') {
                return Ok(params);
            }
            return Err(self.error("expected ',' or ')'"));
        }
    }

    fn param(&mut self) -> Result<Parameter, ActionError> {
        self.skip_whitespace();
        match self.peek() {
            Some('\'') | Some('"') => self.string().map(Parameter::String),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let word = self
                    .ident()
                    .ok_or_else(|| self.error("expected identifier"))?;
                let after_word = self.pos;
                self.skip_whitespace();

                if self.eat('(') {
                    let params = self.nested_params()?;
                    return (self.construct)(word, &params).map(Parameter::Action);
                }
                if let Some(op) = self.range_op() {
                    self.skip_whitespace();
                    let value = match self.number()? {
                        Parameter::Int(i) => i as f64,
                        Parameter::Float(f) => f,
                        _ => return Err(self.error("expected number after comparison")),
                    };
                    return Ok(Parameter::Range(RangeParam {
                        axis: word.to_string(),
                        op,
                        value,
                    }));
                }

                self.pos = after_word;
                if word == KW_NONE {
                    return Ok(Parameter::Action(no_action()));
                }
                Ok(Parameter::String(word.to_string()))
            },
            Some(c) => Err(self.error(format!("unexpected character '{}'", c))),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn range_op(&mut self) -> Option<RangeOp> {
        if self.eat('<') {
            Some(if self.eat('=') {
                RangeOp::LessOrEqual
            } else {
                RangeOp::Less
            })
        } else if self.eat('>') {
            Some(if self.eat('=') {
                RangeOp::GreaterOrEqual
            } else {
                RangeOp::Greater
            })
        } else {
            None
        }
    }

    fn number(&mut self) -> Result<Parameter, ActionError> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.bump();
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else if c == '.' && !is_float {
                is_float = true;
                self.bump();
            } else {
                break;
            }
        }
        if self.exponent() {
            is_float = true;
        }

        let text = &self.src[start..self.pos];
        let parsed = if is_float {
            text.parse::<f64>().ok().map(Parameter::Float)
        } else {
            text.parse::<i64>().ok().map(Parameter::Int)
        };
        parsed.ok_or_else(|| ActionError::Parse {
            position: start,
            message: format!("invalid number '{}'", text),
        })
    }

    /// Consume an exponent suffix such as `e-7`, if one follows
    fn exponent(&mut self) -> bool {
        let rest = self.src[self.pos..].as_bytes();
        if !matches!(rest.first(), Some(b'e') | Some(b'E')) {
            return false;
        }
        let sign = usize::from(matches!(rest.get(1), Some(b'+') | Some(b'-')));
        let digits = rest[1 + sign..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 {
            return false;
        }
        self.pos += 1 + sign + digits;
        true
    }

    fn string(&mut self) -> Result<String, ActionError> {
        let start = self.pos;
        let quote = self.bump().ok_or_else(|| self.error("expected string"))?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(c) => value.push(c),
                    None => break,
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => break,
            }
        }
        Err(ActionError::Parse {
            position: start,
            message: "unterminated string".to_string(),
        })
    }
}
