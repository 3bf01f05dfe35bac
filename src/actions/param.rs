//! Action parameters and positional type checking
//!
//! Every action is built from a keyword and an ordered [`ParameterList`].
//! Constructors read the list with a [`ParamChecker`], which validates each
//! parameter against a [`ParamType`] mask and produces a descriptive
//! [`ActionError`] naming the offending value on mismatch.

use bitflags::bitflags;
use std::fmt;

use super::error::ActionError;
use super::ActionRef;

bitflags! {
    /// Parameter type tags, combined into masks when several types are accepted
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ParamType: u8 {
        const STRING = 1 << 0;
        const INT = 1 << 1;
        const FLOAT = 1 << 2;
        const RANGE = 1 << 3;
        const ACTION = 1 << 4;

        const NUMBER = Self::INT.bits() | Self::FLOAT.bits();
    }
}

/// Comparison used by a range condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeOp {
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl RangeOp {
    pub fn as_str(self) -> &'static str {
        match self {
            RangeOp::Less => "<",
            RangeOp::LessOrEqual => "<=",
            RangeOp::Greater => ">",
            RangeOp::GreaterOrEqual => ">=",
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range condition such as `LT > 0.5`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeParam {
    /// Name of the axis or trigger being compared
    pub axis: String,
    pub op: RangeOp,
    pub value: f64,
}

impl fmt::Display for RangeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.axis, self.op, self.value)
    }
}

/// One action parameter
///
/// Cloning an `Action` parameter acquires another reference to the child.
#[derive(Debug, Clone)]
pub enum Parameter {
    String(String),
    Int(i64),
    Float(f64),
    Range(RangeParam),
    Action(ActionRef),
}

/// Ordered parameters, consumed positionally by constructors
pub type ParameterList = Vec<Parameter>;

impl Parameter {
    pub fn param_type(&self) -> ParamType {
        match self {
            Parameter::String(_) => ParamType::STRING,
            Parameter::Int(_) => ParamType::INT,
            Parameter::Float(_) => ParamType::FLOAT,
            Parameter::Range(_) => ParamType::RANGE,
            Parameter::Action(_) => ParamType::ACTION,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Parameter::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Parameter::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float` parameter
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Parameter::Int(i) => Some(*i as f64),
            Parameter::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeParam> {
        match self {
            Parameter::Range(r) => Some(r),
            _ => None,
        }
    }

    /// Borrow the child action without acquiring a reference
    pub fn as_action(&self) -> Option<&ActionRef> {
        match self {
            Parameter::Action(a) => Some(a),
            _ => None,
        }
    }
}

/// Whether `s` can be written without quotes and read back as a string
fn is_bare_word(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && s != "None"
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::String(s) if is_bare_word(s) => f.write_str(s),
            Parameter::String(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    if c == '\'' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("'")
            },
            Parameter::Int(i) => write!(f, "{}", i),
            Parameter::Float(v) => write!(f, "{:?}", v),
            Parameter::Range(r) => write!(f, "{}", r),
            Parameter::Action(a) => write!(f, "{}", a),
        }
    }
}

/// Human-readable list of the types in a mask, for error messages
fn describe(expected: ParamType) -> String {
    let names: Vec<&str> = [
        (ParamType::STRING, "string"),
        (ParamType::INT, "integer"),
        (ParamType::FLOAT, "float"),
        (ParamType::RANGE, "range"),
        (ParamType::ACTION, "action"),
    ]
    .iter()
    .filter(|(t, _)| expected.contains(*t))
    .map(|(_, name)| *name)
    .collect();
    names.join(" or ")
}

/// Positional reader over a parameter list
///
/// Borrows the list; constructors acquire their own references to whatever
/// they keep.
pub struct ParamChecker<'a> {
    keyword: &'a str,
    params: &'a [Parameter],
    pos: usize,
}

impl<'a> ParamChecker<'a> {
    pub fn new(keyword: &'a str, params: &'a [Parameter]) -> Self {
        Self {
            keyword,
            params,
            pos: 0,
        }
    }

    /// Parameter at the read position, without advancing
    fn current(&self, expected: ParamType) -> Result<&'a Parameter, ActionError> {
        self.params.get(self.pos).ok_or_else(|| {
            ActionError::invalid_count(
                self.keyword,
                format!(
                    "{} expects {} as parameter {}",
                    self.keyword,
                    describe(expected),
                    self.pos + 1
                ),
            )
        })
    }

    fn mismatch(&self, expected: ParamType, param: &Parameter) -> ActionError {
        ActionError::invalid_type(
            self.keyword,
            format!(
                "{} cannot take {} as parameter {} (expected {})",
                self.keyword,
                param,
                self.pos + 1,
                describe(expected)
            ),
        )
    }

    /// Read the next parameter, which must match `expected`
    pub fn next(&mut self, expected: ParamType) -> Result<&'a Parameter, ActionError> {
        let param = self.current(expected)?;
        if !expected.intersects(param.param_type()) {
            return Err(self.mismatch(expected, param));
        }
        self.pos += 1;
        Ok(param)
    }

    /// Read the next parameter only if it matches `expected`
    pub fn optional(&mut self, expected: ParamType) -> Option<&'a Parameter> {
        let param = self.params.get(self.pos)?;
        if expected.intersects(param.param_type()) {
            self.pos += 1;
            Some(param)
        } else {
            None
        }
    }

    pub fn next_string(&mut self) -> Result<&'a str, ActionError> {
        let param = self.current(ParamType::STRING)?;
        let Parameter::String(s) = param else {
            return Err(self.mismatch(ParamType::STRING, param));
        };
        self.pos += 1;
        Ok(s)
    }

    pub fn next_action(&mut self) -> Result<&'a ActionRef, ActionError> {
        let param = self.current(ParamType::ACTION)?;
        let Parameter::Action(a) = param else {
            return Err(self.mismatch(ParamType::ACTION, param));
        };
        self.pos += 1;
        Ok(a)
    }

    /// Fail if any parameters were left unread
    pub fn finish(&self) -> Result<(), ActionError> {
        if self.pos < self.params.len() {
            return Err(ActionError::invalid_count(
                self.keyword,
                format!(
                    "{} takes at most {} parameter(s), got {}",
                    self.keyword,
                    self.pos,
                    self.params.len()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::error::ActionErrorCode;

    fn params() -> ParameterList {
        vec![
            Parameter::String("KEY_A".to_string()),
            Parameter::Float(0.5),
            Parameter::Int(3),
        ]
    }

    #[test]
    fn test_reads_in_order() {
        let params = params();
        let mut checker = ParamChecker::new("test", &params);

        assert_eq!(checker.next_string().unwrap(), "KEY_A");
        assert_eq!(checker.next(ParamType::NUMBER).unwrap().as_float(), Some(0.5));
        assert_eq!(checker.next(ParamType::NUMBER).unwrap().as_int(), Some(3));
        assert!(checker.finish().is_ok());
    }

    #[test]
    fn test_type_mismatch_names_value() {
        let params = params();
        let mut checker = ParamChecker::new("test", &params);

        let err = checker.next(ParamType::ACTION).unwrap_err();
        assert_eq!(err.code(), ActionErrorCode::InvalidParameterType);
        assert!(err.to_string().contains("KEY_A"), "message was: {}", err);
        assert!(err.to_string().contains("action"));
    }

    #[test]
    fn test_missing_and_extra_parameters() {
        let params = params();

        let mut checker = ParamChecker::new("test", &params[..1]);
        checker.next_string().unwrap();
        let err = checker.next(ParamType::NUMBER).unwrap_err();
        assert_eq!(err.code(), ActionErrorCode::InvalidNumberOfParameters);

        let mut checker = ParamChecker::new("test", &params);
        checker.next_string().unwrap();
        let err = checker.finish().unwrap_err();
        assert_eq!(err.code(), ActionErrorCode::InvalidNumberOfParameters);
    }

    #[test]
    fn test_typed_readers_reject_other_variants() {
        let params = params();
        let mut checker = ParamChecker::new("test", &params);

        let err = checker.next_action().unwrap_err();
        assert_eq!(err.code(), ActionErrorCode::InvalidParameterType);
        assert_eq!(
            err.to_string(),
            "test cannot take KEY_A as parameter 1 (expected action)"
        );

        // A rejected parameter stays unread
        assert_eq!(checker.next_string().unwrap(), "KEY_A");
        let err = checker.next_string().unwrap_err();
        assert_eq!(err.code(), ActionErrorCode::InvalidParameterType);
        assert!(err.to_string().contains("parameter 2"), "message was: {}", err);
    }

    #[test]
    fn test_optional_does_not_consume_mismatch() {
        let params = params();
        let mut checker = ParamChecker::new("test", &params);

        assert!(checker.optional(ParamType::NUMBER).is_none());
        assert!(checker.optional(ParamType::STRING).is_some());
        assert!(checker.optional(ParamType::FLOAT).is_some());
    }

    #[test]
    fn test_display_quotes_only_when_needed() {
        assert_eq!(Parameter::String("KEY_A".into()).to_string(), "KEY_A");
        assert_eq!(Parameter::String("two words".into()).to_string(), "'two words'");
        assert_eq!(Parameter::String("it's".into()).to_string(), "'it\\'s'");
        assert_eq!(Parameter::String("None".into()).to_string(), "'None'");
        assert_eq!(Parameter::Float(1.0).to_string(), "1.0");
        assert_eq!(Parameter::Int(-4).to_string(), "-4");

        let range = RangeParam {
            axis: "LT".to_string(),
            op: RangeOp::GreaterOrEqual,
            value: 0.25,
        };
        assert_eq!(Parameter::Range(range).to_string(), "LT >= 0.25");
    }
}
