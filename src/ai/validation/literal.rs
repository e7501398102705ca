//! Relaxed Literal Parser
//!
//! Hand-written recursive-descent parser shared by two recovery tiers:
//!
//! - **Lenient**: a JSON5 subset. Trailing commas, unquoted identifier keys,
//!   single-quoted strings, `//` and `/* */` comments, leading `+`, hex
//!   integers, `.5` / `5.` decimals, `Infinity` / `NaN` (mapped to `null`).
//! - **Expression**: the lenient grammar plus `undefined`, backtick strings
//!   (no interpolation), parentheses and binary `+ - * /`.
//!
//! The expression grammar is evaluated, never executed: there are no
//! identifiers other than literals, no calls and no member access. Work is
//! bounded by a nesting limit, an input size limit and a cooperative deadline.

use serde_json::{Map, Number, Value};
use thiserror::Error;

use crate::ai::timeout::Deadline;
use crate::constants::parser::DEADLINE_CHECK_INTERVAL;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("{message} at offset {offset}")]
    Syntax { offset: usize, message: String },

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("input of {len} bytes exceeds limit of {max} bytes")]
    TooLarge { len: usize, max: usize },

    #[error("evaluation deadline exceeded")]
    DeadlineExceeded,
}

/// Which grammar the parser accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grammar {
    Lenient,
    Expression,
}

/// Resource bounds for one parse
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_depth: usize,
    pub max_input_bytes: usize,
    pub deadline: Deadline,
}

/// Parse `text` with the JSON5-subset grammar
pub fn parse_lenient(text: &str, max_depth: usize) -> Result<Value, LiteralError> {
    let limits = Limits {
        max_depth,
        max_input_bytes: usize::MAX,
        deadline: Deadline::none(),
    };
    LiteralParser::new(text, Grammar::Lenient, limits).parse_document()
}

/// Evaluate `text` as a capability-free object-literal expression
pub fn evaluate_expression(text: &str, limits: Limits) -> Result<Value, LiteralError> {
    if text.len() > limits.max_input_bytes {
        return Err(LiteralError::TooLarge {
            len: text.len(),
            max: limits.max_input_bytes,
        });
    }
    LiteralParser::new(text, Grammar::Expression, limits).parse_document()
}

// =============================================================================
// Operands
// =============================================================================

/// Intermediate result; arithmetic needs raw numbers and `undefined`
#[derive(Debug, Clone)]
enum Operand {
    Num(f64),
    Str(String),
    Undefined,
    Json(Value),
}

impl Operand {
    fn into_value(self) -> Value {
        match self {
            Operand::Num(n) => number_value(n),
            Operand::Str(s) => Value::String(s),
            Operand::Undefined => Value::Null,
            Operand::Json(v) => v,
        }
    }

    fn to_display(&self) -> String {
        match self {
            Operand::Num(n) => format_number(*n),
            Operand::Str(s) => s.clone(),
            Operand::Undefined => "undefined".to_string(),
            Operand::Json(Value::Null) => "null".to_string(),
            Operand::Json(Value::Bool(b)) => b.to_string(),
            Operand::Json(Value::Number(n)) => n.to_string(),
            Operand::Json(Value::String(s)) => s.clone(),
            Operand::Json(Value::Array(_)) => String::new(),
            Operand::Json(Value::Object(_)) => "[object Object]".to_string(),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Operand::Num(n) => Some(*n),
            Operand::Json(Value::Number(n)) => n.as_f64(),
            Operand::Json(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
            Operand::Json(Value::Null) => Some(0.0),
            _ => None,
        }
    }
}

/// Integral finite values become JSON integers; non-finite become `null`
fn number_value(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn format_number(n: f64) -> String {
    match number_value(n) {
        Value::Number(num) => num.to_string(),
        _ if n.is_nan() => "NaN".to_string(),
        _ if n > 0.0 => "Infinity".to_string(),
        _ => "-Infinity".to_string(),
    }
}

// =============================================================================
// Parser
// =============================================================================

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    grammar: Grammar,
    limits: Limits,
    depth: usize,
    ticks: usize,
}

impl LiteralParser {
    fn new(text: &str, grammar: Grammar, limits: Limits) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            grammar,
            limits,
            depth: 0,
            ticks: 0,
        }
    }

    fn parse_document(mut self) -> Result<Value, LiteralError> {
        self.skip_trivia()?;
        if self.at_end() {
            return Err(self.error("empty input"));
        }

        let operand = match self.grammar {
            Grammar::Lenient => self.parse_primary()?,
            Grammar::Expression => self.parse_additive()?,
        };

        self.skip_trivia()?;
        if self.grammar == Grammar::Expression {
            while self.peek() == Some(';') {
                self.pos += 1;
                self.skip_trivia()?;
            }
        }
        if !self.at_end() {
            return Err(self.error("unexpected trailing characters"));
        }

        match operand {
            Operand::Undefined => Err(self.error("expression evaluated to undefined")),
            other => Ok(other.into_value()),
        }
    }

    // -------------------------------------------------------------------------
    // Expression grammar
    // -------------------------------------------------------------------------

    fn parse_additive(&mut self) -> Result<Operand, LiteralError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_trivia()?;
            let op = match self.peek() {
                Some(c @ ('+' | '-')) => c,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = if op == '+' {
                add(left, right)
            } else {
                arith(&left, &right, |a, b| a - b)
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Operand, LiteralError> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_trivia()?;
            let op = match self.peek() {
                Some(c @ ('*' | '/')) => c,
                _ => return Ok(left),
            };
            // `//` and `/*` are comments, handled by skip_trivia
            self.pos += 1;
            let right = self.parse_unary()?;
            left = if op == '*' {
                arith(&left, &right, |a, b| a * b)
            } else {
                arith(&left, &right, |a, b| a / b)
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Operand, LiteralError> {
        self.skip_trivia()?;
        match self.peek() {
            Some(sign @ ('+' | '-')) => {
                self.pos += 1;
                self.enter()?;
                let operand = self.parse_unary();
                self.depth -= 1;
                let n = operand?.as_number().unwrap_or(f64::NAN);
                Ok(Operand::Num(if sign == '-' { -n } else { n }))
            }
            _ => self.parse_primary(),
        }
    }

    /// Value position; in expression mode members are full expressions
    fn parse_member_value(&mut self) -> Result<Operand, LiteralError> {
        match self.grammar {
            Grammar::Lenient => self.parse_primary(),
            Grammar::Expression => self.parse_additive(),
        }
    }

    // -------------------------------------------------------------------------
    // Primaries
    // -------------------------------------------------------------------------

    fn parse_primary(&mut self) -> Result<Operand, LiteralError> {
        self.tick()?;
        self.skip_trivia()?;

        let Some(c) = self.peek() else {
            return Err(self.error("unexpected end of input"));
        };

        match c {
            '{' => self.parse_object(),
            '[' => self.parse_array(),
            '"' | '\'' => self.parse_string(c).map(Operand::Str),
            '`' if self.grammar == Grammar::Expression => self.parse_string('`').map(Operand::Str),
            '(' if self.grammar == Grammar::Expression => {
                self.pos += 1;
                self.enter()?;
                let inner = self.parse_additive();
                self.depth -= 1;
                let inner = inner?;
                self.skip_trivia()?;
                self.expect(')')?;
                Ok(inner)
            }
            '+' | '-' if self.grammar == Grammar::Lenient => {
                self.pos += 1;
                let n = self.parse_numeric_literal()?;
                Ok(Operand::Num(if c == '-' { -n } else { n }))
            }
            '0'..='9' | '.' => self.parse_number_operand(),
            c if is_ident_start(c) => self.parse_keyword(),
            other => Err(self.error(&format!("unexpected character '{}'", other))),
        }
    }

    fn parse_object(&mut self) -> Result<Operand, LiteralError> {
        self.expect('{')?;
        self.enter()?;
        let mut map = Map::new();

        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error("unterminated object")),
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            let value = self.parse_member_value()?;

            // undefined members are dropped, as a JS serializer would
            if !matches!(value, Operand::Undefined) {
                map.insert(key, value.into_value());
            }

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('}') => {}
                None => return Err(self.error("unterminated object")),
                Some(other) => {
                    return Err(self.error(&format!("expected ',' or '}}', found '{}'", other)));
                }
            }
        }

        self.depth -= 1;
        Ok(Operand::Json(Value::Object(map)))
    }

    fn parse_array(&mut self) -> Result<Operand, LiteralError> {
        self.expect('[')?;
        self.enter()?;
        let mut items = Vec::new();

        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    break;
                }
                None => return Err(self.error("unterminated array")),
                _ => {}
            }

            items.push(self.parse_member_value()?.into_value());

            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                None => return Err(self.error("unterminated array")),
                Some(other) => {
                    return Err(self.error(&format!("expected ',' or ']', found '{}'", other)));
                }
            }
        }

        self.depth -= 1;
        Ok(Operand::Json(Value::Array(items)))
    }

    fn parse_key(&mut self) -> Result<String, LiteralError> {
        match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_string(q),
            Some('`') if self.grammar == Grammar::Expression => self.parse_string('`'),
            Some(c) if is_ident_start(c) => Ok(self.take_identifier()),
            Some('0'..='9') if self.grammar == Grammar::Expression => {
                let n = self.parse_numeric_literal()?;
                Ok(format_number(n))
            }
            Some(other) => Err(self.error(&format!("invalid object key start '{}'", other))),
            None => Err(self.error("unterminated object")),
        }
    }

    fn parse_keyword(&mut self) -> Result<Operand, LiteralError> {
        let start = self.pos;
        let ident = self.take_identifier();
        match ident.as_str() {
            "true" => Ok(Operand::Json(Value::Bool(true))),
            "false" => Ok(Operand::Json(Value::Bool(false))),
            "null" => Ok(Operand::Json(Value::Null)),
            "Infinity" => Ok(Operand::Num(f64::INFINITY)),
            "NaN" => Ok(Operand::Num(f64::NAN)),
            "undefined" if self.grammar == Grammar::Expression => Ok(Operand::Undefined),
            _ => {
                self.pos = start;
                Err(self.error(&format!("unknown identifier '{}'", ident)))
            }
        }
    }

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------

    fn parse_string(&mut self, quote: char) -> Result<String, LiteralError> {
        self.expect(quote)?;
        let mut out = String::new();

        loop {
            let Some(c) = self.bump() else {
                return Err(self.error("unterminated string"));
            };

            match c {
                c if c == quote => return Ok(out),
                '\\' => self.parse_escape(&mut out)?,
                '$' if quote == '`' && self.peek() == Some('{') => {
                    return Err(self.error("template interpolation is not supported"));
                }
                '\n' | '\r' if quote != '`' => {
                    return Err(self.error("unescaped line break in string"));
                }
                c => out.push(c),
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape sequence"));
        };

        match c {
            'b' => out.push('\u{0008}'),
            'f' => out.push('\u{000C}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{000B}'),
            '0' => out.push('\0'),
            'x' => {
                let code = self.take_hex(2)?;
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            'u' => {
                let high = self.take_hex(4)?;
                if (0xD800..0xDC00).contains(&high)
                    && self.peek() == Some('\\')
                    && self.peek_at(1) == Some('u')
                {
                    self.pos += 2;
                    let low = self.take_hex(4)?;
                    let combined = 0x10000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF);
                    out.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                } else {
                    out.push(char::from_u32(high).unwrap_or('\u{FFFD}'));
                }
            }
            // line continuation
            '\n' => {}
            '\r' => {
                if self.peek() == Some('\n') {
                    self.pos += 1;
                }
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn take_hex(&mut self, digits: usize) -> Result<u32, LiteralError> {
        let mut code = 0u32;
        for _ in 0..digits {
            let Some(d) = self.bump().and_then(|c| c.to_digit(16)) else {
                return Err(self.error("invalid hex escape"));
            };
            code = code * 16 + d;
        }
        Ok(code)
    }

    // -------------------------------------------------------------------------
    // Numbers
    // -------------------------------------------------------------------------

    /// Unsigned number literal kept as JSON integer where it was written as one
    fn parse_number_operand(&mut self) -> Result<Operand, LiteralError> {
        let start = self.pos;
        let n = self.parse_numeric_literal()?;
        let text: String = self.chars[start..self.pos].iter().collect();

        let integral = !text.contains(['.', 'e', 'E']) && !text.starts_with("0x");
        if integral && let Ok(u) = text.parse::<u64>() {
            return Ok(Operand::Json(Value::Number(Number::from(u))));
        }
        Ok(Operand::Num(n))
    }

    fn parse_numeric_literal(&mut self) -> Result<f64, LiteralError> {
        let start = self.pos;

        if self.peek() == Some('I') || self.peek() == Some('N') {
            let ident = self.take_identifier();
            return match ident.as_str() {
                "Infinity" => Ok(f64::INFINITY),
                "NaN" => Ok(f64::NAN),
                _ => {
                    self.pos = start;
                    Err(self.error("expected number"))
                }
            };
        }

        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X')) {
            self.pos += 2;
            let digits_start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let digits: String = self.chars[digits_start..self.pos].iter().collect();
            return u64::from_str_radix(&digits, 16)
                .map(|v| v as f64)
                .map_err(|_| self.error("invalid hex literal"));
        }

        let mut saw_digit = false;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            saw_digit = true;
        }
        if self.peek() == Some('.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
                saw_digit = true;
            }
        }
        if !saw_digit {
            self.pos = start;
            return Err(self.error("expected number"));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let exp_start = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            if !self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos = exp_start;
                return Err(self.error("malformed exponent"));
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map_err(|_| self.error(&format!("invalid number '{}'", text)))
    }

    // -------------------------------------------------------------------------
    // Scanning helpers
    // -------------------------------------------------------------------------

    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() || c == '\u{feff}' => self.pos += 1,
                Some('/') if self.peek_at(1) == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let open = self.pos;
                    self.pos += 2;
                    loop {
                        match self.peek() {
                            None => {
                                self.pos = open;
                                return Err(self.error("unterminated block comment"));
                            }
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.pos += 2;
                                break;
                            }
                            Some(_) => self.pos += 1,
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn take_identifier(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_continue) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn expect(&mut self, c: char) -> Result<(), LiteralError> {
        if self.peek() == Some(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", c)))
        }
    }

    fn enter(&mut self) -> Result<(), LiteralError> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(LiteralError::TooDeep(self.limits.max_depth));
        }
        Ok(())
    }

    fn tick(&mut self) -> Result<(), LiteralError> {
        self.ticks += 1;
        if self.ticks % DEADLINE_CHECK_INTERVAL == 0 && self.limits.deadline.expired() {
            return Err(LiteralError::DeadlineExceeded);
        }
        Ok(())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: &str) -> LiteralError {
        LiteralError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn add(left: Operand, right: Operand) -> Operand {
    let stringy = |o: &Operand| {
        matches!(
            o,
            Operand::Str(_)
                | Operand::Json(Value::String(_) | Value::Array(_) | Value::Object(_))
        )
    };
    if stringy(&left) || stringy(&right) {
        return Operand::Str(left.to_display() + &right.to_display());
    }
    arith(&left, &right, |a, b| a + b)
}

fn arith(left: &Operand, right: &Operand, op: impl Fn(f64, f64) -> f64) -> Operand {
    let a = left.as_number().unwrap_or(f64::NAN);
    let b = right.as_number().unwrap_or(f64::NAN);
    Operand::Num(op(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn expr_limits() -> Limits {
        Limits {
            max_depth: 64,
            max_input_bytes: 1024 * 1024,
            deadline: Deadline::after(Duration::from_secs(5)),
        }
    }

    fn eval(text: &str) -> Result<Value, LiteralError> {
        evaluate_expression(text, expr_limits())
    }

    #[test]
    fn test_lenient_relaxed_syntax() {
        let text = r#"{
            // model commentary
            title: 'Hill escape',
            days: 3,
            /* block */ tags: ["a", 'b',],
            ratio: .5,
            whole: 5.,
            hex: 0x1F,
            plus: +2,
        }"#;
        let value = parse_lenient(text, 16).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Hill escape",
                "days": 3,
                "tags": ["a", "b"],
                "ratio": 0.5,
                "whole": 5,
                "hex": 31,
                "plus": 2
            })
        );
    }

    #[test]
    fn test_lenient_non_finite_become_null() {
        let value = parse_lenient("[Infinity, -Infinity, NaN]", 8).unwrap();
        assert_eq!(value, json!([null, null, null]));
    }

    #[test]
    fn test_lenient_rejects_expression_features() {
        assert!(parse_lenient("{a: 1 + 2}", 8).is_err());
        assert!(parse_lenient("{a: undefined}", 8).is_err());
        assert!(parse_lenient("{a: `tpl`}", 8).is_err());
    }

    #[test]
    fn test_lenient_rejects_prose_and_truncation() {
        assert!(parse_lenient("Sure, here: {\"a\":1}", 8).is_err());
        assert!(parse_lenient("{\"a\": \"unterminated", 8).is_err());
        assert!(parse_lenient("", 8).is_err());
    }

    #[test]
    fn test_lenient_escapes() {
        let value = parse_lenient(r#"{'q': 'it\'s é 😀'}"#, 8).unwrap();
        assert_eq!(value["q"], json!("it's é 😀"));
    }

    #[test]
    fn test_depth_limit() {
        let deep = "[".repeat(20) + &"]".repeat(20);
        assert_eq!(parse_lenient(&deep, 10), Err(LiteralError::TooDeep(10)));
        assert!(parse_lenient(&deep, 20).is_ok());
    }

    #[test]
    fn test_expression_arithmetic_and_concat() {
        let value = eval("{total: 800 + 6000, per_day: (1200 * 3) / 2, label: 'Day ' + 1, neg: -(4)}")
            .unwrap();
        assert_eq!(
            value,
            json!({"total": 6800, "per_day": 1800, "label": "Day 1", "neg": -4})
        );
    }

    #[test]
    fn test_expression_undefined_and_backticks() {
        let value = eval("({note: `plain`, skip: undefined, list: [undefined, 1]});").unwrap();
        assert_eq!(value, json!({"note": "plain", "list": [null, 1]}));
    }

    #[test]
    fn test_expression_rejects_capabilities() {
        assert!(eval("{a: process.exit(1)}").is_err());
        assert!(eval("{a: `${secret}`}").is_err());
        assert!(eval("require('fs')").is_err());
        assert!(eval("undefined").is_err());
    }

    #[test]
    fn test_expression_input_limit() {
        let limits = Limits {
            max_input_bytes: 4,
            ..expr_limits()
        };
        assert!(matches!(
            evaluate_expression("{a: 1}", limits),
            Err(LiteralError::TooLarge { len: 6, max: 4 })
        ));
    }

    #[test]
    fn test_expression_deadline() {
        let limits = Limits {
            deadline: Deadline::after(Duration::ZERO),
            ..expr_limits()
        };
        let big = format!("[{}]", vec!["1"; 1000].join(","));
        assert_eq!(
            evaluate_expression(&big, limits),
            Err(LiteralError::DeadlineExceeded)
        );
    }
}
