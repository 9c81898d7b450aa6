//! Arithmetic tools.

use tracing::debug;

/// Characters accepted by [`advanced_calculator`].
const EXPRESSION_CHARS: &str = "0123456789+-*/.() ";

/// Perform a basic arithmetic operation on two numbers.
///
/// Division by zero yields signed infinity (`+inf` only when `a > 0`).
/// Modulo by zero, a power that overflows and unknown operations yield NaN.
pub fn calculator(operation: &str, a: f64, b: f64) -> f64 {
    match operation {
        "add" => a + b,
        "subtract" => a - b,
        "multiply" => a * b,
        "divide" => {
            if b == 0.0 {
                if a > 0.0 {
                    f64::INFINITY
                } else {
                    f64::NEG_INFINITY
                }
            } else {
                a / b
            }
        }
        "power" => checked_pow(a, b),
        "modulo" => {
            if b == 0.0 {
                f64::NAN
            } else {
                floored_mod(a, b)
            }
        }
        _ => f64::NAN,
    }
}

/// `base` raised to `exponent`, NaN on overflow or a zero base with a
/// negative exponent.
fn checked_pow(base: f64, exponent: f64) -> f64 {
    let value = base.powf(exponent);
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

/// Modulo whose result takes the sign of the divisor.
fn floored_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

/// Evaluate an arithmetic expression.
///
/// Supports `+ - * / // **`, unary signs and parentheses. Anything else,
/// including division by zero, evaluates to NaN.
pub fn advanced_calculator(expression: &str) -> f64 {
    if !expression.chars().all(|c| EXPRESSION_CHARS.contains(c)) {
        debug!("Rejected expression with disallowed characters: {}", expression);
        return f64::NAN;
    }

    let tokens = match tokenize(expression) {
        Some(tokens) => tokens,
        None => return f64::NAN,
    };

    let mut parser = Parser { tokens, pos: 0 };
    match parser.expr() {
        Some(value) if parser.pos == parser.tokens.len() => value,
        _ => f64::NAN,
    }
}

/// Render a number the way it is reported back to the model.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value == f64::INFINITY {
        "inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-inf".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Option<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::DoubleStar);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            _ => {
                let start = i;
                let mut seen_dot = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    if chars[i] == '.' {
                        if seen_dot {
                            return None;
                        }
                        seen_dot = true;
                    }
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                if literal.is_empty() || literal == "." {
                    return None;
                }
                tokens.push(Token::Number(literal.parse().ok()?));
            }
        }
    }

    Some(tokens)
}

/// Recursive-descent evaluator. Every method returns `None` on a syntax or
/// arithmetic error.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    // expr := term (("+" | "-") term)*
    fn expr(&mut self) -> Option<f64> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = if op == Token::Plus { value + rhs } else { value - rhs };
        }
        Some(value)
    }

    // term := unary (("*" | "/" | "//") unary)*
    fn term(&mut self) -> Option<f64> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash)) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            value = match op {
                Token::Star => value * rhs,
                _ if rhs == 0.0 => return None,
                Token::Slash => value / rhs,
                _ => (value / rhs).floor(),
            };
        }
        Some(value)
    }

    // unary := ("+" | "-") unary | power
    fn unary(&mut self) -> Option<f64> {
        match self.peek() {
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            Some(Token::Minus) => {
                self.pos += 1;
                self.unary().map(|v| -v)
            }
            _ => self.power(),
        }
    }

    // power := primary ("**" unary)?
    fn power(&mut self) -> Option<f64> {
        let base = self.primary()?;
        if self.peek() == Some(Token::DoubleStar) {
            self.pos += 1;
            let exponent = self.unary()?;
            let value = checked_pow(base, exponent);
            return if value.is_nan() { None } else { Some(value) };
        }
        Some(base)
    }

    fn primary(&mut self) -> Option<f64> {
        match self.advance()? {
            Token::Number(n) => Some(n),
            Token::LParen => {
                let value = self.expr()?;
                match self.advance()? {
                    Token::RParen => Some(value),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculator_operations() {
        assert_eq!(calculator("add", 15.0, 28.0), 43.0);
        assert_eq!(calculator("subtract", 10.0, 4.5), 5.5);
        assert_eq!(calculator("multiply", 15.0, 23.0), 345.0);
        assert_eq!(calculator("divide", 7.0, 2.0), 3.5);
        assert_eq!(calculator("power", 2.0, 10.0), 1024.0);
        assert_eq!(calculator("modulo", 7.0, 3.0), 1.0);
    }

    #[test]
    fn test_calculator_edge_cases() {
        assert_eq!(calculator("divide", 5.0, 0.0), f64::INFINITY);
        assert_eq!(calculator("divide", -5.0, 0.0), f64::NEG_INFINITY);
        assert_eq!(calculator("divide", 0.0, 0.0), f64::NEG_INFINITY);
        assert!(calculator("modulo", 5.0, 0.0).is_nan());
        assert!(calculator("sqrt", 4.0, 0.0).is_nan());
    }

    #[test]
    fn test_modulo_takes_divisor_sign() {
        assert_eq!(calculator("modulo", -7.0, 3.0), 2.0);
        assert_eq!(calculator("modulo", 7.0, -3.0), -2.0);
    }

    #[test]
    fn test_advanced_calculator() {
        assert_eq!(advanced_calculator("2 + 3 * 4"), 14.0);
        assert_eq!(advanced_calculator("(2 + 3) * 4"), 20.0);
        assert_eq!(advanced_calculator("7 / 2"), 3.5);
        assert_eq!(advanced_calculator("7 // 2"), 3.0);
        assert_eq!(advanced_calculator("-7 // 2"), -4.0);
        assert_eq!(advanced_calculator("2 ** 3 ** 2"), 512.0);
        assert_eq!(advanced_calculator("-2 ** 2"), -4.0);
        assert_eq!(advanced_calculator("2 ** -1"), 0.5);
        assert_eq!(advanced_calculator(".5 + 1."), 1.5);
    }

    #[test]
    fn test_advanced_calculator_rejects_bad_input() {
        assert!(advanced_calculator("import os").is_nan());
        assert!(advanced_calculator("2 % 3").is_nan());
        assert!(advanced_calculator("1 / 0").is_nan());
        assert!(advanced_calculator("(1 + 2").is_nan());
        assert!(advanced_calculator("1 2").is_nan());
        assert!(advanced_calculator("1.2.3").is_nan());
        assert!(advanced_calculator("").is_nan());
        assert!(advanced_calculator("2 * * 3").is_nan());
    }

    #[test]
    fn test_power_overflow_is_nan() {
        assert!(calculator("power", 10.0, 400.0).is_nan());
        assert!(calculator("power", 0.0, -1.0).is_nan());
        assert!(advanced_calculator("10 ** 400").is_nan());
        assert!(advanced_calculator("0 ** -1").is_nan());
        assert_eq!(calculator("power", 2.0, -1.0), 0.5);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(345.0), "345.0");
        assert_eq!(format_number(3.5), "3.5");
        assert_eq!(format_number(f64::NAN), "nan");
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(f64::NEG_INFINITY), "-inf");
    }
}
