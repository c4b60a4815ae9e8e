//! Bytebeat-driven copies
//!
//! A bytebeat formula in `t` is evaluated for `t = 0..count`. Each result
//! is reduced to a byte, normalised to `v` in `[0, 1]` and used to place
//! one copy of the input. Formulas follow JavaScript number semantics:
//! arithmetic on `f64`, bitwise operators on 32-bit integers, comparisons
//! yielding 0 or 1.

use penflow_engine::geometry::{centroid, transform_paths};
use penflow_engine::params::{BytebeatParams, CombineMode};
use penflow_engine::{Affine, ColoredPath, NodeDescriptor, NodeKind, NodeMetadata, Point};

use super::rigid::geometry_input;

/// Drop everything a formula may not contain
pub fn sanitize(formula: &str) -> String {
    formula
        .chars()
        .filter(|c| c.is_ascii_digit() || c.is_whitespace() || "t+-*/%&|^~()<>".contains(*c))
        .collect()
}

/// JavaScript `ToInt32`
pub fn to_int32(v: f64) -> i32 {
    if !v.is_finite() {
        return 0;
    }
    let wrapped = v.trunc().rem_euclid(4_294_967_296.0);
    wrapped as u32 as i32
}

fn to_uint32(v: f64) -> u32 {
    to_int32(v) as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(f64),
    T,
    Op(BinaryOp),
    Tilde,
    LParen,
    RParen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    And,
    Xor,
    Or,
}

impl BinaryOp {
    /// Binding power, higher binds tighter
    fn precedence(self) -> u8 {
        match self {
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 7,
            BinaryOp::Add | BinaryOp::Sub => 6,
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 5,
            BinaryOp::Lt | BinaryOp::Gt => 4,
            BinaryOp::And => 3,
            BinaryOp::Xor => 2,
            BinaryOp::Or => 1,
        }
    }

    fn apply(self, a: f64, b: f64) -> f64 {
        let shift = || to_uint32(b) & 31;
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Rem => a % b,
            BinaryOp::Shl => f64::from(to_int32(a).wrapping_shl(shift())),
            BinaryOp::Shr => f64::from(to_int32(a) >> shift()),
            BinaryOp::UShr => f64::from(to_uint32(a) >> shift()),
            BinaryOp::Lt => f64::from(u8::from(a < b)),
            BinaryOp::Gt => f64::from(u8::from(a > b)),
            BinaryOp::And => f64::from(to_int32(a) & to_int32(b)),
            BinaryOp::Xor => f64::from(to_int32(a) ^ to_int32(b)),
            BinaryOp::Or => f64::from(to_int32(a) | to_int32(b)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl UnaryOp {
    fn apply(self, v: f64) -> f64 {
        match self {
            UnaryOp::Neg => -v,
            UnaryOp::Plus => v,
            UnaryOp::Not => f64::from(!to_int32(v)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Instr {
    Num(f64),
    T,
    Unary(UnaryOp),
    Binary(BinaryOp),
}

/// Parsed formula, stored in postfix order
///
/// Evaluation runs on an explicit value stack, so a long flat chain such as
/// `t+t+...+t` costs heap, not call depth.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    code: Vec<Instr>,
}

impl Expr {
    pub fn eval(&self, t: f64) -> f64 {
        let mut stack: Vec<f64> = Vec::with_capacity(16);
        for instr in &self.code {
            let value = match *instr {
                Instr::Num(n) => n,
                Instr::T => t,
                Instr::Unary(op) => op.apply(stack.pop().unwrap_or(0.0)),
                Instr::Binary(op) => {
                    let rhs = stack.pop().unwrap_or(0.0);
                    let lhs = stack.pop().unwrap_or(0.0);
                    op.apply(lhs, rhs)
                }
            };
            stack.push(value);
        }
        stack.pop().unwrap_or(0.0)
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let (next1, next2) = (chars.get(i + 1).copied(), chars.get(i + 2).copied());
        let (token, width) = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '0'..='9' => {
                let digits: String = chars[i..].iter().take_while(|c| c.is_ascii_digit()).collect();
                let value = digits
                    .parse::<f64>()
                    .map_err(|e| format!("bad number {}: {}", digits, e))?;
                (Token::Num(value), digits.len())
            }
            't' => (Token::T, 1),
            '(' => (Token::LParen, 1),
            ')' => (Token::RParen, 1),
            '~' => (Token::Tilde, 1),
            '+' => (Token::Op(BinaryOp::Add), 1),
            '-' => (Token::Op(BinaryOp::Sub), 1),
            '*' => (Token::Op(BinaryOp::Mul), 1),
            '/' => (Token::Op(BinaryOp::Div), 1),
            '%' => (Token::Op(BinaryOp::Rem), 1),
            '&' => (Token::Op(BinaryOp::And), 1),
            '|' => (Token::Op(BinaryOp::Or), 1),
            '^' => (Token::Op(BinaryOp::Xor), 1),
            '<' if next1 == Some('<') => (Token::Op(BinaryOp::Shl), 2),
            '<' => (Token::Op(BinaryOp::Lt), 1),
            '>' if next1 == Some('>') && next2 == Some('>') => (Token::Op(BinaryOp::UShr), 3),
            '>' if next1 == Some('>') => (Token::Op(BinaryOp::Shr), 2),
            '>' => (Token::Op(BinaryOp::Gt), 1),
            other => return Err(format!("unexpected character {:?}", other)),
        };
        tokens.push(token);
        i += width;
    }
    Ok(tokens)
}

/// Nesting limit for parentheses and prefix operators
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    code: Vec<Instr>,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expression(&mut self, min_precedence: u8) -> Result<(), String> {
        self.prefix()?;
        while let Some(Token::Op(op)) = self.peek() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.bump();
            self.expression(precedence + 1)?;
            self.code.push(Instr::Binary(op));
        }
        Ok(())
    }

    fn unary(&mut self, op: UnaryOp) -> Result<(), String> {
        self.prefix()?;
        self.code.push(Instr::Unary(op));
        Ok(())
    }

    fn prefix(&mut self) -> Result<(), String> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err("formula nested too deeply".to_string());
        }
        let expr = self.operand();
        self.depth -= 1;
        expr
    }

    fn operand(&mut self) -> Result<(), String> {
        match self.bump() {
            Some(Token::Num(n)) => {
                self.code.push(Instr::Num(n));
                Ok(())
            }
            Some(Token::T) => {
                self.code.push(Instr::T);
                Ok(())
            }
            Some(Token::Tilde) => self.unary(UnaryOp::Not),
            Some(Token::Op(BinaryOp::Sub)) => self.unary(UnaryOp::Neg),
            Some(Token::Op(BinaryOp::Add)) => self.unary(UnaryOp::Plus),
            Some(Token::LParen) => {
                self.expression(0)?;
                match self.bump() {
                    Some(Token::RParen) => Ok(()),
                    _ => Err("missing closing parenthesis".to_string()),
                }
            }
            Some(other) => Err(format!("unexpected token {:?}", other)),
            None => Err("unexpected end of formula".to_string()),
        }
    }
}

/// Sanitize and parse a formula
pub fn compile(formula: &str) -> Result<Expr, String> {
    let tokens = tokenize(&sanitize(formula))?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        code: Vec::new(),
    };
    parser.expression(0)?;
    match parser.peek() {
        None => Ok(Expr { code: parser.code }),
        Some(token) => Err(format!("unexpected token {:?}", token)),
    }
}

/// The formula's output byte at `t`, normalised to `[0, 1]`
pub fn sample(expr: &Expr, t: u32) -> f64 {
    let byte = to_int32(expr.eval(f64::from(t))) & 0xFF;
    f64::from(byte) / 255.0
}

pub struct BytebeatNode;

impl BytebeatNode {
    pub fn apply(p: &BytebeatParams, inputs: &[ColoredPath]) -> Vec<ColoredPath> {
        let Some(center) = centroid(inputs) else {
            return Vec::new();
        };
        let expr = match compile(&p.formula) {
            Ok(expr) => expr,
            Err(e) => {
                log::debug!("Bytebeat formula rejected: {}", e);
                return Vec::new();
            }
        };

        (0..p.count)
            .flat_map(|t| {
                let v = sample(&expr, t);
                let step = Affine::translate(f64::from(t) * p.step_x, 0.0);
                let lift = Affine::translate(0.0, (v - 0.5) * p.amplitude);
                let factor = (1.0 + (v - 0.5) * p.scale_range).max(0.01);
                let spin = Affine::rotate_about(v * p.rotation_range, center);
                let grow = Affine::scale_about(factor, factor, center);
                let transform = match p.mode {
                    CombineMode::Position => lift.then(step),
                    CombineMode::Rotation => spin.then(step),
                    CombineMode::Scale => grow.then(step),
                    CombineMode::All => grow.then(spin).then(lift).then(step),
                };
                transform_paths(inputs, &transform)
            })
            .collect()
    }
}

impl NodeDescriptor for BytebeatNode {
    fn descriptor() -> NodeMetadata {
        NodeMetadata::new(
            NodeKind::Bytebeat,
            "Bytebeat",
            "Copies driven by a bytebeat formula in t",
        )
        .with_input(geometry_input())
        .with_geometry_output()
    }
}

inventory::submit!(penflow_engine::DescriptorFn(BytebeatNode::descriptor));

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(formula: &str, t: f64) -> f64 {
        compile(formula).unwrap().eval(t)
    }

    fn dot() -> Vec<ColoredPath> {
        vec![ColoredPath::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            Some(0),
        )]
    }

    #[test]
    fn test_classic_formula() {
        // 300>>5 = 9, 300>>8 = 1, 9|1 = 9
        assert_eq!(eval("t*(t>>5|t>>8)", 300.0), 2700.0);
        let expr = compile("t*(t>>5|t>>8)").unwrap();
        assert_eq!(sample(&expr, 300), 140.0 / 255.0);
    }

    #[test]
    fn test_javascript_semantics() {
        assert_eq!(eval("7/2", 0.0), 3.5);
        assert_eq!(eval("-1>>>28", 0.0), 15.0);
        assert_eq!(eval("-16>>2", 0.0), -4.0);
        assert_eq!(eval("1<<31", 0.0), -2147483648.0);
        assert_eq!(eval("~t", 5.0), -6.0);
        assert_eq!(eval("t<5", 2.0), 1.0);
        assert_eq!(eval("t>5", 2.0), 0.0);
        assert_eq!(eval("-7%3", 0.0), -1.0);
        assert_eq!(eval("1+2*3", 0.0), 7.0);
        // 3&6 = 2, 2^2 = 0, 1|0 = 1
        assert_eq!(eval("1|2^3&6", 0.0), 1.0);
    }

    #[test]
    fn test_to_int32_wraps() {
        assert_eq!(to_int32(4_294_967_296.0 + 5.0), 5);
        assert_eq!(to_int32(2_147_483_648.0), i32::MIN);
        assert_eq!(to_int32(-1.5), -1);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(f64::INFINITY), 0);
    }

    #[test]
    fn test_sanitize_strips_everything_else() {
        assert_eq!(sanitize("alert(t);x=1"), "t(t)1");
        assert_eq!(sanitize("t * (t >> 3)"), "t * (t >> 3)");
        assert!(compile("alert(t)").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(compile(&"(".repeat(10_000)).is_err());
        assert!(compile("(t+1").is_err());
        assert!(compile("").is_err());
        assert!(compile("t t").is_err());
    }

    #[test]
    fn test_long_flat_chain_evaluates() {
        let formula = format!("{}t", "t+".repeat(20_000));
        assert_eq!(eval(&formula, 1.0), 20_001.0);

        let params = BytebeatParams {
            formula,
            count: 1,
            ..BytebeatParams::default()
        };
        assert_eq!(BytebeatNode::apply(&params, &dot()).len(), 1);
    }

    #[test]
    fn test_numbers_past_u64_parse_as_floats() {
        assert_eq!(eval("18446744073709551616", 0.0), 18_446_744_073_709_551_616.0);
        assert_eq!(eval("99999999999999999999999|0", 0.0), f64::from(to_int32(1e23)));
    }

    #[test]
    fn test_position_mode_steps_and_lifts() {
        let params = BytebeatParams {
            formula: "255".to_string(),
            count: 3,
            mode: CombineMode::Position,
            step_x: 5.0,
            amplitude: 10.0,
            ..BytebeatParams::default()
        };
        let out = BytebeatNode::apply(&params, &dot());
        assert_eq!(out.len(), 3);
        assert_eq!(out[2].points[0], Point::new(10.0, 5.0));
        assert_eq!(out[2].color, Some(0));
    }

    #[test]
    fn test_scale_mode_has_floor() {
        let params = BytebeatParams {
            formula: "0".to_string(),
            count: 1,
            mode: CombineMode::Scale,
            scale_range: 10.0,
            ..BytebeatParams::default()
        };
        let out = BytebeatNode::apply(&params, &dot());
        let width = out[0].points[1].x - out[0].points[0].x;
        assert!((width - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_formula_is_empty() {
        let params = BytebeatParams {
            formula: "(((".to_string(),
            ..BytebeatParams::default()
        };
        assert!(BytebeatNode::apply(&params, &dot()).is_empty());
    }
}
