//! Tokenizer and recursive-descent parser for the supported XPath subset.

use crate::{Result, XmlError};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    At,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    DotDot,
    Star,
    Op(CmpOp),
    Literal(String),
    Number(f64),
    Name(String),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Function {
    Not,
    Count,
    Sum,
    String,
    Number,
    Boolean,
    True,
    False,
    Contains,
    Concat,
    Position,
    Last,
}

impl Function {
    fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "not" => Self::Not,
            "count" => Self::Count,
            "sum" => Self::Sum,
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "true" => Self::True,
            "false" => Self::False,
            "contains" => Self::Contains,
            "concat" => Self::Concat,
            "position" => Self::Position,
            "last" => Self::Last,
            _ => return None,
        })
    }

    /// Accepted argument counts, inclusive.
    fn arity(self) -> (usize, usize) {
        match self {
            Self::True | Self::False | Self::Position | Self::Last => (0, 0),
            Self::String | Self::Number => (0, 1),
            Self::Not | Self::Count | Self::Sum | Self::Boolean => (1, 1),
            Self::Contains => (2, 2),
            Self::Concat => (2, usize::MAX),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    Literal(String),
    Number(f64),
    Call(Function, Vec<Expr>),
    Path(Path),
}

#[derive(Debug, Clone)]
pub(crate) struct Path {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone)]
pub(crate) struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Axis {
    Child,
    Attribute,
    SelfNode,
    Parent,
    DescendantOrSelf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeTest {
    Name(String),
    Any,
    Text,
    Node,
}

impl Step {
    fn descendant_or_self() -> Self {
        Self {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

fn tokenize(src: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '/' if next == Some('/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
                continue;
            }
            '/' => tokens.push(Token::Slash),
            '@' => tokens.push(Token::At),
            '[' => tokens.push(Token::LBracket),
            ']' => tokens.push(Token::RBracket),
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            ',' => tokens.push(Token::Comma),
            '*' => tokens.push(Token::Star),
            '=' => tokens.push(Token::Op(CmpOp::Eq)),
            '!' if next == Some('=') => {
                tokens.push(Token::Op(CmpOp::Ne));
                i += 2;
                continue;
            }
            '<' | '>' => {
                let op = match (c, next == Some('=')) {
                    ('<', false) => CmpOp::Lt,
                    ('<', true) => CmpOp::Le,
                    (_, false) => CmpOp::Gt,
                    (_, true) => CmpOp::Ge,
                };
                tokens.push(Token::Op(op));
                i += if next == Some('=') { 2 } else { 1 };
                continue;
            }
            '.' if next == Some('.') => {
                tokens.push(Token::DotDot);
                i += 2;
                continue;
            }
            '.' if !next.is_some_and(|n| n.is_ascii_digit()) => tokens.push(Token::Dot),
            '\'' | '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&ch| ch == c)
                    .ok_or_else(|| XmlError::xpath(src, "unterminated string literal"))?;
                tokens.push(Token::Literal(chars[i + 1..i + 1 + end].iter().collect()));
                i += end + 2;
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let len = chars[i..]
                    .iter()
                    .take_while(|ch| ch.is_ascii_digit() || **ch == '.')
                    .count();
                let text: String = chars[i..i + len].iter().collect();
                let num = text
                    .parse::<f64>()
                    .map_err(|_| XmlError::xpath(src, format!("bad number '{text}'")))?;
                tokens.push(Token::Number(num));
                i += len;
                continue;
            }
            c if c.is_alphabetic() || c == '_' => {
                let len = chars[i..]
                    .iter()
                    .take_while(|ch| ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':'))
                    .count();
                tokens.push(Token::Name(chars[i..i + len].iter().collect()));
                i += len;
                continue;
            }
            other => {
                return Err(XmlError::xpath(src, format!("unexpected character '{other}'")));
            }
        }
        i += 1;
    }
    Ok(tokens)
}

/// Deepest nesting of parentheses, predicates and function arguments.
pub(crate) const MAX_NESTING: usize = 64;

/// Parses an expression into its syntax tree.
pub(crate) fn parse(src: &str) -> Result<Expr> {
    let mut parser = Parser {
        src,
        tokens: tokenize(src)?,
        pos: 0,
        depth: 0,
    };
    if parser.tokens.is_empty() {
        return Err(XmlError::xpath(src, "empty expression"));
    }
    let expr = parser.or_expr()?;
    if let Some(tok) = parser.peek() {
        return Err(XmlError::xpath(src, format!("unexpected {tok:?}")));
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn error(&self, reason: impl Into<String>) -> XmlError {
        XmlError::xpath(self.src, reason)
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        match self.next() {
            Some(ref tok) if tok == expected => Ok(()),
            Some(tok) => Err(self.error(format!("expected {expected:?}, found {tok:?}"))),
            None => Err(self.error(format!("expected {expected:?} at end of input"))),
        }
    }

    fn at_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == word)
    }

    fn or_expr(&mut self) -> Result<Expr> {
        if self.depth >= MAX_NESTING {
            return Err(self.error(format!("nested deeper than {MAX_NESTING} levels")));
        }
        self.depth += 1;
        let expr = self.or_chain();
        self.depth -= 1;
        expr
    }

    fn or_chain(&mut self) -> Result<Expr> {
        let mut left = self.and_expr()?;
        while self.at_keyword("or") {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr> {
        let mut left = self.equality()?;
        while self.at_keyword("and") {
            self.pos += 1;
            let right = self.equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr> {
        let mut left = self.relational()?;
        while let Some(Token::Op(op @ (CmpOp::Eq | CmpOp::Ne))) = self.peek().cloned() {
            self.pos += 1;
            let right = self.relational()?;
            left = Expr::Cmp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn relational(&mut self) -> Result<Expr> {
        let mut left = self.primary()?;
        while let Some(Token::Op(op @ (CmpOp::Lt | CmpOp::Gt | CmpOp::Le | CmpOp::Ge))) =
            self.peek().cloned()
        {
            self.pos += 1;
            let right = self.primary()?;
            left = Expr::Cmp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.peek().cloned() {
            Some(Token::Literal(text)) => {
                self.pos += 1;
                Ok(Expr::Literal(text))
            }
            Some(Token::Number(num)) => {
                self.pos += 1;
                Ok(Expr::Number(num))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.or_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Name(name))
                if self.peek_at(1) == Some(&Token::LParen) && name != "text" && name != "node" =>
            {
                let func = Function::lookup(&name)
                    .ok_or_else(|| self.error(format!("unknown function {name}()")))?;
                self.pos += 2;
                let mut args = Vec::new();
                if self.peek() != Some(&Token::RParen) {
                    args.push(self.or_expr()?);
                    while self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        args.push(self.or_expr()?);
                    }
                }
                self.expect(&Token::RParen)?;
                let (min, max) = func.arity();
                if args.len() < min || args.len() > max {
                    return Err(self.error(format!(
                        "{name}() does not take {} argument(s)",
                        args.len()
                    )));
                }
                Ok(Expr::Call(func, args))
            }
            Some(_) => Ok(Expr::Path(self.path()?)),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::At | Token::Dot | Token::DotDot | Token::Star | Token::Name(_))
        )
    }

    fn path(&mut self) -> Result<Path> {
        let mut path = Path {
            absolute: false,
            steps: Vec::new(),
        };
        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                path.absolute = true;
                if !self.starts_step() {
                    return Ok(path);
                }
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                path.absolute = true;
                path.steps.push(Step::descendant_or_self());
            }
            _ => {}
        }
        path.steps.push(self.step()?);
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.pos += 1;
                }
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    path.steps.push(Step::descendant_or_self());
                }
                _ => break,
            }
            path.steps.push(self.step()?);
        }
        Ok(path)
    }

    fn step(&mut self) -> Result<Step> {
        let (axis, test) = match self.next() {
            Some(Token::Dot) => (Axis::SelfNode, NodeTest::Node),
            Some(Token::DotDot) => (Axis::Parent, NodeTest::Node),
            Some(Token::Star) => (Axis::Child, NodeTest::Any),
            Some(Token::At) => match self.next() {
                Some(Token::Name(name)) => (Axis::Attribute, NodeTest::Name(name)),
                Some(Token::Star) => (Axis::Attribute, NodeTest::Any),
                _ => return Err(self.error("expected attribute name after '@'")),
            },
            Some(Token::Name(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    self.expect(&Token::RParen)?;
                    let test = if name == "text" {
                        NodeTest::Text
                    } else {
                        NodeTest::Node
                    };
                    (Axis::Child, test)
                } else {
                    (Axis::Child, NodeTest::Name(name))
                }
            }
            Some(tok) => return Err(self.error(format!("unexpected {tok:?} in location path"))),
            None => return Err(self.error("location path ends abruptly")),
        };
        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            self.pos += 1;
            predicates.push(self.or_expr()?);
            self.expect(&Token::RBracket)?;
        }
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_operators() {
        let tokens = tokenize("a[b >= 2 and c != 'x']").unwrap();
        assert!(tokens.contains(&Token::Op(CmpOp::Ge)));
        assert!(tokens.contains(&Token::Op(CmpOp::Ne)));
        assert!(tokens.contains(&Token::Literal("x".into())));
    }

    #[test]
    fn test_parse_nested_predicates() {
        let expr =
            parse("/people/person[links/link[@rel='github' and @href='x']]/@id").unwrap();
        let Expr::Path(path) = expr else {
            panic!("expected a path");
        };
        assert!(path.absolute);
        assert_eq!(path.steps.len(), 3);
        assert_eq!(path.steps[1].predicates.len(), 1);
        assert_eq!(path.steps[2].axis, Axis::Attribute);
    }

    #[test]
    fn test_parse_descendant_shortcut() {
        let Expr::Path(path) = parse("//people/person").unwrap() else {
            panic!("expected a path");
        };
        assert_eq!(path.steps[0].axis, Axis::DescendantOrSelf);
        assert_eq!(path.steps.len(), 3);
    }

    #[test]
    fn test_parse_function_calls() {
        assert!(matches!(
            parse("sum(/a/b)").unwrap(),
            Expr::Call(Function::Sum, _)
        ));
        assert!(matches!(
            parse("not(person[@id='x'])").unwrap(),
            Expr::Call(Function::Not, _)
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("/a[").is_err());
        assert!(parse("/a['x").is_err());
        assert!(parse("frobnicate(1)").is_err());
        assert!(parse("not()").is_err());
        assert!(parse("/a/#").is_err());
    }

    #[test]
    fn test_nesting_is_capped() {
        let nested = |n: usize| format!("{}1{}", "(".repeat(n), ")".repeat(n));
        assert!(parse(&nested(MAX_NESTING - 1)).is_ok());
        let err = parse(&nested(10_000)).unwrap_err();
        assert!(err.to_string().contains("nested deeper"));
        let predicates = format!("a{}", "[b".repeat(5_000));
        assert!(parse(&predicates).is_err());
    }
}
