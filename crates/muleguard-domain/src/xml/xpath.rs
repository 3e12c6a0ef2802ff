//! An XPath 1.0 subset evaluated over `roxmltree` documents.
//!
//! Supported: absolute and relative location paths, `//`, `.`, `..`, `*`, `prefix:*`, `@attr`,
//! `text()`, `node()`, `comment()`, the common axes, predicates (including positional `[n]`),
//! unions, `or`/`and`, comparisons, `+`/`-`, and a core function library.
//!
//! Unprefixed element names match on local name in any namespace, so `//flow` finds
//! `<mule:flow>` without namespace bindings. Prefixed names resolve the prefix against the
//! namespaces in scope at the candidate node. Unprefixed attribute names only match attributes
//! without a namespace, keeping `@name` apart from `@doc:name`.

use roxmltree::{Document, Node};
use std::cmp::Ordering;

const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XPathError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unterminated string literal")]
    UnterminatedLiteral,
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected {found} at token {pos}")]
    UnexpectedToken { found: String, pos: usize },
    #[error("unknown function {0}()")]
    UnknownFunction(String),
    #[error("{name}() expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },
    #[error("unknown axis {0}")]
    UnknownAxis(String),
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("expression does not evaluate to a node-set")]
    NotANodeSet,
}

/// A compiled expression.
#[derive(Clone, Debug)]
pub struct XPath {
    source: String,
    expr: Expr,
}

impl XPath {
    pub fn parse(source: &str) -> Result<Self, XPathError> {
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        if let Some(tok) = parser.peek() {
            return Err(XPathError::UnexpectedToken {
                found: tok.describe(),
                pos: parser.pos,
            });
        }
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn evaluate<'a, 'i>(&self, doc: &'a Document<'i>) -> Result<Value<'a, 'i>, XPathError> {
        let ctx = Ctx {
            node: XNode::Node(doc.root()),
            position: 1,
            size: 1,
        };
        eval(&self.expr, &ctx)
    }

    /// Selected nodes in document order.
    pub fn select<'a, 'i>(&self, doc: &'a Document<'i>) -> Result<Vec<XNode<'a, 'i>>, XPathError> {
        match self.evaluate(doc)? {
            Value::Nodes(nodes) => Ok(nodes),
            _ => Err(XPathError::NotANodeSet),
        }
    }

    /// Boolean value of the expression: a non-empty node-set, a non-empty string, a non-zero
    /// number.
    pub fn matches(&self, doc: &Document<'_>) -> Result<bool, XPathError> {
        Ok(self.evaluate(doc)?.to_bool())
    }
}

/// A node as seen by XPath: a tree node or an attribute of an element.
#[derive(Clone, Copy, Debug)]
pub enum XNode<'a, 'i> {
    Node(Node<'a, 'i>),
    Attribute(Node<'a, 'i>, usize),
}

impl<'a, 'i> XNode<'a, 'i> {
    fn owner(&self) -> Node<'a, 'i> {
        match self {
            XNode::Node(n) | XNode::Attribute(n, _) => *n,
        }
    }

    fn order_key(&self) -> (usize, usize) {
        match self {
            XNode::Node(n) => (n.id().get() as usize, 0),
            XNode::Attribute(n, i) => (n.id().get() as usize, i + 1),
        }
    }

    fn attribute(&self) -> Option<roxmltree::Attribute<'a, 'i>> {
        match self {
            XNode::Attribute(n, i) => n.attributes().nth(*i),
            XNode::Node(_) => None,
        }
    }

    pub fn string_value(&self) -> String {
        match self {
            XNode::Attribute(..) => self
                .attribute()
                .map(|a| a.value().to_string())
                .unwrap_or_default(),
            XNode::Node(n) if n.is_text() || n.is_comment() => {
                n.text().unwrap_or_default().to_string()
            }
            XNode::Node(n) => n
                .descendants()
                .filter(|d| d.is_text())
                .filter_map(|d| d.text())
                .collect(),
        }
    }

    pub fn local_name(&self) -> String {
        match self {
            XNode::Attribute(..) => self
                .attribute()
                .map(|a| a.name().to_string())
                .unwrap_or_default(),
            XNode::Node(n) if n.is_element() => n.tag_name().name().to_string(),
            XNode::Node(_) => String::new(),
        }
    }

    /// Prefixed name as written, when the namespace has a prefix in scope.
    pub fn qualified_name(&self) -> String {
        let (local, ns) = match self {
            XNode::Attribute(..) => match self.attribute() {
                Some(a) => (a.name(), a.namespace()),
                None => return String::new(),
            },
            XNode::Node(n) if n.is_element() => (n.tag_name().name(), n.tag_name().namespace()),
            XNode::Node(_) => return String::new(),
        };
        match ns.and_then(|uri| self.owner().lookup_prefix(uri)) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
            _ => local.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum Value<'a, 'i> {
    Nodes(Vec<XNode<'a, 'i>>),
    Str(String),
    Num(f64),
    Bool(bool),
}

impl Value<'_, '_> {
    pub fn to_bool(&self) -> bool {
        match self {
            Value::Nodes(n) => !n.is_empty(),
            Value::Str(s) => !s.is_empty(),
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
        }
    }

    pub fn to_string_value(&self) -> String {
        match self {
            Value::Nodes(n) => n.first().map(XNode::string_value).unwrap_or_default(),
            Value::Str(s) => s.clone(),
            Value::Num(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Num(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            other => parse_number(&other.to_string_value()),
        }
    }
}

// ============================================================================
// Lexer
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Slash,
    DoubleSlash,
    LBracket,
    RBracket,
    LParen,
    RParen,
    At,
    Comma,
    Pipe,
    Dot,
    DotDot,
    ColonColon,
    Star,
    Plus,
    Minus,
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Literal(String),
    Number(f64),
    Name(String),
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Literal(s) => format!("literal '{s}'"),
            Tok::Number(n) => format!("number {}", format_number(*n)),
            Tok::Name(n) => format!("name '{n}'"),
            other => format!("{other:?}"),
        }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn tokenize(src: &str) -> Result<Vec<Tok>, XPathError> {
    let chars: Vec<(usize, char)> = src.char_indices().collect();
    let mut out = Vec::new();
    let mut i = 0;

    let at = |i: usize| chars.get(i).map(|(_, c)| *c);

    while let Some(c) = at(i) {
        let offset = chars[i].0;
        match c {
            c if c.is_whitespace() => i += 1,
            '/' if at(i + 1) == Some('/') => {
                out.push(Tok::DoubleSlash);
                i += 2;
            }
            '/' => {
                out.push(Tok::Slash);
                i += 1;
            }
            '[' => {
                out.push(Tok::LBracket);
                i += 1;
            }
            ']' => {
                out.push(Tok::RBracket);
                i += 1;
            }
            '(' => {
                out.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                out.push(Tok::RParen);
                i += 1;
            }
            '@' => {
                out.push(Tok::At);
                i += 1;
            }
            ',' => {
                out.push(Tok::Comma);
                i += 1;
            }
            '|' => {
                out.push(Tok::Pipe);
                i += 1;
            }
            '*' => {
                out.push(Tok::Star);
                i += 1;
            }
            '+' => {
                out.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
            }
            '=' => {
                out.push(Tok::Eq);
                i += 1;
            }
            '!' if at(i + 1) == Some('=') => {
                out.push(Tok::Neq);
                i += 2;
            }
            '<' if at(i + 1) == Some('=') => {
                out.push(Tok::Le);
                i += 2;
            }
            '<' => {
                out.push(Tok::Lt);
                i += 1;
            }
            '>' if at(i + 1) == Some('=') => {
                out.push(Tok::Ge);
                i += 2;
            }
            '>' => {
                out.push(Tok::Gt);
                i += 1;
            }
            ':' if at(i + 1) == Some(':') => {
                out.push(Tok::ColonColon);
                i += 2;
            }
            '\'' | '"' => {
                let quote = c;
                let start = i + 1;
                let mut end = start;
                while at(end).is_some_and(|ch| ch != quote) {
                    end += 1;
                }
                if at(end).is_none() {
                    return Err(XPathError::UnterminatedLiteral);
                }
                out.push(Tok::Literal(chars[start..end].iter().map(|(_, ch)| *ch).collect()));
                i = end + 1;
            }
            '.' if at(i + 1) == Some('.') => {
                out.push(Tok::DotDot);
                i += 2;
            }
            '.' if !at(i + 1).is_some_and(|ch| ch.is_ascii_digit()) => {
                out.push(Tok::Dot);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while at(i).is_some_and(|ch| ch.is_ascii_digit() || ch == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().map(|(_, ch)| *ch).collect();
                out.push(Tok::Number(parse_number(&text)));
            }
            c if is_name_start(c) => {
                let start = i;
                while at(i).is_some_and(is_name_char) {
                    i += 1;
                }
                // QName or prefix:* (but not an axis `::`).
                if at(i) == Some(':') && at(i + 1) != Some(':') {
                    match at(i + 1) {
                        Some('*') => i += 2,
                        Some(n) if is_name_start(n) => {
                            i += 1;
                            while at(i).is_some_and(is_name_char) {
                                i += 1;
                            }
                        }
                        _ => return Err(XPathError::UnexpectedChar { ch: ':', offset }),
                    }
                }
                out.push(Tok::Name(chars[start..i].iter().map(|(_, ch)| *ch).collect()));
            }
            other => return Err(XPathError::UnexpectedChar { ch: other, offset }),
        }
    }
    Ok(out)
}

// ============================================================================
// Syntax tree and parser
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
enum CmpOp {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfAxis,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Attribute,
}

#[derive(Clone, Debug, PartialEq)]
enum NodeTest {
    Any,
    Name { prefix: Option<String>, local: String },
    PrefixAny(String),
    Text,
    Node,
    Comment,
}

#[derive(Clone, Debug)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Expr>,
}

#[derive(Clone, Debug)]
enum Start {
    Root,
    Context,
    Filter(Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Func {
    Not,
    True,
    False,
    Boolean,
    Contains,
    StartsWith,
    LocalName,
    Name,
    NormalizeSpace,
    String,
    StringLength,
    Concat,
    Count,
    Number,
    Position,
    Last,
}

impl Func {
    fn lookup(name: &str) -> Option<(Func, usize, Option<usize>)> {
        Some(match name {
            "not" => (Func::Not, 1, Some(1)),
            "true" => (Func::True, 0, Some(0)),
            "false" => (Func::False, 0, Some(0)),
            "boolean" => (Func::Boolean, 1, Some(1)),
            "contains" => (Func::Contains, 2, Some(2)),
            "starts-with" => (Func::StartsWith, 2, Some(2)),
            "local-name" => (Func::LocalName, 0, Some(1)),
            "name" => (Func::Name, 0, Some(1)),
            "normalize-space" => (Func::NormalizeSpace, 0, Some(1)),
            "string" => (Func::String, 0, Some(1)),
            "string-length" => (Func::StringLength, 0, Some(1)),
            "concat" => (Func::Concat, 2, None),
            "count" => (Func::Count, 1, Some(1)),
            "number" => (Func::Number, 0, Some(1)),
            "position" => (Func::Position, 0, Some(0)),
            "last" => (Func::Last, 0, Some(0)),
            _ => return None,
        })
    }
}

#[derive(Clone, Debug)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Path { start: Start, steps: Vec<Step> },
    Filter(Box<Expr>, Vec<Expr>),
    Literal(String),
    Number(f64),
    Call(Func, Vec<Expr>),
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Tok> {
        self.tokens.get(self.pos + offset)
    }

    fn next(&mut self) -> Result<Tok, XPathError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or(XPathError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn eat(&mut self, tok: &Tok) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: &Tok) -> Result<(), XPathError> {
        match self.peek() {
            Some(t) if t == tok => {
                self.pos += 1;
                Ok(())
            }
            Some(t) => Err(XPathError::UnexpectedToken {
                found: t.describe(),
                pos: self.pos,
            }),
            None => Err(XPathError::UnexpectedEnd),
        }
    }

    fn is_operator_name(&self, name: &str) -> bool {
        matches!(self.peek(), Some(Tok::Name(n)) if n == name)
    }

    fn expr(&mut self) -> Result<Expr, XPathError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(XPathError::TooDeep);
        }
        let out = self.or_expr();
        self.depth -= 1;
        out
    }

    fn or_expr(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.and_expr()?;
        while self.is_operator_name("or") {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.equality()?;
        while self.is_operator_name("and") {
            self.pos += 1;
            let right = self.equality()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Eq) => CmpOp::Eq,
                Some(Tok::Neq) => CmpOp::Neq,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.relational()?;
            left = Expr::Cmp(op, Box::new(left), Box::new(right));
        }
    }

    fn relational(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Tok::Lt) => CmpOp::Lt,
                Some(Tok::Le) => CmpOp::Le,
                Some(Tok::Gt) => CmpOp::Gt,
                Some(Tok::Ge) => CmpOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.additive()?;
            left = Expr::Cmp(op, Box::new(left), Box::new(right));
        }
    }

    fn additive(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.unary()?;
        loop {
            if self.eat(&Tok::Plus) {
                let right = self.unary()?;
                left = Expr::Add(Box::new(left), Box::new(right));
            } else if self.eat(&Tok::Minus) {
                let right = self.unary()?;
                left = Expr::Sub(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, XPathError> {
        if self.eat(&Tok::Minus) {
            self.depth += 1;
            if self.depth > MAX_DEPTH {
                return Err(XPathError::TooDeep);
            }
            let inner = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Neg(Box::new(inner)));
        }
        self.union()
    }

    fn union(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.path()?;
        while self.eat(&Tok::Pipe) {
            let right = self.path()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn starts_step(&self) -> bool {
        match self.peek() {
            Some(Tok::Dot | Tok::DotDot | Tok::At | Tok::Star) => true,
            Some(Tok::Name(_)) => !self.starts_call(),
            _ => false,
        }
    }

    /// A name followed by `(` that is not a node-type test.
    fn starts_call(&self) -> bool {
        match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Name(n)), Some(Tok::LParen)) => {
                !matches!(n.as_str(), "text" | "node" | "comment")
            }
            _ => false,
        }
    }

    fn path(&mut self) -> Result<Expr, XPathError> {
        match self.peek() {
            Some(Tok::Slash) => {
                self.pos += 1;
                let steps = if self.starts_step() {
                    self.relative_steps(Vec::new())?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path {
                    start: Start::Root,
                    steps,
                })
            }
            Some(Tok::DoubleSlash) => {
                self.pos += 1;
                let steps = self.relative_steps(vec![descendant_or_self()])?;
                Ok(Expr::Path {
                    start: Start::Root,
                    steps,
                })
            }
            Some(Tok::Literal(_) | Tok::Number(_) | Tok::LParen) => self.filter_path(),
            Some(Tok::Name(_)) if self.starts_call() => self.filter_path(),
            Some(_) => {
                let steps = self.relative_steps(Vec::new())?;
                Ok(Expr::Path {
                    start: Start::Context,
                    steps,
                })
            }
            None => Err(XPathError::UnexpectedEnd),
        }
    }

    fn filter_path(&mut self) -> Result<Expr, XPathError> {
        let primary = self.primary()?;
        let predicates = self.predicates()?;
        let filtered = if predicates.is_empty() {
            primary
        } else {
            Expr::Filter(Box::new(primary), predicates)
        };

        let mut steps = Vec::new();
        match self.peek() {
            Some(Tok::Slash) => {
                self.pos += 1;
            }
            Some(Tok::DoubleSlash) => {
                self.pos += 1;
                steps.push(descendant_or_self());
            }
            _ => return Ok(filtered),
        }
        let steps = self.relative_steps(steps)?;
        Ok(Expr::Path {
            start: Start::Filter(Box::new(filtered)),
            steps,
        })
    }

    fn relative_steps(&mut self, mut steps: Vec<Step>) -> Result<Vec<Step>, XPathError> {
        steps.push(self.step()?);
        loop {
            if self.eat(&Tok::Slash) {
                steps.push(self.step()?);
            } else if self.eat(&Tok::DoubleSlash) {
                steps.push(descendant_or_self());
                steps.push(self.step()?);
            } else {
                return Ok(steps);
            }
        }
    }

    fn step(&mut self) -> Result<Step, XPathError> {
        if self.eat(&Tok::Dot) {
            return Ok(Step {
                axis: Axis::SelfAxis,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }
        if self.eat(&Tok::DotDot) {
            return Ok(Step {
                axis: Axis::Parent,
                test: NodeTest::Node,
                predicates: Vec::new(),
            });
        }

        let axis = if self.eat(&Tok::At) {
            Axis::Attribute
        } else if let (Some(Tok::Name(name)), Some(Tok::ColonColon)) =
            (self.peek(), self.peek_at(1))
        {
            let axis = axis_by_name(name)?;
            self.pos += 2;
            axis
        } else {
            Axis::Child
        };

        let test = self.node_test()?;
        let predicates = self.predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn node_test(&mut self) -> Result<NodeTest, XPathError> {
        let pos = self.pos;
        match self.next()? {
            Tok::Star => Ok(NodeTest::Any),
            Tok::Name(name) => {
                if self.peek() == Some(&Tok::LParen) {
                    let test = match name.as_str() {
                        "text" => NodeTest::Text,
                        "node" => NodeTest::Node,
                        "comment" => NodeTest::Comment,
                        _ => {
                            return Err(XPathError::UnexpectedToken {
                                found: format!("name '{name}'"),
                                pos,
                            });
                        }
                    };
                    self.pos += 1;
                    self.expect(&Tok::RParen)?;
                    return Ok(test);
                }
                Ok(match name.split_once(':') {
                    Some((prefix, "*")) => NodeTest::PrefixAny(prefix.to_string()),
                    Some((prefix, local)) => NodeTest::Name {
                        prefix: Some(prefix.to_string()),
                        local: local.to_string(),
                    },
                    None => NodeTest::Name {
                        prefix: None,
                        local: name,
                    },
                })
            }
            other => Err(XPathError::UnexpectedToken {
                found: other.describe(),
                pos,
            }),
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, XPathError> {
        let mut out = Vec::new();
        while self.eat(&Tok::LBracket) {
            out.push(self.expr()?);
            self.expect(&Tok::RBracket)?;
        }
        Ok(out)
    }

    fn primary(&mut self) -> Result<Expr, XPathError> {
        let pos = self.pos;
        match self.next()? {
            Tok::Literal(s) => Ok(Expr::Literal(s)),
            Tok::Number(n) => Ok(Expr::Number(n)),
            Tok::LParen => {
                let inner = self.expr()?;
                self.expect(&Tok::RParen)?;
                Ok(inner)
            }
            Tok::Name(name) => {
                let (func, min, max) =
                    Func::lookup(&name).ok_or_else(|| XPathError::UnknownFunction(name.clone()))?;
                self.expect(&Tok::LParen)?;
                let mut args = Vec::new();
                if !self.eat(&Tok::RParen) {
                    loop {
                        args.push(self.expr()?);
                        if self.eat(&Tok::Comma) {
                            continue;
                        }
                        self.expect(&Tok::RParen)?;
                        break;
                    }
                }
                if args.len() < min || max.is_some_and(|m| args.len() > m) {
                    let expected = match max {
                        Some(m) if m == min => min.to_string(),
                        Some(m) => format!("{min}..={m}"),
                        None => format!("at least {min}"),
                    };
                    return Err(XPathError::Arity {
                        name,
                        expected,
                        got: args.len(),
                    });
                }
                Ok(Expr::Call(func, args))
            }
            other => Err(XPathError::UnexpectedToken {
                found: other.describe(),
                pos,
            }),
        }
    }
}

fn descendant_or_self() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }
}

fn axis_by_name(name: &str) -> Result<Axis, XPathError> {
    Ok(match name {
        "child" => Axis::Child,
        "descendant" => Axis::Descendant,
        "descendant-or-self" => Axis::DescendantOrSelf,
        "self" => Axis::SelfAxis,
        "parent" => Axis::Parent,
        "ancestor" => Axis::Ancestor,
        "ancestor-or-self" => Axis::AncestorOrSelf,
        "following-sibling" => Axis::FollowingSibling,
        "preceding-sibling" => Axis::PrecedingSibling,
        "attribute" => Axis::Attribute,
        other => return Err(XPathError::UnknownAxis(other.to_string())),
    })
}

// ============================================================================
// Evaluation
// ============================================================================

struct Ctx<'a, 'i> {
    node: XNode<'a, 'i>,
    position: usize,
    size: usize,
}

fn eval<'a, 'i>(expr: &Expr, ctx: &Ctx<'a, 'i>) -> Result<Value<'a, 'i>, XPathError> {
    Ok(match expr {
        Expr::Or(l, r) => Value::Bool(eval(l, ctx)?.to_bool() || eval(r, ctx)?.to_bool()),
        Expr::And(l, r) => Value::Bool(eval(l, ctx)?.to_bool() && eval(r, ctx)?.to_bool()),
        Expr::Cmp(op, l, r) => Value::Bool(compare(*op, &eval(l, ctx)?, &eval(r, ctx)?)),
        Expr::Add(l, r) => Value::Num(eval(l, ctx)?.to_number() + eval(r, ctx)?.to_number()),
        Expr::Sub(l, r) => Value::Num(eval(l, ctx)?.to_number() - eval(r, ctx)?.to_number()),
        Expr::Neg(e) => Value::Num(-eval(e, ctx)?.to_number()),
        Expr::Union(l, r) => {
            let (Value::Nodes(mut left), Value::Nodes(right)) = (eval(l, ctx)?, eval(r, ctx)?)
            else {
                return Err(XPathError::NotANodeSet);
            };
            left.extend(right);
            sort_dedup(&mut left);
            Value::Nodes(left)
        }
        Expr::Path { start, steps } => {
            let mut current = match start {
                Start::Root => vec![XNode::Node(ctx.node.owner().document().root())],
                Start::Context => vec![ctx.node],
                Start::Filter(e) => match eval(e, ctx)? {
                    Value::Nodes(n) => n,
                    _ => return Err(XPathError::NotANodeSet),
                },
            };
            for step in steps {
                current = apply_step(step, &current)?;
            }
            Value::Nodes(current)
        }
        Expr::Filter(e, predicates) => match eval(e, ctx)? {
            Value::Nodes(nodes) => Value::Nodes(filter(nodes, predicates)?),
            _ => return Err(XPathError::NotANodeSet),
        },
        Expr::Literal(s) => Value::Str(s.clone()),
        Expr::Number(n) => Value::Num(*n),
        Expr::Call(func, args) => call(*func, args, ctx)?,
    })
}

fn apply_step<'a, 'i>(
    step: &Step,
    input: &[XNode<'a, 'i>],
) -> Result<Vec<XNode<'a, 'i>>, XPathError> {
    let mut out = Vec::new();
    for node in input {
        let candidates: Vec<XNode<'a, 'i>> = axis_nodes(step.axis, *node)
            .into_iter()
            .filter(|n| node_test(&step.test, step.axis, n))
            .collect();
        out.extend(filter(candidates, &step.predicates)?);
    }
    sort_dedup(&mut out);
    Ok(out)
}

fn filter<'a, 'i>(
    mut nodes: Vec<XNode<'a, 'i>>,
    predicates: &[Expr],
) -> Result<Vec<XNode<'a, 'i>>, XPathError> {
    for predicate in predicates {
        let size = nodes.len();
        let mut kept = Vec::with_capacity(size);
        for (i, node) in nodes.into_iter().enumerate() {
            let ctx = Ctx {
                node,
                position: i + 1,
                size,
            };
            let keep = match eval(predicate, &ctx)? {
                Value::Num(n) => n == (i + 1) as f64,
                other => other.to_bool(),
            };
            if keep {
                kept.push(node);
            }
        }
        nodes = kept;
    }
    Ok(nodes)
}

fn axis_nodes<'a, 'i>(axis: Axis, node: XNode<'a, 'i>) -> Vec<XNode<'a, 'i>> {
    let wrap = |it: &mut dyn Iterator<Item = Node<'a, 'i>>| -> Vec<XNode<'a, 'i>> {
        it.map(XNode::Node).collect()
    };
    match (axis, node) {
        (Axis::SelfAxis, n) => vec![n],
        (Axis::Child, XNode::Node(n)) => wrap(&mut n.children()),
        (Axis::Descendant, XNode::Node(n)) => wrap(&mut n.descendants().skip(1)),
        (Axis::DescendantOrSelf, XNode::Node(n)) => wrap(&mut n.descendants()),
        (Axis::DescendantOrSelf, attr) => vec![attr],
        (Axis::Parent, XNode::Node(n)) => wrap(&mut n.parent().into_iter()),
        (Axis::Parent, XNode::Attribute(owner, _)) => vec![XNode::Node(owner)],
        (Axis::Ancestor, XNode::Node(n)) => wrap(&mut n.ancestors().skip(1)),
        (Axis::Ancestor, XNode::Attribute(owner, _)) => wrap(&mut owner.ancestors()),
        (Axis::AncestorOrSelf, XNode::Node(n)) => wrap(&mut n.ancestors()),
        (Axis::AncestorOrSelf, attr @ XNode::Attribute(owner, _)) => {
            let mut out = vec![attr];
            out.extend(owner.ancestors().map(XNode::Node));
            out
        }
        (Axis::FollowingSibling, XNode::Node(n)) => wrap(&mut n.next_siblings().skip(1)),
        (Axis::PrecedingSibling, XNode::Node(n)) => wrap(&mut n.prev_siblings().skip(1)),
        (Axis::Attribute, XNode::Node(n)) if n.is_element() => (0..n.attributes().len())
            .map(|i| XNode::Attribute(n, i))
            .collect(),
        _ => Vec::new(),
    }
}

fn node_test(test: &NodeTest, axis: Axis, node: &XNode<'_, '_>) -> bool {
    match (test, node) {
        (NodeTest::Node, _) => true,
        (NodeTest::Text, XNode::Node(n)) => n.is_text(),
        (NodeTest::Comment, XNode::Node(n)) => n.is_comment(),
        (NodeTest::Text | NodeTest::Comment, XNode::Attribute(..)) => false,

        (_, XNode::Attribute(owner, _)) => {
            if axis != Axis::Attribute {
                return false;
            }
            let Some(attr) = node.attribute() else {
                return false;
            };
            match test {
                NodeTest::Any => true,
                NodeTest::Name {
                    prefix: None,
                    local,
                } => attr.namespace().is_none() && attr.name() == local,
                NodeTest::Name {
                    prefix: Some(p),
                    local,
                } => attr.name() == local && namespace_matches(*owner, p, attr.namespace()),
                NodeTest::PrefixAny(p) => namespace_matches(*owner, p, attr.namespace()),
                _ => false,
            }
        }

        (_, XNode::Node(n)) => {
            if axis == Axis::Attribute || !n.is_element() {
                return false;
            }
            let tag = n.tag_name();
            match test {
                NodeTest::Any => true,
                NodeTest::Name {
                    prefix: None,
                    local,
                } => tag.name() == local,
                NodeTest::Name {
                    prefix: Some(p),
                    local,
                } => tag.name() == local && namespace_matches(*n, p, tag.namespace()),
                NodeTest::PrefixAny(p) => namespace_matches(*n, p, tag.namespace()),
                _ => false,
            }
        }
    }
}

fn namespace_matches(scope: Node<'_, '_>, prefix: &str, actual: Option<&str>) -> bool {
    match (scope.lookup_namespace_uri(Some(prefix)), actual) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

fn sort_dedup(nodes: &mut Vec<XNode<'_, '_>>) {
    nodes.sort_by_key(XNode::order_key);
    nodes.dedup_by_key(|n| n.order_key());
}

fn call<'a, 'i>(func: Func, args: &[Expr], ctx: &Ctx<'a, 'i>) -> Result<Value<'a, 'i>, XPathError> {
    let arg = |i: usize| -> Result<Value<'a, 'i>, XPathError> { eval(&args[i], ctx) };
    let string_arg = |i: usize| -> Result<String, XPathError> {
        if args.len() > i {
            Ok(arg(i)?.to_string_value())
        } else {
            Ok(ctx.node.string_value())
        }
    };
    let node_arg = |i: usize| -> Result<Option<XNode<'a, 'i>>, XPathError> {
        if args.len() > i {
            match arg(i)? {
                Value::Nodes(n) => Ok(n.first().copied()),
                _ => Err(XPathError::NotANodeSet),
            }
        } else {
            Ok(Some(ctx.node))
        }
    };

    Ok(match func {
        Func::Not => Value::Bool(!arg(0)?.to_bool()),
        Func::True => Value::Bool(true),
        Func::False => Value::Bool(false),
        Func::Boolean => Value::Bool(arg(0)?.to_bool()),
        Func::Contains => Value::Bool(string_arg(0)?.contains(string_arg(1)?.as_str())),
        Func::StartsWith => Value::Bool(string_arg(0)?.starts_with(string_arg(1)?.as_str())),
        Func::LocalName => Value::Str(node_arg(0)?.map(|n| n.local_name()).unwrap_or_default()),
        Func::Name => Value::Str(node_arg(0)?.map(|n| n.qualified_name()).unwrap_or_default()),
        Func::NormalizeSpace => {
            Value::Str(string_arg(0)?.split_whitespace().collect::<Vec<_>>().join(" "))
        }
        Func::String => Value::Str(string_arg(0)?),
        Func::StringLength => Value::Num(string_arg(0)?.chars().count() as f64),
        Func::Concat => {
            let mut out = String::new();
            for i in 0..args.len() {
                out.push_str(&string_arg(i)?);
            }
            Value::Str(out)
        }
        Func::Count => match arg(0)? {
            Value::Nodes(n) => Value::Num(n.len() as f64),
            _ => return Err(XPathError::NotANodeSet),
        },
        Func::Number => {
            if args.is_empty() {
                Value::Num(parse_number(&ctx.node.string_value()))
            } else {
                Value::Num(arg(0)?.to_number())
            }
        }
        Func::Position => Value::Num(ctx.position as f64),
        Func::Last => Value::Num(ctx.size as f64),
    })
}

fn compare(op: CmpOp, left: &Value<'_, '_>, right: &Value<'_, '_>) -> bool {
    match (left, right) {
        (Value::Nodes(l), Value::Nodes(r)) => {
            let rs: Vec<String> = r.iter().map(XNode::string_value).collect();
            l.iter().any(|a| {
                let a = a.string_value();
                rs.iter().any(|b| compare_atoms(op, &Atom::Str(&a), &Atom::Str(b)))
            })
        }
        (Value::Nodes(_), Value::Bool(b)) => {
            compare_atoms(op, &Atom::Bool(left.to_bool()), &Atom::Bool(*b))
        }
        (Value::Bool(b), Value::Nodes(_)) => {
            compare_atoms(op, &Atom::Bool(*b), &Atom::Bool(right.to_bool()))
        }
        (Value::Nodes(l), other) => {
            let other = Atom::from_value(other);
            l.iter().any(|n| {
                let s = n.string_value();
                compare_atoms(op, &Atom::Str(&s), &other)
            })
        }
        (other, Value::Nodes(r)) => {
            let other = Atom::from_value(other);
            r.iter().any(|n| {
                let s = n.string_value();
                compare_atoms(op, &other, &Atom::Str(&s))
            })
        }
        (l, r) => compare_atoms(op, &Atom::from_value(l), &Atom::from_value(r)),
    }
}

enum Atom<'s> {
    Str(&'s str),
    Num(f64),
    Bool(bool),
}

impl<'s> Atom<'s> {
    fn from_value(v: &'s Value<'_, '_>) -> Self {
        match v {
            Value::Str(s) => Atom::Str(s),
            Value::Num(n) => Atom::Num(*n),
            Value::Bool(b) => Atom::Bool(*b),
            Value::Nodes(n) => Atom::Bool(!n.is_empty()),
        }
    }

    fn num(&self) -> f64 {
        match self {
            Atom::Str(s) => parse_number(s),
            Atom::Num(n) => *n,
            Atom::Bool(b) => f64::from(u8::from(*b)),
        }
    }

    fn boolean(&self) -> bool {
        match self {
            Atom::Str(s) => !s.is_empty(),
            Atom::Num(n) => *n != 0.0 && !n.is_nan(),
            Atom::Bool(b) => *b,
        }
    }
}

fn compare_atoms(op: CmpOp, l: &Atom<'_>, r: &Atom<'_>) -> bool {
    match op {
        CmpOp::Eq | CmpOp::Neq => {
            let equal = match (l, r) {
                (Atom::Bool(_), _) | (_, Atom::Bool(_)) => l.boolean() == r.boolean(),
                (Atom::Num(_), _) | (_, Atom::Num(_)) => l.num() == r.num(),
                (Atom::Str(a), Atom::Str(b)) => a == b,
            };
            (op == CmpOp::Eq) == equal
        }
        _ => {
            let ordering = l.num().partial_cmp(&r.num());
            match (op, ordering) {
                (CmpOp::Lt, Some(Ordering::Less)) => true,
                (CmpOp::Le, Some(Ordering::Less | Ordering::Equal)) => true,
                (CmpOp::Gt, Some(Ordering::Greater)) => true,
                (CmpOp::Ge, Some(Ordering::Greater | Ordering::Equal)) => true,
                _ => false,
            }
        }
    }
}

fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() || !t.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-') {
        return f64::NAN;
    }
    t.parse().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
