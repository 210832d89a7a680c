//! Evaluation of parsed expressions against a document.

use super::parser::{Axis, CmpOp, Expr, Function, NodeTest, Path, Step};
use crate::document::{Document, Node};
use crate::{Result, XmlError};
use std::collections::HashSet;

/// Result of evaluating an expression.
#[derive(Debug, Clone)]
pub(crate) enum Value {
    Nodes(Vec<Node>),
    Str(String),
    Num(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy)]
struct Context {
    node: Node,
    position: usize,
    size: usize,
}

pub(crate) struct Evaluator<'a> {
    doc: &'a Document,
    src: &'a str,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(doc: &'a Document, src: &'a str) -> Self {
        Self { doc, src }
    }

    pub(crate) fn evaluate(&self, expr: &Expr, node: Node) -> Result<Value> {
        self.eval(
            expr,
            Context {
                node,
                position: 1,
                size: 1,
            },
        )
    }

    fn eval(&self, expr: &Expr, ctx: Context) -> Result<Value> {
        Ok(match expr {
            Expr::Or(left, right) => Value::Bool(
                self.boolean(&self.eval(left, ctx)?) || self.boolean(&self.eval(right, ctx)?),
            ),
            Expr::And(left, right) => Value::Bool(
                self.boolean(&self.eval(left, ctx)?) && self.boolean(&self.eval(right, ctx)?),
            ),
            Expr::Cmp(op, left, right) => {
                let left = self.eval(left, ctx)?;
                let right = self.eval(right, ctx)?;
                Value::Bool(self.compare(*op, &left, &right))
            }
            Expr::Literal(text) => Value::Str(text.clone()),
            Expr::Number(num) => Value::Num(*num),
            Expr::Call(func, args) => self.call(*func, args, ctx)?,
            Expr::Path(path) => Value::Nodes(self.path(path, ctx.node)?),
        })
    }

    fn call(&self, func: Function, args: &[Expr], ctx: Context) -> Result<Value> {
        let arg = |idx: usize| -> Result<Value> {
            match args.get(idx) {
                Some(expr) => self.eval(expr, ctx),
                None => Ok(Value::Nodes(vec![ctx.node])),
            }
        };
        Ok(match func {
            Function::Not => Value::Bool(!self.boolean(&arg(0)?)),
            Function::Boolean => Value::Bool(self.boolean(&arg(0)?)),
            Function::True => Value::Bool(true),
            Function::False => Value::Bool(false),
            Function::Count => Value::Num(self.node_set(arg(0)?, "count")?.len() as f64),
            Function::Sum => Value::Num(
                self.node_set(arg(0)?, "sum")?
                    .into_iter()
                    .map(|node| to_number(&self.doc.string_value(node)))
                    .sum(),
            ),
            Function::String => Value::Str(self.string(&arg(0)?)),
            Function::Number => Value::Num(self.number(&arg(0)?)),
            Function::Contains => {
                let haystack = self.string(&arg(0)?);
                let needle = self.string(&arg(1)?);
                Value::Bool(haystack.contains(&needle))
            }
            Function::Concat => {
                let mut out = String::new();
                for expr in args {
                    out.push_str(&self.string(&self.eval(expr, ctx)?));
                }
                Value::Str(out)
            }
            Function::Position => Value::Num(ctx.position as f64),
            Function::Last => Value::Num(ctx.size as f64),
        })
    }

    fn node_set(&self, value: Value, func: &str) -> Result<Vec<Node>> {
        match value {
            Value::Nodes(nodes) => Ok(nodes),
            _ => Err(XmlError::xpath(
                self.src,
                format!("{func}() expects a node-set"),
            )),
        }
    }

    fn path(&self, path: &Path, start: Node) -> Result<Vec<Node>> {
        let mut current = if path.absolute {
            vec![Node::Tree(self.doc.root())]
        } else {
            vec![start]
        };
        for step in &path.steps {
            let mut seen = HashSet::new();
            let mut next = Vec::new();
            for &node in &current {
                for found in self.step(step, node)? {
                    if seen.insert(found) {
                        next.push(found);
                    }
                }
            }
            current = next;
        }
        Ok(current)
    }

    fn step(&self, step: &Step, node: Node) -> Result<Vec<Node>> {
        let mut found: Vec<Node> = self
            .axis(step.axis, node)
            .into_iter()
            .filter(|&candidate| self.test(&step.test, step.axis, candidate))
            .collect();
        for predicate in &step.predicates {
            let size = found.len();
            let mut kept = Vec::with_capacity(size);
            for (idx, &candidate) in found.iter().enumerate() {
                let ctx = Context {
                    node: candidate,
                    position: idx + 1,
                    size,
                };
                let keep = match self.eval(predicate, ctx)? {
                    Value::Num(num) => num == (idx + 1) as f64,
                    other => self.boolean(&other),
                };
                if keep {
                    kept.push(candidate);
                }
            }
            found = kept;
        }
        Ok(found)
    }

    fn axis(&self, axis: Axis, node: Node) -> Vec<Node> {
        match (axis, node) {
            (Axis::Child, Node::Tree(id)) => {
                self.doc.children(id).iter().map(|&c| Node::Tree(c)).collect()
            }
            (Axis::Attribute, Node::Tree(id)) => (0..self.doc.attrs(id).len())
                .map(|idx| Node::Attr(id, idx))
                .collect(),
            (Axis::SelfNode, _) => vec![node],
            (Axis::Parent, Node::Tree(id)) => {
                self.doc.parent(id).map(Node::Tree).into_iter().collect()
            }
            (Axis::Parent, Node::Attr(id, _)) => vec![Node::Tree(id)],
            (Axis::DescendantOrSelf, Node::Tree(id)) => std::iter::once(id)
                .chain(self.doc.descendants(id))
                .map(Node::Tree)
                .collect(),
            (Axis::DescendantOrSelf, Node::Attr(..)) => vec![node],
            (Axis::Child | Axis::Attribute, Node::Attr(..)) => Vec::new(),
        }
    }

    fn test(&self, test: &NodeTest, axis: Axis, node: Node) -> bool {
        match (test, node) {
            (NodeTest::Node, _) => true,
            (NodeTest::Name(name), Node::Tree(id)) => self.doc.name(id) == Some(name.as_str()),
            (NodeTest::Name(name), Node::Attr(id, idx)) => self
                .doc
                .attrs(id)
                .get(idx)
                .is_some_and(|(key, _)| key == name),
            (NodeTest::Any, Node::Tree(id)) => self.doc.is_element(id),
            (NodeTest::Any, Node::Attr(..)) => axis == Axis::Attribute,
            (NodeTest::Text, Node::Tree(id)) => self.doc.is_text(id),
            (NodeTest::Text, Node::Attr(..)) => false,
        }
    }

    pub(crate) fn boolean(&self, value: &Value) -> bool {
        match value {
            Value::Nodes(nodes) => !nodes.is_empty(),
            Value::Str(text) => !text.is_empty(),
            Value::Num(num) => *num != 0.0 && !num.is_nan(),
            Value::Bool(flag) => *flag,
        }
    }

    pub(crate) fn string(&self, value: &Value) -> String {
        match value {
            Value::Nodes(nodes) => nodes
                .first()
                .map(|&node| self.doc.string_value(node))
                .unwrap_or_default(),
            Value::Str(text) => text.clone(),
            Value::Num(num) => format_number(*num),
            Value::Bool(flag) => flag.to_string(),
        }
    }

    fn number(&self, value: &Value) -> f64 {
        match value {
            Value::Num(num) => *num,
            Value::Bool(flag) => f64::from(u8::from(*flag)),
            other => to_number(&self.string(other)),
        }
    }

    fn compare(&self, op: CmpOp, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Nodes(a), Value::Nodes(b)) => a.iter().any(|&x| {
                let x = self.doc.string_value(x);
                b.iter()
                    .any(|&y| compare_strings(op, &x, &self.doc.string_value(y)))
            }),
            (Value::Nodes(nodes), scalar) => self.compare_set(op, nodes, scalar, false),
            (scalar, Value::Nodes(nodes)) => self.compare_set(op, nodes, scalar, true),
            (a, b) => self.compare_scalars(op, a, b),
        }
    }

    fn compare_set(&self, op: CmpOp, nodes: &[Node], scalar: &Value, flipped: bool) -> bool {
        if let Value::Bool(flag) = scalar {
            let set = Value::Bool(!nodes.is_empty());
            let other = Value::Bool(*flag);
            return if flipped {
                self.compare_scalars(op, &other, &set)
            } else {
                self.compare_scalars(op, &set, &other)
            };
        }
        nodes.iter().any(|&node| {
            let text = Value::Str(self.doc.string_value(node));
            let text = match scalar {
                Value::Num(_) => Value::Num(to_number(&self.string(&text))),
                _ => text,
            };
            if flipped {
                self.compare_scalars(op, scalar, &text)
            } else {
                self.compare_scalars(op, &text, scalar)
            }
        })
    }

    fn compare_scalars(&self, op: CmpOp, left: &Value, right: &Value) -> bool {
        match op {
            CmpOp::Eq | CmpOp::Ne => {
                let equal = match (left, right) {
                    (Value::Bool(_), _) | (_, Value::Bool(_)) => {
                        self.boolean(left) == self.boolean(right)
                    }
                    (Value::Num(_), _) | (_, Value::Num(_)) => {
                        self.number(left) == self.number(right)
                    }
                    _ => self.string(left) == self.string(right),
                };
                if op == CmpOp::Eq {
                    equal
                } else {
                    !equal
                }
            }
            _ => compare_numbers(op, self.number(left), self.number(right)),
        }
    }
}

fn compare_strings(op: CmpOp, left: &str, right: &str) -> bool {
    match op {
        CmpOp::Eq => left == right,
        CmpOp::Ne => left != right,
        _ => compare_numbers(op, to_number(left), to_number(right)),
    }
}

fn compare_numbers(op: CmpOp, left: f64, right: f64) -> bool {
    match op {
        CmpOp::Eq => left == right,
        CmpOp::Ne => left != right,
        CmpOp::Lt => left < right,
        CmpOp::Gt => left > right,
        CmpOp::Le => left <= right,
        CmpOp::Ge => left >= right,
    }
}

/// XPath `number()` conversion of a string.
pub(crate) fn to_number(text: &str) -> f64 {
    text.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// XPath `string()` conversion of a number.
pub(crate) fn format_number(num: f64) -> String {
    if num.is_nan() {
        "NaN".to_string()
    } else if num.is_infinite() {
        if num > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if num.fract() == 0.0 && num.abs() < 1e15 {
        format!("{}", num as i64)
    } else {
        format!("{num}")
    }
}
