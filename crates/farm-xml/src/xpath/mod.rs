//! XPath queries over [`Document`]s.
//!
//! Supports the subset of XPath 1.0 the farm documents are queried with:
//! location paths (absolute, relative and `//`), `.`, `..`, `*`, `@name`,
//! `@*`, `text()`, `node()`, predicates combining `and`, `or` and
//! comparisons with node-set semantics, and the functions `not`, `count`,
//! `sum`, `string`, `number`, `boolean`, `true`, `false`, `contains`,
//! `concat`, `position` and `last`.

mod eval;
mod parser;

use crate::document::{Document, Node};
use crate::{Result, XmlError};
use eval::{Evaluator, Value};
use parser::Expr;
use std::fmt;
use std::str::FromStr;

/// A compiled XPath expression.
#[derive(Debug, Clone)]
pub struct XPath {
    source: String,
    expr: Expr,
}

impl XPath {
    /// Compiles an expression.
    pub fn compile(source: &str) -> Result<Self> {
        Ok(Self {
            source: source.to_string(),
            expr: parser::parse(source)?,
        })
    }

    /// The source text of the expression.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Does the expression start at the document node?
    pub fn is_absolute(&self) -> bool {
        matches!(&self.expr, Expr::Path(path) if path.absolute)
    }

    fn evaluate(&self, doc: &Document, context: Node) -> Result<Value> {
        Evaluator::new(doc, &self.source).evaluate(&self.expr, context)
    }
}

impl FromStr for XPath {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::compile(s)
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Document {
    /// Evaluates a query from the document node and returns string values.
    ///
    /// A node-set yields one string per node; a scalar result yields exactly
    /// one string.
    pub fn xpath(&self, query: &str) -> Result<Vec<String>> {
        self.xpath_at(Node::Tree(self.root()), query)
    }

    /// Like [`Document::xpath`], but falls back to `default` when nothing matched.
    pub fn xpath_or(&self, query: &str, default: &str) -> Result<String> {
        Ok(self
            .xpath(query)?
            .into_iter()
            .next()
            .unwrap_or_else(|| default.to_string()))
    }

    /// Evaluates a query relative to `context` and returns string values.
    pub fn xpath_at(&self, context: Node, query: &str) -> Result<Vec<String>> {
        let xpath = XPath::compile(query)?;
        let evaluator = Evaluator::new(self, xpath.as_str());
        Ok(match xpath.evaluate(self, context)? {
            Value::Nodes(nodes) => nodes.into_iter().map(|n| self.string_value(n)).collect(),
            scalar => vec![evaluator.string(&scalar)],
        })
    }

    /// Selects the nodes matched by a query evaluated from the document node.
    pub fn nodes(&self, query: &str) -> Result<Vec<Node>> {
        self.select(Node::Tree(self.root()), &XPath::compile(query)?)
    }

    /// Selects the nodes matched by a query evaluated relative to `context`.
    pub fn nodes_at(&self, context: Node, query: &str) -> Result<Vec<Node>> {
        self.select(context, &XPath::compile(query)?)
    }

    /// Selects the nodes matched by a compiled expression.
    pub fn select(&self, context: Node, xpath: &XPath) -> Result<Vec<Node>> {
        match xpath.evaluate(self, context)? {
            Value::Nodes(nodes) => Ok(nodes),
            _ => Err(XmlError::xpath(
                xpath.as_str(),
                "expression does not select nodes",
            )),
        }
    }
}

/// Renders a string as an XPath literal, choosing quotes that don't clash
/// with its content.
pub fn literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> Document {
        Document::parse(
            r#"<people>
                <person id="alice"><mentor>0crat</mentor><reputation>300</reputation>
                  <links><link rel="github" href="alice"/><link rel="email" href="a@x.com"/></links></person>
                <person id="bob"><mentor>alice</mentor><reputation>12</reputation>
                  <links><link rel="github" href="bob"/></links></person>
                <person id="carol"><reputation>0</reputation></person>
            </people>"#,
        )
        .unwrap()
    }

    #[test]
    fn test_attribute_values() {
        let doc = people();
        assert_eq!(
            doc.xpath("/people/person/@id").unwrap(),
            vec!["alice", "bob", "carol"]
        );
    }

    #[test]
    fn test_predicate_on_child_text() {
        let doc = people();
        assert_eq!(
            doc.xpath("/people/person[mentor/text()='alice']/@id").unwrap(),
            vec!["bob"]
        );
    }

    #[test]
    fn test_nested_predicate_with_and() {
        let doc = people();
        assert_eq!(
            doc.xpath("/people/person[links/link[@rel='email' and @href='a@x.com']]/@id")
                .unwrap(),
            vec!["alice"]
        );
    }

    #[test]
    fn test_numeric_comparison() {
        let doc = people();
        assert_eq!(
            doc.xpath("/people/person[reputation > 256]/@id").unwrap(),
            vec!["alice"]
        );
        assert_eq!(
            doc.xpath("/people/person[mentor and reputation >0]/@id")
                .unwrap(),
            vec!["alice", "bob"]
        );
    }

    #[test]
    fn test_sum_returns_single_value() {
        let doc = people();
        assert_eq!(
            doc.xpath("sum(/people/person[mentor and reputation > 0]/reputation)")
                .unwrap(),
            vec!["312"]
        );
        assert_eq!(doc.xpath("count(/people/person)").unwrap(), vec!["3"]);
    }

    #[test]
    fn test_not_and_descendant() {
        let doc = people();
        assert_eq!(doc.nodes("/people[not(person[@id='dave'])]").unwrap().len(), 1);
        assert!(doc.nodes("/people[not(person[@id='bob'])]").unwrap().is_empty());
        assert_eq!(doc.nodes("//people/person[@id  ='bob']").unwrap().len(), 1);
        assert_eq!(doc.nodes("//link").unwrap().len(), 3);
    }

    #[test]
    fn test_relative_query_from_node() {
        let doc = people();
        let links = doc.nodes("/people/person[@id='alice']/links/link").unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(doc.xpath_at(links[1], "@rel").unwrap(), vec!["email"]);
        assert_eq!(doc.xpath_at(links[1], "../../@id").unwrap(), vec!["alice"]);
    }

    #[test]
    fn test_positional_predicate() {
        let doc = people();
        assert_eq!(doc.xpath("/people/person[2]/@id").unwrap(), vec!["bob"]);
        assert_eq!(
            doc.xpath("/people/person[position() = last()]/@id").unwrap(),
            vec!["carol"]
        );
    }

    #[test]
    fn test_xpath_or_default() {
        let doc = people();
        assert_eq!(
            doc.xpath_or("/people/person[@id='carol']/jobs/text()", "0")
                .unwrap(),
            "0"
        );
    }

    #[test]
    fn test_select_rejects_scalar() {
        let doc = people();
        assert!(doc.nodes("count(/people/person)").is_err());
    }

    #[test]
    fn test_literal_quoting() {
        assert_eq!(literal("bob"), "'bob'");
        assert_eq!(literal("o'neil"), "\"o'neil\"");
        let doc = Document::parse(r#"<a><b id="x'y&quot;z"/></a>"#).unwrap();
        let query = format!("/a/b[@id={}]", literal("x'y\"z"));
        assert_eq!(doc.nodes(&query).unwrap().len(), 1);
    }

    #[test]
    fn test_absolute_flag() {
        assert!(XPath::compile("/a/b").unwrap().is_absolute());
        assert!(!XPath::compile("b/c").unwrap().is_absolute());
    }
}
