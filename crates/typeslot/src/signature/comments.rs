// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Legacy `# type:` comment declarations.
//!
//! ```text
//! def __init__(self, exposure, path="/tmp/file.txt"):
//!     # type: (Exposure, Path) -> None
//! ```
//!
//! or one comment per parameter line, closed by `# type: (...) -> None`.

use crate::capture::{Namespace, TypeExpr};
use crate::error::SignatureError;
use crate::slot::SlotType;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn compiled(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> Result<&'static Regex, SignatureError> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| SignatureError::Evaluation {
            expr: pattern.to_string(),
            reason: e.to_string(),
        })
}

fn type_re() -> Result<&'static Regex, SignatureError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    compiled(&RE, r"^# type: ([^-]*)( -> (.*))?$")
}

fn ident_re() -> Result<&'static Regex, SignatureError> {
    static RE: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    compiled(&RE, r"[A-Za-z_][A-Za-z0-9_]*")
}

/// Split a source line at its first `#` that is not inside a string literal.
fn split_comment(line: &str) -> (&str, Option<&str>) {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (None, '\'' | '"') => quote = Some(c),
            (None, '#') => return (&line[..i], Some(line[i..].trim_end())),
            _ => {}
        }
    }
    (line, None)
}

/// Parse the `# type:` comments in `source` for a callable with parameters
/// `params` (receiver excluded).
///
/// Returns the per-parameter declarations and the return declaration.
pub fn parse_type_comments(
    source: &str,
    params: &[String],
    namespace: &Namespace,
) -> Result<(HashMap<String, TypeExpr>, TypeExpr), SignatureError> {
    let (type_re, ident_re) = (type_re()?, ident_re()?);
    let mut annotations = HashMap::new();
    // identifiers seen since the last type comment
    let mut names: Vec<String> = Vec::new();

    for line in source.lines() {
        let (code, comment) = split_comment(line);
        names.extend(
            ident_re
                .find_iter(code)
                .map(|m| m.as_str().to_string())
                .filter(|n| params.contains(n)),
        );
        let Some(caps) = comment.and_then(|c| type_re.captures(c)) else {
            continue;
        };
        let args = caps.get(1).map_or("", |m| m.as_str()).trim();
        if args != "(...)" {
            match evaluate(args, namespace)? {
                Evaluated::Tuple(types) => {
                    if types.len() != params.len() {
                        return Err(SignatureError::TypeCountMismatch {
                            expected: params.len(),
                            got: types.len(),
                            params: params.join(", "),
                        });
                    }
                    annotations.extend(params.iter().cloned().zip(types));
                }
                Evaluated::Single(expr) => match names.first() {
                    Some(name) => {
                        annotations.insert(name.clone(), expr);
                    }
                    None => {
                        return Err(SignatureError::Evaluation {
                            expr: args.to_string(),
                            reason: "no parameter named on this line".into(),
                        });
                    }
                },
            }
        }
        names.clear();
        if let Some(ret) = caps.get(3) {
            let ret = ret.as_str().trim();
            let returns = match evaluate(ret, namespace)? {
                Evaluated::Single(expr) => expr,
                Evaluated::Tuple(_) => {
                    return Err(SignatureError::Evaluation {
                        expr: ret.to_string(),
                        reason: "return type cannot be a tuple".into(),
                    });
                }
            };
            log::trace!("[signature] type comments give {} declarations", annotations.len());
            return Ok((annotations, returns));
        }
    }
    Err(SignatureError::MissingReturn)
}

/// Evaluate a single type expression such as `Optional[Sequence[str]]`.
pub fn evaluate_type_expr(expr: &str, namespace: &Namespace) -> Result<TypeExpr, SignatureError> {
    match evaluate(expr, namespace)? {
        Evaluated::Single(e) => Ok(e),
        Evaluated::Tuple(_) => Err(SignatureError::Evaluation {
            expr: expr.to_string(),
            reason: "expected a single type, got a tuple".into(),
        }),
    }
}

#[derive(Debug)]
enum Evaluated {
    Single(TypeExpr),
    Tuple(Vec<TypeExpr>),
}

fn evaluate(expr: &str, namespace: &Namespace) -> Result<Evaluated, SignatureError> {
    let fail = |reason: String| SignatureError::Evaluation {
        expr: expr.to_string(),
        reason,
    };
    let tokens = tokenize(expr).map_err(&fail)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        namespace,
    };
    let value = parser.value().map_err(&fail)?;
    if let Some(tok) = parser.peek() {
        return Err(fail(format!("unexpected {:?}", tok)));
    }
    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String),
    Open(char),
    Close(char),
    Comma,
}

fn tokenize(src: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '[' | '(' => tokens.push(Token::Open(c)),
            ']' | ')' => tokens.push(Token::Close(c)),
            ',' => tokens.push(Token::Comma),
            c if c.is_whitespace() => {}
            c if c.is_alphabetic() || c == '_' => {
                let mut end = i + c.len_utf8();
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' || d == '.' {
                        end = j + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Name(src[i..end].to_string()));
            }
            other => return Err(format!("invalid character {:?}", other)),
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    namespace: &'a Namespace,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn eat(&mut self, tok: &Token) -> bool {
        if self.peek() == Some(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, tok: Token) -> Result<(), String> {
        match self.next() {
            Some(t) if t == tok => Ok(()),
            Some(t) => Err(format!("expected {:?}, got {:?}", tok, t)),
            None => Err(format!("expected {:?}, got end of input", tok)),
        }
    }

    /// `expr` or a parenthesised tuple.
    fn value(&mut self) -> Result<Evaluated, String> {
        if !self.eat(&Token::Open('(')) {
            return self.expr().map(Evaluated::Single);
        }
        let mut items = Vec::new();
        let mut trailing_comma = false;
        while !self.eat(&Token::Close(')')) {
            if !items.is_empty() {
                self.expect(Token::Comma)?;
                if self.eat(&Token::Close(')')) {
                    trailing_comma = true;
                    break;
                }
            }
            items.push(self.expr()?);
        }
        if items.len() == 1 && !trailing_comma {
            return Ok(Evaluated::Single(items.remove(0)));
        }
        Ok(Evaluated::Tuple(items))
    }

    fn args(&mut self) -> Result<Vec<TypeExpr>, String> {
        self.expect(Token::Open('['))?;
        let mut items = vec![self.expr()?];
        while self.eat(&Token::Comma) {
            items.push(self.expr()?);
        }
        self.expect(Token::Close(']'))?;
        Ok(items)
    }

    fn expr(&mut self) -> Result<TypeExpr, String> {
        let name = match self.next() {
            Some(Token::Name(name)) => name,
            Some(tok) => return Err(format!("unexpected {:?}", tok)),
            None => return Err("unexpected end of input".into()),
        };
        let base = name.rsplit('.').next().unwrap_or(&name);
        match base {
            "str" => Ok(TypeExpr::Bare(SlotType::Str)),
            "int" => Ok(TypeExpr::Bare(SlotType::Int)),
            "float" => Ok(TypeExpr::Bare(SlotType::Float)),
            "bool" => Ok(TypeExpr::Bare(SlotType::Bool)),
            "Any" => Ok(TypeExpr::Bare(SlotType::Any)),
            "None" => Ok(TypeExpr::NoneType),
            "Optional" => {
                let mut args = self.args()?;
                if args.len() != 1 {
                    return Err(format!("Optional takes 1 argument, got {}", args.len()));
                }
                Ok(TypeExpr::optional(args.remove(0)))
            }
            "Union" => Ok(TypeExpr::Union(self.args()?)),
            "Sequence" | "List" | "Array" => {
                let mut args = self.args()?;
                if args.len() != 1 {
                    return Err(format!("{} takes 1 argument, got {}", base, args.len()));
                }
                Ok(TypeExpr::SequenceOf(element_type(args.remove(0))?))
            }
            "Mapping" | "Dict" => {
                let args = self.args()?;
                match <[TypeExpr; 2]>::try_from(args) {
                    Ok([k, v]) => Ok(TypeExpr::MappingOf(element_type(k)?, element_type(v)?)),
                    Err(args) => Err(format!("{} takes 2 arguments, got {}", base, args.len())),
                }
            }
            _ => self
                .namespace
                .get(&name)
                .or_else(|| self.namespace.get(base))
                .cloned()
                .ok_or_else(|| format!("name '{}' is not defined", name)),
        }
    }
}

/// A type usable as a container element.
fn element_type(expr: TypeExpr) -> Result<SlotType, String> {
    match expr {
        TypeExpr::Bare(t) => Ok(t),
        TypeExpr::Slot(slot) => Ok(SlotType::Slot(slot)),
        other => Err(format!("{} cannot be used as an element type", other)),
    }
}
