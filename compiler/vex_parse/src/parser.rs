//! Recursive-descent parser. Builds AST nodes exclusively through the
//! `vex_ir` factory functions — this module never constructs a `Node`
//! variant directly.

use crate::lexer::{Lexer, Tok};
use crate::stack::ensure_sufficient_stack;
use vex_diagnostic::ParseError;
use vex_ir::{ast, Arena, Node};

pub struct Parser<'a> {
    arena: &'a Arena,
    toks: Vec<Tok>,
    pos: usize,
}

type PResult<T> = Result<T, ParseError>;

impl<'a> Parser<'a> {
    fn new(arena: &'a Arena, toks: Vec<Tok>) -> Self {
        Parser { arena, toks, pos: 0 }
    }

    fn peek(&self) -> &Tok {
        &self.toks[self.pos]
    }

    fn bump(&mut self) -> Tok {
        let tok = self.toks[self.pos].clone();
        if self.pos + 1 < self.toks.len() {
            self.pos += 1;
        }
        tok
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Tok::Eof)
    }

    fn eat(&mut self, want: &Tok) -> PResult<()> {
        if self.peek() == want {
            self.bump();
            Ok(())
        } else {
            Err(ParseError)
        }
    }

    fn eat_ident(&mut self) -> PResult<String> {
        match self.bump() {
            Tok::Ident(name) => Ok(name),
            _ => Err(ParseError),
        }
    }

    // ===== Top level =====

    /// Parse a full program: a sequence of statements terminated by EOF,
    /// wrapped in a single root `Block`.
    fn parse_program(&mut self) -> PResult<&'a Node<'a>> {
        let mut stmts = Vec::new();
        while !self.at_eof() {
            stmts.push(self.parse_stmt()?);
            while self.peek() == &Tok::Semicolon {
                self.bump();
            }
        }
        Ok(ast::block(self.arena, &stmts))
    }

    fn parse_stmt(&mut self) -> PResult<&'a Node<'a>> {
        ensure_sufficient_stack(|| match self.peek() {
            Tok::Val => self.parse_var_decl(),
            Tok::Fn => self.parse_function(),
            _ => self.parse_expr(),
        })
    }

    fn parse_var_decl(&mut self) -> PResult<&'a Node<'a>> {
        self.eat(&Tok::Val)?;
        let name = self.eat_ident()?;
        let annotation = if self.peek() == &Tok::Colon {
            self.bump();
            Some(self.parse_annotation()?)
        } else {
            None
        };
        self.eat(&Tok::Eq)?;
        let init = self.parse_expr()?;
        Ok(ast::var_decl(
            self.arena,
            &name,
            annotation.as_deref(),
            init,
        ))
    }

    fn parse_function(&mut self) -> PResult<&'a Node<'a>> {
        self.eat(&Tok::Fn)?;
        let name = self.eat_ident()?;
        self.eat(&Tok::LParen)?;
        let mut params: Vec<(String, Option<String>)> = Vec::new();
        if self.peek() != &Tok::RParen {
            loop {
                let pname = self.eat_ident()?;
                let pann = if self.peek() == &Tok::Colon {
                    self.bump();
                    Some(self.parse_annotation()?)
                } else {
                    None
                };
                params.push((pname, pann));
                if self.peek() == &Tok::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.eat(&Tok::RParen)?;
        let return_annotation = if self.peek() == &Tok::Colon {
            self.bump();
            Some(self.parse_annotation()?)
        } else {
            None
        };
        self.eat(&Tok::Eq)?;
        let body = self.parse_expr()?;

        let param_refs: Vec<(&str, Option<&str>)> = params
            .iter()
            .map(|(n, a)| (n.as_str(), a.as_deref()))
            .collect();
        Ok(ast::function(
            self.arena,
            &name,
            &param_refs,
            return_annotation.as_deref(),
            body,
            true,
        ))
    }

    /// Parse an annotation string: a primitive name, optionally followed by
    /// a `<inner>` suffix (`list<int>`), or the bare `<inner>` list shorthand.
    fn parse_annotation(&mut self) -> PResult<String> {
        if self.peek() == &Tok::Lt {
            self.bump();
            let inner = self.eat_ident()?;
            self.eat(&Tok::Gt)?;
            return Ok(format!("<{inner}>"));
        }
        let name = self.eat_ident()?;
        if self.peek() == &Tok::Lt {
            self.bump();
            let inner = self.eat_ident()?;
            self.eat(&Tok::Gt)?;
            return Ok(format!("{name}<{inner}>"));
        }
        Ok(name)
    }

    // ===== Expressions, precedence-climbing =====

    fn parse_expr(&mut self) -> PResult<&'a Node<'a>> {
        ensure_sufficient_stack(|| self.parse_or())
    }

    fn parse_or(&mut self) -> PResult<&'a Node<'a>> {
        let mut left = self.parse_and()?;
        while self.peek() == &Tok::OrOr {
            self.bump();
            let right = self.parse_and()?;
            left = ast::binary_expr(self.arena, "||", left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> PResult<&'a Node<'a>> {
        let mut left = self.parse_cmp()?;
        while self.peek() == &Tok::AndAnd {
            self.bump();
            let right = self.parse_cmp()?;
            left = ast::binary_expr(self.arena, "&&", left, right);
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> PResult<&'a Node<'a>> {
        let mut left = self.parse_add()?;
        loop {
            let op = match self.peek() {
                Tok::EqEq => "==",
                Tok::NotEq => "!=",
                Tok::Lt => "<",
                Tok::LtEq => "<=",
                Tok::Gt => ">",
                Tok::GtEq => ">=",
                _ => break,
            };
            self.bump();
            let right = self.parse_add()?;
            left = ast::binary_expr(self.arena, op, left, right);
        }
        Ok(left)
    }

    fn parse_add(&mut self) -> PResult<&'a Node<'a>> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Tok::Plus => "+",
                Tok::Minus => "-",
                Tok::PlusDot => "+.",
                Tok::MinusDot => "-.",
                _ => break,
            };
            self.bump();
            let right = self.parse_mul()?;
            left = ast::binary_expr(self.arena, op, left, right);
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> PResult<&'a Node<'a>> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Tok::Star => "*",
                Tok::Slash => "/",
                Tok::StarDot => "*.",
                Tok::SlashDot => "/.",
                _ => break,
            };
            self.bump();
            let right = self.parse_unary()?;
            left = ast::binary_expr(self.arena, op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<&'a Node<'a>> {
        if self.peek() == &Tok::Minus {
            self.bump();
            let operand = self.parse_unary()?;
            return Ok(ast::unary_expr(self.arena, "-", operand));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> PResult<&'a Node<'a>> {
        let mut node = self.parse_primary()?;
        while self.peek() == &Tok::LParen {
            self.bump();
            let mut args = Vec::new();
            if self.peek() != &Tok::RParen {
                loop {
                    args.push(self.parse_expr()?);
                    if self.peek() == &Tok::Comma {
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
            self.eat(&Tok::RParen)?;
            node = ast::call(self.arena, node, &args);
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> PResult<&'a Node<'a>> {
        match self.bump() {
            Tok::Int(v) => Ok(ast::int_lit(self.arena, v)),
            Tok::Float(v) => Ok(ast::float_lit(self.arena, v)),
            Tok::True => Ok(ast::bool_lit(self.arena, true)),
            Tok::False => Ok(ast::bool_lit(self.arena, false)),
            Tok::Char(c) => Ok(ast::char_lit(self.arena, c)),
            Tok::Str(s) => Ok(ast::string_lit(self.arena, &s)),
            Tok::Ident(name) => Ok(ast::identifier(self.arena, &name)),
            Tok::LParen => {
                let inner = self.parse_expr()?;
                self.eat(&Tok::RParen)?;
                Ok(inner)
            }
            Tok::LBracket => {
                let mut elements = Vec::new();
                if self.peek() != &Tok::RBracket {
                    loop {
                        elements.push(self.parse_expr()?);
                        if self.peek() == &Tok::Comma {
                            self.bump();
                        } else {
                            break;
                        }
                    }
                }
                self.eat(&Tok::RBracket)?;
                Ok(ast::list(self.arena, &elements))
            }
            Tok::LBrace => {
                let mut stmts = Vec::new();
                while self.peek() != &Tok::RBrace {
                    stmts.push(self.parse_stmt()?);
                    while self.peek() == &Tok::Semicolon {
                        self.bump();
                    }
                }
                self.eat(&Tok::RBrace)?;
                Ok(ast::block(self.arena, &stmts))
            }
            Tok::If => {
                let cond = self.parse_expr()?;
                self.eat(&Tok::Then)?;
                let then_branch = self.parse_expr()?;
                let else_branch = if self.peek() == &Tok::Else {
                    self.bump();
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                Ok(ast::if_expr(self.arena, cond, then_branch, else_branch))
            }
            Tok::Print => {
                self.eat(&Tok::Lt)?;
                let annotation = self.parse_annotation()?;
                self.eat(&Tok::Gt)?;
                self.eat(&Tok::LParen)?;
                let value = self.parse_expr()?;
                self.eat(&Tok::RParen)?;
                Ok(ast::print(self.arena, value, &annotation))
            }
            _ => Err(ParseError),
        }
    }
}

/// Lex and parse a complete source string into a single root node, built in
/// `arena`. On failure, returns `ParseError` and leaves nothing usable
/// behind — there is no partial tree to recover.
pub fn parse<'a>(arena: &'a Arena, source: &str) -> PResult<&'a Node<'a>> {
    let mut lexer = Lexer::new(source);
    let mut toks = Vec::new();
    loop {
        let tok = lexer.next_tok().ok_or(ParseError)?;
        let done = tok == Tok::Eof;
        toks.push(tok);
        if done {
            break;
        }
    }
    let mut parser = Parser::new(arena, toks);
    let root = parser.parse_program()?;
    if !parser.at_eof() {
        return Err(ParseError);
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_int_addition_var_decl() {
        let arena = Arena::default();
        let root = parse(&arena, "val x : int = 1 + 2").expect("parses");
        match root {
            Node::Block(stmts) => {
                assert_eq!(stmts.len(), 1);
                match stmts[0] {
                    Node::VarDecl {
                        name, annotation, ..
                    } => {
                        assert_eq!(*name, "x");
                        assert_eq!(*annotation, Some("int"));
                    }
                    _ => unreachable!(),
                }
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_list_literal_annotation() {
        let arena = Arena::default();
        let root = parse(&arena, "val xs : list<int> = [1,2,3]").expect("parses");
        match root {
            Node::Block(stmts) => match stmts[0] {
                Node::VarDecl { annotation, .. } => {
                    assert_eq!(*annotation, Some("list<int>"));
                }
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_recursive_function() {
        let arena = Arena::default();
        let root =
            parse(&arena, "fn fact(n: int) : int = if n <= 1 then 1 else n * fact(n-1)")
                .expect("parses");
        match root {
            Node::Block(stmts) => match stmts[0] {
                Node::Function {
                    name,
                    params,
                    recursive,
                    ..
                } => {
                    assert_eq!(*name, "fact");
                    assert_eq!(params.len(), 1);
                    assert!(*recursive);
                }
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn parses_print_with_annotation() {
        let arena = Arena::default();
        let root = parse(&arena, "print<int>(\"hi\")").expect("parses");
        match root {
            Node::Block(stmts) => match stmts[0] {
                Node::Print { annotation, .. } => assert_eq!(*annotation, "int"),
                _ => unreachable!(),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn rejects_malformed_input() {
        let arena = Arena::default();
        assert!(parse(&arena, "val = ").is_err());
    }
}
