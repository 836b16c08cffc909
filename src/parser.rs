//! Parser for Vanara
//!
//! A Pratt (operator-precedence) parser with a single token of lookahead.
//! Errors are accumulated as strings and surfaced after parsing; a failed
//! statement is skipped and parsing continues.

use crate::ast::{Block, Expr, Identifier, InfixOp, PrefixOp, Program, Stmt};
use crate::lexer::Lexer;
use crate::token::{Token, TokenKind};

/// Operator precedence, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Assign,      // =
    Equals,      // == !=
    LessGreater, // < >
    Sum,         // + -
    Product,     // * /
    Prefix,      // -x !x
    Call,        // f(x)
    Index,       // a[i]
}

fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Assign => Precedence::Assign,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Gt => Precedence::LessGreater,
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash => Precedence::Product,
        TokenKind::LParen => Precedence::Call,
        TokenKind::LBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}

/// The parser state
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Create a new parser reading tokens from `lexer`
    pub fn new(lexer: Lexer<'a>) -> Self {
        let mut parser = Self {
            lexer,
            cur_token: Token::default(),
            peek_token: Token::default(),
            errors: Vec::new(),
        };

        // fill cur_token and peek_token
        parser.next_token();
        parser.next_token();

        parser
    }

    /// The errors accumulated while parsing
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Parse the whole token stream into a program
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.cur_token_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                program.statements.push(stmt);
            }

            self.next_token();
        }

        program
    }

    // ==================== Statements ====================

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.cur_token.kind {
            TokenKind::Let => self.parse_let_statement(),
            TokenKind::Return => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let_statement(&mut self) -> Option<Stmt> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::Ident) {
            return None;
        }

        let name = Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        };

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }

        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Stmt::Let { token, name, value })
    }

    fn parse_return_statement(&mut self) -> Option<Stmt> {
        let token = self.cur_token.clone();

        // bare `return` yields null
        if matches!(
            self.peek_token.kind,
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            if self.peek_token_is(TokenKind::Semicolon) {
                self.next_token();
            }

            return Some(Stmt::Return { token, value: None });
        }

        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Stmt::Return {
            token,
            value: Some(value),
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let token = self.cur_token.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;

        if self.peek_token_is(TokenKind::Semicolon) {
            self.next_token();
        }

        Some(Stmt::Expr { token, expression })
    }

    fn parse_block(&mut self) -> Block {
        let token = self.cur_token.clone();
        let mut statements = Vec::new();

        self.next_token();

        while !self.cur_token_is(TokenKind::RBrace) && !self.cur_token_is(TokenKind::Eof) {
            if let Some(stmt) = self.parse_statement() {
                statements.push(stmt);
            }

            self.next_token();
        }

        Block { token, statements }
    }

    // ==================== Expressions ====================

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let mut left = self.parse_prefix()?;

        while !self.peek_token_is(TokenKind::Semicolon)
            && precedence < precedence_of(self.peek_token.kind)
        {
            left = match self.peek_token.kind {
                TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Asterisk
                | TokenKind::Slash
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Eq
                | TokenKind::NotEq => {
                    self.next_token();
                    self.parse_infix_expression(left)?
                }
                TokenKind::LParen => {
                    self.next_token();
                    self.parse_call_expression(left)?
                }
                TokenKind::LBracket => {
                    self.next_token();
                    self.parse_index_expression(left)?
                }
                TokenKind::Assign => {
                    self.next_token();
                    self.parse_assign_expression(left)?
                }
                _ => return Some(left),
            };
        }

        Some(left)
    }

    /// Dispatch on the current token's prefix rule
    fn parse_prefix(&mut self) -> Option<Expr> {
        match self.cur_token.kind {
            TokenKind::Ident => Some(Expr::Ident(Identifier {
                token: self.cur_token.clone(),
                value: self.cur_token.literal.clone(),
            })),
            TokenKind::Int => self.parse_integer_literal(),
            TokenKind::String => Some(Expr::Str {
                token: self.cur_token.clone(),
                value: self.cur_token.literal.clone(),
            }),
            TokenKind::True | TokenKind::False => Some(Expr::Bool {
                token: self.cur_token.clone(),
                value: self.cur_token_is(TokenKind::True),
            }),
            TokenKind::Null => Some(Expr::Null {
                token: self.cur_token.clone(),
            }),
            TokenKind::Bang | TokenKind::Minus => self.parse_prefix_expression(),
            TokenKind::LParen => self.parse_grouped_expression(),
            TokenKind::If => self.parse_if_expression(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_hash_literal(),
            kind => {
                self.errors
                    .push(format!("no prefix parse function for {} found", kind));
                None
            }
        }
    }

    fn parse_integer_literal(&mut self) -> Option<Expr> {
        let token = self.cur_token.clone();

        match token.literal.parse::<i64>() {
            Ok(value) => Some(Expr::Int { token, value }),
            Err(_) => {
                self.errors
                    .push(format!("could not parse {:?} as integer", token.literal));
                None
            }
        }
    }

    fn parse_prefix_expression(&mut self) -> Option<Expr> {
        let token = self.cur_token.clone();
        let op = if token.kind == TokenKind::Bang {
            PrefixOp::Bang
        } else {
            PrefixOp::Minus
        };

        self.next_token();

        let right = self.parse_expression(Precedence::Prefix)?;

        Some(Expr::Prefix {
            token,
            op,
            right: Box::new(right),
        })
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Option<Expr> {
        let token = self.cur_token.clone();
        let op = match token.kind {
            TokenKind::Plus => InfixOp::Plus,
            TokenKind::Minus => InfixOp::Minus,
            TokenKind::Asterisk => InfixOp::Asterisk,
            TokenKind::Slash => InfixOp::Slash,
            TokenKind::Lt => InfixOp::Lt,
            TokenKind::Gt => InfixOp::Gt,
            TokenKind::Eq => InfixOp::Eq,
            TokenKind::NotEq => InfixOp::NotEq,
            _ => unreachable!("caller checked the operator token"),
        };

        let precedence = precedence_of(token.kind);

        self.next_token();

        let right = self.parse_expression(precedence)?;

        Some(Expr::Infix {
            token,
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn parse_grouped_expression(&mut self) -> Option<Expr> {
        self.next_token();

        let expr = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(expr)
    }

    fn parse_if_expression(&mut self) -> Option<Expr> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }

        self.next_token();

        let condition = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }

        let consequence = self.parse_block();

        let alternative = if self.peek_token_is(TokenKind::Else) {
            self.next_token();

            if !self.expect_peek(TokenKind::LBrace) {
                return None;
            }

            Some(self.parse_block())
        } else {
            None
        };

        Some(Expr::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_function_literal(&mut self) -> Option<Expr> {
        let token = self.cur_token.clone();

        if !self.expect_peek(TokenKind::LParen) {
            return None;
        }

        let parameters = self.parse_function_parameters()?;

        if !self.expect_peek(TokenKind::LBrace) {
            return None;
        }

        let body = self.parse_block();

        Some(Expr::Function {
            token,
            parameters,
            body,
        })
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Identifier>> {
        let mut parameters = Vec::new();

        if self.peek_token_is(TokenKind::RParen) {
            self.next_token();
            return Some(parameters);
        }

        self.next_token();

        if !self.cur_token_is(TokenKind::Ident) {
            self.errors.push(format!(
                "expected next token to be IDENT, got {} instead",
                self.cur_token.kind
            ));
            return None;
        }

        parameters.push(Identifier {
            token: self.cur_token.clone(),
            value: self.cur_token.literal.clone(),
        });

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();

            if !self.expect_peek(TokenKind::Ident) {
                return None;
            }

            parameters.push(Identifier {
                token: self.cur_token.clone(),
                value: self.cur_token.literal.clone(),
            });
        }

        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }

        Some(parameters)
    }

    fn parse_call_expression(&mut self, function: Expr) -> Option<Expr> {
        let token = self.cur_token.clone();
        let arguments = self.parse_expression_list(TokenKind::RParen)?;

        Some(Expr::Call {
            token,
            function: Box::new(function),
            arguments,
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expr> {
        let token = self.cur_token.clone();
        let elements = self.parse_expression_list(TokenKind::RBracket)?;

        Some(Expr::Array { token, elements })
    }

    fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expr>> {
        let mut list = Vec::new();

        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token_is(TokenKind::Comma) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        if !self.expect_peek(end) {
            return None;
        }

        Some(list)
    }

    fn parse_index_expression(&mut self, left: Expr) -> Option<Expr> {
        let token = self.cur_token.clone();

        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;

        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }

        Some(Expr::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        })
    }

    fn parse_hash_literal(&mut self) -> Option<Expr> {
        let token = self.cur_token.clone();
        let mut pairs = Vec::new();

        while !self.peek_token_is(TokenKind::RBrace) {
            self.next_token();

            let key = self.parse_expression(Precedence::Lowest)?;

            if !self.expect_peek(TokenKind::Colon) {
                return None;
            }

            self.next_token();

            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if !self.peek_token_is(TokenKind::RBrace) && !self.expect_peek(TokenKind::Comma) {
                return None;
            }
        }

        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }

        Some(Expr::Hash { token, pairs })
    }

    /// The parser accepts any assignment target; targets other than an
    /// identifier or index expression are rejected at evaluation time
    fn parse_assign_expression(&mut self, left: Expr) -> Option<Expr> {
        let token = self.cur_token.clone();

        self.next_token();

        // right-associative: a = b = c parses as a = (b = c)
        let value = self.parse_expression(Precedence::Lowest)?;

        Some(Expr::Assign {
            token,
            left: Box::new(left),
            value: Box::new(value),
        })
    }

    // ==================== Helpers ====================

    /// Advance one token; comment tokens are skipped so the grammar
    /// never sees them
    fn next_token(&mut self) {
        self.cur_token = std::mem::take(&mut self.peek_token);
        self.peek_token = loop {
            let token = self.lexer.next_token();

            if token.kind != TokenKind::Comment {
                break token;
            }
        };
    }

    fn cur_token_is(&self, kind: TokenKind) -> bool {
        self.cur_token.kind == kind
    }

    fn peek_token_is(&self, kind: TokenKind) -> bool {
        self.peek_token.kind == kind
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_token_is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, kind: TokenKind) {
        self.errors.push(format!(
            "expected next token to be {}, got {} instead",
            kind, self.peek_token.kind
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        let mut parser = Parser::new(Lexer::new(source));
        let program = parser.parse_program();

        assert!(
            parser.errors().is_empty(),
            "parser errors: {:?}",
            parser.errors()
        );

        program
    }

    fn parse_single_expression(source: &str) -> Expr {
        let program = parse(source);
        assert_eq!(program.statements.len(), 1);

        match program.statements.into_iter().next().unwrap() {
            Stmt::Expr { expression, .. } => expression,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_let_statements() {
        let program = parse("let x = 5; let y = true; let foobar = y;");
        assert_eq!(program.statements.len(), 3);

        let names: Vec<&str> = program
            .statements
            .iter()
            .map(|s| match s {
                Stmt::Let { name, .. } => name.value.as_str(),
                other => panic!("expected let statement, got {:?}", other),
            })
            .collect();

        assert_eq!(names, vec!["x", "y", "foobar"]);
    }

    #[test]
    fn test_return_statements() {
        let program = parse("return 5; return; return fn(x) { x };");
        assert_eq!(program.statements.len(), 3);

        match &program.statements[1] {
            Stmt::Return { value: None, .. } => {}
            other => panic!("expected bare return, got {:?}", other),
        }
    }

    #[test]
    fn test_bare_return_in_block() {
        let program = parse("fn() { return }");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_operator_precedence() {
        let cases = [
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b + c", "((a + b) + c)"),
            ("a + b - c", "((a + b) - c)"),
            ("a * b * c", "((a * b) * c)"),
            ("a + b / c", "(a + (b / c))"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f)"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4))"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("true != false", "(true != false)"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4)"),
            ("(5 + 5) * 2", "((5 + 5) * 2)"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            ("add(a + b + c * d / f + g)", "add((((a + b) + ((c * d) / f)) + g))"),
            ("a * [1, 2, 3, 4][b * c] * d", "((a * ([1, 2, 3, 4][(b * c)])) * d)"),
            ("add(a * b[2], b[1], 2 * [1, 2][1])", "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])))"),
            ("x = y = z", "(x = (y = z))"),
            ("a[0] = 1 + 2", "((a[0]) = (1 + 2))"),
        ];

        for (source, expected) in cases {
            let program = parse(source);
            assert_eq!(program.to_string(), expected, "source: {}", source);
        }
    }

    #[test]
    fn test_if_expression() {
        let expr = parse_single_expression("if (x < y) { x } else { y }");

        match expr {
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                assert_eq!(condition.to_string(), "(x < y)");
                assert_eq!(consequence.statements.len(), 1);
                assert!(alternative.is_some());
            }
            other => panic!("expected if expression, got {:?}", other),
        }
    }

    #[test]
    fn test_function_literal() {
        let expr = parse_single_expression("fn(x, y) { x + y; }");

        match expr {
            Expr::Function {
                parameters, body, ..
            } => {
                let names: Vec<&str> = parameters.iter().map(|p| p.value.as_str()).collect();
                assert_eq!(names, vec!["x", "y"]);
                assert_eq!(body.statements.len(), 1);
            }
            other => panic!("expected function literal, got {:?}", other),
        }
    }

    #[test]
    fn test_function_parameter_lists() {
        for (source, expected) in [
            ("fn() {};", vec![]),
            ("fn(x) {};", vec!["x"]),
            ("fn(x, y, z) {};", vec!["x", "y", "z"]),
        ] {
            match parse_single_expression(source) {
                Expr::Function { parameters, .. } => {
                    let names: Vec<&str> = parameters.iter().map(|p| p.value.as_str()).collect();
                    assert_eq!(names, expected, "source: {}", source);
                }
                other => panic!("expected function literal, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_call_expression() {
        let expr = parse_single_expression("add(1, 2 * 3, 4 + 5)");

        match expr {
            Expr::Call {
                function,
                arguments,
                ..
            } => {
                assert_eq!(function.to_string(), "add");
                assert_eq!(arguments.len(), 3);
                assert_eq!(arguments[1].to_string(), "(2 * 3)");
            }
            other => panic!("expected call expression, got {:?}", other),
        }
    }

    #[test]
    fn test_array_and_index() {
        let expr = parse_single_expression("[1, 2 * 2, 3 + 3]");
        match expr {
            Expr::Array { elements, .. } => assert_eq!(elements.len(), 3),
            other => panic!("expected array literal, got {:?}", other),
        }

        let expr = parse_single_expression("myArray[1 + 1]");
        match expr {
            Expr::Index { left, index, .. } => {
                assert_eq!(left.to_string(), "myArray");
                assert_eq!(index.to_string(), "(1 + 1)");
            }
            other => panic!("expected index expression, got {:?}", other),
        }
    }

    #[test]
    fn test_hash_literals() {
        let expr = parse_single_expression(r#"{"one": 1, "two": 2, "three": 3}"#);
        match expr {
            Expr::Hash { pairs, .. } => {
                assert_eq!(pairs.len(), 3);
                assert_eq!(pairs[0].0.to_string(), "\"one\"");
                assert_eq!(pairs[2].1.to_string(), "3");
            }
            other => panic!("expected hash literal, got {:?}", other),
        }

        let expr = parse_single_expression("{}");
        match expr {
            Expr::Hash { pairs, .. } => assert!(pairs.is_empty()),
            other => panic!("expected hash literal, got {:?}", other),
        }

        // keys may be arbitrary expressions
        let expr = parse_single_expression("{1 + 1: 2, true: 3}");
        match expr {
            Expr::Hash { pairs, .. } => {
                assert_eq!(pairs[0].0.to_string(), "(1 + 1)");
                assert_eq!(pairs[1].0.to_string(), "true");
            }
            other => panic!("expected hash literal, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_targets_parse() {
        // any left-hand side parses; rejection happens at eval time
        let expr = parse_single_expression("1 = 2");
        match expr {
            Expr::Assign { left, .. } => assert_eq!(left.to_string(), "1"),
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_are_transparent() {
        let program = parse("let x = 1; # trailing comment\n# full line\nx + 2");
        assert_eq!(program.statements.len(), 2);
        assert_eq!(program.to_string(), "let x = 1;\n(x + 2)");
    }

    #[test]
    fn test_errors_accumulate() {
        let mut parser = Parser::new(Lexer::new("let = 5; let y 10; let z = )"));
        parser.parse_program();

        // the skipped tokens of a failed statement may produce follow-on
        // errors; all of them are collected
        let errors = parser.errors();
        assert_eq!(
            errors,
            &[
                "expected next token to be IDENT, got = instead",
                "no prefix parse function for = found",
                "expected next token to be =, got INT instead",
                "no prefix parse function for ) found",
            ]
        );
    }

    #[test]
    fn test_error_does_not_abort_parsing() {
        let mut parser = Parser::new(Lexer::new("let 5; let x = 2;"));
        let program = parser.parse_program();

        assert_eq!(
            parser.errors(),
            &["expected next token to be IDENT, got INT instead"]
        );

        // the bad statement is skipped, later statements still parse
        assert_eq!(program.to_string(), "5\nlet x = 2;");
    }

    #[test]
    fn test_display_round_trip() {
        // for programs whose rendering is itself legal source, re-parsing
        // the rendering produces the same rendering
        let sources = [
            "let add = fn(a, b) { (a + b) };",
            "if ((x < y)) { x } else { y }",
            "[1, (2 * 2), \"three\"]",
            "{\"k\": 1, true: 2}",
            "(f(1)[0])",
        ];

        for source in sources {
            let first = parse(source).to_string();
            let second = parse(&first).to_string();
            assert_eq!(first, second, "source: {}", source);
        }
    }
}
