use crate::error::CompileError;
use crate::scanner::{Scanner, Token, TokenKind};
use crate::vm::chunk::{Chunk, OpCode};
use crate::vm::table::Strings;
use crate::vm::value::Value;

/// Binding strength, weakest to strongest. `parse_precedence` only ever runs
/// with levels in the Assignment..=Unary range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    None,
    Assignment,
    Conditional,
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
    Call,
    Primary,
}

impl Precedence {
    /// One step stronger, clamped at the top.
    fn next(self) -> Precedence {
        match self {
            Self::None => Self::Assignment,
            Self::Assignment => Self::Conditional,
            Self::Conditional => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Equality,
            Self::Equality => Self::Comparison,
            Self::Comparison => Self::Term,
            Self::Term => Self::Factor,
            Self::Factor => Self::Unary,
            Self::Unary => Self::Call,
            Self::Call => Self::Primary,
            Self::Primary => Self::Primary,
        }
    }
}

type ParseFn<'src, 'int> = fn(&mut Compiler<'src, 'int>);

struct ParseRule<'src, 'int> {
    prefix: Option<ParseFn<'src, 'int>>,
    infix: Option<ParseFn<'src, 'int>>,
    precedence: Precedence,
}

/// The rule table, total over `TokenKind`. Token kinds outside the expression
/// fragment fall through to the empty rule and surface as parse errors.
fn parse_rule<'src, 'int>(kind: TokenKind) -> ParseRule<'src, 'int> {
    fn rule<'src, 'int>(
        prefix: Option<ParseFn<'src, 'int>>,
        infix: Option<ParseFn<'src, 'int>>,
        precedence: Precedence,
    ) -> ParseRule<'src, 'int> {
        ParseRule {
            prefix,
            infix,
            precedence,
        }
    }
    match kind {
        TokenKind::LeftParen => rule(Some(Compiler::grouping), None, Precedence::None),
        TokenKind::Minus => rule(
            Some(Compiler::unary),
            Some(Compiler::binary),
            Precedence::Term,
        ),
        TokenKind::Plus => rule(None, Some(Compiler::binary), Precedence::Term),
        TokenKind::Slash | TokenKind::Star => {
            rule(None, Some(Compiler::binary), Precedence::Factor)
        }
        TokenKind::Bang => rule(Some(Compiler::unary), None, Precedence::None),
        TokenKind::BangEqual | TokenKind::EqualEqual => {
            rule(None, Some(Compiler::binary), Precedence::Equality)
        }
        TokenKind::Greater
        | TokenKind::GreaterEqual
        | TokenKind::Less
        | TokenKind::LessEqual => rule(None, Some(Compiler::binary), Precedence::Comparison),
        TokenKind::Number => rule(Some(Compiler::number), None, Precedence::None),
        TokenKind::String => rule(Some(Compiler::string), None, Precedence::None),
        TokenKind::True | TokenKind::False | TokenKind::Nil => {
            rule(Some(Compiler::literal), None, Precedence::None)
        }
        _ => rule(None, None, Precedence::None),
    }
}

/// Single-pass Pratt compiler: consumes the token stream and emits bytecode
/// for exactly one expression, terminated by `Return`. String constants are
/// interned through the shared pool.
pub struct Compiler<'src, 'int> {
    scanner: Scanner<'src>,
    current: Token<'src>,
    previous: Token<'src>,
    chunk: Chunk,
    strings: &'int mut Strings,
    had_error: bool,
    panic_mode: bool,
    errors: Vec<CompileError>,
}

impl<'src, 'int> Compiler<'src, 'int> {
    pub fn new(source: &'src str, strings: &'int mut Strings) -> Self {
        let placeholder = Token::new(TokenKind::Eof, "", 1);
        Self {
            scanner: Scanner::new(source),
            current: placeholder,
            previous: placeholder,
            chunk: Chunk::new(),
            strings,
            had_error: false,
            panic_mode: false,
            errors: Vec::new(),
        }
    }

    pub fn compile(mut self) -> Result<Chunk, Vec<CompileError>> {
        self.advance();
        self.expression();
        self.consume(TokenKind::Eof, "Expect end of expression.");
        self.emit_op(OpCode::Return);
        if self.had_error {
            Err(self.errors)
        } else {
            Ok(self.chunk)
        }
    }

    fn expression(&mut self) {
        self.parse_precedence(Precedence::Assignment);
    }

    fn parse_precedence(&mut self, precedence: Precedence) {
        self.advance();
        let Some(prefix) = parse_rule(self.previous.kind).prefix else {
            self.error_at(self.previous, "Expect expression.");
            return;
        };
        prefix(self);

        while precedence <= parse_rule(self.current.kind).precedence {
            self.advance();
            let infix = parse_rule(self.previous.kind)
                .infix
                .expect("tokens with an infix precedence have an infix rule");
            infix(self);
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenKind::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self) {
        let op_kind = self.previous.kind;
        self.parse_precedence(Precedence::Unary);
        match op_kind {
            TokenKind::Minus => self.emit_op(OpCode::Negate),
            TokenKind::Bang => self.emit_op(OpCode::Not),
            _ => unreachable!("unary rule is only attached to '-' and '!'"),
        }
    }

    /// The right operand binds one level above the operator's own precedence,
    /// which is what makes binary operators left-associative.
    fn binary(&mut self) {
        let op_kind = self.previous.kind;
        let operand_precedence = parse_rule(op_kind).precedence.next();
        self.parse_precedence(operand_precedence);
        match op_kind {
            TokenKind::Plus => self.emit_op(OpCode::Add),
            TokenKind::Minus => self.emit_op(OpCode::Subtract),
            TokenKind::Star => self.emit_op(OpCode::Multiply),
            TokenKind::Slash => self.emit_op(OpCode::Divide),
            TokenKind::EqualEqual => self.emit_op(OpCode::Equal),
            TokenKind::BangEqual => {
                self.emit_op(OpCode::Equal);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Greater => self.emit_op(OpCode::Greater),
            TokenKind::GreaterEqual => {
                self.emit_op(OpCode::Less);
                self.emit_op(OpCode::Not);
            }
            TokenKind::Less => self.emit_op(OpCode::Less),
            TokenKind::LessEqual => {
                self.emit_op(OpCode::Greater);
                self.emit_op(OpCode::Not);
            }
            _ => unreachable!("binary rule is only attached to binary operators"),
        }
    }

    fn number(&mut self) {
        let value: f64 = self
            .previous
            .lexeme
            .parse()
            .expect("scanner produced a valid number lexeme");
        self.emit_constant(Value::Number(value));
    }

    fn string(&mut self) {
        let obj = self.strings.intern(self.previous.lexeme.to_string());
        self.emit_constant(Value::Str(obj));
    }

    fn literal(&mut self) {
        match self.previous.kind {
            TokenKind::Nil => self.emit_op(OpCode::Nil),
            TokenKind::True => self.emit_op(OpCode::True),
            TokenKind::False => self.emit_op(OpCode::False),
            _ => unreachable!("literal rule is only attached to nil/true/false"),
        }
    }

    fn advance(&mut self) {
        self.previous = self.current;
        loop {
            let token = self.scanner.next_token();
            if token.kind == TokenKind::Error {
                self.error_at(token, token.lexeme);
            } else {
                self.current = token;
                break;
            }
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) {
        if self.current.kind == kind {
            self.advance();
        } else {
            self.error_at(self.current, message);
        }
    }

    fn emit_op(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.previous.line);
    }

    fn emit_byte(&mut self, byte: u8) {
        self.chunk.write_byte(byte, self.previous.line);
    }

    fn emit_constant(&mut self, value: Value) {
        match self.chunk.add_constant(value) {
            Some(index) => {
                self.emit_op(OpCode::Constant);
                self.emit_byte(index);
            }
            None => self.error_at(self.previous, "Too many constants in one chunk."),
        }
    }

    /// Report an error unless already panicking; the first error flips both
    /// flags so cascades stay quiet until compilation ends.
    fn error_at(&mut self, token: Token<'src>, message: &str) {
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;
        self.had_error = true;
        let error = match token.kind {
            TokenKind::Eof => CompileError::parse_at_end(message, token.line),
            TokenKind::Error => CompileError::scan(message, token.line),
            _ => CompileError::parse(message, token.lexeme, token.line),
        };
        self.errors.push(error);
    }
}
