//! Recursive-descent compilation engine
//!
//! Single-pass: parsing, symbol resolution, and VM emission are
//! interleaved; no syntax tree is built. Every `compile_*` method enters
//! with the cursor on its first token and leaves with the cursor on its
//! last token.
//!
//! Expression emission is strictly left to right with no operator
//! precedence - that is the language definition, not an omission. Binary
//! operators are deferred on a small stack: each newly seen operator first
//! flushes the previous one, and a `(` pushes a sentinel so that a
//! parenthesised sub-term flushes only its own operators when `)` is
//! reached.

use log::debug;

use crate::error::CompileError;
use crate::symbol_table::{Kind, SymbolTable};
use crate::tokenizer::{Keyword, Token, TokenKind, TokenStream};
use crate::vm_writer::{LabelManager, VmWriter};

/// A resolved variable reference, ready to push or pop.
struct Resolved {
    segment: &'static str,
    index: u16,
    ty: String,
}

/// Deferred operator, or the `(` sentinel bounding a sub-expression.
enum PendingOp {
    Sentinel,
    Op(&'static str),
}

pub struct CompilationEngine {
    tokens: TokenStream,
    class_name: String,
    class_table: SymbolTable,
    subroutine_table: SymbolTable,
    labels: LabelManager,
    operators: Vec<PendingOp>,
    writer: VmWriter,
}

impl CompilationEngine {
    #[must_use]
    pub fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            class_name: String::new(),
            class_table: SymbolTable::new(),
            subroutine_table: SymbolTable::new(),
            labels: LabelManager::new(),
            operators: Vec::new(),
            writer: VmWriter::new(),
        }
    }

    /// Compiles one class, returning the emitted VM lines.
    pub fn compile(mut self) -> Result<Vec<String>, CompileError> {
        self.compile_class()?;
        Ok(self.writer.into_lines())
    }

    // ---- token helpers -------------------------------------------------

    fn current(&self) -> Result<&Token, CompileError> {
        self.tokens.current()
    }

    fn unexpected(&self, want: &str) -> CompileError {
        match self.current() {
            Ok(token) => CompileError::UnexpectedToken {
                want: want.to_string(),
                got: token.describe(),
                line: token.line,
                col: token.col,
            },
            Err(err) => err,
        }
    }

    fn expect_symbol(&self, ch: char) -> Result<(), CompileError> {
        match self.current()?.kind {
            TokenKind::Symbol(c) if c == ch => Ok(()),
            _ => Err(self.unexpected(&format!("`{ch}`"))),
        }
    }

    fn expect_keyword(&self, keyword: Keyword) -> Result<(), CompileError> {
        match self.current()?.kind {
            TokenKind::Keyword(k) if k == keyword => Ok(()),
            _ => Err(self.unexpected(&format!("`{}`", keyword.as_str()))),
        }
    }

    fn current_identifier(&self) -> Result<String, CompileError> {
        match &self.current()?.kind {
            TokenKind::Identifier(name) => Ok(name.clone()),
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn current_is_symbol(&self, ch: char) -> bool {
        matches!(self.current().map(|t| &t.kind), Ok(TokenKind::Symbol(c)) if *c == ch)
    }

    fn next_is_symbol(&self, ch: char) -> bool {
        matches!(
            self.tokens.look_ahead(1).map(|t| &t.kind),
            Ok(TokenKind::Symbol(c)) if *c == ch
        )
    }

    fn next_is_keyword(&self, keyword: Keyword) -> bool {
        matches!(
            self.tokens.look_ahead(1).map(|t| &t.kind),
            Ok(TokenKind::Keyword(k)) if *k == keyword
        )
    }

    /// `int`, `char`, `boolean`, or a class name.
    fn current_type_name(&self) -> Result<String, CompileError> {
        match &self.current()?.kind {
            TokenKind::Keyword(k @ (Keyword::Int | Keyword::Char | Keyword::Boolean)) => {
                Ok(k.as_str().to_string())
            }
            TokenKind::Identifier(name) => Ok(name.clone()),
            _ => Err(self.unexpected("a type")),
        }
    }

    fn current_is_type_token(&self) -> bool {
        matches!(
            self.current().map(|t| &t.kind),
            Ok(TokenKind::Keyword(Keyword::Int | Keyword::Char | Keyword::Boolean))
                | Ok(TokenKind::Identifier(_))
        )
    }

    // ---- symbol resolution ---------------------------------------------

    /// Subroutine scope shadows class scope.
    fn resolve(&self, name: &str) -> Option<Resolved> {
        self.subroutine_table
            .get(name)
            .or_else(|| self.class_table.get(name))
            .map(|entry| Resolved {
                segment: entry.kind.segment(),
                index: entry.index,
                ty: entry.ty.clone(),
            })
    }

    fn resolve_or_fail(&self, name: &str) -> Result<Resolved, CompileError> {
        if let Some(var) = self.resolve(name) {
            return Ok(var);
        }
        let token = self.current()?;
        Err(CompileError::UndefinedVariable {
            name: name.to_string(),
            line: token.line,
            col: token.col,
        })
    }

    fn define(&mut self, name: &str, ty: &str, kind: Kind) -> Result<(), CompileError> {
        let (line, col) = {
            let token = self.current()?;
            (token.line, token.col)
        };
        let table = match kind {
            Kind::Static | Kind::Field => &mut self.class_table,
            Kind::Argument | Kind::Var => &mut self.subroutine_table,
        };
        if table.define(name, ty, kind) {
            Ok(())
        } else {
            Err(CompileError::DuplicateDefinition {
                name: name.to_string(),
                line,
                col,
            })
        }
    }

    // ---- declarations --------------------------------------------------

    /// class: `class` className `{` classVarDec* subroutineDec* `}`
    fn compile_class(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Class)?;

        self.tokens.advance()?;
        self.class_name = self.current_identifier()?;
        debug!("compiling class {}", self.class_name);

        self.tokens.advance()?;
        self.expect_symbol('{')?;

        self.tokens.advance()?;
        while !self.current_is_symbol('}') {
            match self.current()?.kind {
                TokenKind::Keyword(Keyword::Static | Keyword::Field) => {
                    self.compile_class_var_dec()?;
                }
                TokenKind::Keyword(
                    Keyword::Constructor | Keyword::Function | Keyword::Method,
                ) => {
                    self.compile_subroutine()?;
                }
                _ => return Err(self.unexpected("a declaration or `}`")),
            }
            self.tokens.advance()?;
        }
        Ok(())
    }

    /// classVarDec: (`static` | `field`) type varName (`,` varName)* `;`
    fn compile_class_var_dec(&mut self) -> Result<(), CompileError> {
        let kind = match self.current()?.kind {
            TokenKind::Keyword(Keyword::Static) => Kind::Static,
            TokenKind::Keyword(Keyword::Field) => Kind::Field,
            _ => return Err(self.unexpected("`static` or `field`")),
        };

        self.tokens.advance()?;
        let ty = self.current_type_name()?;

        loop {
            self.tokens.advance()?;
            let name = self.current_identifier()?;
            self.define(&name, &ty, kind)?;

            if !self.next_is_symbol(',') {
                break;
            }
            self.tokens.advance()?; // `,`
        }

        self.tokens.advance()?;
        self.expect_symbol(';')
    }

    /// subroutineDec: kind (`void` | type) name `(` parameterList `)` body
    fn compile_subroutine(&mut self) -> Result<(), CompileError> {
        let sub_kind = match self.current()?.kind {
            TokenKind::Keyword(
                k @ (Keyword::Constructor | Keyword::Function | Keyword::Method),
            ) => k,
            _ => return Err(self.unexpected("`constructor`, `function` or `method`")),
        };

        self.tokens.advance()?;
        match self.current()?.kind {
            TokenKind::Keyword(Keyword::Void) => {}
            _ => {
                self.current_type_name()?;
            }
        }

        self.tokens.advance()?;
        let name = self.current_identifier()?;
        let full_name = format!("{}.{name}", self.class_name);

        // Fresh scope and fresh flow-control labels per subroutine
        self.subroutine_table = SymbolTable::new();
        self.labels.reset();

        // A method's receiver is argument 0; user parameters follow it.
        if sub_kind == Keyword::Method {
            let class_name = self.class_name.clone();
            self.define("this", &class_name, Kind::Argument)?;
        }

        self.tokens.advance()?;
        self.expect_symbol('(')?;
        self.tokens.advance()?;
        self.compile_parameter_list()?;
        self.expect_symbol(')')?;

        self.tokens.advance()?;
        self.compile_subroutine_body(sub_kind, &full_name)
    }

    /// parameterList: ((type varName) (`,` type varName)*)?
    ///
    /// Enters on the token after `(`; leaves on `)`.
    fn compile_parameter_list(&mut self) -> Result<(), CompileError> {
        if !self.current_is_type_token() {
            return Ok(()); // empty list: current is already `)`
        }

        loop {
            let ty = self.current_type_name()?;
            self.tokens.advance()?;
            let name = self.current_identifier()?;
            self.define(&name, &ty, Kind::Argument)?;

            if !self.next_is_symbol(',') {
                break;
            }
            self.tokens.advance()?; // `,`
            self.tokens.advance()?;
        }
        self.tokens.advance()?; // onto `)`
        Ok(())
    }

    /// subroutineBody: `{` varDec* statements `}`
    ///
    /// The function directive must carry the total local count, so all
    /// varDecs are consumed before anything is emitted.
    fn compile_subroutine_body(
        &mut self,
        sub_kind: Keyword,
        full_name: &str,
    ) -> Result<(), CompileError> {
        self.expect_symbol('{')?;

        let mut n_locals = 0;
        while self.next_is_keyword(Keyword::Var) {
            self.tokens.advance()?;
            n_locals += self.compile_var_dec()?;
        }

        self.writer.function(full_name, n_locals);

        match sub_kind {
            Keyword::Constructor => {
                // Allocate the new object and aim THIS at it
                let n_fields = self.class_table.var_count(Kind::Field);
                self.writer.push("constant", n_fields);
                self.writer.call("Memory.alloc", 1);
                self.writer.pop("pointer", 0);
            }
            Keyword::Method => {
                // The receiver arrives as argument 0
                self.writer.push("argument", 0);
                self.writer.pop("pointer", 0);
            }
            _ => {}
        }

        self.tokens.advance()?;
        self.compile_statements()?;

        self.tokens.advance()?;
        self.expect_symbol('}')
    }

    /// varDec: `var` type varName (`,` varName)* `;`
    ///
    /// Returns how many locals it declared.
    fn compile_var_dec(&mut self) -> Result<u16, CompileError> {
        self.expect_keyword(Keyword::Var)?;

        self.tokens.advance()?;
        let ty = self.current_type_name()?;

        let mut count = 0;
        loop {
            self.tokens.advance()?;
            let name = self.current_identifier()?;
            self.define(&name, &ty, Kind::Var)?;
            count += 1;

            if !self.next_is_symbol(',') {
                break;
            }
            self.tokens.advance()?; // `,`
        }

        self.tokens.advance()?;
        self.expect_symbol(';')?;
        Ok(count)
    }

    // ---- statements ----------------------------------------------------

    /// Zero or more statements. An empty list is legal: when the cursor is
    /// already on the closing `}`, it steps back so the caller's advance
    /// lands on that `}` again.
    fn compile_statements(&mut self) -> Result<(), CompileError> {
        if self.current_is_symbol('}') {
            self.tokens.backward();
            return Ok(());
        }

        loop {
            match self.current()?.kind {
                TokenKind::Keyword(Keyword::Let) => self.compile_let()?,
                TokenKind::Keyword(Keyword::If) => self.compile_if()?,
                TokenKind::Keyword(Keyword::While) => self.compile_while()?,
                TokenKind::Keyword(Keyword::Do) => self.compile_do()?,
                TokenKind::Keyword(Keyword::Return) => self.compile_return()?,
                _ => return Err(self.unexpected("a statement")),
            }

            // Continue only when another statement follows
            match self.tokens.look_ahead(1).map(|t| &t.kind) {
                Ok(TokenKind::Keyword(
                    Keyword::Let | Keyword::If | Keyword::While | Keyword::Do | Keyword::Return,
                )) => self.tokens.advance()?,
                _ => return Ok(()),
            }
        }
    }

    /// let varName (`[` expression `]`)? `=` expression `;`
    fn compile_let(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Let)?;

        self.tokens.advance()?;
        let name = self.current_identifier()?;
        let target = self.resolve_or_fail(&name)?;

        self.tokens.advance()?;
        let is_array = self.current_is_symbol('[');
        if is_array {
            self.tokens.advance()?;
            self.compile_expression()?;
            self.tokens.advance()?;
            self.expect_symbol(']')?;
            // index + base: the target address stays on the stack
            self.writer.push(target.segment, target.index);
            self.writer.arithmetic("add");
            self.tokens.advance()?;
        }

        self.expect_symbol('=')?;
        self.tokens.advance()?;
        self.compile_expression()?;

        self.tokens.advance()?;
        self.expect_symbol(';')?;

        if is_array {
            // Park the value, aim THAT at the target, assign through it.
            // The detour keeps the RHS from clobbering the address when
            // both sides use arrays.
            self.writer.pop("temp", 0);
            self.writer.pop("pointer", 1);
            self.writer.push("temp", 0);
            self.writer.pop("that", 0);
        } else {
            self.writer.pop(target.segment, target.index);
        }
        Ok(())
    }

    /// do subroutineCall `;` - the unused return value is discarded.
    fn compile_do(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Do)?;

        self.tokens.advance()?;
        self.compile_subroutine_call()?;

        self.tokens.advance()?;
        self.expect_symbol(';')?;

        self.writer.pop("temp", 0);
        Ok(())
    }

    /// while `(` expression `)` `{` statements `}`
    fn compile_while(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::While)?;

        self.labels.start_while();
        self.writer.label(&self.labels.while_exp());

        self.tokens.advance()?;
        self.expect_symbol('(')?;
        self.tokens.advance()?;
        self.compile_expression()?;
        self.tokens.advance()?;
        self.expect_symbol(')')?;

        // Leave the loop when the condition fails
        self.writer.arithmetic("not");
        self.writer.if_goto(&self.labels.while_end());

        self.tokens.advance()?;
        self.expect_symbol('{')?;
        self.tokens.advance()?;
        self.compile_statements()?;
        self.tokens.advance()?;
        self.expect_symbol('}')?;

        self.writer.goto(&self.labels.while_exp());
        self.writer.label(&self.labels.while_end());

        self.labels.end_while();
        Ok(())
    }

    /// return expression? `;` - a void return still pushes a value, which
    /// the caller's `do` discards.
    fn compile_return(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::Return)?;

        if self.next_is_symbol(';') {
            self.tokens.advance()?;
            self.writer.push("constant", 0);
            self.writer.ret();
            return Ok(());
        }

        self.tokens.advance()?;
        self.compile_expression()?;

        self.tokens.advance()?;
        self.expect_symbol(';')?;

        self.writer.ret();
        Ok(())
    }

    /// if `(` expression `)` `{` statements `}` (`else` `{` statements `}`)?
    fn compile_if(&mut self) -> Result<(), CompileError> {
        self.expect_keyword(Keyword::If)?;

        self.tokens.advance()?;
        self.expect_symbol('(')?;
        self.tokens.advance()?;
        self.compile_expression()?;
        self.tokens.advance()?;
        self.expect_symbol(')')?;

        self.labels.start_if();
        self.writer.if_goto(&self.labels.if_true());
        self.writer.goto(&self.labels.if_false());

        self.tokens.advance()?;
        self.expect_symbol('{')?;
        self.writer.label(&self.labels.if_true());
        self.tokens.advance()?;
        self.compile_statements()?;
        self.tokens.advance()?;
        self.expect_symbol('}')?;

        if self.next_is_keyword(Keyword::Else) {
            // Falling out of the then-branch must skip the else-branch
            self.writer.goto(&self.labels.if_end());
            self.writer.label(&self.labels.if_false());

            self.tokens.advance()?; // `else`
            self.tokens.advance()?;
            self.expect_symbol('{')?;
            self.tokens.advance()?;
            self.compile_statements()?;
            self.tokens.advance()?;
            self.expect_symbol('}')?;

            self.writer.label(&self.labels.if_end());
        } else {
            self.writer.label(&self.labels.if_false());
        }

        self.labels.end_if();
        Ok(())
    }

    // ---- expressions ---------------------------------------------------

    /// expression: term (op term)*
    ///
    /// Each operator beyond the first flushes its predecessor, giving the
    /// flat left-to-right order; the final pending operator is flushed at
    /// the end of the expression.
    fn compile_expression(&mut self) -> Result<(), CompileError> {
        let mut have_pending = false;
        loop {
            self.compile_term()?;

            let op_code = match self.tokens.look_ahead(1) {
                Ok(next) => binary_op_code(next),
                Err(_) => None,
            };
            let Some(op_code) = op_code else { break };

            self.tokens.advance()?; // the operator
            if have_pending {
                self.flush_operator();
            }
            self.operators.push(PendingOp::Op(op_code));
            have_pending = true;

            self.tokens.advance()?; // first token of the next term
        }

        if have_pending {
            self.flush_operator();
        }
        Ok(())
    }

    fn flush_operator(&mut self) {
        let top = self.operators.pop();
        debug_assert!(
            matches!(top, Some(PendingOp::Op(_))),
            "operator stack out of sync"
        );
        if let Some(PendingOp::Op(code)) = top {
            self.writer.arithmetic(code);
        }
    }

    /// expressionList: (expression (`,` expression)*)?
    ///
    /// Enters on the token after `(`; leaves on the last expression token
    /// (or, for an empty list, steps back so the caller's advance hits the
    /// `)` again). Returns the number of expressions.
    fn compile_expression_list(&mut self) -> Result<u16, CompileError> {
        if self.current_is_symbol(')') {
            self.tokens.backward();
            return Ok(0);
        }

        let mut count = 0;
        loop {
            self.compile_expression()?;
            count += 1;

            if !self.next_is_symbol(',') {
                break;
            }
            self.tokens.advance()?; // `,`
            self.tokens.advance()?;
        }
        Ok(count)
    }

    /// term: constant | variable | array entry | call | `(` expression `)`
    /// | unaryOp term
    fn compile_term(&mut self) -> Result<(), CompileError> {
        let token = self.current()?.clone();
        match &token.kind {
            TokenKind::IntConst(value) => {
                self.writer.push("constant", *value);
                Ok(())
            }
            TokenKind::StrConst(text) => {
                self.compile_string_constant(text);
                Ok(())
            }
            TokenKind::Keyword(Keyword::True) => {
                // true is all ones
                self.writer.push("constant", 0);
                self.writer.arithmetic("not");
                Ok(())
            }
            TokenKind::Keyword(Keyword::False | Keyword::Null) => {
                self.writer.push("constant", 0);
                Ok(())
            }
            TokenKind::Keyword(Keyword::This) => {
                self.writer.push("pointer", 0);
                Ok(())
            }
            TokenKind::Symbol(op @ ('-' | '~')) => {
                let code = if *op == '-' { "neg" } else { "not" };
                self.tokens.advance()?;
                self.compile_term()?;
                self.writer.arithmetic(code);
                Ok(())
            }
            TokenKind::Symbol('(') => {
                // Sub-expression: bound the operator stack with a sentinel
                self.operators.push(PendingOp::Sentinel);
                self.tokens.advance()?;
                self.compile_expression()?;
                self.tokens.advance()?;
                self.expect_symbol(')')?;
                while let Some(entry) = self.operators.pop() {
                    match entry {
                        PendingOp::Sentinel => break,
                        PendingOp::Op(code) => self.writer.arithmetic(code),
                    }
                }
                Ok(())
            }
            TokenKind::Identifier(name) => {
                if self.next_is_symbol('(') || self.next_is_symbol('.') {
                    self.compile_subroutine_call()
                } else if self.next_is_symbol('[') {
                    // a[e]: compute the address, read through THAT
                    let array = self.resolve_or_fail(name)?;
                    self.tokens.advance()?; // `[`
                    self.tokens.advance()?;
                    self.compile_expression()?;
                    self.tokens.advance()?;
                    self.expect_symbol(']')?;
                    self.writer.push(array.segment, array.index);
                    self.writer.arithmetic("add");
                    self.writer.pop("pointer", 1);
                    self.writer.push("that", 0);
                    Ok(())
                } else {
                    let var = self.resolve_or_fail(name)?;
                    self.writer.push(var.segment, var.index);
                    Ok(())
                }
            }
            _ => Err(self.unexpected("a term")),
        }
    }

    /// `push constant <len>; call String.new 1` then one appendChar per
    /// character.
    fn compile_string_constant(&mut self, text: &str) {
        self.writer.push("constant", text.len() as u16);
        self.writer.call("String.new", 1);
        for ch in text.chars() {
            self.writer.push("constant", ch as u16);
            self.writer.call("String.appendChar", 2);
        }
    }

    /// subroutineCall: name `(` expressionList `)`
    /// | (className | varName) `.` name `(` expressionList `)`
    ///
    /// A bare `foo(...)` is a method call on `this`. A qualified
    /// `x.foo(...)` is a method call when `x` is a known variable (its
    /// class type provides the target name), otherwise a plain call on the
    /// class `x`. The receiver, when there is one, goes on the stack
    /// before the arguments.
    fn compile_subroutine_call(&mut self) -> Result<(), CompileError> {
        let prefix = self.current_identifier()?;

        let receiver: Option<(&'static str, u16)>;
        let full_name: String;

        if self.next_is_symbol('.') {
            let (call_class, recv) = match self.resolve(&prefix) {
                Some(var) => (var.ty.clone(), Some((var.segment, var.index))),
                None => (prefix, None),
            };
            receiver = recv;

            self.tokens.advance()?; // `.`
            self.tokens.advance()?;
            let method = self.current_identifier()?;
            full_name = format!("{call_class}.{method}");
        } else {
            receiver = Some(("pointer", 0));
            full_name = format!("{}.{prefix}", self.class_name);
        }

        self.tokens.advance()?;
        self.expect_symbol('(')?;

        let implicit = match receiver {
            Some((segment, index)) => {
                self.writer.push(segment, index);
                1
            }
            None => 0,
        };

        self.tokens.advance()?;
        let n_args = self.compile_expression_list()?;
        self.tokens.advance()?;
        self.expect_symbol(')')?;

        self.writer.call(&full_name, n_args + implicit);
        Ok(())
    }
}

/// VM code for a binary operator token, if it is one.
fn binary_op_code(token: &Token) -> Option<&'static str> {
    match token.kind {
        TokenKind::Symbol('+') => Some("add"),
        TokenKind::Symbol('-') => Some("sub"),
        TokenKind::Symbol('*') => Some("call Math.multiply 2"),
        TokenKind::Symbol('/') => Some("call Math.divide 2"),
        TokenKind::Symbol('&') => Some("and"),
        TokenKind::Symbol('|') => Some("or"),
        TokenKind::Symbol('<') => Some("lt"),
        TokenKind::Symbol('>') => Some("gt"),
        TokenKind::Symbol('=') => Some("eq"),
        _ => None,
    }
}
