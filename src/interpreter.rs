use crate::{
    ast::{Expr, LogicOp, Operand, Span, Statement, StatementKind},
    common::{Diagnostic, Line, RuntimeError},
    config::Config,
    parser::{self, Parser},
    token::{NumberClass, Token, TokenKind},
    value::{Value, ValueType},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: Value,
}

impl Binding {
    pub fn kind(&self) -> ValueType {
        self.value.kind()
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {} = {}]", self.kind(), self.name, self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    bindings: Vec<Binding>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, name: &str, value: Value) {
        if let Some(binding) = self.bindings.iter_mut().find(|b| b.name == name) {
            binding.value = value;
        } else {
            self.bindings.push(Binding {
                name: name.to_string(),
                value,
            });
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|binding| binding.name == name)
            .map(|binding| &binding.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub body: Span,
    pub line: Line,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionTable {
    defs: Vec<FunctionDef>,
}

impl FunctionTable {
    pub fn define(&mut self, def: FunctionDef) -> bool {
        let reachable = self.lookup(&def.name).is_none();
        self.defs.push(def);
        reachable
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionDef> {
        self.defs.iter().find(|def| def.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    Program,
    Block,
    Call(String),
}

impl std::fmt::Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameKind::Program => write!(f, "the program"),
            FrameKind::Block => write!(f, "a block"),
            FrameKind::Call(name) => write!(f, "function `{}`", name),
        }
    }
}

#[derive(Debug, Clone)]
struct Frame {
    kind: FrameKind,
    span: Span,
    cursor: usize,
}

// A return travels out through block frames until a call frame (or the
// program frame) consumes it. `Failed` is a return whose value could not be
// computed; the call site reports its error.
#[derive(Debug, Clone, PartialEq)]
enum Flow {
    Next,
    Return(Option<Value>),
    Failed(RuntimeError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub line: Line,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    Success,
    ReturnValue(Value),
    RuntimeError(RuntimeError),
}

#[derive(Debug, Clone)]
pub struct Execution {
    pub output: Vec<OutputLine>,
    pub diagnostics: Vec<Diagnostic>,
    pub environment: Environment,
    pub functions: FunctionTable,
    pub result: ExecutionResult,
}

impl Execution {
    pub fn printed(&self) -> Vec<&str> {
        self.output.iter().map(|line| line.text.as_str()).collect()
    }

    pub fn runtime_errors(&self) -> impl Iterator<Item = &RuntimeError> {
        self.diagnostics.iter().filter_map(|diagnostic| match diagnostic {
            Diagnostic::Runtime(err) => Some(err),
            Diagnostic::Parse(_) => None,
        })
    }
}

struct Interpreter<'a> {
    tokens: &'a [Token],
    config: Config,

    environment: Environment,
    functions: FunctionTable,
    frames: Vec<Frame>,

    output: Vec<OutputLine>,
    diagnostics: Vec<Diagnostic>,
    first_error: Option<RuntimeError>,
}

impl<'a> Interpreter<'a> {
    fn new(tokens: &'a [Token], config: Config) -> Self {
        Interpreter {
            tokens,
            config,
            environment: Environment::new(),
            functions: FunctionTable::default(),
            frames: Vec::new(),
            output: Vec::new(),
            diagnostics: Vec::new(),
            first_error: None,
        }
    }

    fn report(&mut self, err: RuntimeError) {
        tracing::debug!(%err, "runtime error");
        if self.first_error.is_none() {
            self.first_error = Some(err.clone());
        }
        self.diagnostics.push(err.into());
    }

    fn run_frame(&mut self, kind: FrameKind, span: Span, line: Line) -> Result<Flow, RuntimeError> {
        if self.frames.len() >= self.config.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                frame: kind.to_string(),
                limit: self.config.max_call_depth,
                line,
            });
        }

        tracing::trace!(?kind, ?span, depth = self.frames.len(), "enter frame");
        self.frames.push(Frame {
            kind,
            cursor: span.start,
            span,
        });

        let flow = self.run_top();

        if let Some(frame) = self.frames.pop() {
            tracing::trace!(kind = ?frame.kind, ?flow, "leave frame");
        }
        Ok(flow)
    }

    fn run_top(&mut self) -> Flow {
        loop {
            let (span, cursor) = match self.frames.last() {
                Some(frame) => (frame.span.clone(), frame.cursor),
                None => return Flow::Next,
            };

            let mut parser = Parser::at(self.tokens, span, cursor);
            let next = parser.next_statement();
            if let Some(frame) = self.frames.last_mut() {
                frame.cursor = parser.cursor();
            }

            match next {
                None => return Flow::Next,
                // already reported by `parser::check`
                Some(Err(err)) => tracing::trace!(%err, "skipped malformed statement"),
                Some(Ok(statement)) => match self.execute_statement(&statement) {
                    Flow::Next => {}
                    flow => return flow,
                },
            }
        }
    }

    fn execute_statement(&mut self, statement: &Statement<'a>) -> Flow {
        tracing::trace!(line = statement.line, span = ?statement.span, kind = ?statement.kind, "execute");

        match self.try_execute(statement) {
            Ok(flow) => flow,
            Err(err) => {
                self.report(err);
                Flow::Next
            }
        }
    }

    fn try_execute(&mut self, statement: &Statement<'a>) -> Result<Flow, RuntimeError> {
        match &statement.kind {
            StatementKind::Declare(declare) => {
                let value = self.evaluate(&declare.value)?;
                self.environment.declare(&declare.name.lexeme, value);
                Ok(Flow::Next)
            }
            StatementKind::Print(print) => {
                let value = self.evaluate(&print.value)?;
                self.output.push(OutputLine {
                    line: statement.line,
                    text: value.to_string(),
                });
                Ok(Flow::Next)
            }
            StatementKind::If(if_stmt) => match self.evaluate(&if_stmt.condition)? {
                Value::Boolean(true) => {
                    self.run_frame(FrameKind::Block, if_stmt.body.clone(), statement.line)
                }
                Value::Boolean(false) => Ok(Flow::Next),
                other => Err(RuntimeError::TypeError {
                    expected: ValueType::Boolean,
                    found: other.kind(),
                    line: statement.line,
                }),
            },
            StatementKind::For(for_stmt) => {
                let start = self.loop_bound(for_stmt.start)?;
                let end = self.loop_bound(for_stmt.end)?;

                for index in start..=end {
                    self.environment
                        .declare(&for_stmt.ident.lexeme, Value::Number(index.to_string()));

                    let flow = self.run_frame(FrameKind::Block, for_stmt.body.clone(), statement.line)?;
                    if flow != Flow::Next {
                        return Ok(flow);
                    }
                }

                Ok(Flow::Next)
            }
            StatementKind::Function(function) => {
                let reachable = self.functions.define(FunctionDef {
                    name: function.name.lexeme.clone(),
                    body: function.body.clone(),
                    line: statement.line,
                });
                if !reachable {
                    tracing::warn!(
                        name = %function.name.lexeme,
                        line = statement.line,
                        "function already defined, this definition is unreachable"
                    );
                }
                Ok(Flow::Next)
            }
            StatementKind::Call(call) => {
                self.call(call.name)?;
                Ok(Flow::Next)
            }
            StatementKind::Return(ret) => match &ret.value {
                Some(expr) => match self.evaluate(expr) {
                    Ok(value) => Ok(Flow::Return(Some(value))),
                    Err(err) => Ok(Flow::Failed(err)),
                },
                None => Ok(Flow::Return(None)),
            },
        }
    }

    fn loop_bound(&self, token: &Token) -> Result<i64, RuntimeError> {
        let value = match token.kind {
            TokenKind::Identifier => self
                .environment
                .get(&token.lexeme)
                .cloned()
                .ok_or_else(|| RuntimeError::UndefinedVariable {
                    name: token.lexeme.clone(),
                    line: token.line,
                })?,
            _ => Value::Number(token.lexeme.clone()),
        };

        match (&value, value.number_class()) {
            (Value::Number(text), NumberClass::Integer) => {
                text.parse::<i64>()
                    .map_err(|_| RuntimeError::NumberOutOfRange {
                        text: text.clone(),
                        line: token.line,
                    })
            }
            _ => Err(RuntimeError::InvalidLoopBounds {
                details: format!("`{}` is not an integer ({})", value, value.kind()),
                line: token.line,
            }),
        }
    }

    fn call(&mut self, name: &Token) -> Result<Option<Value>, RuntimeError> {
        let body = match self.functions.lookup(&name.lexeme) {
            Some(def) => def.body.clone(),
            None => {
                return Err(RuntimeError::UndefinedFunction {
                    name: name.lexeme.clone(),
                    line: name.line,
                })
            }
        };

        match self.run_frame(FrameKind::Call(name.lexeme.clone()), body, name.line)? {
            Flow::Return(value) => Ok(value),
            Flow::Failed(err) => Err(err),
            Flow::Next => Ok(None),
        }
    }

    fn evaluate(&mut self, expr: &Expr<'a>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Operand(operand) => self.operand(operand),
            Expr::Compare {
                left,
                right,
                negated,
            } => {
                let left_value = self.operand(left)?;
                let right_value = self.operand(right)?;
                if left_value.kind() != right_value.kind() {
                    return Err(RuntimeError::CompareMismatch {
                        left: left_value.kind(),
                        right: right_value.kind(),
                        line: left.line(),
                    });
                }

                Ok(Value::Boolean((left_value == right_value) != *negated))
            }
            Expr::Sum(operands) => self.sum(operands),
            Expr::Logic { first, rest } => {
                let mut result = self.boolean(first)?;
                for (op, operand) in rest {
                    let next = self.boolean(operand)?;
                    result = match op {
                        LogicOp::And => result && next,
                        LogicOp::Or => result || next,
                    };
                }

                Ok(Value::Boolean(result))
            }
        }
    }

    fn operand(&mut self, operand: &Operand<'a>) -> Result<Value, RuntimeError> {
        match operand {
            Operand::Literal { value, .. } => Ok(value.clone()),
            Operand::Variable(token) => self.environment.get(&token.lexeme).cloned().ok_or_else(|| {
                RuntimeError::UndefinedVariable {
                    name: token.lexeme.clone(),
                    line: token.line,
                }
            }),
            Operand::Call(token) => self.call(token)?.ok_or_else(|| RuntimeError::NoValue {
                name: token.lexeme.clone(),
                line: token.line,
            }),
            Operand::Group(expr) => self.evaluate(expr),
            Operand::Not(inner) => Ok(Value::Boolean(!self.boolean(inner)?)),
        }
    }

    fn boolean(&mut self, operand: &Operand<'a>) -> Result<bool, RuntimeError> {
        match self.operand(operand)? {
            Value::Boolean(boolean) => Ok(boolean),
            other => Err(RuntimeError::TypeError {
                expected: ValueType::Boolean,
                found: other.kind(),
                line: operand.line(),
            }),
        }
    }

    fn sum(&mut self, operands: &[Operand<'a>]) -> Result<Value, RuntimeError> {
        let mut values = Vec::with_capacity(operands.len());
        for operand in operands {
            values.push((self.operand(operand)?, operand.line()));
        }

        let left = match values.first() {
            Some((value, _)) => value.kind(),
            None => return Ok(Value::String(String::new())),
        };
        if let Some((value, line)) = values.iter().find(|(value, _)| value.kind() != left) {
            return Err(RuntimeError::OperandMismatch {
                op: "+",
                left,
                right: value.kind(),
                line: *line,
            });
        }

        match left {
            ValueType::String => Ok(Value::String(
                values.iter().map(|(value, _)| value.text()).collect(),
            )),
            ValueType::Number => add_numbers(&values),
            ValueType::Boolean => Err(RuntimeError::OperandMismatch {
                op: "+",
                left,
                right: left,
                line: values[0].1,
            }),
        }
    }
}

fn add_numbers(values: &[(Value, Line)]) -> Result<Value, RuntimeError> {
    let out_of_range = |text: &str, line: Line| RuntimeError::NumberOutOfRange {
        text: text.to_string(),
        line,
    };

    let all_integers = values
        .iter()
        .all(|(value, _)| value.number_class() == NumberClass::Integer);

    if all_integers {
        let mut total: i64 = 0;
        for (value, line) in values {
            let text = value.text();
            let number = text.parse::<i64>().map_err(|_| out_of_range(&text, *line))?;
            total = total
                .checked_add(number)
                .ok_or_else(|| out_of_range(&format!("{} + {}", total, number), *line))?;
        }
        return Ok(Value::Number(total.to_string()));
    }

    let mut total = 0.0f64;
    for (value, line) in values {
        let text = value.text();
        total += text.parse::<f64>().map_err(|_| out_of_range(&text, *line))?;
        if !total.is_finite() {
            return Err(out_of_range(&text, *line));
        }
    }

    let mut text = total.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    Ok(Value::Number(text))
}

/// Checks and then runs a token sequence. Diagnostics never stop the run;
/// with [`Config::strict`] a program with parse diagnostics is not run at all.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn execute(tokens: &[Token], config: &Config) -> Execution {
    let mut interpreter = Interpreter::new(tokens, config.clone());
    interpreter
        .diagnostics
        .extend(parser::check(tokens).into_iter().map(Diagnostic::from));

    let flow = if config.strict && !interpreter.diagnostics.is_empty() {
        tracing::debug!("strict mode, program not executed");
        Flow::Next
    } else {
        let line = tokens.first().map_or(1, |token| token.line);
        match interpreter.run_frame(FrameKind::Program, 0..tokens.len(), line) {
            Ok(Flow::Failed(err)) | Err(err) => {
                interpreter.report(err);
                Flow::Next
            }
            Ok(flow) => flow,
        }
    };

    let result = match (flow, interpreter.first_error.take()) {
        (Flow::Return(Some(value)), _) => ExecutionResult::ReturnValue(value),
        (_, Some(err)) => ExecutionResult::RuntimeError(err),
        _ => ExecutionResult::Success,
    };

    Execution {
        output: interpreter.output,
        diagnostics: interpreter.diagnostics,
        environment: interpreter.environment,
        functions: interpreter.functions,
        result,
    }
}
