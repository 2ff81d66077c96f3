use std::fmt::Display;
use std::rc::Rc;

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    Let(LetStatement),
    Return(ReturnStatement),
    Expression(Expression),
    While(WhileStatement),
}

#[derive(Debug, PartialEq, Clone)]
pub struct LetStatement {
    pub identifier: Identifier,
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ReturnStatement {
    pub value: Expression,
}

#[derive(Debug, PartialEq, Clone)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: BlockStatement,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(Identifier),
    IntegerLiteral(i64),
    StringLiteral(String),
    BooleanLiteral(bool),
    ArrayLiteral(Vec<Expression>),
    HashLiteral(Vec<(Expression, Expression)>),
    PrefixOperation(PrefixOperator, Box<Expression>),
    InfixOperation(InfixOperator, Box<Expression>, Box<Expression>),
    IfExpression {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    FunctionLiteral {
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    MacroLiteral {
        parameters: Vec<Identifier>,
        body: BlockStatement,
    },
    CallExpression {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    IndexExpression {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub enum InfixOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
}

#[derive(Debug, PartialEq, Clone)]
pub enum PrefixOperator {
    Minus,
    Bang,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub name: Rc<str>,
}

#[derive(Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

impl Program {
    /// Rewrites every expression in the program with `f`, bottom up. See
    /// [`Expression::modify`].
    pub fn modify<E, F>(self, f: &mut F) -> Result<Program, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        let statements = self
            .statements
            .into_iter()
            .map(|statement| statement.modify(f))
            .collect::<Result<_, _>>()?;
        Ok(Program { statements })
    }
}

impl Statement {
    pub fn modify<E, F>(self, f: &mut F) -> Result<Statement, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        Ok(match self {
            Statement::Let(statement) => Statement::Let(LetStatement {
                identifier: statement.identifier,
                value: statement.value.modify(f)?,
            }),
            Statement::Return(statement) => Statement::Return(ReturnStatement {
                value: statement.value.modify(f)?,
            }),
            Statement::Expression(expression) => Statement::Expression(expression.modify(f)?),
            Statement::While(statement) => Statement::While(WhileStatement {
                condition: statement.condition.modify(f)?,
                body: statement.body.modify(f)?,
            }),
        })
    }
}

impl BlockStatement {
    pub fn modify<E, F>(self, f: &mut F) -> Result<BlockStatement, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        let statements = self
            .statements
            .into_iter()
            .map(|statement| statement.modify(f))
            .collect::<Result<_, _>>()?;
        Ok(BlockStatement { statements })
    }
}

impl Expression {
    /// Post-order rewrite: children are rebuilt first, then `f` is applied
    /// to the node itself, so `f` sees every expression exactly once. The
    /// first `Err` aborts the traversal.
    pub fn modify<E, F>(self, f: &mut F) -> Result<Expression, E>
    where
        F: FnMut(Expression) -> Result<Expression, E>,
    {
        use Expression::*;
        let node = match self {
            Identifier(_) | IntegerLiteral(_) | StringLiteral(_) | BooleanLiteral(_) => self,
            ArrayLiteral(elements) => ArrayLiteral(
                elements
                    .into_iter()
                    .map(|element| element.modify(f))
                    .collect::<Result<_, _>>()?,
            ),
            HashLiteral(pairs) => HashLiteral(
                pairs
                    .into_iter()
                    .map(|(key, value)| Ok((key.modify(f)?, value.modify(f)?)))
                    .collect::<Result<_, _>>()?,
            ),
            PrefixOperation(operator, right) => {
                PrefixOperation(operator, Box::new(right.modify(f)?))
            }
            InfixOperation(operator, left, right) => InfixOperation(
                operator,
                Box::new(left.modify(f)?),
                Box::new(right.modify(f)?),
            ),
            IfExpression {
                condition,
                consequence,
                alternative,
            } => IfExpression {
                condition: Box::new(condition.modify(f)?),
                consequence: consequence.modify(f)?,
                alternative: alternative.map(|block| block.modify(f)).transpose()?,
            },
            FunctionLiteral { parameters, body } => FunctionLiteral {
                parameters,
                body: body.modify(f)?,
            },
            MacroLiteral { parameters, body } => MacroLiteral {
                parameters,
                body: body.modify(f)?,
            },
            CallExpression {
                function,
                arguments,
            } => CallExpression {
                function: Box::new(function.modify(f)?),
                arguments: arguments
                    .into_iter()
                    .map(|argument| argument.modify(f))
                    .collect::<Result<_, _>>()?,
            },
            IndexExpression { left, index } => IndexExpression {
                left: Box::new(left.modify(f)?),
                index: Box::new(index.modify(f)?),
            },
        };
        f(node)
    }
}

impl Display for LetStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "let {} = {};", self.identifier.name, self.value)
    }
}

impl Display for ReturnStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "return {};", self.value)
    }
}

impl Display for WhileStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "while {} {}", self.condition, self.body)
    }
}

impl Display for BlockStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        write!(f, "}}")
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(ident) => write!(f, "{}", ident.name),
            IntegerLiteral(val) => write!(f, "{}", val),
            StringLiteral(val) => write!(f, "\"{}\"", val),
            BooleanLiteral(val) => write!(f, "{}", val),
            ArrayLiteral(arr) => {
                write!(f, "[")?;
                for (i, expr) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", expr)?;
                }
                write!(f, "]")
            }
            HashLiteral(hash) => {
                write!(f, "{{")?;
                for (i, (key, value)) in hash.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            PrefixOperation(operator, expr) => write!(f, "({}{})", operator, expr),
            InfixOperation(operator, left, right) => {
                write!(f, "({} {} {})", left, operator, right)
            }
            IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if {} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            FunctionLiteral { parameters, body } => {
                write!(f, "fn({}) {}", join_names(parameters), body)
            }
            MacroLiteral { parameters, body } => {
                write!(f, "macro({}) {}", join_names(parameters), body)
            }
            CallExpression {
                function,
                arguments,
            } => {
                write!(
                    f,
                    "{}({})",
                    function,
                    arguments
                        .iter()
                        .map(|arg| arg.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
            IndexExpression { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}

fn join_names(identifiers: &[Identifier]) -> String {
    identifiers
        .iter()
        .map(|id| id.name.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Statement::*;
        match self {
            Let(statement) => write!(f, "{}", statement),
            Return(statement) => write!(f, "{}", statement),
            Expression(expression) => write!(f, "{};", expression),
            While(statement) => write!(f, "{}", statement),
        }
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use InfixOperator::*;
        let s = match self {
            Plus => "+",
            Minus => "-",
            Multiply => "*",
            Divide => "/",
            LessThan => "<",
            GreaterThan => ">",
            Equal => "==",
            NotEqual => "!=",
        };
        write!(f, "{}", s)
    }
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use PrefixOperator::*;
        match self {
            Minus => write!(f, "-"),
            Bang => write!(f, "!"),
        }
    }
}
