use std::collections::HashMap;

use gc::Gc;

use crate::environment::Environment;
use crate::object::{hash_key, EarlyExit, EvaluationError, Function, Object};
use junk_lang_core::ast;
use junk_lang_core::ast::Expression;

/// Top level entry point. A `return` reaching the end of the program is
/// unwrapped once; the first runtime error aborts everything.
pub fn eval_program(
    program: &ast::Program,
    environment: &mut Environment,
) -> Result<Gc<Object>, EvaluationError> {
    let mut output = Object::null();
    for statement in &program.statements {
        match eval_statement(statement, environment) {
            Ok(object) => output = object,
            Err(EarlyExit::Return(value)) => return Ok(value),
            Err(EarlyExit::Error(error)) => return Err(error),
        }
    }
    Ok(output)
}

fn eval_statement(
    statement: &ast::Statement,
    environment: &mut Environment,
) -> Result<Gc<Object>, EarlyExit> {
    match statement {
        ast::Statement::Expression(expression) => eval_expression(expression, environment),
        ast::Statement::Return(statement) => eval_return_statement(statement, environment),
        ast::Statement::Let(statement) => eval_let_statement(statement, environment),
        ast::Statement::While(statement) => eval_while_statement(statement, environment),
    }
}

fn eval_let_statement(
    statement: &ast::LetStatement,
    environment: &mut Environment,
) -> Result<Gc<Object>, EarlyExit> {
    let value = eval_expression(&statement.value, environment)?;
    environment.set(&statement.identifier.name, value);
    Ok(Object::null())
}

fn eval_return_statement(
    statement: &ast::ReturnStatement,
    environment: &mut Environment,
) -> Result<Gc<Object>, EarlyExit> {
    let value = eval_expression(&statement.value, environment)?;
    Err(EarlyExit::Return(value))
}

// The loop owns one enclosed scope, shared by the condition and every
// iteration of the body: a `let` in the body shadows the outer binding but
// stays visible to the condition. The loop itself evaluates to null.
fn eval_while_statement(
    statement: &ast::WhileStatement,
    environment: &mut Environment,
) -> Result<Gc<Object>, EarlyExit> {
    let mut loop_environment = Environment::new_enclosed(environment.clone());
    loop {
        let condition = eval_expression(&statement.condition, &mut loop_environment)?;
        if !is_truthy(&condition) {
            return Ok(Object::null());
        }
        eval_block_statement(&statement.body, &mut loop_environment)?;
    }
}

// false and null are falsy; every other value, 0 and "" included, is truthy.
fn is_truthy(object: &Object) -> bool {
    !matches!(object, Object::Boolean(false) | Object::Null)
}

fn eval_expression(
    expression: &Expression,
    environment: &mut Environment,
) -> Result<Gc<Object>, EarlyExit> {
    match expression {
        Expression::IntegerLiteral(value) => Ok(Object::integer(*value)),
        Expression::BooleanLiteral(value) => Ok(Object::boolean(*value)),
        Expression::StringLiteral(value) => Ok(Object::string(value.clone())),
        Expression::ArrayLiteral(array) => Ok(Object::array(
            array
                .iter()
                .map(|expression| eval_expression(expression, environment))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Expression::HashLiteral(literal) => {
            let mut hashmap = HashMap::new();
            for (key_expression, value_expression) in literal {
                let key = eval_expression(key_expression, environment)?;
                let value = eval_expression(value_expression, environment)?;
                let hashed_key = hash_key(&key)?;
                // Duplicate keys: the later pair wins.
                hashmap.insert(hashed_key, (key, value));
            }
            Ok(Object::hash(hashmap))
        }
        Expression::Identifier(identifier) => {
            environment.get(&identifier.name).ok_or_else(|| {
                EvaluationError::IdentifierNotFound(identifier.name.clone()).into()
            })
        }
        Expression::PrefixOperation(operator, expression) => {
            let right = eval_expression(expression, environment)?;
            eval_prefix_operation(operator, right)
        }
        Expression::InfixOperation(operator, left, right) => {
            let left = eval_expression(left, environment)?;
            let right = eval_expression(right, environment)?;
            eval_infix_operation(operator, left, right)
        }
        Expression::IfExpression {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, environment)?;
            if is_truthy(&condition) {
                eval_block_statement(consequence, environment)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, environment)
            } else {
                Ok(Object::null())
            }
        }
        Expression::FunctionLiteral { parameters, body } => Ok(Object::function(
            parameters.clone(),
            body.clone(),
            environment.clone(),
        )),
        Expression::MacroLiteral { parameters, body } => Ok(Gc::new(Object::Macro(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: environment.clone(),
        }))),
        Expression::CallExpression {
            function,
            arguments,
        } => {
            // `quote` suppresses evaluation of its single argument.
            if let Expression::Identifier(identifier) = function.as_ref() {
                if identifier.name.as_ref() == "quote" && arguments.len() == 1 {
                    return eval_quote(arguments[0].clone(), environment);
                }
            }
            let function = eval_expression(function, environment)?;
            let arguments = eval_expressions(arguments, environment)?;
            match &*function {
                Object::Function(function) => apply_function(function, arguments),
                Object::BuiltinFunction(builtin) => (builtin.func)(arguments),
                _ => Err(EvaluationError::NotAFunction(function.type_name()).into()),
            }
        }
        Expression::IndexExpression { left, index } => {
            let left = eval_expression(left, environment)?;
            let index = eval_expression(index, environment)?;
            eval_index_expression(left, index)
        }
    }
}

fn eval_index_expression(left: Gc<Object>, index: Gc<Object>) -> Result<Gc<Object>, EarlyExit> {
    match (&*left, &*index) {
        // Out of range on either side is null, not an error.
        (Object::Array(array), Object::Integer(idx)) => Ok(usize::try_from(*idx)
            .ok()
            .and_then(|i| array.get(i))
            .cloned()
            .unwrap_or_else(Object::null)),
        (Object::Hash(pairs), _) => {
            let key = hash_key(&index)?;
            Ok(pairs
                .get(&key)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(Object::null))
        }
        _ => Err(EvaluationError::IndexOperatorNotSupported(left.type_name()).into()),
    }
}

fn eval_expressions(
    arguments: &[Expression],
    environment: &mut Environment,
) -> Result<Vec<Gc<Object>>, EarlyExit> {
    let mut result = Vec::new();
    for argument in arguments {
        result.push(eval_expression(argument, environment)?);
    }
    Ok(result)
}

fn apply_function(
    function: &Function,
    arguments: Vec<Gc<Object>>,
) -> Result<Gc<Object>, EarlyExit> {
    let mut call_environment = Environment::new_enclosed(function.env.clone());
    let mut arguments = arguments.into_iter();
    for parameter in &function.parameters {
        // Arity is not checked: extra arguments are dropped and missing
        // parameters are bound to null.
        let value = arguments.next().unwrap_or_else(Object::null);
        call_environment.set(&parameter.name, value);
    }
    match eval_block_statement(&function.body, &mut call_environment) {
        Err(EarlyExit::Return(value)) => Ok(value),
        other => other,
    }
}

pub(crate) fn eval_block_statement(
    block: &ast::BlockStatement,
    environment: &mut Environment,
) -> Result<Gc<Object>, EarlyExit> {
    let mut result = Object::null();
    for statement in &block.statements {
        result = eval_statement(statement, environment)?;
    }
    Ok(result)
}

fn eval_prefix_operation(
    operator: &ast::PrefixOperator,
    right: Gc<Object>,
) -> Result<Gc<Object>, EarlyExit> {
    match operator {
        ast::PrefixOperator::Bang => Ok(Object::boolean(!is_truthy(&right))),
        ast::PrefixOperator::Minus => match &*right {
            Object::Integer(value) => Ok(Object::integer(-value)),
            _ => Err(EvaluationError::UnknownPrefixOperator {
                operator: operator.clone(),
                right: right.type_name(),
            }
            .into()),
        },
    }
}

fn eval_infix_operation(
    operator: &ast::InfixOperator,
    left: Gc<Object>,
    right: Gc<Object>,
) -> Result<Gc<Object>, EarlyExit> {
    use ast::InfixOperator;
    match (operator, &*left, &*right) {
        (_, Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_operation(operator, *l, *r)
        }
        (InfixOperator::Plus, Object::String(l), Object::String(r)) => {
            Ok(Object::string(format!("{}{}", l, r)))
        }
        (_, Object::String(_), Object::String(_)) => Err(EvaluationError::UnknownInfixOperator {
            operator: operator.clone(),
            left: left.type_name(),
            right: right.type_name(),
        }
        .into()),
        // The singletons make value equality and identity the same thing,
        // and a boolean never equals null.
        (InfixOperator::Equal, l, r) if is_singleton(l) && is_singleton(r) => {
            Ok(Object::boolean(l == r))
        }
        (InfixOperator::NotEqual, l, r) if is_singleton(l) && is_singleton(r) => {
            Ok(Object::boolean(l != r))
        }
        (_, l, r) if l.type_name() != r.type_name() => Err(EvaluationError::TypeMismatch {
            operator: operator.clone(),
            left: l.type_name(),
            right: r.type_name(),
        }
        .into()),
        (_, l, r) => Err(EvaluationError::UnknownInfixOperator {
            operator: operator.clone(),
            left: l.type_name(),
            right: r.type_name(),
        }
        .into()),
    }
}

fn is_singleton(object: &Object) -> bool {
    matches!(object, Object::Boolean(_) | Object::Null)
}

fn eval_integer_infix_operation(
    operator: &ast::InfixOperator,
    left: i64,
    right: i64,
) -> Result<Gc<Object>, EarlyExit> {
    use ast::InfixOperator::*;
    Ok(match operator {
        Plus => Object::integer(left + right),
        Minus => Object::integer(left - right),
        Multiply => Object::integer(left * right),
        Divide => {
            if right == 0 {
                return Err(EvaluationError::DivisionByZero.into());
            }
            Object::integer(left / right)
        }
        LessThan => Object::boolean(left < right),
        GreaterThan => Object::boolean(left > right),
        Equal => Object::boolean(left == right),
        NotEqual => Object::boolean(left != right),
    })
}

fn eval_quote(
    expression: Expression,
    environment: &mut Environment,
) -> Result<Gc<Object>, EarlyExit> {
    let node = process_unquote_calls(expression, environment)?;
    Ok(Gc::new(Object::Quote(node)))
}

// Within a quoted tree only `unquote(..)` calls are evaluated; their results
// are turned back into literal nodes and spliced in place of the call.
fn process_unquote_calls(
    expression: Expression,
    environment: &mut Environment,
) -> Result<Expression, EarlyExit> {
    expression.modify(&mut |node| match node {
        Expression::CallExpression {
            function,
            arguments,
        } if is_unquote_call(&function, &arguments) => {
            let mut arguments = arguments;
            let argument = arguments.pop().expect("unquote call has one argument");
            let value = eval_expression(&argument, environment)?;
            expression_from_object(&value).map_err(EarlyExit::Error)
        }
        other => Ok(other),
    })
}

fn is_unquote_call(function: &Expression, arguments: &[Expression]) -> bool {
    matches!(function, Expression::Identifier(identifier) if identifier.name.as_ref() == "unquote")
        && arguments.len() == 1
}

fn expression_from_object(object: &Object) -> Result<Expression, EvaluationError> {
    match object {
        Object::Integer(value) => Ok(Expression::IntegerLiteral(*value)),
        Object::Boolean(value) => Ok(Expression::BooleanLiteral(*value)),
        Object::Quote(node) => Ok(node.clone()),
        _ => Err(EvaluationError::UnquoteUnsupported(object.type_name())),
    }
}
