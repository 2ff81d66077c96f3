use gc::Gc;

use crate::environment::Environment;
use crate::evaluator;
use crate::object::{EarlyExit, EvaluationError, Function, Object};
use junk_lang_core::ast::{Expression, LetStatement, Program, Statement};

/// Pulls `let <name> = macro(..) {..}` statements out of the top level of
/// the program, binding each macro under its name. Definitions anywhere
/// deeper are left alone.
pub fn define_macros(program: &mut Program, environment: &mut Environment) {
    let statements = std::mem::take(&mut program.statements);
    program.statements = statements
        .into_iter()
        .filter_map(|statement| match statement {
            Statement::Let(let_statement) => match let_statement.value {
                Expression::MacroLiteral { parameters, body } => {
                    let makro = Object::Macro(Function {
                        parameters,
                        body,
                        env: environment.clone(),
                    });
                    environment.set(&let_statement.identifier.name, Gc::new(makro));
                    None
                }
                value => Some(Statement::Let(LetStatement {
                    identifier: let_statement.identifier,
                    value,
                })),
            },
            other => Some(other),
        })
        .collect();
}

/// Rewrites every call to a defined macro into the AST its body returns.
/// Arguments reach the body unevaluated, wrapped as quotes; the body must
/// produce a quote in turn. Expansion results are not re-expanded.
pub fn expand_macros(
    program: Program,
    environment: &mut Environment,
) -> Result<Program, EvaluationError> {
    program.modify(&mut |expression| match expression {
        Expression::CallExpression {
            function,
            arguments,
        } => match lookup_macro(&function, environment) {
            Some(makro) => expand_macro_call(&makro, arguments),
            None => Ok(Expression::CallExpression {
                function,
                arguments,
            }),
        },
        other => Ok(other),
    })
}

fn lookup_macro(function: &Expression, environment: &Environment) -> Option<Function> {
    let Expression::Identifier(identifier) = function else {
        return None;
    };
    let object = environment.get(&identifier.name)?;
    match &*object {
        Object::Macro(makro) => Some(makro.clone()),
        _ => None,
    }
}

fn expand_macro_call(
    makro: &Function,
    arguments: Vec<Expression>,
) -> Result<Expression, EvaluationError> {
    let mut expansion_environment = Environment::new_enclosed(makro.env.clone());
    let mut arguments = arguments.into_iter();
    for parameter in &makro.parameters {
        let quoted = arguments
            .next()
            .map(|argument| Gc::new(Object::Quote(argument)))
            .unwrap_or_else(Object::null);
        expansion_environment.set(&parameter.name, quoted);
    }

    let result = evaluator::eval_block_statement(&makro.body, &mut expansion_environment);
    let value = match result {
        Ok(value) => value,
        Err(EarlyExit::Return(value)) => value,
        Err(EarlyExit::Error(error)) => return Err(error),
    };
    match &*value {
        Object::Quote(node) => Ok(node.clone()),
        _ => Err(EvaluationError::NonQuoteMacroResult),
    }
}
