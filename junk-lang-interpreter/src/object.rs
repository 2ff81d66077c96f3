use std::collections::HashMap;
use std::rc::Rc;

use gc::{Finalize, Gc, Trace};
use thiserror::Error;

use crate::environment::Environment;
use junk_lang_core::ast;

#[derive(Debug, PartialEq, Clone, Trace, Finalize)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<Gc<Object>>),
    // The original key object is kept next to the value so that hashes can
    // be displayed.
    Hash(HashMap<HashKey, (Gc<Object>, Gc<Object>)>),
    Function(Function),
    Macro(Function),
    BuiltinFunction(BuiltinFunction),
    Quote(#[unsafe_ignore_trace] ast::Expression),
    Null,
}

thread_local! {
    static NULL: Gc<Object> = Gc::new(Object::Null);
    static TRUE: Gc<Object> = Gc::new(Object::Boolean(true));
    static FALSE: Gc<Object> = Gc::new(Object::Boolean(false));
}

impl Object {
    pub fn null() -> Gc<Object> {
        NULL.with(|x| x.clone())
    }
    pub fn boolean(value: bool) -> Gc<Object> {
        if value {
            TRUE.with(|x| x.clone())
        } else {
            FALSE.with(|x| x.clone())
        }
    }
    pub fn integer(value: i64) -> Gc<Object> {
        Gc::new(Object::Integer(value))
    }
    pub fn string(value: String) -> Gc<Object> {
        Gc::new(Object::String(value))
    }
    pub fn array(array: Vec<Gc<Object>>) -> Gc<Object> {
        Gc::new(Object::Array(array))
    }
    pub fn hash(hash: HashMap<HashKey, (Gc<Object>, Gc<Object>)>) -> Gc<Object> {
        Gc::new(Object::Hash(hash))
    }
    pub fn function(
        parameters: Vec<ast::Identifier>,
        body: ast::BlockStatement,
        env: Environment,
    ) -> Gc<Object> {
        Gc::new(Object::Function(Function {
            parameters,
            body,
            env,
        }))
    }
    pub fn builtin_function(func: BuiltinFunction) -> Gc<Object> {
        Gc::new(Object::BuiltinFunction(func))
    }

    /// The tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::String(_) => "STRING",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FUNCTION",
            Object::Macro(_) => "MACRO",
            Object::BuiltinFunction(_) => "BUILTIN",
            Object::Quote(_) => "QUOTE",
            Object::Null => "NULL",
        }
    }
}

impl std::fmt::Display for Object {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(value) => write!(f, "{}", value),
            Object::String(value) => write!(f, "{}", value),
            Object::Null => write!(f, "null"),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Hash(pairs) => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Object::Function(function) => {
                write!(f, "fn({}) {}", join_names(&function.parameters), function.body)
            }
            Object::Macro(function) => {
                write!(
                    f,
                    "macro({}) {}",
                    join_names(&function.parameters),
                    function.body
                )
            }
            Object::BuiltinFunction(_) => write!(f, "builtin function"),
            Object::Quote(node) => write!(f, "QUOTE({})", node),
        }
    }
}

fn join_names(identifiers: &[ast::Identifier]) -> String {
    identifiers
        .iter()
        .map(|id| id.name.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

#[derive(Clone, PartialEq, Trace, Finalize)]
pub struct Function {
    #[unsafe_ignore_trace]
    pub parameters: Vec<ast::Identifier>,
    #[unsafe_ignore_trace]
    pub body: ast::BlockStatement,
    pub env: Environment,
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("ptr", &(self as *const Function as usize))
            .finish()
    }
}

#[derive(Clone, Trace, Finalize)]
pub struct BuiltinFunction {
    #[unsafe_ignore_trace]
    pub func: fn(Vec<Gc<Object>>) -> Result<Gc<Object>, EarlyExit>,
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        self.func as usize == other.func as usize
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("ptr", &(self.func as usize))
            .finish()
    }
}

/// A hashable object reduced to its key form: which hashable type it was,
/// plus a 64 bit digest of the value. Integers digest to themselves,
/// booleans to 0/1, strings through FNV-1a.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Trace, Finalize)]
pub struct HashKey {
    kind: HashKeyKind,
    value: u64,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Trace, Finalize)]
enum HashKeyKind {
    Integer,
    Boolean,
    String,
}

pub fn hash_key(object: &Object) -> Result<HashKey, EvaluationError> {
    match object {
        Object::Integer(value) => Ok(HashKey {
            kind: HashKeyKind::Integer,
            value: *value as u64,
        }),
        Object::Boolean(value) => Ok(HashKey {
            kind: HashKeyKind::Boolean,
            value: u64::from(*value),
        }),
        Object::String(value) => Ok(HashKey {
            kind: HashKeyKind::String,
            value: fnv1a(value.as_bytes()),
        }),
        _ => Err(EvaluationError::UnusableAsHashKey(object.type_name())),
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    bytes.iter().fold(OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(PRIME)
    })
}

/// Short-circuit channel of the evaluator: a `return` unwinding towards the
/// nearest function boundary, or a runtime error unwinding all the way out.
/// Neither is observable from inside the interpreted program.
#[derive(Debug, PartialEq)]
pub enum EarlyExit {
    Return(Gc<Object>),
    Error(EvaluationError),
}

impl From<EvaluationError> for EarlyExit {
    fn from(error: EvaluationError) -> Self {
        EarlyExit::Error(error)
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        operator: ast::InfixOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        operator: ast::InfixOperator,
        left: &'static str,
        right: &'static str,
    },
    #[error("unknown operator: {operator}{right}")]
    UnknownPrefixOperator {
        operator: ast::PrefixOperator,
        right: &'static str,
    },
    #[error("identifier not found: {0}")]
    IdentifierNotFound(Rc<str>),
    #[error("not a function: {0}")]
    NotAFunction(&'static str),
    #[error("unusable as hash key: {0}")]
    UnusableAsHashKey(&'static str),
    #[error("index operator not supported: {0}")]
    IndexOperatorNotSupported(&'static str),
    #[error("division by zero")]
    DivisionByZero,
    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongNumberOfArguments { got: usize, want: usize },
    #[error("{0}")]
    InvalidBuiltinArgument(Rc<str>),
    #[error("we only support returning AST-nodes from macros")]
    NonQuoteMacroResult,
    #[error("cannot represent {0} as an expression")]
    UnquoteUnsupported(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_and_null_are_singletons() {
        assert!(Gc::ptr_eq(&Object::boolean(true), &Object::boolean(true)));
        assert!(Gc::ptr_eq(&Object::boolean(false), &Object::boolean(false)));
        assert!(Gc::ptr_eq(&Object::null(), &Object::null()));
        assert!(!Gc::ptr_eq(&Object::boolean(true), &Object::boolean(false)));
    }

    #[test]
    fn test_string_hash_keys() {
        let hello1 = Object::String("Hello World".to_owned());
        let hello2 = Object::String("Hello World".to_owned());
        let diff = Object::String("My name is johnny".to_owned());

        assert_eq!(hash_key(&hello1).unwrap(), hash_key(&hello2).unwrap());
        assert_ne!(hash_key(&hello1).unwrap(), hash_key(&diff).unwrap());
    }

    #[test]
    fn test_hash_keys_keep_types_apart() {
        let one = Object::Integer(1);
        let truthy = Object::Boolean(true);

        assert_ne!(hash_key(&one).unwrap(), hash_key(&truthy).unwrap());
    }

    #[test]
    fn test_unhashable() {
        assert_eq!(
            hash_key(&Object::Array(vec![])),
            Err(EvaluationError::UnusableAsHashKey("ARRAY"))
        );
    }

    #[test]
    fn test_inspect() {
        let tests: Vec<(Gc<Object>, &str)> = vec![
            (Object::integer(5), "5"),
            (Object::boolean(true), "true"),
            (Object::string("Hello World!".to_owned()), "Hello World!"),
            (Object::null(), "null"),
            (
                Object::array(vec![Object::integer(1), Object::string("two".to_owned())]),
                "[1, two]",
            ),
        ];

        for (object, expected) in tests {
            assert_eq!(object.to_string(), expected);
        }
    }

    #[test]
    fn test_error_messages() {
        let tests: Vec<(EvaluationError, &str)> = vec![
            (
                EvaluationError::TypeMismatch {
                    operator: ast::InfixOperator::Plus,
                    left: "INTEGER",
                    right: "BOOLEAN",
                },
                "type mismatch: INTEGER + BOOLEAN",
            ),
            (
                EvaluationError::UnknownPrefixOperator {
                    operator: ast::PrefixOperator::Minus,
                    right: "BOOLEAN",
                },
                "unknown operator: -BOOLEAN",
            ),
            (
                EvaluationError::UnknownInfixOperator {
                    operator: ast::InfixOperator::Minus,
                    left: "STRING",
                    right: "STRING",
                },
                "unknown operator: STRING - STRING",
            ),
            (
                EvaluationError::IdentifierNotFound("foobar".into()),
                "identifier not found: foobar",
            ),
            (
                EvaluationError::UnusableAsHashKey("FUNCTION"),
                "unusable as hash key: FUNCTION",
            ),
        ];

        for (error, expected) in tests {
            assert_eq!(error.to_string(), expected);
        }
    }
}
