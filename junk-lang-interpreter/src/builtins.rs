use gc::Gc;

use crate::object::{BuiltinFunction, EarlyExit, EvaluationError, Object};

fn wrong_number_of_arguments(got: usize, want: usize) -> EarlyExit {
    EarlyExit::Error(EvaluationError::WrongNumberOfArguments { got, want })
}

fn argument_error(message: String) -> EarlyExit {
    EarlyExit::Error(EvaluationError::InvalidBuiltinArgument(message.into()))
}

fn builtin_len(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EarlyExit> {
    if args.len() != 1 {
        return Err(wrong_number_of_arguments(args.len(), 1));
    }
    match &*args[0] {
        Object::String(s) => Ok(Object::integer(s.len() as i64)),
        Object::Array(arr) => Ok(Object::integer(arr.len() as i64)),
        other => Err(argument_error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_first(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EarlyExit> {
    if args.len() != 1 {
        return Err(wrong_number_of_arguments(args.len(), 1));
    }
    match &*args[0] {
        Object::Array(arr) => Ok(arr.first().cloned().unwrap_or_else(Object::null)),
        other => Err(argument_error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_last(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EarlyExit> {
    if args.len() != 1 {
        return Err(wrong_number_of_arguments(args.len(), 1));
    }
    match &*args[0] {
        Object::Array(arr) => Ok(arr.last().cloned().unwrap_or_else(Object::null)),
        other => Err(argument_error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.type_name()
        ))),
    }
}

// Everything after the first element; null on an empty array. The input
// array is untouched.
fn builtin_rest(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EarlyExit> {
    if args.len() != 1 {
        return Err(wrong_number_of_arguments(args.len(), 1));
    }
    match &*args[0] {
        Object::Array(arr) => {
            if arr.is_empty() {
                return Ok(Object::null());
            }
            Ok(Object::array(arr[1..].to_vec()))
        }
        other => Err(argument_error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_push(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EarlyExit> {
    if args.len() != 2 {
        return Err(wrong_number_of_arguments(args.len(), 2));
    }
    match &*args[0] {
        Object::Array(arr) => {
            let mut new_arr = arr.clone();
            new_arr.push(args[1].clone());
            Ok(Object::array(new_arr))
        }
        other => Err(argument_error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.type_name()
        ))),
    }
}

fn builtin_puts(args: Vec<Gc<Object>>) -> Result<Gc<Object>, EarlyExit> {
    for arg in &args {
        println!("{}", arg);
    }
    Ok(Object::null())
}

pub(crate) fn map_builtins(name: &str) -> Option<BuiltinFunction> {
    let func = match name {
        "len" => builtin_len,
        "first" => builtin_first,
        "last" => builtin_last,
        "rest" => builtin_rest,
        "push" => builtin_push,
        "puts" => builtin_puts,
        _ => return None,
    };
    Some(BuiltinFunction { func })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len() {
        let no_arguments = builtin_len(vec![]);
        assert_eq!(
            no_arguments,
            Err(EarlyExit::Error(EvaluationError::WrongNumberOfArguments {
                got: 0,
                want: 1
            }))
        );

        let too_many_arguments = builtin_len(vec![
            Object::string("hello".to_owned()),
            Object::string("world".to_owned()),
        ]);
        assert_eq!(
            too_many_arguments,
            Err(EarlyExit::Error(EvaluationError::WrongNumberOfArguments {
                got: 2,
                want: 1
            }))
        );

        let empty_array = builtin_len(vec![Object::array(vec![])]);
        assert_eq!(empty_array, Ok(Object::integer(0)));

        let two_elements = builtin_len(vec![Object::array(vec![
            Object::string("hello".to_owned()),
            Object::string("world".to_owned()),
        ])]);
        assert_eq!(two_elements, Ok(Object::integer(2)));

        let string_len = builtin_len(vec![Object::string("hello".to_owned())]);
        assert_eq!(string_len, Ok(Object::integer(5)));

        let integer_len = builtin_len(vec![Object::integer(42)]);
        assert_eq!(
            integer_len,
            Err(EarlyExit::Error(EvaluationError::InvalidBuiltinArgument(
                "argument to `len` not supported, got INTEGER".into()
            )))
        );
    }

    #[test]
    fn test_first_last_rest() {
        let arr = Object::array(vec![
            Object::integer(1),
            Object::integer(2),
            Object::integer(3),
        ]);

        assert_eq!(builtin_first(vec![arr.clone()]), Ok(Object::integer(1)));
        assert_eq!(builtin_last(vec![arr.clone()]), Ok(Object::integer(3)));
        assert_eq!(
            builtin_rest(vec![arr]),
            Ok(Object::array(vec![Object::integer(2), Object::integer(3)]))
        );

        let empty = Object::array(vec![]);
        assert_eq!(builtin_first(vec![empty.clone()]), Ok(Object::null()));
        assert_eq!(builtin_last(vec![empty.clone()]), Ok(Object::null()));
        assert_eq!(builtin_rest(vec![empty]), Ok(Object::null()));

        assert_eq!(
            builtin_first(vec![Object::integer(1)]),
            Err(EarlyExit::Error(EvaluationError::InvalidBuiltinArgument(
                "argument to `first` must be ARRAY, got INTEGER".into()
            )))
        );
    }

    #[test]
    fn test_push_leaves_original_untouched() {
        let arr = Object::array(vec![Object::integer(1)]);
        let pushed = builtin_push(vec![arr.clone(), Object::integer(2)]).unwrap();

        assert_eq!(
            pushed,
            Object::array(vec![Object::integer(1), Object::integer(2)])
        );
        assert_eq!(arr, Object::array(vec![Object::integer(1)]));
    }
}
