use junk_lang_core::lexer::Tokenizer;
use junk_lang_core::parser::Parser;
use junk_lang_interpreter::environment::Environment;
use junk_lang_interpreter::evaluator;
use junk_lang_interpreter::macro_expansion;
use junk_lang_interpreter::object::Object;

/// Runs a whole source file through the pipeline, printing parser errors,
/// the evaluation error or the final non-null result.
pub fn execute(source: &str) {
    let tokenizer = Tokenizer::new(source);
    let mut program = match Parser::new(tokenizer).parse_program() {
        Ok(program) => program,
        Err(errors) => {
            eprintln!("parser errors:");
            for error in errors {
                eprintln!("\t{}", error);
            }
            return;
        }
    };

    let mut macro_environment = Environment::new();
    macro_expansion::define_macros(&mut program, &mut macro_environment);
    let expanded = match macro_expansion::expand_macros(program, &mut macro_environment) {
        Ok(expanded) => expanded,
        Err(error) => {
            eprintln!("ERROR: {}", error);
            return;
        }
    };

    let mut environment = Environment::new();
    match evaluator::eval_program(&expanded, &mut environment) {
        Ok(result) => {
            if !matches!(&*result, Object::Null) {
                println!("{}", result);
            }
        }
        Err(error) => eprintln!("ERROR: {}", error),
    }
}
