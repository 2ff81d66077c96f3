use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use junk_lang_core::lexer::Tokenizer;
use junk_lang_core::parser::Parser;
use junk_lang_interpreter::environment::Environment;
use junk_lang_interpreter::evaluator;
use junk_lang_interpreter::macro_expansion;
use junk_lang_interpreter::object::Object;

const PROMPT: &str = ">> ";

pub fn start() -> Result<(), ReadlineError> {
    let mut environment = Environment::new();
    let mut macro_environment = Environment::new();

    let mut rl = DefaultEditor::new()?;

    loop {
        let line = match rl.readline(PROMPT) {
            Err(ReadlineError::Interrupted) => {
                // Clear the line, keep the session.
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                line
            }
        };

        let tokenizer = Tokenizer::new(&line);
        let mut program = match Parser::new(tokenizer).parse_program() {
            Ok(program) => program,
            Err(errors) => {
                println!("Looks like we ran into some junk here!");
                println!(" parser errors:");
                for error in errors {
                    println!("\t{}", error);
                }
                continue;
            }
        };

        macro_expansion::define_macros(&mut program, &mut macro_environment);
        let expanded = match macro_expansion::expand_macros(program, &mut macro_environment) {
            Ok(expanded) => expanded,
            Err(error) => {
                println!("ERROR: {}", error);
                continue;
            }
        };

        match evaluator::eval_program(&expanded, &mut environment) {
            Ok(result) => {
                if !matches!(&*result, Object::Null) {
                    println!("{}", result);
                }
            }
            Err(error) => println!("ERROR: {}", error),
        }
    }
    Ok(())
}
