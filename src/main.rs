//! Vanara CLI and REPL
//!
//! Usage:
//!   vanara run <file.vn> [args...]  - Execute a Vanara file
//!   vanara repl                     - Start interactive REPL
//!   vanara help                     - Show help message

use std::env;
use std::fs;
use std::process;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use vanara::{host, Interpreter, Value, VERSION};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        run_repl();
        return;
    }

    match args[1].as_str() {
        "run" => {
            if args.len() < 3 {
                eprintln!("{}: missing file argument", "error".red());
                eprintln!("Usage: vanara run <file.vn> [args...]");
                process::exit(1);
            }

            run_file(&args[2..]);
        }
        "repl" => run_repl(),
        "help" | "--help" | "-h" => print_help(),
        "version" | "--version" | "-v" => println!("Vanara {}", VERSION),
        _ => {
            // Assume it's a file
            if args[1].ends_with(".vn") {
                run_file(&args[1..]);
            } else {
                eprintln!("{}: unknown command '{}'", "error".red(), args[1]);
                print_help();
                process::exit(1);
            }
        }
    }
}

fn print_help() {
    println!("{}", "Vanara".cyan().bold());
    println!("A small scripting language in the Monkey tradition");
    println!("{} {}\n", "Version".cyan(), VERSION);
    println!("{}", "USAGE:".yellow());
    println!("  vanara run <file.vn> [args...]  Execute a Vanara file");
    println!("  vanara repl                     Start interactive REPL");
    println!("  vanara help                     Show this help message");
    println!("  vanara version                  Show version\n");
    println!("{}", "EXAMPLES:".yellow());
    println!("  vanara run scripts/hello.vn");
    println!("  vanara repl\n");
    println!("{}", "LANGUAGE FEATURES:".yellow());
    println!("  let x = 10                      Binding");
    println!("  let add = fn(a, b) {{ a + b }}   First-class functions");
    println!("  [1, 2, 3]  {{\"key\": \"value\"}}    Arrays and hashes");
    println!("  require(\"lib.vn\")               Module import");
}

/// Run a script file; args[0] is the path, the whole list becomes ARGV
fn run_file(args: &[String]) {
    let path = &args[0];

    let source = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("{}: cannot read file '{}': {}", "error".red(), path, e);
            process::exit(1);
        }
    };

    let mut interp = Interpreter::new();
    host::install(&mut interp);

    let env = interp.envs.alloc();

    let argv: Vec<Value> = args.iter().map(|a| Value::String(a.clone())).collect();
    interp.envs.set(env, "ARGV", Value::array(argv));

    let evaluated = interp.run(&source, path, true, env);

    if let Some(value) = evaluated {
        if value.is_error() {
            eprintln!("{}", value.inspect().red());
            process::exit(1);
        }
    }
}

fn run_repl() {
    println!(
        "{} {} - {}",
        "Vanara".cyan().bold(),
        VERSION.cyan(),
        "a Monkey-tradition scripting language".dimmed()
    );
    println!(
        "Type {} to exit, {} for help\n",
        "exit".yellow(),
        "help".yellow()
    );

    let mut rl = DefaultEditor::new().expect("Failed to create REPL");

    // One interpreter and one environment persist across lines
    let mut interp = Interpreter::new();
    host::install(&mut interp);
    let mut env = interp.envs.alloc();

    loop {
        match rl.readline(&format!("{} ", "vn>".green().bold())) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match line {
                    "exit" | "quit" => {
                        println!("{}", "Goodbye!".cyan());
                        break;
                    }
                    "help" => {
                        print_repl_help();
                        continue;
                    }
                    "clear" => {
                        interp = Interpreter::new();
                        host::install(&mut interp);
                        env = interp.envs.alloc();
                        println!("{}", "State cleared.".dimmed());
                        continue;
                    }
                    _ => {}
                }

                if let Some(value) = interp.run(line, "__REPL__", true, env) {
                    if value.is_error() {
                        eprintln!("{}", value.inspect().red());
                    } else {
                        println!("{}", value.inspect().cyan());
                    }
                }

                // drop call frames no longer reachable from the session
                interp.envs.collect(&[env]);
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "^C".dimmed());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".cyan());
                break;
            }
            Err(err) => {
                eprintln!("{}: {:?}", "error".red(), err);
                break;
            }
        }
    }
}

fn print_repl_help() {
    println!("{}", "REPL Commands:".yellow());
    println!("  exit, quit   Exit the REPL");
    println!("  clear        Reset the interpreter state");
    println!("  help         Show this help\n");
    println!("{}", "Language Examples:".yellow());
    println!("  let x = 10");
    println!("  let add = fn(a, b) {{ a + b }}");
    println!("  add(2, 3)");
    println!("  let h = {{\"name\": \"vanara\"}}");
    println!("  puts(h[\"name\"])");
}
