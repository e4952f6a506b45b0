use std::{fs, path::PathBuf};

use keyframe::{Config, Error, ExecutionResult};

const DEMO_SRC: &str = r#"dec greeting = "hello" + ", " + "world"
print(greeting)

function shout() {
    return(greeting + "!")
}

dec loud = shout()
for i (1, 3) {
    print(loud)
}

if (5 == 5) {
    if (true and true) {
        print("deep")
    }
}
"#;

const USAGE: &str = "usage: keyframe [--tokens] [--memory] [--strict] [--max-depth N] [FILE]";

#[derive(Debug, Default)]
struct Options {
    path: Option<PathBuf>,
    show_tokens: bool,
    show_memory: bool,
    config: Config,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, Error> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--tokens" => options.show_tokens = true,
            "--memory" => options.show_memory = true,
            "--strict" => options.config.strict = true,
            "--max-depth" => {
                let depth = args
                    .next()
                    .and_then(|depth| depth.parse::<usize>().ok())
                    .ok_or_else(|| Error::Usage(format!("--max-depth expects a number\n{}", USAGE)))?;
                options.config.max_call_depth = depth;
            }
            "-h" | "--help" => return Err(Error::Usage(USAGE.to_string())),
            _ if arg.starts_with('-') => {
                return Err(Error::Usage(format!("unknown option `{}`\n{}", arg, USAGE)))
            }
            _ if options.path.is_none() => options.path = Some(PathBuf::from(&arg)),
            _ => return Err(Error::Usage(USAGE.to_string())),
        }
    }

    Ok(options)
}

fn run() -> Result<(), Error> {
    let options = parse_args(std::env::args().skip(1))?;

    let source = match &options.path {
        Some(path) => fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.clone(),
            source,
        })?,
        None => DEMO_SRC.to_string(),
    };

    let tokens = keyframe::tokenize(&source);
    if options.show_tokens {
        for token in &tokens {
            println!("{}", token);
        }
    }

    let execution = keyframe::execute(&tokens, &options.config);

    for line in &execution.output {
        println!("{}", line.text);
    }
    for diagnostic in &execution.diagnostics {
        eprintln!("{}", diagnostic);
    }
    if let ExecutionResult::ReturnValue(value) = &execution.result {
        println!("=> {}", value);
    }

    if options.show_memory {
        println!();
        println!("Full Memory Log:");
        for binding in execution.environment.iter() {
            println!("{}", binding);
        }
        for function in execution.functions.iter() {
            println!("[function, {} @ line {}]", function.name, function.line);
        }
    }

    if execution.diagnostics.is_empty() {
        Ok(())
    } else {
        Err(Error::Diagnostics(execution.diagnostics.len()))
    }
}

fn main() {
    keyframe::init_tracing();

    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
