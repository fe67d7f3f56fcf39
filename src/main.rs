use std::{
    env, fs,
    io::{self, Write},
    process,
};

use oxide::{run, Options, RunOutcome};

fn main() {
    let mut input_path: Option<String> = None;
    let mut output_path = String::from("ex.ll");
    let mut dump_asm = false;
    let mut opts = Options::default();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump-tokens" => opts.dump_tokens = true,
            "--dump-ast" => opts.dump_ast = true,
            "--dump-asm" => dump_asm = true,
            "--verbose" | "-v" => opts.verbose = true,
            "-o" | "--output" => match args.next() {
                Some(path) => output_path = path,
                None => usage(),
            },
            _ => {
                if input_path.is_some() {
                    usage();
                }
                input_path = Some(arg);
            }
        }
    }

    let Some(input_path) = input_path else {
        usage();
    };

    let source = match fs::read_to_string(&input_path) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("couldn't read {}: {}", input_path, error);
            process::exit(1);
        }
    };

    let file_name = input_path
        .rsplit('/')
        .next()
        .unwrap_or(input_path.as_str())
        .to_string();

    let mut stderr = io::stderr();
    let outcome = match run(&source, &file_name, &mut stderr, &opts) {
        Ok(outcome) => outcome,
        Err(error) => {
            eprintln!("write failed: {}", error);
            process::exit(1);
        }
    };

    match outcome {
        RunOutcome::SyntaxError(_) | RunOutcome::SemanticFailure { .. } => process::exit(1),
        RunOutcome::Success { ir } => {
            if let Err(error) = fs::write(&output_path, &ir) {
                eprintln!("couldn't write {}: {}", output_path, error);
                process::exit(1);
            }
            if dump_asm {
                let mut stdout = io::stdout();
                let _ = stdout.write_all(ir.as_bytes());
            }
        }
    }
}

fn usage() -> ! {
    eprintln!(
        "usage: oxide <input.rs> [-o <out.ll>] [--dump-tokens] [--dump-ast] [--dump-asm] [--verbose]"
    );
    process::exit(2);
}
