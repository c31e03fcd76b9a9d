//! Vex compiler CLI and REPL.
//!
//! Argument dispatch is hand-rolled (`std::env::args`, no external
//! arg-parsing crate) — the information/REPL commands are checked first and
//! short-circuit the process, matching the "first recognized option wins"
//! shape of the C driver this core was distilled from; everything else is
//! either a passive compiler flag (accepted, recorded, not acted on beyond
//! what's implemented here) or an input file.

mod options;
mod tracing_setup;

use options::CompileOptions;
use std::io::Write as _;
use vex_ir::Arena;

const MAJOR_VERSION: u32 = 0;
const MINOR_VERSION: u32 = 1;
const PATCH_VERSION: u32 = 0;

fn main() {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("vex: error: no input file");
        std::process::exit(1);
    }

    for arg in &args {
        if let Some(code) = handle_info_option(arg) {
            std::process::exit(code);
        }
    }

    let (options, files) = options::parse(&args);
    if files.is_empty() {
        eprintln!("vex: error: no input file");
        std::process::exit(1);
    }

    let mut exit_code = 0;
    for file in &files {
        let code = compile_file(file, &options);
        exit_code = exit_code.max(code);
    }
    std::process::exit(exit_code);
}

/// Dispatch the information/REPL family of options: `--help`, `-h`,
/// `--version`, `-v`, `--help={topic}[,...]`, `repl`. Returns the process
/// exit code the moment one of these is recognized; any other argument
/// returns `None` so the caller keeps scanning.
fn handle_info_option(arg: &str) -> Option<i32> {
    match arg {
        "--version" | "-v" => {
            print_version();
            Some(0)
        }
        "--help" | "-h" => {
            print_help_menu();
            Some(0)
        }
        "repl" => {
            run_repl();
            Some(0)
        }
        _ if arg.starts_with("--help=") => Some(handle_help_topics(&arg[7..])),
        _ => None,
    }
}

fn handle_help_topics(topics: &str) -> i32 {
    let mut code = 0;
    for topic in topics.split(',') {
        match topic {
            "optimizers" => print_optimizers_help(),
            "target" => print_target_help(),
            "warnings" => print_warnings_help(),
            "compiler" => print_compiler_help(),
            _ => {
                eprintln!("unrecognized argument to '--help=' option: '{topic}'");
                code = 1;
            }
        }
    }
    code
}

fn print_help_menu() {
    println!(
        "Usage: vex [options] file...\n\
         Options:\n\
         \x20 --help                   Display this information.\n\
         \x20 --help={{optimizers|warnings|target|compiler}}[,...]\n\
         \x20                          Display help on specific option categories.\n\
         \x20 --version                Display compiler version information.\n\n\
         \x20 repl                     Launch the interactive Vex REPL (Read-Eval-Print Loop).\n\n\
         Report bugs at <https://github.com/vex-lang/vex/issues>"
    );
}

fn print_optimizers_help() {
    println!(
        "Optimization Options:\n\
         \x20 -O0                      Disable all optimizations (default).\n\
         \x20 -O1                      Enable basic optimizations.\n\
         \x20 -O2                      Enable additional optimizations.\n\
         \x20 -O3                      Enable full optimizations, including inlining.\n\
         \x20 -Os                      Optimize for size.\n\
         \x20 -Ofast                   Enable aggressive optimizations that may break strict standards compliance.\n"
    );
}

fn print_target_help() {
    println!(
        "Target-Specific Options:\n\
         \x20 --target=<platform>      Specify the target platform (e.g., linux, wasm, arm).\n\
         \x20 --arch=<arch>            Specify the target architecture (e.g., x86_64, arm64).\n\
         \x20 --emit-llvm              Output LLVM IR instead of native code.\n"
    );
}

fn print_warnings_help() {
    println!(
        "Warning Control Options:\n\
         \x20 -Wall                    Enable most warnings.\n\
         \x20 -Werror                  Treat warnings as errors.\n\
         \x20 -Wno-unused              Disable warnings for unused variables or functions.\n\
         \x20 -Wextra                  Enable extra warning checks.\n"
    );
}

fn print_compiler_help() {
    println!(
        "Compiler Control Options:\n\
         \x20 -save-temps              Do not delete intermediate files (e.g., .ll, .s).\n\
         \x20 -S                       Compile only; do not assemble or link.\n\
         \x20 -c                       Compile and assemble, but do not link.\n\
         \x20 -o <file>                Place the output into <file>.\n\
         \x20 --emit-ast               Output the parsed AST instead of compiling.\n\
         \x20 --emit-ir                Output the intermediate representation (IR).\n"
    );
}

fn print_version() {
    let os_name = std::env::consts::OS;
    println!("vex version {MAJOR_VERSION}.{MINOR_VERSION}.{PATCH_VERSION} ({os_name})");
}

/// Interactive read-eval-print loop. One arena and one evaluation session
/// span the whole REPL run; each line is parsed, type-checked against the
/// environment accumulated so far, and evaluated in turn.
fn run_repl() {
    let arena = Arena::default();
    let mut session = vex_eval::Session::new();
    let mut type_env = None;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();

    loop {
        print!(">>> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line).unwrap_or(0);
        if bytes_read == 0 {
            println!();
            break;
        }

        let line = line.trim_end_matches(['\n', '\r']);
        if line == ":quit" {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let root = match vex_parse::parse(&arena, line) {
            Ok(root) => root,
            Err(_) => {
                eprintln!("Parsing failed.");
                continue;
            }
        };

        let (_, next_env) = vex_typeck::typecheck_in_env(&arena, type_env, root);
        type_env = next_env;
        session.eval_root(root);
    }
}

/// Batch-compile one source file: parse, type-check, then either interpret
/// (the default) or lower to LLVM IR and emit `output.ll` when `--emit-llvm`
/// is requested under the `llvm` feature. Returns the process exit code.
fn compile_file(path: &str, options: &CompileOptions) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("vex: error: could not read file '{path}': {err}");
            return 1;
        }
    };

    let arena = Arena::default();
    let root = match vex_parse::parse(&arena, &source) {
        Ok(root) => root,
        Err(_) => {
            eprintln!("Parsing failed.");
            return 1;
        }
    };

    if options.emit_ast {
        println!("{root}");
    }

    if !options.passive_flags.is_empty() {
        tracing::debug!(flags = ?options.passive_flags, "passive compiler flags accepted");
    }

    // `typecheck` aborts the process on a type error (the checker is
    // abort-on-first), so reaching the next line means `root` type-checks.
    vex_typeck::typecheck(&arena, root);

    if options.emit_ir {
        let code = emit_llvm_ir(root, None);
        if code != 0 {
            return code;
        }
    }

    if options.emit_llvm {
        let output_path = options.output.clone().unwrap_or_else(|| "output.ll".to_string());
        let code = emit_llvm_ir(root, Some(output_path.as_str()));
        if code != 0 {
            return code;
        }
    }

    if options.emit_ir || options.emit_llvm {
        return 0;
    }

    let mut session = vex_eval::Session::new();
    session.eval_root(root);
    0
}

/// Lower `root` to LLVM IR. With `output_path` absent, prints the IR text to
/// stdout (`--emit-ir`); with it present, writes the IR to that path
/// (`--emit-llvm`, defaulting to `output.ll`).
#[cfg(feature = "llvm")]
fn emit_llvm_ir(root: &vex_ir::Node<'_>, output_path: Option<&str>) -> i32 {
    let context = vex_llvm::Context::create();
    let module = vex_llvm::lower_module(&context, "vex_module", root);
    let ir_text = module.print_to_string().to_string();

    match output_path {
        None => {
            println!("{ir_text}");
            0
        }
        Some(path) => match std::fs::write(path, ir_text) {
            Ok(()) => 0,
            Err(err) => {
                eprintln!("vex: error: could not write '{path}': {err}");
                1
            }
        },
    }
}

#[cfg(not(feature = "llvm"))]
fn emit_llvm_ir(_root: &vex_ir::Node<'_>, _output_path: Option<&str>) -> i32 {
    eprintln!("vex: error: this build was not compiled with the 'llvm' feature");
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    /// Writes `contents` to a uniquely named file under the system temp
    /// directory and returns its path; the caller is responsible for
    /// removing it.
    fn temp_source_file(name: &str, contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("vexc_test_{}_{name}", std::process::id()));
        let mut file = std::fs::File::create(&path).expect("create temp source file");
        file.write_all(contents.as_bytes()).expect("write temp source file");
        path
    }

    #[test]
    fn compile_file_evaluates_a_valid_source_file() {
        let path = temp_source_file("valid.vex", "val x : int = 1 + 2");
        let options = CompileOptions::default();
        let code = compile_file(path.to_str().expect("utf8 path"), &options);
        std::fs::remove_file(&path).ok();
        assert_eq!(code, 0);
    }

    #[test]
    fn compile_file_reports_parse_failure() {
        let path = temp_source_file("invalid.vex", "val x : int = ");
        let options = CompileOptions::default();
        let code = compile_file(path.to_str().expect("utf8 path"), &options);
        std::fs::remove_file(&path).ok();
        assert_eq!(code, 1);
    }

    #[test]
    fn compile_file_reports_missing_file() {
        let options = CompileOptions::default();
        let code = compile_file("/nonexistent/path/to/vex/source.vex", &options);
        assert_eq!(code, 1);
    }

    #[test]
    fn emit_ast_flag_does_not_change_the_exit_code() {
        let path = temp_source_file("emit_ast.vex", "val x : int = 1 + 2");
        let options = CompileOptions {
            emit_ast: true,
            ..CompileOptions::default()
        };
        let code = compile_file(path.to_str().expect("utf8 path"), &options);
        std::fs::remove_file(&path).ok();
        assert_eq!(code, 0);
    }

    #[test]
    fn handle_help_topics_reports_unrecognized_topic_as_failure() {
        assert_eq!(handle_help_topics("optimizers"), 0);
        assert_eq!(handle_help_topics("bogus"), 1);
    }
}
