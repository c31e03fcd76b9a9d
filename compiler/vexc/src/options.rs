//! The passive compiler-flag family of the CLI: recognized so they're never
//! mistaken for input files, but — beyond `-o`, `--emit-ast`, `--emit-ir`,
//! and `--emit-llvm`, which this driver does act on — not otherwise wired to
//! compiler behavior. Nothing here reads a config file; the flag list is the
//! whole configuration surface.

const PASSIVE_FLAGS: &[&str] = &[
    "-O0", "-O1", "-O2", "-O3", "-Os", "-Ofast", "-save-temps", "-S", "-c", "-Wall", "-Werror",
    "-Wno-unused", "-Wextra",
];

#[derive(Debug, Default)]
pub struct CompileOptions {
    pub output: Option<String>,
    pub emit_ast: bool,
    pub emit_ir: bool,
    pub emit_llvm: bool,
    /// Recognized but unacted-upon flags, kept only for a debug-level log
    /// line — spec.md is explicit that their semantics beyond printing are
    /// not part of the core.
    pub passive_flags: Vec<String>,
}

/// Scan the non-info/REPL arguments, splitting them into a `CompileOptions`
/// and the list of input file paths. `-o <file>` is the only flag that
/// consumes a following argument; everything else is self-contained.
pub fn parse(args: &[String]) -> (CompileOptions, Vec<String>) {
    let mut options = CompileOptions::default();
    let mut files = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if PASSIVE_FLAGS.contains(&arg) {
            options.passive_flags.push(arg.to_string());
        } else if arg == "-o" {
            i += 1;
            if let Some(path) = args.get(i) {
                options.output = Some(path.clone());
            }
        } else if arg == "--emit-ast" {
            options.emit_ast = true;
        } else if arg == "--emit-ir" {
            options.emit_ir = true;
        } else if arg == "--emit-llvm" {
            options.emit_llvm = true;
        } else if arg.starts_with("--target=") || arg.starts_with("--arch=") {
            options.passive_flags.push(arg.to_string());
        } else {
            files.push(arg.to_string());
        }
        i += 1;
    }

    (options, files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn passive_flags_are_recognized_and_not_treated_as_files() {
        let args: Vec<String> = ["-O2", "-Wall", "-o", "out.ll", "main.vex"]
            .into_iter()
            .map(String::from)
            .collect();
        let (options, files) = parse(&args);
        assert_eq!(options.passive_flags, vec!["-O2".to_string(), "-Wall".to_string()]);
        assert_eq!(options.output, Some("out.ll".to_string()));
        assert_eq!(files, vec!["main.vex".to_string()]);
    }

    #[test]
    fn target_and_arch_flags_are_recognized_as_passive() {
        let args: Vec<String> = ["--target=linux", "--arch=x86_64", "a.vex"]
            .into_iter()
            .map(String::from)
            .collect();
        let (options, files) = parse(&args);
        assert_eq!(
            options.passive_flags,
            vec!["--target=linux".to_string(), "--arch=x86_64".to_string()]
        );
        assert_eq!(files, vec!["a.vex".to_string()]);
    }

    #[test]
    fn emit_flags_are_not_treated_as_files() {
        let args: Vec<String> = ["--emit-ast", "--emit-ir", "--emit-llvm", "a.vex"]
            .into_iter()
            .map(String::from)
            .collect();
        let (options, files) = parse(&args);
        assert!(options.emit_ast);
        assert!(options.emit_ir);
        assert!(options.emit_llvm);
        assert_eq!(files, vec!["a.vex".to_string()]);
    }

    #[test]
    fn unrecognized_tokens_are_treated_as_input_files() {
        let args: Vec<String> = ["a.vex", "b.vex"].into_iter().map(String::from).collect();
        let (_, files) = parse(&args);
        assert_eq!(files, vec!["a.vex".to_string(), "b.vex".to_string()]);
    }
}
