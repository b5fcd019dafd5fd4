//! hlsl2glsl CLI - HLSL to GLSL shader cross-compiler

use std::env;
use std::fs;
use std::process::ExitCode;

use hlsl2glsl::ast::DeclKind;
use hlsl2glsl::errors::StdLog;
use hlsl2glsl::{analyze, print_error, CodeGenerator, GlslGenerator, Parser, SourceCode};

fn load_source(filename: &str) -> Result<SourceCode, ExitCode> {
    match fs::read_to_string(filename) {
        Ok(text) => Ok(SourceCode::new(filename, text)),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", filename, e);
            Err(ExitCode::FAILURE)
        }
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("hlsl2glsl - HLSL to GLSL shader cross-compiler");
        println!("Version {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: hlsl2glsl <command> [options]");
        println!();
        println!("Commands:");
        println!("  parse <file>               Parse a shader and dump its declarations");
        println!("  check <file>               Parse and semantically check a shader");
        println!("  compile <file> [-o <out>]  Cross-compile a shader to GLSL");
        println!();
        return ExitCode::SUCCESS;
    }

    let command = &args[1];

    match command.as_str() {
        "parse" => {
            if args.len() < 3 {
                eprintln!("Error: missing file argument");
                return ExitCode::FAILURE;
            }

            let source = match load_source(&args[2]) {
                Ok(source) => source,
                Err(code) => return code,
            };

            match Parser::new(source.text()).parse() {
                Ok(program) => {
                    println!("Parsed {} declarations:", program.decls.len());
                    for decl in &program.decls {
                        match &decl.kind {
                            DeclKind::Struct(s) => {
                                println!("  struct {} ({} fields)", s.name.name, s.fields.len());
                            }
                            DeclKind::Alias(a) => {
                                println!("  typedef {}", a.name.name);
                            }
                            DeclKind::ConstBuffer(cb) => {
                                println!("  cbuffer {} ({} fields)", cb.name.name, cb.fields.len());
                            }
                            DeclKind::Texture(t) => {
                                println!("  texture {}", t.name.name);
                            }
                            DeclKind::Sampler(s) => {
                                println!("  sampler {}", s.name.name);
                            }
                            DeclKind::Variable(v) => {
                                println!("  global {}", v.name.name);
                            }
                            DeclKind::Function(f) => {
                                println!("  function {} ({} params)", f.name.name, f.params.len());
                            }
                        }
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    print_error(&source, &e);
                    ExitCode::FAILURE
                }
            }
        }
        "check" => {
            if args.len() < 3 {
                eprintln!("Error: missing file argument");
                return ExitCode::FAILURE;
            }

            let source = match load_source(&args[2]) {
                Ok(source) => source,
                Err(code) => return code,
            };

            let program = match Parser::new(source.text()).parse() {
                Ok(program) => program,
                Err(e) => {
                    print_error(&source, &e);
                    return ExitCode::FAILURE;
                }
            };

            let mut log = StdLog;
            match analyze(&program, &source, &mut log) {
                Ok(module) => {
                    println!(
                        "OK: {} declarations checked ({} structs)",
                        program.decls.len(),
                        module.structs.len()
                    );
                    ExitCode::SUCCESS
                }
                Err(_) => ExitCode::FAILURE,
            }
        }
        "compile" => {
            if args.len() < 3 {
                eprintln!("Error: missing file argument");
                return ExitCode::FAILURE;
            }

            let filename = &args[2];
            let mut output = None;
            let mut i = 3;
            while i < args.len() {
                match args[i].as_str() {
                    "-o" | "--output" => {
                        if i + 1 < args.len() {
                            output = Some(args[i + 1].clone());
                            i += 2;
                        } else {
                            eprintln!("Error: -o requires an output path");
                            return ExitCode::FAILURE;
                        }
                    }
                    _ => {
                        eprintln!("Unknown option: {}", args[i]);
                        return ExitCode::FAILURE;
                    }
                }
            }

            let source = match load_source(filename) {
                Ok(source) => source,
                Err(code) => return code,
            };

            let program = match Parser::new(source.text()).parse() {
                Ok(program) => program,
                Err(e) => {
                    print_error(&source, &e);
                    return ExitCode::FAILURE;
                }
            };

            // no output artifact is produced when any error was reported
            let mut log = StdLog;
            let module = match analyze(&program, &source, &mut log) {
                Ok(module) => module,
                Err(_) => return ExitCode::FAILURE,
            };

            let mut generator = GlslGenerator::new();
            let code = match generator.generate(&program, &module) {
                Ok(code) => code,
                Err(e) => {
                    print_error(&source, &e);
                    return ExitCode::FAILURE;
                }
            };

            let output_path = output.unwrap_or_else(|| {
                let stem = std::path::Path::new(filename)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("output");
                format!("{}.{}", stem, generator.file_extension())
            });

            match fs::write(&output_path, &code) {
                Ok(_) => {
                    println!("Generated: {} ({} bytes)", output_path, code.len());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error writing '{}': {}", output_path, e);
                    ExitCode::FAILURE
                }
            }
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run 'hlsl2glsl' without arguments for usage information");
            ExitCode::FAILURE
        }
    }
}
