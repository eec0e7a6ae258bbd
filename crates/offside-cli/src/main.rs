//! offside CLI

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use offside_error::{DiagnosticRenderer, Diagnostics, SourceCache};
use offside_lexer::{IndentConfig, StylePolicy, Token, TokenKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// How `lex` prints tokens
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Format {
    /// One aligned line per token
    #[default]
    Text,
    /// JSON array of tokens
    Json,
}

#[derive(Parser)]
#[command(name = "offside")]
#[command(version)]
#[command(about = "Off-side rule tokenizer: turns indentation into INDENT/DEDENT tokens", long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the token stream of a file
    Lex {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the raw stream, layout tokens included
        #[arg(long)]
        raw: bool,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        #[command(flatten)]
        indent: IndentArgs,
    },

    /// Checks files for lexing and indentation errors
    Check {
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Plain diagnostics, without ANSI colors
        #[arg(long)]
        no_color: bool,

        #[command(flatten)]
        indent: IndentArgs,
    },
}

#[derive(Args)]
struct IndentArgs {
    /// Width of one tab in the indentation
    #[arg(long, default_value_t = offside_lexer::DEFAULT_TAB_WIDTH)]
    tab_width: u32,

    /// Accept tab-indented and space-indented lines in the same file
    #[arg(long)]
    lenient: bool,

    /// Emit a NEWLINE token at the end of each logical line
    #[arg(long)]
    emit_newlines: bool,
}

impl IndentArgs {
    fn to_config(&self) -> Result<IndentConfig, String> {
        let policy = if self.lenient {
            StylePolicy::Lenient
        } else {
            StylePolicy::Strict
        };
        let config = IndentConfig::new()
            .with_tab_width(self.tab_width)
            .with_style_policy(policy)
            .with_newlines(self.emit_newlines);
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_source(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("error reading {}: {}", path.display(), e))
}

fn display_token(token: &Token) -> String {
    match token.kind {
        TokenKind::Newline => "↵".to_string(),
        TokenKind::Indent => "→".to_string(),
        TokenKind::Dedent => "←".to_string(),
        TokenKind::Eof => "EOF".to_string(),
        TokenKind::Whitespace => format!("{:?}", token.text),
        _ => token.text.clone(),
    }
}

fn print_tokens(tokens: &[Token], format: Format) -> Result<(), String> {
    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(tokens).map_err(|e| e.to_string())?;
            println!("{}", json);
        }
        Format::Text => {
            for token in tokens {
                println!(
                    "  {:4}:{:<3}  {:<12}  {}",
                    token.span.start.line,
                    token.span.start.column,
                    format!("{:?}", token.kind),
                    display_token(token)
                );
            }
            println!("\nTotal: {} tokens", tokens.len());
        }
    }
    Ok(())
}

fn run_lex(input: &Path, raw: bool, format: Format, indent: &IndentArgs) -> Result<bool, String> {
    let config = indent.to_config()?;
    let source = read_source(input)?;
    let mut cache = SourceCache::new();
    let file_id = cache.add(input.display().to_string(), source.as_str());

    let (tokens, diagnostics) = if raw {
        offside_lexer::tokenize_raw(&source, file_id)
    } else {
        offside_lexer::tokenize_unit(&source, file_id, &config)
    };

    print_tokens(&tokens, format)?;

    if !diagnostics.is_empty() {
        let renderer = DiagnosticRenderer::new(&cache);
        eprintln!("\n{}", diagnostics.render(&renderer));
    }
    Ok(!diagnostics.has_errors())
}

/// What checking a set of files turned up
struct CheckReport {
    diagnostics: Diagnostics,
    /// Files that could not be read, with the reason
    unreadable: Vec<String>,
}

/// Lexes every readable input, printing one status line per file
fn check_files(inputs: &[PathBuf], config: &IndentConfig, cache: &mut SourceCache) -> CheckReport {
    let mut report = CheckReport {
        diagnostics: Diagnostics::new(),
        unreadable: Vec::new(),
    };

    for input in inputs {
        let source = match read_source(input) {
            Ok(source) => source,
            Err(message) => {
                println!("  [unreadable] {}", input.display());
                report.unreadable.push(message);
                continue;
            }
        };
        let file_id = cache.add(input.display().to_string(), source.as_str());
        let (tokens, diagnostics) = offside_lexer::tokenize_unit(&source, file_id, config);

        if diagnostics.has_errors() {
            println!("  [error] {}", input.display());
        } else {
            info!(file = %input.display(), tokens = tokens.len(), "checked");
            println!("  [ok] {}: {} tokens", input.display(), tokens.len());
        }
        report.diagnostics.extend(diagnostics);
    }

    report
}

fn run_check(inputs: &[PathBuf], no_color: bool, indent: &IndentArgs) -> Result<bool, String> {
    let config = indent.to_config()?;
    let mut cache = SourceCache::new();
    let report = check_files(inputs, &config, &mut cache);

    if !report.diagnostics.is_empty() {
        let mut renderer = DiagnosticRenderer::new(&cache);
        if no_color {
            renderer = renderer.without_colors();
        }
        eprintln!("\n{}", report.diagnostics.render(&renderer));
    }

    let errors = report.diagnostics.error_count();
    if errors == 0 {
        println!("\nNo errors found!");
    } else {
        println!("\n{} error(s) found", errors);
    }

    if !report.unreadable.is_empty() {
        return Err(report.unreadable.join("\n"));
    }
    Ok(errors == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Lex {
            input,
            raw,
            format,
            indent,
        } => run_lex(input, *raw, *format, indent),
        Commands::Check {
            inputs,
            no_color,
            indent,
        } => run_check(inputs, *no_color, indent),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::FAILURE
        }
    }
}
