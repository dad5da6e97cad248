use ck2json::{json::JsonOptions, Ck2Parser, TokenizerOptions};
use std::error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::process;

fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut pretty = false;
    let mut tokens = false;
    let mut comments = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--pretty" => pretty = true,
            "--tokens" => tokens = true,
            "--comments" => comments = true,
            "-h" | "--help" => {
                eprintln!("Usage: ck2json [--pretty] [--tokens] [--comments] [FILE]");
                return Ok(());
            }
            x if x.starts_with("--") => {
                eprintln!("unknown option: {}", x);
                process::exit(2);
            }
            _ => path = Some(arg),
        }
    }

    let parser = Ck2Parser::new()
        .with_json_options(JsonOptions::new().with_prettyprint(pretty))
        .with_tokenizer_options(TokenizerOptions::new().with_comments(comments));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if tokens {
        let tokens = match path {
            Some(path) => parser.tokens(File::open(path)?)?,
            None => parser.tokens(io::stdin().lock())?,
        };

        for token in tokens {
            writeln!(out, "{:?}\t{:?}", token.kind, token.text)?;
        }
    } else {
        out = match path {
            Some(path) => parser.convert(File::open(path)?, out)?,
            None => parser.convert(io::stdin(), out)?,
        };
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}
