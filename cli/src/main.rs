use std::error::Error;
use std::fs;
use std::io::{self, Write};

use clap::Parser;
use cuddle::{Document, Indent, WriteOptions};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "cuddle", version, about = "KDL document formatter and checker")]
struct Args {
    /// Input file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Spaces per indentation level (default: 4).
    #[arg(long, value_name = "number", default_value_t = 4, conflicts_with = "tab")]
    indent: usize,

    /// Indent with tabs.
    #[arg(long)]
    tab: bool,

    /// Omit the newline after the last node.
    #[arg(long = "no-trailing-newline")]
    no_trailing_newline: bool,

    /// Only validate the input.
    #[arg(long, conflicts_with_all = ["output", "json"])]
    check: bool,

    /// Print the document as JSON instead of KDL.
    #[arg(long)]
    json: bool,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

impl InputSource {
    fn from_arg(input: Option<&str>) -> Self {
        match input {
            None | Some("-") => InputSource::Stdin,
            Some(path) => InputSource::File(path.to_string()),
        }
    }

    fn label(&self) -> &str {
        match self {
            InputSource::Stdin => "stdin",
            InputSource::File(path) => path,
        }
    }

    fn parse(&self) -> Result<Document, Box<dyn Error>> {
        let document = match self {
            InputSource::Stdin => Document::from_read(io::stdin().lock())?,
            InputSource::File(path) => Document::from_read(fs::File::open(path)?)?,
        };
        Ok(document)
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let source = InputSource::from_arg(args.input.as_deref());
    let document = source.parse()?;

    if args.check {
        println!("✔ {} is valid", source.label());
        return Ok(());
    }

    let output = args.output.as_deref().filter(|path| *path != "-");
    with_output_writer(output, |writer| {
        if args.json {
            write_json(writer, &document, &args)
        } else {
            cuddle::to_writer_with_options(writer, &document, &write_options(&args))?;
            Ok(())
        }
    })?;

    if let Some(path) = output {
        println!("✔ Formatted {} → {path}", source.label());
    }
    Ok(())
}

fn write_options(args: &Args) -> WriteOptions {
    let indent = if args.tab {
        Indent::Tab
    } else {
        Indent::Spaces(args.indent)
    };
    WriteOptions::new()
        .with_indent(indent)
        .with_trailing_newline(!args.no_trailing_newline)
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_json(writer: &mut dyn Write, document: &Document, args: &Args) -> Result<(), Box<dyn Error>> {
    if args.indent == 0 && !args.tab {
        serde_json::to_writer(&mut *writer, document)?;
    } else {
        let indent_bytes = if args.tab {
            b"\t".to_vec()
        } else {
            vec![b' '; args.indent]
        };
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
        let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
        document.serialize(&mut serializer)?;
    }
    if !args.no_trailing_newline {
        writer.write_all(b"\n")?;
    }
    Ok(())
}
