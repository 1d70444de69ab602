mod app;

use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use app::{App, HELP, parse_export_format};
use inkpad_core::{DocumentId, diff_html, diff_lines};
use inkpad_export::{
    ImportFormat, export_document, html_to_markdown, import_content, stats, write_export,
};
use inkpad_session::{Config, JsonFileStore};

/// Rich-text document editor core with undo history and versions
#[derive(Parser, Debug)]
#[command(name = "inkpad")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding saved documents (overrides the config file)
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive editing session on stdin (the default)
    Edit {
        /// Document to open (number from `list` or id)
        doc: Option<String>,
    },
    /// List saved documents
    List,
    /// Line diff between two files
    Diff {
        old: PathBuf,
        new: PathBuf,
        /// Render as HTML instead of +/- lines
        #[arg(long)]
        html: bool,
    },
    /// Convert a file between Markdown, plain text and editor HTML
    Convert {
        input: PathBuf,
        /// Target format
        #[arg(long, value_enum)]
        to: Target,
        /// Source format (guessed from the extension when omitted)
        #[arg(long, value_enum)]
        from: Option<Source>,
    },
    /// Word, character and paragraph counts of a file
    Stats {
        input: PathBuf,
        /// Source format (guessed from the extension when omitted)
        #[arg(long, value_enum)]
        from: Option<Source>,
    },
    /// Write a saved document to a file
    Export {
        /// Document id
        id: String,
        /// html or md
        #[arg(long, default_value = "html")]
        format: String,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Target {
    Html,
    Markdown,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Source {
    Html,
    Markdown,
    Text,
}

impl From<Source> for ImportFormat {
    fn from(source: Source) -> Self {
        match source {
            Source::Html => ImportFormat::Html,
            Source::Markdown => ImportFormat::Markdown,
            Source::Text => ImportFormat::PlainText,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI args
    let args = Args::parse();

    let mut config = Config::load();
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }

    match args.command.unwrap_or(Command::Edit { doc: None }) {
        Command::Edit { doc } => run_session(config, doc),
        Command::List => {
            let docs = JsonFileStore::new(&config.data_dir).load_all()?;
            for doc in docs {
                println!(
                    "{}  {}  {}",
                    doc.id(),
                    doc.updated_at().format("%Y-%m-%d %H:%M"),
                    doc.title()
                );
            }
            Ok(())
        }
        Command::Diff { old, new, html } => {
            let old = read(&old)?;
            let new = read(&new)?;
            if html {
                println!("{}", diff_html(&old, &new));
            } else {
                let diff = diff_lines(&old, &new);
                for line in &diff.removed {
                    println!("- {line}");
                }
                for line in &diff.added {
                    println!("+ {line}");
                }
            }
            Ok(())
        }
        Command::Convert { input, to, from } => {
            let text = read(&input)?;
            let format = from.map(Into::into).unwrap_or_else(|| ImportFormat::from_path(&input));
            let html = import_content(&text, format);
            match to {
                Target::Html => println!("{html}"),
                Target::Markdown => println!("{}", html_to_markdown(&html)),
            }
            Ok(())
        }
        Command::Stats { input, from } => {
            let text = read(&input)?;
            let format = from.map(Into::into).unwrap_or_else(|| ImportFormat::from_path(&input));
            println!("{}", stats(&import_content(&text, format)));
            Ok(())
        }
        Command::Export { id, format, output } => {
            let id = DocumentId::parse(&id).ok_or_else(|| anyhow!("invalid document id `{id}`"))?;
            let doc = JsonFileStore::new(&config.data_dir).load(id)?;
            let exported = export_document(&doc, parse_export_format(&format)?);
            let path = write_export(&output, &exported)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Line-oriented editing loop over stdin
fn run_session(config: Config, doc: Option<String>) -> Result<()> {
    let mut app = App::new(config)?;
    tracing::debug!(data_dir = %app.data_dir().display(), "session started");

    match doc {
        Some(doc) => print_result(app.execute(&format!("open {doc}"))),
        None => print_result(app.execute("new")),
    }

    let interactive = std::io::stdin().is_terminal();
    if interactive {
        println!("{HELP}");
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    while app.running {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        print_result(app.execute(&line?));
        for event in app.drain_save_events() {
            println!("{event}");
        }
    }

    let unsaved = app.unsaved_titles();
    if !unsaved.is_empty() {
        eprintln!("warning: leaving with unsaved changes in: {}", unsaved.join(", "));
    }
    app.shutdown();
    Ok(())
}

fn print_result(result: Result<String>) {
    match result {
        Ok(out) if out.is_empty() => {}
        Ok(out) => println!("{out}"),
        Err(e) => eprintln!("error: {e:#}"),
    }
}
