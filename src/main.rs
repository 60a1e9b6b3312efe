use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use is_terminal::IsTerminal;
use kit::areas::repository::Repository;
use kit::commands::plumbing::cat_file::CatFileMode;
use kit::commands::plumbing::hash_object::{HashSource, hash_object};
use kit::commands::porcelain::log::{DEFAULT_LOG_DISTANCE, LogStart};
use kit::commands::porcelain::tag::TagOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "KIT_LOG";

#[derive(Parser)]
#[command(
    name = "kit",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small git-compatible object store",
    long_about = "kit stores content-addressed objects, stages files in a git-compatible index \
    and resolves references, using the same on-disk layout as git.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(name = "add", about = "Stage files and directories in the index")]
    Add {
        #[arg(index = 1, required = true, help = "Paths to stage, relative to the current directory")]
        paths: Vec<String>,
    },
    #[command(name = "rm", about = "Remove paths from the index")]
    Rm {
        #[arg(index = 1, required = true, help = "Index entries to remove")]
        paths: Vec<String>,
    },
    #[command(name = "ls-files", about = "List the paths staged in the index")]
    LsFiles,
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content, kind or size of an object. \
        The object may be named by a full or abbreviated hash, a branch, a tag or HEAD."
    )]
    #[command(group(ArgGroup::new("mode").args(["kind", "size"])))]
    CatFile {
        #[arg(short = 't', help = "Print the object kind")]
        kind: bool,
        #[arg(short = 's', help = "Print the object size")]
        size: bool,
        #[arg(index = 1)]
        object: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash an object and optionally write it to the object database"
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object database")]
        write: bool,
        #[arg(long, conflicts_with = "file", help = "Read the content from standard input")]
        stdin: bool,
        #[arg(index = 1, required_unless_present = "stdin")]
        file: Option<PathBuf>,
    },
    #[command(name = "show-ref", about = "List references with the objects they point at")]
    ShowRef,
    #[command(name = "commit", about = "Record the index as a new commit")]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show first-parent commit history")]
    #[command(group(ArgGroup::new("start").args(["branch", "commit"])))]
    Log {
        #[arg(short = 'b', long, help = "Start from the tip of this branch")]
        branch: Option<String>,
        #[arg(short = 'c', long, help = "Start from this commit")]
        commit: Option<String>,
        #[arg(index = 1, default_value_t = DEFAULT_LOG_DISTANCE, help = "Number of commits to show")]
        distance: usize,
    },
    #[command(name = "tag", about = "List, create or delete tags")]
    Tag {
        #[arg(index = 1)]
        name: Option<String>,
        #[arg(index = 2, help = "Object to tag, HEAD by default")]
        object: Option<String>,
        #[arg(short, long, help = "Create an annotated tag")]
        message: Option<String>,
        #[arg(short, long, help = "Delete the tag")]
        delete: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn repository(cwd: &Path) -> Result<Repository> {
    Repository::find(cwd, Box::new(std::io::stdout()))
}

fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { path } => {
            let dir = match path {
                Some(path) => cwd.join(path),
                None => cwd,
            };
            std::fs::create_dir_all(&dir)?;

            Repository::initialize(&dir.canonicalize()?, Box::new(std::io::stdout()))?;
        }
        Commands::Add { paths } => repository(&cwd)?.add(&cwd, &paths)?,
        Commands::Rm { paths } => repository(&cwd)?.rm(&paths)?,
        Commands::LsFiles => repository(&cwd)?.ls_files()?,
        Commands::CatFile { kind, size, object } => {
            let mode = match (kind, size) {
                (true, _) => CatFileMode::Type,
                (_, true) => CatFileMode::Size,
                _ => CatFileMode::Pretty,
            };
            repository(&cwd)?.cat_file(&object, mode)?
        }
        Commands::HashObject { write, stdin, file } => {
            let source = match (&file, stdin) {
                (Some(file), false) => HashSource::File(file),
                _ => HashSource::Stdin,
            };
            let blob = source.read_blob()?;

            if write {
                let repository = repository(&cwd)?;
                hash_object(&blob, Some(repository.database()), &mut *repository.writer())?;
            } else {
                hash_object(&blob, None, &mut std::io::stdout())?;
            }
        }
        Commands::ShowRef => repository(&cwd)?.show_ref()?,
        Commands::Commit { message } => {
            repository(&cwd)?.commit(&message)?;
        }
        Commands::Log {
            branch,
            commit,
            distance,
        } => {
            let start = match (branch, commit) {
                (Some(branch), _) => LogStart::Branch(branch),
                (_, Some(commit)) => LogStart::Commit(commit),
                _ => LogStart::Head,
            };
            repository(&cwd)?.log(&start, distance)?
        }
        Commands::Tag {
            name,
            object,
            message,
            delete,
        } => repository(&cwd)?.tag(&TagOptions {
            name,
            object,
            message,
            delete,
        })?,
    }

    Ok(())
}

fn main() {
    init_tracing();
    colored::control::set_override(std::io::stdout().is_terminal());

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        println!("{err:#}");
        std::process::exit(1);
    }
}
