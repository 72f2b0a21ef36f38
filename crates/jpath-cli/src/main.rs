use std::io::Write;
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use jpath_classpath::{FileResource, PackageView, SearchPath};
use jpath_config::{init_tracing, JpathConfig, SearchPaths};
use jpath_core::{ClassName, PackageName, CLASS_EXTENSION, SOURCE_EXTENSION};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "jpath",
    version,
    about = "Resolve classes and sources on a Java class path"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct GlobalArgs {
    /// Class path (defaults to the config file, then `CLASSPATH`, then `.`)
    #[arg(long, visible_alias = "cp", global = true)]
    classpath: Option<String>,
    /// Separate source path (defaults to the class path)
    #[arg(long, global = true)]
    sourcepath: Option<String>,
    /// JDK home or runtime image root to append to the class path
    #[arg(long, global = true, conflicts_with = "no_image")]
    image: Option<PathBuf>,
    /// Do not append the runtime image
    #[arg(long, global = true)]
    no_image: bool,
    /// Config file (defaults to `jpath.toml` in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Emit JSON suitable for scripts
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one relative name such as `com/example/Foo.class`
    Find(FindArgs),
    /// List the files of a package by extension
    List(ListArgs),
    /// Resolve a class name to its class and source files
    Class(ClassArgs),
    /// Check whether a package exists and list its files
    Package(PackageArgs),
    /// Write the bytes of a resolved file to stdout
    Cat(CatArgs),
    /// Print the entries of the class path in search order
    Entries,
}

#[derive(Args)]
struct FindArgs {
    name: String,
    /// Look for a directory instead of a file
    #[arg(long)]
    directory: bool,
    /// Search the source path instead of the class path
    #[arg(long)]
    source: bool,
}

#[derive(Args)]
struct ListArgs {
    /// Package, dotted (`com.example`) or as a directory (`com/example`)
    package: String,
    /// File extension to match; `.java` lists the source path
    #[arg(long, default_value = CLASS_EXTENSION)]
    ext: String,
}

#[derive(Args)]
struct ClassArgs {
    /// Class name such as `com.example.Outer$Inner`
    class: String,
}

#[derive(Args)]
struct PackageArgs {
    package: String,
}

#[derive(Args)]
struct CatArgs {
    name: String,
    #[arg(long)]
    source: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let config = load_config(&cli.global)?;
    init_tracing(&config.logging);

    let paths = config.classpath.search_paths();
    tracing::debug!(
        target = "jpath.cli",
        class_path = %paths.binary,
        source_path = %paths.source(),
        entries = paths.binary.len(),
        "search paths ready"
    );
    let result = execute(cli.command, &paths, cli.global.json);
    paths.close();
    result
}

fn load_config(args: &GlobalArgs) -> Result<JpathConfig> {
    let mut config = match &args.config {
        Some(path) => JpathConfig::load_from_path(path)?,
        None => {
            let cwd = std::env::current_dir().context("failed to determine current directory")?;
            jpath_config::load_for_workspace(&cwd)?.0
        }
    };

    if let Some(class_path) = &args.classpath {
        config.classpath.class_path = Some(class_path.clone());
    }
    if let Some(source_path) = &args.sourcepath {
        config.classpath.source_path = Some(source_path.clone());
    }
    if let Some(image) = &args.image {
        config.classpath.image.enabled = true;
        config.classpath.image.home = Some(image.clone());
    }
    if args.no_image {
        config.classpath.image.enabled = false;
    }
    Ok(config)
}

fn execute(command: Command, paths: &SearchPaths, json: bool) -> Result<i32> {
    match command {
        Command::Find(args) => {
            let path = if args.source { paths.source() } else { &paths.binary };
            let found = if args.directory {
                path.find_directory(&args.name)
            } else {
                path.find_file(&args.name)
            };
            print_found(&args.name, found.as_ref(), json)
        }
        Command::List(args) => {
            let package = PackageName::new(&args.package);
            let path = if args.ext == SOURCE_EXTENSION {
                paths.source()
            } else {
                &paths.binary
            };
            let files: Vec<ResourceReport> = path
                .list_files(&package.dir_path(), &args.ext)
                .iter()
                .map(ResourceReport::from)
                .collect();

            if json {
                print_json(&files)?;
            } else {
                for file in &files {
                    println!("{}", file.path);
                }
            }
            Ok(if files.is_empty() { 1 } else { 0 })
        }
        Command::Class(args) => {
            let class = ClassName::parse(&args.class)
                .with_context(|| format!("invalid class name `{}`", args.class))?;
            let package = class.package();
            let view = PackageView::with_paths(paths.source(), &paths.binary, &package);
            let report = ClassReport {
                class: class.binary_name(),
                exists: view.class_exists(&class),
                binary: view.binary_file(&class).as_ref().map(ResourceReport::from),
                source: view.source_file(&class).as_ref().map(ResourceReport::from),
            };

            if json {
                print_json(&report)?;
            } else {
                println!("class: {}", report.class);
                println!("  exists: {}", report.exists);
                let show = |r: &Option<ResourceReport>| {
                    r.as_ref()
                        .map(|r| r.path.clone())
                        .unwrap_or_else(|| "(missing)".to_owned())
                };
                println!("  binary: {}", show(&report.binary));
                println!("  source: {}", show(&report.source));
            }
            Ok(if report.exists { 0 } else { 1 })
        }
        Command::Package(args) => {
            let package = PackageName::new(&args.package);
            let view = PackageView::with_paths(paths.source(), &paths.binary, &package);
            let report = PackageReport {
                package: view.to_string(),
                exists: view.exists(),
                binary_files: view.binary_files().iter().map(FileResource::name).collect(),
                source_files: view.source_files().iter().map(FileResource::name).collect(),
            };

            if json {
                print_json(&report)?;
            } else {
                println!("{}", report.package);
                println!("  exists: {}", report.exists);
                println!("  binary_files: {}", report.binary_files.join(", "));
                println!("  source_files: {}", report.source_files.join(", "));
            }
            Ok(if report.exists { 0 } else { 1 })
        }
        Command::Cat(args) => {
            let path = if args.source { paths.source() } else { &paths.binary };
            let Some(resource) = path.find_file(&args.name) else {
                eprintln!("not found: {}", args.name);
                return Ok(1);
            };
            let bytes = resource
                .read_bytes()
                .with_context(|| format!("failed to read {}", resource.path()))?;
            std::io::stdout()
                .write_all(&bytes)
                .context("failed to write to stdout")?;
            Ok(0)
        }
        Command::Entries => {
            let entries = entry_reports(&paths.binary);
            if json {
                print_json(&entries)?;
            } else {
                for entry in &entries {
                    println!("{:<8}{}", entry.kind, entry.location);
                }
            }
            Ok(0)
        }
    }
}

#[derive(Serialize)]
struct ResourceReport {
    name: String,
    path: String,
    absolute_path: String,
    archived: bool,
    directory: bool,
    length: u64,
    last_modified_secs: u64,
}

impl From<&FileResource> for ResourceReport {
    fn from(resource: &FileResource) -> Self {
        Self {
            name: resource.name(),
            path: resource.path(),
            absolute_path: resource.absolute_path(),
            archived: resource.is_archived(),
            directory: resource.is_directory(),
            length: resource.length(),
            last_modified_secs: resource
                .last_modified()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0),
        }
    }
}

#[derive(Serialize)]
struct FoundReport<'a> {
    name: &'a str,
    found: bool,
    resource: Option<ResourceReport>,
}

#[derive(Serialize)]
struct ClassReport {
    class: String,
    exists: bool,
    binary: Option<ResourceReport>,
    source: Option<ResourceReport>,
}

#[derive(Serialize)]
struct PackageReport {
    package: String,
    exists: bool,
    binary_files: Vec<String>,
    source_files: Vec<String>,
}

#[derive(Serialize)]
struct EntryReport {
    kind: &'static str,
    location: String,
}

fn entry_reports(path: &SearchPath) -> Vec<EntryReport> {
    path.entries()
        .iter()
        .map(|entry| EntryReport {
            kind: entry.kind(),
            location: entry.to_string(),
        })
        .collect()
}

fn print_found(name: &str, found: Option<&FileResource>, json: bool) -> Result<i32> {
    let report = FoundReport {
        name,
        found: found.is_some(),
        resource: found.map(ResourceReport::from),
    };

    if json {
        print_json(&report)?;
    } else if let Some(resource) = &report.resource {
        println!("{}", resource.path);
    } else {
        eprintln!("not found: {name}");
    }
    Ok(if report.found { 0 } else { 1 })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value)?;
    println!("{out}");
    Ok(())
}
