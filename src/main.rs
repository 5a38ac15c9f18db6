use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use log::debug;
use std::fs;

mod application;
mod bundle_info;
mod cli;
mod input;
mod registry;
mod report;
mod resolver;

// Build info module
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

use application::Application;
use bundle_info::BundleInfo;
use cli::{AppInfoArgs, Cli, Command, CompletionsArgs, OpensArgs, SetDefaultArgs};
use input::TypedInput;
use report::DetailSections;
use resolver::HandlerResolver;

fn main() -> Result<()> {
    clap_complete::CompleteEnv::with_factory(|| Cli::command().name("whichapp"))
        .completer("whichapp")
        .complete();

    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if cli.build_info {
        cli::show_build_info();
        return Ok(());
    }

    match cli.command {
        Some(command) => handle_command(command),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn handle_command(command: Command) -> Result<()> {
    match command {
        Command::Opens(args) => run_opens(args),
        Command::Appinfo(args) => run_appinfo(args),
        Command::Setdefault(args) => run_setdefault(args),
        Command::Completions(args) => run_completions(args),
    }
}

/// Classify a raw input string, rejecting anything outside the four kinds.
fn classify_input(raw: &str) -> Result<TypedInput> {
    match TypedInput::classify(raw) {
        Some(input) => {
            debug!("Classified '{raw}' as {}", input.kind.display_name());
            Ok(input)
        }
        None => bail!("'{raw}' isn't a valid input"),
    }
}

fn run_opens(args: OpensArgs) -> Result<()> {
    let input = classify_input(&args.input)?;
    let resolver = HandlerResolver::platform()?;
    opens_with(&resolver, &input, &args)
}

fn opens_with(resolver: &HandlerResolver, input: &TypedInput, args: &OpensArgs) -> Result<()> {
    if args.list {
        return list_handlers(resolver, input, args.json);
    }

    let default = resolver.resolve_default(input)?;

    if args.json {
        let payload = serde_json::json!({
            "input": input.raw,
            "kind": input.kind,
            "default": default
                .as_ref()
                .map(|app| report::application_json(app, load_info_quietly(app).as_ref())),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match default {
        Some(app) => {
            let info = load_info_quietly(&app);
            println!("Default app for {input}:");
            println!(
                "{}",
                report::render_application(&app, info.as_ref(), DetailSections::none())
            );
            println!("use `whichapp appinfo \"{}\"` to view details", app.name());
        }
        None => {
            println!("No default app for {input}");
            // The lookup already succeeded for this input; a listing failure
            // here only loses the fallback, not the answer.
            if let Err(error) = list_handlers(resolver, input, false) {
                debug!("Fallback listing failed: {error:#}");
            }
        }
    }
    Ok(())
}

fn list_handlers(resolver: &HandlerResolver, input: &TypedInput, json: bool) -> Result<()> {
    let handlers = resolver.resolve_all(input)?;
    let default_path = resolver
        .resolve_default(input)?
        .map(|app| app.path().to_path_buf());

    if json {
        let entries: Vec<serde_json::Value> = handlers
            .iter()
            .map(|app| {
                let mut entry = report::application_json(app, load_info_quietly(app).as_ref());
                entry["default"] =
                    serde_json::Value::Bool(default_path.as_deref() == Some(app.path()));
                entry
            })
            .collect();
        let payload = serde_json::json!({
            "input": input.raw,
            "kind": input.kind,
            "handlers": entries,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if handlers.is_empty() {
        println!("No apps for {input}");
        return Ok(());
    }

    let entries: Vec<(Application, Option<BundleInfo>)> = handlers
        .into_iter()
        .map(|app| {
            let info = load_info_quietly(&app);
            (app, info)
        })
        .collect();

    println!("Registered Apps for {input}:");
    println!(
        "{}",
        report::render_handler_list(&entries, default_path.as_deref())
    );
    Ok(())
}

fn run_appinfo(args: AppInfoArgs) -> Result<()> {
    let apps = Application::find(&args.app);
    let sections = args.sections();

    if apps.is_empty() {
        eprintln!(
            "Found no app '{}'. \n try a relative or absolute path",
            args.app
        );
        return Ok(());
    }

    if args.json {
        let entries: Vec<serde_json::Value> = apps
            .iter()
            .map(|app| report::application_json(app, load_info_quietly(app).as_ref()))
            .collect();
        match entries.as_slice() {
            [entry] => println!("{}", serde_json::to_string_pretty(entry)?),
            _ => println!("{}", serde_json::to_string_pretty(&entries)?),
        }
        return Ok(());
    }

    match apps.as_slice() {
        [app] => print_application(app, sections),
        _ => {
            println!(
                "Found multiple possible matches for '{}'. \n try a relative or absolute path to be more precise",
                args.app
            );
            for app in &apps {
                print_application(app, DetailSections::none());
            }
        }
    }

    if !sections.any() {
        println!("see more info using detail commands (or --detail for everything)");
    }
    Ok(())
}

fn run_setdefault(args: SetDefaultArgs) -> Result<()> {
    let input = classify_input(&args.input)?;
    let apps = Application::find(&args.app);

    if apps.is_empty() {
        eprintln!("Found no app '{}'", args.app);
        return Ok(());
    }

    let app = match apps.as_slice() {
        [app] => app,
        _ => {
            println!(
                "Found multiple possible apps for '{}'. \n try a relative or absolute path to be more precise",
                args.app
            );
            for app in &apps {
                print_application(app, DetailSections::none());
            }
            return Ok(());
        }
    };

    let mut resolver = HandlerResolver::platform()?;
    set_default_with(&mut resolver, app, &input)
}

fn set_default_with(
    resolver: &mut HandlerResolver,
    app: &Application,
    input: &TypedInput,
) -> Result<()> {
    resolver.set_default(app, input)?;
    println!("setting '{}' as default handler for {input}", app.name());
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    let shell = args.shell;
    let bin_name = args.bin_name;

    if let Some(path) = args.output {
        // parent() yields "" for bare file names, which create_dir_all rejects
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = fs::File::create(&path)?;
        clap_complete::generate(shell, &mut command, bin_name, &mut file);
        println!("Generated {shell} completions at {}", path.display());
    } else {
        let mut stdout = std::io::stdout();
        clap_complete::generate(shell, &mut command, bin_name, &mut stdout);
    }

    Ok(())
}

/// Metadata for list entries and JSON payloads; failures only degrade the
/// entry.
fn load_info_quietly(app: &Application) -> Option<BundleInfo> {
    match BundleInfo::load(app.path()) {
        Ok(info) => Some(info),
        Err(error) => {
            debug!(
                "No readable metadata for {}: {error:#}",
                app.path().display()
            );
            None
        }
    }
}

/// Print one application's report, noting unreadable metadata instead of
/// aborting.
fn print_application(app: &Application, sections: DetailSections) {
    let info = match BundleInfo::load(app.path()) {
        Ok(info) => Some(info),
        Err(error) => {
            println!("Failed to read app info: {error:#}");
            None
        }
    };
    println!(
        "{}",
        report::render_application(app, info.as_ref(), sections)
    );
}
