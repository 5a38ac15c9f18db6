use crate::report::DetailSections;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "whichapp",
    version = crate::built_info::PKG_VERSION,
    about = "Inspect macOS applications and their default-handler registrations",
    long_about = None
)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Show build information
    #[arg(long)]
    pub build_info: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Find the default app(s) for an input.
    Opens(OpensArgs),
    /// Get information about an installed application.
    Appinfo(AppInfoArgs),
    /// Set the default app for an input.
    Setdefault(SetDefaultArgs),
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OpensArgs {
    /// URI, MIME type, file extension or type identifier.
    ///
    /// One of: a URI starting with a scheme ('mailto:...'), a MIME type
    /// ('text/plain'), a file extension ('.txt'), or a type identifier
    /// ('public.plain-text').
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// List all registered applications, not just the default.
    #[arg(short, long)]
    pub list: bool,

    /// Output JSON instead of text.
    #[arg(short, long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct AppInfoArgs {
    /// Name or path of the app.
    #[arg(value_name = "NAME_OR_PATH")]
    pub app: String,

    /// All details; equivalent to specifying every detail flag.
    #[arg(short, long)]
    pub detail: bool,

    /// Declared types; equivalent to --export-uti and --import-uti.
    #[arg(short, long)]
    pub uti: bool,

    /// Exported type declarations.
    #[arg(long)]
    pub export_uti: bool,

    /// Imported type declarations.
    #[arg(long)]
    pub import_uti: bool,

    /// Document types.
    #[arg(long)]
    pub doc: bool,

    /// Declared URL types.
    #[arg(long)]
    pub url: bool,

    /// Output JSON instead of text.
    #[arg(short, long)]
    pub json: bool,
}

impl AppInfoArgs {
    /// Merge the detail flags into a section selection.
    pub fn sections(&self) -> DetailSections {
        if self.detail {
            return DetailSections::all();
        }

        let mut sections = DetailSections::none();
        if self.uti {
            sections.exported_types = true;
            sections.imported_types = true;
        } else if self.export_uti {
            sections.exported_types = true;
        } else if self.import_uti {
            sections.imported_types = true;
        }
        if self.doc {
            sections.documents = true;
        }
        if self.url {
            sections.urls = true;
        }
        sections
    }
}

#[derive(ClapArgs, Debug, Clone)]
pub struct SetDefaultArgs {
    /// URI, MIME type, file extension or type identifier.
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Name or path of the app.
    #[arg(value_name = "NAME_OR_PATH")]
    pub app: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,

    /// Binary name to embed in the generated script.
    #[arg(long, default_value = "whichapp")]
    pub bin_name: String,

    /// Write the script to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn show_build_info() {
    println!("Version: {}", crate::built_info::PKG_VERSION);
    println!("Built: {}", crate::built_info::BUILT_TIME_UTC);

    if let Some(hash) = crate::built_info::GIT_COMMIT_HASH {
        println!("Commit: {hash}");
    } else {
        println!("Commit: unknown");
    }

    if let Some(branch) = crate::built_info::GIT_HEAD_REF {
        println!("Branch: {branch}");
    } else {
        println!("Branch: unknown");
    }

    println!("Target: {}", crate::built_info::TARGET);
    println!("Rustc: {}", crate::built_info::RUSTC_VERSION);
    println!("Profile: {}", crate::built_info::PROFILE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_opens() {
        let cli = Cli::try_parse_from(["whichapp", "opens", "mailto:"]).unwrap();
        match cli.command {
            Some(Command::Opens(args)) => {
                assert_eq!(args.input, "mailto:");
                assert!(!args.list);
                assert!(!args.json);
            }
            _ => panic!("Expected opens command"),
        }
    }

    #[test]
    fn test_cli_opens_list_json() {
        let cli = Cli::try_parse_from(["whichapp", "opens", "text/plain", "-l", "-j"]).unwrap();
        match cli.command {
            Some(Command::Opens(args)) => {
                assert!(args.list);
                assert!(args.json);
            }
            _ => panic!("Expected opens command"),
        }
    }

    #[test]
    fn test_cli_opens_requires_an_input() {
        assert!(Cli::try_parse_from(["whichapp", "opens"]).is_err());
    }

    #[test]
    fn test_cli_appinfo() {
        let cli = Cli::try_parse_from(["whichapp", "appinfo", "Safari"]).unwrap();
        match cli.command {
            Some(Command::Appinfo(args)) => {
                assert_eq!(args.app, "Safari");
                assert!(!args.sections().any());
            }
            _ => panic!("Expected appinfo command"),
        }
    }

    #[test]
    fn test_cli_setdefault() {
        let cli =
            Cli::try_parse_from(["whichapp", "setdefault", "mailto:", "Outlook"]).unwrap();
        match cli.command {
            Some(Command::Setdefault(args)) => {
                assert_eq!(args.input, "mailto:");
                assert_eq!(args.app, "Outlook");
            }
            _ => panic!("Expected setdefault command"),
        }
    }

    #[test]
    fn test_cli_verbose_is_global() {
        let cli = Cli::try_parse_from(["whichapp", "opens", "mailto:", "--verbose"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_detail_flag_selects_everything() {
        let cli = Cli::try_parse_from(["whichapp", "appinfo", "Safari", "--detail"]).unwrap();
        let Some(Command::Appinfo(args)) = cli.command else {
            panic!("Expected appinfo command");
        };
        assert_eq!(args.sections(), DetailSections::all());
    }

    #[test]
    fn test_uti_flag_selects_both_type_sections() {
        let cli = Cli::try_parse_from(["whichapp", "appinfo", "Safari", "--uti"]).unwrap();
        let Some(Command::Appinfo(args)) = cli.command else {
            panic!("Expected appinfo command");
        };
        let sections = args.sections();
        assert!(sections.exported_types);
        assert!(sections.imported_types);
        assert!(!sections.documents);
        assert!(!sections.urls);
    }

    #[test]
    fn test_one_sided_and_section_flags_combine() {
        let cli = Cli::try_parse_from([
            "whichapp",
            "appinfo",
            "Safari",
            "--export-uti",
            "--doc",
            "--url",
        ])
        .unwrap();
        let Some(Command::Appinfo(args)) = cli.command else {
            panic!("Expected appinfo command");
        };
        let sections = args.sections();
        assert!(sections.exported_types);
        assert!(!sections.imported_types);
        assert!(sections.documents);
        assert!(sections.urls);
    }

    #[test]
    fn test_cli_parse_help() {
        Cli::command().debug_assert();
    }
}
