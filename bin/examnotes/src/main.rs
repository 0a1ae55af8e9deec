//! examnotes CLI
//!
//! Validates the content collections of an exam-notes site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use examnotes::cmd;

/// Command-line interface for examnotes.
#[derive(Parser)]
#[command(
    name = "examnotes",
    version,
    about = "Validate and inspect exam-notes content collections"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "examnotes.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Validate configuration and every content entry
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
    /// List valid topics in display order
    List {
        /// Only show topics carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Print the registered collection schemas
    Schema,
    /// Create a new topic with valid frontmatter
    New {
        /// Path inside the topics collection (e.g., trees/avl)
        slug: String,
        /// Topic title
        #[arg(short, long)]
        title: String,
        /// Display position (1-11)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=11))]
        order: u8,
        /// Tag label (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Create an .mdx file
        #[arg(long)]
        mdx: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    examnotes::init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { strict } => {
            cmd::check::run(&cli.config, strict)?;
        }
        Commands::List { tag } => {
            cmd::list::run(&cli.config, tag.as_deref())?;
        }
        Commands::Schema => {
            cmd::schema::run()?;
        }
        Commands::New {
            slug,
            title,
            order,
            tags,
            mdx,
        } => {
            let topic = cmd::new::NewTopic {
                slug: &slug,
                title: &title,
                order,
                tags: &tags,
                mdx,
            };
            cmd::new::run(&cli.config, &topic)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_check_command_parsing() {
        let args = ["examnotes", "check", "--strict"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, std::path::PathBuf::from("examnotes.toml"));
        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Check { strict } => {
                assert!(strict);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_list_with_tag() {
        let args = ["examnotes", "list", "--tag", "graphs"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::List { tag } => {
                assert_eq!(tag.as_deref(), Some("graphs"));
            }
            _ => panic!("Expected List command"),
        }
    }

    #[test]
    fn test_cli_new_command_parsing() {
        let args = [
            "examnotes",
            "new",
            "trees/avl",
            "--title",
            "AVL Trees",
            "--order",
            "6",
            "--tag",
            "trees",
            "--tag",
            "balanced",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::New {
                slug,
                title,
                order,
                tags,
                mdx,
            } => {
                assert_eq!(slug, "trees/avl");
                assert_eq!(title, "AVL Trees");
                assert_eq!(order, 6);
                assert_eq!(tags, vec!["trees", "balanced"]);
                assert!(!mdx);
            }
            _ => panic!("Expected New command"),
        }
    }

    #[test]
    fn test_cli_new_rejects_out_of_range_order() {
        let args = ["examnotes", "new", "x", "--title", "X", "--order", "12"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_schema_command_parsing() {
        let cli = Cli::parse_from(["examnotes", "schema"]);
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let args = ["examnotes", "-vvv", "check"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_custom_config_path() {
        let args = ["examnotes", "--config", "site.toml", "check"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.config, std::path::PathBuf::from("site.toml"));
    }
}
