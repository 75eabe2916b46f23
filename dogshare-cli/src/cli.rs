use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Upload files to object storage and share them through short links
#[derive(Debug, Parser)]
#[command(name = "dogshare", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Upload a file and print its short link
    Upload {
        /// File to upload
        filepath: PathBuf,

        /// Who can read the object
        #[arg(value_parser = ["public", "private"])]
        policy: String,
    },

    /// List recorded uploads that have not expired
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_upload() {
        let cli = Cli::try_parse_from(["dogshare", "upload", "./a.png", "private"]).unwrap();
        match cli.command {
            Command::Upload { filepath, policy } => {
                assert_eq!(filepath, PathBuf::from("./a.png"));
                assert_eq!(policy, "private");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["dogshare", "upload", "./a.png", "Public"]).is_err());
        assert!(Cli::try_parse_from(["dogshare", "upload", "./a.png"]).is_err());
    }

    #[test]
    fn parses_list() {
        let cli = Cli::try_parse_from(["dogshare", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
    }
}
