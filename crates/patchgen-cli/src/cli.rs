use std::path::PathBuf;

use clap::Parser;

use crate::config::OutputFormat;

#[derive(Parser)]
#[command(
    name = "patchgen",
    about = "Write a unified diff patch describing how one file became another",
    version,
)]
pub struct Cli {
    /// Original file [default: input1]
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// New file [default: input2]
    #[arg(long)]
    pub to: Option<PathBuf>,

    /// Patch file to write [default: diff.patch]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Lines of context around each change [default: 3]
    #[arg(short = 'U', long)]
    pub context: Option<usize>,

    /// TOML file with settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keep very common lines in the match index, for exact diffs of large files
    #[arg(long)]
    pub no_autojunk: bool,

    /// Never let blank lines anchor a match
    #[arg(long)]
    pub junk_blank_lines: bool,

    #[arg(long)]
    pub format: Option<OutputFormat>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["patchgen"]).unwrap();
        assert!(cli.from.is_none());
        assert!(cli.to.is_none());
        assert!(cli.output.is_none());
        assert!(cli.context.is_none());
        assert!(!cli.no_autojunk);
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_paths() {
        let cli = Cli::try_parse_from(["patchgen", "--from", "a.txt", "--to", "b.txt", "-o", "out.patch"]).unwrap();
        assert_eq!(cli.from, Some("a.txt".into()));
        assert_eq!(cli.to, Some("b.txt".into()));
        assert_eq!(cli.output, Some("out.patch".into()));
    }

    #[test]
    fn parse_context() {
        let cli = Cli::try_parse_from(["patchgen", "-U", "0"]).unwrap();
        assert_eq!(cli.context, Some(0));
        let cli = Cli::try_parse_from(["patchgen", "--context", "7"]).unwrap();
        assert_eq!(cli.context, Some(7));
    }

    #[test]
    fn reject_negative_context() {
        assert!(Cli::try_parse_from(["patchgen", "-U", "-1"]).is_err());
    }

    #[test]
    fn parse_junk_flags() {
        let cli = Cli::try_parse_from(["patchgen", "--no-autojunk", "--junk-blank-lines"]).unwrap();
        assert!(cli.no_autojunk);
        assert!(cli.junk_blank_lines);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["patchgen", "--format", "json"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["patchgen", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
