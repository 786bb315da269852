//! Command-line options shared by the reporting commands.

use tyl_layout::{TailPadding, TargetModel};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub target: TargetModel,
    pub format: Format,
}

impl Options {
    /// Apply one `--flag`. Returns an error message for anything unknown.
    pub fn apply(&mut self, arg: &str) -> Result<(), String> {
        if let Some(name) = arg.strip_prefix("--target=") {
            let tail_padding = self.target.tail_padding;
            self.target = TargetModel::from_name(name)
                .ok_or_else(|| format!("unknown target `{name}` (expected lp64 or ilp32)"))?
                .with_tail_padding(tail_padding);
        } else if arg == "--reuse-tail-padding" {
            self.target.tail_padding = TailPadding::ReuseNonPod;
        } else if let Some(format) = arg.strip_prefix("--format=") {
            self.format = match format {
                "text" => Format::Text,
                "json" => Format::Json,
                _ => return Err(format!("unknown format `{format}` (expected text or json)")),
            };
        } else {
            return Err(format!("unknown option `{arg}`"));
        }
        Ok(())
    }
}

/// Split arguments into options and positional names.
pub fn parse_args<'a>(args: impl IntoIterator<Item = &'a str>) -> Result<(Options, Vec<&'a str>), String> {
    let mut options = Options::default();
    let mut names = Vec::new();
    for arg in args {
        if arg.starts_with("--") {
            options.apply(arg)?;
        } else {
            names.push(arg);
        }
    }
    Ok((options, names))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults() {
        let (options, names) = parse_args([]).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(options.target, TargetModel::LP64);
        assert_eq!(options.format, Format::Text);
        assert!(names.is_empty());
    }

    #[test]
    fn flags_in_any_order() {
        let args = ["--reuse-tail-padding", "pod", "--target=ilp32", "--format=json", "T2"];
        let (options, names) = parse_args(args).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(options.target.pointer_size, 4);
        assert_eq!(options.target.tail_padding, TailPadding::ReuseNonPod);
        assert_eq!(options.format, Format::Json);
        assert_eq!(names, vec!["pod", "T2"]);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(parse_args(["--target=sparc"]).is_err());
        assert!(parse_args(["--format=yaml"]).is_err());
        assert!(parse_args(["--verbose"]).is_err());
    }
}
