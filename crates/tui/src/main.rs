mod host;
mod renderer;
mod session;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use inkfield_protocol::Theme;

const USAGE: &str = "Usage: inkfield field [--dark] [--static]
       inkfield sign <out.png> [--svg <out.svg>]";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let flag = |name: &str| args.iter().any(|a| a == name);

    match args.first().map(String::as_str) {
        Some("field") => {
            let theme = if flag("--dark") { Theme::Dark } else { Theme::Light };
            session::run_field(theme, flag("--static"))
        }
        Some("sign") => {
            let Some(out) = args.get(1).filter(|a| !a.starts_with("--")) else {
                bail!("missing output path\n{USAGE}");
            };
            let svg = args
                .iter()
                .position(|a| a == "--svg")
                .and_then(|i| args.get(i + 1))
                .map(PathBuf::from);
            session::run_signature(Path::new(out), svg.as_deref())
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}
