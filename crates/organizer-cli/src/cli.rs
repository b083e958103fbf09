use std::path::PathBuf;

use clap::Parser;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "music-organizer", version = VERSION)]
pub struct Args {
    /// Directory of ripped albums to organize
    pub source: PathBuf,

    /// Library root to write into (defaults to the parent of SOURCE)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Optional config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Splitter executable used for cue + audio rips
    #[arg(long)]
    pub splitter: Option<PathBuf>,

    /// Seconds to wait for the splitter before killing it
    #[arg(long)]
    pub split_timeout: Option<u64>,
}
