use clap_serde_derive::{
    clap::{self, Parser},
    serde::Serialize,
    ClapSerde,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Three subway lines as flocks of birds, brighter when the lines are busier.
pub struct Args {
    /// Config file, TOML or YAML (by extension)
    #[arg(short, long = "config", default_value = "murmur.toml")]
    pub config_path: std::path::PathBuf,

    /// Rest of arguments
    #[command(flatten)]
    pub config: <Config as ClapSerde>::Opt,
}

#[derive(ClapSerde, Serialize)]
/// Programatic configuration
///
/// Uses defaults, which can be overwritten by specifying a filepath for the `-c` or `--config` arg option
pub struct Config {
    #[default(1200)]
    #[arg(short = 'x', long)]
    pub init_width: u32,

    #[default(700)]
    #[arg(short = 'y', long)]
    pub init_height: u32,

    #[default("baseline".to_owned())]
    #[arg(short = 'v', long)]
    /// animation variant, `baseline` or `enhanced`
    pub variant: String,

    #[default(90)]
    #[arg(short = 'n', long)]
    /// birds per line on a regular sized window
    pub boids: usize,

    #[default(0.)]
    #[arg(long = "free")]
    /// share of birds that start out ignoring their flock
    pub free_fraction: f32,

    #[default(0)]
    #[arg(short = 's', long)]
    /// rng seed, 0 picks one at random
    pub seed: u64,

    #[default("card.png".to_owned())]
    #[arg(long)]
    /// card sprite, birds are drawn as strokes when it is missing
    pub card: String,

    #[default("mta-art-lines.json".to_owned())]
    #[arg(long)]
    pub catalog: String,

    #[default("123".to_owned())]
    #[arg(short = 'l', long)]
    /// catalog line shown at start
    pub line: String,

    #[default(true)]
    #[arg(long)]
    pub show_catalog: bool,
}
