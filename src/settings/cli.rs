use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "bookshelf", about = "Books and categories API")]
pub struct Cli {
    /// Path to a settings file, without or with the `.toml` extension.
    #[arg(long)]
    pub settings: Option<String>,
}
