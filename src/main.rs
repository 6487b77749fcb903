use anyhow::Result;
use clap::Parser;
use glossa::api::PushParams;
use glossa::commands;
use glossa::runtime::RealRuntime;
use std::path::PathBuf;

/// glossa - keep translation files in sync with the Glossa service
///
/// Running `glossa` with no subcommand is the same as `glossa generate`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Glossa API URL (defaults to https://app.glossa.io/api)
    #[arg(
        long = "api-url",
        env = "GLOSSA_API_URL",
        value_name = "URL",
        global = true
    )]
    api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage the stored API key
    Auth(AuthArgs),

    /// Translate changed files on the current branch
    Generate(GenerateArgs),

    /// Download a hosted translation file
    Pull(PullArgs),

    /// Upload a translation file to a hosted bundle
    Push(PushArgs),
}

#[derive(clap::Args, Debug)]
struct AuthArgs {
    /// API key to store
    #[arg(value_name = "API_KEY")]
    api_key: Option<String>,

    /// Print the stored API key
    #[arg(long)]
    show: bool,

    /// Remove the stored API key
    #[arg(long)]
    reset: bool,
}

#[derive(clap::Args, Debug, Default)]
struct GenerateArgs {
    /// Branch to diff against (defaults to the configured main branch)
    #[arg(long = "base-branch", short = 'b', value_name = "BRANCH")]
    base_branch: Option<String>,
}

#[derive(clap::Args, Debug)]
struct PullArgs {
    /// Where to write the downloaded file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[arg(long = "repo-id", value_name = "ID")]
    repo_id: String,

    #[arg(long, value_name = "LANGUAGE")]
    language: String,

    #[arg(long = "bundle-name", value_name = "NAME")]
    bundle_name: String,

    /// Branch to pull from instead of the default
    #[arg(long, value_name = "BRANCH")]
    branch: Option<String>,

    /// API token (overrides GLOSSA_API_TOKEN and the stored key)
    #[arg(long = "api-token", value_name = "TOKEN")]
    api_token: Option<String>,
}

#[derive(clap::Args, Debug)]
struct PushArgs {
    /// Translation file to upload
    #[arg(value_name = "FILE")]
    file: PathBuf,

    #[arg(long = "repo-id", value_name = "ID")]
    repo_id: String,

    #[arg(long, value_name = "LANGUAGE")]
    language: String,

    #[arg(long = "bundle-name", value_name = "NAME")]
    bundle_name: String,

    /// Replace keys that already exist in the bundle
    #[arg(long = "override")]
    override_file: bool,

    /// Do not machine-translate the uploaded keys
    #[arg(long = "no-auto-translate")]
    no_auto_translate: bool,

    /// Block until translations for the uploaded keys are ready
    #[arg(long = "wait-for-translations")]
    wait_for_translations: bool,

    /// Branch to push to instead of the default
    #[arg(long, value_name = "BRANCH")]
    branch: Option<String>,

    /// User to attribute the upload to
    #[arg(long, value_name = "USER")]
    user: Option<String>,

    /// Tags to attach to the uploaded keys
    #[arg(long, value_name = "TAG", num_args = 1..)]
    tags: Vec<String>,

    /// API token (overrides GLOSSA_API_TOKEN and the stored key)
    #[arg(long = "api-token", value_name = "TOKEN")]
    api_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    match cli.command.unwrap_or(Commands::Generate(GenerateArgs::default())) {
        Commands::Auth(args) => {
            commands::auth(&runtime, args.api_key.as_deref(), args.show, args.reset)?
        }
        Commands::Generate(args) => {
            commands::generate(runtime, args.base_branch, cli.api_url).await?
        }
        Commands::Pull(args) => {
            let params = PushParams {
                repo_id: args.repo_id,
                language: args.language,
                bundle_name: args.bundle_name,
                branch: args.branch,
                ..Default::default()
            };
            commands::pull(runtime, &args.file, params, args.api_token, cli.api_url).await?
        }
        Commands::Push(args) => {
            let params = PushParams {
                repo_id: args.repo_id,
                language: args.language,
                bundle_name: args.bundle_name,
                override_file: args.override_file.then_some(true),
                auto_translate: args.no_auto_translate.then_some(false),
                wait_for_translations: args.wait_for_translations.then_some(true),
                branch: args.branch,
                user: args.user,
            };
            let tags = if args.tags.is_empty() {
                None
            } else {
                Some(args.tags)
            };
            commands::push(runtime, &args.file, params, tags, args.api_token, cli.api_url).await?
        }
    }
    Ok(())
}
