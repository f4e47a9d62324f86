mod commands;
mod verbose;

use std::path::PathBuf;

use clap::{FromArgMatches as _, IntoApp as _, Parser, Subcommand};
use tracing_error::ErrorLayer;
use tracing_subscriber::{prelude::*, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;
use twelf::Layer;

use storyadmin_common::Conf;

use crate::commands::ResourceKind;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    #[clap(flatten)]
    verbose: verbose::Verbosity,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with the configured username and password
    Login,
    /// Forget the stored session token
    Logout,
    /// Show one page of a resource list
    List {
        #[clap(arg_enum)]
        resource: ResourceKind,
        /// 1-based page number
        #[clap(long, default_value = "1")]
        page: usize,
        /// Search term, or the story id when listing chapters
        #[clap(long)]
        search: Option<String>,
    },
    /// Print the stored record of one entity
    Show {
        #[clap(arg_enum)]
        resource: ResourceKind,
        id: String,
    },
    /// Create an entity from `--set field=value` pairs
    Create {
        #[clap(arg_enum)]
        resource: ResourceKind,
        #[clap(long = "set", short = 's')]
        set: Vec<String>,
    },
    /// Change fields of an entity, everything else is sent back untouched
    Edit {
        #[clap(arg_enum)]
        resource: ResourceKind,
        id: String,
        #[clap(long = "set", short = 's')]
        set: Vec<String>,
        /// Image uploaded and attached as the story cover
        #[clap(long)]
        cover: Option<PathBuf>,
    },
    /// Delete an entity
    Delete {
        #[clap(arg_enum)]
        resource: ResourceKind,
        id: String,
    },
    /// Upload a file to the media store
    Upload {
        file: PathBuf,
        #[clap(long, default_value = storyadmin_client::media::STORY_COVER)]
        entity_type: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), storyadmin_common::Report> {
    storyadmin_common::install()?;

    let matches = Cli::command().args(&Conf::clap_args()).get_matches();
    let cli = Cli::from_arg_matches(&matches)?;
    let conf = Conf::with_layers(&[
        Layer::Json("storyadmin.json".into()),
        Layer::Toml("storyadmin.toml".into()),
        Layer::Env(Some("STORYADMIN_".to_string())),
        Layer::Clap(matches),
    ])?;

    let (flat, tree) = if cli.verbose.tree() {
        (None, Some(HierarchicalLayer::new(2).with_targets(true)))
    } else {
        (Some(tracing_subscriber::fmt::Layer::default()), None)
    };

    let subscriber = Registry::default()
        .with(ErrorLayer::default())
        .with(flat)
        .with(tree)
        .with(EnvFilter::from_default_env().add_directive(cli.verbose.log_level_filter().into()));

    tracing::subscriber::set_global_default(subscriber)?;

    let app = commands::App::new(&conf)?;

    match cli.command {
        Commands::Login => app.login(&conf).await?,
        Commands::Logout => app.logout()?,
        Commands::List { resource, page, search } => {
            commands::dispatch!(resource, app.list(page, search.as_deref()))?
        }
        Commands::Show { resource, id } => commands::dispatch!(resource, app.show(&id))?,
        Commands::Create { resource, set } => commands::dispatch!(resource, app.create(&set))?,
        Commands::Edit { resource, id, set, cover } => {
            commands::dispatch!(resource, app.edit(&id, &set, cover.as_deref()))?
        }
        Commands::Delete { resource, id } => commands::dispatch!(resource, app.delete(&id))?,
        Commands::Upload { file, entity_type } => app.upload(&file, &entity_type).await?,
    }

    Ok(())
}
