//! Trellis CLI
//!
//! Renders navigation menus from a YAML site fixture.
//!
//! Usage:
//!   trellis render --site site.yaml --path /about/ --extra-inactive 100
//!   trellis breadcrumb --site site.yaml --path /about/team/
//!   trellis menus --site site.yaml

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trellis_kernel::menu::{
    MenuRequest, NavTree, NodeRef, ShowMenu, Visitor, show_breadcrumb, show_menu,
};
use trellis_kernel::{Config, Site};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the navigation menu.
    Render(RenderArgs),
    /// Render the breadcrumb trail of a path.
    Breadcrumb(BreadcrumbArgs),
    /// List registered menu providers.
    Menus(SiteArgs),
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Site fixture (defaults to TRELLIS_SITE_FILE).
    #[arg(long)]
    site: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RequestArgs {
    /// Request path used to select the current node.
    #[arg(long, default_value = "/")]
    path: String,

    /// Render for an authenticated visitor.
    #[arg(long)]
    authenticated: bool,

    /// Language of the request (defaults to TRELLIS_DEFAULT_LANGUAGE).
    #[arg(long)]
    language: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    request: RequestArgs,

    /// Level whose nodes become the menu roots.
    #[arg(long, default_value = "0")]
    from: usize,

    /// Deepest level rendered (defaults to TRELLIS_TO_LEVEL).
    #[arg(long)]
    to: Option<usize>,

    /// Levels kept below nodes off the selected path.
    #[arg(long, default_value = "0")]
    extra_inactive: usize,

    /// Levels kept below the selected node.
    #[arg(long, default_value = "100")]
    extra_active: usize,

    /// Render below the page with this reverse id.
    #[arg(long)]
    root_id: Option<String>,

    /// Restrict the menu to one provider.
    #[arg(long)]
    namespace: Option<String>,
}

#[derive(Args, Debug)]
struct BreadcrumbArgs {
    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    request: RequestArgs,

    /// Number of leading entries to skip.
    #[arg(long, default_value = "0")]
    start_level: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Render(args) => {
            let site = load_site(&args.site, &config)?;
            let pool = site.menu_pool().context("failed to build menu pool")?;
            let request = build_request(&site, &args.request, &config);

            let mut options = ShowMenu::new(
                args.from,
                args.to.unwrap_or(config.to_level),
                args.extra_inactive,
                args.extra_active,
            );
            options.root_id = args.root_id;
            options.namespace = args.namespace;

            let menu = show_menu(&pool, &request, &options);
            info!(roots = menu.len(), nodes = menu.total_nodes(), "rendered menu");
            print_tree(&menu, args.request.format)
        }
        Command::Breadcrumb(args) => {
            let site = load_site(&args.site, &config)?;
            let pool = site.menu_pool().context("failed to build menu pool")?;
            let request = build_request(&site, &args.request, &config);

            let trail = show_breadcrumb(&pool, &request, args.start_level);
            match args.request.format {
                Format::Json => print_tree(&trail, Format::Json),
                Format::Text => {
                    let titles: Vec<String> =
                        trail.nodes().iter().map(|n| n.title.clone()).collect();
                    println!("{}", titles.join(" > "));
                    Ok(())
                }
            }
        }
        Command::Menus(args) => {
            let site = load_site(&args, &config)?;
            let pool = site.menu_pool().context("failed to build menu pool")?;
            for name in pool.menu_names() {
                let attachable = pool.menu(name).is_some_and(|m| m.attachable());
                println!("{name}{}", if attachable { " (attachable)" } else { "" });
            }
            Ok(())
        }
    }
}

fn load_site(args: &SiteArgs, config: &Config) -> Result<Site> {
    let path = args
        .site
        .clone()
        .or_else(|| config.site_file.clone())
        .context("no site fixture given (use --site or TRELLIS_SITE_FILE)")?;
    let site = Site::load(&path, config)?;
    info!(
        path = %path.display(),
        pages = site.pages.len(),
        menus = site.menus.len(),
        "site loaded"
    );
    Ok(site)
}

fn build_request<'a>(site: &'a Site, args: &RequestArgs, config: &Config) -> MenuRequest<'a> {
    let visitor = if args.authenticated {
        Visitor::Authenticated
    } else {
        Visitor::Anonymous
    };
    MenuRequest::new(&site.pages, args.path.clone())
        .with_visitor(visitor)
        .with_language(
            args.language
                .clone()
                .unwrap_or_else(|| config.default_language.clone()),
        )
}

fn print_tree(tree: &NavTree, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(&tree.to_items())
                .context("failed to serialize menu")?;
            println!("{json}");
        }
        Format::Text => {
            for node in tree.nodes() {
                print_node(&node, 0);
            }
        }
    }
    Ok(())
}

fn print_node(node: &NodeRef<'_>, depth: usize) {
    let marker = if node.selected { "*" } else { "-" };
    println!(
        "{:indent$}{marker} {} ({})",
        "",
        node.title,
        node.link(),
        indent = depth * 2
    );
    for child in node.children() {
        print_node(&child, depth + 1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
