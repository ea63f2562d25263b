//! dynbind command-line tool
//!
//! Builds the catalog of the bundled sample model and lets you list it,
//! export it as JSON, and call into it through the dispatcher.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dynbind")]
#[command(about = "Inspect and call reflected native APIs", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Engine configuration file (dynbind.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Resolve base classes declared after the classes that use them
    #[arg(long, global = true)]
    forward_refs: bool,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List classes, or the members of one class
    List {
        /// Class to describe
        class: Option<String>,
        /// Only classes in this category (sub-categories included)
        #[arg(long)]
        category: Option<String>,
        /// Only classes declared by this module
        #[arg(long)]
        module: Option<String>,
        /// List channels instead of classes
        #[arg(long)]
        channels: bool,
    },

    /// Export the catalog as JSON
    Export {
        /// Output file; stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
        /// Leave out deprecated entries
        #[arg(long)]
        no_deprecated: bool,
        /// Leave out type ids
        #[arg(long)]
        no_type_ids: bool,
        /// Only these categories
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Drop these categories
        #[arg(long = "exclude-category")]
        exclude_categories: Vec<String>,
    },

    /// Call a static method (`Class.Method`) or a free function
    Call {
        /// `Class.Method` or free function name
        target: String,
        /// JSON argument array, e.g. '[{"kind":"Int32","value":2}]'
        #[arg(default_value = "[]")]
        args: String,
    },

    /// Read or write a free property
    Prop {
        /// Property name
        name: String,
        /// JSON value to write
        #[arg(long)]
        set: Option<String>,
    },

    /// Broadcast or send a channel event
    Emit {
        /// Channel name
        channel: String,
        /// Event name
        event: String,
        /// JSON argument array
        #[arg(default_value = "[]")]
        args: String,
        /// JSON address value; broadcasts if omitted
        #[arg(long)]
        address: Option<String>,
    },

    /// Show version, configuration and catalog statistics
    Info,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut out = output::StyledOutput::new(output::resolve_color_choice(cli.color.as_deref()));
    let session = commands::Session::open(cli.config.as_deref(), cli.forward_refs)?;

    let ok = match cli.command {
        Commands::List {
            class,
            category,
            module,
            channels,
        } => {
            let filter = commands::list::ListFilter {
                category,
                module,
                channels,
            };
            commands::list::execute(&session, class.as_deref(), &filter, &mut out)?;
            true
        }

        Commands::Export {
            output,
            compact,
            no_deprecated,
            no_type_ids,
            categories,
            exclude_categories,
        } => {
            let mut config = session.config.export.clone();
            config.pretty &= !compact;
            config.include_deprecated &= !no_deprecated;
            config.include_type_ids &= !no_type_ids;
            config.include_categories.extend(categories);
            config.exclude_categories.extend(exclude_categories);
            commands::export::execute(&session, config, output.as_deref(), &mut out)?;
            true
        }

        Commands::Call { target, args } => commands::call::call(&session, &target, &args, &mut out),

        Commands::Prop { name, set } => commands::call::property(&session, &name, set.as_deref(), &mut out),

        Commands::Emit {
            channel,
            event,
            args,
            address,
        } => commands::call::emit(&session, &channel, &event, address.as_deref(), &args, &mut out),

        Commands::Info => {
            commands::info::execute(&session, &mut out);
            true
        }
    };

    out.flush();
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
