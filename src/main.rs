use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;
use zk::cli::{Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Tags(args) => zk::cli::commands::tags::run(args, &global),
        Commands::Tag(args) => zk::cli::commands::files::run_tag(args, &global),
        Commands::Tagless(args) => zk::cli::commands::files::run_tagless(args, &global),
        Commands::Isolated(args) => zk::cli::commands::files::run_isolated(args, &global),
        Commands::Check(args) => zk::cli::commands::check::run(args, &global),
        Commands::FixLinks(args) => zk::cli::commands::fix_links::run(args, &global),
        Commands::New(args) => zk::cli::commands::new::run(args, &global),
        Commands::Completions(args) => zk::cli::commands::completions::run(args),
    }
}

/// Diagnostics to stderr; `RUST_LOG` overrides the flag-derived level
fn init_tracing(global: &GlobalOpts) {
    let default = if global.verbose {
        "zk=debug"
    } else if global.quiet {
        "zk=error"
    } else {
        "zk=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}
