use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wirebind_gen::cmds;
use wirebind_gen::config::GenConfig;
use wirebind_gen::naming::CaseForm;

#[derive(Parser)]
#[command(name = "wirebind-gen")]
#[command(about = "gRPC service layer generation for typed data-access declarations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /* Generate the wire schema and Go service layer */
    Codegen {
        /* Input YAML files containing declarations */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Include directories for imported declaration files */
        #[arg(short = 'i', long = "include-dir", value_name = "DIR")]
        include_dirs: Vec<PathBuf>,

        /* What to generate */
        #[arg(short = 't', long = "target", value_enum, default_value = "all")]
        target: Target,

        /* Output directory for generated code */
        #[arg(
            short = 'o',
            long = "output",
            value_name = "DIR",
            default_value = "generated"
        )]
        output_dir: PathBuf,

        /* YAML file with generation settings */
        #[arg(long = "config", value_name = "FILE")]
        config: Option<PathBuf>,

        /* Go module path of the generated code */
        #[arg(long = "module")]
        module: Option<String>,

        /* Protobuf package of the schema */
        #[arg(long = "proto-package")]
        proto_package: Option<String>,

        /* Name of the generated service */
        #[arg(long = "service-name")]
        service_name: Option<String>,

        /* Generate even if some declarations cannot be bound */
        #[arg(long = "allow-partial")]
        allow_partial: bool,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Show how declared types resolve, classify and bind */
    Analyze {
        /* Input YAML files containing declarations */
        #[arg(short = 'f', long = "files", value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /* Include directories for imported declaration files */
        #[arg(short = 'i', long = "include-dir", value_name = "DIR")]
        include_dirs: Vec<PathBuf>,

        /* Output format */
        #[arg(long = "format", value_enum, default_value = "text")]
        format: Format,

        /* Print the emitted binding statements for every field */
        #[arg(long = "print-bindings")]
        print_bindings: bool,

        /* Enable verbose output */
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /* Convert identifiers between case forms */
    Case {
        /* Case form to convert to; all forms when omitted */
        #[arg(long = "form")]
        form: Option<CaseForm>,

        /* Identifiers to convert */
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Target {
    /* Protobuf schema only */
    Proto,
    /* Go adapters and service only */
    Go,
    /* Everything */
    All,
}

impl From<Target> for cmds::codegen::Target {
    fn from(target: Target) -> Self {
        match target {
            Target::Proto => cmds::codegen::Target::Proto,
            Target::Go => cmds::codegen::Target::Go,
            Target::All => cmds::codegen::Target::All,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Format {
    Text,
    Json,
}

impl From<Format> for cmds::analyze::OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => cmds::analyze::OutputFormat::Text,
            Format::Json => cmds::analyze::OutputFormat::Json,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Codegen {
            files,
            include_dirs,
            target,
            output_dir,
            config,
            module,
            proto_package,
            service_name,
            allow_partial,
            verbose,
        } => {
            init_tracing(verbose);
            let overrides = GenConfig { module, proto_package, service_name, ..Default::default() };
            cmds::codegen::run(cmds::codegen::CodegenArgs {
                files,
                include_dirs,
                target: target.into(),
                output_dir,
                config,
                overrides,
                allow_partial,
                verbose,
            })?;
        }

        Commands::Analyze {
            files,
            include_dirs,
            format,
            print_bindings,
            verbose,
        } => {
            init_tracing(verbose);
            cmds::analyze::run(files, include_dirs, format.into(), print_bindings)?;
        }

        Commands::Case { form, names } => {
            init_tracing(false);
            cmds::case::run(form, names)?;
        }
    }

    Ok(())
}
