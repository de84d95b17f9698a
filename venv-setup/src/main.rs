//! Install hook that prepares `virtualenv` for a Python-backed package.
//!
//! Finds a usable python/pip pair, installs the virtual-environment tool with
//! it, and saves the chosen names to `.python_venv_config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use venv_setup::core::install::DEFAULT_PACKAGE;
use venv_setup::exit_codes;
use venv_setup::io::process::SystemRunner;
use venv_setup::io::saved_config::SaveOptions;
use venv_setup::logging;
use venv_setup::setup::{
    Overrides, SetupOptions, default_root, exit_code_for, rooted, run_resolve, run_setup,
    show_saved,
};

#[derive(Parser)]
#[command(
    name = "venv-setup",
    version,
    about = "Find python/pip and install virtualenv for a package"
)]
struct Cli {
    /// Project root holding `package.json` (defaults to the current directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Read settings from this file instead of `<root>/package.json`.
    #[arg(long, global = true)]
    package_json: Option<PathBuf>,

    /// Seconds to wait for each `--version` probe.
    #[arg(
        long,
        global = true,
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    probe_timeout_secs: u64,

    /// Seconds to wait for the install.
    #[arg(
        long,
        global = true,
        default_value_t = 600,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    install_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve python/pip, install the tool, and save the choice.
    Install {
        #[command(flatten)]
        prefs: PreferenceArgs,

        /// Pin the installed tool to this version.
        #[arg(long)]
        venv_version: Option<String>,

        /// Package to install.
        #[arg(long, default_value = DEFAULT_PACKAGE)]
        package: String,

        /// Write the saved config without world-writable permissions.
        #[arg(long)]
        private_config: bool,
    },
    /// Print the python/pip pair that would be used. Installs nothing.
    Resolve {
        #[command(flatten)]
        prefs: PreferenceArgs,
    },
    /// Print the saved configuration.
    Show,
}

#[derive(Args)]
struct PreferenceArgs {
    /// Custom python executable, tried before python3 and python.
    #[arg(long)]
    python: Option<String>,

    /// Custom pip executable paired with `--python` (defaults to pip).
    #[arg(long)]
    pip: Option<String>,

    /// Allow falling back to python3/pip3 and python/pip.
    #[arg(long, conflicts_with = "no_fallback")]
    fallback: bool,

    /// Only try the first preference level.
    #[arg(long)]
    no_fallback: bool,
}

impl PreferenceArgs {
    fn overrides(&self) -> Overrides {
        let fallback = match (self.fallback, self.no_fallback) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            python: self.python.clone(),
            pip: self.pip.clone(),
            venv_version: None,
            fallback,
        }
    }
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut options = base_options(&cli)?;
    match cli.command {
        Command::Install {
            prefs,
            venv_version,
            package,
            private_config,
        } => {
            options.overrides = Overrides {
                venv_version,
                ..prefs.overrides()
            };
            options.package = package;
            options.save = SaveOptions {
                private: private_config,
            };
            cmd_install(&options)
        }
        Command::Resolve { prefs } => {
            options.overrides = prefs.overrides();
            cmd_resolve(&options)
        }
        Command::Show => cmd_show(&options),
    }
}

fn base_options(cli: &Cli) -> Result<SetupOptions> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => default_root()?,
    };
    let mut options = SetupOptions::new(&root);
    if let Some(package_json) = &cli.package_json {
        options.paths.package_json = rooted(&root, package_json);
    }
    options.probe_timeout = Duration::from_secs(cli.probe_timeout_secs);
    options.install_timeout = Duration::from_secs(cli.install_timeout_secs);
    Ok(options)
}

fn cmd_install(options: &SetupOptions) -> Result<()> {
    let report = run_setup(options, &SystemRunner::default())?;
    println!(
        "Success! Using {} for python and {} for pip.",
        report.choice.python_exec, report.choice.pip_exec
    );
    println!(
        "Installed {}; configuration saved to {}",
        report.package_spec,
        report.saved_path.display()
    );
    Ok(())
}

fn cmd_resolve(options: &SetupOptions) -> Result<()> {
    let choice = run_resolve(options, &SystemRunner::default())?;
    println!("python={} pip={}", choice.python_exec, choice.pip_exec);
    Ok(())
}

fn cmd_show(options: &SetupOptions) -> Result<()> {
    let saved = show_saved(&options.paths)?;
    println!("{}", serde_json::to_string_pretty(&saved)?);
    Ok(())
}
