use anyhow::Result;
use apkforge::commands::{
    align_command, build_command, decode_command, sign_command, tools_command,
};
use apkforge::init_logger;
use clap::{ArgAction, Parser, Subcommand};

/// Decode, rebuild, zipalign and debug-sign Android packages.
///
/// This CLI is a thin wrapper around `apkforge-core`; apktool, zipalign and
/// uber-apk-signer are downloaded into the tool cache on first use.
#[derive(Parser, Debug)]
#[command(
    name = "apkforge",
    version,
    about = "APK decode/build/sign/align workbench",
    long_about = None
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode an APK into resources and smali.
    Decode {
        /// Path to the .apk file.
        apk: String,

        /// Output directory. Defaults to the APK name without extension.
        #[arg(short, long)]
        output: Option<String>,

        /// Fail instead of overwriting an existing output directory.
        #[arg(long, default_value_t = false)]
        no_force: bool,
    },

    /// Rebuild a decoded directory into a signed, aligned APK.
    ///
    /// Runs apktool build, zipalign and uber-apk-signer in that order, removes
    /// the intermediate aligned APK, and renames the signed result to the
    /// requested name.
    Build {
        /// Decoded project directory.
        source: String,

        /// Output APK name. Defaults to `<dirname>_mod.apk`.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Debug-sign an APK. The signed file is written next to the input.
    Sign {
        /// Path to the .apk file.
        apk: String,
    },

    /// Zipalign an APK.
    Align {
        /// Path to the .apk file.
        apk: String,

        /// Output path. Defaults to `<stem>_aligned.apk` next to the input.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show the tool cache.
    Tools {
        /// Download any missing tool first.
        #[arg(long, default_value_t = false)]
        fetch: bool,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Decode { apk, output, no_force } => {
            decode_command(&apk, output, !no_force)?;
        }
        Command::Build { source, output } => {
            build_command(&source, output)?;
        }
        Command::Sign { apk } => {
            sign_command(&apk)?;
        }
        Command::Align { apk, output } => {
            align_command(&apk, output)?;
        }
        Command::Tools { fetch, json } => {
            tools_command(fetch, json)?;
        }
    }

    Ok(())
}
