// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: workspace root
fn root_arg() -> Arg {
    Arg::new("root")
        .short('r')
        .long("root")
        .value_name("DIR")
        .default_value(".")
        .global(true)
        .help("Workspace root directory")
}

/// Common argument: configuration file
fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .global(true)
        .help("Configuration file (default: <root>/acp.toml)")
}

fn build_cli() -> Command {
    Command::new("acp")
        .version(env!("CARGO_PKG_VERSION"))
        .author("ACP Contributors")
        .about("Workspace setup and mod packaging for ancient game clients")
        .subcommand_required(true)
        .arg(root_arg())
        .arg(config_arg())
        .subcommand(Command::new("setup").about("Download and unpack everything the workspace needs"))
        .subcommand(
            Command::new("hashes")
                .about("Write the class hash table of a build")
                .arg(
                    Arg::new("build")
                        .required(true)
                        .value_parser(["original", "modded"])
                        .help("Which build to hash"),
                ),
        )
        .subcommand(Command::new("changes").about("Print the classes that differ from the original game"))
        .subcommand(
            Command::new("archives")
                .about("Package the changed classes as <name>.zip and <name>.tar.gz")
                .arg(Arg::new("name").required(true).help("Archive name")),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("acp.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
