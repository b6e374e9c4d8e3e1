// Copyright (c) Chris Gunn.
// Licensed under the MIT license.

mod config;
mod logging;
mod node_path;
mod process_manifests;
mod rewrite;
mod shape;
mod yaml_tree;

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::{Context, Error};
use clap::Parser;
use tracing::error;

use crate::{
    config::{Args, Config},
    logging::init_logging,
    process_manifests::process_manifests_str,
};

fn main() -> ExitCode {
    init_logging();

    let config = Config::from(Args::parse());
    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), Error> {
    let input = config.input.read_to_string()?;
    let output = process_manifests_str(&input)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes()).context("error encoding to stdout")?;
    stdout.flush().context("error encoding to stdout")?;
    Ok(())
}
