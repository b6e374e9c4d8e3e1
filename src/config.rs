// Copyright (c) Chris Gunn.
// Licensed under the MIT license.


use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Error};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "showksec")]
#[command(
    about = "Base64-decodes secrets in Kubernetes secrets.",
    long_about = "\
Base64-decodes secrets in Kubernetes secrets.

Will read from STDIN by default, but can also read from a given file."
)]
pub struct Args {
    /// File to read instead of STDIN
    pub file: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub input: Input,
}

impl From<Args> for Config {
    fn from(args: Args) -> Config {
        let input = match args.file {
            Some(path) => Input::File(path),
            None => Input::Stdin,
        };
        Config { input }
    }
}

impl Input {
    pub fn read_to_string(&self) -> Result<String, Error> {
        match self {
            Input::Stdin => {
                let mut input = String::new();
                io::stdin().read_to_string(&mut input).context("error reading stdin")?;
                Ok(input)
            }
            Input::File(path) => {
                fs::read_to_string(path).with_context(|| format!("error opening file: {}", path.display()))
            }
        }
    }
}
