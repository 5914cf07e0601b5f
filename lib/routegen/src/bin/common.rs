use std::fmt::Display;
use std::str::FromStr;
use std::path::PathBuf;
use std::io;
use anyhow::{Context, Result};
use structopt::StructOpt;

#[derive(Clone, Debug, StructOpt)]
pub struct OutputOptions {
  /// Report format
  #[structopt(long="format", short="f", parse(try_from_str), default_value="json-summ", possible_values=&OUTPUT_FORMAT_STRINGS)]
  pub fmt: OutputFormat,
  /// Write the report here instead of stdout
  #[structopt(long="output", short="o")]
  pub file: Option<PathBuf>,
  /// Also write JSON log lines to this file
  #[structopt(long)]
  pub log: Option<PathBuf>,
}

/// Validator for numeric arguments within the inclusive bounds given.
pub fn clap_range_validator<T>(minval: Option<T>, maxval: Option<T>) -> impl Fn(String) -> Result<(), String>
    where
        T: FromStr + PartialOrd + Display + Copy,
        T::Err: Display
{
    return move |val| {
        let x: T = val.parse().map_err(|e: T::Err| e.to_string())?;
        match (minval, maxval) {
            (Some(lo), _) if x < lo => Err(format!("must be at least {}", lo)),
            (_, Some(hi)) if x > hi => Err(format!("must be at most {}", hi)),
            _ => Ok(()),
        }
    };
}

pub const OUTPUT_FORMAT_STRINGS: [&str; 2] = ["json", "json-summ"];

#[derive(Debug, Copy, Clone)]
pub enum OutputFormat {
    /// Everything, including routes and legs.
    Json,
    /// Scalars only.
    JsonSummary,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return match s {
            "json" => Ok(Self::Json),
            "json-summ" => Ok(Self::JsonSummary),
            _ => Err(format!("invalid string: {}", s))
        };
    }
}

impl Default for OutputFormat {
  fn default() -> Self { OutputFormat::JsonSummary }
}


pub trait Report {
    fn to_json(&self) -> json::JsonValue;
    fn to_json_summary(&self) -> json::JsonValue;

    fn write(&self, mut buf: impl io::Write, output: OutputFormat) -> Result<()> {
        let root = match output {
            OutputFormat::JsonSummary => self.to_json_summary(),
            OutputFormat::Json => self.to_json(),
        };
        root.write_pretty(&mut buf, 2)?;
        writeln!(buf)?;
        Ok(())
    }
}

pub fn output_report(options: &OutputOptions, report: impl Report) -> Result<()> {
  match options.file.as_ref() {
    Some(path) => {
      let file = std::fs::File::create(path).with_context(|| format!("cannot create {:?}", path))?;
      report.write(io::BufWriter::new(file), options.fmt)?;
    }
    None => {
      report.write(io::stdout(), options.fmt)?;
    }
  }
  Ok(())
}
