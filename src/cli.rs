use crate::config::{DetailLevel, CONFIG_FILE_NAME};
use crate::report::{self, RunOptions};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weekly-commits")]
#[command(about = "Write this week's commits per repository and branch to dated report files")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Clone)]
pub struct RunArgs {
    #[arg(long, help = "Path to the repository list", default_value = CONFIG_FILE_NAME)]
    pub config: PathBuf,

    #[arg(long, help = "Directory that receives dated report folders", default_value = "reports")]
    pub output_dir: PathBuf,

    #[arg(long, help = "Report on the week containing this date (YYYY-MM-DD) instead of today")]
    pub date: Option<NaiveDate>,

    #[arg(long, help = "Author email to report on instead of git's user.email")]
    pub author: Option<String>,

    #[arg(long, value_enum, help = "Override the configured detail level")]
    pub detail: Option<DetailArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DetailArg {
    Title,
    Full,
}

impl From<DetailArg> for DetailLevel {
    fn from(arg: DetailArg) -> Self {
        match arg {
            DetailArg::Title => DetailLevel::Title,
            DetailArg::Full => DetailLevel::Full,
        }
    }
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            config_path: args.config,
            output_dir: args.output_dir,
            date: args.date,
            author: args.author,
            detail: args.detail.map(Into::into),
        }
    }
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        report::exec(self.run.into())?;
        Ok(())
    }
}
