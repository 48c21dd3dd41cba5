//! 命令行参数
//!
//! ```text
//! resume_flow cv <file.pdf>
//! resume_flow cover <file.pdf> [company=..] [location=..] [job_title=..] [job_description=..]
//! resume_flow linkedin <file.pdf>
//! resume_flow dashboard <username> <password>
//! ```

use std::path::PathBuf;

use crate::error::{AppResult, ConfigError};
use crate::models::CoverLetterDetails;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Cv {
        file: PathBuf,
    },
    Cover {
        file: PathBuf,
        details: CoverLetterDetails,
    },
    LinkedIn {
        file: PathBuf,
    },
    Dashboard {
        username: String,
        password: String,
    },
}

impl Command {
    pub fn parse<I>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let name = args
            .next()
            .ok_or(ConfigError::MissingArgument {
                command: "resume_flow",
                argument: "<cv|cover|linkedin|dashboard>",
            })?;

        match name.as_str() {
            "cv" => Ok(Command::Cv {
                file: required(&mut args, "cv", "<file>")?.into(),
            }),
            "cover" => {
                let file = required(&mut args, "cover", "<file>")?.into();
                let details = parse_details(args)?;
                Ok(Command::Cover { file, details })
            }
            "linkedin" => Ok(Command::LinkedIn {
                file: required(&mut args, "linkedin", "<file>")?.into(),
            }),
            "dashboard" => Ok(Command::Dashboard {
                username: required(&mut args, "dashboard", "<username>")?,
                password: required(&mut args, "dashboard", "<password>")?,
            }),
            _ => Err(ConfigError::UnknownCommand(name).into()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Command::Cv { .. } => "简历优化",
            Command::Cover { .. } => "求职信生成",
            Command::LinkedIn { .. } => "LinkedIn 优化",
            Command::Dashboard { .. } => "后台仪表盘",
        }
    }
}

fn required(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
    argument: &'static str,
) -> AppResult<String> {
    args.next()
        .ok_or_else(|| ConfigError::MissingArgument { command, argument }.into())
}

fn parse_details(args: impl Iterator<Item = String>) -> AppResult<CoverLetterDetails> {
    let mut details = CoverLetterDetails::default();
    for arg in args {
        let (key, value) = arg.split_once('=').unwrap_or((arg.as_str(), ""));
        let slot = match key {
            "company" => &mut details.company,
            "location" => &mut details.location,
            "job_title" => &mut details.job_title,
            "job_description" => &mut details.job_description,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                    expected: "company | location | job_title | job_description",
                }
                .into())
            }
        };
        *slot = value.to_string();
    }
    Ok(details)
}
