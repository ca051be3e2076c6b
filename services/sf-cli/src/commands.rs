//! Command-line commands and their execution

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use sf_client::{Case, CaseHeaders, EmailMessageParams, SalesforceClient};
use tracing::info;

pub const USAGE: &str = "\
usage: sf-api [--config PATH] <command>

commands:
  create-case <subject> [description]
  get-case <case-id>
  query <soql>
  attach <case-id> <file>
  email <case-id> <subject> <body>
  demo [file]";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    CreateCase {
        subject: String,
        description: Option<String>,
    },
    GetCase {
        case_id: String,
    },
    Query {
        soql: String,
    },
    Attach {
        case_id: String,
        file: PathBuf,
    },
    Email {
        case_id: String,
        subject: String,
        body: String,
    },
    /// Create a case, read it back, query it, optionally attach a file and
    /// record an email on it.
    Demo {
        file: Option<PathBuf>,
    },
}

impl Command {
    /// Parse the arguments that follow the program name. `--config PATH`
    /// may appear anywhere and is skipped here.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--config" {
                iter.next();
            } else {
                positional.push(arg.as_str());
            }
        }

        let Some((&name, rest)) = positional.split_first() else {
            bail!("missing command\n\n{USAGE}");
        };

        let command = match (name, rest) {
            ("create-case", [subject]) => Command::CreateCase {
                subject: subject.to_string(),
                description: None,
            },
            ("create-case", [subject, description]) => Command::CreateCase {
                subject: subject.to_string(),
                description: Some(description.to_string()),
            },
            ("get-case", [case_id]) => Command::GetCase {
                case_id: case_id.to_string(),
            },
            ("query", [soql]) => Command::Query {
                soql: soql.to_string(),
            },
            ("attach", [case_id, file]) => Command::Attach {
                case_id: case_id.to_string(),
                file: PathBuf::from(file),
            },
            ("email", [case_id, subject, body]) => Command::Email {
                case_id: case_id.to_string(),
                subject: subject.to_string(),
                body: body.to_string(),
            },
            ("demo", []) => Command::Demo { file: None },
            ("demo", [file]) => Command::Demo {
                file: Some(PathBuf::from(file)),
            },
            _ => bail!("invalid arguments for {name:?}\n\n{USAGE}"),
        };
        Ok(command)
    }
}

/// Execute a command and return its result as JSON for printing.
pub async fn run(client: &SalesforceClient, command: Command) -> Result<Value> {
    match command {
        Command::CreateCase {
            subject,
            description,
        } => {
            let case = Case {
                subject: Some(subject),
                description,
                status: Some("New".into()),
                origin: Some("Web".into()),
                ..Case::default()
            };
            let created = client.create_case(&case, None).await?;
            Ok(serde_json::to_value(created)?)
        }
        Command::GetCase { case_id } => Ok(serde_json::to_value(client.get_case(&case_id).await?)?),
        Command::Query { soql } => Ok(serde_json::to_value(client.query(&soql).await?)?),
        Command::Attach { case_id, file } => {
            let info = client.upload_attachment(&case_id, &file).await?;
            Ok(serde_json::to_value(info)?)
        }
        Command::Email {
            case_id,
            subject,
            body,
        } => {
            let created = client
                .email_message(EmailMessageParams {
                    parent_id: Some(case_id),
                    subject: Some(subject),
                    text_body: Some(body),
                    ..EmailMessageParams::default()
                })
                .await?;
            Ok(Value::Object(created))
        }
        Command::Demo { file } => demo(client, file).await,
    }
}

async fn demo(client: &SalesforceClient, file: Option<PathBuf>) -> Result<Value> {
    let case = Case {
        subject: Some("Test case from sf-api".into()),
        description: Some("Created by the sf-api demo workflow".into()),
        status: Some("New".into()),
        origin: Some("Web".into()),
        supplied_name: Some("Test User".into()),
        supplied_email: Some("test@example.com".into()),
        ..Case::default()
    };
    let headers = CaseHeaders {
        assignment_rule: String::new(),
        email: "triggerAutoResponseEmail=true".into(),
    };

    let created = client
        .create_case(&case, Some(&headers))
        .await
        .context("demo: create case")?;
    let Some(case_id) = created.id.clone() else {
        bail!("demo: create case returned no id");
    };
    info!(case_id = %case_id, "demo: case created");

    let fetched = client.get_case(&case_id).await.context("demo: get case")?;
    let page = client
        .query(&format!(
            "SELECT Id, Subject, Status FROM Case WHERE Id = '{case_id}'"
        ))
        .await
        .context("demo: query")?;

    let attachment = match file {
        Some(file) => Some(
            client
                .create_attachment(&file)
                .await
                .context("demo: attach file")?,
        ),
        None => None,
    };

    let email = client
        .email_message(EmailMessageParams {
            subject: Some(format!("Re: {}", fetched.subject.as_deref().unwrap_or("your case"))),
            text_body: Some("Your case has been received and is being processed.".into()),
            ..EmailMessageParams::default()
        })
        .await
        .context("demo: email message")?;

    Ok(json!({
        "case": fetched,
        "query": page,
        "attachment": attachment,
        "email": email,
    }))
}
