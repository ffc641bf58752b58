use std::path::PathBuf;

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand};
use error_stack::{IntoReport, Report, ResultExt};
use url::Url;

use crate::{
    app::ReportKind,
    config::{
        Config, ConfigError, ConfigFile, ElasticsearchConfig, ElasticsearchCredential,
        ReportConfig,
    },
};

#[derive(Parser, Debug)]
#[command(
    name = "ilm-report",
    version,
    about = "Report how index lifecycle policies are used across an Elasticsearch cluster"
)]
pub struct Args {
    #[clap(flatten)]
    pub connection: ConnectionArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Log more, repeat for trace output.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// YAML config file, flags take precedence over its values.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Elasticsearch URL, e.g. https://localhost:9200
    #[arg(long, global = true, env = "ES_HOST")]
    pub host: Option<Url>,

    /// Elasticsearch username.
    #[arg(short, long, global = true, env = "ES_USERNAME")]
    pub username: Option<String>,

    /// Elasticsearch password.
    #[arg(short, long, global = true, env = "ES_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Elastic Cloud id, used instead of the host when given.
    #[arg(long, global = true)]
    pub cloud_id: Option<String>,

    /// Verify TLS certificates.
    #[arg(long, global = true)]
    pub verify_certs: bool,

    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OutputArgs {
    /// JSON output file, defaults to <command>_<date>.json
    #[arg(long, global = true)]
    pub json_output: Option<PathBuf>,

    /// CSV output file.
    #[arg(long, global = true)]
    pub csv_output: Option<PathBuf>,

    /// Also write CSV, to the default file name unless --csv-output is given.
    #[arg(long, global = true)]
    pub csv: bool,

    /// Include document counts.
    #[arg(long, global = true)]
    pub doc_counts: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Group indices below a size threshold by lifecycle policy.
    Policies {
        /// Size threshold such as 1gb or 500mb.
        #[arg(short, long)]
        threshold: Option<String>,
    },
    /// List every lifecycle managed index.
    Indices {
        /// Only list indices below this size.
        #[arg(short, long)]
        threshold: Option<String>,
    },
}

impl Args {
    /// Merge flags over the config file.
    pub fn into_config(self) -> error_stack::Result<(Config, ReportKind), ConfigError> {
        let file = match self.connection.config.as_ref() {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        self.merge(file)
    }

    pub fn merge(self, file: ConfigFile) -> error_stack::Result<(Config, ReportKind), ConfigError> {
        let Args {
            connection,
            output,
            command,
            ..
        } = self;
        let es_file = file.elasticsearch.unwrap_or_default();
        let report_file = file.report.unwrap_or_default();

        let (kind, threshold) = match command {
            Command::Policies { threshold } => (ReportKind::Policies, threshold),
            Command::Indices { threshold } => (ReportKind::Indices, threshold),
        };
        let threshold = threshold.or(report_file.threshold);
        if kind == ReportKind::Policies && threshold.is_none() {
            return Err(Report::new(ConfigError::Missing))
                .attach_printable("size threshold is required, pass --threshold");
        }

        let credential = merge_credential(&connection, es_file.credential)?;
        let endpoint = match connection.host.or(es_file.endpoint) {
            Some(endpoint) => endpoint,
            None if credential.as_ref().and_then(|c| c.cloud_id.as_ref()).is_some() => {
                // Only used for logging when connecting through a cloud id.
                Url::parse("https://cloud.elastic.co")
                    .into_report()
                    .change_context(ConfigError::Invalid)?
            }
            None => {
                return Err(Report::new(ConfigError::Missing))
                    .attach_printable("elasticsearch endpoint is required, pass --host")
            }
        };

        let elasticsearch = ElasticsearchConfig {
            endpoint,
            credential,
            insecure: if connection.verify_certs {
                false
            } else {
                es_file.insecure.unwrap_or(true)
            },
            timeout_secs: connection
                .timeout
                .or(es_file.timeout_secs)
                .unwrap_or(20),
        };

        let report = ReportConfig {
            threshold,
            json_output: output.json_output.or(report_file.json_output),
            csv_output: output.csv_output.or(report_file.csv_output),
            csv: output.csv || report_file.csv,
            include_doc_counts: output.doc_counts || report_file.include_doc_counts,
        };

        Ok((Config { elasticsearch, report }, kind))
    }
}

fn merge_credential(
    connection: &ConnectionArgs,
    file: Option<ElasticsearchCredential>,
) -> error_stack::Result<Option<ElasticsearchCredential>, ConfigError> {
    let username = connection
        .username
        .clone()
        .or_else(|| file.as_ref().map(|c| c.username.clone()));
    let password = connection
        .password
        .clone()
        .or_else(|| file.as_ref().map(|c| c.password.clone()));
    let cloud_id = connection
        .cloud_id
        .clone()
        .or_else(|| file.and_then(|c| c.cloud_id));

    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(ElasticsearchCredential {
            username,
            password,
            cloud_id,
        })),
        (None, None) if cloud_id.is_none() => Ok(None),
        _ => Err(Report::new(ConfigError::Missing))
            .attach_printable("username and password must be given together"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Built by hand so ES_* variables in the environment do not leak in.
    fn args(command: Command, connection: ConnectionArgs) -> Args {
        Args {
            connection,
            output: OutputArgs::default(),
            verbose: 0,
            command,
        }
    }

    fn host(url: &str) -> ConnectionArgs {
        ConnectionArgs {
            host: Some(Url::parse(url).unwrap()),
            ..Default::default()
        }
    }

    fn policies(threshold: Option<&str>) -> Command {
        Command::Policies {
            threshold: threshold.map(str::to_owned),
        }
    }

    fn indices() -> Command {
        Command::Indices { threshold: None }
    }

    #[test]
    fn flags_only() {
        // Every env backed flag is given, so the environment can not change the result.
        let args = Args::try_parse_from([
            "ilm-report",
            "policies",
            "--threshold",
            "1gb",
            "--host",
            "https://localhost:9200",
            "-u",
            "elastic",
            "-p",
            "secret",
            "--csv",
        ])
        .unwrap();
        let (config, kind) = args.merge(ConfigFile::default()).unwrap();

        assert_eq!(kind, ReportKind::Policies);
        assert_eq!(config.report().threshold(), Some("1gb"));
        assert!(config.report().csv);
        assert_eq!(
            config.elasticsearch().credential.as_ref().unwrap().username,
            "elastic"
        );
        assert!(config.elasticsearch().insecure);
    }

    #[test]
    fn flags_override_file() {
        let file = ConfigFile::from_yaml(
            r#"
elasticsearch:
  endpoint: http://file:9200
  insecure: true
  credential:
    username: from-file
    password: file-secret
report:
  threshold: 10mb
  json_output: file.json
"#,
        )
        .unwrap();
        let connection = ConnectionArgs {
            verify_certs: true,
            ..host("http://flag:9200")
        };
        let (config, _) = args(policies(None), connection).merge(file).unwrap();

        assert_eq!(config.elasticsearch().endpoint.as_str(), "http://flag:9200/");
        assert!(!config.elasticsearch().insecure);
        assert_eq!(
            config.elasticsearch().credential.as_ref().unwrap().username,
            "from-file"
        );
        assert_eq!(config.report().threshold(), Some("10mb"));
        assert_eq!(config.report().json_output, Some(PathBuf::from("file.json")));
    }

    #[test]
    fn policies_requires_threshold() {
        let err = args(policies(None), host("http://localhost:9200"))
            .merge(ConfigFile::default())
            .unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::Missing));
    }

    #[test]
    fn indices_threshold_is_optional() {
        let mut args = args(indices(), host("http://localhost:9200"));
        args.output.doc_counts = true;
        let (config, kind) = args.merge(ConfigFile::default()).unwrap();

        assert_eq!(kind, ReportKind::Indices);
        assert!(config.report().threshold().is_none());
        assert!(config.report().include_doc_counts());
    }

    #[test]
    fn endpoint_is_required() {
        let err = args(indices(), ConnectionArgs::default())
            .merge(ConfigFile::default())
            .unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::Missing));
    }

    #[test]
    fn cloud_id_replaces_endpoint() {
        let connection = ConnectionArgs {
            username: Some("elastic".to_owned()),
            password: Some("secret".to_owned()),
            cloud_id: Some("deployment:abc".to_owned()),
            ..Default::default()
        };
        let (config, _) = args(indices(), connection)
            .merge(ConfigFile::default())
            .unwrap();

        let credential = config.elasticsearch().credential.as_ref().unwrap();
        assert_eq!(credential.cloud_id.as_deref(), Some("deployment:abc"));
    }

    #[test]
    fn username_without_password_is_rejected() {
        let connection = ConnectionArgs {
            username: Some("elastic".to_owned()),
            ..host("http://localhost:9200")
        };
        let err = args(indices(), connection)
            .merge(ConfigFile::default())
            .unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::Missing));
    }
}
