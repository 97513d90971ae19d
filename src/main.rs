#![cfg_attr(feature = "strict", deny(warnings))]

use std::path::{Path, PathBuf};

use clap::Parser;
use log::{error, info, warn};
use pullvers::{
    feature::{github::{self, GitHubError, GitHubLabelFetcher}, tags},
    libs::data::{DataError, PullversData},
    Config, LabelTable, SemanticVersion, Severity,
};

const DEFAULT_CONFIG: &str = ".pullvers.json";
const DEFAULT_TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
struct Args
{
    /// Pull request numbers included in the release.
    #[arg(required = true)]
    pull_requests: Vec<u64>,

    /// JSON configuration file [default: .pullvers.json]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Version of the previous release; without it only the version change is printed.
    #[arg(short, long, conflicts_with = "latest_tag")]
    previous_version: Option<String>,

    /// Take the previous version from the repository's highest version tag.
    #[arg(long, action)]
    latest_tag: bool,

    #[arg(short, long, default_value = ".")]
    repository: String,

    #[arg(long)]
    owner: Option<String>,

    #[arg(long)]
    repo: Option<String>,

    /// Fail when a pull request has none of the configured labels.
    #[arg(long, action)]
    require_labels: bool,

    #[arg(long, action)]
    json: bool,
}

#[derive(Debug, thiserror::Error)]
enum AppError
{
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Version(#[from] pullvers::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("no GitHub repository configured; pass --owner and --repo or set GITHUB_REPOSITORY")]
    MissingRepository,
}

#[derive(serde::Serialize, Debug)]
struct Report
{
    severity: Severity,
    previous_version: Option<String>,
    next_version: Option<String>,
}

fn load_data(path: Option<&Path>) -> Result<PullversData, AppError>
{
    let default_path = Path::new(DEFAULT_CONFIG);
    match path
    {
        Some(path) => Ok(PullversData::load(path)?),
        None if default_path.exists() => Ok(PullversData::load(default_path)?),
        None =>
        {
            info!("No {} found, using the default labels", DEFAULT_CONFIG);
            Ok(PullversData::default())
        }
    }
}

/// Owner and name of the GitHub repository: flags first, then the configuration file, then `GITHUB_REPOSITORY`.
fn github_repository(args: &Args, data: &PullversData, environment: Option<String>) -> Result<(String, String), AppError>
{
    let owner = args.owner.clone().or_else(|| data.github.owner.clone());
    let repo = args.repo.clone().or_else(|| data.github.repo.clone());
    if let (Some(owner), Some(repo)) = (owner, repo)
    {
        return Ok((owner, repo));
    }

    match environment
    {
        Some(repository) => Ok(github::split_repository(&repository)?),
        None => Err(AppError::MissingRepository),
    }
}

fn previous_version(args: &Args) -> Result<Option<String>, AppError>
{
    if let Some(previous_version) = &args.previous_version
    {
        return Ok(Some(previous_version.clone()));
    }
    if !args.latest_tag
    {
        return Ok(None);
    }

    let repository = git2::Repository::open(&args.repository)?;
    match tags::latest_version(&repository)?
    {
        Some(version) => Ok(Some(version.to_string())),
        None =>
        {
            let version = SemanticVersion::new();
            warn!("No version tags found, starting from {}", version);
            Ok(Some(version.to_string()))
        }
    }
}

fn run(args: Args) -> Result<String, AppError>
{
    let data = load_data(args.config.as_deref())?;

    let (owner, repo) = github_repository(&args, &data, std::env::var("GITHUB_REPOSITORY").ok())?;
    let token_env = data.github.token_env.as_deref().unwrap_or(DEFAULT_TOKEN_ENV);
    let token = std::env::var(token_env).ok();
    if token.is_none()
    {
        warn!("{} is not set, GitHub requests are unauthenticated", token_env);
    }
    info!("Repository: {}/{}", owner, repo);
    let fetcher = GitHubLabelFetcher::new(owner, repo, token, data.github.base_uri.as_deref())?;

    let config = Config::new(fetcher)
        .with_labels(LabelTable::or_default(data.labels))
        .require_labels(args.require_labels || data.require_labels);

    let previous_version = previous_version(&args)?;
    if args.json
    {
        let severity = config.compute_severity(&args.pull_requests)?;
        let next_version = previous_version.as_deref().map(|previous| pullvers::bump(previous, severity)).transpose()?;
        let report = Report { severity, previous_version, next_version };
        return Ok(serde_json::to_string_pretty(&report)?);
    }

    match previous_version
    {
        Some(previous_version) => Ok(config.next_version(&previous_version, &args.pull_requests)?),
        None => Ok(config.compute_severity(&args.pull_requests)?.to_string()),
    }
}

fn main()
{
    // Initialize the logger, while in debug mode, log everything; otherwise, log only errors, warnings and info.
    let mut logger = env_logger::Builder::new();
    if cfg!(debug_assertions)
    {
        logger.filter_level(log::LevelFilter::max());
    }
    else
    {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.parse_default_env().init();

    // Parse the command line arguments
    let args = Args::parse();

    match run(args)
    {
        Ok(output) => println!("{}", output),
        Err(err) =>
        {
            error!("{}", err);
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source
            {
                error!("  caused by: {}", cause);
                source = cause.source();
            }
            std::process::exit(1);
        }
    }
}

#[test]
fn test_args()
{
    use clap::CommandFactory;

    Args::command().debug_assert();

    let args = Args::try_parse_from(["pullvers", "--previous-version", "v1.2.3", "--require-labels", "3", "1", "2"]).unwrap();
    assert_eq!(args.pull_requests, vec![3, 1, 2]);
    assert_eq!(args.previous_version.as_deref(), Some("v1.2.3"));
    assert!(args.require_labels);
    assert_eq!(args.repository, ".");

    assert!(Args::try_parse_from(["pullvers"]).is_err());
    assert!(Args::try_parse_from(["pullvers", "twelve"]).is_err());
    assert!(Args::try_parse_from(["pullvers", "--latest-tag", "--previous-version", "v1", "1"]).is_err());
}

#[test]
fn test_github_repository()
{
    let data = PullversData::default();
    let args = Args { owner: Some("foo".to_string()), repo: Some("bar".to_string()), ..Default::default() };
    assert_eq!(github_repository(&args, &data, Some("ignored/repo".to_string())).unwrap(), ("foo".to_string(), "bar".to_string()));

    let mut data = PullversData::default();
    data.github.owner = Some("baz".to_string());
    data.github.repo = Some("qux".to_string());
    let args = Args { repo: Some("bar".to_string()), ..Default::default() };
    assert_eq!(github_repository(&args, &data, None).unwrap(), ("baz".to_string(), "bar".to_string()));

    let args = Args::default();
    assert_eq!(github_repository(&args, &PullversData::default(), Some("foo/bar".to_string())).unwrap(), ("foo".to_string(), "bar".to_string()));
    assert!(matches!(github_repository(&args, &PullversData::default(), None), Err(AppError::MissingRepository)));
    assert!(matches!(github_repository(&args, &PullversData::default(), Some("foo".to_string())), Err(AppError::GitHub(_))));
}

#[test]
fn test_previous_version()
{
    let args = Args { previous_version: Some("v1.2.3".to_string()), ..Default::default() };
    assert_eq!(previous_version(&args).unwrap().as_deref(), Some("v1.2.3"));

    let args = Args::default();
    assert_eq!(previous_version(&args).unwrap(), None);

    let directory = tempfile::tempdir().unwrap();
    git2::Repository::init(directory.path()).unwrap();
    let args = Args { latest_tag: true, repository: directory.path().display().to_string(), ..Default::default() };
    assert_eq!(previous_version(&args).unwrap().as_deref(), Some("0.0.0"));
}

#[test]
fn test_load_data_explicit_missing_file()
{
    let directory = tempfile::tempdir().unwrap();
    let result = load_data(Some(directory.path().join("missing.json").as_path()));
    assert!(matches!(result, Err(AppError::Data(DataError::Read { .. }))));
}
