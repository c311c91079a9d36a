use crate::cli::args::{Command, RunOverrides};
use crate::config::{Config, load_config};
use crate::error::LoopMirrorError;
use crate::run::RunParams;
use crate::selection::{Exclusivity, Selection};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Sync(RunParams),
    List(RunParams),
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, LoopMirrorError> {
    match command {
        Command::Sync {
            config_path,
            overrides,
        } => {
            let app_config = load_config(config_path.as_deref())?;
            let params = resolve_run_params(app_config, overrides)?;
            Ok(ResolvedCommand::Sync(params))
        }
        Command::List {
            config_path,
            overrides,
        } => {
            let app_config = load_config(config_path.as_deref())?;
            // Listing never transfers anything, so the dry-run decision is moot.
            let overrides = RunOverrides {
                dry_run: Some(true),
                ..overrides
            };
            let params = resolve_run_params(app_config, overrides)?;
            Ok(ResolvedCommand::List(params))
        }
    }
}

/// Merges command-line overrides into the loaded config and validates the
/// result.
pub fn resolve_run_params(
    app_config: Config,
    overrides: RunOverrides,
) -> Result<RunParams, LoopMirrorError> {
    let categories = if overrides.categories.is_empty() {
        app_config.categories
    } else {
        overrides.categories
    };
    let years = if overrides.years.is_empty() {
        app_config.years
    } else {
        overrides.years
    };
    if let Some(year) = years
        .iter()
        .find(|year| year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(LoopMirrorError::CliArgumentValidation {
            details: format!("Invalid year {year:?}, expected four digits."),
        });
    }

    let exclusivity = Exclusivity::from_flags(
        app_config.mandatory_only || overrides.mandatory_only,
        app_config.optional_only || overrides.optional_only,
    )?;

    let dry_run = overrides.dry_run.or(app_config.dry_run).ok_or_else(|| {
        LoopMirrorError::CliArgumentValidation {
            details: "No run mode provided. Pass --dry-run or --live, or set dry_run in the config."
                .to_string(),
        }
    })?;

    let pacing = app_config.pacing;
    if pacing.min_ms > pacing.max_ms {
        return Err(LoopMirrorError::CliArgumentValidation {
            details: format!(
                "pacing.min_ms ({}) must not exceed pacing.max_ms ({}).",
                pacing.min_ms, pacing.max_ms
            ),
        });
    }

    Ok(RunParams {
        manifest_url: parse_url("manifest_url", &app_config.manifest_url)?,
        content_root: parse_url("content_root", &app_config.content_root)?,
        destination: overrides
            .destination
            .map(PathBuf::from)
            .unwrap_or(app_config.destination),
        selection: Selection {
            categories,
            years,
            exclusivity,
        },
        dry_run,
        probe_sizes: app_config.probe_sizes && !overrides.no_size_probe,
        pacing,
        failure_policy: overrides
            .failure_policy
            .unwrap_or(app_config.failure_policy),
    })
}

fn parse_url(key: &str, value: &str) -> Result<Url, LoopMirrorError> {
    Url::parse(value).map_err(|e| LoopMirrorError::CliArgumentValidation {
        details: format!("Invalid {key} {value:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::config::FailurePolicy;

    fn config() -> Config {
        Config {
            dry_run: Some(false),
            ..Config::default()
        }
    }

    #[test]
    fn test_overrides_take_precedence() {
        let params = resolve_run_params(
            config(),
            RunOverrides {
                categories: vec![Category::MainStage],
                years: vec!["2015".to_string()],
                destination: Some("/srv/loops".to_string()),
                dry_run: Some(true),
                no_size_probe: true,
                failure_policy: Some(FailurePolicy::Continue),
                ..RunOverrides::default()
            },
        )
        .unwrap();

        assert_eq!(params.selection.categories, vec![Category::MainStage]);
        assert_eq!(params.selection.years, vec!["2015".to_string()]);
        assert_eq!(params.destination, PathBuf::from("/srv/loops"));
        assert!(params.dry_run);
        assert!(!params.probe_sizes);
        assert_eq!(params.failure_policy, FailurePolicy::Continue);
    }

    #[test]
    fn test_defaults_come_from_config() {
        let params = resolve_run_params(config(), RunOverrides::default()).unwrap();

        assert_eq!(params.selection.categories, vec![Category::GarageBand]);
        assert_eq!(params.selection.years, vec!["2016".to_string()]);
        assert_eq!(params.selection.exclusivity, Exclusivity::Any);
        assert!(!params.dry_run);
        assert!(params.probe_sizes);
        assert_eq!(params.failure_policy, FailurePolicy::Abort);
    }

    #[test]
    fn test_run_mode_is_required() {
        let result = resolve_run_params(Config::default(), RunOverrides::default());

        assert!(matches!(
            result,
            Err(LoopMirrorError::CliArgumentValidation { .. })
        ));
    }

    #[test]
    fn test_conflicting_exclusivity_is_rejected() {
        let app_config = Config {
            mandatory_only: true,
            ..config()
        };
        let result = resolve_run_params(
            app_config,
            RunOverrides {
                optional_only: true,
                ..RunOverrides::default()
            },
        );

        assert!(matches!(
            result,
            Err(LoopMirrorError::CliArgumentValidation { .. })
        ));
    }

    #[test]
    fn test_invalid_year_is_rejected() {
        let result = resolve_run_params(
            config(),
            RunOverrides {
                years: vec!["16".to_string()],
                ..RunOverrides::default()
            },
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_pacing_is_rejected() {
        let mut app_config = config();
        app_config.pacing.min_ms = 10;
        app_config.pacing.max_ms = 1;

        assert!(resolve_run_params(app_config, RunOverrides::default()).is_err());
    }
}
