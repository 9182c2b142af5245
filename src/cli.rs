//! Command-line front end over a [`DirRegistry`].
//!
//! Exit codes: `0` success, `1` the step (or `--check`) failed, `2` bad usage or
//! configuration.

use crate::config::PruneConfig;
use crate::env::{Environment, parse_binding};
use crate::{BuildStep, DirRegistry, ExitCode, InvocationContext, JobDeleteStep, Validation};
use anyhow::{Context, Result};
use argh::FromArgs;
use std::io::Write;
use std::path::PathBuf;

pub const EXIT_SUCCESS: ExitCode = 0;
pub const EXIT_FAILURE: ExitCode = 1;
pub const EXIT_USAGE: ExitCode = 2;

/// Variable consulted for the caller when neither flag nor config names one.
pub const CALLER_VAR: &str = "JOB_NAME";

#[derive(FromArgs, Debug)]
/// Delete every job whose full name matches a target, except the job running the step.
pub struct Args {
    #[argh(option)]
    /// config file in TOML format; flags override its values.
    pub config: Option<PathBuf>,

    #[argh(option, short = 'r')]
    /// registry root directory; each job is a directory holding a job.toml file.
    pub root: Option<PathBuf>,

    #[argh(option, short = 't')]
    /// job name, regular expression, or template such as ${TARGET}.
    pub target: Option<String>,

    #[argh(option, short = 'c')]
    /// full name of the job running the step. Defaults to $JOB_NAME.
    pub caller: Option<String>,

    #[argh(option, short = 'D')]
    /// variable binding KEY=VALUE used to expand the target. Repeatable.
    pub var: Vec<String>,

    #[argh(switch)]
    /// print what would be deleted without deleting anything.
    pub dry_run: bool,

    #[argh(switch)]
    /// only validate the configured target and exit.
    pub check: bool,
}

/// The `--config` file, or defaults when none was given.
pub fn load_config(args: &Args) -> Result<PruneConfig> {
    match &args.config {
        Some(path) => PruneConfig::load(path),
        None => Ok(PruneConfig::default()),
    }
}

/// Run one invocation, writing step output to `out`.
///
/// `base_env` is the starting set of bindings (the process environment for the
/// binary). Config `[vars]` are laid over it, then `--var` flags. An `Err` is a
/// usage or configuration problem; step failures come back as [`EXIT_FAILURE`].
pub fn run(
    args: Args,
    config: PruneConfig,
    base_env: Environment,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let step = JobDeleteStep::new(args.target.or(config.target).unwrap_or_default());

    if args.check {
        return match JobDeleteStep::check_target(step.target()) {
            Validation::Ok => {
                writeln!(out, "OK")?;
                Ok(EXIT_SUCCESS)
            }
            Validation::Error(msg) => {
                writeln!(out, "Error : {}", msg)?;
                Ok(EXIT_FAILURE)
            }
        };
    }

    let mut env = base_env;
    env.extend(config.vars);
    for binding in &args.var {
        let (key, value) = parse_binding(binding)?;
        env.set_var(key, value);
    }

    let caller = args
        .caller
        .or(config.caller)
        .or_else(|| env.get_var(CALLER_VAR).map(str::to_string))
        .with_context(|| format!("no caller given; pass --caller or set {}", CALLER_VAR))?;
    let root = args
        .root
        .or(config.root)
        .context("no registry root given; pass --root")?;

    let registry = DirRegistry::new(root);
    let ctx = InvocationContext::new(caller, env);

    if args.dry_run {
        return match step.preview(&ctx, &registry) {
            Ok(names) => {
                for name in names {
                    writeln!(out, "Would delete : {}", name)?;
                }
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                writeln!(out, "Error : {}", e)?;
                Ok(EXIT_FAILURE)
            }
        };
    }

    let ok = step.perform(&ctx, &registry, out)?;
    Ok(if ok { EXIT_SUCCESS } else { EXIT_FAILURE })
}

/// Turn the outcome of [`run`] into an exit code, reporting errors to `err`.
pub fn exit_code(result: Result<ExitCode>, err: &mut dyn Write) -> ExitCode {
    match result {
        Ok(code) => code,
        Err(e) => {
            let _ = writeln!(err, "job_pruner: {:#}", e);
            EXIT_USAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemRegistry, registry::Item};
    use std::path::Path;

    fn parse(args: &[&str]) -> Args {
        Args::from_args(&["job_pruner"], args).unwrap()
    }

    fn registry_with(names: &[&str]) -> (tempfile::TempDir, DirRegistry) {
        let tmp = tempfile::tempdir().unwrap();
        let registry = DirRegistry::new(tmp.path());
        for name in names {
            registry.create(name).unwrap();
        }
        (tmp, registry)
    }

    fn remaining(registry: &DirRegistry) -> Vec<String> {
        registry
            .list_all()
            .unwrap()
            .iter()
            .map(|item| item.full_name().to_string())
            .collect()
    }

    /// Runs with the given flags and returns (exit code, stdout, stderr).
    fn invoke(
        args: &[&str],
        config: PruneConfig,
        base_env: Environment,
    ) -> (ExitCode, String, String) {
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let code = exit_code(run(parse(args), config, base_env, &mut out), &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    fn root_arg(root: &Path) -> String {
        root.display().to_string()
    }

    #[test]
    fn test_deletes_and_exits_zero() {
        let (tmp, registry) = registry_with(&["job1", "job2", "runner"]);
        let root = root_arg(tmp.path());

        let (code, out, err) = invoke(
            &["--root", &root, "--target", "job.*", "--caller", "runner"],
            PruneConfig::default(),
            Environment::default(),
        );

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(
            out,
            "Deletion target : job.*\nDeleted : job1\nDeleted : job2\n"
        );
        assert!(err.is_empty());
        assert_eq!(remaining(&registry), vec!["runner"]);
    }

    #[test]
    fn test_no_match_exits_one() {
        let (tmp, registry) = registry_with(&["job1"]);
        let root = root_arg(tmp.path());

        let (code, out, _) = invoke(
            &["-r", &root, "-t", "nope", "-c", "runner"],
            PruneConfig::default(),
            Environment::default(),
        );

        assert_eq!(code, EXIT_FAILURE);
        assert!(out.ends_with("Error : no job matches 'nope'\n"), "{}", out);
        assert_eq!(remaining(&registry), vec!["job1"]);
    }

    #[test]
    fn test_missing_caller_is_usage_error() {
        let (tmp, registry) = registry_with(&["job1"]);
        let root = root_arg(tmp.path());

        let (code, out, err) = invoke(
            &["--root", &root, "--target", "job1"],
            PruneConfig::default(),
            Environment::default(),
        );

        assert_eq!(code, EXIT_USAGE);
        assert!(out.is_empty());
        assert!(err.starts_with("job_pruner: no caller given"), "{}", err);
        assert_eq!(remaining(&registry), vec!["job1"]);
    }

    #[test]
    fn test_missing_root_is_usage_error() {
        let (code, _, err) = invoke(
            &["--target", "job1", "--caller", "runner"],
            PruneConfig::default(),
            Environment::default(),
        );

        assert_eq!(code, EXIT_USAGE);
        assert!(err.contains("no registry root given"), "{}", err);
    }

    #[test]
    fn test_malformed_var_is_usage_error() {
        let (tmp, _registry) = registry_with(&["job1"]);
        let root = root_arg(tmp.path());

        let (code, _, _) = invoke(
            &["-r", &root, "-t", "job1", "-c", "runner", "-D", "NOEQUALS"],
            PruneConfig::default(),
            Environment::default(),
        );

        assert_eq!(code, EXIT_USAGE);
    }

    #[test]
    fn test_caller_falls_back_to_job_name() {
        let (tmp, registry) = registry_with(&["job1", "runner"]);
        let root = root_arg(tmp.path());

        let (code, _, _) = invoke(
            &["--root", &root, "--target", ".*"],
            PruneConfig::default(),
            Environment::from_vars([(CALLER_VAR, "runner")]),
        );

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(remaining(&registry), vec!["runner"]);
    }

    #[test]
    fn test_check_reports_ok_and_error() {
        let (code, out, _) = invoke(
            &["--check", "--target", "${TARGET}"],
            PruneConfig::default(),
            Environment::default(),
        );
        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(out, "OK\n");

        let (code, out, _) = invoke(&["--check"], PruneConfig::default(), Environment::default());
        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(out, "Error : deletion target is empty\n");
    }

    #[test]
    fn test_dry_run_lists_without_deleting() {
        let (tmp, registry) = registry_with(&["job1", "job2", "runner"]);
        let root = root_arg(tmp.path());

        let (code, out, _) = invoke(
            &["--dry-run", "-r", &root, "-t", ".*", "-c", "runner"],
            PruneConfig::default(),
            Environment::default(),
        );

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(out, "Would delete : job1\nWould delete : job2\n");
        assert_eq!(remaining(&registry), vec!["job1", "job2", "runner"]);
    }

    #[test]
    fn test_dry_run_failure_exits_one() {
        let (tmp, _registry) = registry_with(&["job1"]);
        let root = root_arg(tmp.path());

        let (code, out, _) = invoke(
            &["--dry-run", "-r", &root, "-t", "job(", "-c", "runner"],
            PruneConfig::default(),
            Environment::default(),
        );

        assert_eq!(code, EXIT_FAILURE);
        assert!(out.starts_with("Error : invalid deletion target 'job('"), "{}", out);
    }

    #[test]
    fn test_flags_override_config() {
        let (tmp, registry) = registry_with(&["job1", "keep", "runner"]);
        let root = root_arg(tmp.path());
        let config = PruneConfig {
            target: Some("keep".to_string()),
            caller: Some("someone-else".to_string()),
            root: Some(tmp.path().join("absent")),
            ..PruneConfig::default()
        };

        let (code, _, _) = invoke(
            &["--root", &root, "--target", "job1", "--caller", "runner"],
            config,
            Environment::default(),
        );

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(remaining(&registry), vec!["keep", "runner"]);
    }

    #[test]
    fn test_config_supplies_missing_flags() {
        let (tmp, registry) = registry_with(&["job1", "runner"]);
        let config = PruneConfig {
            target: Some("job1".to_string()),
            caller: Some("runner".to_string()),
            root: Some(tmp.path().to_path_buf()),
            ..PruneConfig::default()
        };

        let (code, _, _) = invoke(&[], config, Environment::default());

        assert_eq!(code, EXIT_SUCCESS);
        assert_eq!(remaining(&registry), vec!["runner"]);
    }

    #[test]
    fn test_binding_precedence() {
        let (tmp, _registry) = registry_with(&["from-env", "from-config", "from-flag"]);
        let root = root_arg(tmp.path());
        let base = || Environment::from_vars([("TARGET", "from-env")]);
        let config = || PruneConfig {
            vars: [("TARGET".to_string(), "from-config".to_string())].into(),
            ..PruneConfig::default()
        };
        let flags = ["--dry-run", "-r", root.as_str(), "-t", "${TARGET}", "-c", "runner"];

        let (_, out, _) = invoke(&flags, PruneConfig::default(), base());
        assert_eq!(out, "Would delete : from-env\n");

        let (_, out, _) = invoke(&flags, config(), base());
        assert_eq!(out, "Would delete : from-config\n");

        let mut with_var = flags.to_vec();
        with_var.extend(["-D", "TARGET=from-flag"]);
        let (_, out, _) = invoke(&with_var, config(), base());
        assert_eq!(out, "Would delete : from-flag\n");
    }

    #[test]
    fn test_load_config_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prune.toml");
        std::fs::write(&path, "target = \"job.*\"\n").unwrap();
        let path_arg = path.display().to_string();

        let config = load_config(&parse(&["--config", &path_arg])).unwrap();
        assert_eq!(config.target.as_deref(), Some("job.*"));

        let config = load_config(&parse(&[])).unwrap();
        assert_eq!(config, PruneConfig::default());
    }
}
