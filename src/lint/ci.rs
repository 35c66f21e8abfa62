use anyhow::{Context, Result};
use regex::Regex;
use serde_yaml::Value;

use crate::ledger::Ledger;

use super::engine::Linter;
use super::types::{Flow, LintContext};

pub const RULE_ID: u32 = 5;

const MASTER_BRANCH_GUARD: &str = r#"[ $TRAVIS_PULL_REQUEST = "false" ] || [ $TRAVIS_BRANCH != "master" ] || ([ $TRAVIS_PULL_REQUEST_SLUG = $TRAVIS_REPO_SLUG ] && [ $TRAVIS_PULL_REQUEST_BRANCH = "dev" ])"#;
const LINT_COMMAND: &str = "nf-core lint ${TRAVIS_BUILD_DIR}";
const IMAGE_TAG_PATTERN: &str = r":(?:[\.\d]+|latest)$";
const VERSION_VAR: &str = "NXF_VER";

/// CI configs read by this rule, in the order they are reported.
pub const CI_CONFIGS: [&str; 2] = [".travis.yml", "circle.yml"];

/// Check every CI config present on disk.
pub fn check_ci_config(
    _linter: &Linter<'_>,
    ctx: &mut LintContext,
    ledger: &mut Ledger,
) -> Result<Flow> {
    let tag_re = Regex::new(IMAGE_TAG_PATTERN).context("invalid image tag pattern")?;
    for name in CI_CONFIGS {
        let path = ctx.path(name);
        if !path.is_file() {
            continue;
        }
        let doc = std::fs::read_to_string(&path)
            .context("read failed")
            .and_then(|raw| serde_yaml::from_str::<Value>(&raw).context("invalid YAML"));
        match doc {
            Ok(doc) => check_ci_file(ctx, ledger, name, &doc, &tag_re),
            Err(err) => ledger.fail(
                RULE_ID,
                format!("Could not parse CI config '{name}': {err:#}"),
            ),
        }
    }
    Ok(Flow::Continue)
}

fn check_ci_file(ctx: &LintContext, ledger: &mut Ledger, name: &str, doc: &Value, tag_re: &Regex) {
    let before_install = string_list(doc.get("before_install"));
    let script = string_list(doc.get("script"));

    if before_install.iter().any(|c| c == MASTER_BRANCH_GUARD) {
        ledger.pass(
            RULE_ID,
            format!("Continuous integration checks for master branch PRs: '{name}'"),
        );
    } else {
        ledger.fail(
            RULE_ID,
            format!("Continuous integration must check for master branch PRs: '{name}'"),
        );
    }

    if script.iter().any(|c| c == LINT_COMMAND) {
        ledger.pass(
            RULE_ID,
            format!("Continuous integration runs nf-core lint Tests: '{name}'"),
        );
    } else {
        ledger.fail(
            RULE_ID,
            format!("Continuous integration must run nf-core lint Tests: '{name}'"),
        );
    }

    if let Some(container) = ctx.config_str("params.container").filter(|c| !c.is_empty()) {
        let untagged = tag_re.replace(container, "");
        let pull_cmd = format!("docker pull {untagged}:dev");
        if before_install.contains(&pull_cmd) {
            ledger.pass(
                RULE_ID,
                format!("CI is pulling the correct docker image: {pull_cmd}"),
            );
        } else {
            ledger.fail(
                RULE_ID,
                format!("CI is not pulling the correct docker image. Should be:\n    '{pull_cmd}'"),
            );
        }

        let tag_cmd = format!("docker tag {untagged}:dev {container}");
        if before_install.contains(&tag_cmd) {
            ledger.pass(
                RULE_ID,
                format!("CI is tagging docker image correctly: {tag_cmd}"),
            );
        } else {
            ledger.fail(
                RULE_ID,
                format!("CI is not tagging docker image correctly. Should be:\n    '{tag_cmd}'"),
            );
        }
    }

    check_min_version(ctx, ledger, name, doc);
}

/// The env matrix must test the manifest's minimum Nextflow version.
///
/// Every non-empty `NXF_VER` replaces the one before it, so the last one
/// listed is what gets compared. Each entry equal to the minimum also
/// records a pass.
fn check_min_version(ctx: &LintContext, ledger: &mut Ledger, name: &str, doc: &Value) {
    let env = match doc.get("env") {
        Some(Value::Mapping(map)) => map.get("matrix"),
        other => other,
    };
    let min_version = ctx.min_nextflow_version.as_deref();

    let mut last_tested: Option<String> = None;
    for entry in string_list(env) {
        let words = match shell_words::split(&entry) {
            Ok(words) => words,
            Err(err) => {
                ledger.fail(
                    RULE_ID,
                    format!("Could not parse CI env entry '{entry}' in '{name}': {err}"),
                );
                continue;
            }
        };
        for word in words {
            let Some((key, value)) = word.split_once('=') else {
                continue;
            };
            if key != VERSION_VAR {
                continue;
            }
            let version = value.trim_matches(|c| c == '\'' || c == '"');
            if version.is_empty() {
                continue;
            }
            if min_version == Some(version) {
                ledger.pass(
                    RULE_ID,
                    format!("Continuous integration checks minimum NF version: '{name}'"),
                );
            }
            last_tested = Some(version.to_string());
        }
    }

    match last_tested {
        None => ledger.fail(
            RULE_ID,
            format!("Continuous integration does not check minimum NF version: '{name}'"),
        ),
        Some(version) if min_version != Some(version.as_str()) => ledger.fail(
            RULE_ID,
            format!(
                "Minimum NF version differed from CI and what was set in the pipelines manifest: {name}"
            ),
        ),
        Some(_) => {}
    }
}

/// A YAML list of strings, or a lone string, as owned strings.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lint::test_support::{NoRegistry, touch};
    use crate::workflow::StaticConfig;

    const TRAVIS: &str = r#"
sudo: required
language: java
jdk: openjdk8
services: docker
python: '3.6'
before_install:
  # PRs to master are only ok if coming from dev branch
  - '[ $TRAVIS_PULL_REQUEST = "false" ] || [ $TRAVIS_BRANCH != "master" ] || ([ $TRAVIS_PULL_REQUEST_SLUG = $TRAVIS_REPO_SLUG ] && [ $TRAVIS_PULL_REQUEST_BRANCH = "dev" ])'
  - docker pull nfcore/demo:dev
  - docker tag nfcore/demo:dev nfcore/demo:1.0
install:
  - pip install nf-core
env:
  - NXF_VER='0.32.0' SOME_FLAG="with spaces"
  - NXF_VER=''
script:
  - "nf-core lint ${TRAVIS_BUILD_DIR}"
  - nextflow run ${TRAVIS_BUILD_DIR} -profile test,docker
"#;

    fn run(dir: &std::path::Path, min_version: Option<&str>) -> Ledger {
        let source = StaticConfig::default();
        let linter = Linter::new(&source, &NoRegistry);
        let mut ctx = LintContext::new(dir, false);
        ctx.config
            .insert("params.container".into(), "'nfcore/demo:1.0'".into());
        ctx.min_nextflow_version = min_version.map(String::from);
        let mut ledger = Ledger::new();
        check_ci_config(&linter, &mut ctx, &mut ledger).unwrap();
        ledger
    }

    fn failures(ledger: &Ledger) -> Vec<&str> {
        ledger.failed().iter().map(|f| f.message.as_str()).collect()
    }

    #[test]
    fn complete_travis_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".travis.yml", TRAVIS);
        let ledger = run(dir.path(), Some("0.32.0"));
        assert!(failures(&ledger).is_empty(), "{:?}", failures(&ledger));
        assert_eq!(ledger.counts().passed, 5);
    }

    #[test]
    fn no_ci_file_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(run(dir.path(), Some("0.32.0")), Ledger::new());
    }

    #[test]
    fn wrong_minimum_version_is_reported_as_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".travis.yml", TRAVIS);
        let ledger = run(dir.path(), Some("18.10.1"));
        assert_eq!(
            failures(&ledger),
            vec!["Minimum NF version differed from CI and what was set in the pipelines manifest: .travis.yml"]
        );
    }

    #[test]
    fn last_listed_version_must_be_the_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let config = TRAVIS.replace("  - NXF_VER=''\n", "  - NXF_VER='19.04.0'\n");
        touch(dir.path(), ".travis.yml", &config);
        let ledger = run(dir.path(), Some("0.32.0"));
        assert_eq!(
            failures(&ledger),
            vec!["Minimum NF version differed from CI and what was set in the pipelines manifest: .travis.yml"]
        );
        assert_eq!(
            ledger
                .passed()
                .iter()
                .filter(|f| f.message.contains("checks minimum NF version"))
                .count(),
            1
        );
    }

    #[test]
    fn each_matching_entry_passes() {
        let dir = tempfile::tempdir().unwrap();
        let config = TRAVIS.replace("  - NXF_VER=''\n", "  - NXF_VER=0.32.0\n");
        touch(dir.path(), ".travis.yml", &config);
        let ledger = run(dir.path(), Some("0.32.0"));
        assert!(failures(&ledger).is_empty(), "{:?}", failures(&ledger));
        assert_eq!(ledger.counts().passed, 6);
    }

    #[test]
    fn missing_version_matrix_is_reported_as_untested() {
        let dir = tempfile::tempdir().unwrap();
        let config = TRAVIS
            .replace("  - NXF_VER='0.32.0' SOME_FLAG=\"with spaces\"\n", "")
            .replace("  - NXF_VER=''\n", "  - OTHER=1\n");
        touch(dir.path(), ".travis.yml", &config);
        let ledger = run(dir.path(), Some("0.32.0"));
        assert_eq!(
            failures(&ledger),
            vec!["Continuous integration does not check minimum NF version: '.travis.yml'"]
        );
    }

    #[test]
    fn matrix_key_of_env_mapping_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let config = TRAVIS.replace(
            "env:\n  - NXF_VER='0.32.0' SOME_FLAG=\"with spaces\"\n  - NXF_VER=''\n",
            "env:\n  global:\n    - FOO=1\n  matrix:\n    - NXF_VER=\"0.32.0\"\n",
        );
        touch(dir.path(), ".travis.yml", &config);
        let ledger = run(dir.path(), Some("0.32.0"));
        assert!(failures(&ledger).is_empty(), "{:?}", failures(&ledger));
    }

    #[test]
    fn wrong_docker_commands_and_guard_fail() {
        let dir = tempfile::tempdir().unwrap();
        let config = TRAVIS
            .replace("docker pull nfcore/demo:dev", "docker pull nfcore/demo")
            .replace(
                "docker tag nfcore/demo:dev nfcore/demo:1.0",
                "docker tag nfcore/demo nfcore/demo:1.0",
            )
            .replace("[ $TRAVIS_BRANCH != \"master\" ]", "true");
        touch(dir.path(), "circle.yml", &config);
        let ledger = run(dir.path(), Some("0.32.0"));
        assert_eq!(
            failures(&ledger),
            vec![
                "Continuous integration must check for master branch PRs: 'circle.yml'",
                "CI is not pulling the correct docker image. Should be:\n    'docker pull nfcore/demo:dev'",
                "CI is not tagging docker image correctly. Should be:\n    'docker tag nfcore/demo:dev nfcore/demo:1.0'",
            ]
        );
    }

    #[test]
    fn unbalanced_quotes_fail_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let config = TRAVIS.replace("  - NXF_VER=''\n", "  - NXF_VER='1.0\n");
        touch(dir.path(), ".travis.yml", &config);
        let ledger = run(dir.path(), Some("0.32.0"));
        let failed = failures(&ledger);
        assert_eq!(failed.len(), 1, "{failed:?}");
        assert!(failed[0].starts_with("Could not parse CI env entry"));
    }

    #[test]
    fn invalid_yaml_fails() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), ".travis.yml", "script: [unclosed\n");
        let ledger = run(dir.path(), Some("0.32.0"));
        assert!(failures(&ledger)[0].starts_with("Could not parse CI config '.travis.yml'"));
    }

    #[test]
    fn string_list_accepts_scalar_or_sequence() {
        let doc: Value = serde_yaml::from_str("a: one\nb: [two, 3, three]\n").unwrap();
        assert_eq!(string_list(doc.get("a")), vec!["one"]);
        assert_eq!(string_list(doc.get("b")), vec!["two", "three"]);
        assert!(string_list(doc.get("c")).is_empty());
    }
}
