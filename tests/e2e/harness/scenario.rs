use super::assertions::{Assertion, Query};
use super::runner::ScenarioRunner;
use super::steps::ScenarioStep;
use lxq_core::{ChangeKind, Config, ErrorKind, LineSpec, RawLookup, RawOccurrence};
use std::collections::HashMap;

/// Fluent DSL for building test scenarios
pub struct Scenario {
    name: String,
    config: Config,
    index: Option<HashMap<String, RawLookup>>,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            config: Config::default(),
            index: None,
            steps: Vec::new(),
        }
    }

    // ===== Service setup =====

    /// Adjust the service configuration before it is opened
    pub fn configure(mut self, adjust: impl FnOnce(&mut Config)) -> Self {
        adjust(&mut self.config);
        self
    }

    /// Serve `ident` from a stub cross-reference index
    pub fn with_index_entry(
        mut self,
        ident: &str,
        category: &str,
        path: &str,
        line: LineSpec,
        kind: Option<&str>,
    ) -> Self {
        let entries = self.index.get_or_insert_with(HashMap::new);
        entries
            .entry(ident.to_string())
            .or_default()
            .categories
            .entry(category.to_string())
            .or_default()
            .push(RawOccurrence {
                path: path.to_string(),
                line,
                kind: kind.map(str::to_string),
            });
        self
    }

    /// Use a stub index that knows no identifiers
    pub fn with_empty_index(mut self) -> Self {
        self.index.get_or_insert_with(HashMap::new);
        self
    }

    // ===== History =====

    /// Commit files and tag the result as `tag`
    pub fn version(mut self, tag: &str, files: &[(&str, &str)]) -> Self {
        self.steps.push(ScenarioStep::CommitVersion {
            tag: tag.to_string(),
            message: format!("Linux {}", tag),
            changes: files
                .iter()
                .map(|(p, c)| (p.to_string(), Some(c.as_bytes().to_vec())))
                .collect(),
        });
        self
    }

    /// Commit arbitrary changes (None deletes) and tag the result
    pub fn version_with_changes(mut self, tag: &str, changes: &[(&str, Option<&[u8]>)]) -> Self {
        self.steps.push(ScenarioStep::CommitVersion {
            tag: tag.to_string(),
            message: format!("Linux {}", tag),
            changes: changes
                .iter()
                .map(|(p, c)| (p.to_string(), c.map(<[u8]>::to_vec)))
                .collect(),
        });
        self
    }

    /// Force-move a tag to another version's commit
    pub fn move_tag(mut self, tag: &str, to_version: &str) -> Self {
        self.steps.push(ScenarioStep::MoveTag {
            tag: tag.to_string(),
            to_version: to_version.to_string(),
        });
        self
    }

    // ===== Outside interference =====

    /// Modify the working copy directly
    pub fn edit_working_copy(mut self, path: &str, content: &str) -> Self {
        self.steps.push(ScenarioStep::EditWorkingCopy {
            path: path.to_string(),
            content: content.as_bytes().to_vec(),
        });
        self
    }

    /// Another tool checks out a version
    pub fn external_checkout(mut self, version: &str) -> Self {
        self.steps.push(ScenarioStep::ExternalCheckout {
            version: version.to_string(),
        });
        self
    }

    /// Drop the service and open a fresh one on the same working copy
    pub fn restart(mut self) -> Self {
        self.steps.push(ScenarioStep::Restart);
        self
    }

    // ===== Queries =====

    /// Run a query that must succeed
    pub fn run_query(mut self, query: Query) -> Self {
        self.steps.push(ScenarioStep::Run { query });
        self
    }

    pub fn reads(self, version: &str, path: &str) -> Self {
        self.run_query(Query::ReadFile {
            version: version.to_string(),
            path: path.to_string(),
        })
    }

    pub fn lists(self, version: &str, path: &str) -> Self {
        self.run_query(Query::List {
            version: version.to_string(),
            path: path.to_string(),
            recursive: false,
        })
    }

    // ===== Assertions =====

    /// Add an assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.steps.push(ScenarioStep::Assert { assertion });
        self
    }

    pub fn assert_file(self, version: &str, path: &str, content: &str) -> Self {
        self.assert(Assertion::FileContent {
            version: version.to_string(),
            path: path.to_string(),
            content: content.to_string(),
        })
    }

    pub fn assert_exists(self, version: &str, path: &str, exists: bool) -> Self {
        self.assert(Assertion::PathExists {
            version: version.to_string(),
            path: path.to_string(),
            exists,
        })
    }

    pub fn assert_listing(self, version: &str, path: &str, names: &[&str]) -> Self {
        self.assert(Assertion::ListingNames {
            version: version.to_string(),
            path: path.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        })
    }

    pub fn assert_stat_matches_listing(self, version: &str, path: &str) -> Self {
        self.assert(Assertion::StatMatchesListing {
            version: version.to_string(),
            path: path.to_string(),
        })
    }

    pub fn assert_resolves_to(self, token: &str, version: &str) -> Self {
        self.assert(Assertion::ResolvesTo {
            token: token.to_string(),
            version: version.to_string(),
        })
    }

    pub fn assert_changes(self, version: &str, changes: &[(&str, ChangeKind)]) -> Self {
        self.assert(Assertion::CommitChanges {
            version: version.to_string(),
            changes: changes.iter().map(|(p, k)| (p.to_string(), *k)).collect(),
        })
    }

    pub fn assert_root_commit(self, version: &str) -> Self {
        self.assert(Assertion::CommitIsRoot {
            version: version.to_string(),
        })
    }

    /// Expect `[definitions, references, documentation]` occurrence counts
    pub fn assert_ident(self, version: &str, ident: &str, family: &str, counts: [usize; 3]) -> Self {
        self.assert(Assertion::IdentCounts {
            version: version.to_string(),
            ident: ident.to_string(),
            family: family.to_string(),
            counts,
        })
    }

    pub fn assert_fails(self, query: Query, kind: ErrorKind) -> Self {
        self.assert(Assertion::Fails { query, kind })
    }

    pub fn assert_head(self, version: &str) -> Self {
        self.assert(Assertion::HeadAt {
            version: version.to_string(),
        })
    }

    pub fn assert_generation(self, generation: u64) -> Self {
        self.assert(Assertion::Generation(generation))
    }

    pub fn assert_working_copy_file(self, path: &str, content: &str) -> Self {
        self.assert(Assertion::WorkingCopyFile {
            path: path.to_string(),
            content: content.to_string(),
        })
    }

    /// Read every `(version, path, content)` from its own thread, `rounds` times
    pub fn assert_concurrent_reads(self, reads: &[(&str, &str, &str)], rounds: usize) -> Self {
        self.assert(Assertion::ConcurrentReads {
            reads: reads
                .iter()
                .map(|(v, p, c)| (v.to_string(), p.to_string(), c.to_string()))
                .collect(),
            rounds,
        })
    }

    // ===== Execution =====

    /// Execute the scenario and return results
    pub fn run(self) -> ScenarioResult {
        let mut runner = match ScenarioRunner::new(self.config, self.index) {
            Ok(r) => r,
            Err(e) => {
                return ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: 0,
                    failure_step: Some(0),
                    error: Some(format!("Failed to create runner: {}", e)),
                }
            }
        };

        match runner.execute(&self.steps) {
            Ok(()) => ScenarioResult {
                name: self.name,
                success: true,
                steps_executed: self.steps.len(),
                failure_step: None,
                error: None,
            },
            Err(e) => {
                let failure_step = runner.current_step();
                ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: failure_step,
                    failure_step: Some(failure_step),
                    error: Some(format!("{:?}", e)),
                }
            }
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) {
        if !self.success {
            panic!(
                "Scenario '{}' failed at step {}: {}",
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}
