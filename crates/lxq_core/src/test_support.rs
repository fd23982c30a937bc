//! Git fixture histories for unit tests.

use crate::CommitHash;
use git2::{IndexAddOption, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A throwaway git repository with a scripted history.
pub(crate) struct FixtureRepo {
    dir: TempDir,
    clock: i64,
}

impl FixtureRepo {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        Repository::init(dir.path()).unwrap();
        Self {
            dir,
            clock: 1_600_000_000,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    pub(crate) fn repo(&self) -> Repository {
        Repository::open(self.path()).unwrap()
    }

    /// Applies `changes` to the working tree (`None` deletes) and commits on HEAD.
    pub(crate) fn commit(&mut self, message: &str, changes: &[(&str, Option<&str>)]) -> CommitHash {
        self.commit_with_parents(message, changes, &[])
    }

    /// Like `commit`, adding `extra` as further parents after HEAD.
    pub(crate) fn commit_with_parents(
        &mut self,
        message: &str,
        changes: &[(&str, Option<&str>)],
        extra: &[CommitHash],
    ) -> CommitHash {
        for (path, content) in changes {
            let full = self.path().join(path);
            match content {
                Some(text) => {
                    if let Some(parent) = full.parent() {
                        fs::create_dir_all(parent).unwrap();
                    }
                    fs::write(&full, text).unwrap();
                }
                None => fs::remove_file(&full).unwrap(),
            }
        }

        let repo = self.repo();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap();
        index.update_all(["*"].iter(), None).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        self.clock += 60;
        let sig = Signature::new("Test Author", "author@example.com", &Time::new(self.clock, 60))
            .unwrap();

        let mut parents = Vec::new();
        if let Ok(head) = repo.head() {
            parents.push(head.peel_to_commit().unwrap());
        }
        for hash in extra {
            parents.push(repo.find_commit(hash.to_oid()).unwrap());
        }
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
        CommitHash::from_oid(oid)
    }

    /// Creates a commit that is not on HEAD's history: a sibling of HEAD.
    pub(crate) fn side_commit(&mut self, message: &str, path: &str, content: &str) -> CommitHash {
        let repo = self.repo();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        let blob = repo.blob(content.as_bytes()).unwrap();
        let mut builder = repo.treebuilder(Some(&head.tree().unwrap())).unwrap();
        builder.insert(path, blob, 0o100644).unwrap();
        let tree = repo.find_tree(builder.write().unwrap()).unwrap();

        self.clock += 60;
        let sig = Signature::new("Side Author", "side@example.com", &Time::new(self.clock, 0))
            .unwrap();
        let oid = repo
            .commit(None, &sig, &sig, message, &tree, &[&head])
            .unwrap();
        CommitHash::from_oid(oid)
    }

    pub(crate) fn tag(&self, name: &str, target: CommitHash) {
        let repo = self.repo();
        let obj = repo.find_object(target.to_oid(), None).unwrap();
        repo.tag_lightweight(name, &obj, false).unwrap();
    }

    pub(crate) fn annotated_tag(&self, name: &str, target: CommitHash) {
        let repo = self.repo();
        let obj = repo.find_object(target.to_oid(), None).unwrap();
        let sig = Signature::new("Tagger", "tagger@example.com", &Time::new(self.clock, 0)).unwrap();
        repo.tag(name, &obj, &sig, &format!("Release {name}"), false)
            .unwrap();
    }
}

/// Three tagged versions:
///
/// - `v1.0`: `README`, `kernel/sched.c`
/// - `v2.0`: edits `README`, adds `mm/slab.c`
/// - `v3.0` (HEAD): deletes `kernel/sched.c`, adds `kernel/core.c`
pub(crate) fn linear_history() -> (FixtureRepo, [CommitHash; 3]) {
    let mut fixture = FixtureRepo::new();
    let v1 = fixture.commit(
        "Initial import",
        &[
            ("README", Some("version 1\n")),
            ("kernel/sched.c", Some("int sched(void) { return 1; }\n")),
        ],
    );
    fixture.tag("v1.0", v1);
    let v2 = fixture.commit(
        "Add slab allocator",
        &[
            ("README", Some("version 2\n")),
            ("mm/slab.c", Some("void *kmalloc(int n);\n")),
        ],
    );
    fixture.annotated_tag("v2.0", v2);
    let v3 = fixture.commit(
        "Rework scheduler",
        &[
            ("kernel/sched.c", None),
            ("kernel/core.c", Some("int schedule(void) { return 3; }\n")),
        ],
    );
    fixture.tag("v3.0", v3);
    (fixture, [v1, v2, v3])
}
