use crate::harness::{Assertion, Query, Scenario};
use anyhow::ensure;
use lxq_core::{ChangeKind, ErrorKind, ListOptions};

/// Three tagged versions; HEAD ends at v3.0.
fn kernel_history(name: &str) -> Scenario {
    Scenario::new(name)
        .version(
            "v1.0",
            &[
                ("Makefile", "VERSION = 1\n"),
                ("README", "Linux 1\n"),
                ("kernel/sched.c", "int sched(void);\n"),
            ],
        )
        .version(
            "v2.0",
            &[
                ("README", "Linux 2\n"),
                ("mm/slab.c", "void *kmalloc(int n);\n"),
            ],
        )
        .version_with_changes(
            "v3.0",
            &[
                ("kernel/sched.c", None),
                (
                    "kernel/core.c",
                    Some(&b"static void __schedule(bool preempt)\n{\n\tschedule_debug(prev);\n}\n"[..]),
                ),
            ],
        )
}

#[test]
fn test_reads_follow_requested_version() {
    kernel_history("reads_follow_requested_version")
        .assert_file("v1.0", "/README", "Linux 1\n")
        .assert_file("v2.0", "/README", "Linux 2\n")
        .assert_file("v1.0", "README", "Linux 1\n")
        .assert_exists("v1.0", "/mm/slab.c", false)
        .assert_exists("v2.0", "/mm/slab.c", true)
        .assert_exists("v3.0", "/kernel/sched.c", false)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_listing_per_version() {
    kernel_history("listing_per_version")
        .assert_listing("v1.0", "/", &["Makefile", "README", "kernel"])
        .assert_listing("v2.0", "/", &["Makefile", "README", "kernel", "mm"])
        .assert_listing("v3.0", "/kernel", &["core.c"])
        .assert_listing("v1.0", "/kernel", &["sched.c"])
        .run()
        .unwrap();
}

#[test]
fn test_recursive_listing_covers_subtree() {
    kernel_history("recursive_listing_covers_subtree")
        .lists("v2.0", "/mm")
        .assert(Assertion::Custom(Box::new(|service| {
            let root = service.list_directory("v2.0", "/", &ListOptions::recursive(None))?;
            // root, Makefile, README, kernel, kernel/sched.c, mm, mm/slab.c
            ensure!(root.count() == 7, "unexpected entry count {}", root.count());
            ensure!(root.find("/mm/slab.c").is_some(), "slab.c missing");
            ensure!(root.find("/.git").is_none(), ".git listed");
            Ok(())
        })))
        .run()
        .unwrap();
}

#[test]
fn test_stat_matches_listing() {
    kernel_history("stat_matches_listing")
        .assert_stat_matches_listing("v2.0", "/")
        .assert_stat_matches_listing("v2.0", "/kernel")
        .assert_stat_matches_listing("v3.0", "/kernel")
        .run()
        .unwrap();
}

#[test]
fn test_tag_resolution() {
    kernel_history("tag_resolution")
        .assert_resolves_to("v2.0", "v2.0")
        .assert_fails(
            Query::Resolve {
                token: "v99.99".to_string(),
            },
            ErrorKind::NotFound,
        )
        .run()
        .unwrap();
}

#[test]
fn test_moved_tag_is_re_resolved() {
    kernel_history("moved_tag_is_re_resolved")
        .assert_file("v1.0", "/README", "Linux 1\n")
        .move_tag("v1.0", "v2.0")
        .assert_resolves_to("v1.0", "v2.0")
        .assert_file("v1.0", "/README", "Linux 2\n")
        .run()
        .unwrap();
}

#[test]
fn test_commit_diffs() {
    kernel_history("commit_diffs")
        .assert_root_commit("v1.0")
        .assert_changes(
            "v2.0",
            &[("README", ChangeKind::Modified), ("mm/slab.c", ChangeKind::Added)],
        )
        .assert_changes(
            "v3.0",
            &[
                ("kernel/core.c", ChangeKind::Added),
                ("kernel/sched.c", ChangeKind::Deleted),
            ],
        )
        .run()
        .unwrap();
}

#[test]
fn test_renamed_file_reported_once() {
    let driver = "static int probe(struct platform_device *pdev)\n{\n\treturn 0;\n}\n".repeat(10);
    kernel_history("renamed_file_reported_once")
        .version("v3.1", &[("drivers/gpio/gpio-old.c", driver.as_str())])
        .version_with_changes(
            "v3.2",
            &[
                ("drivers/gpio/gpio-old.c", None),
                ("drivers/gpio/gpio-new.c", Some(driver.as_bytes())),
            ],
        )
        .assert_changes("v3.2", &[("drivers/gpio/gpio-new.c", ChangeKind::Renamed)])
        .run()
        .unwrap();
}
